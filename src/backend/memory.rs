// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! In-process catalog for tests and demos.
//!
//! Stores metacards in a concurrent map and records every query it receives.
//! CQL is recorded, not evaluated: a query returns every stored metacard
//! (ordered by id) paged by `start`/`count`, unless a scripted response was
//! queued with [`InMemoryCatalog::push_response`].

use std::collections::{BTreeMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;
use parking_lot::Mutex;
use serde_json::{json, Map, Value};

use super::traits::{CatalogBackend, CatalogError, MetacardUpdate, MetadataSource, SourceInfo};
use crate::query::BackendQuery;
use crate::schema::{AttributeGroups, AttributeMetadata, Enumerations, ID};

const DEFAULT_LOCAL_ID: &str = "ddf.distribution";

pub struct InMemoryCatalog {
    metacards: DashMap<String, Map<String, Value>>,
    queries: Mutex<Vec<BackendQuery>>,
    scripted: Mutex<VecDeque<Value>>,
    next_id: AtomicU64,
    groups: AttributeGroups,
    enumeration_config: Enumerations,
    group_enumerations: BTreeMap<String, Enumerations>,
    failing_groups: HashSet<String>,
    sources: Vec<SourceInfo>,
    local_catalog_id: String,
}

impl InMemoryCatalog {
    #[must_use]
    pub fn new() -> Self {
        Self {
            metacards: DashMap::new(),
            queries: Mutex::new(Vec::new()),
            scripted: Mutex::new(VecDeque::new()),
            next_id: AtomicU64::new(1),
            groups: BTreeMap::new(),
            enumeration_config: BTreeMap::new(),
            group_enumerations: BTreeMap::new(),
            failing_groups: HashSet::new(),
            sources: Vec::new(),
            local_catalog_id: DEFAULT_LOCAL_ID.to_string(),
        }
    }

    /// Add a metacard type group
    #[must_use]
    pub fn with_attribute_group(
        mut self,
        group: impl Into<String>,
        attributes: impl IntoIterator<Item = AttributeMetadata>,
    ) -> Self {
        let entry = self.groups.entry(group.into()).or_default();
        for attr in attributes {
            entry.insert(attr.id.clone(), attr);
        }
        self
    }

    /// Global enumeration config
    #[must_use]
    pub fn with_enumeration_config(mut self, enums: impl IntoIterator<Item = (String, Vec<String>)>) -> Self {
        self.enumeration_config.extend(enums);
        self
    }

    /// Enumerations served for one group
    #[must_use]
    pub fn with_group_enumerations(
        mut self,
        group: impl Into<String>,
        enums: impl IntoIterator<Item = (String, Vec<String>)>,
    ) -> Self {
        self.group_enumerations.entry(group.into()).or_default().extend(enums);
        self
    }

    /// Make the enumeration fetch for `group` fail
    #[must_use]
    pub fn with_failing_group(mut self, group: impl Into<String>) -> Self {
        self.failing_groups.insert(group.into());
        self
    }

    /// Register a federated source
    #[must_use]
    pub fn with_source(mut self, id: impl Into<String>, details: Value) -> Self {
        self.sources.push(SourceInfo {
            id: id.into(),
            local: false,
            details: details.as_object().cloned().unwrap_or_default(),
        });
        self
    }

    #[must_use]
    pub fn with_local_catalog_id(mut self, id: impl Into<String>) -> Self {
        self.local_catalog_id = id.into();
        self
    }

    /// Seed a metacard; its raw properties must carry an `id`
    #[must_use]
    pub fn with_metacard(self, properties: Value) -> Self {
        if let Value::Object(map) = properties {
            self.insert(map);
        }
        self
    }

    /// Store a metacard, assigning an id when it has none. Returns the id.
    pub fn insert(&self, mut properties: Map<String, Value>) -> String {
        let id = match properties.get(ID).and_then(Value::as_str) {
            Some(id) => id.to_string(),
            None => {
                let id = format!("mem-{}", self.next_id.fetch_add(1, Ordering::Relaxed));
                properties.insert(ID.to_string(), Value::String(id.clone()));
                id
            }
        };
        self.metacards.insert(id.clone(), properties);
        id
    }

    /// Raw properties of a stored metacard
    #[must_use]
    pub fn get(&self, id: &str) -> Option<Map<String, Value>> {
        self.metacards.get(id).map(|r| r.value().clone())
    }

    /// Queue a raw response returned by the next query instead of stored data
    pub fn push_response(&self, response: Value) {
        self.scripted.lock().push_back(response);
    }

    /// Every query received so far, oldest first
    #[must_use]
    pub fn queries(&self) -> Vec<BackendQuery> {
        self.queries.lock().clone()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.metacards.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.metacards.is_empty()
    }

    fn sorted(&self) -> Vec<Map<String, Value>> {
        let mut all: Vec<(String, Map<String, Value>)> = self
            .metacards
            .iter()
            .map(|r| (r.key().clone(), r.value().clone()))
            .collect();
        all.sort_by(|a, b| a.0.cmp(&b.0));
        all.into_iter().map(|(_, m)| m).collect()
    }

    fn facet_buckets(records: &[Map<String, Value>], attribute: &str) -> Vec<Value> {
        let mut counts: BTreeMap<String, (Value, u64)> = BTreeMap::new();
        for record in records {
            let values = match record.get(attribute) {
                Some(Value::Array(items)) => items.clone(),
                Some(Value::Null) | None => continue,
                Some(other) => vec![other.clone()],
            };
            for value in values {
                let key = value.to_string();
                counts.entry(key).or_insert((value, 0)).1 += 1;
            }
        }
        let mut buckets: Vec<(Value, u64)> = counts.into_values().collect();
        buckets.sort_by(|a, b| b.1.cmp(&a.1));
        buckets
            .into_iter()
            .map(|(value, count)| json!({"value": value, "count": count}))
            .collect()
    }
}

impl Default for InMemoryCatalog {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CatalogBackend for InMemoryCatalog {
    async fn query(&self, query: &BackendQuery) -> Result<Value, CatalogError> {
        let sequence = {
            let mut log = self.queries.lock();
            log.push(query.clone());
            log.len()
        };

        if let Some(response) = self.scripted.lock().pop_front() {
            return Ok(response);
        }

        let all = self.sorted();
        let start = query.settings.page_start.unwrap_or(1).max(1) as usize - 1;
        let count = query
            .settings
            .page_size
            .map_or(all.len(), |c| c.max(0) as usize);
        let page: Vec<Value> = all
            .iter()
            .skip(start)
            .take(count)
            .map(|properties| json!({"metacard": {"properties": properties}, "actions": []}))
            .collect();

        let mut response = json!({
            "results": page,
            "status": {
                "count": page.len(),
                "hits": all.len(),
                "successful": true,
                "id": format!("memory-{sequence}"),
                "elapsed": 0,
            },
            "request_duration_millis": 0,
        });
        if !query.settings.facets.is_empty() {
            let facets: Map<String, Value> = query
                .settings
                .facets
                .iter()
                .map(|attr| (attr.clone(), Value::Array(Self::facet_buckets(&all, attr))))
                .collect();
            response["facets"] = Value::Object(facets);
        }
        Ok(response)
    }

    async fn create(&self, request: Value) -> Result<Value, CatalogError> {
        let requested = request
            .get("metacards")
            .and_then(Value::as_array)
            .ok_or_else(|| CatalogError::BackendRequestFailed("create request has no 'metacards'".into()))?;

        let mut created = Vec::with_capacity(requested.len());
        for metacard in requested {
            let mut attributes = metacard
                .get("attributes")
                .and_then(Value::as_object)
                .cloned()
                .unwrap_or_default();
            if let Some(ty) = metacard.get("metacard-type").filter(|v| !v.is_null()) {
                attributes.insert("metacard-type".to_string(), ty.clone());
            }
            let id = self.insert(attributes);
            let stored = self.get(&id).unwrap_or_default();
            created.push(json!({"attributes": stored}));
        }
        Ok(json!({"created_metacards": created}))
    }

    async fn update(&self, updates: &[MetacardUpdate]) -> Result<(), CatalogError> {
        for update in updates {
            for id in &update.ids {
                let mut entry = self
                    .metacards
                    .get_mut(id)
                    .ok_or_else(|| CatalogError::BackendRequestFailed(format!("no metacard with id '{id}'")))?;
                for change in &update.attributes {
                    let value = match change.values.as_slice() {
                        [single] => single.clone(),
                        many => Value::Array(many.to_vec()),
                    };
                    entry.insert(change.attribute.clone(), value);
                }
            }
        }
        Ok(())
    }

    async fn delete(&self, ids: &[String]) -> Result<(), CatalogError> {
        for id in ids {
            self.metacards.remove(id);
        }
        Ok(())
    }

    async fn source_ids(&self) -> Result<Vec<String>, CatalogError> {
        Ok(self.sources.iter().map(|s| s.id.clone()).collect())
    }

    async fn source_info(&self, ids: &[String]) -> Result<Vec<SourceInfo>, CatalogError> {
        Ok(self
            .sources
            .iter()
            .filter(|s| ids.contains(&s.id))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl MetadataSource for InMemoryCatalog {
    async fn attribute_groups(&self) -> Result<AttributeGroups, CatalogError> {
        Ok(self.groups.clone())
    }

    async fn enumeration_config(&self) -> Result<Enumerations, CatalogError> {
        Ok(self.enumeration_config.clone())
    }

    async fn group_enumerations(&self, group: &str) -> Result<Enumerations, CatalogError> {
        if self.failing_groups.contains(group) {
            return Err(CatalogError::BackendRequestFailed(format!(
                "enumerations for '{group}' unavailable"
            )));
        }
        Ok(self.group_enumerations.get(group).cloned().unwrap_or_default())
    }

    async fn local_catalog_id(&self) -> Result<String, CatalogError> {
        Ok(self.local_catalog_id.clone())
    }
}
