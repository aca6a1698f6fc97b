// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Create, save and delete.
//!
//! Callers pass attributes under their safe names; they are renamed to raw
//! ids before reaching the backend and renamed back on the way out.

use chrono::{SecondsFormat, Utc};
use serde_json::{json, Map, Value};
use tracing::{debug, info};

use super::CatalogClient;
use crate::backend::{AttributeUpdate, CatalogError, MetacardUpdate};
use crate::metrics::{self, LatencyTimer};
use crate::schema::{to_safe, IdentifierMap, ID, METACARD_MODIFIED, METACARD_TYPE};

impl CatalogClient {
    /// Create one metacard and return its stored attributes (safe names).
    ///
    /// The metacard type is taken from the `metacard_type` attribute.
    pub async fn create(&self, attributes: Map<String, Value>) -> Result<Map<String, Value>, CatalogError> {
        let _timer = LatencyTimer::new("create");
        let snapshot = self.registry.current();

        let metacard_type = attributes
            .get(&to_safe(METACARD_TYPE))
            .cloned()
            .unwrap_or(Value::Null);
        let raw = snapshot.descriptor.identifiers().rename_to_raw(attributes);
        let request = json!({
            "metacards": [{
                "metacard-type": metacard_type,
                "attributes": raw,
            }]
        });

        let response = self
            .backend
            .create(request)
            .await
            .inspect_err(|e| Self::record_failure("create", e))?;

        let created = response
            .get("created_metacards")
            .and_then(|created| created.get(0))
            .and_then(|metacard| metacard.get("attributes"))
            .and_then(Value::as_object)
            .cloned()
            .ok_or_else(|| {
                let e = CatalogError::BackendRequestFailed("create reply has no created metacard".into());
                Self::record_failure("create", &e);
                e
            })?;

        metrics::record_query("create", "success");
        let created = IdentifierMap::rename_to_safe(created);
        info!(id = ?created.get(ID), "Metacard created");
        Ok(created)
    }

    /// Overwrite attributes of one metacard.
    ///
    /// Scalars are sent as one-element value lists. Returns the saved
    /// attributes plus `id` and `metacard_modified`.
    pub async fn save(
        &self,
        id: &str,
        attributes: Map<String, Value>,
    ) -> Result<Map<String, Value>, CatalogError> {
        let _timer = LatencyTimer::new("save");
        let snapshot = self.registry.current();
        let identifiers = snapshot.descriptor.identifiers();

        let changes = attributes
            .iter()
            .map(|(name, value)| AttributeUpdate {
                attribute: identifiers.to_raw(name).to_string(),
                values: match value {
                    Value::Array(items) => items.clone(),
                    other => vec![other.clone()],
                },
            })
            .collect();
        let update = MetacardUpdate {
            ids: vec![id.to_string()],
            attributes: changes,
        };

        self.backend
            .update(&[update])
            .await
            .inspect_err(|e| Self::record_failure("save", e))?;
        metrics::record_query("save", "success");

        let modified = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
        let mut saved = Map::new();
        saved.insert(ID.to_string(), Value::String(id.to_string()));
        saved.insert(to_safe(METACARD_MODIFIED), Value::String(modified));
        saved.extend(attributes);
        debug!(id, attributes = saved.len(), "Metacard saved");
        Ok(saved)
    }

    /// Delete one metacard; returns its id
    pub async fn delete(&self, id: &str) -> Result<String, CatalogError> {
        let _timer = LatencyTimer::new("delete");
        self.backend
            .delete(&[id.to_string()])
            .await
            .inspect_err(|e| Self::record_failure("delete", e))?;

        metrics::record_query("delete", "success");
        info!(id, "Metacard deleted");
        Ok(id.to_string())
    }
}
