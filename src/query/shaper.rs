// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Result Shaper
//!
//! Turns the backend's raw query response into a [`QueryResult`]:
//!
//! ```text
//! {                                          QueryResult {
//!   "results": [{                              records: [ResultRecord {
//!     "metacard": {"properties": {               attributes: {"point_of_contact": "Jane", ...},
//!       "point-of-contact": "Jane", ...          metacard: <raw metacard JSON>,
//!     }},                                        actions: [...],
//!     "actions": [...]                           related: RelatedQuery(ids from "queries"),
//!   }],                                        }],
//!   "status": {"count", "hits", ...},          status: {count, hits, elapsed, id, successful},
//!   "request_duration_millis": 12,             facets: {"<attribute>": [{value, count}]},
//!   "facets": {...}                          }
//! }
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::backend::CatalogError;
use crate::client::CatalogClient;
use crate::filter::PredicateNode;
use crate::schema::{IdentifierMap, FILTER_TREE, ID, QUERIES};

/// Status block of a query response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryStatus {
    /// Records in this page
    pub count: u64,
    /// Milliseconds the backend spent on the request
    pub elapsed: u64,
    /// Total matching records
    pub hits: u64,
    pub id: Option<String>,
    pub successful: bool,
}

/// One facet bucket; `value` is a literal attribute value and is never renamed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FacetBucket {
    pub value: Value,
    pub count: u64,
}

/// Action the backend offers for a record
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetacardAction {
    pub description: Option<String>,
    #[serde(rename = "displayName")]
    pub display_name: Option<String>,
    pub id: Option<String>,
    pub title: Option<String>,
    pub url: Option<String>,
}

/// Deferred lookup of the records a record refers to.
///
/// Captures only the referenced ids; nothing is queried until
/// [`resolve`](Self::resolve) is awaited.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RelatedQuery {
    ids: Vec<String>,
}

impl RelatedQuery {
    #[must_use]
    pub fn new(ids: Vec<String>) -> Self {
        Self { ids }
    }

    #[must_use]
    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// `( ( id = a OR id = b ... ) AND metacard-tags LIKE '%' )`, or `None`
    /// when there is nothing to look up
    #[must_use]
    pub fn predicate(&self) -> Option<PredicateNode> {
        if self.ids.is_empty() {
            return None;
        }
        let by_id = self
            .ids
            .iter()
            .map(|id| PredicateNode::eq(ID, id.as_str()))
            .collect();
        Some(PredicateNode::any(by_id).and(PredicateNode::any_tag()))
    }

    /// Run the lookup against the catalog
    pub async fn resolve(&self, client: &CatalogClient) -> Result<Vec<ResultRecord>, CatalogError> {
        client.related(self).await
    }
}

/// A shaped hit
#[derive(Debug, Clone, Serialize)]
pub struct ResultRecord {
    /// Properties keyed by safe name, unknown keys included
    pub attributes: Map<String, Value>,
    /// Raw metacard as the backend sent it
    pub metacard: Value,
    pub actions: Vec<MetacardAction>,
    #[serde(skip)]
    pub related: RelatedQuery,
}

impl ResultRecord {
    fn new(attributes: Map<String, Value>, metacard: Value, actions: Vec<MetacardAction>) -> Self {
        let ids = match attributes.get(QUERIES) {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect(),
            Some(Value::String(id)) => vec![id.clone()],
            _ => Vec::new(),
        };
        Self {
            attributes,
            metacard,
            actions,
            related: RelatedQuery::new(ids),
        }
    }

    /// Attribute by safe name
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }

    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.attributes.get(ID).and_then(Value::as_str)
    }

    /// Parse the predicate tree stored on this record, if it has one.
    ///
    /// Stored trees arrive as JSON text; they are parsed on each call.
    #[must_use]
    pub fn filter_tree(&self) -> Option<Result<PredicateNode, CatalogError>> {
        match self.attributes.get(FILTER_TREE)? {
            Value::String(text) => Some(
                serde_json::from_str::<Value>(text)
                    .map_err(CatalogError::from)
                    .and_then(|v| PredicateNode::from_json(&v)),
            ),
            other => Some(PredicateNode::from_json(other)),
        }
    }
}

/// Typed query response
#[derive(Debug, Clone, Serialize)]
pub struct QueryResult {
    pub records: Vec<ResultRecord>,
    pub status: QueryStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub facets: Option<BTreeMap<String, Vec<FacetBucket>>>,
}

impl QueryResult {
    /// Buckets for one faceted attribute
    #[must_use]
    pub fn facet(&self, attribute: &str) -> Option<&[FacetBucket]> {
        self.facets.as_ref()?.get(attribute).map(Vec::as_slice)
    }
}

#[derive(Debug, Deserialize)]
struct RawQueryResponse {
    #[serde(default)]
    results: Vec<RawResult>,
    status: Option<RawStatus>,
    #[serde(default)]
    request_duration_millis: Option<u64>,
    #[serde(default)]
    facets: Option<BTreeMap<String, Vec<FacetBucket>>>,
}

#[derive(Debug, Deserialize)]
struct RawResult {
    #[serde(default)]
    metacard: Value,
    #[serde(default)]
    actions: Vec<MetacardAction>,
}

#[derive(Debug, Deserialize)]
struct RawStatus {
    count: Option<u64>,
    hits: Option<u64>,
    successful: Option<bool>,
    id: Option<Value>,
    elapsed: Option<u64>,
}

pub struct ResultShaper;

impl ResultShaper {
    /// Shape a raw query response.
    ///
    /// Fails with [`CatalogError::BackendRequestFailed`] when the response is
    /// not a query response or its status block lacks `count`, `hits` or
    /// `successful`. Extra properties are kept under their safe names.
    pub fn shape(raw: Value, identifiers: &IdentifierMap) -> Result<QueryResult, CatalogError> {
        let response: RawQueryResponse = serde_json::from_value(raw).map_err(|e| {
            CatalogError::BackendRequestFailed(format!("malformed query response: {e}"))
        })?;

        let status = response
            .status
            .ok_or_else(|| CatalogError::BackendRequestFailed("query response has no status".into()))?;
        let missing = |field: &str| {
            CatalogError::BackendRequestFailed(format!("query response status has no '{field}'"))
        };
        let status = QueryStatus {
            count: status.count.ok_or_else(|| missing("count"))?,
            hits: status.hits.ok_or_else(|| missing("hits"))?,
            successful: status.successful.ok_or_else(|| missing("successful"))?,
            elapsed: response
                .request_duration_millis
                .or(status.elapsed)
                .unwrap_or(0),
            id: status.id.map(|id| match id {
                Value::String(s) => s,
                other => other.to_string(),
            }),
        };

        let mut unknown = 0usize;
        let records: Vec<ResultRecord> = response
            .results
            .into_iter()
            .map(|result| {
                let properties = result
                    .metacard
                    .get("properties")
                    .and_then(Value::as_object)
                    .cloned()
                    .unwrap_or_default();
                let attributes = IdentifierMap::rename_to_safe(properties);
                unknown += attributes.keys().filter(|k| !identifiers.is_known(k)).count();
                ResultRecord::new(attributes, result.metacard, result.actions)
            })
            .collect();

        if unknown > 0 {
            debug!(unknown, "Kept properties not described by the schema");
        }

        Ok(QueryResult {
            records,
            status,
            facets: response.facets,
        })
    }
}
