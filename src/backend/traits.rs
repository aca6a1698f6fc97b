// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::query::BackendQuery;
use crate::schema::{AttributeGroups, Enumerations};

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Invalid predicate: {0}")]
    InvalidPredicate(String),
    #[error("Invalid query settings: {0}")]
    InvalidSettings(String),
    #[error("Attributes '{first}' and '{second}' both map to schema field '{safe_id}'")]
    IdentifierCollision {
        safe_id: String,
        first: String,
        second: String,
    },
    #[error("Catalog backend request failed: {0}")]
    BackendRequestFailed(String),
    #[error("Enumerations for metacard type group '{group}' unavailable: {reason}")]
    PartialMetadataFailure { group: String, reason: String },
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl CatalogError {
    /// Short label used for metrics and structured logs.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidPredicate(_) => "invalid_predicate",
            Self::InvalidSettings(_) => "invalid_settings",
            Self::IdentifierCollision { .. } => "identifier_collision",
            Self::BackendRequestFailed(_) => "backend_request_failed",
            Self::PartialMetadataFailure { .. } => "partial_metadata_failure",
            Self::Serialization(_) => "serialization",
        }
    }
}

/// One attribute change inside a metacard update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeUpdate {
    /// Raw attribute id
    pub attribute: String,
    pub values: Vec<Value>,
}

/// Update applied to every metacard listed in `ids`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetacardUpdate {
    pub ids: Vec<String>,
    pub attributes: Vec<AttributeUpdate>,
}

/// Description of a federated source as reported by the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceInfo {
    pub id: String,
    /// Whether this source is the local catalog (filled in by the client)
    #[serde(default)]
    pub local: bool,
    /// Everything else the backend reports (availability, content types, ...)
    #[serde(flatten)]
    pub details: Map<String, Value>,
}

/// Catalog operations consumed by the query layer.
///
/// Request and response bodies for `query` and `create` are opaque JSON owned
/// by the backend; the shaper is responsible for interpreting them.
#[async_trait]
pub trait CatalogBackend: Send + Sync {
    async fn query(&self, query: &BackendQuery) -> Result<Value, CatalogError>;
    async fn create(&self, request: Value) -> Result<Value, CatalogError>;
    async fn update(&self, updates: &[MetacardUpdate]) -> Result<(), CatalogError>;
    async fn delete(&self, ids: &[String]) -> Result<(), CatalogError>;
    async fn source_ids(&self) -> Result<Vec<String>, CatalogError>;
    async fn source_info(&self, ids: &[String]) -> Result<Vec<SourceInfo>, CatalogError>;
}

/// Read-only metadata endpoints the schema is built from.
#[async_trait]
pub trait MetadataSource: Send + Sync {
    /// Attribute definitions grouped by metacard type.
    async fn attribute_groups(&self) -> Result<AttributeGroups, CatalogError>;

    /// Global enumeration config (attribute id -> allowed values).
    async fn enumeration_config(&self) -> Result<Enumerations, CatalogError>;

    /// Enumerations scoped to one metacard type group.
    async fn group_enumerations(&self, group: &str) -> Result<Enumerations, CatalogError>;

    /// Id of the catalog this deployment serves locally.
    async fn local_catalog_id(&self) -> Result<String, CatalogError>;
}
