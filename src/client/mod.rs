// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Catalog client.
//!
//! The [`CatalogClient`] ties the pieces together: it compiles filters,
//! sends them to a [`CatalogBackend`], shapes the results against the
//! current schema snapshot and keeps that snapshot fresh from a
//! [`MetadataSource`].
//!
//! # Architecture
//!
//! ```text
//!                     ┌──────────────────────────────────────┐
//!  query(filter) ───▶ │ QueryAssembler → backend.query()     │
//!                     │        ResultShaper(identifiers) ◀───┤
//!                     ├──────────────────────────────────────┤
//!  create/save/  ───▶ │ rename safe → raw → backend mutation │
//!  delete             ├──────────────────────────────────────┤
//!  refresh_schema ──▶ │ SchemaRegistry ◀── MetadataSource    │
//!                     └──────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! # use catalog_query::{CatalogClient, CatalogConfig, PredicateNode, QuerySettings};
//! # async fn example() -> Result<(), catalog_query::CatalogError> {
//! let client = CatalogClient::http(CatalogConfig::default())?;
//! client.refresh_schema().await?;
//!
//! let result = client
//!     .query(PredicateNode::ilike("title", "%river%"), &QuerySettings::new().with_page_size(10))
//!     .await?;
//! for record in &result.records {
//!     println!("{:?}", record.id());
//! }
//! # Ok(())
//! # }
//! ```

mod mutation_api;
mod query_api;
mod source_api;

use std::sync::Arc;

use tokio::sync::watch;
use tracing::info;

use crate::backend::{CatalogBackend, CatalogError, HttpCatalog, MetadataSource};
use crate::config::CatalogConfig;
use crate::schema::{RefreshReport, SchemaRegistry, SchemaSnapshot};

pub struct CatalogClient {
    backend: Arc<dyn CatalogBackend>,
    metadata: Arc<dyn MetadataSource>,
    registry: SchemaRegistry,
    config: CatalogConfig,
}

impl CatalogClient {
    /// Create a client starting from the builtin-only schema.
    ///
    /// Call [`refresh_schema`](Self::refresh_schema) to load the catalog's
    /// attribute metadata.
    pub fn new(
        backend: Arc<dyn CatalogBackend>,
        metadata: Arc<dyn MetadataSource>,
        config: CatalogConfig,
    ) -> Result<Self, CatalogError> {
        Ok(Self {
            backend,
            metadata,
            registry: SchemaRegistry::new()?,
            config,
        })
    }

    /// Create a client over one catalog serving both queries and metadata
    pub fn with_catalog<C>(catalog: Arc<C>, config: CatalogConfig) -> Result<Self, CatalogError>
    where
        C: CatalogBackend + MetadataSource + 'static,
    {
        Self::new(catalog.clone(), catalog, config)
    }

    /// Create a client talking to a live catalog over HTTP
    pub fn http(config: CatalogConfig) -> Result<Self, CatalogError> {
        let catalog = Arc::new(HttpCatalog::new(config.clone())?);
        Self::with_catalog(catalog, config)
    }

    #[must_use]
    pub fn config(&self) -> &CatalogConfig {
        &self.config
    }

    /// Current schema snapshot
    #[must_use]
    pub fn schema(&self) -> Arc<SchemaSnapshot> {
        self.registry.current()
    }

    /// Receiver notified when a refresh publishes a new schema
    #[must_use]
    pub fn subscribe_schema(&self) -> watch::Receiver<Arc<SchemaSnapshot>> {
        self.registry.subscribe()
    }

    /// Reload attribute metadata and enumerations.
    ///
    /// Enumeration groups that fail to load are listed in the report; the
    /// new schema is published without them.
    pub async fn refresh_schema(&self) -> Result<RefreshReport, CatalogError> {
        let report = self.registry.refresh(self.metadata.as_ref()).await?;
        if !report.is_complete() {
            info!(
                version = report.version,
                failed_groups = report.failures.len(),
                "Schema published with missing enumerations"
            );
        }
        Ok(report)
    }
}
