//! # Catalog Query
//!
//! A typed query layer over a federated search catalog.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      CatalogClient                          │
//! │  • query / metacard_by_id / metacards_by_tag / facet        │
//! │  • create / save / delete / sources                         │
//! └─────────────────────────────────────────────────────────────┘
//!          │                    │                       │
//!          ▼                    ▼                       ▼
//! ┌──────────────────┐ ┌──────────────────┐ ┌─────────────────────┐
//! │ filter           │ │ query            │ │ schema              │
//! │ PredicateNode    │ │ QueryAssembler   │ │ IdentifierMap       │
//! │ CqlCompiler      │ │ ResultShaper     │ │ TypeProjector       │
//! │                  │ │                  │ │ SchemaRegistry      │
//! └──────────────────┘ └──────────────────┘ └─────────────────────┘
//!          │                    │                       │
//!          └────────────────────┼───────────────────────┘
//!                               ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  backend (CatalogBackend)                   │
//! │  • HttpCatalog: JSON-RPC + REST over reqwest                │
//! │  • InMemoryCatalog: DashMap store for tests and demos       │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use catalog_query::{
//!     AttributeMetadata, CatalogClient, CatalogConfig, InMemoryCatalog, PredicateNode,
//!     PrimitiveType, QuerySettings,
//! };
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), catalog_query::CatalogError> {
//!     let catalog = Arc::new(
//!         InMemoryCatalog::new()
//!             .with_attribute_group(
//!                 "resource",
//!                 vec![AttributeMetadata::new("point-of-contact", PrimitiveType::String)],
//!             )
//!             .with_metacard(json!({"id": "1", "point-of-contact": "Jane"})),
//!     );
//!     let client = CatalogClient::with_catalog(catalog, CatalogConfig::default())?;
//!     client.refresh_schema().await?;
//!
//!     let result = client
//!         .query(PredicateNode::eq("point-of-contact", "Jane"), &QuerySettings::new())
//!         .await?;
//!     assert_eq!(result.records[0].get("point_of_contact"), Some(&json!("Jane")));
//!     Ok(())
//! }
//! ```
//!
//! ## Modules
//!
//! - [`filter`]: Predicate trees and their compilation to CQL
//! - [`schema`]: Identifier mapping, type projection, versioned snapshots
//! - [`query`]: Request assembly and response shaping
//! - [`backend`]: Catalog transports (HTTP, in-memory)
//! - [`client`]: The [`CatalogClient`] tying it together

pub mod backend;
pub mod client;
pub mod config;
pub mod filter;
pub mod metrics;
pub mod query;
pub mod schema;

pub use backend::{
    CatalogBackend, CatalogError, HttpCatalog, InMemoryCatalog, MetadataSource, SourceInfo,
};
pub use client::CatalogClient;
pub use config::CatalogConfig;
pub use filter::{CqlCompiler, FilterValue, PredicateBuilder, PredicateNode};
pub use metrics::LatencyTimer;
pub use query::{
    QueryAssembler, QueryFilter, QueryResult, QuerySettings, ResultRecord, ResultShaper,
    SortDirection,
};
pub use schema::{
    AttributeMetadata, IdentifierMap, PrimitiveType, SchemaDescriptor, SchemaRegistry,
    TypeProjector,
};
