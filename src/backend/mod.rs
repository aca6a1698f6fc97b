// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Catalog backends.
//!
//! - [`HttpCatalog`]: live catalog over JSON-RPC and REST
//! - [`InMemoryCatalog`]: in-process catalog for tests and demos

pub mod http;
pub mod memory;
pub mod traits;

pub use http::HttpCatalog;
pub use memory::InMemoryCatalog;
pub use traits::{
    AttributeUpdate, CatalogBackend, CatalogError, MetacardUpdate, MetadataSource, SourceInfo,
};
