// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Configuration for the catalog client.
//!
//! # Example
//!
//! ```
//! use catalog_query::CatalogConfig;
//!
//! // Minimal config (uses defaults)
//! let config = CatalogConfig::default();
//! assert_eq!(config.api_root, "/search/catalog/internal");
//!
//! // Full config
//! let config = CatalogConfig {
//!     base_url: "https://catalog.example.org:8993".into(),
//!     request_timeout_ms: 10_000,
//!     default_page_size: Some(50),
//!     ..Default::default()
//! };
//! assert_eq!(config.rpc_url(), "https://catalog.example.org:8993/direct");
//! ```

use std::time::Duration;

use serde::Deserialize;

/// Configuration for talking to a catalog.
///
/// All fields have defaults. Production deployments set at least `base_url`.
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogConfig {
    /// Scheme, host and port of the catalog (e.g. "https://localhost:8993")
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Path prefix of the catalog's REST endpoints
    #[serde(default = "default_api_root")]
    pub api_root: String,

    /// Path of the JSON-RPC endpoint
    #[serde(default = "default_rpc_path")]
    pub rpc_path: String,

    /// Per-request timeout
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,

    /// Accept self-signed certificates (development deployments)
    #[serde(default)]
    pub accept_invalid_certs: bool,

    /// Page size applied when a query leaves `count` unset
    #[serde(default)]
    pub default_page_size: Option<i64>,
}

fn default_base_url() -> String { "https://localhost:8993".to_string() }
fn default_api_root() -> String { "/search/catalog/internal".to_string() }
fn default_rpc_path() -> String { "/direct".to_string() }
fn default_request_timeout_ms() -> u64 { 30_000 }

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_root: default_api_root(),
            rpc_path: default_rpc_path(),
            request_timeout_ms: default_request_timeout_ms(),
            accept_invalid_certs: false,
            default_page_size: None,
        }
    }
}

impl CatalogConfig {
    /// `{base_url}{api_root}{path}`
    #[must_use]
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}{}", self.base_url.trim_end_matches('/'), self.api_root, path)
    }

    #[must_use]
    pub fn rpc_url(&self) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), self.rpc_path)
    }

    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}
