// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! HTTP transport for a live catalog.
//!
//! # Wire
//!
//! ```text
//! POST {base}{rpc_path}                 JSON-RPC 2.0
//!   ddf.catalog/query          params = BackendQuery
//!   ddf.catalog/create         params = {"metacards": [...]}
//!   ddf.catalog/delete         params = {"ids": [...]}
//!   ddf.catalog/getSourceIds   params = {}
//!   ddf.catalog/getSourceInfo  params = {"ids": [...]}   → {"sourceInfo": [...]}
//!
//! PATCH {base}{root}/metacards          body = [MetacardUpdate]
//!
//! GET {base}{root}/metacardtype                         → AttributeGroups
//! GET {base}{root}/config                               → {"enums": {...}, ...}
//! GET {base}{root}/enumerations/metacardtype/{group}    → Enumerations
//! GET {base}{root}/localcatalogid                       → {"local-catalog-id": "..."}
//! ```

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use reqwest::Url;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::{debug, warn};

use super::traits::{CatalogBackend, CatalogError, MetacardUpdate, MetadataSource, SourceInfo};
use crate::config::CatalogConfig;
use crate::query::BackendQuery;
use crate::schema::{AttributeGroups, Enumerations};

const METHOD_QUERY: &str = "ddf.catalog/query";
const METHOD_CREATE: &str = "ddf.catalog/create";
const METHOD_DELETE: &str = "ddf.catalog/delete";
const METHOD_SOURCE_IDS: &str = "ddf.catalog/getSourceIds";
const METHOD_SOURCE_INFO: &str = "ddf.catalog/getSourceInfo";

pub struct HttpCatalog {
    client: reqwest::Client,
    config: CatalogConfig,
    next_id: AtomicU64,
}

impl HttpCatalog {
    pub fn new(config: CatalogConfig) -> Result<Self, CatalogError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .build()
            .map_err(|e| CatalogError::BackendRequestFailed(format!("cannot build HTTP client: {e}")))?;

        debug!(base_url = %config.base_url, "Catalog HTTP transport ready");
        Ok(Self {
            client,
            config,
            next_id: AtomicU64::new(1),
        })
    }

    #[must_use]
    pub fn config(&self) -> &CatalogConfig {
        &self.config
    }

    fn rpc_request(id: u64, method: &str, params: Value) -> Value {
        json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        })
    }

    /// Pull `result` out of a JSON-RPC reply, turning `error` into a failure
    fn rpc_result(method: &str, reply: Value) -> Result<Value, CatalogError> {
        if let Some(error) = reply.get("error").filter(|e| !e.is_null()) {
            let message = error
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("unknown error");
            let code = error.get("code").and_then(Value::as_i64).unwrap_or_default();
            return Err(CatalogError::BackendRequestFailed(format!(
                "{method} failed ({code}): {message}"
            )));
        }
        reply
            .get("result")
            .cloned()
            .ok_or_else(|| CatalogError::BackendRequestFailed(format!("{method} reply has no result")))
    }

    async fn rpc(&self, method: &str, params: Value) -> Result<Value, CatalogError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        debug!(method, id, "Catalog RPC");

        let response = self
            .client
            .post(self.config.rpc_url())
            .json(&Self::rpc_request(id, method, params))
            .send()
            .await
            .map_err(|e| transport(method, e))?;

        let status = response.status();
        if !status.is_success() {
            warn!(method, %status, "Catalog RPC rejected");
            return Err(CatalogError::BackendRequestFailed(format!("{method}: HTTP {status}")));
        }
        let reply: Value = response.json().await.map_err(|e| transport(method, e))?;
        Self::rpc_result(method, reply)
    }

    /// Metadata endpoint under the API root, each segment percent-encoded
    fn metadata_url(&self, segments: &[&str]) -> Result<Url, CatalogError> {
        let root = self.config.endpoint("");
        let mut url = Url::parse(&root)
            .map_err(|e| CatalogError::BackendRequestFailed(format!("bad catalog url {root}: {e}")))?;
        url.path_segments_mut()
            .map_err(|()| CatalogError::BackendRequestFailed(format!("catalog url {root} cannot take a path")))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T, CatalogError> {
        let url = self.metadata_url(segments)?;
        let path = url.path().to_string();
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| transport(&path, e))?;

        let status = response.status();
        if !status.is_success() {
            warn!(url = %url, %status, "Catalog metadata request rejected");
            return Err(CatalogError::BackendRequestFailed(format!("GET {path}: HTTP {status}")));
        }
        response.json::<T>().await.map_err(|e| transport(&path, e))
    }
}

fn transport(what: &str, e: reqwest::Error) -> CatalogError {
    warn!(request = what, error = %e, "Catalog request failed");
    CatalogError::BackendRequestFailed(format!("{what}: {e}"))
}

#[async_trait]
impl CatalogBackend for HttpCatalog {
    async fn query(&self, query: &BackendQuery) -> Result<Value, CatalogError> {
        self.rpc(METHOD_QUERY, serde_json::to_value(query)?).await
    }

    async fn create(&self, request: Value) -> Result<Value, CatalogError> {
        self.rpc(METHOD_CREATE, request).await
    }

    async fn update(&self, updates: &[MetacardUpdate]) -> Result<(), CatalogError> {
        let url = self.config.endpoint("/metacards");
        let response = self
            .client
            .patch(&url)
            .json(updates)
            .send()
            .await
            .map_err(|e| transport("PATCH /metacards", e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(CatalogError::BackendRequestFailed(format!(
                "PATCH /metacards: HTTP {status}"
            )));
        }
        Ok(())
    }

    async fn delete(&self, ids: &[String]) -> Result<(), CatalogError> {
        self.rpc(METHOD_DELETE, json!({ "ids": ids })).await.map(|_| ())
    }

    async fn source_ids(&self) -> Result<Vec<String>, CatalogError> {
        let result = self.rpc(METHOD_SOURCE_IDS, json!({})).await?;
        Ok(serde_json::from_value(result)?)
    }

    async fn source_info(&self, ids: &[String]) -> Result<Vec<SourceInfo>, CatalogError> {
        let mut result = self.rpc(METHOD_SOURCE_INFO, json!({ "ids": ids })).await?;
        let info = result
            .get_mut("sourceInfo")
            .map(Value::take)
            .ok_or_else(|| CatalogError::BackendRequestFailed("getSourceInfo reply has no sourceInfo".into()))?;
        Ok(serde_json::from_value(info)?)
    }
}

#[async_trait]
impl MetadataSource for HttpCatalog {
    async fn attribute_groups(&self) -> Result<AttributeGroups, CatalogError> {
        self.get_json(&["metacardtype"]).await
    }

    async fn enumeration_config(&self) -> Result<Enumerations, CatalogError> {
        let config: Value = self.get_json(&["config"]).await?;
        match config.get("enums") {
            Some(enums) if !enums.is_null() => Ok(serde_json::from_value(enums.clone())?),
            _ => Ok(Enumerations::new()),
        }
    }

    async fn group_enumerations(&self, group: &str) -> Result<Enumerations, CatalogError> {
        self.get_json(&["enumerations", "metacardtype", group]).await
    }

    async fn local_catalog_id(&self) -> Result<String, CatalogError> {
        let reply: Value = self.get_json(&["localcatalogid"]).await?;
        reply
            .get("local-catalog-id")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| CatalogError::BackendRequestFailed("localcatalogid reply has no local-catalog-id".into()))
    }
}
