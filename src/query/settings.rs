// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Per-request query settings.
//!
//! Field names on the wire follow the catalog's query request (`src`,
//! `federation`, `count`, `start`, `type`, ...). They are passed through to
//! the backend untouched.

use serde::{Deserialize, Serialize};

use crate::backend::CatalogError;

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Ascending,
    Desc,
    Descending,
}

/// One sort key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    pub attribute: String,
    pub direction: SortDirection,
}

/// Pagination, sorting, federation and faceting options for a query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuerySettings {
    /// Source to query; all sources when unset
    #[serde(rename = "src", skip_serializing_if = "Option::is_none")]
    pub source_id: Option<String>,
    #[serde(rename = "federation", skip_serializing_if = "Option::is_none")]
    pub federation_strategy: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phonetics: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spellcheck: Option<bool>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sorts: Vec<SortSpec>,
    /// Page size; 0 returns status and facets only
    #[serde(rename = "count", skip_serializing_if = "Option::is_none")]
    pub page_size: Option<i64>,
    /// Start of paging. First element is 1, not 0.
    #[serde(rename = "start", skip_serializing_if = "Option::is_none")]
    pub page_start: Option<i64>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub result_type: Option<String>,
    /// Attributes to facet on
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub facets: Vec<String>,
}

impl QuerySettings {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_source(mut self, source_id: impl Into<String>) -> Self {
        self.source_id = Some(source_id.into());
        self
    }

    #[must_use]
    pub fn with_federation(mut self, strategy: impl Into<String>) -> Self {
        self.federation_strategy = Some(strategy.into());
        self
    }

    #[must_use]
    pub fn with_page_size(mut self, size: i64) -> Self {
        self.page_size = Some(size);
        self
    }

    #[must_use]
    pub fn with_page_start(mut self, start: i64) -> Self {
        self.page_start = Some(start);
        self
    }

    #[must_use]
    pub fn sort_by(mut self, attribute: impl Into<String>, direction: SortDirection) -> Self {
        self.sorts.push(SortSpec {
            attribute: attribute.into(),
            direction,
        });
        self
    }

    #[must_use]
    pub fn with_facet(mut self, attribute: impl Into<String>) -> Self {
        self.facets.push(attribute.into());
        self
    }

    /// Check pagination bounds.
    pub fn validate(&self) -> Result<(), CatalogError> {
        if let Some(start) = self.page_start {
            if start < 1 {
                return Err(CatalogError::InvalidSettings(format!(
                    "start is 1-based, got {start}"
                )));
            }
        }
        if let Some(size) = self.page_size {
            if size < 0 {
                return Err(CatalogError::InvalidSettings(format!(
                    "count must not be negative, got {size}"
                )));
            }
        }
        Ok(())
    }

    /// Whether the request asks for status and facets only
    #[must_use]
    pub fn is_facet_only(&self) -> bool {
        self.page_size == Some(0)
    }
}
