// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Query Assembler
//!
//! Merges a compiled filter with the request settings into the body of the
//! catalog's query operation:
//!
//! ```text
//! {
//!   "cql": "(( id = 'x' AND metacard-tags LIKE '%' ))",
//!   "src": "...", "count": 25, "start": 1, "sorts": [...], ...
//! }
//! ```

use serde::{Deserialize, Serialize};

use super::settings::QuerySettings;
use crate::backend::CatalogError;
use crate::filter::{CqlCompiler, PredicateNode};

/// What to filter on
#[derive(Debug, Clone, PartialEq)]
pub enum QueryFilter {
    /// Predicate tree, compiled on assembly
    Tree(PredicateNode),
    /// Caller-supplied CQL, sent as-is
    Cql(String),
}

impl From<PredicateNode> for QueryFilter {
    fn from(node: PredicateNode) -> Self {
        Self::Tree(node)
    }
}

/// Request body for the backend query operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackendQuery {
    pub cql: String,
    #[serde(flatten)]
    pub settings: QuerySettings,
}

pub struct QueryAssembler;

impl QueryAssembler {
    /// Assemble a backend query.
    ///
    /// Trees are compiled and wrapped in one outer pair of parentheses.
    pub fn assemble(filter: &QueryFilter, settings: &QuerySettings) -> Result<BackendQuery, CatalogError> {
        settings.validate()?;

        let cql = match filter {
            QueryFilter::Tree(node) => format!("({})", CqlCompiler::compile(node)?),
            QueryFilter::Cql(cql) if cql.trim().is_empty() => {
                return Err(CatalogError::InvalidPredicate("empty CQL".into()));
            }
            QueryFilter::Cql(cql) => cql.clone(),
        };

        Ok(BackendQuery {
            cql,
            settings: settings.clone(),
        })
    }
}
