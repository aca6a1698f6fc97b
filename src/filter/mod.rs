// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Filter predicates and their compilation to CQL.
//!
//! # Architecture
//!
//! ```text
//! JSON filter tree ──from_json──▶ PredicateNode (AST)
//!                                      │
//!                                      ▼
//!                                 CqlCompiler → "( id = 'x' AND metacard-tags LIKE '%' )"
//! ```
//!
//! Compilation is deterministic: the same tree always yields the same string,
//! so compiled queries double as cache and log keys.

mod compiler;
mod predicate;

pub use compiler::CqlCompiler;
pub use predicate::{
    CombinatorKind, Comparison, ComparisonOperator, FilterValue, PredicateBuilder, PredicateNode,
};
