// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Query assembly and result shaping.
//!
//! ```text
//! QueryFilter + QuerySettings ──QueryAssembler──▶ BackendQuery ──▶ backend
//!                                                                   │
//! QueryResult ◀──ResultShaper (IdentifierMap)── raw JSON response ◀─┘
//! ```

mod assembler;
mod settings;
mod shaper;

pub use assembler::{BackendQuery, QueryAssembler, QueryFilter};
pub use settings::{QuerySettings, SortDirection, SortSpec};
pub use shaper::{
    FacetBucket, MetacardAction, QueryResult, QueryStatus, RelatedQuery, ResultRecord,
    ResultShaper,
};
