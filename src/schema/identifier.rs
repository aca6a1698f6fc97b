// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Identifier mapping between raw attribute ids and schema-safe field names.
//!
//! ```text
//! point-of-contact  ──to_safe──▶  point_of_contact
//! metacard.modified ──to_safe──▶  metacard_modified
//!
//! point_of_contact  ──to_raw───▶  point-of-contact   (known attribute)
//! made_up_field     ──to_raw───▶  made_up_field      (identity fallback)
//! ```

use std::collections::HashMap;

use serde_json::{Map, Value};

use crate::backend::CatalogError;

/// Schema-safe form of a raw attribute id: every `-` and `.` becomes `_`.
#[must_use]
pub fn to_safe(raw: &str) -> String {
    raw.replace(['-', '.'], "_")
}

/// Reverse lookup table from safe field names to raw attribute ids.
///
/// Built once per schema snapshot. Lookups for names that no known attribute
/// produces fall back to the name itself.
#[derive(Debug, Clone, Default)]
pub struct IdentifierMap {
    reverse: HashMap<String, String>,
}

impl IdentifierMap {
    /// Build from the known raw ids.
    ///
    /// Fails if two distinct raw ids collapse to the same safe name; repeated
    /// occurrences of one raw id are fine.
    pub fn from_ids<'a, I>(ids: I) -> Result<Self, CatalogError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut reverse: HashMap<String, String> = HashMap::new();
        for raw in ids {
            let safe = to_safe(raw);
            match reverse.get(&safe) {
                Some(existing) if existing != raw => {
                    return Err(CatalogError::IdentifierCollision {
                        safe_id: safe,
                        first: existing.clone(),
                        second: raw.to_string(),
                    });
                }
                Some(_) => {}
                None => {
                    reverse.insert(safe, raw.to_string());
                }
            }
        }
        Ok(Self { reverse })
    }

    /// Raw id for a safe name, or the name itself when unknown.
    #[must_use]
    pub fn to_raw<'a>(&'a self, safe: &'a str) -> &'a str {
        self.reverse.get(safe).map_or(safe, String::as_str)
    }

    /// Whether `safe` is produced by a known attribute
    #[must_use]
    pub fn is_known(&self, safe: &str) -> bool {
        self.reverse.contains_key(safe)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.reverse.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.reverse.is_empty()
    }

    /// Rename every key of a raw property bag to its safe form.
    #[must_use]
    pub fn rename_to_safe(properties: Map<String, Value>) -> Map<String, Value> {
        properties
            .into_iter()
            .map(|(key, value)| (to_safe(&key), value))
            .collect()
    }

    /// Rename every key of a schema-shaped map back to raw ids.
    #[must_use]
    pub fn rename_to_raw(&self, attributes: Map<String, Value>) -> Map<String, Value> {
        attributes
            .into_iter()
            .map(|(key, value)| (self.to_raw(&key).to_string(), value))
            .collect()
    }
}
