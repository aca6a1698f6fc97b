// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Versioned schema snapshots.
//!
//! The registry publishes immutable [`SchemaSnapshot`]s over a watch channel.
//! A refresh builds a whole new snapshot and swaps it in; readers holding the
//! previous `Arc` keep a consistent view until they drop it.
//!
//! # Refresh
//!
//! ```text
//! attribute_groups()                       (fatal on failure)
//!       │
//!       ├─→ enumeration_config()           ┐
//!       ├─→ group_enumerations("a")        │ concurrent,
//!       ├─→ group_enumerations("b")        │ each may fail alone
//!       └─→ ...                            ┘
//!       │
//!       ▼
//! merge enums by attribute id (group order, last writer wins)
//! merge group attributes by id, then attach enums
//!       │
//!       ▼
//! builtins ++ merged attributes → SchemaDescriptor::build → publish(version + 1)
//! ```

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use futures::future::join_all;
use parking_lot::Mutex;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::attribute::{builtin_attributes, AttributeMetadata, Enumerations};
use super::projector::SchemaDescriptor;
use crate::backend::{CatalogError, MetadataSource};
use crate::metrics;

/// Group label used when the global enumeration config fails to load
pub const GLOBAL_ENUMERATIONS: &str = "<config>";

/// One published schema.
#[derive(Debug)]
pub struct SchemaSnapshot {
    /// Monotonic; 0 is the builtin-only schema
    pub version: u64,
    pub descriptor: SchemaDescriptor,
    pub built_at: Instant,
}

/// Outcome of a metadata refresh.
#[derive(Debug)]
pub struct RefreshReport {
    pub version: u64,
    pub attribute_count: usize,
    /// Attributes that ended up with a non-empty enumeration
    pub enumerated_attributes: usize,
    /// Enumeration fetches that failed; the refresh carried on without them
    pub failures: Vec<CatalogError>,
}

impl RefreshReport {
    /// Whether every enumeration group loaded
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Holder of the current schema snapshot.
pub struct SchemaRegistry {
    tx: watch::Sender<Arc<SchemaSnapshot>>,
    publish_lock: Mutex<()>,
}

impl SchemaRegistry {
    /// Create a registry holding the builtin-only schema (version 0).
    pub fn new() -> Result<Self, CatalogError> {
        let snapshot = SchemaSnapshot {
            version: 0,
            descriptor: SchemaDescriptor::build(builtin_attributes())?,
            built_at: Instant::now(),
        };
        let (tx, _rx) = watch::channel(Arc::new(snapshot));
        Ok(Self {
            tx,
            publish_lock: Mutex::new(()),
        })
    }

    /// Current snapshot
    #[must_use]
    pub fn current(&self) -> Arc<SchemaSnapshot> {
        self.tx.borrow().clone()
    }

    #[must_use]
    pub fn version(&self) -> u64 {
        self.tx.borrow().version
    }

    /// Receiver notified whenever a new snapshot is published
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Arc<SchemaSnapshot>> {
        self.tx.subscribe()
    }

    /// Build a snapshot from backend-reported attributes (builtins are added
    /// in front) and publish it.
    ///
    /// On error the current snapshot stays in place.
    pub fn publish(&self, attributes: Vec<AttributeMetadata>) -> Result<Arc<SchemaSnapshot>, CatalogError> {
        let mut all = builtin_attributes();
        all.extend(attributes);
        let descriptor = SchemaDescriptor::build(all)?;

        // Version read and swap happen under one lock so concurrent
        // publishers never reuse a number.
        let _guard = self.publish_lock.lock();
        let snapshot = Arc::new(SchemaSnapshot {
            version: self.version() + 1,
            descriptor,
            built_at: Instant::now(),
        });
        self.tx.send_replace(snapshot.clone());

        metrics::set_schema_version(snapshot.version);
        metrics::set_schema_attributes(snapshot.descriptor.attributes().len());
        Ok(snapshot)
    }

    /// Reload attribute metadata and enumerations and publish a new snapshot.
    pub async fn refresh(&self, source: &dyn MetadataSource) -> Result<RefreshReport, CatalogError> {
        let groups = match source.attribute_groups().await {
            Ok(groups) => groups,
            Err(e) => {
                metrics::record_schema_refresh("error");
                return Err(e);
            }
        };
        debug!(groups = groups.len(), "Loaded metacard type groups");

        let (global, per_group) = tokio::join!(
            source.enumeration_config(),
            join_all(groups.keys().map(|group| async move {
                (group.clone(), source.group_enumerations(group).await)
            })),
        );

        let mut failures = Vec::new();
        let mut enums: Enumerations = BTreeMap::new();
        let mut absorb = |group: String, result: Result<Enumerations, CatalogError>| match result {
            Ok(values) => enums.extend(values),
            Err(e) => {
                warn!(group = %group, error = %e, "Enumeration fetch failed, continuing without it");
                metrics::record_enumeration_failure(&group);
                failures.push(CatalogError::PartialMetadataFailure {
                    group,
                    reason: e.to_string(),
                });
            }
        };
        absorb(GLOBAL_ENUMERATIONS.to_string(), global);
        for (group, result) in per_group {
            absorb(group, result);
        }

        // Attributes shared by several groups collapse to one record; the
        // last group to define an id wins.
        let mut merged: BTreeMap<String, AttributeMetadata> = BTreeMap::new();
        for attr in groups.into_values().flat_map(BTreeMap::into_values) {
            merged.insert(attr.id.clone(), attr);
        }

        let mut enumerated = 0;
        for attr in merged.values_mut() {
            if let Some(values) = enums.get(&attr.id) {
                attr.enumerated_values = values.clone();
            }
            if !attr.enumerated_values.is_empty() {
                enumerated += 1;
            }
        }
        let unmatched = enums.keys().filter(|id| !merged.contains_key(*id)).count();
        if unmatched > 0 {
            debug!(unmatched, "Enumerations for unknown attributes ignored");
        }
        let attributes: Vec<AttributeMetadata> = merged.into_values().collect();

        let snapshot = match self.publish(attributes) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                metrics::record_schema_refresh("error");
                return Err(e);
            }
        };
        metrics::record_schema_refresh(if failures.is_empty() { "success" } else { "partial" });
        info!(
            version = snapshot.version,
            attributes = snapshot.descriptor.attributes().len(),
            enumerated,
            failed_groups = failures.len(),
            "Schema refreshed"
        );

        Ok(RefreshReport {
            version: snapshot.version,
            attribute_count: snapshot.descriptor.attributes().len(),
            enumerated_attributes: enumerated,
            failures,
        })
    }
}
