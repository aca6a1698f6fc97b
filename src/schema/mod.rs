// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Attribute schema: identifiers, type projection and versioned snapshots.
//!
//! Catalog attribute ids such as `point-of-contact` or `metacard.modified`
//! are not usable as schema field names. This module maps them onto safe
//! names, projects the attribute metadata onto typed read/write shapes, and
//! publishes the result as immutable snapshots.
//!
//! # Example
//!
//! ```
//! use catalog_query::schema::{AttributeMetadata, PrimitiveType, SchemaRegistry};
//!
//! let registry = SchemaRegistry::new().unwrap();
//! let snapshot = registry
//!     .publish(vec![AttributeMetadata::new("point-of-contact", PrimitiveType::String)])
//!     .unwrap();
//!
//! let ids = snapshot.descriptor.identifiers();
//! assert_eq!(ids.to_raw("point_of_contact"), "point-of-contact");
//! assert_eq!(ids.to_raw("no_such_field"), "no_such_field");
//! ```

mod attribute;
mod identifier;
mod projector;
mod registry;

pub use attribute::{
    builtin_attributes, AttributeGroups, AttributeMetadata, Enumerations, PrimitiveType, ANY_GEO,
    ANY_TEXT, CACHED, FILTER_TREE, ID, METACARD_MODIFIED, METACARD_TAGS, METACARD_TYPE, QUERIES,
    SOURCE_ID,
};
pub use identifier::{to_safe, IdentifierMap};
pub use projector::{
    FieldType, ObjectShape, ScalarType, SchemaDescriptor, SchemaField, ShapeKind, TypeProjector,
    TypeRef, READ_SHAPE, WRITE_SHAPE,
};
pub use registry::{RefreshReport, SchemaRegistry, SchemaSnapshot, GLOBAL_ENUMERATIONS};
