// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Attribute metadata as reported by the catalog's metacard-type endpoint.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Full-text catch-all pseudo-attribute
pub const ANY_TEXT: &str = "anyText";
/// Generic geometry pseudo-attribute
pub const ANY_GEO: &str = "anyGeo";
pub const METACARD_TYPE: &str = "metacard-type";
pub const SOURCE_ID: &str = "source-id";
pub const CACHED: &str = "cached";
pub const METACARD_TAGS: &str = "metacard-tags";
pub const ID: &str = "id";
pub const METACARD_MODIFIED: &str = "metacard.modified";
/// Property holding the ids of records a record refers to
pub const QUERIES: &str = "queries";
/// Property holding a stored predicate tree as a JSON string
pub const FILTER_TREE: &str = "filterTree";

/// Attribute definitions keyed by group, then by attribute id.
pub type AttributeGroups = BTreeMap<String, BTreeMap<String, AttributeMetadata>>;

/// Enumerated values keyed by attribute id.
pub type Enumerations = BTreeMap<String, Vec<String>>;

/// Primitive type of a catalog attribute.
///
/// Raw types the projector has no mapping for are kept verbatim in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PrimitiveType {
    String,
    Double,
    Integer,
    Long,
    Boolean,
    Binary,
    Geometry,
    Xml,
    Date,
    Json,
    Other(String),
}

impl PrimitiveType {
    /// Raw type name as the backend spells it
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::String => "STRING",
            Self::Double => "DOUBLE",
            Self::Integer => "INTEGER",
            Self::Long => "LONG",
            Self::Boolean => "BOOLEAN",
            Self::Binary => "BINARY",
            Self::Geometry => "GEOMETRY",
            Self::Xml => "XML",
            Self::Date => "DATE",
            Self::Json => "JSON",
            Self::Other(raw) => raw,
        }
    }
}

impl From<String> for PrimitiveType {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "STRING" => Self::String,
            "DOUBLE" => Self::Double,
            "INTEGER" => Self::Integer,
            "LONG" => Self::Long,
            "BOOLEAN" => Self::Boolean,
            "BINARY" => Self::Binary,
            "GEOMETRY" => Self::Geometry,
            "XML" => Self::Xml,
            "DATE" => Self::Date,
            "JSON" => Self::Json,
            _ => Self::Other(raw),
        }
    }
}

impl From<&str> for PrimitiveType {
    fn from(raw: &str) -> Self {
        Self::from(raw.to_string())
    }
}

impl From<PrimitiveType> for String {
    fn from(ty: PrimitiveType) -> Self {
        match ty {
            PrimitiveType::Other(raw) => raw,
            other => other.as_str().to_string(),
        }
    }
}

impl std::fmt::Display for PrimitiveType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Metadata describing one catalog attribute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeMetadata {
    /// Raw backend id, may contain `-` or `.`
    pub id: String,
    #[serde(rename = "type")]
    pub primitive_type: PrimitiveType,
    #[serde(default)]
    pub multivalued: bool,
    #[serde(default, rename = "isInjected")]
    pub injected: bool,
    #[serde(default, rename = "enums")]
    pub enumerated_values: Vec<String>,
}

impl AttributeMetadata {
    /// Create a single-valued, non-injected attribute with no enumerations
    pub fn new(id: impl Into<String>, primitive_type: impl Into<PrimitiveType>) -> Self {
        Self {
            id: id.into(),
            primitive_type: primitive_type.into(),
            multivalued: false,
            injected: false,
            enumerated_values: Vec::new(),
        }
    }

    /// Mark as multivalued
    #[must_use]
    pub fn multivalued(mut self) -> Self {
        self.multivalued = true;
        self
    }

    /// Mark as injected
    #[must_use]
    pub fn injected(mut self) -> Self {
        self.injected = true;
        self
    }

    /// Attach enumerated values
    #[must_use]
    pub fn with_enumeration(mut self, values: Vec<String>) -> Self {
        self.enumerated_values = values;
        self
    }
}

/// Pseudo-attributes every schema carries ahead of backend-reported ones.
#[must_use]
pub fn builtin_attributes() -> Vec<AttributeMetadata> {
    vec![
        AttributeMetadata::new(ANY_TEXT, PrimitiveType::String),
        AttributeMetadata::new(ANY_GEO, "LOCATION"),
        AttributeMetadata::new(METACARD_TYPE, PrimitiveType::String),
        AttributeMetadata::new(SOURCE_ID, PrimitiveType::String),
        AttributeMetadata::new(CACHED, PrimitiveType::String),
        AttributeMetadata::new(METACARD_TAGS, PrimitiveType::String).multivalued(),
    ]
}
