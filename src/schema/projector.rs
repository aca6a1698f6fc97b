// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Type Projector
//!
//! Projects attribute metadata onto a typed schema with two shapes:
//!
//! ```text
//! type MetacardAttributes {          input MetacardAttributesInput {
//!   # metacard attribute: **`point-of-contact`**
//!   point_of_contact: String           point_of_contact: String
//!   anyGeo: LOCATION                   anyGeo: LOCATIONInput
//!   metacard_tags: [String]            metacard_tags: [String]
//! }                                  }
//! ```
//!
//! | Raw type         | Schema type |
//! |------------------|-------------|
//! | STRING           | String      |
//! | DOUBLE           | Float       |
//! | INTEGER, LONG    | Int         |
//! | BOOLEAN          | Boolean     |
//! | BINARY           | Binary      |
//! | GEOMETRY         | Geometry    |
//! | XML              | XML         |
//! | DATE             | Date        |
//! | JSON             | Json        |
//! | anything else    | nominal     |

use std::collections::BTreeSet;
use std::fmt::{self, Write as _};

use serde::Serialize;

use super::attribute::{AttributeMetadata, PrimitiveType};
use super::identifier::{to_safe, IdentifierMap};
use crate::backend::CatalogError;

/// Name of the read (output) shape
pub const READ_SHAPE: &str = "MetacardAttributes";
/// Name of the write (input) shape
pub const WRITE_SHAPE: &str = "MetacardAttributesInput";

/// Built-in schema scalars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ScalarType {
    String,
    Float,
    Int,
    Boolean,
    Binary,
    Geometry,
    Xml,
    Date,
    Json,
}

impl ScalarType {
    pub const ALL: [Self; 9] = [
        Self::String,
        Self::Float,
        Self::Int,
        Self::Boolean,
        Self::Binary,
        Self::Geometry,
        Self::Xml,
        Self::Date,
        Self::Json,
    ];

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::String => "String",
            Self::Float => "Float",
            Self::Int => "Int",
            Self::Boolean => "Boolean",
            Self::Binary => "Binary",
            Self::Geometry => "Geometry",
            Self::Xml => "XML",
            Self::Date => "Date",
            Self::Json => "Json",
        }
    }

    /// Scalar for a primitive type, `None` if it has no mapping
    #[must_use]
    pub fn for_primitive(ty: &PrimitiveType) -> Option<Self> {
        match ty {
            PrimitiveType::String => Some(Self::String),
            PrimitiveType::Double => Some(Self::Float),
            PrimitiveType::Integer | PrimitiveType::Long => Some(Self::Int),
            PrimitiveType::Boolean => Some(Self::Boolean),
            PrimitiveType::Binary => Some(Self::Binary),
            PrimitiveType::Geometry => Some(Self::Geometry),
            PrimitiveType::Xml => Some(Self::Xml),
            PrimitiveType::Date => Some(Self::Date),
            PrimitiveType::Json => Some(Self::Json),
            PrimitiveType::Other(_) => None,
        }
    }

    fn is_reserved(name: &str) -> bool {
        Self::ALL.iter().any(|s| s.name() == name)
    }
}

/// Which side of the schema a shape describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ShapeKind {
    Read,
    Write,
}

/// Base type of a field.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum TypeRef {
    Scalar(ScalarType),
    /// Type named after an unmapped raw type
    Nominal(String),
}

impl TypeRef {
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Scalar(s) => s.name(),
            Self::Nominal(n) => n,
        }
    }
}

/// Field type, possibly wrapped as a list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldType {
    pub base: TypeRef,
    pub list: bool,
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.list {
            write!(f, "[{}]", self.base.name())
        } else {
            f.write_str(self.base.name())
        }
    }
}

/// One projected field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SchemaField {
    /// Safe field name
    pub name: String,
    /// Raw attribute id the field is backed by
    pub raw_id: String,
    pub field_type: FieldType,
    pub enumerated_values: Vec<String>,
}

/// An object shape: one field per attribute.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ObjectShape {
    pub name: &'static str,
    pub kind: ShapeKind,
    pub fields: Vec<SchemaField>,
}

impl ObjectShape {
    /// Look up a field by safe name
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&SchemaField> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// Pure projection of attribute metadata onto read and write shapes.
pub struct TypeProjector;

impl TypeProjector {
    /// Project one shape.
    #[must_use]
    pub fn project(attributes: &[AttributeMetadata], kind: ShapeKind) -> ObjectShape {
        let fields = attributes
            .iter()
            .map(|attr| SchemaField {
                name: to_safe(&attr.id),
                raw_id: attr.id.clone(),
                field_type: FieldType {
                    base: Self::type_ref(&attr.primitive_type, kind),
                    list: attr.multivalued,
                },
                enumerated_values: attr.enumerated_values.clone(),
            })
            .collect();

        ObjectShape {
            name: match kind {
                ShapeKind::Read => READ_SHAPE,
                ShapeKind::Write => WRITE_SHAPE,
            },
            kind,
            fields,
        }
    }

    /// Base type for a primitive type on the given shape.
    #[must_use]
    pub fn type_ref(ty: &PrimitiveType, kind: ShapeKind) -> TypeRef {
        match ScalarType::for_primitive(ty) {
            Some(scalar) => TypeRef::Scalar(scalar),
            None => TypeRef::Nominal(Self::nominal_name(ty.as_str(), kind)),
        }
    }

    /// Deterministic name for an unmapped raw type.
    ///
    /// Never equal to a built-in scalar name; write-shape names end in `Input`.
    #[must_use]
    pub fn nominal_name(raw: &str, kind: ShapeKind) -> String {
        let mut name: String = raw
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
            .collect();
        if name.is_empty() {
            name.push_str("Unknown");
        }
        if name.starts_with(|c: char| c.is_ascii_digit()) {
            name.insert(0, '_');
        }
        if ScalarType::is_reserved(&name) {
            name.push_str("Type");
        }
        if kind == ShapeKind::Write {
            name.push_str("Input");
        }
        name
    }
}

/// Immutable schema built from one metadata set.
#[derive(Debug, Clone)]
pub struct SchemaDescriptor {
    attributes: Vec<AttributeMetadata>,
    identifiers: IdentifierMap,
    read: ObjectShape,
    write: ObjectShape,
}

impl SchemaDescriptor {
    /// Validate and project a metadata set.
    ///
    /// Repeated records for the same raw id are merged: the later record
    /// replaces the earlier one but keeps its position.
    pub fn build(attributes: Vec<AttributeMetadata>) -> Result<Self, CatalogError> {
        let mut merged: Vec<AttributeMetadata> = Vec::with_capacity(attributes.len());
        for attr in attributes {
            match merged.iter_mut().find(|existing| existing.id == attr.id) {
                Some(existing) => *existing = attr,
                None => merged.push(attr),
            }
        }

        let identifiers = IdentifierMap::from_ids(merged.iter().map(|a| a.id.as_str()))?;
        let read = TypeProjector::project(&merged, ShapeKind::Read);
        let write = TypeProjector::project(&merged, ShapeKind::Write);

        Ok(Self {
            attributes: merged,
            identifiers,
            read,
            write,
        })
    }

    #[must_use]
    pub fn attributes(&self) -> &[AttributeMetadata] {
        &self.attributes
    }

    /// Metadata for a raw attribute id
    #[must_use]
    pub fn attribute(&self, raw_id: &str) -> Option<&AttributeMetadata> {
        self.attributes.iter().find(|a| a.id == raw_id)
    }

    #[must_use]
    pub fn identifiers(&self) -> &IdentifierMap {
        &self.identifiers
    }

    #[must_use]
    pub fn read_shape(&self) -> &ObjectShape {
        &self.read
    }

    #[must_use]
    pub fn write_shape(&self) -> &ObjectShape {
        &self.write
    }

    /// Render the schema as SDL text.
    #[must_use]
    pub fn to_sdl(&self) -> String {
        let mut sdl = String::from(SDL_PRELUDE);

        let nominals: BTreeSet<&str> = self
            .read
            .fields
            .iter()
            .chain(self.write.fields.iter())
            .filter_map(|f| match &f.field_type.base {
                TypeRef::Nominal(n) => Some(n.as_str()),
                TypeRef::Scalar(_) => None,
            })
            .collect();
        for name in nominals {
            let _ = writeln!(sdl, "scalar {name}");
        }

        for shape in [&self.read, &self.write] {
            let keyword = match shape.kind {
                ShapeKind::Read => "type",
                ShapeKind::Write => "input",
            };
            let _ = writeln!(sdl, "\n{keyword} {} {{", shape.name);
            for field in &shape.fields {
                let _ = writeln!(sdl, "  # metacard attribute: **`{}`**", field.raw_id);
                let _ = writeln!(sdl, "  {}: {}", field.name, field.field_type);
            }
            sdl.push_str("}\n");
        }

        sdl
    }
}

const SDL_PRELUDE: &str = r"scalar Json
# Binary content embedded as a base64 String
scalar Binary
# WKT embedded as a String
scalar Geometry
# XML embedded as a String
scalar XML
# ISO 8601 Date Time embedded as a String
scalar Date

enum Direction {
  asc
  ascending
  desc
  descending
}

input QuerySortInput {
  attribute: String
  direction: Direction
}

input QuerySettingsInput {
  src: String
  federation: String
  phonetics: Boolean
  sorts: [QuerySortInput]
  spellcheck: Boolean
  # Page size
  count: Int
  # Start of paging. First element is 1, not 0.
  start: Int
  type: String
  facets: [String]
}

type QueryResponseStatus {
  count: Int
  elapsed: Int
  hits: Int
  id: ID
  successful: Boolean
}

type MetacardAction {
  description: String
  displayName: String
  id: ID
  title: String
  url: String
}

type QueryResponseResult {
  actions: [MetacardAction]
  metacard: Json
}

type QueryResponse {
  results: [QueryResponseResult]
  attributes: [MetacardAttributes]
  status: QueryResponseStatus
}

type Query {
  metacards(filterTree: Json!, settings: QuerySettingsInput): QueryResponse
}

";
