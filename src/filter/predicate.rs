// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Predicate tree - AST for catalog filters
//!
//! Provides a type-safe way to build filters that compile to CQL, and the
//! conversion from the JSON filter-tree form callers send over the wire.
//!
//! # Example
//!
//! ```rust
//! use catalog_query::filter::{PredicateBuilder, PredicateNode};
//!
//! // Simple comparison
//! let filter = PredicateNode::eq("id", "abc-123");
//!
//! // Several constraints with AND semantics
//! let filter = PredicateBuilder::new()
//!     .eq("metacard-tags", "resource")
//!     .ilike("title", "%river%")
//!     .build_and();
//!
//! // Boolean combinations
//! let filter = PredicateNode::eq("source-id", "ddf.distribution")
//!     .or(PredicateNode::eq("source-id", "cache"));
//! ```
//!
//! # JSON form
//!
//! ```text
//! {"type": "=", "property": "id", "value": "abc-123"}
//! {"type": "AND", "filters": [ ... ]}
//! {"type": "NOT", "filter": { ... }}
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{json, Number, Value};

use crate::backend::CatalogError;
use crate::schema::{ANY_TEXT, METACARD_TAGS};

/// Predicate AST node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "Value")]
pub enum PredicateNode {
    /// `<property> <op> <value>`
    Comparison(Comparison),
    /// `( child KIND child ... )`
    Combinator {
        kind: CombinatorKind,
        children: Vec<PredicateNode>,
    },
    /// `NOT ( child )`
    Not(Box<PredicateNode>),
}

impl PredicateNode {
    /// Comparison node
    pub fn compare(
        operator: ComparisonOperator,
        property: impl Into<String>,
        value: impl Into<FilterValue>,
    ) -> Self {
        Self::Comparison(Comparison {
            operator,
            property: property.into(),
            value: value.into(),
        })
    }

    /// `property = value`
    pub fn eq(property: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        Self::compare(ComparisonOperator::Equals, property, value)
    }

    /// `property LIKE 'pattern'` (`%` is the wildcard)
    pub fn like(property: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self::compare(ComparisonOperator::Like, property, FilterValue::Text(pattern.into()))
    }

    /// `property ILIKE 'pattern'`
    pub fn ilike(property: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self::compare(ComparisonOperator::ILike, property, FilterValue::Text(pattern.into()))
    }

    /// Matches every record: `anyText ILIKE '%'`
    #[must_use]
    pub fn match_all() -> Self {
        Self::ilike(ANY_TEXT, "%")
    }

    /// Matches every record carrying any tag: `metacard-tags LIKE '%'`
    #[must_use]
    pub fn any_tag() -> Self {
        Self::like(METACARD_TAGS, "%")
    }

    /// AND over the given children
    #[must_use]
    pub fn all(children: Vec<PredicateNode>) -> Self {
        Self::Combinator {
            kind: CombinatorKind::And,
            children,
        }
    }

    /// OR over the given children
    #[must_use]
    pub fn any(children: Vec<PredicateNode>) -> Self {
        Self::Combinator {
            kind: CombinatorKind::Or,
            children,
        }
    }

    /// Combine with AND
    #[must_use]
    pub fn and(self, other: PredicateNode) -> Self {
        Self::all(vec![self, other])
    }

    /// Combine with OR
    #[must_use]
    pub fn or(self, other: PredicateNode) -> Self {
        Self::any(vec![self, other])
    }

    /// Negate
    #[must_use]
    pub fn negate(self) -> Self {
        Self::Not(Box::new(self))
    }

    /// Parse the JSON filter-tree form.
    pub fn from_json(value: &Value) -> Result<Self, CatalogError> {
        let obj = value
            .as_object()
            .ok_or_else(|| CatalogError::InvalidPredicate(format!("expected an object, got {value}")))?;
        let tag = obj
            .get("type")
            .and_then(Value::as_str)
            .ok_or_else(|| CatalogError::InvalidPredicate("missing 'type'".into()))?;

        if let Some(kind) = CombinatorKind::from_tag(tag) {
            let filters = obj
                .get("filters")
                .and_then(Value::as_array)
                .ok_or_else(|| CatalogError::InvalidPredicate(format!("'{tag}' requires a 'filters' array")))?;
            let children = filters
                .iter()
                .map(Self::from_json)
                .collect::<Result<Vec<_>, _>>()?;
            return Ok(Self::Combinator { kind, children });
        }

        if tag.eq_ignore_ascii_case("NOT") {
            let inner = obj
                .get("filter")
                .ok_or_else(|| CatalogError::InvalidPredicate("'NOT' requires a 'filter'".into()))?;
            return Ok(Self::Not(Box::new(Self::from_json(inner)?)));
        }

        let operator = ComparisonOperator::from_tag(tag)
            .ok_or_else(|| CatalogError::InvalidPredicate(format!("unknown predicate type '{tag}'")))?;
        let property = obj
            .get("property")
            .and_then(Value::as_str)
            .ok_or_else(|| CatalogError::InvalidPredicate(format!("'{tag}' requires a string 'property'")))?;
        let value = obj
            .get("value")
            .ok_or_else(|| CatalogError::InvalidPredicate(format!("'{tag}' on '{property}' has no 'value'")))
            .and_then(FilterValue::from_json)?;

        Ok(Self::compare(operator, property, value))
    }

    /// JSON filter-tree form of this node
    #[must_use]
    pub fn to_json(&self) -> Value {
        match self {
            Self::Comparison(c) => json!({
                "type": c.operator.token(),
                "property": c.property,
                "value": c.value.to_json(),
            }),
            Self::Combinator { kind, children } => json!({
                "type": kind.keyword(),
                "filters": children.iter().map(Self::to_json).collect::<Vec<_>>(),
            }),
            Self::Not(inner) => json!({
                "type": "NOT",
                "filter": inner.to_json(),
            }),
        }
    }
}

impl TryFrom<Value> for PredicateNode {
    type Error = CatalogError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Self::from_json(&value)
    }
}

impl From<PredicateNode> for Value {
    fn from(node: PredicateNode) -> Self {
        node.to_json()
    }
}

/// Leaf comparison
#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
    pub operator: ComparisonOperator,
    /// Raw attribute id
    pub property: String,
    pub value: FilterValue,
}

/// Comparison operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComparisonOperator {
    /// `=`
    Equals,
    /// `<>`
    NotEquals,
    /// `LIKE`, case-sensitive pattern match
    Like,
    /// `ILIKE`, case-insensitive pattern match
    ILike,
    GreaterThan,
    GreaterThanOrEqual,
    LessThan,
    LessThanOrEqual,
}

impl ComparisonOperator {
    /// CQL token
    #[must_use]
    pub fn token(self) -> &'static str {
        match self {
            Self::Equals => "=",
            Self::NotEquals => "<>",
            Self::Like => "LIKE",
            Self::ILike => "ILIKE",
            Self::GreaterThan => ">",
            Self::GreaterThanOrEqual => ">=",
            Self::LessThan => "<",
            Self::LessThanOrEqual => "<=",
        }
    }

    fn from_tag(tag: &str) -> Option<Self> {
        Some(match tag {
            "=" => Self::Equals,
            "<>" | "!=" => Self::NotEquals,
            ">" => Self::GreaterThan,
            ">=" => Self::GreaterThanOrEqual,
            "<" => Self::LessThan,
            "<=" => Self::LessThanOrEqual,
            t if t.eq_ignore_ascii_case("LIKE") => Self::Like,
            t if t.eq_ignore_ascii_case("ILIKE") => Self::ILike,
            _ => return None,
        })
    }
}

/// Boolean combinator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CombinatorKind {
    And,
    Or,
}

impl CombinatorKind {
    #[must_use]
    pub fn keyword(self) -> &'static str {
        match self {
            Self::And => "AND",
            Self::Or => "OR",
        }
    }

    fn from_tag(tag: &str) -> Option<Self> {
        if tag.eq_ignore_ascii_case("AND") {
            Some(Self::And)
        } else if tag.eq_ignore_ascii_case("OR") {
            Some(Self::Or)
        } else {
            None
        }
    }
}

/// Comparison operand
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    Text(String),
    Number(Number),
    Boolean(bool),
    /// Compared element-wise, any element may match
    List(Vec<FilterValue>),
}

impl FilterValue {
    /// Floating-point operand; NaN and infinities have no CQL literal.
    pub fn float(value: f64) -> Result<Self, CatalogError> {
        Number::from_f64(value)
            .map(Self::Number)
            .ok_or_else(|| CatalogError::InvalidPredicate(format!("{value} is not a finite number")))
    }

    fn from_json(value: &Value) -> Result<Self, CatalogError> {
        match value {
            Value::String(s) => Ok(Self::Text(s.clone())),
            Value::Number(n) => Ok(Self::Number(n.clone())),
            Value::Bool(b) => Ok(Self::Boolean(*b)),
            Value::Array(items) => items
                .iter()
                .map(Self::from_json)
                .collect::<Result<Vec<_>, _>>()
                .map(Self::List),
            Value::Null | Value::Object(_) => Err(CatalogError::InvalidPredicate(format!(
                "unsupported comparison value {value}"
            ))),
        }
    }

    fn to_json(&self) -> Value {
        match self {
            Self::Text(s) => Value::String(s.clone()),
            Self::Number(n) => Value::Number(n.clone()),
            Self::Boolean(b) => Value::Bool(*b),
            Self::List(items) => Value::Array(items.iter().map(Self::to_json).collect()),
        }
    }
}

impl From<&str> for FilterValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for FilterValue {
    fn from(value: i64) -> Self {
        Self::Number(value.into())
    }
}

impl From<u64> for FilterValue {
    fn from(value: u64) -> Self {
        Self::Number(value.into())
    }
}

impl From<bool> for FilterValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl<T: Into<FilterValue>> From<Vec<T>> for FilterValue {
    fn from(values: Vec<T>) -> Self {
        Self::List(values.into_iter().map(Into::into).collect())
    }
}

/// Builder for flat filters
#[derive(Default)]
pub struct PredicateBuilder {
    nodes: Vec<PredicateNode>,
}

impl PredicateBuilder {
    /// Create a new predicate builder
    #[must_use]
    pub fn new() -> Self {
        Self { nodes: Vec::new() }
    }

    /// Add an equality constraint
    #[must_use]
    pub fn eq(mut self, property: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        self.nodes.push(PredicateNode::eq(property, value));
        self
    }

    /// Add a LIKE constraint
    #[must_use]
    pub fn like(mut self, property: impl Into<String>, pattern: impl Into<String>) -> Self {
        self.nodes.push(PredicateNode::like(property, pattern));
        self
    }

    /// Add an ILIKE constraint
    #[must_use]
    pub fn ilike(mut self, property: impl Into<String>, pattern: impl Into<String>) -> Self {
        self.nodes.push(PredicateNode::ilike(property, pattern));
        self
    }

    /// Add an arbitrary comparison
    #[must_use]
    pub fn compare(
        mut self,
        operator: ComparisonOperator,
        property: impl Into<String>,
        value: impl Into<FilterValue>,
    ) -> Self {
        self.nodes.push(PredicateNode::compare(operator, property, value));
        self
    }

    /// Add a prebuilt node
    #[must_use]
    pub fn node(mut self, node: PredicateNode) -> Self {
        self.nodes.push(node);
        self
    }

    /// Build with AND semantics.
    ///
    /// An empty builder yields an empty combinator, which fails to compile;
    /// use [`PredicateNode::match_all`] to match everything.
    #[must_use]
    pub fn build_and(self) -> PredicateNode {
        PredicateNode::all(self.nodes)
    }

    /// Build with OR semantics
    #[must_use]
    pub fn build_or(self) -> PredicateNode {
        PredicateNode::any(self.nodes)
    }
}
