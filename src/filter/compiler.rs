// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! CQL Compiler
//!
//! Compiles a predicate tree to the catalog's textual query grammar.
//!
//! # Grammar Generated
//!
//! ```text
//! id = 'abc-123'                          - Equality, quoted text
//! resource-size > 1024                    - Numbers and booleans unquoted
//! title ILIKE '%river%'                   - Pattern, % passed through as-is
//! title = 'O''Brien'                      - Embedded quote doubled
//! "odd name" = 'x'                        - Non-identifier property quoted
//! "NOT" = 'x'                             - Keyword or digit-led property quoted
//! ( a = 'x' AND b = 'y' )                 - Combinator, always parenthesized
//! ( tag = 'a' OR tag = 'b' )              - List operand expands to OR
//! NOT ( a = 'x' )                         - Negation
//! ```

use super::predicate::{CombinatorKind, Comparison, ComparisonOperator, FilterValue, PredicateNode};
use crate::backend::CatalogError;

/// CQL compiler
pub struct CqlCompiler;

impl CqlCompiler {
    /// Compile a predicate tree to CQL.
    ///
    /// Fails with [`CatalogError::InvalidPredicate`] on empty combinators,
    /// empty or nested list operands and blank property names. Nothing is
    /// returned for a tree that fails anywhere.
    pub fn compile(node: &PredicateNode) -> Result<String, CatalogError> {
        match node {
            PredicateNode::Comparison(comparison) => Self::compile_comparison(comparison),
            PredicateNode::Combinator { kind, children } => {
                if children.is_empty() {
                    return Err(CatalogError::InvalidPredicate(format!(
                        "{} combinator has no children",
                        kind.keyword()
                    )));
                }
                let parts = children
                    .iter()
                    .map(Self::compile)
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Self::group(*kind, &parts))
            }
            PredicateNode::Not(inner) => Ok(format!("NOT ( {} )", Self::compile(inner)?)),
        }
    }

    fn group(kind: CombinatorKind, parts: &[String]) -> String {
        format!("( {} )", parts.join(&format!(" {} ", kind.keyword())))
    }

    fn compile_comparison(comparison: &Comparison) -> Result<String, CatalogError> {
        let property = comparison.property.trim();
        if property.is_empty() {
            return Err(CatalogError::InvalidPredicate("comparison has no property".into()));
        }
        let property = Self::property(property);

        match &comparison.value {
            FilterValue::List(items) => {
                if items.is_empty() {
                    return Err(CatalogError::InvalidPredicate(format!(
                        "empty value list for '{}'",
                        comparison.property
                    )));
                }
                let parts = items
                    .iter()
                    .map(|item| match item {
                        FilterValue::List(_) => Err(CatalogError::InvalidPredicate(format!(
                            "nested value list for '{}'",
                            comparison.property
                        ))),
                        scalar => Ok(Self::term(&property, comparison.operator, scalar)),
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Self::group(CombinatorKind::Or, &parts))
            }
            scalar => Ok(Self::term(&property, comparison.operator, scalar)),
        }
    }

    fn term(property: &str, operator: ComparisonOperator, value: &FilterValue) -> String {
        format!("{} {} {}", property, operator.token(), Self::literal(value))
    }

    fn literal(value: &FilterValue) -> String {
        match value {
            FilterValue::Text(text) => format!("'{}'", text.replace('\'', "''")),
            FilterValue::Number(n) => n.to_string(),
            FilterValue::Boolean(b) => if *b { "true" } else { "false" }.to_string(),
            // lists are expanded by the caller
            FilterValue::List(_) => String::new(),
        }
    }

    fn property(name: &str) -> String {
        // Raw ids like metacard-tags or ext.a:b are valid bare identifiers
        let bare = name.starts_with(|c: char| c.is_ascii_alphabetic() || c == '_')
            && name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.' | ':'))
            && !is_keyword(name);
        if bare {
            name.to_string()
        } else {
            format!("\"{}\"", name.replace('"', "\"\""))
        }
    }
}

/// Reserved CQL words; a property spelled like one must be quoted
const KEYWORDS: &[&str] = &[
    "AND", "OR", "NOT", "LIKE", "ILIKE", "IS", "NULL", "IN", "BETWEEN", "EXISTS", "TRUE",
    "FALSE", "BEFORE", "AFTER", "DURING", "INCLUDE", "EXCLUDE",
];

fn is_keyword(name: &str) -> bool {
    KEYWORDS.iter().any(|k| k.eq_ignore_ascii_case(name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn compile_json(value: serde_json::Value) -> Result<String, CatalogError> {
        CqlCompiler::compile(&PredicateNode::from_json(&value)?)
    }

    #[test]
    fn test_simple_equality() {
        let cql = compile_json(json!({"type": "=", "property": "id", "value": "abc-123"})).unwrap();
        assert_eq!(cql, "id = 'abc-123'");
    }

    #[test]
    fn test_and_with_like() {
        let cql = compile_json(json!({
            "type": "AND",
            "filters": [
                {"type": "=", "property": "id", "value": "x"},
                {"type": "LIKE", "property": "metacard-tags", "value": "%"}
            ]
        }))
        .unwrap();
        assert_eq!(cql, "( id = 'x' AND metacard-tags LIKE '%' )");
    }

    #[test]
    fn test_single_child_still_parenthesized() {
        let node = PredicateNode::any(vec![PredicateNode::eq("id", "x")]);
        assert_eq!(CqlCompiler::compile(&node).unwrap(), "( id = 'x' )");
    }

    #[test]
    fn test_nested_grouping() {
        let node = PredicateNode::eq("a", "1")
            .or(PredicateNode::eq("b", "2"))
            .and(PredicateNode::eq("c", "3"));
        assert_eq!(
            CqlCompiler::compile(&node).unwrap(),
            "( ( a = '1' OR b = '2' ) AND c = '3' )"
        );
    }

    #[test]
    fn test_numbers_and_booleans_unquoted() {
        let node = PredicateNode::compare(ComparisonOperator::GreaterThanOrEqual, "resource-size", 1024_i64)
            .and(PredicateNode::eq("cached", true))
            .and(PredicateNode::compare(
                ComparisonOperator::LessThan,
                "rating",
                FilterValue::float(2.5).unwrap(),
            ));
        assert_eq!(
            CqlCompiler::compile(&node).unwrap(),
            "( ( resource-size >= 1024 AND cached = true ) AND rating < 2.5 )"
        );
    }

    #[test]
    fn test_quote_escaping() {
        let node = PredicateNode::eq("title", "O'Brien's map");
        assert_eq!(CqlCompiler::compile(&node).unwrap(), "title = 'O''Brien''s map'");
    }

    #[test]
    fn test_percent_not_escaped() {
        let node = PredicateNode::ilike("anyText", "%50% off%");
        assert_eq!(CqlCompiler::compile(&node).unwrap(), "anyText ILIKE '%50% off%'");
    }

    #[test]
    fn test_odd_property_is_quoted() {
        let node = PredicateNode::eq("my \"odd\" field", "x");
        assert_eq!(CqlCompiler::compile(&node).unwrap(), "\"my \"\"odd\"\" field\" = 'x'");
    }

    #[test]
    fn test_keyword_and_digit_properties_are_quoted() {
        let cases = [
            ("1abc", "\"1abc\" = 'x'"),
            ("AND", "\"AND\" = 'x'"),
            ("like", "\"like\" = 'x'"),
            ("-size", "\"-size\" = 'x'"),
            ("android", "android = 'x'"),
            ("_internal", "_internal = 'x'"),
        ];
        for (property, expected) in cases {
            let node = PredicateNode::eq(property, "x");
            assert_eq!(CqlCompiler::compile(&node).unwrap(), expected, "{property}");
        }
    }

    #[test]
    fn test_list_expands_to_or() {
        let node = PredicateNode::eq("metacard-tags", vec!["resource", "workspace", "query"]);
        assert_eq!(
            CqlCompiler::compile(&node).unwrap(),
            "( metacard-tags = 'resource' OR metacard-tags = 'workspace' OR metacard-tags = 'query' )"
        );
    }

    #[test]
    fn test_not() {
        let node = PredicateNode::eq("metacard-tags", "deleted").negate();
        assert_eq!(CqlCompiler::compile(&node).unwrap(), "NOT ( metacard-tags = 'deleted' )");
    }

    #[test]
    fn test_empty_tree_is_invalid() {
        let err = CqlCompiler::compile(&PredicateNode::all(vec![])).unwrap_err();
        assert!(matches!(err, CatalogError::InvalidPredicate(_)));
    }

    #[test]
    fn test_empty_nested_combinator_fails_whole_tree() {
        let node = PredicateNode::eq("id", "x").and(PredicateNode::any(vec![]));
        assert!(matches!(CqlCompiler::compile(&node), Err(CatalogError::InvalidPredicate(_))));
    }

    #[test]
    fn test_bad_lists_are_invalid() {
        let empty = PredicateNode::eq("tags", FilterValue::List(vec![]));
        assert!(CqlCompiler::compile(&empty).is_err());

        let nested = PredicateNode::eq(
            "tags",
            FilterValue::List(vec![FilterValue::List(vec!["a".into()])]),
        );
        assert!(CqlCompiler::compile(&nested).is_err());
    }

    #[test]
    fn test_blank_property_is_invalid() {
        assert!(CqlCompiler::compile(&PredicateNode::eq("  ", "x")).is_err());
    }

    #[test]
    fn test_deterministic() {
        let node = PredicateNode::match_all().and(PredicateNode::eq("tags", vec!["a", "b"]));
        assert_eq!(CqlCompiler::compile(&node).unwrap(), CqlCompiler::compile(&node).unwrap());
    }
}
