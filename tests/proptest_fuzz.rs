//! Property-based tests for predicate compilation, identifier mapping and
//! result shaping.
//!
//! Uses proptest to generate random trees and malformed inputs and verify
//! the invariants hold and nothing panics.
//!
//! Run with: `cargo test --test proptest_fuzz`

use proptest::prelude::*;
use serde_json::Value;

use catalog_query::filter::{ComparisonOperator, CqlCompiler, FilterValue, PredicateNode};
use catalog_query::schema::to_safe;
use catalog_query::{IdentifierMap, ResultShaper};

// =============================================================================
// Strategies for generating test data
// =============================================================================

fn property_strategy() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9._-]{0,12}".prop_filter("reserved word", |p| {
        !["and", "or", "not", "like", "ilike", "is", "null", "in", "between", "exists", "true",
          "false", "before", "after", "during", "include", "exclude"]
            .contains(&p.as_str())
    })
}

fn operator_strategy() -> impl Strategy<Value = ComparisonOperator> {
    prop_oneof![
        Just(ComparisonOperator::Equals),
        Just(ComparisonOperator::NotEquals),
        Just(ComparisonOperator::Like),
        Just(ComparisonOperator::ILike),
        Just(ComparisonOperator::GreaterThan),
        Just(ComparisonOperator::GreaterThanOrEqual),
        Just(ComparisonOperator::LessThan),
        Just(ComparisonOperator::LessThanOrEqual),
    ]
}

fn scalar_strategy() -> impl Strategy<Value = FilterValue> {
    prop_oneof![
        ".{0,20}".prop_map(FilterValue::Text),
        any::<i64>().prop_map(FilterValue::from),
        any::<bool>().prop_map(FilterValue::Boolean),
    ]
}

fn comparison_strategy() -> impl Strategy<Value = PredicateNode> {
    (operator_strategy(), property_strategy(), scalar_strategy())
        .prop_map(|(op, property, value)| PredicateNode::compare(op, property, value))
}

/// Valid trees: every combinator has at least one child
fn tree_strategy() -> impl Strategy<Value = PredicateNode> {
    comparison_strategy().prop_recursive(
        4,  // depth
        48, // max nodes
        5,  // children per combinator
        |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 1..5).prop_map(PredicateNode::all),
                prop::collection::vec(inner.clone(), 1..5).prop_map(PredicateNode::any),
                inner.prop_map(PredicateNode::negate),
            ]
        },
    )
}

/// Generate arbitrary JSON values (including invalid structures)
fn arbitrary_json_strategy() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(|n| Value::Number(n.into())),
        prop_oneof![
            Just("AND".to_string()),
            Just("=".to_string()),
            Just("status".to_string()),
            ".*".prop_map(String::from),
        ]
        .prop_map(Value::String),
    ];

    leaf.prop_recursive(
        4,  // depth
        64, // max nodes
        10, // items per collection
        |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..10).prop_map(Value::Array),
                prop::collection::hash_map(
                    prop_oneof![
                        Just("type".to_string()),
                        Just("filters".to_string()),
                        Just("property".to_string()),
                        Just("value".to_string()),
                        Just("results".to_string()),
                        Just("status".to_string()),
                        "[a-z]{1,8}".prop_map(String::from),
                    ],
                    inner,
                    0..10
                )
                .prop_map(|m| Value::Object(m.into_iter().collect())),
            ]
        },
    )
}

// =============================================================================
// Compilation
// =============================================================================

proptest! {
    #[test]
    fn compile_is_deterministic(tree in tree_strategy()) {
        let first = CqlCompiler::compile(&tree).unwrap();
        let second = CqlCompiler::compile(&tree.clone()).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn combinators_are_parenthesized(
        children in prop::collection::vec(comparison_strategy(), 1..6),
        and in any::<bool>(),
    ) {
        let node = if and { PredicateNode::all(children) } else { PredicateNode::any(children) };
        let cql = CqlCompiler::compile(&node).unwrap();
        prop_assert!(cql.starts_with("( "), "{}", cql);
        prop_assert!(cql.ends_with(" )"), "{}", cql);
    }

    #[test]
    fn list_operand_expands_to_one_term_per_element(
        property in property_strategy(),
        values in prop::collection::vec("[a-z]{1,8}", 1..8),
    ) {
        let node = PredicateNode::eq(property.clone(), values.clone());
        let cql = CqlCompiler::compile(&node).unwrap();

        prop_assert_eq!(cql.matches(" OR ").count(), values.len() - 1);
        let term_prefix = format!("{} = '", property);
        prop_assert_eq!(cql.matches(term_prefix.as_str()).count(), values.len());
    }

    #[test]
    fn text_literals_double_quotes(text in ".{0,30}") {
        let cql = CqlCompiler::compile(&PredicateNode::eq("title", text.clone())).unwrap();
        let expected = format!("title = '{}'", text.replace('\'', "''"));
        prop_assert_eq!(cql, expected);
    }

    #[test]
    fn json_form_round_trips(tree in tree_strategy()) {
        let back = PredicateNode::from_json(&tree.to_json()).unwrap();
        prop_assert_eq!(back, tree);
    }

    #[test]
    fn from_json_never_panics(value in arbitrary_json_strategy()) {
        // Either a tree or an InvalidPredicate; never a panic
        if let Ok(tree) = PredicateNode::from_json(&value) {
            let _ = CqlCompiler::compile(&tree);
        }
    }
}

// =============================================================================
// Identifiers
// =============================================================================

proptest! {
    #[test]
    fn safe_names_have_no_separators(raw in "[a-zA-Z0-9._-]{1,24}") {
        let safe = to_safe(&raw);
        prop_assert!(!safe.contains('-') && !safe.contains('.'));
        prop_assert_eq!(safe.len(), raw.len());
        prop_assert_eq!(to_safe(&safe), safe.clone());
    }

    #[test]
    fn known_ids_round_trip(raw in "[a-z][a-z0-9]{0,6}([.-][a-z0-9]{1,6}){0,3}") {
        let ids = IdentifierMap::from_ids([raw.as_str()]).unwrap();
        let safe = to_safe(&raw);
        prop_assert_eq!(ids.to_raw(&safe), raw.as_str());
    }

    #[test]
    fn unknown_names_map_to_themselves(name in "[a-zA-Z_][a-zA-Z0-9_]{0,16}") {
        let ids = IdentifierMap::from_ids(["id", "metacard-tags"]).unwrap();
        prop_assume!(name != "metacard_tags" && name != "id");
        prop_assert_eq!(ids.to_raw(&name), name.as_str());
    }
}

// =============================================================================
// Shaping
// =============================================================================

proptest! {
    #[test]
    fn shape_never_panics(value in arbitrary_json_strategy()) {
        let ids = IdentifierMap::from_ids(["id"]).unwrap();
        let _ = ResultShaper::shape(value, &ids);
    }
}
