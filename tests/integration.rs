//! Integration Tests for Catalog Query
//!
//! Drives the public [`CatalogClient`] API end to end against the in-process
//! catalog. No external services are needed.
//!
//! # Running Tests
//! ```bash
//! cargo test --test integration
//!
//! # Only the schema refresh scenarios
//! cargo test --test integration schema
//! ```
//!
//! # Test Organization
//! - `query_*` - Compilation, assembly and shaping through the client
//! - `mutation_*` - Create, save, delete with identifier renaming
//! - `schema_*` - Metadata refresh, degraded enumerations, subscriptions
//! - `failure_*` - Invalid input and malformed backend replies

use std::sync::Arc;

use chrono::DateTime;
use serde_json::{json, Map, Value};

use catalog_query::backend::CatalogError;
use catalog_query::query::QueryFilter;
use catalog_query::{
    AttributeMetadata, CatalogClient, CatalogConfig, InMemoryCatalog, PredicateNode,
    PrimitiveType, QuerySettings,
};

// =============================================================================
// Helpers
// =============================================================================

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

fn catalog() -> InMemoryCatalog {
    InMemoryCatalog::new()
        .with_attribute_group(
            "resource",
            vec![
                AttributeMetadata::new("title", PrimitiveType::String),
                AttributeMetadata::new("point-of-contact", PrimitiveType::String),
                AttributeMetadata::new("media.format", PrimitiveType::String),
                AttributeMetadata::new("metacard.modified", PrimitiveType::Date),
            ],
        )
        .with_attribute_group(
            "workspace",
            vec![
                AttributeMetadata::new("queries", PrimitiveType::String).multivalued(),
                AttributeMetadata::new("filterTree", PrimitiveType::String),
            ],
        )
        .with_group_enumerations(
            "resource",
            [("media.format".to_string(), vec!["PDF".to_string(), "PNG".to_string()])],
        )
        .with_local_catalog_id("ddf.distribution")
        .with_source("ddf.distribution", json!({"available": true}))
        .with_source("remote", json!({"available": false}))
}

async fn client_over(catalog: InMemoryCatalog) -> (CatalogClient, Arc<InMemoryCatalog>) {
    init_tracing();
    let catalog = Arc::new(catalog);
    let client = CatalogClient::with_catalog(catalog.clone(), CatalogConfig::default()).unwrap();
    client.refresh_schema().await.unwrap();
    (client, catalog)
}

fn attrs(value: Value) -> Map<String, Value> {
    value.as_object().cloned().unwrap()
}

// =============================================================================
// Query
// =============================================================================

#[tokio::test]
async fn query_renames_properties() {
    let (client, _) = client_over(catalog().with_metacard(json!({
        "id": "1",
        "point-of-contact": "Jane",
        "media.format": "PDF",
        "ext.unknown-field": 7
    })))
    .await;

    let result = client
        .query(PredicateNode::eq("point-of-contact", "Jane"), &QuerySettings::new())
        .await
        .unwrap();

    assert!(result.status.successful);
    assert_eq!(result.status.hits, 1);
    let record = &result.records[0];
    assert_eq!(record.get("point_of_contact"), Some(&json!("Jane")));
    assert_eq!(record.get("media_format"), Some(&json!("PDF")));
    assert_eq!(record.get("ext_unknown_field"), Some(&json!(7)));
    assert_eq!(record.metacard["properties"]["point-of-contact"], "Jane");
}

#[tokio::test]
async fn query_sends_wrapped_cql_and_settings() {
    let (client, catalog) = client_over(catalog()).await;

    let settings = QuerySettings::new()
        .with_source("ddf.distribution")
        .with_page_size(5)
        .with_page_start(1);
    client
        .query(
            PredicateNode::eq("media.format", vec!["PDF", "PNG"]),
            &settings,
        )
        .await
        .unwrap();

    let sent = catalog.queries();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].cql, "(( media.format = 'PDF' OR media.format = 'PNG' ))");
    assert_eq!(sent[0].settings, settings);
}

#[tokio::test]
async fn query_raw_cql_passthrough() {
    let (client, catalog) = client_over(catalog()).await;

    client
        .query(QueryFilter::Cql("title ILIKE 'river%'".into()), &QuerySettings::new())
        .await
        .unwrap();

    assert_eq!(catalog.queries()[0].cql, "title ILIKE 'river%'");
}

#[tokio::test]
async fn query_metacard_by_id() {
    let (client, catalog) = client_over(catalog().with_metacard(json!({"id": "abc-123"}))).await;

    let result = client.metacard_by_id("abc-123", &QuerySettings::new()).await.unwrap();

    assert_eq!(result.records[0].id(), Some("abc-123"));
    assert_eq!(
        catalog.queries()[0].cql,
        "(( id = 'abc-123' AND metacard-tags LIKE '%' ))"
    );
}

#[tokio::test]
async fn query_metacards_by_tag() {
    let (client, catalog) = client_over(catalog()).await;

    client.metacards_by_tag("workspace", &QuerySettings::new()).await.unwrap();

    assert_eq!(catalog.queries()[0].cql, "(metacard-tags = 'workspace')");
}

#[tokio::test]
async fn query_default_page_size_applied() {
    init_tracing();
    let catalog = Arc::new(catalog());
    let config = CatalogConfig {
        default_page_size: Some(25),
        ..Default::default()
    };
    let client = CatalogClient::with_catalog(catalog.clone(), config).unwrap();

    client.query(PredicateNode::match_all(), &QuerySettings::new()).await.unwrap();
    client
        .query(PredicateNode::match_all(), &QuerySettings::new().with_page_size(3))
        .await
        .unwrap();

    let sent = catalog.queries();
    assert_eq!(sent[0].settings.page_size, Some(25));
    assert_eq!(sent[1].settings.page_size, Some(3));
}

#[tokio::test]
async fn query_facet() {
    let (client, catalog) = client_over(
        catalog()
            .with_metacard(json!({"id": "1", "media.format": "PDF"}))
            .with_metacard(json!({"id": "2", "media.format": "PDF"}))
            .with_metacard(json!({"id": "3", "media.format": "PNG"})),
    )
    .await;

    let buckets = client.facet("media.format").await.unwrap();

    assert_eq!(buckets.len(), 2);
    assert_eq!(buckets[0].value, json!("PDF"));
    assert_eq!(buckets[0].count, 2);

    let sent = catalog.queries();
    let sent = &sent[0];
    assert_eq!(sent.cql, "(anyText ILIKE '%')");
    assert_eq!(sent.settings.page_size, Some(0));
    assert_eq!(sent.settings.facets, vec!["media.format".to_string()]);
}

#[tokio::test]
async fn query_facet_absent_is_empty() {
    let (client, catalog) = client_over(catalog()).await;
    catalog.push_response(json!({
        "results": [],
        "status": {"count": 0, "hits": 0, "successful": true}
    }));

    assert!(client.facet("media.format").await.unwrap().is_empty());
}

#[tokio::test]
async fn query_related_records_resolved_on_demand() {
    let (client, catalog) = client_over(
        catalog()
            .with_metacard(json!({"id": "a", "title": "A"}))
            .with_metacard(json!({"id": "b", "title": "B"}))
            .with_metacard(json!({"id": "ws", "queries": ["a", "b"], "metacard-tags": ["workspace"]})),
    )
    .await;

    let result = client.metacard_by_id("ws", &QuerySettings::new()).await.unwrap();
    let workspace = result.records.iter().find(|r| r.id() == Some("ws")).unwrap();
    assert_eq!(catalog.queries().len(), 1);

    let related = workspace.related.resolve(&client).await.unwrap();

    let sent = catalog.queries();
    assert_eq!(sent.len(), 2);
    assert_eq!(
        sent[1].cql,
        "(( ( id = 'a' OR id = 'b' ) AND metacard-tags LIKE '%' ))"
    );
    let ids: Vec<_> = related.iter().filter_map(|r| r.id()).collect();
    assert_eq!(ids, vec!["a", "b"]);
}

#[tokio::test]
async fn query_related_empty_does_not_query() {
    let (client, catalog) = client_over(catalog().with_metacard(json!({"id": "plain"}))).await;

    let result = client.metacard_by_id("plain", &QuerySettings::new()).await.unwrap();
    let related = result.records[0].related.resolve(&client).await.unwrap();

    assert!(related.is_empty());
    assert_eq!(catalog.queries().len(), 1);
}

#[tokio::test]
async fn query_stored_filter_tree() {
    let stored = json!({
        "type": "AND",
        "filters": [
            {"type": "ILIKE", "property": "title", "value": "%river%"},
            {"type": "=", "property": "media.format", "value": "PDF"}
        ]
    })
    .to_string();
    let (client, _) = client_over(catalog().with_metacard(json!({"id": "q", "filterTree": stored}))).await;

    let result = client.metacard_by_id("q", &QuerySettings::new()).await.unwrap();
    let tree = result.records[0].filter_tree().unwrap().unwrap();

    assert_eq!(
        tree,
        PredicateNode::ilike("title", "%river%").and(PredicateNode::eq("media.format", "PDF"))
    );
}

// =============================================================================
// Mutations
// =============================================================================

#[tokio::test]
async fn mutation_create_renames_both_ways() {
    let (client, catalog) = client_over(catalog()).await;

    let created = client
        .create(attrs(json!({
            "metacard_type": "workspace",
            "title": "My workspace",
            "point_of_contact": "Jane"
        })))
        .await
        .unwrap();

    let id = created.get("id").and_then(Value::as_str).unwrap().to_string();
    assert_eq!(created.get("point_of_contact"), Some(&json!("Jane")));
    assert_eq!(created.get("metacard_type"), Some(&json!("workspace")));

    let stored = catalog.get(&id).unwrap();
    assert_eq!(stored.get("point-of-contact"), Some(&json!("Jane")));
    assert!(stored.get("point_of_contact").is_none());
}

#[tokio::test]
async fn mutation_save_wraps_scalars_and_stamps_modified() {
    let (client, catalog) = client_over(
        catalog().with_metacard(json!({"id": "m1", "title": "Old", "point-of-contact": "Jane"})),
    )
    .await;

    let saved = client
        .save(
            "m1",
            attrs(json!({"title": "New", "point_of_contact": ["Ann", "Bob"]})),
        )
        .await
        .unwrap();

    assert_eq!(saved.get("id"), Some(&json!("m1")));
    assert_eq!(saved.get("title"), Some(&json!("New")));
    let modified = saved.get("metacard_modified").and_then(Value::as_str).unwrap();
    assert!(DateTime::parse_from_rfc3339(modified).is_ok());

    let stored = catalog.get("m1").unwrap();
    assert_eq!(stored.get("title"), Some(&json!("New")));
    assert_eq!(stored.get("point-of-contact"), Some(&json!(["Ann", "Bob"])));
}

#[tokio::test]
async fn mutation_delete_returns_id() {
    let (client, catalog) = client_over(catalog().with_metacard(json!({"id": "gone"}))).await;

    assert_eq!(client.delete("gone").await.unwrap(), "gone");
    assert!(catalog.get("gone").is_none());
}

#[tokio::test]
async fn mutation_sources_flag_local() {
    let (client, _) = client_over(catalog()).await;

    let sources = client.sources().await.unwrap();

    assert_eq!(sources.len(), 2);
    let local: Vec<_> = sources.iter().filter(|s| s.local).map(|s| s.id.as_str()).collect();
    assert_eq!(local, vec!["ddf.distribution"]);
    assert_eq!(sources[1].details.get("available"), Some(&json!(false)));
}

// =============================================================================
// Schema
// =============================================================================

#[tokio::test]
async fn schema_refresh_publishes_enumerations() {
    let (client, _) = client_over(catalog()).await;

    let schema = client.schema();
    assert_eq!(schema.version, 1);
    let field = schema.descriptor.read_shape().field("media_format").unwrap();
    assert_eq!(field.enumerated_values, vec!["PDF".to_string(), "PNG".to_string()]);
    assert!(schema.descriptor.to_sdl().contains("media_format"));
}

#[tokio::test]
async fn schema_refresh_survives_failing_group() {
    init_tracing();
    let catalog = Arc::new(catalog().with_failing_group("resource"));
    let client = CatalogClient::with_catalog(catalog, CatalogConfig::default()).unwrap();

    let report = client.refresh_schema().await.unwrap();

    assert!(!report.is_complete());
    assert_eq!(report.failures.len(), 1);
    assert!(matches!(
        &report.failures[0],
        CatalogError::PartialMetadataFailure { group, .. } if group == "resource"
    ));

    let schema = client.schema();
    assert_eq!(schema.version, 1);
    assert!(schema.descriptor.attribute("media.format").unwrap().enumerated_values.is_empty());
    assert!(schema.descriptor.attribute("queries").is_some());
}

#[tokio::test]
async fn schema_subscribers_see_refresh() {
    init_tracing();
    let catalog = Arc::new(catalog());
    let client = CatalogClient::with_catalog(catalog, CatalogConfig::default()).unwrap();
    let mut rx = client.subscribe_schema();
    assert_eq!(rx.borrow().version, 0);

    client.refresh_schema().await.unwrap();

    rx.changed().await.unwrap();
    assert_eq!(rx.borrow().version, 1);
}

#[tokio::test]
async fn schema_collision_keeps_previous_snapshot() {
    init_tracing();
    let catalog = Arc::new(catalog().with_attribute_group(
        "clash",
        vec![
            AttributeMetadata::new("geo-point", PrimitiveType::String),
            AttributeMetadata::new("geo.point", PrimitiveType::String),
        ],
    ));
    let client = CatalogClient::with_catalog(catalog, CatalogConfig::default()).unwrap();

    let err = client.refresh_schema().await.unwrap_err();

    assert!(matches!(err, CatalogError::IdentifierCollision { .. }));
    assert_eq!(client.schema().version, 0);
}

// =============================================================================
// Failures
// =============================================================================

#[tokio::test]
async fn failure_invalid_predicate_sends_nothing() {
    let (client, catalog) = client_over(catalog()).await;

    let err = client
        .query(PredicateNode::all(vec![]), &QuerySettings::new())
        .await
        .unwrap_err();

    assert!(matches!(err, CatalogError::InvalidPredicate(_)));
    assert!(catalog.queries().is_empty());
}

#[tokio::test]
async fn failure_invalid_settings() {
    let (client, catalog) = client_over(catalog()).await;

    let err = client
        .query(PredicateNode::match_all(), &QuerySettings::new().with_page_start(0))
        .await
        .unwrap_err();

    assert!(matches!(err, CatalogError::InvalidSettings(_)));
    assert!(catalog.queries().is_empty());
}

#[tokio::test]
async fn failure_response_without_status() {
    let (client, catalog) = client_over(catalog()).await;
    catalog.push_response(json!({"results": []}));

    let err = client
        .query(PredicateNode::match_all(), &QuerySettings::new())
        .await
        .unwrap_err();

    assert!(matches!(err, CatalogError::BackendRequestFailed(_)));
}

#[tokio::test]
async fn failure_save_unknown_id() {
    let (client, _) = client_over(catalog()).await;

    let err = client.save("missing", attrs(json!({"title": "x"}))).await.unwrap_err();

    assert!(matches!(err, CatalogError::BackendRequestFailed(_)));
}
