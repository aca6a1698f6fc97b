// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Basic catalog-query usage.
//!
//! Demonstrates, against an in-process catalog:
//! 1. Loading the attribute schema (one enumeration group fails on purpose)
//! 2. Printing the generated SDL
//! 3. Running a compiled query and reading safe-named attributes
//! 4. Faceting
//! 5. Creating, saving and resolving related records
//! 6. Displaying the recorded metrics
//!
//! # Run
//!
//! ```bash
//! cargo run --example basic_usage
//! ```

use std::sync::Arc;

use catalog_query::{
    AttributeMetadata, CatalogClient, CatalogConfig, CqlCompiler, InMemoryCatalog,
    PredicateNode, PrimitiveType, QuerySettings, SortDirection,
};
use metrics_util::debugging::{DebugValue, DebuggingRecorder, Snapshotter};
use serde_json::json;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();
    recorder.install().expect("failed to install metrics recorder");

    tracing_subscriber::fmt()
        .with_target(false)
        .compact()
        .init();

    // ─────────────────────────────────────────────────────────────────────────
    // 1. Catalog and schema
    // ─────────────────────────────────────────────────────────────────────────
    let catalog = Arc::new(
        InMemoryCatalog::new()
            .with_attribute_group(
                "resource",
                vec![
                    AttributeMetadata::new("title", PrimitiveType::String),
                    AttributeMetadata::new("point-of-contact", PrimitiveType::String),
                    AttributeMetadata::new("media.format", PrimitiveType::String),
                    AttributeMetadata::new("location", PrimitiveType::Geometry),
                    AttributeMetadata::new("metacard.modified", PrimitiveType::Date),
                ],
            )
            .with_attribute_group(
                "workspace",
                vec![AttributeMetadata::new("queries", PrimitiveType::String).multivalued()],
            )
            .with_group_enumerations(
                "resource",
                [("media.format".to_string(), vec!["PDF".to_string(), "PNG".to_string()])],
            )
            .with_failing_group("workspace")
            .with_metacard(json!({"id": "r1", "title": "River survey", "point-of-contact": "Jane", "media.format": "PDF"}))
            .with_metacard(json!({"id": "r2", "title": "Harbour map", "point-of-contact": "Ann", "media.format": "PNG"}))
            .with_metacard(json!({"id": "r3", "title": "River gauge", "point-of-contact": "Jane", "media.format": "PDF"})),
    );
    let client = CatalogClient::with_catalog(catalog.clone(), CatalogConfig::default())?;

    println!("\n📚 Loading schema...");
    let report = client.refresh_schema().await?;
    println!(
        "   └─ v{}: {} attributes, {} enumerated, {} failed group(s)",
        report.version,
        report.attribute_count,
        report.enumerated_attributes,
        report.failures.len()
    );
    for failure in &report.failures {
        println!("      ⚠️  {failure}");
    }

    // ─────────────────────────────────────────────────────────────────────────
    // 2. SDL
    // ─────────────────────────────────────────────────────────────────────────
    println!("\n🧾 Generated SDL:\n{}", client.schema().descriptor.to_sdl());

    // ─────────────────────────────────────────────────────────────────────────
    // 3. Query
    // ─────────────────────────────────────────────────────────────────────────
    let filter = PredicateNode::ilike("title", "%river%")
        .and(PredicateNode::eq("point-of-contact", vec!["Jane", "O'Neil"]));
    println!("🔍 CQL: {}", CqlCompiler::compile(&filter)?);

    let settings = QuerySettings::new()
        .with_page_size(10)
        .sort_by("metacard.modified", SortDirection::Descending);
    let result = client.query(filter, &settings).await?;
    println!("   └─ hits={} elapsed={}ms", result.status.hits, result.status.elapsed);
    for record in &result.records {
        println!(
            "      • {} → title={} point_of_contact={}",
            record.id().unwrap_or("?"),
            record.get("title").unwrap_or(&json!(null)),
            record.get("point_of_contact").unwrap_or(&json!(null)),
        );
    }

    // ─────────────────────────────────────────────────────────────────────────
    // 4. Facets
    // ─────────────────────────────────────────────────────────────────────────
    println!("\n📊 Facet media.format:");
    for bucket in client.facet("media.format").await? {
        println!("   └─ {} × {}", bucket.value, bucket.count);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // 5. Mutations and related records
    // ─────────────────────────────────────────────────────────────────────────
    println!("\n✏️  Creating a workspace...");
    let created = client
        .create(
            json!({"metacard_type": "workspace", "title": "Rivers", "queries": ["r1", "r3"]})
                .as_object()
                .cloned()
                .unwrap_or_default(),
        )
        .await?;
    let workspace_id = created
        .get("id")
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .to_string();
    println!("   └─ created {workspace_id}");

    let saved = client
        .save(&workspace_id, json!({"title": "River studies"}).as_object().cloned().unwrap_or_default())
        .await?;
    println!("   └─ saved, modified at {}", saved["metacard_modified"]);

    let lookup = client.metacard_by_id(&workspace_id, &QuerySettings::new()).await?;
    if let Some(workspace) = lookup.records.iter().find(|r| r.id() == Some(workspace_id.as_str())) {
        let related = workspace.related.resolve(&client).await?;
        println!("   └─ {} related record(s) via {:?}", related.len(), workspace.related.ids());
    }

    client.delete(&workspace_id).await?;
    println!("   └─ deleted {workspace_id}");

    println!("\n📨 Queries sent: {}", catalog.queries().len());
    for query in catalog.queries() {
        println!("   └─ {}", query.cql);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // 6. Metrics
    // ─────────────────────────────────────────────────────────────────────────
    print_metrics(&snapshotter);

    Ok(())
}

fn print_metrics(snapshotter: &Snapshotter) {
    println!("\n📈 Metrics:");

    let mut lines = Vec::new();
    for (composite_key, _, _, value) in snapshotter.snapshot().into_vec() {
        let (_, key) = composite_key.into_parts();
        let labels: Vec<_> = key.labels().map(|l| format!("{}={}", l.key(), l.value())).collect();
        let label_str = if labels.is_empty() { String::new() } else { format!("{{{}}}", labels.join(",")) };

        let rendered = match value {
            DebugValue::Counter(v) => v.to_string(),
            DebugValue::Gauge(v) => format!("{:.0}", v.into_inner()),
            DebugValue::Histogram(samples) => {
                let sum: f64 = samples.iter().map(|v| v.into_inner()).sum();
                format!("n={} sum={:.4}", samples.len(), sum)
            }
        };
        lines.push(format!("{}{} = {}", key.name(), label_str, rendered));
    }

    lines.sort();
    for line in lines {
        println!("   └─ {line}");
    }
}
