//! Simple rule example
//!
//! This example demonstrates:
//! - Loading a rule from its serialized JSON document
//! - Evaluating it against a few objects
//! - Migrating a legacy-format document to JSON

use ruletree_runtime::{MapResolver, Rule};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    println!("=== Simple Rule Example ===\n");

    // A discount applies to items with more than 5 units in stock, or
    // cheap items of SKU "A"
    let document = serde_json::json!({
        "type": "combine",
        "aggregator": "any",
        "children": [
            { "type": "condition", "attribute": "qty", "operator": ">", "value": 5 },
            {
                "type": "combine",
                "aggregator": "all",
                "children": [
                    { "type": "condition", "attribute": "sku", "operator": "==", "value": "A" },
                    { "type": "condition", "attribute": "price", "operator": "<", "value": 10 }
                ]
            }
        ]
    });

    let rule = Rule::new("demo-discount").with_serialized(document.to_string());

    let items = [
        ("well stocked", MapResolver::new().with("qty", 10i64).with("sku", "B").with("price", 25.0)),
        ("cheap A", MapResolver::new().with("qty", 1i64).with("sku", "A").with("price", 7.5)),
        ("neither", MapResolver::new().with("qty", 2i64).with("sku", "C").with("price", 30.0)),
    ];

    println!("Rule: {}", rule.id());
    for (label, item) in &items {
        println!("  {} -> {}", label, rule.validate(item)?);
    }

    // Documents written by the legacy platform are read transparently
    let legacy = "a:4:{s:4:\"type\";s:9:\"condition\";s:9:\"attribute\";s:3:\"qty\";\
s:8:\"operator\";s:2:\">=\";s:5:\"value\";i:3;}";
    let migrated = Rule::new("demo-legacy").with_serialized(legacy);

    println!("\nLegacy document evaluates:");
    println!(
        "  qty 4 -> {}",
        migrated.validate(&MapResolver::new().with("qty", 4i64))?
    );
    println!("\nRewritten as JSON:");
    println!("  {}", migrated.to_json()?);

    Ok(())
}
