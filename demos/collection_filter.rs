//! Collection filter example
//!
//! This example demonstrates:
//! - Building a condition tree with the builder API
//! - Compiling it to a WHERE fragment for three database engines
//! - Mapping attribute names onto table columns

use ruletree_core::{Combine, Condition, ConditionNode, Operator, Value};
use ruletree_sql::{ColumnMap, MysqlAdapter, PostgresAdapter, SqlCompiler, SqliteAdapter};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    println!("=== Collection Filter Example ===\n");

    // Products in category 20 or 33 whose name mentions "shirt", with
    // stock on hand
    let tree: ConditionNode = Combine::all()
        .add(Condition::new(
            "category_ids",
            Operator::AnyOfSet,
            Value::Array(vec![Value::from("20"), Value::from("33")]),
        )?)
        .add(Condition::new("name", Operator::Like, Value::from("%shirt%"))?)
        .add(Condition::new("qty", Operator::Gt, Value::from(0i64))?)
        .into();

    let columns = ColumnMap::new()
        .map("category_ids", "category_ids")
        .map("name", "product_name")
        .map("qty", "stock_qty");
    let compiler = SqlCompiler::new(columns);

    println!("MySQL:");
    println!("  WHERE {}\n", compiler.compile(&tree, &MysqlAdapter)?);

    println!("PostgreSQL:");
    println!("  WHERE {}\n", compiler.compile(&tree, &PostgresAdapter)?);

    println!("SQLite:");
    println!("  WHERE {}", compiler.compile(&tree, &SqliteAdapter)?);

    Ok(())
}
