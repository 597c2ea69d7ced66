//! The SQL compiler: a pure walk of (tree, adapter) -> WHERE fragment
//!
//! Produces one boolean-typed fragment suitable for direct use in a
//! WHERE clause. Every combinator output is independently parenthesized,
//! so operator precedence follows the tree shape at any nesting depth.
//! Attributes resolve to columns through an explicit [`ColumnMap`]; an
//! unmapped attribute is a configuration error and fails compilation.

use crate::adapter::SqlAdapter;
use crate::error::{Result, SqlError};
use ruletree_core::{Aggregator, Combine, Condition, ConditionNode, Operator, Value};
use std::collections::HashMap;

/// Fragment a combinator with no children compiles to: ALL-of-nothing
/// is true, ANY-of-nothing is false, matching the evaluator.
const TRUE_FRAGMENT: &str = "1 = 1";
const FALSE_FRAGMENT: &str = "1 = 0";

/// Attribute-to-column mapping for the target table
#[derive(Debug, Clone, Default)]
pub struct ColumnMap {
    columns: HashMap<String, String>,
}

impl ColumnMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style mapping of one attribute to a column
    pub fn map(mut self, attribute: impl Into<String>, column: impl Into<String>) -> Self {
        self.columns.insert(attribute.into(), column.into());
        self
    }

    /// Map each attribute to a column of the same name
    pub fn identity<I, S>(attributes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut map = Self::new();
        for attribute in attributes {
            let name = attribute.into();
            map.columns.insert(name.clone(), name);
        }
        map
    }

    pub fn column(&self, attribute: &str) -> Option<&str> {
        self.columns.get(attribute).map(String::as_str)
    }
}

/// Stateless tree-to-SQL compiler
#[derive(Debug, Clone, Default)]
pub struct SqlCompiler {
    columns: ColumnMap,
}

impl SqlCompiler {
    pub fn new(columns: ColumnMap) -> Self {
        Self { columns }
    }

    /// Compile a condition tree into a WHERE-clause fragment
    pub fn compile(&self, node: &ConditionNode, adapter: &dyn SqlAdapter) -> Result<String> {
        let fragment = self.compile_node(node, adapter)?;
        tracing::debug!(fragment = %fragment, "compiled condition tree");
        Ok(fragment)
    }

    fn compile_node(&self, node: &ConditionNode, adapter: &dyn SqlAdapter) -> Result<String> {
        match node {
            ConditionNode::Condition(condition) => self.compile_condition(condition, adapter),
            ConditionNode::Combine(combine) => self.compile_combine(combine, adapter),
        }
    }

    fn compile_combine(&self, combine: &Combine, adapter: &dyn SqlAdapter) -> Result<String> {
        let joiner = match combine.aggregator() {
            Aggregator::All => " AND ",
            Aggregator::Any => " OR ",
        };
        let parts = combine
            .children()
            .iter()
            .map(|child| self.compile_node(child, adapter))
            .collect::<Result<Vec<_>>>()?;

        let body = if parts.is_empty() {
            match combine.aggregator() {
                Aggregator::All => TRUE_FRAGMENT.to_string(),
                Aggregator::Any => FALSE_FRAGMENT.to_string(),
            }
        } else {
            parts.join(joiner)
        };

        Ok(if combine.is_negated() {
            format!("NOT ({})", body)
        } else {
            format!("({})", body)
        })
    }

    fn compile_condition(&self, condition: &Condition, adapter: &dyn SqlAdapter) -> Result<String> {
        let attribute = condition.attribute();
        let column = self
            .columns
            .column(attribute)
            .ok_or_else(|| SqlError::UnmappedAttribute(attribute.to_string()))?;
        let col = adapter.quote_identifier(column);
        let value = condition.value();

        match condition.operator() {
            Operator::Eq => self.comparison_fragment(&col, "=", value, adapter),
            Operator::Neq => self.comparison_fragment(&col, "!=", value, adapter),
            Operator::Gt => scalar_fragment(&col, ">", value, adapter),
            Operator::Gte => scalar_fragment(&col, ">=", value, adapter),
            Operator::Lt => scalar_fragment(&col, "<", value, adapter),
            Operator::Lte => scalar_fragment(&col, "<=", value, adapter),

            Operator::Like => match value.as_list() {
                // list-IN hinted attribute: membership, not a pattern
                Some(items) => in_list_fragment(&col, items, false, adapter),
                None => Ok(format!(
                    "{} {} {}",
                    col,
                    adapter.like_operator(),
                    adapter.quote_value(value)?
                )),
            },
            Operator::NotLike => match value.as_list() {
                Some(items) => in_list_fragment(&col, items, true, adapter),
                None => Ok(format!(
                    "NOT ({} {} {})",
                    col,
                    adapter.like_operator(),
                    adapter.quote_value(value)?
                )),
            },

            Operator::InSet | Operator::AnyOfSet => {
                self.set_scan_fragment(&col, value, false, adapter)
            }
            Operator::NotInSet | Operator::NotAnyOfSet => {
                self.set_scan_fragment(&col, value, true, adapter)
            }
        }
    }

    /// Equality fragments. A list value AND-joins one comparison per
    /// element (historical behavior, preserved for compatibility).
    /// Condition construction guarantees list values are non-empty.
    fn comparison_fragment(
        &self,
        col: &str,
        op: &str,
        value: &Value,
        adapter: &dyn SqlAdapter,
    ) -> Result<String> {
        match value.as_list() {
            Some(items) => {
                let parts = items
                    .iter()
                    .map(|item| scalar_fragment(col, op, item, adapter))
                    .collect::<Result<Vec<_>>>()?;
                Ok(group(parts.join(" AND "), parts.len()))
            }
            None => scalar_fragment(col, op, value, adapter),
        }
    }

    /// Find-in-set fragments: elements OR-joined for the positive forms,
    /// AND-joined negations for the negative forms.
    fn set_scan_fragment(
        &self,
        col: &str,
        value: &Value,
        negated: bool,
        adapter: &dyn SqlAdapter,
    ) -> Result<String> {
        let elements: Vec<&Value> = match value.as_list() {
            Some(items) => items.iter().collect(),
            None => vec![value],
        };

        let parts = elements
            .iter()
            .map(|element| {
                let needle = adapter.quote_value(element)?;
                let expr = adapter.find_in_set_expr(&needle, col);
                Ok(if negated {
                    format!("NOT ({})", expr)
                } else {
                    expr
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let joiner = if negated { " AND " } else { " OR " };
        Ok(group(parts.join(joiner), parts.len()))
    }
}

fn scalar_fragment(
    col: &str,
    op: &str,
    value: &Value,
    adapter: &dyn SqlAdapter,
) -> Result<String> {
    Ok(format!("{} {} {}", col, op, adapter.quote_value(value)?))
}

/// `IN (...)` / `NOT IN (...)` for list-IN hinted attributes
fn in_list_fragment(
    col: &str,
    items: &[Value],
    negated: bool,
    adapter: &dyn SqlAdapter,
) -> Result<String> {
    let quoted = items
        .iter()
        .map(|item| adapter.quote_value(item))
        .collect::<Result<Vec<_>>>()?;
    Ok(format!(
        "{} {} ({})",
        col,
        if negated { "NOT IN" } else { "IN" },
        quoted.join(", ")
    ))
}

/// Parenthesize multi-term leaf expansions so they nest safely
fn group(body: String, terms: usize) -> String {
    if terms > 1 {
        format!("({})", body)
    } else {
        body
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::{MysqlAdapter, PostgresAdapter, SqliteAdapter};
    use ruletree_core::AttributeHints;

    fn compiler() -> SqlCompiler {
        SqlCompiler::new(ColumnMap::identity([
            "qty",
            "sku",
            "name",
            "price",
            "categories",
            "category_ids",
        ]))
    }

    fn leaf(attribute: &str, operator: Operator, value: impl Into<Value>) -> ConditionNode {
        Condition::new(attribute, operator, value.into())
            .unwrap()
            .into()
    }

    fn strings(items: &[&str]) -> Value {
        Value::Array(items.iter().map(|s| Value::from(*s)).collect())
    }

    #[test]
    fn test_scalar_comparison() {
        let sql = compiler()
            .compile(&leaf("qty", Operator::Gt, 5i64), &MysqlAdapter)
            .unwrap();
        assert_eq!(sql, "`qty` > 5");
    }

    #[test]
    fn test_unmapped_attribute_is_fatal() {
        let err = compiler()
            .compile(&leaf("nonexistent", Operator::Eq, 1i64), &MysqlAdapter)
            .unwrap_err();
        assert!(matches!(err, SqlError::UnmappedAttribute(attr) if attr == "nonexistent"));
    }

    #[test]
    fn test_column_mapping_is_applied() {
        let compiler = SqlCompiler::new(ColumnMap::new().map("qty", "qty_ordered"));
        let sql = compiler
            .compile(&leaf("qty", Operator::Gte, 2i64), &MysqlAdapter)
            .unwrap();
        assert_eq!(sql, "`qty_ordered` >= 2");
    }

    #[test]
    fn test_like_fragment() {
        let sql = compiler()
            .compile(&leaf("name", Operator::Like, "%shirt%"), &MysqlAdapter)
            .unwrap();
        assert_eq!(sql, "`name` LIKE '%shirt%'");

        let sql = compiler()
            .compile(&leaf("name", Operator::NotLike, "%shirt%"), &SqliteAdapter)
            .unwrap();
        assert_eq!(sql, "NOT (\"name\" LIKE '%shirt%')");
    }

    #[test]
    fn test_postgres_like_is_ilike() {
        let sql = compiler()
            .compile(&leaf("name", Operator::Like, "%shirt%"), &PostgresAdapter)
            .unwrap();
        assert_eq!(sql, "\"name\" ILIKE '%shirt%'");
    }

    #[test]
    fn test_eq_list_is_and_joined() {
        let sql = compiler()
            .compile(&leaf("sku", Operator::Eq, strings(&["A", "B"])), &MysqlAdapter)
            .unwrap();
        assert_eq!(sql, "(`sku` = 'A' AND `sku` = 'B')");
    }

    #[test]
    fn test_in_set_scalar() {
        let sql = compiler()
            .compile(&leaf("categories", Operator::InSet, "20"), &MysqlAdapter)
            .unwrap();
        assert_eq!(sql, "FIND_IN_SET('20', `categories`)");
    }

    #[test]
    fn test_in_set_list_is_or_joined() {
        let sql = compiler()
            .compile(
                &leaf("categories", Operator::AnyOfSet, strings(&["10", "20"])),
                &MysqlAdapter,
            )
            .unwrap();
        assert_eq!(
            sql,
            "(FIND_IN_SET('10', `categories`) OR FIND_IN_SET('20', `categories`))"
        );
    }

    #[test]
    fn test_not_in_set_list_is_and_joined() {
        let sql = compiler()
            .compile(
                &leaf("categories", Operator::NotInSet, strings(&["10", "20"])),
                &MysqlAdapter,
            )
            .unwrap();
        assert_eq!(
            sql,
            "(NOT (FIND_IN_SET('10', `categories`)) AND NOT (FIND_IN_SET('20', `categories`)))"
        );
    }

    #[test]
    fn test_hinted_like_list_becomes_in() {
        let hints = AttributeHints::with_list_in_attributes(["category_ids"]);
        let node: ConditionNode =
            Condition::with_hints("category_ids", Operator::Like, strings(&["3", "5"]), &hints)
                .unwrap()
                .into();
        let sql = compiler().compile(&node, &MysqlAdapter).unwrap();
        assert_eq!(sql, "`category_ids` IN ('3', '5')");

        let node: ConditionNode = Condition::with_hints(
            "category_ids",
            Operator::NotLike,
            strings(&["3", "5"]),
            &hints,
        )
        .unwrap()
        .into();
        let sql = compiler().compile(&node, &MysqlAdapter).unwrap();
        assert_eq!(sql, "`category_ids` NOT IN ('3', '5')");
    }

    #[test]
    fn test_empty_combine_fragments() {
        let sql = compiler()
            .compile(&Combine::all().into(), &MysqlAdapter)
            .unwrap();
        assert_eq!(sql, "(1 = 1)");

        let sql = compiler()
            .compile(&Combine::any().into(), &MysqlAdapter)
            .unwrap();
        assert_eq!(sql, "(1 = 0)");

        let sql = compiler()
            .compile(&Combine::any().negated().into(), &MysqlAdapter)
            .unwrap();
        assert_eq!(sql, "NOT (1 = 0)");
    }

    #[test]
    fn test_nested_tree_is_fully_parenthesized() {
        let tree: ConditionNode = Combine::any()
            .add(leaf("qty", Operator::Gt, 5i64))
            .add(
                Combine::all()
                    .add(leaf("sku", Operator::Eq, "A"))
                    .add(leaf("price", Operator::Lt, 10i64)),
            )
            .into();
        let sql = compiler().compile(&tree, &MysqlAdapter).unwrap();
        assert_eq!(sql, "(`qty` > 5 OR (`sku` = 'A' AND `price` < 10))");
    }

    #[test]
    fn test_negated_combine_gets_not_prefix() {
        let tree: ConditionNode = Combine::all()
            .negated()
            .add(leaf("qty", Operator::Gt, 5i64))
            .into();
        let sql = compiler().compile(&tree, &MysqlAdapter).unwrap();
        assert_eq!(sql, "NOT (`qty` > 5)");
    }

    #[test]
    fn test_injection_attempt_stays_quoted() {
        let hostile = "'; DROP TABLE x; --";
        let tree = leaf("sku", Operator::Eq, hostile);
        let sql = compiler().compile(&tree, &MysqlAdapter).unwrap();

        assert_eq!(sql, "`sku` = '''; DROP TABLE x; --'");
        // The raw value never appears outside the quoted literal
        assert!(!sql.contains("= '; DROP"));
    }
}
