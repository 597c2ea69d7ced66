//! The evaluator: a pure walk of (tree, object) -> bool
//!
//! A missing attribute is never an error: it fails the leaf, because
//! rules must stay evaluable against heterogeneous objects that may
//! legitimately lack an attribute. `All` stops at the first false child,
//! `Any` at the first true one; negation applies last.

use crate::resolver::AttributeResolver;
use ruletree_core::{Aggregator, Combine, Condition, ConditionNode, Operator, Value};

/// Evaluate a condition tree against one object
pub fn evaluate(node: &ConditionNode, resolver: &dyn AttributeResolver) -> bool {
    match node {
        ConditionNode::Condition(condition) => evaluate_condition(condition, resolver),
        ConditionNode::Combine(combine) => evaluate_combine(combine, resolver),
    }
}

fn evaluate_combine(combine: &Combine, resolver: &dyn AttributeResolver) -> bool {
    // All-of-nothing is true, Any-of-nothing is false; an empty rule
    // matches everything.
    let aggregate = match combine.aggregator() {
        Aggregator::All => combine
            .children()
            .iter()
            .all(|child| evaluate(child, resolver)),
        Aggregator::Any => combine
            .children()
            .iter()
            .any(|child| evaluate(child, resolver)),
    };
    if combine.is_negated() {
        !aggregate
    } else {
        aggregate
    }
}

fn evaluate_condition(condition: &Condition, resolver: &dyn AttributeResolver) -> bool {
    let attr_value = match resolver.resolve(condition.attribute()) {
        Some(Value::Null) | None => {
            tracing::trace!(attribute = condition.attribute(), "attribute absent");
            return false;
        }
        Some(value) => value,
    };
    apply_operator(condition.operator(), &attr_value, condition.value())
}

/// Apply one operator to a resolved attribute value and a condition value
fn apply_operator(operator: Operator, attr: &Value, expected: &Value) -> bool {
    match operator {
        // A list value AND-joins per element, matching the compiled
        // fragment shape for the same condition.
        Operator::Eq => match expected.as_list() {
            Some(items) => items.iter().all(|item| attr.loose_eq(item)),
            None => attr.loose_eq(expected),
        },
        Operator::Neq => match expected.as_list() {
            Some(items) => items.iter().all(|item| !attr.loose_eq(item)),
            None => !attr.loose_eq(expected),
        },

        Operator::Gt => matches!(attr.compare(expected), Some(std::cmp::Ordering::Greater)),
        Operator::Gte => matches!(
            attr.compare(expected),
            Some(std::cmp::Ordering::Greater | std::cmp::Ordering::Equal)
        ),
        Operator::Lt => matches!(attr.compare(expected), Some(std::cmp::Ordering::Less)),
        Operator::Lte => matches!(
            attr.compare(expected),
            Some(std::cmp::Ordering::Less | std::cmp::Ordering::Equal)
        ),

        // A list value only reaches Like/NotLike through the list-IN
        // hint, where the condition means plain membership.
        Operator::Like => match expected.as_list() {
            Some(items) => items.iter().any(|item| attr.loose_eq(item)),
            None => like_match(&expected.to_text(), &attr.to_text()),
        },
        Operator::NotLike => match expected.as_list() {
            Some(items) => !items.iter().any(|item| attr.loose_eq(item)),
            None => !like_match(&expected.to_text(), &attr.to_text()),
        },

        Operator::InSet | Operator::AnyOfSet => match expected.as_list() {
            Some(items) => items.iter().any(|item| find_in_set(item, attr)),
            None => find_in_set(expected, attr),
        },
        Operator::NotInSet | Operator::NotAnyOfSet => match expected.as_list() {
            Some(items) => items.iter().all(|item| !find_in_set(item, attr)),
            None => !find_in_set(expected, attr),
        },
    }
}

/// Is `needle` one element of the attribute's multi-value field? The
/// field may be an actual list or a CSV-stored string. CSV elements
/// compare as exact text, like `FIND_IN_SET` and the emulated
/// expressions: `"5, 20"` does not contain the element `20`.
fn find_in_set(needle: &Value, haystack: &Value) -> bool {
    match haystack {
        Value::Null => false,
        Value::Array(items) => items.iter().any(|item| item.loose_eq(needle)),
        Value::String(csv) if csv.contains(',') => {
            let needle = needle.to_text();
            csv.split(',').any(|element| element == needle)
        }
        scalar => scalar.loose_eq(needle),
    }
}

/// Case-insensitive SQL LIKE match: `%` matches any run of characters,
/// `_` matches exactly one. A pattern without wildcards is an exact
/// match, so the conventional `%text%` form is substring containment.
fn like_match(pattern: &str, text: &str) -> bool {
    let pattern: Vec<char> = pattern.to_lowercase().chars().collect();
    let text: Vec<char> = text.to_lowercase().chars().collect();

    let mut p = 0;
    let mut t = 0;
    let mut star: Option<usize> = None;
    let mut mark = 0;

    while t < text.len() {
        if p < pattern.len() && (pattern[p] == '_' || pattern[p] == text[t]) {
            p += 1;
            t += 1;
        } else if p < pattern.len() && pattern[p] == '%' {
            star = Some(p);
            mark = t;
            p += 1;
        } else if let Some(star_pos) = star {
            p = star_pos + 1;
            mark += 1;
            t = mark;
        } else {
            return false;
        }
    }
    while p < pattern.len() && pattern[p] == '%' {
        p += 1;
    }
    p == pattern.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::{CountingResolver, MapResolver};
    use ruletree_core::AttributeHints;

    fn leaf(attribute: &str, operator: Operator, value: impl Into<Value>) -> ConditionNode {
        Condition::new(attribute, operator, value.into())
            .unwrap()
            .into()
    }

    fn strings(items: &[&str]) -> Value {
        Value::Array(items.iter().map(|s| Value::from(*s)).collect())
    }

    #[test]
    fn test_gt_on_qty() {
        let node = leaf("qty", Operator::Gt, 5i64);
        assert!(evaluate(&node, &MapResolver::new().with("qty", 10i64)));
        assert!(!evaluate(&node, &MapResolver::new().with("qty", 3i64)));
    }

    #[test]
    fn test_missing_attribute_is_non_match() {
        let node = leaf("qty", Operator::Gt, 5i64);
        assert!(!evaluate(&node, &MapResolver::new()));

        let node = leaf("qty", Operator::Neq, 5i64);
        assert!(!evaluate(&node, &MapResolver::new()));
    }

    #[test]
    fn test_null_attribute_is_non_match() {
        let node = leaf("sku", Operator::Neq, "B");
        assert!(!evaluate(
            &node,
            &MapResolver::new().with("sku", Value::Null)
        ));
    }

    #[test]
    fn test_in_set_with_list_value() {
        let node = leaf("sku", Operator::InSet, strings(&["A", "B"]));
        assert!(evaluate(&node, &MapResolver::new().with("sku", "B")));
        assert!(!evaluate(&node, &MapResolver::new().with("sku", "C")));
    }

    #[test]
    fn test_any_of_set_against_csv_attribute() {
        let node = leaf("categories", Operator::AnyOfSet, strings(&["10", "20"]));
        assert!(evaluate(
            &node,
            &MapResolver::new().with("categories", "5,20,33")
        ));
        assert!(!evaluate(
            &node,
            &MapResolver::new().with("categories", "5,33")
        ));
    }

    #[test]
    fn test_not_in_set_requires_all_absent() {
        let node = leaf("categories", Operator::NotInSet, strings(&["10", "20"]));
        assert!(evaluate(
            &node,
            &MapResolver::new().with("categories", "5,33")
        ));
        assert!(!evaluate(
            &node,
            &MapResolver::new().with("categories", "5,20")
        ));
    }

    #[test]
    fn test_find_in_set_numeric_coercion() {
        let node = leaf("categories", Operator::InSet, 20i64);
        assert!(evaluate(
            &node,
            &MapResolver::new().with("categories", "5,20,33")
        ));
    }

    #[test]
    fn test_csv_padding_is_significant() {
        // Matches FIND_IN_SET: elements are not trimmed
        let node = leaf("categories", Operator::InSet, 20i64);
        assert!(!evaluate(
            &node,
            &MapResolver::new().with("categories", "5, 20")
        ));
        assert!(evaluate(
            &node,
            &MapResolver::new().with("categories", "5,20")
        ));
    }

    #[test]
    fn test_like_is_case_insensitive_substring() {
        let node = leaf("name", Operator::Like, "%jacket%");
        assert!(evaluate(
            &node,
            &MapResolver::new().with("name", "Winter Jacket XL")
        ));
        assert!(!evaluate(&node, &MapResolver::new().with("name", "Shirt")));
    }

    #[test]
    fn test_like_without_wildcards_is_exact() {
        let node = leaf("name", Operator::Like, "jacket");
        assert!(evaluate(&node, &MapResolver::new().with("name", "JACKET")));
        assert!(!evaluate(
            &node,
            &MapResolver::new().with("name", "Winter Jacket")
        ));
    }

    #[test]
    fn test_like_underscore_wildcard() {
        let node = leaf("sku", Operator::Like, "SKU-_");
        assert!(evaluate(&node, &MapResolver::new().with("sku", "SKU-7")));
        assert!(!evaluate(&node, &MapResolver::new().with("sku", "SKU-77")));
    }

    #[test]
    fn test_not_like() {
        let node = leaf("name", Operator::NotLike, "%jacket%");
        assert!(evaluate(&node, &MapResolver::new().with("name", "Shirt")));
        assert!(!evaluate(
            &node,
            &MapResolver::new().with("name", "Jacket")
        ));
    }

    #[test]
    fn test_like_list_with_hint_is_membership() {
        let hints = AttributeHints::with_list_in_attributes(["category_ids"]);
        let node: ConditionNode = Condition::with_hints(
            "category_ids",
            Operator::Like,
            strings(&["3", "5"]),
            &hints,
        )
        .unwrap()
        .into();
        assert!(evaluate(
            &node,
            &MapResolver::new().with("category_ids", "5")
        ));
        assert!(!evaluate(
            &node,
            &MapResolver::new().with("category_ids", "7")
        ));
    }

    #[test]
    fn test_eq_with_list_is_and_joined() {
        // Historical quirk: equality against a list requires matching
        // every element, mirroring the AND-joined SQL shape.
        let node = leaf("sku", Operator::Eq, strings(&["A", "A"]));
        assert!(evaluate(&node, &MapResolver::new().with("sku", "A")));

        let node = leaf("sku", Operator::Eq, strings(&["A", "B"]));
        assert!(!evaluate(&node, &MapResolver::new().with("sku", "A")));
    }

    #[test]
    fn test_numeric_string_comparison() {
        let node = leaf("price", Operator::Gte, "10");
        assert!(evaluate(&node, &MapResolver::new().with("price", 10.5)));
        assert!(!evaluate(&node, &MapResolver::new().with("price", "9")));
    }

    #[test]
    fn test_empty_combine_conventions() {
        let all: ConditionNode = Combine::all().into();
        let any: ConditionNode = Combine::any().into();
        let resolver = MapResolver::new();

        assert!(evaluate(&all, &resolver));
        assert!(!evaluate(&any, &resolver));
    }

    #[test]
    fn test_empty_combine_negated() {
        let not_all: ConditionNode = Combine::all().negated().into();
        let not_any: ConditionNode = Combine::any().negated().into();
        let resolver = MapResolver::new();

        assert!(!evaluate(&not_all, &resolver));
        assert!(evaluate(&not_any, &resolver));
    }

    #[test]
    fn test_all_short_circuits_on_first_false() {
        let tree: ConditionNode = Combine::all()
            .add(leaf("qty", Operator::Gt, 100i64))
            .add(leaf("sku", Operator::Eq, "A"))
            .into();
        let resolver =
            CountingResolver::new(MapResolver::new().with("qty", 1i64).with("sku", "A"));

        assert!(!evaluate(&tree, &resolver));
        assert_eq!(resolver.seen(), vec!["qty".to_string()]);
    }

    #[test]
    fn test_any_short_circuits_on_first_true() {
        let tree: ConditionNode = Combine::any()
            .add(leaf("qty", Operator::Gt, 0i64))
            .add(leaf("sku", Operator::Eq, "A"))
            .into();
        let resolver =
            CountingResolver::new(MapResolver::new().with("qty", 1i64).with("sku", "A"));

        assert!(evaluate(&tree, &resolver));
        assert_eq!(resolver.lookups(), 1);
    }

    #[test]
    fn test_nested_negated_combine() {
        // NOT(any(qty > 5, all(sku == A, price < 10)))
        let tree: ConditionNode = Combine::any()
            .negated()
            .add(leaf("qty", Operator::Gt, 5i64))
            .add(
                Combine::all()
                    .add(leaf("sku", Operator::Eq, "A"))
                    .add(leaf("price", Operator::Lt, 10i64)),
            )
            .into();

        let matching = MapResolver::new()
            .with("qty", 1i64)
            .with("sku", "B")
            .with("price", 20i64);
        assert!(evaluate(&tree, &matching));

        let failing = MapResolver::new()
            .with("qty", 9i64)
            .with("sku", "B")
            .with("price", 20i64);
        assert!(!evaluate(&tree, &failing));
    }
}
