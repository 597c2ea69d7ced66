//! The condition tree
//!
//! A tree is either a `Condition` leaf (one attribute-operator-value
//! predicate) or a `Combine` aggregator (ALL/ANY over children, with an
//! optional negation). Nodes are immutable once constructed: a stale
//! condition is replaced, never mutated, so trees can be shared behind an
//! `Arc` without aliasing concerns.

use crate::error::{CoreError, Result};
use crate::hints::AttributeHints;
use crate::operator::Operator;
use crate::value::Value;

/// Boolean combinator kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Aggregator {
    /// Every child must match (AND)
    All,
    /// At least one child must match (OR)
    Any,
}

impl Aggregator {
    /// The persisted name for this aggregator
    pub fn as_str(&self) -> &'static str {
        match self {
            Aggregator::All => "all",
            Aggregator::Any => "any",
        }
    }

    /// Parse a persisted aggregator name
    pub fn from_str(name: &str) -> Option<Aggregator> {
        match name {
            "all" => Some(Aggregator::All),
            "any" => Some(Aggregator::Any),
            _ => None,
        }
    }
}

/// A single attribute-operator-value predicate
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    attribute: String,
    operator: Operator,
    value: Value,
}

impl Condition {
    /// Create a condition, validating the value shape against the
    /// operator's cardinality expectation. `Like`/`NotLike` with a list
    /// value is rejected here; use [`Condition::with_hints`] for
    /// attributes carrying the list-IN override.
    pub fn new(attribute: impl Into<String>, operator: Operator, value: Value) -> Result<Self> {
        Self::with_hints(attribute, operator, value, &AttributeHints::default())
    }

    /// Create a condition with attribute hints applied during validation
    pub fn with_hints(
        attribute: impl Into<String>,
        operator: Operator,
        value: Value,
        hints: &AttributeHints,
    ) -> Result<Self> {
        let attribute = attribute.into();

        // Conditions store concrete values; a null would evaluate and
        // compile to different results.
        if value == Value::Null {
            return Err(CoreError::ValueCardinality(format!(
                "{} cannot compare attribute {} against null",
                operator, attribute
            )));
        }

        // An empty list has no agreement-preserving SQL rendering: any
        // constant fragment would still select NULL-column rows the
        // evaluator fails on a missing attribute.
        if matches!(&value, Value::Array(items) if items.is_empty()) {
            return Err(CoreError::ValueCardinality(format!(
                "{} requires a non-empty list for attribute {}",
                operator, attribute
            )));
        }

        if operator.is_ordering() && value.is_list() {
            return Err(CoreError::ValueCardinality(format!(
                "{} requires a scalar value for attribute {}",
                operator, attribute
            )));
        }

        if matches!(operator, Operator::Like | Operator::NotLike)
            && value.is_list()
            && !hints.is_list_in(&attribute)
        {
            return Err(CoreError::ValueCardinality(format!(
                "{} takes a list value only for list-IN hinted attributes, got one for {}",
                operator, attribute
            )));
        }

        Ok(Self {
            attribute,
            operator,
            value,
        })
    }

    pub fn attribute(&self) -> &str {
        &self.attribute
    }

    pub fn operator(&self) -> Operator {
        self.operator
    }

    pub fn value(&self) -> &Value {
        &self.value
    }
}

/// A boolean combinator over child nodes.
///
/// Empty-combinator convention: `All` of no children is `true`, `Any` of
/// no children is `false`. An empty rule therefore matches everything.
/// Child order is preserved for SQL reproducibility only; it never
/// affects evaluation.
#[derive(Debug, Clone, PartialEq)]
pub struct Combine {
    aggregator: Aggregator,
    negated: bool,
    children: Vec<ConditionNode>,
}

impl Combine {
    /// An ALL (AND) combinator with no children yet
    pub fn all() -> Self {
        Self {
            aggregator: Aggregator::All,
            negated: false,
            children: Vec::new(),
        }
    }

    /// An ANY (OR) combinator with no children yet
    pub fn any() -> Self {
        Self {
            aggregator: Aggregator::Any,
            negated: false,
            children: Vec::new(),
        }
    }

    /// Negate the aggregate result
    pub fn negated(mut self) -> Self {
        self.negated = true;
        self
    }

    /// Append one child
    pub fn add(mut self, child: impl Into<ConditionNode>) -> Self {
        self.children.push(child.into());
        self
    }

    /// Replace the child list
    pub fn with_children(mut self, children: Vec<ConditionNode>) -> Self {
        self.children = children;
        self
    }

    pub fn aggregator(&self) -> Aggregator {
        self.aggregator
    }

    pub fn is_negated(&self) -> bool {
        self.negated
    }

    pub fn children(&self) -> &[ConditionNode] {
        &self.children
    }
}

/// A node of the condition tree: leaf or combinator. The sum type keeps
/// the recursive walks in the evaluator and the SQL compiler exhaustive.
#[derive(Debug, Clone, PartialEq)]
pub enum ConditionNode {
    Condition(Condition),
    Combine(Combine),
}

impl ConditionNode {
    /// Nesting depth of the tree (a leaf has depth 1)
    pub fn depth(&self) -> usize {
        match self {
            ConditionNode::Condition(_) => 1,
            ConditionNode::Combine(combine) => {
                1 + combine
                    .children()
                    .iter()
                    .map(ConditionNode::depth)
                    .max()
                    .unwrap_or(0)
            }
        }
    }
}

impl From<Condition> for ConditionNode {
    fn from(condition: Condition) -> Self {
        ConditionNode::Condition(condition)
    }
}

impl From<Combine> for ConditionNode {
    fn from(combine: Combine) -> Self {
        ConditionNode::Combine(combine)
    }
}
