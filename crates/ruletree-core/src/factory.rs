//! Persisted tree format and the `ConditionFactory`
//!
//! A rule's conditions persist as one JSON document: a tagged, ordered
//! tree of plain records with no behavior. The factory rebuilds a
//! validated `ConditionNode` tree from that document (or from the legacy
//! format) and serializes trees back. Unknown discriminators, unknown
//! operator tokens, and cardinality mismatches fail the whole document;
//! a rule clause is never silently dropped.

use crate::error::{CoreError, Result};
use crate::hints::AttributeHints;
use crate::legacy;
use crate::operator::Operator;
use crate::tree::{Aggregator, Combine, Condition, ConditionNode};
use crate::value::Value;
use serde::{Deserialize, Serialize};

/// Maximum nesting depth accepted when materializing a persisted tree.
/// Corrupt or hostile documents fail loudly instead of recursing away.
pub const MAX_TREE_DEPTH: usize = 32;

/// One node of the persisted representation. Operator and aggregator stay
/// raw strings here so the factory can reject unknown tokens with context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SerializedNode {
    Condition {
        attribute: String,
        operator: String,
        value: Value,
    },
    Combine {
        aggregator: String,
        #[serde(default)]
        negated: bool,
        #[serde(default)]
        children: Vec<SerializedNode>,
    },
}

/// Rebuilds condition trees from persisted documents.
///
/// The factory is parameterized by [`AttributeHints`] so the same
/// document decodes under the validation rules of the rule type that
/// owns it (e.g. a catalog rule allowing list-IN on its category field).
#[derive(Debug, Clone, Default)]
pub struct ConditionFactory {
    hints: AttributeHints,
}

impl ConditionFactory {
    pub fn new(hints: AttributeHints) -> Self {
        Self { hints }
    }

    /// Materialize a tree from a persisted document, sniffing the format:
    /// legacy documents start with the legacy array marker, everything
    /// else must be JSON. Writing always goes through [`Self::to_json`].
    pub fn parse_document(&self, doc: &str) -> Result<ConditionNode> {
        if legacy::looks_legacy(doc) {
            self.parse_legacy(doc)
        } else {
            self.parse_json(doc)
        }
    }

    /// Materialize a tree from the current JSON format
    pub fn parse_json(&self, doc: &str) -> Result<ConditionNode> {
        let node: SerializedNode = serde_json::from_str(doc)
            .map_err(|e| CoreError::MalformedTree(e.to_string()))?;
        self.build(&node)
    }

    /// Materialize a tree from the legacy persisted format (read-only
    /// compatibility shim; the engine never writes this format)
    pub fn parse_legacy(&self, doc: &str) -> Result<ConditionNode> {
        let node = legacy::parse(doc)?;
        self.build(&node)
    }

    /// Build a validated tree from the persisted representation
    pub fn build(&self, node: &SerializedNode) -> Result<ConditionNode> {
        self.build_at(node, 1)
    }

    fn build_at(&self, node: &SerializedNode, depth: usize) -> Result<ConditionNode> {
        if depth > MAX_TREE_DEPTH {
            return Err(CoreError::DepthExceeded(MAX_TREE_DEPTH));
        }

        match node {
            SerializedNode::Condition {
                attribute,
                operator,
                value,
            } => {
                let operator = Operator::from_symbol(operator)
                    .ok_or_else(|| CoreError::UnknownOperator(operator.clone()))?;
                let condition =
                    Condition::with_hints(attribute.clone(), operator, value.clone(), &self.hints)?;
                Ok(ConditionNode::Condition(condition))
            }
            SerializedNode::Combine {
                aggregator,
                negated,
                children,
            } => {
                let aggregator = Aggregator::from_str(aggregator)
                    .ok_or_else(|| CoreError::UnknownAggregator(aggregator.clone()))?;
                let mut combine = match aggregator {
                    Aggregator::All => Combine::all(),
                    Aggregator::Any => Combine::any(),
                };
                if *negated {
                    combine = combine.negated();
                }
                let built = children
                    .iter()
                    .map(|child| self.build_at(child, depth + 1))
                    .collect::<Result<Vec<_>>>()?;
                Ok(ConditionNode::Combine(combine.with_children(built)))
            }
        }
    }

    /// Serialize a tree back to the persisted representation
    pub fn serialize(node: &ConditionNode) -> SerializedNode {
        match node {
            ConditionNode::Condition(condition) => SerializedNode::Condition {
                attribute: condition.attribute().to_string(),
                operator: condition.operator().symbol().to_string(),
                value: condition.value().clone(),
            },
            ConditionNode::Combine(combine) => SerializedNode::Combine {
                aggregator: combine.aggregator().as_str().to_string(),
                negated: combine.is_negated(),
                children: combine.children().iter().map(Self::serialize).collect(),
            },
        }
    }

    /// Serialize a tree to the current JSON document format
    pub fn to_json(node: &ConditionNode) -> Result<String> {
        serde_json::to_string(&Self::serialize(node))
            .map_err(|e| CoreError::MalformedTree(e.to_string()))
    }
}
