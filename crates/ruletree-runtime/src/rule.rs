//! The rule container
//!
//! Owns a persisted condition document, materializes it once through the
//! `ConditionFactory`, and exposes `validate`. The memoized tree sits
//! behind an `Arc`: an in-flight evaluation holds its own handle, so
//! replacing the rule's definition mid-request never tears an ongoing
//! walk; the next access simply re-materializes.

use crate::error::Result;
use crate::eval::evaluate;
use crate::resolver::AttributeResolver;
use once_cell::unsync::OnceCell;
use ruletree_core::{AttributeHints, Combine, ConditionFactory, ConditionNode};
use std::sync::Arc;

/// A rule: an identifier plus a (lazily materialized) condition tree.
///
/// Rule-type metadata (dates, scope, priority) lives with the owning
/// feature; only the condition side is modeled here. A rule with no
/// conditions materializes an empty ALL combinator, which matches
/// everything.
#[derive(Debug)]
pub struct Rule {
    id: String,
    serialized: Option<String>,
    factory: ConditionFactory,
    tree: OnceCell<Arc<ConditionNode>>,
}

impl Rule {
    pub fn new(id: impl Into<String>) -> Self {
        Self::with_hints(id, AttributeHints::default())
    }

    /// A rule whose factory validates and compiles under the given
    /// attribute hints. This is the binding point for concrete rule
    /// types; the evaluation machinery itself is shared.
    pub fn with_hints(id: impl Into<String>, hints: AttributeHints) -> Self {
        Self {
            id: id.into(),
            serialized: None,
            factory: ConditionFactory::new(hints),
            tree: OnceCell::new(),
        }
    }

    /// Attach a persisted condition document (JSON or legacy)
    pub fn with_serialized(mut self, doc: impl Into<String>) -> Self {
        self.serialized = Some(doc.into());
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Replace the persisted document, invalidating the memoized tree
    pub fn set_serialized(&mut self, doc: impl Into<String>) {
        self.serialized = Some(doc.into());
        self.tree = OnceCell::new();
    }

    /// Replace the condition tree directly, invalidating the memo
    pub fn set_conditions(&mut self, root: ConditionNode) {
        self.serialized = None;
        let cell = OnceCell::new();
        let _ = cell.set(Arc::new(root));
        self.tree = cell;
    }

    /// The materialized condition tree, built on first access. A corrupt
    /// document fails here, logged with the rule id; it never degrades
    /// into an always-true or always-false tree.
    pub fn conditions(&self) -> Result<Arc<ConditionNode>> {
        let tree = self.tree.get_or_try_init(|| {
            let node = match self.serialized.as_deref() {
                Some(doc) => self.factory.parse_document(doc).map_err(|e| {
                    tracing::error!(rule_id = %self.id, error = %e, "failed to materialize condition tree");
                    e
                })?,
                None => ConditionNode::Combine(Combine::all()),
            };
            Ok::<_, crate::error::RuntimeError>(Arc::new(node))
        })?;
        Ok(Arc::clone(tree))
    }

    /// Does the object behind `resolver` satisfy this rule's conditions?
    pub fn validate(&self, resolver: &dyn AttributeResolver) -> Result<bool> {
        let tree = self.conditions()?;
        Ok(evaluate(&tree, resolver))
    }

    /// Serialize the current tree to the current JSON document format.
    /// This is the write path of the legacy migration: whatever format a
    /// rule was read from, it is persisted back as JSON.
    pub fn to_json(&self) -> Result<String> {
        let tree = self.conditions()?;
        Ok(ConditionFactory::to_json(&tree)?)
    }
}
