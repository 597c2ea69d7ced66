//! Attribute-level compatibility hints
//!
//! Carries the attribute-name-based exceptions that change how a condition
//! is validated and compiled. The only hint today is the list-IN override:
//! attributes (historically "category id" style fields) whose `Like`
//! comparisons against a list value switch to an `IN (...)` fragment.
//! Hints are constructed explicitly and injected where needed; there is
//! no process-wide table.

use std::collections::HashSet;

/// Explicitly constructed attribute hints, injected into
/// `ConditionFactory` and the condition constructors.
#[derive(Debug, Clone, Default)]
pub struct AttributeHints {
    list_in: HashSet<String>,
}

impl AttributeHints {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hints with the given attributes allowed to take list values under
    /// `Like`/`NotLike`, compiling to `IN (...)` instead of a pattern match.
    pub fn with_list_in_attributes<I, S>(attributes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            list_in: attributes.into_iter().map(Into::into).collect(),
        }
    }

    /// Add one attribute to the list-IN override set
    pub fn allow_list_in(&mut self, attribute: impl Into<String>) {
        self.list_in.insert(attribute.into());
    }

    /// Whether `Like`/`NotLike` with a list value is allowed for this
    /// attribute (and compiles to `IN`/`NOT IN`)
    pub fn is_list_in(&self, attribute: &str) -> bool {
        self.list_in.contains(attribute)
    }
}
