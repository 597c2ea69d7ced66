//! Attribute resolution contract
//!
//! The evaluator never inspects how a value was produced; it only asks a
//! resolver for the current value of an attribute. The resolver *is* the
//! object view: a cart, an order, a customer, or a composite of several.

use ruletree_core::Value;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;

/// Resolves an attribute of the object under evaluation.
/// `None` means the attribute is absent, which every operator treats as
/// "does not match" rather than an error.
pub trait AttributeResolver {
    fn resolve(&self, attribute: &str) -> Option<Value>;
}

impl AttributeResolver for HashMap<String, Value> {
    fn resolve(&self, attribute: &str) -> Option<Value> {
        self.get(attribute).cloned()
    }
}

/// A resolver backed by a plain attribute map
#[derive(Debug, Clone, Default)]
pub struct MapResolver {
    values: HashMap<String, Value>,
}

impl MapResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, attribute: impl Into<String>, value: impl Into<Value>) -> Self {
        self.values.insert(attribute.into(), value.into());
        self
    }

    pub fn set(&mut self, attribute: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(attribute.into(), value.into());
    }
}

impl AttributeResolver for MapResolver {
    fn resolve(&self, attribute: &str) -> Option<Value> {
        self.values.get(attribute).cloned()
    }
}

impl FromIterator<(String, Value)> for MapResolver {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

/// First-match composition of several resolvers. This is how a rule type
/// evaluates against a composite object (e.g. a quote plus its customer):
/// chain one resolver per constituent.
#[derive(Default)]
pub struct ChainResolver<'a> {
    sources: Vec<&'a dyn AttributeResolver>,
}

impl<'a> ChainResolver<'a> {
    pub fn new() -> Self {
        Self {
            sources: Vec::new(),
        }
    }

    pub fn push(mut self, source: &'a dyn AttributeResolver) -> Self {
        self.sources.push(source);
        self
    }
}

impl AttributeResolver for ChainResolver<'_> {
    fn resolve(&self, attribute: &str) -> Option<Value> {
        self.sources
            .iter()
            .find_map(|source| source.resolve(attribute))
    }
}

/// Wraps a resolver and counts lookups; used to observe short-circuit
/// behavior in tests.
pub struct CountingResolver<R> {
    inner: R,
    lookups: Cell<usize>,
    seen: RefCell<Vec<String>>,
}

impl<R> CountingResolver<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            lookups: Cell::new(0),
            seen: RefCell::new(Vec::new()),
        }
    }

    /// Number of resolve calls so far
    pub fn lookups(&self) -> usize {
        self.lookups.get()
    }

    /// Attribute names in resolution order
    pub fn seen(&self) -> Vec<String> {
        self.seen.borrow().clone()
    }
}

impl<R: AttributeResolver> AttributeResolver for CountingResolver<R> {
    fn resolve(&self, attribute: &str) -> Option<Value> {
        self.lookups.set(self.lookups.get() + 1);
        self.seen.borrow_mut().push(attribute.to_string());
        self.inner.resolve(attribute)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_resolver() {
        let resolver = MapResolver::new().with("qty", 10i64).with("sku", "A");
        assert_eq!(resolver.resolve("qty"), Some(Value::Number(10.0)));
        assert_eq!(resolver.resolve("missing"), None);
    }

    #[test]
    fn test_chain_resolver_first_match_wins() {
        let quote = MapResolver::new().with("grand_total", 120i64);
        let customer = MapResolver::new()
            .with("group_id", 2i64)
            .with("grand_total", -1i64);

        let chained = ChainResolver::new().push(&quote).push(&customer);
        assert_eq!(chained.resolve("grand_total"), Some(Value::Number(120.0)));
        assert_eq!(chained.resolve("group_id"), Some(Value::Number(2.0)));
        assert_eq!(chained.resolve("unknown"), None);
    }

    #[test]
    fn test_counting_resolver() {
        let counting = CountingResolver::new(MapResolver::new().with("qty", 1i64));
        counting.resolve("qty");
        counting.resolve("sku");
        assert_eq!(counting.lookups(), 2);
        assert_eq!(counting.seen(), vec!["qty".to_string(), "sku".to_string()]);
    }
}
