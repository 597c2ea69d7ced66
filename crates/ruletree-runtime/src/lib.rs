//! ruletree runtime - single-object evaluation
//!
//! Walks a condition tree against one in-memory object, resolved through
//! the [`AttributeResolver`] contract, and provides the [`Rule`]
//! container that lazily materializes persisted trees.

pub mod error;
pub mod eval;
pub mod resolver;
pub mod rule;

pub use error::RuntimeError;
pub use eval::evaluate;
pub use resolver::{AttributeResolver, ChainResolver, CountingResolver, MapResolver};
pub use rule::Rule;
