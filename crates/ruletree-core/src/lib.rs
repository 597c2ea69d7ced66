//! ruletree core - data model for the condition-tree rule engine
//!
//! This crate provides the types shared by both evaluation modes:
//! - `Value` for attribute and comparison values
//! - `Operator`, the closed operator set
//! - the condition tree (`Condition`, `Combine`, `ConditionNode`)
//! - the persisted JSON format and the legacy-format reader
//! - `ConditionFactory` for (de)serializing trees

pub mod error;
pub mod factory;
pub mod hints;
pub mod legacy;
pub mod operator;
pub mod tree;
pub mod value;

// Re-export commonly used types
pub use error::CoreError;
pub use factory::{ConditionFactory, SerializedNode};
pub use hints::AttributeHints;
pub use operator::Operator;
pub use tree::{Aggregator, Combine, Condition, ConditionNode};
pub use value::Value;
