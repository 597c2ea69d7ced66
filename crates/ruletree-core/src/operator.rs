//! The closed operator set for condition leaves
//!
//! Operators serialize as the historical tokens (`==`, `{}`, `!()`, ...)
//! so persisted rules stay readable by older tooling.

use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Binary condition operators. Always attribute-vs-value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    /// Equal (`==`)
    Eq,
    /// Not equal (`!=`)
    Neq,
    /// Greater than (`>`)
    Gt,
    /// Greater than or equal (`>=`)
    Gte,
    /// Less than (`<`)
    Lt,
    /// Less than or equal (`<=`)
    Lte,
    /// Substring / pattern match (`{}`)
    Like,
    /// Negated substring match (`!{}`)
    NotLike,
    /// Is one of a CSV-stored set (`()`)
    InSet,
    /// Is none of a CSV-stored set (`!()`)
    NotInSet,
    /// Contains any of a CSV-stored set (`[]`)
    AnyOfSet,
    /// Contains none of a CSV-stored set (`![]`)
    NotAnyOfSet,
}

impl Operator {
    /// The persisted token for this operator
    pub fn symbol(&self) -> &'static str {
        match self {
            Operator::Eq => "==",
            Operator::Neq => "!=",
            Operator::Gt => ">",
            Operator::Gte => ">=",
            Operator::Lt => "<",
            Operator::Lte => "<=",
            Operator::Like => "{}",
            Operator::NotLike => "!{}",
            Operator::InSet => "()",
            Operator::NotInSet => "!()",
            Operator::AnyOfSet => "[]",
            Operator::NotAnyOfSet => "![]",
        }
    }

    /// Parse a persisted token back into an operator
    pub fn from_symbol(token: &str) -> Option<Operator> {
        Some(match token {
            "==" => Operator::Eq,
            "!=" => Operator::Neq,
            ">" => Operator::Gt,
            ">=" => Operator::Gte,
            "<" => Operator::Lt,
            "<=" => Operator::Lte,
            "{}" => Operator::Like,
            "!{}" => Operator::NotLike,
            "()" => Operator::InSet,
            "!()" => Operator::NotInSet,
            "[]" => Operator::AnyOfSet,
            "![]" => Operator::NotAnyOfSet,
            _ => return None,
        })
    }

    /// Returns true for the ordering operators (`>`, `>=`, `<`, `<=`)
    pub fn is_ordering(&self) -> bool {
        matches!(
            self,
            Operator::Gt | Operator::Gte | Operator::Lt | Operator::Lte
        )
    }

    /// Returns true for the negated forms
    pub fn is_negation(&self) -> bool {
        matches!(
            self,
            Operator::Neq | Operator::NotLike | Operator::NotInSet | Operator::NotAnyOfSet
        )
    }

    /// Returns true for the find-in-set family
    pub fn is_set_scan(&self) -> bool {
        matches!(
            self,
            Operator::InSet | Operator::NotInSet | Operator::AnyOfSet | Operator::NotAnyOfSet
        )
    }

    /// Returns true if the operator accepts a list value without any
    /// attribute-specific hint. Ordering operators are scalar-only;
    /// `Like`/`NotLike` accept lists only for hinted attributes.
    pub fn accepts_list_value(&self) -> bool {
        matches!(
            self,
            Operator::Eq
                | Operator::Neq
                | Operator::InSet
                | Operator::NotInSet
                | Operator::AnyOfSet
                | Operator::NotAnyOfSet
        )
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl Serialize for Operator {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.symbol())
    }
}

impl<'de> Deserialize<'de> for Operator {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let token = String::deserialize(deserializer)?;
        Operator::from_symbol(&token)
            .ok_or_else(|| D::Error::custom(format!("unknown operator token: {}", token)))
    }
}
