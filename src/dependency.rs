//! Display dependencies between preferences
//!
//! An entry may declare `"if": "other_key == 1"` in its schema definition,
//! meaning it is only displayed while the named preference's current value
//! satisfies the comparison. Each entry variant decides which operators it
//! understands; the group re-evaluates all dependencies after loads and
//! updates.

use std::fmt;
use tracing::debug;

/// Comparison operator in a dependency expression
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Eq,
    Ne,
    Gt,
    Lt,
    Ge,
    Le,
}

impl Operator {
    fn parse(text: &str) -> Option<Self> {
        match text {
            "==" => Some(Self::Eq),
            "!=" => Some(Self::Ne),
            ">" => Some(Self::Gt),
            "<" => Some(Self::Lt),
            ">=" => Some(Self::Ge),
            "<=" => Some(Self::Le),
            _ => None,
        }
    }

    /// Apply the comparison to integer operands
    pub fn compare_int(self, left: i64, right: i64) -> bool {
        match self {
            Self::Eq => left == right,
            Self::Ne => left != right,
            Self::Gt => left > right,
            Self::Lt => left < right,
            Self::Ge => left >= right,
            Self::Le => left <= right,
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Eq => "==",
            Self::Ne => "!=",
            Self::Gt => ">",
            Self::Lt => "<",
            Self::Ge => ">=",
            Self::Le => "<=",
        };
        f.write_str(s)
    }
}

/// A parsed dependency rule: this entry displays only while the preference
/// at `key` satisfies `<key> <operator> <value>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dependency {
    pub key: String,
    pub operator: Operator,
    pub value: String,
    /// Whether the rule currently passes; refreshed by the owning group
    pub passed: bool,
}

impl Dependency {
    /// Parse an expression of the form `<key> <operator> <value>`.
    /// Whitespace around the operator is optional. Returns None for anything
    /// that does not match; a malformed rule means "always display".
    pub fn parse(expression: &str) -> Option<Self> {
        let expression = expression.trim();
        if expression.is_empty() {
            return None;
        }

        let op_start = expression.find(|c| "!=<>".contains(c))?;
        let op_end = expression[op_start..]
            .find(|c: char| !"!=<>".contains(c))
            .map(|n| op_start + n)?;

        let key = expression[..op_start].trim();
        let operator = Operator::parse(&expression[op_start..op_end])?;
        let value = expression[op_end..].trim();
        if key.is_empty() || value.is_empty() {
            debug!(expression = %expression, "Ignoring malformed dependency expression");
            return None;
        }

        Some(Self {
            key: key.to_string(),
            operator,
            value: value.to_string(),
            passed: true,
        })
    }

    /// The dependency value interpreted as an integer, if it is one
    pub fn int_value(&self) -> Option<i64> {
        self.value.parse().ok()
    }

    /// The dependency value interpreted as a boolean
    pub fn bool_value(&self) -> bool {
        self.value == "true"
    }
}
