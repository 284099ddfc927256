//! 列表过滤表达式

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Boolean operator combining the rules of a [`FilterExpr`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogicOp {
    #[default]
    And,
    Or,
}

/// Comparison operator of an atom rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleOp {
    Eq,
    Neq,
    Gt,
    Gte,
    Lt,
    Lte,
    In,
    Nin,
    /// contains, case sensitive
    Cs,
    /// contains, case insensitive
    Cis,
}

/// A single `field op value` predicate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AtomRule {
    pub field: String,
    pub op: RuleOp,
    pub value: Value,
}

/// A filter rule: either an atom or a nested expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterRule {
    Atom(AtomRule),
    Expr(FilterExpr),
}

impl FilterRule {
    /// `field = value`
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Atom(AtomRule {
            field: field.into(),
            op: RuleOp::Eq,
            value: value.into(),
        })
    }

    /// `field in (values...)`
    pub fn is_in<V: Into<Value>>(field: impl Into<String>, values: Vec<V>) -> Self {
        Self::Atom(AtomRule {
            field: field.into(),
            op: RuleOp::In,
            value: Value::Array(values.into_iter().map(Into::into).collect()),
        })
    }
}

/// Structured predicate tree owned by the caller of a list view.
///
/// The list controller treats it as opaque and forwards it verbatim to the
/// transport on both the page request and the count request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterExpr {
    pub op: LogicOp,
    pub rules: Vec<FilterRule>,
}

impl FilterExpr {
    /// Conjunction of `rules`.
    pub fn and(rules: Vec<FilterRule>) -> Self {
        Self {
            op: LogicOp::And,
            rules,
        }
    }

    /// Disjunction of `rules`.
    pub fn or(rules: Vec<FilterRule>) -> Self {
        Self {
            op: LogicOp::Or,
            rules,
        }
    }

    /// Append a rule, builder style.
    #[must_use]
    pub fn with(mut self, rule: FilterRule) -> Self {
        self.rules.push(rule);
        self
    }
}
