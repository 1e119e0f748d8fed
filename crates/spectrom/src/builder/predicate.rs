//! WHERE predicate tree and recursive clause rendering.

use crate::error::SpectromError;
use crate::ident::ColumnRef;
use crate::value::Value;
use std::str::FromStr;

/// AND/OR connector between sibling predicates.
///
/// A predicate's joiner describes how it combines with the *previous*
/// predicate in its containing sequence, not anything about its own logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Joiner {
    And,
    Or,
}

impl Joiner {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::And => "AND",
            Self::Or => "OR",
        }
    }
}

impl FromStr for Joiner {
    type Err = SpectromError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "AND" => Ok(Self::And),
            "OR" => Ok(Self::Or),
            other => Err(SpectromError::input(format!(
                "unrecognized conditional: {other}"
            ))),
        }
    }
}

/// Comparison operator for simple predicates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
}

impl CmpOp {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Ne => "!=",
            Self::Lt => "<",
            Self::Gt => ">",
            Self::Le => "<=",
            Self::Ge => ">=",
        }
    }
}

impl FromStr for CmpOp {
    type Err = SpectromError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "=" => Ok(Self::Eq),
            "!=" => Ok(Self::Ne),
            "<" => Ok(Self::Lt),
            ">" => Ok(Self::Gt),
            "<=" => Ok(Self::Le),
            ">=" => Ok(Self::Ge),
            other => Err(SpectromError::input(format!(
                "unrecognized comparison operator: {other}"
            ))),
        }
    }
}

/// The tagged union of predicate forms.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum PredicateKind {
    /// column op value (value NULL renders as IS NULL / IS NOT NULL)
    Compare {
        column: ColumnRef,
        op: CmpOp,
        value: Value,
    },
    /// Verbatim condition string
    Raw(String),
    /// column IN (...) / NOT IN (...)
    InList {
        column: ColumnRef,
        values: Vec<Value>,
        negated: bool,
    },
    /// Nested group rendered inside parentheses
    Group(Vec<Predicate>),
}

/// One condition or condition-group contributing to a WHERE clause.
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    pub(crate) joiner: Joiner,
    pub(crate) kind: PredicateKind,
}

impl Predicate {
    pub(crate) fn compare(joiner: Joiner, column: ColumnRef, op: CmpOp, value: Value) -> Self {
        Self {
            joiner,
            kind: PredicateKind::Compare { column, op, value },
        }
    }

    pub(crate) fn raw(joiner: Joiner, condition: impl Into<String>) -> Self {
        Self {
            joiner,
            kind: PredicateKind::Raw(condition.into()),
        }
    }

    pub(crate) fn in_list(
        joiner: Joiner,
        column: ColumnRef,
        values: Vec<Value>,
        negated: bool,
    ) -> Self {
        Self {
            joiner,
            kind: PredicateKind::InList {
                column,
                values,
                negated,
            },
        }
    }

    pub(crate) fn group(joiner: Joiner, children: Vec<Predicate>) -> Self {
        Self {
            joiner,
            kind: PredicateKind::Group(children),
        }
    }
}

/// Render a predicate sequence into a WHERE-clause fragment.
///
/// Every predicate but the first in its scope is prefixed by its joiner;
/// groups recurse with the same rule applied to their children.
pub(crate) fn render_predicates(predicates: &[Predicate]) -> String {
    let mut out = String::new();
    for (i, predicate) in predicates.iter().enumerate() {
        if i > 0 {
            out.push(' ');
            out.push_str(predicate.joiner.as_str());
            out.push(' ');
        }
        render_one(predicate, &mut out);
    }
    out
}

fn render_one(predicate: &Predicate, out: &mut String) {
    match &predicate.kind {
        PredicateKind::Compare { column, op, value } => {
            column.write_sql(out);
            if value.is_null() {
                out.push_str(match op {
                    CmpOp::Eq => " IS NULL",
                    _ => " IS NOT NULL",
                });
            } else {
                out.push(' ');
                out.push_str(op.as_str());
                out.push(' ');
                value.write_sql(out);
            }
        }
        PredicateKind::Raw(condition) => out.push_str(condition),
        PredicateKind::InList {
            column,
            values,
            negated,
        } => {
            column.write_sql(out);
            out.push_str(if *negated { " NOT IN (" } else { " IN (" });
            for (i, value) in values.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                value.write_sql(out);
            }
            out.push(')');
        }
        PredicateKind::Group(children) => {
            out.push_str("( ");
            out.push_str(&render_predicates(children));
            out.push_str(" )");
        }
    }
}

/// Collect the unqualified column names referenced by a predicate tree,
/// recursing into groups. Raw conditions are not inspected.
pub(crate) fn collect_checked_columns(predicates: &[Predicate], out: &mut Vec<String>) {
    for predicate in predicates {
        match &predicate.kind {
            PredicateKind::Compare { column, .. } | PredicateKind::InList { column, .. } => {
                if !column.is_qualified() {
                    out.push(column.column().to_string());
                }
            }
            PredicateKind::Group(children) => collect_checked_columns(children, out),
            PredicateKind::Raw(_) => {}
        }
    }
}
