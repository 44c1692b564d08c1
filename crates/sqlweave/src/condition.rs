//! Boolean conditions for WHERE, HAVING and ON clauses.
//!
//! Chains are flat: `a.and(b).and(c)` renders `A AND B AND C` and mixing
//! `and`/`or` follows SQL precedence. Wrap a chain with
//! [`Condition::grouped`] to parenthesize it.

use crate::expr::{Column, Expr, SubQuery};
use crate::params::Value;
use crate::render::{Render, RenderContext, RenderSession};

/// Binary comparison operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompareOp {
    /// `=`
    Eq,
    /// `<>`
    Ne,
    /// `>`
    Gt,
    /// `>=`
    Ge,
    /// `<`
    Lt,
    /// `<=`
    Le,
    /// `LIKE`
    Like,
    /// `ILIKE`
    ILike,
}

impl CompareOp {
    /// SQL spelling
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Ne => "<>",
            Self::Gt => ">",
            Self::Ge => ">=",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Like => "LIKE",
            Self::ILike => "ILIKE",
        }
    }
}

/// `ANY` or `ALL`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Quantifier {
    /// `ANY(...)`
    Any,
    /// `ALL(...)`
    All,
}

impl Quantifier {
    /// SQL keyword
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Any => "ANY",
            Self::All => "ALL",
        }
    }
}

/// Chain connector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Connector {
    /// `AND`
    And,
    /// `OR`
    Or,
}

impl Connector {
    fn separator(self) -> &'static str {
        match self {
            Self::And => " AND ",
            Self::Or => " OR ",
        }
    }
}

/// A boolean expression.
#[derive(Debug, Clone)]
pub enum Condition {
    /// `left op right`
    Compare {
        /// Left operand
        left: Expr,
        /// Operator
        op: CompareOp,
        /// Right operand
        right: Expr,
    },
    /// `left op <placeholder>`
    CompareParam {
        /// Left operand
        left: Expr,
        /// Operator
        op: CompareOp,
        /// Bound literal
        value: Value,
    },
    /// `left IN (<placeholder>, ...)`
    InList {
        /// Tested operand
        left: Expr,
        /// Bound literals
        values: Vec<Value>,
    },
    /// `left IN (subquery)`
    InSet {
        /// Tested operand
        left: Expr,
        /// Set expression, usually a subquery
        set: Expr,
    },
    /// `left op ANY|ALL(set)`
    Quantified {
        /// Left operand
        left: Expr,
        /// Operator
        op: CompareOp,
        /// `ANY` or `ALL`
        quantifier: Quantifier,
        /// Subquery or array literal
        set: Expr,
    },
    /// `operand IS [NOT] NULL`
    NullCheck {
        /// Tested operand
        operand: Expr,
        /// `IS NOT NULL` when set
        negated: bool,
    },
    /// `EXISTS(subquery)`
    Exists(SubQuery),
    /// Flat `AND`/`OR` chain
    Chain {
        /// Connector between items
        connector: Connector,
        /// Chained conditions, in order
        items: Vec<Condition>,
    },
    /// Parenthesized condition
    Grouped(Box<Condition>),
}

impl Condition {
    /// `left op right`
    pub fn compare(left: Expr, op: CompareOp, right: Expr) -> Self {
        Self::Compare { left, op, right }
    }

    /// `left op <placeholder>`
    pub fn compare_param(left: Expr, op: CompareOp, value: Value) -> Self {
        Self::CompareParam { left, op, value }
    }

    /// `left IN (<placeholder>, ...)`
    pub fn in_list(left: Expr, values: Vec<Value>) -> Self {
        Self::InList { left, values }
    }

    /// `left IN (set)`
    pub fn in_set(left: Expr, set: Expr) -> Self {
        Self::InSet { left, set }
    }

    /// `left op ANY|ALL(set)`
    pub fn quantified(left: Expr, op: CompareOp, quantifier: Quantifier, set: Expr) -> Self {
        Self::Quantified {
            left,
            op,
            quantifier,
            set,
        }
    }

    /// `operand IS NULL`, or `IS NOT NULL` when `negated`
    pub fn null_check(operand: Expr, negated: bool) -> Self {
        Self::NullCheck { operand, negated }
    }

    /// `EXISTS(subquery)`
    pub fn exists(sub: SubQuery) -> Self {
        Self::Exists(sub)
    }

    /// `1 = 1`, a neutral seed for folding conditions with `and`
    pub fn identity() -> Self {
        Self::compare(Expr::fixed(1), CompareOp::Eq, Expr::fixed(1))
    }

    /// Conjunction of `conditions`, or [`Condition::identity`] when empty
    pub fn all(conditions: impl IntoIterator<Item = Condition>) -> Self {
        let mut iter = conditions.into_iter();
        match iter.next() {
            Some(first) => iter.fold(first, Condition::and),
            None => Self::identity(),
        }
    }

    /// `self AND other`, extending an existing AND chain
    pub fn and(self, other: Condition) -> Self {
        self.connect(Connector::And, other)
    }

    /// `self OR other`, extending an existing OR chain
    pub fn or(self, other: Condition) -> Self {
        self.connect(Connector::Or, other)
    }

    /// `(self)`
    pub fn grouped(self) -> Self {
        Self::Grouped(Box::new(self))
    }

    fn connect(self, connector: Connector, other: Condition) -> Self {
        match self {
            Self::Chain {
                connector: existing,
                mut items,
            } if existing == connector => {
                items.push(other);
                Self::Chain { connector, items }
            }
            first => Self::Chain {
                connector,
                items: vec![first, other],
            },
        }
    }

    /// Column leaves this condition touches, in render order.
    ///
    /// Subqueries are opaque: their inner columns are not listed.
    pub fn columns(&self) -> Vec<Column> {
        let mut out = Vec::new();
        self.collect_columns(&mut out);
        out
    }

    fn collect_columns(&self, out: &mut Vec<Column>) {
        match self {
            Self::Compare { left, right, .. } => {
                left.collect_columns(out);
                right.collect_columns(out);
            }
            Self::CompareParam { left, .. } | Self::InList { left, .. } => {
                left.collect_columns(out);
            }
            Self::InSet { left, set } | Self::Quantified { left, set, .. } => {
                left.collect_columns(out);
                set.collect_columns(out);
            }
            Self::NullCheck { operand, .. } => operand.collect_columns(out),
            Self::Exists(_) => {}
            Self::Chain { items, .. } => {
                for item in items {
                    item.collect_columns(out);
                }
            }
            Self::Grouped(inner) => inner.collect_columns(out),
        }
    }
}

impl Render for Condition {
    fn render(&self, _ctx: RenderContext, session: &mut RenderSession<'_>) -> String {
        let operand = RenderContext::Reference;
        match self {
            Self::Compare { left, op, right } => format!(
                "{} {} {}",
                left.render(operand, session),
                op.as_str(),
                right.render(operand, session)
            ),
            Self::CompareParam { left, op, value } => {
                let left = left.render(operand, session);
                format!("{left} {} {}", op.as_str(), session.bind(value))
            }
            // An empty IN list is not valid SQL; render an always-false test instead
            Self::InList { values, .. } if values.is_empty() => "1 = 0".to_string(),
            Self::InList { left, values } => {
                let left = left.render(operand, session);
                let placeholders: Vec<String> =
                    values.iter().map(|value| session.bind(value)).collect();
                format!("{left} IN ({})", placeholders.join(", "))
            }
            Self::InSet { left, set } => {
                let left = left.render(operand, session);
                format!("{left} IN {}", set.render_parenthesized(session))
            }
            Self::Quantified {
                left,
                op,
                quantifier,
                set,
            } => {
                let left = left.render(operand, session);
                format!(
                    "{left} {} {}{}",
                    op.as_str(),
                    quantifier.as_str(),
                    set.render_parenthesized(session)
                )
            }
            Self::NullCheck { operand: expr, negated } => {
                let keyword = if *negated { "IS NOT NULL" } else { "IS NULL" };
                format!("{} {keyword}", expr.render(operand, session))
            }
            Self::Exists(sub) => format!("EXISTS({})", sub.render_bare(session)),
            Self::Chain { connector, items } => items
                .iter()
                .map(|item| item.render(operand, session))
                .collect::<Vec<_>>()
                .join(connector.separator()),
            Self::Grouped(inner) => format!("({})", inner.render(operand, session)),
        }
    }
}
