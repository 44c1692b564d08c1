//! Staged query builder.
//!
//! Each stage only exposes the transitions SQL grammar allows:
//!
//! ```text
//! select → from → [join → on]* → [where] → [group_by → [having]]
//!        → [order_by → [limit → [offset]]]
//! ```
//!
//! Clauses are appended to a flat [`QueryPlan`]; the only in-place edits are
//! to the most recent clause (the ON condition of the last join). Every stage
//! implements [`Stage`], so any of them can be rendered or wrapped as a
//! subquery.

mod stages;

pub use stages::{
    FromStage, GroupByStage, HavingStage, JoinStage, LimitStage, OffsetStage, OrderByStage,
    SelectStage, WhereStage,
};

use crate::condition::Condition;
use crate::expr::{Expr, Sort, SubQuery, Table};
use crate::render::{Render, RenderContext, RenderSession};
use std::sync::Arc;

/// Kind of JOIN clause
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JoinKind {
    /// `JOIN`
    Inner,
    /// `LEFT JOIN`
    Left,
    /// `RIGHT JOIN`
    Right,
}

impl JoinKind {
    /// SQL keyword
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Inner => "JOIN",
            Self::Left => "LEFT JOIN",
            Self::Right => "RIGHT JOIN",
        }
    }
}

/// Join target paired with its ON condition.
#[derive(Debug, Clone)]
pub struct JoinItem {
    /// Table to join
    pub target: Table,
    /// ON condition; `None` emits a bare JOIN
    pub on: Option<Condition>,
}

impl JoinItem {
    /// Join `target` on `on`
    pub fn new(target: impl Into<Table>, on: Condition) -> Self {
        Self {
            target: target.into(),
            on: Some(on),
        }
    }

    /// Join `target` without an ON clause
    pub fn bare(target: impl Into<Table>) -> Self {
        Self {
            target: target.into(),
            on: None,
        }
    }
}

/// One clause of a query.
#[derive(Debug, Clone)]
pub enum Clause {
    /// Select list; empty means `*`
    Select {
        /// `SELECT DISTINCT`
        distinct: bool,
        /// Selected expressions
        items: Vec<Expr>,
    },
    /// FROM source
    From(Table),
    /// JOIN clause
    Join {
        /// Join kind
        kind: JoinKind,
        /// Joined table
        target: Table,
        /// ON condition
        on: Option<Condition>,
    },
    /// WHERE condition
    Where(Condition),
    /// GROUP BY expressions
    GroupBy(Vec<Expr>),
    /// HAVING condition
    Having(Condition),
    /// ORDER BY items
    OrderBy(Vec<Sort>),
    /// LIMIT, written as a raw number
    Limit(u64),
    /// OFFSET, written as a raw number
    Offset(u64),
}

/// Ordered clause records making up one query.
#[derive(Debug, Clone, Default)]
pub struct QueryPlan {
    clauses: Vec<Clause>,
}

impl QueryPlan {
    /// Clauses in order
    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    fn push(&mut self, clause: Clause) {
        self.clauses.push(clause);
    }

    fn last_mut(&mut self) -> Option<&mut Clause> {
        self.clauses.last_mut()
    }

    /// Query text for all clauses, sharing `session` with the enclosing query.
    ///
    /// Limit and offset are written as literals, not placeholders.
    pub fn render_clauses(&self, session: &mut RenderSession<'_>) -> String {
        let mut sql = String::new();
        for clause in &self.clauses {
            match clause {
                Clause::Select { distinct, items } => {
                    sql.push_str("SELECT ");
                    if *distinct {
                        sql.push_str("DISTINCT ");
                    }
                    if items.is_empty() {
                        sql.push('*');
                    } else {
                        sql.push_str(&render_list(items, RenderContext::Definition, session));
                    }
                }
                Clause::From(table) => {
                    sql.push_str(" FROM ");
                    sql.push_str(&table.render(RenderContext::Definition, session));
                }
                Clause::Join { kind, target, on } => {
                    sql.push(' ');
                    sql.push_str(kind.as_str());
                    sql.push(' ');
                    sql.push_str(&target.render(RenderContext::Definition, session));
                    if let Some(on) = on {
                        sql.push_str(" ON ");
                        sql.push_str(&on.render(RenderContext::Reference, session));
                    }
                }
                Clause::Where(cond) => {
                    sql.push_str(" WHERE ");
                    sql.push_str(&cond.render(RenderContext::Reference, session));
                }
                Clause::GroupBy(items) => {
                    sql.push_str(" GROUP BY ");
                    sql.push_str(&render_list(items, RenderContext::Reference, session));
                }
                Clause::Having(cond) => {
                    sql.push_str(" HAVING ");
                    sql.push_str(&cond.render(RenderContext::Reference, session));
                }
                Clause::OrderBy(items) => {
                    sql.push_str(" ORDER BY ");
                    sql.push_str(&render_list(items, RenderContext::OrderBy, session));
                }
                Clause::Limit(n) => sql.push_str(&format!(" LIMIT {n}")),
                Clause::Offset(n) => sql.push_str(&format!(" OFFSET {n}")),
            }
        }
        sql
    }
}

fn render_list<R: Render>(items: &[R], ctx: RenderContext, session: &mut RenderSession<'_>) -> String {
    items
        .iter()
        .map(|item| item.render(ctx, session))
        .collect::<Vec<_>>()
        .join(", ")
}

impl Render for QueryPlan {
    fn render(&self, _ctx: RenderContext, session: &mut RenderSession<'_>) -> String {
        self.render_clauses(session)
    }
}

/// A query that can be rendered or embedded in another query.
pub trait Stage: Render {
    /// Clauses collected so far
    fn plan(&self) -> &QueryPlan;

    /// Anonymous subquery for scalar positions, `IN`, `ANY`/`ALL` and `EXISTS`
    fn as_subquery(&self) -> SubQuery {
        SubQuery::new(Arc::new(self.plan().clone()))
    }

    /// Derived table `(SELECT ...) AS alias`, usable in FROM, JOIN and the
    /// select list
    fn as_named_subquery(&self, alias: &str) -> Table {
        Table::derived(self.as_subquery(), Arc::from(alias))
    }
}

/// `SELECT items`
///
/// # Panics
///
/// Panics if `items` is empty; use [`select_all`] for `SELECT *`.
pub fn select(items: impl IntoIterator<Item = impl Into<Expr>>) -> SelectStage {
    SelectStage::new(false, collect_items(items))
}

/// `SELECT DISTINCT items`
///
/// # Panics
///
/// Panics if `items` is empty; use [`select_distinct_all`] for
/// `SELECT DISTINCT *`.
pub fn select_distinct(items: impl IntoIterator<Item = impl Into<Expr>>) -> SelectStage {
    SelectStage::new(true, collect_items(items))
}

/// `SELECT *`
pub fn select_all() -> SelectStage {
    SelectStage::new(false, Vec::new())
}

/// `SELECT DISTINCT *`
pub fn select_distinct_all() -> SelectStage {
    SelectStage::new(true, Vec::new())
}

fn collect_items(items: impl IntoIterator<Item = impl Into<Expr>>) -> Vec<Expr> {
    let items: Vec<Expr> = items.into_iter().map(Into::into).collect();
    assert!(!items.is_empty(), "select list must not be empty");
    items
}
