//! Expression nodes.
//!
//! Every node renders differently depending on the [`RenderContext`] it is
//! written in:
//! - `Definition` introduces aliases (`users.name AS user_name`)
//! - `Reference` is fully qualified and never aliased (`users.name`)
//! - `OrderBy` reuses an alias introduced by the select list (`user_name`)
//!
//! Nodes are immutable once built. Methods such as [`Column::alias`] return a
//! new node.

mod column;
mod function;
mod table;

pub use column::{Col, Column, ColumnType, TypeTag, Untyped};
pub use function::{
    abs, avg, coalesce, count, count_distinct, count_of, exists, length, lower, max, min, round,
    sum, trim, upper, Func, FuncCall,
};
pub use table::{Table, TableRef};

use crate::params::Value;
use crate::query::QueryPlan;
use crate::render::{Render, RenderContext, RenderSession};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Any renderable value expression.
#[derive(Debug, Clone)]
pub enum Expr {
    /// Column reference, or a fixed literal when unbound
    Column(Column),
    /// Literal bound to a placeholder, deduplicated by value
    Param(Value),
    /// Array literal bound to a placeholder, keyed by node identity
    Array(ArrayParam),
    /// Function or aggregate call
    Func(FuncCall),
    /// Children joined by a separator
    Composite(Composite),
    /// Anonymous subquery, rendered in parentheses
    SubQuery(SubQuery),
    /// Table in definition form (a named subquery in the select list)
    Table(Table),
    /// Table by alias or name only
    TableRef(TableRef),
}

impl Expr {
    /// Text written verbatim, such as `1` or `*`
    pub fn fixed(text: impl fmt::Display) -> Self {
        Self::Column(Column::fixed(text))
    }

    /// Literal bound to a placeholder
    pub fn param(value: impl Into<Value>) -> Self {
        Self::Param(value.into())
    }

    /// Array literal bound to a single placeholder
    pub fn array<V: Into<Value>>(values: impl IntoIterator<Item = V>) -> Self {
        Self::Array(ArrayParam::new(values))
    }

    /// Comma-separated list
    pub fn list(items: impl IntoIterator<Item = Expr>) -> Self {
        Self::Composite(Composite::new(", ", items))
    }

    /// Ascending sort on this expression
    pub fn asc(self) -> Sort {
        Sort::new(self, SortDirection::Asc)
    }

    /// Descending sort on this expression
    pub fn desc(self) -> Sort {
        Sort::new(self, SortDirection::Desc)
    }

    /// Append the column leaves of this node to `out`.
    ///
    /// Descends into function arguments and composites, not into subqueries.
    pub fn collect_columns(&self, out: &mut Vec<Column>) {
        match self {
            Self::Column(column) => out.push(column.clone()),
            Self::Func(call) => call.arg().collect_columns(out),
            Self::Composite(composite) => {
                for item in composite.items() {
                    item.collect_columns(out);
                }
            }
            Self::Param(_)
            | Self::Array(_)
            | Self::SubQuery(_)
            | Self::Table(_)
            | Self::TableRef(_) => {}
        }
    }

    /// Render wrapped in parentheses unless it already is a subquery
    pub(crate) fn render_parenthesized(&self, session: &mut RenderSession<'_>) -> String {
        match self {
            Self::SubQuery(sub) => sub.render(RenderContext::Reference, session),
            other => format!("({})", other.render(RenderContext::Reference, session)),
        }
    }
}

impl Render for Expr {
    fn render(&self, ctx: RenderContext, session: &mut RenderSession<'_>) -> String {
        match self {
            Self::Column(column) => column.render(ctx, session),
            Self::Param(value) => session.bind(value),
            Self::Array(array) => array.render(ctx, session),
            Self::Func(call) => call.render(ctx, session),
            Self::Composite(composite) => composite.render(ctx, session),
            Self::SubQuery(sub) => sub.render(ctx, session),
            Self::Table(table) => table.render(ctx, session),
            Self::TableRef(table) => table.render(ctx, session),
        }
    }
}

impl From<Value> for Expr {
    fn from(value: Value) -> Self {
        Self::Param(value)
    }
}

/// Children rendered in order and joined by a fixed separator.
#[derive(Debug, Clone)]
pub struct Composite {
    separator: Arc<str>,
    items: Vec<Expr>,
}

impl Composite {
    /// Join `items` with `separator`
    pub fn new(separator: impl Into<Arc<str>>, items: impl IntoIterator<Item = Expr>) -> Self {
        Self {
            separator: separator.into(),
            items: items.into_iter().collect(),
        }
    }

    /// Child nodes
    pub fn items(&self) -> &[Expr] {
        &self.items
    }
}

impl Render for Composite {
    fn render(&self, ctx: RenderContext, session: &mut RenderSession<'_>) -> String {
        self.items
            .iter()
            .map(|item| item.render(ctx, session))
            .collect::<Vec<_>>()
            .join(&self.separator)
    }
}

impl From<Composite> for Expr {
    fn from(composite: Composite) -> Self {
        Self::Composite(composite)
    }
}

static NEXT_ARRAY_ID: AtomicU64 = AtomicU64::new(1);

/// Array literal with its own identity.
///
/// Two arrays with equal content built separately bind two parameters;
/// clones of one array share a parameter.
#[derive(Debug, Clone)]
pub struct ArrayParam {
    id: u64,
    value: Value,
}

impl ArrayParam {
    /// Build an array literal from `values`
    pub fn new<V: Into<Value>>(values: impl IntoIterator<Item = V>) -> Self {
        Self {
            id: NEXT_ARRAY_ID.fetch_add(1, Ordering::Relaxed),
            value: Value::Array(values.into_iter().map(Into::into).collect()),
        }
    }

    /// Node identity used as the parameter key
    pub fn id(&self) -> u64 {
        self.id
    }

    /// The array value
    pub fn value(&self) -> &Value {
        &self.value
    }
}

impl Render for ArrayParam {
    fn render(&self, _ctx: RenderContext, session: &mut RenderSession<'_>) -> String {
        session.bind_node(self.id, &self.value)
    }
}

impl From<ArrayParam> for Expr {
    fn from(array: ArrayParam) -> Self {
        Self::Array(array)
    }
}

/// A finished query used as an expression.
#[derive(Debug, Clone)]
pub struct SubQuery {
    plan: Arc<QueryPlan>,
}

impl SubQuery {
    pub(crate) fn new(plan: Arc<QueryPlan>) -> Self {
        Self { plan }
    }

    /// The wrapped query
    pub fn plan(&self) -> &QueryPlan {
        &self.plan
    }

    /// Whether two handles point at the same query
    pub fn same_as(&self, other: &SubQuery) -> bool {
        Arc::ptr_eq(&self.plan, &other.plan)
    }

    /// Query text without surrounding parentheses
    pub fn render_bare(&self, session: &mut RenderSession<'_>) -> String {
        self.plan.render_clauses(session)
    }
}

impl Render for SubQuery {
    fn render(&self, _ctx: RenderContext, session: &mut RenderSession<'_>) -> String {
        format!("({})", self.render_bare(session))
    }
}

impl From<SubQuery> for Expr {
    fn from(sub: SubQuery) -> Self {
        Self::SubQuery(sub)
    }
}

/// Sort direction for ORDER BY items.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    /// `ASC`
    Asc,
    /// `DESC`
    Desc,
}

impl SortDirection {
    /// SQL keyword
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// ORDER BY item
#[derive(Debug, Clone)]
pub struct Sort {
    expr: Expr,
    direction: SortDirection,
}

impl Sort {
    /// Sort `expr` in `direction`
    pub fn new(expr: impl Into<Expr>, direction: SortDirection) -> Self {
        Self {
            expr: expr.into(),
            direction,
        }
    }

    /// Sorted expression
    pub fn expr(&self) -> &Expr {
        &self.expr
    }

    /// Sort direction
    pub fn direction(&self) -> SortDirection {
        self.direction
    }
}

impl Render for Sort {
    fn render(&self, _ctx: RenderContext, session: &mut RenderSession<'_>) -> String {
        format!(
            "{} {}",
            self.expr.render(RenderContext::OrderBy, session),
            self.direction.as_str()
        )
    }
}

/// An expression with a known column type, accepted by typed functions.
pub trait TypedExpr: Into<Expr> {
    /// Value type produced by the expression
    type Type: ColumnType;
}

/// Build a `Vec<Expr>` from nodes of mixed types.
///
/// ```
/// use sqlweave::{exprs, Table};
///
/// let users = Table::new("users");
/// let id = users.column::<i64>("id");
/// let name = users.column::<String>("name");
/// let items = exprs![&id, &name];
/// assert_eq!(items.len(), 2);
/// ```
#[macro_export]
macro_rules! exprs {
    ($($item:expr),* $(,)?) => {
        vec![$($crate::Expr::from($item)),*]
    };
}
