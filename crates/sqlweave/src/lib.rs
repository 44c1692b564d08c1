//! Typed SQL query composer
//!
//! Queries are assembled from typed tables, columns, functions and
//! conditions, then rendered to SQL text plus an ordered parameter list.
//!
//! ## Features
//!
//! - **Context-aware rendering**: aliases are introduced in the select list,
//!   dropped in WHERE/ON/GROUP BY and reused in ORDER BY
//! - **Parameter deduplication**: equal literals share one placeholder, and
//!   ordinals are dense in first-seen order
//! - **Staged builder**: only grammatical clause orders compile
//! - **Dialects**: `?` or `$N` placeholders, chosen per render call
//! - **Join inference**: shortest join chains from a foreign-key graph
//!
//! ## Usage
//!
//! ```rust
//! use sqlweave::prelude::*;
//!
//! sqlweave::define_table! {
//!     pub struct Account => "account" {
//!         id: i64 => "id",
//!         uuid: String => "uuid",
//!     }
//! }
//!
//! let account = Account::new();
//! let query = select(exprs![&account.id, &account.uuid])
//!     .from(&account)
//!     .where_(account.id.eq_param(1));
//!
//! let rendered = query.to_sql_with(&PostgresDialect);
//! assert_eq!(
//!     rendered.sql,
//!     "SELECT account.id, account.uuid FROM account WHERE account.id = $1"
//! );
//! assert_eq!(rendered.params, vec![Value::Int(1)]);
//! ```

#![warn(missing_docs)]

pub mod condition;
pub mod config;
pub mod dialect;
pub mod error;
pub mod expr;
pub mod graph;
pub mod params;
pub mod query;
pub mod render;

// Re-exports
pub use condition::{CompareOp, Condition, Connector, Quantifier};
pub use config::ComposerConfig;
pub use dialect::{Dialect, DialectKind, PostgresDialect, StandardDialect};
pub use error::{ConfigError, ConfigResult, Error, JoinError, JoinResult, Result};
pub use expr::{
    ArrayParam, Col, Column, ColumnType, Composite, Expr, Func, FuncCall, Sort, SortDirection,
    SubQuery, Table, TableRef, TypeTag, TypedExpr, Untyped,
};
pub use graph::{ForeignKey, JoinGraph, Link};
pub use params::{ParamKey, ParamTable, Value};
pub use query::{
    select, select_all, select_distinct, select_distinct_all, JoinItem, JoinKind, QueryPlan,
    Stage,
};
pub use render::{Render, RenderContext, RenderSession, RenderedQuery};

/// Everything needed to build and render queries
pub mod prelude {
    pub use crate::expr::{
        abs, avg, coalesce, count, count_distinct, count_of, exists, length, lower, max, min,
        round, sum, trim, upper,
    };
    pub use crate::{
        exprs, select, select_all, select_distinct, select_distinct_all, Col, Column, Condition,
        Dialect, Expr, Func, JoinGraph, JoinItem, PostgresDialect, Render, RenderedQuery, Stage,
        StandardDialect, Table, Value,
    };
}
