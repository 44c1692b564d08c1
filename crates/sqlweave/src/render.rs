//! Render protocol shared by every node.
//!
//! Rendering walks the node tree with a [`RenderContext`] describing the
//! syntactic position and a [`RenderSession`] carrying the dialect and the
//! parameter table for one render pass.

use crate::dialect::{Dialect, StandardDialect};
use crate::params::{ParamTable, Value};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// Syntactic position a node is rendered in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RenderContext {
    /// Select list and FROM/JOIN sources; introduces aliases (`x AS y`)
    Definition,
    /// WHERE, ON, GROUP BY and function arguments; fully qualified, no alias
    Reference,
    /// ORDER BY; prefers an alias already introduced in the select list
    OrderBy,
    /// Top-level render of a finished node
    Output,
}

/// State for one render pass: the dialect plus the parameter table.
pub struct RenderSession<'d> {
    dialect: &'d dyn Dialect,
    params: ParamTable,
}

impl<'d> RenderSession<'d> {
    /// Start an empty session
    pub fn new(dialect: &'d dyn Dialect) -> Self {
        Self::with_params(dialect, ParamTable::new())
    }

    /// Start a session whose ordinals continue from `params`
    pub fn with_params(dialect: &'d dyn Dialect, params: ParamTable) -> Self {
        Self { dialect, params }
    }

    /// Active dialect
    pub fn dialect(&self) -> &'d dyn Dialect {
        self.dialect
    }

    /// Parameters registered so far
    pub fn params(&self) -> &ParamTable {
        &self.params
    }

    /// Register a literal and return its placeholder text
    pub fn bind(&mut self, value: &Value) -> String {
        let ordinal = self.params.add(value.clone());
        self.dialect.placeholder(ordinal)
    }

    /// Register a value owned by node `id` and return its placeholder text
    pub fn bind_node(&mut self, id: u64, value: &Value) -> String {
        let ordinal = self.params.add_node(id, value.clone());
        self.dialect.placeholder(ordinal)
    }

    /// Close the session, pairing `sql` with the ordered parameters
    pub fn finish(self, sql: String) -> RenderedQuery {
        debug!(
            dialect = self.dialect.name(),
            sql_len = sql.len(),
            params = self.params.len(),
            "Rendered query"
        );
        RenderedQuery {
            sql,
            params: self.params.into_values(),
        }
    }
}

impl fmt::Debug for RenderSession<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderSession")
            .field("dialect", &self.dialect.name())
            .field("params", &self.params)
            .finish()
    }
}

/// A node that can write itself as a SQL fragment.
pub trait Render {
    /// Write this node in `ctx`, registering literals in `session`
    fn render(&self, ctx: RenderContext, session: &mut RenderSession<'_>) -> String;

    /// Render with `?` placeholders.
    ///
    /// Repeated values share one entry in `params` while every position
    /// still gets its own `?`; see [`StandardDialect`].
    fn to_sql(&self) -> RenderedQuery {
        self.to_sql_with(&StandardDialect)
    }

    /// Render with the given dialect
    fn to_sql_with(&self, dialect: &dyn Dialect) -> RenderedQuery {
        let mut session = RenderSession::new(dialect);
        let sql = self.render(RenderContext::Output, &mut session);
        session.finish(sql)
    }
}

impl<T: Render + ?Sized> Render for &T {
    fn render(&self, ctx: RenderContext, session: &mut RenderSession<'_>) -> String {
        (**self).render(ctx, session)
    }
}

/// Output of a render pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderedQuery {
    /// The generated SQL text
    pub sql: String,
    /// Values for the placeholders, ordered by ordinal
    pub params: Vec<Value>,
}

impl RenderedQuery {
    /// Number of distinct parameters
    pub fn param_count(&self) -> usize {
        self.params.len()
    }

    /// Whether the SQL has any placeholders
    pub fn is_parameterized(&self) -> bool {
        !self.params.is_empty()
    }
}

impl fmt::Display for RenderedQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.sql)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::PostgresDialect;

    struct Literal(Value);

    impl Render for Literal {
        fn render(&self, _ctx: RenderContext, session: &mut RenderSession<'_>) -> String {
            session.bind(&self.0)
        }
    }

    #[test]
    fn test_bind_dedups_within_session() {
        let mut session = RenderSession::new(&PostgresDialect);
        assert_eq!(session.bind(&Value::Int(5)), "$1");
        assert_eq!(session.bind(&Value::from("x")), "$2");
        assert_eq!(session.bind(&Value::Int(5)), "$1");
        let out = session.finish("sql".into());
        assert_eq!(out.params, vec![Value::Int(5), Value::from("x")]);
    }

    #[test]
    fn test_session_continues_from_seed() {
        let mut seed = ParamTable::new();
        seed.add("a");
        let mut session = RenderSession::with_params(&PostgresDialect, seed);
        assert_eq!(session.bind(&Value::from("b")), "$2");
        assert_eq!(session.params().len(), 2);
    }

    #[test]
    fn test_to_sql_defaults_to_standard() {
        let out = Literal(Value::Int(1)).to_sql();
        assert_eq!(out.sql, "?");
        assert_eq!(out.param_count(), 1);
        assert!(out.is_parameterized());

        let out = Literal(Value::Int(1)).to_sql_with(&PostgresDialect);
        assert_eq!(out.to_string(), "$1");
    }

    #[test]
    fn test_rendered_query_serializes() {
        let out = RenderedQuery {
            sql: "SELECT ?".into(),
            params: vec![Value::Int(1)],
        };
        assert_eq!(
            serde_json::to_string(&out).unwrap(),
            r#"{"sql":"SELECT ?","params":[1]}"#
        );
    }
}
