//! Column nodes and their comparison operators.

use super::{Expr, Table, TypedExpr};
use crate::params::Value;
use crate::render::{Render, RenderContext, RenderSession};
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

/// Semantic type of a column, restricting which literals it is compared to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeTag {
    /// Accepts any literal
    Any,
    /// Boolean
    Bool,
    /// Integer of any width
    Int,
    /// Floating point; integers are accepted too
    Float,
    /// Text
    Text,
}

impl TypeTag {
    /// Whether a literal of this shape may be compared with the column.
    ///
    /// NULL is accepted everywhere and arrays are checked element-wise.
    pub fn accepts(self, value: &Value) -> bool {
        match (self, value) {
            (Self::Any, _) | (_, Value::Null) => true,
            (tag, Value::Array(items)) => items.iter().all(|item| tag.accepts(item)),
            (Self::Bool, Value::Bool(_))
            | (Self::Int, Value::Int(_))
            | (Self::Float, Value::Float(_) | Value::Int(_))
            | (Self::Text, Value::Text(_)) => true,
            _ => false,
        }
    }
}

/// Rust type a typed column holds.
pub trait ColumnType: 'static {
    /// Runtime tag matching this type
    const TAG: TypeTag;

    /// Literal type accepted by `*_param` comparisons
    type Param: Into<Value>;
}

macro_rules! column_types {
    ($($ty:ty => $tag:ident),* $(,)?) => {
        $(
            impl ColumnType for $ty {
                const TAG: TypeTag = TypeTag::$tag;
                type Param = $ty;
            }
        )*
    };
}

column_types! {
    bool => Bool,
    i16 => Int,
    i32 => Int,
    i64 => Int,
    f32 => Float,
    f64 => Float,
    String => Text,
}

impl<T: ColumnType> ColumnType for Option<T> {
    const TAG: TypeTag = T::TAG;
    type Param = Option<T::Param>;
}

/// Marker for columns whose type is not tracked.
#[derive(Debug, Clone, Copy)]
pub struct Untyped;

impl ColumnType for Untyped {
    const TAG: TypeTag = TypeTag::Any;
    type Param = Value;
}

/// Generates the comparison API shared by columns and functions.
///
/// The implementing type provides `to_expr(&self) -> Expr` and
/// `check_param(&self, &Value)`.
macro_rules! comparison_methods {
    (@ops $param:ty; $(($op:ident, $param_op:ident, $any:ident, $all:ident, $variant:ident, $sql:literal)),*) => {
        $(
            #[doc = concat!("`self ", $sql, " other`")]
            pub fn $op(&self, other: impl Into<$crate::Expr>) -> $crate::Condition {
                $crate::Condition::compare(self.to_expr(), $crate::CompareOp::$variant, other.into())
            }

            #[doc = concat!("`self ", $sql, " <placeholder>`")]
            pub fn $param_op(&self, value: impl Into<$param>) -> $crate::Condition {
                let value: $crate::Value = Into::<$param>::into(value).into();
                self.check_param(&value);
                $crate::Condition::compare_param(self.to_expr(), $crate::CompareOp::$variant, value)
            }

            #[doc = concat!("`self ", $sql, " ANY(set)`")]
            pub fn $any(&self, set: impl Into<$crate::Expr>) -> $crate::Condition {
                $crate::Condition::quantified(
                    self.to_expr(),
                    $crate::CompareOp::$variant,
                    $crate::Quantifier::Any,
                    set.into(),
                )
            }

            #[doc = concat!("`self ", $sql, " ALL(set)`")]
            pub fn $all(&self, set: impl Into<$crate::Expr>) -> $crate::Condition {
                $crate::Condition::quantified(
                    self.to_expr(),
                    $crate::CompareOp::$variant,
                    $crate::Quantifier::All,
                    set.into(),
                )
            }
        )*
    };
    ($param:ty) => {
        comparison_methods!(@ops $param;
            (eq, eq_param, eq_any, eq_all, Eq, "="),
            (ne, ne_param, ne_any, ne_all, Ne, "<>"),
            (gt, gt_param, gt_any, gt_all, Gt, ">"),
            (ge, ge_param, ge_any, ge_all, Ge, ">="),
            (lt, lt_param, lt_any, lt_all, Lt, "<"),
            (le, le_param, le_any, le_all, Le, "<=")
        );

        /// `self LIKE other`
        pub fn like(&self, other: impl Into<$crate::Expr>) -> $crate::Condition {
            $crate::Condition::compare(self.to_expr(), $crate::CompareOp::Like, other.into())
        }

        /// `self LIKE <placeholder>`
        pub fn like_param(&self, pattern: impl Into<String>) -> $crate::Condition {
            let pattern = $crate::Value::Text(pattern.into());
            $crate::Condition::compare_param(self.to_expr(), $crate::CompareOp::Like, pattern)
        }

        /// `self ILIKE other` (Postgres)
        pub fn ilike(&self, other: impl Into<$crate::Expr>) -> $crate::Condition {
            $crate::Condition::compare(self.to_expr(), $crate::CompareOp::ILike, other.into())
        }

        /// `self ILIKE <placeholder>` (Postgres)
        pub fn ilike_param(&self, pattern: impl Into<String>) -> $crate::Condition {
            let pattern = $crate::Value::Text(pattern.into());
            $crate::Condition::compare_param(self.to_expr(), $crate::CompareOp::ILike, pattern)
        }

        /// `self IN (subquery)`
        pub fn in_(&self, set: impl Into<$crate::Expr>) -> $crate::Condition {
            $crate::Condition::in_set(self.to_expr(), set.into())
        }

        /// `self IN (<placeholder>, ...)`, one placeholder per distinct value
        pub fn in_values<V: Into<$param>>(
            &self,
            values: impl IntoIterator<Item = V>,
        ) -> $crate::Condition {
            let values: Vec<$crate::Value> = values
                .into_iter()
                .map(|v| Into::<$param>::into(v).into())
                .collect();
            for value in &values {
                self.check_param(value);
            }
            $crate::Condition::in_list(self.to_expr(), values)
        }

        /// `self IS NULL`
        pub fn is_null(&self) -> $crate::Condition {
            $crate::Condition::null_check(self.to_expr(), false)
        }

        /// `self IS NOT NULL`
        pub fn is_not_null(&self) -> $crate::Condition {
            $crate::Condition::null_check(self.to_expr(), true)
        }

        /// Ascending ORDER BY item
        pub fn asc(&self) -> $crate::Sort {
            self.to_expr().asc()
        }

        /// Descending ORDER BY item
        pub fn desc(&self) -> $crate::Sort {
            self.to_expr().desc()
        }
    };
}

pub(crate) use comparison_methods;

/// A column, optionally bound to a table.
///
/// An unbound column renders its name verbatim, which is how fixed literals
/// such as `1` or `*` are expressed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Column {
    name: Arc<str>,
    table: Option<Table>,
    tag: TypeTag,
    alias: Option<Arc<str>>,
}

impl Column {
    /// Unbound column with a type tag
    pub fn new(name: impl Into<Arc<str>>, tag: TypeTag) -> Self {
        Self {
            name: name.into(),
            table: None,
            tag,
            alias: None,
        }
    }

    /// Text rendered verbatim in every context
    pub fn fixed(text: impl fmt::Display) -> Self {
        Self::new(text.to_string(), TypeTag::Any)
    }

    pub(crate) fn bound(table: Table, name: impl Into<Arc<str>>, tag: TypeTag) -> Self {
        Self {
            table: Some(table),
            ..Self::new(name, tag)
        }
    }

    /// Copy of this column with an output alias
    pub fn alias(&self, alias: impl Into<Arc<str>>) -> Self {
        Self {
            alias: Some(alias.into()),
            ..self.clone()
        }
    }

    /// Column name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Owning table
    pub fn table(&self) -> Option<&Table> {
        self.table.as_ref()
    }

    /// Type tag
    pub fn tag(&self) -> TypeTag {
        self.tag
    }

    /// Output alias, if set
    pub fn alias_name(&self) -> Option<&str> {
        self.alias.as_deref()
    }

    /// `table.name` using the table's alias when set, or the bare name
    pub fn qualified_name(&self) -> String {
        match &self.table {
            Some(table) => format!("{}.{}", table.reference_name(), self.name),
            None => self.name.to_string(),
        }
    }

    fn to_expr(&self) -> Expr {
        Expr::Column(self.clone())
    }

    fn check_param(&self, value: &Value) {
        assert!(
            self.tag.accepts(value),
            "cannot compare {:?} column {} with {} literal {}",
            self.tag,
            self.qualified_name(),
            value.kind(),
            value
        );
    }

    comparison_methods!(Value);
}

impl Render for Column {
    fn render(&self, ctx: RenderContext, _session: &mut RenderSession<'_>) -> String {
        let qualified = self.qualified_name();
        match (ctx, &self.alias) {
            (RenderContext::Definition | RenderContext::Output, Some(alias)) => {
                format!("{qualified} AS {alias}")
            }
            (RenderContext::OrderBy, Some(alias)) => alias.to_string(),
            _ => qualified,
        }
    }
}

impl From<Column> for Expr {
    fn from(column: Column) -> Self {
        Self::Column(column)
    }
}

impl From<&Column> for Expr {
    fn from(column: &Column) -> Self {
        Self::Column(column.clone())
    }
}

/// A column whose Rust type is known at compile time.
///
/// `*_param` comparisons only accept literals of `T::Param`, so a mismatch
/// fails to compile instead of producing bad SQL.
pub struct Col<T> {
    column: Column,
    _ty: PhantomData<fn() -> T>,
}

impl<T: ColumnType> Col<T> {
    /// Unbound typed column
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Self::from_column(Column::new(name, T::TAG))
    }

    pub(crate) fn from_column(column: Column) -> Self {
        Self {
            column,
            _ty: PhantomData,
        }
    }

    /// Copy of this column with an output alias
    pub fn alias(&self, alias: impl Into<Arc<str>>) -> Self {
        Self::from_column(self.column.alias(alias))
    }

    /// Untyped view
    pub fn column(&self) -> &Column {
        &self.column
    }

    /// Column name
    pub fn name(&self) -> &str {
        self.column.name()
    }

    /// Owning table
    pub fn table(&self) -> Option<&Table> {
        self.column.table()
    }

    /// Output alias, if set
    pub fn alias_name(&self) -> Option<&str> {
        self.column.alias_name()
    }

    fn to_expr(&self) -> Expr {
        self.column.to_expr()
    }

    fn check_param(&self, value: &Value) {
        self.column.check_param(value);
    }

    comparison_methods!(<T as ColumnType>::Param);
}

impl<T> Clone for Col<T> {
    fn clone(&self) -> Self {
        Self {
            column: self.column.clone(),
            _ty: PhantomData,
        }
    }
}

impl<T> fmt::Debug for Col<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Col").field(&self.column).finish()
    }
}

impl<T> Render for Col<T> {
    fn render(&self, ctx: RenderContext, session: &mut RenderSession<'_>) -> String {
        self.column.render(ctx, session)
    }
}

impl<T> From<Col<T>> for Expr {
    fn from(col: Col<T>) -> Self {
        Self::Column(col.column)
    }
}

impl<T> From<&Col<T>> for Expr {
    fn from(col: &Col<T>) -> Self {
        Self::Column(col.column.clone())
    }
}

impl<T> From<Col<T>> for Column {
    fn from(col: Col<T>) -> Self {
        col.column
    }
}

impl<T: ColumnType> TypedExpr for Col<T> {
    type Type = T;
}

impl<T: ColumnType> TypedExpr for &Col<T> {
    type Type = T;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::StandardDialect;
    use test_case::test_case;

    fn render(column: &Column, ctx: RenderContext) -> String {
        let mut session = RenderSession::new(&StandardDialect);
        column.render(ctx, &mut session)
    }

    // ============================================================================
    // Context rendering
    // ============================================================================

    #[test_case(RenderContext::Definition, "users.username AS user_name" ; "definition")]
    #[test_case(RenderContext::Reference, "users.username" ; "reference")]
    #[test_case(RenderContext::OrderBy, "user_name" ; "order by")]
    #[test_case(RenderContext::Output, "users.username AS user_name" ; "output")]
    fn test_aliased_column(ctx: RenderContext, expected: &str) {
        let users = Table::new("users");
        let column = users.column::<String>("username").alias("user_name");
        assert_eq!(render(column.column(), ctx), expected);
    }

    #[test_case(RenderContext::Definition ; "definition")]
    #[test_case(RenderContext::Reference ; "reference")]
    #[test_case(RenderContext::OrderBy ; "order by")]
    fn test_unaliased_column_with_table_alias(ctx: RenderContext) {
        let users = Table::new("users").with_alias("u");
        let column = users.column::<String>("username");
        assert_eq!(render(column.column(), ctx), "u.username");
    }

    #[test]
    fn test_unbound_column_renders_bare_name() {
        let column = Column::new("col1", TypeTag::Int);
        assert_eq!(render(&column, RenderContext::Reference), "col1");
        assert_eq!(render(&column.alias("c"), RenderContext::Definition), "col1 AS c");
    }

    // ============================================================================
    // Type tags
    // ============================================================================

    #[test_case(TypeTag::Int, Value::Int(1), true ; "int accepts int")]
    #[test_case(TypeTag::Int, Value::from("x"), false ; "int rejects text")]
    #[test_case(TypeTag::Float, Value::Int(1), true ; "float accepts int")]
    #[test_case(TypeTag::Text, Value::Null, true ; "null accepted")]
    #[test_case(TypeTag::Bool, Value::from(vec![true, false]), true ; "array element-wise")]
    #[test_case(TypeTag::Bool, Value::from(vec![1]), false ; "array mismatch")]
    #[test_case(TypeTag::Any, Value::from(2.5), true ; "any accepts all")]
    fn test_tag_accepts(tag: TypeTag, value: Value, expected: bool) {
        assert_eq!(tag.accepts(&value), expected);
    }

    #[test]
    #[should_panic(expected = "cannot compare Int column users.id with text literal")]
    fn test_untyped_param_mismatch_panics() {
        let users = Table::new("users");
        let id = Column::bound(users, "id", TypeTag::Int);
        let _ = id.eq_param("nope");
    }

    #[test]
    fn test_typed_param_conditions() {
        let users = Table::new("users");
        let id = users.column::<i64>("id");
        let cond = id.eq_param(42);
        let out = cond.to_sql();
        assert_eq!(out.sql, "users.id = ?");
        assert_eq!(out.params, vec![Value::Int(42)]);

        let nickname = users.column::<Option<String>>("nickname");
        let out = nickname.eq_param(None::<String>).to_sql();
        assert_eq!(out.params, vec![Value::Null]);
    }
}
