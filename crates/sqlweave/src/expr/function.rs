//! Function and aggregate nodes.
//!
//! Functions follow the same context rules as columns: `Definition`
//! appends the alias, `Reference` never does, `OrderBy` uses the alias when
//! one is set. Arguments always render in `Reference` context.

use super::column::comparison_methods;
use super::{ColumnType, Composite, Expr, SubQuery, TypedExpr};
use crate::params::Value;
use crate::render::{Render, RenderContext, RenderSession};
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

/// Untyped function call `NAME(args)`.
#[derive(Debug, Clone)]
pub struct FuncCall {
    name: Arc<str>,
    arg: Box<Expr>,
    distinct: bool,
    bare_query: bool,
    alias: Option<Arc<str>>,
}

impl FuncCall {
    /// Call `name` with a single argument node
    pub fn new(name: impl Into<Arc<str>>, arg: impl Into<Expr>) -> Self {
        Self {
            name: name.into(),
            arg: Box::new(arg.into()),
            distinct: false,
            bare_query: false,
            alias: None,
        }
    }

    /// Prefix the argument with `DISTINCT`
    pub fn distinct(self) -> Self {
        Self {
            distinct: true,
            ..self
        }
    }

    /// Copy of this call with an output alias
    pub fn alias(&self, alias: impl Into<Arc<str>>) -> Self {
        Self {
            alias: Some(alias.into()),
            ..self.clone()
        }
    }

    /// Write a subquery argument without its own parentheses, as in
    /// `EXISTS(SELECT ...)`
    fn bare_query(self) -> Self {
        Self {
            bare_query: true,
            ..self
        }
    }

    /// Function name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Argument node
    pub fn arg(&self) -> &Expr {
        &self.arg
    }

    /// Output alias, if set
    pub fn alias_name(&self) -> Option<&str> {
        self.alias.as_deref()
    }
}

impl Render for FuncCall {
    fn render(&self, ctx: RenderContext, session: &mut RenderSession<'_>) -> String {
        let arg = match self.arg.as_ref() {
            Expr::SubQuery(sub) if self.bare_query => sub.render_bare(session),
            other => other.render(RenderContext::Reference, session),
        };
        let distinct = if self.distinct { "DISTINCT " } else { "" };
        let call = format!("{}({distinct}{arg})", self.name);

        match (ctx, &self.alias) {
            (RenderContext::Definition | RenderContext::Output, Some(alias)) => {
                format!("{call} AS {alias}")
            }
            (RenderContext::OrderBy, Some(alias)) => alias.to_string(),
            _ => call,
        }
    }
}

impl From<FuncCall> for Expr {
    fn from(call: FuncCall) -> Self {
        Self::Func(call)
    }
}

/// Function call producing a value of type `T`.
pub struct Func<T> {
    call: FuncCall,
    _ty: PhantomData<fn() -> T>,
}

impl<T: ColumnType> Func<T> {
    /// Call an arbitrary function; several arguments are comma-separated
    pub fn call(name: impl Into<Arc<str>>, mut args: Vec<Expr>) -> Self {
        let arg = if args.len() == 1 {
            args.remove(0)
        } else {
            Expr::list(args)
        };
        Self::wrap(FuncCall::new(name, arg))
    }

    fn wrap(call: FuncCall) -> Self {
        Self {
            call,
            _ty: PhantomData,
        }
    }

    /// Copy of this function with an output alias
    pub fn alias(&self, alias: impl Into<Arc<str>>) -> Self {
        Self::wrap(self.call.alias(alias))
    }

    /// Untyped view
    pub fn call_node(&self) -> &FuncCall {
        &self.call
    }

    fn to_expr(&self) -> Expr {
        Expr::Func(self.call.clone())
    }

    fn check_param(&self, _value: &Value) {}

    comparison_methods!(<T as ColumnType>::Param);
}

impl<T> Clone for Func<T> {
    fn clone(&self) -> Self {
        Self {
            call: self.call.clone(),
            _ty: PhantomData,
        }
    }
}

impl<T> fmt::Debug for Func<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Func").field(&self.call).finish()
    }
}

impl<T> Render for Func<T> {
    fn render(&self, ctx: RenderContext, session: &mut RenderSession<'_>) -> String {
        self.call.render(ctx, session)
    }
}

impl<T> From<Func<T>> for Expr {
    fn from(func: Func<T>) -> Self {
        Self::Func(func.call)
    }
}

impl<T> From<&Func<T>> for Expr {
    fn from(func: &Func<T>) -> Self {
        Self::Func(func.call.clone())
    }
}

impl<T: ColumnType> TypedExpr for Func<T> {
    type Type = T;
}

impl<T: ColumnType> TypedExpr for &Func<T> {
    type Type = T;
}

fn typed<T: ColumnType>(name: &str, arg: impl Into<Expr>) -> Func<T> {
    Func::wrap(FuncCall::new(name, arg))
}

/// `COUNT(1)`
pub fn count() -> Func<i64> {
    typed("COUNT", Expr::fixed(1))
}

/// `COUNT(arg)`
pub fn count_of(arg: impl Into<Expr>) -> Func<i64> {
    typed("COUNT", arg)
}

/// `COUNT(DISTINCT a, b, ...)`
///
/// # Panics
///
/// Panics if `args` is empty.
pub fn count_distinct(args: Vec<Expr>) -> Func<i64> {
    assert!(!args.is_empty(), "COUNT(DISTINCT ...) needs at least one argument");
    Func::wrap(FuncCall::new("COUNT", Composite::new(", ", args)).distinct())
}

/// `SUM(arg)`
pub fn sum<E: TypedExpr>(arg: E) -> Func<E::Type> {
    typed("SUM", arg)
}

/// `AVG(arg)`
pub fn avg(arg: impl Into<Expr>) -> Func<f64> {
    typed("AVG", arg)
}

/// `MIN(arg)`
pub fn min<E: TypedExpr>(arg: E) -> Func<E::Type> {
    typed("MIN", arg)
}

/// `MAX(arg)`
pub fn max<E: TypedExpr>(arg: E) -> Func<E::Type> {
    typed("MAX", arg)
}

/// `UPPER(arg)`
pub fn upper(arg: impl Into<Expr>) -> Func<String> {
    typed("UPPER", arg)
}

/// `LOWER(arg)`
pub fn lower(arg: impl Into<Expr>) -> Func<String> {
    typed("LOWER", arg)
}

/// `TRIM(arg)`
pub fn trim(arg: impl Into<Expr>) -> Func<String> {
    typed("TRIM", arg)
}

/// `LENGTH(arg)`
pub fn length(arg: impl Into<Expr>) -> Func<i64> {
    typed("LENGTH", arg)
}

/// `ABS(arg)`
pub fn abs<E: TypedExpr>(arg: E) -> Func<E::Type> {
    typed("ABS", arg)
}

/// `ROUND(arg, decimals)`
pub fn round(arg: impl Into<Expr>, decimals: u32) -> Func<f64> {
    Func::call("ROUND", vec![arg.into(), Expr::fixed(decimals)])
}

/// `COALESCE(a, b, ...)`
pub fn coalesce<T: ColumnType>(args: Vec<Expr>) -> Func<T> {
    Func::call("COALESCE", args)
}

/// `EXISTS(SELECT ...)`
pub fn exists(sub: SubQuery) -> Func<bool> {
    Func::wrap(FuncCall::new("EXISTS", sub).bare_query())
}
