//! Table nodes and typed table declarations.

use super::{Col, Column, ColumnType, Expr, SubQuery, TypeTag};
use crate::render::{Render, RenderContext, RenderSession};
use std::hash::{Hash, Hasher};
use std::sync::Arc;

#[derive(Debug, Clone)]
enum TableSource {
    Base,
    Derived(SubQuery),
}

/// A table or a derived table (subquery in FROM/JOIN).
///
/// Derived tables always carry an alias, so their columns have a name to be
/// qualified by. Identity is the base name plus the alias, so `account` and `account AS a`
/// are distinct join participants.
#[derive(Debug, Clone)]
pub struct Table {
    name: Arc<str>,
    alias: Option<Arc<str>>,
    source: TableSource,
}

impl Table {
    /// Base table
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Self {
            name: name.into(),
            alias: None,
            source: TableSource::Base,
        }
    }

    /// Derived table over `sub`; `alias` also qualifies its columns
    pub(crate) fn derived(sub: SubQuery, alias: Arc<str>) -> Self {
        Self {
            name: alias.clone(),
            alias: Some(alias),
            source: TableSource::Derived(sub),
        }
    }

    /// Copy of this table under `alias`
    pub fn with_alias(&self, alias: impl Into<Arc<str>>) -> Self {
        Self {
            alias: Some(alias.into()),
            ..self.clone()
        }
    }

    /// Base name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Alias, if set
    pub fn alias_name(&self) -> Option<&str> {
        self.alias.as_deref()
    }

    /// Name used to qualify columns: the alias if set, else the base name
    pub fn reference_name(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }

    /// Whether this is a subquery rather than a base table
    pub fn is_derived(&self) -> bool {
        matches!(self.source, TableSource::Derived(_))
    }

    /// Typed column of this table
    pub fn column<T: ColumnType>(&self, name: impl Into<Arc<str>>) -> Col<T> {
        Col::from_column(Column::bound(self.clone(), name, T::TAG))
    }

    /// Untyped column of this table
    pub fn untyped_column(&self, name: impl Into<Arc<str>>) -> Column {
        Column::bound(self.clone(), name, TypeTag::Any)
    }

    /// `table.*`
    pub fn star(&self) -> Column {
        self.untyped_column("*")
    }

    /// Reference-only form that renders just the alias or name
    pub fn reference(&self) -> TableRef {
        TableRef(self.clone())
    }
}

impl PartialEq for Table {
    fn eq(&self, other: &Self) -> bool {
        let same_source = match (&self.source, &other.source) {
            (TableSource::Base, TableSource::Base) => true,
            (TableSource::Derived(a), TableSource::Derived(b)) => a.same_as(b),
            _ => false,
        };
        same_source && self.name == other.name && self.alias == other.alias
    }
}

impl Eq for Table {}

impl Hash for Table {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        self.alias.hash(state);
    }
}

impl Render for Table {
    fn render(&self, _ctx: RenderContext, session: &mut RenderSession<'_>) -> String {
        let mut out = match &self.source {
            TableSource::Base => self.name.to_string(),
            TableSource::Derived(sub) => sub.render(RenderContext::Definition, session),
        };
        if let Some(alias) = &self.alias {
            out.push_str(" AS ");
            out.push_str(alias);
        }
        out
    }
}

impl From<&Table> for Table {
    fn from(table: &Table) -> Self {
        table.clone()
    }
}

impl From<Table> for Expr {
    fn from(table: Table) -> Self {
        Self::Table(table)
    }
}

impl From<&Table> for Expr {
    fn from(table: &Table) -> Self {
        Self::Table(table.clone())
    }
}

/// A table rendered by alias (or name) only, never with `AS`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TableRef(Table);

impl TableRef {
    /// Referenced table
    pub fn table(&self) -> &Table {
        &self.0
    }
}

impl Render for TableRef {
    fn render(&self, _ctx: RenderContext, _session: &mut RenderSession<'_>) -> String {
        self.0.reference_name().to_string()
    }
}

impl From<TableRef> for Expr {
    fn from(table: TableRef) -> Self {
        Self::TableRef(table)
    }
}

/// Declare a typed table with one typed column per field.
///
/// ```
/// sqlweave::define_table! {
///     /// The `account` table
///     pub struct Account => "account" {
///         id: i64 => "id",
///         uuid: String => "uuid",
///     }
/// }
///
/// let a = Account::new().alias("a");
/// assert_eq!(a.id.column().qualified_name(), "a.id");
/// ```
#[macro_export]
macro_rules! define_table {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident => $sql_name:literal {
            $( $(#[$field_meta:meta])* $field:ident : $ty:ty => $column:literal ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone)]
        $vis struct $name {
            table: $crate::Table,
            $( $(#[$field_meta])* pub $field: $crate::Col<$ty>, )*
        }

        impl $name {
            /// Table under its base name
            pub fn new() -> Self {
                Self::bind($crate::Table::new($sql_name))
            }

            /// Copy of this table under `alias`, with columns qualified by it
            pub fn alias(&self, alias: &str) -> Self {
                Self::bind(self.table.with_alias(alias))
            }

            fn bind(table: $crate::Table) -> Self {
                Self {
                    $( $field: table.column::<$ty>($column), )*
                    table,
                }
            }

            /// Underlying table node
            pub fn table(&self) -> &$crate::Table {
                &self.table
            }

            /// `table.*`
            pub fn star(&self) -> $crate::Column {
                self.table.star()
            }

            /// Every declared column, in declaration order
            pub fn columns(&self) -> Vec<$crate::Column> {
                vec![$( self.$field.column().clone() ),*]
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl From<&$name> for $crate::Table {
            fn from(t: &$name) -> Self {
                t.table.clone()
            }
        }

        impl From<$name> for $crate::Table {
            fn from(t: $name) -> Self {
                t.table
            }
        }
    };
}
