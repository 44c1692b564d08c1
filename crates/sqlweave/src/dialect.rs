//! Placeholder syntax per target database.
//!
//! A dialect is handed to every render call through the
//! [`RenderSession`](crate::render::RenderSession); there is no process-wide
//! default to swap.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Strategy for writing parameter placeholders.
pub trait Dialect: Send + Sync {
    /// Identifier of this dialect
    fn name(&self) -> &str;

    /// Placeholder text for the 1-based `ordinal`
    fn placeholder(&self, ordinal: usize) -> String;
}

/// Positional `?` placeholders (SQLite, MySQL, ODBC).
///
/// Parameters are deduplicated before the dialect sees them, so a value bound
/// at several positions still yields one `?` per position but only one entry
/// in [`RenderedQuery::params`](crate::render::RenderedQuery::params). The
/// output lines up with the placeholders only when no value repeats; drivers
/// that bind strictly by position need [`PostgresDialect`]-style numbering or
/// a query with distinct values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StandardDialect;

impl Dialect for StandardDialect {
    fn name(&self) -> &str {
        "standard"
    }

    fn placeholder(&self, _ordinal: usize) -> String {
        "?".to_string()
    }
}

/// Numbered `$N` placeholders (PostgreSQL).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PostgresDialect;

impl Dialect for PostgresDialect {
    fn name(&self) -> &str {
        "postgres"
    }

    fn placeholder(&self, ordinal: usize) -> String {
        format!("${ordinal}")
    }
}

static STANDARD: StandardDialect = StandardDialect;
static POSTGRES: PostgresDialect = PostgresDialect;

/// Config-facing selector for the built-in dialects.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DialectKind {
    /// `?` placeholders
    #[default]
    Standard,
    /// `$N` placeholders
    Postgres,
}

impl DialectKind {
    /// The dialect instance for this selector
    pub fn dialect(self) -> &'static dyn Dialect {
        match self {
            Self::Standard => &STANDARD,
            Self::Postgres => &POSTGRES,
        }
    }
}

impl fmt::Display for DialectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dialect().name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(DialectKind::Standard, 1, "?" ; "standard first")]
    #[test_case(DialectKind::Standard, 9, "?" ; "standard ninth")]
    #[test_case(DialectKind::Postgres, 1, "$1" ; "postgres first")]
    #[test_case(DialectKind::Postgres, 12, "$12" ; "postgres twelfth")]
    fn test_placeholder(kind: DialectKind, ordinal: usize, expected: &str) {
        assert_eq!(kind.dialect().placeholder(ordinal), expected);
    }

    #[test]
    fn test_names() {
        assert_eq!(StandardDialect.name(), "standard");
        assert_eq!(PostgresDialect.name(), "postgres");
        assert_eq!(DialectKind::Postgres.to_string(), "postgres");
    }

    #[test]
    fn test_kind_deserializes_lowercase() {
        let kind: DialectKind = serde_json::from_str(r#""postgres""#).unwrap();
        assert_eq!(kind, DialectKind::Postgres);
    }
}
