//! Error types for join resolution and configuration loading.
//!
//! Query construction itself has no error path: invalid clause orderings are
//! unreachable through the stage types, and misuse of the node API panics.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Failure while resolving a join chain from the foreign-key graph.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JoinError {
    /// No target tables were requested
    #[error("Join resolution needs at least one target table")]
    NoTargets,

    /// A target has no path from the source table
    #[error("Target {target} is not reachable from {origin} (last table reached: {last})")]
    Unreachable {
        /// Table the search started from
        origin: String,
        /// Requested target table
        target: String,
        /// Last table reached while walking the path back
        last: String,
        /// Tables collected before the walk failed, target first
        path: Vec<String>,
    },

    /// Two adjacent tables on a path are linked by more than one column pair
    #[error("Ambiguous link between {from} and {to}: expected exactly one column pair, got {}: {}", .candidates.len(), .candidates.join(", "))]
    AmbiguousLink {
        /// Table on the source side of the hop
        from: String,
        /// Table on the target side of the hop
        to: String,
        /// Candidate pairs rendered as `from.col = to.col`
        candidates: Vec<String>,
    },
}

/// Specialized Result type for join resolution
pub type JoinResult<T> = std::result::Result<T, JoinError>;

impl JoinError {
    /// Create an unreachable-target error
    pub fn unreachable(
        origin: impl Into<String>,
        target: impl Into<String>,
        last: impl Into<String>,
        path: Vec<String>,
    ) -> Self {
        Self::Unreachable {
            origin: origin.into(),
            target: target.into(),
            last: last.into(),
            path,
        }
    }

    /// Name of the table the error is about, if any
    pub fn table(&self) -> Option<&str> {
        match self {
            Self::NoTargets => None,
            Self::Unreachable { target, .. } => Some(target),
            Self::AmbiguousLink { to, .. } => Some(to),
        }
    }
}

/// Failure while loading a [`ComposerConfig`](crate::config::ComposerConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("Failed to read config {path}: {source}")]
    Io {
        /// File that was being read
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: io::Error,
    },

    /// TOML document did not match the config shape
    #[error("Invalid TOML config: {0}")]
    Toml(#[from] toml::de::Error),

    /// JSON document did not match the config shape
    #[error("Invalid JSON config: {0}")]
    Json(#[from] serde_json::Error),

    /// File extension is neither `.toml` nor `.json`
    #[error("Unsupported config format: {0}")]
    UnsupportedFormat(String),
}

/// Specialized Result type for config loading
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Crate-level error
#[derive(Debug, Error)]
pub enum Error {
    /// Join resolution failed
    #[error(transparent)]
    Join(#[from] JoinError),

    /// Config loading failed
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Crate-level Result alias
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unreachable_display() {
        let err = JoinError::unreachable("a", "c", "c", vec!["c".into()]);
        assert_eq!(
            err.to_string(),
            "Target c is not reachable from a (last table reached: c)"
        );
        assert_eq!(err.table(), Some("c"));
    }

    #[test]
    fn test_ambiguous_display() {
        let err = JoinError::AmbiguousLink {
            from: "b".into(),
            to: "c".into(),
            candidates: vec!["b.id = c.b_id".into(), "b.id = c.b2_id".into()],
        };
        assert_eq!(
            err.to_string(),
            "Ambiguous link between b and c: expected exactly one column pair, got 2: b.id = c.b_id, b.id = c.b2_id"
        );
    }

    #[test]
    fn test_crate_error_wraps_join_error() {
        let err: Error = JoinError::NoTargets.into();
        assert!(matches!(err, Error::Join(JoinError::NoTargets)));
        assert_eq!(err.to_string(), "Join resolution needs at least one target table");
    }

    #[test]
    fn test_unsupported_format_display() {
        let err = ConfigError::UnsupportedFormat("yaml".into());
        assert_eq!(err.to_string(), "Unsupported config format: yaml");
    }
}
