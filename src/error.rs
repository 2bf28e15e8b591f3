//! Error taxonomy.
//!
//! Grounded in `examples/bartolli-codanna/src/error.rs`'s `thiserror`-based
//! enum + `IndexResult<T>` alias pattern, pared down to this system's own
//! failure modes and with its Tantivy/MCP-specific variants dropped.

use thiserror::Error;

/// Failures while indexing a single translation unit. A `ScanError` here
/// is logged and the TU is skipped; it does not abort the whole scan
/// (§7: non-fatal by default).
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("failed to read compile commands from {path}: {source}")]
    CompileCommands {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse compile commands JSON: {0}")]
    CompileCommandsJson(#[from] serde_json::Error),

    #[error("failed to read CMake file-api reply: {0}")]
    CMakeReply(String),

    #[error("no usable compile command for {0}")]
    NoCompileCommand(String),

    #[error("front end failed for {file}: {message}")]
    FrontEnd { file: String, message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Failures while folding a translation unit or another snapshot into the
/// aggregate snapshot. These ARE fatal: the snapshot's schema invariants
/// (foreign keys, uniqueness) can no longer be trusted, so the scan must
/// stop (§7: fatal).
#[derive(Debug, Error)]
pub enum AggregationError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("snapshot schema version {found} is not supported (expected {expected})")]
    UnsupportedSchemaVersion { found: i64, expected: i64 },

    #[error("snapshots disagree on project home directory: {a} vs {b}")]
    ConflictingProjectHome { a: String, b: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Figment(#[from] figment::Error),

    #[error("failed to write configuration file {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Umbrella error for the CLI's top-level `main`, so `run`/`merge` can
/// return a single `Result` type regardless of which stage failed.
#[derive(Debug, Error)]
pub enum IndexError {
    #[error(transparent)]
    Scan(#[from] ScanError),

    #[error(transparent)]
    Aggregation(#[from] AggregationError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Other(String),
}

pub type ScanResult<T> = Result<T, ScanError>;
pub type AggregationResult<T> = Result<T, AggregationError>;
pub type IndexResult<T> = Result<T, IndexError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scan_error_displays_context() {
        let err = ScanError::NoCompileCommand("main.cpp".into());
        assert!(err.to_string().contains("main.cpp"));
    }

    #[test]
    fn index_error_wraps_scan_error() {
        let scan_err: ScanError = ScanError::NoCompileCommand("a.cpp".into());
        let wrapped: IndexError = scan_err.into();
        assert!(matches!(wrapped, IndexError::Scan(_)));
    }
}
