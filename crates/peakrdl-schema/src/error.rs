//! Error types for peakrdl-schema

use std::path::PathBuf;

use crate::loader::LoadError;

/// Result type for schema extraction
pub type Result<T> = std::result::Result<T, SchemaError>;

/// Errors raised while extracting raw configuration data against a schema.
///
/// Every variant carries the fully qualified dotted context of the value
/// that failed (e.g. `peakrdl.plugins.exporters.foo`). Callers render the
/// message alongside the path of the originating config file.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("{ctx}: expected {expected}, got {found}")]
    TypeMismatch {
        ctx: String,
        expected: &'static str,
        found: String,
    },

    #[error("{ctx}: path does not exist: {}", path.display())]
    PathNotFound { ctx: String, path: PathBuf },

    #[error("{ctx}: path does not point to a file: {}", path.display())]
    NotAFile { ctx: String, path: PathBuf },

    #[error("{ctx}: path does not point to a directory: {}", path.display())]
    NotADirectory { ctx: String, path: PathBuf },

    #[error("{ctx}: value '{value}' is not a valid choice; must be one of: {}", allowed.join(", "))]
    InvalidChoice {
        ctx: String,
        value: String,
        allowed: Vec<String>,
    },

    #[error("{ctx}: invalid object import spec: {value}")]
    BadImportSpec { ctx: String, value: String },

    #[error("{ctx}: {source}")]
    Resolution {
        ctx: String,
        #[source]
        source: LoadError,
    },
}

impl SchemaError {
    /// The dotted context of the value that failed extraction.
    pub fn ctx(&self) -> &str {
        match self {
            Self::TypeMismatch { ctx, .. }
            | Self::PathNotFound { ctx, .. }
            | Self::NotAFile { ctx, .. }
            | Self::NotADirectory { ctx, .. }
            | Self::InvalidChoice { ctx, .. }
            | Self::BadImportSpec { ctx, .. }
            | Self::Resolution { ctx, .. } => ctx,
        }
    }
}
