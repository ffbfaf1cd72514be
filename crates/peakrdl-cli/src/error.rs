//! Error types for the CLI driver

use peakrdl_config::ConfigError;
use peakrdl_core::CoreError;

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("argument -f: expected FILE")]
    ArgfileMissingPath,

    #[error("file not found: {path}")]
    ArgfileNotFound { path: String },

    #[error("{path}: unbalanced quoting in argument file")]
    ArgfileSyntax { path: String },

    #[error("circular reference in -f files: '{path}' was already opened")]
    CircularArgfile { path: String },

    #[error("argument --peakrdl-cfg: expected FILE")]
    CfgMissingPath,

    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Core(#[from] CoreError),
}
