//! Error types for peakrdl-core

use std::path::PathBuf;

use peakrdl_config::ConfigError;
use peakrdl_schema::ImportSpec;

use crate::engine::EngineError;

/// Result type for peakrdl-core operations
pub type Result<T> = std::result::Result<T, CoreError>;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("input file does not exist: {}", path.display())]
    InputNotFound { path: PathBuf },

    #[error("{}: unknown file type; no importer is capable of reading this file", path.display())]
    NoImporterFound { path: PathBuf },

    #[error("invalid define argument: {value}")]
    BadDefine { value: String },

    #[error("invalid parameter argument: {value}")]
    BadParameter { value: String },

    #[error("more than one subcommand was registered with the name '{name}': {first}, {second}")]
    DuplicateSubcommand {
        name: String,
        first: String,
        second: String,
    },

    #[error("plugin '{name}' ({spec}) is not an importer")]
    NotAnImporter { name: String, spec: ImportSpec },

    #[error("plugin '{name}' ({spec}) is not an exporter")]
    NotAnExporter { name: String, spec: ImportSpec },

    #[error("no register-description compiler engine is registered in this build")]
    NoEngine,

    #[error("failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}
