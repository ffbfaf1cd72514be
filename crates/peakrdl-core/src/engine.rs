//! Collaborator interface to the register-description compiler engine
//!
//! The front end never parses or elaborates register descriptions
//! itself. Everything it needs from the compiler is expressed here;
//! embedders register a concrete engine on the
//! [`PluginRegistry`](crate::PluginRegistry).

use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Failures surfaced by the compiler engine. Always fatal to the run.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("{}: {message}", path.display())]
    Compile { path: PathBuf, message: String },

    #[error("elaboration failed: {message}")]
    Elaborate { message: String },

    #[error("{}: preprocessing failed: {message}", path.display())]
    Preprocess { path: PathBuf, message: String },
}

/// Elaboration controls collected from the command line.
#[derive(Debug, Clone, Default)]
pub struct ElaborateOptions {
    /// `-t/--top`: which root component becomes the top level.
    pub top: Option<String>,
    /// `--rename`: overrides the top component's instantiated name.
    pub inst_name: Option<String>,
    /// `-P NAME=VALUE` overrides, in command-line order. Value
    /// interpretation is the engine's business.
    pub parameters: Vec<(String, String)>,
}

/// One register in the flattened address map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterRecord {
    pub addr_low: u64,
    pub addr_high: u64,
    /// Hierarchical instance path, e.g. `top.rf_inst.r_inst1`.
    pub path: String,
}

/// An elaborated register model root.
pub trait ElaboratedModel {
    fn top_name(&self) -> &str;

    /// Total address span of the design, used for address formatting.
    fn total_size(&self) -> u64;

    /// Flattened register listing in address order. With `unroll`,
    /// array instances are expanded element by element.
    fn registers(&self, unroll: bool) -> Vec<RegisterRecord>;
}

/// The compiler front end consumed by subcommands.
pub trait RdlCompiler {
    /// Compile one native source file into the working model.
    fn compile_file(
        &mut self,
        path: &Path,
        include_dirs: &[PathBuf],
        defines: &HashMap<String, String>,
    ) -> std::result::Result<(), EngineError>;

    /// Elaborate everything compiled so far.
    fn elaborate(
        &mut self,
        options: &ElaborateOptions,
    ) -> std::result::Result<Box<dyn ElaboratedModel>, EngineError>;

    /// Names of root components that could be elaborated as top.
    fn list_globals(&self) -> Vec<String>;

    /// Run only the preprocessor over one native source file.
    fn preprocess(
        &mut self,
        path: &Path,
        include_dirs: &[PathBuf],
    ) -> std::result::Result<String, EngineError>;
}
