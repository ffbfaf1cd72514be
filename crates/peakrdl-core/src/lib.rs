//! Plugin registry, importer resolution and subcommand machinery for the
//! PeakRDL front end
//!
//! Sits between the config layer and the CLI: collects importer and
//! exporter plugins (builtin + config-registered), resolves which
//! importer handles each input file, and defines the collaborator
//! interface to the external compiler engine.

mod engine;
mod error;
mod importer;
mod input;
mod plugins;
mod registry;
mod resolver;
mod subcommand;

pub use engine::{
    ElaborateOptions, ElaboratedModel, EngineError, RdlCompiler, RegisterRecord,
};
pub use error::{CoreError, Result};
pub use importer::{ImportContext, Importer, PluginOrigin, RegisteredImporter};
pub use input::{
    add_compile_arguments, add_elaborate_arguments, add_importer_arguments, load_file,
    parse_defines, parse_parameters, process_input, string_values, NATIVE_EXTENSION,
};
pub use plugins::{collect_exporters, collect_importers};
pub use registry::{ExporterFactory, ImporterFactory, PluginRegistry};
pub use subcommand::{check_duplicates, CommandContext, Exporter, ExporterCommand, Subcommand};
