//! The importer capability
//!
//! An importer converts a foreign file format into the register model
//! consumed by the compiler engine. Several importers may claim the same
//! file extension; [`resolve_importer`](crate::resolve_importer) decides
//! which one handles a given file.

use std::fmt;
use std::path::Path;

use peakrdl_config::AppConfig;
use peakrdl_schema::{normalize, CfgValue, ImportSpec, RawSchema};

use crate::engine::RdlCompiler;
use crate::error::Result;

/// Where a registered plugin came from, for `--plugins` reporting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PluginOrigin {
    Builtin,
    /// Registered through the config file under the given reference.
    Config(ImportSpec),
}

impl fmt::Display for PluginOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Builtin => write!(f, "built-in"),
            Self::Config(spec) => write!(f, "{spec}"),
        }
    }
}

/// Everything an importer sees besides the input file itself.
pub struct ImportContext<'a> {
    /// Parsed command-line arguments of the running subcommand,
    /// including any arguments the importer contributed.
    pub matches: &'a clap::ArgMatches,
    /// The importer's validated config namespace.
    pub cfg: &'a CfgValue,
}

/// A pluggable file-format importer.
pub trait Importer: Send + Sync {
    /// Default name; the registration name overrides this for plugins.
    fn name(&self) -> &str;

    /// Extensions (without the dot) this importer expects to support.
    /// Used as the cheap first pass of importer resolution.
    fn file_extensions(&self) -> &[&str];

    /// Schema for the importer's own config-file namespace.
    fn cfg_schema(&self) -> RawSchema {
        RawSchema::empty_mapping()
    }

    /// Second-pass compatibility check for ambiguous extensions.
    ///
    /// Should open the file and do a low-cost scan (a keyword search is
    /// enough) rather than a full parse.
    fn is_compatible(&self, path: &Path) -> bool;

    /// Contribute extra command-line arguments to a subcommand.
    fn add_arguments(&self, cmd: clap::Command) -> clap::Command {
        cmd
    }

    /// Import one input file into the engine's working model.
    fn do_import(
        &self,
        engine: &mut dyn RdlCompiler,
        ctx: &ImportContext<'_>,
        path: &Path,
    ) -> Result<()>;
}

/// An importer bound to its registration name, origin and validated
/// config section.
///
/// The registration name (config key or builtin name) always wins over
/// the importer's own default name.
pub struct RegisteredImporter {
    name: String,
    origin: PluginOrigin,
    cfg: CfgValue,
    importer: Box<dyn Importer>,
}

impl std::fmt::Debug for RegisteredImporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisteredImporter")
            .field("name", &self.name)
            .field("origin", &self.origin)
            .field("cfg", &self.cfg)
            .field("importer", &"<dyn Importer>")
            .finish()
    }
}

impl RegisteredImporter {
    pub fn new(name: impl Into<String>, origin: PluginOrigin, importer: Box<dyn Importer>) -> Self {
        Self {
            name: name.into(),
            origin,
            cfg: CfgValue::Mapping(Vec::new()),
            importer,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn origin(&self) -> &PluginOrigin {
        &self.origin
    }

    /// One line for the `--plugins` report.
    pub fn plugin_info(&self) -> String {
        format!("{} --> {}", self.name, self.origin)
    }

    /// Validate and cache this importer's config namespace.
    pub fn load_cfg(&mut self, config: &AppConfig) -> Result<()> {
        let schema = normalize(self.importer.cfg_schema());
        self.cfg = config.get_namespace(&self.name, &schema)?;
        Ok(())
    }

    pub fn cfg(&self) -> &CfgValue {
        &self.cfg
    }

    pub fn file_extensions(&self) -> &[&str] {
        self.importer.file_extensions()
    }

    pub fn is_compatible(&self, path: &Path) -> bool {
        self.importer.is_compatible(path)
    }

    pub fn add_arguments(&self, cmd: clap::Command) -> clap::Command {
        self.importer.add_arguments(cmd)
    }

    pub fn do_import(
        &self,
        engine: &mut dyn RdlCompiler,
        matches: &clap::ArgMatches,
        path: &Path,
    ) -> Result<()> {
        let ctx = ImportContext {
            matches,
            cfg: &self.cfg,
        };
        tracing::debug!(importer = %self.name, path = %path.display(), "importing file");
        self.importer.do_import(engine, &ctx, path)
    }
}
