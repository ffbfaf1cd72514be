//! Subcommand machinery
//!
//! Subcommands are discovered at runtime (builtins plus config-registered
//! exporters), so argument definitions go through the clap builder API.
//! The common compile → elaborate → export flow of exporter subcommands
//! lives in [`ExporterCommand`], which adapts an [`Exporter`] into a
//! [`Subcommand`].

use std::collections::HashMap;

use clap::{Arg, ArgMatches, Command};

use peakrdl_config::AppConfig;
use peakrdl_schema::{CfgValue, RawSchema};

use crate::engine::{ElaborateOptions, ElaboratedModel};
use crate::error::{CoreError, Result};
use crate::importer::{PluginOrigin, RegisteredImporter};
use crate::input;
use crate::registry::PluginRegistry;

/// Everything a running subcommand has access to.
pub struct CommandContext<'a> {
    pub config: &'a AppConfig,
    pub registry: &'a PluginRegistry,
    pub importers: &'a [RegisteredImporter],
    /// This subcommand's validated config namespace.
    pub cfg: &'a CfgValue,
    pub matches: &'a ArgMatches,
}

/// One entry under `peakrdl <subcommand>`.
pub trait Subcommand {
    fn name(&self) -> &str;

    fn short_desc(&self) -> &str;

    /// Longer help text; falls back to `short_desc`.
    fn long_desc(&self) -> Option<&str> {
        None
    }

    fn origin(&self) -> PluginOrigin {
        PluginOrigin::Builtin
    }

    /// Schema for the subcommand's own config-file namespace.
    fn cfg_schema(&self) -> RawSchema {
        RawSchema::empty_mapping()
    }

    /// Define the subcommand's arguments.
    fn configure_args(&self, cmd: Command, importers: &[RegisteredImporter]) -> Command;

    fn run(&self, ctx: &CommandContext<'_>) -> Result<()>;
}

/// An exporter: compiles inputs, elaborates, then writes some artifact.
///
/// Exporters carry no name of their own; the registration name (builtin
/// or config key) becomes the subcommand name.
pub trait Exporter: Send + Sync {
    fn short_desc(&self) -> &str;

    fn long_desc(&self) -> Option<&str> {
        None
    }

    fn cfg_schema(&self) -> RawSchema {
        RawSchema::empty_mapping()
    }

    /// Whether the subcommand takes a required `-o <path>`.
    fn generates_output_file(&self) -> bool {
        true
    }

    fn add_exporter_arguments(&self, cmd: Command) -> Command {
        cmd
    }

    fn do_export(&self, model: &dyn ElaboratedModel, ctx: &CommandContext<'_>) -> Result<()>;
}

/// Adapts an [`Exporter`] into a [`Subcommand`] with the standard
/// compile/elaborate/export flow.
pub struct ExporterCommand {
    name: String,
    origin: PluginOrigin,
    exporter: Box<dyn Exporter>,
}

impl ExporterCommand {
    pub fn new(name: impl Into<String>, origin: PluginOrigin, exporter: Box<dyn Exporter>) -> Self {
        Self {
            name: name.into(),
            origin,
            exporter,
        }
    }

    /// One line for the `--plugins` report.
    pub fn plugin_info(&self) -> String {
        format!("{} --> {}", self.name, self.origin)
    }
}

impl Subcommand for ExporterCommand {
    fn name(&self) -> &str {
        &self.name
    }

    fn short_desc(&self) -> &str {
        self.exporter.short_desc()
    }

    fn long_desc(&self) -> Option<&str> {
        self.exporter.long_desc()
    }

    fn origin(&self) -> PluginOrigin {
        self.origin.clone()
    }

    fn cfg_schema(&self) -> RawSchema {
        self.exporter.cfg_schema()
    }

    fn configure_args(&self, cmd: Command, importers: &[RegisteredImporter]) -> Command {
        let cmd = input::add_compile_arguments(cmd);
        let cmd = input::add_elaborate_arguments(cmd);
        let mut cmd = input::add_importer_arguments(cmd, importers);
        if self.exporter.generates_output_file() {
            cmd = cmd.arg(
                Arg::new("output")
                    .short('o')
                    .value_name("PATH")
                    .required(true)
                    .help("Output path"),
            );
        }
        self.exporter.add_exporter_arguments(cmd)
    }

    fn run(&self, ctx: &CommandContext<'_>) -> Result<()> {
        let mut engine = ctx.registry.new_engine().ok_or(CoreError::NoEngine)?;

        let input_files = input::string_values(ctx.matches, "input_files");
        input::process_input(engine.as_mut(), ctx.importers, &input_files, ctx.matches)?;

        let options = ElaborateOptions {
            top: ctx.matches.get_one::<String>("top").cloned(),
            inst_name: ctx.matches.get_one::<String>("rename").cloned(),
            parameters: input::parse_parameters(&input::string_values(
                ctx.matches,
                "parameters",
            ))?,
        };
        let model = engine.elaborate(&options)?;

        self.exporter.do_export(model.as_ref(), ctx)
    }
}

/// Reject duplicate subcommand names, naming both registrations.
pub fn check_duplicates(subcommands: &[Box<dyn Subcommand>]) -> Result<()> {
    let mut seen: HashMap<&str, &dyn Subcommand> = HashMap::new();
    for sc in subcommands {
        if let Some(first) = seen.insert(sc.name(), sc.as_ref()) {
            return Err(CoreError::DuplicateSubcommand {
                name: sc.name().to_string(),
                first: first.origin().to_string(),
                second: sc.origin().to_string(),
            });
        }
    }
    Ok(())
}
