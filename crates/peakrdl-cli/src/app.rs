//! The CLI driver
//!
//! Order matters here: argfiles expand first, then the config file is
//! located and loaded (which bootstraps plugin search paths), then
//! plugin lists are assembled, and only then is the clap command tree
//! built and dispatched.

use std::path::Path;
use std::sync::Arc;

use clap::{Arg, ArgAction, Command};
use colored::Colorize;

use peakrdl_config::AppConfig;
use peakrdl_core::{
    check_duplicates, collect_exporters, collect_importers, CommandContext, ExporterCommand,
    PluginOrigin, PluginRegistry, RegisteredImporter, Subcommand,
};
use peakrdl_schema::{normalize, CfgValue, PluginLoader};

use crate::argfile;
use crate::commands::{Dump, ListGlobals, Preprocess};
use crate::error::{CliError, Result};
use crate::logging;

const DESCRIPTION: &str = "\
PeakRDL is a control & status register model automation toolchain.

For help about a specific subcommand, try:
    peakrdl <command> --help
";

/// Run the front end. Returns the process exit code.
///
/// The registry carries whatever the embedding build provides: the
/// compiler engine, builtin importers/exporters, and loadable plugin
/// objects for config references.
pub fn run(argv: Vec<String>, registry: PluginRegistry) -> i32 {
    logging::init();
    match try_run(argv, registry) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}: {e}", "error".red().bold());
            1
        }
    }
}

fn try_run(argv: Vec<String>, registry: PluginRegistry) -> Result<i32> {
    // Expand -f argfiles before anything looks at the arguments.
    let mut args = argv.into_iter();
    let program = args.next().unwrap_or_else(|| "peakrdl".to_string());
    let mut argv = argfile::expand_argfiles(args.collect())?;
    argv.insert(0, program);

    let cfg_path = peek_value_flag(&argv, "--peakrdl-cfg")?.map(|p| p.to_string());
    let registry = Arc::new(registry);
    let loader: Arc<dyn PluginLoader> = registry.clone();
    let config = AppConfig::load(cfg_path.as_deref().map(Path::new), loader)?;

    let importers = collect_importers(&config, &registry)?;
    let exporters = collect_exporters(&config, &registry)?;
    tracing::debug!(
        importers = importers.len(),
        exporters = exporters.len(),
        config = %config.path().display(),
        "plugins collected"
    );

    if argv.iter().any(|arg| arg == "--plugins") {
        report_plugins(&importers, &exporters);
        return Ok(0);
    }

    let mut subcommands: Vec<Box<dyn Subcommand>> = vec![
        Box::new(ExporterCommand::new(
            "dump",
            PluginOrigin::Builtin,
            Box::new(Dump),
        )),
        Box::new(ListGlobals),
        Box::new(Preprocess),
    ];
    subcommands.extend(
        exporters
            .into_iter()
            .map(|e| Box::new(e) as Box<dyn Subcommand>),
    );
    check_duplicates(&subcommands).map_err(CliError::Core)?;

    // Every subcommand's config namespace is validated up front, so a
    // broken config fails even for runs that never reach the command.
    let mut namespace_cfgs: Vec<CfgValue> = Vec::with_capacity(subcommands.len());
    for sc in &subcommands {
        let schema = normalize(sc.cfg_schema());
        namespace_cfgs.push(config.get_namespace(sc.name(), &schema)?);
    }

    let matches = build_command(&subcommands, &importers).get_matches_from(&argv);
    let (name, sub_matches) = matches
        .subcommand()
        .expect("clap enforces a subcommand");
    let index = subcommands
        .iter()
        .position(|sc| sc.name() == name)
        .expect("subcommand came from this list");

    let ctx = CommandContext {
        config: &config,
        registry: &registry,
        importers: &importers,
        cfg: &namespace_cfgs[index],
        matches: sub_matches,
    };
    subcommands[index].run(&ctx).map_err(CliError::Core)?;
    Ok(0)
}

fn build_command(subcommands: &[Box<dyn Subcommand>], importers: &[RegisteredImporter]) -> Command {
    let mut cmd = Command::new("peakrdl")
        .about(DESCRIPTION)
        .version(env!("CARGO_PKG_VERSION"))
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("plugins")
                .long("plugins")
                .action(ArgAction::SetTrue)
                .help("Report the discovered importer/exporter plugins, then exit"),
        )
        // -f and --peakrdl-cfg were consumed before parsing; these
        // definitions exist so --help documents them.
        .arg(
            Arg::new("argfile")
                .short('f')
                .value_name("FILE")
                .global(true)
                .action(ArgAction::Append)
                .help("Specify a file containing more command line arguments"),
        )
        .arg(
            Arg::new("peakrdl_cfg")
                .long("peakrdl-cfg")
                .value_name("CFG")
                .global(true)
                .help("Specify a PeakRDL configuration TOML file"),
        );

    for sc in subcommands {
        let mut sub = Command::new(sc.name().to_string()).about(sc.short_desc().to_string());
        if let Some(long) = sc.long_desc() {
            sub = sub.long_about(long.to_string());
        }
        cmd = cmd.subcommand(sc.configure_args(sub, importers));
    }
    cmd
}

fn report_plugins(importers: &[RegisteredImporter], exporters: &[ExporterCommand]) {
    println!("importers:");
    for importer in importers {
        println!("\t{}", importer.plugin_info());
    }
    println!("exporters:");
    for exporter in exporters {
        println!("\t{}", exporter.plugin_info());
    }
}

/// Manually scan for a value-taking flag before clap parsing runs.
fn peek_value_flag<'a>(argv: &'a [String], flag: &str) -> Result<Option<&'a str>> {
    let mut iter = argv.iter();
    while let Some(arg) = iter.next() {
        if arg == flag {
            return match iter.next() {
                Some(value) => Ok(Some(value)),
                None => Err(CliError::CfgMissingPath),
            };
        }
    }
    Ok(None)
}
