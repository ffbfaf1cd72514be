//! Input file processing
//!
//! Shared compile/elaborate argument definitions, `-D`/`-P` validation,
//! and the per-file routing between the native compiler path and the
//! importer resolver.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use clap::{Arg, ArgAction, ArgMatches, Command};
use regex::Regex;

use crate::engine::RdlCompiler;
use crate::error::{CoreError, Result};
use crate::importer::RegisteredImporter;
use crate::resolver::resolve_importer;

/// Extension of native register-description source files. These bypass
/// importer resolution and go straight to the compiler engine.
pub const NATIVE_EXTENSION: &str = "rdl";

/// Arguments shared by every subcommand that compiles input files.
pub fn add_compile_arguments(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("input_files")
            .value_name("FILE")
            .num_args(1..)
            .required(true)
            .help("One or more input files"),
    )
    .arg(
        Arg::new("incdirs")
            .short('I')
            .value_name("INCDIR")
            .action(ArgAction::Append)
            .help("Search directory for files included with `include \"filename\"`"),
    )
    .arg(
        Arg::new("defines")
            .short('D')
            .value_name("MACRO[=VALUE]")
            .action(ArgAction::Append)
            .help("Pre-define a Verilog-style preprocessor macro"),
    )
}

/// Arguments controlling elaboration of the compiled model.
pub fn add_elaborate_arguments(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("top")
            .short('t')
            .long("top")
            .value_name("TOP")
            .help(
                "Explicitly choose which addrmap in the root namespace will be the \
                 top-level component. If unset, the last addrmap defined will be chosen",
            ),
    )
    .arg(
        Arg::new("rename")
            .long("rename")
            .value_name("INST_NAME")
            .help(
                "Override the top component's instantiated name. By default, the \
                 instantiated name is the same as the component's type name",
            ),
    )
    .arg(
        Arg::new("parameters")
            .short('P')
            .value_name("PARAMETER=VALUE")
            .action(ArgAction::Append)
            .help("Specify a value for a top-level parameter"),
    )
}

/// Let every importer contribute its own arguments.
pub fn add_importer_arguments(mut cmd: Command, importers: &[RegisteredImporter]) -> Command {
    for importer in importers {
        cmd = importer.add_arguments(cmd);
    }
    cmd
}

/// Validate `-D NAME[=VALUE]` arguments. A define without a value maps
/// to the empty string.
pub fn parse_defines(raw_defines: &[String]) -> Result<HashMap<String, String>> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| Regex::new(r"^(\w+)(?:=(.+))?$").unwrap());

    let mut defines = HashMap::new();
    for raw in raw_defines {
        let caps = re.captures(raw).ok_or_else(|| CoreError::BadDefine {
            value: raw.clone(),
        })?;
        let name = caps[1].to_string();
        let value = caps.get(2).map(|m| m.as_str()).unwrap_or("").to_string();
        defines.insert(name, value);
    }
    Ok(defines)
}

/// Validate `-P NAME=VALUE` arguments, preserving command-line order.
pub fn parse_parameters(raw_parameters: &[String]) -> Result<Vec<(String, String)>> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| Regex::new(r"^(\w+)=(.+)$").unwrap());

    let mut parameters = Vec::with_capacity(raw_parameters.len());
    for raw in raw_parameters {
        let caps = re.captures(raw).ok_or_else(|| CoreError::BadParameter {
            value: raw.clone(),
        })?;
        parameters.push((caps[1].to_string(), caps[2].to_string()));
    }
    Ok(parameters)
}

/// Collect the repeatable string values of an argument.
pub fn string_values(matches: &ArgMatches, id: &str) -> Vec<String> {
    matches
        .get_many::<String>(id)
        .map(|values| values.cloned().collect())
        .unwrap_or_default()
}

/// Feed every input file into the engine, through an importer where the
/// format is foreign.
pub fn process_input(
    engine: &mut dyn RdlCompiler,
    importers: &[RegisteredImporter],
    input_files: &[String],
    matches: &ArgMatches,
) -> Result<()> {
    let defines = parse_defines(&string_values(matches, "defines"))?;
    let incdirs: Vec<PathBuf> = string_values(matches, "incdirs")
        .into_iter()
        .map(PathBuf::from)
        .collect();

    for file in input_files {
        load_file(
            engine,
            importers,
            Path::new(file),
            &defines,
            &incdirs,
            matches,
        )?;
    }
    Ok(())
}

/// Route one input file: native sources compile directly, everything
/// else must find exactly one willing importer.
pub fn load_file(
    engine: &mut dyn RdlCompiler,
    importers: &[RegisteredImporter],
    path: &Path,
    defines: &HashMap<String, String>,
    incdirs: &[PathBuf],
    matches: &ArgMatches,
) -> Result<()> {
    if !path.exists() {
        return Err(CoreError::InputNotFound {
            path: path.to_path_buf(),
        });
    }

    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    if ext == NATIVE_EXTENSION {
        tracing::debug!(path = %path.display(), "compiling native source");
        engine.compile_file(path, incdirs, defines)?;
        return Ok(());
    }

    match resolve_importer(ext, importers, path) {
        Some(importer) => importer.do_import(engine, matches, path),
        None => Err(CoreError::NoImporterFound {
            path: path.to_path_buf(),
        }),
    }
}
