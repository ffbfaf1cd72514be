//! `preprocess` subcommand: run only the preprocessor

use std::path::{Path, PathBuf};

use clap::{Arg, ArgAction, Command};

use peakrdl_core::{string_values, CommandContext, CoreError, RegisteredImporter, Result, Subcommand};

pub struct Preprocess;

impl Subcommand for Preprocess {
    fn name(&self) -> &str {
        "preprocess"
    }

    fn short_desc(&self) -> &str {
        "Preprocess a register description source file and write the result"
    }

    fn configure_args(&self, cmd: Command, _importers: &[RegisteredImporter]) -> Command {
        cmd.arg(
            Arg::new("file")
                .value_name("FILE")
                .required(true)
                .help("Source file to preprocess"),
        )
        .arg(
            Arg::new("incdirs")
                .short('I')
                .value_name("INCDIR")
                .action(ArgAction::Append)
                .help("Search directory for files included with `include \"filename\"`"),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .value_name("PATH")
                .required(true)
                .help("Output path"),
        )
    }

    fn run(&self, ctx: &CommandContext<'_>) -> Result<()> {
        let mut engine = ctx.registry.new_engine().ok_or(CoreError::NoEngine)?;

        let file = ctx
            .matches
            .get_one::<String>("file")
            .expect("argument is required");
        let output = ctx
            .matches
            .get_one::<String>("output")
            .expect("argument is required");
        let incdirs: Vec<PathBuf> = string_values(ctx.matches, "incdirs")
            .into_iter()
            .map(PathBuf::from)
            .collect();

        let text = engine.preprocess(Path::new(file), &incdirs)?;
        std::fs::write(output, text).map_err(|e| CoreError::Io {
            path: PathBuf::from(output),
            source: e,
        })?;
        Ok(())
    }
}
