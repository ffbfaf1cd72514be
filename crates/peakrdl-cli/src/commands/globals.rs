//! `globals` subcommand: list elaboratable root components

use clap::Command;

use peakrdl_core::{
    add_compile_arguments, add_importer_arguments, process_input, string_values, CommandContext,
    CoreError, RegisteredImporter, Result, Subcommand,
};

pub struct ListGlobals;

impl Subcommand for ListGlobals {
    fn name(&self) -> &str {
        "globals"
    }

    fn short_desc(&self) -> &str {
        "List all globally accessible types that can be elaborated as top"
    }

    fn configure_args(&self, cmd: Command, importers: &[RegisteredImporter]) -> Command {
        let cmd = add_compile_arguments(cmd);
        add_importer_arguments(cmd, importers)
    }

    fn run(&self, ctx: &CommandContext<'_>) -> Result<()> {
        let mut engine = ctx.registry.new_engine().ok_or(CoreError::NoEngine)?;
        let input_files = string_values(ctx.matches, "input_files");
        process_input(engine.as_mut(), ctx.importers, &input_files, ctx.matches)?;

        for name in engine.list_globals() {
            println!("{name}");
        }
        Ok(())
    }
}
