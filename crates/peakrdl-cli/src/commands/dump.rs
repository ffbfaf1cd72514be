//! `dump` subcommand: print the register address map

use clap::{Arg, ArgAction, Command};

use peakrdl_core::{CommandContext, ElaboratedModel, Exporter, Result};

/// Prints every register's address range and hierarchical path.
pub struct Dump;

impl Exporter for Dump {
    fn short_desc(&self) -> &str {
        "Print the elaborated register model's address map to stdout"
    }

    fn generates_output_file(&self) -> bool {
        false
    }

    fn add_exporter_arguments(&self, cmd: Command) -> Command {
        cmd.arg(
            Arg::new("unroll")
                .short('u')
                .long("unroll")
                .action(ArgAction::SetTrue)
                .help("Unroll arrays"),
        )
    }

    fn do_export(&self, model: &dyn ElaboratedModel, ctx: &CommandContext<'_>) -> Result<()> {
        let unroll = ctx.matches.get_flag("unroll");
        // Pad addresses to the width of the design's total span.
        let bits = u64::from(64 - model.total_size().leading_zeros());
        let width = bits.div_ceil(4).max(1) as usize;

        for reg in model.registers(unroll) {
            println!(
                "0x{:0width$x}-0x{:0width$x}: {}",
                reg.addr_low, reg.addr_high, reg.path
            );
        }
        Ok(())
    }
}
