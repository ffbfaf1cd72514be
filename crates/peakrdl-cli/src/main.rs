//! The `peakrdl` binary
//!
//! The stock build ships no compiler engine and no builtin plugins;
//! distributions embedding the toolchain register theirs on the
//! registry before handing it to the driver.

use peakrdl_core::PluginRegistry;

fn main() {
    let registry = PluginRegistry::new();
    std::process::exit(peakrdl_cli::run(std::env::args().collect(), registry));
}
