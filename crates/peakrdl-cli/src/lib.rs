//! Command-line front end for the PeakRDL toolchain
//!
//! Exposed as a library so embedding builds can register their compiler
//! engine and builtin plugins on a [`PluginRegistry`](peakrdl_core::PluginRegistry)
//! and hand it to [`run`].

mod app;
pub mod argfile;
mod commands;
mod error;
mod logging;

pub use app::run;
pub use error::{CliError, Result};
