//! Configuration discovery and loading for the PeakRDL front end
//!
//! Finds a `peakrdl.toml` through a fixed precedence chain, parses it,
//! bootstraps plugin search locations from it, and exposes validated
//! per-namespace sections on demand.

mod discover;
mod error;
mod loader;

pub use discover::{discover, Discovery, CFG_ENV_VAR};
pub use error::{ConfigError, Result};
pub use loader::{AppConfig, RESERVED_NAMESPACE};
