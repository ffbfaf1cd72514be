//! Config file discovery
//!
//! A `peakrdl.toml` is looked up in a fixed precedence order. The first
//! existing file wins; locations are never merged.

use std::path::PathBuf;

/// Environment variable naming a fallback config file path.
pub const CFG_ENV_VAR: &str = "PEAKRDL_CFG";

/// Probes the discovery chain for a config file.
///
/// All inputs (working directory, home directory, `/etc`, the
/// environment-variable path) are captured up front so tests can pin
/// them without touching process state.
#[derive(Debug, Clone)]
pub struct Discovery {
    cwd: PathBuf,
    env_cfg: Option<PathBuf>,
    home: Option<PathBuf>,
    etc: PathBuf,
}

impl Discovery {
    /// Capture the process environment.
    pub fn from_process() -> std::io::Result<Self> {
        Ok(Self {
            cwd: std::env::current_dir()?,
            env_cfg: std::env::var_os(CFG_ENV_VAR).map(PathBuf::from),
            home: dirs::home_dir(),
            etc: PathBuf::from("/etc"),
        })
    }

    /// Build a discovery chain over explicit locations (for tests).
    pub fn with_roots(
        cwd: impl Into<PathBuf>,
        env_cfg: Option<PathBuf>,
        home: Option<PathBuf>,
        etc: impl Into<PathBuf>,
    ) -> Self {
        Self {
            cwd: cwd.into(),
            env_cfg,
            home,
            etc: etc.into(),
        }
    }

    /// Return the first existing config file, in precedence order:
    ///
    /// 1. `<cwd>/peakrdl.toml`
    /// 2. `<cwd>/.peakrdl.toml`
    /// 3. the `PEAKRDL_CFG` path, if that file exists
    /// 4. `<home>/.peakrdl.toml`
    /// 5. `<home>/.config/peakrdl.toml`
    /// 6. `/etc/peakrdl.toml`
    pub fn discover(&self) -> Option<PathBuf> {
        let mut candidates: Vec<PathBuf> = vec![
            self.cwd.join("peakrdl.toml"),
            self.cwd.join(".peakrdl.toml"),
        ];
        if let Some(env_path) = &self.env_cfg {
            candidates.push(env_path.clone());
        }
        if let Some(home) = &self.home {
            candidates.push(home.join(".peakrdl.toml"));
            candidates.push(home.join(".config").join("peakrdl.toml"));
        }
        candidates.push(self.etc.join("peakrdl.toml"));

        for candidate in candidates {
            if candidate.is_file() {
                tracing::debug!(path = %candidate.display(), "discovered config file");
                return Some(candidate);
            }
        }
        None
    }
}

/// Discover a config file from the process environment.
pub fn discover() -> Option<PathBuf> {
    Discovery::from_process().ok()?.discover()
}
