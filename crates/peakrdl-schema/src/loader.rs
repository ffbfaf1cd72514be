//! Plugin loading seam used by import-reference schema fields
//!
//! The schema engine never loads plugin code itself. An `ObjectImport`
//! field only parses the `module.path:ObjectName` reference and asks the
//! injected [`PluginLoader`] to produce the object. What "loading" means
//! (a static registry, a dynamic library, ...) is the collaborator's
//! business.

use std::any::Any;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::OnceLock;

use regex::Regex;

/// An opaque object produced by a [`PluginLoader`].
///
/// Consumers downcast this to the concrete capability type they expect
/// (importer factory, exporter factory, ...).
pub type LoadedObject = Arc<dyn Any + Send + Sync>;

/// A parsed `module.path:ObjectName` import reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImportSpec {
    pub module: String,
    pub object: String,
}

impl ImportSpec {
    /// Parse an import reference of the form `identifier(.identifier)*:identifier`.
    pub fn parse(s: &str) -> Option<Self> {
        static RE: OnceLock<Regex> = OnceLock::new();
        let re = RE.get_or_init(|| Regex::new(r"^(\w+(?:\.\w+)*):(\w+)$").unwrap());
        let caps = re.captures(s)?;
        Some(Self {
            module: caps[1].to_string(),
            object: caps[2].to_string(),
        })
    }
}

impl fmt::Display for ImportSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.module, self.object)
    }
}

/// Additional locations a loader should search for plugin modules.
///
/// Populated once by the config bootstrap pass and passed explicitly to
/// every [`PluginLoader::resolve`] call, instead of mutating a
/// process-wide search path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchPathContext {
    paths: Vec<PathBuf>,
}

impl SearchPathContext {
    pub fn new(paths: Vec<PathBuf>) -> Self {
        Self { paths }
    }

    pub fn push(&mut self, path: PathBuf) {
        self.paths.push(path);
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

/// Errors a [`PluginLoader`] can report.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("no module named '{module}'")]
    ModuleNotFound { module: String },

    #[error("module '{module}' has no object '{object}'")]
    ObjectNotFound { module: String, object: String },
}

/// Resolves an import reference to a loadable object.
pub trait PluginLoader: Send + Sync {
    fn resolve(
        &self,
        spec: &ImportSpec,
        search: &SearchPathContext,
    ) -> std::result::Result<LoadedObject, LoadError>;
}
