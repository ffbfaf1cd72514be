//! Plugin registry
//!
//! The registry is the concrete "load object by identifier" capability
//! behind import-reference config fields: a two-level map from module
//! path to named objects. It also carries the builtin importer/exporter
//! registrations and the optional compiler engine factory an embedder
//! provides.

use std::collections::HashMap;

use peakrdl_schema::{ImportSpec, LoadError, LoadedObject, PluginLoader, SearchPathContext};

use crate::engine::RdlCompiler;
use crate::importer::Importer;
use crate::subcommand::Exporter;

/// Constructs importer instances for config-registered plugins.
///
/// This is the concrete payload type importer references must resolve
/// to; anything else fails plugin collection.
pub struct ImporterFactory {
    ctor: fn() -> Box<dyn Importer>,
}

impl ImporterFactory {
    pub fn new(ctor: fn() -> Box<dyn Importer>) -> Self {
        Self { ctor }
    }

    pub fn create(&self) -> Box<dyn Importer> {
        (self.ctor)()
    }
}

/// Constructs exporter instances for config-registered plugins.
pub struct ExporterFactory {
    ctor: fn() -> Box<dyn Exporter>,
}

impl ExporterFactory {
    pub fn new(ctor: fn() -> Box<dyn Exporter>) -> Self {
        Self { ctor }
    }

    pub fn create(&self) -> Box<dyn Exporter> {
        (self.ctor)()
    }
}

type EngineCtor = Box<dyn Fn() -> Box<dyn RdlCompiler> + Send + Sync>;

/// Registry of loadable plugin objects and builtin registrations.
#[derive(Default)]
pub struct PluginRegistry {
    /// module path -> object name -> payload
    modules: HashMap<String, HashMap<String, LoadedObject>>,
    importers: Vec<(String, ImporterFactory)>,
    exporters: Vec<(String, ExporterFactory)>,
    engine: Option<EngineCtor>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make an object loadable under `module.path:object`.
    pub fn register_object(
        &mut self,
        module: impl Into<String>,
        object: impl Into<String>,
        payload: LoadedObject,
    ) {
        self.modules
            .entry(module.into())
            .or_default()
            .insert(object.into(), payload);
    }

    /// Register a builtin importer (always available, no config entry).
    pub fn register_importer(&mut self, name: impl Into<String>, factory: ImporterFactory) {
        self.importers.push((name.into(), factory));
    }

    /// Register a builtin exporter subcommand.
    pub fn register_exporter(&mut self, name: impl Into<String>, factory: ExporterFactory) {
        self.exporters.push((name.into(), factory));
    }

    /// Provide the compiler engine for this build.
    pub fn set_engine<F>(&mut self, ctor: F)
    where
        F: Fn() -> Box<dyn RdlCompiler> + Send + Sync + 'static,
    {
        self.engine = Some(Box::new(ctor));
    }

    /// Construct a fresh engine instance, if one is registered.
    pub fn new_engine(&self) -> Option<Box<dyn RdlCompiler>> {
        self.engine.as_ref().map(|ctor| ctor())
    }

    /// Builtin importer registrations, in registration order.
    pub fn builtin_importers(&self) -> impl Iterator<Item = (&str, &ImporterFactory)> {
        self.importers.iter().map(|(name, f)| (name.as_str(), f))
    }

    /// Builtin exporter registrations, in registration order.
    pub fn builtin_exporters(&self) -> impl Iterator<Item = (&str, &ExporterFactory)> {
        self.exporters.iter().map(|(name, f)| (name.as_str(), f))
    }
}

impl PluginLoader for PluginRegistry {
    fn resolve(
        &self,
        spec: &ImportSpec,
        search: &SearchPathContext,
    ) -> Result<LoadedObject, LoadError> {
        if !search.is_empty() {
            tracing::debug!(module = %spec.module, paths = ?search.paths(), "resolving with extra search paths");
        }
        let objects = self
            .modules
            .get(&spec.module)
            .ok_or_else(|| LoadError::ModuleNotFound {
                module: spec.module.clone(),
            })?;
        objects
            .get(&spec.object)
            .cloned()
            .ok_or_else(|| LoadError::ObjectNotFound {
                module: spec.module.clone(),
                object: spec.object.clone(),
            })
    }
}
