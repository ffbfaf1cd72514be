//! Plugin collection
//!
//! Assembles the final importer and exporter lists from the builtin
//! registry plus the config file's reserved namespace. Builtins come
//! first; config-registered plugins follow in config order.

use peakrdl_config::AppConfig;
use peakrdl_schema::CfgValue;

use crate::error::{CoreError, Result};
use crate::importer::{PluginOrigin, RegisteredImporter};
use crate::registry::{ExporterFactory, ImporterFactory, PluginRegistry};
use crate::subcommand::ExporterCommand;

fn config_entries<'a>(config: &'a AppConfig, kind: &str) -> &'a [(String, CfgValue)] {
    config
        .peakrdl()
        .get("plugins")
        .and_then(|v| v.get(kind))
        .and_then(|v| v.as_mapping())
        .unwrap_or(&[])
}

/// All importers: builtin registrations, then config-registered ones.
/// Every importer's config namespace is validated before returning.
pub fn collect_importers(
    config: &AppConfig,
    registry: &PluginRegistry,
) -> Result<Vec<RegisteredImporter>> {
    let mut importers = Vec::new();

    for (name, factory) in registry.builtin_importers() {
        importers.push(RegisteredImporter::new(
            name,
            PluginOrigin::Builtin,
            factory.create(),
        ));
    }

    for (name, value) in config_entries(config, "importers") {
        let Some(handle) = value.as_object() else {
            // The reserved-namespace schema only produces objects here.
            continue;
        };
        let factory = handle
            .object
            .downcast_ref::<ImporterFactory>()
            .ok_or_else(|| CoreError::NotAnImporter {
                name: name.clone(),
                spec: handle.spec.clone(),
            })?;
        importers.push(RegisteredImporter::new(
            name,
            PluginOrigin::Config(handle.spec.clone()),
            factory.create(),
        ));
    }

    for importer in &mut importers {
        importer.load_cfg(config)?;
    }
    Ok(importers)
}

/// All exporter subcommands: builtin registrations, then
/// config-registered ones.
pub fn collect_exporters(
    config: &AppConfig,
    registry: &PluginRegistry,
) -> Result<Vec<ExporterCommand>> {
    let mut exporters = Vec::new();

    for (name, factory) in registry.builtin_exporters() {
        exporters.push(ExporterCommand::new(
            name,
            PluginOrigin::Builtin,
            factory.create(),
        ));
    }

    for (name, value) in config_entries(config, "exporters") {
        let Some(handle) = value.as_object() else {
            continue;
        };
        let factory = handle
            .object
            .downcast_ref::<ExporterFactory>()
            .ok_or_else(|| CoreError::NotAnExporter {
                name: name.clone(),
                spec: handle.spec.clone(),
            })?;
        exporters.push(ExporterCommand::new(
            name,
            PluginOrigin::Config(handle.spec.clone()),
            factory.create(),
        ));
    }

    Ok(exporters)
}
