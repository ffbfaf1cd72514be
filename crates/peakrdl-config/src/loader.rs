//! Application configuration loading
//!
//! [`AppConfig`] owns the parsed config file data for the lifetime of the
//! process. Loading runs a minimal bootstrap extraction first, so that
//! plugin search locations named by the file are in effect before any
//! import-reference field elsewhere in the same file is resolved.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use peakrdl_schema::{
    normalize, CfgValue, ExtractContext, PathSpec, PluginLoader, RawSchema, SchemaNode,
    SearchPathContext,
};

use crate::discover::Discovery;
use crate::error::{ConfigError, Result};

/// Name of the reserved top-level config namespace.
pub const RESERVED_NAMESPACE: &str = "peakrdl";

fn bootstrap_schema() -> SchemaNode {
    normalize(RawSchema::mapping([(
        RESERVED_NAMESPACE,
        RawSchema::mapping([(
            "python_search_paths",
            RawSchema::array(RawSchema::Node(SchemaNode::Path(
                PathSpec::directory().must_exist(false),
            ))),
        )]),
    )]))
}

fn reserved_schema() -> SchemaNode {
    normalize(RawSchema::mapping([(
        "plugins",
        RawSchema::mapping([
            (
                "importers",
                RawSchema::user_mapping(RawSchema::Node(SchemaNode::ObjectImport)),
            ),
            (
                "exporters",
                RawSchema::user_mapping(RawSchema::Node(SchemaNode::ObjectImport)),
            ),
        ]),
    )]))
}

/// Validated view of the `peakrdl.toml` configuration.
///
/// Immutable after construction. Individual components pull their own
/// top-level namespace on demand through [`AppConfig::get_namespace`].
pub struct AppConfig {
    /// Path of the loaded file; empty when no file was found.
    path: PathBuf,
    raw: toml::Table,
    loader: Arc<dyn PluginLoader>,
    search_paths: SearchPathContext,
    /// Cached, validated reserved namespace.
    peakrdl: CfgValue,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("path", &self.path)
            .field("raw", &self.raw)
            .field("loader", &"<dyn PluginLoader>")
            .field("search_paths", &self.search_paths)
            .field("peakrdl", &self.peakrdl)
            .finish()
    }
}

impl AppConfig {
    /// Load configuration.
    ///
    /// An explicit path (from `--peakrdl-cfg`) is used verbatim and must
    /// exist. Otherwise the discovery chain runs; finding nothing is not
    /// an error and yields the empty configuration.
    pub fn load(explicit: Option<&Path>, loader: Arc<dyn PluginLoader>) -> Result<Self> {
        let path = match explicit {
            Some(path) => {
                if !path.is_file() {
                    return Err(ConfigError::FileNotFound {
                        path: path.to_path_buf(),
                    });
                }
                Some(path.to_path_buf())
            }
            None => Discovery::from_process()
                .map_err(|e| ConfigError::Io {
                    path: PathBuf::from("."),
                    source: e,
                })?
                .discover(),
        };
        Self::load_from(path, loader)
    }

    /// Load from a known location (`None` = no config file anywhere).
    pub fn load_from(path: Option<PathBuf>, loader: Arc<dyn PluginLoader>) -> Result<Self> {
        let (path, raw) = match path {
            None => {
                tracing::debug!("no config file found; using defaults");
                (PathBuf::new(), toml::Table::new())
            }
            Some(path) => {
                let text = std::fs::read_to_string(&path).map_err(|e| ConfigError::Io {
                    path: path.clone(),
                    source: e,
                })?;
                let raw = text.parse::<toml::Table>().map_err(|e| ConfigError::Parse {
                    path: path.clone(),
                    source: e,
                })?;
                (path, raw)
            }
        };

        // Bootstrap pass: pick up additional plugin search locations
        // before anything tries to resolve an import reference.
        let search_paths = bootstrap_search_paths(&path, &raw, loader.as_ref())?;

        let mut config = Self {
            path,
            raw,
            loader,
            search_paths,
            peakrdl: CfgValue::Mapping(Vec::new()),
        };
        config.peakrdl = config.get_namespace(RESERVED_NAMESPACE, &reserved_schema())?;
        Ok(config)
    }

    /// Path of the loaded config file; empty when none was found.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Plugin search locations collected by the bootstrap pass.
    pub fn search_paths(&self) -> &SearchPathContext {
        &self.search_paths
    }

    /// The validated reserved `peakrdl` namespace.
    pub fn peakrdl(&self) -> &CfgValue {
        &self.peakrdl
    }

    /// Validate one top-level namespace against a schema.
    ///
    /// Idempotent and side-effect free; an absent namespace validates as
    /// the empty mapping, so fixed-mapping defaults apply.
    pub fn get_namespace(&self, name: &str, schema: &SchemaNode) -> Result<CfgValue> {
        let empty = toml::Value::Table(toml::Table::new());
        let data = self.raw.get(name).unwrap_or(&empty);
        let ctx = ExtractContext::new(&self.path, self.loader.as_ref(), &self.search_paths);
        schema
            .extract(data, &ctx, name)
            .map_err(|e| ConfigError::Schema {
                path: self.path.clone(),
                source: e,
            })
    }
}

fn bootstrap_search_paths(
    path: &Path,
    raw: &toml::Table,
    loader: &dyn PluginLoader,
) -> Result<SearchPathContext> {
    let empty_search = SearchPathContext::default();
    let ctx = ExtractContext::new(path, loader, &empty_search);
    let data = toml::Value::Table(raw.clone());
    let extracted = bootstrap_schema()
        .extract(&data, &ctx, "")
        .map_err(|e| ConfigError::Schema {
            path: path.to_path_buf(),
            source: e,
        })?;

    let mut search = SearchPathContext::default();
    if let Some(paths) = extracted
        .get(RESERVED_NAMESPACE)
        .and_then(|v| v.get("python_search_paths"))
        .and_then(|v| v.as_array())
    {
        for value in paths {
            if let Some(dir) = value.as_path() {
                tracing::debug!(path = %dir.display(), "adding plugin search path");
                search.push(dir.to_path_buf());
            }
        }
    }
    Ok(search)
}
