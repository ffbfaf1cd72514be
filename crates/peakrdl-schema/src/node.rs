//! Schema tree: normalization and data extraction
//!
//! A [`SchemaNode`] is a typed validator for one piece of configuration
//! data. Schemas are written in a shorthand form ([`RawSchema`]) and
//! expanded by [`normalize`] into the canonical node tree. Extraction
//! walks data and schema together, fails fast on the first mismatch, and
//! reports errors with a fully qualified dotted context.

use std::path::{Path, PathBuf};

use crate::error::{Result, SchemaError};
use crate::loader::{ImportSpec, PluginLoader, SearchPathContext};
use crate::paths;
use crate::value::{CfgValue, PluginHandle};

/// Everything extraction needs besides the data itself: the config file
/// the data came from (empty path when there is no file), the plugin
/// loader for import-reference fields, and the module search locations
/// discovered by the bootstrap pass.
pub struct ExtractContext<'a> {
    pub source: &'a Path,
    pub loader: &'a dyn PluginLoader,
    pub search: &'a SearchPathContext,
}

impl<'a> ExtractContext<'a> {
    pub fn new(
        source: &'a Path,
        loader: &'a dyn PluginLoader,
        search: &'a SearchPathContext,
    ) -> Self {
        Self {
            source,
            loader,
            search,
        }
    }
}

/// Existence requirements for a [`SchemaNode::Path`] field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathKind {
    Any,
    File,
    Directory,
}

/// Refinement options for filesystem path fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathSpec {
    pub kind: PathKind,
    pub must_exist: bool,
}

impl PathSpec {
    pub fn any() -> Self {
        Self {
            kind: PathKind::Any,
            must_exist: true,
        }
    }

    pub fn file() -> Self {
        Self {
            kind: PathKind::File,
            must_exist: true,
        }
    }

    pub fn directory() -> Self {
        Self {
            kind: PathKind::Directory,
            must_exist: true,
        }
    }

    pub fn must_exist(mut self, must_exist: bool) -> Self {
        self.must_exist = must_exist;
        self
    }
}

/// A fully normalized schema validator.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaNode {
    String,
    Integer,
    Float,
    Boolean,
    DateTime,
    Date,
    Time,
    /// Wildcard: matches any value, returned verbatim.
    Any,
    Array(Box<SchemaNode>),
    /// Ordered field list. Extraction is total: every declared field is
    /// present in the output, defaulted when absent from the data.
    FixedMapping(Vec<(String, SchemaNode)>),
    /// Open mapping: arbitrary keys, one shared value schema.
    UserMapping(Box<SchemaNode>),
    Path(PathSpec),
    /// A `module.path:ObjectName` reference, resolved through the
    /// injected plugin loader at extraction time.
    ObjectImport,
    Choice(Vec<String>),
}

/// Shorthand schema description.
///
/// A single-element sequence denotes an array schema, a mapping whose
/// sole key is `*` denotes a user mapping, and any other mapping is a
/// fixed mapping. Already-normalized nodes pass through unchanged.
#[derive(Debug, Clone, PartialEq)]
pub enum RawSchema {
    Node(SchemaNode),
    Array(Vec<RawSchema>),
    Mapping(Vec<(String, RawSchema)>),
}

impl RawSchema {
    pub fn array(element: RawSchema) -> Self {
        Self::Array(vec![element])
    }

    pub fn mapping<K, I>(fields: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, RawSchema)>,
    {
        Self::Mapping(fields.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    pub fn user_mapping(value: RawSchema) -> Self {
        Self::Mapping(vec![("*".to_string(), value)])
    }

    /// The empty fixed mapping: accepts any table, extracts no fields.
    pub fn empty_mapping() -> Self {
        Self::Mapping(Vec::new())
    }
}

impl From<SchemaNode> for RawSchema {
    fn from(node: SchemaNode) -> Self {
        Self::Node(node)
    }
}

/// Expand shorthand into the canonical schema tree.
///
/// Idempotent on already-normalized input. Malformed shorthand is a
/// programmer error and panics.
pub fn normalize(raw: RawSchema) -> SchemaNode {
    match raw {
        RawSchema::Node(node) => node,
        RawSchema::Array(mut elements) => {
            assert!(
                elements.len() == 1,
                "array schema shorthand must contain exactly one element"
            );
            SchemaNode::Array(Box::new(normalize(elements.remove(0))))
        }
        RawSchema::Mapping(entries) => {
            if entries.iter().any(|(k, _)| k == "*") {
                assert!(
                    entries.len() == 1,
                    "user mapping schema shorthand must contain only the '*' entry"
                );
                let (_, value) = entries.into_iter().next().unwrap();
                SchemaNode::UserMapping(Box::new(normalize(value)))
            } else {
                SchemaNode::FixedMapping(
                    entries
                        .into_iter()
                        .map(|(k, v)| (k, normalize(v)))
                        .collect(),
                )
            }
        }
    }
}

fn child_key(ctx: &str, key: &str) -> String {
    if ctx.is_empty() {
        key.to_string()
    } else {
        format!("{ctx}.{key}")
    }
}

fn mismatch(ctx: &str, expected: &'static str, data: &toml::Value) -> SchemaError {
    SchemaError::TypeMismatch {
        ctx: ctx.to_string(),
        expected,
        found: found_name(data).to_string(),
    }
}

/// Human-readable name of a raw value's type, distinguishing the three
/// TOML date/time shapes.
fn found_name(data: &toml::Value) -> &'static str {
    match data {
        toml::Value::Datetime(d) => datetime_kind(d),
        toml::Value::Table(_) => "mapping",
        other => other.type_str(),
    }
}

fn datetime_kind(d: &toml::value::Datetime) -> &'static str {
    match (d.date.is_some(), d.time.is_some()) {
        (true, true) => "datetime",
        (true, false) => "date",
        (false, true) => "time",
        (false, false) => "datetime",
    }
}

impl SchemaNode {
    /// Validate `data` against this schema and produce the normalized
    /// value.
    ///
    /// `err_ctx` is the dotted context of `data` within the document,
    /// extended as extraction recurses into aggregates. Fail-fast: the
    /// first mismatch anywhere in the tree aborts the whole extraction.
    pub fn extract(
        &self,
        data: &toml::Value,
        ctx: &ExtractContext<'_>,
        err_ctx: &str,
    ) -> Result<CfgValue> {
        match self {
            Self::String => match data {
                toml::Value::String(s) => Ok(CfgValue::String(s.clone())),
                other => Err(mismatch(err_ctx, "string", other)),
            },
            Self::Integer => match data {
                toml::Value::Integer(i) => Ok(CfgValue::Integer(*i)),
                other => Err(mismatch(err_ctx, "integer", other)),
            },
            Self::Float => match data {
                toml::Value::Float(f) => Ok(CfgValue::Float(*f)),
                other => Err(mismatch(err_ctx, "float", other)),
            },
            Self::Boolean => match data {
                toml::Value::Boolean(b) => Ok(CfgValue::Boolean(*b)),
                other => Err(mismatch(err_ctx, "boolean", other)),
            },
            Self::DateTime => match data {
                toml::Value::Datetime(d) if datetime_kind(d) == "datetime" => {
                    Ok(CfgValue::Datetime(*d))
                }
                other => Err(mismatch(err_ctx, "datetime", other)),
            },
            Self::Date => match data {
                toml::Value::Datetime(d) if datetime_kind(d) == "date" => {
                    Ok(CfgValue::Datetime(*d))
                }
                other => Err(mismatch(err_ctx, "date", other)),
            },
            Self::Time => match data {
                toml::Value::Datetime(d) if datetime_kind(d) == "time" => {
                    Ok(CfgValue::Datetime(*d))
                }
                other => Err(mismatch(err_ctx, "time", other)),
            },
            Self::Any => Ok(CfgValue::from_toml(data)),
            Self::Array(element) => {
                let items = match data {
                    toml::Value::Array(items) => items,
                    other => return Err(mismatch(err_ctx, "array", other)),
                };
                let mut out = Vec::with_capacity(items.len());
                for (i, item) in items.iter().enumerate() {
                    out.push(element.extract(item, ctx, &format!("{err_ctx}[{i}]"))?);
                }
                Ok(CfgValue::Array(out))
            }
            Self::FixedMapping(fields) => {
                let table = match data {
                    toml::Value::Table(table) => table,
                    other => return Err(mismatch(err_ctx, "mapping", other)),
                };
                let mut out = Vec::with_capacity(fields.len());
                for (key, schema) in fields {
                    let value = match table.get(key) {
                        Some(raw) => schema.extract(raw, ctx, &child_key(err_ctx, key))?,
                        None => schema.default_value(ctx, &child_key(err_ctx, key))?,
                    };
                    out.push((key.clone(), value));
                }
                Ok(CfgValue::Mapping(out))
            }
            Self::UserMapping(value_schema) => {
                let table = match data {
                    toml::Value::Table(table) => table,
                    other => return Err(mismatch(err_ctx, "mapping", other)),
                };
                let mut out = Vec::with_capacity(table.len());
                for (key, raw) in table {
                    out.push((
                        key.clone(),
                        value_schema.extract(raw, ctx, &child_key(err_ctx, key))?,
                    ));
                }
                Ok(CfgValue::Mapping(out))
            }
            Self::Path(spec) => {
                let s = match data {
                    toml::Value::String(s) => s,
                    other => return Err(mismatch(err_ctx, "string", other)),
                };
                let resolved = resolve_path(s, ctx.source);
                spec.check(&resolved, err_ctx)?;
                Ok(CfgValue::Path(resolved))
            }
            Self::ObjectImport => {
                let s = match data {
                    toml::Value::String(s) => s,
                    other => return Err(mismatch(err_ctx, "string", other)),
                };
                let spec = ImportSpec::parse(s).ok_or_else(|| SchemaError::BadImportSpec {
                    ctx: err_ctx.to_string(),
                    value: s.clone(),
                })?;
                tracing::debug!(%spec, ctx = err_ctx, "resolving import reference");
                let object =
                    ctx.loader
                        .resolve(&spec, ctx.search)
                        .map_err(|e| SchemaError::Resolution {
                            ctx: err_ctx.to_string(),
                            source: e,
                        })?;
                Ok(CfgValue::Object(PluginHandle { spec, object }))
            }
            Self::Choice(allowed) => {
                let s = match data {
                    toml::Value::String(s) => s,
                    other => return Err(mismatch(err_ctx, "string", other)),
                };
                if !allowed.iter().any(|choice| choice == s) {
                    return Err(SchemaError::InvalidChoice {
                        ctx: err_ctx.to_string(),
                        value: s.clone(),
                        allowed: allowed.clone(),
                    });
                }
                Ok(CfgValue::String(s.clone()))
            }
        }
    }

    /// The value a fixed-mapping field takes when the data omits it.
    fn default_value(&self, ctx: &ExtractContext<'_>, err_ctx: &str) -> Result<CfgValue> {
        match self {
            Self::Array(_) => Ok(CfgValue::Array(Vec::new())),
            Self::UserMapping(_) => Ok(CfgValue::Mapping(Vec::new())),
            // Fixed mappings default with all of their own fields
            // recursively defaulted.
            Self::FixedMapping(_) => {
                self.extract(&toml::Value::Table(toml::map::Map::new()), ctx, err_ctx)
            }
            _ => Ok(CfgValue::None),
        }
    }
}

/// Resolve a path field: `~` expansion, then interpretation relative to
/// the directory of the config file the data came from, then lexical
/// normalization to an absolute path.
fn resolve_path(s: &str, source: &Path) -> PathBuf {
    let expanded = paths::expand_user(s);
    let joined = if expanded.is_absolute() {
        expanded
    } else {
        match source.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.join(&expanded),
            _ => expanded,
        }
    };
    paths::absolutize(&joined)
}

impl PathSpec {
    fn check(&self, path: &Path, err_ctx: &str) -> Result<()> {
        if !self.must_exist {
            return Ok(());
        }
        if !path.exists() {
            return Err(SchemaError::PathNotFound {
                ctx: err_ctx.to_string(),
                path: path.to_path_buf(),
            });
        }
        match self.kind {
            PathKind::Any => Ok(()),
            PathKind::File => {
                if path.is_file() {
                    Ok(())
                } else {
                    Err(SchemaError::NotAFile {
                        ctx: err_ctx.to_string(),
                        path: path.to_path_buf(),
                    })
                }
            }
            PathKind::Directory => {
                if path.is_dir() {
                    Ok(())
                } else {
                    Err(SchemaError::NotADirectory {
                        ctx: err_ctx.to_string(),
                        path: path.to_path_buf(),
                    })
                }
            }
        }
    }
}
