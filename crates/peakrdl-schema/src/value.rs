//! Normalized configuration values produced by schema extraction

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::loader::{ImportSpec, LoadedObject};

/// A resolved plugin object together with the reference that named it.
#[derive(Clone)]
pub struct PluginHandle {
    pub spec: ImportSpec,
    pub object: LoadedObject,
}

impl fmt::Debug for PluginHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PluginHandle({})", self.spec)
    }
}

impl PartialEq for PluginHandle {
    fn eq(&self, other: &Self) -> bool {
        self.spec == other.spec && Arc::ptr_eq(&self.object, &other.object)
    }
}

/// The output of [`SchemaNode::extract`](crate::SchemaNode::extract).
///
/// Base TOML types round-trip unchanged; refinements produce resolved
/// forms (`Path` is absolute and normalized, `Object` carries the loaded
/// plugin object). `None` marks a scalar field the data did not provide.
#[derive(Debug, Clone, PartialEq)]
pub enum CfgValue {
    None,
    String(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Datetime(toml::value::Datetime),
    Array(Vec<CfgValue>),
    /// Key/value pairs in extraction order. Fixed mappings preserve the
    /// schema's declared field order.
    Mapping(Vec<(String, CfgValue)>),
    Path(PathBuf),
    Object(PluginHandle),
}

impl CfgValue {
    /// Convert raw TOML data verbatim (used by the wildcard schema).
    pub fn from_toml(value: &toml::Value) -> Self {
        match value {
            toml::Value::String(s) => Self::String(s.clone()),
            toml::Value::Integer(i) => Self::Integer(*i),
            toml::Value::Float(f) => Self::Float(*f),
            toml::Value::Boolean(b) => Self::Boolean(*b),
            toml::Value::Datetime(d) => Self::Datetime(*d),
            toml::Value::Array(items) => Self::Array(items.iter().map(Self::from_toml).collect()),
            toml::Value::Table(table) => Self::Mapping(
                table
                    .iter()
                    .map(|(k, v)| (k.clone(), Self::from_toml(v)))
                    .collect(),
            ),
        }
    }

    /// Look up a key in a mapping value.
    pub fn get(&self, key: &str) -> Option<&CfgValue> {
        match self {
            Self::Mapping(pairs) => pairs.iter().find(|(k, _)| k == key).map(|(_, v)| v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[CfgValue]> {
        match self {
            Self::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_mapping(&self) -> Option<&[(String, CfgValue)]> {
        match self {
            Self::Mapping(pairs) => Some(pairs),
            _ => None,
        }
    }

    pub fn as_path(&self) -> Option<&Path> {
        match self {
            Self::Path(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&PluginHandle> {
        match self {
            Self::Object(handle) => Some(handle),
            _ => None,
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }
}
