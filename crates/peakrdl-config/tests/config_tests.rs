//! AppConfig loading behavior

use std::path::{Path, PathBuf};
use std::sync::Arc;

use pretty_assertions::assert_eq;

use peakrdl_config::{AppConfig, ConfigError};
use peakrdl_schema::{
    normalize, CfgValue, ImportSpec, LoadError, LoadedObject, PluginLoader, RawSchema, SchemaNode,
    SearchPathContext,
};

/// Loader that rejects everything (configs under test carry no plugins).
struct NullLoader;

impl PluginLoader for NullLoader {
    fn resolve(
        &self,
        spec: &ImportSpec,
        _search: &SearchPathContext,
    ) -> Result<LoadedObject, LoadError> {
        Err(LoadError::ModuleNotFound {
            module: spec.module.clone(),
        })
    }
}

/// Loader that only resolves modules living under a search path that
/// contains a marker file named after the module. Used to prove the
/// bootstrap pass runs before plugin references resolve.
struct SearchSensitiveLoader;

impl PluginLoader for SearchSensitiveLoader {
    fn resolve(
        &self,
        spec: &ImportSpec,
        search: &SearchPathContext,
    ) -> Result<LoadedObject, LoadError> {
        for dir in search.paths() {
            if dir.join(format!("{}.plugin", spec.module)).is_file() {
                return Ok(Arc::new(spec.object.clone()));
            }
        }
        Err(LoadError::ModuleNotFound {
            module: spec.module.clone(),
        })
    }
}

fn write_config(dir: &Path, contents: &str) -> PathBuf {
    let path = dir.join("peakrdl.toml");
    std::fs::write(&path, contents).unwrap();
    path
}

#[test]
fn absent_config_is_the_empty_configuration() {
    let config = AppConfig::load_from(None, Arc::new(NullLoader)).unwrap();

    assert_eq!(config.path(), Path::new(""));
    assert!(config.search_paths().is_empty());

    let importers = config
        .peakrdl()
        .get("plugins")
        .and_then(|v| v.get("importers"))
        .and_then(|v| v.as_mapping())
        .unwrap();
    assert!(importers.is_empty());
}

#[test]
fn explicit_path_must_exist() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope.toml");
    let err = AppConfig::load(Some(&missing), Arc::new(NullLoader)).unwrap_err();
    assert!(matches!(err, ConfigError::FileNotFound { .. }));
}

#[test]
fn parse_failure_is_fatal_and_names_the_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(dir.path(), "this is [not toml");
    let err = AppConfig::load_from(Some(path.clone()), Arc::new(NullLoader)).unwrap_err();
    match err {
        ConfigError::Parse { path: p, .. } => assert_eq!(p, path),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn get_namespace_validates_arbitrary_sections() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(
        dir.path(),
        r#"
[my-exporter]
rows = 4
label = "hello"
"#,
    );
    let config = AppConfig::load_from(Some(path), Arc::new(NullLoader)).unwrap();

    let schema = normalize(RawSchema::mapping([
        ("rows", RawSchema::Node(SchemaNode::Integer)),
        ("label", RawSchema::Node(SchemaNode::String)),
        ("missing", RawSchema::Node(SchemaNode::Boolean)),
    ]));
    let section = config.get_namespace("my-exporter", &schema).unwrap();

    assert_eq!(section.get("rows").unwrap(), &CfgValue::Integer(4));
    assert_eq!(
        section.get("label").unwrap(),
        &CfgValue::String("hello".into())
    );
    assert_eq!(section.get("missing").unwrap(), &CfgValue::None);

    // Idempotent: a second call yields the same result.
    let again = config.get_namespace("my-exporter", &schema).unwrap();
    assert_eq!(section, again);
}

#[test]
fn absent_namespace_validates_as_empty_mapping() {
    let config = AppConfig::load_from(None, Arc::new(NullLoader)).unwrap();
    let schema = normalize(RawSchema::mapping([(
        "things",
        RawSchema::array(RawSchema::Node(SchemaNode::String)),
    )]));
    let section = config.get_namespace("whatever", &schema).unwrap();
    assert_eq!(section.get("things").unwrap(), &CfgValue::Array(vec![]));
}

#[test]
fn schema_error_carries_namespace_context_and_file_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(dir.path(), "[peakrdl.plugins]\nimporters = 5\n");
    let err = AppConfig::load_from(Some(path.clone()), Arc::new(NullLoader)).unwrap_err();
    let rendered = err.to_string();
    assert!(rendered.contains(&path.display().to_string()));
    assert!(rendered.contains("peakrdl.plugins.importers"));
}

#[test]
fn search_paths_resolve_relative_to_the_config_file() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir(dir.path().join("vendor")).unwrap();
    let path = write_config(
        dir.path(),
        r#"
[peakrdl]
python_search_paths = ["./vendor"]
"#,
    );
    let config = AppConfig::load_from(Some(path), Arc::new(NullLoader)).unwrap();

    let paths = config.search_paths().paths();
    assert_eq!(paths.len(), 1);
    assert!(paths[0].is_absolute());
    assert!(paths[0].ends_with("vendor"));
}

#[test]
fn bootstrap_runs_before_plugin_references_resolve() {
    let dir = tempfile::tempdir().unwrap();
    let vendor = dir.path().join("vendor");
    std::fs::create_dir(&vendor).unwrap();
    std::fs::write(vendor.join("acme_importer.plugin"), "").unwrap();

    let path = write_config(
        dir.path(),
        r#"
[peakrdl]
python_search_paths = ["./vendor"]

[peakrdl.plugins.importers]
acme = "acme_importer:AcmeImporter"
"#,
    );

    // Without the bootstrap ordering the importer reference could not
    // resolve, because the loader only finds modules via search paths.
    let config = AppConfig::load_from(Some(path), Arc::new(SearchSensitiveLoader)).unwrap();

    let importers = config
        .peakrdl()
        .get("plugins")
        .and_then(|v| v.get("importers"))
        .and_then(|v| v.as_mapping())
        .unwrap();
    assert_eq!(importers.len(), 1);
    assert_eq!(importers[0].0, "acme");
    let handle = importers[0].1.as_object().unwrap();
    assert_eq!(handle.spec.to_string(), "acme_importer:AcmeImporter");
}

#[test]
fn unresolvable_plugin_reference_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(
        dir.path(),
        r#"
[peakrdl.plugins.importers]
ghost = "ghost_module:Ghost"
"#,
    );
    let err = AppConfig::load_from(Some(path), Arc::new(NullLoader)).unwrap_err();
    let rendered = err.to_string();
    assert!(rendered.contains("peakrdl.plugins.importers.ghost"));
    assert!(rendered.contains("ghost_module"));
}

#[test]
fn malformed_plugin_reference_is_a_syntax_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(
        dir.path(),
        r#"
[peakrdl.plugins.exporters]
bad = "no colon here"
"#,
    );
    let err = AppConfig::load_from(Some(path), Arc::new(NullLoader)).unwrap_err();
    assert!(err
        .to_string()
        .contains("invalid object import spec"));
}
