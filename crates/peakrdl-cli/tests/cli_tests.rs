//! End-to-end driver tests with a mock compiler engine

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use pretty_assertions::assert_eq;

use peakrdl_core::{
    CommandContext, ElaborateOptions, ElaboratedModel, EngineError, Exporter, ExporterFactory,
    PluginRegistry, RdlCompiler, RegisterRecord,
};

struct MockModel;

impl ElaboratedModel for MockModel {
    fn top_name(&self) -> &str {
        "top"
    }

    fn total_size(&self) -> u64 {
        0x10
    }

    fn registers(&self, _unroll: bool) -> Vec<RegisterRecord> {
        vec![RegisterRecord {
            addr_low: 0x0,
            addr_high: 0x3,
            path: "top.r0".to_string(),
        }]
    }
}

struct MockEngine;

impl RdlCompiler for MockEngine {
    fn compile_file(
        &mut self,
        _path: &Path,
        _include_dirs: &[PathBuf],
        _defines: &HashMap<String, String>,
    ) -> Result<(), EngineError> {
        Ok(())
    }

    fn elaborate(
        &mut self,
        _options: &ElaborateOptions,
    ) -> Result<Box<dyn ElaboratedModel>, EngineError> {
        Ok(Box::new(MockModel))
    }

    fn list_globals(&self) -> Vec<String> {
        vec!["top".to_string()]
    }

    fn preprocess(
        &mut self,
        path: &Path,
        _include_dirs: &[PathBuf],
    ) -> Result<String, EngineError> {
        Ok(format!(
            "preprocessed {}\n",
            path.file_name().unwrap().to_string_lossy()
        ))
    }
}

/// Exporter that writes the top name to the requested output path.
struct FileExporter;

impl Exporter for FileExporter {
    fn short_desc(&self) -> &str {
        "write the top component name to a file"
    }

    fn do_export(
        &self,
        model: &dyn ElaboratedModel,
        ctx: &CommandContext<'_>,
    ) -> peakrdl_core::Result<()> {
        let output = ctx
            .matches
            .get_one::<String>("output")
            .expect("argument is required");
        std::fs::write(output, model.top_name()).map_err(|e| peakrdl_core::CoreError::Io {
            path: PathBuf::from(output),
            source: e,
        })
    }
}

fn file_exporter_plugin() -> Box<dyn Exporter> {
    Box::new(FileExporter)
}

fn engine_registry() -> PluginRegistry {
    let mut registry = PluginRegistry::new();
    registry.set_engine(|| Box::new(MockEngine) as Box<dyn RdlCompiler>);
    registry
}

fn run(args: &[&str], registry: PluginRegistry) -> i32 {
    let mut argv = vec!["peakrdl".to_string()];
    argv.extend(args.iter().map(|s| s.to_string()));
    peakrdl_cli::run(argv, registry)
}

/// An empty config file, so discovery never picks up files from the
/// host running the tests.
fn empty_config(dir: &Path) -> String {
    let path = dir.join("peakrdl.toml");
    std::fs::write(&path, "").unwrap();
    path.to_str().unwrap().to_string()
}

#[test]
fn preprocess_writes_the_engine_output() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = empty_config(dir.path());
    let src = dir.path().join("regs.rdl");
    std::fs::write(&src, "addrmap top {};").unwrap();
    let out = dir.path().join("out.rdl");

    let code = run(
        &[
            "--peakrdl-cfg",
            &cfg,
            "preprocess",
            src.to_str().unwrap(),
            "-o",
            out.to_str().unwrap(),
        ],
        engine_registry(),
    );
    assert_eq!(code, 0);
    assert_eq!(
        std::fs::read_to_string(&out).unwrap(),
        "preprocessed regs.rdl\n"
    );
}

#[test]
fn missing_engine_is_a_fatal_error() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = empty_config(dir.path());
    let src = dir.path().join("regs.rdl");
    std::fs::write(&src, "addrmap top {};").unwrap();

    let code = run(
        &["--peakrdl-cfg", &cfg, "globals", src.to_str().unwrap()],
        PluginRegistry::new(),
    );
    assert_eq!(code, 1);
}

#[test]
fn plugins_report_exits_successfully() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = empty_config(dir.path());
    let code = run(&["--peakrdl-cfg", &cfg, "--plugins"], PluginRegistry::new());
    assert_eq!(code, 0);
}

#[test]
fn arguments_can_come_from_an_argfile() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = empty_config(dir.path());
    let src = dir.path().join("regs.rdl");
    std::fs::write(&src, "addrmap top {};").unwrap();
    let out = dir.path().join("out.rdl");

    let argfile = dir.path().join("args.f");
    std::fs::write(
        &argfile,
        format!(
            "# preprocess with everything from this file\n\
             preprocess ${{THIS_DIR}}/regs.rdl -o {}\n",
            out.display()
        ),
    )
    .unwrap();

    let code = run(
        &["--peakrdl-cfg", &cfg, "-f", argfile.to_str().unwrap()],
        engine_registry(),
    );
    assert_eq!(code, 0);
    assert!(out.is_file());
}

#[test]
fn circular_argfile_fails_before_any_command_runs() {
    let dir = tempfile::tempdir().unwrap();
    let argfile = dir.path().join("loop.f");
    std::fs::write(&argfile, format!("-f {}\n", argfile.display())).unwrap();

    let code = run(&["-f", argfile.to_str().unwrap()], engine_registry());
    assert_eq!(code, 1);
}

#[test]
fn explicit_config_path_must_exist() {
    let code = run(
        &["--peakrdl-cfg", "/definitely/not/here.toml", "--plugins"],
        PluginRegistry::new(),
    );
    assert_eq!(code, 1);
}

#[test]
fn invalid_config_schema_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = dir.path().join("peakrdl.toml");
    std::fs::write(&cfg, "[peakrdl]\npython_search_paths = \"not an array\"\n").unwrap();

    let code = run(
        &["--peakrdl-cfg", cfg.to_str().unwrap(), "--plugins"],
        PluginRegistry::new(),
    );
    assert_eq!(code, 1);
}

#[test]
fn config_registered_exporter_becomes_a_subcommand() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = dir.path().join("peakrdl.toml");
    std::fs::write(
        &cfg,
        "[peakrdl.plugins.exporters]\nwrite-top = \"acme.out:FileExporter\"\n",
    )
    .unwrap();
    let src = dir.path().join("regs.rdl");
    std::fs::write(&src, "addrmap top {};").unwrap();
    let out = dir.path().join("top.txt");

    let mut registry = engine_registry();
    registry.register_object(
        "acme.out",
        "FileExporter",
        std::sync::Arc::new(ExporterFactory::new(file_exporter_plugin)),
    );

    let code = run(
        &[
            "--peakrdl-cfg",
            cfg.to_str().unwrap(),
            "write-top",
            src.to_str().unwrap(),
            "-o",
            out.to_str().unwrap(),
        ],
        registry,
    );
    assert_eq!(code, 0);
    assert_eq!(std::fs::read_to_string(&out).unwrap(), "top");
}

#[test]
fn duplicate_subcommand_name_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = empty_config(dir.path());

    // A builtin exporter clashing with the builtin `dump` command.
    let mut registry = engine_registry();
    registry.register_exporter("dump", ExporterFactory::new(file_exporter_plugin));

    let code = run(&["--peakrdl-cfg", &cfg, "globals", "x.rdl"], registry);
    assert_eq!(code, 1);
}
