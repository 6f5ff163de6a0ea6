/*!
# Pipeline Integration Tests

Drives whole scripts through the orchestrator and the exporter, the way a
front end would.
*/

use std::path::Path;

use pretty_assertions::assert_eq;
use pyswift_core::{
    AstBackend, ConversionStatus, Exporter, Orchestrator, PipelineConfig, PipelineError, TestKind,
};
use tempfile::TempDir;

const INVENTORY: &str = r#"import json
from collections import OrderedDict

MAX_ITEMS = 10

class Inventory:
    """Tracks stock levels."""

    def __init__(self):
        self.items = {}

    def count(self, name: str) -> int:
        return self.items.get(name, 0)

def total(values: list) -> float:
    result = 0.0
    for v in values:
        if v is None:
            continue
        result += v
    return result

def label(total: float, unit: str = "kg") -> str:
    return f"{total} {unit}"
"#;

fn heuristic_config() -> PipelineConfig {
    PipelineConfig {
        ast_backend: AstBackend::Heuristic,
        ..Default::default()
    }
}

#[tokio::test]
async fn test_inventory_pipeline() -> anyhow::Result<()> {
    let orchestrator = Orchestrator::from_config(&heuristic_config())?;
    let id = orchestrator.load_script(INVENTORY, "inventory").await;
    let record = orchestrator.script(id).expect("record exists");

    assert_eq!(record.status, ConversionStatus::Success);
    assert_eq!(
        record.dependencies.iter().cloned().collect::<Vec<_>>(),
        vec!["collections".to_string(), "json".to_string()]
    );
    let types: Vec<&str> = record.outline.types.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(types, vec!["Inventory"]);
    assert!(record.outline.variables.iter().any(|v| v.name == "MAX_ITEMS"));

    let swift = record.translated_text();
    assert!(swift.starts_with("// Generated by pyswift"));
    assert!(swift.contains("class Inventory {"));
    assert!(swift.contains("func count(name: String) -> Int {"));
    assert!(swift.contains("func total(values: [Any]) -> Double {"));
    assert!(swift.contains("if v == nil {"));
    assert!(swift.contains("/// Tracks stock levels."));

    let names: Vec<&str> = record.tests.iter().map(|t| t.name.as_str()).collect();
    assert!(names.contains(&"testCount"));
    assert!(names.contains(&"testTotal"));
    assert!(names.contains(&"testLabel"));
    assert_eq!(
        record
            .tests
            .iter()
            .filter(|t| t.kind == TestKind::Integration)
            .count(),
        1
    );
    Ok(())
}

#[tokio::test]
async fn test_load_and_export_round() -> anyhow::Result<()> {
    let workspace = TempDir::new()?;
    let source = workspace.path().join("greeter.py");
    std::fs::write(&source, "def greet(name: str) -> str:\n    return name\n")?;

    let orchestrator = Orchestrator::from_config(&heuristic_config())?;
    let id = orchestrator.load_script_from_origin(&source).await?;
    let record = orchestrator.script(id).expect("record exists");

    let out = workspace.path().join("swift");
    let summary = Exporter::new().export(&record, &out)?;
    assert_eq!(summary.written.len(), 2);

    let tests = std::fs::read_to_string(out.join("GreeterTests.swift"))?;
    assert!(tests.starts_with("import XCTest"));
    assert!(tests.contains("XCTAssertFalse(result.isEmpty)"));
    Ok(())
}

#[tokio::test]
async fn test_missing_interpreter_fails_record() -> anyhow::Result<()> {
    let config = PipelineConfig {
        interpreter: "/nonexistent/python3".into(),
        ..Default::default()
    };
    let orchestrator = Orchestrator::from_config(&config)?;
    let id = orchestrator.load_script("import os\nx = 1\n", "broken").await;
    let record = orchestrator.script(id).expect("record exists");

    assert_eq!(record.status, ConversionStatus::Failed);
    assert_eq!(
        record.history,
        vec![ConversionStatus::Analyzing, ConversionStatus::Failed]
    );
    assert!(record.error_message.is_some());
    assert!(record.dependencies.contains("os"));

    let export = Exporter::new().export(&record, std::env::temp_dir());
    assert!(matches!(export, Err(PipelineError::NotExportable { .. })));
    Ok(())
}

#[tokio::test]
async fn test_interpreter_backend_end_to_end() -> anyhow::Result<()> {
    let config = PipelineConfig::default();
    if !Path::new(&config.interpreter).exists() {
        eprintln!("skipping: {} not found", config.interpreter.display());
        return Ok(());
    }

    let orchestrator = Orchestrator::from_config(&config)?;
    let id = orchestrator
        .load_script("def greet(name: str) -> str:\n    return name\n", "greet")
        .await;
    let record = orchestrator.script(id).expect("record exists");
    assert_eq!(record.status, ConversionStatus::Success);
    let ast = record.ast.expect("ast acquired");
    assert_eq!(ast.function_names(), vec!["greet"]);

    let id = orchestrator.load_script("def broken(:\n", "broken").await;
    let record = orchestrator.script(id).expect("record exists");
    assert_eq!(record.status, ConversionStatus::Failed);
    assert!(record
        .error_message
        .as_deref()
        .unwrap_or_default()
        .starts_with("Syntax error"));
    Ok(())
}
