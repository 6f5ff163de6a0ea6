// Orchestrator tests over in-process AST providers

use std::time::Duration;

use async_trait::async_trait;
use tempfile::TempDir;

use super::*;
use crate::analyzer::AstError;
use crate::ast::AstNode;

const GREET: &str = "def greet(name: str) -> str:\n    return name\n";

/// Rejects every source the way the interpreter rejects bad syntax
struct RejectingProvider;

#[async_trait]
impl AstProvider for RejectingProvider {
    fn name(&self) -> &'static str {
        "rejecting"
    }

    async fn parse(&self, _source: &str) -> std::result::Result<AstNode, AstError> {
        Err(AstError::Syntax {
            message: "invalid syntax (line 1)".into(),
        })
    }
}

/// Holds every parse long enough for the test to interfere
struct SlowProvider;

#[async_trait]
impl AstProvider for SlowProvider {
    fn name(&self) -> &'static str {
        "slow"
    }

    async fn parse(&self, _source: &str) -> std::result::Result<AstNode, AstError> {
        tokio::time::sleep(Duration::from_millis(100)).await;
        Ok(AstNode::module(Vec::new()))
    }
}

fn orchestrator_with(provider: Arc<dyn AstProvider>) -> Orchestrator {
    Orchestrator::new(
        StructuralAnalyzer::new(),
        provider,
        Transpiler::new(),
        TestSynthesizer::new(),
    )
}

fn heuristic() -> Orchestrator {
    orchestrator_with(Arc::new(HeuristicAstProvider::new()))
}

fn drain(rx: &mut broadcast::Receiver<StatusEvent>, id: ScriptId) -> Vec<ConversionStatus> {
    let mut seen = Vec::new();
    while let Ok(event) = rx.try_recv() {
        if event.script_id == id {
            seen.push(event.status);
        }
    }
    seen
}

#[tokio::test]
async fn test_greet_end_to_end() {
    let orchestrator = heuristic();
    let id = orchestrator.load_script(GREET, "greet").await;
    let record = orchestrator.script(id).unwrap();

    assert_eq!(record.status, ConversionStatus::Success);
    assert!(record.dependencies.is_empty());
    assert_eq!(record.outline.functions.len(), 1);
    assert_eq!(record.outline.functions[0].name, "greet");
    assert!(record
        .translated_text()
        .contains("func greet(name: String) -> String {"));
    assert_eq!(record.tests.len(), 1);
    assert_eq!(record.tests[0].name, "testGreet");
    assert!(record.tests[0].body.contains("XCTAssertFalse(result.isEmpty)"));
    assert!(record.error_message.is_none());
}

#[tokio::test]
async fn test_success_publishes_full_sequence() {
    let orchestrator = heuristic();
    let mut rx = orchestrator.subscribe();
    let id = orchestrator.load_script(GREET, "greet").await;

    assert_eq!(drain(&mut rx, id), ConversionStatus::PIPELINE.to_vec());
    assert_eq!(
        orchestrator.script(id).unwrap().history,
        ConversionStatus::PIPELINE.to_vec()
    );
}

#[tokio::test]
async fn test_failure_is_prefix_then_failed() {
    let orchestrator = orchestrator_with(Arc::new(RejectingProvider));
    let mut rx = orchestrator.subscribe();
    let id = orchestrator
        .load_script("import os\ndef f(:\n", "broken")
        .await;

    assert_eq!(
        drain(&mut rx, id),
        vec![ConversionStatus::Analyzing, ConversionStatus::Failed]
    );

    let record = orchestrator.script(id).unwrap();
    assert_eq!(record.status, ConversionStatus::Failed);
    assert!(record
        .error_message
        .as_deref()
        .unwrap()
        .contains("invalid syntax"));
    // Partial results survive the failure
    assert!(record.dependencies.contains("os"));
    assert!(record.ast.is_none());
    assert_eq!(record.translated_text(), "");
    assert!(record.tests.is_empty());
}

#[tokio::test]
async fn test_failed_record_stays_in_collection() {
    let orchestrator = orchestrator_with(Arc::new(RejectingProvider));
    orchestrator.load_script("x = 1\n", "one").await;
    orchestrator.load_script("y = 2\n", "two").await;
    assert_eq!(orchestrator.len(), 2);
}

#[tokio::test]
async fn test_current_follows_latest_load() {
    let orchestrator = heuristic();
    let first = orchestrator.load_script("a = 1\n", "a").await;
    assert_eq!(orchestrator.current_id(), Some(first));
    let second = orchestrator.load_script("b = 2\n", "b").await;
    assert_eq!(orchestrator.current_id(), Some(second));
    assert_eq!(orchestrator.current().unwrap().name, "b");
}

#[tokio::test]
async fn test_remove_non_current_keeps_pointer() {
    let orchestrator = heuristic();
    let first = orchestrator.load_script("a = 1\n", "a").await;
    let second = orchestrator.load_script("b = 2\n", "b").await;

    let removed = orchestrator.remove_script(first).unwrap();
    assert_eq!(removed.id, first);
    assert_eq!(orchestrator.current_id(), Some(second));
    assert_eq!(orchestrator.len(), 1);
}

#[tokio::test]
async fn test_remove_current_falls_back_to_first() {
    let orchestrator = heuristic();
    let first = orchestrator.load_script("a = 1\n", "a").await;
    let _second = orchestrator.load_script("b = 2\n", "b").await;
    let third = orchestrator.load_script("c = 3\n", "c").await;

    orchestrator.remove_script(third);
    assert_eq!(orchestrator.current_id(), Some(first));
}

#[tokio::test]
async fn test_remove_last_clears_current() {
    let orchestrator = heuristic();
    let id = orchestrator.load_script("a = 1\n", "a").await;
    orchestrator.remove_script(id);
    assert!(orchestrator.is_empty());
    assert_eq!(orchestrator.current_id(), None);
    assert!(orchestrator.remove_script(id).is_none());
}

#[tokio::test]
async fn test_require_script_reports_missing_id() {
    let orchestrator = heuristic();
    let id = orchestrator.load_script(GREET, "greet").await;
    assert_eq!(orchestrator.require_script(id).unwrap().name, "greet");

    orchestrator.remove_script(id);
    let err = orchestrator.require_script(id).unwrap_err();
    assert!(matches!(err, PipelineError::ScriptNotFound(missing) if missing == id));
    assert!(err.to_string().contains(&id.to_string()));
}

#[tokio::test]
async fn test_translation_present_only_in_translated_statuses() {
    let orchestrator = heuristic();
    let ok = orchestrator.load_script(GREET, "greet").await;
    let record = orchestrator.script(ok).unwrap();
    assert!(record.status.has_translation());
    assert!(record.translated.is_some());

    let failing = orchestrator_with(Arc::new(RejectingProvider));
    let bad = failing.load_script(GREET, "broken").await;
    let record = failing.script(bad).unwrap();
    assert!(!record.status.has_translation());
    assert!(record.translated.is_none());
}

#[tokio::test]
async fn test_concurrent_loads_are_independent() {
    let orchestrator = orchestrator_with(Arc::new(SlowProvider));
    let mut rx = orchestrator.subscribe();

    let (a, b, c) = tokio::join!(
        orchestrator.load_script("def a() -> int:\n    return 1\n", "a"),
        orchestrator.load_script("def b() -> int:\n    return 2\n", "b"),
        orchestrator.load_script("def c() -> int:\n    return 3\n", "c"),
    );

    assert_eq!(orchestrator.len(), 3);
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    for id in [a, b, c] {
        let record = orchestrator.script(id).unwrap();
        assert_eq!(record.status, ConversionStatus::Success);
        let seen: Vec<_> = events
            .iter()
            .filter(|event| event.script_id == id)
            .map(|event| event.status)
            .collect();
        assert_eq!(seen, ConversionStatus::PIPELINE.to_vec());
    }
    assert!([a, b, c].contains(&orchestrator.current_id().unwrap()));
}

#[tokio::test]
async fn test_spawned_loads_share_store() {
    let orchestrator = heuristic();
    let handles: Vec<_> = (0..4)
        .map(|i| {
            let orchestrator = orchestrator.clone();
            tokio::spawn(async move {
                orchestrator
                    .load_script(format!("value_{i} = {i}\n"), format!("script{i}"))
                    .await
            })
        })
        .collect();

    for handle in handles {
        handle.await.unwrap();
    }
    assert_eq!(orchestrator.len(), 4);
    assert!(orchestrator
        .scripts()
        .iter()
        .all(|record| record.status == ConversionStatus::Success));
}

#[tokio::test]
async fn test_removed_during_load_is_not_resurrected() {
    let orchestrator = orchestrator_with(Arc::new(SlowProvider));
    let background = orchestrator.clone();
    let handle = tokio::spawn(async move { background.load_script(GREET, "greet").await });

    while orchestrator.is_empty() {
        tokio::task::yield_now().await;
    }
    let id = orchestrator.current_id().unwrap();
    orchestrator.remove_script(id);

    assert_eq!(handle.await.unwrap(), id);
    assert!(orchestrator.is_empty());
    assert!(orchestrator.script(id).is_none());
}

#[tokio::test]
async fn test_load_from_origin_uses_file_stem() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("greeter.py");
    std::fs::write(&path, GREET).unwrap();

    let orchestrator = heuristic();
    let id = orchestrator.load_script_from_origin(&path).await.unwrap();
    let record = orchestrator.script(id).unwrap();
    assert_eq!(record.name, "greeter");
    assert_eq!(record.origin.as_deref(), Some(path.as_path()));
    assert_eq!(record.status, ConversionStatus::Success);
}

#[tokio::test]
async fn test_unreadable_origin_creates_no_record() {
    let dir = TempDir::new().unwrap();
    let orchestrator = heuristic();

    let missing = orchestrator
        .load_script_from_origin(dir.path().join("missing.py"))
        .await;
    assert!(matches!(missing, Err(PipelineError::OriginRead { .. })));

    let binary = dir.path().join("blob.py");
    std::fs::write(&binary, [0xff, 0xfe, 0x00]).unwrap();
    let not_utf8 = orchestrator.load_script_from_origin(&binary).await;
    assert!(matches!(not_utf8, Err(PipelineError::OriginRead { .. })));

    assert!(orchestrator.is_empty());
}

#[test]
fn test_from_config_validates() {
    let config = PipelineConfig {
        indent_width: 0,
        ..Default::default()
    };
    assert!(Orchestrator::from_config(&config).is_err());

    let config = PipelineConfig {
        ast_backend: AstBackend::Heuristic,
        ..Default::default()
    };
    let orchestrator = Orchestrator::from_config(&config).unwrap();
    assert_eq!(orchestrator.ast_provider_name(), "heuristic");
}
