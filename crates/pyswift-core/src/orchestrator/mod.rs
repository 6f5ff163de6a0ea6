//! Pipeline orchestration
//!
//! The [`Orchestrator`] owns every [`ScriptRecord`], drives each load through
//! analysis, transpilation and test synthesis, and publishes every status
//! change on a broadcast channel. All writes go through one mutex-guarded
//! store; the guard is always released before the pipeline awaits the AST
//! provider.

mod record;
mod status;

use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::analyzer::{AstProvider, HeuristicAstProvider, InterpreterAstProvider, StructuralAnalyzer};
use crate::synthesizer::TestSynthesizer;
use crate::transpiler::Transpiler;
use crate::{AstBackend, PipelineConfig, PipelineError, Result};

pub use record::{ScriptId, ScriptRecord};
pub use status::ConversionStatus;

const DEFAULT_EVENT_CAPACITY: usize = 256;

/// A status change published to subscribers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusEvent {
    pub script_id: ScriptId,
    pub status: ConversionStatus,
    pub timestamp: DateTime<Utc>,
}

impl StatusEvent {
    fn new(script_id: ScriptId, status: ConversionStatus) -> Self {
        Self {
            script_id,
            status,
            timestamp: Utc::now(),
        }
    }
}

#[derive(Debug, Default)]
struct ScriptStore {
    records: Vec<ScriptRecord>,
    current: Option<ScriptId>,
}

impl ScriptStore {
    fn get_mut(&mut self, id: ScriptId) -> Option<&mut ScriptRecord> {
        self.records.iter_mut().find(|record| record.id == id)
    }

    fn remove(&mut self, id: ScriptId) -> Option<ScriptRecord> {
        let index = self.records.iter().position(|record| record.id == id)?;
        let removed = self.records.remove(index);
        if self.current == Some(id) {
            self.current = self.records.first().map(|record| record.id);
        }
        Some(removed)
    }
}

/// Entry point for loading, inspecting and removing scripts
///
/// Cheap to clone; clones share the same store and event channel.
#[derive(Clone)]
pub struct Orchestrator {
    analyzer: Arc<StructuralAnalyzer>,
    ast_provider: Arc<dyn AstProvider>,
    transpiler: Arc<Transpiler>,
    synthesizer: Arc<TestSynthesizer>,
    store: Arc<Mutex<ScriptStore>>,
    events: broadcast::Sender<StatusEvent>,
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("ast_provider", &self.ast_provider.name())
            .field("scripts", &self.len())
            .finish()
    }
}

impl Orchestrator {
    pub fn new(
        analyzer: StructuralAnalyzer,
        ast_provider: Arc<dyn AstProvider>,
        transpiler: Transpiler,
        synthesizer: TestSynthesizer,
    ) -> Self {
        let (events, _) = broadcast::channel(DEFAULT_EVENT_CAPACITY);
        Self {
            analyzer: Arc::new(analyzer),
            ast_provider,
            transpiler: Arc::new(transpiler),
            synthesizer: Arc::new(synthesizer),
            store: Arc::new(Mutex::new(ScriptStore::default())),
            events,
        }
    }

    /// Wire the default components for `config`
    pub fn from_config(config: &PipelineConfig) -> Result<Self> {
        config.validate()?;

        let ast_provider: Arc<dyn AstProvider> = match config.ast_backend {
            AstBackend::Interpreter => Arc::new(InterpreterAstProvider::new(config.interpreter.clone())),
            AstBackend::Heuristic => Arc::new(HeuristicAstProvider::new()),
        };
        let mut orchestrator = Self::new(
            StructuralAnalyzer::new(),
            ast_provider,
            Transpiler::new().with_indent_width(config.indent_width),
            TestSynthesizer::new(),
        );
        orchestrator.events = broadcast::channel(config.event_capacity).0;
        Ok(orchestrator)
    }

    /// Receive every status change published after this call
    pub fn subscribe(&self) -> broadcast::Receiver<StatusEvent> {
        self.events.subscribe()
    }

    pub fn ast_provider_name(&self) -> &'static str {
        self.ast_provider.name()
    }

    /// Load source text and run it through the pipeline
    ///
    /// Always returns the id of the new record. Whether the run succeeded is
    /// visible through the record's status and error message.
    pub async fn load_script(&self, text: impl Into<String>, name: impl Into<String>) -> ScriptId {
        self.run(ScriptRecord::new(name, text)).await
    }

    /// Read `path` as UTF-8 and load it, named after the file stem
    ///
    /// A read failure creates no record.
    pub async fn load_script_from_origin(&self, path: impl AsRef<Path>) -> Result<ScriptId> {
        let path = path.as_ref();
        let text = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| PipelineError::OriginRead {
                path: path.to_path_buf(),
                source,
            })?;
        let name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .filter(|stem| !stem.is_empty())
            .unwrap_or_else(|| "script".to_string());

        Ok(self.run(ScriptRecord::new(name, text).with_origin(path)).await)
    }

    /// Remove a record; the current pointer falls back to the first remaining one
    pub fn remove_script(&self, id: ScriptId) -> Option<ScriptRecord> {
        let removed = self.store.lock().remove(id);
        if removed.is_some() {
            info!(script_id = %id, "removed script");
        }
        removed
    }

    /// Snapshot of all records in load order
    pub fn scripts(&self) -> Vec<ScriptRecord> {
        self.store.lock().records.clone()
    }

    pub fn script(&self, id: ScriptId) -> Option<ScriptRecord> {
        self.store
            .lock()
            .records
            .iter()
            .find(|record| record.id == id)
            .cloned()
    }

    /// Like [`Orchestrator::script`], but a missing record is an error
    pub fn require_script(&self, id: ScriptId) -> Result<ScriptRecord> {
        self.script(id).ok_or(PipelineError::ScriptNotFound(id))
    }

    pub fn current(&self) -> Option<ScriptRecord> {
        let store = self.store.lock();
        let id = store.current?;
        store.records.iter().find(|record| record.id == id).cloned()
    }

    pub fn current_id(&self) -> Option<ScriptId> {
        self.store.lock().current
    }

    pub fn len(&self) -> usize {
        self.store.lock().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    async fn run(&self, record: ScriptRecord) -> ScriptId {
        let id = record.id;
        let source = record.source.clone();
        info!(script_id = %id, name = %record.name, "loading script");
        {
            let mut store = self.store.lock();
            store.records.push(record);
            store.current = Some(id);
        }
        self.publish(id, ConversionStatus::Analyzing);

        let dependencies = self.analyzer.extract_dependencies(&source);
        let outline = self.analyzer.analyze_structure(&source);
        debug!(
            script_id = %id,
            dependencies = dependencies.len(),
            functions = outline.functions.len(),
            "structural analysis complete"
        );
        if !self.update(id, |record| {
            record.dependencies = dependencies;
            record.outline = outline;
        }) {
            return id;
        }

        let ast = match self.ast_provider.parse(&source).await {
            Ok(ast) => ast,
            Err(err) => {
                self.fail(id, &err.to_string());
                return id;
            }
        };
        if !self.advance(id, ConversionStatus::Converting, |record| record.ast = Some(ast)) {
            return id;
        }

        let translated = self.transpiler.transpile(&source);
        for warning in &translated.warnings {
            debug!(script_id = %id, line = warning.line, "{}", warning.message);
        }
        let tests = self.synthesizer.generate_tests(&translated.text);
        if !self.advance(id, ConversionStatus::Testing, |record| {
            record.translated = Some(translated)
        }) {
            return id;
        }

        if self.advance(id, ConversionStatus::Success, |record| record.tests = tests) {
            self.store.lock().current = Some(id);
        }
        id
    }

    /// Mutate a record in place; false when it has been removed
    fn update(&self, id: ScriptId, f: impl FnOnce(&mut ScriptRecord)) -> bool {
        let mut store = self.store.lock();
        match store.get_mut(id) {
            Some(record) => {
                f(record);
                true
            }
            None => {
                debug!(script_id = %id, "script removed while loading");
                false
            }
        }
    }

    /// Fill fields and change status under one lock, then publish
    fn advance(
        &self,
        id: ScriptId,
        next: ConversionStatus,
        fill: impl FnOnce(&mut ScriptRecord),
    ) -> bool {
        let advanced = {
            let mut store = self.store.lock();
            match store.get_mut(id) {
                Some(record) if record.status.can_transition_to(next) => {
                    fill(record);
                    record.advance(next)
                }
                Some(record) => {
                    warn!(script_id = %id, from = %record.status, to = %next, "rejected status transition");
                    false
                }
                None => {
                    debug!(script_id = %id, "script removed while loading");
                    false
                }
            }
        };
        if advanced {
            self.publish(id, next);
        }
        advanced
    }

    fn fail(&self, id: ScriptId, message: &str) {
        warn!(script_id = %id, error = %message, "pipeline stage failed");
        let failed = {
            let mut store = self.store.lock();
            store.get_mut(id).is_some_and(|record| record.fail(message))
        };
        if failed {
            self.publish(id, ConversionStatus::Failed);
        }
    }

    fn publish(&self, id: ScriptId, status: ConversionStatus) {
        info!(script_id = %id, status = %status, "status transition");
        // No subscribers is fine
        let _ = self.events.send(StatusEvent::new(id, status));
    }
}

#[cfg(test)]
mod orchestrator_tests;
