//! Script records owned by the orchestrator

use std::collections::BTreeSet;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::status::ConversionStatus;
use crate::analyzer::StructuralOutline;
use crate::ast::AstNode;
use crate::synthesizer::TestSpec;
use crate::transpiler::TranslatedCode;

/// Unique identifier for a loaded script
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScriptId(pub Uuid);

impl Default for ScriptId {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for ScriptId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", &self.0.to_string()[..8])
    }
}

/// One script moving through the pipeline
///
/// Stages only ever add fields. A failed record keeps everything gathered
/// before the failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScriptRecord {
    pub id: ScriptId,
    pub name: String,
    pub source: String,
    /// File the source was read from, if any
    pub origin: Option<PathBuf>,
    pub status: ConversionStatus,
    /// Every status this record has been in, oldest first
    pub history: Vec<ConversionStatus>,
    pub dependencies: BTreeSet<String>,
    pub outline: StructuralOutline,
    pub ast: Option<AstNode>,
    pub translated: Option<TranslatedCode>,
    pub tests: Vec<TestSpec>,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl ScriptRecord {
    pub fn new(name: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            id: ScriptId::new(),
            name: name.into(),
            source: source.into(),
            origin: None,
            status: ConversionStatus::Analyzing,
            history: vec![ConversionStatus::Analyzing],
            dependencies: BTreeSet::new(),
            outline: StructuralOutline::default(),
            ast: None,
            translated: None,
            tests: Vec::new(),
            error_message: None,
            created_at: Utc::now(),
        }
    }

    pub fn with_origin(mut self, origin: impl Into<PathBuf>) -> Self {
        self.origin = Some(origin.into());
        self
    }

    /// Translated Swift, empty before the `testing` status
    pub fn translated_text(&self) -> &str {
        self.translated
            .as_ref()
            .map(|code| code.text.as_str())
            .unwrap_or("")
    }

    /// Move to `next` if the state machine allows it
    pub(crate) fn advance(&mut self, next: ConversionStatus) -> bool {
        if !self.status.can_transition_to(next) {
            return false;
        }
        self.status = next;
        self.history.push(next);
        true
    }

    pub(crate) fn fail(&mut self, message: impl Into<String>) -> bool {
        if !self.advance(ConversionStatus::Failed) {
            return false;
        }
        self.error_message = Some(message.into());
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_script_id_display() {
        let id = ScriptId::new();
        let shown = id.to_string();
        assert!(shown.starts_with('#'));
        assert_eq!(shown.len(), 9);
    }

    #[test]
    fn test_new_record_is_analyzing() {
        let record = ScriptRecord::new("demo", "x = 1\n");
        assert_eq!(record.status, ConversionStatus::Analyzing);
        assert_eq!(record.history, vec![ConversionStatus::Analyzing]);
        assert_eq!(record.translated_text(), "");
        assert!(record.tests.is_empty());
    }

    #[test]
    fn test_advance_rejects_skips() {
        let mut record = ScriptRecord::new("demo", "");
        assert!(!record.advance(ConversionStatus::Success));
        assert!(record.advance(ConversionStatus::Converting));
        assert_eq!(record.status, ConversionStatus::Converting);
    }

    #[test]
    fn test_fail_is_absorbing() {
        let mut record = ScriptRecord::new("demo", "");
        assert!(record.fail("boom"));
        assert!(!record.fail("again"));
        assert_eq!(record.error_message.as_deref(), Some("boom"));
        assert_eq!(
            record.history,
            vec![ConversionStatus::Analyzing, ConversionStatus::Failed]
        );
    }
}
