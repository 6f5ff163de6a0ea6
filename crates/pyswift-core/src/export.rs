//! Writing finished translations to disk
//!
//! A successful record becomes `<Name>.swift` plus `<Name>Tests.swift` when
//! it has synthesized tests. Existing files can be backed up to
//! `<file>.swift.backup` before being overwritten.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::orchestrator::{ConversionStatus, ScriptRecord};
use crate::synthesizer::TestSuite;
use crate::{PipelineError, Result};

/// Files touched by one export
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportSummary {
    pub written: Vec<PathBuf>,
    pub backups: Vec<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct Exporter {
    backup_existing: bool,
}

impl Default for Exporter {
    fn default() -> Self {
        Self::new()
    }
}

impl Exporter {
    pub fn new() -> Self {
        Self {
            backup_existing: true,
        }
    }

    /// Whether to copy files that would be overwritten to `.backup`
    pub fn backup_existing(mut self, backup: bool) -> Self {
        self.backup_existing = backup;
        self
    }

    pub fn export(&self, record: &ScriptRecord, dir: impl AsRef<Path>) -> Result<ExportSummary> {
        let dir = dir.as_ref();
        let translated = match (&record.status, &record.translated) {
            (ConversionStatus::Success, Some(code)) => code,
            _ => {
                return Err(PipelineError::NotExportable {
                    id: record.id,
                    status: record.status,
                })
            }
        };

        fs::create_dir_all(dir).map_err(|source| PipelineError::Export {
            path: dir.to_path_buf(),
            source,
        })?;

        let type_name = swift_type_name(&record.name);
        let mut summary = ExportSummary::default();
        self.write(
            &dir.join(format!("{type_name}.swift")),
            &translated.text,
            &mut summary,
        )?;
        if !record.tests.is_empty() {
            let suite = TestSuite::new(&record.tests).render(&format!("{type_name}Tests"));
            self.write(
                &dir.join(format!("{type_name}Tests.swift")),
                &suite,
                &mut summary,
            )?;
        }

        info!(
            script_id = %record.id,
            files = summary.written.len(),
            dir = %dir.display(),
            "exported script"
        );
        Ok(summary)
    }

    fn write(&self, path: &Path, contents: &str, summary: &mut ExportSummary) -> Result<()> {
        let export_err = |source| PipelineError::Export {
            path: path.to_path_buf(),
            source,
        };

        if self.backup_existing && path.exists() {
            let backup = path.with_extension(format!(
                "{}.backup",
                path.extension().unwrap_or_default().to_string_lossy()
            ));
            fs::copy(path, &backup).map_err(export_err)?;
            debug!(backup = %backup.display(), "backed up existing file");
            summary.backups.push(backup);
        }

        fs::write(path, contents).map_err(export_err)?;
        summary.written.push(path.to_path_buf());
        Ok(())
    }
}

/// UpperCamelCase identifier derived from a display name
pub fn swift_type_name(name: &str) -> String {
    let mut out = String::new();
    for word in name.split(|c: char| !c.is_ascii_alphanumeric()) {
        let mut chars = word.chars();
        if let Some(first) = chars.next() {
            out.push(first.to_ascii_uppercase());
            out.extend(chars);
        }
    }

    if out.is_empty() {
        return "Script".to_string();
    }
    if out.starts_with(|c: char| c.is_ascii_digit()) {
        out.insert_str(0, "Script");
    }
    out
}
