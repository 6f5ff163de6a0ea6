//! REPL (Read-Eval-Print Loop) functionality for pyswift
//!
//! This module wraps the core orchestrator with an interactive command
//! surface:
//! - Dot-commands for loading, inspecting, removing and exporting scripts
//! - Pasted multi-line sources (`.paste <name>` ... `.`)
//! - Output formatting and notifications

use std::fmt::Write as _;
use std::time::Instant;

use anyhow::{anyhow, Result};
use pyswift_core::{
    ConversionStatus, Exporter, Orchestrator, PipelineConfig, PipelineError, ScriptRecord,
    TestSuite,
};

pub mod commands;
pub mod notifier;

pub use commands::ReplCommand;
pub use notifier::{DefaultNotifier, ReplNotifier};

/// Interactive REPL over a pipeline orchestrator
pub struct Repl {
    /// Core pipeline
    orchestrator: Orchestrator,
    /// Writes finished scripts to disk
    exporter: Exporter,
    /// Current notifier for output
    notifier: Box<dyn ReplNotifier>,
    /// Whether the REPL is running
    running: bool,
    /// Quiet mode (suppress timing info)
    quiet: bool,
    /// Include warnings and status history in summaries
    debug: bool,
}

impl Repl {
    /// Create a new REPL over the given orchestrator
    pub fn new(orchestrator: Orchestrator) -> Self {
        Self {
            orchestrator,
            exporter: Exporter::new(),
            notifier: Box::new(DefaultNotifier::new()),
            running: true,
            quiet: false,
            debug: false,
        }
    }

    /// Create a new REPL from pipeline configuration
    pub fn with_config(config: &PipelineConfig) -> Result<Self> {
        let mut repl = Self::new(Orchestrator::from_config(config)?);
        repl.debug = config.debug;
        Ok(repl)
    }

    /// Set the notifier for this REPL
    pub fn set_notifier(&mut self, notifier: Box<dyn ReplNotifier>) {
        self.notifier = notifier;
    }

    /// Get a reference to the current notifier
    pub fn notifier(&self) -> &dyn ReplNotifier {
        self.notifier.as_ref()
    }

    pub fn orchestrator(&self) -> &Orchestrator {
        &self.orchestrator
    }

    /// Check if the REPL is still running
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Check if quiet mode is enabled
    pub fn is_quiet(&self) -> bool {
        self.quiet
    }

    /// Set quiet mode
    pub fn set_quiet(&mut self, quiet: bool) {
        self.quiet = quiet;
    }

    /// Parse REPL input into a command
    pub fn parse_input(&self, input: &str) -> Result<ReplCommand> {
        commands::parse_command(input)
    }

    /// Handle a REPL command
    ///
    /// `.paste` only validates here; the caller collects the lines and hands
    /// them to [`Repl::convert`].
    pub async fn handle_command(&mut self, command: ReplCommand) -> Result<String> {
        match command {
            ReplCommand::Help => Ok(self.get_help_text()),
            ReplCommand::Quit => {
                self.running = false;
                Ok("Goodbye!".to_string())
            }
            ReplCommand::Quiet => {
                self.quiet = !self.quiet;
                Ok(format!(
                    "Quiet mode: {}",
                    if self.quiet { "on" } else { "off" }
                ))
            }
            ReplCommand::Load(path) => self.load(&path).await,
            ReplCommand::Paste(name) => Ok(format!(
                "Pasting '{name}'. End with '.' on a line by itself."
            )),
            ReplCommand::List => Ok(self.list_scripts()),
            ReplCommand::Show(n) => Ok(format_summary(&self.nth(n)?, self.debug)),
            ReplCommand::Swift(n) => {
                let record = self.nth(n)?;
                match &record.translated {
                    Some(code) if record.status.has_translation() => {
                        Ok(code.text.trim_end().to_string())
                    }
                    _ => Ok(format!("No translation for '{}' ({})", record.name, record.status)),
                }
            }
            ReplCommand::Tests(n) => {
                let record = self.nth(n)?;
                if record.tests.is_empty() {
                    return Ok(format!("No tests for '{}' ({})", record.name, record.status));
                }
                let class_name = format!("{}Tests", pyswift_core::swift_type_name(&record.name));
                Ok(TestSuite::new(&record.tests)
                    .render(&class_name)
                    .trim_end()
                    .to_string())
            }
            ReplCommand::Ast(n) => {
                let record = self.nth(n)?;
                match &record.ast {
                    Some(ast) if self.debug => Ok(serde_json::to_string_pretty(ast)?),
                    Some(ast) => Ok(ast.outline().trim_end().to_string()),
                    None => Ok(format!("No AST for '{}' ({})", record.name, record.status)),
                }
            }
            ReplCommand::Remove(n) => {
                let record = self.nth(n)?;
                self.orchestrator
                    .remove_script(record.id)
                    .ok_or(PipelineError::ScriptNotFound(record.id))?;
                Ok(format!("Removed '{}'", record.name))
            }
            ReplCommand::Export(n, dir) => {
                let record = self.nth(n)?;
                let summary = self.exporter.export(&record, &dir)?;
                let mut out = format!("Exported '{}':", record.name);
                for path in &summary.written {
                    let _ = write!(out, "\n  {}", path.display());
                }
                for path in &summary.backups {
                    let _ = write!(out, "\n  backup {}", path.display());
                }
                Ok(out)
            }
        }
    }

    /// Convert pasted source and return its summary with timing
    pub async fn convert(&mut self, name: &str, source: &str) -> Result<(String, u64)> {
        let start = Instant::now();
        let id = self.orchestrator.load_script(source, name).await;
        let duration = start.elapsed().as_millis() as u64;
        let record = self.orchestrator.require_script(id)?;
        Ok((format_summary(&record, self.debug), duration))
    }

    async fn load(&mut self, path: &str) -> Result<String> {
        let start = Instant::now();
        let id = self.orchestrator.load_script_from_origin(path).await?;
        let record = self.orchestrator.require_script(id)?;
        let mut out = format_summary(&record, self.debug);
        if !self.quiet {
            let _ = write!(out, "\n=> converted in {}ms", start.elapsed().as_millis());
        }
        Ok(out)
    }

    fn nth(&self, n: usize) -> Result<ScriptRecord> {
        let scripts = self.orchestrator.scripts();
        n.checked_sub(1)
            .and_then(|index| scripts.get(index).cloned())
            .ok_or_else(|| anyhow!("No script #{n}; {} loaded", scripts.len()))
    }

    fn list_scripts(&self) -> String {
        let scripts = self.orchestrator.scripts();
        if scripts.is_empty() {
            return "No scripts loaded.".to_string();
        }
        let current = self.orchestrator.current_id();
        let lines: Vec<String> = scripts
            .iter()
            .enumerate()
            .map(|(i, record)| {
                let marker = if Some(record.id) == current { "*" } else { " " };
                format!(
                    "{marker} {}. {} [{}] {}",
                    i + 1,
                    record.name,
                    record.status,
                    record.id
                )
            })
            .collect();
        format!("Scripts:\n{}", lines.join("\n"))
    }

    /// Get help text
    fn get_help_text(&self) -> String {
        r#"pyswift REPL Commands:
  .help             - Show this help message
  .quit             - Exit the REPL
  .quiet            - Toggle quiet mode (hide timing info)

Script Commands:
  .load <path>      - Convert a Python file
  .paste <name>     - Paste Python source (end with '.')
  .list             - List loaded scripts (* marks the current one)
  .show <n>         - Dependencies, outline, warnings and tests
  .swift <n>        - Print the translated Swift
  .tests <n>        - Print the synthesized XCTest suite
  .ast <n>          - Print the acquired AST (JSON in debug mode)
  .remove <n>       - Remove a script
  .export <n> <dir> - Write <Name>.swift and <Name>Tests.swift"#
            .to_string()
    }

    /// Show exit statistics
    pub fn show_exit_stats(&self) {
        if !self.quiet {
            let scripts = self.orchestrator.scripts();
            let succeeded = scripts
                .iter()
                .filter(|record| record.status == ConversionStatus::Success)
                .count();
            println!(
                "\nSession complete: {succeeded}/{} scripts converted.",
                scripts.len()
            );
        }
    }
}

/// Human-readable report for one record
pub fn format_summary(record: &ScriptRecord, verbose: bool) -> String {
    let mut out = format!("{} [{}]", record.name, record.status);

    if let Some(message) = &record.error_message {
        let _ = write!(out, "\n  error: {message}");
    }
    if !record.dependencies.is_empty() {
        let deps: Vec<&str> = record.dependencies.iter().map(String::as_str).collect();
        let _ = write!(out, "\n  dependencies: {}", deps.join(", "));
    }

    let outline = &record.outline;
    let _ = write!(
        out,
        "\n  outline: {} functions, {} types, {} variables",
        outline.functions.len(),
        outline.types.len(),
        outline.variables.len()
    );
    if verbose {
        for item in &outline.functions {
            let _ = write!(out, "\n    func {} (line {})", item.name, item.line);
        }
        for item in &outline.types {
            let _ = write!(out, "\n    type {} (line {})", item.name, item.line);
        }
    }

    if let Some(code) = &record.translated {
        if !code.warnings.is_empty() {
            let _ = write!(out, "\n  warnings: {}", code.warnings.len());
            if verbose {
                for warning in &code.warnings {
                    let _ = write!(out, "\n    {warning}");
                }
            }
        }
    }

    if !record.tests.is_empty() {
        let names: Vec<&str> = record.tests.iter().map(|test| test.name.as_str()).collect();
        let _ = write!(out, "\n  tests: {}", names.join(", "));
    }

    if verbose {
        let history: Vec<String> = record.history.iter().map(ToString::to_string).collect();
        let _ = write!(out, "\n  history: {}", history.join(" -> "));
    }
    out
}
