//! pyswift REPL - command line front end for the Python to Swift pipeline
//!
//! This crate provides batch conversion and an interactive REPL over the
//! core orchestrator, including dot-command parsing, pasted multi-line
//! sources, and pluggable output notification.

pub mod repl;

// Re-export commonly used types for convenience
pub use repl::{DefaultNotifier, Repl, ReplCommand, ReplNotifier};
