//! REPL command parsing and definitions
//!
//! Handles parsing of dot-commands (.help, .load, .swift, etc.). Script
//! arguments are 1-based positions in the `.list` output.

use anyhow::{anyhow, Result};

/// Available REPL commands
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    /// Show help information
    Help,
    /// Exit the REPL
    Quit,
    /// Toggle quiet mode
    Quiet,
    /// Load and convert a Python file
    Load(String),
    /// Collect pasted source until a lone `.`, then convert it
    Paste(String),
    /// List all scripts
    List,
    /// Show the analysis summary of a script
    Show(usize),
    /// Print the translated Swift
    Swift(usize),
    /// Print the synthesized XCTest suite
    Tests(usize),
    /// Print the acquired AST
    Ast(usize),
    /// Remove a script
    Remove(usize),
    /// Export a script into a directory
    Export(usize, String),
}

/// Parse a command string into a ReplCommand
pub fn parse_command(input: &str) -> Result<ReplCommand> {
    let trimmed = input.trim();

    let Some(body) = trimmed.strip_prefix('.') else {
        return Err(anyhow!("Commands must start with '.'"));
    };

    let parts: Vec<&str> = body.split_whitespace().collect();

    if parts.is_empty() {
        return Err(anyhow!("Empty command"));
    }

    match parts[0] {
        "help" | "h" => Ok(ReplCommand::Help),
        "quit" | "q" | "exit" => Ok(ReplCommand::Quit),
        "quiet" => Ok(ReplCommand::Quiet),
        "list" | "ls" => Ok(ReplCommand::List),
        "load" => {
            if parts.len() != 2 {
                return Err(anyhow!("Usage: .load <path>"));
            }
            Ok(ReplCommand::Load(parts[1].to_string()))
        }
        "paste" => {
            if parts.len() != 2 {
                return Err(anyhow!("Usage: .paste <name>"));
            }
            Ok(ReplCommand::Paste(parts[1].to_string()))
        }
        "show" => Ok(ReplCommand::Show(index_arg(&parts, ".show <n>")?)),
        "swift" => Ok(ReplCommand::Swift(index_arg(&parts, ".swift <n>")?)),
        "tests" => Ok(ReplCommand::Tests(index_arg(&parts, ".tests <n>")?)),
        "ast" => Ok(ReplCommand::Ast(index_arg(&parts, ".ast <n>")?)),
        "remove" | "rm" => Ok(ReplCommand::Remove(index_arg(&parts, ".remove <n>")?)),
        "export" => {
            if parts.len() != 3 {
                return Err(anyhow!("Usage: .export <n> <dir>"));
            }
            Ok(ReplCommand::Export(parse_index(parts[1])?, parts[2].to_string()))
        }
        _ => Err(anyhow!("Unknown command: .{}", parts[0])),
    }
}

fn index_arg(parts: &[&str], usage: &str) -> Result<usize> {
    if parts.len() != 2 {
        return Err(anyhow!("Usage: {usage}"));
    }
    parse_index(parts[1])
}

fn parse_index(text: &str) -> Result<usize> {
    match text.parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(anyhow!("Expected a script number from .list, got '{text}'")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_help() {
        assert_eq!(parse_command(".help").unwrap(), ReplCommand::Help);
        assert_eq!(parse_command(".h").unwrap(), ReplCommand::Help);
    }

    #[test]
    fn test_parse_quit() {
        assert_eq!(parse_command(".quit").unwrap(), ReplCommand::Quit);
        assert_eq!(parse_command(".q").unwrap(), ReplCommand::Quit);
        assert_eq!(parse_command(".exit").unwrap(), ReplCommand::Quit);
    }

    #[test]
    fn test_parse_load_and_paste() {
        assert_eq!(
            parse_command(".load scripts/greet.py").unwrap(),
            ReplCommand::Load("scripts/greet.py".into())
        );
        assert_eq!(
            parse_command("  .paste scratch  ").unwrap(),
            ReplCommand::Paste("scratch".into())
        );
    }

    #[test]
    fn test_parse_indexed_commands() {
        assert_eq!(parse_command(".show 2").unwrap(), ReplCommand::Show(2));
        assert_eq!(parse_command(".swift 1").unwrap(), ReplCommand::Swift(1));
        assert_eq!(parse_command(".tests 3").unwrap(), ReplCommand::Tests(3));
        assert_eq!(parse_command(".ast 1").unwrap(), ReplCommand::Ast(1));
        assert_eq!(parse_command(".rm 4").unwrap(), ReplCommand::Remove(4));
        assert_eq!(
            parse_command(".export 1 out/swift").unwrap(),
            ReplCommand::Export(1, "out/swift".into())
        );
    }

    #[test]
    fn test_parse_invalid_command() {
        assert!(parse_command(".invalid").is_err());
        assert!(parse_command("help").is_err()); // Missing dot
        assert!(parse_command(".load").is_err()); // Missing argument
        assert!(parse_command(".show 0").is_err());
        assert!(parse_command(".show first").is_err());
        assert!(parse_command(".export 1").is_err());
        assert!(parse_command(".").is_err());
    }
}
