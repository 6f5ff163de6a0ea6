use std::{
    io::{self, BufRead, IsTerminal},
    path::PathBuf,
};

use anyhow::{Context, Result};
use clap::{Arg, ArgAction, Command};
use futures::future::join_all;
use pyswift_core::{init_tracing, AstBackend, ConversionStatus, Exporter, Orchestrator, PipelineConfig};
use pyswift_repl::repl::{format_summary, Repl, ReplCommand};
use tracing::warn;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let matches = Command::new("pyswift")
        .version(pyswift_core::VERSION)
        .about("Best-effort Python to Swift transpiler with XCTest synthesis")
        .arg(
            Arg::new("files")
                .value_name("FILE")
                .help("Python files to convert; starts the REPL when omitted")
                .num_args(0..)
                .index(1),
        )
        .arg(
            Arg::new("out")
                .long("out")
                .short('o')
                .value_name("DIR")
                .help("Export successful conversions into this directory"),
        )
        .arg(
            Arg::new("python")
                .long("python")
                .value_name("PATH")
                .help("Python interpreter used to acquire the AST")
                .default_value("/usr/bin/python3"),
        )
        .arg(
            Arg::new("heuristic-ast")
                .long("heuristic-ast")
                .help("Build the AST in-process instead of spawning Python")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("indent")
                .long("indent")
                .value_name("N")
                .help("Indentation unit in spaces")
                .value_parser(clap::value_parser!(usize))
                .default_value("4"),
        )
        .arg(
            Arg::new("debug")
                .long("debug")
                .help("Enable debug mode")
                .action(ArgAction::SetTrue),
        )
        .get_matches();

    // Extract command line options
    let files: Vec<PathBuf> = matches
        .get_many::<String>("files")
        .map(|values| values.map(PathBuf::from).collect())
        .unwrap_or_default();
    let out_dir = matches.get_one::<String>("out").map(PathBuf::from);
    let debug = matches.get_flag("debug");

    let config = PipelineConfig {
        interpreter: matches
            .get_one::<String>("python")
            .map(PathBuf::from)
            .unwrap_or_else(|| PipelineConfig::default().interpreter),
        ast_backend: if matches.get_flag("heuristic-ast") {
            AstBackend::Heuristic
        } else {
            AstBackend::Interpreter
        },
        indent_width: matches.get_one::<usize>("indent").copied().unwrap_or(4),
        debug,
        ..Default::default()
    };

    // Initialize logging
    if debug && std::env::var_os("RUST_LOG").is_none() {
        std::env::set_var("RUST_LOG", "pyswift_core=debug");
    }
    init_tracing();

    if !files.is_empty() {
        let failed = run_batch(&config, &files, out_dir).await?;
        if failed > 0 {
            std::process::exit(1);
        }
        return Ok(());
    }

    let mut repl = Repl::with_config(&config)?;

    println!("pyswift REPL v{}", pyswift_core::VERSION);
    println!("AST backend: {}", repl.orchestrator().ast_provider_name());
    if debug {
        println!("Debug mode: enabled");
    }
    println!("Type .help for help, .quit to exit");
    println!();

    run_repl(&mut repl).await
}

/// Convert every file concurrently; returns the number of failures
async fn run_batch(config: &PipelineConfig, files: &[PathBuf], out_dir: Option<PathBuf>) -> Result<usize> {
    let orchestrator = Orchestrator::from_config(config)?;
    let exporter = Exporter::new();

    let results = join_all(
        files
            .iter()
            .map(|path| orchestrator.load_script_from_origin(path)),
    )
    .await;

    let mut failed = 0;
    for (path, result) in files.iter().zip(results) {
        let id = match result {
            Ok(id) => id,
            Err(e) => {
                eprintln!("{}: {e}", path.display());
                failed += 1;
                continue;
            }
        };
        let Some(record) = orchestrator.script(id) else {
            continue;
        };

        println!("{}", format_summary(&record, config.debug));
        if record.status != ConversionStatus::Success {
            failed += 1;
            continue;
        }

        if let Some(dir) = &out_dir {
            let summary = exporter
                .export(&record, dir)
                .with_context(|| format!("exporting {}", path.display()))?;
            for written in &summary.written {
                println!("  wrote {}", written.display());
            }
        }
    }

    if failed > 0 {
        warn!(failed, total = files.len(), "some files failed to convert");
    }
    Ok(failed)
}

async fn run_repl(repl: &mut Repl) -> Result<()> {
    use rustyline::{error::ReadlineError, DefaultEditor};

    let mut rl = DefaultEditor::new()?;
    let is_interactive = io::stdin().is_terminal();
    let mut piped = (!is_interactive).then(|| io::stdin().lock().lines());
    let mut paste_name: Option<String> = None;
    let mut paste_buffer = String::new();

    while repl.is_running() {
        let prompt = if paste_name.is_some() { ".. " } else { "py> " };

        // Get the next line from either piped or interactive input
        let line_result = match piped.as_mut() {
            Some(lines) => match lines.next() {
                Some(line) => line.map_err(ReadlineError::from),
                None => Err(ReadlineError::Eof),
            },
            None => rl.readline(prompt),
        };

        match line_result {
            Ok(line) => {
                if let Some(name) = paste_name.clone() {
                    // Accumulate until we see a single '.'
                    if line.trim() == "." {
                        if is_interactive {
                            rl.add_history_entry(&paste_buffer)?;
                        }
                        match repl.convert(&name, &paste_buffer).await {
                            Ok((summary, duration)) => {
                                repl.notifier().on_result(&summary, duration, repl.is_quiet())
                            }
                            Err(e) => repl.notifier().on_error(&format!("Error: {e}")),
                        }
                        paste_buffer.clear();
                        paste_name = None;
                    } else {
                        paste_buffer.push_str(&line);
                        paste_buffer.push('\n');
                    }
                    continue;
                }

                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                if is_interactive {
                    rl.add_history_entry(&line)?;
                } else {
                    println!("py> {trimmed}");
                }

                match repl.parse_input(trimmed) {
                    Ok(command) => {
                        if let ReplCommand::Paste(name) = &command {
                            paste_name = Some(name.clone());
                        }
                        match repl.handle_command(command).await {
                            Ok(output) => repl.notifier().on_output(&output),
                            Err(e) => repl.notifier().on_error(&format!("Error: {e}")),
                        }
                    }
                    Err(e) => repl.notifier().on_error(&format!("Error: {e}")),
                }
            }
            Err(ReadlineError::Interrupted) => {
                if paste_name.take().is_some() {
                    // Cancel paste mode
                    println!("^C");
                    paste_buffer.clear();
                } else {
                    println!("Use .quit to exit");
                }
            }
            Err(ReadlineError::Eof) => {
                println!("Goodbye!");
                break;
            }
            Err(err) => {
                eprintln!("Error: {err}");
                break;
            }
        }
    }

    // Show exit statistics
    repl.show_exit_stats();

    Ok(())
}
