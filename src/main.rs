//! Editor Pilot - Entry Point
//!
//! Runs the pipeline against a headless editor seeded with the given
//! workspace files, so instructions can be tried without a live editor.

use clap::{Parser, Subcommand};
use editor_pilot::core::config::PilotConfig;
use editor_pilot::core::error::{PilotError, Result};
use editor_pilot::editor::headless::DEFAULT_LINE_COUNT;
use editor_pilot::editor::{EditorSession, HeadlessEditor};
use editor_pilot::orchestrator::Orchestrator;
use editor_pilot::shell::Shell;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::runtime::Runtime;
use tracing_subscriber::EnvFilter;

/// Drive a code editor with natural-language instructions
#[derive(Parser, Debug)]
#[command(name = "editor-pilot")]
#[command(about = "Translate natural-language instructions into editor commands")]
struct Args {
    /// TOML config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Completion service base URL (overrides config and PILOT_ENDPOINT_URL)
    #[arg(long)]
    endpoint: Option<String>,

    /// File to place in the headless workspace (repeatable)
    #[arg(long = "workspace", value_name = "FILE")]
    workspace: Vec<String>,

    #[command(subcommand)]
    mode: Mode,
}

#[derive(Subcommand, Debug)]
enum Mode {
    /// Run one instruction and print the executed command
    Run { text: String },
    /// Read instructions line by line
    Repl,
    /// Serve shell JSON messages on stdin/stdout, one per line
    Stdio,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("editor_pilot=info")),
        )
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    if let Err(e) = run(args) {
        eprintln!("error: [{}] {}", e.kind(), e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    let config = load_config(&args)?;
    tracing::info!(endpoint = %config.endpoint_url, model = %config.completion.model, "Editor Pilot starting");

    let host = Arc::new(seed_workspace(&args.workspace));
    let session = EditorSession::new(host.clone());
    let orchestrator = Orchestrator::from_config(&config);
    let rt = Runtime::new()?;

    match args.mode {
        Mode::Run { text } => {
            let result = rt.block_on(orchestrator.run(&session, &text, &config.endpoint_url));
            log_operations(&host);
            let report = result?;
            println!("{}", report.confirmation());
        }
        Mode::Repl => {
            println!("Editor Pilot - type an instruction, or 'quit' to exit");
            let stdin = io::stdin();
            loop {
                print!("> ");
                io::stdout().flush()?;

                let mut input = String::new();
                if stdin.lock().read_line(&mut input)? == 0 {
                    break;
                }
                let input = input.trim();
                if input.is_empty() {
                    continue;
                }
                if input == "quit" || input == "q" {
                    break;
                }

                let result = rt.block_on(orchestrator.run(&session, input, &config.endpoint_url));
                log_operations(&host);
                match result {
                    Ok(report) => println!("{}", report.confirmation()),
                    Err(e) => println!("[{}] {}", e.kind(), e),
                }
            }
        }
        Mode::Stdio => {
            let shell = Shell::new(orchestrator, session, config.endpoint_url.clone());
            let stdin = io::stdin();
            let mut stdout = io::stdout();
            for line in stdin.lock().lines() {
                let line = line?;
                if line.trim().is_empty() {
                    continue;
                }
                let reply = rt.block_on(shell.handle_line(&line));
                log_operations(&host);
                let reply =
                    serde_json::to_string(&reply).map_err(|e| PilotError::Decode(e.to_string()))?;
                writeln!(stdout, "{}", reply)?;
                stdout.flush()?;
            }
        }
    }

    Ok(())
}

/// Config file (if any), then environment, then command-line overrides
fn load_config(args: &Args) -> Result<PilotConfig> {
    let config = match &args.config {
        Some(path) => PilotConfig::load(path)?,
        None => PilotConfig::default(),
    };
    let mut config = config.with_env_overrides()?;
    if let Some(endpoint) = &args.endpoint {
        config.endpoint_url = endpoint.clone();
    }
    config.validate().map_err(PilotError::Config)?;
    Ok(config)
}

/// Headless workspace; files readable on disk keep their real line count
fn seed_workspace(paths: &[String]) -> HeadlessEditor {
    paths
        .iter()
        .fold(HeadlessEditor::default(), |editor, path| {
            match std::fs::read_to_string(path) {
                Ok(content) => {
                    let lines = u32::try_from(content.lines().count()).unwrap_or(u32::MAX);
                    editor.with_file(path.as_str(), lines)
                }
                Err(_) => editor.with_file(path.as_str(), DEFAULT_LINE_COUNT),
            }
        })
}

fn log_operations(host: &HeadlessEditor) {
    for op in host.operations() {
        tracing::info!(?op, "editor operation");
    }
    host.clear_operations();
}
