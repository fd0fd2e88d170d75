//! MEDCONSULT consultation terminal: demo CLI
//!
//! Runs one or all of the reference consultation scenarios against the
//! in-memory registry, the digest signer and the scripted AI.
//!
//! Usage:
//!   cargo run -p demo -- run-all
//!   cargo run -p demo -- consultation
//!   cargo run -p demo -- ai-assisted
//!   cargo run -p demo -- guard-rails
//!   cargo run -p demo -- --config terminal.toml show-config
//!   cargo run -p demo -- parse-answer "<R, 640557143200>"

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use medconsult_ai::SuggestionParser;
use medconsult_contracts::error::{ConsultError, ConsultResult};
use medconsult_core::config::TerminalConfig;
use medconsult_ref::scenarios::{self, ai_assisted, full_consultation, procedural_guards};

// ── CLI definition ────────────────────────────────────────────────────────────

/// MEDCONSULT consultation terminal demo.
///
/// Each subcommand runs one or all of the consultation scenarios, showing the
/// session state machine, AI suggestions, signature and registry submission.
#[derive(Parser)]
#[command(
    name = "demo",
    about = "MEDCONSULT consultation terminal demo",
    long_about = "Runs MEDCONSULT consultation scenarios showing the session state machine,\n\
                  prescription edition, AI suggestions, signing and registry submission."
)]
struct Cli {
    /// Terminal settings (TOML). Defaults to the embedded scenario settings.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run all three scenarios in sequence.
    RunAll,
    /// Scenario 1: full consultation (edit, sign, submit).
    Consultation,
    /// Scenario 2: AI-assisted consultation (suggestions applied as a batch).
    AiAssisted,
    /// Scenario 3: procedural guard rails (refused steps and recovery).
    GuardRails,
    /// Print the effective terminal settings as JSON.
    ShowConfig,
    /// Parse an AI answer and list the suggestions it carries.
    ParseAnswer {
        /// Answer text containing `<OP, PRODUCT, ...>` fragments.
        text: String,
    },
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() {
    // Initialize structured logging.  Set RUST_LOG=debug for verbose output.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .compact()
        .init();

    let cli = Cli::parse();

    let result = load_config(cli.config.as_ref()).and_then(|config| {
        debug!(?config, "terminal settings loaded");
        match cli.command {
            Command::RunAll => {
                print_banner();
                run_all(&config)
            }
            Command::Consultation => full_consultation::run_scenario(&config),
            Command::AiAssisted => ai_assisted::run_scenario(&config),
            Command::GuardRails => procedural_guards::run_scenario(&config),
            Command::ShowConfig => show_config(&config),
            Command::ParseAnswer { text } => parse_answer(&config, &text),
        }
    });

    match result {
        Ok(()) => {
            println!("Done.");
        }
        Err(e) => {
            eprintln!("Demo error: {}", e);
            std::process::exit(1);
        }
    }
}

fn load_config(path: Option<&PathBuf>) -> ConsultResult<TerminalConfig> {
    match path {
        Some(path) => TerminalConfig::from_file(path),
        None => scenarios::default_config(),
    }
}

// ── Commands ──────────────────────────────────────────────────────────────────

fn run_all(config: &TerminalConfig) -> ConsultResult<()> {
    full_consultation::run_scenario(config)?;
    ai_assisted::run_scenario(config)?;
    procedural_guards::run_scenario(config)?;
    Ok(())
}

fn show_config(config: &TerminalConfig) -> ConsultResult<()> {
    let json = serde_json::to_string_pretty(config).map_err(|e| ConsultError::Config {
        reason: format!("failed to render settings: {e}"),
    })?;
    println!("{json}");
    Ok(())
}

fn parse_answer(config: &TerminalConfig, text: &str) -> ConsultResult<()> {
    let suggestions = SuggestionParser::new(config.malformed_policy()).parse(text)?;
    println!("{} suggestion(s):", suggestions.len());
    for suggestion in &suggestions {
        println!("  - {suggestion}");
    }
    Ok(())
}

// ── Banner ────────────────────────────────────────────────────────────────────

fn print_banner() {
    println!();
    println!("MEDCONSULT Consultation Terminal");
    println!("Reference Demo");
    println!("==================================");
    println!();
    println!("Session states, in order:");
    println!("  [1] Idle             no patient under review");
    println!("  [2] RevisionActive   history and prescription fetched from the registry");
    println!("  [3] EditionActive    medicines added, modified, removed");
    println!("  [4] EditionFinished  prescription frozen, ready to sign");
    println!("  [5] Signed           signature and creation date stamped");
    println!("  [6] Submitted        registry code assigned");
    println!();
}
