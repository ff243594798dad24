//! callpulse Call-Center Reference Runtime: Demo CLI
//!
//! Runs one or all of the call-center demo scenarios, or replays a real
//! `queue_log` file. Each scenario uses real callpulse components (event log,
//! classifier, stats service, legacy decoder) wired together with a mock
//! morning shift.
//!
//! Usage:
//!   cargo run -p demo -- run-all
//!   cargo run -p demo -- agent-monitor
//!   cargo run -p demo -- service-level
//!   cargo run -p demo -- legacy-import
//!   cargo run -p demo -- replay /var/log/asterisk/queue_log --config engine.toml

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use callpulse_contracts::error::CallpulseResult;
use callpulse_ref_callcenter::scenarios::{agent_monitor, legacy_import, replay, service_level};

// ── CLI definition ────────────────────────────────────────────────────────────

/// callpulse: agent state and queue metrics derived from the telephony event log.
#[derive(Parser)]
#[command(
    name = "demo",
    about = "callpulse call-center reference runtime demo",
    long_about = "Runs callpulse demo scenarios showing agent status resolution,\n\
                  session and pause reconstruction, windowed call metrics and\n\
                  legacy payload decoding."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run all three scenarios in sequence.
    RunAll,
    /// Scenario 1: Agent Monitor (status, sessions, pauses, activity).
    AgentMonitor,
    /// Scenario 2: Service Level (totals, SLA, waits, queue board).
    ServiceLevel,
    /// Scenario 3: Legacy Import (cached statistics payloads).
    LegacyImport,
    /// Replay a queue_log file and print agent states and metrics.
    Replay {
        /// Path to the pipe-delimited queue_log file.
        path: PathBuf,
        /// Engine configuration TOML; the embedded one is used when absent.
        #[arg(long)]
        config: Option<PathBuf>,
        /// Print the result as JSON instead of a table.
        #[arg(long)]
        json: bool,
    },
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() {
    // Set RUST_LOG=debug for verbose output.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .compact()
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Command::RunAll => {
            print_banner();
            run_all()
        }
        Command::AgentMonitor => {
            print_banner();
            agent_monitor::run_scenario()
        }
        Command::ServiceLevel => {
            print_banner();
            service_level::run_scenario()
        }
        Command::LegacyImport => {
            print_banner();
            legacy_import::run_scenario()
        }
        Command::Replay { path, config, json } => {
            info!(path = %path.display(), "replaying queue_log");
            replay::run_file(&path, config.as_deref(), json)
        }
    };

    if let Err(e) = result {
        eprintln!("Demo error: {}", e);
        std::process::exit(1);
    }
}

// ── Scenario dispatch ─────────────────────────────────────────────────────────

fn run_all() -> CallpulseResult<()> {
    agent_monitor::run_scenario()?;
    service_level::run_scenario()?;
    legacy_import::run_scenario()?;
    println!("All scenarios completed successfully.");
    Ok(())
}

// ── Banner ────────────────────────────────────────────────────────────────────

fn print_banner() {
    println!();
    println!("callpulse: Call-Center Statistics Engine");
    println!("Reference Demo");
    println!("========================================");
    println!();
    println!("Per query, nothing is cached:");
    println!("  [1] Read the window from the event log (closed-open, deadline-bound)");
    println!("  [2] Classify raw event codes through the first-match rule table");
    println!("  [3] Order by (timestamp, sequence) and derive states, intervals, metrics");
    println!("  [4] Name agents and queues from the catalog, falling back to their ids");
    println!();
}
