//! llm-mute - drives the LLM admission gate from recorded host events.
//!
//! Stands in for the chat host: replays request, response and command events
//! through one gate and prints each decision as a JSON line.

mod replay;

use std::fs::File;
use std::io;
use std::io::BufReader;
use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use clap::Subcommand;
use tracing::info;

use llm_mute_error::ErrorExt;
use llm_mute_gate::Clock;
use llm_mute_gate::LlmMuteConfig;
use llm_mute_gate::LlmMuteGate;
use llm_mute_gate::SnapshotStore;
use llm_mute_gate::SystemClock;
use llm_mute_gate::format::format_duration;
use llm_mute_gate::format::format_timestamp;

#[derive(Parser)]
#[command(name = "llm-mute")]
#[command(about = "Per-session mute and throttle gate for LLM requests")]
struct Cli {
    /// Path to a JSON config file (defaults apply when omitted)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Replay JSON-lines host events through the gate
    Replay {
        /// Event file, `-` or omitted for stdin
        input: Option<PathBuf>,
    },

    /// Show persisted mute and throttle state for a session
    Status {
        /// Session (group) identifier
        session_id: String,
    },

    /// Show the effective configuration
    Config,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("llm_mute=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => LlmMuteConfig::from_file(path).map_err(|e| {
            let status_code = e.status_code();
            anyhow::Error::new(e).context(format!(
                "failed to load config {} ({status_code})",
                path.display()
            ))
        })?,
        None => LlmMuteConfig::default(),
    };

    match cli.command {
        Command::Replay { input } => run_replay(config, input.as_deref()).await,
        Command::Status { session_id } => show_status(&config, &session_id),
        Command::Config => {
            println!("{}", serde_json::to_string_pretty(&config)?);
            Ok(())
        }
    }
}

async fn run_replay(config: LlmMuteConfig, input: Option<&Path>) -> anyhow::Result<()> {
    let gate = LlmMuteGate::with_system_clock(config);
    gate.initialize().await;

    let result = {
        let mut out = io::stdout().lock();
        match input {
            None => replay::replay(&gate, io::stdin().lock(), &mut out),
            Some(path) if path == Path::new("-") => {
                replay::replay(&gate, io::stdin().lock(), &mut out)
            }
            Some(path) => match File::open(path) {
                Ok(file) => replay::replay(&gate, BufReader::new(file), &mut out),
                Err(e) => Err(anyhow::Error::new(e)
                    .context(format!("failed to open events {}", path.display()))),
            },
        }
    };

    // Flush persisted state even when the replay failed part-way.
    gate.shutdown().await;

    let stats = result?;
    info!(
        events = stats.events,
        skipped = stats.skipped,
        "Replay finished"
    );
    Ok(())
}

fn show_status(config: &LlmMuteConfig, session_id: &str) -> anyhow::Result<()> {
    if !config.persistence.enabled {
        println!("Persistence is disabled; no saved state");
        return Ok(());
    }

    let store = SnapshotStore::new(config.persistence.path.clone());
    let snapshot = store.load();
    let now = SystemClock.now();

    println!("Session: {session_id}");
    println!("Snapshot: {}", store.path().display());

    match snapshot.muted_until.get(session_id).copied() {
        Some(until) if until > now => {
            let remaining = Duration::try_from_secs_f64(until - now)
                .map(format_duration)
                .unwrap_or_else(|_| "a very long time".to_string());
            println!(
                "Muted: yes ({remaining} left, until {})",
                format_timestamp(until)
            );
        }
        _ => println!("Muted: no"),
    }

    match snapshot.last_generated.get(session_id).copied() {
        Some(ts) => println!("Last generated: {}", format_timestamp(ts)),
        None => println!("Last generated: never"),
    }

    Ok(())
}
