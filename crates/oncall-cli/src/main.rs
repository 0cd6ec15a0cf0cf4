//! On-Call Copilot - autonomous incident investigation from the terminal
//!
//! - `alerts` lists the demo alerts
//! - `investigate` runs the tool-calling loop and prints each snapshot
//! - `refine` folds a new finding into a saved report

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};

use oncall_core::ai::client::GeminiClient;
use oncall_core::incident::{demo, Message};
use oncall_core::tools::{StaticToolTable, ToolResultSource};
use oncall_core::{paths, CopilotConfig, CopilotState, InvestigationLoop};

mod render;

/// On-Call Copilot
#[derive(Parser)]
#[command(name = "oncall-copilot")]
#[command(about = "Autonomous on-call incident investigator", long_about = None)]
struct Cli {
    /// Config file (defaults to ~/.oncall-copilot/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the demo alerts
    Alerts,

    /// Investigate an alert autonomously
    Investigate {
        /// Alert ID, e.g. ALRT-001
        alert_id: String,

        /// Write the final report as JSON
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Canned tool results: {"<alertId>": {"<tool>": <result>}}
        #[arg(long)]
        tools: Option<PathBuf>,
    },

    /// Refine a saved report with a new finding
    Refine {
        alert_id: String,

        /// Report JSON written by `investigate --output`
        #[arg(long)]
        state: PathBuf,

        /// What the engineer found, e.g. "DB CPU is only 30%"
        #[arg(long)]
        finding: String,

        /// Write the refined report as JSON
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn init_logging() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let log_file = std::fs::create_dir_all(paths::logs_dir())
        .and_then(|_| std::fs::File::create(paths::log_file_path()));

    match log_file {
        Ok(file) => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::sync::Mutex::new(file))
            .with_ansi(false)
            .init(),
        Err(e) => {
            eprintln!("Failed to create log file: {}, logging to stderr", e);
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<CopilotConfig> {
    let config = match path {
        Some(path) => CopilotConfig::load_from(path),
        None => CopilotConfig::load(),
    };
    config.context("failed to load configuration")
}

fn build_loop(config: CopilotConfig, source: Arc<dyn ToolResultSource>) -> Result<InvestigationLoop> {
    let client = GeminiClient::from_env(&config.oracle.api_key_env, &config.oracle.base_url)?;
    Ok(InvestigationLoop::new(Arc::new(client), source, config))
}

fn write_report(path: &Path, state: &CopilotState) -> Result<()> {
    let json = serde_json::to_string_pretty(state)?;
    std::fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))?;
    println!("\nReport saved to {}", path.display());
    Ok(())
}

fn read_report(path: &Path) -> Result<CopilotState> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("invalid report in {}", path.display()))
}

async fn investigate(
    config: CopilotConfig,
    alert_id: &str,
    output: Option<&Path>,
    tools: Option<&Path>,
) -> Result<()> {
    let Some(alert) = demo::find_alert(alert_id) else {
        bail!("unknown alert {}; run `oncall-copilot alerts`", alert_id);
    };
    let table = match tools {
        Some(path) => StaticToolTable::from_json_file(path)?,
        None => demo::tool_table(),
    };

    let investigation = build_loop(config, Arc::new(table))?;
    tracing::info!(alert_id = %alert.id, "Investigation requested from CLI");
    println!("{}\n", render::alert_line(&alert));

    let (mut snapshots, handle) =
        oncall_core::spawn_investigation(investigation, alert, demo::runbooks());
    while let Some(snapshot) = snapshots.recv().await {
        println!("{}", render::snapshot(&snapshot));
    }

    let state = handle.await.context("investigation task panicked")??;
    if let Some(path) = output {
        write_report(path, &state)?;
    }
    Ok(())
}

async fn refine(
    config: CopilotConfig,
    alert_id: &str,
    state_path: &Path,
    finding: &str,
    output: Option<&Path>,
) -> Result<()> {
    let Some(alert) = demo::find_alert(alert_id) else {
        bail!("unknown alert {}", alert_id);
    };
    let previous = read_report(state_path)?;
    let history = vec![Message::assistant(
        previous.summary.clone(),
        Some(previous.clone()),
    )];

    let investigation = build_loop(config, Arc::new(StaticToolTable::new()))?;
    let state = investigation
        .refine(&alert, &demo::runbooks(), &previous, &history, finding)
        .await?;

    println!("{}", render::report(&state));
    if let Some(path) = output {
        write_report(path, &state)?;
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging();

    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Alerts => {
            for alert in demo::alerts() {
                println!("{}", render::alert_line(&alert));
            }
        }
        Commands::Investigate {
            alert_id,
            output,
            tools,
        } => {
            investigate(config, &alert_id, output.as_deref(), tools.as_deref()).await?;
        }
        Commands::Refine {
            alert_id,
            state,
            finding,
            output,
        } => {
            refine(config, &alert_id, &state, &finding, output.as_deref()).await?;
        }
    }

    Ok(())
}
