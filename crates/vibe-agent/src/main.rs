use std::io::Read as _;

use anyhow::{Context, Result};
use clap::Parser;

mod cli;
mod dispatch;
mod logging;
mod orchestrator;
mod prompt;
mod state;
mod ui;

use cli::{Cli, Commands, MemoryCommands, PolicyCommands};
use va_core::config::RuntimeConfig;
use va_memory::MemoryStore;
use va_protocol::OpenAiCompatClient;
use ui::StdIoUi;

#[tokio::main]
async fn main() -> Result<()> {
    let _log_guard = logging::init();

    let cli = Cli::parse();
    let cwd = std::env::current_dir().context("failed to read current directory")?;
    let config = RuntimeConfig::from_env(cwd);

    match cli.command {
        Commands::Run { goal } => run_command(config, goal).await,
        Commands::Policy { cmd: PolicyCommands::Show } => policy_show(&config),
        Commands::Memory { cmd: MemoryCommands::Show } => memory_show(&config).await,
    }
}

async fn run_command(config: RuntimeConfig, goal: Option<String>) -> Result<()> {
    let goal = match goal {
        Some(g) => g,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read task from stdin")?;
            buf.trim().to_string()
        }
    };
    if goal.is_empty() {
        anyhow::bail!("no task provided; pass it as an argument or pipe it on stdin");
    }

    let client = match &config.api_key {
        Some(key) => OpenAiCompatClient::new(&config.base_url, key, &config.model),
        None => {
            eprintln!("No API key configured. Set VIBE_API_KEY (or GROQ_API_KEY/OPENAI_API_KEY).");
            std::process::exit(1);
        }
    };

    let mut ui = StdIoUi;
    let outcome = orchestrator::run_task(&config, &goal, &client, &mut ui).await;
    tracing::info!(?outcome, "task finished");
    Ok(())
}

fn policy_show(config: &RuntimeConfig) -> Result<()> {
    let policy = state::load_or_init_policy(&config.state_dir);
    println!("{}", serde_json::to_string_pretty(&policy)?);
    Ok(())
}

async fn memory_show(config: &RuntimeConfig) -> Result<()> {
    let memory = MemoryStore::new(&config.state_dir);
    let doc = memory.load().await;
    println!("{}", serde_json::to_string_pretty(&doc)?);
    Ok(())
}
