use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, ValueEnum};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use deck_core::SessionState;
use deck_providers::GroqCompletion;
use deck_tools::{AgentStore, PageFetcher};

mod config;
mod repl;

use config::Config;

/// Log level for tracing output
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    fn as_filter(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

#[derive(Parser)]
#[command(name = "agentdeck")]
#[command(author, version, about = "agentdeck: interact with a roster of agent personas", long_about = None)]
pub struct Cli {
    /// Path to the config file (default: ~/.config/agentdeck/config.toml)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Directory holding per-agent JSON documents
    #[arg(long)]
    pub agents_dir: Option<PathBuf>,

    /// API key (overrides config; falls back to $GROQ_API_KEY)
    #[arg(long)]
    pub api_key: Option<String>,

    /// Model to use (overrides config)
    #[arg(short, long)]
    pub model: Option<String>,

    /// Base URL for the completion API (overrides config)
    #[arg(long)]
    pub base_url: Option<String>,

    /// Log level
    #[arg(long, value_enum, default_value = "warn")]
    pub log_level: LogLevel,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(cli.log_level.as_filter())),
        )
        .init();

    let config = Config::load(cli.config.as_deref())?;

    // Flag > config > environment
    let api_key = cli
        .api_key
        .or(config.api_key)
        .or_else(|| std::env::var("GROQ_API_KEY").ok());

    let mut completion = GroqCompletion::new();
    if let Some(base_url) = cli.base_url.or(config.base_url) {
        completion = completion.with_base_url(base_url);
    }
    if let Some(model) = cli.model.or(config.model) {
        completion = completion.with_model(model);
    }
    let fetcher = PageFetcher::new();

    let agents_dir = match cli.agents_dir.or(config.agents_dir) {
        Some(dir) => dir,
        None => Config::default_agents_dir()?,
    };
    let store = AgentStore::new(agents_dir);

    let mut state = SessionState::new();
    state.agents = store.load_all()?;
    if state.agents.is_empty() {
        println!("No agents have yet been created. Use `add <name>` to create one.");
    }

    repl::run(&mut state, &completion, &fetcher, &store, api_key.as_deref()).await
}
