//! # chapterskipctl
//!
//! Command-line host for the chapter skip controller.
//!
//! - `validate` loads settings the same way a host would and reports guard
//!   rail warnings.
//! - `replay` runs a recorded session log through a live controller and
//!   prints every command it issues as a JSON line on stdout.

mod replay;
mod sink;

use std::{fs::File, io::BufReader, path::PathBuf, sync::Arc};

use anyhow::Context;
use chapterskip_config::{
    ConfigLoad, ConfigLoader, ConfigLoaderOptions, ConfigWarnings, PatternSource,
    ReloadableConfigSource,
};
use clap::{Args as ClapArgs, Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::sink::JsonLineSink;

/// CLI entry point
#[derive(Parser, Debug)]
#[command(name = "chapterskipctl", version)]
#[command(about = "Validate chapter skip settings and replay recorded playback sessions")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(ClapArgs, Debug, Clone)]
struct ConfigArgs {
    /// Settings file (TOML, or JSON by extension). Overrides CHAPTER_SKIP_CONFIG
    #[arg(long)]
    config: Option<PathBuf>,

    /// Env file loaded before reading CHAPTER_SKIP_* variables (default: .env)
    #[arg(long)]
    env_file: Option<PathBuf>,
}

impl ConfigArgs {
    fn loader(&self) -> ConfigLoader {
        ConfigLoader::with_options(ConfigLoaderOptions {
            config_path: self.config.clone(),
            env_file: self.env_file.clone(),
        })
    }
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Load settings, print warnings and exit non-zero if they are unusable
    Validate(ConfigArgs),
    /// Replay a JSON-lines session log and print the issued commands
    Replay(ReplayArgs),
}

#[derive(ClapArgs, Debug)]
struct ReplayArgs {
    /// JSON-lines file of progress, stopped and configure steps
    #[arg(long)]
    events: PathBuf,

    #[command(flatten)]
    config: ConfigArgs,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli.command {
        Command::Validate(args) => run_validate(&args),
        Command::Replay(args) => run_replay(args).await,
    }
}

fn run_validate(args: &ConfigArgs) -> anyhow::Result<()> {
    let ConfigLoad { config, warnings } = args
        .loader()
        .load()
        .context("failed to load chapter skip configuration")?;

    let skip = &config.skip;
    let source = match &config.metadata.pattern_source {
        PatternSource::Default => "default".to_string(),
        PatternSource::File(path) => path.display().to_string(),
        PatternSource::Env => "environment".to_string(),
    };

    println!("configuration OK");
    println!("  pattern:          {}", skip.pattern().unwrap_or("<none>"));
    println!("  pattern source:   {source}");
    println!("  case insensitive: {}", skip.case_insensitive);
    println!(
        "  notification:     {} ({:?}, header {:?})",
        if skip.notification.enabled { "on" } else { "off" },
        skip.notification.timeout(),
        skip.notification.header,
    );
    for warning in &warnings.items {
        match &warning.hint {
            Some(hint) => println!("warning: {} (hint: {hint})", warning.message),
            None => println!("warning: {}", warning.message),
        }
    }
    Ok(())
}

async fn run_replay(args: ReplayArgs) -> anyhow::Result<()> {
    let events = File::open(&args.events)
        .with_context(|| format!("failed to open event log {}", args.events.display()))?;

    let (source, warnings) = ReloadableConfigSource::open(args.config.loader())
        .context("failed to load chapter skip configuration")?;
    log_warnings(&warnings);
    if source.metadata().env_file_loaded {
        info!("loaded .env file");
    }

    let sink = Arc::new(JsonLineSink::stdout());
    let summary = replay::replay(BufReader::new(events), Arc::new(source), sink.clone()).await?;

    info!(
        progress = summary.progress,
        stopped = summary.stopped,
        configured = summary.configured,
        seeks = sink.seeks(),
        notifications = sink.notifications(),
        "replay finished"
    );
    Ok(())
}

fn log_warnings(warnings: &ConfigWarnings) {
    for warning in &warnings.items {
        match &warning.hint {
            Some(hint) => {
                warn!(message = %warning.message, hint = %hint, "configuration warning")
            }
            None => warn!(message = %warning.message, "configuration warning"),
        }
    }
}
