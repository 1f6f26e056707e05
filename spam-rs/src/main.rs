//! spam-rs command line
//!
//! # Usage
//!
//! ```bash
//! # Interactive menu (default)
//! spam-rs --config spam-rs.toml shell
//!
//! # Train, then classify individual .eml files
//! spam-rs classify TESTING/TEST_00000.eml TESTING/TEST_00001.eml --json
//!
//! # Train, then list significant tokens
//! spam-rs tokens
//! ```

use clap::{Parser, Subcommand};
use serde::Serialize;
use spam_rs::bayes::Classification;
use spam_rs::config::{Config, LoggingConfig};
use spam_rs::corpus::Corpus;
use spam_rs::service::FilterService;
use spam_rs::shell::{format_tokens, Shell};
use std::path::{Path, PathBuf};
use tokio::io::BufReader;
use tracing::{error, info};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Picked up from the working directory when `--config` is not given
const DEFAULT_CONFIG_FILE: &str = "spam-rs.toml";

#[derive(Parser)]
#[command(name = "spam-rs")]
#[command(about = "Naive Bayes spam filter", long_about = None, version)]
struct Cli {
    /// Configuration file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive menu
    Shell,
    /// Classify message files against a freshly trained model
    Classify {
        /// Raw .eml files
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// One JSON object per line
        #[arg(long)]
        json: bool,
    },
    /// List significant tokens and their probabilities
    Tokens,
}

#[derive(Serialize)]
struct ClassifyOutput<'a> {
    path: &'a Path,
    subject: &'a str,
    #[serde(flatten)]
    classification: Classification,
}

fn init_logging(config: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("spam_rs={}", config.level).into());
    let registry = tracing_subscriber::registry().with(filter);

    match config.format.as_str() {
        "json" => registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init(),
        "compact" => registry
            .with(fmt::layer().compact().with_writer(std::io::stderr))
            .init(),
        _ => registry
            .with(fmt::layer().pretty().with_writer(std::io::stderr))
            .init(),
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let path = match path {
        Some(path) => Some(path.to_path_buf()),
        None => Some(PathBuf::from(DEFAULT_CONFIG_FILE)).filter(|p| p.exists()),
    };
    Ok(Config::load(path.as_deref())?)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    init_logging(&config.logging);
    info!("Starting spam-rs v{}", env!("CARGO_PKG_VERSION"));
    info!("  Labels: {}", config.corpus.labels_path.display());
    info!("  Training dir: {}", config.corpus.training_dir.display());
    info!("  Testing dir: {}", config.corpus.testing_dir.display());
    info!("  Significance threshold: {}", config.model.sig_threshold);

    let service = FilterService::new(&config);

    match cli.command.unwrap_or(Commands::Shell) {
        Commands::Shell => {
            let stdin = BufReader::new(tokio::io::stdin());
            let mut shell = Shell::new(&service, stdin, tokio::io::stdout());
            shell.run().await?;
        }
        Commands::Classify { files, json } => {
            service.update_tokens().await?;

            for path in &files {
                let message = match Corpus::read_message(path).await {
                    Ok(message) => message,
                    Err(e) => {
                        error!("Failed to read {}: {}", path.display(), e);
                        continue;
                    }
                };
                let classification = service.classify_text(&message.text()).await?;

                if json {
                    let output = ClassifyOutput {
                        path,
                        subject: &message.subject,
                        classification,
                    };
                    println!("{}", serde_json::to_string(&output)?);
                } else {
                    println!(
                        "{}: {} (log ratio {:.4})",
                        path.display(),
                        classification.label(),
                        classification.log_ratio
                    );
                }
            }
        }
        Commands::Tokens => {
            let summary = service.update_tokens().await?;
            print!("{}", format_tokens(&service.tokens().await?));
            println!(
                "\nTotal: {} token(s), spam prior {:.4}, {} spam / {} ham messages",
                summary.tokens, summary.spam_prior, summary.spam_messages, summary.ham_messages
            );
        }
    }

    Ok(())
}
