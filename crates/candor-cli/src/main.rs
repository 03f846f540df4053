//! `candor` - ask a question through the validated completion pipeline.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use candor_chat::Message;
use candor_llm::{ChatCompleter, LlmConfig};

#[derive(Parser)]
#[command(name = "candor", version, about = "Self-correcting LLM completions")]
struct Cli {
    /// Path to the YAML configuration file.
    #[arg(short, long, global = true, default_value = "candor.yaml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Ask one question and print the (validated) answer.
    Ask {
        /// The question to ask.
        question: String,

        /// Optional system prompt prepended to the conversation.
        #[arg(short, long)]
        system: Option<String>,
    },
}

/// Dev diagnostics via `RUST_LOG`, output to stderr. Defaults to `warn`.
fn init_tracing() {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .init();
}

fn load_config(path: &PathBuf) -> Result<LlmConfig> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading config file {}", path.display()))?;
    serde_yaml::from_str(&raw).with_context(|| format!("parsing config file {}", path.display()))
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let config = load_config(&cli.config)?;
    let backend = config.build().context("building completion backend")?;

    match cli.command {
        Commands::Ask { question, system } => {
            let mut msgs = Vec::new();
            if let Some(system) = system {
                msgs.push(Message::system(system));
            }
            msgs.push(Message::user(question));

            let reply = backend
                .complete(&msgs)
                .await
                .context("completion failed")?;

            println!("{}", reply.content);
        }
    }

    Ok(())
}
