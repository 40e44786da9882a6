mod analyze;
mod keys;
mod report;

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use revlens_keys::{JsonFileStore, KeyPool};
use tokio::sync::Mutex;
use tracing_subscriber::EnvFilter;

use crate::keys::KeysCommands;
use crate::report::OutputFormat;

#[derive(Debug, Parser)]
#[command(name = "revlens")]
#[command(about = "Analyze customer reviews with Gemini using a rotating pool of API keys")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Manage the local pool of Gemini API keys
    Keys {
        #[command(subcommand)]
        command: KeysCommands,
    },
    /// Analyze a review file (.txt or .csv)
    Analyze {
        /// Path to the review file
        file: PathBuf,
        /// MIME type of the file; inferred from the extension when omitted
        #[arg(long)]
        mime: Option<String>,
        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
        /// Write the report to this path instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
        /// Re-run the batch on the next key when the active key hits its rate limit
        #[arg(long)]
        retry_on_failover: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = revlens_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
    tracing::debug!(
        env = %config.env,
        keys_path = %config.keys_path.display(),
        model = %config.llm_model,
        "configuration loaded"
    );

    let cli = Cli::parse();
    let Some(command) = cli.command else {
        println!("no command given; run `revlens --help` for usage");
        return Ok(());
    };

    let store = JsonFileStore::new(&config.keys_path);
    let mut pool = KeyPool::open(store)?;

    match command {
        Commands::Keys { command } => keys::run_keys(&mut pool, command)?,
        Commands::Analyze {
            file,
            mime,
            format,
            output,
            retry_on_failover,
        } => {
            let keys = Arc::new(Mutex::new(pool));
            analyze::run_analyze(
                &config,
                keys,
                &analyze::AnalyzeArgs {
                    file,
                    mime,
                    format,
                    output,
                    retry_on_failover,
                },
            )
            .await?;
        }
    }

    Ok(())
}
