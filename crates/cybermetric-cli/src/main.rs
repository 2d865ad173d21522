//! cybermetric CLI: run the CyberMetric benchmark against a language model.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(
    name = "cybermetric",
    version,
    about = "Multiple-choice cybersecurity benchmark for LLMs"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate a model against a dataset
    Run {
        /// Model identifier (e.g. "llama3.1:70b", "gpt-3.5-turbo-0125")
        #[arg(long)]
        model: Option<String>,

        /// Dataset name or path; ".json" is appended when missing
        #[arg(long)]
        test: Option<String>,

        /// Backend name from the config (e.g. "ollama", "openai")
        #[arg(long)]
        provider: Option<String>,

        /// Requests per question before giving up
        #[arg(long)]
        max_attempts: Option<u32>,

        /// Directory for evaluation logs
        #[arg(long)]
        output: Option<PathBuf>,

        /// Output format: text, json, html, all (comma-separated)
        #[arg(long, default_value = "text")]
        format: String,

        /// Print every incorrect answer after the run
        #[arg(long)]
        verbose: bool,

        /// Do not write any report files
        #[arg(long)]
        no_save: bool,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Check a dataset file for structural problems
    Validate {
        /// Dataset name or path
        #[arg(long)]
        test: String,
    },

    /// List available models
    ListModels {
        /// Filter to specific provider
        #[arg(long)]
        provider: Option<String>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Create starter config and example dataset
    Init,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("cybermetric=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run {
            model,
            test,
            provider,
            max_attempts,
            output,
            format,
            verbose,
            no_save,
            config,
        } => {
            commands::run::execute(commands::run::RunOptions {
                model,
                test,
                provider,
                max_attempts,
                output,
                format,
                verbose,
                no_save,
                config,
            })
            .await
        }
        Commands::Validate { test } => commands::validate::execute(&test),
        Commands::ListModels { provider, config } => {
            commands::list_models::execute(provider, config).await
        }
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
