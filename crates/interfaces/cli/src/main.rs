mod check;
mod telemetry;

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::error;

use symcheck_client::HttpBackend;
use symcheck_config::AppConfig;
use symcheck_core::{Sex, WizardController};

use crate::check::{CheckArgs, run_check};
use crate::telemetry::{LogSink, init_tracing};

const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

#[derive(Debug, Parser)]
#[command(
    name = "symcheck",
    version,
    about = "Guided abdominal-pain symptom checker backed by an insight service"
)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,
    /// Override `backend.base_url` for this run.
    #[arg(long, global = true, value_name = "URL")]
    backend_url: Option<String>,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run the interactive four-step wizard (default).
    Start,
    /// Run one session non-interactively and print the insight.
    Check {
        #[arg(long)]
        age: String,
        /// male or female
        #[arg(long)]
        sex: Sex,
        /// Description of the main symptom.
        #[arg(long)]
        symptom: String,
        /// Answer to the clarifying questions.
        #[arg(long)]
        answer: String,
    },
    /// Print the effective configuration.
    #[command(name = "config")]
    ShowConfig {
        /// Also write it to the `--config` path.
        #[arg(long)]
        write: bool,
    },
}

impl Cli {
    fn load_config(&self) -> Result<AppConfig> {
        let mut config = AppConfig::load_from(&self.config)?;
        if let Some(url) = &self.backend_url {
            config.backend.base_url = url.clone();
        }
        Ok(config)
    }
}

fn build_backend(config: &AppConfig) -> Result<HttpBackend> {
    Ok(HttpBackend::new(
        config.backend.base_url.clone(),
        Duration::from_secs(config.backend.timeout_secs),
    )?)
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = cli.load_config()?;
    let command = cli.command.unwrap_or(Commands::Start);

    let sink = match command {
        Commands::Start if symcheck_ui::is_interactive_terminal() => LogSink::File,
        _ => LogSink::Stderr,
    };
    let _log_guard = init_tracing(&config, sink)?;

    match command {
        Commands::Start => {
            let backend = Arc::new(build_backend(&config)?);
            symcheck_ui::run_wizard(&config, backend).await?;
        }
        Commands::Check {
            age,
            sex,
            symptom,
            answer,
        } => {
            let backend = build_backend(&config)?;
            let mut wizard = WizardController::new();
            let args = CheckArgs {
                age,
                sex,
                symptom,
                answer,
            };
            match run_check(&mut wizard, &backend, &args, &mut io::stderr()).await {
                Ok(insight) => println!("{insight}"),
                Err(err) => {
                    error!(error = %err, "check did not complete");
                    eprintln!("{err}");
                    return Ok(ExitCode::FAILURE);
                }
            }
        }
        Commands::ShowConfig { write } => {
            print!("{}", config.render()?);
            if write {
                config.save_to(&cli.config)?;
                eprintln!("configuration written to {}", cli.config.display());
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}
