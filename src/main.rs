//! tldw CLI entry point.

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tldw::cli::{commands, Cli, Commands};
use tldw::config::Settings;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config_path = cli.config.as_ref().map(PathBuf::from);
    let settings = Settings::load_from(config_path.as_ref())?;

    // Initialize logging
    let log_level = cli.log_level(&settings.general.log_level);

    tracing_subscriber::registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("tldw={}", log_level)),
        ))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    std::fs::create_dir_all(settings.data_dir())?;

    match &cli.command {
        Commands::Summarize {
            source,
            session,
            no_wait,
        } => {
            commands::run_summarize(source, session.clone(), *no_wait, settings).await?;
        }

        Commands::Questions { source, raw } => {
            commands::run_questions(source, *raw, settings).await?;
        }

        Commands::Ask {
            question,
            source,
            session,
            show_context,
        } => {
            commands::run_ask(question, source.clone(), session.clone(), *show_context, settings)
                .await?;
        }

        Commands::Transcript { url, json } => {
            commands::run_transcript(url, *json, settings).await?;
        }

        Commands::Sessions => {
            commands::run_sessions(settings).await?;
        }

        Commands::Serve { host, port } => {
            commands::run_serve(host, *port, settings).await?;
        }

        Commands::Doctor => {
            commands::run_doctor(&settings).await?;
        }

        Commands::Config { action } => {
            commands::run_config(action, config_path, settings)?;
        }
    }

    Ok(())
}
