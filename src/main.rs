//! Emergency Classifier - Main Entry Point
//!
//! Serves the classification API by default; see `--help` for offline commands.

use clap::Parser;
use emergency_classifier::cli::{cmd_classify, cmd_info, cmd_serve, serve_config, Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "emergency_classifier=info,tower_http=info".into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Serve { host, port, model, labels }) => {
            cmd_serve(serve_config(host, port, model, labels.as_deref())?).await?;
        }
        Some(Commands::Classify { model, images, top_k, labels }) => {
            cmd_classify(&model, &images, top_k, labels.as_deref())?;
        }
        Some(Commands::Info { model, labels }) => {
            cmd_info(&model, labels.as_deref())?;
        }
        None => {
            cmd_serve(serve_config(None, None, None, None)?).await?;
        }
    }

    Ok(())
}
