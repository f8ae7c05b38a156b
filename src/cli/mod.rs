//! Emergency Classifier CLI Module
//!
//! Command-line interface for serving the API and classifying local files.

use clap::{Parser, Subcommand};
use colored::*;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::inference::{Classifier, InferenceConfig};
use crate::labels::LabelSet;
use crate::model::{ModelHost, TractModel};
use crate::server::{run_server, ServerConfig};

// ─── Styling helpers ───────────────────────────────────────────────────────────

fn dim(s: &str) -> ColoredString    { s.truecolor(100, 100, 100) }
fn accent(s: &str) -> ColoredString { s.truecolor(120, 170, 255) }
fn muted(s: &str) -> ColoredString  { s.truecolor(140, 140, 140) }
fn ok(s: &str) -> ColoredString     { s.truecolor(100, 210, 120) }
fn fail(s: &str) -> ColoredString   { s.truecolor(235, 90, 90) }

fn kv(key: &str, val: &str) -> String {
    format!("{} {}", muted(key), val.white())
}

fn section(title: &str) {
    println!();
    println!("  {}", title.white().bold());
    println!("  {}", dim(&"─".repeat(56)));
}

// ─── CLI definition ────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "emergency-classifier")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Classify emergency scenes in images with a pre-trained model")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP API
    Serve {
        /// Host to bind
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,

        /// ONNX model file
        #[arg(short, long)]
        model: Option<PathBuf>,

        /// Comma-separated class labels in model output order
        #[arg(long)]
        labels: Option<String>,
    },

    /// Classify local image files
    Classify {
        /// ONNX model file
        #[arg(short, long)]
        model: PathBuf,

        /// Images to classify
        #[arg(required = true)]
        images: Vec<PathBuf>,

        /// Show the k most likely classes instead of only the best one
        #[arg(short = 'k', long, default_value = "1")]
        top_k: usize,

        /// Comma-separated class labels in model output order
        #[arg(long)]
        labels: Option<String>,
    },

    /// Show the model input shape and label set
    Info {
        /// ONNX model file
        #[arg(short, long)]
        model: PathBuf,

        /// Comma-separated class labels in model output order
        #[arg(long)]
        labels: Option<String>,
    },
}

fn resolve_labels(labels: Option<&str>) -> anyhow::Result<LabelSet> {
    Ok(match labels {
        Some(list) => LabelSet::parse(list)?,
        None => LabelSet::default(),
    })
}

/// Build the server configuration: environment first, flags on top
pub fn serve_config(
    host: Option<String>,
    port: Option<u16>,
    model: Option<PathBuf>,
    labels: Option<&str>,
) -> anyhow::Result<ServerConfig> {
    let mut config = ServerConfig::from_env()?;
    if let Some(host) = host {
        config.host = host;
    }
    if let Some(port) = port {
        config.port = port;
    }
    if let Some(model) = model {
        config.model_path = model;
    }
    if let Some(list) = labels {
        config.labels = LabelSet::parse(list)?;
    }
    Ok(config)
}

pub async fn cmd_serve(config: ServerConfig) -> anyhow::Result<()> {
    println!();
    println!("  {}", "Emergency Classification API".white().bold());
    println!("  {}", dim(&format!("v{}", env!("CARGO_PKG_VERSION"))));
    println!();
    println!("  {}", kv("Predict", &format!("POST http://{}:{}/predict", config.host, config.port)));
    println!("  {}", kv("Health ", &format!("GET  http://{}:{}/health", config.host, config.port)));
    println!("  {}", kv("Model  ", &config.model_path.display().to_string()));
    println!();
    println!("  {}", dim("ctrl+c to stop"));
    println!();

    run_server(config).await
}

pub fn cmd_classify(model: &Path, images: &[PathBuf], top_k: usize, labels: Option<&str>) -> anyhow::Result<()> {
    let labels = resolve_labels(labels)?;
    let model = TractModel::load(model)?;
    let classifier = Classifier::new(Arc::new(model), &InferenceConfig::new().with_labels(labels));

    section("Predictions");
    let mut failures = 0usize;
    for path in images {
        let name = path.display().to_string();
        let result = std::fs::read(path)
            .map_err(anyhow::Error::from)
            .and_then(|bytes| Ok(classifier.rank_bytes(&bytes, top_k.max(1))?));

        match result {
            Ok((ranked, inference_time)) => {
                println!(
                    "  {} {} {}",
                    ok("✓"),
                    name,
                    dim(&format!("{:.1} ms", inference_time * 1000.0))
                );
                for class in ranked {
                    println!(
                        "      {} {:<16} {}",
                        accent("›"),
                        class.label,
                        format!("{:.4}", class.confidence).white()
                    );
                }
            }
            Err(e) => {
                failures += 1;
                println!("  {} {} {}", fail("✗"), name, dim(&e.to_string()));
            }
        }
    }
    println!();

    if failures > 0 {
        anyhow::bail!("{} of {} images could not be classified", failures, images.len());
    }
    Ok(())
}

pub fn cmd_info(model: &Path, labels: Option<&str>) -> anyhow::Result<()> {
    let labels = resolve_labels(labels)?;
    let host = TractModel::load(model)?;
    let shape = host.input_shape();

    section("Model");
    println!("  {}", kv("Path        ", &host.path().display().to_string()));
    println!("  {}", kv("Input shape ", &format!("{:?}", shape.batch_dims())));
    println!("  {}", kv("Layout      ", &shape.layout.to_string()));
    let outputs = host
        .output_len()
        .map(|n| n.to_string())
        .unwrap_or_else(|| "dynamic".to_string());
    println!("  {}", kv("Outputs     ", &outputs));

    section("Labels");
    for (i, label) in labels.iter().enumerate() {
        println!("  {} {}", dim(&format!("{:>2}", i)), label);
    }
    if host.output_len().is_some_and(|n| n != labels.len()) {
        println!();
        println!("  {}", fail("output length does not match label count"));
    }
    println!();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_classify_command() {
        let cli = Cli::try_parse_from([
            "emergency-classifier", "classify", "-m", "model.onnx", "-k", "3", "a.jpg", "b.png",
        ])
        .unwrap();
        match cli.command {
            Some(Commands::Classify { model, images, top_k, labels }) => {
                assert_eq!(model, PathBuf::from("model.onnx"));
                assert_eq!(images.len(), 2);
                assert_eq!(top_k, 3);
                assert!(labels.is_none());
            }
            _ => panic!("expected classify command"),
        }
    }

    #[test]
    fn test_classify_requires_images() {
        assert!(Cli::try_parse_from(["emergency-classifier", "classify", "-m", "model.onnx"]).is_err());
    }

    #[test]
    fn test_no_subcommand_is_allowed() {
        let cli = Cli::try_parse_from(["emergency-classifier"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_flags_override_config() {
        let config = serve_config(
            Some("127.0.0.1".to_string()),
            Some(8081),
            Some(PathBuf::from("other.onnx")),
            Some("a,b,c"),
        )
        .unwrap();
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 8081);
        assert_eq!(config.model_path, PathBuf::from("other.onnx"));
        assert_eq!(config.labels.len(), 3);
    }
}
