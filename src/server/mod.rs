//! Emergency Classifier Server Module
//!
//! HTTP wrapper around the loaded model: an HTML description page, the
//! multipart prediction endpoint and a health endpoint.

mod api;
mod error;
mod handlers;
mod state;

pub use api::create_router;
pub use error::{ServerError, NO_IMAGE_MESSAGE};
pub use handlers::IMAGE_FIELD;
pub use state::AppState;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

use crate::error::{ClassifierError, Result};
use crate::labels::LabelSet;
use crate::model::{ModelHost, TractModel};

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub model_path: PathBuf,
    pub labels: LabelSet,
    pub max_upload_size: usize,
    pub max_concurrent_inferences: usize,
    /// Single allowed CORS origin, all origins when unset
    pub cors_origin: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            model_path: PathBuf::from("model.onnx"),
            labels: LabelSet::default(),
            max_upload_size: 16 * 1024 * 1024, // 16MB
            max_concurrent_inferences: 1,
            cors_origin: None,
        }
    }
}

impl ServerConfig {
    /// Defaults overridden by `API_HOST`, `API_PORT`, `MODEL_PATH`,
    /// `CLASS_LABELS`, `MAX_UPLOAD_SIZE`, `MAX_CONCURRENT_INFERENCES` and
    /// `CORS_ORIGIN`
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(host) = std::env::var("API_HOST") {
            config.host = host;
        }
        if let Some(port) = parse_env("API_PORT")? {
            config.port = port;
        }
        if let Ok(path) = std::env::var("MODEL_PATH") {
            config.model_path = PathBuf::from(path);
        }
        if let Ok(list) = std::env::var("CLASS_LABELS") {
            config.labels = LabelSet::parse(&list)?;
        }
        if let Some(size) = parse_env("MAX_UPLOAD_SIZE")? {
            config.max_upload_size = size;
        }
        if let Some(n) = parse_env::<usize>("MAX_CONCURRENT_INFERENCES")? {
            config.max_concurrent_inferences = n.max(1);
        }
        config.cors_origin = std::env::var("CORS_ORIGIN").ok();

        Ok(config)
    }
}

fn parse_env<T: std::str::FromStr>(key: &str) -> Result<Option<T>> {
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ClassifierError::Config(format!("{} has invalid value {:?}", key, raw))),
        Err(_) => Ok(None),
    }
}

/// Load the model, then serve until ctrl+c
pub async fn run_server(config: ServerConfig) -> anyhow::Result<()> {
    let start_time = chrono::Utc::now();
    info!(
        model = %config.model_path.display(),
        started_at = %start_time.to_rfc3339(),
        "Loading model"
    );

    let model_path = config.model_path.clone();
    let model = tokio::task::spawn_blocking(move || TractModel::load(model_path)).await??;
    info!(
        input_shape = %model.input_shape(),
        labels = ?config.labels.iter().collect::<Vec<_>>(),
        "Model ready"
    );

    let state = Arc::new(AppState::new(config.clone(), Arc::new(model)));
    let app = create_router(state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    info!(
        address = %addr,
        max_upload_size_mb = config.max_upload_size / 1024 / 1024,
        max_concurrent_inferences = config.max_concurrent_inferences,
        "Emergency Classification API starting"
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(address = %addr, pid = std::process::id(), "Server listening and ready to accept connections");

    let shutdown_signal = async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to install ctrl+c handler, shutdown only by termination");
            std::future::pending::<()>().await;
        }
        let stop_time = chrono::Utc::now();
        let uptime = stop_time.signed_duration_since(start_time);
        info!(
            stopped_at = %stop_time.to_rfc3339(),
            uptime_secs = uptime.num_seconds(),
            "Shutdown signal received, stopping server gracefully"
        );
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await?;

    info!("Server shut down cleanly");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.port, 5000);
        assert_eq!(config.max_upload_size, 16 * 1024 * 1024);
        assert_eq!(config.labels.len(), 4);
        assert!(config.cors_origin.is_none());
    }

    #[test]
    fn test_parse_env_rejects_garbage() {
        std::env::set_var("EMERGENCY_TEST_BAD_PORT", "eighty");
        let err = parse_env::<u16>("EMERGENCY_TEST_BAD_PORT").unwrap_err();
        assert!(matches!(err, ClassifierError::Config(_)));
        std::env::remove_var("EMERGENCY_TEST_BAD_PORT");

        assert!(parse_env::<u16>("EMERGENCY_TEST_UNSET_PORT").unwrap().is_none());
    }
}
