//! Application state management

use axum::body::Bytes;
use std::sync::Arc;
use tokio::sync::Semaphore;

use crate::error::ClassifierError;
use crate::inference::{Classifier, InferenceConfig, Prediction};
use crate::model::ModelHost;

use super::ServerConfig;

/// Application state shared across handlers
pub struct AppState {
    pub config: ServerConfig,
    pub classifier: Classifier,
    pub started_at: chrono::DateTime<chrono::Utc>,
    /// Bounds how many model calls run at once. A permit is held by the
    /// blocking task itself, so it outlives a dropped request future.
    inference_slots: Arc<Semaphore>,
}

impl AppState {
    /// Build the state around an already loaded model
    pub fn new(config: ServerConfig, model: Arc<dyn ModelHost>) -> Self {
        let inference_config = InferenceConfig::new()
            .with_labels(config.labels.clone())
            .with_max_concurrent(config.max_concurrent_inferences);

        Self {
            classifier: Classifier::new(model, &inference_config),
            inference_slots: Arc::new(Semaphore::new(inference_config.max_concurrent)),
            started_at: chrono::Utc::now(),
            config,
        }
    }

    /// Classify uploaded bytes on the blocking pool, waiting for a free
    /// inference slot first
    pub async fn classify(self: &Arc<Self>, bytes: Bytes) -> Result<Prediction, ClassifierError> {
        let permit = Arc::clone(&self.inference_slots)
            .acquire_owned()
            .await
            .map_err(|e| ClassifierError::Inference(e.to_string()))?;

        let state = Arc::clone(self);
        tokio::task::spawn_blocking(move || {
            let _permit = permit;
            state.classifier.classify_bytes(&bytes)
        })
        .await
            .map_err(|e| ClassifierError::Inference(format!("inference task failed: {}", e)))?
    }

    pub fn uptime_secs(&self) -> i64 {
        chrono::Utc::now()
            .signed_duration_since(self.started_at)
            .num_seconds()
    }
}
