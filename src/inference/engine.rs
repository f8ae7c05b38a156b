//! Classification pipeline
//!
//! Ties the preprocessor, the model host and postprocessing together and
//! keeps running latency counters.

use image::DynamicImage;
use ndarray::Array4;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

use super::postprocess::{self, RankedClass};
use super::InferenceConfig;
use crate::error::Result;
use crate::labels::LabelSet;
use crate::model::{InputShape, ModelHost};
use crate::preprocessing::{self, ImagePreprocessor};

/// Result of classifying one image
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prediction {
    #[serde(rename = "emergency_type")]
    pub label: String,
    pub confidence: f32,
    /// Seconds spent in the model call alone
    pub inference_time: f64,
}

/// Inference statistics snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InferenceStats {
    pub total_predictions: u64,
    pub error_count: u64,
    pub avg_inference_ms: f64,
}

#[derive(Default)]
struct Counters {
    predictions: AtomicU64,
    errors: AtomicU64,
    inference_micros: AtomicU64,
}

/// Image classifier owning an injected model host
pub struct Classifier {
    model: Arc<dyn ModelHost>,
    preprocessor: ImagePreprocessor,
    labels: LabelSet,
    counters: Counters,
}

impl std::fmt::Debug for Classifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Classifier")
            .field("input_shape", &self.model.input_shape())
            .field("labels", &self.labels)
            .finish()
    }
}

impl Classifier {
    pub fn new(model: Arc<dyn ModelHost>, config: &InferenceConfig) -> Self {
        let shape = model.input_shape();
        if let Some(n) = model.output_len() {
            if n != config.labels.len() {
                warn!(
                    output_len = n,
                    labels = config.labels.len(),
                    "Model output length does not match label count, extra indices map to \"unknown\""
                );
            }
        }

        Self {
            preprocessor: ImagePreprocessor::new(shape).with_filter(config.resize_filter),
            model,
            labels: config.labels.clone(),
            counters: Counters::default(),
        }
    }

    pub fn input_shape(&self) -> InputShape {
        self.preprocessor.shape()
    }

    pub fn labels(&self) -> &LabelSet {
        &self.labels
    }

    /// Decode, preprocess, infer and label raw image bytes
    pub fn classify_bytes(&self, bytes: &[u8]) -> Result<Prediction> {
        let image = preprocessing::decode(bytes).inspect_err(|_| self.record_error())?;
        self.classify_image(&image)
    }

    pub fn classify_image(&self, image: &DynamicImage) -> Result<Prediction> {
        let tensor = self.preprocessor.transform(image);
        let (output, inference_time) = self.infer_timed(&tensor)?;
        let top = postprocess::top_class(&output, &self.labels).inspect_err(|_| self.record_error())?;

        debug!(
            label = %top.label,
            index = top.index,
            confidence = top.confidence,
            inference_ms = inference_time * 1000.0,
            "Classified image"
        );

        Ok(Prediction {
            label: top.label,
            confidence: top.confidence,
            inference_time,
        })
    }

    /// The `k` most likely classes for raw image bytes, with the model latency
    pub fn rank_bytes(&self, bytes: &[u8], k: usize) -> Result<(Vec<RankedClass>, f64)> {
        let tensor = self
            .preprocessor
            .process_bytes(bytes)
            .inspect_err(|_| self.record_error())?;
        let (output, inference_time) = self.infer_timed(&tensor)?;
        Ok((postprocess::ranked(&output, &self.labels, k), inference_time))
    }

    /// Run the model, timing only the model call
    fn infer_timed(&self, tensor: &Array4<f32>) -> Result<(Vec<f32>, f64)> {
        let start = Instant::now();
        let result = self.model.infer(tensor);
        let elapsed = start.elapsed();

        match result {
            Ok(output) => {
                self.counters.predictions.fetch_add(1, Ordering::Relaxed);
                self.counters
                    .inference_micros
                    .fetch_add(elapsed.as_micros() as u64, Ordering::Relaxed);
                Ok((output, elapsed.as_secs_f64()))
            }
            Err(e) => {
                self.record_error();
                Err(e)
            }
        }
    }

    fn record_error(&self) {
        self.counters.errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn stats(&self) -> InferenceStats {
        let total = self.counters.predictions.load(Ordering::Relaxed);
        let micros = self.counters.inference_micros.load(Ordering::Relaxed);
        InferenceStats {
            total_predictions: total,
            error_count: self.counters.errors.load(Ordering::Relaxed),
            avg_inference_ms: if total == 0 { 0.0 } else { micros as f64 / total as f64 / 1000.0 },
        }
    }
}
