//! Inference module
//!
//! Runs one uploaded image through the loaded model:
//! - Preprocessing to the model's declared input tensor
//! - A single timed, blocking model call
//! - Argmax postprocessing against the label set
//! - Running prediction and error counters

mod config;
mod engine;
pub mod postprocess;

pub use config::InferenceConfig;
pub use engine::{Classifier, InferenceStats, Prediction};
pub use postprocess::RankedClass;
