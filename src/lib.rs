//! Emergency Classifier - image classification behind a small HTTP API
//!
//! Loads a pre-trained model once, then classifies uploaded photos of
//! emergency situations (blood loss, burns, fainting, poisoning).
//!
//! # Modules
//!
//! - [`model`] - Model host trait and the ONNX backend
//! - [`preprocessing`] - Image decoding, resizing and normalization
//! - [`inference`] - Classification pipeline and postprocessing
//! - [`labels`] - Label set mapping output indices to class names
//! - [`server`] - HTTP server with the prediction endpoint
//! - [`cli`] - Command-line interface

// Core error handling
pub mod error;

// Classification
pub mod labels;
pub mod model;
pub mod preprocessing;
pub mod inference;

// Services
pub mod server;
pub mod cli;

pub use error::{ClassifierError, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::error::{ClassifierError, Result};
    pub use crate::inference::{Classifier, InferenceConfig, InferenceStats, Prediction, RankedClass};
    pub use crate::labels::{LabelSet, DEFAULT_LABELS, UNKNOWN_LABEL};
    pub use crate::model::{InputShape, ModelHost, TensorLayout, TractModel};
    pub use crate::preprocessing::ImagePreprocessor;
    pub use crate::server::{AppState, ServerConfig, create_router};
}
