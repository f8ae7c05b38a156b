//! Model host module
//!
//! Owns the opaque classification model and its fixed tensor shapes:
//! - [`ModelHost`] trait, the single inference capability the server depends on
//! - [`InputShape`] / [`TensorLayout`] describing the declared input tensor
//! - [`TractModel`], the ONNX backend built on `tract-onnx`

mod tract;

pub use tract::TractModel;

use ndarray::Array4;
use serde::Serialize;
use std::fmt;

use crate::error::{ClassifierError, Result};

/// Axis order of the model's 4-D input tensor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TensorLayout {
    /// (batch, height, width, channels), as exported from TensorFlow
    Nhwc,
    /// (batch, channels, height, width), as exported from PyTorch
    Nchw,
}

impl fmt::Display for TensorLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TensorLayout::Nhwc => write!(f, "NHWC"),
            TensorLayout::Nchw => write!(f, "NCHW"),
        }
    }
}

/// Input shape declared by the model, without the batch dimension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct InputShape {
    pub height: usize,
    pub width: usize,
    pub channels: usize,
    pub layout: TensorLayout,
}

impl InputShape {
    /// Channel-last shape, the layout of the source model
    pub fn nhwc(height: usize, width: usize, channels: usize) -> Self {
        Self { height, width, channels, layout: TensorLayout::Nhwc }
    }

    pub fn nchw(height: usize, width: usize, channels: usize) -> Self {
        Self { height, width, channels, layout: TensorLayout::Nchw }
    }

    /// Derive the shape from a declared 4-D input `[batch, d1, d2, d3]`.
    ///
    /// Channels-last wins when both readings are possible. Only grayscale
    /// (1) and color (3) channel counts are accepted.
    pub fn from_declared(dims: &[usize]) -> Result<Self> {
        let shape = match dims {
            [_, h, w, c] if is_channel_count(*c) => Self::nhwc(*h, *w, *c),
            [_, c, h, w] if is_channel_count(*c) => Self::nchw(*h, *w, *c),
            [_, _, _, _] => {
                return Err(ClassifierError::ModelLoad(format!(
                    "unsupported channel count in input shape {:?}, expected 1 or 3 channels",
                    dims
                )))
            }
            _ => {
                return Err(ClassifierError::ModelLoad(format!(
                    "expected a 4-D image input, model declares {:?}",
                    dims
                )))
            }
        };
        if shape.height == 0 || shape.width == 0 {
            return Err(ClassifierError::ModelLoad(format!(
                "input shape {:?} has an empty spatial dimension",
                dims
            )));
        }
        Ok(shape)
    }

    /// Full tensor shape with batch dimension 1 prepended
    pub fn batch_dims(&self) -> [usize; 4] {
        match self.layout {
            TensorLayout::Nhwc => [1, self.height, self.width, self.channels],
            TensorLayout::Nchw => [1, self.channels, self.height, self.width],
        }
    }
}

impl fmt::Display for InputShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} ({})", self.batch_dims(), self.layout)
    }
}

fn is_channel_count(c: usize) -> bool {
    c == 1 || c == 3
}

/// A loaded model exposing one blocking inference call.
///
/// Implementations are read-only after construction and shared between
/// requests behind an `Arc`.
pub trait ModelHost: Send + Sync {
    /// Declared input shape, fixed for the lifetime of the host
    fn input_shape(&self) -> InputShape;

    /// Length of the output vector when the model declares it statically
    fn output_len(&self) -> Option<usize> {
        None
    }

    /// Run one forward pass. `input` must have shape [`InputShape::batch_dims`].
    fn infer(&self, input: &Array4<f32>) -> Result<Vec<f32>>;
}

/// Reject tensors whose shape differs from the declared one
pub fn check_input(shape: &InputShape, input: &Array4<f32>) -> Result<()> {
    let expected = shape.batch_dims();
    if input.shape() != &expected[..] {
        return Err(ClassifierError::Shape {
            expected: format!("{:?}", expected),
            actual: format!("{:?}", input.shape()),
        });
    }
    Ok(())
}
