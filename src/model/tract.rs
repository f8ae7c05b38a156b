//! ONNX model host backed by `tract-onnx`

use ndarray::Array4;
use std::fmt;
use std::path::{Path, PathBuf};
use tract_onnx::prelude::*;
use tract_onnx::tract_hir::internal::DimLike;
use tracing::{debug, info};

use super::{check_input, InputShape, ModelHost};
use crate::error::{ClassifierError, Result};

type Plan = TypedRunnableModel<TypedModel>;

/// Optimized, runnable ONNX model with a concrete batch-1 input
pub struct TractModel {
    path: PathBuf,
    shape: InputShape,
    output_len: Option<usize>,
    plan: Plan,
}

impl fmt::Debug for TractModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TractModel")
            .field("path", &self.path)
            .field("shape", &self.shape)
            .field("output_len", &self.output_len)
            .finish()
    }
}

fn load_err(path: &Path) -> impl Fn(TractError) -> ClassifierError + '_ {
    move |e| ClassifierError::ModelLoad(format!("{}: {:#}", path.display(), e))
}

fn inference_err(e: TractError) -> ClassifierError {
    ClassifierError::Inference(format!("{:#}", e))
}

impl TractModel {
    /// Load and optimize the model at `path`.
    ///
    /// The declared input shape is read from the graph. A symbolic batch
    /// dimension is pinned to 1; symbolic spatial dimensions are rejected.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(ClassifierError::ModelLoad(format!(
                "model file not found at {}",
                path.display()
            )));
        }
        let bytes = std::fs::read(path).map_err(|e| {
            ClassifierError::ModelLoad(format!("{}: {}", path.display(), e))
        })?;

        let typed = tract_onnx::onnx()
            .model_for_read(&mut bytes.as_slice())
            .and_then(|m| m.into_typed())
            .map_err(load_err(path))?;
        let shape = InputShape::from_declared(&declared_input_dims(&typed)?)?;
        debug!(model = %path.display(), shape = %shape, "Declared model input");

        let plan = tract_onnx::onnx()
            .model_for_read(&mut bytes.as_slice())
            .and_then(|m| m.with_input_fact(0, f32::fact(shape.batch_dims()).into()))
            .and_then(|m| m.into_optimized())
            .and_then(|m| m.into_runnable())
            .map_err(load_err(path))?;

        let output_len: Option<usize> = plan
            .model()
            .output_fact(0)
            .ok()
            .and_then(|fact| fact.shape.as_concrete().map(|dims| dims.iter().product()));

        info!(
            model = %path.display(),
            input_shape = %shape,
            output_len = ?output_len,
            "Model loaded"
        );

        Ok(Self {
            path: path.to_path_buf(),
            shape,
            output_len,
            plan,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn declared_input_dims(model: &TypedModel) -> Result<Vec<usize>> {
    let fact = model
        .input_fact(0)
        .map_err(|e| ClassifierError::ModelLoad(format!("model has no input: {:#}", e)))?;

    fact.shape
        .iter()
        .enumerate()
        .map(|(axis, dim)| match dim.to_usize() {
            Ok(n) => Ok(n),
            // symbolic batch axis, pinned to 1 when the plan is built
            Err(_) if axis == 0 => Ok(1),
            Err(_) => Err(ClassifierError::ModelLoad(format!(
                "input axis {} has symbolic size {}, a fixed image size is required",
                axis, dim
            ))),
        })
        .collect()
}

impl ModelHost for TractModel {
    fn input_shape(&self) -> InputShape {
        self.shape
    }

    fn output_len(&self) -> Option<usize> {
        self.output_len
    }

    fn infer(&self, input: &Array4<f32>) -> Result<Vec<f32>> {
        check_input(&self.shape, input)?;
        let data = input
            .as_slice()
            .ok_or_else(|| ClassifierError::Inference("input tensor is not contiguous".to_string()))?;

        let tensor = Tensor::from_shape(&self.shape.batch_dims(), data).map_err(inference_err)?;
        let outputs = self.plan.run(tvec!(tensor.into())).map_err(inference_err)?;
        let output = outputs
            .first()
            .ok_or_else(|| ClassifierError::Inference("model produced no outputs".to_string()))?;

        let values = output.to_array_view::<f32>().map_err(inference_err)?;
        Ok(values.iter().copied().collect())
    }
}
