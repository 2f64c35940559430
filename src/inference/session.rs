//! ONNX Runtime session construction.

use crate::config::InferenceDevice;
use crate::error::{Error, Result};
use ort::execution_providers::CUDAExecutionProvider;
use ort::session::Session;
use ort::session::builder::GraphOptimizationLevel;
use std::path::Path;
use tracing::{debug, info};

/// Load an ONNX model with the execution provider for `device`.
///
/// `Auto` registers CUDA and silently falls back to CPU; `Cuda` fails when
/// CUDA cannot be registered.
pub fn load_session(path: &Path, device: InferenceDevice) -> Result<Session> {
    if !path.exists() {
        return Err(Error::ModelFileNotFound {
            path: path.to_path_buf(),
        });
    }

    let model_load = |e: ort::Error| Error::ModelLoad {
        path: path.to_path_buf(),
        reason: e.to_string(),
    };

    let builder = Session::builder()
        .map_err(model_load)?
        .with_optimization_level(GraphOptimizationLevel::Level3)
        .map_err(model_load)?;

    let builder = match device {
        InferenceDevice::Cpu => {
            debug!("Requested device: CPU");
            builder
        }
        InferenceDevice::Auto => builder
            .with_execution_providers([CUDAExecutionProvider::default().build()])
            .map_err(model_load)?,
        InferenceDevice::Cuda => builder
            .with_execution_providers([CUDAExecutionProvider::default()
                .build()
                .error_on_failure()])
            .map_err(model_load)?,
    };

    let session = builder.commit_from_file(path).map_err(model_load)?;
    info!("Loaded model {} (device: {device})", path.display());

    Ok(session)
}

/// Name of the first model input, or `fallback` when the model lists none.
pub fn first_input_name(session: &Session, fallback: &str) -> String {
    session
        .inputs
        .first()
        .map_or_else(|| fallback.to_string(), |input| input.name.clone())
}

/// Extract the first output tensor as `(shape, data)`.
pub fn first_output(outputs: &ort::session::SessionOutputs<'_>) -> Result<(Vec<i64>, Vec<f32>)> {
    let (_, output) = outputs.iter().next().ok_or_else(|| Error::Inference {
        reason: "model produced no output".to_string(),
    })?;

    let (shape, data) = output
        .try_extract_tensor::<f32>()
        .map_err(|e: ort::Error| Error::Inference {
            reason: e.to_string(),
        })?;

    Ok((shape.to_vec(), data.to_vec()))
}
