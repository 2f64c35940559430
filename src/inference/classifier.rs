//! ONNX species classifier.

use super::labels::LabelSet;
use super::session::{first_input_name, first_output, load_session};
use super::{RankedLabel, SpeciesClassifier};
use crate::config::{ClassifierModelConfig, InferenceDevice, TensorLayout};
use crate::error::{Error, Result};
use image::DynamicImage;
use image::imageops::FilterType;
use ndarray::Array4;
use ort::session::Session;
use std::sync::Mutex;
use tracing::{debug, info};

/// Image classifier backed by an ONNX model and a labels file.
pub struct OnnxClassifier {
    name: String,
    session: Mutex<Session>,
    input_name: String,
    labels: LabelSet,
    input_size: u32,
    layout: TensorLayout,
    top_k: usize,
}

impl std::fmt::Debug for OnnxClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OnnxClassifier")
            .field("name", &self.name)
            .field("labels", &self.labels.count())
            .field("input_size", &self.input_size)
            .field("layout", &self.layout)
            .finish_non_exhaustive()
    }
}

impl OnnxClassifier {
    /// Load a classifier from its model configuration.
    ///
    /// Runs the model once on a blank input and fails with
    /// [`Error::LabelsMismatch`] when its class count differs from the
    /// labels file.
    pub fn from_config(
        name: &str,
        config: &ClassifierModelConfig,
        device: InferenceDevice,
        top_k: usize,
    ) -> Result<Self> {
        let labels = LabelSet::load(&config.labels)?;
        let mut session = load_session(&config.path, device)?;
        let input_name = first_input_name(&session, "input");

        let side = config.input_size as usize;
        let blank = match config.layout {
            TensorLayout::Nhwc => Array4::<f32>::zeros((1, side, side, 3)),
            TensorLayout::Nchw => Array4::<f32>::zeros((1, 3, side, side)),
        };
        let classes = run_scores(&mut session, &input_name, &blank)?.len();
        labels.ensure_class_count(classes)?;

        info!(
            "Loaded {name} classifier: {classes} classes, {}x{} input",
            config.input_size, config.input_size
        );

        Ok(Self {
            name: name.to_string(),
            session: Mutex::new(session),
            input_name,
            labels,
            input_size: config.input_size,
            layout: config.layout,
            top_k,
        })
    }
}

impl SpeciesClassifier for OnnxClassifier {
    fn classify(&self, image: &DynamicImage) -> Result<Vec<RankedLabel>> {
        let input = preprocess(image, self.input_size, self.layout);

        let mut session = self.session.lock().map_err(|_| Error::Internal {
            message: format!("{} classifier session lock poisoned", self.name),
        })?;
        let scores = run_scores(&mut session, &self.input_name, &input)?;

        self.labels.rank(&scores, self.top_k)
    }
}

/// Run one input through the model and return the first output as flat scores.
fn run_scores(session: &mut Session, input_name: &str, input: &Array4<f32>) -> Result<Vec<f32>> {
    let input_ref =
        ort::value::TensorRef::from_array_view(input).map_err(|e| Error::Inference {
            reason: e.to_string(),
        })?;

    let outputs = session
        .run(ort::inputs![input_name => input_ref])
        .map_err(|e| Error::Inference {
            reason: e.to_string(),
        })?;

    let (shape, scores) = first_output(&outputs)?;
    debug!("Classifier output shape: {shape:?}");

    Ok(scores)
}

/// Resize to a square RGB tensor scaled to `[0, 1]`.
#[allow(clippy::cast_precision_loss)]
pub(super) fn preprocess(image: &DynamicImage, size: u32, layout: TensorLayout) -> Array4<f32> {
    let rgb = image.resize_exact(size, size, FilterType::Triangle).to_rgb8();
    let side = size as usize;

    let mut tensor = match layout {
        TensorLayout::Nhwc => Array4::<f32>::zeros((1, side, side, 3)),
        TensorLayout::Nchw => Array4::<f32>::zeros((1, 3, side, side)),
    };

    for (x, y, pixel) in rgb.enumerate_pixels() {
        let (x, y) = (x as usize, y as usize);
        for (c, &value) in pixel.0.iter().enumerate() {
            let value = f32::from(value) / 255.0;
            match layout {
                TensorLayout::Nhwc => tensor[[0, y, x, c]] = value,
                TensorLayout::Nchw => tensor[[0, c, y, x]] = value,
            }
        }
    }

    tensor
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use crate::config::ClassifierModelConfig;
    use image::{Rgb, RgbImage};
    use std::path::PathBuf;

    fn red_image() -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_pixel(8, 6, Rgb([255, 0, 51])))
    }

    #[test]
    fn test_preprocess_nhwc() {
        let tensor = preprocess(&red_image(), 4, TensorLayout::Nhwc);
        assert_eq!(tensor.shape(), &[1, 4, 4, 3]);
        assert_eq!(tensor[[0, 2, 3, 0]], 1.0);
        assert_eq!(tensor[[0, 2, 3, 1]], 0.0);
        assert_eq!(tensor[[0, 2, 3, 2]], 0.2);
    }

    #[test]
    fn test_preprocess_nchw() {
        let tensor = preprocess(&red_image(), 4, TensorLayout::Nchw);
        assert_eq!(tensor.shape(), &[1, 3, 4, 4]);
        assert_eq!(tensor[[0, 0, 1, 1]], 1.0);
        assert_eq!(tensor[[0, 2, 1, 1]], 0.2);
    }

    #[test]
    fn test_missing_labels_file() {
        let config = ClassifierModelConfig {
            path: PathBuf::from("/nonexistent/model.onnx"),
            labels: PathBuf::from("/nonexistent/labels.txt"),
            input_size: 224,
            layout: TensorLayout::Nhwc,
        };
        let result = OnnxClassifier::from_config("flower", &config, InferenceDevice::Cpu, 5);
        assert!(matches!(result, Err(Error::LabelsFileNotFound { .. })));
    }
}
