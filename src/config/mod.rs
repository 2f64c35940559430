//! Configuration loading and management.

mod file;
mod paths;
mod types;
mod validate;

pub use file::{load_config_file, load_default_config, save_config, save_default_config};
pub use paths::config_file_path;
pub use types::{
    ClassifierModelConfig, Config, DetectorModelConfig, InferenceConfig, InferenceDevice,
    ModelsConfig, ReferenceImageMode, ReferenceImagesConfig, ServerConfig, TaxonomyConfig,
    TensorLayout,
};
pub use validate::{
    classifier_model, detector_model, validate_classifier_files, validate_config,
    validate_detector_files,
};
