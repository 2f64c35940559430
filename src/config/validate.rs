//! Configuration validation.

use crate::config::{ClassifierModelConfig, Config, DetectorModelConfig};
use crate::constants::detection;
use crate::error::{Error, Result};

/// Validate the entire configuration.
///
/// File existence is not checked here; see [`validate_classifier_files`].
pub fn validate_config(config: &Config) -> Result<()> {
    validate_server(config)?;
    validate_models(config)?;

    if config.inference.top_k == 0 {
        return Err(Error::ConfigValidation {
            message: "inference.top_k must be at least 1".to_string(),
        });
    }

    if config.taxonomy.enabled {
        if config.taxonomy.language.trim().is_empty() {
            return Err(Error::ConfigValidation {
                message: "taxonomy.language must not be empty".to_string(),
            });
        }
        if config.taxonomy.timeout_secs == 0 {
            return Err(Error::ConfigValidation {
                message: "taxonomy.timeout_secs must be at least 1".to_string(),
            });
        }
    }

    Ok(())
}

fn validate_server(config: &Config) -> Result<()> {
    let server = &config.server;

    if server.api_key.is_empty() {
        return Err(Error::ConfigValidation {
            message: "server.api_key must not be empty".to_string(),
        });
    }

    if server.body_limit_bytes == 0 {
        return Err(Error::ConfigValidation {
            message: "server.body_limit_bytes must be greater than 0".to_string(),
        });
    }

    Ok(())
}

fn validate_models(config: &Config) -> Result<()> {
    for (role, model) in [
        ("flower", config.models.flower.as_ref()),
        ("insect", config.models.insect.as_ref()),
    ] {
        if let Some(model) = model
            && model.input_size == 0
        {
            return Err(Error::ConfigValidation {
                message: format!("models.{role}.input_size must be greater than 0"),
            });
        }
    }

    if let Some(detector) = &config.models.detector {
        if detector.input_size == 0 {
            return Err(Error::ConfigValidation {
                message: "models.detector.input_size must be greater than 0".to_string(),
            });
        }

        for (name, value) in [
            ("confidence", detector.confidence),
            ("overlap", detector.overlap),
        ] {
            if value > detection::MAX_PERCENT {
                return Err(Error::ConfigValidation {
                    message: format!(
                        "models.detector.{name} must be between 0 and {}, got {value}",
                        detection::MAX_PERCENT
                    ),
                });
            }
        }
    }

    Ok(())
}

/// Check that a classifier's model and labels files exist.
pub fn validate_classifier_files(model: &ClassifierModelConfig) -> Result<()> {
    if !model.path.exists() {
        return Err(Error::ModelFileNotFound {
            path: model.path.clone(),
        });
    }

    if !model.labels.exists() {
        return Err(Error::LabelsFileNotFound {
            path: model.labels.clone(),
        });
    }

    Ok(())
}

/// Check that the detector's model file exists.
pub fn validate_detector_files(model: &DetectorModelConfig) -> Result<()> {
    if !model.path.exists() {
        return Err(Error::ModelFileNotFound {
            path: model.path.clone(),
        });
    }
    Ok(())
}

/// Get a configured classifier by role (`flower` or `insect`).
pub fn classifier_model<'a>(config: &'a Config, role: &str) -> Result<&'a ClassifierModelConfig> {
    let model = match role {
        "flower" => config.models.flower.as_ref(),
        "insect" => config.models.insect.as_ref(),
        _ => None,
    };
    model.ok_or_else(|| Error::ModelNotFound {
        name: role.to_string(),
    })
}

/// Get the configured detector.
pub fn detector_model(config: &Config) -> Result<&DetectorModelConfig> {
    config
        .models
        .detector
        .as_ref()
        .ok_or_else(|| Error::ModelNotFound {
            name: "detector".to_string(),
        })
}
