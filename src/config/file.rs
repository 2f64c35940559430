//! Configuration file loading and saving.

use crate::config::Config;
use crate::error::{Error, Result};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Load configuration from a TOML file.
///
/// A missing file yields the defaults. Relative model, labels and reference
/// photo paths are resolved against the directory holding the file.
pub fn load_config_file(path: &Path) -> Result<Config> {
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Config::default()),
        Err(e) => {
            return Err(Error::ConfigRead {
                path: path.to_path_buf(),
                source: e,
            });
        }
    };

    let mut config: Config = toml::from_str(&contents).map_err(|e| Error::ConfigParse {
        path: path.to_path_buf(),
        source: e,
    })?;

    if let Some(base) = path.parent() {
        anchor_paths(&mut config, base);
    }
    Ok(config)
}

/// Load configuration from [`super::config_file_path`].
///
/// Falls back to the defaults when no config location can be determined.
pub fn load_default_config() -> Result<Config> {
    match super::config_file_path() {
        Ok(path) => load_config_file(&path),
        Err(Error::ConfigDirNotFound) => Ok(Config::default()),
        Err(e) => Err(e),
    }
}

/// Save configuration to a TOML file.
///
/// Parent directories are created. The file is written to a sibling temp
/// file first and renamed into place, so readers never see a partial file.
pub fn save_config(config: &Config, path: &Path) -> Result<()> {
    let write_error = |source: std::io::Error| Error::ConfigWrite {
        path: path.to_path_buf(),
        source,
    };

    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(dir).map_err(write_error)?;

    let contents = toml::to_string_pretty(config).map_err(|e| Error::ConfigSerialize { source: e })?;

    let mut temp = NamedTempFile::new_in(dir).map_err(write_error)?;
    temp.write_all(contents.as_bytes()).map_err(write_error)?;
    temp.persist(path).map_err(|e| write_error(e.error))?;
    Ok(())
}

/// Save configuration to [`super::config_file_path`], returning the path.
pub fn save_default_config(config: &Config) -> Result<PathBuf> {
    let path = super::config_file_path()?;
    save_config(config, &path)?;
    Ok(path)
}

fn anchor_paths(config: &mut Config, base: &Path) {
    let anchor = |path: &mut PathBuf| {
        if path.is_relative() {
            *path = base.join(&*path);
        }
    };

    for model in [&mut config.models.flower, &mut config.models.insect]
        .into_iter()
        .flatten()
    {
        anchor(&mut model.path);
        anchor(&mut model.labels);
    }
    if let Some(detector) = &mut config.models.detector {
        anchor(&mut detector.path);
    }
    for dir in [
        &mut config.reference_images.plant_dir,
        &mut config.reference_images.insect_dir,
    ]
    .into_iter()
    .flatten()
    {
        anchor(dir);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::{ReferenceImageMode, TensorLayout};
    use tempfile::{NamedTempFile, TempDir};

    #[test]
    fn test_load_nonexistent_file_returns_default() {
        let config = load_config_file(Path::new("/nonexistent/path/config.toml")).unwrap();
        assert!(config.models.flower.is_none());
        assert_eq!(config.server.port, 8000);
    }

    #[test]
    fn test_load_valid_config() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[server]
port = 9100
api_key = "secret"

[models.flower]
path = "/models/flowers.onnx"
labels = "/models/flowers.txt"

[models.insect]
path = "/models/insects.onnx"
labels = "/models/insects.txt"
input_size = 299
layout = "nchw"

[models.detector]
path = "/models/detector.onnx"
confidence = 60

[taxonomy]
language = "eng"

[reference_images]
plant_dir = "/srv/plants"
mode = "base64"
"#
        )
        .unwrap();

        let config = load_config_file(file.path()).unwrap();
        assert_eq!(config.server.port, 9100);
        assert_eq!(config.server.api_key, "secret");
        assert_eq!(config.server.host, "127.0.0.1");

        let flower = config.models.flower.unwrap();
        assert_eq!(flower.input_size, 224);
        assert_eq!(flower.layout, TensorLayout::Nhwc);

        let insect = config.models.insect.unwrap();
        assert_eq!(insect.input_size, 299);
        assert_eq!(insect.layout, TensorLayout::Nchw);

        let detector = config.models.detector.unwrap();
        assert_eq!(detector.confidence, 60);
        assert_eq!(detector.overlap, 40);
        assert_eq!(detector.input_size, 640);

        assert_eq!(config.taxonomy.language, "eng");
        assert!(config.taxonomy.enabled);
        assert_eq!(config.reference_images.mode, ReferenceImageMode::Base64);
        assert!(config.reference_images.insect_dir.is_none());
    }

    #[test]
    fn test_load_invalid_toml_returns_error() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "this is not valid toml {{{{").unwrap();

        let result = load_config_file(file.path());
        assert!(matches!(result, Err(Error::ConfigParse { .. })));
    }

    #[test]
    fn test_relative_paths_resolve_against_config_dir() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
[models.flower]
path = "models/flowers.onnx"
labels = "/shared/flowers.txt"

[models.detector]
path = "detector.onnx"

[reference_images]
insect_dir = "photos/insects"
"#,
        )
        .unwrap();

        let config = load_config_file(&path).unwrap();
        let flower = config.models.flower.unwrap();
        assert_eq!(flower.path, dir.path().join("models/flowers.onnx"));
        assert_eq!(flower.labels, PathBuf::from("/shared/flowers.txt"));
        assert_eq!(
            config.models.detector.unwrap().path,
            dir.path().join("detector.onnx")
        );
        assert_eq!(
            config.reference_images.insect_dir,
            Some(dir.path().join("photos/insects"))
        );
        assert!(config.reference_images.plant_dir.is_none());
    }

    #[test]
    fn test_save_then_load_keeps_settings() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.server.port = 8123;
        config.taxonomy.enabled = false;
        save_config(&config, &path).unwrap();

        let loaded = load_config_file(&path).unwrap();
        assert_eq!(loaded.server.port, 8123);
        assert!(!loaded.taxonomy.enabled);

        let leftovers = std::fs::read_dir(path.parent().unwrap()).unwrap().count();
        assert_eq!(leftovers, 1);
    }
}
