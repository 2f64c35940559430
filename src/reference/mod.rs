//! Local reference photos for predicted labels.
//!
//! Each label may have a folder `<root>/<label>` holding sample photos. The
//! first file in name order is attached to predictions either as a link to
//! the `/images` route or inlined as base64.

use crate::config::{ReferenceImageMode, ReferenceImagesConfig};
use crate::constants::server::IMAGES_ROUTE_PREFIX;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// A reference photo attached to a prediction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum ReferenceImage {
    /// Link to the photo on this server.
    Url(String),
    /// Photo bytes, standard base64.
    Base64(String),
}

/// Which photo collection a label belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collection {
    /// Flower and plant photos.
    Plants,
    /// Insect photos.
    Insects,
}

/// Reference photo lookup over the plant and insect roots.
#[derive(Debug, Clone, Default)]
pub struct ReferenceImages {
    plant_dir: Option<PathBuf>,
    insect_dir: Option<PathBuf>,
    mode: ReferenceImageMode,
}

impl ReferenceImages {
    /// Create a lookup over the given roots.
    #[must_use]
    pub const fn new(
        plant_dir: Option<PathBuf>,
        insect_dir: Option<PathBuf>,
        mode: ReferenceImageMode,
    ) -> Self {
        Self {
            plant_dir,
            insect_dir,
            mode,
        }
    }

    /// Create a lookup from configuration.
    #[must_use]
    pub fn from_config(config: &ReferenceImagesConfig) -> Self {
        Self::new(
            config.plant_dir.clone(),
            config.insect_dir.clone(),
            config.mode,
        )
    }

    fn root(&self, collection: Collection) -> Option<&Path> {
        match collection {
            Collection::Plants => self.plant_dir.as_deref(),
            Collection::Insects => self.insect_dir.as_deref(),
        }
    }

    /// Reference photo for `label`, if its folder holds any file.
    pub async fn lookup(&self, collection: Collection, label: &str) -> Option<ReferenceImage> {
        if !is_safe_component(label) {
            return None;
        }
        let folder = self.root(collection)?.join(label);
        let file = first_file(&folder).await?;

        match self.mode {
            ReferenceImageMode::Url => {
                let name = file.file_name()?.to_string_lossy().into_owned();
                Some(ReferenceImage::Url(format!(
                    "{IMAGES_ROUTE_PREFIX}/{label}/{name}"
                )))
            }
            ReferenceImageMode::Base64 => match tokio::fs::read(&file).await {
                Ok(bytes) => Some(ReferenceImage::Base64(STANDARD.encode(bytes))),
                Err(e) => {
                    warn!("Failed to read reference image {}: {e}", file.display());
                    None
                }
            },
        }
    }

    /// Locate `<root>/<folder>/<filename>`, trying plants first, then insects.
    ///
    /// Components that could escape the roots are rejected.
    pub async fn resolve_file(&self, folder: &str, filename: &str) -> Option<PathBuf> {
        if !is_safe_component(folder) || !is_safe_component(filename) {
            debug!("Rejected reference path {folder}/{filename}");
            return None;
        }

        for collection in [Collection::Plants, Collection::Insects] {
            if let Some(root) = self.root(collection) {
                let candidate = root.join(folder).join(filename);
                if tokio::fs::metadata(&candidate)
                    .await
                    .is_ok_and(|m| m.is_file())
                {
                    return Some(candidate);
                }
            }
        }

        None
    }
}

fn is_safe_component(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\', '\0'])
}

async fn first_file(folder: &Path) -> Option<PathBuf> {
    let mut entries = tokio::fs::read_dir(folder).await.ok()?;
    let mut files = Vec::new();

    while let Ok(Some(entry)) = entries.next_entry().await {
        if entry.file_type().await.is_ok_and(|t| t.is_file()) {
            files.push(entry.path());
        }
    }

    files.sort();
    files.into_iter().next()
}
