//! Class label sets.
//!
//! A labels file lists one class per line in the model's output index order.
//! The set is checked against the model's class count when a classifier is
//! loaded and again on every inference, so a score never goes unlabelled.

use super::RankedLabel;
use crate::error::{Error, Result};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Ordered class labels read from a labels file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelSet {
    path: PathBuf,
    labels: Vec<String>,
}

impl LabelSet {
    /// Load labels from `path`.
    ///
    /// Lines are trimmed and blank lines skipped. A label listed twice is
    /// rejected.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::LabelsFileNotFound {
                path: path.to_path_buf(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| Error::LabelsRead {
            path: path.to_path_buf(),
            source: e,
        })?;

        Self::parse(path, &content)
    }

    fn parse(path: &Path, content: &str) -> Result<Self> {
        let mut seen = HashSet::new();
        let mut labels = Vec::new();

        for (index, line) in content.lines().enumerate() {
            let label = line.trim();
            if label.is_empty() {
                continue;
            }
            if !seen.insert(label) {
                return Err(Error::LabelsInvalid {
                    path: path.to_path_buf(),
                    reason: format!("duplicate label '{label}' on line {}", index + 1),
                });
            }
            labels.push(label.to_string());
        }

        if labels.is_empty() {
            return Err(Error::LabelsInvalid {
                path: path.to_path_buf(),
                reason: "no labels".to_string(),
            });
        }

        Ok(Self {
            path: path.to_path_buf(),
            labels,
        })
    }

    /// Number of labels.
    pub fn count(&self) -> usize {
        self.labels.len()
    }

    /// Fail unless there is exactly one label per model class.
    pub fn ensure_class_count(&self, classes: usize) -> Result<()> {
        if classes == self.labels.len() {
            return Ok(());
        }
        Err(Error::LabelsMismatch {
            path: self.path.clone(),
            labels: self.labels.len(),
            classes,
        })
    }

    /// The `k` best-scoring labels, best first.
    ///
    /// `scores` must hold one value per label. Non-finite scores are skipped.
    pub fn rank(&self, scores: &[f32], k: usize) -> Result<Vec<RankedLabel>> {
        self.ensure_class_count(scores.len())?;

        let mut indexed: Vec<(usize, f32)> = scores
            .iter()
            .copied()
            .enumerate()
            .filter(|(_, s)| s.is_finite())
            .collect();
        indexed.sort_by(|a, b| b.1.total_cmp(&a.1));

        Ok(indexed
            .into_iter()
            .take(k)
            .map(|(i, confidence)| RankedLabel {
                label: self.labels[i].clone(),
                confidence,
            })
            .collect())
    }
}
