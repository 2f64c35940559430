//! The prediction pipeline.

use super::types::{Detections, Prediction, PredictionResponse, TaxonInfo};
use crate::config::{Config, classifier_model, detector_model};
use crate::error::{Error, Result};
use crate::geo::{ExifDictionary, ExifSource, GeoPoint, extract_geolocation};
use crate::inference::{
    DetectionThresholds, OnnxClassifier, OnnxDetector, RankedLabel, SpeciesClassifier,
    SpecimenDetector,
};
use crate::reference::{Collection, ReferenceImages};
use crate::taxonomy::{GbifClient, NoTaxonomy, TaxonomyLookup};
use futures_util::future::join_all;
use image::{DynamicImage, ImageFormat};
use std::sync::Arc;
use tracing::{debug, info};

/// Encoded image bytes as uploaded by a client.
#[derive(Debug, Clone, Copy)]
pub struct UploadedImage<'a> {
    bytes: &'a [u8],
}

impl<'a> UploadedImage<'a> {
    /// Wrap encoded image bytes.
    #[must_use]
    pub const fn new(bytes: &'a [u8]) -> Self {
        Self { bytes }
    }
}

impl ExifSource for UploadedImage<'_> {
    fn raw_exif(&self) -> Option<ExifDictionary> {
        ExifDictionary::from_bytes(self.bytes)
    }
}

/// Output of the blocking part of the pipeline, before enrichment.
struct RawPrediction {
    location: Option<GeoPoint>,
    flowers: Vec<RankedLabel>,
    insects: Option<Vec<RankedLabel>>,
    insect_count: usize,
}

/// Runs every model over an uploaded image and assembles the response.
#[derive(Clone)]
pub struct Predictor {
    flower: Arc<dyn SpeciesClassifier>,
    insect: Arc<dyn SpeciesClassifier>,
    detector: Arc<dyn SpecimenDetector>,
    thresholds: DetectionThresholds,
    taxonomy: Arc<dyn TaxonomyLookup>,
    references: ReferenceImages,
}

impl std::fmt::Debug for Predictor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Predictor")
            .field("thresholds", &self.thresholds)
            .field("references", &self.references)
            .finish_non_exhaustive()
    }
}

impl Predictor {
    /// Assemble a predictor from its collaborators.
    #[must_use]
    pub fn new(
        flower: Arc<dyn SpeciesClassifier>,
        insect: Arc<dyn SpeciesClassifier>,
        detector: Arc<dyn SpecimenDetector>,
        taxonomy: Arc<dyn TaxonomyLookup>,
        references: ReferenceImages,
    ) -> Self {
        Self {
            flower,
            insect,
            detector,
            thresholds: DetectionThresholds::default(),
            taxonomy,
            references,
        }
    }

    /// Override the detector thresholds.
    #[must_use]
    pub const fn with_thresholds(mut self, thresholds: DetectionThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    /// Load every model and build the taxonomy client from configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        let device = config.inference.device;
        let top_k = config.inference.top_k;

        let flower =
            OnnxClassifier::from_config("flower", classifier_model(config, "flower")?, device, top_k)?;
        let insect =
            OnnxClassifier::from_config("insect", classifier_model(config, "insect")?, device, top_k)?;

        let detector_config = detector_model(config)?;
        let detector = OnnxDetector::from_config(detector_config, device)?;

        let taxonomy: Arc<dyn TaxonomyLookup> = if config.taxonomy.enabled {
            Arc::new(GbifClient::from_config(&config.taxonomy)?)
        } else {
            info!("Taxonomy enrichment disabled");
            Arc::new(NoTaxonomy)
        };

        Ok(Self::new(
            Arc::new(flower),
            Arc::new(insect),
            Arc::new(detector),
            taxonomy,
            ReferenceImages::from_config(&config.reference_images),
        )
        .with_thresholds(DetectionThresholds {
            confidence: detector_config.confidence,
            overlap: detector_config.overlap,
        }))
    }

    /// Reference photo lookup shared with the `/images` route.
    #[must_use]
    pub const fn references(&self) -> &ReferenceImages {
        &self.references
    }

    /// Run the full pipeline over encoded image bytes.
    ///
    /// Undecodable bytes fail with [`Error::ImageDecode`]. Missing GPS data,
    /// taxonomy and reference photos are normal and leave fields empty.
    pub async fn predict(&self, bytes: Vec<u8>) -> Result<PredictionResponse> {
        let this = self.clone();
        let raw = tokio::task::spawn_blocking(move || this.run_models(&bytes))
            .await
            .map_err(|e| Error::Internal {
                message: format!("prediction task failed: {e}"),
            })??;

        let flower_predictions = self.enrich(raw.flowers, Collection::Plants).await;
        let insect_predictions = match raw.insects {
            Some(insects) => Detections::Found(self.enrich(insects, Collection::Insects).await),
            None => Detections::Empty,
        };

        Ok(PredictionResponse {
            location: raw.location,
            flower_predictions,
            insect_predictions,
            insect_count: raw.insect_count,
        })
    }

    fn run_models(&self, bytes: &[u8]) -> Result<RawPrediction> {
        let image =
            image::load_from_memory(bytes).map_err(|e| Error::ImageDecode { source: e })?;

        let location = extract_geolocation(&UploadedImage::new(bytes));
        debug!("Geolocation: {location:?}");

        let detections = {
            let temp = write_temp_jpeg(&image)?;
            self.detector.detect(temp.path(), self.thresholds)?
        };
        let insect_count = detections.len();

        let flowers = self.flower.classify(&image)?;
        let insects = if insect_count > 0 {
            Some(self.insect.classify(&image)?)
        } else {
            None
        };

        info!(
            "Predicted {} flowers, {insect_count} insects detected",
            flowers.len()
        );

        Ok(RawPrediction {
            location,
            flowers,
            insects,
            insect_count,
        })
    }

    async fn enrich(&self, ranked: Vec<RankedLabel>, collection: Collection) -> Vec<Prediction> {
        join_all(ranked.into_iter().map(|r| self.enrich_one(r, collection))).await
    }

    async fn enrich_one(&self, ranked: RankedLabel, collection: Collection) -> Prediction {
        let (record, reference_image) = tokio::join!(
            self.taxonomy.lookup(&ranked.label),
            self.references.lookup(collection, &ranked.label),
        );

        let (taxonomy, vernacular_name) = match record {
            Some(record) => (
                Some(TaxonInfo {
                    scientific_name: record.scientific_name,
                    rank: record.rank,
                }),
                record.vernacular_name,
            ),
            None => (None, None),
        };

        Prediction {
            name: ranked.label,
            probability: ranked.confidence,
            taxonomy,
            vernacular_name,
            reference_image,
        }
    }
}

/// Re-encode as JPEG in a temporary file for the detector.
fn write_temp_jpeg(image: &DynamicImage) -> Result<tempfile::NamedTempFile> {
    let mut temp = tempfile::Builder::new()
        .prefix("bugbloom-")
        .suffix(".jpg")
        .tempfile()?;

    DynamicImage::ImageRgb8(image.to_rgb8())
        .write_to(temp.as_file_mut(), ImageFormat::Jpeg)
        .map_err(|e| Error::ImageEncode { source: e })?;

    Ok(temp)
}
