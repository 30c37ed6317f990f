use crate::aggregate::aggregate;
use crate::candidate::{build_candidates, DistanceUnit, MileageCandidate};
use crate::config::PipelineConfig;
use crate::discard::discard_trip_meter;
use crate::error::{MileageError, MileageResult};
use crate::ocr::{Recognizer, TextObservation};
use crate::preprocess::{plan_variants, ColorControlsFilter, ImageFilter, ImageVariant};
use crate::scoring::select;
use crate::validate::validate_mileage;
use image::DynamicImage;
use rayon::prelude::*;
use serde::Serialize;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

/// Shared cancellation flag. Clones observe the same flag.
#[derive(Debug, Clone)]
pub struct CancelFlag(pub Arc<AtomicBool>);

impl Default for CancelFlag {
    fn default() -> Self {
        CancelFlag(Arc::new(AtomicBool::new(false)))
    }
}

impl CancelFlag {
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// The single reading handed back to the caller.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MileageReading {
    pub mileage: i64,
    pub confidence: f64,
    pub raw_text: String,
    pub detected_unit: Option<DistanceUnit>,
}

impl From<MileageCandidate> for MileageReading {
    fn from(c: MileageCandidate) -> Self {
        Self {
            mileage: c.value,
            confidence: c.confidence,
            raw_text: c.source_text,
            detected_unit: c.detected_unit,
        }
    }
}

/// Photo → mileage.
///
/// Holds no state between runs; one pipeline can serve many photos, from
/// several threads at once.
pub struct MileagePipeline {
    recognizer: Box<dyn Recognizer>,
    filter: Box<dyn ImageFilter>,
    config: PipelineConfig,
}

impl MileagePipeline {
    pub fn new(recognizer: impl Recognizer + 'static) -> Self {
        Self::from_boxed(Box::new(recognizer))
    }

    pub fn from_boxed(recognizer: Box<dyn Recognizer>) -> Self {
        Self {
            recognizer,
            filter: Box::new(ColorControlsFilter),
            config: PipelineConfig::default(),
        }
    }

    pub fn with_config(mut self, config: PipelineConfig) -> Self {
        self.config = config.sanitized();
        self
    }

    pub fn with_filter(mut self, filter: impl ImageFilter + 'static) -> Self {
        self.filter = Box::new(filter);
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Decode an encoded photo (JPEG, PNG, …) and recognize it.
    pub fn recognize_bytes(
        &self,
        bytes: &[u8],
        prior_mileage: Option<i64>,
        cancel: &CancelFlag,
    ) -> MileageResult<MileageReading> {
        let image = image::load_from_memory(bytes)
            .map_err(|e| MileageError::ImageProcessingFailed(e.to_string()))?;
        self.recognize(&image, prior_mileage, cancel)
    }

    pub fn recognize(
        &self,
        image: &DynamicImage,
        prior_mileage: Option<i64>,
        cancel: &CancelFlag,
    ) -> MileageResult<MileageReading> {
        if image.width() == 0 || image.height() == 0 {
            return Err(MileageError::ImageProcessingFailed(
                "image has no pixels".to_string(),
            ));
        }

        let cfg = &self.config;
        let variants = plan_variants(
            image,
            self.filter.as_ref(),
            cfg.enhance_enabled.then_some(&cfg.enhance),
        );

        // ── Step 1: recognition, one submission per variant ──────────────────
        let per_variant = self.recognize_variants(&variants, cancel);
        if cancel.is_cancelled() {
            log::debug!("[pipeline] cancelled after recognition");
            return Err(MileageError::Cancelled);
        }

        if per_variant.iter().all(|obs| obs.is_empty()) {
            return Err(MileageError::NoTextFound);
        }

        // ── Step 2: candidates → aggregate → trip-meter discard ──────────────
        let raw: Vec<MileageCandidate> = per_variant
            .iter()
            .flat_map(|obs| build_candidates(obs, cfg.max_mileage))
            .collect();
        log::debug!("[pipeline] {} raw candidate(s)", raw.len());

        let merged = aggregate(&raw, cfg.boost_per_repeat);
        let survivors = discard_trip_meter(merged, cfg.trip_meter_ratio, cfg.trip_meter_cutoff);

        // ── Step 3: score, select, validate ──────────────────────────────────
        let has_area_data = survivors.iter().any(|c| c.metadata.is_some());
        let best = select(&survivors, prior_mileage, has_area_data)
            .ok_or(MileageError::NoValidMileageFound)?;
        validate_mileage(best.value, cfg.max_mileage)?;

        log::info!(
            "[pipeline] selected {} (conf {:.3}, unit {:?}) from {:?}",
            best.value,
            best.confidence,
            best.detected_unit,
            best.source_text
        );
        Ok(best.into())
    }

    /// Submit every variant to the recognizer in parallel.
    ///
    /// Output order matches `variants`. A failing variant contributes no
    /// observations and does not affect its siblings; variants not yet started
    /// when the flag is set are skipped.
    fn recognize_variants(
        &self,
        variants: &[ImageVariant],
        cancel: &CancelFlag,
    ) -> Vec<Vec<TextObservation>> {
        let orientation = self.config.orientation;
        variants
            .par_iter()
            .map(|variant| {
                if cancel.is_cancelled() {
                    return Vec::new();
                }
                match self.recognizer.recognize(variant, orientation) {
                    Ok(obs) => {
                        log::debug!(
                            "[ocr] {} {:?}: {} observation(s)",
                            self.recognizer.name(),
                            variant.method,
                            obs.len()
                        );
                        obs
                    }
                    Err(e) => {
                        log::warn!(
                            "[ocr] {} {:?} failed: {e:#}",
                            self.recognizer.name(),
                            variant.method
                        );
                        Vec::new()
                    }
                }
            })
            .collect()
    }
}
