use anyhow::Context;
use image::{imageops::FilterType, DynamicImage};
use oar_ocr::predictors::TextRecognitionPredictor;
use std::path::Path;

use super::{Orientation, Recognizer, TextObservation};
use crate::preprocess::ImageVariant;

/// Minimum height fed to PaddleOCR v5 mobile (normalises inputs to 48 px internally).
const MIN_HEIGHT: u32 = 48;

/// Recognition-only PaddleOCR backend.
///
/// There is no detection stage, so the whole variant is read as one line and
/// observations carry no bounding box.
pub struct OarRecognizer {
    rec: TextRecognitionPredictor,
}

// ONNX Runtime sessions are not `Send`/`Sync` by default, but in practice the
// recognition predictor is stateless between calls and safe to share.
unsafe impl Send for OarRecognizer {}
unsafe impl Sync for OarRecognizer {}

impl OarRecognizer {
    /// Build the recognizer from on-disk ONNX model and dict files.
    pub fn from_files(rec_model: impl AsRef<Path>, dict: impl AsRef<Path>) -> anyhow::Result<Self> {
        let rec_model = rec_model.as_ref();
        let rec = TextRecognitionPredictor::builder()
            .dict_path(dict.as_ref())
            .score_threshold(0.0)
            .build(rec_model)
            .map_err(|e| anyhow::anyhow!("{e}"))
            .with_context(|| format!("loading {}", rec_model.display()))?;
        Ok(Self { rec })
    }
}

fn rotate_upright(img: &DynamicImage, orientation: Orientation) -> DynamicImage {
    match orientation {
        Orientation::Up => img.clone(),
        Orientation::Right => img.rotate270(),
        Orientation::Down => img.rotate180(),
        Orientation::Left => img.rotate90(),
    }
}

impl Recognizer for OarRecognizer {
    fn name(&self) -> &str {
        "oar-ocr"
    }

    fn recognize(
        &self,
        variant: &ImageVariant,
        orientation: Orientation,
    ) -> anyhow::Result<Vec<TextObservation>> {
        let img = rotate_upright(&variant.image, orientation).to_rgb8();
        let (orig_w, orig_h) = (img.width(), img.height());
        if orig_w == 0 || orig_h == 0 {
            return Ok(Vec::new());
        }

        let img = if orig_h < MIN_HEIGHT {
            let scale = (MIN_HEIGHT + orig_h - 1) / orig_h;
            DynamicImage::ImageRgb8(img)
                .resize(orig_w * scale, orig_h * scale, FilterType::Lanczos3)
                .to_rgb8()
        } else {
            img
        };

        log::debug!(
            "[oar] {:?} {}×{} (orig {}×{})",
            variant.method,
            img.width(),
            img.height(),
            orig_w,
            orig_h
        );

        let result = self
            .rec
            .predict(vec![img])
            .map_err(|e| anyhow::anyhow!("predict error: {e}"))?;

        let Some(text) = result.texts.into_iter().next() else {
            return Ok(Vec::new());
        };
        let score = result.scores.into_iter().next().unwrap_or(0.0);

        log::debug!("[oar] {:?} result: {:?} conf={score:.3}", variant.method, text);

        if text.trim().is_empty() {
            return Ok(Vec::new());
        }
        Ok(vec![TextObservation::new(text.to_string(), score as f64)])
    }
}
