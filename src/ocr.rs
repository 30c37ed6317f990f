pub mod fixture;
#[cfg(feature = "oar")]
pub mod oar;

use crate::preprocess::ImageVariant;
use serde::{Deserialize, Serialize};

// ── Public types ─────────────────────────────────────────────────────────────

/// Axis-aligned box in normalized image coordinates (0.0 – 1.0).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl BoundingBox {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Fraction of the image covered by the box.
    pub fn area(&self) -> f64 {
        (self.width.max(0.0) * self.height.max(0.0)).min(1.0)
    }
}

/// One piece of text reported by a recognizer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextObservation {
    /// Top-ranked candidate string.
    pub text: String,
    pub confidence: f64, // 0.0 – 1.0
    #[serde(default)]
    pub bounding_box: Option<BoundingBox>,
}

impl TextObservation {
    pub fn new(text: impl Into<String>, confidence: f64) -> Self {
        Self {
            text: text.into(),
            confidence: confidence.clamp(0.0, 1.0),
            bounding_box: None,
        }
    }

    pub fn with_box(mut self, bounding_box: BoundingBox) -> Self {
        self.bounding_box = Some(bounding_box);
        self
    }
}

/// Which way is up in the submitted image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    #[default]
    Up,
    Right,
    Down,
    Left,
}

/// Every OCR backend implements this.
///
/// A recognizer is called once per image variant, possibly from several
/// threads at once. An `Err` only discards the observations of that variant;
/// sibling variants still run.
pub trait Recognizer: Send + Sync {
    fn name(&self) -> &str;
    fn recognize(
        &self,
        variant: &ImageVariant,
        orientation: Orientation,
    ) -> anyhow::Result<Vec<TextObservation>>;
}
