use crate::extract::extract_numbers;
use crate::ocr::{BoundingBox, TextObservation};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistanceUnit {
    Miles,
    Kilometers,
}

const KILOMETER_TOKENS: &[&str] = &["km", "kilometer", "kilometre"];
const MILE_TOKENS: &[&str] = &["mi", "mile"];

/// Spatial data of the observation a candidate came from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObservationMetadata {
    pub bounding_box: BoundingBox,
    pub area: f64,
}

impl From<BoundingBox> for ObservationMetadata {
    fn from(bounding_box: BoundingBox) -> Self {
        Self {
            bounding_box,
            area: bounding_box.area(),
        }
    }
}

/// A single mileage hypothesis.
#[derive(Debug, Clone, PartialEq)]
pub struct MileageCandidate {
    pub value: i64,
    pub confidence: f64,
    pub source_text: String,
    pub detected_unit: Option<DistanceUnit>,
    pub metadata: Option<ObservationMetadata>,
}

impl MileageCandidate {
    /// Copy of this candidate with a different confidence.
    pub fn with_confidence(&self, confidence: f64) -> Self {
        Self {
            confidence,
            ..self.clone()
        }
    }
}

/// Look for a distance unit anywhere in the observations' text.
///
/// Kilometer tokens are checked before mile tokens, so text containing both
/// reads as kilometers.
pub fn detect_unit(observations: &[TextObservation]) -> Option<DistanceUnit> {
    let joined = observations
        .iter()
        .map(|o| o.text.to_lowercase())
        .collect::<Vec<_>>()
        .join(" ");

    if KILOMETER_TOKENS.iter().any(|t| joined.contains(t)) {
        Some(DistanceUnit::Kilometers)
    } else if MILE_TOKENS.iter().any(|t| joined.contains(t)) {
        Some(DistanceUnit::Miles)
    } else {
        None
    }
}

/// Turn one variant's observations into raw candidates, in observation order.
///
/// Values outside `0..=max_mileage` are dropped here.
pub fn build_candidates(observations: &[TextObservation], max_mileage: i64) -> Vec<MileageCandidate> {
    let unit = detect_unit(observations);

    observations
        .iter()
        .flat_map(move |obs| {
            let metadata = obs.bounding_box.map(ObservationMetadata::from);
            let confidence = obs.confidence.clamp(0.0, 1.0);
            extract_numbers(&obs.text)
                .into_iter()
                .filter(move |v| (0..=max_mileage).contains(v))
                .map(move |value| MileageCandidate {
                    value,
                    confidence,
                    source_text: obs.text.clone(),
                    detected_unit: unit,
                    metadata,
                })
        })
        .collect()
}
