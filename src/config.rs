use crate::aggregate::REPEAT_BOOST;
use crate::discard::{TRIP_METER_CUTOFF, TRIP_METER_RATIO};
use crate::ocr::Orientation;
use crate::preprocess::EnhanceParams;
use crate::validate::MAX_MILEAGE;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Tunables for a recognition run.
///
/// All fields are optional in the JSON form; unset fields take the
/// empirically chosen defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Confidence added per repeated detection of the same value.
    pub boost_per_repeat: f64,
    /// Magnitude gap that marks small values as trip-meter readings.
    pub trip_meter_ratio: f64,
    /// Fraction of the largest value below which candidates are dropped
    /// once a trip-meter gap is detected.
    pub trip_meter_cutoff: f64,
    /// Largest mileage accepted from the extractor and the validator.
    pub max_mileage: i64,
    /// Orientation hint passed to the recognizer.
    pub orientation: Orientation,
    /// Whether to request the contrast-enhanced variant at all.
    pub enhance_enabled: bool,
    pub enhance: EnhanceParams,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            boost_per_repeat: REPEAT_BOOST,
            trip_meter_ratio: TRIP_METER_RATIO,
            trip_meter_cutoff: TRIP_METER_CUTOFF,
            max_mileage: MAX_MILEAGE,
            orientation: Orientation::default(),
            enhance_enabled: true,
            enhance: EnhanceParams::default(),
        }
    }
}

impl PipelineConfig {
    /// Clamp out-of-range values back to something the pipeline can use.
    pub fn sanitized(mut self) -> Self {
        if !self.boost_per_repeat.is_finite() || self.boost_per_repeat < 0.0 {
            self.boost_per_repeat = REPEAT_BOOST;
        }
        if !self.trip_meter_ratio.is_finite() || self.trip_meter_ratio < 1.0 {
            self.trip_meter_ratio = TRIP_METER_RATIO;
        }
        if !self.trip_meter_cutoff.is_finite() {
            self.trip_meter_cutoff = TRIP_METER_CUTOFF;
        }
        self.trip_meter_cutoff = self.trip_meter_cutoff.clamp(0.0, 1.0);
        self.max_mileage = self.max_mileage.clamp(0, MAX_MILEAGE);
        self
    }
}

pub fn load_config(path: impl AsRef<Path>) -> anyhow::Result<PipelineConfig> {
    let path = path.as_ref();
    let text =
        fs::read_to_string(path).with_context(|| format!("cannot read {}", path.display()))?;
    let cfg: PipelineConfig = serde_json::from_str(&text)
        .with_context(|| format!("parse error in {}", path.display()))?;
    Ok(cfg.sanitized())
}

pub fn save_config(path: impl AsRef<Path>, config: &PipelineConfig) -> anyhow::Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("cannot create {}", parent.display()))?;
    }
    let text = serde_json::to_string_pretty(config).context("serialise error")?;
    fs::write(path, text).with_context(|| format!("cannot write {}", path.display()))
}
