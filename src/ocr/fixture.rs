use anyhow::Context;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

use super::{Orientation, Recognizer, TextObservation};
use crate::preprocess::{EnhanceMethod, ImageVariant};

/// What a fixture returns for one variant.
#[derive(Debug, Clone)]
enum Canned {
    Observations(Vec<TextObservation>),
    Failure(String),
}

/// Recognizer that replays canned observations per variant method.
///
/// Lets the pipeline run against recorded engine output without linking a
/// vision library. Methods with nothing registered return no observations.
#[derive(Debug, Clone, Default)]
pub struct FixtureRecognizer {
    responses: HashMap<EnhanceMethod, Canned>,
}

/// On-disk form: `{"identity": [...], "contrast_enhanced": [...]}`.
#[derive(Debug, Deserialize)]
struct FixtureFile {
    #[serde(default)]
    identity: Vec<TextObservation>,
    #[serde(default)]
    contrast_enhanced: Vec<TextObservation>,
}

impl FixtureRecognizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_observations(
        mut self,
        method: EnhanceMethod,
        observations: Vec<TextObservation>,
    ) -> Self {
        self.responses
            .insert(method, Canned::Observations(observations));
        self
    }

    /// Make every call for `method` fail with `message`.
    pub fn with_failure(mut self, method: EnhanceMethod, message: impl Into<String>) -> Self {
        self.responses
            .insert(method, Canned::Failure(message.into()));
        self
    }

    pub fn from_json(text: &str) -> anyhow::Result<Self> {
        let file: FixtureFile = serde_json::from_str(text).context("invalid fixture JSON")?;
        Ok(Self::new()
            .with_observations(EnhanceMethod::Identity, file.identity)
            .with_observations(EnhanceMethod::ContrastEnhanced, file.contrast_enhanced))
    }

    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read {}", path.display()))?;
        Self::from_json(&text).with_context(|| format!("in {}", path.display()))
    }
}

impl Recognizer for FixtureRecognizer {
    fn name(&self) -> &str {
        "fixture"
    }

    fn recognize(
        &self,
        variant: &ImageVariant,
        _orientation: Orientation,
    ) -> anyhow::Result<Vec<TextObservation>> {
        match self.responses.get(&variant.method) {
            Some(Canned::Observations(obs)) => Ok(obs.clone()),
            Some(Canned::Failure(msg)) => anyhow::bail!("{msg}"),
            None => Ok(Vec::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::DynamicImage;

    fn variant(method: EnhanceMethod) -> ImageVariant {
        ImageVariant {
            image: DynamicImage::new_rgb8(4, 4),
            method,
        }
    }

    #[test]
    fn replays_per_method() {
        let rec = FixtureRecognizer::new()
            .with_observations(
                EnhanceMethod::Identity,
                vec![TextObservation::new("45231", 0.8)],
            )
            .with_failure(EnhanceMethod::ContrastEnhanced, "engine crashed");

        let obs = rec
            .recognize(&variant(EnhanceMethod::Identity), Orientation::Up)
            .unwrap();
        assert_eq!(obs.len(), 1);
        assert_eq!(obs[0].text, "45231");

        let err = rec
            .recognize(&variant(EnhanceMethod::ContrastEnhanced), Orientation::Up)
            .unwrap_err();
        assert_eq!(err.to_string(), "engine crashed");
    }

    #[test]
    fn unregistered_method_is_empty() {
        let rec = FixtureRecognizer::new();
        assert!(rec
            .recognize(&variant(EnhanceMethod::Identity), Orientation::Up)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn parses_json_fixture() {
        let rec = FixtureRecognizer::from_json(
            r#"{
                "identity": [
                    {"text": "45,231 mi", "confidence": 0.82,
                     "bounding_box": {"x": 0.2, "y": 0.4, "width": 0.5, "height": 0.2}}
                ]
            }"#,
        )
        .unwrap();
        let obs = rec
            .recognize(&variant(EnhanceMethod::Identity), Orientation::Up)
            .unwrap();
        assert_eq!(obs[0].bounding_box.map(|b| b.width), Some(0.5));
        assert!(rec
            .recognize(&variant(EnhanceMethod::ContrastEnhanced), Orientation::Up)
            .unwrap()
            .is_empty());
    }
}
