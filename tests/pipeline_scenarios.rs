//! End-to-end runs of the mileage pipeline against recorded OCR output.
//!
//! The recognizer is replaced by `FixtureRecognizer`, so no vision library or
//! model files are needed.

use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use odometer_reader_lib::{
    BoundingBox, CancelFlag, DistanceUnit, EnhanceMethod, EnhanceParams, FixtureRecognizer,
    ImageFilter, ImageVariant, MileageError, MileagePipeline, Orientation, Recognizer,
    TextObservation,
};
use std::io::Cursor;

fn photo() -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_fn(64, 32, |x, y| {
        Rgb([(x * 4) as u8, (y * 8) as u8, 128])
    }))
}

fn dashboard_fixture() -> FixtureRecognizer {
    FixtureRecognizer::new()
        .with_observations(
            EnhanceMethod::Identity,
            vec![TextObservation::new("45,231 mi", 0.82)
                .with_box(BoundingBox::new(0.25, 0.4, 0.5, 0.2))],
        )
        .with_observations(
            EnhanceMethod::ContrastEnhanced,
            vec![
                TextObservation::new("45231", 0.77),
                TextObservation::new("231", 0.3),
            ],
        )
}

#[test]
fn dashboard_with_trip_meter() {
    let reading = MileagePipeline::new(dashboard_fixture())
        .recognize(&photo(), None, &CancelFlag::default())
        .unwrap();

    assert_eq!(reading.mileage, 45231);
    assert!((reading.confidence - 0.97).abs() < 1e-9, "{}", reading.confidence);
    assert_eq!(reading.detected_unit, Some(DistanceUnit::Miles));
    assert_eq!(reading.raw_text, "45,231 mi");
}

#[test]
fn same_input_same_answer() {
    let pipeline = MileagePipeline::new(dashboard_fixture());
    let first = pipeline
        .recognize(&photo(), Some(40_000), &CancelFlag::default())
        .unwrap();
    for _ in 0..20 {
        let again = pipeline
            .recognize(&photo(), Some(40_000), &CancelFlag::default())
            .unwrap();
        assert_eq!(again, first);
    }
}

#[test]
fn prior_mileage_breaks_close_calls() {
    // two plausible readings, neither a trip meter; the prior picks the one
    // that moved forward
    let rec = FixtureRecognizer::new().with_observations(
        EnhanceMethod::Identity,
        vec![
            TextObservation::new("38120", 0.8),
            TextObservation::new("36120", 0.82),
        ],
    );
    let reading = MileagePipeline::new(rec)
        .recognize(&photo(), Some(37_000), &CancelFlag::default())
        .unwrap();
    assert_eq!(reading.mileage, 38120);
}

#[test]
fn failing_variant_does_not_sink_the_run() {
    let rec = FixtureRecognizer::new()
        .with_failure(EnhanceMethod::Identity, "vision request failed")
        .with_observations(
            EnhanceMethod::ContrastEnhanced,
            vec![TextObservation::new("O12345 km", 0.66)],
        );
    let reading = MileagePipeline::new(rec)
        .recognize(&photo(), None, &CancelFlag::default())
        .unwrap();
    assert_eq!(reading.mileage, 12345);
    assert_eq!(reading.confidence, 0.66);
    assert_eq!(reading.detected_unit, Some(DistanceUnit::Kilometers));
}

#[test]
fn no_observations_is_no_text_found() {
    let err = MileagePipeline::new(FixtureRecognizer::new())
        .recognize(&photo(), None, &CancelFlag::default())
        .unwrap_err();
    assert_eq!(err, MileageError::NoTextFound);

    let all_failing = FixtureRecognizer::new()
        .with_failure(EnhanceMethod::Identity, "boom")
        .with_failure(EnhanceMethod::ContrastEnhanced, "boom");
    let err = MileagePipeline::new(all_failing)
        .recognize(&photo(), None, &CancelFlag::default())
        .unwrap_err();
    assert_eq!(err, MileageError::NoTextFound);
}

#[test]
fn text_without_numbers_is_no_valid_mileage() {
    let rec = FixtureRecognizer::new().with_observations(
        EnhanceMethod::Identity,
        vec![TextObservation::new("ODO", 0.9), TextObservation::new("TRIP A", 0.9)],
    );
    let err = MileagePipeline::new(rec)
        .recognize(&photo(), None, &CancelFlag::default())
        .unwrap_err();
    assert_eq!(err, MileageError::NoValidMileageFound);
}

#[test]
fn out_of_range_value_never_succeeds() {
    let rec = FixtureRecognizer::new().with_observations(
        EnhanceMethod::Identity,
        vec![TextObservation::new("1,000,001", 0.99)],
    );
    let err = MileagePipeline::new(rec)
        .recognize(&photo(), None, &CancelFlag::default())
        .unwrap_err();
    assert_eq!(err, MileageError::NoValidMileageFound);
}

#[test]
fn cancelled_before_start() {
    let cancel = CancelFlag::default();
    cancel.cancel();
    let err = MileagePipeline::new(dashboard_fixture())
        .recognize(&photo(), None, &cancel)
        .unwrap_err();
    assert_eq!(err, MileageError::Cancelled);
}

/// Cancels the run from inside the first recognition call.
struct CancellingRecognizer {
    cancel: CancelFlag,
}

impl Recognizer for CancellingRecognizer {
    fn name(&self) -> &str {
        "cancelling"
    }

    fn recognize(
        &self,
        _variant: &ImageVariant,
        _orientation: Orientation,
    ) -> anyhow::Result<Vec<TextObservation>> {
        self.cancel.cancel();
        Ok(vec![TextObservation::new("45231", 0.9)])
    }
}

#[test]
fn cancelled_mid_run() {
    let cancel = CancelFlag::default();
    let rec = CancellingRecognizer {
        cancel: cancel.clone(),
    };
    let err = MileagePipeline::new(rec)
        .recognize(&photo(), None, &cancel)
        .unwrap_err();
    assert_eq!(err, MileageError::Cancelled);
}

struct NoEnhancement;

impl ImageFilter for NoEnhancement {
    fn enhance(&self, _: &DynamicImage, _: &EnhanceParams) -> Option<DynamicImage> {
        None
    }
}

#[test]
fn unavailable_filter_falls_back_to_identity() {
    // without the enhanced variant, 45231 is seen once and 231 never
    let reading = MileagePipeline::new(dashboard_fixture())
        .with_filter(NoEnhancement)
        .recognize(&photo(), None, &CancelFlag::default())
        .unwrap();
    assert_eq!(reading.mileage, 45231);
    assert_eq!(reading.confidence, 0.82);
}

#[test]
fn encoded_photo_is_decoded() {
    let mut png = Vec::new();
    photo()
        .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
        .unwrap();
    let reading = MileagePipeline::new(dashboard_fixture())
        .recognize_bytes(&png, None, &CancelFlag::default())
        .unwrap();
    assert_eq!(reading.mileage, 45231);
}

#[test]
fn garbage_bytes_fail_image_processing() {
    let err = MileagePipeline::new(dashboard_fixture())
        .recognize_bytes(b"definitely not a photo", None, &CancelFlag::default())
        .unwrap_err();
    assert!(matches!(err, MileageError::ImageProcessingFailed(_)));
}
