//! Odometer mileage recognition.
//!
//! Given a photo of an instrument cluster and an OCR backend, produce one
//! best-guess mileage with a confidence score. The photo is rendered into a
//! few enhanced variants, each is read by the [`ocr::Recognizer`], and the
//! numbers found are corrected, merged across variants, filtered for
//! trip-meter readings and scored for plausibility.

pub mod aggregate;
pub mod candidate;
pub mod config;
pub mod correction;
pub mod discard;
pub mod error;
pub mod extract;
pub mod ocr;
pub mod pipeline;
pub mod preprocess;
pub mod scoring;
pub mod validate;

pub use candidate::{DistanceUnit, MileageCandidate, ObservationMetadata};
pub use config::{load_config, save_config, PipelineConfig};
pub use error::{MileageError, MileageResult};
pub use ocr::{fixture::FixtureRecognizer, BoundingBox, Orientation, Recognizer, TextObservation};
pub use pipeline::{CancelFlag, MileagePipeline, MileageReading};
pub use preprocess::{ColorControlsFilter, EnhanceMethod, EnhanceParams, ImageFilter, ImageVariant};
