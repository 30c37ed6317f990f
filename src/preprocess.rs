//! Image variants submitted to the recognizer.
//!
//! The identity rendering always goes first. A colour-controls pass (more
//! contrast, most of the saturation removed, slightly brighter) follows when
//! the filter can build it; it suppresses glare and reflections on both LCD
//! and mechanical odometers.

use image::{DynamicImage, Rgb};
use imageproc::map::map_pixels;
use serde::{Deserialize, Serialize};

/// Contrast multiplier of the enhanced variant (+30 %).
pub const ENHANCE_CONTRAST: f32 = 1.3;
/// Saturation multiplier of the enhanced variant (20 % of baseline).
pub const ENHANCE_SATURATION: f32 = 0.2;
/// Brightness offset of the enhanced variant, as a fraction of full scale.
pub const ENHANCE_BRIGHTNESS: f32 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnhanceMethod {
    Identity,
    ContrastEnhanced,
}

/// One rendering of the source photo, consumed once by the recognizer.
#[derive(Debug, Clone)]
pub struct ImageVariant {
    pub image: DynamicImage,
    pub method: EnhanceMethod,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnhanceParams {
    pub contrast: f32,
    pub saturation: f32,
    pub brightness: f32,
}

impl Default for EnhanceParams {
    fn default() -> Self {
        Self {
            contrast: ENHANCE_CONTRAST,
            saturation: ENHANCE_SATURATION,
            brightness: ENHANCE_BRIGHTNESS,
        }
    }
}

/// Builds the enhanced rendering. Best effort: `None` means "skip it".
pub trait ImageFilter: Send + Sync {
    fn enhance(&self, image: &DynamicImage, params: &EnhanceParams) -> Option<DynamicImage>;
}

/// Per-pixel brightness / contrast / saturation adjustment.
///
/// Order: desaturate towards Rec. 709 luma, add brightness, then stretch
/// around mid-grey.
#[derive(Debug, Clone, Copy, Default)]
pub struct ColorControlsFilter;

impl ImageFilter for ColorControlsFilter {
    fn enhance(&self, image: &DynamicImage, params: &EnhanceParams) -> Option<DynamicImage> {
        if image.width() == 0 || image.height() == 0 {
            return None;
        }
        let EnhanceParams {
            contrast,
            saturation,
            brightness,
        } = *params;
        if !(contrast.is_finite() && saturation.is_finite() && brightness.is_finite()) {
            return None;
        }

        let rgb = image.to_rgb8();
        let offset = brightness * 255.0;
        let adjusted = map_pixels(&rgb, |Rgb([r, g, b]): Rgb<u8>| {
            let (r, g, b) = (r as f32, g as f32, b as f32);
            let luma = 0.2126 * r + 0.7152 * g + 0.0722 * b;
            let adjust = |c: f32| {
                let c = luma + saturation * (c - luma) + offset;
                ((c - 127.5) * contrast + 127.5).round().clamp(0.0, 255.0) as u8
            };
            Rgb([adjust(r), adjust(g), adjust(b)])
        });
        Some(DynamicImage::ImageRgb8(adjusted))
    }
}

/// Variants to request for `image`, identity first.
pub fn plan_variants(
    image: &DynamicImage,
    filter: &dyn ImageFilter,
    params: Option<&EnhanceParams>,
) -> Vec<ImageVariant> {
    let mut variants = vec![ImageVariant {
        image: image.clone(),
        method: EnhanceMethod::Identity,
    }];

    if let Some(params) = params {
        match filter.enhance(image, params) {
            Some(enhanced) => variants.push(ImageVariant {
                image: enhanced,
                method: EnhanceMethod::ContrastEnhanced,
            }),
            None => log::warn!("[plan] enhancement filter produced no image, identity only"),
        }
    }

    log::debug!("[plan] {} variant(s)", variants.len());
    variants
}
