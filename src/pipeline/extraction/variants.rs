//! Raster preprocessing variants tried before OCR.
//!
//! Each variant is a pure image-to-image transform. The engine runs the
//! backend on every variant and greedily keeps the one yielding the most
//! recognized text, so variants only need to be plausible, not perfect.

use image::{DynamicImage, GrayImage, Luma, RgbImage};
use serde::{Deserialize, Serialize};

/// Global threshold cutoff. Pixels above are white, at or below are black.
const GLOBAL_THRESHOLD: u8 = 150;

/// Adaptive threshold window half-size (15x15 neighborhood) and bias.
const ADAPTIVE_RADIUS: u32 = 7;
const ADAPTIVE_BIAS: i32 = 10;

/// Contrast boost applied by the contrast variant, in percent.
const CONTRAST_BOOST: f32 = 40.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrepVariant {
    Original,
    Grayscale,
    Contrast,
    GlobalThreshold,
    AdaptiveThreshold,
}

impl PrepVariant {
    /// All variants, in the order the engine tries them.
    pub const ALL: [PrepVariant; 5] = [
        PrepVariant::Original,
        PrepVariant::Grayscale,
        PrepVariant::Contrast,
        PrepVariant::GlobalThreshold,
        PrepVariant::AdaptiveThreshold,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Original => "original",
            Self::Grayscale => "grayscale",
            Self::Contrast => "contrast",
            Self::GlobalThreshold => "global_threshold",
            Self::AdaptiveThreshold => "adaptive_threshold",
        }
    }

    /// Apply this variant to an image.
    pub fn apply(&self, image: &RgbImage) -> RgbImage {
        match self {
            Self::Original => image.clone(),
            Self::Grayscale => gray_to_rgb(&to_gray(image)),
            Self::Contrast => image::imageops::contrast(image, CONTRAST_BOOST),
            Self::GlobalThreshold => gray_to_rgb(&global_threshold(&to_gray(image))),
            Self::AdaptiveThreshold => gray_to_rgb(&adaptive_threshold(&to_gray(image))),
        }
    }
}

pub fn to_gray(image: &RgbImage) -> GrayImage {
    image::imageops::grayscale(image)
}

fn gray_to_rgb(gray: &GrayImage) -> RgbImage {
    DynamicImage::ImageLuma8(gray.clone()).to_rgb8()
}

/// Fixed global threshold: text-vs-background split at a single cutoff.
pub fn global_threshold(gray: &GrayImage) -> GrayImage {
    let mut out = gray.clone();
    for pixel in out.pixels_mut() {
        pixel.0[0] = if pixel.0[0] > GLOBAL_THRESHOLD { 255 } else { 0 };
    }
    out
}

/// Mean adaptive threshold: each pixel compared to its local window mean
/// minus a small bias. Handles uneven lighting that defeats the global cut.
pub fn adaptive_threshold(gray: &GrayImage) -> GrayImage {
    let (width, height) = gray.dimensions();
    if width == 0 || height == 0 {
        return gray.clone();
    }

    // Summed-area table for O(1) window means.
    let w = width as usize;
    let h = height as usize;
    let mut integral = vec![0u64; (w + 1) * (h + 1)];
    for y in 0..h {
        let mut row_sum = 0u64;
        for x in 0..w {
            row_sum += gray.get_pixel(x as u32, y as u32).0[0] as u64;
            integral[(y + 1) * (w + 1) + (x + 1)] = integral[y * (w + 1) + (x + 1)] + row_sum;
        }
    }

    let mut out = GrayImage::new(width, height);
    let r = ADAPTIVE_RADIUS as i64;
    for y in 0..h as i64 {
        for x in 0..w as i64 {
            let x0 = (x - r).max(0) as usize;
            let y0 = (y - r).max(0) as usize;
            let x1 = ((x + r) as usize + 1).min(w);
            let y1 = ((y + r) as usize + 1).min(h);
            let area = ((x1 - x0) * (y1 - y0)) as u64;

            let sum = integral[y1 * (w + 1) + x1] + integral[y0 * (w + 1) + x0]
                - integral[y0 * (w + 1) + x1]
                - integral[y1 * (w + 1) + x0];
            let mean = (sum / area) as i32;

            let value = gray.get_pixel(x as u32, y as u32).0[0] as i32;
            let bit = if value > mean - ADAPTIVE_BIAS { 255 } else { 0 };
            out.put_pixel(x as u32, y as u32, Luma([bit]));
        }
    }
    out
}
