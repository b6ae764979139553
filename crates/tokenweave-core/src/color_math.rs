// ABOUTME: sRGB hex parsing, relative luminance and WCAG contrast calculations
// ABOUTME: Provides the AA on-tone pick and alpha compositing for emphasis opacities

use crate::error::ColorError;
use serde::{Deserialize, Serialize};
use std::fmt;
use tokenweave_logging::warn;

/// WCAG contrast ratios for accessibility compliance
pub struct ContrastRatios;

impl ContrastRatios {
    pub const AAA_NORMAL: f64 = 7.0;
    pub const AA_NORMAL: f64 = 4.5;
    pub const AA_LARGE: f64 = 3.0;
}

/// WCAG compliance levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WcagLevel {
    /// Level AA, large text
    #[serde(rename = "aa-large")]
    AaLarge,
    /// Level AA, normal text (recommended)
    #[serde(rename = "aa")]
    Aa,
    /// Level AAA, normal text
    #[serde(rename = "aaa")]
    Aaa,
}

impl WcagLevel {
    pub fn threshold(self) -> f64 {
        match self {
            WcagLevel::AaLarge => ContrastRatios::AA_LARGE,
            WcagLevel::Aa => ContrastRatios::AA_NORMAL,
            WcagLevel::Aaa => ContrastRatios::AAA_NORMAL,
        }
    }
}

/// 8-bit sRGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb::new(0xff, 0xff, 0xff);
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Lowercase `#rrggbb`
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

pub const WHITE_HEX: &str = "#ffffff";
pub const BLACK_HEX: &str = "#000000";

/// On-tone returned when white and black contrast equally against a background
pub const ON_TONE_TIE_BREAK: Rgb = Rgb::BLACK;

/// Parse a 6-digit hex color, with or without a leading `#`.
pub fn parse_hex(raw: &str) -> Result<Rgb, ColorError> {
    let trimmed = raw.trim();
    let digits = trimmed.strip_prefix('#').unwrap_or(trimmed);
    if digits.len() != 6 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(ColorError::invalid_hex(raw));
    }

    let channel = |range: std::ops::Range<usize>| {
        u8::from_str_radix(&digits[range], 16).map_err(|_| ColorError::invalid_hex(raw))
    };

    Ok(Rgb::new(channel(0..2)?, channel(2..4)?, channel(4..6)?))
}

/// Parse a hex color, falling back to black (and logging) when it is malformed.
pub fn parse_hex_or_black(raw: &str) -> Rgb {
    match parse_hex(raw) {
        Ok(rgb) => rgb,
        Err(err) => {
            warn!(value = raw, error = %err, "Falling back to black for malformed color");
            Rgb::BLACK
        }
    }
}

fn srgb_to_linear(channel: u8) -> f64 {
    let v = f64::from(channel) / 255.0;
    if v <= 0.04045 {
        v / 12.92
    } else {
        ((v + 0.055) / 1.055).powf(2.4)
    }
}

/// Relative luminance per WCAG 2.x (BT.709 weights over linear sRGB)
pub fn relative_luminance(rgb: Rgb) -> f64 {
    0.2126 * srgb_to_linear(rgb.r) + 0.7152 * srgb_to_linear(rgb.g) + 0.0722 * srgb_to_linear(rgb.b)
}

/// Contrast ratio between two colors, in `[1, 21]`
pub fn contrast_ratio_rgb(a: Rgb, b: Rgb) -> f64 {
    let lum_a = relative_luminance(a);
    let lum_b = relative_luminance(b);

    let lighter = lum_a.max(lum_b);
    let darker = lum_a.min(lum_b);

    (lighter + 0.05) / (darker + 0.05)
}

/// Contrast ratio between two hex colors. Malformed input is treated as black.
pub fn contrast_ratio(hex_a: &str, hex_b: &str) -> f64 {
    contrast_ratio_rgb(parse_hex_or_black(hex_a), parse_hex_or_black(hex_b))
}

/// Contrast of `foreground` drawn at opacity `alpha` over an opaque `background`
pub fn contrast_ratio_at(foreground: Rgb, background: Rgb, alpha: f64) -> f64 {
    contrast_ratio_rgb(composite_over(foreground, background, alpha), background)
}

pub fn meets(ratio: f64, threshold: f64) -> bool {
    ratio >= threshold
}

/// White or black, whichever contrasts more with `background`
pub fn pick_aa_on_tone_rgb(background: Rgb) -> Rgb {
    let white = contrast_ratio_rgb(background, Rgb::WHITE);
    let black = contrast_ratio_rgb(background, Rgb::BLACK);

    if white > black {
        Rgb::WHITE
    } else if black > white {
        Rgb::BLACK
    } else {
        ON_TONE_TIE_BREAK
    }
}

/// Hex form of [`pick_aa_on_tone_rgb`]
pub fn pick_aa_on_tone(background_hex: &str) -> &'static str {
    if pick_aa_on_tone_rgb(parse_hex_or_black(background_hex)) == Rgb::WHITE {
        WHITE_HEX
    } else {
        BLACK_HEX
    }
}

/// Source-over composite of `foreground` at `alpha` onto an opaque `background`
pub fn composite_over(foreground: Rgb, background: Rgb, alpha: f64) -> Rgb {
    let alpha = alpha.clamp(0.0, 1.0);
    let blend = |fg: u8, bg: u8| {
        let value = f64::from(fg) * alpha + f64::from(bg) * (1.0 - alpha);
        value.round().clamp(0.0, 255.0) as u8
    };

    Rgb::new(
        blend(foreground.r, background.r),
        blend(foreground.g, background.g),
        blend(foreground.b, background.b),
    )
}
