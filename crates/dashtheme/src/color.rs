//! Color types and shade derivation.
//!
//! This module provides the color primitives the store renders with:
//! - [`Color`] - An unvalidated color string, as the user supplied it
//! - [`Rgb`] - A parsed 6-digit hex color
//! - [`Shade`] - A derived color whose channels are not clamped
//!
//! # Example
//!
//! ```rust
//! use dashtheme::{generate_shade, hex_to_rgb};
//!
//! let red = hex_to_rgb("#ff0000").unwrap();
//! assert_eq!(generate_shade(red, 900).to_string(), "rgb(408, 0, 0)");
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

/// Shade key that leaves the base color untouched.
pub const BASE_SHADE: i32 = 500;

/// A color string exactly as it was set.
///
/// No validation happens on construction. A value that is not a 6-digit hex
/// color is still stored and rendered as `--primary`, it just never yields
/// a palette.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Color(pub String);

impl Color {
    /// Create a new color from a string.
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Returns the raw color string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parse as RGB if this is a 6-digit hex color.
    pub fn as_rgb(&self) -> Option<Rgb> {
        hex_to_rgb(&self.0)
    }

    /// Returns true if the string is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for Color {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for Color {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An RGB color with 8-bit channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Encode as lowercase `#rrggbb`.
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl From<(u8, u8, u8)> for Rgb {
    fn from((r, g, b): (u8, u8, u8)) -> Self {
        Self { r, g, b }
    }
}

/// A derived color.
///
/// Channels are the rounded products of the base channels and the shade
/// scale. They are never clamped, so shades above 500 can exceed 255.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Shade {
    pub r: i64,
    pub g: i64,
    pub b: i64,
}

impl From<Rgb> for Shade {
    fn from(rgb: Rgb) -> Self {
        Self {
            r: i64::from(rgb.r),
            g: i64::from(rgb.g),
            b: i64::from(rgb.b),
        }
    }
}

impl fmt::Display for Shade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgb({}, {}, {})", self.r, self.g, self.b)
    }
}

/// Parse a `#rrggbb` (or `rrggbb`) hex string.
///
/// Exactly two hex digits per channel are required. Shorthand (`#fff`),
/// alpha (`#ffffff80`), and surrounding whitespace all yield `None`.
pub fn hex_to_rgb(hex: &str) -> Option<Rgb> {
    let digits = hex.strip_prefix('#').unwrap_or(hex);
    if digits.len() != 6 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }

    let r = u8::from_str_radix(&digits[0..2], 16).ok()?;
    let g = u8::from_str_radix(&digits[2..4], 16).ok()?;
    let b = u8::from_str_radix(&digits[4..6], 16).ok()?;
    Some(Rgb { r, g, b })
}

/// Channel multiplier for a shade key.
///
/// Keys below 500 scale channels down by up to 0.8 at shade 0; keys above
/// 500 scale them up by 0.6 per 400 steps.
pub fn shade_scale(shade: i32) -> f64 {
    if shade == BASE_SHADE {
        1.0
    } else if shade < BASE_SHADE {
        let factor = f64::from(BASE_SHADE - shade) / 500.0 * 0.8;
        1.0 - factor
    } else {
        let factor = f64::from(shade - BASE_SHADE) / 400.0 * 0.6;
        1.0 + factor
    }
}

/// Derive the color for `shade` from `rgb`.
///
/// Shade 500 returns the base color. Note that keys below 500 darken rather
/// than lighten the color, and keys above 500 push channels past 255.
pub fn generate_shade(rgb: Rgb, shade: i32) -> Shade {
    let scale = shade_scale(shade);
    Shade {
        r: round_half_up(f64::from(rgb.r) * scale),
        g: round_half_up(f64::from(rgb.g) * scale),
        b: round_half_up(f64::from(rgb.b) * scale),
    }
}

// Ties round toward positive infinity, so -2.5 becomes -2.
fn round_half_up(value: f64) -> i64 {
    (value + 0.5).floor() as i64
}
