//! The shade palette derived from the primary color.

use crate::color::{Color, Rgb, Shade, generate_shade};

/// Shade keys rendered as CSS custom properties: 50, 150, ..., 850.
pub const SHADE_KEYS: [i32; 9] = [50, 150, 250, 350, 450, 550, 650, 750, 850];

/// A palette of shades for one base color.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    base: Rgb,
    shades: Vec<(i32, Shade)>,
}

impl Palette {
    /// Build the palette for a parsed base color.
    pub fn new(base: Rgb) -> Self {
        let shades = SHADE_KEYS
            .iter()
            .map(|&key| (key, generate_shade(base, key)))
            .collect();
        Self { base, shades }
    }

    /// Build the palette for a color string, or `None` if it is not `#rrggbb`.
    pub fn from_color(color: &Color) -> Option<Self> {
        color.as_rgb().map(Self::new)
    }

    /// Returns the base color.
    pub fn base(&self) -> Rgb {
        self.base
    }

    /// Returns `(key, shade)` pairs in ascending key order.
    pub fn shades(&self) -> &[(i32, Shade)] {
        &self.shades
    }

    /// Returns the shade for a key, if the palette renders it.
    pub fn get(&self, key: i32) -> Option<Shade> {
        self.shades
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, shade)| *shade)
    }

    /// Returns `(property, value)` pairs such as `("--primary-50", "rgb(..)")`.
    pub fn css_properties(&self, prefix: &str) -> Vec<(String, String)> {
        self.shades
            .iter()
            .map(|(key, shade)| (shade_property(prefix, *key), shade.to_string()))
            .collect()
    }
}

/// Name of the custom property carrying `key`, e.g. `--primary-450`.
pub fn shade_property(prefix: &str, key: i32) -> String {
    format!("{prefix}-{key}")
}
