//! CSS colors found in node and edge styles.
//!
//! Styles keep colors as the strings the user wrote. A [`Color`] is the
//! parsed form the exporter needs: something it can write back as an SVG
//! paint value, whose opacity it can read, and which it can turn into a
//! marker id.

use std::{fmt, str::FromStr};

use color::{DynamicColor, Srgb};
use thiserror::Error;

/// A style string that is not a CSS color.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid color `{input}`: {reason}")]
pub struct ParseColorError {
    input: String,
    reason: String,
}

/// A parsed CSS color such as `#ff0072`, `rgb(0 0 0 / 50%)` or `white`.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Color(DynamicColor);

impl Color {
    /// Parses a CSS color string.
    ///
    /// # Examples
    ///
    /// ```
    /// use flowpad_core::color::Color;
    ///
    /// assert!(Color::new("#FF0072").is_ok());
    /// assert!(Color::new("reddish").is_err());
    /// ```
    pub fn new(input: &str) -> Result<Self, ParseColorError> {
        input.parse()
    }

    /// Opacity between 0.0 and 1.0.
    pub fn alpha(&self) -> f32 {
        self.0.components[3]
    }

    /// Hex digits of the sRGB value and opacity, e.g. `ff0072ff`.
    ///
    /// Two spellings of the same color share a key, so edges drawn in it
    /// share one arrow marker.
    pub fn marker_key(&self) -> String {
        let rgba = self.0.to_alpha_color::<Srgb>().to_rgba8();
        format!("{:02x}{:02x}{:02x}{:02x}", rgba.r, rgba.g, rgba.b, rgba.a)
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::new("black").expect("black is a CSS color")
    }
}

impl FromStr for Color {
    type Err = ParseColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DynamicColor::from_str(s.trim())
            .map(Self)
            .map_err(|err| ParseColorError {
                input: s.to_string(),
                reason: err.to_string(),
            })
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&Color> for svg::node::Value {
    fn from(color: &Color) -> Self {
        Self::from(color.to_string())
    }
}

impl From<Color> for svg::node::Value {
    fn from(color: Color) -> Self {
        Self::from(&color)
    }
}
