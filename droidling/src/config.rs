//! Widget options and measurement

use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::ColorError;

/// An opaque colour
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    /// The figure's signature green
    pub const DEFAULT: Color = Color::rgb(0xA4, 0xC6, 0x39);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// From 0xRRGGBB; anything above 24 bits is ignored
    pub const fn from_packed(packed: u32) -> Self {
        Self::rgb((packed >> 16) as u8, (packed >> 8) as u8, packed as u8)
    }

    pub const fn packed(&self) -> u32 {
        (self.r as u32) << 16 | (self.g as u32) << 8 | self.b as u32
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

impl FromStr for Color {
    type Err = ColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let Some(hex) = s.strip_prefix('#') else {
            return Err(ColorError::InvalidFormat(s.to_string()));
        };
        if hex.len() != 6 {
            return Err(ColorError::InvalidFormat(s.to_string()));
        }
        let packed =
            u32::from_str_radix(hex, 16).map_err(|_| ColorError::InvalidHex(s.to_string()))?;
        Ok(Color::from_packed(packed))
    }
}

impl TryFrom<String> for Color {
    type Error = ColorError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Color> for String {
    fn from(value: Color) -> Self {
        value.to_string()
    }
}

/// Options a host sets up front, as it would from layout attributes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DroidConfig {
    /// Every dimension of the figure is a multiple of this, px
    pub width_unit: f64,
    /// Keep the figure inside the padded area
    pub limit_to_bounds: bool,
    pub color: Color,
}

impl DroidConfig {
    pub const DEFAULT_WIDTH_UNIT: f64 = 100.0;
}

impl Default for DroidConfig {
    fn default() -> Self {
        Self {
            width_unit: Self::DEFAULT_WIDTH_UNIT,
            limit_to_bounds: false,
            color: Color::DEFAULT,
        }
    }
}

/// A parent's constraint on one dimension
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum MeasureSpec {
    Exactly(f64),
    AtMost(f64),
    Unspecified,
}

impl MeasureSpec {
    pub fn resolve(&self, desired: f64) -> f64 {
        match self {
            MeasureSpec::Exactly(size) => *size,
            MeasureSpec::AtMost(size) => desired.min(*size),
            MeasureSpec::Unspecified => desired,
        }
    }
}
