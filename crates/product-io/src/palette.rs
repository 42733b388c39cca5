//! Color palette definitions and band render metadata.

use crate::color::Color;
use serde::{Deserialize, Serialize};

/// A single control point of a color palette: the color assigned to one
/// sample value, in the band's geophysical units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorPoint {
    /// Sample value at this point
    pub sample: f64,

    /// Color at this point
    pub color: Color,

    /// Optional label for legend rendering
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl ColorPoint {
    pub fn new(sample: f64, color: Color) -> Self {
        Self {
            sample,
            color,
            label: None,
        }
    }

    pub fn with_label(sample: f64, color: Color, label: impl Into<String>) -> Self {
        Self {
            sample,
            color,
            label: Some(label.into()),
        }
    }
}

/// An ordered sequence of control points defining a piecewise-linear color
/// ramp over geophysical sample values.
///
/// Points are stored exactly as given. Callers are expected to supply them
/// in non-decreasing sample order for sensible interpolation, but the order
/// is not validated; rasterization sorts a copy of the points (stable, so
/// ties keep their given order).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorPaletteDef {
    points: Vec<ColorPoint>,
}

impl ColorPaletteDef {
    pub fn new(points: Vec<ColorPoint>) -> Self {
        Self { points }
    }

    /// The control points, in the order they were supplied.
    pub fn points(&self) -> &[ColorPoint] {
        &self.points
    }

    pub fn num_points(&self) -> usize {
        self.points.len()
    }

    /// Control points cloned and stably sorted by sample value.
    pub fn sorted_points(&self) -> Vec<ColorPoint> {
        let mut sorted = self.points.clone();
        sorted.sort_by(|a, b| {
            a.sample
                .partial_cmp(&b.sample)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        sorted
    }

    /// The (min, max) sample values covered by the palette, or `None` for an
    /// empty palette.
    pub fn sample_range(&self) -> Option<(f64, f64)> {
        let sorted = self.sorted_points();
        match (sorted.first(), sorted.last()) {
            (Some(first), Some(last)) => Some((first.sample, last.sample)),
            _ => None,
        }
    }

    /// Parse a palette definition from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Serialize the palette definition to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Render metadata attached to a band: how sample values map to pixel
/// colors when the band is rasterized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageInfo {
    /// The color ramp over geophysical sample values
    pub palette: ColorPaletteDef,

    /// Color for NaN (no-data) samples
    #[serde(default = "default_no_data_color")]
    pub no_data_color: Color,
}

fn default_no_data_color() -> Color {
    Color::TRANSPARENT
}

impl ImageInfo {
    pub fn new(palette: ColorPaletteDef) -> Self {
        Self {
            palette,
            no_data_color: Color::TRANSPARENT,
        }
    }

    pub fn with_no_data_color(mut self, color: Color) -> Self {
        self.no_data_color = color;
        self
    }
}
