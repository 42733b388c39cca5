//! Products and the bands they contain.

use std::path::Path;

use crate::error::{ProductError, ProductResult};
use crate::format;
use crate::palette::ImageInfo;

/// A single raster layer of geophysical sample values within a product.
///
/// Samples are `f32` in row-major order; NaN marks no-data. A band may
/// carry attached render metadata ([`ImageInfo`]) describing how its
/// samples map to colors.
#[derive(Debug, Clone)]
pub struct Band {
    name: String,
    width: usize,
    height: usize,
    samples: Vec<f32>,
    image_info: Option<ImageInfo>,
}

impl Band {
    /// Create a band from raw samples. The sample count must match
    /// `width * height` and the extent must be non-zero.
    pub fn new(
        name: impl Into<String>,
        width: usize,
        height: usize,
        samples: Vec<f32>,
    ) -> ProductResult<Self> {
        let name = name.into();
        if width == 0 || height == 0 {
            return Err(ProductError::EmptyBand(name));
        }
        if samples.len() != width * height {
            return Err(ProductError::Truncated(format!(
                "band '{}' has {} samples, expected {}",
                name,
                samples.len(),
                width * height
            )));
        }
        Ok(Self {
            name,
            width,
            height,
            samples,
            image_info: None,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Row-major sample data, `width * height` values.
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// Sample at pixel position, or `None` outside the band extent.
    pub fn sample_at(&self, x: usize, y: usize) -> Option<f32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.samples[y * self.width + x])
    }

    /// Attach render metadata to this band.
    pub fn set_image_info(&mut self, info: ImageInfo) {
        self.image_info = Some(info);
    }

    /// The attached render metadata, if any.
    pub fn image_info(&self) -> Option<&ImageInfo> {
        self.image_info.as_ref()
    }
}

/// A container of one or more bands read from a product file.
///
/// All band data is held in memory; dropping the product releases it.
#[derive(Debug, Clone)]
pub struct Product {
    bands: Vec<Band>,
}

impl Product {
    /// Assemble a product from bands, rejecting duplicate band names.
    pub fn new(bands: Vec<Band>) -> ProductResult<Self> {
        for (i, band) in bands.iter().enumerate() {
            if bands[..i].iter().any(|b| b.name == band.name) {
                return Err(ProductError::DuplicateBand(band.name.clone()));
            }
        }
        Ok(Self { bands })
    }

    /// Open a product file, reading all band data eagerly. The file handle
    /// is released before this returns.
    pub fn open(path: impl AsRef<Path>) -> ProductResult<Self> {
        format::read_product(path.as_ref())
    }

    /// Write the product to a file in the container format.
    pub fn save(&self, path: impl AsRef<Path>) -> ProductResult<()> {
        format::write_product(self, path.as_ref())
    }

    pub fn bands(&self) -> &[Band] {
        &self.bands
    }

    pub fn num_bands(&self) -> usize {
        self.bands.len()
    }

    pub fn band_names(&self) -> Vec<&str> {
        self.bands.iter().map(|b| b.name()).collect()
    }

    pub fn contains_band(&self, name: &str) -> bool {
        self.bands.iter().any(|b| b.name == name)
    }

    /// Look up a band by name.
    pub fn band(&self, name: &str) -> ProductResult<&Band> {
        self.bands
            .iter()
            .find(|b| b.name == name)
            .ok_or_else(|| ProductError::BandNotFound(name.to_string()))
    }

    /// Look up a band by name for modification (e.g. attaching render
    /// metadata).
    pub fn band_mut(&mut self, name: &str) -> ProductResult<&mut Band> {
        self.bands
            .iter_mut()
            .find(|b| b.name == name)
            .ok_or_else(|| ProductError::BandNotFound(name.to_string()))
    }
}
