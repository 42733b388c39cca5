//! Image encoding and file writing.

use std::fs;
use std::path::Path;
use std::str::FromStr;

use tracing::info;

use crate::error::{RenderError, RenderResult};
use crate::png;
use crate::raster::RasterImage;

/// Supported output image formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
}

impl FromStr for ImageFormat {
    type Err = RenderError;

    /// Parse a format tag, case-insensitively.
    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        match tag.to_ascii_lowercase().as_str() {
            "png" => Ok(ImageFormat::Png),
            _ => Err(RenderError::UnsupportedFormat(tag.to_string())),
        }
    }
}

impl ImageFormat {
    /// File extension for this format, without the dot.
    pub fn extension(&self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
        }
    }
}

impl std::fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ImageFormat::Png => write!(f, "PNG"),
        }
    }
}

/// Deflate effort for PNG encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PngCompression {
    #[default]
    Fast,
    Balanced,
    Best,
}

impl PngCompression {
    fn to_flate2(self) -> flate2::Compression {
        match self {
            PngCompression::Fast => flate2::Compression::fast(),
            PngCompression::Balanced => flate2::Compression::default(),
            PngCompression::Best => flate2::Compression::best(),
        }
    }
}

/// Explicit encoder configuration, passed per call rather than held as
/// process-wide state.
#[derive(Debug, Clone, Copy)]
pub struct EncodeOptions {
    /// Use indexed PNG when the image has few enough unique colors
    pub prefer_indexed: bool,

    pub compression: PngCompression,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self {
            prefer_indexed: true,
            compression: PngCompression::Fast,
        }
    }
}

/// Encode a rasterized image and write it to `path`.
///
/// Nothing is written when encoding fails, so a failed call leaves no
/// partial output file behind.
pub fn write_image(
    image: &RasterImage,
    path: impl AsRef<Path>,
    format: ImageFormat,
    options: &EncodeOptions,
) -> RenderResult<()> {
    let path = path.as_ref();
    let encoded = encode(image, format, options)?;
    fs::write(path, &encoded)?;
    info!(
        path = %path.display(),
        format = %format,
        width = image.width(),
        height = image.height(),
        bytes = encoded.len(),
        "Wrote image"
    );
    Ok(())
}

/// Encode a rasterized image to bytes in the requested format.
pub fn encode(
    image: &RasterImage,
    format: ImageFormat,
    options: &EncodeOptions,
) -> RenderResult<Vec<u8>> {
    let compression = options.compression.to_flate2();
    match format {
        ImageFormat::Png => {
            if options.prefer_indexed {
                png::encode_auto(image.pixels(), image.width(), image.height(), compression)
            } else {
                png::encode_rgba(image.pixels(), image.width(), image.height(), compression)
            }
        }
    }
}
