//! Colorized rasterization of bands.

use product_io::{Band, Color, ColorPoint, ImageInfo};
use tracing::debug;

use crate::error::{RenderError, RenderResult};
use crate::raster::RasterImage;
use crate::stretch::RgbImageInfo;

/// Rasterize a single band into a colored image using its render info.
///
/// Samples are mapped through the palette's piecewise-linear ramp; values
/// outside the palette range clamp to the end colors, NaN samples take the
/// info's no-data color.
pub fn render_band(band: &Band, info: &ImageInfo) -> RenderResult<RasterImage> {
    let sorted = info.palette.sorted_points();
    if sorted.is_empty() {
        return Err(RenderError::EmptyPalette);
    }

    let (width, height) = (band.width(), band.height());
    let no_data = info.no_data_color.to_rgba();
    let mut pixels = Vec::with_capacity(width * height * 4);

    for &sample in band.samples() {
        let rgba = if sample.is_nan() {
            no_data
        } else {
            palette_color(&sorted, sample as f64).to_rgba()
        };
        pixels.extend_from_slice(&rgba);
    }

    debug!(
        band = band.name(),
        width,
        height,
        points = sorted.len(),
        "Rendered colorized band image"
    );
    Ok(RasterImage::new(width, height, pixels))
}

/// Interpolate the ramp color for a sample value. `sorted` must be control
/// points in non-decreasing sample order and non-empty.
pub fn palette_color(sorted: &[ColorPoint], sample: f64) -> Color {
    let first = &sorted[0];
    let last = &sorted[sorted.len() - 1];

    if sample <= first.sample {
        return first.color;
    }
    if sample >= last.sample {
        return last.color;
    }

    for pair in sorted.windows(2) {
        let (low, high) = (&pair[0], &pair[1]);
        if sample <= high.sample {
            let span = high.sample - low.sample;
            if span.abs() < f64::EPSILON {
                return high.color;
            }
            let t = (sample - low.sample) / span;
            return low.color.lerp(&high.color, t);
        }
    }

    last.color
}

/// Rasterize three bands into an RGB composite using per-channel stretches.
///
/// Bands are assigned in red/green/blue order and must share dimensions.
/// A NaN sample in any channel makes that pixel transparent.
pub fn render_rgb(bands: [&Band; 3], info: &RgbImageInfo) -> RenderResult<RasterImage> {
    let [red, green, blue] = bands;

    let (width, height) = (red.width(), red.height());
    for band in [green, blue] {
        if band.width() != width || band.height() != height {
            return Err(RenderError::BandMismatch(format!(
                "'{}' is {}x{}, '{}' is {}x{}",
                red.name(),
                width,
                height,
                band.name(),
                band.width(),
                band.height()
            )));
        }
    }

    let mut pixels = Vec::with_capacity(width * height * 4);
    let channels = [
        (red.samples(), info.red),
        (green.samples(), info.green),
        (blue.samples(), info.blue),
    ];

    for i in 0..width * height {
        let mut rgba = [0u8; 4];
        let mut valid = true;
        for (c, (samples, stretch)) in channels.iter().enumerate() {
            match stretch.scale(samples[i]) {
                Some(v) => rgba[c] = v,
                None => {
                    valid = false;
                    break;
                }
            }
        }
        rgba[3] = if valid { 255 } else { 0 };
        if !valid {
            rgba = [0, 0, 0, 0];
        }
        pixels.extend_from_slice(&rgba);
    }

    debug!(
        red = red.name(),
        green = green.name(),
        blue = blue.name(),
        width,
        height,
        "Rendered RGB composite image"
    );
    Ok(RasterImage::new(width, height, pixels))
}
