//! Legend images depicting a band's color ramp and value labels.

use image::{Rgba, RgbaImage};
use product_io::{Band, Color, ImageInfo};
use tracing::debug;

use crate::error::{RenderError, RenderResult};
use crate::font;
use crate::raster::RasterImage;
use crate::render::palette_color;

const MARGIN: u32 = 8;
const HEADER_GAP: u32 = 6;
const TICK_LEN: u32 = 4;
const LABEL_GAP: u32 = 3;

/// Legend layout direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Orientation {
    #[default]
    Horizontal,
    Vertical,
}

/// Appearance options for legend rendering.
#[derive(Debug, Clone)]
pub struct LegendOptions {
    /// Header line; the band name is used when not set
    pub header_text: Option<String>,

    pub orientation: Orientation,

    /// Length of the color ramp along its axis, in pixels
    pub ramp_length: u32,

    /// Thickness of the color ramp across its axis, in pixels
    pub ramp_thickness: u32,

    /// Integer scale factor for the bitmap font
    pub text_scale: u32,

    pub foreground: Color,
    pub background: Color,

    /// 0.0 = opaque background, 1.0 = fully transparent
    pub background_transparency: f32,
}

impl Default for LegendOptions {
    fn default() -> Self {
        Self {
            header_text: None,
            orientation: Orientation::Horizontal,
            ramp_length: 256,
            ramp_thickness: 24,
            text_scale: 2,
            foreground: Color::BLACK,
            background: Color::WHITE,
            background_transparency: 0.0,
        }
    }
}

/// Build a legend image from a band's render info: the color ramp, a tick
/// and label at each palette control point, and a header line.
pub fn build_legend(
    info: &ImageInfo,
    band: &Band,
    options: &LegendOptions,
) -> RenderResult<RasterImage> {
    let sorted = info.palette.sorted_points();
    if sorted.is_empty() {
        return Err(RenderError::EmptyPalette);
    }

    let min = sorted[0].sample;
    let max = sorted[sorted.len() - 1].sample;
    let span = max - min;

    let header = options
        .header_text
        .clone()
        .unwrap_or_else(|| band.name().to_string());

    // Relative position and text of each tick
    let labels: Vec<(f64, String)> = sorted
        .iter()
        .map(|p| {
            let t = if span.abs() < f64::EPSILON {
                0.5
            } else {
                (p.sample - min) / span
            };
            let text = p
                .label
                .clone()
                .unwrap_or_else(|| format_sample(p.sample));
            (t, text)
        })
        .collect();

    let scale = options.text_scale.max(1) as usize;
    let image = match options.orientation {
        Orientation::Horizontal => layout_horizontal(&sorted, &labels, &header, options, scale),
        Orientation::Vertical => layout_vertical(&sorted, &labels, &header, options, scale),
    };

    debug!(
        band = band.name(),
        width = image.width(),
        height = image.height(),
        ticks = labels.len(),
        "Built legend image"
    );
    Ok(image)
}

fn layout_horizontal(
    sorted: &[product_io::ColorPoint],
    labels: &[(f64, String)],
    header: &str,
    options: &LegendOptions,
    scale: usize,
) -> RasterImage {
    let ramp_len = options.ramp_length.max(2);
    let text_h = font::text_height(scale) as u32;
    let header_w = font::text_width(header, scale) as u32;

    let content_w = ramp_len.max(header_w);
    let width = 2 * MARGIN + content_w;
    let height =
        MARGIN + text_h + HEADER_GAP + options.ramp_thickness + TICK_LEN + LABEL_GAP + text_h + MARGIN;

    let mut img = background_image(width, height, options);
    let fg = rgba(options.foreground);

    font::draw_text(&mut img, header, MARGIN as i32, MARGIN as i32, scale, fg);

    let ramp_x0 = MARGIN;
    let ramp_y0 = MARGIN + text_h + HEADER_GAP;
    draw_ramp_horizontal(&mut img, sorted, ramp_x0, ramp_y0, ramp_len, options.ramp_thickness);

    let tick_y0 = ramp_y0 + options.ramp_thickness;
    let label_y = (tick_y0 + TICK_LEN + LABEL_GAP) as i32;
    for (t, text) in labels {
        let tick_x = ramp_x0 + (t * (ramp_len - 1) as f64).round() as u32;
        for dy in 0..TICK_LEN {
            img.put_pixel(tick_x, tick_y0 + dy, fg);
        }
        // Center the label under its tick, clamped inside the image
        let text_w = font::text_width(text, scale) as i32;
        let x = (tick_x as i32 - text_w / 2)
            .clamp(0, (width as i32 - text_w).max(0));
        font::draw_text(&mut img, text, x, label_y, scale, fg);
    }

    RasterImage::new(width as usize, height as usize, img.into_raw())
}

fn layout_vertical(
    sorted: &[product_io::ColorPoint],
    labels: &[(f64, String)],
    header: &str,
    options: &LegendOptions,
    scale: usize,
) -> RasterImage {
    let ramp_len = options.ramp_length.max(2);
    let text_h = font::text_height(scale) as u32;
    let header_w = font::text_width(header, scale) as u32;
    let max_label_w = labels
        .iter()
        .map(|(_, text)| font::text_width(text, scale) as u32)
        .max()
        .unwrap_or(0);

    let content_w = (options.ramp_thickness + TICK_LEN + LABEL_GAP + max_label_w).max(header_w);
    let width = 2 * MARGIN + content_w;
    let height = MARGIN + text_h + HEADER_GAP + ramp_len + MARGIN;

    let mut img = background_image(width, height, options);
    let fg = rgba(options.foreground);

    font::draw_text(&mut img, header, MARGIN as i32, MARGIN as i32, scale, fg);

    let ramp_x0 = MARGIN;
    let ramp_y0 = MARGIN + text_h + HEADER_GAP;

    // Highest sample at the top
    for dy in 0..ramp_len {
        let t = 1.0 - dy as f64 / (ramp_len - 1) as f64;
        let sample = sorted[0].sample
            + t * (sorted[sorted.len() - 1].sample - sorted[0].sample);
        let color = rgba(palette_color(sorted, sample));
        for dx in 0..options.ramp_thickness {
            img.put_pixel(ramp_x0 + dx, ramp_y0 + dy, color);
        }
    }

    let tick_x0 = ramp_x0 + options.ramp_thickness;
    let label_x = (tick_x0 + TICK_LEN + LABEL_GAP) as i32;
    for (t, text) in labels {
        let tick_y = ramp_y0 + ((1.0 - t) * (ramp_len - 1) as f64).round() as u32;
        for dx in 0..TICK_LEN {
            img.put_pixel(tick_x0 + dx, tick_y, fg);
        }
        let y = (tick_y as i32 - (text_h / 2) as i32)
            .clamp(0, (height as i32 - text_h as i32).max(0));
        font::draw_text(&mut img, text, label_x, y, scale, fg);
    }

    RasterImage::new(width as usize, height as usize, img.into_raw())
}

fn draw_ramp_horizontal(
    img: &mut RgbaImage,
    sorted: &[product_io::ColorPoint],
    x0: u32,
    y0: u32,
    length: u32,
    thickness: u32,
) {
    let min = sorted[0].sample;
    let max = sorted[sorted.len() - 1].sample;
    for dx in 0..length {
        let t = dx as f64 / (length - 1) as f64;
        let color = rgba(palette_color(sorted, min + t * (max - min)));
        for dy in 0..thickness {
            img.put_pixel(x0 + dx, y0 + dy, color);
        }
    }
}

fn background_image(width: u32, height: u32, options: &LegendOptions) -> RgbaImage {
    let alpha =
        ((1.0 - options.background_transparency.clamp(0.0, 1.0)) * 255.0).round() as u8;
    let bg = options.background;
    RgbaImage::from_pixel(width, height, Rgba([bg.r, bg.g, bg.b, alpha]))
}

fn rgba(color: Color) -> Rgba<u8> {
    Rgba(color.to_rgba())
}

/// Format a sample value for a tick label: whole numbers without a
/// fraction, everything else with one decimal.
fn format_sample(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e7 {
        format!("{:.0}", value)
    } else {
        format!("{:.1}", value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use product_io::{ColorPaletteDef, ColorPoint};

    fn test_band() -> Band {
        Band::new("radiance_13", 2, 2, vec![0.0, 25.0, 50.0, 100.0]).unwrap()
    }

    fn test_info() -> ImageInfo {
        ImageInfo::new(ColorPaletteDef::new(vec![
            ColorPoint::new(0.0, Color::YELLOW),
            ColorPoint::new(50.0, Color::RED),
            ColorPoint::new(100.0, Color::BLUE),
        ]))
    }

    #[test]
    fn test_format_sample() {
        assert_eq!(format_sample(0.0), "0");
        assert_eq!(format_sample(50.0), "50");
        assert_eq!(format_sample(12.5), "12.5");
        assert_eq!(format_sample(-3.0), "-3");
    }

    #[test]
    fn test_horizontal_legend_dimensions() {
        let options = LegendOptions::default();
        let legend = build_legend(&test_info(), &test_band(), &options).unwrap();

        assert!(legend.width() as u32 >= options.ramp_length);
        assert!(legend.height() as u32 > options.ramp_thickness);
    }

    #[test]
    fn test_vertical_legend_dimensions() {
        let options = LegendOptions {
            orientation: Orientation::Vertical,
            ..Default::default()
        };
        let legend = build_legend(&test_info(), &test_band(), &options).unwrap();

        assert!(legend.height() as u32 >= options.ramp_length);
    }

    #[test]
    fn test_legend_contains_ramp_end_colors() {
        let legend = build_legend(&test_info(), &test_band(), &LegendOptions::default()).unwrap();

        let has = |rgba: [u8; 4]| {
            legend
                .pixels()
                .chunks_exact(4)
                .any(|p| p == rgba)
        };
        assert!(has([255, 255, 0, 255])); // yellow end
        assert!(has([0, 0, 255, 255])); // blue end
    }

    #[test]
    fn test_empty_palette_rejected() {
        let info = ImageInfo::new(ColorPaletteDef::new(vec![]));
        assert!(matches!(
            build_legend(&info, &test_band(), &LegendOptions::default()),
            Err(RenderError::EmptyPalette)
        ));
    }

    #[test]
    fn test_background_transparency() {
        let options = LegendOptions {
            background_transparency: 1.0,
            ..Default::default()
        };
        let legend = build_legend(&test_info(), &test_band(), &options).unwrap();
        // Corner pixel is background
        assert_eq!(legend.pixel_at(0, 0).unwrap()[3], 0);
    }
}
