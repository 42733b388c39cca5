//! The band-image pipeline: open a product, colorize a band, write the
//! band image, its legend, and an RGB composite.

use std::path::PathBuf;

use thiserror::Error;
use tracing::info;

use band_render::{
    auto_image_info, build_legend, render_band, render_rgb, write_image, EncodeOptions,
    ImageFormat, LegendOptions, RenderError,
};
use product_io::{Color, ColorPaletteDef, ColorPoint, ImageInfo, Product, ProductError};

/// Base name of the three output files.
pub const OUTPUT_BASE: &str = "snappy_write_image";

/// Pipeline failure, classified for exit codes.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Product(#[from] ProductError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error("{0}")]
    InvalidArgument(String),
}

impl AppError {
    /// Process exit code for this failure: 2 for resource errors (storage,
    /// encoding), 3 for data errors (missing band, malformed input).
    pub fn exit_code(&self) -> i32 {
        match self {
            AppError::Product(e) if e.is_data_error() => 3,
            AppError::Product(_) => 2,
            AppError::Render(RenderError::Io(_)) | AppError::Render(RenderError::Encode(_)) => 2,
            AppError::Render(_) => 3,
            AppError::InvalidArgument(_) => 3,
        }
    }
}

/// Fully resolved pipeline configuration.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub product_path: PathBuf,
    pub band: String,
    /// Composite band names in red/green/blue order
    pub rgb: [String; 3],
    pub format: ImageFormat,
    pub out_dir: PathBuf,
    pub palette: ColorPaletteDef,
    pub encode: EncodeOptions,
}

/// The palette assigned to sample values 0, 50, 100 in the band's
/// geophysical units.
pub fn default_palette() -> ColorPaletteDef {
    ColorPaletteDef::new(vec![
        ColorPoint::new(0.0, Color::YELLOW),
        ColorPoint::new(50.0, Color::RED),
        ColorPoint::new(100.0, Color::BLUE),
    ])
}

/// Parse a comma-separated red,green,blue band list; exactly three names.
pub fn parse_rgb_list(s: &str) -> Result<[String; 3], AppError> {
    let names: Vec<&str> = s.split(',').map(str::trim).collect();
    match <[&str; 3]>::try_from(names.as_slice()) {
        Ok([r, g, b]) if !r.is_empty() && !g.is_empty() && !b.is_empty() => {
            Ok([r.to_string(), g.to_string(), b.to_string()])
        }
        _ => Err(AppError::InvalidArgument(format!(
            "--rgb expects exactly three comma-separated band names, got '{}'",
            s
        ))),
    }
}

/// Run the full pipeline.
pub fn run(config: &RunConfig) -> Result<(), AppError> {
    let mut product = Product::open(&config.product_path)?;
    info!(
        path = %config.product_path.display(),
        bands = product.num_bands(),
        "Opened product"
    );

    // Attach the palette to the band as its render info
    product
        .band_mut(&config.band)?
        .set_image_info(ImageInfo::new(config.palette.clone()));

    let ext = config.format.extension();

    // Colorized single-band image
    let band = product.band(&config.band)?;
    let render_info = band
        .image_info()
        .ok_or_else(|| RenderError::MissingImageInfo(band.name().to_string()))?;
    let image = render_band(band, render_info)?;
    write_image(
        &image,
        config.out_dir.join(format!("{}.{}", OUTPUT_BASE, ext)),
        config.format,
        &config.encode,
    )?;

    // Legend for the band's render info
    let legend_options = LegendOptions {
        header_text: Some(band.name().to_string()),
        ..Default::default()
    };
    let legend = build_legend(render_info, band, &legend_options)?;
    write_image(
        &legend,
        config
            .out_dir
            .join(format!("{}_legend.{}", OUTPUT_BASE, ext)),
        config.format,
        &config.encode,
    )?;

    // RGB composite with auto-computed stretch
    let [red_name, green_name, blue_name] = &config.rgb;
    let red = product.band(red_name)?;
    let green = product.band(green_name)?;
    let blue = product.band(blue_name)?;

    let composite_info = auto_image_info([red, green, blue]);
    let composite = render_rgb([red, green, blue], &composite_info)?;
    write_image(
        &composite,
        config.out_dir.join(format!("{}_rgb.{}", OUTPUT_BASE, ext)),
        config.format,
        &config.encode,
    )?;

    info!(out_dir = %config.out_dir.display(), "Pipeline complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rgb_list() {
        let bands = parse_rgb_list("radiance_13,radiance_5,radiance_1").unwrap();
        assert_eq!(bands[0], "radiance_13");
        assert_eq!(bands[2], "radiance_1");

        // Whitespace tolerated
        let bands = parse_rgb_list("a, b ,c").unwrap();
        assert_eq!(bands[1], "b");
    }

    #[test]
    fn test_parse_rgb_list_wrong_arity() {
        assert!(parse_rgb_list("a,b").is_err());
        assert!(parse_rgb_list("a,b,c,d").is_err());
        assert!(parse_rgb_list("").is_err());
        assert!(parse_rgb_list("a,,c").is_err());
    }

    #[test]
    fn test_default_palette_points() {
        let palette = default_palette();
        let points = palette.points();
        assert_eq!(points.len(), 3);
        assert_eq!(points[0].sample, 0.0);
        assert_eq!(points[0].color, Color::YELLOW);
        assert_eq!(points[1].sample, 50.0);
        assert_eq!(points[1].color, Color::RED);
        assert_eq!(points[2].sample, 100.0);
        assert_eq!(points[2].color, Color::BLUE);
    }

    #[test]
    fn test_exit_codes() {
        let missing = AppError::Product(ProductError::BandNotFound("x".into()));
        assert_eq!(missing.exit_code(), 3);

        let io = AppError::Product(ProductError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "gone",
        )));
        assert_eq!(io.exit_code(), 2);

        let encode = AppError::Render(RenderError::Encode("bad".into()));
        assert_eq!(encode.exit_code(), 2);

        let format = AppError::Render(RenderError::UnsupportedFormat("JPEG".into()));
        assert_eq!(format.exit_code(), 3);
    }
}
