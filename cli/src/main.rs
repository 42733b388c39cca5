//! Batch tool that reads a raster product, colorizes a band through a
//! palette, and writes the band image, a legend, and an RGB composite.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::error::ErrorKind;
use clap::Parser;
use tracing::{error, Level};
use tracing_subscriber::FmtSubscriber;

use band_image::pipeline::{self, default_palette, parse_rgb_list, AppError, RunConfig};
use band_render::{EncodeOptions, ImageFormat};
use product_io::ColorPaletteDef;

#[derive(Parser, Debug)]
#[command(name = "band-image")]
#[command(about = "Render a colorized band image, its legend, and an RGB composite")]
struct Args {
    /// Input product file
    product: PathBuf,

    /// Band to colorize
    #[arg(long, default_value = "radiance_13")]
    band: String,

    /// Comma-separated red,green,blue band names for the composite
    #[arg(long, default_value = "radiance_13,radiance_5,radiance_1")]
    rgb: String,

    /// Output image format tag
    #[arg(long, default_value = "PNG")]
    format: String,

    /// Directory for output images
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,

    /// Palette definition JSON file (defaults to the built-in palette)
    #[arg(long)]
    palette: Option<PathBuf>,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> ExitCode {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            print!("{}", e);
            return ExitCode::SUCCESS;
        }
        Err(e) => {
            // Wrong arguments: usage to stdout, exit code 1
            println!("{}", e);
            return ExitCode::from(1);
        }
    };

    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    // Keep going with the existing subscriber if one is already installed
    let _ = tracing::subscriber::set_global_default(subscriber);

    match build_config(args).and_then(|config| pipeline::run(&config)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "band-image failed");
            eprintln!("error: {}", e);
            ExitCode::from(e.exit_code() as u8)
        }
    }
}

fn build_config(args: Args) -> Result<RunConfig, AppError> {
    let format: ImageFormat = args.format.parse()?;
    let rgb = parse_rgb_list(&args.rgb)?;
    let palette = match &args.palette {
        Some(path) => load_palette(path)?,
        None => default_palette(),
    };

    Ok(RunConfig {
        product_path: args.product,
        band: args.band,
        rgb,
        format,
        out_dir: args.out_dir,
        palette,
        encode: EncodeOptions::default(),
    })
}

fn load_palette(path: &PathBuf) -> Result<ColorPaletteDef, AppError> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| AppError::Product(product_io::ProductError::Io(e)))?;
    ColorPaletteDef::from_json(&content).map_err(|e| {
        AppError::InvalidArgument(format!(
            "malformed palette file '{}': {}",
            path.display(),
            e
        ))
    })
}
