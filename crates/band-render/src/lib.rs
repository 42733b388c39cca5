//! Rasterization of product bands into colorized images.
//!
//! Implements:
//! - Single-band colorization through a palette (piecewise-linear ramp)
//! - Three-band RGB composites with auto-computed contrast stretch
//! - Legend images (color ramp, tick labels, header)
//! - PNG encoding and image file writing

pub mod error;
pub mod font;
pub mod legend;
pub mod png;
pub mod raster;
pub mod render;
pub mod stretch;
pub mod writer;

pub use error::{RenderError, RenderResult};
pub use legend::{build_legend, LegendOptions, Orientation};
pub use raster::RasterImage;
pub use render::{render_band, render_rgb};
pub use stretch::{auto_image_info, ChannelStretch, RgbImageInfo};
pub use writer::{write_image, EncodeOptions, ImageFormat, PngCompression};
