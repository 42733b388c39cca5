//! Raster product datamodel and container I/O.
//!
//! A *product* is a container of named *bands*, each a 2-D array of
//! geophysical `f32` samples. Bands may carry attached render metadata
//! (`ImageInfo`) describing how samples map to colors.
//!
//! Products are stored in a small versioned binary container format (see
//! [`format`]). Opening a product reads all band data eagerly and releases
//! the file handle before returning, so there is no separate close step.

pub mod color;
pub mod error;
pub mod format;
pub mod palette;
pub mod product;

pub use color::Color;
pub use error::{ProductError, ProductResult};
pub use palette::{ColorPaletteDef, ColorPoint, ImageInfo};
pub use product::{Band, Product};
