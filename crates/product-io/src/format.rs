//! The product container format.
//!
//! A small versioned binary layout, little-endian throughout:
//!
//! ```text
//! magic     [u8; 4] = "BPRD"
//! version   u16     = 1
//! n_bands   u16
//! per band:
//!   name_len u16, name [u8; name_len]   (UTF-8)
//!   width    u32, height u32
//!   samples  [f32; width * height]      (row-major)
//! ```

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::error::{ProductError, ProductResult};
use crate::product::{Band, Product};

pub const MAGIC: [u8; 4] = *b"BPRD";
pub const VERSION: u16 = 1;

/// Read and decode a product file.
pub fn read_product(path: &Path) -> ProductResult<Product> {
    let bytes = fs::read(path)?;
    let product = decode(&bytes)?;
    debug!(
        path = %path.display(),
        bands = product.num_bands(),
        "Opened product"
    );
    Ok(product)
}

/// Encode a product and write it to a file.
pub fn write_product(product: &Product, path: &Path) -> ProductResult<()> {
    let bytes = encode(product)?;
    fs::write(path, bytes)?;
    debug!(
        path = %path.display(),
        bands = product.num_bands(),
        "Wrote product"
    );
    Ok(())
}

/// Decode a product from container bytes.
pub fn decode(bytes: &[u8]) -> ProductResult<Product> {
    let mut r = Reader::new(bytes);

    let magic = r.take(4, "magic")?;
    if magic != MAGIC {
        return Err(ProductError::BadMagic);
    }
    let version = r.u16("version")?;
    if version != VERSION {
        return Err(ProductError::UnsupportedVersion(version));
    }

    let n_bands = r.u16("band count")?;
    let mut bands = Vec::with_capacity(n_bands as usize);
    for _ in 0..n_bands {
        let name_len = r.u16("band name length")? as usize;
        let name_bytes = r.take(name_len, "band name")?;
        let name = std::str::from_utf8(name_bytes)
            .map_err(|_| ProductError::InvalidBandName)?
            .to_string();

        let width = r.u32("band width")? as usize;
        let height = r.u32("band height")? as usize;
        let samples = r.f32_samples(width, height, &name)?;

        bands.push(Band::new(name, width, height, samples)?);
    }

    Product::new(bands)
}

/// Encode a product into container bytes.
pub fn encode(product: &Product) -> ProductResult<Vec<u8>> {
    let bands = product.bands();
    if bands.len() > u16::MAX as usize {
        return Err(ProductError::OutOfRange(format!(
            "{} bands exceeds container limit",
            bands.len()
        )));
    }

    let mut out = Vec::new();
    out.extend_from_slice(&MAGIC);
    out.extend_from_slice(&VERSION.to_le_bytes());
    out.extend_from_slice(&(bands.len() as u16).to_le_bytes());

    for band in bands {
        let name = band.name().as_bytes();
        if name.len() > u16::MAX as usize {
            return Err(ProductError::OutOfRange(format!(
                "band name '{}…' exceeds container limit",
                band.name().chars().take(16).collect::<String>()
            )));
        }
        if band.width() > u32::MAX as usize || band.height() > u32::MAX as usize {
            return Err(ProductError::OutOfRange(format!(
                "band '{}' extent {}x{} exceeds container limit",
                band.name(),
                band.width(),
                band.height()
            )));
        }

        out.extend_from_slice(&(name.len() as u16).to_le_bytes());
        out.extend_from_slice(name);
        out.extend_from_slice(&(band.width() as u32).to_le_bytes());
        out.extend_from_slice(&(band.height() as u32).to_le_bytes());
        for sample in band.samples() {
            out.extend_from_slice(&sample.to_le_bytes());
        }
    }

    Ok(out)
}

/// Bounds-checked sequential reader over the container bytes.
struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    fn take(&mut self, n: usize, what: &str) -> ProductResult<&'a [u8]> {
        if self.pos + n > self.buf.len() {
            return Err(ProductError::Truncated(format!(
                "need {} bytes for {} at offset {}, have {}",
                n,
                what,
                self.pos,
                self.buf.len() - self.pos
            )));
        }
        let slice = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    fn u16(&mut self, what: &str) -> ProductResult<u16> {
        let b = self.take(2, what)?;
        Ok(u16::from_le_bytes([b[0], b[1]]))
    }

    fn u32(&mut self, what: &str) -> ProductResult<u32> {
        let b = self.take(4, what)?;
        Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    fn f32_samples(
        &mut self,
        width: usize,
        height: usize,
        band_name: &str,
    ) -> ProductResult<Vec<f32>> {
        let count = width
            .checked_mul(height)
            .ok_or_else(|| ProductError::OutOfRange(format!("band '{}' extent", band_name)))?;
        let bytes = self.take(
            count.checked_mul(4).ok_or_else(|| {
                ProductError::OutOfRange(format!("band '{}' sample size", band_name))
            })?,
            "band samples",
        )?;
        Ok(bytes
            .chunks_exact(4)
            .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
            .collect())
    }
}
