//! Auto-computed contrast stretch for RGB composites.
//!
//! Each channel of a composite gets its own linear stretch derived from the
//! band's sample distribution. Percentiles are estimated from a fixed-bin
//! histogram rather than a full sort, so large bands stay cheap.

use product_io::Band;
use tracing::debug;

/// Number of histogram bins used for percentile estimation.
const HISTOGRAM_BINS: usize = 1024;

/// Lower/upper percentiles for the default stretch.
const STRETCH_LO: f64 = 0.025;
const STRETCH_HI: f64 = 0.975;

/// Linear mapping from a sample range to 0..=255.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChannelStretch {
    pub min: f64,
    pub max: f64,
}

impl ChannelStretch {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Map a sample to an 8-bit channel value. NaN yields `None`.
    pub fn scale(&self, sample: f32) -> Option<u8> {
        if sample.is_nan() {
            return None;
        }
        let range = self.max - self.min;
        if range.abs() < f64::EPSILON {
            return Some(0);
        }
        let t = ((sample as f64 - self.min) / range).clamp(0.0, 1.0);
        Some((t * 255.0).round() as u8)
    }
}

/// Per-channel stretch for a red/green/blue composite.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RgbImageInfo {
    pub red: ChannelStretch,
    pub green: ChannelStretch,
    pub blue: ChannelStretch,
}

/// Compute a combined render info for a three-band composite, one
/// percentile-based stretch per channel (red, green, blue order).
pub fn auto_image_info(bands: [&Band; 3]) -> RgbImageInfo {
    let [red, green, blue] = bands;
    let info = RgbImageInfo {
        red: channel_stretch(red),
        green: channel_stretch(green),
        blue: channel_stretch(blue),
    };
    debug!(
        red = ?info.red,
        green = ?info.green,
        blue = ?info.blue,
        "Auto-computed composite stretch"
    );
    info
}

/// Percentile stretch for one band, falling back to the full min/max range
/// for degenerate distributions.
pub fn channel_stretch(band: &Band) -> ChannelStretch {
    // First pass: min/max over valid samples
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    let mut valid = 0usize;
    for &s in band.samples() {
        if s.is_nan() {
            continue;
        }
        let v = s as f64;
        if v < min {
            min = v;
        }
        if v > max {
            max = v;
        }
        valid += 1;
    }

    if valid == 0 {
        return ChannelStretch::new(0.0, 1.0);
    }
    if (max - min).abs() < f64::EPSILON || valid < HISTOGRAM_BINS {
        return ChannelStretch::new(min, max);
    }

    // Second pass: fixed-bin histogram over [min, max]
    let mut bins = vec![0u32; HISTOGRAM_BINS];
    let scale = (HISTOGRAM_BINS as f64) / (max - min);
    for &s in band.samples() {
        if s.is_nan() {
            continue;
        }
        let bin = (((s as f64 - min) * scale) as usize).min(HISTOGRAM_BINS - 1);
        bins[bin] += 1;
    }

    let lo = percentile_from_histogram(&bins, valid, STRETCH_LO, min, max);
    let hi = percentile_from_histogram(&bins, valid, STRETCH_HI, min, max);

    if hi > lo {
        ChannelStretch::new(lo, hi)
    } else {
        ChannelStretch::new(min, max)
    }
}

/// Invert the histogram CDF at fraction `p` (0..=1), returning the sample
/// value at the lower edge of the bin where the CDF crosses `p`.
fn percentile_from_histogram(bins: &[u32], total: usize, p: f64, min: f64, max: f64) -> f64 {
    let target = (p * total as f64).ceil() as u64;
    let bin_width = (max - min) / bins.len() as f64;

    let mut cum = 0u64;
    for (i, &count) in bins.iter().enumerate() {
        cum += count as u64;
        if cum >= target {
            return min + i as f64 * bin_width;
        }
    }
    max
}

#[cfg(test)]
mod tests {
    use super::*;

    fn band_from(samples: Vec<f32>) -> Band {
        let n = samples.len();
        Band::new("test", n, 1, samples).unwrap()
    }

    #[test]
    fn test_scale_endpoints() {
        let s = ChannelStretch::new(0.0, 100.0);
        assert_eq!(s.scale(0.0), Some(0));
        assert_eq!(s.scale(100.0), Some(255));
        assert_eq!(s.scale(50.0), Some(128));
        // Clamped outside the stretch
        assert_eq!(s.scale(-10.0), Some(0));
        assert_eq!(s.scale(200.0), Some(255));
        assert_eq!(s.scale(f32::NAN), None);
    }

    #[test]
    fn test_small_band_uses_min_max() {
        let band = band_from(vec![10.0, 20.0, 30.0, f32::NAN]);
        let s = channel_stretch(&band);
        assert_eq!(s, ChannelStretch::new(10.0, 30.0));
    }

    #[test]
    fn test_constant_band() {
        let band = band_from(vec![5.0; 16]);
        let s = channel_stretch(&band);
        assert_eq!(s.min, 5.0);
        assert_eq!(s.max, 5.0);
        assert_eq!(s.scale(5.0), Some(0));
    }

    #[test]
    fn test_all_nan_band() {
        let band = band_from(vec![f32::NAN; 8]);
        let s = channel_stretch(&band);
        assert_eq!(s, ChannelStretch::new(0.0, 1.0));
    }

    #[test]
    fn test_percentiles_trim_outliers() {
        // 10000 samples uniform 0..100 plus two extreme outliers
        let mut samples: Vec<f32> = (0..10_000).map(|i| (i % 100) as f32).collect();
        samples.push(-1e6);
        samples.push(1e6);
        let band = band_from(samples);

        let s = channel_stretch(&band);
        // Outliers should be clipped away by the percentile stretch
        assert!(s.min > -1000.0);
        assert!(s.max < 1000.0);
    }
}
