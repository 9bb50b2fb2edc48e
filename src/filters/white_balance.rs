//! Gray-world white balance.
//!
//! Assumes the scene averages to neutral gray and scales each channel so its
//! mean matches the gray target `avg = (mR + mG + mB) / 3`. Each channel gets
//! a factor `k = avg / m` and is mapped to `trunc(c · k)`. A channel whose
//! mean is zero has nothing to scale and keeps factor 1.

use log::debug;
use rayon::prelude::*;

use super::core::{sample_clamped, truncate_channel};
use super::PixelFilter;
use crate::image::{PixelBuffer, Rgb};

/// Per-channel means, the gray target and the correction factors derived
/// from them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChannelMeans {
    pub means: [f64; 3],
    pub target: f64,
    pub factors: [f64; 3],
}

impl ChannelMeans {
    fn from_sums(sums: [f64; 3], count: f64) -> Self {
        let means = sums.map(|s| s / count);
        let target = (means[0] + means[1] + means[2]) / 3.0;
        let factors = means.map(|m| if m > 0.0 { target / m } else { 1.0 });
        ChannelMeans {
            means,
            target,
            factors,
        }
    }

    /// Correct one pixel, `clamp(trunc(c · k))` per channel.
    fn correct(&self, p: Rgb) -> Rgb {
        let channels = p.channels();
        let mut out = [0u8; 3];
        for c in 0..3 {
            out[c] = truncate_channel(channels[c] as f64 * self.factors[c]);
        }
        Rgb::from_channels(out)
    }
}

/// Global gray world: means over the whole image.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GrayWorld;

impl PixelFilter for GrayWorld {
    type Stats = ChannelMeans;

    fn name(&self) -> &'static str {
        "gray_world"
    }

    fn prepare(&self, source: &PixelBuffer) -> ChannelMeans {
        let width = source.width();
        let sums = (0..source.height())
            .into_par_iter()
            .map(|y| {
                let mut acc = [0u64; 3];
                for x in 0..width {
                    let p = source.pixel(x, y);
                    acc[0] += p.r as u64;
                    acc[1] += p.g as u64;
                    acc[2] += p.b as u64;
                }
                acc
            })
            .reduce(|| [0u64; 3], |a, b| [a[0] + b[0], a[1] + b[1], a[2] + b[2]]);

        let count = (width * source.height()) as f64;
        let stats = ChannelMeans::from_sums(sums.map(|s| s as f64), count);
        if stats.means.iter().any(|&m| m == 0.0) {
            debug!("gray_world: zero channel mean {:?}, keeping factor 1", stats.means);
        }
        stats
    }

    fn map_pixel(&self, source: &PixelBuffer, x: usize, y: usize, stats: &mut ChannelMeans) -> Rgb {
        stats.correct(source.pixel(x, y))
    }
}

/// Local gray world: means over the 3×3 clamp-to-edge neighborhood of each
/// pixel instead of the whole image.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LocalGrayWorld;

impl PixelFilter for LocalGrayWorld {
    type Stats = ();

    fn name(&self) -> &'static str {
        "local_gray_world"
    }

    fn prepare(&self, _source: &PixelBuffer) {}

    fn map_pixel(&self, source: &PixelBuffer, x: usize, y: usize, _: &mut ()) -> Rgb {
        let mut sums = [0.0f64; 3];
        for dy in -1..=1 {
            for dx in -1..=1 {
                let p = sample_clamped(source, x, y, dx, dy);
                sums[0] += p.r as f64;
                sums[1] += p.g as f64;
                sums[2] += p.b as f64;
            }
        }
        ChannelMeans::from_sums(sums, 9.0).correct(source.pixel(x, y))
    }
}
