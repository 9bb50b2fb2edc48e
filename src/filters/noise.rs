//! Median filter.
//!
//! Removes salt-and-pepper noise while preserving edges.

use super::core::sample_clamped;
use super::PixelFilter;
use crate::image::{PixelBuffer, Rgb};

const RADIUS: isize = 1;
const WINDOW: usize = 9;

/// Per-channel median of the 3×3 clamp-to-edge neighborhood.
///
/// Channels are sorted independently, so the result need not be a color
/// that occurs in the neighborhood.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Median;

impl PixelFilter for Median {
    type Stats = ();

    fn name(&self) -> &'static str {
        "median"
    }

    fn prepare(&self, _source: &PixelBuffer) {}

    fn map_pixel(&self, source: &PixelBuffer, x: usize, y: usize, _: &mut ()) -> Rgb {
        let mut rs = [0u8; WINDOW];
        let mut gs = [0u8; WINDOW];
        let mut bs = [0u8; WINDOW];

        let mut i = 0;
        for dx in -RADIUS..=RADIUS {
            for dy in -RADIUS..=RADIUS {
                let p = sample_clamped(source, x, y, dx, dy);
                rs[i] = p.r;
                gs[i] = p.g;
                bs[i] = p.b;
                i += 1;
            }
        }

        rs.sort_unstable();
        gs.sort_unstable();
        bs.sort_unstable();

        Rgb::new(rs[WINDOW / 2], gs[WINDOW / 2], bs[WINDOW / 2])
    }
}
