//! Levels filters: linear contrast stretching.
//!
//! - [`HistogramStretch`]: stretches BT.601 luma to the full range and writes
//!   the result as gray.
//! - [`ChannelStretch`]: stretches each channel independently, keeping color.
//!
//! Both scan the whole image in `prepare` to find the value range.

use log::debug;
use rayon::prelude::*;

use super::core::{round_channel, truncate_channel};
use super::grayscale::LumaWeights;
use super::PixelFilter;
use crate::image::{PixelBuffer, Rgb};

/// Inclusive value range found by a scan.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Range<T> {
    pub min: T,
    pub max: T,
}

impl<T: PartialOrd + Copy> Range<T> {
    fn point(v: T) -> Self {
        Range { min: v, max: v }
    }

    fn merge(self, other: Self) -> Self {
        Range {
            min: if other.min < self.min { other.min } else { self.min },
            max: if other.max > self.max { other.max } else { self.max },
        }
    }

    /// True when every scanned value was identical.
    pub fn is_flat(&self) -> bool {
        self.min >= self.max
    }
}

/// Row-parallel range reduction of `key` over every pixel.
fn scan_range<T, K>(source: &PixelBuffer, key: K) -> Range<T>
where
    T: PartialOrd + Copy + Send + Sync,
    K: Fn(Rgb) -> T + Sync,
{
    let width = source.width();
    let first = Range::point(key(source.pixel(0, 0)));
    (0..source.height())
        .into_par_iter()
        .map(|y| {
            (0..width)
                .map(|x| Range::point(key(source.pixel(x, y))))
                .fold(first, Range::merge)
        })
        .reduce(|| first, Range::merge)
}

// ============================================================================
// HistogramStretch
// ============================================================================

/// Luma contrast stretch, output in gray.
///
/// `I = 0.299R + 0.587G + 0.114B`, mapped to
/// `round((I - min) · 255 / (max - min))` on all three channels. When every
/// pixel has the same luma there is nothing to stretch and the source is
/// returned unchanged, in color. This holds even when the pixels differ in
/// hue, so only an image with a luma spread comes out gray.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HistogramStretch;

impl PixelFilter for HistogramStretch {
    type Stats = Range<f64>;

    fn name(&self) -> &'static str {
        "histogram_stretch"
    }

    fn prepare(&self, source: &PixelBuffer) -> Range<f64> {
        let range = scan_range(source, |p| LumaWeights::BT601.luma(p));
        if range.is_flat() {
            debug!("histogram_stretch: flat luma {:.2}, passing through", range.min);
        }
        range
    }

    fn map_pixel(&self, source: &PixelBuffer, x: usize, y: usize, range: &mut Range<f64>) -> Rgb {
        let p = source.pixel(x, y);
        if range.is_flat() {
            return p;
        }
        let i = LumaWeights::BT601.luma(p);
        Rgb::gray(round_channel((i - range.min) * 255.0 / (range.max - range.min)))
    }
}

// ============================================================================
// ChannelStretch
// ============================================================================

/// Per-channel contrast stretch.
///
/// Each channel is mapped `trunc((c - min_c) · 255 / (max_c - min_c))`; a
/// channel with a single value passes through.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChannelStretch;

impl PixelFilter for ChannelStretch {
    type Stats = [Range<u8>; 3];

    fn name(&self) -> &'static str {
        "channel_stretch"
    }

    fn prepare(&self, source: &PixelBuffer) -> [Range<u8>; 3] {
        let ranges = [
            scan_range(source, |p| p.r),
            scan_range(source, |p| p.g),
            scan_range(source, |p| p.b),
        ];
        debug!(
            "channel_stretch: ranges r={}..{} g={}..{} b={}..{}",
            ranges[0].min, ranges[0].max, ranges[1].min, ranges[1].max, ranges[2].min, ranges[2].max
        );
        ranges
    }

    fn map_pixel(&self, source: &PixelBuffer, x: usize, y: usize, ranges: &mut [Range<u8>; 3]) -> Rgb {
        let channels = source.pixel(x, y).channels();
        let mut out = channels;
        for (c, range) in ranges.iter().enumerate() {
            if range.is_flat() {
                continue;
            }
            let span = (range.max - range.min) as f64;
            out[c] = truncate_channel((channels[c] - range.min) as f64 * 255.0 / span);
        }
        Rgb::from_channels(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::{process, NoProgress};

    fn run<F: PixelFilter>(filter: &F, img: &PixelBuffer) -> PixelBuffer {
        process(img, filter, &mut NoProgress).into_image().unwrap()
    }

    fn low_contrast() -> PixelBuffer {
        PixelBuffer::from_fn(5, 4, |x, y| Rgb::gray((100 + x * 5 + y) as u8)).unwrap()
    }

    #[test]
    fn test_histogram_stretch_extremes() {
        let img = low_contrast();
        let out = run(&HistogramStretch, &img);

        // Darkest at (0,0), brightest at (4,3)
        assert_eq!(out.pixel(0, 0), Rgb::BLACK);
        assert_eq!(out.pixel(4, 3), Rgb::WHITE);
    }

    #[test]
    fn test_histogram_stretch_is_gray_and_monotonic() {
        let img = PixelBuffer::from_fn(4, 1, |x, _| Rgb::new(60 + x as u8 * 10, 90, 20)).unwrap();
        let out = run(&HistogramStretch, &img);

        let mut last = 0;
        for x in 0..4 {
            let p = out.pixel(x, 0);
            assert_eq!(p.r, p.g);
            assert_eq!(p.g, p.b);
            assert!(p.r >= last);
            last = p.r;
        }
        assert_eq!(last, 255);
    }

    #[test]
    fn test_histogram_stretch_flat_image_unchanged() {
        let img = PixelBuffer::filled(4, 4, Rgb::new(30, 140, 90)).unwrap();
        assert_eq!(run(&HistogramStretch, &img), img);
    }

    #[test]
    fn test_histogram_stretch_equal_luma_keeps_color() {
        // All three have BT.601 luma exactly 100.0
        let colors = [Rgb::gray(100), Rgb::new(0, 122, 249), Rgb::new(6, 164, 17)];
        let img = PixelBuffer::from_fn(3, 2, |x, _| colors[x]).unwrap();

        assert_eq!(run(&HistogramStretch, &img), img);
    }

    #[test]
    fn test_channel_stretch_per_channel() {
        // Red spans 50..150, green spans 0..255 already, blue is flat
        let img = PixelBuffer::from_fn(2, 1, |x, _| {
            if x == 0 {
                Rgb::new(50, 0, 77)
            } else {
                Rgb::new(150, 255, 77)
            }
        })
        .unwrap();

        let out = run(&ChannelStretch, &img);

        assert_eq!(out.pixel(0, 0), Rgb::new(0, 0, 77));
        assert_eq!(out.pixel(1, 0), Rgb::new(255, 255, 77));
    }

    #[test]
    fn test_channel_stretch_truncates() {
        let img = PixelBuffer::from_fn(3, 1, |x, _| Rgb::gray([0, 1, 3][x])).unwrap();
        let out = run(&ChannelStretch, &img);
        // 1 * 255 / 3 = 85
        assert_eq!(out.pixel(1, 0), Rgb::gray(85));
    }

    #[test]
    fn test_range_merge() {
        let r = Range::point(5u8).merge(Range::point(2)).merge(Range::point(9));
        assert_eq!(r, Range { min: 2, max: 9 });
        assert!(!r.is_flat());
        assert!(Range::point(4.0).is_flat());
    }
}
