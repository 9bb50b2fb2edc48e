//! Stylize filters: Glass, Move.
//!
//! Both copy source pixels verbatim from a displaced coordinate instead of
//! blending a neighborhood.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use super::core::sample_clamped;
use super::PixelFilter;
use crate::image::{PixelBuffer, Rgb};

// ============================================================================
// Glass
// ============================================================================

/// Frosted-glass effect: each pixel is copied from a randomly jittered
/// neighbor.
///
/// `dx = round((u - 0.5) · jitter)` with `u` uniform in `[0, 1)`, then `dy`
/// from a fresh sample. The jittered coordinate is clamped to the image.
///
/// The generator is seeded from `seed` at the start of every run, so a given
/// seed always yields the same image.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Glass {
    pub jitter: f64,
    pub seed: u64,
}

impl Glass {
    pub const DEFAULT_JITTER: f64 = 10.0;
    /// Largest jitter accepted from settings.
    pub const MAX_JITTER: f64 = 1000.0;

    pub fn new(jitter: f64, seed: u64) -> Self {
        Glass { jitter, seed }
    }

    pub fn with_seed(seed: u64) -> Self {
        Glass::new(Self::DEFAULT_JITTER, seed)
    }

    /// Glass with a seed drawn from the thread-local generator.
    pub fn from_entropy() -> Self {
        Glass::with_seed(rand::random())
    }

    #[inline]
    fn offset(&self, rng: &mut StdRng) -> isize {
        ((rng.gen::<f64>() - 0.5) * self.jitter).round() as isize
    }
}

impl PixelFilter for Glass {
    type Stats = StdRng;

    fn name(&self) -> &'static str {
        "glass"
    }

    fn prepare(&self, _source: &PixelBuffer) -> StdRng {
        StdRng::seed_from_u64(self.seed)
    }

    fn map_pixel(&self, source: &PixelBuffer, x: usize, y: usize, rng: &mut StdRng) -> Rgb {
        let dx = self.offset(rng);
        let dy = self.offset(rng);
        sample_clamped(source, x, y, dx, dy)
    }
}

// ============================================================================
// Move
// ============================================================================

/// Shifts the image left by `offset` columns.
///
/// `result(x, y) = source(x + offset, y)` while that is inside the image;
/// the vacated right-hand strip is black rather than edge-clamped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Move {
    pub offset: usize,
}

impl Move {
    pub const DEFAULT_OFFSET: usize = 50;

    pub fn new(offset: usize) -> Self {
        Move { offset }
    }
}

impl Default for Move {
    fn default() -> Self {
        Move::new(Self::DEFAULT_OFFSET)
    }
}

impl PixelFilter for Move {
    type Stats = ();

    fn name(&self) -> &'static str {
        "move"
    }

    fn prepare(&self, _source: &PixelBuffer) {}

    fn map_pixel(&self, source: &PixelBuffer, x: usize, y: usize, _: &mut ()) -> Rgb {
        match x.checked_add(self.offset) {
            Some(sx) if sx < source.width() => source.pixel(sx, y),
            _ => Rgb::BLACK,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::{process, NoProgress};

    fn run<F: PixelFilter>(filter: &F, img: &PixelBuffer) -> PixelBuffer {
        process(img, filter, &mut NoProgress).into_image().unwrap()
    }

    fn coordinate_image(width: usize, height: usize) -> PixelBuffer {
        // Encode each pixel's own coordinate so its origin can be recovered
        PixelBuffer::from_fn(width, height, |x, y| Rgb::new(x as u8, y as u8, 0)).unwrap()
    }

    #[test]
    fn test_glass_deterministic_for_seed() {
        let img = coordinate_image(20, 15);
        let a = run(&Glass::with_seed(42), &img);
        let b = run(&Glass::with_seed(42), &img);
        assert_eq!(a, b);
    }

    #[test]
    fn test_glass_seeds_differ() {
        let img = coordinate_image(20, 15);
        let a = run(&Glass::with_seed(1), &img);
        let b = run(&Glass::with_seed(2), &img);
        assert_ne!(a, b);
    }

    #[test]
    fn test_glass_jitter_is_bounded() {
        let img = coordinate_image(30, 30);
        let out = run(&Glass::with_seed(9), &img);

        for (x, y, p) in out.pixels() {
            let dx = (p.r as isize - x as isize).abs();
            let dy = (p.g as isize - y as isize).abs();
            assert!(dx <= 5 && dy <= 5, "({x},{y}) came from ({},{})", p.r, p.g);
        }
    }

    #[test]
    fn test_glass_zero_jitter_is_identity() {
        let img = coordinate_image(8, 6);
        assert_eq!(run(&Glass::new(0.0, 3), &img), img);
    }

    #[test]
    fn test_glass_huge_jitter_lands_on_edges() {
        let img = coordinate_image(4, 4);
        let out = run(&Glass::new(1e300, 1), &img);
        for (_, _, p) in out.pixels() {
            assert!(p.r == 0 || p.r == 3, "column {} is not an edge", p.r);
            assert!(p.g == 0 || p.g == 3, "row {} is not an edge", p.g);
        }
    }

    #[test]
    fn test_move_shifts_and_fills_black() {
        let img = coordinate_image(60, 2);
        let out = run(&Move::default(), &img);

        assert_eq!(out.pixel(0, 1), Rgb::new(50, 1, 0));
        assert_eq!(out.pixel(9, 0), Rgb::new(59, 0, 0));
        for x in 10..60 {
            assert_eq!(out.pixel(x, 0), Rgb::BLACK);
        }
    }

    #[test]
    fn test_move_narrow_image_is_black() {
        let img = PixelBuffer::filled(10, 3, Rgb::WHITE).unwrap();
        let out = run(&Move::default(), &img);
        assert!(out.pixels().all(|(_, _, p)| p == Rgb::BLACK));
    }
}
