//! Grayscale and sepia conversion.
//!
//! Two luma weightings are used in this crate and they are not
//! interchangeable:
//!
//! - [`LumaWeights::LEGACY`] (0.36, 0.51, 0.11) drives GrayScale and Sepia.
//! - [`LumaWeights::BT601`] (0.299, 0.587, 0.114) drives HistogramStretch.
//!
//! Luma is computed in `f64` and truncated.

use serde::{Deserialize, Serialize};

use super::core::clamp_channel;
use super::PixelFilter;
use crate::image::{PixelBuffer, Rgb};

/// RGB channel weights for intensity computation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LumaWeights {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl LumaWeights {
    /// Weights used by the GrayScale and Sepia filters.
    pub const LEGACY: LumaWeights = LumaWeights {
        r: 0.36,
        g: 0.51,
        b: 0.11,
    };

    /// ITU-R BT.601 weights.
    pub const BT601: LumaWeights = LumaWeights {
        r: 0.299,
        g: 0.587,
        b: 0.114,
    };

    #[inline]
    pub fn luma(&self, p: Rgb) -> f64 {
        p.r as f64 * self.r + p.g as f64 * self.g + p.b as f64 * self.b
    }

    /// Luma truncated toward zero.
    #[inline]
    pub fn intensity(&self, p: Rgb) -> i32 {
        self.luma(p) as i32
    }
}

// ============================================================================
// GrayScale
// ============================================================================

/// `(I, I, I)` with `I = trunc(0.36R + 0.51G + 0.11B)`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GrayScale;

impl PixelFilter for GrayScale {
    type Stats = ();

    fn name(&self) -> &'static str {
        "grayscale"
    }

    fn prepare(&self, _source: &PixelBuffer) {}

    fn map_pixel(&self, source: &PixelBuffer, x: usize, y: usize, _: &mut ()) -> Rgb {
        // Weights sum to 0.98, so I never exceeds 249.
        let i = LumaWeights::LEGACY.intensity(source.pixel(x, y));
        Rgb::gray(i as u8)
    }
}

// ============================================================================
// Sepia
// ============================================================================

/// Sepia tone from the grayscale intensity.
///
/// `R = I + 2k`, `G = I`, `B = I - k`, each clamped. Green has no offset
/// (its `0.5·k` term truncates to zero).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sepia {
    pub k: i32,
}

impl Sepia {
    pub const DEFAULT_K: i32 = 20;

    pub fn new(k: i32) -> Self {
        Sepia { k }
    }
}

impl Default for Sepia {
    fn default() -> Self {
        Sepia::new(Self::DEFAULT_K)
    }
}

impl PixelFilter for Sepia {
    type Stats = ();

    fn name(&self) -> &'static str {
        "sepia"
    }

    fn prepare(&self, _source: &PixelBuffer) {}

    fn map_pixel(&self, source: &PixelBuffer, x: usize, y: usize, _: &mut ()) -> Rgb {
        let i = LumaWeights::LEGACY.intensity(source.pixel(x, y));
        Rgb::new(
            clamp_channel(i.saturating_add(self.k.saturating_mul(2))),
            clamp_channel(i),
            clamp_channel(i.saturating_sub(self.k)),
        )
    }
}
