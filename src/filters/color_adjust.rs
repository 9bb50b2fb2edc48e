//! Color adjustment filters: Invert, Brightness.
//!
//! These are pixel-wise operations that don't require spatial context.

use serde::{Deserialize, Serialize};

use super::core::clamp_channel;
use super::PixelFilter;
use crate::image::{PixelBuffer, Rgb};

// ============================================================================
// Invert
// ============================================================================

/// `c' = 255 - c` on every channel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Invert;

impl PixelFilter for Invert {
    type Stats = ();

    fn name(&self) -> &'static str {
        "invert"
    }

    fn prepare(&self, _source: &PixelBuffer) {}

    fn map_pixel(&self, source: &PixelBuffer, x: usize, y: usize, _: &mut ()) -> Rgb {
        let p = source.pixel(x, y);
        Rgb::new(255 - p.r, 255 - p.g, 255 - p.b)
    }
}

// ============================================================================
// Brightness
// ============================================================================

/// Adds `delta` to every channel, saturating at 0 and 255.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Brightness {
    pub delta: i32,
}

impl Brightness {
    pub const DEFAULT_DELTA: i32 = 40;

    pub fn new(delta: i32) -> Self {
        Brightness { delta }
    }
}

impl Default for Brightness {
    fn default() -> Self {
        Brightness::new(Self::DEFAULT_DELTA)
    }
}

impl PixelFilter for Brightness {
    type Stats = ();

    fn name(&self) -> &'static str {
        "brightness"
    }

    fn prepare(&self, _source: &PixelBuffer) {}

    fn map_pixel(&self, source: &PixelBuffer, x: usize, y: usize, _: &mut ()) -> Rgb {
        let p = source.pixel(x, y);
        Rgb::new(
            clamp_channel((p.r as i32).saturating_add(self.delta)),
            clamp_channel((p.g as i32).saturating_add(self.delta)),
            clamp_channel((p.b as i32).saturating_add(self.delta)),
        )
    }
}
