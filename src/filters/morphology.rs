//! Morphology filters: Erosion, Dilation, Opening, Closing, Gradient,
//! TopHat, BlackHat.
//!
//! All operations work per channel over a [`StructuringElement`], sampling
//! with clamp-to-edge addressing.
//!
//! | Operation | Result |
//! |-----------|--------|
//! | Erosion | min over the element |
//! | Dilation | max over the element |
//! | Opening | dilation of the erosion |
//! | Closing | erosion of the dilation |
//! | Gradient | dilation − erosion |
//! | TopHat | source − opening |
//! | BlackHat | closing − source |
//!
//! The compound operations compute their first pass in `prepare`, row
//! parallel, and apply the second pass per pixel.

use log::debug;
use serde::{Deserialize, Serialize};

use super::core::{map_image_parallel, sample_clamped};
use super::PixelFilter;
use crate::error::{Error, Result};
use crate::image::{PixelBuffer, Rgb};

// ============================================================================
// Structuring element
// ============================================================================

/// Neighborhood shape, centered on the pixel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StructuringElement {
    /// `(2r + 1)²` box.
    Square(usize),
    /// Horizontal and vertical arms of length `r`.
    Cross(usize),
    /// Offsets with `dx² + dy² ≤ r²`.
    Disk(usize),
    /// Explicit odd-sized square mask, row-major, `true` = included.
    Custom(Vec<Vec<bool>>),
}

impl Default for StructuringElement {
    fn default() -> Self {
        StructuringElement::Square(1)
    }
}

impl StructuringElement {
    /// Largest radius, or custom mask half-width, accepted by [`validate`].
    ///
    /// [`validate`]: StructuringElement::validate
    pub const MAX_RADIUS: usize = 64;

    pub fn validate(&self) -> Result<()> {
        match self {
            StructuringElement::Square(r)
            | StructuringElement::Cross(r)
            | StructuringElement::Disk(r) => {
                if *r == 0 {
                    return Err(invalid(self, "radius must be at least 1"));
                }
                if *r > Self::MAX_RADIUS {
                    return Err(invalid(self, "radius is too large"));
                }
            }
            StructuringElement::Custom(mask) => {
                let n = mask.len();
                if n == 0 || n % 2 == 0 {
                    return Err(invalid(self, "mask size must be odd and non-zero"));
                }
                if n / 2 > Self::MAX_RADIUS {
                    return Err(invalid(self, "mask is too large"));
                }
                if mask.iter().any(|row| row.len() != n) {
                    return Err(invalid(self, "mask must be square"));
                }
                if !mask.iter().flatten().any(|&on| on) {
                    return Err(invalid(self, "mask has no active cells"));
                }
            }
        }
        Ok(())
    }

    /// `(dx, dy)` offsets covered by the element.
    pub fn offsets(&self) -> Vec<(isize, isize)> {
        let window = |r: usize, keep: &dyn Fn(isize, isize) -> bool| {
            let r = r as isize;
            let mut out = Vec::new();
            for dy in -r..=r {
                for dx in -r..=r {
                    if keep(dx, dy) {
                        out.push((dx, dy));
                    }
                }
            }
            out
        };

        match self {
            StructuringElement::Square(r) => window(*r, &|_, _| true),
            StructuringElement::Cross(r) => window(*r, &|dx, dy| dx == 0 || dy == 0),
            StructuringElement::Disk(r) => {
                let r_sq = (*r * *r) as isize;
                window(*r, &|dx, dy| dx * dx + dy * dy <= r_sq)
            }
            StructuringElement::Custom(mask) => {
                let r = (mask.len() / 2) as isize;
                let mut out = Vec::new();
                for (row, cells) in mask.iter().enumerate() {
                    for (col, &on) in cells.iter().enumerate() {
                        if on {
                            out.push((col as isize - r, row as isize - r));
                        }
                    }
                }
                out
            }
        }
    }
}

fn invalid(element: &StructuringElement, reason: &str) -> Error {
    Error::InvalidParameter {
        name: "structuring_element",
        value: format!("{element:?}"),
        reason: reason.to_string(),
    }
}

// ============================================================================
// Operations
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MorphOperation {
    Erosion,
    Dilation,
    Opening,
    Closing,
    Gradient,
    TopHat,
    BlackHat,
}

impl MorphOperation {
    pub fn name(self) -> &'static str {
        match self {
            MorphOperation::Erosion => "erosion",
            MorphOperation::Dilation => "dilation",
            MorphOperation::Opening => "opening",
            MorphOperation::Closing => "closing",
            MorphOperation::Gradient => "gradient",
            MorphOperation::TopHat => "top_hat",
            MorphOperation::BlackHat => "black_hat",
        }
    }
}

/// A morphological operation bound to a validated structuring element.
#[derive(Debug, Clone, PartialEq)]
pub struct Morphology {
    op: MorphOperation,
    element: StructuringElement,
    offsets: Vec<(isize, isize)>,
}

impl Morphology {
    pub fn new(op: MorphOperation, element: StructuringElement) -> Result<Self> {
        element.validate()?;
        let offsets = element.offsets();
        Ok(Morphology {
            op,
            element,
            offsets,
        })
    }

    pub fn operation(&self) -> MorphOperation {
        self.op
    }

    pub fn element(&self) -> &StructuringElement {
        &self.element
    }

    fn erode_at(&self, image: &PixelBuffer, x: usize, y: usize) -> Rgb {
        let mut out = [u8::MAX; 3];
        for &(dx, dy) in &self.offsets {
            let p = sample_clamped(image, x, y, dx, dy).channels();
            for c in 0..3 {
                out[c] = out[c].min(p[c]);
            }
        }
        Rgb::from_channels(out)
    }

    fn dilate_at(&self, image: &PixelBuffer, x: usize, y: usize) -> Rgb {
        let mut out = [u8::MIN; 3];
        for &(dx, dy) in &self.offsets {
            let p = sample_clamped(image, x, y, dx, dy).channels();
            for c in 0..3 {
                out[c] = out[c].max(p[c]);
            }
        }
        Rgb::from_channels(out)
    }
}

/// Per-channel `a - b`, saturating at 0.
fn difference(a: Rgb, b: Rgb) -> Rgb {
    Rgb::new(
        a.r.saturating_sub(b.r),
        a.g.saturating_sub(b.g),
        a.b.saturating_sub(b.b),
    )
}

impl PixelFilter for Morphology {
    /// First-pass image for the compound operations.
    type Stats = Option<PixelBuffer>;

    fn name(&self) -> &'static str {
        self.op.name()
    }

    fn prepare(&self, source: &PixelBuffer) -> Option<PixelBuffer> {
        match self.op {
            MorphOperation::Opening | MorphOperation::TopHat => {
                debug!("{}: eroding {} offsets", self.op.name(), self.offsets.len());
                Some(map_image_parallel(source, |x, y| self.erode_at(source, x, y)))
            }
            MorphOperation::Closing | MorphOperation::BlackHat => {
                debug!("{}: dilating {} offsets", self.op.name(), self.offsets.len());
                Some(map_image_parallel(source, |x, y| self.dilate_at(source, x, y)))
            }
            _ => None,
        }
    }

    fn map_pixel(
        &self,
        source: &PixelBuffer,
        x: usize,
        y: usize,
        first_pass: &mut Option<PixelBuffer>,
    ) -> Rgb {
        let first = first_pass.as_ref().unwrap_or(source);
        match self.op {
            MorphOperation::Erosion => self.erode_at(source, x, y),
            MorphOperation::Dilation => self.dilate_at(source, x, y),
            MorphOperation::Gradient => {
                difference(self.dilate_at(source, x, y), self.erode_at(source, x, y))
            }
            MorphOperation::Opening => self.dilate_at(first, x, y),
            MorphOperation::Closing => self.erode_at(first, x, y),
            MorphOperation::TopHat => difference(source.pixel(x, y), self.dilate_at(first, x, y)),
            MorphOperation::BlackHat => difference(self.erode_at(first, x, y), source.pixel(x, y)),
        }
    }
}
