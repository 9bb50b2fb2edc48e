//! Edge detection filters: Sobel, Scharr, Prewitt.
//!
//! Each filter convolves the same neighborhood with a pair of derivative
//! kernels and combines the two responses per channel by Euclidean
//! magnitude: `clamp(round(sqrt(g1² + g2²)))`.
//!
//! Unlike a luminance-based detector, every color channel gets its own
//! gradient, so colored edges stay colored.

use super::core::{round_channel, Kernel};
use super::PixelFilter;
use crate::image::{PixelBuffer, Rgb};

// ============================================================================
// Kernel tables
// ============================================================================

const SOBEL_X: [[f32; 3]; 3] = [[-1.0, 0.0, 1.0], [-2.0, 0.0, 2.0], [-1.0, 0.0, 1.0]];
const SOBEL_Y: [[f32; 3]; 3] = [[-1.0, -2.0, -1.0], [0.0, 0.0, 0.0], [1.0, 2.0, 1.0]];

const SCHARR_X: [[f32; 3]; 3] = [[3.0, 0.0, -3.0], [10.0, 0.0, -10.0], [3.0, 0.0, -3.0]];
const SCHARR_Y: [[f32; 3]; 3] = [[3.0, 10.0, 3.0], [0.0, 0.0, 0.0], [-3.0, -10.0, -3.0]];

const PREWITT_X: [[f32; 3]; 3] = [[-1.0, 0.0, 1.0], [-1.0, 0.0, 1.0], [-1.0, 0.0, 1.0]];
const PREWITT_Y: [[f32; 3]; 3] = [[-1.0, -1.0, -1.0], [0.0, 0.0, 0.0], [1.0, 1.0, 1.0]];

/// Two-kernel gradient magnitude filter.
///
/// The kernels may have different sizes; each is centered on the pixel.
#[derive(Debug, Clone, PartialEq)]
pub struct DualKernelFilter {
    kernel1: Kernel,
    kernel2: Kernel,
    name: &'static str,
}

impl DualKernelFilter {
    pub fn new(kernel1: Kernel, kernel2: Kernel) -> Self {
        DualKernelFilter {
            kernel1,
            kernel2,
            name: "dual_kernel",
        }
    }

    fn table(x: [[f32; 3]; 3], y: [[f32; 3]; 3], name: &'static str) -> Self {
        match (Kernel::from_rows(x), Kernel::from_rows(y)) {
            (Ok(kernel1), Ok(kernel2)) => DualKernelFilter {
                kernel1,
                kernel2,
                name,
            },
            _ => unreachable!("built-in 3x3 kernels are always valid"),
        }
    }

    pub fn sobel() -> Self {
        Self::table(SOBEL_X, SOBEL_Y, "sobel")
    }

    pub fn scharr() -> Self {
        Self::table(SCHARR_X, SCHARR_Y, "scharr")
    }

    pub fn prewitt() -> Self {
        Self::table(PREWITT_X, PREWITT_Y, "prewitt")
    }

    pub fn kernels(&self) -> (&Kernel, &Kernel) {
        (&self.kernel1, &self.kernel2)
    }
}

impl PixelFilter for DualKernelFilter {
    type Stats = ();

    fn name(&self) -> &'static str {
        self.name
    }

    fn prepare(&self, _source: &PixelBuffer) {}

    fn map_pixel(&self, source: &PixelBuffer, x: usize, y: usize, _: &mut ()) -> Rgb {
        let g1 = self.kernel1.accumulate(source, x, y, 0.0);
        let g2 = self.kernel2.accumulate(source, x, y, 0.0);
        let mag = |c: usize| round_channel((g1[c] * g1[c] + g2[c] * g2[c]).sqrt());
        Rgb::new(mag(0), mag(1), mag(2))
    }
}
