//! Single-kernel convolution: Blur, Gaussian, Sharpen, Emboss.
//!
//! Each output channel is `clamp(trunc(bias + Σ weight · sample))`, with
//! samples taken under clamp-to-edge addressing.

use super::core::{truncate_channel, Kernel};
use super::PixelFilter;
use crate::error::Result;
use crate::image::{PixelBuffer, Rgb};

/// Sharpen kernel with all eight neighbors subtracted.
const SHARPEN: [[f32; 3]; 3] = [[-1.0, -1.0, -1.0], [-1.0, 9.0, -1.0], [-1.0, -1.0, -1.0]];

/// Sharpen kernel with only the four edge neighbors subtracted.
const SHARPEN_CROSS: [[f32; 3]; 3] = [[0.0, -1.0, 0.0], [-1.0, 5.0, -1.0], [0.0, -1.0, 0.0]];

/// Directional difference kernel; zero net response.
const EMBOSS: [[f32; 3]; 3] = [[0.0, -1.0, 0.0], [-1.0, 0.0, 1.0], [0.0, 1.0, 0.0]];

/// Added to every emboss accumulator to center the result on mid-gray.
pub const EMBOSS_BIAS: f32 = 128.0;

pub const GAUSSIAN_RADIUS: usize = 3;
pub const GAUSSIAN_SIGMA: f32 = 2.0;

/// Convolution with one kernel and a constant bias.
#[derive(Debug, Clone, PartialEq)]
pub struct ConvolutionFilter {
    kernel: Kernel,
    bias: f32,
    name: &'static str,
}

impl ConvolutionFilter {
    /// Arbitrary kernel, no bias.
    pub fn new(kernel: Kernel) -> Self {
        ConvolutionFilter {
            kernel,
            bias: 0.0,
            name: "convolution",
        }
    }

    pub fn with_bias(mut self, bias: f32) -> Self {
        self.bias = bias;
        self
    }

    fn named(kernel: Kernel, name: &'static str) -> Self {
        ConvolutionFilter {
            kernel,
            bias: 0.0,
            name,
        }
    }

    /// 3×3 box blur.
    pub fn blur() -> Self {
        Self::named(fixed(Kernel::box_blur(3)), "blur")
    }

    /// 7×7 Gaussian, σ = 2.
    pub fn gaussian() -> Self {
        Self::named(
            fixed(Kernel::gaussian(GAUSSIAN_RADIUS, GAUSSIAN_SIGMA)),
            "gaussian",
        )
    }

    /// Gaussian with a custom window radius and sigma.
    pub fn gaussian_with(radius: usize, sigma: f32) -> Result<Self> {
        Ok(Self::named(Kernel::gaussian(radius, sigma)?, "gaussian"))
    }

    pub fn sharpen() -> Self {
        Self::named(fixed(Kernel::from_rows(SHARPEN)), "sharpen")
    }

    pub fn sharpen_cross() -> Self {
        Self::named(fixed(Kernel::from_rows(SHARPEN_CROSS)), "sharpen_cross")
    }

    pub fn emboss() -> Self {
        Self::named(fixed(Kernel::from_rows(EMBOSS)), "emboss").with_bias(EMBOSS_BIAS)
    }

    pub fn kernel(&self) -> &Kernel {
        &self.kernel
    }

    pub fn bias(&self) -> f32 {
        self.bias
    }
}

/// Unwrap a kernel built from compile-time constants.
fn fixed(kernel: Result<Kernel>) -> Kernel {
    match kernel {
        Ok(k) => k,
        Err(e) => unreachable!("built-in kernel is invalid: {e}"),
    }
}

impl PixelFilter for ConvolutionFilter {
    type Stats = ();

    fn name(&self) -> &'static str {
        self.name
    }

    fn prepare(&self, _source: &PixelBuffer) {}

    fn map_pixel(&self, source: &PixelBuffer, x: usize, y: usize, _: &mut ()) -> Rgb {
        let [r, g, b] = self.kernel.accumulate(source, x, y, self.bias as f64);
        Rgb::new(truncate_channel(r), truncate_channel(g), truncate_channel(b))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::{process, NoProgress};

    fn run(filter: &ConvolutionFilter, img: &PixelBuffer) -> PixelBuffer {
        process(img, filter, &mut NoProgress).into_image().unwrap()
    }

    #[test]
    fn test_blur_constant_image_unchanged() {
        let img = PixelBuffer::filled(5, 4, Rgb::new(90, 181, 47)).unwrap();
        assert_eq!(run(&ConvolutionFilter::blur(), &img), img);
    }

    #[test]
    fn test_blur_spreads_single_point() {
        let mut img = PixelBuffer::new(5, 5).unwrap();
        img.set_pixel(2, 2, Rgb::gray(225));

        let out = run(&ConvolutionFilter::blur(), &img);

        assert_eq!(out.pixel(2, 2), Rgb::gray(25));
        assert_eq!(out.pixel(1, 1), Rgb::gray(25));
        assert_eq!(out.pixel(0, 0), Rgb::BLACK);
    }

    #[test]
    fn test_gaussian_keeps_flat_black_and_white() {
        let black = PixelBuffer::new(8, 8).unwrap();
        assert_eq!(run(&ConvolutionFilter::gaussian(), &black), black);

        let white = PixelBuffer::filled(8, 8, Rgb::WHITE).unwrap();
        let out = run(&ConvolutionFilter::gaussian(), &white);
        // Normalization error may truncate 255 down by one
        assert!(out.pixels().all(|(_, _, p)| p.r >= 254 && p.g >= 254 && p.b >= 254));
    }

    #[test]
    fn test_sharpen_flat_region_unchanged() {
        let img = PixelBuffer::filled(4, 4, Rgb::new(10, 120, 200)).unwrap();
        assert_eq!(run(&ConvolutionFilter::sharpen(), &img), img);
        assert_eq!(run(&ConvolutionFilter::sharpen_cross(), &img), img);
    }

    #[test]
    fn test_sharpen_variants_differ_on_a_point() {
        let mut img = PixelBuffer::filled(3, 3, Rgb::gray(20)).unwrap();
        img.set_pixel(0, 0, Rgb::gray(100));

        let strong = run(&ConvolutionFilter::sharpen(), &img);
        let cross = run(&ConvolutionFilter::sharpen_cross(), &img);

        // At the center, only the diagonal neighbor is bright
        assert_eq!(strong.pixel(1, 1), Rgb::BLACK);
        assert_eq!(cross.pixel(1, 1), Rgb::gray(20));
    }

    #[test]
    fn test_emboss_flat_is_mid_gray() {
        let img = PixelBuffer::filled(4, 3, Rgb::new(0, 77, 255)).unwrap();
        let out = run(&ConvolutionFilter::emboss(), &img);
        assert!(out.pixels().all(|(_, _, p)| p == Rgb::gray(128)));
    }

    #[test]
    fn test_emboss_vertical_edge() {
        // Left half black, right half white
        let img = PixelBuffer::from_fn(4, 3, |x, _| if x < 2 { Rgb::BLACK } else { Rgb::WHITE })
            .unwrap();

        let out = run(&ConvolutionFilter::emboss(), &img);

        // At x=1 the right neighbor is white: 128 + 255
        assert_eq!(out.pixel(1, 1), Rgb::WHITE);
        // At x=2: 128 - 255 (above) + 255 (right) + 255 (below)
        assert_eq!(out.pixel(2, 1), Rgb::WHITE);
        assert_eq!(out.pixel(0, 1), Rgb::gray(128));
    }
}
