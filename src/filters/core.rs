//! Core utilities shared by the filter modules.
//!
//! This module provides:
//! - Range clamping for channel saturation and clamp-to-edge addressing
//! - The [`Kernel`] weight matrix and its standard instantiations
//! - Kernel accumulation over a clamped neighborhood
//! - Row-parallel whole-image passes used by pre-pass steps

use ndarray::Array2;
use rayon::prelude::*;

use crate::error::{Error, Result};
use crate::image::{PixelBuffer, Rgb};

/// Clamp `value` to `[min, max]`.
#[inline]
pub fn clamp(value: i32, min: i32, max: i32) -> i32 {
    if value < min {
        min
    } else if value > max {
        max
    } else {
        value
    }
}

/// Saturate an integer channel value into `u8`.
#[inline]
pub fn clamp_channel(value: i32) -> u8 {
    clamp(value, 0, 255) as u8
}

/// Truncate toward zero, then saturate into `u8`.
#[inline]
pub fn truncate_channel(value: f64) -> u8 {
    clamp_channel(value as i32)
}

/// Round to nearest, then saturate into `u8`.
#[inline]
pub fn round_channel(value: f64) -> u8 {
    clamp_channel(value.round() as i32)
}

/// Clamp-to-edge addressing: pull `coord` back into `0..len`.
#[inline]
pub fn clamp_coord(coord: isize, len: usize) -> usize {
    coord.clamp(0, len as isize - 1) as usize
}

/// Source pixel at `(x + dx, y + dy)` with clamp-to-edge addressing.
#[inline]
pub fn sample_clamped(image: &PixelBuffer, x: usize, y: usize, dx: isize, dy: isize) -> Rgb {
    let sx = clamp_coord((x as isize).saturating_add(dx), image.width());
    let sy = clamp_coord((y as isize).saturating_add(dy), image.height());
    image.pixel(sx, sy)
}

/// Rectangular weight matrix with odd dimensions and an implicit center.
///
/// Weights are indexed `[[row, col]]`, i.e. `[[dy + radius_y, dx + radius_x]]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Kernel {
    weights: Array2<f32>,
}

impl Kernel {
    /// Largest radius accepted by [`Kernel::gaussian`].
    pub const MAX_GAUSSIAN_RADIUS: usize = 50;

    pub fn new(weights: Array2<f32>) -> Result<Self> {
        let (rows, cols) = weights.dim();
        if rows == 0 || cols == 0 || rows % 2 == 0 || cols % 2 == 0 {
            return Err(Error::InvalidKernel { rows, cols });
        }
        Ok(Kernel { weights })
    }

    /// Build from fixed-size rows. `N` must be odd.
    pub fn from_rows<const N: usize>(rows: [[f32; N]; N]) -> Result<Self> {
        let weights = Array2::from_shape_fn((N, N), |(r, c)| rows[r][c]);
        Kernel::new(weights)
    }

    /// Uniform `size`×`size` box kernel, weights `1 / size²`.
    pub fn box_blur(size: usize) -> Result<Self> {
        let weight = 1.0 / (size * size) as f32;
        Kernel::new(Array2::from_elem((size, size), weight))
    }

    /// Gaussian kernel over a `(2·radius + 1)²` window.
    ///
    /// Weights are `exp(-(i² + j²) / σ²)`, L1-normalized to sum to 1.
    /// `radius` may not exceed [`Kernel::MAX_GAUSSIAN_RADIUS`].
    pub fn gaussian(radius: usize, sigma: f32) -> Result<Self> {
        if radius > Self::MAX_GAUSSIAN_RADIUS {
            return Err(Error::InvalidParameter {
                name: "radius",
                value: radius.to_string(),
                reason: format!("radius must be at most {}", Self::MAX_GAUSSIAN_RADIUS),
            });
        }
        if sigma <= 0.0 || !sigma.is_finite() {
            return Err(Error::InvalidParameter {
                name: "sigma",
                value: sigma.to_string(),
                reason: "sigma must be a positive finite number".to_string(),
            });
        }
        let size = 2 * radius + 1;
        let r = radius as isize;
        let mut weights = Array2::<f32>::zeros((size, size));
        let mut norm = 0.0f32;
        for i in -r..=r {
            for j in -r..=r {
                let v = (-((i * i + j * j) as f32) / (sigma * sigma)).exp();
                weights[[(i + r) as usize, (j + r) as usize]] = v;
                norm += v;
            }
        }
        weights.mapv_inplace(|v| v / norm);
        Kernel::new(weights)
    }

    #[inline]
    pub fn radius_x(&self) -> usize {
        self.weights.ncols() / 2
    }

    #[inline]
    pub fn radius_y(&self) -> usize {
        self.weights.nrows() / 2
    }

    pub fn weights(&self) -> &Array2<f32> {
        &self.weights
    }

    pub fn sum(&self) -> f32 {
        self.weights.sum()
    }

    /// Weighted per-channel sum over the clamped neighborhood of `(x, y)`,
    /// starting from `bias`.
    ///
    /// Accumulates in `f64` so that a normalized kernel over a flat region
    /// truncates back to the input value.
    pub fn accumulate(&self, image: &PixelBuffer, x: usize, y: usize, bias: f64) -> [f64; 3] {
        let rx = self.radius_x() as isize;
        let ry = self.radius_y() as isize;
        let mut acc = [bias; 3];
        for l in -ry..=ry {
            for k in -rx..=rx {
                let w = self.weights[[(l + ry) as usize, (k + rx) as usize]] as f64;
                let p = sample_clamped(image, x, y, k, l);
                acc[0] += p.r as f64 * w;
                acc[1] += p.g as f64 * w;
                acc[2] += p.b as f64 * w;
            }
        }
        acc
    }
}

/// Evaluate `f(x, y)` for every pixel, one rayon task per row.
///
/// Used by pre-pass steps that need a whole intermediate image.
pub fn map_image_parallel<F>(source: &PixelBuffer, f: F) -> PixelBuffer
where
    F: Fn(usize, usize) -> Rgb + Sync,
{
    let (width, height) = (source.width(), source.height());
    let rows: Vec<Vec<Rgb>> = (0..height)
        .into_par_iter()
        .map(|y| (0..width).map(|x| f(x, y)).collect())
        .collect();

    let mut out = source.clone();
    for (y, row) in rows.into_iter().enumerate() {
        for (x, p) in row.into_iter().enumerate() {
            out.set_pixel(x, y, p);
        }
    }
    out
}
