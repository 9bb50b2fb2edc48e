//! RGB pixel buffer used as both filter source and destination.
//!
//! Storage is an `ndarray::Array3<u8>` of shape `(height, width, 3)`, the
//! same row-major layout used across the filter modules. Accessors take
//! `(x, y)` so that filter code reads in column/row order.

use ndarray::{Array3, ArrayView3};

use crate::error::{Error, Result};

/// One RGB pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Rgb { r, g, b }
    }

    pub const fn gray(v: u8) -> Self {
        Rgb { r: v, g: v, b: v }
    }

    /// Channels as an array, in R, G, B order.
    #[inline]
    pub fn channels(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }

    #[inline]
    pub fn from_channels(c: [u8; 3]) -> Self {
        Rgb::new(c[0], c[1], c[2])
    }
}

/// Owned width×height grid of RGB triples.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    data: Array3<u8>,
}

impl PixelBuffer {
    /// Allocate a black buffer.
    pub fn new(width: usize, height: usize) -> Result<Self> {
        check_dimensions(width, height)?;
        Ok(PixelBuffer {
            data: Array3::<u8>::zeros((height, width, 3)),
        })
    }

    /// Wrap an existing `(height, width, 3)` array.
    pub fn from_array(data: Array3<u8>) -> Result<Self> {
        let (height, width, channels) = data.dim();
        check_dimensions(width, height)?;
        if channels != 3 {
            return Err(Error::ChannelCount(channels));
        }
        Ok(PixelBuffer { data })
    }

    /// Build from interleaved RGB bytes, row by row.
    pub fn from_raw(width: usize, height: usize, raw: Vec<u8>) -> Result<Self> {
        check_dimensions(width, height)?;
        let expected = width * height * 3;
        if raw.len() != expected {
            return Err(Error::BufferLength {
                expected,
                actual: raw.len(),
            });
        }
        let data = Array3::from_shape_vec((height, width, 3), raw).map_err(|_| {
            Error::BufferLength {
                expected,
                actual: expected,
            }
        })?;
        Ok(PixelBuffer { data })
    }

    /// Build by evaluating `f(x, y)` for every pixel.
    pub fn from_fn<F>(width: usize, height: usize, mut f: F) -> Result<Self>
    where
        F: FnMut(usize, usize) -> Rgb,
    {
        let mut buffer = PixelBuffer::new(width, height)?;
        for y in 0..height {
            for x in 0..width {
                buffer.set_pixel(x, y, f(x, y));
            }
        }
        Ok(buffer)
    }

    /// Buffer filled with a single color.
    pub fn filled(width: usize, height: usize, color: Rgb) -> Result<Self> {
        PixelBuffer::from_fn(width, height, |_, _| color)
    }

    /// Black buffer with the same dimensions.
    pub fn blank_like(&self) -> Self {
        PixelBuffer {
            data: Array3::<u8>::zeros(self.data.raw_dim()),
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.data.dim().1
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.data.dim().0
    }

    #[inline]
    pub fn pixel(&self, x: usize, y: usize) -> Rgb {
        Rgb::new(
            self.data[[y, x, 0]],
            self.data[[y, x, 1]],
            self.data[[y, x, 2]],
        )
    }

    #[inline]
    pub fn set_pixel(&mut self, x: usize, y: usize, color: Rgb) {
        self.data[[y, x, 0]] = color.r;
        self.data[[y, x, 1]] = color.g;
        self.data[[y, x, 2]] = color.b;
    }

    pub fn view(&self) -> ArrayView3<'_, u8> {
        self.data.view()
    }

    pub fn into_array(self) -> Array3<u8> {
        self.data
    }

    /// Interleaved RGB bytes, row by row.
    pub fn into_raw(self) -> Vec<u8> {
        if self.data.is_standard_layout() {
            self.data.into_raw_vec_and_offset().0
        } else {
            self.data.iter().copied().collect()
        }
    }

    /// Iterate `(x, y, pixel)` in row-major order.
    pub fn pixels(&self) -> impl Iterator<Item = (usize, usize, Rgb)> + '_ {
        let width = self.width();
        (0..self.height())
            .flat_map(move |y| (0..width).map(move |x| (x, y)))
            .map(move |(x, y)| (x, y, self.pixel(x, y)))
    }
}

fn check_dimensions(width: usize, height: usize) -> Result<()> {
    if width == 0 || height == 0 {
        return Err(Error::InvalidDimensions { width, height });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_is_black() {
        let buf = PixelBuffer::new(3, 2).unwrap();
        assert_eq!(buf.width(), 3);
        assert_eq!(buf.height(), 2);
        assert!(buf.pixels().all(|(_, _, p)| p == Rgb::BLACK));
    }

    #[test]
    fn test_zero_dimensions_rejected() {
        assert!(matches!(
            PixelBuffer::new(0, 4),
            Err(Error::InvalidDimensions { width: 0, height: 4 })
        ));
    }

    #[test]
    fn test_from_array_rejects_rgba() {
        let arr = Array3::<u8>::zeros((2, 2, 4));
        assert!(matches!(PixelBuffer::from_array(arr), Err(Error::ChannelCount(4))));
    }

    #[test]
    fn test_from_raw_layout_is_row_major() {
        // 2x1: red, then green
        let buf = PixelBuffer::from_raw(2, 1, vec![255, 0, 0, 0, 255, 0]).unwrap();
        assert_eq!(buf.pixel(0, 0), Rgb::new(255, 0, 0));
        assert_eq!(buf.pixel(1, 0), Rgb::new(0, 255, 0));
        assert_eq!(buf.into_raw(), vec![255, 0, 0, 0, 255, 0]);
    }

    #[test]
    fn test_from_raw_length_mismatch() {
        let err = PixelBuffer::from_raw(2, 2, vec![0; 5]).unwrap_err();
        assert!(matches!(err, Error::BufferLength { expected: 12, actual: 5 }));
    }

    #[test]
    fn test_set_pixel_uses_x_then_y() {
        let mut buf = PixelBuffer::new(3, 2).unwrap();
        buf.set_pixel(2, 1, Rgb::new(1, 2, 3));
        let arr = buf.into_array();
        assert_eq!(arr[[1, 2, 0]], 1);
        assert_eq!(arr[[1, 2, 1]], 2);
        assert_eq!(arr[[1, 2, 2]], 3);
    }
}
