//! Filter modules for image processing effects.
//!
//! ## Filter Contract
//!
//! Every filter implements [`PixelFilter`]: an optional whole-image pre-pass
//! (`prepare`) whose result is handed to a per-pixel function (`map_pixel`).
//! The shared loop in [`crate::process`] owns iteration, progress reporting
//! and cancellation; filters only compute pixels.
//!
//! Statistics produced by `prepare` live for one invocation. Filter values
//! themselves are immutable, so the same filter can be run repeatedly and
//! always sees fresh statistics.
//!
//! ## Filter Categories
//!
//! | Category | Module | Filters |
//! |----------|--------|---------|
//! | Point | `color_adjust`, `grayscale` | Invert, Brightness, GrayScale, Sepia |
//! | Convolution | `convolution` | Blur, Gaussian, Sharpen, SharpenCross, Emboss |
//! | Neighborhood | `stylize`, `noise` | Glass, Move, Median |
//! | Gradient | `edge` | Sobel, Scharr, Prewitt |
//! | Two-pass | `levels`, `white_balance` | HistogramStretch, ChannelStretch, GrayWorld, LocalGrayWorld |
//! | Morphology | `morphology` | Erosion, Dilation, Opening, Closing, Gradient, TopHat, BlackHat |
//!
//! Neighborhood sampling uses clamp-to-edge addressing throughout. The Move
//! filter is the one exception and fills with black instead.

pub mod core;
pub mod color_adjust;
pub mod grayscale;
pub mod convolution;
pub mod stylize;
pub mod noise;
pub mod edge;
pub mod levels;
pub mod white_balance;
pub mod morphology;

use crate::image::{PixelBuffer, Rgb};
use crate::process::{self, FilterOutcome, NoProgress, ProgressSink};

pub use self::color_adjust::{Brightness, Invert};
pub use self::convolution::ConvolutionFilter;
pub use self::core::Kernel;
pub use self::edge::DualKernelFilter;
pub use self::grayscale::{GrayScale, LumaWeights, Sepia};
pub use self::levels::{ChannelStretch, HistogramStretch};
pub use self::morphology::{MorphOperation, Morphology, StructuringElement};
pub use self::noise::Median;
pub use self::stylize::{Glass, Move};
pub use self::white_balance::{GrayWorld, LocalGrayWorld};

/// Per-pixel filter with an optional pre-pass.
pub trait PixelFilter {
    /// Whatever `prepare` derives from the source image. `()` for filters
    /// without a pre-pass.
    type Stats;

    /// Display name for logging.
    fn name(&self) -> &'static str;

    /// Whole-image scan run once before the first pixel is mapped.
    fn prepare(&self, source: &PixelBuffer) -> Self::Stats;

    /// Compute the destination pixel at `(x, y)`.
    fn map_pixel(&self, source: &PixelBuffer, x: usize, y: usize, stats: &mut Self::Stats) -> Rgb;
}

/// Any filter the engine can run, selected at runtime.
#[derive(Debug, Clone)]
pub enum Filter {
    Invert(Invert),
    Brightness(Brightness),
    GrayScale(GrayScale),
    Sepia(Sepia),
    Convolution(ConvolutionFilter),
    Glass(Glass),
    Move(Move),
    Median(Median),
    DualKernel(DualKernelFilter),
    HistogramStretch(HistogramStretch),
    ChannelStretch(ChannelStretch),
    GrayWorld(GrayWorld),
    LocalGrayWorld(LocalGrayWorld),
    Morphology(Morphology),
}

macro_rules! dispatch {
    ($self:expr, $f:ident => $body:expr) => {
        match $self {
            Filter::Invert($f) => $body,
            Filter::Brightness($f) => $body,
            Filter::GrayScale($f) => $body,
            Filter::Sepia($f) => $body,
            Filter::Convolution($f) => $body,
            Filter::Glass($f) => $body,
            Filter::Move($f) => $body,
            Filter::Median($f) => $body,
            Filter::DualKernel($f) => $body,
            Filter::HistogramStretch($f) => $body,
            Filter::ChannelStretch($f) => $body,
            Filter::GrayWorld($f) => $body,
            Filter::LocalGrayWorld($f) => $body,
            Filter::Morphology($f) => $body,
        }
    };
}

impl Filter {
    pub fn name(&self) -> &'static str {
        dispatch!(self, f => f.name())
    }

    /// Run through the shared driver, reporting to `sink`.
    pub fn process<S>(&self, source: &PixelBuffer, sink: &mut S) -> FilterOutcome
    where
        S: ProgressSink + ?Sized,
    {
        dispatch!(self, f => process::process(source, f, sink))
    }

    /// Run to completion without progress or cancellation.
    pub fn apply(&self, source: &PixelBuffer) -> PixelBuffer {
        match self.process(source, &mut NoProgress) {
            FilterOutcome::Finished(image) => image,
            FilterOutcome::Cancelled => unreachable!("NoProgress never requests cancellation"),
        }
    }
}

macro_rules! impl_from {
    ($($variant:ident($ty:ty)),* $(,)?) => {
        $(
            impl From<$ty> for Filter {
                fn from(f: $ty) -> Self {
                    Filter::$variant(f)
                }
            }
        )*
    };
}

impl_from!(
    Invert(Invert),
    Brightness(Brightness),
    GrayScale(GrayScale),
    Sepia(Sepia),
    Convolution(ConvolutionFilter),
    Glass(Glass),
    Move(Move),
    Median(Median),
    DualKernel(DualKernelFilter),
    HistogramStretch(HistogramStretch),
    ChannelStretch(ChannelStretch),
    GrayWorld(GrayWorld),
    LocalGrayWorld(LocalGrayWorld),
    Morphology(Morphology),
);

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient_image() -> PixelBuffer {
        PixelBuffer::from_fn(9, 7, |x, y| {
            Rgb::new((x * 28) as u8, (y * 36) as u8, ((x * y * 5) % 256) as u8)
        })
        .unwrap()
    }

    fn all_filters() -> Vec<Filter> {
        vec![
            Invert.into(),
            Brightness::default().into(),
            GrayScale.into(),
            Sepia::default().into(),
            ConvolutionFilter::blur().into(),
            ConvolutionFilter::gaussian().into(),
            ConvolutionFilter::sharpen().into(),
            ConvolutionFilter::sharpen_cross().into(),
            ConvolutionFilter::emboss().into(),
            Glass::with_seed(7).into(),
            Move::default().into(),
            Median.into(),
            DualKernelFilter::sobel().into(),
            DualKernelFilter::scharr().into(),
            DualKernelFilter::prewitt().into(),
            HistogramStretch.into(),
            ChannelStretch.into(),
            GrayWorld.into(),
            LocalGrayWorld.into(),
            Morphology::new(MorphOperation::TopHat, StructuringElement::default())
                .unwrap()
                .into(),
        ]
    }

    #[test]
    fn test_every_filter_preserves_dimensions() {
        let img = gradient_image();
        for filter in all_filters() {
            let out = filter.apply(&img);
            assert_eq!(out.width(), img.width(), "{}", filter.name());
            assert_eq!(out.height(), img.height(), "{}", filter.name());
        }
    }

    #[test]
    fn test_reused_filter_gives_identical_results() {
        let a = gradient_image();
        let b = PixelBuffer::filled(9, 7, Rgb::new(10, 200, 30)).unwrap();
        for filter in all_filters() {
            let first = filter.apply(&a);
            let _ = filter.apply(&b);
            let again = filter.apply(&a);
            assert_eq!(first, again, "{} leaked state between runs", filter.name());
        }
    }

    #[test]
    fn test_source_is_not_modified() {
        let img = gradient_image();
        let copy = img.clone();
        for filter in all_filters() {
            let _ = filter.apply(&img);
        }
        assert_eq!(img, copy);
    }
}
