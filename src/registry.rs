//! Filter lookup by name.
//!
//! [`FilterId`] names every filter the engine exposes; [`FilterSettings`]
//! carries the tunable parameters and builds a ready-to-run [`Filter`] for
//! an id. Settings deserialize from JSON with every field optional, so a
//! caller only overrides what it needs.
//!
//! ```
//! use filterlab::registry::{FilterId, FilterSettings};
//!
//! let settings = FilterSettings::from_json_str(r#"{"brightness_delta": -25}"#).unwrap();
//! let id: FilterId = "brightness".parse().unwrap();
//! let filter = settings.build(id).unwrap();
//! assert_eq!(filter.name(), "brightness");
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::filters::convolution::{GAUSSIAN_RADIUS, GAUSSIAN_SIGMA};
use crate::filters::{
    Brightness, ChannelStretch, ConvolutionFilter, DualKernelFilter, Filter, Glass, GrayScale,
    GrayWorld, HistogramStretch, Invert, LocalGrayWorld, Median, MorphOperation, Morphology, Move,
    Sepia, StructuringElement,
};

macro_rules! filter_ids {
    ($($variant:ident => $name:literal),* $(,)?) => {
        /// Identifier of a built-in filter.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum FilterId {
            $(
                #[serde(rename = $name)]
                $variant,
            )*
        }

        impl FilterId {
            /// Every id, in menu order.
            pub const ALL: &'static [FilterId] = &[$(FilterId::$variant),*];

            pub fn name(self) -> &'static str {
                match self {
                    $(FilterId::$variant => $name,)*
                }
            }
        }
    };
}

filter_ids! {
    Invert => "invert",
    GrayScale => "grayscale",
    Sepia => "sepia",
    Brightness => "brightness",
    Blur => "blur",
    Gaussian => "gaussian",
    Sharpen => "sharpen",
    SharpenCross => "sharpen_cross",
    Emboss => "emboss",
    Glass => "glass",
    Move => "move",
    Median => "median",
    Sobel => "sobel",
    Scharr => "scharr",
    Prewitt => "prewitt",
    HistogramStretch => "histogram_stretch",
    ChannelStretch => "channel_stretch",
    GrayWorld => "gray_world",
    LocalGrayWorld => "local_gray_world",
    Erosion => "erosion",
    Dilation => "dilation",
    Opening => "opening",
    Closing => "closing",
    Gradient => "gradient",
    TopHat => "top_hat",
    BlackHat => "black_hat",
}

impl fmt::Display for FilterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FilterId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        FilterId::ALL
            .iter()
            .copied()
            .find(|id| id.name() == s)
            .ok_or_else(|| Error::UnknownFilter(s.to_string()))
    }
}

/// Tunable parameters for the filters that have any.
///
/// Missing JSON fields take their defaults; unknown fields are rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FilterSettings {
    pub brightness_delta: i32,
    pub sepia_k: i32,
    pub glass_jitter: f64,
    /// Fixed seed for reproducible Glass output; drawn at random when unset.
    pub glass_seed: Option<u64>,
    pub move_offset: usize,
    pub gaussian_radius: usize,
    pub gaussian_sigma: f32,
    pub structuring_element: StructuringElement,
}

impl Default for FilterSettings {
    fn default() -> Self {
        Self {
            brightness_delta: Brightness::DEFAULT_DELTA,
            sepia_k: Sepia::DEFAULT_K,
            glass_jitter: Glass::DEFAULT_JITTER,
            glass_seed: None,
            move_offset: Move::DEFAULT_OFFSET,
            gaussian_radius: GAUSSIAN_RADIUS,
            gaussian_sigma: GAUSSIAN_SIGMA,
            structuring_element: StructuringElement::default(),
        }
    }
}

impl FilterSettings {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Construct the filter for `id` with these settings.
    pub fn build(&self, id: FilterId) -> Result<Filter> {
        let filter: Filter = match id {
            FilterId::Invert => Invert.into(),
            FilterId::GrayScale => GrayScale.into(),
            FilterId::Sepia => Sepia::new(channel_offset("sepia_k", self.sepia_k)?).into(),
            FilterId::Brightness => {
                Brightness::new(channel_offset("brightness_delta", self.brightness_delta)?).into()
            }
            FilterId::Blur => ConvolutionFilter::blur().into(),
            FilterId::Gaussian => {
                ConvolutionFilter::gaussian_with(self.gaussian_radius, self.gaussian_sigma)?.into()
            }
            FilterId::Sharpen => ConvolutionFilter::sharpen().into(),
            FilterId::SharpenCross => ConvolutionFilter::sharpen_cross().into(),
            FilterId::Emboss => ConvolutionFilter::emboss().into(),
            FilterId::Glass => self.glass()?.into(),
            FilterId::Move => Move::new(self.move_offset).into(),
            FilterId::Median => Median.into(),
            FilterId::Sobel => DualKernelFilter::sobel().into(),
            FilterId::Scharr => DualKernelFilter::scharr().into(),
            FilterId::Prewitt => DualKernelFilter::prewitt().into(),
            FilterId::HistogramStretch => HistogramStretch.into(),
            FilterId::ChannelStretch => ChannelStretch.into(),
            FilterId::GrayWorld => GrayWorld.into(),
            FilterId::LocalGrayWorld => LocalGrayWorld.into(),
            FilterId::Erosion => self.morphology(MorphOperation::Erosion)?,
            FilterId::Dilation => self.morphology(MorphOperation::Dilation)?,
            FilterId::Opening => self.morphology(MorphOperation::Opening)?,
            FilterId::Closing => self.morphology(MorphOperation::Closing)?,
            FilterId::Gradient => self.morphology(MorphOperation::Gradient)?,
            FilterId::TopHat => self.morphology(MorphOperation::TopHat)?,
            FilterId::BlackHat => self.morphology(MorphOperation::BlackHat)?,
        };
        Ok(filter)
    }

    fn morphology(&self, op: MorphOperation) -> Result<Filter> {
        Ok(Morphology::new(op, self.structuring_element.clone())?.into())
    }

    fn glass(&self) -> Result<Glass> {
        if !(0.0..=Glass::MAX_JITTER).contains(&self.glass_jitter) {
            return Err(Error::InvalidParameter {
                name: "glass_jitter",
                value: self.glass_jitter.to_string(),
                reason: format!("jitter must be between 0 and {}", Glass::MAX_JITTER),
            });
        }
        let seed = self.glass_seed.unwrap_or_else(rand::random);
        Ok(Glass::new(self.glass_jitter, seed))
    }
}

/// Accept a per-channel offset only within `-255..=255`.
fn channel_offset(name: &'static str, value: i32) -> Result<i32> {
    if (-255..=255).contains(&value) {
        Ok(value)
    } else {
        Err(Error::InvalidParameter {
            name,
            value: value.to_string(),
            reason: "offset must be between -255 and 255".to_string(),
        })
    }
}
