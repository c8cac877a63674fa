//! Types used in image preprocessing
//!
//! Enums describing how an image is resized and laid out before it reaches the
//! classifier.
use std::str::FromStr;

use image::imageops::FilterType;
use serde::{Deserialize, Serialize};

use crate::core::config::ConfigError;

/// Specifies the order of channels in an image tensor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelOrder {
    /// Channel, Height, Width order (common in PyTorch exports)
    CHW,
    /// Height, Width, Channel order (common in Keras/TensorFlow exports)
    #[default]
    HWC,
}

impl ChannelOrder {
    /// Returns the single-sample batch shape for an image of `height` x `width`.
    pub fn batch_shape(self, height: u32, width: u32) -> [usize; 4] {
        let (h, w) = (height as usize, width as usize);
        match self {
            ChannelOrder::CHW => [1, 3, h, w],
            ChannelOrder::HWC => [1, h, w, 3],
        }
    }
}

impl FromStr for ChannelOrder {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "chw" | "nchw" => Ok(ChannelOrder::CHW),
            "hwc" | "nhwc" => Ok(ChannelOrder::HWC),
            other => Err(ConfigError::InvalidValue {
                field: "channel_order".to_string(),
                reason: format!("expected 'hwc' or 'chw', got '{other}'"),
            }),
        }
    }
}

/// Interpolation used when resizing to the classifier's input resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResizeFilter {
    /// Nearest neighbour, matching the loader the classifier was trained with
    #[default]
    Nearest,
    /// Bilinear interpolation
    Triangle,
    /// Bicubic interpolation
    CatmullRom,
    /// Lanczos with window 3
    Lanczos3,
}

impl From<ResizeFilter> for FilterType {
    fn from(filter: ResizeFilter) -> Self {
        match filter {
            ResizeFilter::Nearest => FilterType::Nearest,
            ResizeFilter::Triangle => FilterType::Triangle,
            ResizeFilter::CatmullRom => FilterType::CatmullRom,
            ResizeFilter::Lanczos3 => FilterType::Lanczos3,
        }
    }
}

impl FromStr for ResizeFilter {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "nearest" => Ok(ResizeFilter::Nearest),
            "triangle" | "bilinear" => Ok(ResizeFilter::Triangle),
            "catmullrom" | "bicubic" => Ok(ResizeFilter::CatmullRom),
            "lanczos3" | "lanczos" => Ok(ResizeFilter::Lanczos3),
            other => Err(ConfigError::InvalidValue {
                field: "resize_filter".to_string(),
                reason: format!("unknown filter '{other}'"),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_shape() {
        assert_eq!(ChannelOrder::HWC.batch_shape(224, 224), [1, 224, 224, 3]);
        assert_eq!(ChannelOrder::CHW.batch_shape(224, 200), [1, 3, 224, 200]);
    }

    #[test]
    fn test_parse() {
        assert_eq!("NHWC".parse::<ChannelOrder>().unwrap(), ChannelOrder::HWC);
        assert_eq!("chw".parse::<ChannelOrder>().unwrap(), ChannelOrder::CHW);
        assert!("cwh".parse::<ChannelOrder>().is_err());
        assert_eq!(
            "bilinear".parse::<ResizeFilter>().unwrap(),
            ResizeFilter::Triangle
        );
        assert!("box".parse::<ResizeFilter>().is_err());
    }
}
