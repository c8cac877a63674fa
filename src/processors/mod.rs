//! Image processing applied before inference.

pub mod normalization;
pub mod preprocess;
pub mod types;

pub use normalization::NormalizeImage;
pub use preprocess::{ImagePreprocessor, decode_rgb};
pub use types::{ChannelOrder, ResizeFilter};
