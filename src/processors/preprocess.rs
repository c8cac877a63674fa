//! Image preprocessing for the lesion classifier.
//!
//! Decodes uploaded bytes, converts them to RGB, resizes to the classifier's
//! fixed input resolution and normalizes them into a single-sample batch.

use crate::core::config::{ClassifierConfig, ConfigError};
use crate::core::{DermaError, DermaResult, Tensor4D};
use crate::processors::normalization::NormalizeImage;
use crate::processors::types::ResizeFilter;
use image::{DynamicImage, RgbImage, imageops};
use tracing::debug;

/// Turns raw image bytes into classifier input.
#[derive(Debug, Clone)]
pub struct ImagePreprocessor {
    /// Target (height, width)
    input_shape: (u32, u32),
    filter: ResizeFilter,
    normalize: NormalizeImage,
}

impl ImagePreprocessor {
    /// Creates a preprocessor for the given target size and normalizer.
    pub fn new(input_shape: (u32, u32), filter: ResizeFilter, normalize: NormalizeImage) -> Self {
        Self {
            input_shape,
            filter,
            normalize,
        }
    }

    /// Builds the preprocessor described by a classifier configuration.
    pub fn from_config(config: &ClassifierConfig) -> Result<Self, ConfigError> {
        let normalize =
            NormalizeImage::new(config.scale, config.mean, config.std, config.channel_order)?;
        Ok(Self::new(config.input_shape, config.resize_filter, normalize))
    }

    /// The tensor shape every call to [`ImagePreprocessor::preprocess`] produces.
    pub fn output_shape(&self) -> [usize; 4] {
        let (height, width) = self.input_shape;
        self.normalize.order.batch_shape(height, width)
    }

    /// Decodes and normalizes an uploaded image.
    ///
    /// # Errors
    ///
    /// * [`DermaError::Decode`] when the bytes are not a valid image
    /// * [`DermaError::UnsupportedFormat`] when the image cannot be turned into RGB
    pub fn preprocess(&self, bytes: &[u8]) -> DermaResult<Tensor4D> {
        let img = decode_rgb(bytes)?;
        Ok(self.preprocess_rgb(&img))
    }

    /// Resizes and normalizes an already decoded RGB image.
    pub fn preprocess_rgb(&self, img: &RgbImage) -> Tensor4D {
        let (height, width) = self.input_shape;
        if img.dimensions() == (width, height) {
            return self.normalize.apply(img);
        }

        debug!(
            from_width = img.width(),
            from_height = img.height(),
            width,
            height,
            "Resizing image to classifier input"
        );
        let resized = imageops::resize(img, width, height, self.filter.into());
        self.normalize.apply(&resized)
    }
}

/// Decodes bytes into an 8-bit RGB image.
pub fn decode_rgb(bytes: &[u8]) -> DermaResult<RgbImage> {
    if bytes.is_empty() {
        return Err(DermaError::decode("empty upload"));
    }

    let img = image::load_from_memory(bytes)?;
    if img.width() == 0 || img.height() == 0 {
        return Err(DermaError::decode(format!(
            "image has zero size ({}x{})",
            img.width(),
            img.height()
        )));
    }

    to_rgb(img)
}

fn to_rgb(img: DynamicImage) -> DermaResult<RgbImage> {
    match img {
        DynamicImage::ImageRgb8(rgb) => Ok(rgb),
        DynamicImage::ImageLuma8(_)
        | DynamicImage::ImageLumaA8(_)
        | DynamicImage::ImageRgba8(_)
        | DynamicImage::ImageLuma16(_)
        | DynamicImage::ImageLumaA16(_)
        | DynamicImage::ImageRgb16(_)
        | DynamicImage::ImageRgba16(_)
        | DynamicImage::ImageRgb32F(_)
        | DynamicImage::ImageRgba32F(_) => Ok(img.to_rgb8()),
        other => Err(DermaError::UnsupportedFormat {
            message: format!("cannot convert colour type {:?} to RGB", other.color()),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processors::types::ChannelOrder;
    use image::{ImageFormat, Luma, Rgb, Rgba, RgbaImage};
    use std::io::Cursor;

    fn encode(img: DynamicImage) -> Vec<u8> {
        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        bytes
    }

    fn preprocessor() -> ImagePreprocessor {
        ImagePreprocessor::new(
            (224, 224),
            ResizeFilter::Nearest,
            NormalizeImage::unit_range(ChannelOrder::HWC),
        )
    }

    #[test]
    fn test_output_shape_independent_of_source_size() {
        let pre = preprocessor();
        for (w, h) in [(1, 1), (640, 480), (100, 900), (224, 224)] {
            let bytes = encode(DynamicImage::ImageRgb8(RgbImage::from_pixel(
                w,
                h,
                Rgb([10, 20, 30]),
            )));
            let tensor = pre.preprocess(&bytes).unwrap();
            assert_eq!(tensor.shape(), &pre.output_shape());
            assert!(tensor.iter().all(|v| (0.0..=1.0).contains(v)));
        }
    }

    #[test]
    fn test_grayscale_and_alpha_are_converted() {
        let pre = preprocessor();

        let gray = encode(DynamicImage::ImageLuma8(image::GrayImage::from_pixel(
            50,
            40,
            Luma([255]),
        )));
        let tensor = pre.preprocess(&gray).unwrap();
        assert_eq!(tensor.shape(), &[1, 224, 224, 3]);
        assert!((tensor[[0, 10, 10, 1]] - 1.0).abs() < 1e-6);

        let rgba = encode(DynamicImage::ImageRgba8(RgbaImage::from_pixel(
            30,
            30,
            Rgba([0, 255, 0, 128]),
        )));
        let tensor = pre.preprocess(&rgba).unwrap();
        assert!((tensor[[0, 0, 0, 1]] - 1.0).abs() < 1e-6);
        assert_eq!(tensor[[0, 0, 0, 0]], 0.0);
    }

    #[test]
    fn test_invalid_bytes_are_decode_errors() {
        let pre = preprocessor();
        assert!(matches!(
            pre.preprocess(b"definitely not a png"),
            Err(DermaError::Decode { .. })
        ));
        assert!(matches!(pre.preprocess(&[]), Err(DermaError::Decode { .. })));

        let mut truncated = encode(DynamicImage::ImageRgb8(RgbImage::new(64, 64)));
        truncated.truncate(truncated.len() / 2);
        assert!(pre.preprocess(&truncated).unwrap_err().is_user_error());
    }

    #[test]
    fn test_chw_config() {
        let config = ClassifierConfig {
            channel_order: ChannelOrder::CHW,
            ..ClassifierConfig::default()
        };
        let pre = ImagePreprocessor::from_config(&config).unwrap();
        let bytes = encode(DynamicImage::ImageRgb8(RgbImage::new(300, 120)));
        assert_eq!(pre.preprocess(&bytes).unwrap().shape(), &[1, 3, 224, 224]);
    }
}
