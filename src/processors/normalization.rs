//! Pixel normalization for classifier input.
//!
//! Converts an RGB image into a single-sample `f32` batch, scaling intensities
//! and laying the channels out in the order the classifier expects.

use crate::core::Tensor4D;
use crate::core::config::ConfigError;
use crate::processors::types::ChannelOrder;
use image::RgbImage;
use ndarray::Array4;

/// Normalizes images for classification.
///
/// Each channel value `v` becomes `v * alpha[c] + beta[c]`, where
/// `alpha = scale / std` and `beta = -mean / std`. With the default scale of
/// `1/255`, mean 0 and std 1 this is the plain `[0, 1]` rescaling the lesion
/// classifier was trained on.
#[derive(Debug, Clone)]
pub struct NormalizeImage {
    /// Scaling factors for each channel (alpha = scale / std)
    pub alpha: [f32; 3],
    /// Offset values for each channel (beta = -mean / std)
    pub beta: [f32; 3],
    /// Channel ordering (CHW or HWC)
    pub order: ChannelOrder,
}

impl NormalizeImage {
    /// Creates a new normalizer.
    ///
    /// # Errors
    ///
    /// Returns an error if the scale or any standard deviation is not a
    /// positive finite number, or if any mean is not finite.
    pub fn new(
        scale: f32,
        mean: [f32; 3],
        std: [f32; 3],
        order: ChannelOrder,
    ) -> Result<Self, ConfigError> {
        if !(scale.is_finite() && scale > 0.0) {
            return Err(ConfigError::InvalidValue {
                field: "scale".to_string(),
                reason: format!("must be a positive finite number, got {scale}"),
            });
        }

        for (i, &s) in std.iter().enumerate() {
            if !(s.is_finite() && s > 0.0) {
                return Err(ConfigError::InvalidValue {
                    field: "std".to_string(),
                    reason: format!("value at index {i} must be greater than 0, got {s}"),
                });
            }
        }

        if let Some(m) = mean.iter().find(|m| !m.is_finite()) {
            return Err(ConfigError::InvalidValue {
                field: "mean".to_string(),
                reason: format!("values must be finite, got {m}"),
            });
        }

        let alpha = [scale / std[0], scale / std[1], scale / std[2]];
        let beta = [-mean[0] / std[0], -mean[1] / std[1], -mean[2] / std[2]];

        Ok(Self { alpha, beta, order })
    }

    /// Plain `1/255` rescaling into `[0, 1]` with the given layout.
    pub fn unit_range(order: ChannelOrder) -> Self {
        Self {
            alpha: [1.0 / 255.0; 3],
            beta: [0.0; 3],
            order,
        }
    }

    /// Normalizes one image into a `[1, ...]` batch tensor.
    pub fn apply(&self, img: &RgbImage) -> Tensor4D {
        let (width, height) = img.dimensions();
        let shape = self.order.batch_shape(height, width);
        let mut tensor = Array4::<f32>::zeros(shape);

        for (x, y, pixel) in img.enumerate_pixels() {
            let (x, y) = (x as usize, y as usize);
            for c in 0..3 {
                let value = pixel[c] as f32 * self.alpha[c] + self.beta[c];
                match self.order {
                    ChannelOrder::HWC => tensor[[0, y, x, c]] = value,
                    ChannelOrder::CHW => tensor[[0, c, y, x]] = value,
                }
            }
        }

        tensor
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn test_unit_range_hwc() {
        let mut img = RgbImage::new(2, 1);
        img.put_pixel(0, 0, Rgb([255, 0, 51]));
        img.put_pixel(1, 0, Rgb([0, 255, 0]));

        let tensor = NormalizeImage::unit_range(ChannelOrder::HWC).apply(&img);
        assert_eq!(tensor.shape(), &[1, 1, 2, 3]);
        assert!((tensor[[0, 0, 0, 0]] - 1.0).abs() < 1e-6);
        assert!((tensor[[0, 0, 0, 2]] - 0.2).abs() < 1e-6);
        assert!((tensor[[0, 0, 1, 1]] - 1.0).abs() < 1e-6);
        assert!(tensor.iter().all(|v| (0.0..=1.0).contains(v)));
    }

    #[test]
    fn test_chw_layout() {
        let mut img = RgbImage::new(3, 2);
        img.put_pixel(2, 1, Rgb([0, 0, 255]));

        let tensor = NormalizeImage::unit_range(ChannelOrder::CHW).apply(&img);
        assert_eq!(tensor.shape(), &[1, 3, 2, 3]);
        assert!((tensor[[0, 2, 1, 2]] - 1.0).abs() < 1e-6);
        assert_eq!(tensor[[0, 0, 1, 2]], 0.0);
    }

    #[test]
    fn test_mean_std() {
        let norm =
            NormalizeImage::new(1.0 / 255.0, [0.5; 3], [0.5; 3], ChannelOrder::HWC).unwrap();
        let img = RgbImage::from_pixel(1, 1, Rgb([255, 0, 255]));
        let tensor = norm.apply(&img);
        assert!((tensor[[0, 0, 0, 0]] - 1.0).abs() < 1e-6);
        assert!((tensor[[0, 0, 0, 1]] + 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_rejects_bad_parameters() {
        assert!(NormalizeImage::new(0.0, [0.0; 3], [1.0; 3], ChannelOrder::HWC).is_err());
        assert!(NormalizeImage::new(1.0, [0.0; 3], [1.0, 0.0, 1.0], ChannelOrder::HWC).is_err());
        assert!(
            NormalizeImage::new(1.0, [f32::NAN, 0.0, 0.0], [1.0; 3], ChannelOrder::HWC).is_err()
        );
    }
}
