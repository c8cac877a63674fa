//! Lesion Classification Predictor
//!
//! This module provides the high-level API for classifying a skin-lesion
//! image: preprocess, run the classifier, then attach the advisory record for
//! the predicted class.

use crate::core::config::{ClassifierConfig, ConfigValidator, OrtSessionConfig};
use crate::core::{DermaResult, InferenceEngine, OrtInfer, Tensor4D};
use crate::domain::{ClassificationResult, ProbabilityDistribution};
use crate::processors::{ChannelOrder, ImagePreprocessor, ResizeFilter};
use image::RgbImage;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

/// Lesion classification predictor
#[derive(Clone)]
pub struct LesionClassificationPredictor {
    preprocessor: ImagePreprocessor,
    engine: Arc<dyn InferenceEngine>,
}

impl std::fmt::Debug for LesionClassificationPredictor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LesionClassificationPredictor")
            .field("preprocessor", &self.preprocessor)
            .field("model", &self.engine.model_name())
            .finish()
    }
}

impl LesionClassificationPredictor {
    /// Create a new builder for the lesion classification predictor
    pub fn builder() -> LesionClassificationPredictorBuilder {
        LesionClassificationPredictorBuilder::new()
    }

    /// Creates a predictor backed by ONNX Runtime. The model is not loaded
    /// until the first prediction or an explicit [`Self::warm_up`].
    pub fn from_config(config: &ClassifierConfig) -> DermaResult<Self> {
        config.validate()?;
        let preprocessor = ImagePreprocessor::from_config(config)?;
        Ok(Self::with_engine(
            preprocessor,
            Arc::new(OrtInfer::from_config(config)),
        ))
    }

    /// Creates a predictor from an existing preprocessor and engine.
    pub fn with_engine(preprocessor: ImagePreprocessor, engine: Arc<dyn InferenceEngine>) -> Self {
        Self {
            preprocessor,
            engine,
        }
    }

    /// Name of the underlying model.
    pub fn model_name(&self) -> &str {
        self.engine.model_name()
    }

    /// Returns true once the model is loaded.
    pub fn is_ready(&self) -> bool {
        self.engine.is_ready()
    }

    /// Loads the model now instead of on the first request.
    pub fn warm_up(&self) -> DermaResult<()> {
        self.engine.warm_up()
    }

    /// Classifies an uploaded image.
    ///
    /// # Errors
    ///
    /// Propagates decode, unsupported-format, model-unavailable and inference
    /// errors unchanged.
    pub fn predict(&self, bytes: &[u8]) -> DermaResult<ClassificationResult> {
        let start = Instant::now();
        let input = self.preprocessor.preprocess(bytes)?;
        self.classify(&input, start)
    }

    /// Classifies an already decoded image.
    pub fn predict_image(&self, img: &RgbImage) -> DermaResult<ClassificationResult> {
        let start = Instant::now();
        let input = self.preprocessor.preprocess_rgb(img);
        self.classify(&input, start)
    }

    fn classify(&self, input: &Tensor4D, start: Instant) -> DermaResult<ClassificationResult> {
        let scores = self.engine.infer(input)?;
        let distribution = ProbabilityDistribution::from_scores(self.engine.model_name(), &scores)?;
        let result = ClassificationResult::from_distribution(distribution);

        info!(
            model = self.engine.model_name(),
            class_id = result.class.id(),
            label = result.label(),
            confidence = result.confidence,
            elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Lesion classified"
        );
        Ok(result)
    }
}

/// Builder for lesion classification predictor
#[derive(Debug, Clone)]
pub struct LesionClassificationPredictorBuilder {
    config: ClassifierConfig,
}

impl LesionClassificationPredictorBuilder {
    pub fn new() -> Self {
        Self {
            config: ClassifierConfig::default(),
        }
    }

    /// Starts from an existing configuration.
    pub fn with_config(mut self, config: ClassifierConfig) -> Self {
        self.config = config;
        self
    }

    pub fn model_name(mut self, name: impl Into<String>) -> Self {
        self.config.model_name = name.into();
        self
    }

    /// Model input size as (height, width).
    pub fn input_shape(mut self, shape: (u32, u32)) -> Self {
        self.config.input_shape = shape;
        self
    }

    pub fn channel_order(mut self, order: ChannelOrder) -> Self {
        self.config.channel_order = order;
        self
    }

    pub fn resize_filter(mut self, filter: ResizeFilter) -> Self {
        self.config.resize_filter = filter;
        self
    }

    /// Sets the intensity scale and per-channel mean/std.
    pub fn normalization(mut self, scale: f32, mean: [f32; 3], std: [f32; 3]) -> Self {
        self.config.scale = scale;
        self.config.mean = mean;
        self.config.std = std;
        self
    }

    pub fn session_pool_size(mut self, size: usize) -> Self {
        self.config.session_pool_size = size;
        self
    }

    pub fn ort_session(mut self, config: OrtSessionConfig) -> Self {
        self.config.ort_session = Some(config);
        self
    }

    /// The configuration built so far.
    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    /// Builds an ONNX Runtime backed predictor for the model at `model_path`.
    pub fn build<P: AsRef<Path>>(
        self,
        model_path: P,
    ) -> DermaResult<LesionClassificationPredictor> {
        let mut config = self.config;
        config.model_path = model_path.as_ref().to_path_buf();
        LesionClassificationPredictor::from_config(&config)
    }

    /// Builds a predictor around a caller-supplied engine.
    pub fn build_with_engine(
        self,
        engine: Arc<dyn InferenceEngine>,
    ) -> DermaResult<LesionClassificationPredictor> {
        self.config.validate()?;
        let preprocessor = ImagePreprocessor::from_config(&self.config)?;
        Ok(LesionClassificationPredictor::with_engine(
            preprocessor,
            engine,
        ))
    }
}

impl Default for LesionClassificationPredictorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::DermaError;
    use crate::domain::DiagnosticClass;
    use image::{ImageFormat, Rgb};
    use std::io::Cursor;
    use std::sync::Mutex;

    /// Returns fixed scores and records the shapes it was called with.
    struct StubEngine {
        scores: Vec<f32>,
        seen: Mutex<Vec<Vec<usize>>>,
    }

    impl StubEngine {
        fn new(scores: Vec<f32>) -> Arc<Self> {
            Arc::new(Self {
                scores,
                seen: Mutex::new(Vec::new()),
            })
        }
    }

    impl InferenceEngine for StubEngine {
        fn model_name(&self) -> &str {
            "stub"
        }

        fn infer(&self, input: &Tensor4D) -> DermaResult<Vec<f32>> {
            self.seen.lock().unwrap().push(input.shape().to_vec());
            Ok(self.scores.clone())
        }
    }

    struct UnavailableEngine;

    impl InferenceEngine for UnavailableEngine {
        fn model_name(&self) -> &str {
            "missing"
        }

        fn infer(&self, _input: &Tensor4D) -> DermaResult<Vec<f32>> {
            Err(DermaError::model_unavailable(
                "missing.onnx",
                "file not found",
                None,
            ))
        }
    }

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = RgbImage::from_fn(width, height, |x, y| {
            Rgb([(x % 256) as u8, (y % 256) as u8, 128])
        });
        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        bytes
    }

    const MELANOMA_SCORES: [f32; 7] = [0.01, 0.02, 0.03, 0.04, 0.8567, 0.02, 0.0233];

    #[test]
    fn test_melanoma_end_to_end() {
        let engine = StubEngine::new(MELANOMA_SCORES.to_vec());
        let predictor = LesionClassificationPredictor::builder()
            .build_with_engine(engine.clone())
            .unwrap();

        let result = predictor.predict(&png_bytes(64, 48)).unwrap();
        assert_eq!(result.class, DiagnosticClass::Melanoma);
        assert_eq!(result.class.id(), 4);
        assert_eq!(result.label(), "Melanoma");
        assert_eq!(result.advisory.severity, "Very High (dangerous)");
        assert!(result.advisory.consultation.contains("Urgent"));
        assert_eq!(result.confidence_percent(), 85.67);
        assert_eq!(engine.seen.lock().unwrap()[0], vec![1, 224, 224, 3]);
    }

    #[test]
    fn test_any_image_size_matches_engine_shape() {
        let engine = StubEngine::new(MELANOMA_SCORES.to_vec());
        let predictor = LesionClassificationPredictor::builder()
            .channel_order(ChannelOrder::CHW)
            .build_with_engine(engine.clone())
            .unwrap();

        for (w, h) in [(1, 1), (300, 17), (17, 300), (224, 224), (640, 480)] {
            predictor.predict(&png_bytes(w, h)).unwrap();
        }
        let seen = engine.seen.lock().unwrap();
        assert_eq!(seen.len(), 5);
        assert!(seen.iter().all(|shape| shape == &[1, 3, 224, 224]));
    }

    #[test]
    fn test_logit_output_still_yields_distribution() {
        let engine = StubEngine::new(vec![0.5, 4.0, -1.0, 0.0, 1.0, 2.0, -3.0]);
        let predictor = LesionClassificationPredictor::builder()
            .build_with_engine(engine)
            .unwrap();

        let result = predictor.predict(&png_bytes(10, 10)).unwrap();
        assert_eq!(result.class, DiagnosticClass::BasalCellCarcinoma);
        assert!(result.confidence > 0.0 && result.confidence < 1.0);
        let sum: f32 = result.distribution.probabilities().iter().sum();
        assert!((sum - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_bad_image_never_reaches_engine() {
        let engine = StubEngine::new(MELANOMA_SCORES.to_vec());
        let predictor = LesionClassificationPredictor::builder()
            .build_with_engine(engine.clone())
            .unwrap();

        let err = predictor.predict(b"definitely not a png").unwrap_err();
        assert!(matches!(err, DermaError::Decode { .. }));
        assert!(engine.seen.lock().unwrap().is_empty());
    }

    #[test]
    fn test_engine_errors_propagate_unchanged() {
        let predictor = LesionClassificationPredictor::builder()
            .build_with_engine(Arc::new(UnavailableEngine))
            .unwrap();

        let err = predictor.predict(&png_bytes(8, 8)).unwrap_err();
        assert!(matches!(err, DermaError::ModelUnavailable { .. }));
    }

    #[test]
    fn test_onnx_predictor_loads_lazily() {
        let predictor = LesionClassificationPredictor::builder()
            .build("does/not/exist.onnx")
            .unwrap();
        assert!(!predictor.is_ready());

        let err = predictor.predict(&png_bytes(8, 8)).unwrap_err();
        assert!(matches!(err, DermaError::ModelUnavailable { .. }));
        assert!(matches!(
            predictor.warm_up(),
            Err(DermaError::ModelUnavailable { .. })
        ));
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let result = LesionClassificationPredictor::builder()
            .normalization(1.0 / 255.0, [0.0; 3], [0.0, 1.0, 1.0])
            .build_with_engine(StubEngine::new(MELANOMA_SCORES.to_vec()));
        assert!(matches!(result, Err(DermaError::ConfigError { .. })));
    }
}
