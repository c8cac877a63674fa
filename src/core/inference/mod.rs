//! Inference engine integration.
//!
//! [`OrtInfer`] owns the classifier artifact for the lifetime of the process.
//! The artifact is loaded on first use behind a one-time initialization
//! barrier: the first caller loads it, concurrent callers wait for that load
//! and every later caller reuses it. A failed load leaves the cell empty so a
//! later request can try again once the artifact is in place.
//!
//! ONNX Runtime sessions need exclusive access while running, so the engine
//! keeps a small pool of sessions. A prediction locks one session for its
//! duration; the guard is dropped on every exit path, leaving the shared
//! handle intact for the next request.

mod ort_infer_config;

use crate::core::config::{ClassifierConfig, OrtSessionConfig};
use crate::core::{DermaError, DermaResult, Tensor4D};
use once_cell::sync::OnceCell;
use ort::session::Session;
use ort::value::TensorRef;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Instant;
use tracing::{debug, info};

/// A model that maps a preprocessed image batch to raw class scores.
///
/// Implementations must be safe to share between concurrent requests.
pub trait InferenceEngine: Send + Sync {
    /// Name used in logs and error messages.
    fn model_name(&self) -> &str;

    /// Runs the model on a single-sample batch and returns the raw output row.
    fn infer(&self, input: &Tensor4D) -> DermaResult<Vec<f32>>;

    /// Returns true when the model can serve a request without loading first.
    fn is_ready(&self) -> bool {
        true
    }

    /// Performs any one-time loading ahead of the first request.
    fn warm_up(&self) -> DermaResult<()> {
        Ok(())
    }
}

/// A set of interchangeable values created together on first use.
///
/// [`LazyPool::acquire`] runs the loader at most once per successful load:
/// concurrent first callers block until it finishes and then share the
/// result. A failed load leaves the pool empty. Values are handed out
/// round-robin, each to one caller at a time.
pub(crate) struct LazyPool<T> {
    slots: OnceCell<Vec<Mutex<T>>>,
    next: AtomicUsize,
}

impl<T> LazyPool<T> {
    pub(crate) fn new() -> Self {
        Self {
            slots: OnceCell::new(),
            next: AtomicUsize::new(0),
        }
    }

    pub(crate) fn is_loaded(&self) -> bool {
        self.slots.get().is_some()
    }

    /// Loads the pool if needed and returns its slots.
    pub(crate) fn get_or_load<F>(&self, load: F) -> DermaResult<&[Mutex<T>]>
    where
        F: FnOnce() -> DermaResult<Vec<T>>,
    {
        self.slots
            .get_or_try_init(|| {
                let values = load()?;
                if values.is_empty() {
                    return Err(DermaError::ConfigError {
                        message: "inference pool needs at least one session".to_string(),
                    });
                }
                Ok(values.into_iter().map(Mutex::new).collect())
            })
            .map(Vec::as_slice)
    }

    /// Locks the next value in rotation, loading the pool first if needed.
    pub(crate) fn acquire<F>(&self, load: F) -> DermaResult<(usize, MutexGuard<'_, T>)>
    where
        F: FnOnce() -> DermaResult<Vec<T>>,
    {
        let slots = self.get_or_load(load)?;
        let slot = self.next.fetch_add(1, Ordering::Relaxed) % slots.len();
        // A panic inside a previous run does not invalidate the value itself.
        let guard = slots[slot].lock().unwrap_or_else(PoisonError::into_inner);
        Ok((slot, guard))
    }
}

/// ONNX Runtime backed classifier with lazy, one-time loading.
pub struct OrtInfer {
    model_path: PathBuf,
    model_name: String,
    input_shape: [usize; 4],
    pool_size: usize,
    ort_config: Option<OrtSessionConfig>,
    pool: LazyPool<Session>,
}

impl std::fmt::Debug for OrtInfer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrtInfer")
            .field("model_path", &self.model_path)
            .field("model_name", &self.model_name)
            .field("input_shape", &self.input_shape)
            .field("pool_size", &self.pool_size)
            .field("loaded", &self.is_loaded())
            .finish()
    }
}

impl OrtInfer {
    /// Creates an engine for the configured artifact without loading it.
    pub fn from_config(config: &ClassifierConfig) -> Self {
        let (height, width) = config.input_shape;
        Self {
            model_path: config.model_path.clone(),
            model_name: config.model_name.clone(),
            input_shape: config.channel_order.batch_shape(height, width),
            pool_size: config.session_pool_size.max(1),
            ort_config: config.ort_session.clone(),
            pool: LazyPool::new(),
        }
    }

    /// Path of the artifact this engine serves.
    pub fn model_path(&self) -> &Path {
        &self.model_path
    }

    /// Tensor shape the engine accepts.
    pub fn input_shape(&self) -> [usize; 4] {
        self.input_shape
    }

    /// Returns true once the artifact has been loaded.
    pub fn is_loaded(&self) -> bool {
        self.pool.is_loaded()
    }

    /// Loads the artifact if no caller has done so yet.
    ///
    /// # Errors
    ///
    /// Returns [`DermaError::ModelUnavailable`] when the artifact is missing or
    /// ONNX Runtime refuses it.
    pub fn ensure_loaded(&self) -> DermaResult<()> {
        self.pool.get_or_load(|| self.load_sessions()).map(|_| ())
    }

    fn load_sessions(&self) -> DermaResult<Vec<Session>> {
        let start = Instant::now();
        let mut sessions = Vec::with_capacity(self.pool_size);
        for _ in 0..self.pool_size {
            let session = load_session(&self.model_path, self.ort_config.as_ref())?;
            if session.inputs.is_empty() {
                return Err(DermaError::model_unavailable(
                    self.model_path.display().to_string(),
                    "model declares no inputs",
                    None,
                ));
            }
            sessions.push(session);
        }

        info!(
            model = %self.model_name,
            path = %self.model_path.display(),
            sessions = sessions.len(),
            load_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Classifier loaded"
        );
        Ok(sessions)
    }

    fn inference_error(
        &self,
        context: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> DermaError {
        DermaError::Inference {
            model_name: self.model_name.clone(),
            context: context.into(),
            source: Some(Box::new(source)),
        }
    }
}

impl InferenceEngine for OrtInfer {
    fn model_name(&self) -> &str {
        &self.model_name
    }

    fn is_ready(&self) -> bool {
        self.is_loaded()
    }

    fn warm_up(&self) -> DermaResult<()> {
        self.ensure_loaded()
    }

    fn infer(&self, input: &Tensor4D) -> DermaResult<Vec<f32>> {
        if input.shape() != self.input_shape {
            return Err(DermaError::inference(
                &self.model_name,
                format!(
                    "expected input shape {:?}, got {:?}",
                    self.input_shape,
                    input.shape()
                ),
            ));
        }

        let (slot, mut session) = self.pool.acquire(|| self.load_sessions())?;
        // Checked non-empty at load time.
        let input_name = session.inputs[0].name.clone();

        let tensor = TensorRef::from_array_view(input.view())
            .map_err(|e| self.inference_error("failed to wrap input tensor", e))?;
        let outputs = session
            .run(ort::inputs![input_name.as_str() => tensor])
            .map_err(|e| self.inference_error("forward pass failed", e))?;
        let (shape, data) = outputs[0]
            .try_extract_tensor::<f32>()
            .map_err(|e| self.inference_error("output is not an f32 tensor", e))?;

        debug!(model = %self.model_name, slot, output_shape = ?shape, "Inference complete");
        single_row(&shape[..], data).ok_or_else(|| {
            DermaError::inference(
                &self.model_name,
                format!("expected one row of scores, got output shape {shape:?}"),
            )
        })
    }
}

/// Copies out the scores of a `[classes]` or `[1, classes]` output.
fn single_row(shape: &[i64], data: &[f32]) -> Option<Vec<f32>> {
    match shape {
        [len] | [1, len] if usize::try_from(*len).ok() == Some(data.len()) => Some(data.to_vec()),
        _ => None,
    }
}

/// Creates an ONNX Runtime session for the model at `path`.
pub fn load_session(path: &Path, config: Option<&OrtSessionConfig>) -> DermaResult<Session> {
    let model_path = path.display().to_string();
    if !path.is_file() {
        return Err(DermaError::model_unavailable(
            model_path,
            "file not found",
            None,
        ));
    }

    let unavailable = |reason: &str, e: ort::Error| {
        DermaError::model_unavailable(model_path.clone(), reason, Some(Box::new(e)))
    };

    let mut builder =
        Session::builder().map_err(|e| unavailable("failed to create session builder", e))?;
    if let Some(cfg) = config {
        builder = OrtInfer::apply_ort_config(builder, cfg)
            .map_err(|e| unavailable("invalid session configuration", e))?;
    }
    builder
        .commit_from_file(path)
        .map_err(|e| unavailable("failed to load model", e))
}
