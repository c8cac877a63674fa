//! Persistence of uploaded lesion images.

use std::path::{Path, PathBuf};
use tracing::debug;

/// Writes uploads into a directory, keyed by their sanitized file name.
///
/// A later upload with the same name replaces the earlier file.
#[derive(Debug, Clone)]
pub struct UploadStore {
    root: PathBuf,
}

impl UploadStore {
    /// Creates the store, creating `root` if it does not exist.
    pub async fn open(root: impl Into<PathBuf>) -> std::io::Result<Self> {
        let root = root.into();
        tokio::fs::create_dir_all(&root).await?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Saves `bytes` as `file_name` and returns the path written. Callers pass
    /// names through [`sanitize_file_name`] first.
    pub async fn save(&self, file_name: &str, bytes: &[u8]) -> std::io::Result<PathBuf> {
        let path = self.root.join(file_name);
        tokio::fs::write(&path, bytes).await?;
        debug!(path = %path.display(), bytes = bytes.len(), "Upload stored");
        Ok(path)
    }
}

/// Reduces a client-supplied file name to a safe single path component.
///
/// Directory parts are dropped and characters outside `[A-Za-z0-9._-]` are
/// replaced with `_`. Names that end up empty or dot-only get a generated
/// name.
pub fn sanitize_file_name(original: Option<&str>) -> String {
    let base = original
        .and_then(|name| name.rsplit(['/', '\\']).next())
        .unwrap_or_default();

    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.');

    if cleaned.is_empty() {
        format!("upload-{}", uuid::Uuid::new_v4())
    } else {
        cleaned.to_string()
    }
}
