// SPDX-License-Identifier: MIT
// Error types for the upscaling core. Model-load failures are a distinct
// class so callers can fall back to another strategy on them; everything
// a backend raises travels through unmodified.

use std::io;
use std::path::PathBuf;

use fast_image_resize as fir;

pub type UpscaleResult<T> = Result<T, UpscaleError>;

/// Failure to resolve a model artifact from a path.
///
/// Never retried internally. Callers typically fall back to a filter
/// strategy when they see one of these.
#[derive(Debug)]
pub enum ModelLoadError {
    /// No artifact at the path.
    Missing(PathBuf),
    /// The artifact exists but could not be read.
    Unreadable { path: PathBuf, source: io::Error },
    /// The artifact was read but is structurally unusable.
    Invalid { path: PathBuf, reason: String },
}

impl ModelLoadError {
    /// The path the failed resolution was attempted against.
    pub fn path(&self) -> &PathBuf {
        match self {
            ModelLoadError::Missing(path) => path,
            ModelLoadError::Unreadable { path, .. } => path,
            ModelLoadError::Invalid { path, .. } => path,
        }
    }
}

impl std::fmt::Display for ModelLoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModelLoadError::Missing(path) => {
                write!(f, "model not found: {}", path.display())
            }
            ModelLoadError::Unreadable { path, source } => {
                write!(f, "model unreadable: {}: {}", path.display(), source)
            }
            ModelLoadError::Invalid { path, reason } => {
                write!(f, "model invalid: {}: {}", path.display(), reason)
            }
        }
    }
}

impl std::error::Error for ModelLoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ModelLoadError::Unreadable { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Any failure surfaced by the upscaling core.
#[derive(Debug)]
pub enum UpscaleError {
    ModelLoad(ModelLoadError),
    Resize(fir::ResizeError),
    /// A strategy was registered without exposing a single descriptor.
    NoDescriptors(String),
    /// Opaque failure raised by a model backend, passed through as-is.
    Backend(Box<dyn std::error::Error + Send + Sync>),
}

impl From<ModelLoadError> for UpscaleError {
    fn from(e: ModelLoadError) -> Self {
        Self::ModelLoad(e)
    }
}
impl From<fir::ResizeError> for UpscaleError {
    fn from(e: fir::ResizeError) -> Self {
        Self::Resize(e)
    }
}

impl std::fmt::Display for UpscaleError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UpscaleError::ModelLoad(e) => write!(f, "{}", e),
            UpscaleError::Resize(e) => write!(f, "resize failed: {}", e),
            UpscaleError::NoDescriptors(name) => {
                write!(f, "strategy {:?} exposes no descriptors", name)
            }
            UpscaleError::Backend(e) => write!(f, "backend failed: {}", e),
        }
    }
}

impl std::error::Error for UpscaleError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            UpscaleError::ModelLoad(e) => Some(e),
            UpscaleError::Resize(e) => Some(e),
            UpscaleError::Backend(e) => Some(&**e),
            UpscaleError::NoDescriptors(_) => None,
        }
    }
}
