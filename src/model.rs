// SPDX-License-Identifier: MIT
//! Model-backed enlargement.
//!
//! The numerical side of a learned technique lives outside this crate,
//! behind [`ModelBackend`] (one inference pass) and [`ModelLoader`]
//! (artifact to backend). [`ModelBackedUpscaler`] wires those into the
//! strategy contract: it checks that artifacts exist and are readable,
//! caches one handle per path, and runs the backend's fixed-multiple
//! pass, leaving the exact-size guarantee to the driver loop.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use image::DynamicImage;
use tracing::debug;

use crate::error::{ModelLoadError, UpscaleResult};
use crate::locator::ModelLocator;
use crate::registry::DescriptorSpec;
use crate::status::{NullStatus, StatusSink};
use crate::strategy::{Upscaler, UpscalerConfig};

/// One loaded enlargement model.
///
/// A single pass enlarges by the backend's native multiple regardless of
/// what the caller ultimately asked for.
pub trait ModelBackend: Send + Sync + std::fmt::Debug {
    fn enlarge(&self, image: &DynamicImage) -> UpscaleResult<DynamicImage>;

    /// The fixed spatial multiple one pass produces, e.g. 2 or 4.
    fn native_scale(&self) -> u32;
}

/// Shared handle to a loaded backend.
pub type ModelHandle = Arc<dyn ModelBackend>;

/// Turns a model artifact on disk into a usable backend.
///
/// Only structural validation belongs here; existence and readability are
/// checked by the strategy before the loader runs.
pub trait ModelLoader: Send + Sync {
    fn load(&self, path: &Path) -> Result<ModelHandle, ModelLoadError>;
}

/// Strategy whose passes run a loaded model.
///
/// Holds no per-call state: handles are cached per artifact path behind a
/// mutex, so one instance serves any number of sequential calls and is
/// freely shareable. Descriptor resolution goes through the same cache
/// as the enlargement passes, so an artifact is loaded at most once per
/// instance no matter who asks first.
pub struct ModelBackedUpscaler {
    name: String,
    config: UpscalerConfig,
    descriptors: Vec<DescriptorSpec>,
    locator: Box<dyn ModelLocator>,
    loader: Box<dyn ModelLoader>,
    status: Box<dyn StatusSink>,
    handles: Mutex<HashMap<PathBuf, ModelHandle>>,
}

impl ModelBackedUpscaler {
    /// A strategy with a single descriptor named after itself.
    pub fn new(
        name: impl Into<String>,
        config: UpscalerConfig,
        locator: impl ModelLocator + 'static,
        loader: impl ModelLoader + 'static,
    ) -> Self {
        let name = name.into();
        let descriptors = vec![DescriptorSpec::new(&name)];
        Self {
            name,
            config,
            descriptors,
            locator: Box::new(locator),
            loader: Box::new(loader),
            status: Box::new(NullStatus),
            handles: Mutex::new(HashMap::new()),
        }
    }

    /// Replace the default descriptor set. Callers keep at least one
    /// entry or registration will refuse the strategy.
    pub fn with_descriptors(mut self, descriptors: Vec<DescriptorSpec>) -> Self {
        self.descriptors = descriptors;
        self
    }

    /// Create the configured model storage directory, for strategies
    /// that own their artifact store.
    pub fn ensure_storage(self) -> io::Result<Self> {
        self.config.ensure_model_dir()?;
        Ok(self)
    }

    pub fn with_status(mut self, status: impl StatusSink + 'static) -> Self {
        self.status = Box::new(status);
        self
    }

    /// Map a caller-supplied selector to an artifact path.
    ///
    /// A selector naming one of our descriptors resolves to its data
    /// path; otherwise the selector is taken as a path itself. Without a
    /// selector the first located candidate wins.
    fn resolve_path(&self, selector: Option<&str>) -> Result<PathBuf, ModelLoadError> {
        if let Some(sel) = selector {
            if let Some(spec) = self.descriptors.iter().find(|d| d.name == sel) {
                if let Some(path) = &spec.data_path {
                    return Ok(path.clone());
                }
            }
            return Ok(PathBuf::from(sel));
        }
        self.find_models(None).into_iter().next().ok_or_else(|| {
            ModelLoadError::Missing(self.config.model_dir.clone().unwrap_or_default())
        })
    }
}

impl Upscaler for ModelBackedUpscaler {
    fn name(&self) -> &str {
        &self.name
    }

    fn config(&self) -> &UpscalerConfig {
        &self.config
    }

    fn descriptors(&self) -> Vec<DescriptorSpec> {
        self.descriptors.clone()
    }

    fn enlarge_once(
        &self,
        image: &DynamicImage,
        _factor: f64,
        model: Option<&str>,
    ) -> UpscaleResult<DynamicImage> {
        let path = self.resolve_path(model)?;
        let handle = self.model_handle(&path)?;
        handle.enlarge(image)
    }

    fn load_model(&self, path: &Path) -> Result<ModelHandle, ModelLoadError> {
        let meta = fs::metadata(path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => ModelLoadError::Missing(path.to_path_buf()),
            _ => ModelLoadError::Unreadable {
                path: path.to_path_buf(),
                source: e,
            },
        })?;
        if !meta.is_file() {
            return Err(ModelLoadError::Missing(path.to_path_buf()));
        }
        self.loader.load(path)
    }

    fn model_handle(&self, path: &Path) -> Result<ModelHandle, ModelLoadError> {
        if let Some(handle) = self.handles.lock().unwrap().get(path) {
            return Ok(Arc::clone(handle));
        }
        self.status
            .update_status(&format!("loading model {}", path.display()));
        let handle = self.load_model(path)?;
        debug!(scaler = %self.name, path = %path.display(), "model loaded");
        self.handles
            .lock()
            .unwrap()
            .insert(path.to_path_buf(), Arc::clone(&handle));
        Ok(handle)
    }

    fn locator(&self) -> Option<&dyn ModelLocator> {
        Some(&*self.locator)
    }

    fn status(&self) -> &dyn StatusSink {
        &*self.status
    }
}
