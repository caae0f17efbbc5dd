// SPDX-License-Identifier: MIT
//! The strategy contract and the exact-size driver loop.
//!
//! An [`Upscaler`] wraps one enlargement technique behind a single-pass
//! primitive, [`Upscaler::enlarge_once`]. Techniques are imperfect: a
//! model typically enlarges by a fixed multiple (2x, 4x) no matter what
//! factor was requested, and an identity technique does nothing at all.
//! The provided [`Upscaler::upscale`] driver turns any such primitive
//! into an operation with a guaranteed exact output size by iterating a
//! bounded number of passes and finishing with a corrective resize.
//!
//! The requested factor is threaded through every call as a parameter,
//! so strategy instances hold no per-call state and can be shared freely
//! behind an `Arc`.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use image::DynamicImage;
use tracing::debug;

use crate::error::{ModelLoadError, UpscaleResult};
use crate::locator::{ModelLocator, ModelQuery};
use crate::model::ModelHandle;
use crate::registry::DescriptorSpec;
use crate::resample;
use crate::status::{NullStatus, StatusSink};

/// Upper bound on enlargement passes per `upscale` call.
///
/// A progress bound, not a retry mechanism: a technique that creeps
/// toward the target without ever reaching it is cut off here and handed
/// to the corrective resize.
pub const MAX_ENLARGE_PASSES: usize = 3;

/// Compute device hint passed through to backends. The core never
/// interprets it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Device {
    #[default]
    Cpu,
    Cuda(u32),
}

impl Device {
    /// Parse a device string, falling back to CPU on anything unknown.
    pub fn from_str_lossy(s: &str) -> Self {
        let s = s.trim().to_ascii_lowercase();
        if s == "cuda" || s == "gpu" {
            return Device::Cuda(0);
        }
        if let Some(ordinal) = s.strip_prefix("cuda:") {
            if let Ok(n) = ordinal.parse() {
                return Device::Cuda(n);
            }
        }
        Device::Cpu
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Device::Cpu => write!(f, "cpu"),
            Device::Cuda(n) => write!(f, "cuda:{n}"),
        }
    }
}

/// Per-instance strategy configuration, fixed at construction.
///
/// Tile size and overlap are hints for backends that bound peak memory by
/// processing large images in overlapping tiles; the driver loop itself
/// holds no tile state. The padding fields are placeholders some model
/// backends consume. Defaults mirror the usual ESRGAN-family settings.
#[derive(Clone, Debug)]
pub struct UpscalerConfig {
    /// Tile edge length in pixels; 0 disables tiling.
    pub tile_size: u32,
    /// Overlap between adjacent tiles, in pixels per side.
    pub tile_overlap: u32,
    pub device: Device,
    /// Run inference in half precision where the backend supports it.
    pub half_precision: bool,
    /// Pixels of padding applied before inference.
    pub pre_pad: u32,
    /// Height padding hint consumed by some backends.
    pub mod_pad_h: Option<u32>,
    /// Scale padding hint consumed by some backends.
    pub mod_scale: Option<u32>,
    /// Directory where this strategy stores its model artifacts.
    pub model_dir: Option<PathBuf>,
    /// Remote source models may be fetched from, for locators that fetch.
    pub model_url: Option<String>,
    /// User-supplied search directory, scanned after `model_dir`.
    pub user_dir: Option<PathBuf>,
}

impl Default for UpscalerConfig {
    fn default() -> Self {
        Self {
            tile_size: 192,
            tile_overlap: 8,
            device: Device::Cpu,
            half_precision: true,
            pre_pad: 0,
            mod_pad_h: None,
            mod_scale: None,
            model_dir: None,
            model_url: None,
            user_dir: None,
        }
    }
}

impl UpscalerConfig {
    /// Create the model storage directory if one is configured.
    pub fn ensure_model_dir(&self) -> io::Result<()> {
        if let Some(dir) = &self.model_dir {
            fs::create_dir_all(dir)?;
        }
        Ok(())
    }
}

/// A pluggable enlargement technique.
///
/// Implementations provide the single-pass primitive and metadata; the
/// trait provides the exact-size driver and locator delegation on top.
pub trait Upscaler: Send + Sync {
    /// Human-readable technique name.
    fn name(&self) -> &str;

    fn config(&self) -> &UpscalerConfig;

    /// Descriptors advertising this strategy to a selection layer.
    /// Every strategy exposes at least one.
    fn descriptors(&self) -> Vec<DescriptorSpec>;

    /// Perform exactly one enlargement pass.
    ///
    /// There is no contract on the resulting size: model-backed
    /// implementations may produce a fixed multiple regardless of
    /// `factor`, and pure filters should resize straight to the rounded
    /// target so the driver exits after one pass. `model` is an opaque
    /// selector passed through from the caller.
    fn enlarge_once(
        &self,
        image: &DynamicImage,
        factor: f64,
        model: Option<&str>,
    ) -> UpscaleResult<DynamicImage>;

    /// Resolve a model artifact from a path.
    ///
    /// Filter strategies have no artifacts and keep the default, which
    /// reports every path as missing. Never called by the driver loop;
    /// reached lazily through [`Upscaler::model_handle`] when a handle
    /// is first needed.
    fn load_model(&self, path: &Path) -> Result<ModelHandle, ModelLoadError> {
        Err(ModelLoadError::Missing(path.to_path_buf()))
    }

    /// The handle every consumer of `path` shares.
    ///
    /// Strategies that cache loaded handles override this so descriptor
    /// resolution and their own enlargement passes hit one cache. The
    /// default loads fresh on every call.
    fn model_handle(&self, path: &Path) -> Result<ModelHandle, ModelLoadError> {
        self.load_model(path)
    }

    /// The locator this strategy discovers artifacts with, if any.
    fn locator(&self) -> Option<&dyn ModelLocator> {
        None
    }

    /// Progress sink for long operations. Defaults to a no-op.
    fn status(&self) -> &dyn StatusSink {
        &NullStatus
    }

    /// Candidate model files from the configured storage directory,
    /// remote source, and user search path.
    ///
    /// Pure delegation: no caching, no validation, and an unreachable
    /// storage path with no remote source yields an empty list.
    fn find_models(&self, ext_filter: Option<&[&str]>) -> Vec<PathBuf> {
        let Some(locator) = self.locator() else {
            return Vec::new();
        };
        let cfg = self.config();
        locator.locate(&ModelQuery {
            storage_dir: cfg.model_dir.as_deref(),
            remote_source: cfg.model_url.as_deref(),
            user_dir: cfg.user_dir.as_deref(),
            ext_filter,
        })
    }

    /// Upscale `image` by `factor`, guaranteeing exact output dimensions.
    ///
    /// Runs up to [`MAX_ENLARGE_PASSES`] enlargement passes, stopping
    /// early when a pass makes no progress (unchanged dimensions) or when
    /// both dimensions have reached the target. Whatever the passes
    /// produced is then forced to the exact rounded target with the fixed
    /// corrective filter. Errors from `enlarge_once` propagate unmodified;
    /// nothing is retried and no partial result survives a failure.
    fn upscale(
        &self,
        image: DynamicImage,
        factor: f64,
        model: Option<&str>,
    ) -> UpscaleResult<DynamicImage> {
        let (target_w, target_h) = resample::scaled_dims(image.width(), image.height(), factor);
        debug!(
            scaler = self.name(),
            factor,
            model = model.unwrap_or(""),
            target_w,
            target_h,
            "upscale requested"
        );

        let mut img = image;
        for _ in 0..MAX_ENLARGE_PASSES {
            let before = (img.width(), img.height());
            img = self.enlarge_once(&img, factor, model)?;
            if (img.width(), img.height()) == before {
                break;
            }
            if img.width() >= target_w && img.height() >= target_h {
                break;
            }
        }

        if img.width() != target_w || img.height() != target_h {
            img = resample::resize_exact(&img, target_w, target_h, resample::CORRECTIVE_FILTER)?;
        }
        Ok(img)
    }
}
