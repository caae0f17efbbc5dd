// SPDX-License-Identifier: MIT
//! Built-in reference strategies: identity, Lanczos, nearest-neighbor.
//!
//! The filters resize straight to the exact rounded target, so the
//! driver loop exits after one pass and its corrective resize is a
//! no-op. The identity strategy changes nothing, which makes the
//! corrective resize do all the work.

use std::fmt;
use std::sync::Arc;

use image::DynamicImage;

use crate::error::UpscaleResult;
use crate::registry::DescriptorSpec;
use crate::resample::{self, ResampleFilter};
use crate::strategy::{Upscaler, UpscalerConfig};

/// Identity strategy: every pass returns the input unchanged.
#[derive(Debug, Default)]
pub struct NoneUpscaler {
    config: UpscalerConfig,
}

impl NoneUpscaler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: UpscalerConfig) -> Self {
        Self { config }
    }
}

impl Upscaler for NoneUpscaler {
    fn name(&self) -> &str {
        "None"
    }
    fn config(&self) -> &UpscalerConfig {
        &self.config
    }
    fn descriptors(&self) -> Vec<DescriptorSpec> {
        vec![DescriptorSpec::new("None")]
    }
    fn enlarge_once(
        &self,
        image: &DynamicImage,
        _factor: f64,
        _model: Option<&str>,
    ) -> UpscaleResult<DynamicImage> {
        Ok(image.clone())
    }
}

/// Lanczos resampling strategy.
#[derive(Debug, Default)]
pub struct LanczosUpscaler {
    config: UpscalerConfig,
}

impl LanczosUpscaler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: UpscalerConfig) -> Self {
        Self { config }
    }
}

impl Upscaler for LanczosUpscaler {
    fn name(&self) -> &str {
        "Lanczos"
    }
    fn config(&self) -> &UpscalerConfig {
        &self.config
    }
    fn descriptors(&self) -> Vec<DescriptorSpec> {
        vec![DescriptorSpec::new("Lanczos")]
    }
    fn enlarge_once(
        &self,
        image: &DynamicImage,
        factor: f64,
        _model: Option<&str>,
    ) -> UpscaleResult<DynamicImage> {
        let (w, h) = resample::scaled_dims(image.width(), image.height(), factor);
        resample::resize_exact(image, w, h, ResampleFilter::Lanczos3)
    }
}

/// Nearest-neighbor resampling strategy.
#[derive(Debug, Default)]
pub struct NearestUpscaler {
    config: UpscalerConfig,
}

impl NearestUpscaler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: UpscalerConfig) -> Self {
        Self { config }
    }
}

impl Upscaler for NearestUpscaler {
    fn name(&self) -> &str {
        "Nearest"
    }
    fn config(&self) -> &UpscalerConfig {
        &self.config
    }
    fn descriptors(&self) -> Vec<DescriptorSpec> {
        vec![DescriptorSpec::new("Nearest")]
    }
    fn enlarge_once(
        &self,
        image: &DynamicImage,
        factor: f64,
        _model: Option<&str>,
    ) -> UpscaleResult<DynamicImage> {
        let (w, h) = resample::scaled_dims(image.width(), image.height(), factor);
        resample::resize_exact(image, w, h, ResampleFilter::Nearest)
    }
}

/// Selector for the built-in strategies, usable directly as a CLI value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum BuiltinKind {
    None,
    Lanczos,
    Nearest,
}

impl BuiltinKind {
    /// Canonical registration order.
    pub const ALL: [BuiltinKind; 3] = [
        BuiltinKind::None,
        BuiltinKind::Lanczos,
        BuiltinKind::Nearest,
    ];

    /// The name this strategy registers its descriptor under.
    pub fn registry_name(self) -> &'static str {
        match self {
            BuiltinKind::None => "None",
            BuiltinKind::Lanczos => "Lanczos",
            BuiltinKind::Nearest => "Nearest",
        }
    }

    pub fn create(self) -> Arc<dyn Upscaler> {
        self.create_with(UpscalerConfig::default())
    }

    pub fn create_with(self, config: UpscalerConfig) -> Arc<dyn Upscaler> {
        match self {
            BuiltinKind::None => Arc::new(NoneUpscaler::with_config(config)),
            BuiltinKind::Lanczos => Arc::new(LanczosUpscaler::with_config(config)),
            BuiltinKind::Nearest => Arc::new(NearestUpscaler::with_config(config)),
        }
    }
}

impl fmt::Display for BuiltinKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Lowercase, matching the clap value names.
        write!(f, "{}", self.registry_name().to_ascii_lowercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn checkerboard(width: u32, height: u32) -> DynamicImage {
        let mut img = image::RgbaImage::new(width, height);
        for (x, y, p) in img.enumerate_pixels_mut() {
            let v = if (x + y) % 2 == 0 { 255 } else { 0 };
            *p = image::Rgba([v, v, v, 255]);
        }
        DynamicImage::ImageRgba8(img)
    }

    #[test]
    fn identity_pass_changes_nothing() {
        let img = checkerboard(10, 10);
        let out = NoneUpscaler::new().enlarge_once(&img, 3.0, None).unwrap();
        assert_eq!(out.as_bytes(), img.as_bytes());
    }

    #[test]
    fn filter_passes_hit_the_exact_target() {
        let img = checkerboard(10, 14);
        for factor in [0.5, 1.5, 2.0, 3.3] {
            let (w, h) = resample::scaled_dims(10, 14, factor);
            let lanczos = LanczosUpscaler::new().enlarge_once(&img, factor, None).unwrap();
            assert_eq!((lanczos.width(), lanczos.height()), (w, h));
            let nearest = NearestUpscaler::new().enlarge_once(&img, factor, None).unwrap();
            assert_eq!((nearest.width(), nearest.height()), (w, h));
        }
    }

    #[test]
    fn builtins_have_no_models_to_load() {
        let err = LanczosUpscaler::new()
            .load_model(std::path::Path::new("whatever.pth"))
            .unwrap_err();
        assert!(matches!(err, crate::error::ModelLoadError::Missing(_)));
        assert!(LanczosUpscaler::new().find_models(None).is_empty());
    }

    #[test]
    fn kind_maps_to_registry_name() {
        for kind in BuiltinKind::ALL {
            assert_eq!(kind.create().name(), kind.registry_name());
        }
    }
}
