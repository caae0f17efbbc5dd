// SPDX-License-Identifier: MIT
//! Descriptors and the strategy registry.
//!
//! A descriptor binds a technique's human name, default scale, and
//! artifact path to the owning strategy so a selection layer can
//! enumerate what is available without knowing any implementation. The
//! registry is a flat, ordered list with name lookup, populated by
//! enumerating each strategy's descriptors at registration time.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use image::DynamicImage;
use once_cell::sync::OnceCell;

use crate::builtin::BuiltinKind;
use crate::error::{ModelLoadError, UpscaleError, UpscaleResult};
use crate::model::ModelHandle;
use crate::strategy::Upscaler;

/// Default scale a descriptor advertises when none is given.
pub const DEFAULT_DESCRIPTOR_SCALE: u32 = 4;

/// What a strategy advertises about one of its selectable entries.
#[derive(Clone, Debug)]
pub struct DescriptorSpec {
    pub name: String,
    /// Path to the model artifact backing this entry, if any.
    pub data_path: Option<PathBuf>,
    /// Native scale factor of the entry.
    pub scale: u32,
}

impl DescriptorSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_path: None,
            scale: DEFAULT_DESCRIPTOR_SCALE,
        }
    }

    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.data_path = Some(path.into());
        self
    }

    pub fn with_scale(mut self, scale: u32) -> Self {
        self.scale = scale;
        self
    }
}

/// A registered descriptor: advertised fields plus a shared reference to
/// the owning strategy.
///
/// Immutable after construction except for the lazily resolved model
/// handle, which is filled at most once.
pub struct UpscalerData {
    pub name: String,
    pub data_path: Option<PathBuf>,
    pub scale: u32,
    pub scaler: Arc<dyn Upscaler>,
    model: OnceCell<ModelHandle>,
}

impl UpscalerData {
    fn from_spec(spec: DescriptorSpec, scaler: Arc<dyn Upscaler>) -> Self {
        Self {
            name: spec.name,
            data_path: spec.data_path,
            scale: spec.scale,
            scaler,
            model: OnceCell::new(),
        }
    }

    /// The resolved model handle, if resolution already happened.
    pub fn model(&self) -> Option<&ModelHandle> {
        self.model.get()
    }

    /// Resolve this entry's model handle, loading it on first use.
    ///
    /// Goes through the owning strategy's shared handle accessor, so a
    /// strategy that caches hands out the same handle here and in its
    /// own passes. Entries without a data path cannot resolve and report
    /// the artifact as missing.
    pub fn resolve_model(&self) -> UpscaleResult<&ModelHandle> {
        self.model.get_or_try_init(|| {
            let path = self
                .data_path
                .as_deref()
                .ok_or_else(|| ModelLoadError::Missing(PathBuf::from(&self.name)))?;
            Ok(self.scaler.model_handle(path)?)
        })
    }

    /// Upscale through the owning strategy, passing this entry's data
    /// path as the model selector.
    pub fn upscale(&self, image: DynamicImage, factor: f64) -> UpscaleResult<DynamicImage> {
        let selector = self.data_path.as_deref().and_then(|p| p.to_str());
        self.scaler.upscale(image, factor, selector)
    }
}

impl std::fmt::Debug for UpscalerData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpscalerData")
            .field("name", &self.name)
            .field("data_path", &self.data_path)
            .field("scale", &self.scale)
            .field("scaler", &self.scaler.name())
            .field("resolved", &self.model.get().is_some())
            .finish()
    }
}

/// Ordered collection of every registered descriptor.
///
/// Iteration follows registration order. Lookup is by descriptor name;
/// registering a duplicate name keeps both entries but points lookup at
/// the newest one.
#[derive(Default)]
pub struct UpscalerRegistry {
    entries: Vec<UpscalerData>,
    index: HashMap<String, usize>,
}

impl UpscalerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry preloaded with the built-in strategies, in their
    /// canonical order.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        for kind in BuiltinKind::ALL {
            registry
                .register(kind.create())
                .expect("built-in strategies always expose a descriptor");
        }
        registry
    }

    /// Register every descriptor `scaler` exposes.
    ///
    /// Rejects strategies that expose none; the selection layer relies on
    /// each technique being visible under at least one name.
    pub fn register(&mut self, scaler: Arc<dyn Upscaler>) -> UpscaleResult<()> {
        let specs = scaler.descriptors();
        if specs.is_empty() {
            return Err(UpscaleError::NoDescriptors(scaler.name().to_string()));
        }
        for spec in specs {
            let entry = UpscalerData::from_spec(spec, Arc::clone(&scaler));
            self.index.insert(entry.name.clone(), self.entries.len());
            self.entries.push(entry);
        }
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&UpscalerData> {
        self.index.get(name).map(|&i| &self.entries[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = &UpscalerData> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::UpscalerConfig;

    struct Bare {
        config: UpscalerConfig,
        specs: Vec<DescriptorSpec>,
    }

    impl Upscaler for Bare {
        fn name(&self) -> &str {
            "Bare"
        }
        fn config(&self) -> &UpscalerConfig {
            &self.config
        }
        fn descriptors(&self) -> Vec<DescriptorSpec> {
            self.specs.clone()
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

    #[test]
    fn builtins_register_in_canonical_order() {
        let registry = UpscalerRegistry::with_builtins();
        let names: Vec<_> = registry.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["None", "Lanczos", "Nearest"]);
        assert!(registry.get("Lanczos").is_some());
        assert!(registry.get("lanczos").is_none());
    }

    #[test]
    fn descriptorless_strategy_is_rejected() {
        let mut registry = UpscalerRegistry::new();
        let err = registry
            .register(Arc::new(Bare {
                config: UpscalerConfig::default(),
                specs: Vec::new(),
            }))
            .unwrap_err();
        assert!(matches!(err, UpscaleError::NoDescriptors(name) if name == "Bare"));
        assert!(registry.is_empty());
    }

    #[test]
    fn one_strategy_may_expose_many_descriptors() {
        let mut registry = UpscalerRegistry::new();
        registry
            .register(Arc::new(Bare {
                config: UpscalerConfig::default(),
                specs: vec![
                    DescriptorSpec::new("2x").with_scale(2),
                    DescriptorSpec::new("4x"),
                ],
            }))
            .unwrap();
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.get("2x").unwrap().scale, 2);
        assert_eq!(registry.get("4x").unwrap().scale, DEFAULT_DESCRIPTOR_SCALE);
    }

    #[test]
    fn duplicate_name_keeps_order_and_points_lookup_at_newest() {
        let mut registry = UpscalerRegistry::new();
        registry
            .register(Arc::new(Bare {
                config: UpscalerConfig::default(),
                specs: vec![DescriptorSpec::new("dup").with_scale(2)],
            }))
            .unwrap();
        registry
            .register(Arc::new(Bare {
                config: UpscalerConfig::default(),
                specs: vec![DescriptorSpec::new("dup").with_scale(3)],
            }))
            .unwrap();
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.get("dup").unwrap().scale, 3);
    }

    #[test]
    fn pathless_descriptor_cannot_resolve_a_model() {
        let registry = UpscalerRegistry::with_builtins();
        let entry = registry.get("None").unwrap();
        let err = entry.resolve_model().unwrap_err();
        assert!(matches!(err, UpscaleError::ModelLoad(ModelLoadError::Missing(_))));
        assert!(entry.model().is_none());
    }
}
