// SPDX-License-Identifier: MIT
//! # upscaler: pluggable image enlargement with an exact-size guarantee
//!
//! Given a source image and a target scale factor, produce an output of
//! exactly the rounded target dimensions, whatever enlargement technique
//! does the heavy lifting. Techniques are interchangeable behind one
//! trait; learned models that only enlarge by fixed multiples and plain
//! resampling filters plug into the same driver.
//!
//! ## Key components
//!
//! - [`strategy`]: the [`Upscaler`] contract and the exact-size driver
//!   loop that turns an imperfect per-pass primitive into a guaranteed
//!   exact-size operation
//! - [`builtin`]: identity, Lanczos, and nearest-neighbor reference
//!   strategies
//! - [`model`]: the external model backend seam and a strategy that runs
//!   loaded models
//! - [`registry`]: descriptors and the ordered strategy registry a
//!   selection layer enumerates
//! - [`locator`]: model artifact discovery
//! - [`resample`]: SIMD resampling to exact dimensions
//!
//! ## Example
//!
//! ```rust
//! use upscaler::UpscalerRegistry;
//!
//! # fn main() -> Result<(), upscaler::UpscaleError> {
//! let registry = UpscalerRegistry::with_builtins();
//! let entry = registry.get("Lanczos").expect("built-in");
//!
//! let src = image::DynamicImage::new_rgba8(100, 75);
//! let out = entry.upscale(src, 2.5)?;
//! assert_eq!((out.width(), out.height()), (250, 188));
//! # Ok(())
//! # }
//! ```

pub mod builtin;
pub mod error;
pub mod locator;
pub mod model;
pub mod registry;
pub mod resample;
pub mod status;
pub mod strategy;

pub use error::{ModelLoadError, UpscaleError, UpscaleResult};
pub use locator::{DirModelLocator, ModelLocator, ModelQuery};
pub use model::{ModelBackend, ModelBackedUpscaler, ModelHandle, ModelLoader};
pub use registry::{DescriptorSpec, UpscalerData, UpscalerRegistry};
pub use status::{ConsoleStatus, NullStatus, StatusSink};
pub use strategy::{Device, MAX_ENLARGE_PASSES, Upscaler, UpscalerConfig};
