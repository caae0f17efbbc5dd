// SPDX-License-Identifier: MIT
//! Driver-loop contract: exact output dimensions for every strategy,
//! bounded pass counts, and the documented early exits.

use std::sync::atomic::{AtomicUsize, Ordering};

use image::{DynamicImage, Rgba, RgbaImage};
use upscaler::builtin::{BuiltinKind, NearestUpscaler, NoneUpscaler};
use upscaler::resample::{self, CORRECTIVE_FILTER, ResampleFilter};
use upscaler::{DescriptorSpec, MAX_ENLARGE_PASSES, UpscaleResult, Upscaler, UpscalerConfig};

fn gradient(width: u32, height: u32) -> DynamicImage {
    let mut img = RgbaImage::new(width, height);
    for (x, y, p) in img.enumerate_pixels_mut() {
        let r = ((x as f32 / width as f32) * 255.0) as u8;
        let g = ((y as f32 / height as f32) * 255.0) as u8;
        *p = Rgba([r, g, 128, 255]);
    }
    DynamicImage::ImageRgba8(img)
}

fn expected_dims(w: u32, h: u32, factor: f64) -> (u32, u32) {
    (
        ((w as f64 * factor).round() as u32).max(1),
        ((h as f64 * factor).round() as u32).max(1),
    )
}

/// Counts passes and applies a caller-chosen per-pass transform.
struct StubUpscaler<F> {
    config: UpscalerConfig,
    calls: AtomicUsize,
    pass: F,
}

impl<F> StubUpscaler<F>
where
    F: Fn(&DynamicImage) -> DynamicImage + Send + Sync,
{
    fn new(pass: F) -> Self {
        Self {
            config: UpscalerConfig::default(),
            calls: AtomicUsize::new(0),
            pass,
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl<F> Upscaler for StubUpscaler<F>
where
    F: Fn(&DynamicImage) -> DynamicImage + Send + Sync,
{
    fn name(&self) -> &str {
        "Stub"
    }
    fn config(&self) -> &UpscalerConfig {
        &self.config
    }
    fn descriptors(&self) -> Vec<DescriptorSpec> {
        vec![DescriptorSpec::new("Stub")]
    }
    fn enlarge_once(
        &self,
        image: &DynamicImage,
        _factor: f64,
        _model: Option<&str>,
    ) -> UpscaleResult<DynamicImage> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok((self.pass)(image))
    }
}

fn resize_by(image: &DynamicImage, factor: f64) -> DynamicImage {
    let (w, h) = resample::scaled_dims(image.width(), image.height(), factor);
    resample::resize_exact(image, w, h, ResampleFilter::Nearest).unwrap()
}

#[test]
fn every_builtin_hits_exact_dimensions_for_every_factor() {
    for kind in BuiltinKind::ALL {
        let scaler = kind.create();
        for (w, h) in [(10, 10), (7, 13), (1, 1)] {
            for factor in [0.5, 1.0, 1.37, 2.0, 3.7] {
                let out = scaler.upscale(gradient(w, h), factor, None).unwrap();
                assert_eq!(
                    (out.width(), out.height()),
                    expected_dims(w, h, factor),
                    "{} at {}x{} by {}",
                    scaler.name(),
                    w,
                    h,
                    factor
                );
            }
        }
    }
}

#[test]
fn degenerate_factor_clamps_to_one_pixel() {
    let out = NearestUpscaler::new()
        .upscale(gradient(10, 10), 0.01, None)
        .unwrap();
    assert_eq!((out.width(), out.height()), (1, 1));
}

#[test]
fn identity_strategy_matches_direct_corrective_resample() {
    let src = gradient(24, 17);
    for factor in [0.5, 2.0, 3.25] {
        let (tw, th) = expected_dims(24, 17, factor);
        let via_strategy = NoneUpscaler::new().upscale(src.clone(), factor, None).unwrap();
        let direct = resample::resize_exact(&src, tw, th, CORRECTIVE_FILTER).unwrap();
        assert_eq!(via_strategy.as_bytes(), direct.as_bytes());
    }
}

#[test]
fn no_progress_exits_after_a_single_pass() {
    let stub = StubUpscaler::new(|img: &DynamicImage| img.clone());
    let out = stub.upscale(gradient(10, 10), 4.0, None).unwrap();
    assert_eq!(stub.calls(), 1);
    assert_eq!((out.width(), out.height()), (40, 40));
}

#[test]
fn overshoot_on_pass_one_makes_exactly_one_call() {
    // A fixed 4x technique asked for 2x: past the target immediately.
    let stub = StubUpscaler::new(|img: &DynamicImage| resize_by(img, 4.0));
    let out = stub.upscale(gradient(10, 10), 2.0, None).unwrap();
    assert_eq!(stub.calls(), 1);
    assert_eq!((out.width(), out.height()), (20, 20));
}

#[test]
fn fixed_multiple_iterates_until_past_target_then_corrects() {
    // 2x passes chasing 5x: 10 -> 20 -> 40 -> 80, then down to 50.
    let stub = StubUpscaler::new(|img: &DynamicImage| resize_by(img, 2.0));
    let out = stub.upscale(gradient(10, 10), 5.0, None).unwrap();
    assert_eq!(stub.calls(), 3);
    assert_eq!((out.width(), out.height()), (50, 50));
}

#[test]
fn slow_growth_is_cut_off_at_the_pass_bound() {
    // +1 px per side per pass: progress every pass, target never reached.
    let stub = StubUpscaler::new(|img: &DynamicImage| {
        resample::resize_exact(
            img,
            img.width() + 1,
            img.height() + 1,
            ResampleFilter::Nearest,
        )
        .unwrap()
    });
    let out = stub.upscale(gradient(10, 10), 10.0, None).unwrap();
    assert_eq!(stub.calls(), MAX_ENLARGE_PASSES);
    assert_eq!((out.width(), out.height()), (100, 100));
}

#[test]
fn downscale_requests_skip_straight_to_the_corrective_resize() {
    // An enlarging technique cannot approach a sub-1x target; the first
    // pass overshoots both dimensions and the corrective resize shrinks.
    let stub = StubUpscaler::new(|img: &DynamicImage| resize_by(img, 2.0));
    let out = stub.upscale(gradient(10, 10), 0.5, None).unwrap();
    assert_eq!(stub.calls(), 1);
    assert_eq!((out.width(), out.height()), (5, 5));
}

#[test]
fn nearest_dimensions_round_trip_exactly() {
    let scaler = NearestUpscaler::new();
    let up = scaler.upscale(gradient(10, 10), 2.0, None).unwrap();
    assert_eq!((up.width(), up.height()), (20, 20));
    let down = scaler.upscale(up, 0.5, None).unwrap();
    assert_eq!((down.width(), down.height()), (10, 10));
}

#[test]
fn enlarge_once_errors_propagate_unmodified() {
    struct Failing {
        config: UpscalerConfig,
    }
    impl Upscaler for Failing {
        fn name(&self) -> &str {
            "Failing"
        }
        fn config(&self) -> &UpscalerConfig {
            &self.config
        }
        fn descriptors(&self) -> Vec<DescriptorSpec> {
            vec![DescriptorSpec::new("Failing")]
        }
        fn enlarge_once(
            &self,
            _image: &DynamicImage,
            _factor: f64,
            _model: Option<&str>,
        ) -> UpscaleResult<DynamicImage> {
            Err(upscaler::UpscaleError::Backend("inference oom".into()))
        }
    }

    let err = Failing {
        config: UpscalerConfig::default(),
    }
    .upscale(gradient(10, 10), 2.0, None)
    .unwrap_err();
    assert!(matches!(err, upscaler::UpscaleError::Backend(_)));
    assert_eq!(err.to_string(), "backend failed: inference oom");
}
