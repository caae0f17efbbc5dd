// SPDX-License-Identifier: MIT
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;
use upscaler::builtin::BuiltinKind;
use upscaler::{Device, UpscalerConfig, UpscalerRegistry};

/// Upscale an image to an exact target size with a chosen strategy.
#[derive(Parser, Debug)]
#[command(name = "upscale")]
#[command(about = "Upscale an image by a scale factor with exact output dimensions")]
struct Args {
    /// Input image path
    input: PathBuf,

    /// Output image path
    #[arg(short, long, default_value = "upscaled.png")]
    output: PathBuf,

    /// Scale factor, e.g. 2 or 1.5 (downscaling works too)
    #[arg(short, long, default_value_t = 4.0)]
    scale: f64,

    /// Enlargement strategy
    #[arg(long, value_enum, default_value_t = BuiltinKind::Lanczos)]
    strategy: BuiltinKind,

    /// Model storage directory, created if missing
    #[arg(long)]
    model_dir: Option<PathBuf>,

    /// Compute device hint, e.g. cpu, cuda, cuda:1
    #[arg(long, default_value = "cpu")]
    device: String,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    if args.scale <= 0.0 || !args.scale.is_finite() {
        bail!("scale must be a positive number, got {}", args.scale);
    }

    let img = image::open(&args.input)
        .with_context(|| format!("reading {}", args.input.display()))?;
    let (src_w, src_h) = (img.width(), img.height());

    let config = UpscalerConfig {
        device: Device::from_str_lossy(&args.device),
        model_dir: args.model_dir.clone(),
        ..Default::default()
    };
    config
        .ensure_model_dir()
        .context("creating model storage directory")?;

    let mut registry = UpscalerRegistry::new();
    for kind in BuiltinKind::ALL {
        registry.register(kind.create_with(config.clone()))?;
    }
    let entry = registry
        .get(args.strategy.registry_name())
        .context("strategy not registered")?;

    let out = entry.upscale(img, args.scale)?;
    let (dst_w, dst_h) = (out.width(), out.height());
    out.save(&args.output)
        .with_context(|| format!("writing {}", args.output.display()))?;

    println!(
        "{}: {}x{} -> {}x{} ({}), saved to {}",
        args.input.display(),
        src_w,
        src_h,
        dst_w,
        dst_h,
        entry.name,
        args.output.display()
    );
    Ok(())
}
