use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use roentgen_core::filters::{self, FilterKind};
use roentgen_core::io::image_io::{load_raster, save_image};
use roentgen_core::processing::FilterSettings;
use roentgen_core::render::base::apply_levels;

use crate::summary::print_filter_summary;

#[derive(Args)]
pub struct FilterArgs {
    /// Input image file (PNG or JPEG)
    pub file: PathBuf,

    /// Noise reduction intensity (0.0 to 1.0)
    #[arg(long, default_value = "0")]
    pub noise: f32,

    /// Bone suppression intensity (0.0 to 1.0)
    #[arg(long, default_value = "0")]
    pub bone: f32,

    /// Tissue suppression intensity (0.0 to 1.0)
    #[arg(long, default_value = "0")]
    pub flesh: f32,

    /// Brightness multiplier (1.0 = no change)
    #[arg(long)]
    pub brightness: Option<f32>,

    /// Contrast factor pivoting at mid-gray (1.0 = no change)
    #[arg(long)]
    pub contrast: Option<f32>,

    /// Output file path
    #[arg(short, long, default_value = "filtered.png")]
    pub output: PathBuf,
}

pub fn run(args: &FilterArgs) -> Result<()> {
    let settings = FilterSettings {
        noise: args.noise.clamp(0.0, 1.0),
        bone: args.bone.clamp(0.0, 1.0),
        flesh: args.flesh.clamp(0.0, 1.0),
    };

    let mut frame = load_raster(&args.file)
        .with_context(|| format!("Failed to load {}", args.file.display()))?;

    print_filter_summary(&args.file, &args.output, &settings, args.brightness, args.contrast);

    let stages: Vec<FilterKind> = FilterKind::chain_order()
        .into_iter()
        .filter(|kind| settings.intensity_for(*kind) > 0.0)
        .collect();

    if !stages.is_empty() {
        let pb = ProgressBar::new(stages.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{msg:24} [{bar:40}] {pos}/{len}")?
                .progress_chars("=> "),
        );

        for kind in &stages {
            pb.set_message(kind.label());
            frame = filters::apply(*kind, &frame, settings.intensity_for(*kind));
            pb.inc(1);
        }
        pb.finish_with_message("Done");
    }

    if args.brightness.is_some() || args.contrast.is_some() {
        let b = args.brightness.unwrap_or(1.0);
        let c = args.contrast.unwrap_or(1.0);
        frame = apply_levels(&frame, b, c);
    }

    save_image(&frame, &args.output)?;
    println!("Saved to {}", args.output.display());

    Ok(())
}
