use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use roentgen_core::io::image_io::{format_from_extension, save_image};
use roentgen_core::io::raw::{decode_raw_study, RawSpec};
use roentgen_core::study::SourceFormat;

#[derive(Args)]
pub struct ConvertArgs {
    /// Input raw capture file
    pub file: PathBuf,

    /// Capture width in pixels
    #[arg(long)]
    pub width: u32,

    /// Capture height in pixels
    #[arg(long)]
    pub height: u32,

    /// Sample bit depth (8 or 16)
    #[arg(long, default_value = "16")]
    pub depth: u8,

    /// Display window: "center,width" (e.g. "1000,400")
    #[arg(long)]
    pub window: Option<String>,

    /// Output file path
    #[arg(short, long, default_value = "converted.png")]
    pub output: PathBuf,
}

pub fn run(args: &ConvertArgs) -> Result<()> {
    if format_from_extension(&args.file) != SourceFormat::Raw {
        anyhow::bail!("{} is not a raw capture", args.file.display());
    }

    let bytes = std::fs::read(&args.file)
        .with_context(|| format!("Failed to read {}", args.file.display()))?;

    let mut spec = RawSpec::new(args.width, args.height, args.depth);
    if let Some(ref window_str) = args.window {
        let parts: Vec<f32> = window_str
            .split(',')
            .map(|s| s.trim().parse::<f32>())
            .collect::<std::result::Result<_, _>>()
            .context("Invalid window format (expected 'center,width')")?;
        if parts.len() != 2 {
            anyhow::bail!("Window requires exactly 2 values: center,width");
        }
        spec = spec.with_window(parts[0], parts[1]);
    }

    let filename = args
        .file
        .file_name()
        .map(|n| n.to_string_lossy().into_owned());
    let study = decode_raw_study(&bytes, &spec, filename)?;

    println!(
        "Decoded {}x{} capture ({}-bit)",
        study.width(),
        study.height(),
        args.depth
    );
    save_image(&study.raster, &args.output)?;
    println!("Saved to {}", args.output.display());

    Ok(())
}
