use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use roentgen_core::io::image_io::{format_from_extension, load_study_image};
use roentgen_core::study::SourceFormat;

#[derive(Args)]
pub struct InfoArgs {
    /// Input image files (PNG or JPEG)
    #[arg(required = true)]
    pub files: Vec<PathBuf>,
}

pub fn run(args: &InfoArgs) -> Result<()> {
    for (index, file) in args.files.iter().enumerate() {
        if index > 0 {
            println!();
        }
        print_info(file)?;
    }
    Ok(())
}

fn print_info(file: &Path) -> Result<()> {
    if format_from_extension(file) == SourceFormat::Raw {
        anyhow::bail!(
            "raw captures carry no header; decode with `roentgen convert` and explicit dimensions"
        );
    }

    let study = load_study_image(file)
        .with_context(|| format!("Failed to load {}", file.display()))?;

    println!("File:        {}", file.display());
    println!("Format:      {}", study.format.label());
    println!("Dimensions:  {}x{}", study.width(), study.height());

    let meta = &study.metadata;
    if let Some(ref modality) = meta.modality {
        println!("Modality:    {}", modality);
    }
    if let Some(ref part) = meta.body_part {
        println!("Body part:   {}", part);
    }
    if let Some(ref date) = meta.study_date {
        println!("Study date:  {}", date);
    }
    if let Some(ref institution) = meta.institution_name {
        println!("Institution: {}", institution);
    }
    if let (Some(center), Some(width)) = (meta.window_center, meta.window_width) {
        println!("Window:      {:.0}/{:.0}", center, width);
    }

    let pixel_bytes = study.width() as u64 * study.height() as u64 * 4;
    let total_mb = pixel_bytes as f64 / (1024.0 * 1024.0);
    println!("Pixel data:  {:.1} MB", total_mb);

    Ok(())
}
