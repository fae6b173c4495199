use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use roentgen_core::annotations::AnnotationSet;
use roentgen_core::io::image_io::{load_raster, save_image};
use roentgen_core::render::compose::compose;
use roentgen_core::render::overlay::render_overlay;
use roentgen_core::transform::ViewTransform;

#[derive(Args)]
pub struct AnnotateArgs {
    /// Input image file (PNG or JPEG)
    pub file: PathBuf,

    /// Annotation overlay file (TOML)
    #[arg(long)]
    pub overlay: PathBuf,

    /// Output file path
    #[arg(short, long, default_value = "annotated.png")]
    pub output: PathBuf,
}

/// Flatten saved annotations onto an image at its native size. Geometry in
/// the file is image-space, so the identity view reproduces it exactly.
pub fn run(args: &AnnotateArgs) -> Result<()> {
    let base = load_raster(&args.file)
        .with_context(|| format!("Failed to load {}", args.file.display()))?;

    let contents = std::fs::read_to_string(&args.overlay)
        .with_context(|| format!("Failed to read {}", args.overlay.display()))?;
    let set: AnnotationSet = toml::from_str(&contents).context("Invalid annotation file")?;

    if set.is_empty() {
        anyhow::bail!("{} holds no annotations", args.overlay.display());
    }

    let transform = ViewTransform::identity(base.width(), base.height());
    let overlay = render_overlay(&set, base.width(), base.height(), &transform);
    let flattened = compose(&base, &overlay);

    println!(
        "Baked {} annotation(s) and {} measurement(s)",
        set.annotations().len(),
        set.measurements().len()
    );
    save_image(&flattened, &args.output)?;
    println!("Saved to {}", args.output.display());

    Ok(())
}
