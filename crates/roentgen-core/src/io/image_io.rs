use std::path::Path;

use image::{imageops, ImageFormat};
use tracing::debug;

use crate::error::Result;
use crate::raster::Raster;
use crate::study::{ImageMetadata, SourceFormat, StudyImage};

/// Source format inferred from a file extension. Unknown extensions are
/// treated as PNG, which matches how the decoder sniffs content anyway.
pub fn format_from_extension(path: &Path) -> SourceFormat {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .as_deref()
    {
        Some("jpg" | "jpeg") => SourceFormat::Jpeg,
        Some("dcm" | "dicom") => SourceFormat::Dicom,
        Some("raw") => SourceFormat::Raw,
        _ => SourceFormat::Png,
    }
}

/// Load any format the `image` crate decodes into an RGBA raster.
pub fn load_raster(path: &Path) -> Result<Raster> {
    let img = image::open(path)?;
    let rgba = img.to_rgba8();
    debug!(
        path = %path.display(),
        width = rgba.width(),
        height = rgba.height(),
        "image decoded"
    );
    Ok(Raster::from_rgba_image(rgba))
}

/// Load an image file as a study image with filename metadata attached.
pub fn load_study_image(path: &Path) -> Result<StudyImage> {
    let raster = load_raster(path)?;
    let metadata = ImageMetadata {
        original_filename: path
            .file_name()
            .and_then(|n| n.to_str())
            .map(|n| n.to_string()),
        ..ImageMetadata::default()
    };
    Ok(StudyImage::new(raster, format_from_extension(path), metadata))
}

/// Save a raster as PNG.
pub fn save_png(raster: &Raster, path: &Path) -> Result<()> {
    let img = raster.to_rgba_image();
    img.save_with_format(path, ImageFormat::Png)?;
    Ok(())
}

/// Save a raster as JPEG. Alpha is dropped since JPEG has no alpha channel.
pub fn save_jpeg(raster: &Raster, path: &Path) -> Result<()> {
    let img = raster.to_rgba_image();
    let rgb = image::DynamicImage::ImageRgba8(img).to_rgb8();
    rgb.save_with_format(path, ImageFormat::Jpeg)?;
    Ok(())
}

/// Save a raster, choosing format from file extension.
pub fn save_image(raster: &Raster, path: &Path) -> Result<()> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("jpg" | "jpeg") => save_jpeg(raster, path),
        _ => save_png(raster, path),
    }
}

/// Downscale to fit inside a square of `max_dim`, preserving aspect ratio.
/// Rasters already within bounds come back unchanged.
pub fn thumbnail(raster: &Raster, max_dim: u32) -> Raster {
    let (w, h) = (raster.width(), raster.height());
    if w <= max_dim && h <= max_dim {
        return raster.clone();
    }
    let scale = max_dim as f32 / w.max(h) as f32;
    let tw = ((w as f32 * scale).round() as u32).max(1);
    let th = ((h as f32 * scale).round() as u32).max(1);
    let img = raster.to_rgba_image();
    let small = imageops::thumbnail(&img, tw, th);
    Raster::from_rgba_image(small)
}
