use std::io::Cursor;

use image::ImageFormat;

use crate::error::Result;
use crate::raster::Raster;

/// Flatten the overlay onto the base with source-over blending. Both layers
/// share canvas dimensions; the overlay's transparent pixels leave the base
/// untouched.
pub fn compose(base: &Raster, overlay: &Raster) -> Raster {
    let mut flat = base.clone();
    let w = base.width() as i64;
    let h = base.height() as i64;
    for y in 0..h {
        for x in 0..w {
            let src = overlay.get(x, y);
            if src.a > 0 {
                flat.blend(x, y, src);
            }
        }
    }
    flat
}

/// Encode a raster as PNG bytes in memory, ready to hand to whatever
/// storage the embedding layer chooses.
pub fn export_png(raster: &Raster) -> Result<Vec<u8>> {
    let img = raster.to_rgba_image();
    let mut bytes = Cursor::new(Vec::new());
    img.write_to(&mut bytes, ImageFormat::Png)?;
    Ok(bytes.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::Color;

    #[test]
    fn compose_keeps_base_under_transparent_overlay() {
        let base = Raster::filled(10, 10, Color::rgb(50, 60, 70));
        let overlay = Raster::transparent(10, 10);
        let flat = compose(&base, &overlay);
        assert_eq!(flat.as_bytes(), base.as_bytes());
    }

    #[test]
    fn compose_blends_opaque_overlay_pixels() {
        let base = Raster::filled(10, 10, Color::BLACK);
        let mut overlay = Raster::transparent(10, 10);
        overlay.set(5, 5, Color::rgb(255, 0, 0));
        let flat = compose(&base, &overlay);
        assert_eq!(flat.get(5, 5), Color::rgb(255, 0, 0));
        assert_eq!(flat.get(0, 0), Color::BLACK);
    }

    #[test]
    fn export_produces_decodable_png() {
        let raster = Raster::filled(16, 12, Color::rgb(90, 10, 200));
        let bytes = export_png(&raster).unwrap();
        let decoded = image::load_from_memory(&bytes).unwrap().to_rgba8();
        assert_eq!(decoded.dimensions(), (16, 12));
        assert_eq!(decoded.get_pixel(3, 3).0, [90, 10, 200, 255]);
    }
}
