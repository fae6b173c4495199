use roentgen_core::raster::{Color, Raster};

/// Convert an interleaved RGBA raster to an egui ColorImage.
pub fn raster_to_color_image(raster: &Raster) -> egui::ColorImage {
    let w = raster.width() as usize;
    let h = raster.height() as usize;
    let pixels = raster
        .as_bytes()
        .chunks_exact(4)
        .map(|px| egui::Color32::from_rgba_unmultiplied(px[0], px[1], px[2], px[3]))
        .collect();

    egui::ColorImage {
        size: [w, h],
        pixels,
        source_size: Default::default(),
    }
}

pub fn to_color32(color: Color) -> egui::Color32 {
    egui::Color32::from_rgba_unmultiplied(color.r, color.g, color.b, color.a)
}

pub fn from_color32(color: egui::Color32) -> Color {
    Color::rgba(color.r(), color.g(), color.b(), color.a())
}
