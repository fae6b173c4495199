use rayon::prelude::*;

use crate::consts::{CANVAS_FIT_FACTOR, PARALLEL_PIXEL_THRESHOLD, RGBA_CHANNEL_COUNT};
use crate::raster::{Color, PointF, Raster};
use crate::transform::{fit_rect, ViewTransform};
use crate::viewer::ViewerState;

use super::draw::{draw_bitmap_text, text_size};

/// Canvas fill outside the image footprint.
pub(crate) const BACKDROP: Color = Color::rgb(12, 12, 14);

/// Text color on the failed-load card.
const FALLBACK_TEXT: Color = Color::rgb(190, 190, 195);

/// Render the base layer: the source raster fitted and centered on the
/// canvas, under the current zoom/rotation, with brightness and contrast
/// applied.
///
/// Painted by inverse mapping: every canvas pixel is pulled back through
/// the view transform and sampled from the fitted source with nearest
/// neighbor. Canvas pixels that land outside the image keep the backdrop
/// fill.
pub fn render_base(
    source: &Raster,
    canvas_w: u32,
    canvas_h: u32,
    state: &ViewerState,
) -> Raster {
    let mut canvas = Raster::filled(canvas_w, canvas_h, BACKDROP);
    if source.width() == 0 || source.height() == 0 || canvas_w == 0 || canvas_h == 0 {
        return canvas;
    }

    let fit = fit_rect(
        source.width(),
        source.height(),
        canvas_w,
        canvas_h,
        CANVAS_FIT_FACTOR,
    );
    let transform = ViewTransform::new(
        state.zoom,
        state.rotation_deg,
        PointF::new(canvas_w as f32 / 2.0, canvas_h as f32 / 2.0),
    );
    let lut = level_lut(state.brightness, state.contrast);

    let src_w = source.width() as usize;
    let src_h = source.height() as usize;
    let src_raw = source.as_bytes();
    let w = canvas_w as usize;
    let h = canvas_h as usize;
    let stride = w * RGBA_CHANNEL_COUNT;

    let paint_row = |y: usize, row: &mut [u8]| {
        for x in 0..w {
            let p = transform.to_image(PointF::new(x as f32 + 0.5, y as f32 + 0.5));
            if p.x < fit.x || p.x >= fit.x + fit.width || p.y < fit.y || p.y >= fit.y + fit.height
            {
                continue;
            }
            let sx = (((p.x - fit.x) / fit.width * src_w as f32) as usize).min(src_w - 1);
            let sy = (((p.y - fit.y) / fit.height * src_h as f32) as usize).min(src_h - 1);
            let si = (sy * src_w + sx) * RGBA_CHANNEL_COUNT;
            let di = x * RGBA_CHANNEL_COUNT;
            row[di] = lut[src_raw[si] as usize];
            row[di + 1] = lut[src_raw[si + 1] as usize];
            row[di + 2] = lut[src_raw[si + 2] as usize];
            row[di + 3] = 255;
        }
    };

    let raw = canvas.as_bytes_mut();
    if w * h >= PARALLEL_PIXEL_THRESHOLD {
        raw.par_chunks_mut(stride)
            .enumerate()
            .for_each(|(y, row)| paint_row(y, row));
    } else {
        for (y, row) in raw.chunks_mut(stride).enumerate() {
            paint_row(y, row);
        }
    }

    canvas
}

/// Brightness (multiplicative) then contrast (pivoting at mid-gray), baked
/// into one 256-entry lookup table shared by all three color channels.
fn level_lut(brightness: f32, contrast: f32) -> [u8; 256] {
    let mut lut = [0u8; 256];
    for (v, out) in lut.iter_mut().enumerate() {
        let n = v as f32 / 255.0 * brightness;
        let adjusted = (n - 0.5) * contrast + 0.5;
        *out = (adjusted.clamp(0.0, 1.0) * 255.0).round() as u8;
    }
    lut
}

/// Apply the same brightness/contrast mapping the base layer uses, as a
/// standalone pass over a raster. Alpha passes through unchanged.
pub fn apply_levels(src: &Raster, brightness: f32, contrast: f32) -> Raster {
    let lut = level_lut(brightness, contrast);
    let mut out = src.clone();
    for px in out.as_bytes_mut().chunks_exact_mut(4) {
        px[0] = lut[px[0] as usize];
        px[1] = lut[px[1] as usize];
        px[2] = lut[px[2] as usize];
    }
    out
}

/// Visible card rendered when an image cannot be decoded or none is
/// selected, so the canvas never sits blank or stale.
pub fn render_fallback(canvas_w: u32, canvas_h: u32, detail: &str) -> Raster {
    let mut canvas = Raster::filled(canvas_w, canvas_h, BACKDROP);
    let message = if detail.is_empty() {
        "failed to load image".to_string()
    } else {
        format!("failed to load image\n{detail}")
    };
    let (tw, th) = text_size(&message, 2);
    let x = (canvas_w as i64 - tw) / 2;
    let y = (canvas_h as i64 - th) / 2;
    draw_bitmap_text(&mut canvas, x, y, &message, FALLBACK_TEXT, 2);
    canvas
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lut_identity_at_unit_levels() {
        let lut = level_lut(1.0, 1.0);
        assert_eq!(lut[0], 0);
        assert_eq!(lut[128], 128);
        assert_eq!(lut[255], 255);
    }

    #[test]
    fn brightness_scales_up() {
        let lut = level_lut(2.0, 1.0);
        assert_eq!(lut[100], 200);
        assert_eq!(lut[200], 255);
    }

    #[test]
    fn contrast_pivots_at_mid_gray() {
        let lut = level_lut(1.0, 2.0);
        assert_eq!(lut[128], 129);
        assert_eq!(lut[0], 0);
        assert_eq!(lut[255], 255);
        assert!(lut[100] < 100);
        assert!(lut[160] > 160);
    }

    #[test]
    fn apply_levels_keeps_alpha() {
        let src = Raster::filled(2, 2, Color::rgba(100, 100, 100, 32));
        let out = apply_levels(&src, 2.0, 1.0);
        assert_eq!(out.get(0, 0).r, 200);
        assert_eq!(out.get(0, 0).a, 32);
    }

    #[test]
    fn fallback_card_is_not_blank() {
        let card = render_fallback(200, 100, "");
        let lit = (0..100)
            .flat_map(|y| (0..200).map(move |x| (x, y)))
            .filter(|&(x, y)| card.get(x, y) != BACKDROP)
            .count();
        assert!(lit > 0, "card should carry visible text");
    }
}
