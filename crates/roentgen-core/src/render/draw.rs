use font8x8::{UnicodeFonts, BASIC_FONTS};

use crate::raster::{Color, PointF, Raster, RectF};

/// Glyph cell edge in pixels at scale 1.
pub const GLYPH_SIZE: i64 = 8;

pub fn draw_disc(img: &mut Raster, center: PointF, radius: f32, color: Color) {
    if radius <= 0.1 {
        img.blend(center.x.round() as i64, center.y.round() as i64, color);
        return;
    }
    let min_x = (center.x - radius).floor() as i64;
    let max_x = (center.x + radius).ceil() as i64;
    let min_y = (center.y - radius).floor() as i64;
    let max_y = (center.y + radius).ceil() as i64;
    let r2 = radius * radius;
    for y in min_y..=max_y {
        for x in min_x..=max_x {
            let dx = x as f32 - center.x;
            let dy = y as f32 - center.y;
            if dx * dx + dy * dy <= r2 {
                img.blend(x, y, color);
            }
        }
    }
}

/// Thick segment drawn by stamping discs along its length.
pub fn draw_thick_line(img: &mut Raster, a: PointF, b: PointF, color: Color, width: f32) {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let distance = (dx * dx + dy * dy).sqrt();
    let steps = distance.max(1.0).ceil() as i32;
    let radius = (width.max(1.0) / 2.0).max(0.6);
    for step in 0..=steps {
        let t = step as f32 / steps.max(1) as f32;
        draw_disc(
            img,
            PointF::new(a.x + dx * t, a.y + dy * t),
            radius,
            color,
        );
    }
}

/// Dashed segment: alternating drawn and skipped runs along the line.
pub fn draw_dashed_line(
    img: &mut Raster,
    a: PointF,
    b: PointF,
    color: Color,
    width: f32,
    dash_len: f32,
    gap_len: f32,
) {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let distance = (dx * dx + dy * dy).sqrt();
    if distance < 0.5 {
        draw_disc(img, a, width.max(1.0) / 2.0, color);
        return;
    }
    let period = (dash_len + gap_len).max(1.0);
    let mut pos = 0.0f32;
    while pos < distance {
        let end = (pos + dash_len).min(distance);
        let t0 = pos / distance;
        let t1 = end / distance;
        draw_thick_line(
            img,
            PointF::new(a.x + dx * t0, a.y + dy * t0),
            PointF::new(a.x + dx * t1, a.y + dy * t1),
            color,
            width,
        );
        pos += period;
    }
}

/// Outline of an arbitrary polygon, closed, with a uniform stroke.
pub fn draw_polygon(img: &mut Raster, corners: &[PointF], color: Color, width: f32) {
    for i in 0..corners.len() {
        let next = (i + 1) % corners.len();
        draw_thick_line(img, corners[i], corners[next], color, width);
    }
}

/// Dashed polygon outline, used for ROI styling.
pub fn draw_dashed_polygon(
    img: &mut Raster,
    corners: &[PointF],
    color: Color,
    width: f32,
    dash_len: f32,
    gap_len: f32,
) {
    for i in 0..corners.len() {
        let next = (i + 1) % corners.len();
        draw_dashed_line(img, corners[i], corners[next], color, width, dash_len, gap_len);
    }
}

pub fn draw_circle_outline(
    img: &mut Raster,
    center: PointF,
    radius: f32,
    color: Color,
    width: f32,
) {
    if radius <= 0.5 {
        draw_disc(img, center, width.max(1.0) / 2.0, color);
        return;
    }
    let steps = (radius * std::f32::consts::TAU).ceil().max(8.0) as i32;
    let stroke = (width.max(1.0) / 2.0).max(0.6);
    for step in 0..steps {
        let angle = step as f32 / steps as f32 * std::f32::consts::TAU;
        let p = PointF::new(
            center.x + radius * angle.cos(),
            center.y + radius * angle.sin(),
        );
        draw_disc(img, p, stroke, color);
    }
}

/// Arc from `start_deg` sweeping `sweep_deg` counterclockwise, for angle
/// measurement glyphs.
pub fn draw_arc(
    img: &mut Raster,
    center: PointF,
    radius: f32,
    start_rad: f32,
    sweep_rad: f32,
    color: Color,
    width: f32,
) {
    let arc_len = (radius * sweep_rad.abs()).ceil().max(2.0);
    let steps = arc_len as i32;
    let stroke = (width.max(1.0) / 2.0).max(0.6);
    for step in 0..=steps {
        let angle = start_rad + sweep_rad * step as f32 / steps as f32;
        let p = PointF::new(
            center.x + radius * angle.cos(),
            center.y + radius * angle.sin(),
        );
        draw_disc(img, p, stroke, color);
    }
}

fn triangle_area(a: PointF, b: PointF, c: PointF) -> f32 {
    ((a.x * (b.y - c.y) + b.x * (c.y - a.y) + c.x * (a.y - b.y)).abs()) / 2.0
}

fn point_in_triangle(p: PointF, a: PointF, b: PointF, c: PointF, eps: f32) -> bool {
    let total = triangle_area(a, b, c);
    if total <= eps {
        return false;
    }
    let a1 = triangle_area(p, b, c);
    let a2 = triangle_area(a, p, c);
    let a3 = triangle_area(a, b, p);
    (a1 + a2 + a3 - total).abs() <= eps
}

pub fn fill_triangle(img: &mut Raster, a: PointF, b: PointF, c: PointF, color: Color) {
    let min_x = a.x.min(b.x).min(c.x).floor() as i64;
    let max_x = a.x.max(b.x).max(c.x).ceil() as i64;
    let min_y = a.y.min(b.y).min(c.y).floor() as i64;
    let max_y = a.y.max(b.y).max(c.y).ceil() as i64;
    for y in min_y..=max_y {
        for x in min_x..=max_x {
            let p = PointF::new(x as f32 + 0.5, y as f32 + 0.5);
            if point_in_triangle(p, a, b, c, 0.8) {
                img.blend(x, y, color);
            }
        }
    }
}

/// Segment with a filled triangular head at `b`.
pub fn draw_arrow(
    img: &mut Raster,
    a: PointF,
    b: PointF,
    color: Color,
    width: f32,
    head_len: f32,
    head_width: f32,
) {
    let angle = (b.y - a.y).atan2(b.x - a.x);
    let back = PointF::new(b.x - head_len * angle.cos(), b.y - head_len * angle.sin());
    draw_thick_line(img, a, back, color, width);

    let left_angle = angle + std::f32::consts::FRAC_PI_2;
    let right_angle = angle - std::f32::consts::FRAC_PI_2;
    let half = head_width / 2.0;
    let left = PointF::new(back.x + half * left_angle.cos(), back.y + half * left_angle.sin());
    let right = PointF::new(
        back.x + half * right_angle.cos(),
        back.y + half * right_angle.sin(),
    );
    fill_triangle(img, b, left, right, color);
}

/// Alpha-blend a solid rectangle, used for label backings.
pub fn fill_rect(img: &mut Raster, rect: RectF, color: Color) {
    let min_x = rect.x.floor() as i64;
    let max_x = (rect.x + rect.width).ceil() as i64;
    let min_y = rect.y.floor() as i64;
    let max_y = (rect.y + rect.height).ceil() as i64;
    for y in min_y..max_y {
        for x in min_x..max_x {
            img.blend(x, y, color);
        }
    }
}

/// Burn text into the raster with the 8x8 bitmap font. Glyphs stay
/// axis-aligned whatever the view rotation; callers pass an already
/// transformed anchor. Unknown glyphs fall back to '?'.
pub fn draw_bitmap_text(
    img: &mut Raster,
    anchor_x: i64,
    anchor_y: i64,
    text: &str,
    color: Color,
    scale: u32,
) {
    let scale = scale.max(1) as i64;
    let mut cursor_x = anchor_x;
    let mut cursor_y = anchor_y;
    for ch in text.chars() {
        if ch == '\n' {
            cursor_x = anchor_x;
            cursor_y += GLYPH_SIZE * scale;
            continue;
        }
        let glyph = BASIC_FONTS.get(ch).or_else(|| BASIC_FONTS.get('?'));
        let Some(glyph) = glyph else {
            cursor_x += GLYPH_SIZE * scale;
            continue;
        };
        for (row_idx, row) in glyph.iter().enumerate() {
            let row_bits = *row;
            for col_idx in 0..GLYPH_SIZE {
                if (row_bits >> col_idx) & 1 == 0 {
                    continue;
                }
                let px = cursor_x + col_idx * scale;
                let py = cursor_y + row_idx as i64 * scale;
                for sy in 0..scale {
                    for sx in 0..scale {
                        img.blend(px + sx, py + sy, color);
                    }
                }
            }
        }
        cursor_x += GLYPH_SIZE * scale;
    }
}

/// Pixel extent of a text block at a given scale.
pub fn text_size(text: &str, scale: u32) -> (i64, i64) {
    let scale = scale.max(1) as i64;
    let lines: Vec<&str> = text.split('\n').collect();
    let width_chars = lines
        .iter()
        .map(|line| line.chars().count() as i64)
        .max()
        .unwrap_or(0);
    let line_count = lines.len().max(1) as i64;
    (
        width_chars * GLYPH_SIZE * scale,
        line_count * GLYPH_SIZE * scale,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disc_blends_inside_radius_only() {
        let mut img = Raster::filled(21, 21, Color::BLACK);
        draw_disc(&mut img, PointF::new(10.0, 10.0), 3.0, Color::WHITE);
        assert_eq!(img.get(10, 10), Color::WHITE);
        assert_eq!(img.get(0, 0), Color::BLACK);
    }

    #[test]
    fn thick_line_covers_endpoints() {
        let mut img = Raster::filled(30, 30, Color::BLACK);
        draw_thick_line(
            &mut img,
            PointF::new(2.0, 15.0),
            PointF::new(27.0, 15.0),
            Color::WHITE,
            2.0,
        );
        assert_eq!(img.get(2, 15), Color::WHITE);
        assert_eq!(img.get(27, 15), Color::WHITE);
        assert_eq!(img.get(15, 15), Color::WHITE);
        assert_eq!(img.get(15, 2), Color::BLACK);
    }

    #[test]
    fn dashed_line_leaves_gaps() {
        let mut img = Raster::filled(60, 10, Color::BLACK);
        draw_dashed_line(
            &mut img,
            PointF::new(0.0, 5.0),
            PointF::new(59.0, 5.0),
            Color::WHITE,
            1.0,
            4.0,
            4.0,
        );
        let lit = (0..60).filter(|&x| img.get(x, 5) != Color::BLACK).count();
        assert!(lit > 10, "some dashes drawn, got {lit}");
        assert!(lit < 55, "some gaps left, got {lit}");
    }

    #[test]
    fn text_renders_pixels_within_bbox() {
        let mut img = Raster::filled(64, 16, Color::BLACK);
        draw_bitmap_text(&mut img, 2, 4, "A", Color::WHITE, 1);
        let (w, h) = text_size("A", 1);
        assert_eq!((w, h), (8, 8));
        let mut lit = 0;
        for y in 0..16 {
            for x in 0..64 {
                if img.get(x, y) != Color::BLACK {
                    assert!((2..10).contains(&x) && (4..12).contains(&y));
                    lit += 1;
                }
            }
        }
        assert!(lit > 0, "glyph should render");
    }
}
