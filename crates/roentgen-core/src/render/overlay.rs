use crate::annotations::{AnnotationSet, MeasurementKind, Shape};
use crate::raster::{Color, PointF, Raster, RectF};
use crate::transform::ViewTransform;

use super::draw;

/// Stroke width in screen pixels. Adornments (strokes, arrowheads, labels)
/// stay a constant screen size; only geometry follows the view transform.
const STROKE_WIDTH: f32 = 2.0;
const ROI_DASH: f32 = 6.0;
const ROI_GAP: f32 = 4.0;
const ARROW_HEAD_LEN: f32 = 12.0;
const ARROW_HEAD_WIDTH: f32 = 9.0;
const TICK_RADIUS: f32 = 3.0;
const ANGLE_ARC_RADIUS: f32 = 18.0;
const LABEL_SCALE: u32 = 2;
const LABEL_PAD: i64 = 3;
const LABEL_BACKING: Color = Color::rgba(0, 0, 0, 160);

/// Render the overlay layer: every annotation and measurement, fully
/// redrawn, geometry forward-transformed so it tracks the base image, in
/// creation order so later entries draw on top.
///
/// Labels are the deliberate exception: their anchors transform with the
/// image but the glyphs themselves stay upright.
pub fn render_overlay(
    set: &AnnotationSet,
    canvas_w: u32,
    canvas_h: u32,
    transform: &ViewTransform,
) -> Raster {
    let mut overlay = Raster::transparent(canvas_w, canvas_h);

    for annotation in set.annotations() {
        draw_shape(&mut overlay, &annotation.shape, annotation.color, transform);
    }
    for measurement in set.measurements() {
        draw_measurement(&mut overlay, &measurement.kind, measurement.color, transform);
    }

    overlay
}

fn draw_shape(overlay: &mut Raster, shape: &Shape, color: Color, t: &ViewTransform) {
    match shape {
        Shape::Line { start, end } => {
            draw::draw_thick_line(overlay, t.to_screen(*start), t.to_screen(*end), color, STROKE_WIDTH);
        }
        Shape::Rectangle { rect } => {
            let corners = rect.corners().map(|c| t.to_screen(c));
            draw::draw_polygon(overlay, &corners, color, STROKE_WIDTH);
        }
        Shape::Circle { center, radius } => {
            draw::draw_circle_outline(
                overlay,
                t.to_screen(*center),
                t.scale_len(*radius),
                color,
                STROKE_WIDTH,
            );
        }
        Shape::Arrow { start, end } => {
            draw::draw_arrow(
                overlay,
                t.to_screen(*start),
                t.to_screen(*end),
                color,
                STROKE_WIDTH,
                ARROW_HEAD_LEN,
                ARROW_HEAD_WIDTH,
            );
        }
        Shape::Text { anchor, text } => {
            let p = t.to_screen(*anchor);
            draw_label(overlay, p, text, color);
        }
        Shape::Roi { rect } => {
            let corners = rect.corners().map(|c| t.to_screen(c));
            draw::draw_dashed_polygon(overlay, &corners, color, STROKE_WIDTH, ROI_DASH, ROI_GAP);
        }
    }
}

fn draw_measurement(overlay: &mut Raster, kind: &MeasurementKind, color: Color, t: &ViewTransform) {
    match kind {
        MeasurementKind::Distance { start, end, .. } => {
            let a = t.to_screen(*start);
            let b = t.to_screen(*end);
            draw::draw_thick_line(overlay, a, b, color, STROKE_WIDTH);
            draw::draw_disc(overlay, a, TICK_RADIUS, color);
            draw::draw_disc(overlay, b, TICK_RADIUS, color);
            let mid = PointF::new((a.x + b.x) / 2.0, (a.y + b.y) / 2.0 - 12.0);
            draw_label(overlay, mid, &kind.format_value(), color);
        }
        MeasurementKind::Angle {
            vertex,
            ray_a,
            ray_b,
            ..
        } => {
            let v = t.to_screen(*vertex);
            let a = t.to_screen(*ray_a);
            let b = t.to_screen(*ray_b);
            draw::draw_thick_line(overlay, v, a, color, STROKE_WIDTH);
            draw::draw_thick_line(overlay, v, b, color, STROKE_WIDTH);

            let start = (a.y - v.y).atan2(a.x - v.x);
            let end = (b.y - v.y).atan2(b.x - v.x);
            let mut sweep = end - start;
            while sweep > std::f32::consts::PI {
                sweep -= std::f32::consts::TAU;
            }
            while sweep < -std::f32::consts::PI {
                sweep += std::f32::consts::TAU;
            }
            draw::draw_arc(overlay, v, ANGLE_ARC_RADIUS, start, sweep, color, STROKE_WIDTH);

            let label_anchor = PointF::new(v.x + ANGLE_ARC_RADIUS + 6.0, v.y - 12.0);
            draw_label(overlay, label_anchor, &kind.format_value(), color);
        }
    }
}

/// Upright text with a translucent backing for contrast against the image.
fn draw_label(overlay: &mut Raster, anchor: PointF, text: &str, color: Color) {
    let (tw, th) = draw::text_size(text, LABEL_SCALE);
    let x = anchor.x.round() as i64;
    let y = anchor.y.round() as i64;
    draw::fill_rect(
        overlay,
        RectF {
            x: (x - LABEL_PAD) as f32,
            y: (y - LABEL_PAD) as f32,
            width: (tw + 2 * LABEL_PAD) as f32,
            height: (th + 2 * LABEL_PAD) as f32,
        },
        LABEL_BACKING,
    );
    draw::draw_bitmap_text(overlay, x, y, text, color, LABEL_SCALE);
}
