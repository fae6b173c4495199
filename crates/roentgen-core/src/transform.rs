use crate::raster::{PointF, RectF};

/// Maps between image space and screen space for the current view.
///
/// Image space is the canvas coordinate frame with zoom and rotation
/// removed; the base layer fits the study raster inside it once per image.
/// Screen space is what the user sees after the view transform. Both
/// transforms pivot about the canvas center: forward translates to the
/// center, scales by zoom, rotates, and translates back; the inverse undoes
/// those steps in reverse order, so `to_image(to_screen(p)) == p` up to
/// floating-point error for any zoom the viewer state allows.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewTransform {
    pub zoom: f32,
    pub rotation_deg: i32,
    pub center: PointF,
}

impl ViewTransform {
    pub fn new(zoom: f32, rotation_deg: i32, center: PointF) -> Self {
        Self {
            zoom,
            rotation_deg,
            center,
        }
    }

    /// The identity view for a canvas: zoom 1, no rotation.
    pub fn identity(canvas_width: u32, canvas_height: u32) -> Self {
        Self::new(
            1.0,
            0,
            PointF::new(canvas_width as f32 / 2.0, canvas_height as f32 / 2.0),
        )
    }

    fn angle_rad(&self) -> f32 {
        (self.rotation_deg as f32).to_radians()
    }

    pub fn is_identity(&self) -> bool {
        self.zoom == 1.0 && self.rotation_deg.rem_euclid(360) == 0
    }

    /// Image space to screen space.
    pub fn to_screen(&self, p: PointF) -> PointF {
        let dx = (p.x - self.center.x) * self.zoom;
        let dy = (p.y - self.center.y) * self.zoom;
        let (sin, cos) = self.angle_rad().sin_cos();
        PointF::new(
            dx * cos - dy * sin + self.center.x,
            dx * sin + dy * cos + self.center.y,
        )
    }

    /// Screen space to image space. Exact algebraic inverse of
    /// [`to_screen`](Self::to_screen): un-scale, then rotate by the negative
    /// angle. Uniform scale commutes with rotation, so this undoes the
    /// forward steps exactly.
    pub fn to_image(&self, p: PointF) -> PointF {
        let dx = (p.x - self.center.x) / self.zoom;
        let dy = (p.y - self.center.y) / self.zoom;
        let (sin, cos) = (-self.angle_rad()).sin_cos();
        PointF::new(
            dx * cos - dy * sin + self.center.x,
            dx * sin + dy * cos + self.center.y,
        )
    }

    /// Scale a scalar length (a radius, a stroke width) into screen space.
    /// Rotation does not change lengths, so zoom is the whole story.
    pub fn scale_len(&self, len: f32) -> f32 {
        len * self.zoom
    }
}

/// Fit a `source_w` x `source_h` image inside a canvas, preserving aspect
/// ratio, centered, occupying at most `fit_factor` of each canvas dimension.
pub fn fit_rect(
    source_w: u32,
    source_h: u32,
    canvas_w: u32,
    canvas_h: u32,
    fit_factor: f32,
) -> RectF {
    if source_w == 0 || source_h == 0 || canvas_w == 0 || canvas_h == 0 {
        return RectF::default();
    }
    let scale_x = canvas_w as f32 * fit_factor / source_w as f32;
    let scale_y = canvas_h as f32 * fit_factor / source_h as f32;
    let scale = scale_x.min(scale_y);
    let width = source_w as f32 * scale;
    let height = source_h as f32 * scale;
    RectF {
        x: (canvas_w as f32 - width) / 2.0,
        y: (canvas_h as f32 - height) / 2.0,
        width,
        height,
    }
}
