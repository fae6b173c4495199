use crate::annotations::{MeasurementKind, Shape};
use crate::raster::{PointF, RectF};

/// Minimum gesture extent in image pixels; anything smaller is a stray
/// click and is discarded.
const MIN_EXTENT: f32 = 1.0;

/// The active viewer tool.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Tool {
    #[default]
    None,
    Line,
    Rectangle,
    Circle,
    Arrow,
    Text,
    Ruler,
    Angle,
    Roi,
}

impl Tool {
    pub fn label(&self) -> &'static str {
        match self {
            Tool::None => "Pan",
            Tool::Line => "Line",
            Tool::Rectangle => "Rectangle",
            Tool::Circle => "Circle",
            Tool::Arrow => "Arrow",
            Tool::Text => "Text",
            Tool::Ruler => "Ruler",
            Tool::Angle => "Angle",
            Tool::Roi => "ROI",
        }
    }

    pub fn all() -> [Tool; 9] {
        [
            Tool::None,
            Tool::Line,
            Tool::Rectangle,
            Tool::Circle,
            Tool::Arrow,
            Tool::Text,
            Tool::Ruler,
            Tool::Angle,
            Tool::Roi,
        ]
    }

    /// Whether pointer gestures with this tool produce annotations or
    /// measurements. `None` passes pointer interaction through untouched.
    pub fn is_drawing_tool(&self) -> bool {
        !matches!(self, Tool::None)
    }
}

/// What a completed gesture asks the owning session to do.
#[derive(Clone, Debug, PartialEq)]
pub enum GestureOutcome {
    /// Nothing to commit.
    None,
    /// Append this shape.
    Annotation(Shape),
    /// Append this measurement.
    Measurement(MeasurementKind),
    /// The text tool wants a string for this image-space anchor; the
    /// embedding UI prompts and then commits or cancels.
    TextPrompt { anchor: PointF },
}

/// Pointer gesture state for the active tool.
///
/// All points passed in are image-space; the session inverse-transforms
/// raw canvas positions before they get here. A pointer-down arms the
/// gesture, the matching pointer-up completes it. Switching tools mid
/// gesture abandons it without committing anything. The angle tool is the
/// one multi-click gesture: ray end, vertex, ray end.
#[derive(Clone, Debug, Default)]
pub struct ToolState {
    active: Tool,
    drawing: bool,
    start: Option<PointF>,
    angle_clicks: Vec<PointF>,
}

impl ToolState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active(&self) -> Tool {
        self.active
    }

    pub fn is_drawing(&self) -> bool {
        self.drawing
    }

    /// Anchor of the in-progress gesture, in image space.
    pub fn start(&self) -> Option<PointF> {
        self.start
    }

    /// For the angle tool: the clicks already placed, ray end then vertex.
    pub fn angle_points(&self) -> &[PointF] {
        &self.angle_clicks
    }

    /// Switch tools. Any in-progress gesture is abandoned.
    pub fn set_tool(&mut self, tool: Tool) {
        self.active = tool;
        self.abandon();
    }

    /// Drop any in-progress gesture without committing it.
    pub fn abandon(&mut self) {
        self.drawing = false;
        self.start = None;
        self.angle_clicks.clear();
    }

    pub fn pointer_down(&mut self, image_point: PointF) {
        if !self.active.is_drawing_tool() || self.drawing {
            return;
        }
        self.start = Some(image_point);
        self.drawing = true;
    }

    pub fn pointer_up(&mut self, image_point: PointF) -> GestureOutcome {
        if !self.drawing {
            return GestureOutcome::None;
        }
        self.drawing = false;
        let Some(start) = self.start.take() else {
            return GestureOutcome::None;
        };

        match self.active {
            Tool::None => GestureOutcome::None,
            Tool::Line => {
                if start.distance_to(image_point) < MIN_EXTENT {
                    return GestureOutcome::None;
                }
                GestureOutcome::Annotation(Shape::Line {
                    start,
                    end: image_point,
                })
            }
            Tool::Arrow => {
                if start.distance_to(image_point) < MIN_EXTENT {
                    return GestureOutcome::None;
                }
                GestureOutcome::Annotation(Shape::Arrow {
                    start,
                    end: image_point,
                })
            }
            Tool::Rectangle => match normalized_rect(start, image_point) {
                Some(rect) => GestureOutcome::Annotation(Shape::Rectangle { rect }),
                None => GestureOutcome::None,
            },
            Tool::Roi => match normalized_rect(start, image_point) {
                Some(rect) => GestureOutcome::Annotation(Shape::Roi { rect }),
                None => GestureOutcome::None,
            },
            Tool::Circle => {
                let radius = start.distance_to(image_point);
                if radius < MIN_EXTENT {
                    return GestureOutcome::None;
                }
                GestureOutcome::Annotation(Shape::Circle {
                    center: start,
                    radius,
                })
            }
            Tool::Ruler => {
                if start.distance_to(image_point) < MIN_EXTENT {
                    return GestureOutcome::None;
                }
                GestureOutcome::Measurement(MeasurementKind::distance(start, image_point))
            }
            Tool::Text => GestureOutcome::TextPrompt { anchor: start },
            Tool::Angle => {
                self.angle_clicks.push(image_point);
                if self.angle_clicks.len() < 3 {
                    return GestureOutcome::None;
                }
                let ray_a = self.angle_clicks[0];
                let vertex = self.angle_clicks[1];
                let ray_b = self.angle_clicks[2];
                self.angle_clicks.clear();
                GestureOutcome::Measurement(MeasurementKind::angle(vertex, ray_a, ray_b))
            }
        }
    }
}

/// Normalize a drag into a non-negative rect, rejecting degenerate drags.
fn normalized_rect(a: PointF, b: PointF) -> Option<RectF> {
    let rect = RectF::from_corners(a, b);
    if rect.width > MIN_EXTENT && rect.height > MIN_EXTENT {
        Some(rect)
    } else {
        None
    }
}
