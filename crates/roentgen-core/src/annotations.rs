use crate::raster::{Color, PointF, RectF};

/// Annotation geometry, stored exclusively in image-space coordinates.
///
/// Screen positions are derived at render time through the view transform;
/// nothing here ever holds a screen coordinate, which is what keeps shapes
/// anchored to the image across zoom and rotation changes.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum Shape {
    Line { start: PointF, end: PointF },
    Rectangle { rect: RectF },
    Circle { center: PointF, radius: f32 },
    Arrow { start: PointF, end: PointF },
    Text { anchor: PointF, text: String },
    Roi { rect: RectF },
}

impl Shape {
    pub fn label(&self) -> &'static str {
        match self {
            Shape::Line { .. } => "Line",
            Shape::Rectangle { .. } => "Rectangle",
            Shape::Circle { .. } => "Circle",
            Shape::Arrow { .. } => "Arrow",
            Shape::Text { .. } => "Text",
            Shape::Roi { .. } => "ROI",
        }
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Annotation {
    pub id: u64,
    pub shape: Shape,
    pub color: Color,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum MeasurementKind {
    Distance {
        start: PointF,
        end: PointF,
        value_px: f32,
    },
    Angle {
        vertex: PointF,
        ray_a: PointF,
        ray_b: PointF,
        value_deg: f32,
    },
}

impl MeasurementKind {
    /// Distance measurement; the value is the Euclidean length in
    /// image-space pixels.
    pub fn distance(start: PointF, end: PointF) -> Self {
        MeasurementKind::Distance {
            start,
            end,
            value_px: start.distance_to(end),
        }
    }

    /// Angle at `vertex` between the rays toward `ray_a` and `ray_b`, in
    /// degrees in [0, 180]. Degenerate rays give 0.
    pub fn angle(vertex: PointF, ray_a: PointF, ray_b: PointF) -> Self {
        let ux = ray_a.x - vertex.x;
        let uy = ray_a.y - vertex.y;
        let vx = ray_b.x - vertex.x;
        let vy = ray_b.y - vertex.y;
        let lu = (ux * ux + uy * uy).sqrt();
        let lv = (vx * vx + vy * vy).sqrt();
        let value_deg = if lu == 0.0 || lv == 0.0 {
            0.0
        } else {
            let cos = ((ux * vx + uy * vy) / (lu * lv)).clamp(-1.0, 1.0);
            cos.acos().to_degrees()
        };
        MeasurementKind::Angle {
            vertex,
            ray_a,
            ray_b,
            value_deg,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            MeasurementKind::Distance { .. } => "Distance",
            MeasurementKind::Angle { .. } => "Angle",
        }
    }

    /// Display form: distances to 2 decimals in pixels, angles to 1 decimal
    /// in degrees.
    pub fn format_value(&self) -> String {
        match self {
            MeasurementKind::Distance { value_px, .. } => format!("{value_px:.2} px"),
            MeasurementKind::Angle { value_deg, .. } => format!("{value_deg:.1}°"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Measurement {
    pub id: u64,
    pub kind: MeasurementKind,
    pub color: Color,
}

/// Ordered collections of annotations and measurements for one image.
///
/// Entries are append-only during normal drawing; creation order is render
/// order, so later entries draw on top. Every entry gets a stable id at
/// creation. The only bulk mutation is [`clear_all`](Self::clear_all),
/// which empties both lists together.
#[derive(Clone, Debug, Default, serde::Serialize, serde::Deserialize)]
pub struct AnnotationSet {
    // Scalar first so the TOML form keeps it out of the trailing tables.
    next_id: u64,
    annotations: Vec<Annotation>,
    measurements: Vec<Measurement>,
}

impl AnnotationSet {
    pub fn new() -> Self {
        Self::default()
    }

    fn take_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    /// Append an annotation, returning its assigned id.
    pub fn add_annotation(&mut self, shape: Shape, color: Color) -> u64 {
        let id = self.take_id();
        self.annotations.push(Annotation { id, shape, color });
        id
    }

    /// Append a measurement, returning its assigned id.
    pub fn add_measurement(&mut self, kind: MeasurementKind, color: Color) -> u64 {
        let id = self.take_id();
        self.measurements.push(Measurement { id, kind, color });
        id
    }

    /// Remove one entry by id from whichever list holds it. No UI drives
    /// this yet; ids exist so per-item deletion stays a small change.
    pub fn remove(&mut self, id: u64) -> bool {
        let before = self.annotations.len() + self.measurements.len();
        self.annotations.retain(|a| a.id != id);
        self.measurements.retain(|m| m.id != id);
        before != self.annotations.len() + self.measurements.len()
    }

    /// Empty both collections together.
    pub fn clear_all(&mut self) {
        self.annotations.clear();
        self.measurements.clear();
    }

    pub fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }

    pub fn measurements(&self) -> &[Measurement] {
        &self.measurements
    }

    pub fn is_empty(&self) -> bool {
        self.annotations.is_empty() && self.measurements.is_empty()
    }

    pub fn len(&self) -> usize {
        self.annotations.len() + self.measurements.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_value_is_euclidean() {
        let kind = MeasurementKind::distance(PointF::new(0.0, 0.0), PointF::new(3.0, 4.0));
        match kind {
            MeasurementKind::Distance { value_px, .. } => {
                assert!((value_px - 5.0).abs() < 1e-5);
            }
            _ => panic!("expected distance"),
        }
    }

    #[test]
    fn right_angle_measures_ninety_degrees() {
        let kind = MeasurementKind::angle(
            PointF::new(0.0, 0.0),
            PointF::new(10.0, 0.0),
            PointF::new(0.0, 10.0),
        );
        match kind {
            MeasurementKind::Angle { value_deg, .. } => {
                assert!((value_deg - 90.0).abs() < 1e-3);
            }
            _ => panic!("expected angle"),
        }
    }

    #[test]
    fn degenerate_angle_is_zero() {
        let p = PointF::new(5.0, 5.0);
        let kind = MeasurementKind::angle(p, p, PointF::new(8.0, 5.0));
        match kind {
            MeasurementKind::Angle { value_deg, .. } => assert_eq!(value_deg, 0.0),
            _ => panic!("expected angle"),
        }
    }

    #[test]
    fn formatting_matches_display_rules() {
        let d = MeasurementKind::distance(PointF::new(0.0, 0.0), PointF::new(300.0, 0.0));
        assert_eq!(d.format_value(), "300.00 px");
        let a = MeasurementKind::angle(
            PointF::new(0.0, 0.0),
            PointF::new(1.0, 0.0),
            PointF::new(0.0, 1.0),
        );
        assert_eq!(a.format_value(), "90.0°");
    }

    #[test]
    fn ids_are_stable_and_unique() {
        let mut set = AnnotationSet::new();
        let a = set.add_annotation(
            Shape::Line {
                start: PointF::new(0.0, 0.0),
                end: PointF::new(1.0, 1.0),
            },
            Color::WHITE,
        );
        let b = set.add_measurement(
            MeasurementKind::distance(PointF::new(0.0, 0.0), PointF::new(2.0, 0.0)),
            Color::WHITE,
        );
        assert_ne!(a, b);
        assert!(set.remove(a));
        assert!(!set.remove(a));
        assert_eq!(set.measurements().len(), 1);
    }
}
