//! Rectangle shape.

use super::{ObjectMeta, ShapeId, ShapeStyle, ShapeTrait};
use kurbo::{Affine, BezPath, Point, Rect, RoundedRect, Shape as KurboShape};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A rectangle with optional rounded corners.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rectangle {
    pub(crate) id: ShapeId,
    /// Top-left corner position.
    pub position: Point,
    pub width: f64,
    pub height: f64,
    /// Corner radius (0 = sharp corners).
    #[serde(default)]
    pub corner_radius: f64,
    /// Rotation angle in radians (around center).
    #[serde(default)]
    pub rotation: f64,
    pub style: ShapeStyle,
    #[serde(default)]
    pub meta: ObjectMeta,
}

impl Rectangle {
    pub fn new(position: Point, width: f64, height: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            position,
            width,
            height,
            corner_radius: 0.0,
            rotation: 0.0,
            style: ShapeStyle::default(),
            meta: ObjectMeta::default(),
        }
    }

    /// Create a rectangle spanning two corner points in any orientation.
    pub fn from_corners(p1: Point, p2: Point) -> Self {
        Self::new(
            Point::new(p1.x.min(p2.x), p1.y.min(p2.y)),
            (p2.x - p1.x).abs(),
            (p2.y - p1.y).abs(),
        )
    }

    pub fn as_rect(&self) -> Rect {
        Rect::new(
            self.position.x,
            self.position.y,
            self.position.x + self.width,
            self.position.y + self.height,
        )
    }
}

impl ShapeTrait for Rectangle {
    fn id(&self) -> ShapeId {
        self.id
    }

    fn set_id(&mut self, id: ShapeId) {
        self.id = id;
    }

    fn bounds(&self) -> Rect {
        self.as_rect()
    }

    fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        let rect = self.as_rect();
        if self.style.fill_color.is_some() {
            return rect.inflate(tolerance, tolerance).contains(point);
        }
        // Outline only: hit on the border band
        let band = tolerance + self.style.stroke_width / 2.0;
        let outer = rect.inflate(band, band);
        let inner = rect.inflate(-band, -band);
        outer.contains(point) && !inner.contains(point)
    }

    fn to_path(&self) -> BezPath {
        if self.corner_radius > 0.0 {
            RoundedRect::from_rect(self.as_rect(), self.corner_radius).to_path(0.1)
        } else {
            self.as_rect().to_path(0.1)
        }
    }

    fn style(&self) -> &ShapeStyle {
        &self.style
    }

    fn style_mut(&mut self) -> &mut ShapeStyle {
        &mut self.style
    }

    fn meta(&self) -> &ObjectMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut ObjectMeta {
        &mut self.meta
    }

    fn transform(&mut self, affine: Affine) {
        // Map all four corners and renormalize so rotations and mirrored
        // scales land the rectangle where its geometry actually went.
        let r = self.as_rect();
        let corners = [
            affine * Point::new(r.x0, r.y0),
            affine * Point::new(r.x1, r.y0),
            affine * Point::new(r.x1, r.y1),
            affine * Point::new(r.x0, r.y1),
        ];
        let mapped = corners
            .iter()
            .skip(1)
            .fold(Rect::from_points(corners[0], corners[0]), |b, p| {
                b.union_pt(*p)
            });
        self.position = mapped.origin();
        self.width = mapped.width();
        self.height = mapped.height();
    }

    fn rotation(&self) -> f64 {
        self.rotation
    }

    fn set_rotation(&mut self, rotation: f64) {
        self.rotation = rotation;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_corners_normalizes() {
        let rect = Rectangle::from_corners(Point::new(100.0, 100.0), Point::new(40.0, 60.0));
        assert!((rect.position.x - 40.0).abs() < f64::EPSILON);
        assert!((rect.position.y - 60.0).abs() < f64::EPSILON);
        assert!((rect.width - 60.0).abs() < f64::EPSILON);
        assert!((rect.height - 40.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_hit_test_outline_only() {
        let rect = Rectangle::new(Point::new(0.0, 0.0), 100.0, 100.0);
        // No fill: interior misses, border hits
        assert!(!rect.hit_test(Point::new(50.0, 50.0), 0.0));
        assert!(rect.hit_test(Point::new(0.0, 50.0), 2.0));
    }

    #[test]
    fn test_hit_test_filled() {
        let mut rect = Rectangle::new(Point::new(0.0, 0.0), 100.0, 100.0);
        rect.style.fill_color = Some(super::super::SerializableColor::white());
        assert!(rect.hit_test(Point::new(50.0, 50.0), 0.0));
        assert!(!rect.hit_test(Point::new(150.0, 50.0), 0.0));
    }

    #[test]
    fn test_translate() {
        let mut rect = Rectangle::new(Point::new(10.0, 20.0), 100.0, 50.0);
        rect.transform(Affine::translate(kurbo::Vec2::new(5.0, -5.0)));
        assert!((rect.position.x - 15.0).abs() < f64::EPSILON);
        assert!((rect.position.y - 15.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_half_turn_about_external_point_relocates_rect() {
        let mut rect = Rectangle::new(Point::new(0.0, 0.0), 50.0, 50.0);
        rect.transform(Affine::rotate_about(
            std::f64::consts::PI,
            Point::new(50.0, 25.0),
        ));
        let r = rect.as_rect();
        assert!((r.x0 - 50.0).abs() < 1e-9);
        assert!((r.x1 - 100.0).abs() < 1e-9);
        assert!((r.y0 - 0.0).abs() < 1e-9);
        assert!((r.y1 - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_quarter_turn_swaps_extents() {
        let mut rect = Rectangle::new(Point::new(0.0, 0.0), 100.0, 20.0);
        rect.transform(Affine::rotate_about(std::f64::consts::FRAC_PI_2, Point::ZERO));
        assert!((rect.width - 20.0).abs() < 1e-9);
        assert!((rect.height - 100.0).abs() < 1e-9);
    }
}
