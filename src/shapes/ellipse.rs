//! Ellipse and circle shapes.

use super::{ObjectMeta, ShapeId, ShapeStyle, ShapeTrait};
use kurbo::{Affine, BezPath, Point, Rect, Shape as KurboShape, Vec2};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An axis-aligned ellipse defined by center and radii.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ellipse {
    pub(crate) id: ShapeId,
    pub center: Point,
    pub radius_x: f64,
    pub radius_y: f64,
    /// Rotation angle in radians (around center).
    #[serde(default)]
    pub rotation: f64,
    pub style: ShapeStyle,
    #[serde(default)]
    pub meta: ObjectMeta,
}

impl Ellipse {
    pub fn new(center: Point, radius_x: f64, radius_y: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            center,
            radius_x,
            radius_y,
            rotation: 0.0,
            style: ShapeStyle::default(),
            meta: ObjectMeta::default(),
        }
    }

    /// Create an ellipse inscribed in the rectangle spanned by two corners.
    pub fn from_corners(p1: Point, p2: Point) -> Self {
        Self::new(
            Point::new((p1.x + p2.x) / 2.0, (p1.y + p2.y) / 2.0),
            (p2.x - p1.x).abs() / 2.0,
            (p2.y - p1.y).abs() / 2.0,
        )
    }

    fn as_kurbo(&self) -> kurbo::Ellipse {
        kurbo::Ellipse::new(self.center, Vec2::new(self.radius_x, self.radius_y), 0.0)
    }

    /// Normalized radial distance: 1.0 lands exactly on the outline.
    fn radial(&self, point: Point) -> f64 {
        if self.radius_x < f64::EPSILON || self.radius_y < f64::EPSILON {
            return f64::INFINITY;
        }
        let dx = (point.x - self.center.x) / self.radius_x;
        let dy = (point.y - self.center.y) / self.radius_y;
        (dx * dx + dy * dy).sqrt()
    }
}

impl ShapeTrait for Ellipse {
    fn id(&self) -> ShapeId {
        self.id
    }

    fn set_id(&mut self, id: ShapeId) {
        self.id = id;
    }

    fn bounds(&self) -> Rect {
        Rect::new(
            self.center.x - self.radius_x,
            self.center.y - self.radius_y,
            self.center.x + self.radius_x,
            self.center.y + self.radius_y,
        )
    }

    fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        let r = self.radial(point);
        if self.style.fill_color.is_some() {
            // Filled: anywhere inside, padded by the tolerance
            let pad = tolerance / self.radius_x.min(self.radius_y).max(f64::EPSILON);
            return r <= 1.0 + pad;
        }
        // Outline only: within a band around the rim
        let band = (tolerance + self.style.stroke_width / 2.0)
            / self.radius_x.min(self.radius_y).max(f64::EPSILON);
        (r - 1.0).abs() <= band
    }

    fn to_path(&self) -> BezPath {
        self.as_kurbo().to_path(0.1)
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
        self.center = affine * self.center;
        let coeffs = affine.as_coeffs();
        self.radius_x *= coeffs[0].abs();
        self.radius_y *= coeffs[3].abs();
    }

    fn rotation(&self) -> f64 {
        self.rotation
    }

    fn set_rotation(&mut self, rotation: f64) {
        self.rotation = rotation;
    }
}

/// A circle defined by center and a single radius.
///
/// Kept distinct from [`Ellipse`] so the circle tool's gesture (radius =
/// half the press-to-release distance, centered at the press point) stays
/// a circle under later edits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Circle {
    pub(crate) id: ShapeId,
    pub center: Point,
    pub radius: f64,
    pub style: ShapeStyle,
    #[serde(default)]
    pub meta: ObjectMeta,
}

impl Circle {
    pub fn new(center: Point, radius: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            center,
            radius,
            style: ShapeStyle::default(),
            meta: ObjectMeta::default(),
        }
    }
}

impl ShapeTrait for Circle {
    fn id(&self) -> ShapeId {
        self.id
    }

    fn set_id(&mut self, id: ShapeId) {
        self.id = id;
    }

    fn bounds(&self) -> Rect {
        Rect::new(
            self.center.x - self.radius,
            self.center.y - self.radius,
            self.center.x + self.radius,
            self.center.y + self.radius,
        )
    }

    fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        let d = self.center.distance(point);
        if self.style.fill_color.is_some() {
            return d <= self.radius + tolerance;
        }
        (d - self.radius).abs() <= tolerance + self.style.stroke_width / 2.0
    }

    fn to_path(&self) -> BezPath {
        kurbo::Circle::new(self.center, self.radius).to_path(0.1)
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
        self.center = affine * self.center;
        let coeffs = affine.as_coeffs();
        self.radius *= coeffs[0].abs().max(coeffs[3].abs());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ellipse_from_corners() {
        let e = Ellipse::from_corners(Point::new(0.0, 0.0), Point::new(100.0, 60.0));
        assert!((e.center.x - 50.0).abs() < f64::EPSILON);
        assert!((e.center.y - 30.0).abs() < f64::EPSILON);
        assert!((e.radius_x - 50.0).abs() < f64::EPSILON);
        assert!((e.radius_y - 30.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_ellipse_hit_outline() {
        let e = Ellipse::new(Point::new(0.0, 0.0), 50.0, 30.0);
        assert!(e.hit_test(Point::new(50.0, 0.0), 2.0));
        assert!(!e.hit_test(Point::new(0.0, 0.0), 2.0));
    }

    #[test]
    fn test_circle_hit_filled() {
        let mut c = Circle::new(Point::new(0.0, 0.0), 40.0);
        c.style.fill_color = Some(super::super::SerializableColor::black());
        assert!(c.hit_test(Point::new(10.0, 10.0), 0.0));
        assert!(!c.hit_test(Point::new(50.0, 0.0), 2.0));
    }

    #[test]
    fn test_circle_bounds() {
        let c = Circle::new(Point::new(10.0, 10.0), 5.0);
        let b = c.bounds();
        assert!((b.width() - 10.0).abs() < f64::EPSILON);
        assert!((b.height() - 10.0).abs() < f64::EPSILON);
    }
}
