//! Regular polygon and star shapes.

use super::{
    ObjectMeta, ShapeId, ShapeStyle, ShapeTrait, point_in_polygon, point_to_polyline_dist,
};
use kurbo::{Affine, BezPath, Point, Rect};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use uuid::Uuid;

/// A regular polygon defined by center, circumradius and side count.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Polygon {
    pub(crate) id: ShapeId,
    pub center: Point,
    pub radius: f64,
    pub sides: u32,
    /// Rotation angle in radians (around center).
    #[serde(default)]
    pub rotation: f64,
    pub style: ShapeStyle,
    #[serde(default)]
    pub meta: ObjectMeta,
}

impl Polygon {
    pub fn new(center: Point, radius: f64, sides: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            center,
            radius: radius.max(0.0),
            sides: sides.max(3),
            rotation: 0.0,
            style: ShapeStyle::default(),
            meta: ObjectMeta::default(),
        }
    }

    /// Vertex ring, first vertex pointing up.
    pub fn ring(&self) -> Vec<Point> {
        let n = self.sides as usize;
        (0..n)
            .map(|i| {
                let angle = self.rotation + 2.0 * PI * i as f64 / n as f64 - PI / 2.0;
                Point::new(
                    self.center.x + self.radius * angle.cos(),
                    self.center.y + self.radius * angle.sin(),
                )
            })
            .collect()
    }
}

impl ShapeTrait for Polygon {
    fn id(&self) -> ShapeId {
        self.id
    }

    fn set_id(&mut self, id: ShapeId) {
        self.id = id;
    }

    fn bounds(&self) -> Rect {
        ring_bounds(&self.ring())
    }

    fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        ring_hit_test(
            &self.ring(),
            point,
            tolerance + self.style.stroke_width / 2.0,
            self.style.fill_color.is_some(),
        )
    }

    fn to_path(&self) -> BezPath {
        ring_to_path(&self.ring())
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

    fn rotation(&self) -> f64 {
        self.rotation
    }

    fn set_rotation(&mut self, rotation: f64) {
        self.rotation = rotation;
    }
}

/// A star defined by center, outer/inner radii and point count.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Star {
    pub(crate) id: ShapeId,
    pub center: Point,
    pub outer_radius: f64,
    pub inner_radius: f64,
    pub points: u32,
    /// Rotation angle in radians (around center).
    #[serde(default)]
    pub rotation: f64,
    pub style: ShapeStyle,
    #[serde(default)]
    pub meta: ObjectMeta,
}

impl Star {
    pub fn new(center: Point, outer_radius: f64, points: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            center,
            outer_radius: outer_radius.max(0.0),
            inner_radius: outer_radius.max(0.0) / 2.0,
            points: points.max(3),
            rotation: 0.0,
            style: ShapeStyle::default(),
            meta: ObjectMeta::default(),
        }
    }

    /// Vertex ring alternating outer and inner radii, first point up.
    pub fn ring(&self) -> Vec<Point> {
        let n = self.points as usize * 2;
        (0..n)
            .map(|i| {
                let r = if i % 2 == 0 {
                    self.outer_radius
                } else {
                    self.inner_radius
                };
                let angle = self.rotation + PI * i as f64 / self.points as f64 - PI / 2.0;
                Point::new(
                    self.center.x + r * angle.cos(),
                    self.center.y + r * angle.sin(),
                )
            })
            .collect()
    }
}

impl ShapeTrait for Star {
    fn id(&self) -> ShapeId {
        self.id
    }

    fn set_id(&mut self, id: ShapeId) {
        self.id = id;
    }

    fn bounds(&self) -> Rect {
        ring_bounds(&self.ring())
    }

    fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        ring_hit_test(
            &self.ring(),
            point,
            tolerance + self.style.stroke_width / 2.0,
            self.style.fill_color.is_some(),
        )
    }

    fn to_path(&self) -> BezPath {
        ring_to_path(&self.ring())
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
        let scale = coeffs[0].abs().max(coeffs[3].abs());
        self.outer_radius *= scale;
        self.inner_radius *= scale;
    }

    fn rotation(&self) -> f64 {
        self.rotation
    }

    fn set_rotation(&mut self, rotation: f64) {
        self.rotation = rotation;
    }
}

fn ring_bounds(ring: &[Point]) -> Rect {
    let mut iter = ring.iter();
    let first = match iter.next() {
        Some(p) => *p,
        None => return Rect::ZERO,
    };
    iter.fold(Rect::from_points(first, first), |r, p| r.union_pt(*p))
}

fn ring_to_path(ring: &[Point]) -> BezPath {
    let mut path = BezPath::new();
    if let Some((first, rest)) = ring.split_first() {
        path.move_to(*first);
        for p in rest {
            path.line_to(*p);
        }
        path.close_path();
    }
    path
}

fn ring_hit_test(ring: &[Point], point: Point, tolerance: f64, filled: bool) -> bool {
    if filled && point_in_polygon(point, ring) {
        return true;
    }
    let mut closed: Vec<Point> = ring.to_vec();
    if let Some(first) = ring.first() {
        closed.push(*first);
    }
    point_to_polyline_dist(point, &closed) <= tolerance
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_polygon_ring_count() {
        let p = Polygon::new(Point::new(0.0, 0.0), 50.0, 6);
        assert_eq!(p.ring().len(), 6);
    }

    #[test]
    fn test_polygon_first_vertex_up() {
        let p = Polygon::new(Point::new(0.0, 0.0), 50.0, 5);
        let ring = p.ring();
        assert!((ring[0].x - 0.0).abs() < 1e-9);
        assert!((ring[0].y + 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_polygon_min_sides() {
        let p = Polygon::new(Point::new(0.0, 0.0), 50.0, 1);
        assert_eq!(p.sides, 3);
    }

    #[test]
    fn test_star_ring_alternates() {
        let s = Star::new(Point::new(0.0, 0.0), 50.0, 5);
        let ring = s.ring();
        assert_eq!(ring.len(), 10);
        let d0 = ring[0].distance(Point::new(0.0, 0.0));
        let d1 = ring[1].distance(Point::new(0.0, 0.0));
        assert!((d0 - 50.0).abs() < 1e-9);
        assert!((d1 - 25.0).abs() < 1e-9);
    }

    #[test]
    fn test_filled_polygon_interior_hit() {
        let mut p = Polygon::new(Point::new(0.0, 0.0), 50.0, 8);
        p.style.fill_color = Some(super::super::SerializableColor::black());
        assert!(p.hit_test(Point::new(0.0, 0.0), 0.0));
        assert!(!p.hit_test(Point::new(80.0, 0.0), 2.0));
    }
}
