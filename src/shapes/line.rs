//! Line and arrow shapes.

use super::{ObjectMeta, ShapeId, ShapeStyle, ShapeTrait, point_to_segment_dist};
use kurbo::{Affine, BezPath, Point, Rect, Vec2};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A straight line segment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Line {
    pub(crate) id: ShapeId,
    pub start: Point,
    pub end: Point,
    pub style: ShapeStyle,
    #[serde(default)]
    pub meta: ObjectMeta,
}

impl Line {
    pub fn new(start: Point, end: Point) -> Self {
        Self {
            id: Uuid::new_v4(),
            start,
            end,
            style: ShapeStyle::default(),
            meta: ObjectMeta::default(),
        }
    }
}

impl ShapeTrait for Line {
    fn id(&self) -> ShapeId {
        self.id
    }

    fn set_id(&mut self, id: ShapeId) {
        self.id = id;
    }

    fn bounds(&self) -> Rect {
        Rect::from_points(self.start, self.end)
    }

    fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        point_to_segment_dist(point, self.start, self.end)
            <= tolerance + self.style.stroke_width / 2.0
    }

    fn to_path(&self) -> BezPath {
        let mut path = BezPath::new();
        path.move_to(self.start);
        path.line_to(self.end);
        path
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
        self.start = affine * self.start;
        self.end = affine * self.end;
    }
}

/// A line segment with an arrowhead at the end point.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Arrow {
    pub(crate) id: ShapeId,
    pub start: Point,
    pub end: Point,
    /// Length of the arrowhead barbs.
    #[serde(default = "default_head_size")]
    pub head_size: f64,
    pub style: ShapeStyle,
    #[serde(default)]
    pub meta: ObjectMeta,
}

fn default_head_size() -> f64 {
    12.0
}

impl Arrow {
    pub fn new(start: Point, end: Point) -> Self {
        Self {
            id: Uuid::new_v4(),
            start,
            end,
            head_size: default_head_size(),
            style: ShapeStyle::default(),
            meta: ObjectMeta::default(),
        }
    }

    /// The two barb endpoints of the arrowhead.
    pub fn head_points(&self) -> (Point, Point) {
        let dir = self.end - self.start;
        let len = dir.hypot();
        if len < f64::EPSILON {
            return (self.end, self.end);
        }
        let unit = dir * (1.0 / len);
        // 30 degrees off the shaft on each side
        let angle = std::f64::consts::PI / 6.0;
        let (sin, cos) = angle.sin_cos();
        let rotate = |v: Vec2, s: f64| Vec2::new(v.x * cos - v.y * s, v.x * s + v.y * cos);
        let left = rotate(unit, sin);
        let right = rotate(unit, -sin);
        (
            self.end - left * self.head_size,
            self.end - right * self.head_size,
        )
    }
}

impl ShapeTrait for Arrow {
    fn id(&self) -> ShapeId {
        self.id
    }

    fn set_id(&mut self, id: ShapeId) {
        self.id = id;
    }

    fn bounds(&self) -> Rect {
        let (l, r) = self.head_points();
        Rect::from_points(self.start, self.end)
            .union_pt(l)
            .union_pt(r)
    }

    fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        point_to_segment_dist(point, self.start, self.end)
            <= tolerance + self.style.stroke_width / 2.0
    }

    fn to_path(&self) -> BezPath {
        let mut path = BezPath::new();
        path.move_to(self.start);
        path.line_to(self.end);
        let (l, r) = self.head_points();
        path.move_to(l);
        path.line_to(self.end);
        path.line_to(r);
        path
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
        self.start = affine * self.start;
        self.end = affine * self.end;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_hit() {
        let line = Line::new(Point::new(0.0, 0.0), Point::new(100.0, 0.0));
        assert!(line.hit_test(Point::new(50.0, 3.0), 3.0));
        assert!(!line.hit_test(Point::new(50.0, 20.0), 3.0));
    }

    #[test]
    fn test_line_bounds_orientation() {
        let line = Line::new(Point::new(100.0, 50.0), Point::new(10.0, 80.0));
        let b = line.bounds();
        assert!((b.x0 - 10.0).abs() < f64::EPSILON);
        assert!((b.y0 - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_arrow_head_points_behind_tip() {
        let arrow = Arrow::new(Point::new(0.0, 0.0), Point::new(100.0, 0.0));
        let (l, r) = arrow.head_points();
        assert!(l.x < 100.0 && r.x < 100.0);
        assert!(l.y != r.y);
    }

    #[test]
    fn test_arrow_degenerate() {
        let arrow = Arrow::new(Point::new(5.0, 5.0), Point::new(5.0, 5.0));
        let (l, r) = arrow.head_points();
        assert_eq!(l, arrow.end);
        assert_eq!(r, arrow.end);
    }
}
