//! Freeform path shape: freehand strokes and pen-built bezier paths.

use super::{ObjectMeta, ShapeId, ShapeStyle, ShapeTrait, point_in_polygon};
use kurbo::{Affine, BezPath, PathEl, Point, Rect, Shape as KurboShape};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One segment of a [`Path`], relative to the previous on-curve point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PathSeg {
    /// Straight segment to `to`.
    Line { to: Point },
    /// Cubic bezier segment with control points `c1`, `c2` ending at `to`.
    Cubic { c1: Point, c2: Point, to: Point },
}

impl PathSeg {
    pub fn end(&self) -> Point {
        match self {
            PathSeg::Line { to } => *to,
            PathSeg::Cubic { to, .. } => *to,
        }
    }
}

/// A path built from line and cubic segments, open or closed.
///
/// Both the freehand tool (polyline of sampled points) and the pen tool
/// (anchor/handle construction) produce this shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Path {
    pub(crate) id: ShapeId,
    pub start: Point,
    pub segments: Vec<PathSeg>,
    /// Closed paths connect the last segment back to `start` and can
    /// carry a fill.
    #[serde(default)]
    pub closed: bool,
    pub style: ShapeStyle,
    #[serde(default)]
    pub meta: ObjectMeta,
}

impl Path {
    pub fn new(start: Point, segments: Vec<PathSeg>, closed: bool) -> Self {
        Self {
            id: Uuid::new_v4(),
            start,
            segments,
            closed,
            style: ShapeStyle::default(),
            meta: ObjectMeta::default(),
        }
    }

    /// Build an open polyline path from sampled points (freehand tool).
    pub fn from_points(points: &[Point]) -> Option<Self> {
        let (first, rest) = points.split_first()?;
        if rest.is_empty() {
            return None;
        }
        let segments = rest.iter().map(|p| PathSeg::Line { to: *p }).collect();
        Some(Self::new(*first, segments, false))
    }

    /// Flatten to a polyline for hit testing.
    fn flattened(&self) -> Vec<Point> {
        let mut points = vec![self.start];
        kurbo::flatten(self.to_path(), 0.25, |el| match el {
            PathEl::MoveTo(p) | PathEl::LineTo(p) => points.push(p),
            PathEl::ClosePath => points.push(self.start),
            _ => {}
        });
        points
    }
}

impl ShapeTrait for Path {
    fn id(&self) -> ShapeId {
        self.id
    }

    fn set_id(&mut self, id: ShapeId) {
        self.id = id;
    }

    fn bounds(&self) -> Rect {
        self.to_path().bounding_box()
    }

    fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        let flat = self.flattened();
        if self.closed && self.style.fill_color.is_some() && point_in_polygon(point, &flat) {
            return true;
        }
        super::point_to_polyline_dist(point, &flat)
            <= tolerance + self.style.stroke_width / 2.0
    }

    fn to_path(&self) -> BezPath {
        let mut path = BezPath::new();
        path.move_to(self.start);
        for seg in &self.segments {
            match *seg {
                PathSeg::Line { to } => path.line_to(to),
                PathSeg::Cubic { c1, c2, to } => path.curve_to(c1, c2, to),
            }
        }
        if self.closed {
            path.close_path();
        }
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
        for seg in &mut self.segments {
            match seg {
                PathSeg::Line { to } => *to = affine * *to,
                PathSeg::Cubic { c1, c2, to } => {
                    *c1 = affine * *c1;
                    *c2 = affine * *c2;
                    *to = affine * *to;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_points_requires_two() {
        assert!(Path::from_points(&[]).is_none());
        assert!(Path::from_points(&[Point::ZERO]).is_none());
        assert!(Path::from_points(&[Point::ZERO, Point::new(10.0, 0.0)]).is_some());
    }

    #[test]
    fn test_open_path_hit() {
        let path = Path::from_points(&[
            Point::new(0.0, 0.0),
            Point::new(50.0, 0.0),
            Point::new(50.0, 50.0),
        ])
        .unwrap();
        assert!(path.hit_test(Point::new(25.0, 2.0), 2.0));
        assert!(!path.hit_test(Point::new(25.0, 25.0), 2.0));
    }

    #[test]
    fn test_closed_path_connects_back() {
        let path = Path::new(
            Point::new(0.0, 0.0),
            vec![
                PathSeg::Line {
                    to: Point::new(100.0, 0.0),
                },
                PathSeg::Line {
                    to: Point::new(100.0, 100.0),
                },
                PathSeg::Line {
                    to: Point::new(0.0, 0.0),
                },
            ],
            true,
        );
        assert_eq!(path.segments.len(), 3);
        assert!(path.closed);
        // The closing edge (back along the hypotenuse) is hittable
        assert!(path.hit_test(Point::new(50.0, 50.0), 2.0));
    }

    #[test]
    fn test_cubic_bounds_cover_curve() {
        let path = Path::new(
            Point::new(0.0, 0.0),
            vec![PathSeg::Cubic {
                c1: Point::new(0.0, 100.0),
                c2: Point::new(100.0, 100.0),
                to: Point::new(100.0, 0.0),
            }],
            false,
        );
        let b = path.bounds();
        assert!(b.height() > 50.0);
    }

    #[test]
    fn test_transform_moves_controls() {
        let mut path = Path::new(
            Point::new(0.0, 0.0),
            vec![PathSeg::Cubic {
                c1: Point::new(10.0, 10.0),
                c2: Point::new(20.0, 10.0),
                to: Point::new(30.0, 0.0),
            }],
            false,
        );
        path.transform(Affine::translate(kurbo::Vec2::new(5.0, 0.0)));
        match path.segments[0] {
            PathSeg::Cubic { c1, .. } => assert!((c1.x - 15.0).abs() < f64::EPSILON),
            _ => panic!("expected cubic"),
        }
    }
}
