//! Group shape: an owning container of child objects.

use super::{ObjectMeta, Shape, ShapeId, ShapeStyle, ShapeTrait};
use kurbo::{Affine, BezPath, Point, Rect};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An object that owns other objects. Children keep absolute (world)
/// coordinates; only the group's rotation is applied on top, around the
/// union bounds center.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Group {
    pub(crate) id: ShapeId,
    children: Vec<Shape>,
    /// Rotation angle in radians (around the union bounds center).
    #[serde(default)]
    pub rotation: f64,
    pub style: ShapeStyle,
    #[serde(default)]
    pub meta: ObjectMeta,
}

impl Group {
    /// Build a group from existing shapes. Each child's parent
    /// back-reference is pointed at the new group.
    pub fn new(mut children: Vec<Shape>) -> Self {
        let id = Uuid::new_v4();
        for child in &mut children {
            child.meta_mut().parent = Some(id);
        }
        Self {
            id,
            children,
            rotation: 0.0,
            style: ShapeStyle::default(),
            meta: ObjectMeta::default(),
        }
    }

    pub fn children(&self) -> &[Shape] {
        &self.children
    }

    pub fn children_mut(&mut self) -> &mut [Shape] {
        &mut self.children
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    pub fn child(&self, id: ShapeId) -> Option<&Shape> {
        self.children.iter().find(|c| c.id() == id)
    }

    pub fn child_mut(&mut self, id: ShapeId) -> Option<&mut Shape> {
        self.children.iter_mut().find(|c| c.id() == id)
    }

    /// Union of child bounds before the group rotation is applied.
    fn local_bounds(&self) -> Rect {
        let mut iter = self.children.iter().filter(|c| c.meta().visible);
        let first = match iter.next() {
            Some(c) => c.bounds(),
            None => return Rect::ZERO,
        };
        iter.fold(first, |r, c| r.union(c.bounds()))
    }

    /// Map a world point into the group's unrotated local space.
    fn to_local(&self, point: Point) -> Point {
        if self.rotation == 0.0 {
            return point;
        }
        Affine::rotate_about(-self.rotation, self.local_bounds().center()) * point
    }

    /// The topmost child hit at a world point, in the group's local space.
    pub fn child_at(&self, point: Point, tolerance: f64) -> Option<&Shape> {
        let local = self.to_local(point);
        self.children
            .iter()
            .rev()
            .find(|c| c.meta().visible && c.hit_test(local, tolerance))
    }

    /// Dissolve the group: bake the group rotation into the children and
    /// clear their parent back-references. Consumes the group.
    pub fn into_children(self) -> Vec<Shape> {
        let rotation = self.rotation;
        let center = self.local_bounds().center();
        let mut children = self.children;
        for child in &mut children {
            child.meta_mut().parent = None;
            if rotation != 0.0 {
                child.transform(Affine::rotate_about(rotation, center));
            }
        }
        children
    }
}

impl ShapeTrait for Group {
    fn id(&self) -> ShapeId {
        self.id
    }

    fn set_id(&mut self, id: ShapeId) {
        self.id = id;
    }

    fn bounds(&self) -> Rect {
        let local = self.local_bounds();
        if self.rotation == 0.0 {
            return local;
        }
        // Bounding box of the rotated corners
        let rot = Affine::rotate_about(self.rotation, local.center());
        let corners = [
            rot * Point::new(local.x0, local.y0),
            rot * Point::new(local.x1, local.y0),
            rot * Point::new(local.x1, local.y1),
            rot * Point::new(local.x0, local.y1),
        ];
        corners
            .iter()
            .skip(1)
            .fold(Rect::from_points(corners[0], corners[0]), |r, p| {
                r.union_pt(*p)
            })
    }

    fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        self.child_at(point, tolerance).is_some()
    }

    fn to_path(&self) -> BezPath {
        let mut path = BezPath::new();
        for child in &self.children {
            path.extend(child.to_path().elements().iter().copied());
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
        for child in &mut self.children {
            child.transform(affine);
        }
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
    use super::super::{Circle, Rectangle};
    use super::*;

    fn sample_group() -> Group {
        Group::new(vec![
            Shape::Rectangle(Rectangle::new(Point::new(0.0, 0.0), 50.0, 50.0)),
            Shape::Circle(Circle::new(Point::new(100.0, 25.0), 25.0)),
        ])
    }

    #[test]
    fn test_children_get_parent_ref() {
        let group = sample_group();
        for child in group.children() {
            assert_eq!(child.meta().parent, Some(group.id));
        }
    }

    #[test]
    fn test_bounds_union() {
        let group = sample_group();
        let b = group.bounds();
        assert!((b.x0 - 0.0).abs() < f64::EPSILON);
        assert!((b.x1 - 125.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_child_at_topmost_first() {
        let group = Group::new(vec![
            Shape::Rectangle(Rectangle::new(Point::new(0.0, 0.0), 50.0, 50.0)),
            Shape::Rectangle(Rectangle::new(Point::new(0.0, 0.0), 50.0, 50.0)),
        ]);
        let expected = group.children()[1].id();
        let hit = group.child_at(Point::new(0.0, 25.0), 2.0).unwrap();
        assert_eq!(hit.id(), expected);
    }

    #[test]
    fn test_rotated_child_at_uses_local_space() {
        let mut group = Group::new(vec![Shape::Rectangle(Rectangle::new(
            Point::new(0.0, 0.0),
            100.0,
            10.0,
        ))]);
        group.rotation = std::f64::consts::FRAC_PI_2;
        // The rectangle border is now vertical in world space
        let center = Point::new(50.0, 5.0);
        let world = Affine::rotate_about(group.rotation, center) * Point::new(0.0, 5.0);
        assert!(group.child_at(world, 2.0).is_some());
    }

    #[test]
    fn test_into_children_clears_parent_and_bakes_rotation() {
        let mut group = sample_group();
        group.rotation = std::f64::consts::PI;
        let before = group.bounds();
        let children = group.into_children();
        for child in &children {
            assert!(child.meta().parent.is_none());
        }
        // After baking a half-turn the union bounds stay put
        let union = children
            .iter()
            .skip(1)
            .fold(children[0].bounds(), |r, c| r.union(c.bounds()));
        assert!((union.center().x - before.center().x).abs() < 1e-9);
        assert!((union.center().y - before.center().y).abs() < 1e-9);
    }
}
