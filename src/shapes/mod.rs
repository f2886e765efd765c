//! Drawable object definitions for the canvas document.

mod ellipse;
mod group;
mod image;
mod line;
mod path;
mod polygon;
mod rectangle;
mod text;

pub use ellipse::{Circle, Ellipse};
pub use group::Group;
pub use image::Image;
pub use line::{Arrow, Line};
pub use path::{Path, PathSeg};
pub use polygon::{Polygon, Star};
pub use rectangle::Rectangle;
pub use text::Text;

use kurbo::{Affine, BezPath, Point, Rect};
use peniko::Color;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for drawable objects.
pub type ShapeId = Uuid;

/// Serializable color representation (RGBA8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializableColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl SerializableColor {
    pub fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn black() -> Self {
        Self::new(0, 0, 0, 255)
    }

    pub fn white() -> Self {
        Self::new(255, 255, 255, 255)
    }

    pub fn transparent() -> Self {
        Self::new(0, 0, 0, 0)
    }
}

impl From<Color> for SerializableColor {
    fn from(color: Color) -> Self {
        let rgba = color.to_rgba8();
        Self {
            r: rgba.r,
            g: rgba.g,
            b: rgba.b,
            a: rgba.a,
        }
    }
}

impl From<SerializableColor> for Color {
    fn from(color: SerializableColor) -> Self {
        Color::from_rgba8(color.r, color.g, color.b, color.a)
    }
}

/// Paint properties shared by all drawable objects.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShapeStyle {
    /// Stroke color.
    pub stroke_color: SerializableColor,
    /// Stroke width.
    pub stroke_width: f64,
    /// Fill color (None = no fill).
    pub fill_color: Option<SerializableColor>,
    /// Overall opacity (0.0 = fully transparent, 1.0 = fully opaque).
    #[serde(default = "default_opacity")]
    pub opacity: f64,
}

fn default_opacity() -> f64 {
    1.0
}

impl ShapeStyle {
    /// Get the stroke color as a peniko Color.
    pub fn stroke(&self) -> Color {
        self.stroke_color.into()
    }

    /// Get the fill color as a peniko Color.
    pub fn fill(&self) -> Option<Color> {
        self.fill_color.map(|c| c.into())
    }

    /// Get the stroke color with opacity applied.
    pub fn stroke_with_opacity(&self) -> Color {
        apply_opacity(self.stroke_color, self.opacity).into()
    }

    /// Get the fill color with opacity applied.
    pub fn fill_with_opacity(&self) -> Option<Color> {
        self.fill_color.map(|c| apply_opacity(c, self.opacity).into())
    }
}

fn apply_opacity(color: SerializableColor, opacity: f64) -> SerializableColor {
    let a = (color.a as f64 * opacity.clamp(0.0, 1.0)) as u8;
    SerializableColor::new(color.r, color.g, color.b, a)
}

impl Default for ShapeStyle {
    fn default() -> Self {
        Self {
            stroke_color: SerializableColor::black(),
            stroke_width: 2.0,
            fill_color: None,
            opacity: 1.0,
        }
    }
}

fn default_true() -> bool {
    true
}

/// Interaction flags shared by all drawable objects.
///
/// `selectable` and `evented` are runtime state recomputed whenever the
/// active tool changes; they are never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ObjectMeta {
    /// Whether the object is rendered and hit-testable.
    #[serde(default = "default_true")]
    pub visible: bool,
    /// Locked objects cannot be selected or modified interactively.
    #[serde(default)]
    pub locked: bool,
    /// Whether the object can currently be selected.
    #[serde(skip, default = "default_true")]
    pub selectable: bool,
    /// Whether the object currently responds to pointer events.
    #[serde(skip, default = "default_true")]
    pub evented: bool,
    /// Non-owning back-reference to the owning group, for lookup only.
    #[serde(default)]
    pub parent: Option<ShapeId>,
}

impl Default for ObjectMeta {
    fn default() -> Self {
        Self {
            visible: true,
            locked: false,
            selectable: true,
            evented: true,
            parent: None,
        }
    }
}

/// Common trait implemented by every drawable object kind.
pub trait ShapeTrait {
    /// Get the unique identifier.
    fn id(&self) -> ShapeId;

    /// Replace the identifier. Only used when adopting externally
    /// authored nodes that arrive without one.
    fn set_id(&mut self, id: ShapeId);

    /// Get the bounding box in world coordinates.
    fn bounds(&self) -> Rect;

    /// Check if a point (in world coordinates) hits this object.
    fn hit_test(&self, point: Point, tolerance: f64) -> bool;

    /// Get the path representation for rendering.
    fn to_path(&self) -> BezPath;

    /// Get the style.
    fn style(&self) -> &ShapeStyle;

    /// Get mutable style.
    fn style_mut(&mut self) -> &mut ShapeStyle;

    /// Get the interaction flags.
    fn meta(&self) -> &ObjectMeta;

    /// Get mutable interaction flags.
    fn meta_mut(&mut self) -> &mut ObjectMeta;

    /// Apply a transform to this object.
    fn transform(&mut self, affine: Affine);

    /// Rotation angle in radians (0 for kinds without a rotation field).
    fn rotation(&self) -> f64 {
        0.0
    }

    /// Set the rotation angle. No-op for kinds without a rotation field.
    fn set_rotation(&mut self, _rotation: f64) {}
}

/// Closed sum type over all drawable object kinds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Shape {
    Rectangle(Rectangle),
    Ellipse(Ellipse),
    Circle(Circle),
    Line(Line),
    Arrow(Arrow),
    Polygon(Polygon),
    Star(Star),
    Path(Path),
    Text(Text),
    Image(Image),
    Group(Group),
}

impl Shape {
    fn as_dyn(&self) -> &dyn ShapeTrait {
        match self {
            Shape::Rectangle(s) => s,
            Shape::Ellipse(s) => s,
            Shape::Circle(s) => s,
            Shape::Line(s) => s,
            Shape::Arrow(s) => s,
            Shape::Polygon(s) => s,
            Shape::Star(s) => s,
            Shape::Path(s) => s,
            Shape::Text(s) => s,
            Shape::Image(s) => s,
            Shape::Group(s) => s,
        }
    }

    fn as_dyn_mut(&mut self) -> &mut dyn ShapeTrait {
        match self {
            Shape::Rectangle(s) => s,
            Shape::Ellipse(s) => s,
            Shape::Circle(s) => s,
            Shape::Line(s) => s,
            Shape::Arrow(s) => s,
            Shape::Polygon(s) => s,
            Shape::Star(s) => s,
            Shape::Path(s) => s,
            Shape::Text(s) => s,
            Shape::Image(s) => s,
            Shape::Group(s) => s,
        }
    }

    pub fn id(&self) -> ShapeId {
        self.as_dyn().id()
    }

    pub fn bounds(&self) -> Rect {
        self.as_dyn().bounds()
    }

    pub fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        self.as_dyn().hit_test(point, tolerance)
    }

    pub fn to_path(&self) -> BezPath {
        self.as_dyn().to_path()
    }

    pub fn style(&self) -> &ShapeStyle {
        self.as_dyn().style()
    }

    pub fn style_mut(&mut self) -> &mut ShapeStyle {
        self.as_dyn_mut().style_mut()
    }

    pub fn meta(&self) -> &ObjectMeta {
        self.as_dyn().meta()
    }

    pub fn meta_mut(&mut self) -> &mut ObjectMeta {
        self.as_dyn_mut().meta_mut()
    }

    pub fn transform(&mut self, affine: Affine) {
        self.as_dyn_mut().transform(affine);
    }

    pub fn rotation(&self) -> f64 {
        self.as_dyn().rotation()
    }

    pub fn set_rotation(&mut self, rotation: f64) {
        self.as_dyn_mut().set_rotation(rotation);
    }

    /// Human-readable kind name, used by the layer projection.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Shape::Rectangle(_) => "Rectangle",
            Shape::Ellipse(_) => "Ellipse",
            Shape::Circle(_) => "Circle",
            Shape::Line(_) => "Line",
            Shape::Arrow(_) => "Arrow",
            Shape::Polygon(_) => "Polygon",
            Shape::Star(_) => "Star",
            Shape::Path(_) => "Path",
            Shape::Text(_) => "Text",
            Shape::Image(_) => "Image",
            Shape::Group(_) => "Group",
        }
    }

    /// Whether this kind carries a rotation field.
    pub fn supports_rotation(&self) -> bool {
        matches!(
            self,
            Shape::Rectangle(_)
                | Shape::Ellipse(_)
                | Shape::Polygon(_)
                | Shape::Star(_)
                | Shape::Text(_)
                | Shape::Image(_)
                | Shape::Group(_)
        )
    }

    /// Whether this kind is stroke-first for color picking (eyedropper
    /// reads the stroke instead of the fill).
    pub fn is_line_like(&self) -> bool {
        match self {
            Shape::Line(_) | Shape::Arrow(_) => true,
            Shape::Path(p) => !p.closed,
            _ => false,
        }
    }

    pub fn is_group(&self) -> bool {
        matches!(self, Shape::Group(_))
    }

    pub fn as_group(&self) -> Option<&Group> {
        match self {
            Shape::Group(g) => Some(g),
            _ => None,
        }
    }

    pub fn as_group_mut(&mut self) -> Option<&mut Group> {
        match self {
            Shape::Group(g) => Some(g),
            _ => None,
        }
    }

    /// Assign a fresh unique identifier. Used when adopting imported
    /// nodes so ids are never reused across documents.
    pub fn regenerate_id(&mut self) {
        self.as_dyn_mut().set_id(Uuid::new_v4());
        if let Shape::Group(g) = self {
            let gid = g.id();
            for child in g.children_mut() {
                child.regenerate_id();
                child.meta_mut().parent = Some(gid);
            }
        }
    }

    /// Test if this object intersects a selection rectangle.
    /// Line-like kinds check actual segments; everything else checks
    /// bounding-box overlap.
    pub fn intersects_rect(&self, rect: Rect) -> bool {
        match self {
            Shape::Line(l) => segments_intersect_rect(&[l.start, l.end], rect),
            Shape::Arrow(a) => segments_intersect_rect(&[a.start, a.end], rect),
            _ => {
                let bounds = self.bounds();
                rect.intersect(bounds.inflate(1.0, 1.0)).area() > 0.0
            }
        }
    }
}

/// Distance from a point to a line segment (a-b).
pub fn point_to_segment_dist(point: Point, a: Point, b: Point) -> f64 {
    let seg = b - a;
    let pv = point - a;
    let len_sq = seg.hypot2();
    if len_sq < f64::EPSILON {
        return pv.hypot();
    }
    let t = (pv.dot(seg) / len_sq).clamp(0.0, 1.0);
    point.distance(a + seg * t)
}

/// Minimum distance from a point to a polyline.
pub fn point_to_polyline_dist(point: Point, points: &[Point]) -> f64 {
    points
        .windows(2)
        .map(|w| point_to_segment_dist(point, w[0], w[1]))
        .fold(f64::INFINITY, f64::min)
}

/// Even-odd test of a point against a closed polygon ring.
pub fn point_in_polygon(point: Point, ring: &[Point]) -> bool {
    let mut inside = false;
    let n = ring.len();
    let mut j = n.wrapping_sub(1);
    for i in 0..n {
        let (a, b) = (ring[i], ring[j]);
        if (a.y > point.y) != (b.y > point.y) {
            let x = a.x + (point.y - a.y) / (b.y - a.y) * (b.x - a.x);
            if point.x < x {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

/// Test if any segment of a polyline crosses or sits inside a rectangle.
fn segments_intersect_rect(points: &[Point], rect: Rect) -> bool {
    if points.iter().any(|p| rect.contains(*p)) {
        return true;
    }
    let corners = [
        Point::new(rect.x0, rect.y0),
        Point::new(rect.x1, rect.y0),
        Point::new(rect.x1, rect.y1),
        Point::new(rect.x0, rect.y1),
    ];
    let edges = [
        (corners[0], corners[1]),
        (corners[1], corners[2]),
        (corners[2], corners[3]),
        (corners[3], corners[0]),
    ];
    points.windows(2).any(|w| {
        edges
            .iter()
            .any(|&(c, d)| segments_cross(w[0], w[1], c, d))
    })
}

fn segments_cross(a: Point, b: Point, c: Point, d: Point) -> bool {
    let cross = |o: Point, p: Point, q: Point| (p.x - o.x) * (q.y - o.y) - (p.y - o.y) * (q.x - o.x);
    let d1 = cross(c, d, a);
    let d2 = cross(c, d, b);
    let d3 = cross(a, b, c);
    let d4 = cross(a, b, d);
    ((d1 > 0.0) != (d2 > 0.0)) && ((d3 > 0.0) != (d4 > 0.0))
}
