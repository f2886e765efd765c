//! Tool system: active tool, gesture state, shape construction.

use crate::document::Document;
use crate::shapes::{
    Arrow, Circle, Ellipse, Line, Path, Polygon, Rectangle, Shape, ShapeStyle, Star, Text,
};
use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Radius of a polygon or star placed with a click.
pub const POLYGON_DEFAULT_RADIUS: f64 = 50.0;

/// Corner radius applied by the rounded-rectangle tool.
pub const ROUNDED_CORNER_RADIUS: f64 = 12.0;

/// Available tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ToolKind {
    /// Click-select and move objects.
    #[default]
    Select,
    /// Select with a drag-out marquee rectangle.
    RubberBand,
    Rectangle,
    RoundedRect,
    Ellipse,
    Circle,
    Line,
    Arrow,
    Polygon,
    Star,
    Freehand,
    Pen,
    Text,
    Eyedropper,
    PaintBucket,
    Eraser,
    Pan,
    Zoom,
}

impl ToolKind {
    /// Whether this tool creates objects by press-drag-release.
    pub fn is_drawing_tool(self) -> bool {
        matches!(
            self,
            ToolKind::Rectangle
                | ToolKind::RoundedRect
                | ToolKind::Ellipse
                | ToolKind::Circle
                | ToolKind::Line
                | ToolKind::Arrow
                | ToolKind::Polygon
                | ToolKind::Star
                | ToolKind::Freehand
        )
    }
}

/// Pointer cursor the host should display for a tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CursorStyle {
    Default,
    Crosshair,
    Text,
    Grab,
    ZoomIn,
    Picker,
}

impl ToolKind {
    pub fn cursor(self) -> CursorStyle {
        match self {
            ToolKind::Select | ToolKind::RubberBand => CursorStyle::Default,
            ToolKind::Text => CursorStyle::Text,
            ToolKind::Pan => CursorStyle::Grab,
            ToolKind::Zoom => CursorStyle::ZoomIn,
            ToolKind::Eyedropper | ToolKind::PaintBucket => CursorStyle::Picker,
            _ => CursorStyle::Crosshair,
        }
    }
}

/// State of a tool interaction.
#[derive(Debug, Clone, Default)]
pub enum ToolState {
    /// Tool is idle, waiting for interaction.
    #[default]
    Idle,
    /// Tool is actively being used (e.g. dragging out a shape).
    Active {
        /// Starting point of the interaction (world coordinates).
        start: Point,
        /// Current point of the interaction.
        current: Point,
    },
}

/// Manages the current tool and its gesture state.
#[derive(Debug, Clone)]
pub struct ToolManager {
    /// Currently selected tool.
    pub current_tool: ToolKind,
    /// Current state of the tool.
    pub state: ToolState,
    /// Accumulated points for freehand drawing.
    freehand_points: Vec<Point>,
    /// Side count for new polygons.
    pub polygon_sides: u32,
    /// Point count for new stars.
    pub star_points: u32,
    /// Style applied to new shapes.
    pub current_style: ShapeStyle,
}

impl Default for ToolManager {
    fn default() -> Self {
        Self {
            current_tool: ToolKind::default(),
            state: ToolState::default(),
            freehand_points: Vec::new(),
            polygon_sides: 5,
            star_points: 5,
            current_style: ShapeStyle::default(),
        }
    }
}

impl ToolManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Switch tools, abandoning any interaction in progress.
    pub fn set_tool(&mut self, tool: ToolKind) {
        self.current_tool = tool;
        self.cancel();
    }

    /// Begin a tool interaction.
    pub fn begin(&mut self, point: Point) {
        if self.current_tool == ToolKind::Freehand {
            self.freehand_points.clear();
            self.freehand_points.push(point);
        }
        self.state = ToolState::Active {
            start: point,
            current: point,
        };
    }

    /// Update the current interaction with a new pointer position.
    pub fn update(&mut self, point: Point) {
        if let ToolState::Active { current, .. } = &mut self.state {
            *current = point;
            if self.current_tool == ToolKind::Freehand {
                self.freehand_points.push(point);
            }
        }
    }

    /// End the current interaction and return any created shape.
    pub fn end(&mut self, point: Point) -> Option<Shape> {
        let ToolState::Active { start, .. } = self.state else {
            return None;
        };
        if self.current_tool == ToolKind::Freehand {
            self.freehand_points.push(point);
        }
        let shape = self.create_shape(start, point);
        self.state = ToolState::Idle;
        self.freehand_points.clear();
        shape
    }

    /// Cancel the current interaction.
    pub fn cancel(&mut self) {
        self.state = ToolState::Idle;
        self.freehand_points.clear();
    }

    /// Check if a tool interaction is active.
    pub fn is_active(&self) -> bool {
        matches!(self.state, ToolState::Active { .. })
    }

    /// Preview shape for the interaction in progress. Lives here, not in
    /// the document: previews are never selectable and never hit history.
    pub fn preview_shape(&self) -> Option<Shape> {
        let ToolState::Active { start, current } = self.state else {
            return None;
        };
        self.create_shape(start, current)
    }

    pub fn freehand_points(&self) -> &[Point] {
        &self.freehand_points
    }

    /// Construct the shape a drawing tool produces for a gesture from
    /// `start` to `end`. Non-drawing tools produce nothing.
    fn create_shape(&self, start: Point, end: Point) -> Option<Shape> {
        let mut shape = match self.current_tool {
            ToolKind::Rectangle => Some(Shape::Rectangle(Rectangle::from_corners(start, end))),
            ToolKind::RoundedRect => {
                let mut rect = Rectangle::from_corners(start, end);
                rect.corner_radius = ROUNDED_CORNER_RADIUS;
                Some(Shape::Rectangle(rect))
            }
            ToolKind::Ellipse => Some(Shape::Ellipse(Ellipse::from_corners(start, end))),
            // Centered at the press point, radius half the drag distance
            ToolKind::Circle => Some(Shape::Circle(Circle::new(start, start.distance(end) / 2.0))),
            ToolKind::Line => Some(Shape::Line(Line::new(start, end))),
            ToolKind::Arrow => Some(Shape::Arrow(Arrow::new(start, end))),
            // Placed at the press point with a fixed radius; the drag is
            // ignored, geometry is computed only at release
            ToolKind::Polygon => Some(Shape::Polygon(Polygon::new(
                start,
                POLYGON_DEFAULT_RADIUS,
                self.polygon_sides,
            ))),
            ToolKind::Star => Some(Shape::Star(Star::new(
                start,
                POLYGON_DEFAULT_RADIUS,
                self.star_points,
            ))),
            ToolKind::Freehand => Path::from_points(&self.freehand_points).map(Shape::Path),
            ToolKind::Text => Some(Shape::Text(Text::new(start, String::new()))),
            ToolKind::Select
            | ToolKind::RubberBand
            | ToolKind::Pen
            | ToolKind::Eyedropper
            | ToolKind::PaintBucket
            | ToolKind::Eraser
            | ToolKind::Pan
            | ToolKind::Zoom => None,
        };
        if let Some(ref mut s) = shape {
            *s.style_mut() = self.current_style.clone();
        }
        shape
    }
}

/// Recompute every object's interactivity flags for the active tool.
///
/// Selection tools leave objects fully interactive; picking tools
/// (eyedropper, paint bucket, eraser) need hit testing but not
/// selection; drawing tools make the document inert so gestures never
/// land on existing objects. Locked objects are never selectable, and
/// group children always start inert (the interactive-group mode opens
/// them up explicitly).
pub fn apply_tool_interactivity(document: &mut Document, tool: ToolKind) {
    let (selectable, evented) = match tool {
        ToolKind::Select | ToolKind::RubberBand => (true, true),
        ToolKind::Eyedropper | ToolKind::PaintBucket | ToolKind::Eraser => (false, true),
        _ => (false, false),
    };
    let ids: Vec<_> = document.shape_ids().to_vec();
    for id in ids {
        if let Some(shape) = document.get_shape_mut(id) {
            let locked = shape.meta().locked;
            shape.meta_mut().selectable = selectable && !locked;
            shape.meta_mut().evented = evented;
            if let Some(group) = shape.as_group_mut() {
                for child in group.children_mut() {
                    child.meta_mut().selectable = false;
                    child.meta_mut().evented = false;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_selection_resets_state() {
        let mut tm = ToolManager::new();
        assert_eq!(tm.current_tool, ToolKind::Select);
        tm.set_tool(ToolKind::Rectangle);
        tm.begin(Point::ZERO);
        assert!(tm.is_active());
        tm.set_tool(ToolKind::Ellipse);
        assert!(!tm.is_active());
    }

    #[test]
    fn test_rectangle_gesture() {
        let mut tm = ToolManager::new();
        tm.set_tool(ToolKind::Rectangle);
        tm.begin(Point::new(0.0, 0.0));
        tm.update(Point::new(50.0, 50.0));
        assert!(tm.preview_shape().is_some());
        let shape = tm.end(Point::new(100.0, 80.0)).unwrap();
        let b = shape.bounds();
        assert!((b.width() - 100.0).abs() < f64::EPSILON);
        assert!((b.height() - 80.0).abs() < f64::EPSILON);
        assert!(!tm.is_active());
    }

    #[test]
    fn test_circle_radius_is_half_drag() {
        let mut tm = ToolManager::new();
        tm.set_tool(ToolKind::Circle);
        tm.begin(Point::new(10.0, 10.0));
        let shape = tm.end(Point::new(10.0, 90.0)).unwrap();
        let Shape::Circle(circle) = shape else {
            panic!("expected circle");
        };
        assert_eq!(circle.center, Point::new(10.0, 10.0));
        assert!((circle.radius - 40.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_polygon_ignores_drag() {
        let mut tm = ToolManager::new();
        tm.set_tool(ToolKind::Polygon);
        tm.polygon_sides = 6;
        tm.begin(Point::new(30.0, 30.0));
        let shape = tm.end(Point::new(300.0, 300.0)).unwrap();
        let Shape::Polygon(polygon) = shape else {
            panic!("expected polygon");
        };
        assert_eq!(polygon.center, Point::new(30.0, 30.0));
        assert!((polygon.radius - POLYGON_DEFAULT_RADIUS).abs() < f64::EPSILON);
        assert_eq!(polygon.sides, 6);
    }

    #[test]
    fn test_freehand_accumulates_points() {
        let mut tm = ToolManager::new();
        tm.set_tool(ToolKind::Freehand);
        tm.begin(Point::new(0.0, 0.0));
        tm.update(Point::new(10.0, 5.0));
        tm.update(Point::new(20.0, 0.0));
        let shape = tm.end(Point::new(20.0, 0.0)).unwrap();
        let Shape::Path(path) = shape else {
            panic!("expected path");
        };
        assert!(!path.closed);
        assert_eq!(path.segments.len(), 3);
    }

    #[test]
    fn test_freehand_keeps_release_sample() {
        let mut tm = ToolManager::new();
        tm.set_tool(ToolKind::Freehand);
        tm.begin(Point::new(0.0, 0.0));
        tm.update(Point::new(10.0, 5.0));
        let Some(Shape::Path(path)) = tm.end(Point::new(25.0, 10.0)) else {
            panic!("expected path");
        };
        // The committed stroke ends where the pointer was released
        let last = path.segments.last().map(|s| s.end());
        assert_eq!(last, Some(Point::new(25.0, 10.0)));
    }

    #[test]
    fn test_select_tool_no_shape() {
        let mut tm = ToolManager::new();
        tm.begin(Point::ZERO);
        assert!(tm.end(Point::new(100.0, 100.0)).is_none());
    }

    #[test]
    fn test_new_shape_takes_current_style() {
        let mut tm = ToolManager::new();
        tm.set_tool(ToolKind::Line);
        tm.current_style.stroke_width = 7.0;
        tm.begin(Point::ZERO);
        let shape = tm.end(Point::new(10.0, 0.0)).unwrap();
        assert!((shape.style().stroke_width - 7.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_interactivity_by_tool() {
        use crate::shapes::Rectangle;
        let mut doc = Document::new(800.0, 600.0);
        let id = doc.add_shape(Shape::Rectangle(Rectangle::new(Point::ZERO, 10.0, 10.0)));

        apply_tool_interactivity(&mut doc, ToolKind::Rectangle);
        let meta = doc.get_shape(id).unwrap().meta();
        assert!(!meta.selectable && !meta.evented);

        apply_tool_interactivity(&mut doc, ToolKind::Eraser);
        let meta = doc.get_shape(id).unwrap().meta();
        assert!(!meta.selectable && meta.evented);

        apply_tool_interactivity(&mut doc, ToolKind::Select);
        let meta = doc.get_shape(id).unwrap().meta();
        assert!(meta.selectable && meta.evented);
    }

    #[test]
    fn test_locked_never_selectable() {
        use crate::shapes::Rectangle;
        let mut doc = Document::new(800.0, 600.0);
        let id = doc.add_shape(Shape::Rectangle(Rectangle::new(Point::ZERO, 10.0, 10.0)));
        doc.get_shape_mut(id).unwrap().meta_mut().locked = true;
        apply_tool_interactivity(&mut doc, ToolKind::Select);
        assert!(!doc.get_shape(id).unwrap().meta().selectable);
    }
}
