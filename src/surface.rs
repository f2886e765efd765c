//! Contract between the editing engine and the host rendering surface.

use crate::document::Document;
use crate::shapes::{SerializableColor, ShapeId};
use kurbo::Point;

/// What the engine asks of the renderer embedding it.
///
/// Only pixel sampling is mandatory; the rest have inert defaults so a
/// headless host stays a one-liner.
pub trait Surface {
    /// Sample the composited pixel color at a screen position. Used by
    /// the eyedropper when no object is under the pointer.
    fn sample_pixel(&self, screen: Point) -> SerializableColor;

    /// Resolve the deepest rendered object at a world position, when the
    /// surface keeps a finer-grained hit structure than the engine's
    /// geometric tests (e.g. per-pixel alpha). None defers to geometry.
    fn deepest_hit(&self, _world: Point) -> Option<ShapeId> {
        None
    }

    /// Notification that object transforms changed outside a render
    /// pass, so cached surface state can be invalidated.
    fn commit_transform(&mut self) {}

    /// Draw the document. Headless hosts ignore this.
    fn render_frame(&mut self, _document: &Document) {}
}

/// A surface that renders nothing and samples a constant clear color.
#[derive(Debug, Clone)]
pub struct NullSurface {
    pub clear_color: SerializableColor,
}

impl NullSurface {
    pub fn new() -> Self {
        Self {
            clear_color: SerializableColor::white(),
        }
    }
}

impl Default for NullSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl Surface for NullSurface {
    fn sample_pixel(&self, _screen: Point) -> SerializableColor {
        self.clear_color
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_surface_samples_clear_color() {
        let surface = NullSurface {
            clear_color: SerializableColor::new(10, 20, 30, 255),
        };
        assert_eq!(
            surface.sample_pixel(Point::new(5.0, 5.0)),
            SerializableColor::new(10, 20, 30, 255)
        );
        assert!(surface.deepest_hit(Point::ZERO).is_none());
    }
}
