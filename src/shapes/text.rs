//! Text shape.

use super::{ObjectMeta, ShapeId, ShapeStyle, ShapeTrait};
use kurbo::{Affine, BezPath, Point, Rect, Shape as KurboShape};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// Bounds are estimated from character counts; real glyph metrics live in
// the rendering surface.
const CHAR_WIDTH_FACTOR: f64 = 0.6;
const LINE_HEIGHT_FACTOR: f64 = 1.2;

/// A text label anchored at its top-left corner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Text {
    pub(crate) id: ShapeId,
    pub position: Point,
    pub content: String,
    pub font_size: f64,
    /// Rotation angle in radians (around center).
    #[serde(default)]
    pub rotation: f64,
    pub style: ShapeStyle,
    #[serde(default)]
    pub meta: ObjectMeta,
}

impl Text {
    pub fn new(position: Point, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            position,
            content: content.into(),
            font_size: 16.0,
            rotation: 0.0,
            style: ShapeStyle::default(),
            meta: ObjectMeta::default(),
        }
    }

    /// Estimated extent: longest line times a per-character width factor,
    /// line count times the line height.
    fn extent(&self) -> (f64, f64) {
        let lines = self.content.lines().count().max(1);
        let longest = self
            .content
            .lines()
            .map(|l| l.chars().count())
            .max()
            .unwrap_or(0)
            .max(1);
        (
            longest as f64 * self.font_size * CHAR_WIDTH_FACTOR,
            lines as f64 * self.font_size * LINE_HEIGHT_FACTOR,
        )
    }
}

impl ShapeTrait for Text {
    fn id(&self) -> ShapeId {
        self.id
    }

    fn set_id(&mut self, id: ShapeId) {
        self.id = id;
    }

    fn bounds(&self) -> Rect {
        let (w, h) = self.extent();
        Rect::new(
            self.position.x,
            self.position.y,
            self.position.x + w,
            self.position.y + h,
        )
    }

    fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        self.bounds().inflate(tolerance, tolerance).contains(point)
    }

    fn to_path(&self) -> BezPath {
        // Placeholder outline; glyph paths come from the surface.
        self.bounds().to_path(0.1)
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
        self.position = affine * self.position;
        let coeffs = affine.as_coeffs();
        let scale = coeffs[0].abs().max(coeffs[3].abs());
        self.font_size *= scale;
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
    fn test_multiline_extent() {
        let short = Text::new(Point::ZERO, "hi");
        let tall = Text::new(Point::ZERO, "hi\nthere\nworld");
        assert!(tall.bounds().height() > short.bounds().height());
        assert!(tall.bounds().width() > short.bounds().width());
    }

    #[test]
    fn test_empty_content_still_hittable() {
        let text = Text::new(Point::new(10.0, 10.0), "");
        assert!(text.bounds().area() > 0.0);
        assert!(text.hit_test(Point::new(12.0, 15.0), 0.0));
    }
}
