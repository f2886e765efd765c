//! Layer panel projection of the document.

use crate::document::Document;
use crate::shapes::{Shape, ShapeId};
use serde::{Deserialize, Serialize};

/// Text labels longer than this are truncated in the layer list.
const NAME_EXCERPT_LEN: usize = 24;

/// One row of the layer list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerItem {
    pub id: ShapeId,
    pub name: String,
    pub visible: bool,
    pub locked: bool,
    /// Owning group id for nested rows.
    pub parent: Option<ShapeId>,
    /// Nesting depth (0 = top level).
    pub depth: usize,
}

/// Project the document into a flat layer list: topmost object first,
/// group children indented directly below their group in the group's
/// internal paint order.
pub fn project_layers(document: &Document) -> Vec<LayerItem> {
    let mut items = Vec::with_capacity(document.len());
    let ordered: Vec<&Shape> = document.shapes_ordered().collect();
    for shape in ordered.into_iter().rev() {
        push_item(shape, None, 0, &mut items);
    }
    items
}

fn push_item(shape: &Shape, parent: Option<ShapeId>, depth: usize, out: &mut Vec<LayerItem>) {
    let meta = shape.meta();
    out.push(LayerItem {
        id: shape.id(),
        name: display_name(shape),
        visible: meta.visible,
        locked: meta.locked,
        parent,
        depth,
    });
    if let Some(group) = shape.as_group() {
        let gid = shape.id();
        for child in group.children() {
            push_item(child, Some(gid), depth + 1, out);
        }
    }
}

fn display_name(shape: &Shape) -> String {
    match shape {
        Shape::Text(text) => {
            let line = text.content.lines().next().unwrap_or("");
            let trimmed = line.trim();
            if trimmed.is_empty() {
                shape.kind_name().to_string()
            } else if trimmed.chars().count() > NAME_EXCERPT_LEN {
                let excerpt: String = trimmed.chars().take(NAME_EXCERPT_LEN).collect();
                format!("{excerpt}…")
            } else {
                trimmed.to_string()
            }
        }
        _ => shape.kind_name().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::{Circle, Rectangle, Text};
    use kurbo::Point;

    #[test]
    fn test_topmost_first() {
        let mut doc = Document::new(800.0, 600.0);
        let bottom = doc.add_shape(Shape::Rectangle(Rectangle::new(Point::ZERO, 10.0, 10.0)));
        let top = doc.add_shape(Shape::Circle(Circle::new(Point::ZERO, 5.0)));
        let items = project_layers(&doc);
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].id, top);
        assert_eq!(items[1].id, bottom);
        assert_eq!(items[0].name, "Circle");
    }

    #[test]
    fn test_group_children_nested_below_group() {
        let mut doc = Document::new(800.0, 600.0);
        let a = doc.add_shape(Shape::Rectangle(Rectangle::new(Point::ZERO, 10.0, 10.0)));
        let b = doc.add_shape(Shape::Circle(Circle::new(Point::ZERO, 5.0)));
        let gid = doc.group_shapes(&[a, b]).unwrap();
        let items = project_layers(&doc);
        assert_eq!(items.len(), 3);
        assert_eq!(items[0].id, gid);
        assert_eq!(items[0].depth, 0);
        for item in &items[1..] {
            assert_eq!(item.parent, Some(gid));
            assert_eq!(item.depth, 1);
        }
    }

    #[test]
    fn test_text_name_is_excerpt() {
        let mut doc = Document::new(800.0, 600.0);
        doc.add_shape(Shape::Text(Text::new(Point::ZERO, "hello world")));
        doc.add_shape(Shape::Text(Text::new(
            Point::ZERO,
            "a very long piece of text content that keeps going",
        )));
        doc.add_shape(Shape::Text(Text::new(Point::ZERO, "   ")));
        let items = project_layers(&doc);
        assert_eq!(items[2].name, "hello world");
        assert!(items[1].name.ends_with('…'));
        assert_eq!(items[0].name, "Text");
    }
}
