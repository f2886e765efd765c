//! The canvas document: owned shapes plus a z-order.

use crate::error::{EditorError, EditorResult};
use crate::shapes::{Group, SerializableColor, Shape, ShapeId, ShapeTrait};
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The document model: shapes owned by id, painted in `z_order` order
/// (first entry is bottom-most).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub width: f64,
    pub height: f64,
    pub background: SerializableColor,
    shapes: HashMap<ShapeId, Shape>,
    z_order: Vec<ShapeId>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new(1920.0, 1080.0)
    }
}

impl Document {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            background: SerializableColor::white(),
            shapes: HashMap::new(),
            z_order: Vec::new(),
        }
    }

    /// Add a shape on top of the stack.
    pub fn add_shape(&mut self, shape: Shape) -> ShapeId {
        let id = shape.id();
        self.shapes.insert(id, shape);
        self.z_order.push(id);
        id
    }

    /// Remove a shape, returning it if present.
    pub fn remove_shape(&mut self, id: ShapeId) -> Option<Shape> {
        self.z_order.retain(|&s| s != id);
        self.shapes.remove(&id)
    }

    pub fn get_shape(&self, id: ShapeId) -> Option<&Shape> {
        self.shapes.get(&id)
    }

    pub fn get_shape_mut(&mut self, id: ShapeId) -> Option<&mut Shape> {
        self.shapes.get_mut(&id)
    }

    /// Look up a shape anywhere in the tree, including group children.
    pub fn find_shape(&self, id: ShapeId) -> Option<&Shape> {
        if let Some(shape) = self.shapes.get(&id) {
            return Some(shape);
        }
        self.shapes
            .values()
            .filter_map(|s| s.as_group())
            .find_map(|g| find_in_group(g, id))
    }

    /// Mutable lookup anywhere in the tree, including group children.
    pub fn find_shape_mut(&mut self, id: ShapeId) -> Option<&mut Shape> {
        if self.shapes.contains_key(&id) {
            return self.shapes.get_mut(&id);
        }
        for shape in self.shapes.values_mut() {
            if let Some(group) = shape.as_group_mut()
                && let Some(found) = find_in_group_mut(group, id)
            {
                return Some(found);
            }
        }
        None
    }

    pub fn len(&self) -> usize {
        self.z_order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.z_order.is_empty()
    }

    pub fn shape_ids(&self) -> &[ShapeId] {
        &self.z_order
    }

    /// Shapes in paint order (bottom first).
    pub fn shapes_ordered(&self) -> impl Iterator<Item = &Shape> {
        self.z_order.iter().filter_map(|id| self.shapes.get(id))
    }

    /// Union of all visible top-level shape bounds.
    pub fn bounds(&self) -> Option<Rect> {
        let mut iter = self.shapes_ordered().filter(|s| s.meta().visible);
        let first = iter.next()?.bounds();
        Some(iter.fold(first, |r, s| r.union(s.bounds())))
    }

    /// Topmost shape hit at a world point, honoring visibility, lock
    /// and evented flags.
    pub fn topmost_at(&self, point: Point, tolerance: f64) -> Option<&Shape> {
        self.z_order
            .iter()
            .rev()
            .filter_map(|id| self.shapes.get(id))
            .find(|s| {
                let meta = s.meta();
                meta.visible && meta.evented && !meta.locked && s.hit_test(point, tolerance)
            })
    }

    /// All shapes hit at a world point, topmost first.
    pub fn shapes_at_point(&self, point: Point, tolerance: f64) -> Vec<&Shape> {
        self.z_order
            .iter()
            .rev()
            .filter_map(|id| self.shapes.get(id))
            .filter(|s| {
                let meta = s.meta();
                meta.visible && meta.evented && s.hit_test(point, tolerance)
            })
            .collect()
    }

    /// Ids of selectable shapes intersecting a rubber-band rectangle.
    pub fn shapes_in_rect(&self, rect: Rect) -> Vec<ShapeId> {
        self.shapes_ordered()
            .filter(|s| {
                let meta = s.meta();
                meta.visible && meta.selectable && !meta.locked && s.intersects_rect(rect)
            })
            .map(|s| s.id())
            .collect()
    }

    // -- z-order ---------------------------------------------------------

    pub fn bring_to_front(&mut self, id: ShapeId) {
        if let Some(pos) = self.z_index(id) {
            let id = self.z_order.remove(pos);
            self.z_order.push(id);
        }
    }

    pub fn send_to_back(&mut self, id: ShapeId) {
        if let Some(pos) = self.z_index(id) {
            let id = self.z_order.remove(pos);
            self.z_order.insert(0, id);
        }
    }

    pub fn bring_forward(&mut self, id: ShapeId) {
        if let Some(pos) = self.z_index(id)
            && pos + 1 < self.z_order.len()
        {
            self.z_order.swap(pos, pos + 1);
        }
    }

    pub fn send_backward(&mut self, id: ShapeId) {
        if let Some(pos) = self.z_index(id)
            && pos > 0
        {
            self.z_order.swap(pos, pos - 1);
        }
    }

    fn z_index(&self, id: ShapeId) -> Option<usize> {
        self.z_order.iter().position(|&s| s == id)
    }

    // -- grouping --------------------------------------------------------

    /// Replace the given top-level shapes with a single group. Children
    /// keep their world coordinates and their relative z-order; the group
    /// takes the z-position of the topmost member.
    pub fn group_shapes(&mut self, ids: &[ShapeId]) -> EditorResult<ShapeId> {
        if ids.len() < 2 {
            return Err(EditorError::InvalidOperation(
                "grouping needs at least two objects",
            ));
        }
        if !ids.iter().all(|id| self.shapes.contains_key(id)) {
            return Err(EditorError::InvalidOperation(
                "grouping requires top-level objects",
            ));
        }
        // Collect members bottom-to-top so internal order matches paint order
        let member_positions: Vec<usize> = self
            .z_order
            .iter()
            .enumerate()
            .filter(|&(_, id)| ids.contains(id))
            .map(|(pos, _)| pos)
            .collect();
        let top = member_positions.last().copied().unwrap_or(0);
        let ordered: Vec<ShapeId> = member_positions
            .iter()
            .map(|&pos| self.z_order[pos])
            .collect();
        let children: Vec<Shape> = ordered
            .iter()
            .filter_map(|&id| {
                self.z_order.retain(|&s| s != id);
                self.shapes.remove(&id)
            })
            .collect();
        let group = Group::new(children);
        let gid = group.id();
        self.shapes.insert(gid, Shape::Group(group));
        let insert_at = top.saturating_sub(ids.len() - 1).min(self.z_order.len());
        self.z_order.insert(insert_at, gid);
        Ok(gid)
    }

    /// Dissolve a group back into top-level shapes at its z-position.
    /// Returns the freed child ids (bottom first).
    pub fn ungroup_shape(&mut self, id: ShapeId) -> EditorResult<Vec<ShapeId>> {
        let pos = self
            .z_index(id)
            .ok_or(EditorError::InvalidOperation("not a top-level object"))?;
        if !self.shapes.get(&id).is_some_and(Shape::is_group) {
            return Err(EditorError::InvalidOperation("not a group"));
        }
        self.z_order.remove(pos);
        let Some(Shape::Group(group)) = self.shapes.remove(&id) else {
            return Err(EditorError::InvalidOperation("not a group"));
        };
        let children = group.into_children();
        let mut freed = Vec::with_capacity(children.len());
        for (offset, child) in children.into_iter().enumerate() {
            let cid = child.id();
            self.shapes.insert(cid, child);
            self.z_order.insert(pos + offset, cid);
            freed.push(cid);
        }
        Ok(freed)
    }

    // -- serialization ---------------------------------------------------

    /// Serialize the full document state as an opaque snapshot blob.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Restore a document from a snapshot blob.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Import externally authored markup (a JSON array of shape nodes)
    /// as a single group. Imported nodes get fresh ids so they never
    /// collide with existing objects.
    pub fn import_markup(&mut self, json: &str) -> EditorResult<ShapeId> {
        let mut nodes: Vec<Shape> = serde_json::from_str(json)?;
        if nodes.is_empty() {
            return Err(EditorError::InvalidOperation("markup contains no objects"));
        }
        for node in &mut nodes {
            node.regenerate_id();
        }
        if nodes.len() == 1 {
            let mut node = nodes.remove(0);
            node.meta_mut().parent = None;
            return Ok(self.add_shape(node));
        }
        let group = Group::new(nodes);
        let gid = group.id();
        self.add_shape(Shape::Group(group));
        Ok(gid)
    }
}

fn find_in_group(group: &Group, id: ShapeId) -> Option<&Shape> {
    for child in group.children() {
        if child.id() == id {
            return Some(child);
        }
        if let Some(nested) = child.as_group()
            && let Some(found) = find_in_group(nested, id)
        {
            return Some(found);
        }
    }
    None
}

fn find_in_group_mut(group: &mut Group, id: ShapeId) -> Option<&mut Shape> {
    // Two passes to keep the borrow checker happy with recursion
    let idx = group.children().iter().position(|c| c.id() == id);
    if let Some(idx) = idx {
        return group.children_mut().get_mut(idx);
    }
    for child in group.children_mut() {
        if let Some(nested) = child.as_group_mut()
            && let Some(found) = find_in_group_mut(nested, id)
        {
            return Some(found);
        }
    }
    None
}
