//! Interactive group mode: temporary access to a group's children.
//!
//! Groups normally behave as a single object. Double-clicking one enters
//! interactive mode: its children become individually selectable while
//! the rest of the document is untouched. Selecting the group itself (or
//! anything else) exits the mode, except for the selection change caused
//! by the entry click, which is absorbed by a one-shot guard.

use crate::document::Document;
use crate::shapes::ShapeId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GroupMode {
    /// No group is open; groups act as single objects.
    #[default]
    Inert,
    /// One group's children are individually interactive.
    Interactive {
        group: ShapeId,
        /// Child currently under the pointer, for hover feedback.
        highlighted_child: Option<ShapeId>,
    },
}

/// State machine driving entry and exit of interactive group mode.
#[derive(Debug, Default)]
pub struct GroupInteraction {
    mode: GroupMode,
    /// Absorbs the auto-exit check fired by the entry click itself.
    entry_guard: bool,
}

impl GroupInteraction {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_interactive(&self) -> bool {
        matches!(self.mode, GroupMode::Interactive { .. })
    }

    pub fn active_group(&self) -> Option<ShapeId> {
        match self.mode {
            GroupMode::Interactive { group, .. } => Some(group),
            GroupMode::Inert => None,
        }
    }

    pub fn highlighted_child(&self) -> Option<ShapeId> {
        match self.mode {
            GroupMode::Interactive {
                highlighted_child, ..
            } => highlighted_child,
            GroupMode::Inert => None,
        }
    }

    pub fn set_highlighted_child(&mut self, child: Option<ShapeId>) {
        if let GroupMode::Interactive {
            highlighted_child, ..
        } = &mut self.mode
        {
            *highlighted_child = child;
        }
    }

    /// Open a group for child interaction. Any previously open group is
    /// closed first; there is at most one interactive group.
    pub fn enter(&mut self, document: &mut Document, group: ShapeId) {
        if let Some(previous) = self.active_group() {
            if previous == group {
                return;
            }
            self.close_children(document, previous);
        }
        if let Some(shape) = document.get_shape_mut(group)
            && let Some(g) = shape.as_group_mut()
        {
            for child in g.children_mut() {
                let locked = child.meta().locked;
                child.meta_mut().selectable = !locked;
                child.meta_mut().evented = true;
            }
            log::debug!("entering interactive mode for group {group}");
            self.mode = GroupMode::Interactive {
                group,
                highlighted_child: None,
            };
            self.entry_guard = true;
        }
    }

    /// Leave interactive mode, making the children inert again.
    pub fn exit(&mut self, document: &mut Document) {
        if let Some(group) = self.active_group() {
            log::debug!("exiting interactive mode for group {group}");
            self.close_children(document, group);
        }
        self.mode = GroupMode::Inert;
        self.entry_guard = false;
    }

    fn close_children(&self, document: &mut Document, group: ShapeId) {
        if let Some(shape) = document.get_shape_mut(group)
            && let Some(g) = shape.as_group_mut()
        {
            for child in g.children_mut() {
                child.meta_mut().selectable = false;
                child.meta_mut().evented = false;
            }
        }
    }

    /// Called on every selection change. Exits interactive mode when the
    /// selection resolves to the open group itself (or anything outside
    /// it); the first check after entry is absorbed by the one-shot
    /// guard, because the entry click selects the group. Returns true if
    /// the mode was exited.
    pub fn check_auto_exit(&mut self, document: &mut Document, selected: &[ShapeId]) -> bool {
        let Some(group) = self.active_group() else {
            return false;
        };
        if self.entry_guard {
            self.entry_guard = false;
            return false;
        }
        let all_children = selected.iter().all(|id| {
            document
                .find_shape(*id)
                .is_some_and(|s| s.meta().parent == Some(group))
        });
        if selected.is_empty() || !all_children {
            self.exit(document);
            return true;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::{Rectangle, Shape};
    use kurbo::Point;

    fn doc_with_group() -> (Document, ShapeId, Vec<ShapeId>) {
        let mut doc = Document::new(800.0, 600.0);
        let a = doc.add_shape(Shape::Rectangle(Rectangle::new(Point::ZERO, 10.0, 10.0)));
        let b = doc.add_shape(Shape::Rectangle(Rectangle::new(
            Point::new(20.0, 0.0),
            10.0,
            10.0,
        )));
        let gid = doc.group_shapes(&[a, b]).unwrap();
        // Children start inert, as after a tool change
        (doc, gid, vec![a, b])
    }

    #[test]
    fn test_enter_opens_children() {
        let (mut doc, gid, children) = doc_with_group();
        let mut mode = GroupInteraction::new();
        mode.enter(&mut doc, gid);
        assert!(mode.is_interactive());
        assert_eq!(mode.active_group(), Some(gid));
        for id in &children {
            let child = doc.find_shape(*id).unwrap();
            assert!(child.meta().selectable);
            assert!(child.meta().evented);
        }
    }

    #[test]
    fn test_exit_closes_children() {
        let (mut doc, gid, children) = doc_with_group();
        let mut mode = GroupInteraction::new();
        mode.enter(&mut doc, gid);
        mode.exit(&mut doc);
        assert!(!mode.is_interactive());
        for id in &children {
            let child = doc.find_shape(*id).unwrap();
            assert!(!child.meta().selectable);
            assert!(!child.meta().evented);
        }
    }

    #[test]
    fn test_entry_guard_absorbs_first_check() {
        let (mut doc, gid, _) = doc_with_group();
        let mut mode = GroupInteraction::new();
        mode.enter(&mut doc, gid);
        // The entry click selects the group; the guard absorbs it
        assert!(!mode.check_auto_exit(&mut doc, &[gid]));
        assert!(mode.is_interactive());
        // The guard is one-shot: the same selection now exits
        assert!(mode.check_auto_exit(&mut doc, &[gid]));
        assert!(!mode.is_interactive());
    }

    #[test]
    fn test_child_selection_keeps_mode() {
        let (mut doc, gid, children) = doc_with_group();
        let mut mode = GroupInteraction::new();
        mode.enter(&mut doc, gid);
        mode.check_auto_exit(&mut doc, &[gid]); // consume the guard
        assert!(!mode.check_auto_exit(&mut doc, &[children[0]]));
        assert!(mode.is_interactive());
    }

    #[test]
    fn test_empty_selection_exits() {
        let (mut doc, gid, _) = doc_with_group();
        let mut mode = GroupInteraction::new();
        mode.enter(&mut doc, gid);
        mode.check_auto_exit(&mut doc, &[gid]);
        assert!(mode.is_interactive());
        assert!(mode.check_auto_exit(&mut doc, &[]));
        assert!(!mode.is_interactive());
    }

    #[test]
    fn test_entering_other_group_closes_previous() {
        let mut doc = Document::new(800.0, 600.0);
        let a = doc.add_shape(Shape::Rectangle(Rectangle::new(Point::ZERO, 10.0, 10.0)));
        let b = doc.add_shape(Shape::Rectangle(Rectangle::new(Point::ZERO, 10.0, 10.0)));
        let c = doc.add_shape(Shape::Rectangle(Rectangle::new(Point::ZERO, 10.0, 10.0)));
        let d = doc.add_shape(Shape::Rectangle(Rectangle::new(Point::ZERO, 10.0, 10.0)));
        let g1 = doc.group_shapes(&[a, b]).unwrap();
        let g2 = doc.group_shapes(&[c, d]).unwrap();

        let mut mode = GroupInteraction::new();
        mode.enter(&mut doc, g1);
        mode.enter(&mut doc, g2);
        assert_eq!(mode.active_group(), Some(g2));
        assert!(!doc.find_shape(a).unwrap().meta().selectable);
        assert!(doc.find_shape(c).unwrap().meta().selectable);
    }

    #[test]
    fn test_highlighted_child_tracking() {
        let (mut doc, gid, children) = doc_with_group();
        let mut mode = GroupInteraction::new();
        mode.set_highlighted_child(Some(children[0]));
        assert!(mode.highlighted_child().is_none()); // inert mode ignores it
        mode.enter(&mut doc, gid);
        mode.set_highlighted_child(Some(children[0]));
        assert_eq!(mode.highlighted_child(), Some(children[0]));
    }
}
