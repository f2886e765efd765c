//! The editing context: event routing, selection, commands, history.

use crate::align::{AlignMode, align_shapes};
use crate::camera::Camera;
use crate::document::Document;
use crate::error::{EditorError, EditorResult};
use crate::group_mode::GroupInteraction;
use crate::history::History;
use crate::input::{InputState, KeyEvent, Modifiers, PointerEvent};
use crate::layers::{LayerItem, project_layers};
use crate::pen::{PenBuilder, PenPress};
use crate::shapes::{SerializableColor, Shape, ShapeId, Text};
use crate::surface::{NullSurface, Surface};
use crate::tools::{ToolKind, ToolManager, apply_tool_interactivity};
use kurbo::{Affine, Point, Rect, Vec2};

/// Base hit-test tolerance in screen pixels; divided by the zoom so
/// picking feels the same at every magnification.
const HIT_TOLERANCE: f64 = 4.0;

/// The single editing context. Owns the document, the view, the active
/// tool, selection and history; the host feeds it pointer/key events
/// and renders from its state.
pub struct Editor {
    pub document: Document,
    pub camera: Camera,
    pub tools: ToolManager,
    history: History,
    group_mode: GroupInteraction,
    pen: PenBuilder,
    selection: Vec<ShapeId>,
    layers: Vec<LayerItem>,
    surface: Box<dyn Surface>,
    foreground: SerializableColor,
    background: SerializableColor,
    /// Text object the host is currently editing inline, if any.
    editing_text: Option<ShapeId>,
    pan_anchor: Option<Point>,
    /// Marquee selection in progress: (start, current) in world space.
    rubber_band: Option<(Point, Point)>,
    drag_last: Option<Point>,
    drag_moved: bool,
    pen_dragging: bool,
    input: InputState,
}

impl Default for Editor {
    fn default() -> Self {
        Self::new()
    }
}

impl Editor {
    pub fn new() -> Self {
        Self::with_surface(Box::new(NullSurface::new()))
    }

    pub fn with_surface(surface: Box<dyn Surface>) -> Self {
        let document = Document::default();
        let mut history = History::new();
        // Baseline snapshot so the first undo lands on the empty document
        if let Err(err) = history.capture(&document) {
            log::error!("baseline snapshot failed: {err}");
        }
        Self {
            layers: project_layers(&document),
            document,
            camera: Camera::new(),
            tools: ToolManager::new(),
            history,
            group_mode: GroupInteraction::new(),
            pen: PenBuilder::new(),
            selection: Vec::new(),
            surface,
            foreground: SerializableColor::black(),
            background: SerializableColor::white(),
            editing_text: None,
            pan_anchor: None,
            rubber_band: None,
            drag_last: None,
            drag_moved: false,
            pen_dragging: false,
            input: InputState::new(),
        }
    }

    // -- accessors -------------------------------------------------------

    pub fn selection(&self) -> &[ShapeId] {
        &self.selection
    }

    pub fn layers(&self) -> &[LayerItem] {
        &self.layers
    }

    pub fn foreground(&self) -> SerializableColor {
        self.foreground
    }

    pub fn background(&self) -> SerializableColor {
        self.background
    }

    pub fn editing_text(&self) -> Option<ShapeId> {
        self.editing_text
    }

    pub fn active_group(&self) -> Option<ShapeId> {
        self.group_mode.active_group()
    }

    pub fn highlighted_child(&self) -> Option<ShapeId> {
        self.group_mode.highlighted_child()
    }

    pub fn rubber_band_rect(&self) -> Option<Rect> {
        self.rubber_band.map(|(a, b)| Rect::from_points(a, b))
    }

    pub fn preview_shape(&self) -> Option<Shape> {
        self.tools.preview_shape()
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    fn hit_tolerance(&self) -> f64 {
        HIT_TOLERANCE / self.camera.zoom
    }

    // -- event routing ---------------------------------------------------

    pub fn handle_pointer_event(&mut self, event: &PointerEvent) -> EditorResult<()> {
        let double_click = self.input.handle_pointer_event(event);
        match *event {
            PointerEvent::Down { position, .. } => self.pointer_pressed(position, double_click),
            PointerEvent::Move { position } => {
                self.pointer_moved(position);
                Ok(())
            }
            PointerEvent::Up { position, .. } => self.pointer_released(position),
            PointerEvent::Scroll { position, delta } => {
                let factor = if delta.y < 0.0 {
                    crate::camera::ZOOM_IN_STEP
                } else {
                    crate::camera::ZOOM_OUT_STEP
                };
                self.camera.zoom_at(position, factor);
                Ok(())
            }
        }
    }

    pub fn handle_key_event(&mut self, event: &KeyEvent) -> EditorResult<()> {
        self.input.handle_key_event(event);
        if let KeyEvent::Pressed(key) = event {
            let key = key.clone();
            return self.key_pressed(&key, self.input.modifiers);
        }
        Ok(())
    }

    pub fn set_modifiers(&mut self, modifiers: Modifiers) {
        self.input.set_modifiers(modifiers);
    }

    fn pointer_pressed(&mut self, screen: Point, double_click: bool) -> EditorResult<()> {
        let world = self.camera.screen_to_world(screen);
        let modifiers = self.input.modifiers;
        match self.tools.current_tool {
            ToolKind::Select => self.press_select(world, double_click, modifiers),
            ToolKind::RubberBand => {
                let tolerance = self.hit_tolerance();
                if self.document.topmost_at(world, tolerance).is_some() {
                    self.press_select(world, double_click, modifiers)?;
                } else {
                    self.rubber_band = Some((world, world));
                }
                Ok(())
            }
            ToolKind::Pen => self.press_pen(world, double_click, modifiers),
            ToolKind::Text => self.press_text(world),
            ToolKind::Eyedropper => {
                self.press_eyedropper(world, screen);
                Ok(())
            }
            ToolKind::PaintBucket => self.press_paint_bucket(world),
            ToolKind::Eraser => self.press_eraser(world),
            ToolKind::Pan => {
                self.pan_anchor = Some(screen);
                Ok(())
            }
            ToolKind::Zoom => {
                if modifiers.alt {
                    self.camera.zoom_out_at(screen);
                } else {
                    self.camera.zoom_in_at(screen);
                }
                Ok(())
            }
            _ => {
                self.tools.begin(world);
                Ok(())
            }
        }
    }

    fn pointer_moved(&mut self, screen: Point) {
        let world = self.camera.screen_to_world(screen);
        match self.tools.current_tool {
            ToolKind::Select => {
                if self.drag_last.is_some() {
                    self.drag_selection_to(world);
                } else if self.group_mode.is_interactive() {
                    self.update_group_highlight(world);
                }
            }
            ToolKind::RubberBand => {
                if let Some((_, current)) = &mut self.rubber_band {
                    *current = world;
                } else if self.drag_last.is_some() {
                    self.drag_selection_to(world);
                }
            }
            ToolKind::Pen => {
                if self.pen_dragging {
                    self.pen.drag_handle(world);
                } else {
                    self.pen.hover(world);
                }
            }
            ToolKind::Pan => {
                if let Some(anchor) = self.pan_anchor {
                    self.camera.pan(screen - anchor);
                    self.pan_anchor = Some(screen);
                }
            }
            _ => self.tools.update(world),
        }
    }

    fn pointer_released(&mut self, screen: Point) -> EditorResult<()> {
        let world = self.camera.screen_to_world(screen);
        match self.tools.current_tool {
            ToolKind::Select => self.release_select(),
            ToolKind::RubberBand => {
                if let Some((start, _)) = self.rubber_band.take() {
                    let rect = Rect::from_points(start, world);
                    let hits = self.document.shapes_in_rect(rect);
                    self.set_selection(hits);
                    Ok(())
                } else {
                    self.release_select()
                }
            }
            ToolKind::Pen => {
                self.pen_dragging = false;
                Ok(())
            }
            ToolKind::Pan => {
                self.pan_anchor = None;
                Ok(())
            }
            _ => {
                if let Some(mut shape) = self.tools.end(world) {
                    // The fresh object is immediately usable even though
                    // the drawing tool left the rest of the document inert
                    shape.meta_mut().selectable = true;
                    shape.meta_mut().evented = true;
                    let id = self.document.add_shape(shape);
                    self.set_selection(vec![id]);
                    self.commit();
                }
                Ok(())
            }
        }
    }

    fn key_pressed(&mut self, key: &str, modifiers: Modifiers) -> EditorResult<()> {
        let command = modifiers.ctrl || modifiers.meta;
        match key {
            "Escape" => {
                self.pen.cancel();
                self.tools.cancel();
                self.rubber_band = None;
                if self.group_mode.is_interactive() {
                    self.group_mode.exit(&mut self.document);
                } else {
                    self.set_selection(Vec::new());
                }
                Ok(())
            }
            "Enter" => {
                if self.pen.is_drawing() {
                    return self.finish_pen(modifiers.shift);
                }
                self.editing_text = None;
                Ok(())
            }
            "Delete" | "Backspace" => self.delete_selection(),
            "z" if command && modifiers.shift => self.redo(),
            "z" if command => self.undo(),
            "y" if command => self.redo(),
            "a" if command => {
                self.select_all();
                Ok(())
            }
            "g" if command && modifiers.shift => self.ungroup_selection(),
            "g" if command => self.group_selection().map(|_| ()),
            _ => Ok(()),
        }
    }

    // -- selection -------------------------------------------------------

    /// Replace the selection. Every selection change runs the
    /// interactive-group auto-exit check.
    pub fn set_selection(&mut self, ids: Vec<ShapeId>) {
        self.group_mode.check_auto_exit(&mut self.document, &ids);
        self.selection = ids;
    }

    pub fn select_all(&mut self) {
        let ids: Vec<ShapeId> = self
            .document
            .shapes_ordered()
            .filter(|s| s.meta().selectable)
            .map(|s| s.id())
            .collect();
        self.set_selection(ids);
    }

    fn press_select(
        &mut self,
        world: Point,
        double_click: bool,
        modifiers: Modifiers,
    ) -> EditorResult<()> {
        let tolerance = self.hit_tolerance();

        // Children of the open group win over everything above them
        if let Some(gid) = self.group_mode.active_group()
            && let Some(child) = self
                .document
                .get_shape(gid)
                .and_then(Shape::as_group)
                .and_then(|g| g.child_at(world, tolerance))
            && child.meta().selectable
        {
            let cid = child.id();
            self.set_selection(vec![cid]);
            self.drag_last = Some(world);
            self.drag_moved = false;
            return Ok(());
        }

        if double_click
            && let Some(gid) = self.resolve_group_target(world, tolerance)
        {
            self.group_mode.enter(&mut self.document, gid);
            self.set_selection(vec![gid]);
            // Highlight the child under the entry click, if any
            self.update_group_highlight(world);
            return Ok(());
        }

        match self.document.topmost_at(world, tolerance) {
            Some(shape) if shape.meta().selectable => {
                let id = shape.id();
                if modifiers.shift {
                    let mut ids = self.selection.clone();
                    if let Some(pos) = ids.iter().position(|&s| s == id) {
                        ids.remove(pos);
                    } else {
                        ids.push(id);
                    }
                    self.set_selection(ids);
                } else if !self.selection.contains(&id) {
                    self.set_selection(vec![id]);
                }
                self.drag_last = Some(world);
                self.drag_moved = false;
            }
            _ => {
                self.set_selection(Vec::new());
            }
        }
        Ok(())
    }

    fn release_select(&mut self) -> EditorResult<()> {
        if self.drag_last.take().is_some() && self.drag_moved {
            self.surface.commit_transform();
            self.commit();
        }
        self.drag_moved = false;
        Ok(())
    }

    fn drag_selection_to(&mut self, world: Point) {
        let Some(last) = self.drag_last else {
            return;
        };
        let delta = world - last;
        if delta.hypot2() < f64::EPSILON {
            return;
        }
        let ids = self.selection.clone();
        for id in ids {
            if let Some(shape) = self.document.find_shape_mut(id) {
                if shape.meta().locked {
                    continue;
                }
                shape.transform(Affine::translate(delta));
            }
        }
        self.drag_last = Some(world);
        self.drag_moved = true;
    }

    fn update_group_highlight(&mut self, world: Point) {
        let tolerance = self.hit_tolerance();
        let child = self
            .group_mode
            .active_group()
            .and_then(|gid| self.document.get_shape(gid))
            .and_then(Shape::as_group)
            .and_then(|g| g.child_at(world, tolerance))
            .map(Shape::id);
        self.group_mode.set_highlighted_child(child);
    }

    /// The group a double click should open: the surface's finer-grained
    /// hit result when available, otherwise the topmost geometric hit.
    fn resolve_group_target(&self, world: Point, tolerance: f64) -> Option<ShapeId> {
        if let Some(hit) = self.surface.deepest_hit(world) {
            let shape = self.document.find_shape(hit)?;
            if shape.is_group() {
                return Some(hit);
            }
            if let Some(parent) = shape.meta().parent {
                return Some(parent);
            }
            return None;
        }
        self.document
            .topmost_at(world, tolerance)
            .filter(|s| s.is_group())
            .map(Shape::id)
    }

    // -- pen tool --------------------------------------------------------

    fn press_pen(
        &mut self,
        world: Point,
        double_click: bool,
        modifiers: Modifiers,
    ) -> EditorResult<()> {
        if double_click && self.pen.is_drawing() {
            return self.finish_pen(modifiers.shift);
        }
        match self.pen.press(world) {
            PenPress::CloseRequested => self.finish_pen(true),
            PenPress::Started | PenPress::Added => {
                self.pen_dragging = true;
                Ok(())
            }
        }
    }

    fn finish_pen(&mut self, closed: bool) -> EditorResult<()> {
        self.pen_dragging = false;
        if let Some(mut path) = self.pen.finalize(closed) {
            path.style = self.tools.current_style.clone();
            // Closed paths pick up the foreground as fill; open ones
            // stay stroke-only
            if closed {
                path.style.fill_color = Some(self.foreground);
            }
            let mut shape = Shape::Path(path);
            shape.meta_mut().selectable = true;
            shape.meta_mut().evented = true;
            let id = self.document.add_shape(shape);
            self.set_selection(vec![id]);
            self.commit();
        }
        Ok(())
    }

    // -- picking tools ---------------------------------------------------

    fn press_text(&mut self, world: Point) -> EditorResult<()> {
        let mut text = Text::new(world, String::new());
        text.style = self.tools.current_style.clone();
        let mut shape = Shape::Text(text);
        shape.meta_mut().selectable = true;
        shape.meta_mut().evented = true;
        let id = self.document.add_shape(shape);
        self.commit();
        // Hand control straight back to selection so typing happens on a
        // selected, movable object
        self.set_tool(ToolKind::RubberBand);
        self.set_selection(vec![id]);
        self.editing_text = Some(id);
        Ok(())
    }

    fn press_eyedropper(&mut self, world: Point, screen: Point) {
        let tolerance = self.hit_tolerance();
        let picked = match self.document.topmost_at(world, tolerance) {
            Some(shape) => {
                if shape.is_line_like() {
                    shape.style().stroke_color
                } else {
                    shape
                        .style()
                        .fill_color
                        .unwrap_or(shape.style().stroke_color)
                }
            }
            None => self.surface.sample_pixel(screen),
        };
        self.set_foreground(picked);
    }

    fn press_paint_bucket(&mut self, world: Point) -> EditorResult<()> {
        let tolerance = self.hit_tolerance();
        let Some(id) = self.document.topmost_at(world, tolerance).map(Shape::id) else {
            return Ok(());
        };
        let fill = self.foreground;
        if let Some(shape) = self.document.get_shape_mut(id) {
            shape.style_mut().fill_color = Some(fill);
        }
        self.commit();
        Ok(())
    }

    fn press_eraser(&mut self, world: Point) -> EditorResult<()> {
        let tolerance = self.hit_tolerance();
        let Some(id) = self.document.topmost_at(world, tolerance).map(Shape::id) else {
            return Ok(());
        };
        self.document.remove_shape(id);
        self.selection.retain(|&s| s != id);
        self.commit();
        Ok(())
    }

    // -- commands --------------------------------------------------------

    pub fn set_tool(&mut self, tool: ToolKind) {
        if self.group_mode.is_interactive() {
            self.group_mode.exit(&mut self.document);
        }
        self.pen.cancel();
        self.rubber_band = None;
        self.pan_anchor = None;
        self.drag_last = None;
        self.tools.set_tool(tool);
        apply_tool_interactivity(&mut self.document, tool);
        if !matches!(tool, ToolKind::Select | ToolKind::RubberBand) {
            self.selection.clear();
            self.editing_text = None;
        }
    }

    pub fn set_foreground(&mut self, color: SerializableColor) {
        self.foreground = color;
        self.tools.current_style.stroke_color = color;
    }

    pub fn set_background(&mut self, color: SerializableColor) {
        self.background = color;
        self.document.background = color;
    }

    pub fn group_selection(&mut self) -> EditorResult<ShapeId> {
        let ids = self.selection.clone();
        let gid = self.document.group_shapes(&ids)?;
        self.set_selection(vec![gid]);
        self.commit();
        Ok(gid)
    }

    pub fn ungroup_selection(&mut self) -> EditorResult<()> {
        let [id] = self.selection[..] else {
            return Err(EditorError::InvalidOperation(
                "ungroup needs exactly one group selected",
            ));
        };
        let freed = self.document.ungroup_shape(id)?;
        // Freed children come back under the current tool's rules
        apply_tool_interactivity(&mut self.document, self.tools.current_tool);
        self.set_selection(freed);
        self.commit();
        Ok(())
    }

    pub fn align_selection(&mut self, mode: AlignMode) -> EditorResult<()> {
        let ids = self.selection.clone();
        align_shapes(&mut self.document, &ids, mode)?;
        self.commit();
        Ok(())
    }

    pub fn bring_to_front(&mut self) {
        for &id in &self.selection {
            self.document.bring_to_front(id);
        }
        self.commit();
    }

    pub fn send_to_back(&mut self) {
        for &id in self.selection.iter().rev() {
            self.document.send_to_back(id);
        }
        self.commit();
    }

    pub fn bring_forward(&mut self) {
        for &id in &self.selection {
            self.document.bring_forward(id);
        }
        self.commit();
    }

    pub fn send_backward(&mut self) {
        for &id in &self.selection {
            self.document.send_backward(id);
        }
        self.commit();
    }

    /// Mirror the selected objects' positions across the vertical axis
    /// of the selection's union bounds.
    pub fn flip_horizontal(&mut self) -> EditorResult<()> {
        self.flip(true)
    }

    /// Mirror the selected objects' positions across the horizontal axis
    /// of the selection's union bounds.
    pub fn flip_vertical(&mut self) -> EditorResult<()> {
        self.flip(false)
    }

    fn flip(&mut self, horizontal: bool) -> EditorResult<()> {
        let entries: Vec<(ShapeId, Rect)> = self
            .selection
            .iter()
            .filter_map(|&id| self.document.get_shape(id).map(|s| (id, s.bounds())))
            .collect();
        if entries.is_empty() {
            return Err(EditorError::InvalidOperation("nothing selected to flip"));
        }
        let union = entries
            .iter()
            .skip(1)
            .fold(entries[0].1, |r, (_, b)| r.union(*b));
        for (id, bounds) in entries {
            let delta = if horizontal {
                Vec2::new((union.x0 + union.x1) - (bounds.x0 + bounds.x1), 0.0)
            } else {
                Vec2::new(0.0, (union.y0 + union.y1) - (bounds.y0 + bounds.y1))
            };
            if delta.hypot2() > f64::EPSILON
                && let Some(shape) = self.document.get_shape_mut(id)
            {
                shape.transform(Affine::translate(delta));
            }
        }
        self.commit();
        Ok(())
    }

    /// Rotate each selected object by `angle` radians. Kinds with a
    /// rotation field accumulate it; line-like kinds rotate their
    /// geometry about their own center.
    pub fn rotate_selection(&mut self, angle: f64) -> EditorResult<()> {
        if self.selection.is_empty() {
            return Err(EditorError::InvalidOperation("nothing selected to rotate"));
        }
        let ids = self.selection.clone();
        for id in ids {
            if let Some(shape) = self.document.get_shape_mut(id) {
                if shape.supports_rotation() {
                    let current = shape.rotation();
                    shape.set_rotation(current + angle);
                } else {
                    let center = shape.bounds().center();
                    shape.transform(Affine::rotate_about(angle, center));
                }
            }
        }
        self.commit();
        Ok(())
    }

    pub fn delete_selection(&mut self) -> EditorResult<()> {
        if self.selection.is_empty() {
            return Ok(());
        }
        let ids = std::mem::take(&mut self.selection);
        for id in ids {
            self.document.remove_shape(id);
        }
        self.commit();
        Ok(())
    }

    pub fn set_text_content(&mut self, id: ShapeId, content: &str) -> EditorResult<()> {
        match self.document.find_shape_mut(id) {
            Some(Shape::Text(text)) => {
                text.content = content.to_string();
                self.commit();
                Ok(())
            }
            _ => Err(EditorError::InvalidOperation("not a text object")),
        }
    }

    // -- history ---------------------------------------------------------

    /// Record the current document state. Failures are logged rather
    /// than bubbled so a snapshot problem never aborts an edit that
    /// already happened.
    pub fn commit(&mut self) {
        if let Err(err) = self.history.capture(&self.document) {
            log::error!("history capture failed: {err}");
        }
        self.layers = project_layers(&self.document);
    }

    pub fn undo(&mut self) -> EditorResult<()> {
        self.restore(|history, document| history.undo(document))
    }

    pub fn redo(&mut self) -> EditorResult<()> {
        self.restore(|history, document| history.redo(document))
    }

    fn restore(
        &mut self,
        step: impl FnOnce(&mut History, &mut Document) -> EditorResult<bool>,
    ) -> EditorResult<()> {
        if self.group_mode.is_interactive() {
            self.group_mode.exit(&mut self.document);
        }
        if step(&mut self.history, &mut self.document)? {
            // Restored state predates the selection; start clean
            self.selection.clear();
            self.editing_text = None;
            apply_tool_interactivity(&mut self.document, self.tools.current_tool);
            self.layers = project_layers(&self.document);
        }
        Ok(())
    }
}
