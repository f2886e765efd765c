//! Vecboard: the core editing engine for an interactive vector canvas.
//!
//! The engine is headless: it owns the document model, tool gesture
//! handling, selection, grouping, snapshot undo/redo, pen path
//! construction, alignment commands and the layer-list projection, while
//! rendering and windowing stay on the host side behind the
//! [`surface::Surface`] trait. The host feeds pointer and key events
//! into an [`editor::Editor`] and draws from its state.

pub mod align;
pub mod camera;
pub mod document;
pub mod editor;
pub mod error;
pub mod group_mode;
pub mod history;
pub mod input;
pub mod layers;
pub mod pen;
pub mod shapes;
pub mod surface;
pub mod tools;

pub use align::AlignMode;
pub use camera::Camera;
pub use document::Document;
pub use editor::Editor;
pub use error::{EditorError, EditorResult};
pub use group_mode::{GroupInteraction, GroupMode};
pub use history::History;
pub use input::{InputState, KeyEvent, Modifiers, MouseButton, PointerEvent};
pub use layers::{LayerItem, project_layers};
pub use pen::{AnchorKind, AnchorPoint, PenBuilder};
pub use shapes::{
    Arrow, Circle, Ellipse, Group, Image, Line, ObjectMeta, Path, PathSeg, Polygon, Rectangle,
    SerializableColor, Shape, ShapeId, ShapeStyle, ShapeTrait, Star, Text,
};
pub use surface::{NullSurface, Surface};
pub use tools::{CursorStyle, ToolKind, ToolManager, ToolState};
