pub mod commands;
pub mod config;
pub mod edit;
pub mod editor;
pub mod input;
pub mod shortcuts;
pub mod tools;
pub mod view;

pub use commands::EditSession;
pub use config::EditorConfig;
pub use edit::{
    apply_wires, create_wire, delete_selection, drag_wire_segment, extend_wire, select,
    select_all, select_region,
};
pub use editor::SchematicEditor;
pub use input::{Button, InputEvent, Modifiers};
pub use tools::{DragKind, DragSession};
pub use view::ViewTransform;
