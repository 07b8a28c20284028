//! Diagram state: the graph and every operation that changes it, undo/redo,
//! the clipboard, keyboard routing, persistence and node templates.
//!
//! Nothing here draws. The components call into [`FlowEditor`] and re-render
//! whatever graph it exposes.

pub mod builder;
pub mod clipboard;
pub mod editor;
pub mod history;
pub mod ids;
pub mod keymap;
pub mod persistence;
pub mod store;
pub mod templates;
pub mod types;

pub use editor::{FlowEditor, Selection};
pub use store::{GraphStore, Placement};
pub use persistence::{DocumentError, LocalStorage, MemoryStorage, Persistence, StorageError};
pub use templates::{HttpTemplateStore, TemplatePalette, TemplateStore, TemplateStoreError};
pub use types::{
	Connection, Edge, EdgeData, EdgeDataPatch, EdgeId, EdgeRoute, EdgeStyle, Field, FieldId,
	FieldKind, FieldPatch, FieldType, FieldValue, Graph, Node, NodeData, NodeDataPatch, NodeId,
	NodeTemplate, Position, Size,
};
