//! Diagram persistence: the `{nodes, edges}` document, local storage
//! auto-save, and file export/import.

use std::cell::RefCell;

use thiserror::Error;

use super::types::Graph;

#[derive(Debug, Error)]
pub enum DocumentError {
	#[error("invalid graph JSON: {0}")]
	Json(#[from] serde_json::Error),
	#[error("graph document must be a JSON object")]
	NotAnObject,
	#[error("graph document is missing `{0}`")]
	MissingKey(&'static str),
}

#[derive(Debug, Error)]
pub enum StorageError {
	#[error("local storage is not available")]
	Unavailable,
	#[error("failed to write local storage: {0}")]
	Write(String),
	#[error(transparent)]
	Document(#[from] DocumentError),
}

/// Serializes a diagram as a pretty-printed `{nodes, edges}` document.
pub fn export_document(graph: &Graph) -> Result<Vec<u8>, DocumentError> {
	Ok(serde_json::to_vec_pretty(graph)?)
}

/// Parses a `{nodes, edges}` document. Nothing is returned unless the whole
/// document is valid, so a failed import can never half-apply.
pub fn import_document(bytes: &[u8]) -> Result<Graph, DocumentError> {
	let value: serde_json::Value = serde_json::from_slice(bytes)?;
	let object = value.as_object().ok_or(DocumentError::NotAnObject)?;
	for key in ["nodes", "edges"] {
		if !object.contains_key(key) {
			return Err(DocumentError::MissingKey(key));
		}
	}
	Ok(serde_json::from_value(value)?)
}

/// Where the live diagram is auto-saved and restored from.
pub trait Persistence {
	/// The saved diagram, `None` when nothing is stored. Unreadable data is an
	/// error and stays in place.
	fn load(&self) -> Result<Option<Graph>, DocumentError>;

	fn save(&self, graph: &Graph) -> Result<(), StorageError>;

	fn export_document(&self, graph: &Graph) -> Result<Vec<u8>, DocumentError> {
		export_document(graph)
	}

	fn import_document(&self, bytes: &[u8]) -> Result<Graph, DocumentError> {
		import_document(bytes)
	}
}

/// Browser `localStorage` under a single key.
#[derive(Clone, Debug)]
pub struct LocalStorage {
	key: String,
}

impl LocalStorage {
	pub fn new(key: impl Into<String>) -> Self {
		Self { key: key.into() }
	}

	fn storage() -> Option<web_sys::Storage> {
		web_sys::window()?.local_storage().ok().flatten()
	}
}

impl Persistence for LocalStorage {
	fn load(&self) -> Result<Option<Graph>, DocumentError> {
		let Some(raw) = Self::storage().and_then(|s| s.get_item(&self.key).ok().flatten()) else {
			return Ok(None);
		};
		import_document(raw.as_bytes()).map(Some)
	}

	fn save(&self, graph: &Graph) -> Result<(), StorageError> {
		let storage = Self::storage().ok_or(StorageError::Unavailable)?;
		let json = serde_json::to_string(graph).map_err(DocumentError::from)?;
		storage
			.set_item(&self.key, &json)
			.map_err(|e| StorageError::Write(format!("{e:?}")))
	}
}

/// Keeps the saved document in memory; for tests and storage-less hosts.
#[derive(Debug, Default)]
pub struct MemoryStorage {
	saved: RefCell<Option<String>>,
}

impl MemoryStorage {
	pub fn with_raw(raw: impl Into<String>) -> Self {
		Self {
			saved: RefCell::new(Some(raw.into())),
		}
	}

	pub fn raw(&self) -> Option<String> {
		self.saved.borrow().clone()
	}
}

impl Persistence for MemoryStorage {
	fn load(&self) -> Result<Option<Graph>, DocumentError> {
		self.saved
			.borrow()
			.as_ref()
			.map(|raw| import_document(raw.as_bytes()))
			.transpose()
	}

	fn save(&self, graph: &Graph) -> Result<(), StorageError> {
		let json = serde_json::to_string(graph).map_err(DocumentError::from)?;
		*self.saved.borrow_mut() = Some(json);
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn missing_keys_are_rejected() {
		assert!(matches!(
			import_document(br#"{"nodes": []}"#),
			Err(DocumentError::MissingKey("edges"))
		));
		assert!(matches!(
			import_document(br#"{"edges": []}"#),
			Err(DocumentError::MissingKey("nodes"))
		));
		assert!(matches!(import_document(b"[1, 2]"), Err(DocumentError::NotAnObject)));
		assert!(matches!(import_document(b"{nope"), Err(DocumentError::Json(_))));
	}

	#[test]
	fn empty_document_is_an_empty_graph() {
		let graph = import_document(br#"{"nodes": [], "edges": [], "viewport": {}}"#).unwrap();
		assert!(graph.is_empty());
	}

	#[test]
	fn memory_storage_starts_empty() {
		assert!(matches!(MemoryStorage::default().load(), Ok(None)));

		let storage = MemoryStorage::default();
		storage.save(&Graph::default()).unwrap();
		assert_eq!(storage.load().unwrap(), Some(Graph::default()));
		assert_eq!(storage.raw().as_deref(), Some(r#"{"nodes":[],"edges":[]}"#));
	}

	#[test]
	fn corrupt_saved_data_is_reported_and_kept() {
		let storage = MemoryStorage::with_raw(r#"{"nodes": "oops"}"#);
		assert!(storage.load().is_err());
		assert_eq!(storage.raw().as_deref(), Some(r#"{"nodes": "oops"}"#));
	}

	#[test]
	fn reads_documents_with_numeric_instance_and_field_ids() {
		let raw = br##"{
			"nodes": [{
				"id": "node-1712345678901-42", "type": "customNode",
				"position": {"x": 12.5, "y": 80}, "width": 200, "height": 120,
				"data": {
					"id": "custom_1712345678000", "type": "customNode", "label": "Visit",
					"color": "#ffcc00", "instanceId": 1712345678901.123,
					"fields": [{"id": 1712345678001, "type": "checkbox", "label": "checkbox field",
					            "options": ["a", "b"], "value": ["b"]}]
				}
			}],
			"edges": []
		}"##;
		let graph = import_document(raw).unwrap();
		let data = &graph.nodes[0].data;
		assert_eq!(data.instance_id, "1712345678901.123");
		assert_eq!(data.fields[0].id.as_str(), "1712345678001");

		let storage = MemoryStorage::with_raw(String::from_utf8_lossy(raw));
		assert_eq!(storage.load().unwrap(), Some(graph));
	}
}
