//! Editor settings.

use crate::flow::store::Placement;
use crate::flow::types::Size;

const DEFAULT_TEMPLATE_STORE_URL: &str = "http://localhost:5000";

#[derive(Clone, Debug, PartialEq)]
pub struct EditorConfig {
	/// Local-storage key holding the auto-saved diagram.
	pub storage_key: String,
	/// Base URL of the custom template service (`/nodes` lives under it).
	pub template_store_url: String,
	pub default_size: Size,
	pub spawn_extent: f64,
	pub paste_offset: f64,
	/// Undo depth cap; `None` keeps every snapshot.
	pub history_limit: Option<usize>,
	pub export_file_name: String,
}

impl Default for EditorConfig {
	fn default() -> Self {
		Self {
			storage_key: "flowState".to_owned(),
			template_store_url: option_env!("FLOW_TEMPLATE_STORE_URL")
				.unwrap_or(DEFAULT_TEMPLATE_STORE_URL)
				.trim_end_matches('/')
				.to_owned(),
			default_size: Size::default(),
			spawn_extent: 400.0,
			paste_offset: 20.0,
			history_limit: None,
			export_file_name: "graph.json".to_owned(),
		}
	}
}

impl EditorConfig {
	pub fn placement(&self) -> Placement {
		Placement {
			default_size: self.default_size,
			spawn_extent: self.spawn_extent,
		}
	}
}
