//! Node templates: the built-in set, the remote store for user-defined ones,
//! and the palette that merges the two.
//!
//! Writes to the remote store are always followed by a full re-fetch. The
//! palette only ever swaps in a complete list, so a failed or superseded
//! request leaves the previous list in place.

use std::cell::RefCell;

use gloo_net::http::Request;
use log::{debug, warn};
use serde::Deserialize;
use thiserror::Error;

use super::ids::{self, is_custom_template};
use super::types::{Field, FieldId, FieldKind, FieldType, NodeTemplate};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateStoreError {
	#[error("template store unreachable: {0}")]
	Network(String),
	#[error("unexpected template store response: {0}")]
	Decode(String),
	#[error("template store rejected the request: {0}")]
	Rejected(String),
}

/// The remote CRUD contract for custom templates; `id` is the only key.
#[allow(async_fn_in_trait)]
pub trait TemplateStore {
	async fn list(&self) -> Result<Vec<NodeTemplate>, TemplateStoreError>;

	/// Replaces the template with the same id, or appends it.
	async fn save(&self, template: &NodeTemplate) -> Result<(), TemplateStoreError>;

	async fn delete(&self, id: &str) -> Result<(), TemplateStoreError>;
}

#[derive(Deserialize)]
struct WriteAck {
	#[serde(default)]
	success: bool,
}

/// `GET/POST /nodes`, `DELETE /nodes/{id}` over fetch.
#[derive(Clone, Debug)]
pub struct HttpTemplateStore {
	base_url: String,
}

impl HttpTemplateStore {
	pub fn new(base_url: impl Into<String>) -> Self {
		Self {
			base_url: base_url.into(),
		}
	}

	fn nodes_url(&self) -> String {
		format!("{}/nodes", self.base_url)
	}

	async fn expect_ack(response: gloo_net::http::Response) -> Result<(), TemplateStoreError> {
		if !response.ok() {
			return Err(TemplateStoreError::Rejected(format!("HTTP {}", response.status())));
		}
		let ack: WriteAck = response
			.json()
			.await
			.map_err(|e| TemplateStoreError::Decode(e.to_string()))?;
		if ack.success {
			Ok(())
		} else {
			Err(TemplateStoreError::Rejected("success flag not set".to_owned()))
		}
	}
}

impl TemplateStore for HttpTemplateStore {
	async fn list(&self) -> Result<Vec<NodeTemplate>, TemplateStoreError> {
		let response = Request::get(&self.nodes_url())
			.send()
			.await
			.map_err(|e| TemplateStoreError::Network(e.to_string()))?;
		if !response.ok() {
			return Err(TemplateStoreError::Rejected(format!("HTTP {}", response.status())));
		}
		response
			.json()
			.await
			.map_err(|e| TemplateStoreError::Decode(e.to_string()))
	}

	async fn save(&self, template: &NodeTemplate) -> Result<(), TemplateStoreError> {
		let response = Request::post(&self.nodes_url())
			.json(template)
			.map_err(|e| TemplateStoreError::Decode(e.to_string()))?
			.send()
			.await
			.map_err(|e| TemplateStoreError::Network(e.to_string()))?;
		Self::expect_ack(response).await
	}

	async fn delete(&self, id: &str) -> Result<(), TemplateStoreError> {
		let url = format!(
			"{}/{}",
			self.nodes_url(),
			String::from(js_sys::encode_uri_component(id))
		);
		let response = Request::delete(&url)
			.send()
			.await
			.map_err(|e| TemplateStoreError::Network(e.to_string()))?;
		Self::expect_ack(response).await
	}
}

/// A store held in memory with the same upsert semantics as the service.
#[derive(Debug, Default)]
pub struct MemoryTemplateStore {
	templates: RefCell<Vec<NodeTemplate>>,
	offline: RefCell<bool>,
}

impl MemoryTemplateStore {
	/// Makes every following request fail with a network error.
	pub fn set_offline(&self, offline: bool) {
		*self.offline.borrow_mut() = offline;
	}

	fn check(&self) -> Result<(), TemplateStoreError> {
		if *self.offline.borrow() {
			Err(TemplateStoreError::Network("offline".to_owned()))
		} else {
			Ok(())
		}
	}
}

impl TemplateStore for MemoryTemplateStore {
	async fn list(&self) -> Result<Vec<NodeTemplate>, TemplateStoreError> {
		self.check()?;
		Ok(self.templates.borrow().clone())
	}

	async fn save(&self, template: &NodeTemplate) -> Result<(), TemplateStoreError> {
		self.check()?;
		let mut templates = self.templates.borrow_mut();
		match templates.iter_mut().find(|t| t.id == template.id) {
			Some(existing) => *existing = template.clone(),
			None => templates.push(template.clone()),
		}
		Ok(())
	}

	async fn delete(&self, id: &str) -> Result<(), TemplateStoreError> {
		self.check()?;
		self.templates.borrow_mut().retain(|t| t.id != id);
		Ok(())
	}
}

pub async fn save_and_refresh<S: TemplateStore>(
	store: &S,
	template: &NodeTemplate,
) -> Result<Vec<NodeTemplate>, TemplateStoreError> {
	store.save(template).await?;
	store.list().await
}

pub async fn delete_and_refresh<S: TemplateStore>(
	store: &S,
	id: &str,
) -> Result<Vec<NodeTemplate>, TemplateStoreError> {
	store.delete(id).await?;
	store.list().await
}

/// Deletes every listed custom template, then re-fetches. Stops at the first
/// failed delete.
pub async fn reset_and_refresh<S: TemplateStore>(
	store: &S,
	ids: &[String],
) -> Result<Vec<NodeTemplate>, TemplateStoreError> {
	for id in ids {
		store.delete(id).await?;
	}
	store.list().await
}

/// Identifies one resync request; later tickets supersede earlier ones.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct SyncTicket(u64);

/// The node palette: built-in templates plus the last fetched custom list.
#[derive(Clone, Debug, Default)]
pub struct TemplatePalette {
	builtins: Vec<NodeTemplate>,
	custom: Vec<NodeTemplate>,
	issued: u64,
	applied: u64,
}

impl TemplatePalette {
	pub fn new(builtins: Vec<NodeTemplate>) -> Self {
		Self {
			builtins,
			..Self::default()
		}
	}

	pub fn custom(&self) -> &[NodeTemplate] {
		&self.custom
	}

	pub fn custom_ids(&self) -> Vec<String> {
		self.custom
			.iter()
			.filter(|t| is_custom_template(&t.id))
			.map(|t| t.id.clone())
			.collect()
	}

	pub fn get(&self, id: &str) -> Option<&NodeTemplate> {
		self.custom
			.iter()
			.chain(&self.builtins)
			.find(|t| t.id == id)
	}

	/// Built-ins then custom templates, one entry per id; a custom template
	/// replaces a built-in with the same id in place.
	pub fn templates(&self) -> Vec<&NodeTemplate> {
		let mut merged: Vec<&NodeTemplate> = Vec::with_capacity(self.builtins.len() + self.custom.len());
		for template in self.builtins.iter().chain(&self.custom) {
			match merged.iter_mut().find(|t| t.id == template.id) {
				Some(slot) => *slot = template,
				None => merged.push(template),
			}
		}
		merged
	}

	/// Templates whose label contains `query`, ignoring case.
	pub fn search(&self, query: &str) -> Vec<&NodeTemplate> {
		let query = query.trim().to_lowercase();
		self.templates()
			.into_iter()
			.filter(|t| t.label.to_lowercase().contains(&query))
			.collect()
	}

	pub fn begin_sync(&mut self) -> SyncTicket {
		self.issued += 1;
		SyncTicket(self.issued)
	}

	/// Applies a fetched list unless a newer request has already landed.
	/// Returns whether the palette changed.
	pub fn finish_sync(
		&mut self,
		ticket: SyncTicket,
		result: Result<Vec<NodeTemplate>, TemplateStoreError>,
	) -> bool {
		match result {
			Ok(_) if ticket.0 <= self.applied => {
				debug!("dropping superseded template list #{}", ticket.0);
				false
			}
			Ok(templates) => {
				debug!("template list #{} applied ({} templates)", ticket.0, templates.len());
				self.applied = ticket.0;
				self.custom = templates;
				true
			}
			Err(e) => {
				warn!("template sync #{} failed, keeping previous list: {e}", ticket.0);
				false
			}
		}
	}
}

/// Templates every palette starts with.
pub fn builtin_templates() -> Vec<NodeTemplate> {
	let mut note = NodeTemplate::new("builtin_note", "customNode", "Note").with_field(Field::new(
		FieldId::new("text"),
		"Text",
		FieldKind::empty(FieldType::Text),
	));
	note.color = Some("#fff9c4".to_owned());

	let decision = NodeTemplate::new("builtin_decision", "customNode", "Decision").with_field(
		Field::new(
			FieldId::new("outcome"),
			"Outcome",
			FieldKind::Radio {
				options: vec!["Yes".to_owned(), "No".to_owned()],
				value: String::new(),
			},
		),
	);

	let task = NodeTemplate::new("builtin_task", "customNode", "Task")
		.with_field(Field::new(
			FieldId::new("owner"),
			"Owner",
			FieldKind::empty(FieldType::Text),
		))
		.with_field(Field::new(
			FieldId::new("status"),
			"Status",
			FieldKind::Dropdown {
				options: vec!["Todo".to_owned(), "Doing".to_owned(), "Done".to_owned()],
				value: "Todo".to_owned(),
			},
		));

	vec![note, decision, task]
}

/// Whether the palette should offer edit/delete for this template.
pub fn is_editable(template: &NodeTemplate) -> bool {
	ids::is_custom_template(&template.id)
}
