//! Backing store abstraction.
//!
//! The factory persists and removes instances only through [`DocumentStore`].
//! [`InMemoryStore`] is the implementation used by test suites that do not
//! need a real database.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use docbakery_signals::{Signal, SignalError};
use parking_lot::RwLock;
use serde_json::Value;
use thiserror::Error;

use crate::instance::DocumentInstance;
use crate::schema::Schema;

/// Errors raised by a backing store.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum StoreError {
	/// The store cannot be reached.
	#[error("Store unavailable: {0}")]
	Unavailable(String),

	/// Embedded instances have no identity and cannot be stored on their own.
	#[error("Cannot persist embedded instance of {0}")]
	NotPersistable(String),

	/// A post-save receiver failed; the write was undone.
	#[error("Post-save hook failed: {0}")]
	Hook(#[from] SignalError),

	/// Driver-specific failure.
	#[error("Store error: {0}")]
	Backend(String),
}

/// Result type alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Persistence operations the factory relies on.
#[async_trait]
pub trait DocumentStore: Send + Sync {
	/// Write `instance`, assigning an identity when it has none.
	///
	/// Implementations fire the post-save signal with the schema name as
	/// sender once the write succeeded. If a receiver fails the write is
	/// undone before the error is returned, so an `Err` never leaves a
	/// document behind.
	async fn persist(&self, instance: &mut DocumentInstance) -> StoreResult<()>;

	/// Delete `instance`. Returns `false` if it was already gone.
	async fn remove(&self, instance: &DocumentInstance) -> StoreResult<bool>;

	/// Number of stored instances of `schema`.
	async fn count_of(&self, schema: &Schema) -> StoreResult<usize>;
}

fn id_key(id: &Value) -> String {
	match id {
		Value::String(s) => s.clone(),
		other => other.to_string(),
	}
}

/// Collections of instances keyed by schema name, kept in memory.
pub struct InMemoryStore {
	collections: RwLock<HashMap<String, Vec<(String, DocumentInstance)>>>,
	post_save: Signal<DocumentInstance>,
	available: AtomicBool,
}

impl InMemoryStore {
	/// Create an empty store firing `post_save` after each write.
	pub fn new(post_save: Signal<DocumentInstance>) -> Self {
		Self {
			collections: RwLock::new(HashMap::new()),
			post_save,
			available: AtomicBool::new(true),
		}
	}

	/// Post-save signal this store fires.
	pub fn post_save(&self) -> &Signal<DocumentInstance> {
		&self.post_save
	}

	/// Simulate an outage: while unavailable every operation fails.
	pub fn set_available(&self, available: bool) {
		self.available.store(available, Ordering::SeqCst);
	}

	fn ensure_available(&self) -> StoreResult<()> {
		if self.available.load(Ordering::SeqCst) {
			Ok(())
		} else {
			Err(StoreError::Unavailable("in-memory store switched off".to_string()))
		}
	}

	// A failed post-save leaves the collection as it was before the write.
	fn roll_back(&self, schema: &str, key: &str, previous: Option<DocumentInstance>) {
		let mut collections = self.collections.write();
		let Some(documents) = collections.get_mut(schema) else {
			return;
		};
		match previous {
			Some(previous) => {
				if let Some((_, current)) = documents.iter_mut().find(|(stored, _)| stored == key) {
					*current = previous;
				}
			}
			None => documents.retain(|(stored, _)| stored != key),
		}
	}

	/// Look up a stored instance by schema name and identity.
	pub fn get(&self, schema: &str, id: &Value) -> Option<DocumentInstance> {
		let key = id_key(id);
		self.collections
			.read()
			.get(schema)?
			.iter()
			.find(|(stored, _)| *stored == key)
			.map(|(_, instance)| instance.clone())
	}

	/// Every stored instance of `schema`, in insertion order.
	pub fn all(&self, schema: &str) -> Vec<DocumentInstance> {
		self.collections
			.read()
			.get(schema)
			.map(|docs| docs.iter().map(|(_, instance)| instance.clone()).collect())
			.unwrap_or_default()
	}

	/// Total number of stored instances.
	pub fn len(&self) -> usize {
		self.collections.read().values().map(Vec::len).sum()
	}

	/// Returns true if nothing is stored.
	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}
}

impl std::fmt::Debug for InMemoryStore {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("InMemoryStore")
			.field("documents", &self.len())
			.field("available", &self.available.load(Ordering::SeqCst))
			.finish()
	}
}

#[async_trait]
impl DocumentStore for InMemoryStore {
	async fn persist(&self, instance: &mut DocumentInstance) -> StoreResult<()> {
		self.ensure_available()?;
		let schema = instance.schema().name().to_string();
		if instance.schema().is_embedded() {
			return Err(StoreError::NotPersistable(schema));
		}

		let id = match instance.id() {
			Some(id) => id.clone(),
			None => {
				let id = Value::String(uuid::Uuid::new_v4().to_string());
				instance.set_id(id.clone());
				id
			}
		};
		let key = id_key(&id);

		let previous = {
			let mut collections = self.collections.write();
			let documents = collections.entry(schema.clone()).or_default();
			match documents.iter_mut().find(|(stored, _)| *stored == key) {
				Some((_, existing)) => Some(std::mem::replace(existing, instance.clone())),
				None => {
					documents.push((key.clone(), instance.clone()));
					None
				}
			}
		};
		tracing::trace!(schema = schema.as_str(), id = %id, "document stored");

		if let Err(error) = self
			.post_save
			.send_with_sender(instance.clone(), Some(&schema))
			.await
		{
			self.roll_back(&schema, &key, previous);
			tracing::debug!(schema = schema.as_str(), id = %id, "write rolled back after hook failure");
			return Err(error.into());
		}
		Ok(())
	}

	async fn remove(&self, instance: &DocumentInstance) -> StoreResult<bool> {
		self.ensure_available()?;
		let Some(id) = instance.id() else {
			return Ok(false);
		};
		let key = id_key(id);
		let mut collections = self.collections.write();
		let Some(documents) = collections.get_mut(instance.schema().name()) else {
			return Ok(false);
		};
		let before = documents.len();
		documents.retain(|(stored, _)| *stored != key);
		Ok(documents.len() < before)
	}

	async fn count_of(&self, schema: &Schema) -> StoreResult<usize> {
		self.ensure_available()?;
		Ok(self
			.collections
			.read()
			.get(schema.name())
			.map_or(0, Vec::len))
	}
}
