//! Post-save hook suspension and per-schema serialization.

use std::collections::HashMap;
use std::sync::Arc;

use docbakery_signals::Signal;
use parking_lot::Mutex;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use crate::instance::DocumentInstance;
use crate::schema::{LifecycleHook, Schema};

/// Connect `schema`'s post-save hook for the schema's sender.
///
/// Returns `false` when the schema declares no hook. Connecting twice keeps a
/// single registration.
pub fn connect_lifecycle_hook(signal: &Signal<DocumentInstance>, schema: &Schema) -> bool {
	let Some(hook) = schema.hook() else {
		return false;
	};
	signal.connect_receiver(
		hook.receiver(),
		Some(schema.name()),
		Some(hook.dispatch_uid().to_string()),
		0,
	);
	true
}

/// Keeps a schema's post-save hook disconnected while alive.
///
/// Dropping the guard reconnects the hook exactly once, whether baking
/// finished, failed, or unwound.
#[must_use = "the hook is reconnected as soon as the guard is dropped"]
#[derive(Debug)]
pub struct HookGuard {
	signal: Signal<DocumentInstance>,
	sender: String,
	hook: Option<LifecycleHook>,
}

impl HookGuard {
	/// Disconnect `schema`'s hook. A no-op for schemas without one.
	pub fn suspend(signal: &Signal<DocumentInstance>, schema: &Schema) -> Self {
		let hook = schema.hook().cloned();
		if let Some(hook) = &hook {
			let was_connected = signal.disconnect_for(hook.dispatch_uid(), schema.name());
			tracing::debug!(
				schema = schema.name(),
				dispatch_uid = hook.dispatch_uid(),
				was_connected,
				"post-save hook suspended"
			);
		}
		Self {
			signal: signal.clone(),
			sender: schema.name().to_string(),
			hook,
		}
	}

	/// Whether the guard holds a hook to restore.
	pub fn is_active(&self) -> bool {
		self.hook.is_some()
	}
}

impl Drop for HookGuard {
	fn drop(&mut self) {
		if let Some(hook) = self.hook.take() {
			self.signal.connect_receiver(
				hook.receiver(),
				Some(&self.sender),
				Some(hook.dispatch_uid().to_string()),
				0,
			);
			tracing::debug!(
				schema = self.sender.as_str(),
				dispatch_uid = hook.dispatch_uid(),
				"post-save hook restored"
			);
		}
	}
}

/// One async mutex per schema name.
///
/// A `make` call holds the locks of every schema it may touch for the whole
/// suspend, build, restore span, so two calls never observe each other's
/// suspended hooks.
#[derive(Debug, Clone, Default)]
pub struct SchemaLocks {
	locks: Arc<Mutex<HashMap<String, Arc<AsyncMutex<()>>>>>,
}

impl SchemaLocks {
	/// Create an empty lock table.
	pub fn new() -> Self {
		Self::default()
	}

	fn lock_for(&self, name: &str) -> Arc<AsyncMutex<()>> {
		Arc::clone(
			self.locks
				.lock()
				.entry(name.to_string())
				.or_insert_with(|| Arc::new(AsyncMutex::new(()))),
		)
	}

	/// Lock a single schema.
	pub async fn acquire(&self, schema: &Schema) -> OwnedMutexGuard<()> {
		self.lock_for(schema.name()).lock_owned().await
	}

	/// Lock every schema in `schemas`.
	///
	/// Locks are taken in name order, with duplicates skipped, so concurrent
	/// callers with overlapping sets cannot deadlock.
	pub async fn acquire_all(&self, schemas: &[Arc<Schema>]) -> Vec<OwnedMutexGuard<()>> {
		let mut ordered: Vec<&Schema> = schemas.iter().map(|schema| &**schema).collect();
		ordered.sort_unstable_by(|a, b| a.name().cmp(b.name()));
		ordered.dedup_by(|a, b| a.name() == b.name());

		let mut guards = Vec::with_capacity(ordered.len());
		for schema in ordered {
			guards.push(self.acquire(schema).await);
		}
		guards
	}

	/// Number of schemas that have a lock.
	pub fn len(&self) -> usize {
		self.locks.lock().len()
	}

	/// Returns true if no schema has been locked yet.
	pub fn is_empty(&self) -> bool {
		self.locks.lock().is_empty()
	}
}
