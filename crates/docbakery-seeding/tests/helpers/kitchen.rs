//! Schemas, stores and bakers shared by the integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use docbakery_seeding::prelude::*;

/// A baker wired to an in-memory store and a shared post-save signal.
pub struct Kitchen {
	pub signals: SignalRegistry,
	pub store: Arc<InMemoryStore>,
	pub baker: Baker,
}

impl Kitchen {
	pub fn new() -> Self {
		Self::with_settings(BakerSettings::default().with_seed(42))
	}

	pub fn with_settings(settings: BakerSettings) -> Self {
		let signals = SignalRegistry::new();
		let store = Arc::new(InMemoryStore::new(signals.post_save()));
		let baker = Baker::builder(store.clone())
			.post_save(signals.post_save())
			.settings(settings)
			.build()
			.unwrap();
		Self {
			signals,
			store,
			baker,
		}
	}

	pub fn post_save(&self) -> Signal<DocumentInstance> {
		self.signals.post_save()
	}
}

/// `Person{name, age, email}`, all required.
pub fn person() -> Arc<Schema> {
	Schema::document("Person")
		.module("app::people")
		.field(FieldDescriptor::text("name").required())
		.field(FieldDescriptor::integer("age").required())
		.field(FieldDescriptor::text("email").required())
		.build()
}

pub fn address() -> Arc<Schema> {
	Schema::embedded("Address")
		.module("app::people")
		.field(FieldDescriptor::text("city").required())
		.field(FieldDescriptor::text("zipcode").required())
		.build()
}

pub fn company() -> Arc<Schema> {
	Schema::document("Company")
		.module("app::companies")
		.field(FieldDescriptor::text("company").required())
		.field(FieldDescriptor::embedded("address", address()).required())
		.build()
}

/// Person with an embedded home address and a linked employer.
pub fn employee() -> Arc<Schema> {
	Schema::document("Employee")
		.module("app::people")
		.field(FieldDescriptor::text("name").required())
		.field(FieldDescriptor::embedded("home", address()).required())
		.field(FieldDescriptor::reference("employer", company()).required())
		.field(FieldDescriptor::list("skills").required())
		.field(FieldDescriptor::dict("meta").required())
		.field(FieldDescriptor::boolean("active").required())
		.field(FieldDescriptor::float("salary").required())
		.field(FieldDescriptor::datetime("hired_at").required())
		.field(FieldDescriptor::object_id("badge").required())
		.build()
}

/// Schema with a post-save hook counting its invocations.
pub fn hooked(name: &str, fired: Arc<AtomicUsize>) -> Arc<Schema> {
	Schema::document(name)
		.module("app::people")
		.field(FieldDescriptor::text("name").required())
		.hook(LifecycleHook::new(format!("{name}_post_save"), move |_| {
			let fired = Arc::clone(&fired);
			async move {
				fired.fetch_add(1, Ordering::SeqCst);
				Ok(())
			}
		}))
		.build()
}

/// Store that fails removals after `removals_allowed` successful ones.
pub struct FlakyStore {
	inner: InMemoryStore,
	removals_allowed: AtomicUsize,
}

impl FlakyStore {
	pub fn new(removals_allowed: usize) -> Self {
		Self {
			inner: InMemoryStore::new(SignalRegistry::new().post_save()),
			removals_allowed: AtomicUsize::new(removals_allowed),
		}
	}

	pub fn allow_removals(&self, count: usize) {
		self.removals_allowed.store(count, Ordering::SeqCst);
	}

	pub fn len(&self) -> usize {
		self.inner.len()
	}
}

#[async_trait]
impl DocumentStore for FlakyStore {
	async fn persist(&self, instance: &mut DocumentInstance) -> StoreResult<()> {
		self.inner.persist(instance).await
	}

	async fn remove(&self, instance: &DocumentInstance) -> StoreResult<bool> {
		let allowed = self.removals_allowed.load(Ordering::SeqCst);
		if allowed == 0 {
			return Err(StoreError::Unavailable("connection reset".to_string()));
		}
		self.removals_allowed.store(allowed - 1, Ordering::SeqCst);
		self.inner.remove(instance).await
	}

	async fn count_of(&self, schema: &Schema) -> StoreResult<usize> {
		self.inner.count_of(schema).await
	}
}
