//! The baker: builds, persists and purges instances of document schemas.

use std::collections::HashSet;
use std::sync::Arc;

use docbakery_signals::{Signal, SignalName};
use futures::future::{BoxFuture, FutureExt};
use parking_lot::{Mutex, RwLock};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde_json::Value;

use crate::error::{BakeryError, BakeryResult};
use crate::generators::GeneratorRegistry;
use crate::hooks::{HookGuard, SchemaLocks};
use crate::instance::{DocumentInstance, Overrides};
use crate::patcher::{ModuleRegistry, SubstitutionScope};
use crate::schema::{FieldDescriptor, Schema};
use crate::settings::BakerSettings;
use crate::store::DocumentStore;
use crate::walker::{missing_required_fields, reachable_schemas};

/// Result of a `make` call.
#[derive(Debug, Clone)]
pub enum Baked {
	/// A single instance (quantity 1, or any embedded schema).
	One(DocumentInstance),
	/// Several instances in creation order.
	Many(Vec<DocumentInstance>),
}

impl Baked {
	/// Number of instances.
	pub fn len(&self) -> usize {
		match self {
			Self::One(_) => 1,
			Self::Many(instances) => instances.len(),
		}
	}

	/// Returns true for an empty `Many`.
	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// The single instance, or the first of `Many`.
	pub fn into_one(self) -> Option<DocumentInstance> {
		match self {
			Self::One(instance) => Some(instance),
			Self::Many(instances) => instances.into_iter().next(),
		}
	}

	/// All instances as a vector.
	pub fn into_vec(self) -> Vec<DocumentInstance> {
		match self {
			Self::One(instance) => vec![instance],
			Self::Many(instances) => instances,
		}
	}
}

/// Test-fixture factory for document schemas.
///
/// Every document the baker persists (including documents created for
/// reference fields) is recorded in its ledger until [`Baker::cleanup`]
/// removes it from the store.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use docbakery_seeding::prelude::*;
///
/// # tokio_test_block(async {
/// let signals = SignalRegistry::new();
/// let store = Arc::new(InMemoryStore::new(signals.post_save()));
/// let baker = Baker::builder(store.clone())
///     .post_save(signals.post_save())
///     .build()
///     .unwrap();
///
/// let person = Schema::document("Person")
///     .field(FieldDescriptor::text("name").required())
///     .field(FieldDescriptor::integer("age").required())
///     .build();
///
/// let ada = baker
///     .make_one(&person, Overrides::new().with("name", "Ada"))
///     .await
///     .unwrap();
/// assert_eq!(ada.get("name").and_then(|v| v.as_str()), Some("Ada"));
///
/// assert_eq!(baker.cleanup().await.unwrap(), 1);
/// assert!(store.is_empty());
/// # });
/// # fn tokio_test_block<F: std::future::Future>(f: F) -> F::Output {
/// #     tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(f)
/// # }
/// ```
pub struct Baker {
	store: Arc<dyn DocumentStore>,
	generators: Arc<GeneratorRegistry>,
	modules: ModuleRegistry,
	post_save: Signal<DocumentInstance>,
	settings: BakerSettings,
	rng: Mutex<StdRng>,
	mocked: RwLock<Vec<String>>,
	ledger: Mutex<Vec<DocumentInstance>>,
	locks: SchemaLocks,
}

/// Builder for [`Baker`].
pub struct BakerBuilder {
	store: Arc<dyn DocumentStore>,
	generators: Option<Arc<GeneratorRegistry>>,
	modules: ModuleRegistry,
	post_save: Option<Signal<DocumentInstance>>,
	settings: BakerSettings,
	mocked: Vec<String>,
}

impl BakerBuilder {
	/// Use a custom generator registry instead of the built-in one.
	pub fn generators(mut self, generators: Arc<GeneratorRegistry>) -> Self {
		self.generators = Some(generators);
		self
	}

	/// Module namespaces consulted when substituting collaborators.
	pub fn modules(mut self, modules: ModuleRegistry) -> Self {
		self.modules = modules;
		self
	}

	/// Post-save signal the store fires; hooks are suspended on it while baking.
	pub fn post_save(mut self, signal: Signal<DocumentInstance>) -> Self {
		self.post_save = Some(signal);
		self
	}

	/// Baker settings.
	pub fn settings(mut self, settings: BakerSettings) -> Self {
		self.settings = settings;
		self
	}

	/// Collaborator names to substitute during every `make` call.
	pub fn mock_dependencies<I, S>(mut self, names: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.mocked = names.into_iter().map(Into::into).collect();
		self
	}

	/// Build the baker.
	///
	/// # Errors
	///
	/// Returns [`BakeryError::Settings`] if the settings are invalid.
	pub fn build(self) -> BakeryResult<Baker> {
		self.settings.validate()?;
		let rng = match self.settings.seed {
			Some(seed) => StdRng::seed_from_u64(seed),
			None => StdRng::from_entropy(),
		};
		let generators = self
			.generators
			.unwrap_or_else(|| Arc::new(GeneratorRegistry::from_settings(&self.settings)));
		let post_save = self
			.post_save
			.unwrap_or_else(|| Signal::new(SignalName::POST_SAVE));

		Ok(Baker {
			store: self.store,
			generators,
			modules: self.modules,
			post_save,
			settings: self.settings,
			rng: Mutex::new(rng),
			mocked: RwLock::new(self.mocked),
			ledger: Mutex::new(Vec::new()),
			locks: SchemaLocks::new(),
		})
	}
}

impl Baker {
	/// Start building a baker over `store`.
	pub fn builder(store: Arc<dyn DocumentStore>) -> BakerBuilder {
		BakerBuilder {
			store,
			generators: None,
			modules: ModuleRegistry::new(),
			post_save: None,
			settings: BakerSettings::default(),
			mocked: Vec::new(),
		}
	}

	/// Baker over `store` with default settings and no hook signal.
	pub fn new(store: Arc<dyn DocumentStore>) -> BakeryResult<Self> {
		Self::builder(store).build()
	}

	/// Generator registry in use.
	pub fn generators(&self) -> &Arc<GeneratorRegistry> {
		&self.generators
	}

	/// Module namespaces in use.
	pub fn modules(&self) -> &ModuleRegistry {
		&self.modules
	}

	/// Settings in use.
	pub fn settings(&self) -> &BakerSettings {
		&self.settings
	}

	/// Replace the list of collaborator names substituted during `make`.
	pub fn mock_dependencies<I, S>(&self, names: I)
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		*self.mocked.write() = names.into_iter().map(Into::into).collect();
	}

	/// Collaborator names currently substituted during `make`.
	pub fn mocked_dependencies(&self) -> Vec<String> {
		self.mocked.read().clone()
	}

	/// Build `quantity` instances of `schema`.
	///
	/// Required fields are generated unless overridden; optional fields are
	/// only set through overrides. Document instances are persisted and
	/// recorded in the ledger. An embedded schema always yields exactly one
	/// instance that is neither persisted nor recorded.
	///
	/// While the call runs, declared collaborators are substituted and the
	/// post-save hooks of every schema involved are suspended. Both are
	/// restored before the call returns, on success or failure.
	///
	/// # Errors
	///
	/// - [`BakeryError::InvalidSchema`] if the schema (or a nested one) is not
	///   a document or embedded shape.
	/// - [`BakeryError::UnsupportedFieldKind`] if a required field has no generator.
	/// - [`BakeryError::UnknownField`] if an override names an undeclared field.
	/// - [`BakeryError::RecursionLimit`] if nesting exceeds `max_depth`.
	/// - [`BakeryError::Store`] if the store fails; already persisted
	///   instances stay in the ledger.
	pub async fn make(
		&self,
		schema: &Arc<Schema>,
		quantity: usize,
		overrides: Overrides,
	) -> BakeryResult<Baked> {
		let involved = reachable_schemas(schema);
		for nested in &involved {
			nested.validate()?;
		}

		let _substitutions = self.substitute(&involved);
		let _locks = if self.settings.lock_per_schema {
			self.locks.acquire_all(&involved).await
		} else {
			Vec::new()
		};
		let hooks: Vec<HookGuard> = involved
			.iter()
			.map(|nested| HookGuard::suspend(&self.post_save, nested))
			.collect();
		tracing::debug!(
			schema = schema.name(),
			suspended = hooks.iter().filter(|guard| guard.is_active()).count(),
			"post-save hooks suspended for make"
		);

		if schema.is_embedded() {
			let instance = self.bake(Arc::clone(schema), overrides, 0).await?;
			tracing::info!(schema = schema.name(), "baked embedded instance");
			return Ok(Baked::One(instance));
		}

		let mut instances = Vec::with_capacity(quantity);
		for _ in 0..quantity {
			instances.push(self.bake(Arc::clone(schema), overrides.clone(), 0).await?);
		}
		tracing::info!(schema = schema.name(), quantity, "baked instances");

		if quantity == 1 {
			Ok(Baked::One(instances.remove(0)))
		} else {
			Ok(Baked::Many(instances))
		}
	}

	/// Build and return exactly one instance.
	pub async fn make_one(
		&self,
		schema: &Arc<Schema>,
		overrides: Overrides,
	) -> BakeryResult<DocumentInstance> {
		match self.make(schema, 1, overrides).await? {
			Baked::One(instance) => Ok(instance),
			Baked::Many(_) => Err(BakeryError::invalid_schema(
				schema.name(),
				"expected a single instance",
			)),
		}
	}

	/// Build `quantity` instances and return them as a vector.
	pub async fn make_many(
		&self,
		schema: &Arc<Schema>,
		quantity: usize,
		overrides: Overrides,
	) -> BakeryResult<Vec<DocumentInstance>> {
		Ok(self.make(schema, quantity, overrides).await?.into_vec())
	}

	/// Remove every ledgered instance from the store, in creation order.
	///
	/// Returns the number of ledger entries processed. If the store fails,
	/// the failing instance and everything after it stay in the ledger so a
	/// later call can finish the job.
	pub async fn cleanup(&self) -> BakeryResult<usize> {
		let pending = std::mem::take(&mut *self.ledger.lock());
		let mut processed = 0;
		let mut remaining = pending.into_iter();

		while let Some(instance) = remaining.next() {
			if let Err(error) = self.store.remove(&instance).await {
				tracing::error!(
					schema = instance.schema().name(),
					id = ?instance.id(),
					%error,
					"cleanup failed; keeping unprocessed instances"
				);
				// Entries baked while cleanup was running go after the unprocessed ones
				let mut ledger = self.ledger.lock();
				let newer = std::mem::take(&mut *ledger);
				ledger.extend(std::iter::once(instance).chain(remaining));
				ledger.extend(newer);
				return Err(error.into());
			}
			processed += 1;
		}

		tracing::info!(removed = processed, "cleanup complete");
		Ok(processed)
	}

	/// Snapshot of the ledger, in creation order.
	pub fn ledger(&self) -> Vec<DocumentInstance> {
		self.ledger.lock().clone()
	}

	/// Number of ledgered instances.
	pub fn ledger_len(&self) -> usize {
		self.ledger.lock().len()
	}

	fn substitute(&self, involved: &[Arc<Schema>]) -> Vec<SubstitutionScope> {
		let declared = self.mocked.read().clone();
		if declared.is_empty() {
			return Vec::new();
		}

		let mut modules = HashSet::new();
		involved
			.iter()
			.filter(|schema| modules.insert(schema.module().to_string()))
			.map(|schema| {
				self.modules
					.compute_substitutions(schema, &declared)
					.install()
			})
			.collect()
	}

	fn bake(
		&self,
		schema: Arc<Schema>,
		overrides: Overrides,
		depth: usize,
	) -> BoxFuture<'_, BakeryResult<DocumentInstance>> {
		async move {
			if depth > self.settings.max_depth {
				return Err(BakeryError::RecursionLimit {
					schema: schema.name().to_string(),
					depth,
				});
			}

			let mut values = overrides.as_map().clone();
			for field in missing_required_fields(&schema, &overrides) {
				let value = match field.target() {
					Some(target) => {
						let nested = target.resolve(&schema);
						let built = self.bake(nested, Overrides::new(), depth + 1).await?;
						Value::Object(built.to_document())
					}
					None => self.generate_scalar(field)?,
				};
				tracing::debug!(
					schema = schema.name(),
					field = field.name(),
					kind = %field.kind(),
					"generated value"
				);
				values.insert(field.name().to_string(), value);
			}

			let mut instance = DocumentInstance::construct(Arc::clone(&schema), values)?;
			if !schema.is_embedded() {
				self.persist(&mut instance).await?;
			}
			Ok(instance)
		}
		.boxed()
	}

	fn generate_scalar(&self, field: &FieldDescriptor) -> BakeryResult<Value> {
		let mut rng = self.rng.lock();
		self.generators.generate(field, &mut rng)
	}

	async fn persist(&self, instance: &mut DocumentInstance) -> BakeryResult<()> {
		if let Err(error) = self.store.persist(instance).await {
			tracing::error!(
				schema = instance.schema().name(),
				%error,
				"persisting baked instance failed"
			);
			return Err(error.into());
		}
		self.ledger.lock().push(instance.clone());
		Ok(())
	}
}

impl std::fmt::Debug for Baker {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Baker")
			.field("settings", &self.settings)
			.field("generators", &self.generators)
			.field("mocked", &*self.mocked.read())
			.field("ledger_len", &self.ledger_len())
			.finish_non_exhaustive()
	}
}
