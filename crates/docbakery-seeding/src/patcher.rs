//! Scoped substitution of named collaborators.
//!
//! Application modules register the collaborators their schemas talk to
//! (mail clients, payment gateways, ...) in a [`ModuleNamespace`] and resolve
//! them through it. While a `make` call runs, the baker swaps the ones the
//! test declared with doubles, and swaps them back when the call ends.
//!
//! ```
//! use std::sync::Arc;
//! use docbakery_seeding::patcher::ModuleRegistry;
//! use docbakery_seeding::schema::Schema;
//!
//! trait Mailer: Send + Sync {
//!     fn send(&self, to: &str) -> bool;
//! }
//! struct Smtp;
//! impl Mailer for Smtp {
//!     fn send(&self, _to: &str) -> bool { true }
//! }
//!
//! let modules = ModuleRegistry::new();
//! let people = modules.module("app::people");
//! people.provide::<dyn Mailer>("mailer", Arc::new(Smtp));
//!
//! let person = Schema::document("Person").module("app::people").build();
//! let plan = modules.compute_substitutions(&person, &["mailer".to_string()]);
//! {
//!     let _scope = plan.install();
//!     assert!(people.resolve::<dyn Mailer>("mailer").is_none());
//! }
//! assert!(people.resolve::<dyn Mailer>("mailer").is_some());
//! ```

use std::any::Any;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use regex::Regex;

use crate::schema::Schema;

type Erased = Arc<dyn Any + Send + Sync>;
type DoubleFn = Arc<dyn Fn() -> Erased + Send + Sync>;

struct Collaborator {
	live: Erased,
	double: Option<DoubleFn>,
	installed: Option<Erased>,
	depth: usize,
}

/// Named collaborators of one application module.
pub struct ModuleNamespace {
	path: String,
	source: RwLock<Option<Arc<str>>>,
	collaborators: RwLock<HashMap<String, Collaborator>>,
}

impl ModuleNamespace {
	fn new(path: impl Into<String>) -> Self {
		Self {
			path: path.into(),
			source: RwLock::new(None),
			collaborators: RwLock::new(HashMap::new()),
		}
	}

	/// Module path.
	pub fn path(&self) -> &str {
		&self.path
	}

	/// Register a collaborator that is neutralized (resolves to `None`) while substituted.
	pub fn provide<T>(&self, name: impl Into<String>, live: Arc<T>)
	where
		T: ?Sized + Send + Sync + 'static,
	{
		self.insert(name.into(), Arc::new(live), None);
	}

	/// Register a collaborator together with the double installed while substituted.
	pub fn provide_with_double<T, F>(&self, name: impl Into<String>, live: Arc<T>, double: F)
	where
		T: ?Sized + Send + Sync + 'static,
		F: Fn() -> Arc<T> + Send + Sync + 'static,
	{
		let double: DoubleFn = Arc::new(move || Arc::new(double()) as Erased);
		self.insert(name.into(), Arc::new(live), Some(double));
	}

	fn insert(&self, name: String, live: Erased, double: Option<DoubleFn>) {
		self.collaborators.write().insert(
			name,
			Collaborator {
				live,
				double,
				installed: None,
				depth: 0,
			},
		);
	}

	/// Attach the module's source text.
	///
	/// With source attached, a declared name is only substituted when it
	/// appears in the text as a whole token.
	pub fn set_source(&self, source: impl Into<Arc<str>>) {
		*self.source.write() = Some(source.into());
	}

	/// Source text, if attached.
	pub fn source(&self) -> Option<Arc<str>> {
		self.source.read().clone()
	}

	/// Whether a collaborator named `name` is registered.
	pub fn contains(&self, name: &str) -> bool {
		self.collaborators.read().contains_key(name)
	}

	/// Whether `name` is currently substituted.
	pub fn is_substituted(&self, name: &str) -> bool {
		self.collaborators
			.read()
			.get(name)
			.is_some_and(|c| c.depth > 0)
	}

	/// Resolve a collaborator.
	///
	/// Returns the live value, the installed double while substituted, or
	/// `None` when substituted without a double or when nothing (of type `T`)
	/// is registered under `name`.
	pub fn resolve<T>(&self, name: &str) -> Option<Arc<T>>
	where
		T: ?Sized + Send + Sync + 'static,
	{
		let collaborators = self.collaborators.read();
		let collaborator = collaborators.get(name)?;
		let current = if collaborator.depth > 0 {
			collaborator.installed.as_ref()?
		} else {
			&collaborator.live
		};
		current.downcast_ref::<Arc<T>>().cloned()
	}

	fn install(&self, name: &str) -> bool {
		let mut collaborators = self.collaborators.write();
		let Some(collaborator) = collaborators.get_mut(name) else {
			return false;
		};
		if collaborator.depth == 0 {
			collaborator.installed = collaborator.double.as_ref().map(|double| double());
		}
		collaborator.depth += 1;
		true
	}

	fn uninstall(&self, name: &str) {
		let mut collaborators = self.collaborators.write();
		if let Some(collaborator) = collaborators.get_mut(name) {
			collaborator.depth = collaborator.depth.saturating_sub(1);
			if collaborator.depth == 0 {
				collaborator.installed = None;
			}
		}
	}
}

impl fmt::Debug for ModuleNamespace {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let mut names: Vec<String> = self.collaborators.read().keys().cloned().collect();
		names.sort();
		f.debug_struct("ModuleNamespace")
			.field("path", &self.path)
			.field("collaborators", &names)
			.field("has_source", &self.source.read().is_some())
			.finish()
	}
}

/// Registry of module namespaces, keyed by module path.
#[derive(Clone, Default)]
pub struct ModuleRegistry {
	modules: Arc<RwLock<HashMap<String, Arc<ModuleNamespace>>>>,
}

impl ModuleRegistry {
	/// Create an empty registry.
	pub fn new() -> Self {
		Self::default()
	}

	/// Get or create the namespace for `path`.
	pub fn module(&self, path: &str) -> Arc<ModuleNamespace> {
		if let Some(module) = self.modules.read().get(path) {
			return Arc::clone(module);
		}
		Arc::clone(
			self.modules
				.write()
				.entry(path.to_string())
				.or_insert_with(|| Arc::new(ModuleNamespace::new(path))),
		)
	}

	/// Namespace for `path`, if registered.
	pub fn get(&self, path: &str) -> Option<Arc<ModuleNamespace>> {
		self.modules.read().get(path).cloned()
	}

	/// Namespace of the module declaring `schema`.
	pub fn locate(&self, schema: &Schema) -> Option<Arc<ModuleNamespace>> {
		self.get(schema.module())
	}

	/// Work out which of `declared` names to substitute while baking `schema`.
	///
	/// When the schema's module is not registered the plan is empty and the
	/// call proceeds unpatched.
	pub fn compute_substitutions(&self, schema: &Schema, declared: &[String]) -> SubstitutionPlan {
		if declared.is_empty() {
			return SubstitutionPlan::empty();
		}
		let Some(module) = self.locate(schema) else {
			tracing::warn!(
				schema = schema.name(),
				module = schema.module(),
				"schema module not registered; baking without substitutions"
			);
			return SubstitutionPlan::empty();
		};

		let mentioned = module
			.source()
			.map(|text| mentioned_tokens(&text, declared));
		let mut names = Vec::new();
		for name in declared {
			let referenced = match &mentioned {
				Some(tokens) => tokens.contains(name.as_str()),
				None => module.contains(name),
			};
			if !referenced {
				continue;
			}
			if !module.contains(name) {
				tracing::warn!(
					module = module.path(),
					name = name.as_str(),
					"name appears in module source but no collaborator is registered"
				);
				continue;
			}
			names.push(name.clone());
		}

		tracing::debug!(schema = schema.name(), substitutions = ?names, "substitution plan");
		SubstitutionPlan {
			module: Some(module),
			names,
		}
	}
}

impl fmt::Debug for ModuleRegistry {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let mut paths: Vec<String> = self.modules.read().keys().cloned().collect();
		paths.sort();
		f.debug_struct("ModuleRegistry")
			.field("modules", &paths)
			.finish()
	}
}

/// Declared names occurring in `source` as whole tokens, matched with a single pattern.
fn mentioned_tokens(source: &str, declared: &[String]) -> HashSet<String> {
	let alternation = declared
		.iter()
		.filter(|name| !name.is_empty())
		.map(|name| regex::escape(name))
		.collect::<Vec<_>>()
		.join("|");
	// Escaped names only fail to compile when the set exceeds the regex size limit.
	let Ok(pattern) = Regex::new(&format!(r"\b(?:{alternation})\b")) else {
		tracing::warn!(names = declared.len(), "declared names too many to match; none substituted");
		return HashSet::new();
	};
	pattern
		.find_iter(source)
		.map(|token| token.as_str().to_string())
		.collect()
}

/// Names to substitute for one `make` call.
#[derive(Debug, Default)]
pub struct SubstitutionPlan {
	module: Option<Arc<ModuleNamespace>>,
	names: Vec<String>,
}

impl SubstitutionPlan {
	/// A plan that substitutes nothing.
	pub fn empty() -> Self {
		Self::default()
	}

	/// Names that will be substituted.
	pub fn names(&self) -> &[String] {
		&self.names
	}

	/// Returns true if nothing will be substituted.
	pub fn is_empty(&self) -> bool {
		self.names.is_empty()
	}

	/// Install the doubles; they are removed when the returned scope drops.
	pub fn install(self) -> SubstitutionScope {
		let mut installed = Vec::new();
		if let Some(module) = &self.module {
			for name in &self.names {
				if module.install(name) {
					installed.push(name.clone());
				}
			}
		}
		SubstitutionScope {
			module: self.module,
			installed,
		}
	}
}

/// Guard keeping a plan's doubles installed.
#[must_use = "substitutions are removed as soon as the scope is dropped"]
#[derive(Debug)]
pub struct SubstitutionScope {
	module: Option<Arc<ModuleNamespace>>,
	installed: Vec<String>,
}

impl Drop for SubstitutionScope {
	fn drop(&mut self) {
		if let Some(module) = &self.module {
			for name in self.installed.iter().rev() {
				module.uninstall(name);
			}
		}
	}
}
