//! Document schema metadata.
//!
//! Schemas are declared once by the application (or the test suite) and
//! shared as `Arc<Schema>`. The factory only reads them.

use std::collections::HashSet;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use docbakery_signals::{ReceiverFn, SignalError};

use crate::error::{BakeryError, BakeryResult};
use crate::instance::DocumentInstance;

/// Identity field name used when a schema does not declare its own.
pub const DEFAULT_IDENTITY_FIELD: &str = "id";

/// Declared kind of a field.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FieldKind {
	/// Free text.
	Text,
	/// Signed integer.
	Integer,
	/// Floating-point number.
	Float,
	/// Boolean flag.
	Boolean,
	/// Point in time.
	DateTime,
	/// List of values.
	List,
	/// Key/value mapping.
	Dict,
	/// Unique identifier.
	ObjectId,
	/// Nested document without its own identity.
	Embedded,
	/// Link to a separately persisted document.
	Reference,
	/// Application-defined kind; needs an explicitly registered generator.
	Custom(String),
}

impl FieldKind {
	/// Whether values of this kind are produced by baking another schema.
	pub fn is_nested(&self) -> bool {
		matches!(self, Self::Embedded | Self::Reference)
	}
}

impl fmt::Display for FieldKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let tag = match self {
			Self::Text => "text",
			Self::Integer => "integer",
			Self::Float => "float",
			Self::Boolean => "boolean",
			Self::DateTime => "datetime",
			Self::List => "list",
			Self::Dict => "dict",
			Self::ObjectId => "object_id",
			Self::Embedded => "embedded",
			Self::Reference => "reference",
			Self::Custom(name) => name,
		};
		f.write_str(tag)
	}
}

/// Schema a nested or linked field points at.
#[derive(Clone)]
pub enum FieldTarget {
	/// Another schema.
	Schema(Arc<Schema>),
	/// The schema declaring the field.
	SelfRef,
}

impl FieldTarget {
	/// Resolve against the schema that owns the field.
	pub fn resolve(&self, owner: &Arc<Schema>) -> Arc<Schema> {
		match self {
			Self::Schema(schema) => Arc::clone(schema),
			Self::SelfRef => Arc::clone(owner),
		}
	}
}

impl fmt::Debug for FieldTarget {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Schema(schema) => write!(f, "Schema({})", schema.name()),
			Self::SelfRef => f.write_str("SelfRef"),
		}
	}
}

/// Metadata for one field.
///
/// The target schema can only be set through [`FieldDescriptor::embedded`],
/// [`FieldDescriptor::reference`] and [`FieldDescriptor::reference_to_self`],
/// so a descriptor has a target exactly when its kind is nested.
#[derive(Debug, Clone)]
pub struct FieldDescriptor {
	name: String,
	kind: FieldKind,
	required: bool,
	target: Option<FieldTarget>,
}

impl FieldDescriptor {
	fn scalar(name: impl Into<String>, kind: FieldKind) -> Self {
		Self {
			name: name.into(),
			kind,
			required: false,
			target: None,
		}
	}

	/// Text field.
	pub fn text(name: impl Into<String>) -> Self {
		Self::scalar(name, FieldKind::Text)
	}

	/// Integer field.
	pub fn integer(name: impl Into<String>) -> Self {
		Self::scalar(name, FieldKind::Integer)
	}

	/// Floating-point field.
	pub fn float(name: impl Into<String>) -> Self {
		Self::scalar(name, FieldKind::Float)
	}

	/// Boolean field.
	pub fn boolean(name: impl Into<String>) -> Self {
		Self::scalar(name, FieldKind::Boolean)
	}

	/// Timestamp field.
	pub fn datetime(name: impl Into<String>) -> Self {
		Self::scalar(name, FieldKind::DateTime)
	}

	/// List field.
	pub fn list(name: impl Into<String>) -> Self {
		Self::scalar(name, FieldKind::List)
	}

	/// Mapping field.
	pub fn dict(name: impl Into<String>) -> Self {
		Self::scalar(name, FieldKind::Dict)
	}

	/// Identifier field.
	pub fn object_id(name: impl Into<String>) -> Self {
		Self::scalar(name, FieldKind::ObjectId)
	}

	/// Field of an application-defined kind.
	pub fn custom(name: impl Into<String>, kind: impl Into<String>) -> Self {
		Self::scalar(name, FieldKind::Custom(kind.into()))
	}

	/// Field holding an embedded instance of `schema`.
	pub fn embedded(name: impl Into<String>, schema: Arc<Schema>) -> Self {
		Self {
			target: Some(FieldTarget::Schema(schema)),
			..Self::scalar(name, FieldKind::Embedded)
		}
	}

	/// Field linking to a persisted instance of `schema`.
	pub fn reference(name: impl Into<String>, schema: Arc<Schema>) -> Self {
		Self {
			target: Some(FieldTarget::Schema(schema)),
			..Self::scalar(name, FieldKind::Reference)
		}
	}

	/// Field linking to another instance of the declaring schema.
	pub fn reference_to_self(name: impl Into<String>) -> Self {
		Self {
			target: Some(FieldTarget::SelfRef),
			..Self::scalar(name, FieldKind::Reference)
		}
	}

	/// Mark the field as required.
	pub fn required(mut self) -> Self {
		self.required = true;
		self
	}

	/// Mark the field as optional (the default).
	pub fn optional(mut self) -> Self {
		self.required = false;
		self
	}

	/// Field name.
	pub fn name(&self) -> &str {
		&self.name
	}

	/// Declared kind.
	pub fn kind(&self) -> &FieldKind {
		&self.kind
	}

	/// Whether the field must be populated.
	pub fn is_required(&self) -> bool {
		self.required
	}

	/// Nested or linked schema, for embedded and reference fields.
	pub fn target(&self) -> Option<&FieldTarget> {
		self.target.as_ref()
	}
}

/// Whether a schema describes a persisted document, an embedded shape, or neither.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaKind {
	/// Top-level document with its own identity; persisted on its own.
	Document,
	/// Shape that only lives inside another instance.
	Embedded,
	/// Ordinary type with metadata but no document mapping.
	Plain,
}

/// Callback the store fires after persisting an instance of a schema.
#[derive(Clone)]
pub struct LifecycleHook {
	dispatch_uid: String,
	receiver: ReceiverFn<DocumentInstance>,
}

impl LifecycleHook {
	/// Create a hook from an async receiver.
	pub fn new<F, Fut>(dispatch_uid: impl Into<String>, receiver: F) -> Self
	where
		F: Fn(Arc<DocumentInstance>) -> Fut + Send + Sync + 'static,
		Fut: Future<Output = Result<(), SignalError>> + Send + 'static,
	{
		Self {
			dispatch_uid: dispatch_uid.into(),
			receiver: Arc::new(move |instance| Box::pin(receiver(instance))),
		}
	}

	/// Identifier the hook is registered under.
	pub fn dispatch_uid(&self) -> &str {
		&self.dispatch_uid
	}

	/// Boxed receiver.
	pub fn receiver(&self) -> ReceiverFn<DocumentInstance> {
		Arc::clone(&self.receiver)
	}
}

impl fmt::Debug for LifecycleHook {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("LifecycleHook")
			.field("dispatch_uid", &self.dispatch_uid)
			.finish_non_exhaustive()
	}
}

/// A declared document or embedded shape.
#[derive(Debug)]
pub struct Schema {
	name: String,
	module: String,
	kind: SchemaKind,
	identity_field: String,
	fields: Vec<FieldDescriptor>,
	hook: Option<LifecycleHook>,
}

impl Schema {
	/// Start declaring a persisted document schema.
	///
	/// # Example
	///
	/// ```
	/// use docbakery_seeding::schema::{FieldDescriptor, Schema};
	///
	/// let person = Schema::document("Person")
	///     .module("app::people")
	///     .field(FieldDescriptor::text("name").required())
	///     .field(FieldDescriptor::integer("age").required())
	///     .build();
	///
	/// assert_eq!(person.fields().len(), 2);
	/// ```
	pub fn document(name: impl Into<String>) -> SchemaBuilder {
		SchemaBuilder::new(name, SchemaKind::Document)
	}

	/// Start declaring an embedded schema.
	pub fn embedded(name: impl Into<String>) -> SchemaBuilder {
		SchemaBuilder::new(name, SchemaKind::Embedded)
	}

	/// Start declaring a plain, non-document type.
	pub fn plain(name: impl Into<String>) -> SchemaBuilder {
		SchemaBuilder::new(name, SchemaKind::Plain)
	}

	/// Schema name, also used as the signal sender and store collection.
	pub fn name(&self) -> &str {
		&self.name
	}

	/// Path of the module that declares the schema.
	pub fn module(&self) -> &str {
		&self.module
	}

	/// Document, embedded or plain.
	pub fn kind(&self) -> SchemaKind {
		self.kind
	}

	/// Whether instances have no identity of their own.
	pub fn is_embedded(&self) -> bool {
		self.kind == SchemaKind::Embedded
	}

	/// Name of the identity field.
	pub fn identity_field(&self) -> &str {
		&self.identity_field
	}

	/// Fields in declaration order.
	pub fn fields(&self) -> &[FieldDescriptor] {
		&self.fields
	}

	/// Look up a field by name.
	pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
		self.fields.iter().find(|f| f.name == name)
	}

	/// Post-save hook, if declared.
	pub fn hook(&self) -> Option<&LifecycleHook> {
		self.hook.as_ref()
	}

	/// Check that the schema is a shape the factory can bake.
	pub fn validate(&self) -> BakeryResult<()> {
		if self.name.is_empty() {
			return Err(BakeryError::invalid_schema("<unnamed>", "schema name is empty"));
		}
		if self.kind == SchemaKind::Plain {
			return Err(BakeryError::invalid_schema(
				&self.name,
				"not a document or embedded shape",
			));
		}

		let mut seen = HashSet::new();
		for field in &self.fields {
			if field.name.is_empty() {
				return Err(BakeryError::invalid_schema(&self.name, "field with empty name"));
			}
			if !seen.insert(field.name.as_str()) {
				return Err(BakeryError::invalid_schema(
					&self.name,
					format!("duplicate field {}", field.name),
				));
			}
		}
		Ok(())
	}
}

/// Builder returned by [`Schema::document`], [`Schema::embedded`] and [`Schema::plain`].
#[derive(Debug)]
pub struct SchemaBuilder {
	name: String,
	module: String,
	kind: SchemaKind,
	identity_field: String,
	fields: Vec<FieldDescriptor>,
	hook: Option<LifecycleHook>,
}

impl SchemaBuilder {
	fn new(name: impl Into<String>, kind: SchemaKind) -> Self {
		Self {
			name: name.into(),
			module: String::new(),
			kind,
			identity_field: DEFAULT_IDENTITY_FIELD.to_string(),
			fields: Vec::new(),
			hook: None,
		}
	}

	/// Set the declaring module path.
	pub fn module(mut self, module: impl Into<String>) -> Self {
		self.module = module.into();
		self
	}

	/// Rename the identity field.
	pub fn identity_field(mut self, name: impl Into<String>) -> Self {
		self.identity_field = name.into();
		self
	}

	/// Append a field.
	pub fn field(mut self, field: FieldDescriptor) -> Self {
		self.fields.push(field);
		self
	}

	/// Declare a post-save hook.
	pub fn hook(mut self, hook: LifecycleHook) -> Self {
		self.hook = Some(hook);
		self
	}

	/// Finish the declaration.
	pub fn build(self) -> Arc<Schema> {
		Arc::new(Schema {
			name: self.name,
			module: self.module,
			kind: self.kind,
			identity_field: self.identity_field,
			fields: self.fields,
			hook: self.hook,
		})
	}
}
