//! Baked instances and per-call overrides.

use std::fmt;
use std::sync::Arc;

use serde::ser::{Serialize, Serializer};
use serde_json::{Map, Value};

use crate::error::{BakeryError, BakeryResult};
use crate::schema::Schema;

/// An instance of a schema, built by the factory.
#[derive(Clone)]
pub struct DocumentInstance {
	schema: Arc<Schema>,
	id: Option<Value>,
	fields: Map<String, Value>,
}

impl DocumentInstance {
	/// Construct an instance, rejecting values for undeclared fields.
	///
	/// A value under the schema's identity field becomes the instance identity.
	pub fn construct(schema: Arc<Schema>, mut values: Map<String, Value>) -> BakeryResult<Self> {
		let id = values.remove(schema.identity_field());
		if let Some(unknown) = values.keys().find(|name| schema.field(name).is_none()) {
			return Err(BakeryError::UnknownField {
				schema: schema.name().to_string(),
				field: unknown.clone(),
			});
		}

		// Keep declaration order regardless of how values arrived
		let mut fields = Map::new();
		for descriptor in schema.fields() {
			if let Some(value) = values.remove(descriptor.name()) {
				fields.insert(descriptor.name().to_string(), value);
			}
		}

		Ok(Self { schema, id, fields })
	}

	/// Schema this instance belongs to.
	pub fn schema(&self) -> &Arc<Schema> {
		&self.schema
	}

	/// Identity assigned by the caller or the store.
	pub fn id(&self) -> Option<&Value> {
		self.id.as_ref()
	}

	/// Assign the identity.
	pub fn set_id(&mut self, id: Value) {
		self.id = Some(id);
	}

	/// Value of a field, if populated.
	pub fn get(&self, field: &str) -> Option<&Value> {
		self.fields.get(field)
	}

	/// Populated fields in declaration order.
	pub fn fields(&self) -> &Map<String, Value> {
		&self.fields
	}

	/// Render as a document: identity first (when set), then fields.
	pub fn to_document(&self) -> Map<String, Value> {
		let mut document = Map::new();
		if let Some(id) = &self.id {
			document.insert(self.schema.identity_field().to_string(), id.clone());
		}
		for (name, value) in &self.fields {
			document.insert(name.clone(), value.clone());
		}
		document
	}
}

impl fmt::Debug for DocumentInstance {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("DocumentInstance")
			.field("schema", &self.schema.name())
			.field("id", &self.id)
			.field("fields", &self.fields)
			.finish()
	}
}

impl Serialize for DocumentInstance {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		self.to_document().serialize(serializer)
	}
}

/// Caller-supplied field values for one `make` call.
///
/// Overrides always win over generated values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Overrides(Map<String, Value>);

impl Overrides {
	/// No overrides.
	pub fn new() -> Self {
		Self::default()
	}

	/// Add an override.
	///
	/// ```
	/// use docbakery_seeding::Overrides;
	///
	/// let overrides = Overrides::new().with("name", "Ada").with("age", 36);
	/// assert!(overrides.contains("name"));
	/// ```
	pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
		self.0.insert(field.into(), value.into());
		self
	}

	/// Whether `field` is overridden.
	pub fn contains(&self, field: &str) -> bool {
		self.0.contains_key(field)
	}

	/// Override for `field`, if any.
	pub fn get(&self, field: &str) -> Option<&Value> {
		self.0.get(field)
	}

	/// Number of overridden fields.
	pub fn len(&self) -> usize {
		self.0.len()
	}

	/// Returns true if nothing is overridden.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	/// Iterate over overrides.
	pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
		self.0.iter()
	}

	/// Borrow the underlying map.
	pub fn as_map(&self) -> &Map<String, Value> {
		&self.0
	}
}

impl From<Map<String, Value>> for Overrides {
	fn from(map: Map<String, Value>) -> Self {
		Self(map)
	}
}

impl TryFrom<Value> for Overrides {
	type Error = BakeryError;

	fn try_from(value: Value) -> Result<Self, Self::Error> {
		match value {
			Value::Object(map) => Ok(Self(map)),
			other => Err(BakeryError::Json(serde::de::Error::custom(format!(
				"overrides must be a JSON object, got {other}"
			)))),
		}
	}
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Overrides {
	fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
		Self(
			iter.into_iter()
				.map(|(k, v)| (k.into(), v.into()))
				.collect(),
		)
	}
}
