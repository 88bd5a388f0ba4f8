//! Field-kind → generator table.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Datelike, Duration, SecondsFormat, TimeZone, Utc};
use fake::Fake;
use fake::faker::lorem::en::Word;
use parking_lot::RwLock;
use rand::Rng;
use rand::rngs::StdRng;
use serde_json::{Value, json};

use super::faker::FakerType;
use crate::error::{BakeryError, BakeryResult};
use crate::schema::{FieldDescriptor, FieldKind};
use crate::settings::BakerSettings;

/// Function producing a value for one field.
pub type GeneratorFn = Arc<dyn Fn(&FieldDescriptor, &mut StdRng) -> BakeryResult<Value> + Send + Sync>;

/// Registry of value generators keyed by field kind.
///
/// Embedded and reference kinds are never registered here: their values are
/// whole instances, which only the factory can bake.
pub struct GeneratorRegistry {
	generators: RwLock<HashMap<FieldKind, GeneratorFn>>,
}

impl GeneratorRegistry {
	/// Registry with no generators at all.
	pub fn empty() -> Self {
		Self {
			generators: RwLock::new(HashMap::new()),
		}
	}

	/// Registry with the built-in scalar generators and default settings.
	pub fn with_defaults() -> Self {
		Self::from_settings(&BakerSettings::default())
	}

	/// Registry with the built-in scalar generators tuned by `settings`.
	pub fn from_settings(settings: &BakerSettings) -> Self {
		let registry = Self::empty();
		let specialize = settings.specialize_text;
		let list_length = settings.list_length;

		registry.register(FieldKind::Text, move |field, rng| {
			let faker = specialize
				.then(|| FakerType::from_field_name(field.name()))
				.flatten()
				.unwrap_or(FakerType::Word);
			Ok(Value::String(faker.generate(rng)))
		});
		registry.register(FieldKind::Integer, |_, rng| {
			Ok(json!(rng.gen_range(0..=100_i64)))
		});
		registry.register(FieldKind::Float, |_, rng| {
			Ok(json!(rng.gen_range(0.1..=1000.0_f64)))
		});
		registry.register(FieldKind::Boolean, |_, rng| Ok(Value::Bool(rng.r#gen())));
		registry.register(FieldKind::DateTime, |_, rng| {
			Ok(Value::String(
				timestamp_this_decade(rng).to_rfc3339_opts(SecondsFormat::Secs, true),
			))
		});
		registry.register(FieldKind::List, move |_, rng| {
			let words = (0..list_length)
				.map(|_| Value::String(Word().fake_with_rng(&mut *rng)))
				.collect();
			Ok(Value::Array(words))
		});
		registry.register(FieldKind::Dict, |_, rng| {
			let key: String = Word().fake_with_rng(rng);
			let value: String = Word().fake_with_rng(rng);
			Ok(json!({"key": key, "value": value}))
		});
		registry.register(FieldKind::ObjectId, |_, _| {
			Ok(Value::String(uuid::Uuid::new_v4().to_string()))
		});

		registry
	}

	/// Register (or replace) the generator for `kind`.
	///
	/// # Example
	///
	/// ```
	/// use docbakery_seeding::generators::GeneratorRegistry;
	/// use docbakery_seeding::schema::FieldKind;
	/// use serde_json::json;
	///
	/// let registry = GeneratorRegistry::with_defaults();
	/// registry.register(FieldKind::Custom("decimal".into()), |_, _| Ok(json!("9.99")));
	/// assert!(registry.has(&FieldKind::Custom("decimal".into())));
	/// ```
	pub fn register<F>(&self, kind: FieldKind, generator: F)
	where
		F: Fn(&FieldDescriptor, &mut StdRng) -> BakeryResult<Value> + Send + Sync + 'static,
	{
		if kind.is_nested() {
			tracing::warn!(%kind, "ignoring generator for nested kind; the factory bakes these");
			return;
		}
		self.generators.write().insert(kind, Arc::new(generator));
	}

	/// Remove the generator for `kind`.
	pub fn unregister(&self, kind: &FieldKind) -> bool {
		self.generators.write().remove(kind).is_some()
	}

	/// Whether a generator is registered for `kind`.
	pub fn has(&self, kind: &FieldKind) -> bool {
		self.generators.read().contains_key(kind)
	}

	/// Registered kinds.
	pub fn kinds(&self) -> Vec<FieldKind> {
		self.generators.read().keys().cloned().collect()
	}

	/// Generate a value for `field`.
	///
	/// # Errors
	///
	/// Returns [`BakeryError::UnsupportedFieldKind`] when nothing is
	/// registered for the field's kind.
	pub fn generate(&self, field: &FieldDescriptor, rng: &mut StdRng) -> BakeryResult<Value> {
		let generator = self
			.generators
			.read()
			.get(field.kind())
			.cloned()
			.ok_or_else(|| BakeryError::UnsupportedFieldKind(field.kind().clone()))?;
		generator(field, rng)
	}
}

impl Default for GeneratorRegistry {
	fn default() -> Self {
		Self::with_defaults()
	}
}

impl std::fmt::Debug for GeneratorRegistry {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("GeneratorRegistry")
			.field("kinds", &self.kinds())
			.finish()
	}
}

/// Random instant between the start of the current calendar decade and now.
fn timestamp_this_decade(rng: &mut StdRng) -> DateTime<Utc> {
	let now = Utc::now();
	let decade = now.year() - now.year().rem_euclid(10);
	let Some(start) = Utc.with_ymd_and_hms(decade, 1, 1, 0, 0, 0).single() else {
		return now;
	};
	let span = (now - start).num_seconds().max(0);
	start + Duration::seconds(rng.gen_range(0..=span))
}

#[cfg(test)]
mod tests {
	use super::*;
	use rand::SeedableRng;
	use rstest::{fixture, rstest};

	use crate::schema::Schema;

	#[fixture]
	fn rng() -> StdRng {
		StdRng::seed_from_u64(1234)
	}

	#[rstest]
	fn test_integer_in_range(mut rng: StdRng) {
		let registry = GeneratorRegistry::with_defaults();
		let field = FieldDescriptor::integer("age");
		for _ in 0..200 {
			let value = registry.generate(&field, &mut rng).unwrap();
			let n = value.as_i64().unwrap();
			assert!((0..=100).contains(&n));
		}
	}

	#[rstest]
	fn test_float_in_range(mut rng: StdRng) {
		let registry = GeneratorRegistry::with_defaults();
		let field = FieldDescriptor::float("score");
		for _ in 0..200 {
			let n = registry.generate(&field, &mut rng).unwrap().as_f64().unwrap();
			assert!((0.1..=1000.0).contains(&n));
		}
	}

	#[rstest]
	fn test_text_specializes_by_name(mut rng: StdRng) {
		let registry = GeneratorRegistry::with_defaults();
		let email = registry
			.generate(&FieldDescriptor::text("email"), &mut rng)
			.unwrap();
		assert!(email.as_str().unwrap().contains('@'));
	}

	#[rstest]
	fn test_text_specialization_can_be_disabled(mut rng: StdRng) {
		let settings = BakerSettings::default().with_specialize_text(false);
		let registry = GeneratorRegistry::from_settings(&settings);
		let value = registry
			.generate(&FieldDescriptor::text("email"), &mut rng)
			.unwrap();
		assert!(!value.as_str().unwrap().contains('@'));
	}

	#[rstest]
	fn test_datetime_within_current_decade(mut rng: StdRng) {
		let registry = GeneratorRegistry::with_defaults();
		let value = registry
			.generate(&FieldDescriptor::datetime("created_at"), &mut rng)
			.unwrap();
		let parsed = DateTime::parse_from_rfc3339(value.as_str().unwrap()).unwrap();
		let now = Utc::now();
		assert!(parsed.with_timezone(&Utc) <= now);
		assert_eq!(parsed.year() / 10, now.year() / 10);
	}

	#[rstest]
	fn test_list_uses_configured_length(mut rng: StdRng) {
		let settings = BakerSettings::default().with_list_length(5);
		let registry = GeneratorRegistry::from_settings(&settings);
		let value = registry
			.generate(&FieldDescriptor::list("tags"), &mut rng)
			.unwrap();
		assert_eq!(value.as_array().unwrap().len(), 5);
	}

	#[rstest]
	fn test_dict_and_object_id_shapes(mut rng: StdRng) {
		let registry = GeneratorRegistry::with_defaults();
		let dict = registry
			.generate(&FieldDescriptor::dict("meta"), &mut rng)
			.unwrap();
		assert!(dict.get("key").is_some() && dict.get("value").is_some());

		let first = registry
			.generate(&FieldDescriptor::object_id("ref"), &mut rng)
			.unwrap();
		let second = registry
			.generate(&FieldDescriptor::object_id("ref"), &mut rng)
			.unwrap();
		assert_ne!(first, second);
		assert!(uuid::Uuid::parse_str(first.as_str().unwrap()).is_ok());
	}

	#[rstest]
	fn test_boolean_is_bool(mut rng: StdRng) {
		let registry = GeneratorRegistry::with_defaults();
		let value = registry
			.generate(&FieldDescriptor::boolean("active"), &mut rng)
			.unwrap();
		assert!(value.is_boolean());
	}

	#[rstest]
	fn test_custom_kind_is_unsupported_until_registered(mut rng: StdRng) {
		// Arrange
		let registry = GeneratorRegistry::with_defaults();
		let field = FieldDescriptor::custom("price", "decimal");

		// Act
		let before = registry.generate(&field, &mut rng);
		registry.register(FieldKind::Custom("decimal".into()), |_, _| Ok(json!("9.99")));
		let after = registry.generate(&field, &mut rng).unwrap();

		// Assert
		assert!(matches!(
			before,
			Err(BakeryError::UnsupportedFieldKind(FieldKind::Custom(ref k))) if k == "decimal"
		));
		assert_eq!(after, json!("9.99"));
	}

	#[rstest]
	fn test_nested_kinds_are_never_registered(mut rng: StdRng) {
		// Arrange
		let registry = GeneratorRegistry::with_defaults();
		let address: Arc<Schema> = Schema::embedded("Address").build();
		registry.register(FieldKind::Embedded, |_, _| Ok(Value::Null));

		// Act
		let result = registry.generate(&FieldDescriptor::embedded("address", address), &mut rng);

		// Assert
		assert!(!registry.has(&FieldKind::Embedded));
		assert!(matches!(
			result,
			Err(BakeryError::UnsupportedFieldKind(FieldKind::Embedded))
		));
	}

	#[rstest]
	fn test_unregister_removes_generator(mut rng: StdRng) {
		let registry = GeneratorRegistry::with_defaults();
		assert!(registry.unregister(&FieldKind::Boolean));
		assert!(!registry.unregister(&FieldKind::Boolean));
		assert!(matches!(
			registry.generate(&FieldDescriptor::boolean("active"), &mut rng),
			Err(BakeryError::UnsupportedFieldKind(FieldKind::Boolean))
		));
	}

	#[rstest]
	fn test_replacing_generator_wins(mut rng: StdRng) {
		let registry = GeneratorRegistry::with_defaults();
		registry.register(FieldKind::Integer, |_, _| Ok(json!(7)));
		let value = registry
			.generate(&FieldDescriptor::integer("age"), &mut rng)
			.unwrap();
		assert_eq!(value, json!(7));
	}
}
