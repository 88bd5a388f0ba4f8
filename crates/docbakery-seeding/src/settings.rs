//! Baker settings.

use serde::{Deserialize, Serialize};

use crate::error::{BakeryError, BakeryResult};

/// Default recursion limit for nested and linked schemas.
pub const DEFAULT_MAX_DEPTH: usize = 8;

/// Default number of words in a generated list.
pub const DEFAULT_LIST_LENGTH: usize = 2;

/// Tunables for a [`Baker`](crate::Baker).
///
/// Settings can be built in code or read from JSON; missing keys take their
/// defaults.
///
/// ```
/// use docbakery_seeding::BakerSettings;
///
/// let settings = BakerSettings::from_json_str(r#"{"seed": 42, "max_depth": 3}"#).unwrap();
/// assert_eq!(settings.seed, Some(42));
/// assert_eq!(settings.list_length, 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BakerSettings {
	/// How deep nested and linked schemas may recurse.
	pub max_depth: usize,

	/// Words per generated list value.
	pub list_length: usize,

	/// Seed for reproducible values.
	pub seed: Option<u64>,

	/// Shape text values after their field name (`email`, `name`, ...).
	pub specialize_text: bool,

	/// Serialize concurrent `make` calls on the same schema.
	///
	/// With `false` a concurrent call may reconnect a hook while another call
	/// is still building, and that hook then fires on baked data. Callers that
	/// turn locking off must serialize their own `make` calls.
	pub lock_per_schema: bool,
}

impl Default for BakerSettings {
	fn default() -> Self {
		Self {
			max_depth: DEFAULT_MAX_DEPTH,
			list_length: DEFAULT_LIST_LENGTH,
			seed: None,
			specialize_text: true,
			lock_per_schema: true,
		}
	}
}

impl BakerSettings {
	/// Creates default settings.
	pub fn new() -> Self {
		Self::default()
	}

	/// Parse settings from JSON.
	pub fn from_json_str(json: &str) -> BakeryResult<Self> {
		let settings: Self = serde_json::from_str(json)?;
		settings.validate()?;
		Ok(settings)
	}

	/// Sets the recursion limit.
	pub fn with_max_depth(mut self, depth: usize) -> Self {
		self.max_depth = depth;
		self
	}

	/// Sets the list length.
	pub fn with_list_length(mut self, length: usize) -> Self {
		self.list_length = length;
		self
	}

	/// Sets the RNG seed.
	pub fn with_seed(mut self, seed: u64) -> Self {
		self.seed = Some(seed);
		self
	}

	/// Sets name-based text specialization.
	pub fn with_specialize_text(mut self, enabled: bool) -> Self {
		self.specialize_text = enabled;
		self
	}

	/// Sets per-schema locking. See [`BakerSettings::lock_per_schema`].
	pub fn with_lock_per_schema(mut self, enabled: bool) -> Self {
		self.lock_per_schema = enabled;
		self
	}

	/// Reject settings the baker cannot run with.
	pub fn validate(&self) -> BakeryResult<()> {
		if self.max_depth == 0 {
			return Err(BakeryError::Settings(
				"max_depth must be at least 1".to_string(),
			));
		}
		Ok(())
	}
}
