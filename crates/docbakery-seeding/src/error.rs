//! Error types for the seeding module.

use thiserror::Error;

use crate::schema::FieldKind;
use crate::store::StoreError;

/// Errors that can occur while baking or cleaning up instances.
#[derive(Debug, Error)]
pub enum BakeryError {
	/// The schema is not a document or embedded shape, or is malformed.
	#[error("Invalid schema {schema}: {reason}")]
	InvalidSchema {
		/// Schema name.
		schema: String,
		/// Why the schema was rejected.
		reason: String,
	},

	/// No generator is registered for a field kind.
	#[error("No generator registered for field kind: {0}")]
	UnsupportedFieldKind(FieldKind),

	/// An override names a field the schema does not declare.
	#[error("Unknown field {field} on schema {schema}")]
	UnknownField {
		/// Schema name.
		schema: String,
		/// Offending field name.
		field: String,
	},

	/// Nested or linked schemas went deeper than the configured limit.
	#[error("Recursion limit reached while baking {schema} (depth {depth})")]
	RecursionLimit {
		/// Schema that would have exceeded the limit.
		schema: String,
		/// Depth at which baking stopped.
		depth: usize,
	},

	/// A registered generator failed.
	#[error("Generation error: {field}: {message}")]
	Generation {
		/// Field being generated.
		field: String,
		/// Generator message.
		message: String,
	},

	/// The backing store failed during persistence or removal.
	#[error(transparent)]
	Store(#[from] StoreError),

	/// Baker settings are invalid.
	#[error("Settings error: {0}")]
	Settings(String),

	/// JSON serialization/deserialization error.
	#[error("JSON error: {0}")]
	Json(#[from] serde_json::Error),
}

impl BakeryError {
	pub(crate) fn invalid_schema(schema: impl Into<String>, reason: impl Into<String>) -> Self {
		Self::InvalidSchema {
			schema: schema.into(),
			reason: reason.into(),
		}
	}
}

/// Result type alias for seeding operations.
pub type BakeryResult<T> = Result<T, BakeryError>;
