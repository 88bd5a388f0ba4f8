//! Signal error types

use thiserror::Error;

/// Error raised by a signal receiver or by signal validation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Signal error: {message}")]
pub struct SignalError {
	/// Human readable description of the failure.
	pub message: String,
}

impl SignalError {
	/// Create a new signal error from a message
	pub fn new(message: impl Into<String>) -> Self {
		Self {
			message: message.into(),
		}
	}
}
