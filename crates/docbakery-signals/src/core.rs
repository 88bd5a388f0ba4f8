//! Core signal types

use super::error::SignalError;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// Name a [`Signal`](crate::Signal) is registered under
///
/// ```
/// use docbakery_signals::SignalName;
///
/// assert_eq!(SignalName::POST_SAVE.as_str(), "post_save");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SignalName(&'static str);

impl SignalName {
	/// Sent after a document instance was written to its store
	pub const POST_SAVE: Self = Self("post_save");

	/// String form used in logs and registry keys
	pub const fn as_str(&self) -> &'static str {
		self.0
	}
}

impl fmt::Display for SignalName {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.0)
	}
}

/// Boxed async receiver; the payload is shared between all receivers of one send
pub type ReceiverFn<T> = Arc<
	dyn Fn(Arc<T>) -> Pin<Box<dyn Future<Output = Result<(), SignalError>> + Send>> + Send + Sync,
>;
