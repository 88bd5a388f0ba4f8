//! Core Signal implementation

use super::core::{ReceiverFn, SignalName};
use super::error::SignalError;
use super::metrics::{MetricsCollector, SignalMetrics};
use parking_lot::RwLock;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

/// Information about a connected receiver
pub(crate) struct ReceiverInfo<T: Send + Sync + 'static> {
	pub(crate) receiver: ReceiverFn<T>,
	pub(crate) sender: Option<String>,
	pub(crate) dispatch_uid: Option<String>,
	pub(crate) priority: i32, // Higher values execute first
}

impl<T: Send + Sync + 'static> Clone for ReceiverInfo<T> {
	fn clone(&self) -> Self {
		Self {
			receiver: Arc::clone(&self.receiver),
			sender: self.sender.clone(),
			dispatch_uid: self.dispatch_uid.clone(),
			priority: self.priority,
		}
	}
}

impl<T: Send + Sync + 'static> ReceiverInfo<T> {
	fn matches(&self, dispatch_uid: &str, sender: Option<&str>) -> bool {
		self.dispatch_uid.as_deref() == Some(dispatch_uid) && self.sender.as_deref() == sender
	}
}

/// A signal that can dispatch events to connected receivers
///
/// Receivers may be bound to a sender (the name of the document schema that
/// emits the signal). A bound receiver only runs when the signal is sent with
/// the same sender.
pub struct Signal<T: Send + Sync + 'static> {
	receivers: Arc<RwLock<Vec<ReceiverInfo<T>>>>,
	metrics: Arc<MetricsCollector>,
	name: SignalName,
}

impl<T: Send + Sync + 'static> Signal<T> {
	/// Create a new signal with a type-safe name
	///
	/// # Examples
	///
	/// ```
	/// use docbakery_signals::{Signal, SignalName};
	///
	/// let signal = Signal::<String>::new(SignalName::POST_SAVE);
	/// assert_eq!(signal.name(), "post_save");
	/// ```
	pub fn new(name: SignalName) -> Self {
		Self {
			receivers: Arc::new(RwLock::new(Vec::new())),
			metrics: Arc::new(MetricsCollector::new()),
			name,
		}
	}

	/// Name this signal was created with
	pub fn name(&self) -> &str {
		self.name.as_str()
	}

	/// Get the current metrics for this signal
	pub fn metrics(&self) -> SignalMetrics {
		self.metrics.snapshot()
	}

	/// Connect a receiver function to this signal with full options
	///
	/// # Arguments
	/// * `receiver` - The receiver function to connect
	/// * `sender` - Optional sender name to filter by
	/// * `dispatch_uid` - Optional unique identifier to prevent duplicate registration
	/// * `priority` - Execution priority (higher values execute first, default: 0)
	pub fn connect_with_options<F, Fut>(
		&self,
		receiver: F,
		sender: Option<&str>,
		dispatch_uid: Option<String>,
		priority: i32,
	) where
		F: Fn(Arc<T>) -> Fut + Send + Sync + 'static,
		Fut: Future<Output = Result<(), SignalError>> + Send + 'static,
	{
		let boxed: ReceiverFn<T> = Arc::new(move |instance| Box::pin(receiver(instance)));
		self.connect_receiver(boxed, sender, dispatch_uid, priority);
	}

	/// Connect an already boxed receiver
	///
	/// A receiver with the same `dispatch_uid` and sender replaces the
	/// existing one, so connecting twice never registers two copies.
	pub fn connect_receiver(
		&self,
		receiver: ReceiverFn<T>,
		sender: Option<&str>,
		dispatch_uid: Option<String>,
		priority: i32,
	) {
		let mut receivers = self.receivers.write();

		if let Some(ref uid) = dispatch_uid {
			receivers.retain(|r| !r.matches(uid, sender));
		}

		receivers.push(ReceiverInfo {
			receiver,
			sender: sender.map(str::to_string),
			dispatch_uid,
			priority,
		});

		// Sort by priority (descending - higher priority first)
		receivers.sort_by(|a, b| b.priority.cmp(&a.priority));
		self.metrics.record_connect();
		tracing::trace!(signal = %self.name, sender = ?sender, "receiver connected");
	}

	/// Connect a receiver function to this signal (simple version)
	pub fn connect<F, Fut>(&self, receiver: F)
	where
		F: Fn(Arc<T>) -> Fut + Send + Sync + 'static,
		Fut: Future<Output = Result<(), SignalError>> + Send + 'static,
	{
		self.connect_with_options(receiver, None, None, 0);
	}

	/// Disconnect the receiver registered under `dispatch_uid` for one sender only
	pub fn disconnect_for(&self, dispatch_uid: &str, sender: &str) -> bool {
		let mut receivers = self.receivers.write();
		let original_len = receivers.len();
		receivers.retain(|r| !r.matches(dispatch_uid, Some(sender)));
		let removed = receivers.len() < original_len;
		if removed {
			self.metrics.record_disconnect();
			tracing::trace!(signal = %self.name, sender, dispatch_uid, "receiver disconnected");
		}
		removed
	}

	/// Whether a receiver with `dispatch_uid` is connected for `sender`
	pub fn is_connected(&self, dispatch_uid: &str, sender: Option<&str>) -> bool {
		self.receivers
			.read()
			.iter()
			.any(|r| r.matches(dispatch_uid, sender))
	}

	fn receivers_for(&self, sender: Option<&str>) -> Vec<ReceiverInfo<T>> {
		self.receivers
			.read()
			.iter()
			.filter(|r| match (r.sender.as_deref(), sender) {
				(None, _) => true,
				(Some(expected), Some(actual)) => expected == actual,
				// Receiver expects a specific sender, but None was provided
				(Some(_), None) => false,
			})
			.cloned()
			.collect()
	}

	/// Send signal to all connected receivers
	///
	/// Stops at the first receiver error and returns it.
	pub async fn send_with_sender(
		&self,
		instance: T,
		sender: Option<&str>,
	) -> Result<(), SignalError> {
		self.metrics.record_send();

		let instance = Arc::new(instance);
		for receiver_info in self.receivers_for(sender) {
			let result = (receiver_info.receiver)(Arc::clone(&instance)).await;
			self.metrics.record_receiver_execution(result.is_ok());
			result?;
		}

		Ok(())
	}

	/// Get number of connected receivers
	pub fn receiver_count(&self) -> usize {
		self.receivers.read().len()
	}

	/// Number of receivers bound to exactly this sender
	pub fn receiver_count_for(&self, sender: &str) -> usize {
		self.receivers
			.read()
			.iter()
			.filter(|r| r.sender.as_deref() == Some(sender))
			.count()
	}
}

impl<T: Send + Sync + 'static> Clone for Signal<T> {
	fn clone(&self) -> Self {
		Self {
			receivers: Arc::clone(&self.receivers),
			metrics: Arc::clone(&self.metrics),
			name: self.name,
		}
	}
}

impl<T: Send + Sync + 'static> fmt::Debug for Signal<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Signal")
			.field("name", &self.name)
			.field("receiver_count", &self.receiver_count())
			.finish()
	}
}
