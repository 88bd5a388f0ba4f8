//! Dispatch counters for a signal

use std::sync::atomic::{AtomicU64, Ordering};

/// Point-in-time copy of a signal's counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SignalMetrics {
	/// Number of `send*` calls.
	pub sends: u64,
	/// Receivers that ran and returned `Ok`.
	pub receivers_succeeded: u64,
	/// Receivers that ran and returned `Err`.
	pub receivers_failed: u64,
	/// Receiver registrations.
	pub connects: u64,
	/// Receiver removals that actually removed something.
	pub disconnects: u64,
}

#[derive(Debug, Default)]
pub(crate) struct MetricsCollector {
	sends: AtomicU64,
	receivers_succeeded: AtomicU64,
	receivers_failed: AtomicU64,
	connects: AtomicU64,
	disconnects: AtomicU64,
}

impl MetricsCollector {
	pub(crate) fn new() -> Self {
		Self::default()
	}

	pub(crate) fn record_send(&self) {
		self.sends.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_receiver_execution(&self, success: bool) {
		if success {
			self.receivers_succeeded.fetch_add(1, Ordering::Relaxed);
		} else {
			self.receivers_failed.fetch_add(1, Ordering::Relaxed);
		}
	}

	pub(crate) fn record_connect(&self) {
		self.connects.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_disconnect(&self) {
		self.disconnects.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn snapshot(&self) -> SignalMetrics {
		SignalMetrics {
			sends: self.sends.load(Ordering::Relaxed),
			receivers_succeeded: self.receivers_succeeded.load(Ordering::Relaxed),
			receivers_failed: self.receivers_failed.load(Ordering::Relaxed),
			connects: self.connects.load(Ordering::Relaxed),
			disconnects: self.disconnects.load(Ordering::Relaxed),
		}
	}
}
