//! Signal registry
//!
//! Signals are looked up by payload type and name. The registry is an
//! ordinary value: construct one at startup and share it (it is cheap to
//! clone) with everything that emits or listens to model signals.

use super::core::SignalName;
use super::signal::Signal;
use parking_lot::RwLock;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;

type SignalMap = HashMap<(TypeId, SignalName), Box<dyn Any + Send + Sync>>;

/// Registry handing out shared [`Signal`] handles
#[derive(Clone, Default)]
pub struct SignalRegistry {
	signals: Arc<RwLock<SignalMap>>,
}

impl SignalRegistry {
	/// Create an empty registry
	pub fn new() -> Self {
		Self::default()
	}

	fn get_or_create<T: Send + Sync + 'static>(&self, name: SignalName) -> Signal<T> {
		let key = (TypeId::of::<T>(), name);

		{
			let signals = self.signals.read();
			if let Some(signal_any) = signals.get(&key)
				&& let Some(signal) = signal_any.downcast_ref::<Signal<T>>()
			{
				return signal.clone();
			}
		}

		let mut signals = self.signals.write();
		// Another caller may have created it between the two locks
		if let Some(signal) = signals
			.get(&key)
			.and_then(|signal_any| signal_any.downcast_ref::<Signal<T>>())
		{
			return signal.clone();
		}
		let signal = Signal::new(name);
		signals.insert(key, Box::new(signal.clone()));
		signal
	}

	/// Post-save signal - sent after an instance is saved
	pub fn post_save<T: Send + Sync + 'static>(&self) -> Signal<T> {
		self.get_or_create::<T>(SignalName::POST_SAVE)
	}

	/// Number of distinct signals created so far
	pub fn len(&self) -> usize {
		self.signals.read().len()
	}

	/// Returns true if no signal has been created yet
	pub fn is_empty(&self) -> bool {
		self.signals.read().is_empty()
	}
}

impl std::fmt::Debug for SignalRegistry {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("SignalRegistry")
			.field("signals", &self.len())
			.finish()
	}
}
