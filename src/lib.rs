//! # docbakery
//!
//! Test-fixture factory for document schemas.
//!
//! Declare a schema, ask a [`Baker`](seeding::Baker) for instances, and it
//! fills every required field with plausible random data, persists the
//! documents, and removes them again on cleanup. Post-save hooks of the
//! schemas being baked stay disconnected while a call runs, and named
//! collaborators can be swapped for doubles.
//!
//! ## Feature Flags
//!
//! - `seeding` - the factory, generators, hook guard and stores
//! - `signals` - model lifecycle signals
//! - `full` (default) - everything
//!
//! ## Quick Example
//!
//! ```
//! use std::sync::Arc;
//! use docbakery::prelude::*;
//!
//! let signals = SignalRegistry::new();
//! let store = Arc::new(InMemoryStore::new(signals.post_save()));
//! let baker = Baker::builder(store)
//!     .post_save(signals.post_save())
//!     .settings(BakerSettings::default().with_seed(7))
//!     .build()
//!     .unwrap();
//! assert_eq!(baker.ledger_len(), 0);
//! ```

#[cfg(feature = "seeding")]
pub use docbakery_seeding as seeding;

#[cfg(feature = "signals")]
pub use docbakery_signals as signals;

#[cfg(feature = "seeding")]
pub use docbakery_seeding::{
	Baked, Baker, BakerBuilder, BakerSettings, BakeryError, BakeryResult, DocumentInstance,
	DocumentStore, FieldDescriptor, FieldKind, InMemoryStore, Overrides, Schema,
};

#[cfg(feature = "signals")]
pub use docbakery_signals::{Signal, SignalName, SignalRegistry};

/// Everything needed to declare schemas and bake them.
#[cfg(feature = "seeding")]
pub mod prelude {
	pub use docbakery_seeding::prelude::*;
}
