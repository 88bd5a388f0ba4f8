//! Convenience re-exports for common usage.
//!
//! ```
//! use docbakery_seeding::prelude::*;
//!
//! let person = Schema::document("Person")
//!     .field(FieldDescriptor::text("name").required())
//!     .build();
//! assert_eq!(person.name(), "Person");
//! ```

// Error types
pub use crate::error::{BakeryError, BakeryResult};
pub use crate::store::{StoreError, StoreResult};

// Schema metadata
pub use crate::instance::{DocumentInstance, Overrides};
pub use crate::schema::{FieldDescriptor, FieldKind, LifecycleHook, Schema, SchemaKind};

// Factory types
pub use crate::factory::{Baked, Baker, BakerBuilder};
pub use crate::generators::{FakerType, GeneratorRegistry};
pub use crate::settings::BakerSettings;

// Collaborators and hooks
pub use crate::hooks::{HookGuard, SchemaLocks, connect_lifecycle_hook};
pub use crate::patcher::{ModuleNamespace, ModuleRegistry};

// Storage
pub use crate::store::{DocumentStore, InMemoryStore};

// Signals
pub use docbakery_signals::{Signal, SignalError, SignalName, SignalRegistry};
