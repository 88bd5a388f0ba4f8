//! Test-fixture factory for document schemas.
//!
//! Given a schema, a [`Baker`] builds instances with realistic random values
//! for every required field, persists them through a [`DocumentStore`], and
//! remembers them so [`Baker::cleanup`] can remove them after the test.
//!
//! - **Generators**: one value generator per [`FieldKind`], backed by the
//!   `fake` crate; text fields named `email`, `name`, `city`, ... get values
//!   of that shape
//! - **Nested schemas**: embedded fields are baked in place; reference fields
//!   bake, persist and link a separate document
//! - **Hook suspension**: post-save hooks of the schemas involved stay
//!   disconnected while a `make` call runs and are reconnected afterwards
//! - **Collaborator substitution**: names passed to
//!   [`Baker::mock_dependencies`] resolve to doubles (or nothing) for the
//!   duration of a call
//!
//! # Quick Start
//!
//! ```ignore
//! use docbakery_seeding::prelude::*;
//!
//! let signals = SignalRegistry::new();
//! let store = Arc::new(InMemoryStore::new(signals.post_save()));
//! let baker = Baker::builder(store).post_save(signals.post_save()).build()?;
//!
//! let person = Schema::document("Person")
//!     .field(FieldDescriptor::text("name").required())
//!     .field(FieldDescriptor::integer("age").required())
//!     .field(FieldDescriptor::text("email").required())
//!     .build();
//!
//! let people = baker.make_many(&person, 3, Overrides::new()).await?;
//! assert_eq!(baker.ledger_len(), 3);
//! baker.cleanup().await?;
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod error;
pub mod factory;
pub mod generators;
pub mod hooks;
pub mod instance;
pub mod patcher;
pub mod prelude;
pub mod schema;
pub mod settings;
pub mod store;
pub mod walker;

// Re-export commonly used types at crate root
pub use error::{BakeryError, BakeryResult};
pub use factory::{Baked, Baker, BakerBuilder};
pub use instance::{DocumentInstance, Overrides};
pub use schema::{FieldDescriptor, FieldKind, LifecycleHook, Schema, SchemaKind};
pub use settings::BakerSettings;
pub use store::{DocumentStore, InMemoryStore, StoreError, StoreResult};
