//! Model lifecycle signals for docbakery.
//!
//! A [`Signal`] dispatches an instance to async receivers. Receivers may be
//! bound to a sender (a schema name) and registered under a `dispatch_uid`,
//! which is what lets a caller detach one schema's hook and put it back
//! without touching anything else connected to the same signal.
//!
//! ```
//! use docbakery_signals::SignalRegistry;
//!
//! let signals = SignalRegistry::new();
//! let post_save = signals.post_save::<String>();
//! post_save.connect_with_options(
//!     |_doc| async { Ok(()) },
//!     Some("Person"),
//!     Some("person_post_save".to_string()),
//!     0,
//! );
//! assert!(post_save.disconnect_for("person_post_save", "Person"));
//! ```

#![warn(missing_docs)]

mod core;
mod error;
mod metrics;
mod registry;
mod signal;

pub use self::core::{ReceiverFn, SignalName};
pub use error::SignalError;
pub use metrics::SignalMetrics;
pub use registry::SignalRegistry;
pub use signal::Signal;
