//! Value generation for field kinds.
//!
//! - [`FakerType`] - fake-data categories for text fields
//! - [`GeneratorRegistry`] - field kind → generator dispatch table

mod faker;
mod registry;

pub use faker::FakerType;
pub use registry::{GeneratorFn, GeneratorRegistry};
