//! Shared helpers for docbakery-seeding integration tests.

#[path = "helpers/kitchen.rs"]
pub mod kitchen;
