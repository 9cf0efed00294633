//! Core types for Vellum.

mod keys;

pub use keys::{Key, Value};
