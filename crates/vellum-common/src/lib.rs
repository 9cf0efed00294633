//! # vellum-common
//!
//! Common types, errors, and constants shared by all Vellum components.
//!
//! This crate provides the foundational pieces the rest of the workspace
//! builds on:
//!
//! - **Types**: byte-oriented [`Key`] and [`Value`] wrappers used by the
//!   key-value contract
//! - **Errors**: the unified [`VellumError`] and [`VellumResult`] alias
//! - **Constants**: catalog bucket names and layout constants
//!
//! ## Example
//!
//! ```rust
//! use vellum_common::types::Key;
//! use vellum_common::{VellumError, ErrorCode};
//!
//! let key = Key::from_bytes(b"users");
//! assert!(key.starts_with(b"use"));
//!
//! let err = VellumError::TableNotFound { table: "users".into() };
//! assert_eq!(err.code(), ErrorCode::TableNotFound);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod constants;
pub mod error;
pub mod types;

// Re-export commonly used items at the crate root
pub use constants::*;
pub use error::{ErrorCode, VellumError, VellumResult};
pub use types::{Key, Value};
