//! Configuration types
//!
//! Board-agnostic configuration structures for the recovery controller.

pub mod types;

pub use types::*;
