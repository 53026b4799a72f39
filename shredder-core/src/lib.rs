//! Board-agnostic core logic for the shredder motor controller
//!
//! This crate contains all application logic that does not depend on
//! specific hardware implementations:
//!
//! - Hardware abstraction traits (actuator, clock)
//! - Jam detection with inrush masking
//! - Recovery state machine and the controller that drives it
//! - Configuration type definitions

#![cfg_attr(not(any(test, feature = "std")), no_std)]
#![deny(unsafe_code)]

pub mod config;
pub mod recovery;
pub mod safety;
pub mod state;
pub mod traits;
