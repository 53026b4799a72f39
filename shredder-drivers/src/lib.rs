//! Hardware driver implementations
//!
//! This crate provides concrete implementations of the
//! [`Actuator`](shredder_core::traits::Actuator) trait defined in
//! shredder-core, written against the `embedded-hal` 1.0 pin and PWM traits:
//!
//! - Direct-drive DC motors (PWM + direction, current sense)
//! - Stepped-drive motors (step/dir/enable, optional alarm input)
//! - Current-sense readers

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod actuator;
pub mod sensor;

#[cfg(test)]
mod mock;
