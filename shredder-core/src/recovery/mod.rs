//! Jam recovery controller
//!
//! Drives an [`Actuator`](crate::traits::Actuator) through the recovery
//! state machine, one poll per `update()` call.

pub mod controller;

pub use controller::ShredderController;
