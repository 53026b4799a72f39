//! Load feedback sensors

pub mod current;

pub use current::{CurrentSense, Downscaled, NoCurrentSense};
