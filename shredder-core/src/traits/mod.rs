//! Hardware abstraction traits
//!
//! These traits define the interface between the recovery logic
//! and hardware-specific implementations.

pub mod actuator;
pub mod clock;

pub use actuator::{clamp_speed, Actuator, MAX_SPEED};
pub use clock::{elapsed_ms, elapsed_us, Clock};

#[cfg(feature = "embassy")]
pub use clock::EmbassyClock;
#[cfg(feature = "std")]
pub use clock::StdClock;
