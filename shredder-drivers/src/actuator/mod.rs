//! Actuator implementations
//!
//! This module provides the two reference motor backends:
//!
//! - Direct drive: H-bridge with hardware PWM, static between commands
//! - Stepped drive: step pulses generated in software from `tick()`

pub mod direct;
pub mod stepped;

pub use direct::DirectDrive;
pub use stepped::{AlarmPolarity, NoAlarm, SteppedDrive, SteppedDriveConfig, FAULT_LOAD};

/// Hardware line whose I/O failed
///
/// Actuator operations cannot fail; backends latch the first I/O error
/// here so the integrator can inspect it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DriveError {
    /// PWM duty cycle write failed
    Pwm,
    /// Direction pin write failed
    Direction,
    /// Step pin write failed
    Step,
    /// Enable pin write failed
    Enable,
    /// Alarm input read failed
    Alarm,
    /// Current-sense read failed
    Sense,
}
