//! Configuration type definitions
//!
//! These types represent the controller configuration. A configuration is a
//! plain value: it is handed to the controller with `set_config()` and takes
//! effect at the next `start()`.

use crate::traits::MAX_SPEED;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Jam recovery strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum RecoveryStrategy {
    /// Reverse for a while, then resume forward
    #[default]
    ReverseClear,
    /// Back off, then strike the obstruction at full speed
    Impact,
}

/// Recovery controller configuration
///
/// Speeds are percentages of rated speed. Only their magnitude is used:
/// the direction comes from the state being entered, and the magnitude is
/// clamped to `[0, 100]` when the command is issued.
///
/// Durations are used as given. Supplying sane values is the caller's job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ShredderConfig {
    /// Forward drive speed (0-100)
    pub forward_speed: i16,
    /// Reverse drive speed used while clearing or backing off (0-100)
    pub reverse_speed: i16,
    /// Load above which a jam is declared (backend scale, e.g. 0-1023 ADC)
    pub current_limit: u16,
    /// Total run time in ms (0 = run until stopped)
    pub run_duration_ms: u32,
    /// Time spent reversing during a standard clear (ms)
    pub reverse_duration_ms: u32,
    /// Use the back-off-and-strike strategy instead of reverse-clear
    pub use_impact_mode: bool,
    /// Time spent backing off before an impact strike (ms)
    pub impact_backoff_ms: u32,
}

impl Default for ShredderConfig {
    fn default() -> Self {
        Self {
            forward_speed: 100,
            reverse_speed: 50,
            current_limit: 800,
            run_duration_ms: 0,
            reverse_duration_ms: 2000,
            use_impact_mode: false,
            impact_backoff_ms: 1000,
        }
    }
}

impl ShredderConfig {
    /// Selected recovery strategy
    pub fn strategy(&self) -> RecoveryStrategy {
        if self.use_impact_mode {
            RecoveryStrategy::Impact
        } else {
            RecoveryStrategy::ReverseClear
        }
    }

    /// Signed command for forward drive
    pub fn forward_command(&self) -> i16 {
        clamp_magnitude(self.forward_speed)
    }

    /// Signed command for reverse drive
    pub fn reverse_command(&self) -> i16 {
        -clamp_magnitude(self.reverse_speed)
    }

    /// Check if the run is bounded by a timeout
    pub fn has_run_timeout(&self) -> bool {
        self.run_duration_ms > 0
    }
}

/// Magnitude of a configured speed, clamped to `[0, MAX_SPEED]`
fn clamp_magnitude(speed: i16) -> i16 {
    // MAX_SPEED is positive, so the result fits back into i16
    speed.unsigned_abs().min(MAX_SPEED as u16) as i16
}
