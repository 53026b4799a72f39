//! Jam monitor implementation
//!
//! Watches actuator load and fault signals while running forward.

use crate::traits::Actuator;

/// Time after entering forward run during which jam checks are skipped (ms)
///
/// Startup current spikes would otherwise look like a jam.
pub const INRUSH_MASK_MS: u32 = 500;

/// Pause with the motor stopped before reversing after a jam (ms)
pub const JAM_PAUSE_MS: u32 = 500;

/// Duration of the full-speed impact strike (ms)
pub const STRIKE_MS: u32 = 500;

/// What tripped the jam detector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum JamCause {
    /// Load reading above the configured limit
    Overload(u16),
    /// Backend reported a hardware fault
    Fault,
}

/// Jam check result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum JamStatus {
    /// Inside the inrush window; nothing was read
    Masked,
    /// Load and fault signal normal
    Clear,
    /// Jam condition present
    Jammed(JamCause),
}

/// Jam monitor for forward running
///
/// Load-limit breaches and backend faults are treated the same way: either
/// one reports a jam once the inrush window has passed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JamMonitor {
    /// Load above which a jam is declared
    current_limit: u16,
}

impl JamMonitor {
    /// Create a new jam monitor
    pub const fn new(current_limit: u16) -> Self {
        Self { current_limit }
    }

    /// Check if `in_state_ms` is still inside the inrush window
    pub fn is_masked(in_state_ms: u32) -> bool {
        in_state_ms <= INRUSH_MASK_MS
    }

    /// Check the actuator for a jam
    ///
    /// # Arguments
    /// - `in_state_ms`: time since forward run was entered
    /// - `actuator`: the actuator being monitored
    ///
    /// The actuator is not read at all while masked.
    pub fn check<A: Actuator + ?Sized>(&self, in_state_ms: u32, actuator: &mut A) -> JamStatus {
        if Self::is_masked(in_state_ms) {
            return JamStatus::Masked;
        }

        let load = actuator.load();
        if load > self.current_limit {
            return JamStatus::Jammed(JamCause::Overload(load));
        }

        if actuator.is_faulted() {
            return JamStatus::Jammed(JamCause::Fault);
        }

        JamStatus::Clear
    }
}
