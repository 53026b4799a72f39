//! State machine definition
//!
//! Motor behavior is a function of the current state and an event. The
//! transition table is pure; the controller turns elapsed time and actuator
//! feedback into events and applies the entry command of the new state.

use super::events::Event;
use crate::config::{RecoveryStrategy, ShredderConfig};
use crate::traits::MAX_SPEED;

/// Controller states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ShredderState {
    /// At rest; initial state and target of every stop
    #[default]
    Idle,
    /// Driving forward, watching load after the inrush window
    RunningForward,
    /// Jam seen; motor stopped while current decays
    JamDetected,
    /// Standard strategy: reversing to free the material
    ReverseClearing,
    /// Impact strategy: backing off to gain run-up distance
    ImpactBackoff,
    /// Impact strategy: full-speed forward strike
    ImpactStrike,
    /// Reserved. No transition enters or leaves this state.
    Paused,
}

/// Motor command issued on entering a state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DriveCommand {
    /// Stop the actuator
    Stop,
    /// Drive at a signed speed percentage
    Speed(i16),
}

impl ShredderState {
    /// Check if the motor is meant to be turning in this state
    pub fn motor_active(&self) -> bool {
        matches!(
            self,
            ShredderState::RunningForward
                | ShredderState::ReverseClearing
                | ShredderState::ImpactBackoff
                | ShredderState::ImpactStrike
        )
    }

    /// Check if a run is in progress (any state other than rest)
    pub fn is_running(&self) -> bool {
        !matches!(self, ShredderState::Idle | ShredderState::Paused)
    }

    /// Check if this state belongs to a jam recovery cycle
    pub fn is_recovering(&self) -> bool {
        matches!(
            self,
            ShredderState::JamDetected
                | ShredderState::ReverseClearing
                | ShredderState::ImpactBackoff
                | ShredderState::ImpactStrike
        )
    }

    /// Process an event and return the next state
    ///
    /// Events that do not apply to the current state leave it unchanged.
    pub fn transition(self, event: Event, strategy: RecoveryStrategy) -> Self {
        use ShredderState::*;

        match (self, event) {
            // Caller commands override everything
            (_, Event::Start) => RunningForward,
            (_, Event::Stop) => Idle,

            (RunningForward, Event::RunTimeout) => Idle,
            (RunningForward, Event::JamDetected) => JamDetected,

            (JamDetected, Event::PauseElapsed) => match strategy {
                RecoveryStrategy::ReverseClear => ReverseClearing,
                RecoveryStrategy::Impact => ImpactBackoff,
            },

            (ReverseClearing, Event::ClearElapsed) => RunningForward,
            (ImpactBackoff, Event::BackoffElapsed) => ImpactStrike,
            (ImpactStrike, Event::StrikeElapsed) => RunningForward,

            // Default: stay in current state
            _ => self,
        }
    }

    /// Motor command to issue when this state is entered
    pub fn entry_command(&self, config: &ShredderConfig) -> DriveCommand {
        if !self.motor_active() {
            return DriveCommand::Stop;
        }

        match self {
            ShredderState::RunningForward => DriveCommand::Speed(config.forward_command()),
            ShredderState::ReverseClearing | ShredderState::ImpactBackoff => {
                DriveCommand::Speed(config.reverse_command())
            }
            // Full speed regardless of configuration, for maximum inertia
            ShredderState::ImpactStrike => DriveCommand::Speed(MAX_SPEED),
            ShredderState::Idle | ShredderState::JamDetected | ShredderState::Paused => {
                DriveCommand::Stop
            }
        }
    }
}
