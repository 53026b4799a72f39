//! Direct-drive DC motor actuator
//!
//! This driver provides:
//! - PWM duty cycle proportional to |speed| (0-100% onto 0-max duty)
//! - Direction pin reflecting the sign of the speed (high = forward)
//! - Load from a current-sense ADC channel
//!
//! Output is static between commands, so `tick()` does nothing. The
//! backend has no fault signal of its own; jam detection relies on load.
//!
//! # Usage
//!
//! ```ignore
//! let mut motor = DirectDrive::new(pwm, dir_pin, current_adc);
//! motor.initialize();
//! motor.set_speed(80); // 80% forward
//! motor.set_speed(-50); // 50% reverse
//! ```

use embedded_hal::digital::OutputPin;
use embedded_hal::pwm::SetDutyCycle;
use shredder_core::traits::{clamp_speed, Actuator};

use super::DriveError;
use crate::sensor::CurrentSense;

/// Direct-drive DC motor (PWM + direction)
pub struct DirectDrive<PWM, DIR, SENSE> {
    /// Drive intensity output
    pwm: PWM,
    /// Direction output
    dir: DIR,
    /// Current-sense input
    sense: SENSE,
    /// Commanded speed after clamping
    speed: i16,
    /// First I/O error since the last clear
    last_error: Option<DriveError>,
}

impl<PWM, DIR, SENSE> DirectDrive<PWM, DIR, SENSE>
where
    PWM: SetDutyCycle,
    DIR: OutputPin,
    SENSE: CurrentSense,
{
    /// Create a new direct-drive actuator
    ///
    /// Outputs are left untouched until [`Actuator::initialize`].
    pub fn new(pwm: PWM, dir: DIR, sense: SENSE) -> Self {
        Self {
            pwm,
            dir,
            sense,
            speed: 0,
            last_error: None,
        }
    }

    /// Get the first I/O error latched since the last clear
    pub fn last_error(&self) -> Option<DriveError> {
        self.last_error
    }

    /// Check if any I/O error has been latched
    pub fn io_fault(&self) -> bool {
        self.last_error.is_some()
    }

    /// Clear the latched I/O error
    pub fn clear_error(&mut self) {
        self.last_error = None;
    }

    /// Release the hardware resources
    pub fn release(self) -> (PWM, DIR, SENSE) {
        (self.pwm, self.dir, self.sense)
    }

    fn latch(&mut self, error: DriveError) {
        if self.last_error.is_none() {
            #[cfg(feature = "defmt")]
            defmt::warn!("Direct drive I/O error: {:?}", error);

            self.last_error = Some(error);
        }
    }

    fn write_direction(&mut self, forward: bool) {
        let result = if forward {
            self.dir.set_high()
        } else {
            self.dir.set_low()
        };
        if result.is_err() {
            self.latch(DriveError::Direction);
        }
    }
}

impl<PWM, DIR, SENSE> Actuator for DirectDrive<PWM, DIR, SENSE>
where
    PWM: SetDutyCycle,
    DIR: OutputPin,
    SENSE: CurrentSense,
{
    fn initialize(&mut self) {
        self.stop();
        self.write_direction(true);
    }

    fn set_speed(&mut self, percent: i16) {
        let speed = clamp_speed(percent);
        if speed == 0 {
            self.stop();
            return;
        }

        self.speed = speed;
        self.write_direction(speed > 0);

        // clamp_speed bounds the magnitude to 100
        if self
            .pwm
            .set_duty_cycle_percent(speed.unsigned_abs() as u8)
            .is_err()
        {
            self.latch(DriveError::Pwm);
        }
    }

    fn stop(&mut self) {
        self.speed = 0;
        if self.pwm.set_duty_cycle_fully_off().is_err() {
            self.latch(DriveError::Pwm);
        }
    }

    fn tick(&mut self) {
        // Hardware PWM needs no servicing
    }

    fn load(&mut self) -> u16 {
        match self.sense.read() {
            Ok(raw) => raw,
            Err(()) => {
                self.latch(DriveError::Sense);
                0
            }
        }
    }

    fn is_faulted(&mut self) -> bool {
        false
    }

    fn speed(&self) -> i16 {
        self.speed
    }
}
