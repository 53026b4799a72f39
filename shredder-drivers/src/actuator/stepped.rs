//! Stepped-drive actuator (step/dir/enable driver)
//!
//! Drives an external stepper or closed-loop servo driver that takes STEP,
//! DIR, and ENABLE inputs, with an optional ALARM output wired back.
//!
//! # Pulse generation
//!
//! Step pulses are produced in software: every `tick()` compares the time
//! since the last STEP edge with the half-period for the commanded speed
//! and toggles STEP when it is due. `tick()` therefore has to be called
//! well above the step rate (a few kHz at 100%).
//!
//! The half-period shrinks linearly as |speed| grows:
//!
//! ```text
//! |speed|   1% -> max_interval_us (10 ms, 50 steps/s)
//! |speed| 100% -> min_interval_us (200 us, 2500 steps/s)
//! ```
//!
//! # Fault signal
//!
//! Drivers with an ALARM output report faults through it. Polarity differs
//! between driver families, so it is configurable. While the alarm is
//! active `load()` reports [`FAULT_LOAD`]; otherwise the backend has no load
//! feedback and reports 0.

use core::convert::Infallible;

use embedded_hal::digital::{ErrorType, InputPin, OutputPin};
use shredder_core::traits::{clamp_speed, elapsed_us, Actuator, Clock};

use super::DriveError;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Load reported while the driver alarm is active (saturated 10-bit reading)
pub const FAULT_LOAD: u16 = 1023;

/// Active level of the driver's ALARM output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum AlarmPolarity {
    /// Open-collector output pulled up; LOW means alarm
    #[default]
    ActiveLow,
    /// HIGH means alarm
    ActiveHigh,
}

/// Stepped-drive configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SteppedDriveConfig {
    /// STEP half-period at 100% speed (us)
    pub min_interval_us: u32,
    /// STEP half-period at 1% speed (us)
    pub max_interval_us: u32,
    /// ENABLE input is active-low (common on step/dir drivers)
    pub enable_active_low: bool,
    /// Active level of the ALARM output
    pub alarm_polarity: AlarmPolarity,
}

impl Default for SteppedDriveConfig {
    fn default() -> Self {
        Self {
            min_interval_us: 200,
            max_interval_us: 10_000,
            enable_active_low: true,
            alarm_polarity: AlarmPolarity::ActiveLow,
        }
    }
}

impl SteppedDriveConfig {
    /// STEP half-period for a speed magnitude in percent (1-100)
    ///
    /// Magnitudes outside 1-100 are clamped into that range.
    pub fn interval_for(&self, magnitude: u16) -> u32 {
        let magnitude = magnitude.clamp(1, 100) as i64;
        let max = self.max_interval_us as i64;
        let min = self.min_interval_us as i64;

        let interval = max - (magnitude - 1) * (max - min) / 99;
        interval.clamp(0, u32::MAX as i64) as u32
    }
}

/// Placeholder alarm input for drivers without an ALARM line
#[derive(Debug, Clone, Copy, Default)]
pub struct NoAlarm;

impl ErrorType for NoAlarm {
    type Error = Infallible;
}

impl InputPin for NoAlarm {
    fn is_high(&mut self) -> Result<bool, Infallible> {
        Ok(false)
    }

    fn is_low(&mut self) -> Result<bool, Infallible> {
        Ok(true)
    }
}

/// Stepped-drive actuator
pub struct SteppedDrive<STEP, DIR, EN, ALARM, C> {
    /// STEP output
    step: STEP,
    /// DIR output
    dir: DIR,
    /// ENABLE output
    enable: EN,
    /// ALARM input, if wired
    alarm: Option<ALARM>,
    /// Time source for pulse timing
    clock: C,
    /// Configuration
    config: SteppedDriveConfig,
    /// Commanded speed after clamping
    speed: i16,
    /// Current STEP half-period (us)
    interval_us: u32,
    /// Time of the last STEP edge (us)
    last_toggle_us: u32,
    /// Current STEP level
    step_high: bool,
    /// Whether the driver is enabled (holding current)
    enabled: bool,
    /// First I/O error since the last clear
    last_error: Option<DriveError>,
}

impl<STEP, DIR, EN, C> SteppedDrive<STEP, DIR, EN, NoAlarm, C>
where
    STEP: OutputPin,
    DIR: OutputPin,
    EN: OutputPin,
    C: Clock,
{
    /// Create a stepped drive without an ALARM line
    ///
    /// `is_faulted()` always returns false for such a drive.
    pub fn new(step: STEP, dir: DIR, enable: EN, clock: C, config: SteppedDriveConfig) -> Self {
        Self::build(step, dir, enable, None, clock, config)
    }
}

impl<STEP, DIR, EN, ALARM, C> SteppedDrive<STEP, DIR, EN, ALARM, C>
where
    STEP: OutputPin,
    DIR: OutputPin,
    EN: OutputPin,
    ALARM: InputPin,
    C: Clock,
{
    /// Create a stepped drive with an ALARM input
    pub fn with_alarm(
        step: STEP,
        dir: DIR,
        enable: EN,
        alarm: ALARM,
        clock: C,
        config: SteppedDriveConfig,
    ) -> Self {
        Self::build(step, dir, enable, Some(alarm), clock, config)
    }

    fn build(
        step: STEP,
        dir: DIR,
        enable: EN,
        alarm: Option<ALARM>,
        clock: C,
        config: SteppedDriveConfig,
    ) -> Self {
        Self {
            step,
            dir,
            enable,
            alarm,
            clock,
            config,
            speed: 0,
            interval_us: 0,
            last_toggle_us: 0,
            step_high: false,
            enabled: false,
            last_error: None,
        }
    }

    /// Get the configuration
    pub fn config(&self) -> &SteppedDriveConfig {
        &self.config
    }

    /// Check if the driver is enabled
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Current STEP half-period in microseconds (0 when stopped)
    pub fn interval_us(&self) -> u32 {
        if self.enabled {
            self.interval_us
        } else {
            0
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

    fn latch(&mut self, error: DriveError) {
        if self.last_error.is_none() {
            #[cfg(feature = "defmt")]
            defmt::warn!("Stepped drive I/O error: {:?}", error);

            self.last_error = Some(error);
        }
    }

    /// Drive ENABLE to its active or inactive level
    fn write_enable(&mut self, enabled: bool) {
        let high = enabled != self.config.enable_active_low;
        let result = if high {
            self.enable.set_high()
        } else {
            self.enable.set_low()
        };
        if result.is_err() {
            self.latch(DriveError::Enable);
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

    fn write_step(&mut self, high: bool) {
        let result = if high {
            self.step.set_high()
        } else {
            self.step.set_low()
        };
        if result.is_err() {
            self.latch(DriveError::Step);
        }
    }
}

impl<STEP, DIR, EN, ALARM, C> Actuator for SteppedDrive<STEP, DIR, EN, ALARM, C>
where
    STEP: OutputPin,
    DIR: OutputPin,
    EN: OutputPin,
    ALARM: InputPin,
    C: Clock,
{
    fn initialize(&mut self) {
        self.stop();
        self.step_high = false;
        self.write_step(false);
        self.write_direction(true);
    }

    fn set_speed(&mut self, percent: i16) {
        let speed = clamp_speed(percent);
        if speed == 0 {
            self.stop();
            return;
        }

        if !self.enabled {
            self.write_enable(true);
            self.enabled = true;
            // First edge one half-period after enabling
            self.last_toggle_us = self.clock.now_us();
        }

        self.speed = speed;
        self.write_direction(speed > 0);
        self.interval_us = self.config.interval_for(speed.unsigned_abs());
    }

    fn stop(&mut self) {
        self.speed = 0;
        self.enabled = false;
        self.write_enable(false);
    }

    fn tick(&mut self) {
        if !self.enabled || self.speed == 0 {
            return;
        }

        let now = self.clock.now_us();
        if elapsed_us(now, self.last_toggle_us) >= self.interval_us {
            self.last_toggle_us = now;
            self.step_high = !self.step_high;
            self.write_step(self.step_high);
        }
    }

    fn load(&mut self) -> u16 {
        if self.is_faulted() {
            FAULT_LOAD
        } else {
            0
        }
    }

    fn is_faulted(&mut self) -> bool {
        let polarity = self.config.alarm_polarity;
        let Some(alarm) = self.alarm.as_mut() else {
            return false;
        };

        let reading = match polarity {
            AlarmPolarity::ActiveLow => alarm.is_low(),
            AlarmPolarity::ActiveHigh => alarm.is_high(),
        };

        match reading {
            Ok(active) => active,
            Err(_) => {
                // An unreadable alarm line is treated as an alarm
                self.latch(DriveError::Alarm);
                true
            }
        }
    }

    fn speed(&self) -> i16 {
        self.speed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockClock, MockOutput, TestHardware};
    use proptest::prelude::*;

    #[test]
    fn test_interval_mapping() {
        let config = SteppedDriveConfig::default();
        assert_eq!(config.interval_for(1), 10_000);
        assert_eq!(config.interval_for(100), 200);
        assert_eq!(config.interval_for(50), 10_000 - 49 * 9_800 / 99);

        // Out-of-range magnitudes are clamped
        assert_eq!(config.interval_for(0), 10_000);
        assert_eq!(config.interval_for(500), 200);
    }

    #[test]
    fn test_initialize_disables_driver() {
        let hw = TestHardware::new();
        let mut motor = hw.stepped_drive(SteppedDriveConfig::default());

        motor.initialize();
        assert!(!motor.is_enabled());
        // Active-low enable: inactive level is high
        assert!(hw.enable.high.get());
        assert!(!hw.step.high.get());
        assert_eq!(motor.speed(), 0);

        motor.initialize();
        assert!(!motor.is_enabled());
        assert!(!motor.io_fault());
    }

    #[test]
    fn test_set_speed_enables_and_sets_direction() {
        let hw = TestHardware::new();
        let mut motor = hw.stepped_drive(SteppedDriveConfig::default());
        motor.initialize();

        motor.set_speed(100);
        assert!(motor.is_enabled());
        assert!(!hw.enable.high.get());
        assert!(hw.dir.high.get());
        assert_eq!(motor.interval_us(), 200);

        motor.set_speed(-1);
        assert!(!hw.dir.high.get());
        assert_eq!(motor.interval_us(), 10_000);
        assert_eq!(motor.speed(), -1);
    }

    #[test]
    fn test_active_high_enable() {
        let hw = TestHardware::new();
        let mut motor = hw.stepped_drive(SteppedDriveConfig {
            enable_active_low: false,
            ..Default::default()
        });

        motor.initialize();
        assert!(!hw.enable.high.get());

        motor.set_speed(30);
        assert!(hw.enable.high.get());
    }

    #[test]
    fn test_zero_speed_disables() {
        let hw = TestHardware::new();
        let mut motor = hw.stepped_drive(SteppedDriveConfig::default());

        motor.set_speed(60);
        motor.set_speed(0);
        assert!(!motor.is_enabled());
        assert!(hw.enable.high.get());
        assert_eq!(motor.interval_us(), 0);
        assert!(motor.is_stopped());
    }

    #[test]
    fn test_speed_clamped() {
        let hw = TestHardware::new();
        let mut motor = hw.stepped_drive(SteppedDriveConfig::default());

        motor.set_speed(1000);
        assert_eq!(motor.speed(), 100);
        assert_eq!(motor.interval_us(), 200);

        motor.set_speed(-1000);
        assert_eq!(motor.speed(), -100);
    }

    #[test]
    fn test_tick_toggles_at_interval() {
        let hw = TestHardware::new();
        let mut motor = hw.stepped_drive(SteppedDriveConfig::default());
        motor.initialize();

        hw.clock.advance_us(1_000);
        motor.set_speed(100);

        // No edge until a full half-period after enabling
        motor.tick();
        assert!(!hw.step.high.get());

        hw.clock.advance_us(199);
        motor.tick();
        assert!(!hw.step.high.get());

        hw.clock.advance_us(1);
        motor.tick();
        assert!(hw.step.high.get());

        hw.clock.advance_us(200);
        motor.tick();
        assert!(!hw.step.high.get());
    }

    #[test]
    fn test_reenable_restarts_half_period() {
        let hw = TestHardware::new();
        let mut motor = hw.stepped_drive(SteppedDriveConfig::default());
        motor.initialize();
        motor.set_speed(100);

        // Long idle stretch while disabled
        motor.stop();
        hw.clock.advance_ms(50);
        motor.set_speed(-100);
        let writes = hw.step.writes.get();

        motor.tick();
        hw.clock.advance_us(150);
        motor.tick();
        assert_eq!(hw.step.writes.get(), writes);

        hw.clock.advance_us(50);
        motor.tick();
        assert_eq!(hw.step.writes.get(), writes + 1);

        // Changing speed while enabled keeps the edge timing
        hw.clock.advance_us(100);
        motor.set_speed(50);
        hw.clock.advance_us(100);
        motor.tick();
        assert_eq!(hw.step.writes.get(), writes + 1);
    }

    #[test]
    fn test_tick_counts_edges() {
        let hw = TestHardware::new();
        let mut motor = hw.stepped_drive(SteppedDriveConfig::default());
        motor.initialize();
        motor.set_speed(100);
        let writes = hw.step.writes.get();

        // 10ms of ticks every 50us at a 200us half-period
        for _ in 0..200 {
            hw.clock.advance_us(50);
            motor.tick();
        }

        assert_eq!(hw.step.writes.get() - writes, 50);
    }

    #[test]
    fn test_tick_idle_when_stopped() {
        let hw = TestHardware::new();
        let mut motor = hw.stepped_drive(SteppedDriveConfig::default());
        motor.initialize();
        let writes = hw.step.writes.get();

        for _ in 0..100 {
            hw.clock.advance_ms(1);
            motor.tick();
        }

        assert_eq!(hw.step.writes.get(), writes);
    }

    #[test]
    fn test_alarm_active_low() {
        let hw = TestHardware::new();
        let mut motor = hw.stepped_drive(SteppedDriveConfig::default());

        hw.alarm.high.set(true);
        assert!(!motor.is_faulted());
        assert_eq!(motor.load(), 0);

        hw.alarm.high.set(false);
        assert!(motor.is_faulted());
        assert_eq!(motor.load(), FAULT_LOAD);
    }

    #[test]
    fn test_alarm_active_high() {
        let hw = TestHardware::new();
        let mut motor = hw.stepped_drive(SteppedDriveConfig {
            alarm_polarity: AlarmPolarity::ActiveHigh,
            ..Default::default()
        });

        hw.alarm.high.set(false);
        assert!(!motor.is_faulted());

        hw.alarm.high.set(true);
        assert!(motor.is_faulted());
        assert_eq!(motor.load(), FAULT_LOAD);
    }

    #[test]
    fn test_unreadable_alarm_is_fault() {
        let hw = TestHardware::new();
        let mut motor = hw.stepped_drive(SteppedDriveConfig::default());

        hw.alarm.high.set(true);
        hw.alarm.fail.set(true);
        assert!(motor.is_faulted());
        assert_eq!(motor.last_error(), Some(DriveError::Alarm));
    }

    #[test]
    fn test_without_alarm_never_faulted() {
        let hw = TestHardware::new();
        let mut motor = SteppedDrive::new(
            MockOutput(&hw.step),
            MockOutput(&hw.dir),
            MockOutput(&hw.enable),
            &hw.clock,
            SteppedDriveConfig::default(),
        );

        assert!(!motor.is_faulted());
        assert_eq!(motor.load(), 0);
    }

    #[test]
    fn test_step_error_latched() {
        let hw = TestHardware::new();
        let mut motor = hw.stepped_drive(SteppedDriveConfig::default());
        motor.set_speed(100);

        hw.step.fail.set(true);
        hw.clock.advance_ms(1);
        motor.tick();
        assert_eq!(motor.last_error(), Some(DriveError::Step));

        motor.clear_error();
        assert!(!motor.io_fault());
    }

    #[test]
    fn test_clock_is_shared() {
        let clock = MockClock::default();
        let hw = TestHardware::new();
        let mut motor = SteppedDrive::new(
            MockOutput(&hw.step),
            MockOutput(&hw.dir),
            MockOutput(&hw.enable),
            &clock,
            SteppedDriveConfig::default(),
        );
        motor.set_speed(100);

        // The drive reads the clock it was given, not the hardware's
        hw.clock.advance_ms(10);
        clock.advance_us(100);
        motor.tick();
        assert!(!hw.step.high.get());

        clock.advance_us(100);
        motor.tick();
        assert!(hw.step.high.get());
    }

    proptest! {
        #[test]
        fn interval_shrinks_with_speed(a in 1u16..=100, b in 1u16..=100) {
            let config = SteppedDriveConfig::default();
            let (slow, fast) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(config.interval_for(fast) <= config.interval_for(slow));
            prop_assert!(config.interval_for(fast) >= config.min_interval_us);
            prop_assert!(config.interval_for(slow) <= config.max_interval_us);
        }
    }
}
