//! Test hardware
//!
//! Each test owns a [`TestHardware`] and hands out pins that borrow its
//! cells, so driver outputs can be inspected and inputs injected while the
//! driver holds the pins.

use core::cell::Cell;

use embedded_hal::digital::{self, ErrorKind, ErrorType, InputPin, OutputPin};
use embedded_hal::pwm::{self, SetDutyCycle};
use shredder_core::traits::Clock;

use crate::actuator::{DirectDrive, SteppedDrive, SteppedDriveConfig};
use crate::sensor::CurrentSense;

/// PWM resolution of the mock timer (8-bit, like an AVR analog output)
pub const PWM_MAX: u16 = 255;

/// Injected pin failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PinFault;

impl digital::Error for PinFault {
    fn kind(&self) -> ErrorKind {
        ErrorKind::Other
    }
}

impl pwm::Error for PinFault {
    fn kind(&self) -> pwm::ErrorKind {
        pwm::ErrorKind::Other
    }
}

/// State of one digital line
#[derive(Debug, Default)]
pub struct Line {
    pub high: Cell<bool>,
    pub fail: Cell<bool>,
    pub writes: Cell<u32>,
}

/// Output pin writing into a [`Line`]
pub struct MockOutput<'a>(pub &'a Line);

impl ErrorType for MockOutput<'_> {
    type Error = PinFault;
}

impl OutputPin for MockOutput<'_> {
    fn set_low(&mut self) -> Result<(), PinFault> {
        self.write(false)
    }

    fn set_high(&mut self) -> Result<(), PinFault> {
        self.write(true)
    }
}

impl MockOutput<'_> {
    fn write(&mut self, high: bool) -> Result<(), PinFault> {
        if self.0.fail.get() {
            return Err(PinFault);
        }
        self.0.high.set(high);
        self.0.writes.set(self.0.writes.get() + 1);
        Ok(())
    }
}

/// Input pin reading from a [`Line`]
pub struct MockInput<'a>(pub &'a Line);

impl ErrorType for MockInput<'_> {
    type Error = PinFault;
}

impl InputPin for MockInput<'_> {
    fn is_high(&mut self) -> Result<bool, PinFault> {
        if self.0.fail.get() {
            return Err(PinFault);
        }
        Ok(self.0.high.get())
    }

    fn is_low(&mut self) -> Result<bool, PinFault> {
        self.is_high().map(|high| !high)
    }
}

/// State of a PWM channel
#[derive(Debug, Default)]
pub struct PwmChannel {
    pub duty: Cell<u16>,
    pub fail: Cell<bool>,
}

/// PWM output writing into a [`PwmChannel`]
pub struct MockPwm<'a>(pub &'a PwmChannel);

impl pwm::ErrorType for MockPwm<'_> {
    type Error = PinFault;
}

impl SetDutyCycle for MockPwm<'_> {
    fn max_duty_cycle(&self) -> u16 {
        PWM_MAX
    }

    fn set_duty_cycle(&mut self, duty: u16) -> Result<(), PinFault> {
        if self.0.fail.get() {
            return Err(PinFault);
        }
        self.0.duty.set(duty);
        Ok(())
    }
}

/// State of an ADC channel
#[derive(Debug, Default)]
pub struct AdcChannel {
    pub value: Cell<u16>,
    pub fail: Cell<bool>,
}

/// Current-sense reader backed by an [`AdcChannel`]
pub struct MockSense<'a>(pub &'a AdcChannel);

impl CurrentSense for MockSense<'_> {
    fn read(&mut self) -> Result<u16, ()> {
        if self.0.fail.get() {
            return Err(());
        }
        Ok(self.0.value.get())
    }
}

/// Hand-advanced clock with microsecond resolution
#[derive(Debug, Default)]
pub struct MockClock {
    pub us: Cell<u32>,
}

impl MockClock {
    pub fn advance_us(&self, us: u32) {
        self.us.set(self.us.get().wrapping_add(us));
    }

    pub fn advance_ms(&self, ms: u32) {
        self.advance_us(ms * 1000);
    }
}

impl Clock for MockClock {
    fn now_ms(&self) -> u32 {
        self.us.get() / 1000
    }

    fn now_us(&self) -> u32 {
        self.us.get()
    }
}

/// All hardware state a test can observe or inject
#[derive(Debug, Default)]
pub struct TestHardware {
    pub pwm: PwmChannel,
    pub dir: Line,
    pub step: Line,
    pub enable: Line,
    pub alarm: Line,
    pub sense: AdcChannel,
    pub clock: MockClock,
}

impl TestHardware {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn direct_drive(&self) -> DirectDrive<MockPwm<'_>, MockOutput<'_>, MockSense<'_>> {
        DirectDrive::new(MockPwm(&self.pwm), MockOutput(&self.dir), MockSense(&self.sense))
    }

    pub fn stepped_drive(
        &self,
        config: SteppedDriveConfig,
    ) -> SteppedDrive<MockOutput<'_>, MockOutput<'_>, MockOutput<'_>, MockInput<'_>, &MockClock>
    {
        SteppedDrive::with_alarm(
            MockOutput(&self.step),
            MockOutput(&self.dir),
            MockOutput(&self.enable),
            MockInput(&self.alarm),
            &self.clock,
            config,
        )
    }
}

