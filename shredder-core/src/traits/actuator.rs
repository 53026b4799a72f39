//! Motor actuator trait
//!
//! Every motor backend the controller can drive implements [`Actuator`]:
//! - DC motors behind an H-bridge (PWM + direction)
//! - Stepper motors behind a step/dir/enable driver
//!
//! Speeds are signed percentages of rated speed. The sign selects the
//! direction and zero means stopped.

/// Largest speed magnitude an actuator accepts (percent)
pub const MAX_SPEED: i16 = 100;

/// Clamp a signed speed percentage to `[-MAX_SPEED, MAX_SPEED]`
pub const fn clamp_speed(percent: i16) -> i16 {
    if percent > MAX_SPEED {
        MAX_SPEED
    } else if percent < -MAX_SPEED {
        -MAX_SPEED
    } else {
        percent
    }
}

/// Trait for motor actuators commanded by the recovery controller
///
/// Implementations hide how drive intensity is generated (hardware PWM,
/// software step pulses, ...) behind a uniform open-loop speed interface.
///
/// None of the methods may block. Methods that touch input hardware take
/// `&mut self` because reading a pin or an ADC channel may need exclusive
/// access to the peripheral.
pub trait Actuator {
    /// Prepare the hardware-facing state
    ///
    /// Idempotent. Leaves the actuator stopped in a known state.
    fn initialize(&mut self);

    /// Command a signed speed in percent
    ///
    /// The value is clamped to `[-100, 100]` before use. Positive values
    /// drive forward, negative values reverse, and `0` is equivalent to
    /// calling [`Actuator::stop`].
    fn set_speed(&mut self, percent: i16);

    /// Immediately command zero output
    ///
    /// Always succeeds and may be called any number of times.
    fn stop(&mut self);

    /// Service time-driven output generation
    ///
    /// Called every control cycle at arbitrary cadence. Backends with
    /// static outputs implement this as a no-op.
    fn tick(&mut self);

    /// Current load metric
    ///
    /// The scale is backend-defined (for example raw 10-bit ADC counts).
    /// Backends without real feedback return a fixed sentinel.
    fn load(&mut self) -> u16;

    /// Check the independent hardware fault signal
    ///
    /// Backends without such a signal always return `false`; jam
    /// detection then relies on [`Actuator::load`] alone.
    fn is_faulted(&mut self) -> bool;

    /// Last commanded speed after clamping
    fn speed(&self) -> i16;

    /// Check if the actuator is commanded to stand still
    fn is_stopped(&self) -> bool {
        self.speed() == 0
    }
}

impl<T: Actuator + ?Sized> Actuator for &mut T {
    fn initialize(&mut self) {
        T::initialize(self)
    }

    fn set_speed(&mut self, percent: i16) {
        T::set_speed(self, percent)
    }

    fn stop(&mut self) {
        T::stop(self)
    }

    fn tick(&mut self) {
        T::tick(self)
    }

    fn load(&mut self) -> u16 {
        T::load(self)
    }

    fn is_faulted(&mut self) -> bool {
        T::is_faulted(self)
    }

    fn speed(&self) -> i16 {
        T::speed(self)
    }
}
