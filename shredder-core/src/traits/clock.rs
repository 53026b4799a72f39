//! Monotonic time source
//!
//! The controller and stepped actuators never read a global timer. They are
//! handed a [`Clock`] so tests can advance time by hand and firmware can bind
//! it to the platform timer.
//!
//! Timestamps are free-running `u32` counters that wrap. Always compare them
//! through [`elapsed_ms`] / [`elapsed_us`], which stay correct across a wrap.

/// Monotonic millisecond/microsecond clock
pub trait Clock {
    /// Milliseconds since an arbitrary epoch (wrapping)
    fn now_ms(&self) -> u32;

    /// Microseconds since an arbitrary epoch (wrapping)
    ///
    /// The default derives it from [`Clock::now_ms`]. Differences between
    /// two derived readings are exact while the real gap is below ~71 min.
    fn now_us(&self) -> u32 {
        self.now_ms().wrapping_mul(1000)
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now_ms(&self) -> u32 {
        C::now_ms(self)
    }

    fn now_us(&self) -> u32 {
        C::now_us(self)
    }
}

/// Milliseconds elapsed from `since` to `now`
pub const fn elapsed_ms(now: u32, since: u32) -> u32 {
    now.wrapping_sub(since)
}

/// Microseconds elapsed from `since` to `now`
pub const fn elapsed_us(now: u32, since: u32) -> u32 {
    now.wrapping_sub(since)
}

/// Clock backed by `std::time::Instant`, for host-side runs
#[cfg(feature = "std")]
#[derive(Debug, Clone, Copy)]
pub struct StdClock {
    epoch: std::time::Instant,
}

#[cfg(feature = "std")]
impl StdClock {
    /// Create a clock whose epoch is now
    pub fn new() -> Self {
        Self {
            epoch: std::time::Instant::now(),
        }
    }
}

#[cfg(feature = "std")]
impl Default for StdClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "std")]
impl Clock for StdClock {
    fn now_ms(&self) -> u32 {
        self.epoch.elapsed().as_millis() as u32
    }

    fn now_us(&self) -> u32 {
        self.epoch.elapsed().as_micros() as u32
    }
}

/// Clock backed by the embassy time driver
#[cfg(feature = "embassy")]
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbassyClock;

#[cfg(feature = "embassy")]
impl Clock for EmbassyClock {
    fn now_ms(&self) -> u32 {
        embassy_time::Instant::now().as_millis() as u32
    }

    fn now_us(&self) -> u32 {
        embassy_time::Instant::now().as_micros() as u32
    }
}
