//! Motor current sensing
//!
//! Direct-drive backends report load as a raw ADC reading taken across a
//! shunt or from a driver's current-sense output. The jam limit in the
//! controller configuration uses the same scale.

/// ADC reading trait for platform abstraction
pub trait CurrentSense {
    /// Read the current-sense ADC channel
    #[allow(clippy::result_unit_err)]
    fn read(&mut self) -> Result<u16, ()>;
}

impl<T: CurrentSense + ?Sized> CurrentSense for &mut T {
    fn read(&mut self) -> Result<u16, ()> {
        T::read(self)
    }
}

/// Placeholder for drives wired without current sensing
///
/// Always reads 0, so jam detection never trips on load.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCurrentSense;

impl CurrentSense for NoCurrentSense {
    fn read(&mut self) -> Result<u16, ()> {
        Ok(0)
    }
}

/// Reduce a wider ADC reading to a narrower scale
///
/// Lets a 12-bit converter keep using limits expressed in 10-bit counts
/// (0-1023), the scale the default configuration assumes.
#[derive(Debug, Clone, Copy)]
pub struct Downscaled<S> {
    inner: S,
    /// Number of low bits to drop
    shift: u8,
}

impl<S: CurrentSense> Downscaled<S> {
    /// Wrap a sensor with `from_bits` resolution to report `to_bits`
    pub fn new(inner: S, from_bits: u8, to_bits: u8) -> Self {
        Self {
            inner,
            shift: from_bits.saturating_sub(to_bits).min(15),
        }
    }

    /// Release the wrapped sensor
    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S: CurrentSense> CurrentSense for Downscaled<S> {
    fn read(&mut self) -> Result<u16, ()> {
        self.inner.read().map(|raw| raw >> self.shift)
    }
}
