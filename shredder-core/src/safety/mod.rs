//! Safety monitoring
//!
//! Detects jam conditions and holds the fixed protective timings.

pub mod monitor;

pub use monitor::{JamCause, JamMonitor, JamStatus, INRUSH_MASK_MS, JAM_PAUSE_MS, STRIKE_MS};
