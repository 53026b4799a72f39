//! Events that trigger state transitions

/// Events that can trigger state transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Event {
    // Caller commands
    /// `start()` called; forced (re)start of a run
    Start,
    /// `stop()` called
    Stop,

    // Monitor events
    /// Configured run duration exceeded
    RunTimeout,
    /// Load above limit or backend fault after the inrush window
    JamDetected,

    // Timer events
    /// Post-jam pause elapsed, safe to reverse
    PauseElapsed,
    /// Reverse-clearing duration elapsed
    ClearElapsed,
    /// Impact back-off duration elapsed
    BackoffElapsed,
    /// Impact strike window elapsed
    StrikeElapsed,
}

impl Event {
    /// Check if this event comes from an explicit caller command
    pub fn is_command_event(&self) -> bool {
        matches!(self, Event::Start | Event::Stop)
    }
}
