//! Recovery controller
//!
//! Owns the configuration and runtime state of one shredder run and turns
//! elapsed time plus actuator feedback into state machine events.
//!
//! # Usage
//!
//! The controller never blocks and has no timers of its own. The host loop
//! calls `update()` at a regular cadence:
//!
//! ```ignore
//! let mut controller = ShredderController::new(&mut motor, clock);
//! controller.set_config(config);
//! controller.start();
//!
//! loop {
//!     controller.update();
//! }
//! ```
//!
//! Each `update()` ticks the actuator, then evaluates at most one transition
//! and issues at most one motor command.

use crate::config::ShredderConfig;
use crate::safety::{JamCause, JamMonitor, JamStatus, JAM_PAUSE_MS, STRIKE_MS};
use crate::state::{DriveCommand, Event, ShredderState};
use crate::traits::{elapsed_ms, Actuator, Clock};

/// Jam-detecting recovery controller
///
/// Generic over the actuator it commands and the clock it reads. Pass
/// `&mut driver` as the actuator to keep ownership with the caller; the
/// controller never constructs, initializes, or drops hardware.
#[derive(Debug)]
pub struct ShredderController<A, C> {
    /// Commanded motor
    actuator: A,
    /// Monotonic time source
    clock: C,
    /// Configuration applied at the next `start()`
    pending: ShredderConfig,
    /// Configuration of the current run
    config: ShredderConfig,
    /// Jam detector for the current run
    monitor: JamMonitor,
    /// Current state
    state: ShredderState,
    /// Time the current state was entered (ms)
    state_start_ms: u32,
    /// Time the current run began (ms)
    run_start_ms: u32,
    /// Jams detected since the last `start()`
    jam_count: u32,
    /// Cause of the most recent jam
    last_jam: Option<JamCause>,
}

impl<A: Actuator, C: Clock> ShredderController<A, C> {
    /// Create a new controller in `Idle` with the default configuration
    pub fn new(actuator: A, clock: C) -> Self {
        let config = ShredderConfig::default();
        Self {
            actuator,
            clock,
            pending: config,
            config,
            monitor: JamMonitor::new(config.current_limit),
            state: ShredderState::Idle,
            state_start_ms: 0,
            run_start_ms: 0,
            jam_count: 0,
            last_jam: None,
        }
    }

    /// Set the configuration used from the next `start()` on
    pub fn set_config(&mut self, config: ShredderConfig) {
        self.pending = config;
    }

    /// Start a run
    ///
    /// Forced restart: from any state, resets the jam counter, records the
    /// run start, and drives forward with a fresh inrush window.
    pub fn start(&mut self) {
        let now = self.clock.now_ms();

        self.config = self.pending;
        self.monitor = JamMonitor::new(self.config.current_limit);
        self.jam_count = 0;
        self.last_jam = None;
        self.run_start_ms = now;

        self.apply(Event::Start, now);
    }

    /// Stop the motor and return to `Idle`
    ///
    /// Callable from any state, any number of times.
    pub fn stop(&mut self) {
        let now = self.clock.now_ms();
        self.apply(Event::Stop, now);
    }

    /// Run one control cycle
    ///
    /// Ticks the actuator, then checks the current state's exit condition.
    /// Inert while `Idle`.
    pub fn update(&mut self) {
        self.actuator.tick();

        let now = self.clock.now_ms();
        if let Some(event) = self.poll(now) {
            self.apply(event, now);
        }
    }

    /// Get the current state
    pub fn state(&self) -> ShredderState {
        self.state
    }

    /// Get the number of jams detected since the last `start()`
    pub fn jam_count(&self) -> u32 {
        self.jam_count
    }

    /// Get the cause of the most recent jam in this run
    pub fn last_jam(&self) -> Option<JamCause> {
        self.last_jam
    }

    /// Get the configuration of the current run
    pub fn config(&self) -> &ShredderConfig {
        &self.config
    }

    /// Get the configuration that the next `start()` will apply
    pub fn pending_config(&self) -> &ShredderConfig {
        &self.pending
    }

    /// Time spent in the current state (ms)
    pub fn state_elapsed_ms(&self) -> u32 {
        elapsed_ms(self.clock.now_ms(), self.state_start_ms)
    }

    /// Time since the current run began (ms), or 0 when idle
    pub fn run_elapsed_ms(&self) -> u32 {
        if self.state.is_running() {
            elapsed_ms(self.clock.now_ms(), self.run_start_ms)
        } else {
            0
        }
    }

    /// Get the actuator
    pub fn actuator(&self) -> &A {
        &self.actuator
    }

    /// Get the actuator mutably
    ///
    /// Commands issued through this reference bypass the state machine.
    pub fn actuator_mut(&mut self) -> &mut A {
        &mut self.actuator
    }

    /// Get the clock
    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Release the actuator and clock
    pub fn into_parts(self) -> (A, C) {
        (self.actuator, self.clock)
    }

    /// Determine the event due in the current state, if any
    fn poll(&mut self, now: u32) -> Option<Event> {
        let in_state = elapsed_ms(now, self.state_start_ms);

        if self.state.is_recovering() {
            let (limit, event) = self.recovery_timer()?;
            return (in_state > limit).then_some(event);
        }

        if self.state != ShredderState::RunningForward {
            return None;
        }

        if self.config.has_run_timeout()
            && elapsed_ms(now, self.run_start_ms) > self.config.run_duration_ms
        {
            return Some(Event::RunTimeout);
        }

        match self.monitor.check(in_state, &mut self.actuator) {
            JamStatus::Jammed(cause) => {
                self.last_jam = Some(cause);
                Some(Event::JamDetected)
            }
            JamStatus::Masked | JamStatus::Clear => None,
        }
    }

    /// Duration of the current recovery step and the event ending it
    fn recovery_timer(&self) -> Option<(u32, Event)> {
        match self.state {
            ShredderState::JamDetected => Some((JAM_PAUSE_MS, Event::PauseElapsed)),
            ShredderState::ReverseClearing => {
                Some((self.config.reverse_duration_ms, Event::ClearElapsed))
            }
            ShredderState::ImpactBackoff => {
                Some((self.config.impact_backoff_ms, Event::BackoffElapsed))
            }
            ShredderState::ImpactStrike => Some((STRIKE_MS, Event::StrikeElapsed)),
            _ => None,
        }
    }

    /// Apply an event: transition, then issue the entry command
    fn apply(&mut self, event: Event, now: u32) {
        let previous = self.state;
        let next = previous.transition(event, self.config.strategy());

        // Monitor events that do not apply leave everything untouched.
        // Caller commands always re-enter their target state.
        if next == previous && !event.is_command_event() {
            return;
        }

        self.state = next;
        self.state_start_ms = now;

        if previous == ShredderState::RunningForward && next == ShredderState::JamDetected {
            self.jam_count = self.jam_count.saturating_add(1);

            #[cfg(feature = "defmt")]
            defmt::warn!("Jam #{} detected: {:?}", self.jam_count, self.last_jam);
        }

        #[cfg(feature = "defmt")]
        defmt::info!("{:?} -> {:?} on {:?}", previous, next, event);

        match next.entry_command(&self.config) {
            DriveCommand::Stop => self.actuator.stop(),
            DriveCommand::Speed(percent) => self.actuator.set_speed(percent),
        }
    }
}
