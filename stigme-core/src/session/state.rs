//! Session lifecycle and shared counters.
//!
//! The session owns the only mutable state shared between the request
//! path and interrupt context: the active-lane count and the pin
//! snapshot latched at trigger time. All mutation goes through the
//! named operations below; nothing else writes these fields.

use stigme_protocol::Channel;

/// How a pending trigger is detected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TriggerArm {
    /// Capture interrupt on the trigger lane's input-capture unit
    /// (rising or falling edge).
    EdgeInterrupt(Channel),
    /// Change notification on the trigger lane (any edge).
    LevelChange(Channel),
}

/// Session lifecycle phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Phase {
    /// No session in flight. Also the state after the last lane
    /// completes or an abort lands.
    Idle,
    /// Lanes configured; waiting on the armed trigger interrupt.
    Armed(TriggerArm),
    /// Start sequence executed; DMA engines filling their regions.
    Running,
}

/// The in-memory record of the live capture session.
#[derive(Debug, Clone)]
pub struct Session {
    phase: Phase,
    active_channels: u8,
    initial_pin_states: u8,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    /// An idle session with a zero pin snapshot.
    pub const fn new() -> Self {
        Self {
            phase: Phase::Idle,
            active_channels: 0,
            initial_pin_states: 0,
        }
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Whether a session is armed or running.
    pub fn is_active(&self) -> bool {
        !matches!(self.phase, Phase::Idle)
    }

    /// Lanes still filling their regions.
    pub fn active_channels(&self) -> u8 {
        self.active_channels
    }

    /// The pin snapshot latched when the last trigger fired.
    ///
    /// Stale until a trigger has fired at least once; reading it then
    /// returns whatever the previous session latched.
    pub fn initial_pin_states(&self) -> u8 {
        self.initial_pin_states
    }

    /// Record the number of lanes the new session drives.
    pub fn configure(&mut self, channels: u8) {
        self.active_channels = channels;
    }

    /// Enter the armed phase, remembering which detection path holds
    /// the pending trigger.
    pub fn arm(&mut self, arm: TriggerArm) {
        self.phase = Phase::Armed(arm);
    }

    /// Latch the trigger-time pin snapshot and enter the running phase.
    pub fn record_trigger(&mut self, pin_states: u8) {
        self.initial_pin_states = pin_states;
        self.phase = Phase::Running;
    }

    /// Retire one lane. Returns `true` when this was the last active
    /// lane; the session is idle again afterwards.
    pub fn complete_one(&mut self) -> bool {
        self.active_channels = self.active_channels.saturating_sub(1);
        if self.active_channels == 0 {
            self.phase = Phase::Idle;
            true
        } else {
            false
        }
    }

    /// Drop the session unconditionally. The pin snapshot survives so
    /// it can still be read back after a stop.
    pub fn abort(&mut self) {
        self.phase = Phase::Idle;
        self.active_channels = 0;
    }
}
