//! Capture session state.
//!
//! One session exists at a time. Its lifecycle is explicit: idle until
//! a request is accepted, armed while a trigger interrupt is pending,
//! running once the start sequence has executed, and idle again after
//! the last lane completes or an abort lands.

pub mod events;
pub mod state;

pub use events::CaptureEvent;
pub use state::{Phase, Session, TriggerArm};
