//! Board-agnostic capture core for the Stigme logic analyzer
//!
//! This crate contains all capture-control logic that does not depend
//! on a specific target:
//!
//! - Peripheral capability traits (shared timer, input capture,
//!   change notification, DMA, pin probe)
//! - Sample buffer partitioning
//! - Session state and the trigger/capture state machine
//! - Command dispatch
//! - An exclusion wrapper for sharing the core with interrupt handlers
//!
//! Register-level implementations of the peripheral traits and the
//! byte transport live with the target firmware.

#![no_std]
#![deny(unsafe_code)]

pub mod buffer;
pub mod capture;
pub mod hw;
pub mod instrument;
pub mod session;
pub mod shared;

pub use stigme_protocol::{Channel, Edge};
