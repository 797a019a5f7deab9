//! Control protocol for the Stigme logic analyzer
//!
//! This crate defines the byte-oriented link between a host and the
//! capture core running on the instrument. The transport itself (UART,
//! USB bulk, whatever the board provides) is out of scope; anything
//! that can move bytes in order can carry these frames.
//!
//! # Frame format
//!
//! ```text
//! ┌──────┬────────┬────────┬──────────┬──────────┐
//! │ SYNC │ LENGTH │ OPCODE │ PAYLOAD  │ CHECKSUM │
//! │ 1B   │ 1B     │ 1B     │ 0–32B    │ 1B       │
//! └──────┴────────┴────────┴──────────┴──────────┘
//! ```
//!
//! Requests and replies use the same framing in both directions. A
//! reply echoes the opcode of the request it answers and carries a
//! response code as the first payload byte.

#![no_std]
#![deny(unsafe_code)]

pub mod commands;
pub mod frame;
pub mod types;

pub use commands::{CaptureRequest, Command, CommandError, Reply, Response};
pub use frame::{Frame, FrameError, FrameReader, FRAME_SYNC, MAX_PAYLOAD};
pub use types::{Channel, Edge, CHANNEL_COUNT};
