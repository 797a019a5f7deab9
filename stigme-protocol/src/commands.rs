//! Host commands and instrument replies.
//!
//! Three commands drive the logic analyzer: `Capture` starts a session,
//! `Stop` aborts whatever is in flight, and `ReadInitialStates` reads
//! back the pin snapshot latched when the last trigger fired.

use heapless::Vec;

use crate::frame::{Frame, FrameError};
use crate::types::{Channel, Edge};

/// Opcode: begin a capture session.
pub const OP_CAPTURE: u8 = 0x31;
/// Opcode: abort the session unconditionally.
pub const OP_STOP: u8 = 0x32;
/// Opcode: read the trigger-time pin snapshot.
pub const OP_READ_INITIAL_STATES: u8 = 0x33;

/// Capture payload: channel count, sample quota (u16 LE), edge, trigger.
const CAPTURE_PAYLOAD_LEN: usize = 5;

/// Maximum reply payload carried alongside the response code.
pub const MAX_REPLY_DATA: usize = 8;

/// Errors raised while decoding a frame into a command.
///
/// These are malformed-frame problems, distinct from the semantic
/// validation the instrument applies to a decoded request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CommandError {
    /// Opcode is not one of the commands this instrument answers.
    UnknownOpcode,
    /// Payload length does not match the opcode.
    PayloadLength,
    /// Edge byte outside the wire encoding.
    UnknownEdge,
    /// Trigger byte is neither a lane nor the none sentinel.
    UnknownTrigger,
}

/// A decoded capture request.
///
/// `channel_count` is carried as received; range checking is the
/// instrument's job, so that out-of-range counts answer with the
/// argument-error response rather than a framing error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CaptureRequest {
    /// Number of lanes to record, starting from La1.
    pub channel_count: u8,
    /// Timestamps to capture per lane.
    pub samples_per_channel: u16,
    /// Transition type to record on every active lane.
    pub edge: Edge,
    /// Lane gating the start of the capture, if any.
    pub trigger: Option<Channel>,
}

/// Commands decoded from host frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command {
    /// Begin a capture session.
    Capture(CaptureRequest),
    /// Abort the session unconditionally.
    Stop,
    /// Read the trigger-time pin snapshot.
    ReadInitialStates,
}

impl Command {
    /// Decode a command from a received frame.
    pub fn from_frame(frame: &Frame) -> Result<Self, CommandError> {
        match frame.opcode {
            OP_CAPTURE => {
                let p = &frame.payload;
                if p.len() != CAPTURE_PAYLOAD_LEN {
                    return Err(CommandError::PayloadLength);
                }

                let edge = Edge::from_byte(p[3]).ok_or(CommandError::UnknownEdge)?;
                let trigger = match p[4] {
                    0 => None,
                    byte => Some(Channel::from_byte(byte).ok_or(CommandError::UnknownTrigger)?),
                };

                Ok(Command::Capture(CaptureRequest {
                    channel_count: p[0],
                    samples_per_channel: u16::from_le_bytes([p[1], p[2]]),
                    edge,
                    trigger,
                }))
            }
            OP_STOP => {
                if !frame.payload.is_empty() {
                    return Err(CommandError::PayloadLength);
                }
                Ok(Command::Stop)
            }
            OP_READ_INITIAL_STATES => {
                if !frame.payload.is_empty() {
                    return Err(CommandError::PayloadLength);
                }
                Ok(Command::ReadInitialStates)
            }
            _ => Err(CommandError::UnknownOpcode),
        }
    }

    /// Encode this command into a frame (host side, also used in tests).
    pub fn to_frame(&self) -> Result<Frame, FrameError> {
        match self {
            Command::Capture(request) => {
                let samples = request.samples_per_channel.to_le_bytes();
                let trigger = request.trigger.map(Channel::to_byte).unwrap_or(0);
                Frame::new(
                    OP_CAPTURE,
                    &[
                        request.channel_count,
                        samples[0],
                        samples[1],
                        request.edge.to_byte(),
                        trigger,
                    ],
                )
            }
            Command::Stop => Ok(Frame::empty(OP_STOP)),
            Command::ReadInitialStates => Ok(Frame::empty(OP_READ_INITIAL_STATES)),
        }
    }
}

/// Response codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Response {
    /// Command executed.
    Success,
    /// Request rejected during validation; no hardware was touched.
    ArgumentError,
}

impl Response {
    /// Wire encoding.
    pub fn to_byte(self) -> u8 {
        match self {
            Response::Success => 0x01,
            Response::ArgumentError => 0x02,
        }
    }

    /// Decode a wire byte.
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0x01 => Some(Response::Success),
            0x02 => Some(Response::ArgumentError),
            _ => None,
        }
    }
}

/// A reply to one command: response code plus optional data bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    /// Outcome of the command.
    pub response: Response,
    /// Command-specific data (e.g. the pin snapshot byte).
    pub data: Vec<u8, MAX_REPLY_DATA>,
}

impl Reply {
    /// A bare success reply.
    pub fn success() -> Self {
        Self {
            response: Response::Success,
            data: Vec::new(),
        }
    }

    /// A success reply carrying data bytes.
    pub fn success_with(data: &[u8]) -> Self {
        Self {
            response: Response::Success,
            // Reply data is at most a few bytes; anything larger than
            // the cap is a caller bug and is dropped.
            data: Vec::from_slice(data).unwrap_or_default(),
        }
    }

    /// A validation-failure reply.
    pub fn argument_error() -> Self {
        Self {
            response: Response::ArgumentError,
            data: Vec::new(),
        }
    }

    /// Encode as a frame answering `opcode`. The response code is the
    /// first payload byte, data bytes follow.
    pub fn to_frame(&self, opcode: u8) -> Result<Frame, FrameError> {
        let mut payload = Vec::<u8, { MAX_REPLY_DATA + 1 }>::new();
        payload
            .push(self.response.to_byte())
            .map_err(|_| FrameError::PayloadTooLarge)?;
        payload
            .extend_from_slice(&self.data)
            .map_err(|_| FrameError::PayloadTooLarge)?;
        Frame::new(opcode, &payload)
    }
}
