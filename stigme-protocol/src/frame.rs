//! Frame encoding and incremental parsing.
//!
//! Frame format:
//! - SYNC (1 byte): 0x5A synchronization byte
//! - LENGTH (1 byte): payload length (0–32)
//! - OPCODE (1 byte): command or reply identifier
//! - PAYLOAD (0–32 bytes): opcode-specific data
//! - CHECKSUM (1 byte): XOR of LENGTH, OPCODE, and all PAYLOAD bytes

use heapless::Vec;

/// Frame synchronization byte.
pub const FRAME_SYNC: u8 = 0x5A;

/// Maximum payload size in bytes. Commands and replies are tiny; the
/// cap bounds the reader's buffer.
pub const MAX_PAYLOAD: usize = 32;

/// Maximum complete frame size (SYNC + LENGTH + OPCODE + payload + CHECKSUM).
pub const MAX_FRAME: usize = MAX_PAYLOAD + 4;

/// Errors raised while encoding or parsing frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameError {
    /// Payload exceeds [`MAX_PAYLOAD`].
    PayloadTooLarge,
    /// LENGTH byte announced more payload than a frame may carry.
    LengthOutOfRange,
    /// CHECKSUM byte did not match the frame contents.
    ChecksumMismatch,
    /// Destination buffer cannot hold the encoded frame.
    BufferTooSmall,
}

/// A parsed or constructed frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Command or reply identifier.
    pub opcode: u8,
    /// Opcode-specific data.
    pub payload: Vec<u8, MAX_PAYLOAD>,
}

impl Frame {
    /// Build a frame around a payload.
    pub fn new(opcode: u8, payload: &[u8]) -> Result<Self, FrameError> {
        let payload = Vec::from_slice(payload).map_err(|_| FrameError::PayloadTooLarge)?;
        Ok(Self { opcode, payload })
    }

    /// Build a payload-less frame.
    pub fn empty(opcode: u8) -> Self {
        Self {
            opcode,
            payload: Vec::new(),
        }
    }

    fn checksum(length: u8, opcode: u8, payload: &[u8]) -> u8 {
        payload
            .iter()
            .fold(length ^ opcode, |acc, byte| acc ^ byte)
    }

    /// Encoded size of this frame in bytes.
    pub fn encoded_len(&self) -> usize {
        self.payload.len() + 4
    }

    /// Encode into `buffer`, returning the number of bytes written.
    pub fn encode(&self, buffer: &mut [u8]) -> Result<usize, FrameError> {
        let total = self.encoded_len();
        if buffer.len() < total {
            return Err(FrameError::BufferTooSmall);
        }

        let length = self.payload.len() as u8;
        buffer[0] = FRAME_SYNC;
        buffer[1] = length;
        buffer[2] = self.opcode;
        buffer[3..3 + self.payload.len()].copy_from_slice(&self.payload);
        buffer[total - 1] = Self::checksum(length, self.opcode, &self.payload);

        Ok(total)
    }

    /// Encode into an owned buffer.
    pub fn encode_to_vec(&self) -> Result<Vec<u8, MAX_FRAME>, FrameError> {
        let mut buffer = [0u8; MAX_FRAME];
        let len = self.encode(&mut buffer)?;
        Vec::from_slice(&buffer[..len]).map_err(|_| FrameError::BufferTooSmall)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReadState {
    /// Scanning for the SYNC byte.
    Sync,
    /// SYNC seen, next byte is LENGTH.
    Length,
    /// LENGTH seen, next byte is OPCODE.
    Opcode,
    /// Collecting payload bytes.
    Payload,
    /// Next byte is CHECKSUM.
    Checksum,
}

/// Incremental frame parser.
///
/// Feed it the receive stream one byte at a time; it scans for SYNC,
/// ignores garbage between frames, and yields a [`Frame`] once the
/// checksum verifies. After an error the reader is back at SYNC scan,
/// so a corrupted frame costs only itself.
#[derive(Debug, Clone)]
pub struct FrameReader {
    state: ReadState,
    opcode: u8,
    remaining: u8,
    payload: Vec<u8, MAX_PAYLOAD>,
}

impl Default for FrameReader {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameReader {
    /// A reader scanning for the next SYNC byte.
    pub const fn new() -> Self {
        Self {
            state: ReadState::Sync,
            opcode: 0,
            remaining: 0,
            payload: Vec::new(),
        }
    }

    /// Drop any partial frame and scan for the next SYNC byte.
    pub fn reset(&mut self) {
        self.state = ReadState::Sync;
        self.opcode = 0;
        self.remaining = 0;
        self.payload.clear();
    }

    /// Consume one byte from the receive stream.
    ///
    /// Returns `Ok(Some(frame))` when this byte completed a valid
    /// frame, `Ok(None)` when more bytes are needed.
    pub fn push(&mut self, byte: u8) -> Result<Option<Frame>, FrameError> {
        match self.state {
            ReadState::Sync => {
                if byte == FRAME_SYNC {
                    self.state = ReadState::Length;
                }
                Ok(None)
            }
            ReadState::Length => {
                if usize::from(byte) > MAX_PAYLOAD {
                    self.reset();
                    return Err(FrameError::LengthOutOfRange);
                }
                self.remaining = byte;
                self.state = ReadState::Opcode;
                Ok(None)
            }
            ReadState::Opcode => {
                self.opcode = byte;
                self.payload.clear();
                self.state = if self.remaining == 0 {
                    ReadState::Checksum
                } else {
                    ReadState::Payload
                };
                Ok(None)
            }
            ReadState::Payload => {
                // LENGTH was bounds-checked, so the push cannot fail.
                let _ = self.payload.push(byte);
                self.remaining -= 1;
                if self.remaining == 0 {
                    self.state = ReadState::Checksum;
                }
                Ok(None)
            }
            ReadState::Checksum => {
                let expected =
                    Frame::checksum(self.payload.len() as u8, self.opcode, &self.payload);
                if byte != expected {
                    self.reset();
                    return Err(FrameError::ChecksumMismatch);
                }

                let frame = Frame {
                    opcode: self.opcode,
                    payload: self.payload.clone(),
                };
                self.reset();
                Ok(Some(frame))
            }
        }
    }

    /// Consume a run of bytes, stopping at the first complete frame.
    ///
    /// Bytes after the completed frame are left unconsumed; the caller
    /// re-feeds them on the next call.
    pub fn push_slice(&mut self, bytes: &[u8]) -> Result<Option<Frame>, FrameError> {
        for &byte in bytes {
            if let Some(frame) = self.push(byte)? {
                return Ok(Some(frame));
            }
        }
        Ok(None)
    }
}
