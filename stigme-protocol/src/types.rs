//! Channel and edge identifiers shared by every layer of the instrument.

/// Number of logic-analyzer input lanes.
pub const CHANNEL_COUNT: usize = 4;

/// One logic-analyzer input lane.
///
/// Lane *i* is wired to input-capture unit *i* and DMA engine *i*;
/// that binding is fixed in hardware and never remapped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Channel {
    La1,
    La2,
    La3,
    La4,
}

impl Channel {
    /// All lanes in ascending order.
    pub const ALL: [Channel; CHANNEL_COUNT] = [
        Channel::La1,
        Channel::La2,
        Channel::La3,
        Channel::La4,
    ];

    /// Zero-based index of this lane.
    pub const fn index(self) -> usize {
        match self {
            Channel::La1 => 0,
            Channel::La2 => 1,
            Channel::La3 => 2,
            Channel::La4 => 3,
        }
    }

    /// Lane for a zero-based index.
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Wire encoding. Lanes are numbered 1–4 on the wire; zero is the
    /// "no channel" sentinel used for trigger selection.
    pub fn to_byte(self) -> u8 {
        self.index() as u8 + 1
    }

    /// Decode a wire byte. Zero and anything above 4 are not lanes.
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            1..=4 => Self::from_index(usize::from(byte) - 1),
            _ => None,
        }
    }
}

/// A logic-level transition type used as a capture or trigger condition.
///
/// `None` exists on the wire so that a request carrying it reaches
/// validation and is rejected there; it is never a valid capture
/// configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Edge {
    /// No edge. Rejected by the instrument, kept for wire completeness.
    None,
    /// Both polarities. Requires the change-notification unit when used
    /// as a trigger; a single edge interrupt cannot watch both.
    Any,
    /// High-to-low transitions only.
    Falling,
    /// Low-to-high transitions only.
    Rising,
}

impl Edge {
    /// Wire encoding.
    pub fn to_byte(self) -> u8 {
        match self {
            Edge::None => 0,
            Edge::Any => 1,
            Edge::Falling => 2,
            Edge::Rising => 3,
        }
    }

    /// Decode a wire byte.
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0 => Some(Edge::None),
            1 => Some(Edge::Any),
            2 => Some(Edge::Falling),
            3 => Some(Edge::Rising),
            _ => None,
        }
    }
}
