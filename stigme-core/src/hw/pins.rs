//! Lane-level pin probe.

/// Reads the instantaneous logic level of every lane.
///
/// Bit *i* of the returned byte is lane *i*'s level (bit 0 = La1).
/// Takes `&mut self` so implementations backed by fallible pin reads
/// can cache or debounce internally.
pub trait PinProbe {
    /// Snapshot all lane levels.
    fn read(&mut self) -> u8;
}
