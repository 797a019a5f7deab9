//! Edge-sensitive input-capture units.

use stigme_protocol::{Channel, Edge};

use super::timer::CaptureClock;

/// Control surface of the four input-capture units.
///
/// Unit *i* latches its running counter into a result register when the
/// configured edge occurs on lane *i*; the lane binding is fixed in
/// hardware.
pub trait EdgeCapture {
    /// Arm one unit: latch on `edge`, counting `clock`.
    ///
    /// An armed unit whose clock source has not started yet latches
    /// zeros. Those zeros never reach the sample buffer, because DMA
    /// does not run until the trigger sequence starts the clock.
    fn arm(&mut self, channel: Channel, edge: Edge, clock: CaptureClock);

    /// Raise the capture interrupt on one unit's next event.
    ///
    /// A unit interrupts on a single polarity; a trigger on any edge
    /// needs the change-notification unit instead.
    fn enable_interrupt(&mut self, channel: Channel);

    /// Mask one unit's capture interrupt.
    fn disable_interrupt(&mut self, channel: Channel);

    /// Return one unit to its idle reset state.
    fn reset(&mut self, channel: Channel);
}
