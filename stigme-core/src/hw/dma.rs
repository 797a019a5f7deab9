//! Capture DMA engines.

use stigme_protocol::Channel;

use crate::buffer::SampleRegion;

/// Hardware event feeding a DMA engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DmaSource {
    /// The paired input-capture unit's result register.
    InputCapture,
}

/// Control surface of the four DMA engines.
///
/// Engine *i* serves lane *i*. Once started, an engine copies each new
/// value its source produces into the lane's region of the sample
/// buffer without software intervention, and signals completion after
/// the programmed number of transfers.
pub trait CaptureDma {
    /// Program one engine: move `transfers` values from `source` into
    /// `region`.
    fn configure(
        &mut self,
        channel: Channel,
        transfers: u16,
        region: SampleRegion,
        source: DmaSource,
    );

    /// Raise the completion interrupt when the transfer count is met.
    fn enable_interrupt(&mut self, channel: Channel);

    /// Begin servicing transfer requests.
    fn start(&mut self, channel: Channel);

    /// Halt one engine and return it to its idle reset state.
    fn reset(&mut self, channel: Channel);
}
