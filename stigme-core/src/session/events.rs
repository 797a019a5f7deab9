//! Events delivered to the capture core from interrupt context.

use stigme_protocol::Channel;

/// Hardware events the capture core reacts to.
///
/// Firmware interrupt handlers translate their peripheral's interrupt
/// into one of these and hand it to the core. The set is closed: every
/// asynchronous control-flow path into the core is one of these two
/// values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CaptureEvent {
    /// The armed trigger condition fired (edge interrupt or change
    /// notification, whichever was selected).
    TriggerFired,
    /// A lane's DMA engine transferred its full quota.
    ChannelComplete(Channel),
}

impl CaptureEvent {
    /// The lane this event concerns, if it is lane-specific.
    pub fn channel(&self) -> Option<Channel> {
        match self {
            CaptureEvent::TriggerFired => None,
            CaptureEvent::ChannelComplete(channel) => Some(*channel),
        }
    }
}
