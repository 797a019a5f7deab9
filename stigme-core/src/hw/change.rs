//! Change-notification unit.

use stigme_protocol::Channel;

/// Control surface of the change-notification unit.
///
/// Raises an interrupt on any logic-level change on a watched lane,
/// regardless of polarity. It is the only trigger source that can
/// express "any edge".
pub trait ChangeNotifier {
    /// Interrupt on the next level change on `channel`.
    fn enable_interrupt(&mut self, channel: Channel);

    /// Disable the unit and clear any pending notification.
    fn reset(&mut self);
}
