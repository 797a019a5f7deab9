//! Command dispatch.
//!
//! Maps decoded wire commands onto the capture core and shapes the
//! replies the transport sends back. The transport itself delivers
//! [`Command`] values in and carries [`Reply`] values out; how bytes
//! move is not this layer's concern.

use stigme_protocol::{Command, Reply};

use crate::capture::LogicAnalyzer;
use crate::hw::{CaptureDma, ChangeNotifier, EdgeCapture, PinProbe, SyncTimer};
use crate::session::CaptureEvent;

/// The logic-analyzer instrument: capture core plus command handling.
pub struct Instrument<T, C, N, D, P> {
    analyzer: LogicAnalyzer<T, C, N, D, P>,
}

impl<T, C, N, D, P> Instrument<T, C, N, D, P>
where
    T: SyncTimer,
    C: EdgeCapture,
    N: ChangeNotifier,
    D: CaptureDma,
    P: PinProbe,
{
    /// Wrap a capture core.
    pub const fn new(analyzer: LogicAnalyzer<T, C, N, D, P>) -> Self {
        Self { analyzer }
    }

    /// Execute one command and produce its reply.
    ///
    /// `Stop` and `ReadInitialStates` are total. `Capture` answers an
    /// argument error, with no hardware side effects, when validation
    /// rejects the request.
    pub fn execute(&mut self, command: &Command) -> Reply {
        match command {
            Command::Capture(request) => match self.analyzer.capture(request) {
                Ok(()) => Reply::success(),
                Err(_) => Reply::argument_error(),
            },
            Command::Stop => {
                self.analyzer.stop();
                Reply::success()
            }
            Command::ReadInitialStates => {
                Reply::success_with(&[self.analyzer.initial_pin_states()])
            }
        }
    }

    /// Forward a hardware event to the capture core.
    pub fn handle_event(&mut self, event: CaptureEvent) {
        self.analyzer.handle_event(event);
    }

    /// The capture core, for state queries.
    pub fn analyzer(&self) -> &LogicAnalyzer<T, C, N, D, P> {
        &self.analyzer
    }
}
