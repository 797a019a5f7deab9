//! Peripheral capability traits.
//!
//! These traits define the interface between the capture core and the
//! hardware it drives. Register-level implementations live with the
//! target firmware; the core only sees these control surfaces.
//!
//! Interrupt delivery is not part of the traits. Firmware interrupt
//! handlers translate their peripheral's interrupt into a
//! [`CaptureEvent`](crate::session::CaptureEvent) and hand it to the
//! core, so that all control flow is visible in one place.

pub mod capture;
pub mod change;
pub mod dma;
pub mod pins;
pub mod timer;

pub use capture::EdgeCapture;
pub use change::ChangeNotifier;
pub use dma::{CaptureDma, DmaSource};
pub use pins::PinProbe;
pub use timer::{CaptureClock, SyncTimer};
