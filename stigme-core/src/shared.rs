//! Exclusion wrapper for interrupt-context sharing.
//!
//! The capture core is mutated from two directions: the command path in
//! thread context and the trigger/completion interrupts. On a bare
//! single-core target those never overlap only if every access runs
//! with the relevant interrupts masked; `Shared` makes that explicit
//! instead of relying on call-site discipline.

use core::cell::RefCell;

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::blocking_mutex::Mutex;

/// Exclusive-access cell for state shared with interrupt handlers.
///
/// With `CriticalSectionRawMutex` every access runs inside a critical
/// section, which is what makes the single-thread-plus-interrupts model
/// sound. Host tests use `NoopRawMutex`.
///
/// ```ignore
/// static INSTRUMENT: Shared<CriticalSectionRawMutex, Instrument<...>> =
///     Shared::new(Instrument::new(...));
///
/// // In the DMA completion handler:
/// INSTRUMENT.with(|i| i.handle_event(CaptureEvent::ChannelComplete(lane)));
/// ```
pub struct Shared<M: RawMutex, T> {
    inner: Mutex<M, RefCell<T>>,
}

impl<M: RawMutex, T> Shared<M, T> {
    /// Wrap a value for shared access.
    pub const fn new(value: T) -> Self {
        Self {
            inner: Mutex::new(RefCell::new(value)),
        }
    }

    /// Run `f` with exclusive access to the wrapped value.
    pub fn with<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        self.inner.lock(|cell| f(&mut cell.borrow_mut()))
    }
}
