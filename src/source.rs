//! Tracking source interface
//!
//! The bridge is fed by a callback-driven tracking source: a handler is
//! registered once, invoked with one [`PoseSample`] per update while the
//! source's `step()` is pumped, and unregistered during shutdown.

use std::sync::mpsc;

use crate::wire::PoseSample;

/// Callback invoked with each tracker update
pub type PoseHandler = Box<dyn FnMut(PoseSample) + Send>;

/// A callback-driven feed of pose updates
///
/// `step()` must not block beyond the source's own event processing; the
/// bridge's main loop calls it once per iteration and expects control back
/// promptly.
pub trait TrackingSource {
    /// Register the update handler (replaces any previous one)
    fn register_handler(&mut self, handler: PoseHandler);

    /// Unregister the update handler
    fn unregister_handler(&mut self);

    /// Process pending source events, invoking the handler per update
    fn step(&mut self);
}

/// Tracking source backed by an in-process queue
///
/// Samples pushed through the [`mpsc::Sender`] side are delivered to the
/// registered handler on the next `step()`. Used by the demo as a
/// stand-in feed and by tests to script update sequences.
pub struct QueuedSource {
    rx: mpsc::Receiver<PoseSample>,
    handler: Option<PoseHandler>,
}

impl QueuedSource {
    /// Create a source and the sender used to feed it
    pub fn channel() -> (mpsc::Sender<PoseSample>, Self) {
        let (tx, rx) = mpsc::channel();
        (tx, Self { rx, handler: None })
    }
}

impl TrackingSource for QueuedSource {
    fn register_handler(&mut self, handler: PoseHandler) {
        self.handler = Some(handler);
    }

    fn unregister_handler(&mut self) {
        self.handler = None;
    }

    fn step(&mut self) {
        let Some(handler) = self.handler.as_mut() else {
            return;
        };

        while let Ok(sample) = self.rx.try_recv() {
            handler(sample);
        }
    }
}
