//! Vertical-sync / flush handshake.
//!
//! The panel scans its frame buffer out continuously. Writing into that
//! buffer while a frame is being scanned produces tearing, so every flush
//! from the GUI waits for the next frame boundary before it touches the
//! panel. Two binary signals carry the handoff:
//!
//! * `gui_ready` is raised by the flush when it has pixels to hand over.
//! * `frame_consumed` is raised by the vsync event, but only when
//!   `gui_ready` was pending. A vsync with nobody waiting does nothing.
//!
//! [`VsyncHandshake::on_vsync`] never blocks and can be called from an
//! interrupt handler when the handshake uses `CriticalSectionRawMutex`.
//! Only one [`Flusher`] can exist at a time, and a [`FrameSlot`] mutably
//! borrows it, so at most one frame handoff is ever in flight.

use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::signal::Signal;
use log::trace;

/// Diagnostic counters of the handshake.
pub struct FrameStats {
    vsync_events: AtomicU32,
    frames_presented: AtomicU32,
}

impl FrameStats {
    const fn new() -> Self {
        Self {
            vsync_events: AtomicU32::new(0),
            frames_presented: AtomicU32::new(0),
        }
    }

    /// Number of vsync events observed, whether or not a flush was waiting.
    pub fn vsync_events(&self) -> u32 {
        self.vsync_events.load(Ordering::Relaxed)
    }

    /// Number of flushes that reached the panel and were acknowledged.
    pub fn frames_presented(&self) -> u32 {
        self.frames_presented.load(Ordering::Relaxed)
    }
}

/// Synchronizes the panel's frame boundary with the GUI flush.
pub struct VsyncHandshake<M: RawMutex> {
    gui_ready: Signal<M, ()>,
    frame_consumed: Signal<M, ()>,
    flusher_taken: AtomicBool,
    stats: FrameStats,
}

impl<M: RawMutex> VsyncHandshake<M> {
    /// Creates a handshake with both signals unset.
    pub const fn new() -> Self {
        Self {
            gui_ready: Signal::new(),
            frame_consumed: Signal::new(),
            flusher_taken: AtomicBool::new(false),
            stats: FrameStats::new(),
        }
    }

    /// Reports a frame boundary.
    ///
    /// If a flush is waiting, it is released and `true` is returned. A vsync
    /// with no pending flush is a no-op apart from the event counter.
    pub fn on_vsync(&self) -> bool {
        self.stats.vsync_events.fetch_add(1, Ordering::Relaxed);
        if self.gui_ready.try_take().is_some() {
            self.frame_consumed.signal(());
            true
        } else {
            false
        }
    }

    /// Takes the flush side of the handshake.
    ///
    /// Returns `None` while another [`Flusher`] is alive.
    pub fn flusher(&self) -> Option<Flusher<'_, M>> {
        if self.flusher_taken.swap(true, Ordering::AcqRel) {
            None
        } else {
            Some(Flusher { handshake: self })
        }
    }

    /// Whether a flush is currently waiting for the next vsync.
    pub fn is_flush_pending(&self) -> bool {
        self.gui_ready.signaled()
    }

    /// The handshake's counters.
    pub fn stats(&self) -> &FrameStats {
        &self.stats
    }
}

impl<M: RawMutex> Default for VsyncHandshake<M> {
    fn default() -> Self {
        Self::new()
    }
}

/// The unique flush side of a [`VsyncHandshake`].
pub struct Flusher<'a, M: RawMutex> {
    handshake: &'a VsyncHandshake<M>,
}

impl<'a, M: RawMutex> Flusher<'a, M> {
    /// Announces a rendered frame and waits, without timeout, for the next
    /// vsync.
    ///
    /// The returned slot is the window in which the panel may be written.
    /// If this future is dropped before the vsync, the request is withdrawn.
    pub async fn wait_for_vsync(&mut self) -> FrameSlot<'_> {
        let handshake = self.handshake;
        // A consumption left over by a cancelled wait belongs to an old frame.
        handshake.frame_consumed.reset();
        handshake.gui_ready.signal(());
        let mut request = PendingRequest {
            gui_ready: &handshake.gui_ready,
            released: false,
        };
        trace!("Flush pending, waiting for vsync");
        handshake.frame_consumed.wait().await;
        request.released = true;
        FrameSlot {
            stats: &handshake.stats,
        }
    }

    /// Waits for the next vsync, runs `draw` and acknowledges the frame.
    pub async fn flush<R>(&mut self, draw: impl FnOnce() -> R) -> R {
        let slot = self.wait_for_vsync().await;
        let result = draw();
        slot.present();
        result
    }
}

impl<M: RawMutex> Drop for Flusher<'_, M> {
    fn drop(&mut self) {
        self.handshake.flusher_taken.store(false, Ordering::Release);
    }
}

/// Withdraws `gui_ready` unless the vsync released the request.
struct PendingRequest<'a, M: RawMutex> {
    gui_ready: &'a Signal<M, ()>,
    released: bool,
}

impl<M: RawMutex> Drop for PendingRequest<'_, M> {
    fn drop(&mut self) {
        if !self.released {
            self.gui_ready.reset();
        }
    }
}

/// Permission to write one frame to the panel.
///
/// Ends with [`FrameSlot::present`] once the panel was written. Dropping it
/// instead releases the slot without counting a presented frame.
#[must_use]
pub struct FrameSlot<'a> {
    stats: &'a FrameStats,
}

impl FrameSlot<'_> {
    /// Acknowledges a frame that reached the panel; the GUI may reuse its
    /// buffer afterwards.
    pub fn present(self) {
        self.stats.frames_presented.fetch_add(1, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::future::Future;
    use core::pin::pin;
    use core::task::{Context, Poll, Waker};
    use embassy_sync::blocking_mutex::raw::NoopRawMutex;

    fn poll_once<F: Future>(fut: core::pin::Pin<&mut F>) -> Poll<F::Output> {
        let mut cx = Context::from_waker(Waker::noop());
        fut.poll(&mut cx)
    }

    #[test]
    fn vsync_without_pending_flush_is_a_no_op() {
        let handshake: VsyncHandshake<NoopRawMutex> = VsyncHandshake::new();
        assert!(!handshake.on_vsync());
        assert!(!handshake.on_vsync());
        assert!(!handshake.is_flush_pending());
        assert_eq!(handshake.stats().vsync_events(), 2);
        assert_eq!(handshake.stats().frames_presented(), 0);
    }

    #[test]
    fn flush_waits_for_the_next_vsync() {
        let handshake: VsyncHandshake<NoopRawMutex> = VsyncHandshake::new();
        let mut flusher = handshake.flusher().unwrap();
        let mut drawn = false;
        {
            let mut fut = pin!(flusher.flush(|| drawn = true));
            assert!(poll_once(fut.as_mut()).is_pending());
            assert!(poll_once(fut.as_mut()).is_pending());
            assert!(handshake.is_flush_pending());

            assert!(handshake.on_vsync());
            assert!(poll_once(fut.as_mut()).is_ready());
        }
        assert!(drawn);
        assert!(!handshake.is_flush_pending());
        assert_eq!(handshake.stats().frames_presented(), 1);
    }

    #[test]
    fn only_one_flusher_at_a_time() {
        let handshake: VsyncHandshake<NoopRawMutex> = VsyncHandshake::new();
        let flusher = handshake.flusher();
        assert!(flusher.is_some());
        assert!(handshake.flusher().is_none());
        drop(flusher);
        assert!(handshake.flusher().is_some());
    }

    #[test]
    fn cancelled_flush_does_not_leak_into_the_next_one() {
        let handshake: VsyncHandshake<NoopRawMutex> = VsyncHandshake::new();
        let mut flusher = handshake.flusher().unwrap();
        {
            let mut fut = pin!(flusher.wait_for_vsync());
            assert!(poll_once(fut.as_mut()).is_pending());
            assert!(handshake.is_flush_pending());
        }
        // The abandoned request was withdrawn.
        assert!(!handshake.is_flush_pending());
        assert!(!handshake.on_vsync());

        let mut fut = pin!(flusher.wait_for_vsync());
        assert!(poll_once(fut.as_mut()).is_pending());
        assert!(handshake.on_vsync());
        assert!(poll_once(fut.as_mut()).is_ready());
    }

    #[test]
    fn wait_dropped_after_its_vsync_does_not_release_the_next_one() {
        let handshake: VsyncHandshake<NoopRawMutex> = VsyncHandshake::new();
        let mut flusher = handshake.flusher().unwrap();
        {
            let mut fut = pin!(flusher.wait_for_vsync());
            assert!(poll_once(fut.as_mut()).is_pending());
            assert!(handshake.on_vsync());
        }
        assert!(!handshake.is_flush_pending());

        let mut fut = pin!(flusher.wait_for_vsync());
        assert!(poll_once(fut.as_mut()).is_pending());
        assert!(poll_once(fut.as_mut()).is_pending());
        assert!(handshake.on_vsync());
        assert!(poll_once(fut.as_mut()).is_ready());
    }

    #[test]
    fn only_presented_slots_are_counted() {
        let handshake: VsyncHandshake<NoopRawMutex> = VsyncHandshake::new();
        let mut flusher = handshake.flusher().unwrap();

        for present in [false, true] {
            let mut fut = pin!(flusher.wait_for_vsync());
            assert!(poll_once(fut.as_mut()).is_pending());
            handshake.on_vsync();
            match poll_once(fut.as_mut()) {
                Poll::Ready(slot) if present => slot.present(),
                Poll::Ready(slot) => drop(slot),
                Poll::Pending => panic!("flush was not released by vsync"),
            }
        }
        assert_eq!(handshake.stats().frames_presented(), 1);
        assert_eq!(handshake.stats().vsync_events(), 2);
    }
}
