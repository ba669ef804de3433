#![forbid(unsafe_code)]

//! Animation-frame coalescing for layout measurements.
//!
//! Resize and font events can arrive many times per frame. Measuring on each
//! one forces a layout per event, so measurements are deferred to the next
//! animation frame instead:
//!
//! - scheduling a kind that is already pending does nothing;
//! - the host is asked for a frame only when none is outstanding;
//! - when the frame fires, every pending kind runs exactly once.
//!
//! # Usage
//!
//! ```
//! use vitrine_core::frame::{FrameCoalescer, FrameKinds};
//!
//! let mut frames = FrameCoalescer::new();
//! assert!(frames.schedule(FrameKinds::TIMELINE_WIDTH)); // ask host for a frame
//! assert!(!frames.schedule(FrameKinds::TIMELINE_WIDTH)); // coalesced
//! assert!(!frames.schedule(FrameKinds::HEADLINE_FIT)); // rides the same frame
//!
//! let due = frames.take_due();
//! assert_eq!(due, FrameKinds::TIMELINE_WIDTH | FrameKinds::HEADLINE_FIT);
//! assert!(!frames.has_pending());
//! ```

use bitflags::bitflags;

bitflags! {
    /// Measurement kinds that can wait for the next animation frame.
    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct FrameKinds: u8 {
        const HEADLINE_FIT   = 0b001;
        const SUBHEAD_FIT    = 0b010;
        const TIMELINE_WIDTH = 0b100;
    }
}

/// Trailing, per-kind deduplication of animation-frame work.
///
/// Not thread-safe; lives on the UI thread next to the DOM it measures.
#[derive(Debug, Clone, Default)]
pub struct FrameCoalescer {
    pending: FrameKinds,
    frame_requested: bool,
    frames_run: u64,
}

impl FrameCoalescer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `kinds` as due on the next frame.
    ///
    /// Returns `true` when the caller must request an animation frame from
    /// the host; `false` when one is already outstanding.
    pub fn schedule(&mut self, kinds: FrameKinds) -> bool {
        self.pending |= kinds;
        if self.frame_requested || self.pending.is_empty() {
            return false;
        }
        self.frame_requested = true;
        true
    }

    /// Called from the animation-frame callback. Returns the kinds to run and
    /// resets the coalescer so the next trigger requests a fresh frame.
    #[must_use]
    pub fn take_due(&mut self) -> FrameKinds {
        self.frame_requested = false;
        self.frames_run = self.frames_run.saturating_add(1);
        std::mem::take(&mut self.pending)
    }

    /// Whether any kind is waiting for a frame.
    #[must_use]
    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Whether a frame request is outstanding with the host.
    #[must_use]
    pub fn frame_requested(&self) -> bool {
        self.frame_requested
    }

    /// Number of frames drained so far.
    #[must_use]
    pub fn frames_run(&self) -> u64 {
        self.frames_run
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_schedule_requests_frame() {
        let mut frames = FrameCoalescer::new();
        assert!(frames.schedule(FrameKinds::SUBHEAD_FIT));
        assert!(frames.frame_requested());
        assert!(frames.has_pending());
    }

    #[test]
    fn burst_of_schedules_requests_one_frame() {
        let mut frames = FrameCoalescer::new();
        let requests = (0..50)
            .filter(|_| frames.schedule(FrameKinds::TIMELINE_WIDTH))
            .count();
        assert_eq!(requests, 1);
        assert_eq!(frames.take_due(), FrameKinds::TIMELINE_WIDTH);
    }

    #[test]
    fn new_frame_requested_after_drain() {
        let mut frames = FrameCoalescer::new();
        assert!(frames.schedule(FrameKinds::TIMELINE_WIDTH));
        let _ = frames.take_due();
        assert!(frames.schedule(FrameKinds::TIMELINE_WIDTH));
        assert_eq!(frames.frames_run(), 1);
    }

    #[test]
    fn empty_schedule_is_noop() {
        let mut frames = FrameCoalescer::new();
        assert!(!frames.schedule(FrameKinds::empty()));
        assert!(!frames.frame_requested());
    }

    #[test]
    fn spurious_frame_yields_nothing() {
        let mut frames = FrameCoalescer::new();
        assert!(frames.take_due().is_empty());
    }
}
