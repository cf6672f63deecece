//! Keeps the fixed header pane scrolled with the timeline body.
//!
//! Scroll events can fire many times per frame. `ScrollSync` keeps only the
//! latest body offset and writes it to the header once, from the frame
//! callback. The header's own scroll event for that write is swallowed so
//! the two listeners cannot drive each other.

/// A horizontally scrollable pane the synchronizer can write to.
pub trait ScrollPane {
    fn scroll_x(&self) -> f64;
    fn set_scroll_x(&mut self, x: f64);
}

#[derive(Debug, Default)]
pub struct ScrollSync {
    pending: Option<f64>,
    /// A frame callback has been requested and not yet run.
    frame_requested: bool,
    /// Offset last written to the follower; its echo event is ignored once.
    last_applied: Option<f64>,
    frames_applied: u64,
}

impl ScrollSync {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a body scroll. Returns `true` when the caller must schedule a
    /// frame callback; later events in the same frame only replace the
    /// pending offset.
    pub fn on_driver_scroll(&mut self, offset_px: f64) -> bool {
        self.pending = Some(offset_px);
        if self.frame_requested {
            tracing::trace!(offset_px, "coalesced scroll event");
            return false;
        }
        self.frame_requested = true;
        true
    }

    /// Scroll event from the follower. Returns `false` when it was caused by
    /// our own write and must not be propagated back to the body.
    pub fn on_follower_scroll(&mut self, offset_px: f64) -> bool {
        if self.last_applied.take() == Some(offset_px) {
            tracing::trace!(offset_px, "ignored follower echo");
            return false;
        }
        true
    }

    /// Frame callback: write the latest offset to `follower` (if it is
    /// rendered) and clear the in-flight flag. Returns the offset that was
    /// current for this frame.
    pub fn on_frame(&mut self, follower: Option<&mut dyn ScrollPane>) -> Option<f64> {
        self.frame_requested = false;
        let offset = self.pending.take()?;
        if let Some(pane) = follower
            && pane.scroll_x() != offset
        {
            pane.set_scroll_x(offset);
            self.last_applied = Some(offset);
        }
        self.frames_applied += 1;
        Some(offset)
    }

    /// The caller moved the follower again after `on_frame`, e.g. to keep
    /// content in place when days were prepended. Expect the echo of
    /// `offset_px` instead of the offset written by the frame.
    pub fn rebase(&mut self, offset_px: f64) {
        self.last_applied = Some(offset_px);
    }

    pub fn frame_requested(&self) -> bool {
        self.frame_requested
    }

    pub fn frames_applied(&self) -> u64 {
        self.frames_applied
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Header {
        x: f64,
        writes: usize,
    }

    impl ScrollPane for Header {
        fn scroll_x(&self) -> f64 {
            self.x
        }

        fn set_scroll_x(&mut self, x: f64) {
            self.x = x;
            self.writes += 1;
        }
    }

    #[test]
    fn many_events_one_write_per_frame() {
        let mut sync = ScrollSync::new();
        let mut header = Header::default();

        assert!(sync.on_driver_scroll(10.0));
        assert!(!sync.on_driver_scroll(25.0));
        assert!(!sync.on_driver_scroll(40.0));

        assert_eq!(sync.on_frame(Some(&mut header)), Some(40.0));
        assert_eq!(header.x, 40.0);
        assert_eq!(header.writes, 1);
        assert!(!sync.frame_requested());

        // Next frame needs a new callback.
        assert!(sync.on_driver_scroll(50.0));
        assert_eq!(sync.on_frame(Some(&mut header)), Some(50.0));
        assert_eq!(header.writes, 2);
        assert_eq!(sync.frames_applied(), 2);
    }

    #[test]
    fn rebased_write_swallows_the_new_echo() {
        let mut sync = ScrollSync::new();
        let mut header = Header::default();
        sync.on_driver_scroll(50.0);
        assert_eq!(sync.on_frame(Some(&mut header)), Some(50.0));

        header.set_scroll_x(722.0);
        sync.rebase(722.0);
        assert!(!sync.on_follower_scroll(722.0));
        assert!(sync.on_follower_scroll(50.0));
    }

    #[test]
    fn missing_follower_is_a_no_op() {
        let mut sync = ScrollSync::new();
        sync.on_driver_scroll(30.0);
        assert_eq!(sync.on_frame(None), Some(30.0));
    }

    #[test]
    fn frame_without_events_does_nothing() {
        let mut sync = ScrollSync::new();
        let mut header = Header::default();
        assert_eq!(sync.on_frame(Some(&mut header)), None);
        assert_eq!(header.writes, 0);
    }

    #[test]
    fn follower_echo_is_not_propagated() {
        let mut sync = ScrollSync::new();
        let mut header = Header::default();
        sync.on_driver_scroll(40.0);
        sync.on_frame(Some(&mut header));

        // The header reports the offset we just wrote: swallow it once.
        assert!(!sync.on_follower_scroll(40.0));
        // A later user scroll on the header is real.
        assert!(sync.on_follower_scroll(40.0));
        assert!(sync.on_follower_scroll(55.0));
    }

    #[test]
    fn unchanged_offset_skips_the_write() {
        let mut sync = ScrollSync::new();
        let mut header = Header {
            x: 15.0,
            writes: 0,
        };
        sync.on_driver_scroll(15.0);
        sync.on_frame(Some(&mut header));
        assert_eq!(header.writes, 0);
    }
}
