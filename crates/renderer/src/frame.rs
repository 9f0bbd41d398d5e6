//! Frame slot and phase bookkeeping.

use keel_rhi::sync::MAX_FRAMES_IN_FLIGHT;

/// Lifecycle phase of the frame currently being produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FramePhase {
    /// No frame in progress.
    Idle,
    /// An image has been acquired and commands are being recorded.
    Recording,
    /// The command buffer has been submitted to the graphics queue.
    Submitted,
    /// The image has been queued for presentation.
    Presented,
}

/// Pure bookkeeping for the frame loop: which in-flight slot is active,
/// which swapchain image was acquired, and how far the current frame has
/// progressed. Holds no Vulkan handles, so transitions can be tested
/// without a device.
#[derive(Debug)]
pub struct FrameCursor {
    slot: usize,
    image_index: u32,
    phase: FramePhase,
}

impl FrameCursor {
    pub fn new() -> Self {
        Self {
            slot: 0,
            image_index: 0,
            phase: FramePhase::Idle,
        }
    }

    /// Index of the active in-flight slot, in `0..MAX_FRAMES_IN_FLIGHT`.
    pub fn slot(&self) -> usize {
        self.slot
    }

    /// Swapchain image index acquired for the current frame. Only
    /// meaningful while the phase is not [`FramePhase::Idle`].
    pub fn image_index(&self) -> u32 {
        self.image_index
    }

    pub fn phase(&self) -> FramePhase {
        self.phase
    }

    pub fn is_recording(&self) -> bool {
        self.phase == FramePhase::Recording
    }

    /// Starts a frame after an image was acquired.
    pub fn begin(&mut self, image_index: u32) {
        debug_assert_eq!(self.phase, FramePhase::Idle);
        self.image_index = image_index;
        self.phase = FramePhase::Recording;
    }

    pub fn mark_submitted(&mut self) {
        debug_assert_eq!(self.phase, FramePhase::Recording);
        self.phase = FramePhase::Submitted;
    }

    pub fn mark_presented(&mut self) {
        debug_assert_eq!(self.phase, FramePhase::Submitted);
        self.phase = FramePhase::Presented;
    }

    /// Completes the frame and advances to the next slot. Valid from
    /// `Submitted` (presentation skipped against a stale swapchain) as
    /// well as `Presented`.
    pub fn finish(&mut self) {
        debug_assert!(matches!(
            self.phase,
            FramePhase::Submitted | FramePhase::Presented
        ));
        self.phase = FramePhase::Idle;
        self.slot = (self.slot + 1) % MAX_FRAMES_IN_FLIGHT;
    }

    /// Abandons an in-progress frame without advancing the slot, used
    /// when acquisition fails and the swapchain must be rebuilt.
    pub fn abort(&mut self) {
        self.phase = FramePhase::Idle;
    }
}

impl Default for FrameCursor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_cycle_advances_slot() {
        let mut cursor = FrameCursor::new();
        assert_eq!(cursor.phase(), FramePhase::Idle);
        assert_eq!(cursor.slot(), 0);

        cursor.begin(2);
        assert!(cursor.is_recording());
        assert_eq!(cursor.image_index(), 2);

        cursor.mark_submitted();
        cursor.mark_presented();
        cursor.finish();

        assert_eq!(cursor.phase(), FramePhase::Idle);
        assert_eq!(cursor.slot(), 1);
    }

    #[test]
    fn skipped_present_still_advances() {
        let mut cursor = FrameCursor::new();
        cursor.begin(0);
        cursor.mark_submitted();
        cursor.finish();
        assert_eq!(cursor.slot(), 1);
        assert_eq!(cursor.phase(), FramePhase::Idle);
    }

    #[test]
    fn slot_wraps_around() {
        let mut cursor = FrameCursor::new();
        for _ in 0..MAX_FRAMES_IN_FLIGHT {
            cursor.begin(0);
            cursor.mark_submitted();
            cursor.mark_presented();
            cursor.finish();
        }
        assert_eq!(cursor.slot(), 0);
    }

    #[test]
    fn abort_keeps_slot() {
        let mut cursor = FrameCursor::new();
        cursor.begin(1);
        cursor.abort();
        assert_eq!(cursor.phase(), FramePhase::Idle);
        assert_eq!(cursor.slot(), 0);
    }

    #[test]
    fn begin_after_failed_recording_reuses_slot() {
        let mut cursor = FrameCursor::new();
        cursor.begin(1);
        cursor.abort();

        // The slot must accept a fresh frame after the aborted one.
        cursor.begin(0);
        assert!(cursor.is_recording());
        assert_eq!(cursor.slot(), 0);
        assert_eq!(cursor.image_index(), 0);
    }

    #[test]
    fn abort_after_submit_returns_idle() {
        let mut cursor = FrameCursor::new();
        cursor.begin(0);
        cursor.mark_submitted();
        cursor.abort();
        assert_eq!(cursor.phase(), FramePhase::Idle);
        assert_eq!(cursor.slot(), 0);
    }
}
