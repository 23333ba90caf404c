use std::sync::{Arc, Mutex};

use laser_calib_core::RgbFrame;

/// Anything that can hand out the current camera image on demand.
pub trait FrameSource {
    /// Most recent frame, or `None` when no frame is available yet.
    fn frame(&self) -> Option<RgbFrame>;

    /// Frame dimensions `(width, height)`, or `None` when unknown.
    fn frame_size(&self) -> Option<(u32, u32)>;
}

/// Single-slot latest-frame buffer.
///
/// A background capture thread publishes through a [`FramePublisher`]; the
/// consumer always reads the newest frame and stale frames are dropped. This
/// is deliberately not a queue: only the most recent frame matters, and a
/// slow consumer must never fall behind.
#[derive(Clone, Default)]
pub struct FrameSlot {
    slot: Arc<Mutex<Option<RgbFrame>>>,
}

impl FrameSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Producer handle for the capture side.
    pub fn publisher(&self) -> FramePublisher {
        FramePublisher {
            slot: Arc::clone(&self.slot),
        }
    }
}

impl FrameSource for FrameSlot {
    fn frame(&self) -> Option<RgbFrame> {
        self.slot.lock().expect("frame slot poisoned").clone()
    }

    fn frame_size(&self) -> Option<(u32, u32)> {
        self.slot
            .lock()
            .expect("frame slot poisoned")
            .as_ref()
            .map(|f| (f.width as u32, f.height as u32))
    }
}

/// Producer side of a [`FrameSlot`].
#[derive(Clone)]
pub struct FramePublisher {
    slot: Arc<Mutex<Option<RgbFrame>>>,
}

impl FramePublisher {
    /// Overwrite the slot with a newer frame.
    pub fn publish(&self, frame: RgbFrame) {
        *self.slot.lock().expect("frame slot poisoned") = Some(frame);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_slot_has_no_frame() {
        let slot = FrameSlot::new();
        assert!(slot.frame().is_none());
        assert!(slot.frame_size().is_none());
    }

    #[test]
    fn newest_frame_wins() {
        let slot = FrameSlot::new();
        let tx = slot.publisher();

        tx.publish(RgbFrame::black(2, 2));
        let mut second = RgbFrame::black(2, 2);
        second.set_pixel(0, 0, [9, 9, 9]);
        tx.publish(second.clone());

        assert_eq!(slot.frame(), Some(second));
        assert_eq!(slot.frame_size(), Some((2, 2)));
    }

    #[test]
    fn publisher_works_across_threads() {
        let slot = FrameSlot::new();
        let tx = slot.publisher();
        let handle = std::thread::spawn(move || {
            for _ in 0..10 {
                tx.publish(RgbFrame::black(4, 4));
            }
        });
        handle.join().expect("producer thread");
        assert_eq!(slot.frame_size(), Some((4, 4)));
    }
}
