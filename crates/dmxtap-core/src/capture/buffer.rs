use std::time::Instant;

use parking_lot::Mutex;

use crate::protocols::artnet::layout::DMX_MAX_SLOTS;

/// One decoded snapshot of a universe's channel values at a point in time.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    /// 15-bit Art-Net Port-Address, treated as a flat universe identifier.
    pub universe: u16,
    /// ArtDMX sequence number; `None` when the sender does not use one.
    pub sequence: Option<u8>,
    /// Always exactly 512 channels, zero-padded beyond the wire data length.
    pub channels: [u8; DMX_MAX_SLOTS],
    /// Monotonic arrival timestamp, recorded when the receive loop accepted
    /// the packet. Orders frames and anchors observed-frame-rate metrics.
    pub received_at: Instant,
}

/// Append-only store of captured frames, shared between the receive thread
/// (sole writer) and arbitrary reader threads.
///
/// Frames are kept in strict arrival order; duplicates or reordering
/// introduced by the network pass through unmodified.
#[derive(Debug, Default)]
pub struct FrameBuffer {
    frames: Mutex<Vec<Frame>>,
}

impl FrameBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one frame. The lock is held only for the push.
    pub fn append(&self, frame: Frame) {
        self.frames.lock().push(frame);
    }

    /// Copy of the current contents; callers iterate freely without racing
    /// the writer thread.
    pub fn snapshot(&self) -> Vec<Frame> {
        self.frames.lock().clone()
    }

    /// Drop all stored frames. Capacity is retained so that test suites
    /// reusing one process do not reallocate per capture window.
    pub fn clear(&self) {
        self.frames.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.frames.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use std::time::Instant;

    use super::{DMX_MAX_SLOTS, Frame, FrameBuffer};

    fn frame(universe: u16, first_channel: u8) -> Frame {
        let mut channels = [0u8; DMX_MAX_SLOTS];
        channels[0] = first_channel;
        Frame {
            universe,
            sequence: None,
            channels,
            received_at: Instant::now(),
        }
    }

    #[test]
    fn append_preserves_arrival_order() {
        let buffer = FrameBuffer::new();
        buffer.append(frame(1, 10));
        buffer.append(frame(1, 20));
        buffer.append(frame(2, 30));

        let frames = buffer.snapshot();
        assert_eq!(frames.len(), 3);
        assert_eq!(frames[0].channels[0], 10);
        assert_eq!(frames[1].channels[0], 20);
        assert_eq!(frames[2].universe, 2);
    }

    #[test]
    fn snapshot_is_a_copy() {
        let buffer = FrameBuffer::new();
        buffer.append(frame(0, 1));

        let before = buffer.snapshot();
        buffer.append(frame(0, 2));

        assert_eq!(before.len(), 1);
        assert_eq!(buffer.snapshot().len(), 2);
    }

    #[test]
    fn clear_then_snapshot_is_empty() {
        let buffer = FrameBuffer::new();
        buffer.append(frame(0, 1));
        buffer.append(frame(0, 2));

        buffer.clear();
        assert!(buffer.is_empty());
        assert!(buffer.snapshot().is_empty());

        buffer.append(frame(0, 3));
        assert_eq!(buffer.len(), 1);
    }
}
