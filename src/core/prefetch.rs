//! Per-channel image prefetch queues.
//!
//! Slider drags arrive much faster than images can be decoded and shown, so
//! frame requests are queued and drained by a fixed-period tick instead of
//! being serviced inline. The queue is a bounded-staleness FIFO: requests are
//! served strictly in arrival order, but once more than `max_queued` entries
//! are pending the oldest one is dropped unprocessed. Rapid scrubbing can
//! therefore never build an unbounded backlog, while moderate scrubbing keeps
//! its visual continuity (this is not a keep-latest-only policy).

use std::collections::VecDeque;
use std::path::PathBuf;

use log::trace;

/// Default number of requests a queue retains before evicting the oldest.
pub const DEFAULT_MAX_QUEUED: usize = 2;

/// A single pending frame request.
///
/// `resolved_path` is `None` when the deployment has no image for this frame
/// on this channel; draining such a request clears the display rather than
/// loading a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrefetchRequest {
    pub frame_number: i64,
    pub resolved_path: Option<PathBuf>,
}

/// Consumer side of a drained request.
///
/// Implementations own the actual image display. Failures are expected to
/// fail closed (show the cleared state); the queue never retries a request.
pub trait DisplaySink {
    /// Load and display the image the request resolved to.
    fn show_frame(&mut self, request: &PrefetchRequest);

    /// Clear the channel's display.
    fn clear_display(&mut self);
}

/// Bounded FIFO of pending frame requests for one viewing channel.
///
/// Left and right channels each own an independent queue; draining one never
/// blocks or orders against the other.
#[derive(Debug, Clone)]
pub struct PrefetchQueue {
    pending: VecDeque<PrefetchRequest>,
    max_queued: usize,
}

impl Default for PrefetchQueue {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_QUEUED)
    }
}

impl PrefetchQueue {
    pub fn new(max_queued: usize) -> Self {
        Self {
            pending: VecDeque::new(),
            max_queued,
        }
    }

    /// Append a request, evicting the oldest pending entry first when the
    /// queue already holds more than `max_queued` entries.
    ///
    /// The bound is soft by one slot: eviction happens on the way in, so the
    /// length observed by the drain side never exceeds `max_queued + 1`.
    pub fn request(&mut self, frame_number: i64, resolved_path: Option<PathBuf>) {
        if self.pending.len() > self.max_queued {
            if let Some(stale) = self.pending.pop_front() {
                trace!("prefetch: dropping stale request for frame {}", stale.frame_number);
            }
        }
        self.pending.push_back(PrefetchRequest {
            frame_number,
            resolved_path,
        });
    }

    /// Pop the oldest pending request, if any.
    pub fn drain_one(&mut self) -> Option<PrefetchRequest> {
        self.pending.pop_front()
    }

    /// Pop the oldest pending request and hand it to `sink`.
    ///
    /// Returns true when a request was serviced. Draining an empty queue is a
    /// no-op. Delivery is at-most-once: the request is discarded regardless
    /// of what the sink does with it.
    pub fn drain_into(&mut self, sink: &mut dyn DisplaySink) -> bool {
        let Some(request) = self.drain_one() else {
            return false;
        };
        if request.resolved_path.is_some() {
            sink.show_frame(&request);
        } else {
            sink.clear_display();
        }
        true
    }

    /// Drop all pending requests (deployment closed or reloaded).
    pub fn clear(&mut self) {
        self.pending.clear();
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Sink that records what it was asked to do.
    #[derive(Default)]
    struct RecordingSink {
        shown: Vec<(i64, PathBuf)>,
        clears: usize,
    }

    impl DisplaySink for RecordingSink {
        fn show_frame(&mut self, request: &PrefetchRequest) {
            let path = request.resolved_path.clone().expect("show_frame without path");
            self.shown.push((request.frame_number, path));
        }

        fn clear_display(&mut self) {
            self.clears += 1;
        }
    }

    #[test]
    fn eviction_keeps_bounded_backlog() {
        let mut queue = PrefetchQueue::new(2);
        for frame in [1, 2, 3, 4] {
            queue.request(frame, Some(PathBuf::from(format!("/img/{frame}"))));
        }

        // One eviction occurred: frame 1 was dropped unprocessed.
        assert_eq!(queue.len(), 3);

        let drained: Vec<i64> = std::iter::from_fn(|| queue.drain_one())
            .map(|r| r.frame_number)
            .collect();
        assert_eq!(drained, vec![2, 3, 4]);
    }

    #[test]
    fn drain_empty_is_noop() {
        let mut queue = PrefetchQueue::default();
        assert!(queue.drain_one().is_none());

        let mut sink = RecordingSink::default();
        assert!(!queue.drain_into(&mut sink));
        assert!(sink.shown.is_empty());
        assert_eq!(sink.clears, 0);
    }

    #[test]
    fn missing_path_clears_display() {
        let mut queue = PrefetchQueue::new(2);
        queue.request(5, Some(PathBuf::from("/a")));
        queue.request(6, Some(PathBuf::from("/b")));
        queue.request(7, None);

        // Bound is 2, so pushing the third request evicted frame 5.
        assert_eq!(queue.len(), 3);
        let mut sink = RecordingSink::default();
        assert!(queue.drain_into(&mut sink));
        assert!(queue.drain_into(&mut sink));
        assert!(queue.drain_into(&mut sink));

        assert_eq!(sink.shown, vec![(5, PathBuf::from("/a")), (6, PathBuf::from("/b"))]);
        assert_eq!(sink.clears, 1);
    }

    #[test]
    fn eviction_soft_bound_by_one() {
        let mut queue = PrefetchQueue::new(2);
        queue.request(5, Some(PathBuf::from("/a")));
        queue.request(6, Some(PathBuf::from("/b")));
        queue.request(7, None);
        queue.request(8, None);

        // Length never exceeds max_queued + 1 after a push.
        assert_eq!(queue.len(), 3);
        assert_eq!(queue.drain_one().map(|r| r.frame_number), Some(6));
    }

    #[test]
    fn channels_are_independent() {
        let mut left = PrefetchQueue::default();
        let mut right = PrefetchQueue::default();
        left.request(1, None);

        assert!(right.drain_one().is_none());
        assert_eq!(left.drain_one().map(|r| r.frame_number), Some(1));
    }

    #[test]
    fn clear_drops_pending() {
        let mut queue = PrefetchQueue::default();
        queue.request(1, None);
        queue.request(2, None);
        queue.clear();
        assert!(queue.is_empty());
    }
}
