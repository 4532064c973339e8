//! Non-blocking error reporting for the render path.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use crossbeam_channel::{Receiver, Sender, TrySendError, bounded};

use crate::category::Category;

/// Where in the frame loop a failure happened.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameContext {
    pub frame: u64,
    pub category: Category,
}

impl fmt::Display for FrameContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "frame {} / {}", self.frame, self.category)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ErrorReport {
    pub context: FrameContext,
    pub message: String,
}

/// Fire-and-forget error queue.
///
/// The render path only ever calls [`report`](Self::report), which never
/// blocks: when the queue is full the report is counted and dropped. The
/// consumer side drains it with [`drain`](Self::drain) or a receiver
/// obtained from [`subscribe`](Self::subscribe), possibly on another thread.
pub struct ErrorSink {
    sender: Sender<ErrorReport>,
    receiver: Receiver<ErrorReport>,
    dropped: AtomicU64,
}

impl ErrorSink {
    /// A capacity of zero is raised to one so reports are never rendezvous.
    pub fn new(capacity: usize) -> Self {
        let (sender, receiver) = bounded(capacity.max(1));
        Self {
            sender,
            receiver,
            dropped: AtomicU64::new(0),
        }
    }

    pub fn report(&self, error: &dyn fmt::Display, context: FrameContext) {
        let report = ErrorReport {
            context,
            message: error.to_string(),
        };
        match self.sender.try_send(report) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) | Err(TrySendError::Disconnected(_)) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    /// Take every queued report, logging each one.
    pub fn drain(&self) -> Vec<ErrorReport> {
        let mut reports = Vec::new();
        while let Ok(report) = self.receiver.try_recv() {
            tracing::warn!(
                frame = report.context.frame,
                category = %report.context.category,
                "render failure: {}",
                report.message
            );
            reports.push(report);
        }
        reports
    }

    /// Another handle on the queue for an off-thread consumer.
    pub fn subscribe(&self) -> Receiver<ErrorReport> {
        self.receiver.clone()
    }

    pub fn pending(&self) -> usize {
        self.receiver.len()
    }

    /// Reports discarded because the queue was full.
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

impl Default for ErrorSink {
    fn default() -> Self {
        Self::new(64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(frame: u64) -> FrameContext {
        FrameContext {
            frame,
            category: Category::Cities,
        }
    }

    #[test]
    fn test_report_then_drain() {
        let sink = ErrorSink::new(4);
        sink.report(&"boom", ctx(7));
        assert_eq!(sink.pending(), 1);
        let reports = sink.drain();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].message, "boom");
        assert_eq!(reports[0].context.frame, 7);
        assert!(sink.drain().is_empty());
    }

    #[test]
    fn test_full_queue_drops_without_blocking() {
        let sink = ErrorSink::new(2);
        for i in 0..5 {
            sink.report(&"x", ctx(i));
        }
        assert_eq!(sink.pending(), 2);
        assert_eq!(sink.dropped(), 3);
        let frames: Vec<u64> = sink.drain().iter().map(|r| r.context.frame).collect();
        assert_eq!(frames, vec![0, 1]);
    }

    #[test]
    fn test_zero_capacity_still_queues() {
        let sink = ErrorSink::new(0);
        sink.report(&"x", ctx(0));
        assert_eq!(sink.pending(), 1);
    }

    #[test]
    fn test_subscriber_on_other_thread() {
        let sink = ErrorSink::new(8);
        let rx = sink.subscribe();
        sink.report(&"late", ctx(3));
        let handle = std::thread::spawn(move || rx.recv().map(|r| r.message));
        assert_eq!(handle.join().unwrap().unwrap(), "late");
    }
}
