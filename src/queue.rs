//! Work distribution and result collection between the scanner thread and
//! its worker pool.
//!
//! `WorkQueue` mirrors a plain, non-blocking MPMC queue: workers pop
//! invocations and simply stop when it is empty, there is no
//! backpressure. `ResultQueue` mirrors `indexingresultqueue.h`'s
//! mutex+condvar queue, but is implemented with `crossbeam_channel`
//! (already part of the ambient stack) instead of hand-rolling the
//! wait/notify dance.

use std::collections::VecDeque;
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};
use parking_lot::Mutex;

use crate::tu_index::TranslationUnitIndex;

/// A single compile command a worker thread should index.
#[derive(Debug, Clone)]
pub struct ToolInvocation {
    pub source_file: String,
    pub arguments: Vec<String>,
    pub directory: String,
}

/// Non-blocking MPMC queue of pending [`ToolInvocation`]s.
#[derive(Debug, Default)]
pub struct WorkQueue {
    items: Mutex<VecDeque<ToolInvocation>>,
}

impl WorkQueue {
    pub fn new(items: impl IntoIterator<Item = ToolInvocation>) -> Self {
        WorkQueue {
            items: Mutex::new(items.into_iter().collect()),
        }
    }

    /// Pop the next invocation, or `None` if the queue is currently empty.
    /// Never blocks.
    pub fn next(&self) -> Option<ToolInvocation> {
        self.items.lock().pop_front()
    }

    pub fn len(&self) -> usize {
        self.items.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Blocking MPSC queue of finished [`TranslationUnitIndex`]es, written by
/// worker threads and drained by the scanner thread.
pub struct ResultQueue {
    sender: Sender<TranslationUnitIndex>,
    receiver: Receiver<TranslationUnitIndex>,
}

impl ResultQueue {
    pub fn new() -> Self {
        let (sender, receiver) = crossbeam_channel::unbounded();
        ResultQueue { sender, receiver }
    }

    pub fn writer(&self) -> Sender<TranslationUnitIndex> {
        self.sender.clone()
    }

    /// Blocking read; mirrors `IndexingResultQueue::read()`.
    pub fn read(&self) -> Option<TranslationUnitIndex> {
        self.receiver.recv().ok()
    }

    /// Bounded-wait read; mirrors `IndexingResultQueue::tryRead(timeout)`.
    pub fn try_read(&self, timeout: Duration) -> Option<TranslationUnitIndex> {
        match self.receiver.recv_timeout(timeout) {
            Ok(tu) => Some(tu),
            Err(RecvTimeoutError::Timeout) => None,
            Err(RecvTimeoutError::Disconnected) => None,
        }
    }
}

impl Default for ResultQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn work_queue_drains_in_order() {
        let queue = WorkQueue::new(vec![
            ToolInvocation {
                source_file: "a.cpp".into(),
                arguments: vec![],
                directory: ".".into(),
            },
            ToolInvocation {
                source_file: "b.cpp".into(),
                arguments: vec![],
                directory: ".".into(),
            },
        ]);
        assert_eq!(queue.next().unwrap().source_file, "a.cpp");
        assert_eq!(queue.next().unwrap().source_file, "b.cpp");
        assert!(queue.next().is_none());
    }

    #[test]
    fn result_queue_try_read_times_out_when_empty() {
        let queue = ResultQueue::new();
        let result = queue.try_read(Duration::from_millis(10));
        assert!(result.is_none());
    }

    #[test]
    fn result_queue_roundtrips_a_value() {
        let queue = ResultQueue::new();
        let writer = queue.writer();
        writer
            .send(TranslationUnitIndex::new(crate::types::FileID::new(1)))
            .unwrap();
        let got = queue.read().expect("value was sent");
        assert_eq!(got.main_file_id.value(), 1);
    }
}
