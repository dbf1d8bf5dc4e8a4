//! Time-ordered message inbox

use shared_types::{Message, SimTime};
use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// Messages waiting for the clock to reach their delivery time.
///
/// Ordered by `(deliver_at, arrival sequence)`, so equal delivery times
/// come out in the order they were buffered.
#[derive(Debug, Default)]
pub struct Inbox {
    heap: BinaryHeap<Queued>,
    next_seq: u64,
}

#[derive(Debug)]
struct Queued {
    seq: u64,
    message: Message,
}

// Min-heap on (deliver_at, seq).
impl Ord for Queued {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .message
            .deliver_at
            .total_cmp(&self.message.deliver_at)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for Queued {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Queued {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Queued {}

impl Inbox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: Message) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(Queued { seq, message });
    }

    /// Pop the earliest message due at or before `cutoff`.
    pub fn pop_due(&mut self, cutoff: SimTime) -> Option<Message> {
        if self.heap.peek()?.message.deliver_at > cutoff {
            return None;
        }
        self.heap.pop().map(|queued| queued.message)
    }

    pub fn next_delivery(&self) -> Option<SimTime> {
        self.heap.peek().map(|queued| queued.message.deliver_at)
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}
