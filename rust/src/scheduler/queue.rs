//! Work queue of products that are ready to be attempted (again).

use std::collections::VecDeque;

use crate::interner::ProductId;
use crate::resolver::Deferral;

/// A product waiting in the queue.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct QueueEntry {
    pub product: ProductId,
    /// Queue length when this entry was re-queued; `None` for a first attempt.
    pub queue_size_on_insert: Option<usize>,
}

impl QueueEntry {
    pub fn first_attempt(product: ProductId) -> Self {
        Self {
            product,
            queue_size_on_insert: None,
        }
    }

    /// Deferral is allowed on a first attempt, or if the queue has shrunk since this
    /// entry was queued, i.e. some other product finished in the meantime.
    pub fn deferral(&self, current_queue_len: usize) -> Deferral {
        match self.queue_size_on_insert {
            None => Deferral::Allowed,
            Some(size) if size > current_queue_len => Deferral::Allowed,
            Some(_) => Deferral::NotAllowed,
        }
    }
}

/// FIFO of [`QueueEntry`]s.
#[derive(Debug, Default)]
pub struct WorkQueue {
    entries: VecDeque<QueueEntry>,
}

impl WorkQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_first_attempt(&mut self, product: ProductId) {
        self.entries.push_back(QueueEntry::first_attempt(product));
    }

    /// Put `product` back at the end, remembering the queue length before the push.
    pub fn requeue(&mut self, product: ProductId) {
        let queue_size_on_insert = Some(self.entries.len());
        self.entries.push_back(QueueEntry {
            product,
            queue_size_on_insert,
        });
    }

    pub fn pop(&mut self) -> Option<QueueEntry> {
        self.entries.pop_front()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &QueueEntry> {
        self.entries.iter()
    }
}
