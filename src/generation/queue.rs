//! Entity task queue
//!
//! One task per entity. The queue is sized to the number of entities so a
//! submission never blocks and is never rejected; workers stop once the
//! manager has closed the sending side and the queue is drained.

use crate::error::WorkerError;
use crossbeam_channel::{bounded, Receiver, Sender};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Statistics for the entity queue
#[derive(Debug, Default)]
pub struct QueueStats {
    /// Entities submitted
    pub enqueued: AtomicU64,

    /// Entities taken by a worker
    pub dequeued: AtomicU64,
}

impl QueueStats {
    /// Entities handed to workers so far
    pub fn throughput(&self) -> u64 {
        self.dequeued.load(Ordering::Relaxed)
    }

    /// Entities submitted but not yet taken
    pub fn pending(&self) -> u64 {
        self.enqueued
            .load(Ordering::Relaxed)
            .saturating_sub(self.dequeued.load(Ordering::Relaxed))
    }
}

/// Bounded queue of entity names
pub struct EntityQueue {
    sender: Option<Sender<String>>,
    receiver: Receiver<String>,
    capacity: usize,
    stats: Arc<QueueStats>,
}

impl EntityQueue {
    /// Create a queue able to hold `capacity` entities without blocking
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (sender, receiver) = bounded(capacity);

        Self {
            sender: Some(sender),
            receiver,
            capacity,
            stats: Arc::new(QueueStats::default()),
        }
    }

    /// Submit one entity task
    pub fn submit(&self, entity: String) -> Result<(), WorkerError> {
        let sender = self.sender.as_ref().ok_or(WorkerError::QueueSendFailed)?;
        sender
            .send(entity)
            .map_err(|_| WorkerError::QueueSendFailed)?;
        self.stats.enqueued.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    /// Stop accepting tasks; workers exit once the remaining tasks are taken
    pub fn close(&mut self) {
        self.sender = None;
    }

    /// Get a receiver for a worker
    pub fn receiver(&self) -> EntityReceiver {
        EntityReceiver {
            receiver: self.receiver.clone(),
            stats: Arc::clone(&self.stats),
        }
    }

    /// Queue capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Current number of queued entities
    pub fn len(&self) -> usize {
        self.receiver.len()
    }

    /// Check if the queue is empty
    pub fn is_empty(&self) -> bool {
        self.receiver.is_empty()
    }

    /// Get queue statistics
    pub fn stats(&self) -> Arc<QueueStats> {
        Arc::clone(&self.stats)
    }
}

/// Worker side of the entity queue
#[derive(Clone)]
pub struct EntityReceiver {
    receiver: Receiver<String>,
    stats: Arc<QueueStats>,
}

impl EntityReceiver {
    /// Block until an entity is available; `None` once the queue is closed and empty
    pub fn recv(&self) -> Option<String> {
        let entity = self.receiver.recv().ok()?;
        self.stats.dequeued.fetch_add(1, Ordering::Relaxed);
        Some(entity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_submit_and_drain() {
        let mut queue = EntityQueue::new(3);
        let rx = queue.receiver();

        for entity in ["A", "B", "C"] {
            queue.submit(entity.to_string()).unwrap();
        }
        assert_eq!(queue.len(), 3);
        assert_eq!(queue.stats().pending(), 3);

        queue.close();

        let mut drained = Vec::new();
        while let Some(entity) = rx.recv() {
            drained.push(entity);
        }
        assert_eq!(drained, vec!["A", "B", "C"]);
        assert_eq!(queue.stats().throughput(), 3);
        assert_eq!(queue.stats().pending(), 0);
    }

    #[test]
    fn test_submit_after_close_fails() {
        let mut queue = EntityQueue::new(1);
        queue.close();
        assert!(matches!(
            queue.submit("A".to_string()),
            Err(WorkerError::QueueSendFailed)
        ));
    }

    #[test]
    fn test_zero_capacity_is_raised_to_one() {
        let queue = EntityQueue::new(0);
        assert_eq!(queue.capacity(), 1);
        assert!(queue.is_empty());
    }
}
