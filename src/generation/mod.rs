//! Parallel walk generation
//!
//! A fixed pool of worker threads takes one entity at a time from a queue
//! sized to the entity set, samples its walks against the shared triple
//! source and sends the lines to the walk writer thread. The manager blocks
//! once per cycle, until the pool has drained.

pub mod manager;
pub mod queue;
pub mod worker;

pub use manager::{GenerationProgress, GenerationReport, ManagerState, WalkGenerationManager};
pub use queue::{EntityQueue, EntityReceiver, QueueStats};
pub use worker::{aggregate_stats, WalkJob, Worker, WorkerStats};
