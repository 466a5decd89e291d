//! Worker threads for parallel walk sampling
//!
//! Each worker:
//! - Pulls entity names from the entity queue
//! - Runs the configured walk algorithm against the shared, read-only store
//! - Sends the resulting lines to the walk writer
//!
//! Entities are independent: no state is carried from one task to the next.
//! A panic while sampling one entity is caught, logged and counted, and the
//! worker moves on to the next entity.

use crate::config::WalkGenerationMode;
use crate::error::{SampleOutcome, WorkerError};
use crate::generation::queue::EntityReceiver;
use crate::output::WriterHandle;
use crate::store::TripleSource;
use crate::walks::{self, WalkOptions};
use rand::Rng;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::{debug, info, trace, warn};

/// What a generation cycle samples for each entity
#[derive(Debug, Clone)]
pub enum WalkJob {
    /// Graph walks with the given algorithm
    Graph {
        mode: WalkGenerationMode,
        options: WalkOptions,
    },

    /// Text walks over datatype facts
    Text { max_length: usize },
}

impl WalkJob {
    /// Sample the walks of one entity
    pub fn sample<S, R>(&self, source: &S, entity: &str, rng: &mut R) -> Vec<String>
    where
        S: TripleSource + ?Sized,
        R: Rng + ?Sized,
    {
        let (mode, options) = match self {
            WalkJob::Text { max_length } => return walks::text_walks(source, entity, *max_length),
            WalkJob::Graph { mode, options } => (mode, options),
        };

        let n = options.walks_per_entity;
        let depth = options.depth;

        match mode {
            WalkGenerationMode::MidWalks => walks::mid_walks(source, entity, n, depth, rng),
            WalkGenerationMode::MidWalksDuplicateFree => {
                walks::mid_walks_duplicate_free(source, entity, n, depth, rng)
            }
            WalkGenerationMode::MidWalksWeighted => {
                walks::weighted_mid_walks(source, entity, n, depth, rng)
            }
            WalkGenerationMode::RandomWalks => {
                walks::random_walks(source, entity, n, depth, options.unify_anonymous, rng)
            }
            WalkGenerationMode::RandomWalksDuplicateFree => walks::random_walks_duplicate_free(
                source,
                entity,
                n,
                depth,
                options.unify_anonymous,
                rng,
            ),
            WalkGenerationMode::MidTypeWalksDuplicateFree => walks::mid_type_walks_duplicate_free(
                source,
                entity,
                n,
                depth,
                &options.type_predicates,
                rng,
            ),
            WalkGenerationMode::MidEdgeWalksDuplicateFree => {
                walks::mid_edge_walks_duplicate_free(source, entity, n, depth, rng)
            }
            WalkGenerationMode::NodeWalksDuplicateFree => walks::node_walks_duplicate_free(
                source,
                entity,
                n,
                depth,
                options.unify_anonymous,
                rng,
            ),
        }
    }

    /// Short label for log messages
    pub fn label(&self) -> &'static str {
        match self {
            WalkJob::Graph { mode, .. } => mode.name(),
            WalkJob::Text { .. } => "text_walks",
        }
    }
}

/// Statistics collected by a worker
#[derive(Debug, Default)]
pub struct WorkerStats {
    /// Entities sampled successfully
    pub entities_sampled: AtomicU64,

    /// Walk lines produced
    pub walks_generated: AtomicU64,

    /// Entities that produced no walks
    pub skipped: AtomicU64,

    /// Entities whose sampling failed
    pub errors: AtomicU64,
}

impl WorkerStats {
    fn record_entity(&self, walks: u64) {
        self.entities_sampled.fetch_add(1, Ordering::Relaxed);
        self.walks_generated.fetch_add(walks, Ordering::Relaxed);
    }

    fn record_skip(&self) {
        self.skipped.fetch_add(1, Ordering::Relaxed);
    }

    fn record_error(&self) {
        self.errors.fetch_add(1, Ordering::Relaxed);
    }
}

/// A worker thread that samples walks for queued entities
pub struct Worker {
    /// Worker ID
    id: usize,

    /// Thread handle
    handle: Option<JoinHandle<Result<(), WorkerError>>>,

    /// Worker statistics
    stats: Arc<WorkerStats>,
}

impl Worker {
    /// Spawn a new worker thread
    pub fn spawn<S>(
        id: usize,
        source: Arc<S>,
        job: Arc<WalkJob>,
        queue_rx: EntityReceiver,
        writer: WriterHandle,
    ) -> Result<Self, WorkerError>
    where
        S: TripleSource + ?Sized + 'static,
    {
        let stats = Arc::new(WorkerStats::default());
        let stats_clone = Arc::clone(&stats);

        let handle = thread::Builder::new()
            .name(format!("walker-{}", id))
            .spawn(move || worker_loop(id, source, job, queue_rx, writer, stats_clone))
            .map_err(|e| WorkerError::SpawnFailed {
                id,
                reason: e.to_string(),
            })?;

        Ok(Self {
            id,
            handle: Some(handle),
            stats,
        })
    }

    /// Get worker ID
    pub fn id(&self) -> usize {
        self.id
    }

    /// Whether the worker thread has exited
    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().map_or(true, |h| h.is_finished())
    }

    /// Wait for the worker to finish
    pub fn join(mut self) -> Result<(), WorkerError> {
        if let Some(handle) = self.handle.take() {
            match handle.join() {
                Ok(result) => result,
                Err(payload) => Err(WorkerError::Panicked {
                    id: self.id,
                    message: panic_message(payload.as_ref()),
                }),
            }
        } else {
            Ok(())
        }
    }
}

/// Main worker loop
fn worker_loop<S>(
    id: usize,
    source: Arc<S>,
    job: Arc<WalkJob>,
    queue_rx: EntityReceiver,
    writer: WriterHandle,
    stats: Arc<WorkerStats>,
) -> Result<(), WorkerError>
where
    S: TripleSource + ?Sized,
{
    debug!(worker = id, job = job.label(), "Worker starting");

    let mut rng = rand::rng();

    while let Some(entity) = queue_rx.recv() {
        let (outcome, lines) = sample_entity(source.as_ref(), &job, entity, &mut rng);

        match &outcome {
            SampleOutcome::Success { entity, walks } => {
                trace!(worker = id, entity = %entity, walks = walks, "Entity sampled");
                stats.record_entity(*walks as u64);
            }
            SampleOutcome::Skipped { entity, reason } => {
                trace!(worker = id, entity = %entity, reason = %reason, "Entity skipped");
                stats.record_skip();
            }
            SampleOutcome::Failed { entity, error } => {
                warn!(worker = id, entity = %entity, error = %error, "Entity failed");
                stats.record_error();
            }
        }

        // Empty batches are still sent so the writer counts the entity
        if writer.send_walks(lines).is_err() {
            warn!(worker = id, entity = %outcome.entity(), "Walk writer closed, stopping worker");
            return Err(WorkerError::QueueSendFailed);
        }
    }

    info!(
        worker = id,
        entities = stats.entities_sampled.load(Ordering::Relaxed),
        walks = stats.walks_generated.load(Ordering::Relaxed),
        "Worker finished"
    );

    Ok(())
}

/// Sample one entity, turning a panic into a failed outcome
fn sample_entity<S, R>(
    source: &S,
    job: &WalkJob,
    entity: String,
    rng: &mut R,
) -> (SampleOutcome, Vec<String>)
where
    S: TripleSource + ?Sized,
    R: Rng + ?Sized,
{
    let result = panic::catch_unwind(AssertUnwindSafe(|| job.sample(source, &entity, rng)));

    match result {
        Ok(lines) if lines.is_empty() => (
            SampleOutcome::Skipped {
                entity,
                reason: "no walks".to_string(),
            },
            lines,
        ),
        Ok(lines) => (
            SampleOutcome::Success {
                entity,
                walks: lines.len(),
            },
            lines,
        ),
        Err(payload) => (
            SampleOutcome::Failed {
                entity,
                error: panic_message(payload.as_ref()),
            },
            Vec::new(),
        ),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Aggregate statistics from multiple workers
///
/// Returns `(entities, walks, skipped, errors)`.
pub fn aggregate_stats(workers: &[Worker]) -> (u64, u64, u64, u64) {
    let mut entities = 0u64;
    let mut walks = 0u64;
    let mut skipped = 0u64;
    let mut errors = 0u64;

    for worker in workers {
        entities += worker.stats.entities_sampled.load(Ordering::Relaxed);
        walks += worker.stats.walks_generated.load(Ordering::Relaxed);
        skipped += worker.stats.skipped.load(Ordering::Relaxed);
        errors += worker.stats.errors.load(Ordering::Relaxed);
    }

    (entities, walks, skipped, errors)
}
