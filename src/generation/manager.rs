//! Generation manager - orchestrates one walk generation run
//!
//! The manager is responsible for:
//! - Refusing to start on an empty triple source
//! - Asking the entity selector for the entities to cover
//! - Opening the walk writer
//! - Running one worker cycle for graph walks and, optionally, one for text walks
//! - Closing the writer and reporting final statistics
//!
//! ```text
//! Uninitialized -> SelectingEntities -> Running -> Draining -> Closed
//!        |                                                      ^
//!        +------------------ empty source ----------------------+
//! ```

use crate::config::GenerationConfig;
use crate::error::{Result, WalkerError};
use crate::generation::queue::EntityQueue;
use crate::generation::worker::{aggregate_stats, WalkJob, Worker};
use crate::output::{WalkWriter, WriterStats};
use crate::progress::ProgressReporter;
use crate::selector::EntitySelector;
use crate::store::TripleSource;
use chrono::{DateTime, Utc};
use std::fmt;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// Writer channel slots per worker thread
const WRITER_SLOTS_PER_THREAD: usize = 4;

/// Lifecycle of a generation run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManagerState {
    Uninitialized,
    SelectingEntities,
    Running,
    Draining,
    Closed,
}

impl fmt::Display for ManagerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ManagerState::Uninitialized => "uninitialized",
            ManagerState::SelectingEntities => "selecting-entities",
            ManagerState::Running => "running",
            ManagerState::Draining => "draining",
            ManagerState::Closed => "closed",
        };
        f.write_str(name)
    }
}

/// Result of a completed generation run
#[derive(Debug, Clone, Default)]
pub struct GenerationReport {
    /// Entities selected for the run
    pub entities: u64,

    /// Walk lines written, text walks included
    pub walks_written: u64,

    /// Walk files written
    pub segments: u64,

    /// Entity tasks that produced no walks
    pub skipped: u64,

    /// Entity tasks that failed, plus writer I/O errors
    pub errors: u64,

    /// Uncompressed walk text written
    pub bytes_written: u64,

    /// Walk lines lost to segment write failures
    pub lines_dropped: u64,

    /// Wall time of the run
    pub duration: Duration,
}

impl GenerationReport {
    /// Walk lines per second
    pub fn walks_per_second(&self) -> f64 {
        let secs = self.duration.as_secs_f64();
        if secs > 0.0 {
            self.walks_written as f64 / secs
        } else {
            0.0
        }
    }
}

/// Progress snapshot for display
#[derive(Debug, Clone)]
pub struct GenerationProgress {
    /// Entities written in the current cycle
    pub processed: u64,

    /// Entities submitted in the current cycle
    pub total: u64,

    /// Walk lines written so far
    pub walks: u64,

    /// Uncompressed walk text written so far
    pub bytes: u64,

    /// Worker threads still running
    pub workers: usize,

    /// Time since the cycle started
    pub elapsed: Duration,
}

impl GenerationProgress {
    /// Entities per second in the current cycle
    pub fn entities_per_second(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.processed as f64 / secs
        } else {
            0.0
        }
    }
}

/// Per-cycle worker totals
#[derive(Debug, Default)]
struct CycleStats {
    skipped: u64,
    errors: u64,
}

/// Drives walk generation over a read-only triple source
pub struct WalkGenerationManager<S: TripleSource + ?Sized + 'static> {
    /// Populated, read-only triple source shared with the workers
    source: Arc<S>,

    /// Decides which entities get walks
    selector: Box<dyn EntitySelector>,

    /// Current lifecycle state
    state: ManagerState,

    /// Optional progress display
    progress: Option<ProgressReporter>,
}

impl<S: TripleSource + ?Sized + 'static> WalkGenerationManager<S> {
    /// Create a manager; the source must be fully populated
    pub fn new(source: Arc<S>, selector: Box<dyn EntitySelector>) -> Self {
        Self {
            source,
            selector,
            state: ManagerState::Uninitialized,
            progress: None,
        }
    }

    /// Show a progress bar while generating
    pub fn with_progress(mut self, reporter: ProgressReporter) -> Self {
        self.progress = Some(reporter);
        self
    }

    /// Current lifecycle state
    pub fn state(&self) -> ManagerState {
        self.state
    }

    /// Generate walks for every selected entity into `config.walk_dir`
    ///
    /// Returns [`WalkerError::NotInitialized`] without touching the walk
    /// directory when the triple source is empty. The manager is
    /// [`ManagerState::Closed`] afterwards whatever the outcome.
    pub fn generate_walks(&mut self, config: &GenerationConfig) -> Result<GenerationReport> {
        let result = self.run(config);
        self.state = ManagerState::Closed;

        if let Some(ref progress) = self.progress {
            match result {
                Ok(_) => progress.finish("Walk generation completed"),
                Err(_) => progress.finish_and_clear(),
            }
        }

        result
    }

    fn run(&mut self, config: &GenerationConfig) -> Result<GenerationReport> {
        let start_time = Instant::now();
        let start_datetime: DateTime<Utc> = Utc::now();

        if self.source.is_empty() {
            error!(
                "Triple source is empty or was not loaded; refusing to generate walks"
            );
            return Err(WalkerError::NotInitialized(
                "the triple source holds no triples".to_string(),
            ));
        }

        debug!(
            start_time = %start_datetime.to_rfc3339(),
            triples = self.source.size(),
            "Generation started"
        );

        self.state = ManagerState::SelectingEntities;
        if config.existing_walk_dir.is_some() && config.mode.is_mid_family() {
            warn!(
                mode = %config.mode,
                "Continuation relies on walks starting with their entity, which does not hold for this mode; recovered entities may be wrong"
            );
        }

        let mut entities: Vec<String> = self.selector.entities()?.into_iter().collect();
        entities.sort_unstable();
        info!(entities = entities.len(), mode = %config.mode, "Entities selected");

        self.state = ManagerState::Running;
        let writer = WalkWriter::new(
            &config.walk_dir,
            config.rotation_lines,
            config.thread_count * WRITER_SLOTS_PER_THREAD,
        )?;

        let graph_job = WalkJob::Graph {
            mode: config.mode,
            options: config.walk_options(),
        };
        let mut totals = self.run_cycle(graph_job, &entities, config.thread_count, &writer)?;

        writer.handle().flush()?;

        if config.text_walks {
            self.state = ManagerState::Running;
            let text_job = WalkJob::Text {
                max_length: config.text_walk_length,
            };
            let text = self.run_cycle(text_job, &entities, config.thread_count, &writer)?;
            totals.skipped += text.skipped;
            totals.errors += text.errors;
        }

        let stats = writer.finish()?;
        let duration = start_time.elapsed();

        let report = GenerationReport {
            entities: entities.len() as u64,
            walks_written: stats.walks_written(),
            segments: stats.segments_opened(),
            skipped: totals.skipped,
            errors: totals.errors + stats.io_errors(),
            bytes_written: stats.bytes_written(),
            lines_dropped: stats.lines_dropped(),
            duration,
        };

        info!(
            entities = report.entities,
            walks = report.walks_written,
            files = report.segments,
            errors = report.errors,
            lines_dropped = report.lines_dropped,
            duration_secs = duration.as_secs(),
            "Walk generation completed"
        );

        Ok(report)
    }

    /// Submit one task per entity and block until the pool has drained
    fn run_cycle(
        &mut self,
        job: WalkJob,
        entities: &[String],
        thread_count: usize,
        writer: &WalkWriter,
    ) -> Result<CycleStats> {
        let label = job.label();
        let job = Arc::new(job);
        let handle = writer.handle();
        let baseline = handle.stats().entities_processed();

        let mut queue = EntityQueue::new(entities.len());
        let mut workers = Vec::with_capacity(thread_count);
        for id in 0..thread_count.max(1) {
            let worker = Worker::spawn(
                id,
                Arc::clone(&self.source),
                Arc::clone(&job),
                queue.receiver(),
                handle.clone(),
            )?;
            workers.push(worker);
        }
        info!(job = label, count = workers.len(), "Workers spawned");

        if let Some(ref progress) = self.progress {
            progress.start_phase(label, entities.len() as u64);
        }

        for entity in entities {
            queue.submit(entity.clone())?;
        }
        queue.close();

        self.state = ManagerState::Draining;
        self.wait_for_drain(&workers, handle.stats(), baseline, entities.len() as u64);

        let (_, _, skipped, mut errors) = aggregate_stats(&workers);
        for worker in workers {
            let id = worker.id();
            if let Err(e) = worker.join() {
                warn!(worker = id, error = %e, "Worker failed to join cleanly");
                errors += 1;
            }
        }

        debug!(
            job = label,
            dequeued = queue.stats().throughput(),
            skipped,
            errors,
            "Cycle drained"
        );

        Ok(CycleStats { skipped, errors })
    }

    /// Wait until every worker has exited, refreshing the progress display
    fn wait_for_drain(&self, workers: &[Worker], stats: &WriterStats, baseline: u64, total: u64) {
        let check_interval = Duration::from_millis(100);
        let cycle_start = Instant::now();

        loop {
            let running = workers.iter().filter(|w| !w.is_finished()).count();

            if let Some(ref progress) = self.progress {
                progress.update(&GenerationProgress {
                    processed: stats.entities_processed().saturating_sub(baseline),
                    total,
                    walks: stats.walks_written(),
                    bytes: stats.bytes_written(),
                    workers: running,
                    elapsed: cycle_start.elapsed(),
                });
            }

            if running == 0 {
                return;
            }

            thread::sleep(check_interval);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WalkGenerationMode;
    use crate::selector::StoreEntitySelector;
    use crate::store::TripleStore;
    use tempfile::TempDir;

    fn manager_for(store: TripleStore) -> WalkGenerationManager<TripleStore> {
        let store = Arc::new(store);
        let selector = StoreEntitySelector::new(Arc::clone(&store));
        WalkGenerationManager::new(store, Box::new(selector))
    }

    fn config_for(dir: &TempDir, mode: WalkGenerationMode) -> GenerationConfig {
        let mut config = GenerationConfig::new(dir.path(), dir.path().join("walks"), mode);
        config.thread_count = 2;
        config.walks_per_entity = 5;
        config.depth = 2;
        config
    }

    #[test]
    fn test_manager_state_display() {
        assert_eq!(ManagerState::SelectingEntities.to_string(), "selecting-entities");
        assert_eq!(ManagerState::Closed.to_string(), "closed");
    }

    #[test]
    fn test_empty_source_closes_without_output() {
        let dir = TempDir::new().unwrap();
        let config = config_for(&dir, WalkGenerationMode::RandomWalks);
        let mut manager = manager_for(TripleStore::new());

        assert_eq!(manager.state(), ManagerState::Uninitialized);
        let result = manager.generate_walks(&config);

        assert!(matches!(result, Err(WalkerError::NotInitialized(_))));
        assert_eq!(manager.state(), ManagerState::Closed);
        assert!(!config.walk_dir.exists());
    }

    #[test]
    fn test_generation_reports_totals() {
        let dir = TempDir::new().unwrap();
        let config = config_for(&dir, WalkGenerationMode::RandomWalksDuplicateFree);

        let mut store = TripleStore::new();
        store.insert("A", "P1", "B");
        store.insert("B", "P2", "C");
        store.insert("B", "P3", "D");
        let mut manager = manager_for(store);

        let report = manager.generate_walks(&config).unwrap();

        // A yields both two-hop walks, B yields its two one-hop walks
        assert_eq!(report.entities, 4);
        assert_eq!(report.walks_written, 4);
        assert_eq!(report.skipped, 2);
        assert_eq!(report.errors, 0);
        assert_eq!(report.segments, 1);
        assert_eq!(report.lines_dropped, 0);
        assert_eq!(manager.state(), ManagerState::Closed);
    }

    #[test]
    fn test_text_cycle_appends_text_walks() {
        let dir = TempDir::new().unwrap();
        let mut config = config_for(&dir, WalkGenerationMode::RandomWalks);
        config.text_walks = true;
        config.text_walk_length = 4;

        let mut store = TripleStore::new();
        store.insert("A", "p", "B");
        store.insert_datatype("A", "label", "one two three");
        let mut manager = manager_for(store);

        let report = manager.generate_walks(&config).unwrap();

        // 5 identical forward walks from A, then two text chunks
        assert_eq!(report.walks_written, 7);
    }

    #[test]
    fn test_generation_report_rate() {
        let report = GenerationReport {
            walks_written: 1000,
            duration: Duration::from_secs(10),
            ..GenerationReport::default()
        };
        assert!((report.walks_per_second() - 100.0).abs() < 0.1);
        assert_eq!(GenerationReport::default().walks_per_second(), 0.0);
    }
}
