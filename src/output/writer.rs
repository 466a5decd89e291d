//! Gzip walk writer with size-based rotation
//!
//! The writer runs in a dedicated thread and receives the walks of one
//! entity per message over a bounded channel. It is the only place that
//! touches walk files and the shared counters, so no lock is needed around
//! them.
//!
//! # File layout
//!
//! ```text
//! walk_dir/
//! ├── walk_file_0.txt.gz     (<= rotation_lines walks)
//! ├── walk_file_1.txt.gz
//! └── ...
//! ```
//!
//! A segment is opened lazily on the first line that needs it. When a
//! segment holds `rotation_lines` lines the next line first finishes it
//! (gzip trailer written, buffer flushed, file closed) and then opens
//! the next index. Writing `N` lines therefore produces `ceil(N / T)` files.
//!
//! I/O failures are logged and counted; the run keeps going.

use crate::error::{OutputError, OutputResult};
use crossbeam_channel::{bounded, Receiver, Sender};
use flate2::write::GzEncoder;
use flate2::Compression;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::{debug, error, info, warn};

/// Walk lines per segment before rotating
pub const DEFAULT_ROTATION_LINES: usize = 3_000_000;

/// Log progress every this many entities
pub const PROGRESS_LOG_INTERVAL: u64 = 1000;

/// Size of the in-memory buffer in front of each gzip stream
const WRITE_BUFFER_SIZE: usize = 256 * 1024;

/// File name of the segment with the given index
pub fn segment_file_name(index: usize) -> String {
    format!("walk_file_{}.txt.gz", index)
}

/// Message types sent to the writer thread
#[derive(Debug)]
pub enum WriterMessage {
    /// All walks produced for one entity (possibly none)
    Walks(Vec<String>),

    /// Flush the open segment and acknowledge on the given channel
    Flush(Sender<()>),

    /// Close the open segment and stop the writer
    Shutdown,
}

/// Statistics about write operations
#[derive(Debug, Default)]
pub struct WriterStats {
    /// Entities whose walks have been handed to the writer
    pub entities_processed: AtomicU64,

    /// Walk lines written
    pub walks_written: AtomicU64,

    /// Segments opened
    pub segments_opened: AtomicU64,

    /// Uncompressed bytes written
    pub bytes_written: AtomicU64,

    /// Walk lines lost because their segment could not be written
    pub lines_dropped: AtomicU64,

    /// I/O errors encountered
    pub io_errors: AtomicU64,
}

impl WriterStats {
    pub fn entities_processed(&self) -> u64 {
        self.entities_processed.load(Ordering::Relaxed)
    }

    pub fn walks_written(&self) -> u64 {
        self.walks_written.load(Ordering::Relaxed)
    }

    pub fn segments_opened(&self) -> u64 {
        self.segments_opened.load(Ordering::Relaxed)
    }

    pub fn bytes_written(&self) -> u64 {
        self.bytes_written.load(Ordering::Relaxed)
    }

    pub fn lines_dropped(&self) -> u64 {
        self.lines_dropped.load(Ordering::Relaxed)
    }

    pub fn io_errors(&self) -> u64 {
        self.io_errors.load(Ordering::Relaxed)
    }
}

/// Handle for sending messages to the writer
#[derive(Clone)]
pub struct WriterHandle {
    sender: Sender<WriterMessage>,
    stats: Arc<WriterStats>,
}

impl WriterHandle {
    /// Send the walks of one entity to be written
    pub fn send_walks(&self, walks: Vec<String>) -> OutputResult<()> {
        self.sender
            .send(WriterMessage::Walks(walks))
            .map_err(|_| OutputError::ChannelClosed)
    }

    /// Flush the open segment and wait until the writer has done so
    pub fn flush(&self) -> OutputResult<()> {
        let (ack_tx, ack_rx) = bounded(1);
        self.sender
            .send(WriterMessage::Flush(ack_tx))
            .map_err(|_| OutputError::ChannelClosed)?;
        ack_rx.recv().map_err(|_| OutputError::ChannelClosed)
    }

    /// Request shutdown (pending walks are written first)
    pub fn shutdown(&self) -> OutputResult<()> {
        self.sender
            .send(WriterMessage::Shutdown)
            .map_err(|_| OutputError::ChannelClosed)
    }

    /// Get writer statistics
    pub fn stats(&self) -> &WriterStats {
        &self.stats
    }

    /// Shared statistics, for progress reporting from another thread
    pub fn stats_arc(&self) -> Arc<WriterStats> {
        Arc::clone(&self.stats)
    }
}

/// Rotating gzip walk writer that runs in its own thread
pub struct WalkWriter {
    /// Thread handle
    handle: Option<JoinHandle<()>>,

    /// Writer handle for sending messages
    writer_handle: WriterHandle,
}

impl WalkWriter {
    /// Create the walk directory and spawn the writer thread
    pub fn new(walk_dir: &Path, rotation_lines: usize, channel_size: usize) -> OutputResult<Self> {
        fs::create_dir_all(walk_dir).map_err(|e| OutputError::CreateDir {
            path: walk_dir.to_path_buf(),
            reason: e.to_string(),
        })?;

        let (sender, receiver) = bounded(channel_size.max(1));
        let stats = Arc::new(WriterStats::default());

        let writer_handle = WriterHandle {
            sender,
            stats: Arc::clone(&stats),
        };

        let sink = SegmentSink::new(walk_dir.to_path_buf(), rotation_lines.max(1), stats);

        let handle = thread::Builder::new()
            .name("walk-writer".into())
            .spawn(move || writer_thread(sink, receiver))
            .map_err(|e| OutputError::OpenFailed {
                path: walk_dir.to_path_buf(),
                reason: format!("Failed to spawn writer thread: {}", e),
            })?;

        info!(dir = %walk_dir.display(), rotation_lines, "Walk writer started");

        Ok(Self {
            handle: Some(handle),
            writer_handle,
        })
    }

    /// Get a handle for sending messages to the writer
    pub fn handle(&self) -> WriterHandle {
        self.writer_handle.clone()
    }

    /// Write pending walks, close the open segment and stop the thread
    pub fn finish(mut self) -> OutputResult<Arc<WriterStats>> {
        let _ = self.writer_handle.shutdown();

        if let Some(handle) = self.handle.take() {
            handle.join().map_err(|_| OutputError::WriterPanicked)?;
        }

        Ok(self.writer_handle.stats_arc())
    }
}

impl Drop for WalkWriter {
    /// Close the open segment when a run bails out before `finish`
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            let _ = self.writer_handle.shutdown();
            if handle.join().is_err() {
                warn!("Walk writer panicked during shutdown");
            }
        }
    }
}

/// Internal writer thread function
fn writer_thread(mut sink: SegmentSink, receiver: Receiver<WriterMessage>) {
    while let Ok(msg) = receiver.recv() {
        match msg {
            WriterMessage::Walks(walks) => sink.write_entity(&walks),
            WriterMessage::Flush(ack) => {
                sink.flush();
                let _ = ack.send(());
            }
            WriterMessage::Shutdown => break,
        }
    }

    // Channel closed or shutdown requested
    sink.close();
}

type Segment = GzEncoder<BufWriter<File>>;

/// The open segment plus the counters that decide when to rotate
struct SegmentSink {
    walk_dir: PathBuf,
    rotation_lines: usize,
    stats: Arc<WriterStats>,

    /// Open segment; `None` before the first line or after an open failure
    current: Option<Segment>,

    /// Whether a segment has been started (even if opening it failed)
    started: bool,

    /// Index of the next segment to open
    next_index: usize,

    /// Lines assigned to the current segment
    lines_in_segment: usize,
}

impl SegmentSink {
    fn new(walk_dir: PathBuf, rotation_lines: usize, stats: Arc<WriterStats>) -> Self {
        Self {
            walk_dir,
            rotation_lines,
            stats,
            current: None,
            started: false,
            next_index: 0,
            lines_in_segment: 0,
        }
    }

    fn write_entity(&mut self, walks: &[String]) {
        for walk in walks {
            self.write_line(walk);
        }

        let entities = self.stats.entities_processed.fetch_add(1, Ordering::Relaxed) + 1;
        if entities % PROGRESS_LOG_INTERVAL == 0 {
            info!(
                entities,
                walks = self.stats.walks_written(),
                "Walk generation progress"
            );
        }
    }

    fn write_line(&mut self, line: &str) {
        if !self.started || self.lines_in_segment >= self.rotation_lines {
            self.rotate();
        }
        self.lines_in_segment += 1;

        let Some(segment) = self.current.as_mut() else {
            self.stats.lines_dropped.fetch_add(1, Ordering::Relaxed);
            return;
        };

        let result = segment
            .write_all(line.as_bytes())
            .and_then(|_| segment.write_all(b"\n"));
        match result {
            Ok(()) => {
                self.stats.walks_written.fetch_add(1, Ordering::Relaxed);
                self.stats
                    .bytes_written
                    .fetch_add(line.len() as u64 + 1, Ordering::Relaxed);
            }
            Err(e) => {
                self.stats.io_errors.fetch_add(1, Ordering::Relaxed);
                self.stats.lines_dropped.fetch_add(1, Ordering::Relaxed);
                error!(segment = self.next_index.saturating_sub(1), error = %e, "Failed to write walk");
            }
        }
    }

    /// Finish the open segment and open the next one
    fn rotate(&mut self) {
        self.close();

        let index = self.next_index;
        let path = self.walk_dir.join(segment_file_name(index));
        self.next_index += 1;
        self.lines_in_segment = 0;
        self.started = true;

        match open_segment(&path) {
            Ok(segment) => {
                self.stats.segments_opened.fetch_add(1, Ordering::Relaxed);
                if index > 0 {
                    info!(file = %path.display(), index, "Rotated walk file");
                } else {
                    debug!(file = %path.display(), "Opened walk file");
                }
                self.current = Some(segment);
            }
            Err(e) => {
                self.stats.io_errors.fetch_add(1, Ordering::Relaxed);
                error!(file = %path.display(), error = %e, "Failed to open walk file, its walks will be dropped");
            }
        }
    }

    fn flush(&mut self) {
        if let Some(segment) = self.current.as_mut() {
            if let Err(e) = segment.flush() {
                self.stats.io_errors.fetch_add(1, Ordering::Relaxed);
                error!(error = %e, "Failed to flush walk file");
            }
        }
    }

    /// Write the gzip trailer, flush and close the open segment
    fn close(&mut self) {
        if let Some(segment) = self.current.take() {
            if let Err(e) = finish_segment(segment) {
                self.stats.io_errors.fetch_add(1, Ordering::Relaxed);
                error!(error = %e, "Failed to close walk file");
            }
        }
    }
}

fn open_segment(path: &Path) -> io::Result<Segment> {
    let file = File::create(path)?;
    Ok(GzEncoder::new(
        BufWriter::with_capacity(WRITE_BUFFER_SIZE, file),
        Compression::default(),
    ))
}

fn finish_segment(segment: Segment) -> io::Result<()> {
    let mut inner = segment.finish()?;
    inner.flush()?;
    inner.get_ref().sync_all()
}
