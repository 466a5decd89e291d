//! Walk file output
//!
//! Walks are appended to gzip-compressed, size-rotated text files named
//! `walk_file_<index>.txt.gz`, one walk per line with space-separated tokens.

pub mod writer;

pub use writer::{
    segment_file_name, WalkWriter, WriterHandle, WriterMessage, WriterStats,
    DEFAULT_ROTATION_LINES, PROGRESS_LOG_INTERVAL,
};
