//! kg-walker - Parallel Random-Walk Corpus Generator for Knowledge Graphs
//!
//! Loads an RDF graph into an in-memory triple index and samples random
//! walks for every entity, writing them as gzip-compressed text files that
//! can be fed to a word embedding trainer.
//!
//! # Features
//!
//! - **Eight walk algorithms**: forward walks with and without duplicates,
//!   bidirectional (mid) walks, degree-weighted mid walks, and node, edge and
//!   type projections of them, plus text walks over literal values.
//!
//! - **Parallel Sampling**: A fixed pool of worker threads, one task per
//!   entity, over a read-only triple index.
//!
//! - **Single Writer**: Walk lines travel over a bounded channel to one
//!   writer thread that rotates output files every few million lines.
//!
//! - **Resumable**: A continuation run skips the entities already covered by
//!   the walk files of an interrupted run.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                   Graph files (.nt / .ttl / .gz)                │
//! └─────────────────────────────┬───────────────────────────────────┘
//!                               │ one loader thread per file
//!                               ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                TripleStore (merged, read-only)                  │
//! │        successors / predecessors / datatype facts               │
//! └─────────────────────────────┬───────────────────────────────────┘
//!                               │
//!                               ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      Worker Threads                             │
//! │  ┌─────────┐  ┌─────────┐  ┌─────────┐         ┌─────────┐      │
//! │  │Worker 1 │  │Worker 2 │  │Worker 3 │  ...    │Worker N │      │
//! │  └────┬────┘  └────┬────┘  └────┬────┘         └────┬────┘      │
//! │       ▲            ▲            ▲                    ▲          │
//! │       └────────────┴─────┬──────┴────────────────────┘          │
//! │            ┌─────────────┴────────────┐                         │
//! │            │      Entity Queue        │                         │
//! │            │  (crossbeam bounded)     │                         │
//! │            └──────────────────────────┘                         │
//! │                         │ walk lines                            │
//! │                         ▼                                       │
//! │            ┌──────────────────────────┐                         │
//! │            │      Walk Writer         │                         │
//! │            │  - gzip segments         │                         │
//! │            │  - rotation by lines     │                         │
//! │            └──────────────────────────┘                         │
//! └─────────────────────────────────────────────────────────────────┘
//!                               │
//!                               ▼
//!                    ┌──────────────────────┐
//!                    │ walk_file_0.txt.gz   │
//!                    │ walk_file_1.txt.gz   │
//!                    └──────────────────────┘
//! ```
//!
//! # Example
//!
//! ```bash
//! # Duplicate-free forward walks
//! kg-walker -g graph.nt -o walks/ -n 200 -d 4
//!
//! # Mid walks plus text walks, 32 threads
//! kg-walker -g graph/ -m mid_walks -t 32 --text-walks
//!
//! # Resume an interrupted run
//! kg-walker -g graph.nt -o walks2/ --continue walks/
//! ```

pub mod config;
pub mod error;
pub mod generation;
pub mod ingest;
pub mod output;
pub mod progress;
pub mod selector;
pub mod store;
pub mod walks;

pub use config::{CliArgs, GenerationConfig, WalkGenerationMode};
pub use error::{Result, WalkerError};
pub use generation::{GenerationReport, WalkGenerationManager};
pub use store::{Triple, TripleSource, TripleStore};
