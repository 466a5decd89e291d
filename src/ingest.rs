//! Triple ingestion
//!
//! Parsers deliver normalized triples through the [`TripleSink`] interface.
//! This module also provides a simple whitespace-split line loader for
//! N-Triples-like files (`.nt`, `.ttl`, `.txt`, each optionally `.gz`). It is
//! not a full RDF grammar: one statement per line, subject and predicate
//! without inner whitespace, and either a URI or a quoted literal as object.
//!
//! Directories are loaded with one thread per file. Every thread fills a
//! private [`TripleStore`]; the stores are merged once all threads have been
//! joined, so the result is complete before anyone can sample from it.

use crate::error::{StoreError, StoreResult};
use crate::store::{strip_tags, TripleSource, TripleStore};
use flate2::read::MultiGzDecoder;
use std::fs::{self, File};
use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Instant;
use tracing::{debug, info, warn};

/// File extensions picked up when loading a directory
const SUPPORTED_EXTENSIONS: &[&str] = &["nt", "ttl", "txt", "gz"];

/// Receives triples from a parser
///
/// Callers strip angle-bracket tags before delivery.
pub trait TripleSink {
    /// Deliver an object triple
    fn deliver_triple(&mut self, subject: &str, predicate: &str, object: &str);

    /// Deliver a datatype fact (literal object)
    fn deliver_datatype(&mut self, subject: &str, predicate: &str, text: &str);
}

impl TripleSink for TripleStore {
    fn deliver_triple(&mut self, subject: &str, predicate: &str, object: &str) {
        self.insert(subject, predicate, object);
    }

    fn deliver_datatype(&mut self, subject: &str, predicate: &str, text: &str) {
        self.insert_datatype(subject, predicate, text);
    }
}

/// Loader options
#[derive(Debug, Clone, Copy, Default)]
pub struct LoaderOptions {
    /// Keep literal objects as datatype facts instead of skipping them
    pub parse_datatype: bool,
}

/// Counters for one load
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LoadStats {
    /// Lines read
    pub lines: u64,

    /// Object triples delivered
    pub triples: u64,

    /// Datatype facts delivered
    pub datatype_facts: u64,

    /// Literal lines skipped because datatype parsing is off
    pub literals_skipped: u64,

    /// Lines that could not be parsed
    pub malformed: u64,
}

impl LoadStats {
    fn add(&mut self, other: &LoadStats) {
        self.lines += other.lines;
        self.triples += other.triples;
        self.datatype_facts += other.datatype_facts;
        self.literals_skipped += other.literals_skipped;
        self.malformed += other.malformed;
    }
}

/// Result of parsing one line
#[derive(Debug, PartialEq, Eq)]
pub enum ParsedLine<'a> {
    /// Object triple with tags stripped
    Triple(&'a str, &'a str, &'a str),

    /// Literal object, kept verbatim for later normalization
    Datatype(&'a str, &'a str, &'a str),

    /// Blank line or comment
    Empty,

    /// Anything else
    Malformed,
}

/// Take the next whitespace-delimited token from `rest`
fn next_token<'a>(rest: &mut &'a str) -> Option<&'a str> {
    let trimmed = rest.trim_start();
    if trimmed.is_empty() {
        return None;
    }
    let end = trimmed.find(char::is_whitespace).unwrap_or(trimmed.len());
    let (token, tail) = trimmed.split_at(end);
    *rest = tail;
    Some(token)
}

/// Parse one statement line
pub fn parse_line(line: &str) -> ParsedLine<'_> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return ParsedLine::Empty;
    }

    // Statement terminator
    let line = line.strip_suffix('.').map(str::trim_end).unwrap_or(line);

    let mut rest = line;
    let (Some(subject), Some(predicate)) = (next_token(&mut rest), next_token(&mut rest)) else {
        return ParsedLine::Malformed;
    };
    let object = rest.trim();
    if object.is_empty() {
        return ParsedLine::Malformed;
    }

    if object.starts_with('"') {
        return ParsedLine::Datatype(strip_tags(subject), strip_tags(predicate), object);
    }
    if object.contains(char::is_whitespace) {
        return ParsedLine::Malformed;
    }

    ParsedLine::Triple(strip_tags(subject), strip_tags(predicate), strip_tags(object))
}

/// Read statements from any reader into a sink
pub fn load_reader<R: Read, S: TripleSink + ?Sized>(
    reader: R,
    sink: &mut S,
    options: LoaderOptions,
    source_name: &str,
) -> std::io::Result<LoadStats> {
    let mut stats = LoadStats::default();

    for line in BufReader::new(reader).lines() {
        let line = line?;
        stats.lines += 1;

        match parse_line(&line) {
            ParsedLine::Triple(s, p, o) => {
                sink.deliver_triple(s, p, o);
                stats.triples += 1;
            }
            ParsedLine::Datatype(s, p, text) => {
                if options.parse_datatype {
                    sink.deliver_datatype(s, p, text);
                    stats.datatype_facts += 1;
                } else {
                    stats.literals_skipped += 1;
                }
            }
            ParsedLine::Empty => {}
            ParsedLine::Malformed => {
                stats.malformed += 1;
                debug!(source = source_name, line = stats.lines, "Skipping malformed line");
            }
        }
    }

    if stats.malformed > 0 {
        warn!(
            source = source_name,
            malformed = stats.malformed,
            "Skipped malformed lines"
        );
    }

    Ok(stats)
}

/// Load one file (gzip if it ends in `.gz`) into a sink
pub fn load_file<S: TripleSink + ?Sized>(
    path: &Path,
    sink: &mut S,
    options: LoaderOptions,
) -> StoreResult<LoadStats> {
    let to_error = |e: std::io::Error| StoreError::ReadFailed {
        path: path.to_path_buf(),
        reason: e.to_string(),
    };

    let file = File::open(path).map_err(to_error)?;
    let name = path.display().to_string();
    let is_gzip = path.extension().is_some_and(|ext| ext == "gz");

    let stats = if is_gzip {
        load_reader(MultiGzDecoder::new(file), sink, options, &name)
    } else {
        load_reader(file, sink, options, &name)
    }
    .map_err(to_error)?;

    debug!(
        file = %name,
        triples = stats.triples,
        datatype_facts = stats.datatype_facts,
        "Loaded file"
    );
    Ok(stats)
}

/// Files of a directory the loader understands, sorted by name
fn graph_files(dir: &Path) -> StoreResult<Vec<PathBuf>> {
    let entries = fs::read_dir(dir).map_err(|e| StoreError::ReadFailed {
        path: dir.to_path_buf(),
        reason: e.to_string(),
    })?;

    let mut files: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.is_file())
        .filter(|p| {
            p.extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| SUPPORTED_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        })
        .collect();
    files.sort();
    Ok(files)
}

/// Load a file or a directory of files into a new store
///
/// Directory files are read in parallel, one thread per file, and merged
/// after every thread has finished.
pub fn load_path(path: &Path, options: LoaderOptions) -> StoreResult<(TripleStore, LoadStats)> {
    if !path.exists() {
        return Err(StoreError::NotFound {
            path: path.to_path_buf(),
        });
    }

    let start = Instant::now();
    let mut store = TripleStore::new();
    let mut total = LoadStats::default();

    if path.is_dir() {
        let files = graph_files(path)?;
        info!(dir = %path.display(), files = files.len(), "Loading graph directory");

        let mut handles = Vec::with_capacity(files.len());
        for (i, file) in files.into_iter().enumerate() {
            let thread_file = file.clone();
            let handle = thread::Builder::new()
                .name(format!("loader-{}", i))
                .spawn(move || -> StoreResult<(TripleStore, LoadStats)> {
                    let mut partial = TripleStore::new();
                    let stats = load_file(&thread_file, &mut partial, options)?;
                    Ok((partial, stats))
                })
                .map_err(|e| StoreError::ReadFailed {
                    path: file.clone(),
                    reason: format!("Failed to spawn loader thread: {}", e),
                })?;
            handles.push((file, handle));
        }

        // Join barrier: every file is complete before the merge starts
        let mut partials = Vec::with_capacity(handles.len());
        for (file, handle) in handles {
            let result = handle
                .join()
                .map_err(|_| StoreError::LoaderPanicked { path: file })?;
            partials.push(result?);
        }

        for (partial, stats) in partials {
            store.merge(partial);
            total.add(&stats);
        }
    } else {
        total = load_file(path, &mut store, options)?;
    }

    info!(
        path = %path.display(),
        triples = store.size(),
        datatype_facts = store.datatype_size(),
        lines = total.lines,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Graph loaded"
    );

    Ok((store, total))
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn test_parse_line() {
        assert_eq!(
            parse_line("<http://a> <http://p> <http://b> ."),
            ParsedLine::Triple("http://a", "http://p", "http://b")
        );
        assert_eq!(parse_line("A P1 B"), ParsedLine::Triple("A", "P1", "B"));
        assert_eq!(
            parse_line("_:b0 <http://p> _:b1 ."),
            ParsedLine::Triple("_:b0", "http://p", "_:b1")
        );
        assert_eq!(
            parse_line("<http://a> <http://label> \"Hello World\"@en ."),
            ParsedLine::Datatype("http://a", "http://label", "\"Hello World\"@en")
        );
        assert_eq!(parse_line(""), ParsedLine::Empty);
        assert_eq!(parse_line("   # a comment"), ParsedLine::Empty);
        assert_eq!(parse_line("A P1"), ParsedLine::Malformed);
        assert_eq!(parse_line("A P1 B C ."), ParsedLine::Malformed);
    }

    #[test]
    fn test_load_reader_with_and_without_literals() {
        let data = "A P1 B .\nA label \"some text\" .\nbroken\n\nB P2 C .\n";

        let mut store = TripleStore::new();
        let stats = load_reader(data.as_bytes(), &mut store, LoaderOptions::default(), "test").unwrap();
        assert_eq!(stats.lines, 5);
        assert_eq!(stats.triples, 2);
        assert_eq!(stats.literals_skipped, 1);
        assert_eq!(stats.malformed, 1);
        assert_eq!(store.datatype_size(), 0);

        let mut store = TripleStore::new();
        let options = LoaderOptions { parse_datatype: true };
        let stats = load_reader(data.as_bytes(), &mut store, options, "test").unwrap();
        assert_eq!(stats.datatype_facts, 1);
        assert_eq!(store.datatype_facts("A"), vec![("label", "\"some text\"")]);
    }

    #[test]
    fn test_load_gzip_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("graph.nt.gz");
        let mut encoder = GzEncoder::new(File::create(&path).unwrap(), Compression::default());
        writeln!(encoder, "<A> <P1> <B> .").unwrap();
        writeln!(encoder, "<B> <P2> <C> .").unwrap();
        encoder.finish().unwrap();

        let (store, stats) = load_path(&path, LoaderOptions::default()).unwrap();
        assert_eq!(stats.triples, 2);
        assert_eq!(store.size(), 2);
        assert_eq!(store.successors("A").len(), 1);
    }

    #[test]
    fn test_load_directory_merges_files() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.nt"), "A P1 B .\nB P2 C .\n").unwrap();
        fs::write(dir.path().join("b.nt"), "B P3 D .\nA P1 B .\n").unwrap();
        fs::write(dir.path().join("ignored.json"), "{}").unwrap();

        let (store, stats) = load_path(dir.path(), LoaderOptions::default()).unwrap();
        assert_eq!(stats.triples, 4);
        assert_eq!(store.size(), 3);
        assert_eq!(store.successors("B").len(), 2);
        assert_eq!(store.predecessors("B").len(), 1);
    }

    #[test]
    fn test_load_missing_path() {
        let err = load_path(Path::new("/nonexistent/graph.nt"), LoaderOptions::default()).unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }
}
