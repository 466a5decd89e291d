//! Continuation of an interrupted generation run
//!
//! The first token of every line in the previous run's `.gz` walk files is
//! taken as an entity that is already covered. Those entities are removed
//! from the wrapped selector's set, and every readable file is copied into
//! the new walk directory with a `_copied` suffix so that the new directory
//! ends up holding the complete corpus.
//!
//! # Restriction
//!
//! Recovery relies on walks starting with their origin entity. Mid walks
//! (and the mid-edge and mid-type walks derived from them) do not, so
//! continuation is unsound for those modes: some covered entities will not
//! be recognized and others will be wrongly skipped. The manager logs a
//! warning when the combination is requested.

use crate::error::Result;
use crate::selector::EntitySelector;
use flate2::read::MultiGzDecoder;
use std::collections::HashSet;
use std::fs::{self, File};
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};

/// Wraps another selector and removes entities covered by existing walks
pub struct ContinuationEntitySelector<T: EntitySelector> {
    existing_walk_dir: PathBuf,
    new_walk_dir: PathBuf,
    inner: T,
}

impl<T: EntitySelector> ContinuationEntitySelector<T> {
    pub fn new(existing_walk_dir: impl Into<PathBuf>, new_walk_dir: impl Into<PathBuf>, inner: T) -> Self {
        Self {
            existing_walk_dir: existing_walk_dir.into(),
            new_walk_dir: new_walk_dir.into(),
            inner,
        }
    }
}

/// Name of a recovered walk file inside the new walk directory
///
/// `walk_file_0.txt.gz` becomes `walk_file_0_copied.txt.gz`.
pub fn copied_file_name(name: &str) -> String {
    let stem = name
        .strip_suffix(".txt.gz")
        .or_else(|| name.strip_suffix(".gz"))
        .unwrap_or(name);
    format!("{}_copied.txt.gz", stem)
}

/// Collect the first token of every line of a gzip walk file
fn read_first_tokens(path: &Path, into: &mut HashSet<String>) -> std::io::Result<()> {
    let reader = BufReader::new(MultiGzDecoder::new(File::open(path)?));
    for line in reader.lines() {
        let line = line?;
        if let Some(first) = line.split(' ').next() {
            if !first.is_empty() {
                into.insert(first.to_string());
            }
        }
    }
    Ok(())
}

/// Scan an existing walk directory, copying every readable file
///
/// Returns the set of recovered entities. Unreadable files are logged and
/// skipped; their entities are not considered covered.
pub fn recover_entities(existing_walk_dir: &Path, new_walk_dir: &Path) -> std::io::Result<HashSet<String>> {
    if !new_walk_dir.exists() {
        match fs::create_dir_all(new_walk_dir) {
            Ok(()) => info!(dir = %new_walk_dir.display(), "Created new walk directory"),
            Err(e) => error!(dir = %new_walk_dir.display(), error = %e, "Could not create new walk directory"),
        }
    }

    let mut recovered = HashSet::new();
    let mut files: Vec<PathBuf> = fs::read_dir(existing_walk_dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .collect();
    files.sort();

    for path in files {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if !name.ends_with(".gz") {
            debug!(file = name, "Skipping non-gzip file");
            continue;
        }

        // Only count the entities of a file that could be read completely
        let mut file_entities = HashSet::new();
        if let Err(e) = read_first_tokens(&path, &mut file_entities) {
            error!(file = %path.display(), error = %e, "Failed to read walk file, continuing with next file");
            continue;
        }
        recovered.extend(file_entities);

        let target = new_walk_dir.join(copied_file_name(name));
        match fs::copy(&path, &target) {
            Ok(_) => info!(from = %path.display(), to = %target.display(), "Copied existing walk file"),
            Err(e) => error!(
                from = %path.display(),
                to = %target.display(),
                error = %e,
                "Could not copy existing walk file"
            ),
        }
    }

    Ok(recovered)
}

impl<T: EntitySelector> EntitySelector for ContinuationEntitySelector<T> {
    fn entities(&self) -> Result<HashSet<String>> {
        let mut entities = self.inner.entities()?;

        if !self.existing_walk_dir.is_dir() {
            error!(
                dir = %self.existing_walk_dir.display(),
                "Existing walk directory does not exist or is not a directory; continuation disabled, walks will be generated for all entities"
            );
            return Ok(entities);
        }

        let recovered = recover_entities(&self.existing_walk_dir, &self.new_walk_dir)?;
        let before = entities.len();
        entities.retain(|e| !recovered.contains(e));

        info!(
            recovered = recovered.len(),
            before,
            after = entities.len(),
            "Removed entities covered by existing walks"
        );
        Ok(entities)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;
    use tempfile::TempDir;

    struct FixedSelector(HashSet<String>);

    impl EntitySelector for FixedSelector {
        fn entities(&self) -> Result<HashSet<String>> {
            Ok(self.0.clone())
        }
    }

    fn fixed(entities: &[&str]) -> FixedSelector {
        FixedSelector(entities.iter().map(|e| e.to_string()).collect())
    }

    fn write_gz(path: &Path, lines: &[&str]) {
        let mut encoder = GzEncoder::new(File::create(path).unwrap(), Compression::default());
        for line in lines {
            writeln!(encoder, "{}", line).unwrap();
        }
        encoder.finish().unwrap();
    }

    #[test]
    fn test_copied_file_name() {
        assert_eq!(copied_file_name("walk_file_0.txt.gz"), "walk_file_0_copied.txt.gz");
        assert_eq!(copied_file_name("walks.gz"), "walks_copied.txt.gz");
    }

    #[test]
    fn test_continuation_removes_covered_entities() {
        let old = TempDir::new().unwrap();
        let new = TempDir::new().unwrap();
        write_gz(&old.path().join("walk_file_0.txt.gz"), &["A p X", "A q Y"]);

        let selector = ContinuationEntitySelector::new(old.path(), new.path(), fixed(&["A", "B"]));
        let entities = selector.entities().unwrap();
        assert_eq!(entities, HashSet::from(["B".to_string()]));

        assert!(new.path().join("walk_file_0_copied.txt.gz").exists());
    }

    #[test]
    fn test_unreadable_and_foreign_files_are_skipped() {
        let old = TempDir::new().unwrap();
        let new = TempDir::new().unwrap();
        fs::write(old.path().join("broken.txt.gz"), b"not gzip at all").unwrap();
        fs::write(old.path().join("notes.txt"), b"B p X\n").unwrap();
        write_gz(&old.path().join("walk_file_1.txt.gz"), &["C p X"]);

        let selector =
            ContinuationEntitySelector::new(old.path(), new.path(), fixed(&["A", "B", "C"]));
        let entities = selector.entities().unwrap();
        assert_eq!(entities, HashSet::from(["A".to_string(), "B".to_string()]));

        assert!(!new.path().join("broken_copied.txt.gz").exists());
        assert!(new.path().join("walk_file_1_copied.txt.gz").exists());
    }

    #[test]
    fn test_missing_existing_directory_disables_continuation() {
        let new = TempDir::new().unwrap();
        let selector = ContinuationEntitySelector::new(
            new.path().join("does-not-exist"),
            new.path(),
            fixed(&["A", "B"]),
        );
        assert_eq!(selector.entities().unwrap().len(), 2);
    }

    #[test]
    fn test_new_walk_directory_is_created() {
        let old = TempDir::new().unwrap();
        let root = TempDir::new().unwrap();
        let new = root.path().join("nested").join("walks");
        write_gz(&old.path().join("walk_file_0.txt.gz"), &["A p X"]);

        let selector = ContinuationEntitySelector::new(old.path(), &new, fixed(&["A"]));
        assert!(selector.entities().unwrap().is_empty());
        assert!(new.join("walk_file_0_copied.txt.gz").exists());
    }
}
