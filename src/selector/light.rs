//! Allow-list entity selection
//!
//! The entity file is UTF-8 text with one full entity URI per line and no
//! header. Angle brackets around a URI are tolerated and stripped.

use crate::error::{Result, SelectorError};
use crate::selector::EntitySelector;
use crate::store::strip_tags;
use std::collections::HashSet;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use tracing::info;

/// Selects the entities listed in a file
#[derive(Debug, Clone)]
pub struct LightEntitySelector {
    entity_file: PathBuf,
}

impl LightEntitySelector {
    pub fn new(entity_file: impl Into<PathBuf>) -> Self {
        Self {
            entity_file: entity_file.into(),
        }
    }
}

/// Read an entity allow-list, skipping blank lines
pub fn read_entity_file(path: &Path) -> Result<HashSet<String>> {
    let to_error = |e: std::io::Error| SelectorError::EntityFile {
        path: path.to_path_buf(),
        reason: e.to_string(),
    };

    let reader = BufReader::new(File::open(path).map_err(to_error)?);
    let mut entities = HashSet::new();

    for line in reader.lines() {
        let line = line.map_err(to_error)?;
        let entity = strip_tags(line.trim());
        if !entity.is_empty() {
            entities.insert(entity.to_string());
        }
    }

    Ok(entities)
}

impl EntitySelector for LightEntitySelector {
    fn entities(&self) -> Result<HashSet<String>> {
        let entities = read_entity_file(&self.entity_file)?;
        info!(
            file = %self.entity_file.display(),
            entities = entities.len(),
            "Read entity allow-list"
        );
        Ok(entities)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::WalkerError;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_read_entity_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "http://example.org/A").unwrap();
        writeln!(file, "<http://example.org/B>").unwrap();
        writeln!(file).unwrap();
        writeln!(file, "http://example.org/A").unwrap();

        let selector = LightEntitySelector::new(file.path());
        let entities = selector.entities().unwrap();
        assert_eq!(entities.len(), 2);
        assert!(entities.contains("http://example.org/A"));
        assert!(entities.contains("http://example.org/B"));
    }

    #[test]
    fn test_missing_entity_file() {
        let selector = LightEntitySelector::new("/nonexistent/entities.txt");
        let err = selector.entities().unwrap_err();
        assert!(matches!(
            err,
            WalkerError::Selector(SelectorError::EntityFile { .. })
        ));
    }
}
