use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use desk_types::Document;
use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::traits::DocumentBackend;

/// Stores the document as one pretty-printed JSON file.
///
/// Writes go to a temporary file in the same directory which is synced and
/// then renamed over the target, so readers of the file never see a torn
/// document.
#[derive(Clone, Debug)]
pub struct JsonFileBackend {
    path: PathBuf,
}

impl JsonFileBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn parent_dir(&self) -> &Path {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        }
    }

    fn write_atomic(&self, bytes: &[u8]) -> io::Result<()> {
        let dir = self.parent_dir();
        fs::create_dir_all(dir)?;

        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        tmp.write_all(bytes)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| e.error)?;
        Ok(())
    }
}

impl DocumentBackend for JsonFileBackend {
    fn read(&self) -> StoreResult<Option<Document>> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(StoreError::unavailable(self.location(), e)),
        };

        let document = serde_json::from_slice(&bytes).map_err(|source| StoreError::Malformed {
            location: self.location(),
            source,
        })?;
        debug!(path = %self.path.display(), bytes = bytes.len(), "document read");
        Ok(Some(document))
    }

    fn write(&self, document: &Document) -> StoreResult<()> {
        let mut bytes = serde_json::to_vec_pretty(document).map_err(|source| {
            StoreError::Malformed {
                location: self.location(),
                source,
            }
        })?;
        bytes.push(b'\n');

        self.write_atomic(&bytes)
            .map_err(|e| StoreError::unavailable(self.location(), e))?;
        debug!(path = %self.path.display(), bytes = bytes.len(), "document written");
        Ok(())
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use desk_types::{LookupEntry, Priority, Ticket};

    fn sample_document() -> Document {
        Document {
            tickets: vec![Ticket {
                id: 1,
                user: "A".into(),
                title: "T1".into(),
                description: "D".into(),
                priority: Priority::High,
                status: Some("s1".into()),
                category: None,
                created_at: chrono::Utc::now(),
                comments: vec![],
            }],
            statuses: vec![LookupEntry::new("s1", "Open")],
            categories: vec![],
        }
    }

    #[test]
    fn missing_file_reads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let backend = JsonFileBackend::new(dir.path().join("db.json"));
        assert!(backend.read().unwrap().is_none());
    }

    #[test]
    fn write_then_read_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let backend = JsonFileBackend::new(dir.path().join("db.json"));
        let doc = sample_document();
        backend.write(&doc).unwrap();
        assert_eq!(backend.read().unwrap(), Some(doc));
    }

    #[test]
    fn write_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("data").join("db.json");
        let backend = JsonFileBackend::new(&path);
        backend.write(&Document::new()).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn written_file_has_exactly_three_top_level_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("db.json");
        JsonFileBackend::new(&path).write(&sample_document()).unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        let mut keys: Vec<_> = raw.as_object().unwrap().keys().cloned().collect();
        keys.sort();
        assert_eq!(keys, vec!["categories", "statuses", "tickets"]);
        assert!(raw["tickets"][0].get("createdAt").is_some());
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("db.json");
        fs::write(&path, b"{ not json").unwrap();
        let err = JsonFileBackend::new(&path).read().unwrap_err();
        assert!(matches!(err, StoreError::Malformed { .. }));
    }

    #[test]
    fn unreadable_path_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        // A directory where the file should be cannot be read as a file.
        let err = JsonFileBackend::new(dir.path()).read().unwrap_err();
        assert!(matches!(err, StoreError::Unavailable { .. }));
    }

    #[test]
    fn no_temp_files_left_behind() {
        let dir = tempfile::tempdir().unwrap();
        let backend = JsonFileBackend::new(dir.path().join("db.json"));
        backend.write(&Document::new()).unwrap();
        backend.write(&sample_document()).unwrap();
        let entries: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }
}
