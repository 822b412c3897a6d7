//! Filesystem storage implementation.
//!
//! Provides [`FsStorage`], which keeps each page as a pretty-printed JSON
//! file named after its id inside a data directory.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use folio_blocks::{Document, DocumentId};

use crate::storage::{DocumentSummary, Storage, StorageError, StorageErrorKind};

/// Backend identifier for error messages.
const BACKEND: &str = "Fs";

/// Extension of stored page files.
const EXTENSION: &str = "json";

/// Filesystem storage implementation.
///
/// Layout: `<data_dir>/<page id>.json`. Writes go to a sibling temporary
/// file first and are renamed into place, so a crashed save never leaves a
/// truncated page behind.
///
/// # Example
///
/// ```ignore
/// use std::path::PathBuf;
/// use folio_storage::{FsStorage, Storage};
///
/// let storage = FsStorage::new(PathBuf::from("data/pages"));
/// let pages = storage.list()?;
/// ```
pub struct FsStorage {
    /// Directory holding page files.
    data_dir: PathBuf,
    /// Serializes writers so temporary files never collide.
    write_lock: Mutex<()>,
}

impl FsStorage {
    /// Create a filesystem storage rooted at `data_dir`.
    ///
    /// The directory is created on first save.
    #[must_use]
    pub fn new(data_dir: PathBuf) -> Self {
        Self {
            data_dir,
            write_lock: Mutex::new(()),
        }
    }

    /// Directory holding page files.
    #[must_use]
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    fn page_path(&self, id: DocumentId) -> PathBuf {
        self.data_dir.join(format!("{id}.{EXTENSION}"))
    }

    fn read_page(&self, path: &Path) -> Result<Document, StorageError> {
        let raw = fs::read_to_string(path)
            .map_err(|e| StorageError::io(e, Some(path.to_path_buf())).with_backend(BACKEND))?;

        let document: Document = serde_json::from_str(&raw).map_err(|e| {
            StorageError::new(StorageErrorKind::InvalidData)
                .with_path(path)
                .with_backend(BACKEND)
                .with_source(e)
        })?;

        document.validate_structure().map_err(|e| {
            StorageError::new(StorageErrorKind::InvalidData)
                .with_id(document.id())
                .with_path(path)
                .with_backend(BACKEND)
                .with_source(e)
        })?;

        Ok(document)
    }

    /// Parse a page id out of a `<uuid>.json` file name.
    fn id_from_path(path: &Path) -> Option<DocumentId> {
        if path.extension().and_then(|e| e.to_str()) != Some(EXTENSION) {
            return None;
        }
        path.file_stem()?.to_str()?.parse().ok()
    }
}

impl Storage for FsStorage {
    fn load(&self, id: DocumentId) -> Result<Document, StorageError> {
        let path = self.page_path(id);
        let document = self.read_page(&path).map_err(|e| e.with_id(id))?;

        if document.id() != id {
            return Err(StorageError::new(StorageErrorKind::InvalidData)
                .with_id(id)
                .with_path(path)
                .with_backend(BACKEND));
        }

        tracing::debug!(page_id = %id, "Loaded page");
        Ok(document)
    }

    fn save(&self, document: &Document) -> Result<(), StorageError> {
        let id = document.id();
        let path = self.page_path(id);
        let tmp_path = path.with_extension(format!("{EXTENSION}.tmp"));

        let json = serde_json::to_string_pretty(document).map_err(|e| {
            StorageError::new(StorageErrorKind::InvalidData)
                .with_id(id)
                .with_backend(BACKEND)
                .with_source(e)
        })?;

        let _guard = self
            .write_lock
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);

        let io_err = |e, p: &Path| {
            StorageError::io(e, Some(p.to_path_buf()))
                .with_id(id)
                .with_backend(BACKEND)
        };
        fs::create_dir_all(&self.data_dir).map_err(|e| io_err(e, &self.data_dir))?;
        fs::write(&tmp_path, json).map_err(|e| io_err(e, &tmp_path))?;
        fs::rename(&tmp_path, &path).map_err(|e| io_err(e, &path))?;

        tracing::debug!(page_id = %id, revision = document.revision(), "Saved page");
        Ok(())
    }

    fn delete(&self, id: DocumentId) -> Result<(), StorageError> {
        let path = self.page_path(id);
        let _guard = self
            .write_lock
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);

        fs::remove_file(&path).map_err(|e| {
            StorageError::io(e, Some(path.clone()))
                .with_id(id)
                .with_backend(BACKEND)
        })?;

        tracing::debug!(page_id = %id, "Deleted page");
        Ok(())
    }

    fn list(&self) -> Result<Vec<DocumentSummary>, StorageError> {
        let entries = match fs::read_dir(&self.data_dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(StorageError::io(e, Some(self.data_dir.clone())).with_backend(BACKEND));
            }
        };

        let mut summaries = Vec::new();
        for entry in entries.filter_map(Result::ok) {
            let path = entry.path();
            if Self::id_from_path(&path).is_none() {
                continue;
            }
            match self.read_page(&path) {
                Ok(document) => summaries.push(DocumentSummary::from(&document)),
                Err(e) => tracing::warn!(error = %e, "Skipping unreadable page file"),
            }
        }

        Ok(summaries)
    }

    fn exists(&self, id: DocumentId) -> bool {
        self.page_path(id).is_file()
    }
}

#[cfg(test)]
mod tests {
    use folio_blocks::{BlockType, PageStatus, SchemaRegistry};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn assert_send_sync<T: Send + Sync>() {}

    fn sample_page(registry: &SchemaRegistry) -> Document {
        let mut doc = Document::new("Home", "home").unwrap();
        doc.add_block(registry, BlockType::Heading, None).unwrap();
        doc.add_block(registry, BlockType::Text, None).unwrap();
        let columns = doc
            .add_block(registry, BlockType::Columns, Some(0))
            .unwrap()
            .id();
        doc.add_child_block(registry, columns, BlockType::Image, None)
            .unwrap();
        doc.add_child_block(registry, columns, BlockType::Button, Some(0))
            .unwrap();
        doc
    }

    #[test]
    fn test_fs_storage_is_send_sync() {
        assert_send_sync::<FsStorage>();
    }

    #[test]
    fn test_round_trip_preserves_document() {
        let temp_dir = tempfile::tempdir().unwrap();
        let registry = SchemaRegistry::builtin();
        let storage = FsStorage::new(temp_dir.path().to_path_buf());
        let doc = sample_page(&registry);

        storage.save(&doc).unwrap();
        let loaded = storage.load(doc.id()).unwrap();

        assert_eq!(loaded, doc);
        let before: Vec<_> = doc.ordered_blocks().iter().map(|b| b.id()).collect();
        let after: Vec<_> = loaded.ordered_blocks().iter().map(|b| b.id()).collect();
        assert_eq!(after, before);
    }

    #[test]
    fn test_save_creates_data_dir() {
        let temp_dir = tempfile::tempdir().unwrap();
        let data_dir = temp_dir.path().join("nested/pages");
        let storage = FsStorage::new(data_dir.clone());
        let doc = Document::new("Home", "home").unwrap();

        storage.save(&doc).unwrap();

        assert!(data_dir.join(format!("{}.json", doc.id())).is_file());
        assert!(storage.exists(doc.id()));
    }

    #[test]
    fn test_save_overwrites() {
        let temp_dir = tempfile::tempdir().unwrap();
        let storage = FsStorage::new(temp_dir.path().to_path_buf());
        let mut doc = Document::new("Home", "home").unwrap();
        storage.save(&doc).unwrap();

        doc.set_title("Start");
        storage.save(&doc).unwrap();

        assert_eq!(storage.load(doc.id()).unwrap().title(), "Start");
        assert_eq!(storage.list().unwrap().len(), 1);
    }

    #[test]
    fn test_load_missing_is_not_found() {
        let temp_dir = tempfile::tempdir().unwrap();
        let storage = FsStorage::new(temp_dir.path().to_path_buf());
        let id = DocumentId::new();

        let err = storage.load(id).unwrap_err();

        assert!(err.is_not_found());
        assert_eq!(err.id, Some(id));
        assert_eq!(err.backend, Some("Fs"));
    }

    #[test]
    fn test_load_corrupt_is_invalid_data() {
        let temp_dir = tempfile::tempdir().unwrap();
        let storage = FsStorage::new(temp_dir.path().to_path_buf());
        let id = DocumentId::new();
        fs::write(temp_dir.path().join(format!("{id}.json")), "{not json").unwrap();

        let err = storage.load(id).unwrap_err();

        assert_eq!(err.kind, StorageErrorKind::InvalidData);
    }

    #[test]
    fn test_load_rejects_duplicate_block_ids() {
        let temp_dir = tempfile::tempdir().unwrap();
        let registry = SchemaRegistry::builtin();
        let storage = FsStorage::new(temp_dir.path().to_path_buf());
        let mut doc = Document::new("Home", "home").unwrap();
        doc.add_block(&registry, BlockType::Heading, None).unwrap();
        doc.add_block(&registry, BlockType::Text, None).unwrap();
        let mut value = serde_json::to_value(&doc).unwrap();
        value["content"][1]["id"] = value["content"][0]["id"].clone();
        fs::write(
            temp_dir.path().join(format!("{}.json", doc.id())),
            value.to_string(),
        )
        .unwrap();

        let err = storage.load(doc.id()).unwrap_err();

        assert_eq!(err.kind, StorageErrorKind::InvalidData);
    }

    #[test]
    fn test_load_rejects_mismatched_id() {
        let temp_dir = tempfile::tempdir().unwrap();
        let storage = FsStorage::new(temp_dir.path().to_path_buf());
        let doc = Document::new("Home", "home").unwrap();
        let other = DocumentId::new();
        fs::write(
            temp_dir.path().join(format!("{other}.json")),
            serde_json::to_string(&doc).unwrap(),
        )
        .unwrap();

        let err = storage.load(other).unwrap_err();

        assert_eq!(err.kind, StorageErrorKind::InvalidData);
    }

    #[test]
    fn test_unknown_block_type_round_trips() {
        let temp_dir = tempfile::tempdir().unwrap();
        let registry = SchemaRegistry::builtin();
        let storage = FsStorage::new(temp_dir.path().to_path_buf());
        let mut doc = Document::new("Home", "home").unwrap();
        doc.add_block(&registry, BlockType::Heading, None).unwrap();
        let mut value = serde_json::to_value(&doc).unwrap();
        value["content"][0]["type"] = json!("carousel");
        let doc: Document = serde_json::from_value(value).unwrap();

        storage.save(&doc).unwrap();
        let loaded = storage.load(doc.id()).unwrap();

        assert_eq!(
            loaded.blocks()[0].block_type(),
            &BlockType::Unknown("carousel".to_owned())
        );
    }

    #[test]
    fn test_delete() {
        let temp_dir = tempfile::tempdir().unwrap();
        let storage = FsStorage::new(temp_dir.path().to_path_buf());
        let doc = Document::new("Home", "home").unwrap();
        storage.save(&doc).unwrap();

        storage.delete(doc.id()).unwrap();

        assert!(!storage.exists(doc.id()));
        assert!(storage.delete(doc.id()).unwrap_err().is_not_found());
    }

    #[test]
    fn test_list_missing_dir_is_empty() {
        let storage = FsStorage::new(PathBuf::from("/nonexistent/folio"));

        assert!(storage.list().unwrap().is_empty());
    }

    #[test]
    fn test_list_skips_foreign_and_corrupt_files() {
        let temp_dir = tempfile::tempdir().unwrap();
        let storage = FsStorage::new(temp_dir.path().to_path_buf());
        let mut doc = Document::new("About", "about").unwrap();
        doc.publish().unwrap();
        storage.save(&doc).unwrap();
        fs::write(temp_dir.path().join("notes.txt"), "hello").unwrap();
        fs::write(
            temp_dir.path().join(format!("{}.json", DocumentId::new())),
            "[]",
        )
        .unwrap();

        let pages = storage.list().unwrap();

        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].slug, "about");
        assert_eq!(pages[0].status, PageStatus::Published);
    }
}
