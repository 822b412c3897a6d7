//! Save coordination.
//!
//! Coalesces save requests per page: while a save is in flight, newer
//! snapshots replace each other in a single queued slot (last write wins),
//! and snapshots older than one already requested are discarded.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use folio_blocks::{Document, DocumentId};
use folio_storage::{Storage, StorageError};

/// Result of [`SaveCoordinator::request_save`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// This call wrote the page. `revision` is the last revision written,
    /// which may be newer than the one passed in if requests were queued
    /// meanwhile.
    Saved { revision: u64 },
    /// Another save was in flight; this snapshot will be written by it
    /// unless a newer one replaces it first.
    Queued { revision: u64 },
    /// A newer revision was already requested; this snapshot was dropped.
    Stale { revision: u64, latest: u64 },
}

/// Per-page save state.
#[derive(Default)]
struct SaveSlot {
    in_flight: bool,
    queued: Option<Document>,
    latest_requested: u64,
}

/// Serializes saves per page over a shared [`Storage`].
///
/// At most one save per page is running at any time. The thread that
/// starts a save keeps draining the queued slot until it is empty, so a
/// burst of requests results in at most two writes: the first snapshot and
/// the newest one.
pub struct SaveCoordinator {
    storage: Arc<dyn Storage>,
    slots: Mutex<HashMap<DocumentId, SaveSlot>>,
}

impl SaveCoordinator {
    #[must_use]
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self {
            storage,
            slots: Mutex::new(HashMap::new()),
        }
    }

    /// Request that `document` be persisted.
    ///
    /// # Errors
    ///
    /// Returns the storage error of the last write attempted by this call.
    /// A failed write is not retried; if a newer snapshot was queued behind
    /// it, that snapshot is still written.
    pub fn request_save(&self, document: Document) -> Result<SaveOutcome, StorageError> {
        let id = document.id();
        let revision = document.revision();

        {
            let mut slots = self.lock();
            let slot = slots.entry(id).or_default();

            if revision < slot.latest_requested {
                tracing::warn!(
                    page_id = %id,
                    revision,
                    latest = slot.latest_requested,
                    "Discarding stale save"
                );
                return Ok(SaveOutcome::Stale {
                    revision,
                    latest: slot.latest_requested,
                });
            }
            slot.latest_requested = revision;

            if slot.in_flight {
                tracing::debug!(page_id = %id, revision, "Save queued");
                slot.queued = Some(document);
                return Ok(SaveOutcome::Queued { revision });
            }
            slot.in_flight = true;
        }

        self.drain(document)
    }

    /// Whether a snapshot at `revision` is older than the newest requested
    /// save for page `id`.
    ///
    /// Callers use this to drop responses that arrive after the page has
    /// moved on.
    #[must_use]
    pub fn is_stale(&self, id: DocumentId, revision: u64) -> bool {
        self.lock()
            .get(&id)
            .is_some_and(|slot| revision < slot.latest_requested)
    }

    /// Whether a save for page `id` is currently running.
    #[must_use]
    pub fn is_saving(&self, id: DocumentId) -> bool {
        self.lock().get(&id).is_some_and(|slot| slot.in_flight)
    }

    /// Drop the save state of page `id`, e.g. after it was deleted.
    ///
    /// A save already in flight still completes; its queued snapshot is
    /// dropped with the slot.
    pub fn forget(&self, id: DocumentId) {
        self.lock().remove(&id);
    }

    /// Write `document`, then every snapshot queued meanwhile.
    fn drain(&self, mut document: Document) -> Result<SaveOutcome, StorageError> {
        let id = document.id();
        loop {
            let result = self.storage.save(&document);
            if let Err(e) = &result {
                tracing::warn!(page_id = %id, revision = document.revision(), error = %e, "Save failed");
            }

            let mut slots = self.lock();
            let Entry::Occupied(mut entry) = slots.entry(id) else {
                return result.map(|()| SaveOutcome::Saved {
                    revision: document.revision(),
                });
            };

            if let Some(next) = entry.get_mut().queued.take() {
                drop(slots);
                document = next;
                continue;
            }

            entry.get_mut().in_flight = false;
            return result.map(|()| SaveOutcome::Saved {
                revision: document.revision(),
            });
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<DocumentId, SaveSlot>> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::mpsc;
    use std::thread;

    use folio_storage::{DocumentSummary, MockStorage, StorageErrorKind};
    use pretty_assertions::assert_eq;

    use super::*;

    /// Storage whose first save blocks until released.
    struct GatedStorage {
        inner: MockStorage,
        entered: Mutex<Option<mpsc::Sender<()>>>,
        release: Mutex<Option<mpsc::Receiver<()>>>,
        saved_revisions: Mutex<Vec<u64>>,
    }

    impl Storage for GatedStorage {
        fn load(&self, id: DocumentId) -> Result<Document, StorageError> {
            self.inner.load(id)
        }

        fn save(&self, document: &Document) -> Result<(), StorageError> {
            if let Some(entered) = self.entered.lock().unwrap().take() {
                entered.send(()).unwrap();
                let release = self.release.lock().unwrap().take().unwrap();
                release.recv().unwrap();
            }
            self.saved_revisions
                .lock()
                .unwrap()
                .push(document.revision());
            self.inner.save(document)
        }

        fn delete(&self, id: DocumentId) -> Result<(), StorageError> {
            self.inner.delete(id)
        }

        fn list(&self) -> Result<Vec<DocumentSummary>, StorageError> {
            self.inner.list()
        }
    }

    fn revised(doc: &Document, title: &str) -> Document {
        let mut next = doc.clone();
        next.set_title(title);
        next
    }

    #[test]
    fn test_idle_save_writes_immediately() {
        let storage = Arc::new(MockStorage::new());
        let coordinator = SaveCoordinator::new(Arc::clone(&storage) as Arc<dyn Storage>);
        let doc = Document::new("Home", "home").unwrap();

        let outcome = coordinator.request_save(doc.clone()).unwrap();

        assert_eq!(outcome, SaveOutcome::Saved { revision: 0 });
        assert_eq!(storage.load(doc.id()).unwrap(), doc);
        assert!(!coordinator.is_saving(doc.id()));
    }

    #[test]
    fn test_older_revision_is_stale() {
        let storage = Arc::new(MockStorage::new());
        let coordinator = SaveCoordinator::new(Arc::clone(&storage) as Arc<dyn Storage>);
        let v0 = Document::new("Home", "home").unwrap();
        let v1 = revised(&v0, "Start");

        coordinator.request_save(v1.clone()).unwrap();
        let outcome = coordinator.request_save(v0.clone()).unwrap();

        assert_eq!(
            outcome,
            SaveOutcome::Stale {
                revision: 0,
                latest: 1
            }
        );
        assert!(coordinator.is_stale(v0.id(), 0));
        assert!(!coordinator.is_stale(v0.id(), 1));
        assert_eq!(storage.load(v0.id()).unwrap().title(), "Start");
        assert_eq!(storage.save_count(), 1);
    }

    #[test]
    fn test_queued_saves_coalesce_to_latest() {
        let (entered_tx, entered_rx) = mpsc::channel();
        let (release_tx, release_rx) = mpsc::channel();
        let storage = Arc::new(GatedStorage {
            inner: MockStorage::new(),
            entered: Mutex::new(Some(entered_tx)),
            release: Mutex::new(Some(release_rx)),
            saved_revisions: Mutex::new(Vec::new()),
        });
        let coordinator = Arc::new(SaveCoordinator::new(Arc::clone(&storage) as Arc<dyn Storage>));
        let v0 = Document::new("Home", "home").unwrap();
        let v1 = revised(&v0, "One");
        let v2 = revised(&v1, "Two");
        let v3 = revised(&v2, "Three");

        let first = {
            let coordinator = Arc::clone(&coordinator);
            let v1 = v1.clone();
            thread::spawn(move || coordinator.request_save(v1))
        };
        entered_rx.recv().unwrap();
        assert!(coordinator.is_saving(v0.id()));

        assert_eq!(
            coordinator.request_save(v2).unwrap(),
            SaveOutcome::Queued { revision: 2 }
        );
        assert_eq!(
            coordinator.request_save(v3.clone()).unwrap(),
            SaveOutcome::Queued { revision: 3 }
        );
        assert_eq!(
            coordinator.request_save(v1).unwrap(),
            SaveOutcome::Stale {
                revision: 1,
                latest: 3
            }
        );

        release_tx.send(()).unwrap();
        let outcome = first.join().unwrap().unwrap();

        assert_eq!(outcome, SaveOutcome::Saved { revision: 3 });
        assert_eq!(*storage.saved_revisions.lock().unwrap(), vec![1, 3]);
        assert_eq!(storage.load(v0.id()).unwrap(), v3);
        assert!(!coordinator.is_saving(v0.id()));
    }

    #[test]
    fn test_failed_save_is_reported_and_slot_released() {
        let storage = Arc::new(MockStorage::new().with_save_failure(StorageErrorKind::Unavailable));
        let coordinator = SaveCoordinator::new(Arc::clone(&storage) as Arc<dyn Storage>);
        let doc = Document::new("Home", "home").unwrap();

        let err = coordinator.request_save(doc.clone()).unwrap_err();
        assert_eq!(err.kind, StorageErrorKind::Unavailable);
        assert!(!coordinator.is_saving(doc.id()));

        storage.set_save_failure(None);
        assert_eq!(
            coordinator.request_save(doc).unwrap(),
            SaveOutcome::Saved { revision: 0 }
        );
    }

    #[test]
    fn test_forget_drops_slot() {
        let storage = Arc::new(MockStorage::new());
        let coordinator = SaveCoordinator::new(Arc::clone(&storage) as Arc<dyn Storage>);
        let v0 = Document::new("Home", "home").unwrap();
        let v1 = revised(&v0, "Start");
        coordinator.request_save(v1).unwrap();
        assert!(coordinator.is_stale(v0.id(), 0));

        coordinator.forget(v0.id());

        assert!(!coordinator.is_stale(v0.id(), 0));
        assert!(coordinator.lock().is_empty());
    }

    #[test]
    fn test_pages_are_independent() {
        let storage = Arc::new(MockStorage::new());
        let coordinator = SaveCoordinator::new(Arc::clone(&storage) as Arc<dyn Storage>);
        let home = revised(&Document::new("Home", "home").unwrap(), "Home!");
        let about = Document::new("About", "about").unwrap();

        coordinator.request_save(home).unwrap();
        let outcome = coordinator.request_save(about).unwrap();

        assert_eq!(outcome, SaveOutcome::Saved { revision: 0 });
        assert_eq!(storage.len(), 2);
    }
}
