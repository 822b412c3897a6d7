//! Page storage for Folio.
//!
//! The [`Storage`] trait loads, saves, deletes and lists [`Document`]s by id.
//! [`FsStorage`] keeps one JSON file per page; [`MockStorage`] (behind the
//! `mock` feature) keeps pages in memory for tests.
//!
//! Every backend returns [`StorageError`], which pairs a semantic
//! [`StorageErrorKind`] with retry guidance ([`ErrorStatus`]).
//!
//! [`Document`]: folio_blocks::Document

mod fs;
#[cfg(feature = "mock")]
mod mock;
mod storage;

pub use fs::FsStorage;
#[cfg(feature = "mock")]
pub use mock::MockStorage;
pub use storage::{DocumentSummary, ErrorStatus, Storage, StorageError, StorageErrorKind};
