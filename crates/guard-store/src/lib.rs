//! Profile persistence for the distribution core.
//!
//! An ordered, vault-sealed record table over a pluggable storage backend,
//! plus the operations that feed and prune it: batch import, maintenance
//! passes, and the expiry reaper.

pub mod backend;
pub mod error;
pub mod import;
pub mod reaper;
pub mod store;

pub use backend::{MemoryBackend, SqliteBackend, StorageBackend};
pub use error::StoreError;
pub use import::{import_batch, ImportReport};
pub use reaper::sweep;
pub use store::{GroupRemoval, ProfileStore};
