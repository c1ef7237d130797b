//! Storage adapters for the AutoInspect repository and blob traits.
//!
//! - [`SqliteStore`]: durable, single-file database
//! - [`InMemoryStore`]: process-local maps for tests and ephemeral runs
//! - [`FsBlobStore`] / [`InMemoryBlobStore`]: photo and report bytes

pub mod blob;
pub mod memory;
pub mod sqlite;

pub use blob::{FsBlobStore, InMemoryBlobStore};
pub use memory::InMemoryStore;
pub use sqlite::SqliteStore;
