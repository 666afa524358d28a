//! Document store access
//!
//! `DocumentStore` is the seam between the seed reconciler / query handlers
//! and the backing store. `MongoClient` is the production implementation,
//! `MemoryStore` serves tests and `--memory-store` development runs.

pub mod ident;
pub mod memory;
pub mod mongo;
pub mod schemas;
pub mod store;

pub use memory::MemoryStore;
pub use mongo::{IntoIndexes, MongoClient};
pub use store::{DocumentStore, Filter, FindQuery, Record, SortOrder};
