//! Startup seeding
//!
//! The canonical content ships inside the binary. On every boot the
//! reconciler brings the document store in line with it before any request
//! is served.

pub mod catalog;
pub mod reconcile;

pub use catalog::{check_consistency, Catalog, CHAPTER_COUNT};
pub use reconcile::{bootstrap, reconcile, verify, ReconcileReport};
