//! Shloka - Bhagavad Gita guidance by emotion
//!
//! A read-mostly content API: a fixed hierarchy of emotions, moods and
//! guidance passages plus a table of the eighteen chapters, served as JSON
//! over HTTP from MongoDB.
//!
//! ## Boot
//!
//! 1. Connect to the document store
//! 2. [`seed::bootstrap`] reconciles the store with the compiled-in catalog,
//!    then builds indexes
//! 3. [`server::run`] starts accepting requests
//!
//! A failed reconcile aborts startup; the server never serves a partially
//! seeded store.

pub mod config;
pub mod db;
pub mod routes;
pub mod seed;
pub mod server;
pub mod types;

pub use config::{Args, SeedPolicy};
pub use server::{run, AppState};
pub use types::{Result, ShlokaError};
