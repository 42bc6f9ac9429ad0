//! # warden-store
//!
//! Flagged-prompt audit store for Warden (SQLite-backed).

pub mod store;

pub use store::{ClearConfirmation, FlaggedEntry, FlaggedStore};
