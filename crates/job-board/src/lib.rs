//! Job board service: postings, search, applications, bookmarks, accounts,
//! and a read-only REST layer, persisted in SQLite.

pub mod board;
pub mod config;
pub mod error;
pub mod setup;
pub mod storage;
pub mod telemetry;
