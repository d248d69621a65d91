//! Undervalued Music Server Library
//!
//! Ranks community submitted music by how undervalued it is, from two user
//! signals: whether people had heard a piece before, and how they rate it.

pub mod config;
pub mod interaction;
pub mod music;
pub mod ranking;
pub mod server;
pub mod sqlite_persistence;
pub mod store;
pub mod user;

#[cfg(test)]
mod test_fakes;

pub use server::{run_server, RequestsLoggingLevel};
pub use sqlite_persistence::SqliteStore;
pub use store::Store;
