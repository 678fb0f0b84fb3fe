//! Repository layer: contract, cached base and SQLite-backed stores.
//!
//! # Responsibility
//! - Define the CRUD contract shared by every record kind.
//! - Keep SQL details inside the store implementations.
//!
//! # Invariants
//! - Writes validate their input before any SQL runs.
//! - Every store operation acquires its own connection and releases it
//!   before returning.

pub mod cached;
pub mod player_repo;
pub mod race_repo;
pub mod repository;
pub mod team_repo;
pub mod user_repo;

use crate::db::ConnectionProvider;
use repository::RepoResult;
use rusqlite::Connection;

/// Provider plus connection string, shared by the SQLite stores.
#[derive(Clone, Copy)]
pub(crate) struct ConnectionSource<'a> {
    provider: &'a dyn ConnectionProvider,
    connection_string: &'a str,
}

impl<'a> ConnectionSource<'a> {
    pub(crate) fn new(provider: &'a dyn ConnectionProvider, connection_string: &'a str) -> Self {
        Self {
            provider,
            connection_string,
        }
    }

    pub(crate) fn acquire(&self) -> RepoResult<Connection> {
        Ok(self.provider.acquire(self.connection_string)?)
    }
}
