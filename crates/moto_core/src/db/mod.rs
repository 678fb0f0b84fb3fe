//! SQLite connection acquisition and schema bootstrap.
//!
//! # Responsibility
//! - Hand out configured SQLite connections for a caller-supplied
//!   connection string.
//! - Create the tables the repositories expect.
//!
//! # Invariants
//! - Every acquired connection has `foreign_keys=ON`.
//! - A connection is owned by the operation that acquired it and is closed
//!   when that operation returns, on every exit path.

use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};

mod provider;
mod schema;

pub use provider::{parse_data_source, SqliteConnectionProvider};
pub use schema::{ensure_schema, REQUIRED_TABLES};
pub(crate) use schema::SCHEMA_SQL;

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    InvalidConnectionString(String),
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::InvalidConnectionString(value) => {
                write!(f, "invalid connection string `{value}`")
            }
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::InvalidConnectionString(_) => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

/// Source of database connections.
///
/// Repositories never open connections themselves; they are handed a
/// provider and an opaque connection string by their caller and acquire a
/// fresh connection for each operation.
pub trait ConnectionProvider {
    /// Opens and configures a connection for `connection_string`.
    fn acquire(&self, connection_string: &str) -> DbResult<Connection>;
}
