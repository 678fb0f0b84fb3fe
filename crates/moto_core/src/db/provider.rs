//! SQLite connection provider.
//!
//! # Responsibility
//! - Resolve a connection string to a database file.
//! - Open and configure one connection per `acquire` call.
//!
//! # Invariants
//! - Returned connections have `foreign_keys=ON`.
//! - Returned connections wait up to `BUSY_TIMEOUT` on a locked database.

use super::{ConnectionProvider, DbError, DbResult};
use log::{debug, error};
use rusqlite::Connection;
use std::time::{Duration, Instant};

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);
const DATA_SOURCE_KEY: &str = "data source";

/// Opens file-backed SQLite connections.
///
/// Accepts either a bare path (`moto.db`) or an ADO-style string
/// (`Data Source=moto.db;Version=3`). Other keys are ignored.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqliteConnectionProvider;

impl SqliteConnectionProvider {
    pub fn new() -> Self {
        Self
    }
}

impl ConnectionProvider for SqliteConnectionProvider {
    fn acquire(&self, connection_string: &str) -> DbResult<Connection> {
        let started_at = Instant::now();
        let path = parse_data_source(connection_string)?;

        let conn = match Connection::open(path) {
            Ok(conn) => conn,
            Err(err) => {
                error!(
                    "event=db_acquire module=db status=error duration_ms={} error_code=db_open_failed error={}",
                    started_at.elapsed().as_millis(),
                    err
                );
                return Err(err.into());
            }
        };

        if let Err(err) = configure_connection(&conn) {
            error!(
                "event=db_acquire module=db status=error duration_ms={} error_code=db_configure_failed error={}",
                started_at.elapsed().as_millis(),
                err
            );
            return Err(err);
        }

        debug!(
            "event=db_acquire module=db status=ok duration_ms={}",
            started_at.elapsed().as_millis()
        );
        Ok(conn)
    }
}

/// Extracts the database path from a connection string.
///
/// # Errors
/// - Returns `DbError::InvalidConnectionString` when no path can be found.
pub fn parse_data_source(connection_string: &str) -> DbResult<&str> {
    let trimmed = connection_string.trim();
    if !trimmed.contains('=') {
        if trimmed.is_empty() {
            return Err(DbError::InvalidConnectionString(
                connection_string.to_string(),
            ));
        }
        return Ok(trimmed);
    }

    trimmed
        .split(';')
        .filter_map(|pair| pair.split_once('='))
        .find(|(key, _)| key.trim().eq_ignore_ascii_case(DATA_SOURCE_KEY))
        .map(|(_, value)| value.trim())
        .filter(|value| !value.is_empty())
        .ok_or_else(|| DbError::InvalidConnectionString(connection_string.to_string()))
}

fn configure_connection(conn: &Connection) -> DbResult<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(BUSY_TIMEOUT)?;
    Ok(())
}
