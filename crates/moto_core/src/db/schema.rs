//! Store schema bootstrap.
//!
//! # Responsibility
//! - Create the player/team/user/race tables and the `PlayerRaces` join table.
//!
//! # Invariants
//! - Bootstrap is idempotent; existing tables and rows are left untouched.
//! - `PlayerRaces` is unique on `(PlayerId, RaceId)`.

use super::{ConnectionProvider, DbResult};
use log::{error, info};
use std::time::Instant;

pub(crate) const SCHEMA_SQL: &str = include_str!("schema.sql");

/// Tables every repository in this crate reads from or writes to.
pub const REQUIRED_TABLES: [&str; 5] = ["Player", "Team", "User", "Race", "PlayerRaces"];

/// Creates any missing tables in one transaction.
///
/// # Side effects
/// - Acquires one connection from `provider` and releases it before returning.
/// - Emits `schema_bootstrap` logging events with duration and status.
pub fn ensure_schema(provider: &dyn ConnectionProvider, connection_string: &str) -> DbResult<()> {
    let started_at = Instant::now();
    info!("event=schema_bootstrap module=db status=start");

    let result = provider.acquire(connection_string).and_then(|mut conn| {
        let tx = conn.transaction()?;
        tx.execute_batch(SCHEMA_SQL)?;
        tx.commit()?;
        Ok(())
    });

    match &result {
        Ok(()) => info!(
            "event=schema_bootstrap module=db status=ok duration_ms={}",
            started_at.elapsed().as_millis()
        ),
        Err(err) => error!(
            "event=schema_bootstrap module=db status=error duration_ms={} error={}",
            started_at.elapsed().as_millis(),
            err
        ),
    }
    result
}
