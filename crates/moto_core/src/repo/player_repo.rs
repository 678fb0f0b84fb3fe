//! Player store and cached player repository.
//!
//! # Responsibility
//! - Provide single-statement CRUD over the `Player` table.
//!
//! # Invariants
//! - `insert` reads the new id with `last_insert_rowid` on the inserting
//!   connection, before any other write on it.
//! - Writes call `Player::validate()` before SQL mutations.

use super::cached::CachedRepository;
use super::repository::{EntityStore, RepoError, RepoResult};
use super::ConnectionSource;
use crate::db::ConnectionProvider;
use crate::model::entity::Entity;
use crate::model::player::{Player, PlayerId};
use rusqlite::{params, OptionalExtension, Row};

const PLAYER_SELECT_SQL: &str = "SELECT Name, Id, Code, Team FROM Player";

/// Cached repository over the `Player` table.
pub type SqlitePlayerRepository<'a> = CachedRepository<PlayerId, Player, SqlitePlayerStore<'a>>;

impl<'a> CachedRepository<PlayerId, Player, SqlitePlayerStore<'a>> {
    /// Constructs the repository and loads every player into memory.
    pub fn open(
        provider: &'a dyn ConnectionProvider,
        connection_string: &'a str,
    ) -> RepoResult<Self> {
        Self::try_new(SqlitePlayerStore::new(provider, connection_string))
    }
}

/// SQLite-backed player store.
pub struct SqlitePlayerStore<'a> {
    source: ConnectionSource<'a>,
}

impl<'a> SqlitePlayerStore<'a> {
    pub fn new(provider: &'a dyn ConnectionProvider, connection_string: &'a str) -> Self {
        Self {
            source: ConnectionSource::new(provider, connection_string),
        }
    }
}

impl EntityStore<PlayerId, Player> for SqlitePlayerStore<'_> {
    fn entity_name(&self) -> &'static str {
        "player"
    }

    fn load_all(&self) -> RepoResult<Vec<Player>> {
        let conn = self.source.acquire()?;
        let mut stmt = conn.prepare(&format!("{PLAYER_SELECT_SQL} ORDER BY Id;"))?;
        let players = stmt
            .query_map([], parse_player_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(players)
    }

    fn fetch_one(&self, id: PlayerId) -> RepoResult<Option<Player>> {
        let conn = self.source.acquire()?;
        let player = conn
            .query_row(
                &format!("{PLAYER_SELECT_SQL} WHERE Id = ?1;"),
                [id],
                parse_player_row,
            )
            .optional()?;
        Ok(player)
    }

    fn insert(&self, mut entity: Player) -> RepoResult<Player> {
        entity.validate()?;

        let conn = self.source.acquire()?;
        conn.execute(
            "INSERT INTO Player (Name, Code, Team) VALUES (?1, ?2, ?3);",
            params![entity.name.as_str(), entity.code.as_str(), entity.team],
        )?;
        entity.set_id(conn.last_insert_rowid());
        Ok(entity)
    }

    fn update(&self, entity: Player) -> RepoResult<Player> {
        entity.validate()?;

        let conn = self.source.acquire()?;
        let changed = conn.execute(
            "UPDATE Player SET Name = ?1, Code = ?2, Team = ?3 WHERE Id = ?4;",
            params![
                entity.name.as_str(),
                entity.code.as_str(),
                entity.team,
                entity.id
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(entity.id));
        }
        Ok(entity)
    }

    fn remove(&self, id: PlayerId) -> RepoResult<()> {
        let conn = self.source.acquire()?;
        conn.execute("DELETE FROM Player WHERE Id = ?1;", [id])?;
        Ok(())
    }
}

fn parse_player_row(row: &Row<'_>) -> rusqlite::Result<Player> {
    Ok(Player {
        id: row.get("Id")?,
        name: row.get("Name")?,
        code: row.get("Code")?,
        team: row.get("Team")?,
    })
}
