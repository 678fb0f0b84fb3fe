//! Team store and cached team repository.

use super::cached::CachedRepository;
use super::repository::{EntityStore, RepoError, RepoResult};
use super::ConnectionSource;
use crate::db::ConnectionProvider;
use crate::model::entity::Entity;
use crate::model::team::{Team, TeamId};
use rusqlite::{params, OptionalExtension, Row};

/// Cached repository over the `Team` table.
pub type SqliteTeamRepository<'a> = CachedRepository<TeamId, Team, SqliteTeamStore<'a>>;

impl<'a> CachedRepository<TeamId, Team, SqliteTeamStore<'a>> {
    /// Constructs the repository and loads every team into memory.
    pub fn open(
        provider: &'a dyn ConnectionProvider,
        connection_string: &'a str,
    ) -> RepoResult<Self> {
        Self::try_new(SqliteTeamStore::new(provider, connection_string))
    }
}

/// SQLite-backed team store.
pub struct SqliteTeamStore<'a> {
    source: ConnectionSource<'a>,
}

impl<'a> SqliteTeamStore<'a> {
    pub fn new(provider: &'a dyn ConnectionProvider, connection_string: &'a str) -> Self {
        Self {
            source: ConnectionSource::new(provider, connection_string),
        }
    }
}

impl EntityStore<TeamId, Team> for SqliteTeamStore<'_> {
    fn entity_name(&self) -> &'static str {
        "team"
    }

    fn load_all(&self) -> RepoResult<Vec<Team>> {
        let conn = self.source.acquire()?;
        let mut stmt = conn.prepare("SELECT Name, Id FROM Team ORDER BY Id;")?;
        let teams = stmt
            .query_map([], parse_team_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(teams)
    }

    fn fetch_one(&self, id: TeamId) -> RepoResult<Option<Team>> {
        let conn = self.source.acquire()?;
        let team = conn
            .query_row(
                "SELECT Name, Id FROM Team WHERE Id = ?1;",
                [id],
                parse_team_row,
            )
            .optional()?;
        Ok(team)
    }

    fn insert(&self, mut entity: Team) -> RepoResult<Team> {
        entity.validate()?;

        let conn = self.source.acquire()?;
        conn.execute("INSERT INTO Team (Name) VALUES (?1);", [entity.name.as_str()])?;
        entity.set_id(conn.last_insert_rowid());
        Ok(entity)
    }

    fn update(&self, entity: Team) -> RepoResult<Team> {
        entity.validate()?;

        let conn = self.source.acquire()?;
        let changed = conn.execute(
            "UPDATE Team SET Name = ?1 WHERE Id = ?2;",
            params![entity.name.as_str(), entity.id],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound(entity.id));
        }
        Ok(entity)
    }

    fn remove(&self, id: TeamId) -> RepoResult<()> {
        let conn = self.source.acquire()?;
        conn.execute("DELETE FROM Team WHERE Id = ?1;", [id])?;
        Ok(())
    }
}

fn parse_team_row(row: &Row<'_>) -> rusqlite::Result<Team> {
    Ok(Team {
        id: row.get("Id")?,
        name: row.get("Name")?,
    })
}
