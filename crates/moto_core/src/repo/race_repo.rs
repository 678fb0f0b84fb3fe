//! Race store with `PlayerRaces` association management.
//!
//! # Responsibility
//! - Persist the race row and its `PlayerRaces` rows as one unit.
//! - Resolve associated player ids to full records through the player
//!   repository.
//!
//! # Invariants
//! - `insert`, `update` and `remove` each run in a single transaction; a
//!   failure at any step rolls back every statement of that call.
//! - `update` replaces the whole association set (delete all, re-insert).
//! - Association inserts ignore an already-present `(PlayerId, RaceId)` pair
//!   and fail with `MissingReference` when the player row does not exist.
//! - Written races carry the player records as resolved through the player
//!   repository, never the caller's copies.
//! - Loaded races carry `no_players` equal to the number of resolved players;
//!   ids that no longer resolve to a player are skipped.

use super::cached::CachedRepository;
use super::repository::{EntityStore, RepoError, RepoResult, Repository};
use super::ConnectionSource;
use crate::db::ConnectionProvider;
use crate::model::player::{Player, PlayerId};
use crate::model::race::{Race, RaceId};
use log::{error, warn};
use rusqlite::{params, Connection, OptionalExtension, Transaction, TransactionBehavior};
use std::collections::BTreeMap;

/// Cached repository over `Race` and `PlayerRaces`.
pub type SqliteRaceRepository<'a> = CachedRepository<RaceId, Race, SqliteRaceStore<'a>>;

impl<'a> CachedRepository<RaceId, Race, SqliteRaceStore<'a>> {
    /// Constructs the repository and loads every race, with its players,
    /// into memory.
    pub fn open(
        provider: &'a dyn ConnectionProvider,
        connection_string: &'a str,
        players: &'a dyn Repository<PlayerId, Player>,
    ) -> RepoResult<Self> {
        Self::try_new(SqliteRaceStore::new(provider, connection_string, players))
    }
}

/// SQLite-backed race store.
pub struct SqliteRaceStore<'a> {
    source: ConnectionSource<'a>,
    players: &'a dyn Repository<PlayerId, Player>,
}

impl<'a> SqliteRaceStore<'a> {
    pub fn new(
        provider: &'a dyn ConnectionProvider,
        connection_string: &'a str,
        players: &'a dyn Repository<PlayerId, Player>,
    ) -> Self {
        Self {
            source: ConnectionSource::new(provider, connection_string),
            players,
        }
    }

    fn hydrate(&self, conn: &Connection, id: RaceId, engine_type: i64) -> RepoResult<Race> {
        let mut race = Race::new(engine_type);
        race.id = id;
        race.players = self.resolve_players(id, load_player_ids(conn, id)?)?;
        race.sync_player_count();
        Ok(race)
    }

    /// Resolves every attached id through the player repository, failing on
    /// the first id with no player.
    fn resolve_for_write(&self, race: &Race) -> RepoResult<BTreeMap<PlayerId, Player>> {
        let mut players = BTreeMap::new();
        for player_id in race.player_ids() {
            let player = self
                .players
                .find_one(player_id)?
                .ok_or(RepoError::MissingReference {
                    entity: "player",
                    id: player_id,
                })?;
            players.insert(player_id, player);
        }
        Ok(players)
    }

    fn resolve_players(
        &self,
        race_id: RaceId,
        player_ids: Vec<PlayerId>,
    ) -> RepoResult<BTreeMap<PlayerId, Player>> {
        let mut players = BTreeMap::new();
        for player_id in player_ids {
            match self.players.find_one(player_id)? {
                Some(player) => {
                    players.insert(player_id, player);
                }
                None => warn!(
                    "event=race_resolve module=repo status=dangling race_id={race_id} player_id={player_id}"
                ),
            }
        }
        Ok(players)
    }
}

impl EntityStore<RaceId, Race> for SqliteRaceStore<'_> {
    fn entity_name(&self) -> &'static str {
        "race"
    }

    fn load_all(&self) -> RepoResult<Vec<Race>> {
        let conn = self.source.acquire()?;
        let mut stmt = conn.prepare("SELECT Id, EngineType FROM Race ORDER BY Id;")?;
        let rows = stmt
            .query_map([], |row| Ok((row.get::<_, RaceId>(0)?, row.get::<_, i64>(1)?)))?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(id, engine_type)| self.hydrate(&conn, id, engine_type))
            .collect()
    }

    fn fetch_one(&self, id: RaceId) -> RepoResult<Option<Race>> {
        let conn = self.source.acquire()?;
        let engine_type = conn
            .query_row(
                "SELECT EngineType FROM Race WHERE Id = ?1;",
                [id],
                |row| row.get::<_, i64>(0),
            )
            .optional()?;

        match engine_type {
            Some(engine_type) => Ok(Some(self.hydrate(&conn, id, engine_type)?)),
            None => Ok(None),
        }
    }

    fn insert(&self, mut entity: Race) -> RepoResult<Race> {
        entity.players = self.resolve_for_write(&entity)?;
        entity.sync_player_count();

        let mut conn = self.source.acquire()?;
        match insert_race(&mut conn, &entity) {
            Ok(race_id) => {
                entity.id = race_id;
                Ok(entity)
            }
            Err(err) => {
                error!("event=race_save module=repo status=rolled_back error={err}");
                Err(err)
            }
        }
    }

    fn update(&self, mut entity: Race) -> RepoResult<Race> {
        entity.players = self.resolve_for_write(&entity)?;
        entity.sync_player_count();

        let mut conn = self.source.acquire()?;
        match update_race(&mut conn, &entity) {
            Ok(()) => Ok(entity),
            Err(err) => {
                error!(
                    "event=race_update module=repo status=rolled_back id={} error={err}",
                    entity.id
                );
                Err(err)
            }
        }
    }

    fn remove(&self, id: RaceId) -> RepoResult<()> {
        let mut conn = self.source.acquire()?;
        let result = delete_race(&mut conn, id);
        if let Err(err) = &result {
            error!("event=race_delete module=repo status=rolled_back id={id} error={err}");
        }
        result
    }
}

// The transaction helpers below return early on the first failing statement;
// dropping the uncommitted `Transaction` rolls everything back.

fn insert_race(conn: &mut Connection, race: &Race) -> RepoResult<RaceId> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    tx.execute(
        "INSERT INTO Race (EngineType, NoPlayers) VALUES (?1, ?2);",
        params![race.engine_type, race.player_count()],
    )?;
    let race_id = tx.last_insert_rowid();
    insert_player_links(&tx, race_id, race.player_ids())?;
    tx.commit()?;
    Ok(race_id)
}

fn update_race(conn: &mut Connection, race: &Race) -> RepoResult<()> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    let changed = tx.execute(
        "UPDATE Race SET EngineType = ?1, NoPlayers = ?2 WHERE Id = ?3;",
        params![race.engine_type, race.player_count(), race.id],
    )?;
    if changed == 0 {
        return Err(RepoError::NotFound(race.id));
    }

    tx.execute("DELETE FROM PlayerRaces WHERE RaceId = ?1;", [race.id])?;
    insert_player_links(&tx, race.id, race.player_ids())?;
    tx.commit()?;
    Ok(())
}

fn delete_race(conn: &mut Connection, id: RaceId) -> RepoResult<()> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    tx.execute("DELETE FROM PlayerRaces WHERE RaceId = ?1;", [id])?;
    tx.execute("DELETE FROM Race WHERE Id = ?1;", [id])?;
    tx.commit()?;
    Ok(())
}

fn load_player_ids(conn: &Connection, race_id: RaceId) -> RepoResult<Vec<PlayerId>> {
    let mut stmt =
        conn.prepare_cached("SELECT PlayerId FROM PlayerRaces WHERE RaceId = ?1 ORDER BY PlayerId;")?;
    let ids = stmt
        .query_map([race_id], |row| row.get::<_, PlayerId>(0))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(ids)
}

/// Inserts one association row per player id, skipping pairs that already
/// exist. Returns the number of rows actually written.
fn insert_player_links(
    tx: &Transaction<'_>,
    race_id: RaceId,
    player_ids: impl IntoIterator<Item = PlayerId>,
) -> RepoResult<usize> {
    let mut exists = tx.prepare_cached("SELECT 1 FROM Player WHERE Id = ?1;")?;
    let mut insert =
        tx.prepare_cached("INSERT OR IGNORE INTO PlayerRaces (PlayerId, RaceId) VALUES (?1, ?2);")?;
    let mut written = 0;
    for player_id in player_ids {
        if !exists.exists([player_id])? {
            return Err(RepoError::MissingReference {
                entity: "player",
                id: player_id,
            });
        }
        written += insert.execute(params![player_id, race_id])?;
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::insert_player_links;
    use crate::db::SCHEMA_SQL;
    use crate::repo::repository::RepoError;
    use rusqlite::Connection;

    fn setup() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("PRAGMA foreign_keys = ON;").unwrap();
        conn.execute_batch(SCHEMA_SQL).unwrap();
        conn.execute(
            "INSERT INTO Player (Name, Id, Code, Team) VALUES ('Norris', 1, '111', 3);",
            [],
        )
        .unwrap();
        conn.execute("INSERT INTO Race (Id, EngineType) VALUES (10, 2);", [])
            .unwrap();
        conn
    }

    fn link_count(conn: &Connection) -> i64 {
        conn.query_row("SELECT COUNT(*) FROM PlayerRaces;", [], |row| row.get(0))
            .unwrap()
    }

    #[test]
    fn duplicate_pairs_are_ignored() {
        let mut conn = setup();

        let tx = conn.transaction().unwrap();
        let written = insert_player_links(&tx, 10, [1, 1]).unwrap();
        assert_eq!(written, 1);
        assert_eq!(insert_player_links(&tx, 10, [1]).unwrap(), 0);
        tx.commit().unwrap();

        assert_eq!(link_count(&conn), 1);
    }

    #[test]
    fn unknown_player_fails_and_rolls_back_with_transaction() {
        let mut conn = setup();

        {
            let tx = conn.transaction().unwrap();
            insert_player_links(&tx, 10, [1]).unwrap();
            let err = insert_player_links(&tx, 10, [404]).unwrap_err();
            assert!(matches!(
                err,
                RepoError::MissingReference {
                    entity: "player",
                    id: 404
                }
            ));
        }

        assert_eq!(link_count(&conn), 0);
    }
}
