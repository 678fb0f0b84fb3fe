//! Persistence layer for motorsport race records.
//! Cached SQLite repositories for players, teams, users and races, with
//! transactional race/player association management.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;

pub use db::{ensure_schema, ConnectionProvider, DbError, DbResult, SqliteConnectionProvider};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::entity::{Entity, UNASSIGNED_ID};
pub use model::player::{Player, PlayerId};
pub use model::race::{Race, RaceId};
pub use model::team::{Team, TeamId};
pub use model::user::{User, UserId};
pub use model::ValidationError;
pub use repo::cached::CachedRepository;
pub use repo::player_repo::{SqlitePlayerRepository, SqlitePlayerStore};
pub use repo::race_repo::{SqliteRaceRepository, SqliteRaceStore};
pub use repo::repository::{EntityStore, RepoError, RepoResult, Repository};
pub use repo::team_repo::{SqliteTeamRepository, SqliteTeamStore};
pub use repo::user_repo::{SqliteUserRepository, SqliteUserStore, UserRepository};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
