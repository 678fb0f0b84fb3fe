//! User store and cached user repository.
//!
//! # Invariants
//! - `find_by_username` always reads the store; it neither consults nor
//!   populates the cache.
//! - Passwords are never written to logs.

use super::cached::CachedRepository;
use super::repository::{EntityStore, RepoError, RepoResult, Repository};
use super::ConnectionSource;
use crate::db::ConnectionProvider;
use crate::model::entity::Entity;
use crate::model::user::{User, UserId};
use log::debug;
use rusqlite::{params, OptionalExtension, Row};

const USER_SELECT_SQL: &str = "SELECT Id, Username, Password FROM User";

/// User repository contract: CRUD plus lookup by login name.
pub trait UserRepository: Repository<UserId, User> {
    /// Returns the first user whose username matches exactly.
    fn find_by_username(&self, username: &str) -> RepoResult<Option<User>>;
}

/// Cached repository over the `User` table.
pub type SqliteUserRepository<'a> = CachedRepository<UserId, User, SqliteUserStore<'a>>;

impl<'a> CachedRepository<UserId, User, SqliteUserStore<'a>> {
    /// Constructs the repository and loads every user into memory.
    pub fn open(
        provider: &'a dyn ConnectionProvider,
        connection_string: &'a str,
    ) -> RepoResult<Self> {
        Self::try_new(SqliteUserStore::new(provider, connection_string))
    }
}

impl UserRepository for CachedRepository<UserId, User, SqliteUserStore<'_>> {
    fn find_by_username(&self, username: &str) -> RepoResult<Option<User>> {
        let found = self.store().fetch_by_username(username)?;
        debug!(
            "event=find_by_username module=repo entity=user status={}",
            if found.is_some() { "ok" } else { "absent" }
        );
        Ok(found)
    }
}

/// SQLite-backed user store.
pub struct SqliteUserStore<'a> {
    source: ConnectionSource<'a>,
}

impl<'a> SqliteUserStore<'a> {
    pub fn new(provider: &'a dyn ConnectionProvider, connection_string: &'a str) -> Self {
        Self {
            source: ConnectionSource::new(provider, connection_string),
        }
    }

    fn fetch_by_username(&self, username: &str) -> RepoResult<Option<User>> {
        let conn = self.source.acquire()?;
        let user = conn
            .query_row(
                &format!("{USER_SELECT_SQL} WHERE Username = ?1 ORDER BY Id LIMIT 1;"),
                [username],
                parse_user_row,
            )
            .optional()?;
        Ok(user)
    }
}

impl EntityStore<UserId, User> for SqliteUserStore<'_> {
    fn entity_name(&self) -> &'static str {
        "user"
    }

    fn load_all(&self) -> RepoResult<Vec<User>> {
        let conn = self.source.acquire()?;
        let mut stmt = conn.prepare(&format!("{USER_SELECT_SQL} ORDER BY Id;"))?;
        let users = stmt
            .query_map([], parse_user_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(users)
    }

    fn fetch_one(&self, id: UserId) -> RepoResult<Option<User>> {
        let conn = self.source.acquire()?;
        let user = conn
            .query_row(
                &format!("{USER_SELECT_SQL} WHERE Id = ?1;"),
                [id],
                parse_user_row,
            )
            .optional()?;
        Ok(user)
    }

    fn insert(&self, mut entity: User) -> RepoResult<User> {
        entity.validate()?;

        let conn = self.source.acquire()?;
        conn.execute(
            "INSERT INTO User (Username, Password) VALUES (?1, ?2);",
            params![entity.username.as_str(), entity.password.as_str()],
        )?;
        entity.set_id(conn.last_insert_rowid());
        Ok(entity)
    }

    fn update(&self, entity: User) -> RepoResult<User> {
        entity.validate()?;

        let conn = self.source.acquire()?;
        let changed = conn.execute(
            "UPDATE User SET Username = ?1, Password = ?2 WHERE Id = ?3;",
            params![
                entity.username.as_str(),
                entity.password.as_str(),
                entity.id
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound(entity.id));
        }
        Ok(entity)
    }

    fn remove(&self, id: UserId) -> RepoResult<()> {
        let conn = self.source.acquire()?;
        conn.execute("DELETE FROM User WHERE Id = ?1;", [id])?;
        Ok(())
    }
}

fn parse_user_row(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get("Id")?,
        username: row.get("Username")?,
        password: row.get("Password")?,
    })
}
