//! Repository contract, store hooks and repository errors.
//!
//! # Responsibility
//! - Define the uniform `find_one/find_all/save/update/delete` contract.
//! - Define the store-side hooks a cached repository delegates to.
//!
//! # Invariants
//! - Absence is `Ok(None)`; errors are reserved for failures.
//! - A store hook that returns `Err` has not applied any of its effect.

use crate::db::DbError;
use crate::model::ValidationError;
use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// Error for repository reads and writes.
#[derive(Debug)]
pub enum RepoError {
    /// Record input was rejected before reaching the store.
    Validation(ValidationError),
    /// The store could not execute a statement.
    Db(DbError),
    /// `update` targeted an identifier with no row.
    NotFound(i64),
    /// A record refers to another record that is not stored.
    MissingReference { entity: &'static str, id: i64 },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "record not found: {id}"),
            Self::MissingReference { entity, id } => write!(f, "unknown {entity} reference: {id}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::NotFound(_) | Self::MissingReference { .. } => None,
        }
    }
}

impl From<ValidationError> for RepoError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Uniform CRUD contract implemented by every repository.
pub trait Repository<Id, E> {
    /// Looks up one record by identifier.
    fn find_one(&self, id: Id) -> RepoResult<Option<E>>;
    /// Returns every known record keyed by identifier.
    fn find_all(&self) -> HashMap<Id, E>;
    /// Persists a new record and returns it with its assigned identifier.
    fn save(&self, entity: E) -> RepoResult<E>;
    /// Persists changes to the record identified by `entity`'s id.
    fn update(&self, entity: E) -> RepoResult<E>;
    /// Removes a record, returning it as it was before removal.
    fn delete(&self, id: Id) -> RepoResult<Option<E>>;
}

/// Store-side operations behind a cached repository.
///
/// Implementations talk to the database only; the cache is owned and
/// maintained by `CachedRepository`. Multi-statement hooks must be atomic.
pub trait EntityStore<Id, E> {
    /// Short name used in log events.
    fn entity_name(&self) -> &'static str;
    /// Full scan used to populate the cache.
    fn load_all(&self) -> RepoResult<Vec<E>>;
    /// Single-row lookup used on a cache miss.
    fn fetch_one(&self, id: Id) -> RepoResult<Option<E>>;
    /// Inserts `entity` and returns it carrying the store-assigned id.
    fn insert(&self, entity: E) -> RepoResult<E>;
    /// Rewrites the stored row for `entity`.
    fn update(&self, entity: E) -> RepoResult<E>;
    /// Removes the row for `id`.
    fn remove(&self, id: Id) -> RepoResult<()>;
}
