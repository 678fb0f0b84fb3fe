//! Write-through cached repository base.
//!
//! # Responsibility
//! - Populate an in-memory identifier map from the store at construction.
//! - Serve `find_one` from the map when possible and `find_all` from the map
//!   only.
//! - Mirror every successful store write into the map.
//!
//! # Invariants
//! - The map is mutated only after the matching store hook returned `Ok`.
//! - A cache miss populates the map only when the store found the row.
//! - The map is local to one repository instance and never evicted.

use super::repository::{EntityStore, RepoResult, Repository};
use crate::model::entity::Entity;
use log::{debug, error, info};
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt::Display;
use std::hash::Hash;

/// Repository that keeps a full copy of its table in memory.
///
/// Access is single-threaded; the map sits in a `RefCell` so reads that
/// populate it on a miss can take `&self`.
pub struct CachedRepository<Id, E, S> {
    store: S,
    cache: RefCell<HashMap<Id, E>>,
}

impl<Id, E, S> CachedRepository<Id, E, S>
where
    Id: Copy + Eq + Hash + Display,
    E: Entity<Id> + Clone,
    S: EntityStore<Id, E>,
{
    /// Builds the repository and runs the initial load.
    ///
    /// # Errors
    /// - Returns the store error when the initial scan fails.
    pub fn try_new(store: S) -> RepoResult<Self> {
        let repo = Self {
            store,
            cache: RefCell::new(HashMap::new()),
        };
        repo.reload()?;
        Ok(repo)
    }

    /// Replaces the cache with a fresh full scan of the store.
    ///
    /// The previous cache is kept when the scan fails. Returns the number of
    /// records loaded.
    pub fn reload(&self) -> RepoResult<usize> {
        let entity = self.store.entity_name();
        let rows = match self.store.load_all() {
            Ok(rows) => rows,
            Err(err) => {
                error!("event=cache_load module=repo entity={entity} status=error error={err}");
                return Err(err);
            }
        };

        let fresh: HashMap<Id, E> = rows.into_iter().map(|row| (row.id(), row)).collect();
        let count = fresh.len();
        *self.cache.borrow_mut() = fresh;
        info!("event=cache_load module=repo entity={entity} status=ok count={count}");
        Ok(count)
    }

    /// Returns whether `id` is currently held in memory.
    pub fn is_cached(&self, id: Id) -> bool {
        self.cache.borrow().contains_key(&id)
    }

    pub fn cached_len(&self) -> usize {
        self.cache.borrow().len()
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

impl<Id, E, S> Repository<Id, E> for CachedRepository<Id, E, S>
where
    Id: Copy + Eq + Hash + Display,
    E: Entity<Id> + Clone,
    S: EntityStore<Id, E>,
{
    fn find_one(&self, id: Id) -> RepoResult<Option<E>> {
        let entity = self.store.entity_name();
        let cached = self.cache.borrow().get(&id).cloned();
        if cached.is_some() {
            debug!("event=find_one module=repo entity={entity} status=hit id={id}");
            return Ok(cached);
        }

        match self.store.fetch_one(id)? {
            Some(found) => {
                debug!("event=find_one module=repo entity={entity} status=miss_loaded id={id}");
                self.cache.borrow_mut().insert(id, found.clone());
                Ok(Some(found))
            }
            None => {
                debug!("event=find_one module=repo entity={entity} status=absent id={id}");
                Ok(None)
            }
        }
    }

    fn find_all(&self) -> HashMap<Id, E> {
        self.cache.borrow().clone()
    }

    fn save(&self, entity: E) -> RepoResult<E> {
        let name = self.store.entity_name();
        let saved = match self.store.insert(entity) {
            Ok(saved) => saved,
            Err(err) => {
                error!("event=save module=repo entity={name} status=error error={err}");
                return Err(err);
            }
        };

        let id = saved.id();
        self.cache.borrow_mut().insert(id, saved.clone());
        info!("event=save module=repo entity={name} status=ok id={id}");
        Ok(saved)
    }

    fn update(&self, entity: E) -> RepoResult<E> {
        let name = self.store.entity_name();
        let id = entity.id();
        let updated = match self.store.update(entity) {
            Ok(updated) => updated,
            Err(err) => {
                error!("event=update module=repo entity={name} status=error id={id} error={err}");
                return Err(err);
            }
        };

        self.cache.borrow_mut().insert(id, updated.clone());
        info!("event=update module=repo entity={name} status=ok id={id}");
        Ok(updated)
    }

    fn delete(&self, id: Id) -> RepoResult<Option<E>> {
        let name = self.store.entity_name();
        let cached = self.cache.borrow().get(&id).cloned();
        let existing = match cached {
            Some(existing) => Some(existing),
            None => self.store.fetch_one(id)?,
        };
        let Some(existing) = existing else {
            info!("event=delete module=repo entity={name} status=absent id={id}");
            return Ok(None);
        };

        if let Err(err) = self.store.remove(id) {
            error!("event=delete module=repo entity={name} status=error id={id} error={err}");
            return Err(err);
        }

        self.cache.borrow_mut().remove(&id);
        info!("event=delete module=repo entity={name} status=ok id={id}");
        Ok(Some(existing))
    }
}

#[cfg(test)]
mod tests {
    use super::CachedRepository;
    use crate::db::DbError;
    use crate::model::team::{Team, TeamId};
    use crate::repo::repository::{EntityStore, RepoError, RepoResult, Repository};
    use std::cell::{Cell, RefCell};
    use std::collections::BTreeMap;

    /// In-memory store that counts lookups and can be switched to fail.
    #[derive(Default)]
    struct FakeStore {
        rows: RefCell<BTreeMap<TeamId, Team>>,
        next_id: Cell<TeamId>,
        fetches: Cell<usize>,
        failing: Cell<bool>,
        failing_remove: Cell<bool>,
    }

    impl FakeStore {
        fn with_rows(names: &[&str]) -> Self {
            let store = Self::default();
            for name in names {
                store.put(Team::new(*name));
            }
            store
        }

        fn put(&self, mut team: Team) -> Team {
            self.next_id.set(self.next_id.get() + 1);
            team.id = self.next_id.get();
            self.rows.borrow_mut().insert(team.id, team.clone());
            team
        }

        fn check(&self) -> RepoResult<()> {
            if self.failing.get() {
                return Err(RepoError::Db(DbError::InvalidConnectionString(
                    "offline".to_string(),
                )));
            }
            Ok(())
        }
    }

    impl EntityStore<TeamId, Team> for FakeStore {
        fn entity_name(&self) -> &'static str {
            "team"
        }

        fn load_all(&self) -> RepoResult<Vec<Team>> {
            self.check()?;
            Ok(self.rows.borrow().values().cloned().collect())
        }

        fn fetch_one(&self, id: TeamId) -> RepoResult<Option<Team>> {
            self.check()?;
            self.fetches.set(self.fetches.get() + 1);
            Ok(self.rows.borrow().get(&id).cloned())
        }

        fn insert(&self, entity: Team) -> RepoResult<Team> {
            self.check()?;
            Ok(self.put(entity))
        }

        fn update(&self, entity: Team) -> RepoResult<Team> {
            self.check()?;
            let mut rows = self.rows.borrow_mut();
            match rows.get_mut(&entity.id) {
                Some(row) => {
                    *row = entity.clone();
                    Ok(entity)
                }
                None => Err(RepoError::NotFound(entity.id)),
            }
        }

        fn remove(&self, id: TeamId) -> RepoResult<()> {
            self.check()?;
            if self.failing_remove.get() {
                return Err(RepoError::Db(DbError::InvalidConnectionString(
                    "read-only".to_string(),
                )));
            }
            self.rows.borrow_mut().remove(&id);
            Ok(())
        }
    }

    #[test]
    fn construction_loads_every_row() {
        let repo = CachedRepository::try_new(FakeStore::with_rows(&["McLaren", "Ferrari"])).unwrap();
        assert_eq!(repo.cached_len(), 2);
        assert_eq!(repo.find_all()[&2].name, "Ferrari");
    }

    #[test]
    fn construction_fails_when_load_fails() {
        let store = FakeStore::with_rows(&["McLaren"]);
        store.failing.set(true);
        assert!(CachedRepository::try_new(store).is_err());
    }

    #[test]
    fn cache_hit_does_not_touch_store() {
        let repo = CachedRepository::try_new(FakeStore::with_rows(&["McLaren"])).unwrap();

        let found = repo.find_one(1).unwrap().unwrap();
        assert_eq!(found.name, "McLaren");
        assert_eq!(repo.store().fetches.get(), 0);
    }

    #[test]
    fn cache_miss_populates_only_on_store_hit() {
        let repo = CachedRepository::try_new(FakeStore::default()).unwrap();
        let written_behind = repo.store().put(Team::new("Williams"));

        assert!(repo.find_one(99).unwrap().is_none());
        assert!(!repo.is_cached(99));

        let found = repo.find_one(written_behind.id).unwrap().unwrap();
        assert_eq!(found, written_behind);
        assert!(repo.is_cached(written_behind.id));
        assert_eq!(repo.store().fetches.get(), 2);

        repo.find_one(written_behind.id).unwrap();
        assert_eq!(repo.store().fetches.get(), 2);
    }

    #[test]
    fn failed_writes_leave_cache_unchanged() {
        let repo = CachedRepository::try_new(FakeStore::with_rows(&["McLaren"])).unwrap();
        let before = repo.find_all();
        repo.store().failing.set(true);

        assert!(repo.save(Team::new("Alpine")).is_err());
        let mut renamed = before[&1].clone();
        renamed.name = "Renamed".to_string();
        assert!(repo.update(renamed).is_err());
        assert!(repo.delete(1).is_err());

        assert_eq!(repo.find_all(), before);
    }

    #[test]
    fn failed_delete_keeps_record_cached() {
        let repo = CachedRepository::try_new(FakeStore::with_rows(&["McLaren"])).unwrap();
        repo.store().failing.set(true);

        assert!(repo.delete(1).is_err());
        assert!(repo.is_cached(1));
    }

    #[test]
    fn failed_delete_of_uncached_row_does_not_populate_cache() {
        let repo = CachedRepository::try_new(FakeStore::default()).unwrap();
        let written_behind = repo.store().put(Team::new("Haas"));
        repo.store().failing_remove.set(true);

        assert!(repo.delete(written_behind.id).is_err());
        assert!(!repo.is_cached(written_behind.id));
        assert_eq!(repo.cached_len(), 0);

        repo.store().failing_remove.set(false);
        let removed = repo.delete(written_behind.id).unwrap();
        assert_eq!(removed, Some(written_behind));
        assert_eq!(repo.cached_len(), 0);
    }

    #[test]
    fn writes_are_mirrored_into_cache() {
        let repo = CachedRepository::try_new(FakeStore::default()).unwrap();

        let saved = repo.save(Team::new("Alpine")).unwrap();
        assert!(repo.is_cached(saved.id));

        let mut renamed = saved.clone();
        renamed.name = "Alpine F1".to_string();
        repo.update(renamed).unwrap();
        assert_eq!(repo.find_all()[&saved.id].name, "Alpine F1");

        let removed = repo.delete(saved.id).unwrap().unwrap();
        assert_eq!(removed.name, "Alpine F1");
        assert!(!repo.is_cached(saved.id));
        assert!(repo.delete(saved.id).unwrap().is_none());
    }

    #[test]
    fn reload_keeps_previous_cache_on_failure() {
        let repo = CachedRepository::try_new(FakeStore::with_rows(&["McLaren"])).unwrap();
        repo.store().put(Team::new("Ferrari"));

        repo.store().failing.set(true);
        assert!(repo.reload().is_err());
        assert_eq!(repo.cached_len(), 1);

        repo.store().failing.set(false);
        assert_eq!(repo.reload().unwrap(), 2);
    }
}
