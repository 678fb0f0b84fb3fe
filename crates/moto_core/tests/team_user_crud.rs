use moto_core::{
    ensure_schema, RepoError, Repository, SqliteConnectionProvider, SqliteTeamRepository,
    SqliteUserRepository, Team, User, UserRepository,
};
use rusqlite::Connection;

fn setup() -> (tempfile::TempDir, String) {
    let dir = tempfile::tempdir().unwrap();
    let conn_str = format!("Data Source={}", dir.path().join("moto.db").display());
    ensure_schema(&SqliteConnectionProvider::new(), &conn_str).unwrap();
    (dir, conn_str)
}

#[test]
fn team_crud_keeps_cache_in_step_with_store() {
    let (_dir, conn_str) = setup();
    let provider = SqliteConnectionProvider::new();
    let teams = SqliteTeamRepository::open(&provider, &conn_str).unwrap();

    let mut mclaren = teams.save(Team::new("McLaren")).unwrap();
    let ferrari = teams.save(Team::new("Ferrari")).unwrap();

    mclaren.name = "McLaren F1".to_string();
    teams.update(mclaren.clone()).unwrap();
    assert_eq!(teams.delete(ferrari.id).unwrap(), Some(ferrari));

    let reopened = SqliteTeamRepository::open(&provider, &conn_str).unwrap();
    assert_eq!(teams.find_all(), reopened.find_all());
    assert_eq!(reopened.find_all()[&mclaren.id].name, "McLaren F1");
}

#[test]
fn team_update_of_missing_row_is_not_found() {
    let (_dir, conn_str) = setup();
    let provider = SqliteConnectionProvider::new();
    let teams = SqliteTeamRepository::open(&provider, &conn_str).unwrap();

    let mut ghost = Team::new("Ghost");
    ghost.id = 42;
    assert!(matches!(teams.update(ghost), Err(RepoError::NotFound(42))));
}

#[test]
fn find_by_username_reads_store_without_caching() {
    let (dir, conn_str) = setup();
    let provider = SqliteConnectionProvider::new();
    let users = SqliteUserRepository::open(&provider, &conn_str).unwrap();

    let admin = users.save(User::new("admin", "secret")).unwrap();
    assert_eq!(users.find_by_username("admin").unwrap(), Some(admin.clone()));
    assert!(users.find_by_username("nobody").unwrap().is_none());

    let raw = Connection::open(dir.path().join("moto.db")).unwrap();
    raw.execute(
        "INSERT INTO User (Id, Username, Password) VALUES (50, 'guest', 'pw');",
        [],
    )
    .unwrap();

    let guest = users.find_by_username("guest").unwrap().unwrap();
    assert_eq!(guest.id, 50);
    assert!(!users.is_cached(50));
}

#[test]
fn user_crud_roundtrip() {
    let (_dir, conn_str) = setup();
    let provider = SqliteConnectionProvider::new();
    let users = SqliteUserRepository::open(&provider, &conn_str).unwrap();

    let mut user = users.save(User::new("admin", "secret")).unwrap();
    user.password = "rotated".to_string();
    users.update(user.clone()).unwrap();

    let found = users.find_by_username("admin").unwrap().unwrap();
    assert_eq!(found.password, "rotated");

    assert_eq!(users.delete(user.id).unwrap(), Some(user));
    assert!(users.find_by_username("admin").unwrap().is_none());
    assert!(users.find_all().is_empty());
}
