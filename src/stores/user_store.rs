use crate::models::user::{NewUser, User};
use crate::utils::time::current_timestamp;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use thiserror::Error;
use tracing::info;

const SCHEMA_SQL: &str = "CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name INTEGER NOT NULL,
    room INTEGER NOT NULL,
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL
);";

const USER_SELECT_SQL: &str = "SELECT id, name, room, created_at, updated_at FROM users";

pub type StoreResult<T> = Result<T, StoreError>;

/// Failures raised by the storage layer itself.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Store connection lock poisoned")]
    LockPoisoned,

    #[error("Store task did not complete: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// SQLite-backed store for user records
///
/// One connection is shared by every request; the mutex serializes access
/// to it, so conflicting writes are ordered by the store rather than by the
/// handlers.
pub struct UserStore {
    conn: Mutex<Connection>,
}

impl UserStore {
    /// Open a private in-memory database with the schema in place
    pub fn open_in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self::from_connection(conn)?;

        info!(mode = "memory", "User store opened");
        Ok(store)
    }

    /// Open (or create) a database file with the schema in place
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref();
        let conn = Connection::open(path)?;
        let store = Self::from_connection(conn)?;

        info!(mode = "file", path = %path.display(), "User store opened");
        Ok(store)
    }

    fn from_connection(conn: Connection) -> StoreResult<Self> {
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.sync()?;
        Ok(store)
    }

    /// Materialize the `users` table. Safe to call repeatedly.
    pub fn sync(&self) -> StoreResult<()> {
        self.lock()?.execute_batch(SCHEMA_SQL)?;
        Ok(())
    }

    /// Insert a user and return it with its assigned id
    ///
    /// The insert and the read-back share one transaction, so a failure
    /// leaves nothing behind.
    pub fn create(&self, new_user: NewUser) -> StoreResult<User> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        let now = current_timestamp();

        tx.execute(
            "INSERT INTO users (name, room, created_at, updated_at) VALUES (?1, ?2, ?3, ?3);",
            params![new_user.name, new_user.room, now],
        )?;
        let id = tx.last_insert_rowid();

        let user = tx.query_row(
            &format!("{USER_SELECT_SQL} WHERE id = ?1;"),
            params![id],
            parse_user_row,
        )?;

        tx.commit()?;
        Ok(user)
    }

    /// Look up a user by id. `Ok(None)` when no record matches.
    pub fn find_by_id(&self, id: i64) -> StoreResult<Option<User>> {
        let conn = self.lock()?;
        let user = conn
            .query_row(
                &format!("{USER_SELECT_SQL} WHERE id = ?1;"),
                params![id],
                parse_user_row,
            )
            .optional()?;

        Ok(user)
    }

    /// Delete a user by id and return how many rows were removed (0 or 1)
    pub fn delete_by_id(&self, id: i64) -> StoreResult<usize> {
        let conn = self.lock()?;
        let removed = conn.execute("DELETE FROM users WHERE id = ?1;", params![id])?;
        Ok(removed)
    }

    /// Every persisted user. No ordering is promised to callers.
    pub fn find_all(&self) -> StoreResult<Vec<User>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!("{USER_SELECT_SQL};"))?;
        let users = stmt
            .query_map([], parse_user_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(users)
    }

    pub fn count(&self) -> StoreResult<usize> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM users;", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| StoreError::LockPoisoned)
    }

    /// Remove the table so every later operation fails at the storage layer
    #[cfg(test)]
    pub(crate) fn drop_schema(&self) {
        self.lock()
            .unwrap()
            .execute_batch("DROP TABLE users;")
            .unwrap();
    }
}

fn parse_user_row(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        name: row.get(1)?,
        room: row.get(2)?,
        created_at: row.get(3)?,
        updated_at: row.get(4)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn new_user(name: i64, room: i64) -> NewUser {
        NewUser { name, room }
    }

    #[test]
    fn test_create_assigns_id() {
        let store = UserStore::open_in_memory().unwrap();

        let user = store.create(new_user(1, 5)).unwrap();

        assert_eq!(user.id, 1);
        assert_eq!(user.name, 1);
        assert_eq!(user.room, 5);
        assert_eq!(user.created_at, user.updated_at);
        assert_eq!(store.find_all().unwrap(), vec![user]);
    }

    #[test]
    fn test_ids_are_distinct_and_increasing() {
        let store = UserStore::open_in_memory().unwrap();

        let first = store.create(new_user(1, 1)).unwrap();
        let second = store.create(new_user(2, 1)).unwrap();

        assert!(second.id > first.id);
        assert_eq!(store.find_by_id(first.id).unwrap(), Some(first));
        assert_eq!(store.find_by_id(second.id).unwrap(), Some(second));
    }

    #[test]
    fn test_ids_not_reused_after_delete() {
        let store = UserStore::open_in_memory().unwrap();

        let first = store.create(new_user(1, 1)).unwrap();
        let second = store.create(new_user(2, 1)).unwrap();
        assert_eq!(store.delete_by_id(second.id).unwrap(), 1);

        let third = store.create(new_user(3, 1)).unwrap();
        assert!(third.id > second.id);
        assert_ne!(third.id, first.id);
    }

    #[test]
    fn test_find_missing_is_none() {
        let store = UserStore::open_in_memory().unwrap();
        assert_eq!(store.find_by_id(42).unwrap(), None);
    }

    #[test]
    fn test_delete_missing_returns_zero() {
        let store = UserStore::open_in_memory().unwrap();
        assert_eq!(store.delete_by_id(42).unwrap(), 0);
    }

    #[test]
    fn test_delete_removes_record() {
        let store = UserStore::open_in_memory().unwrap();
        let user = store.create(new_user(4, 9)).unwrap();

        assert_eq!(store.delete_by_id(user.id).unwrap(), 1);
        assert_eq!(store.find_by_id(user.id).unwrap(), None);
        assert!(store.find_all().unwrap().is_empty());
    }

    #[test]
    fn test_find_all_empty() {
        let store = UserStore::open_in_memory().unwrap();
        assert!(store.find_all().unwrap().is_empty());
        assert_eq!(store.count().unwrap(), 0);
    }

    #[test]
    fn test_sync_is_idempotent() {
        let store = UserStore::open_in_memory().unwrap();
        store.create(new_user(1, 1)).unwrap();

        store.sync().unwrap();

        assert_eq!(store.count().unwrap(), 1);
    }

    #[test]
    fn test_operations_fail_without_schema() {
        let store = UserStore::open_in_memory().unwrap();
        store.drop_schema();

        assert!(matches!(store.create(new_user(1, 1)), Err(StoreError::Sqlite(_))));
        assert!(matches!(store.find_by_id(1), Err(StoreError::Sqlite(_))));
        assert!(matches!(store.delete_by_id(1), Err(StoreError::Sqlite(_))));
        assert!(matches!(store.find_all(), Err(StoreError::Sqlite(_))));
    }

    #[test]
    fn test_file_store_survives_reopen() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("roster.db");

        let created = {
            let store = UserStore::open(&path).unwrap();
            store.create(new_user(7, 2)).unwrap()
        };

        let store = UserStore::open(&path).unwrap();
        assert_eq!(store.find_by_id(created.id).unwrap(), Some(created));
    }

    #[test]
    fn test_concurrent_creates_get_unique_ids() {
        use std::collections::HashSet;
        use std::sync::Arc;
        use std::thread;

        let store = Arc::new(UserStore::open_in_memory().unwrap());
        let handles: Vec<_> = (0..8)
            .map(|worker| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    (0..50)
                        .map(|i| store.create(new_user(i, worker)).unwrap().id)
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        let ids: Vec<i64> = handles
            .into_iter()
            .flat_map(|handle| handle.join().unwrap())
            .collect();
        let unique: HashSet<i64> = ids.iter().copied().collect();

        assert_eq!(ids.len(), 400);
        assert_eq!(unique.len(), 400);
        assert_eq!(store.count().unwrap(), 400);
    }
}
