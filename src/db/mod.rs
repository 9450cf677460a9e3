mod persons;
mod repository;
mod schema;

use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};

use rusqlite::{Connection, TransactionBehavior};
use uuid::Uuid;

use crate::error::{RegistryError, Result};
use crate::models::Person;

pub use persons::SqlitePersons;
pub use repository::{PersonRepository, PersonStore};

/// SQLite-backed person store.
///
/// Clones share one connection. Every [`PersonStore::atomically`] call holds
/// the connection for the whole unit of work and runs it as a `BEGIN
/// IMMEDIATE` transaction, which also serializes writers in other processes
/// using the same database file.
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    pub fn open(path: PathBuf) -> anyhow::Result<Self> {
        let parent = path
            .parent()
            .ok_or_else(|| anyhow::anyhow!("Database path has no parent directory"))?;
        std::fs::create_dir_all(parent)?;
        let conn = Connection::open(&path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        Self::from_connection(conn)
    }

    pub fn open_default() -> anyhow::Result<Self> {
        let dirs = directories::ProjectDirs::from("", "", "family-registry")
            .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?;
        let db_path = dirs.data_dir().join("registry.db");
        Self::open(db_path)
    }

    pub fn open_memory() -> anyhow::Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> anyhow::Result<Self> {
        // Cascading parent-link removal depends on this; it is off by default in SQLite
        conn.pragma_update(None, "foreign_keys", "ON")?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn migrate(&self) -> anyhow::Result<()> {
        let conn = self.lock()?;
        schema::run_migrations(&conn)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| RegistryError::LockPoisoned)
    }
}

impl PersonStore for Database {
    fn atomically<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&dyn PersonRepository) -> Result<T>,
    {
        let mut conn = self.lock()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let persons = SqlitePersons::new(&tx);
        let repo: &dyn PersonRepository = &persons;
        // Dropping `tx` on the error path rolls back
        let value = f(repo)?;
        tx.commit()?;
        Ok(value)
    }
}

/// Direct repository access, one transaction per call.
impl PersonRepository for Database {
    fn save(&self, person: &Person) -> Result<Person> {
        self.atomically(|repo| repo.save(person))
    }

    fn find_by_id(&self, id: Uuid) -> Result<Option<Person>> {
        self.atomically(|repo| repo.find_by_id(id))
    }

    fn delete(&self, id: Uuid) -> Result<bool> {
        self.atomically(|repo| repo.delete(id))
    }

    fn find_all(&self) -> Result<Vec<Person>> {
        self.atomically(|repo| repo.find_all())
    }

    fn find_children(&self, parent_id: Uuid) -> Result<Vec<Person>> {
        self.atomically(|repo| repo.find_children(parent_id))
    }
}
