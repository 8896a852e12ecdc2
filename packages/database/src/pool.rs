//! `DuckDB` connection pool.

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};

use duckdb::Connection;

use crate::{DbError, paths, schema};

/// Round-robin pool of connections to one `DuckDB` database.
///
/// `duckdb::Connection` is `Send` but not `Sync`, so each connection is
/// wrapped in a `Mutex`. All connections are clones of a single primary
/// connection and therefore share one database instance, which lets
/// writes from any of them be seen by the others. The pool is created
/// once at startup and shared through application state.
pub struct DbPool {
    connections: Vec<Mutex<Connection>>,
    next: AtomicUsize,
}

impl DbPool {
    /// Opens (or creates) the database file at `path` with `size`
    /// connections and ensures the schema exists.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the parent directory cannot be created, the
    /// database cannot be opened, or schema creation fails.
    pub fn open(path: &Path, size: usize) -> Result<Self, DbError> {
        if let Some(parent) = path.parent() {
            paths::ensure_dir(parent)?;
        }

        log::info!("Opening database at {}", path.display());
        Self::from_primary(Connection::open(path)?, size)
    }

    /// Opens a pool over a fresh in-memory database.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the database cannot be created.
    pub fn open_in_memory(size: usize) -> Result<Self, DbError> {
        Self::from_primary(Connection::open_in_memory()?, size)
    }

    fn from_primary(primary: Connection, size: usize) -> Result<Self, DbError> {
        schema::create_schema(&primary)?;

        let size = size.max(1);
        let mut connections = Vec::with_capacity(size);
        for _ in 1..size {
            connections.push(Mutex::new(primary.try_clone()?));
        }
        connections.push(Mutex::new(primary));

        Ok(Self {
            connections,
            next: AtomicUsize::new(0),
        })
    }

    /// Number of connections in the pool.
    #[must_use]
    pub fn size(&self) -> usize {
        self.connections.len()
    }

    /// Acquires the next connection from the pool (round-robin).
    ///
    /// # Errors
    ///
    /// Returns [`DbError::PoolPoisoned`] if a previous holder of the
    /// connection panicked.
    pub fn acquire(&self) -> Result<MutexGuard<'_, Connection>, DbError> {
        let idx = self.next.fetch_add(1, Ordering::Relaxed) % self.connections.len();
        self.connections[idx]
            .lock()
            .map_err(|_| DbError::PoolPoisoned)
    }

    /// Runs a trivial query to check that the database answers.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if no connection can be acquired or the query
    /// fails.
    pub fn ping(&self) -> Result<(), DbError> {
        let conn = self.acquire()?;
        let one: i32 = conn.query_row("SELECT 1", [], |row| row.get(0))?;
        if one == 1 {
            Ok(())
        } else {
            Err(DbError::Conversion {
                message: format!("health query returned {one}"),
            })
        }
    }
}
