//! SQLite-backed storage for users, the tag and ingredient catalogue, recipes,
//! and the per-user favorite/cart lists.
//!
//! A single connection sits behind a mutex. Every public method takes the lock
//! for its whole duration, so check-then-write sequences (duplicate list
//! entries, author checks) cannot interleave with other callers.

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use rusqlite::Connection;
use thiserror::Error;

pub mod catalog;
pub mod lists;
pub mod recipes;
mod schema;

pub use lists::ListKind;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: String },

    #[error("Recipe is already in {}", .0.label())]
    AlreadyListed(ListKind),

    #[error("Recipe is not in {}", .0.label())]
    NotListed(ListKind),

    #[error("{0}")]
    Invalid(String),

    #[error("Only the author can change recipe {0}")]
    NotAuthor(i64),

    #[error("Storage connection lock poisoned")]
    Poisoned,

    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

impl StoreError {
    pub(crate) fn not_found(entity: &'static str, id: impl ToString) -> Self {
        StoreError::NotFound {
            entity,
            id: id.to_string(),
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Clone)]
pub struct Store {
    conn: Arc<Mutex<Connection>>,
}

impl Store {
    pub fn open(path: &Path) -> StoreResult<Self> {
        let conn = Connection::open(path)?;
        Self::from_connection(conn)
    }

    pub fn open_in_memory() -> StoreResult<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> StoreResult<Self> {
        schema::init_schema(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub(crate) fn lock(&self) -> StoreResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| StoreError::Poisoned)
    }
}
