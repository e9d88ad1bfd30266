//! SQLite storage bootstrap.
//!
//! # Responsibility
//! - Open and configure SQLite connections for parcel storage.
//! - Create the `parcel` table when it does not exist yet.
//!
//! # Invariants
//! - Schema creation is idempotent; existing tables and rows are untouched.

use std::error::Error;
use std::fmt::{Display, Formatter};

mod open;

pub use open::{ensure_schema, open_db, open_db_in_memory};

pub type DbResult<T> = Result<T, DbError>;

/// Connection bootstrap and SQL execution failures.
#[derive(Debug)]
pub enum DbError {
    /// Driver error, kept as-is so callers can inspect the SQLite code.
    Sqlite(rusqlite::Error),
}

impl DbError {
    /// Returns the underlying driver error.
    pub fn as_sqlite(&self) -> &rusqlite::Error {
        match self {
            Self::Sqlite(err) => err,
        }
    }
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
