//! SQLite store bootstrap for the `texts` table.
//!
//! Connections handed out here always carry the current `texts` schema;
//! its version is kept in `PRAGMA user_version`.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

mod open;
pub mod schema;

pub use open::{open_db, open_db_in_memory};
pub use schema::{SchemaOutcome, TEXTS_SCHEMA_VERSION};

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug)]
pub enum DbError {
    /// The directory that should hold the store file could not be created.
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
    /// SQLite refused to open the store file.
    Open {
        path: PathBuf,
        source: rusqlite::Error,
    },
    Sqlite(rusqlite::Error),
    /// The store was written by a newer build.
    SchemaTooNew { found: u32, supported: u32 },
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CreateDir { path, source } => {
                write!(f, "cannot create store directory {}: {source}", path.display())
            }
            Self::Open { path, source } => {
                write!(f, "cannot open text store {}: {source}", path.display())
            }
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::SchemaTooNew { found, supported } => write!(
                f,
                "texts schema version {found} is newer than supported {supported}"
            ),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::CreateDir { source, .. } => Some(source),
            Self::Open { source, .. } | Self::Sqlite(source) => Some(source),
            Self::SchemaTooNew { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
