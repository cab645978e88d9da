//! Store connection setup.
//!
//! # Invariants
//! - Returned connections carry the current `texts` schema.
//! - Returned connections wait on a busy database instead of failing at once.

use super::schema::{ensure_texts_schema, SchemaOutcome};
use super::{DbError, DbResult};
use log::{error, info};
use rusqlite::Connection;
use std::path::Path;
use std::time::{Duration, Instant};

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Opens the store file at `path`, creating it and its parent directories
/// when missing.
pub fn open_db(path: impl AsRef<Path>) -> DbResult<Connection> {
    let path = path.as_ref();
    let target = path.display().to_string();
    open_with(&target, || {
        create_parent_dir(path)?;
        Connection::open(path).map_err(|source| DbError::Open {
            path: path.to_path_buf(),
            source,
        })
    })
}

/// Opens a private in-memory store. Its texts vanish with the connection.
pub fn open_db_in_memory() -> DbResult<Connection> {
    open_with(":memory:", || Ok(Connection::open_in_memory()?))
}

fn create_parent_dir(path: &Path) -> DbResult<()> {
    let Some(parent) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) else {
        return Ok(());
    };
    std::fs::create_dir_all(parent).map_err(|source| DbError::CreateDir {
        path: parent.to_path_buf(),
        source,
    })
}

fn open_with(target: &str, open: impl FnOnce() -> DbResult<Connection>) -> DbResult<Connection> {
    let started_at = Instant::now();

    let result = open().and_then(|mut conn| {
        conn.busy_timeout(BUSY_TIMEOUT)?;
        let outcome = ensure_texts_schema(&mut conn)?;
        Ok((conn, outcome))
    });

    match result {
        Ok((conn, outcome)) => {
            let schema = match outcome {
                SchemaOutcome::Created { .. } => "created",
                SchemaOutcome::Current => "current",
            };
            info!(
                "event=db_open module=db status=ok target={} schema={} duration_ms={}",
                target,
                schema,
                started_at.elapsed().as_millis()
            );
            Ok(conn)
        }
        Err(err) => {
            error!(
                "event=db_open module=db status=error target={} duration_ms={} error={}",
                target,
                started_at.elapsed().as_millis(),
                err
            );
            Err(err)
        }
    }
}
