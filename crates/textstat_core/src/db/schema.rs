//! The `texts` table and its indexes.

use crate::db::{DbError, DbResult};
use log::info;
use rusqlite::Connection;

/// Version written to `PRAGMA user_version` once `texts.sql` is applied.
pub const TEXTS_SCHEMA_VERSION: u32 = 1;

const TEXTS_SCHEMA_SQL: &str = include_str!("texts.sql");

/// What [`ensure_texts_schema`] found on the connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaOutcome {
    /// The store was empty; table and indexes were created.
    Created { indexes: u32 },
    /// The store already carried the current schema.
    Current,
}

/// Creates the `texts` table on an empty store, or checks an existing one.
///
/// Creation runs in one transaction together with the version bump.
pub fn ensure_texts_schema(conn: &mut Connection) -> DbResult<SchemaOutcome> {
    let found = schema_version(conn)?;
    if found > TEXTS_SCHEMA_VERSION {
        return Err(DbError::SchemaTooNew {
            found,
            supported: TEXTS_SCHEMA_VERSION,
        });
    }
    if found == TEXTS_SCHEMA_VERSION {
        return Ok(SchemaOutcome::Current);
    }

    let tx = conn.transaction()?;
    tx.execute_batch(TEXTS_SCHEMA_SQL)?;
    tx.pragma_update(None, "user_version", TEXTS_SCHEMA_VERSION)?;
    tx.commit()?;

    let indexes = texts_index_count(conn)?;
    info!(
        "event=db_schema module=db status=ok table=texts version={} indexes={}",
        TEXTS_SCHEMA_VERSION, indexes
    );
    Ok(SchemaOutcome::Created { indexes })
}

/// Reads `PRAGMA user_version`; 0 for a fresh store.
pub fn schema_version(conn: &Connection) -> DbResult<u32> {
    let version = conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?;
    Ok(version)
}

fn texts_index_count(conn: &Connection) -> DbResult<u32> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master
         WHERE type = 'index' AND tbl_name = 'texts' AND name LIKE 'idx_texts_%';",
        [],
        |row| row.get::<_, u32>(0),
    )?;
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::{ensure_texts_schema, schema_version, SchemaOutcome, TEXTS_SCHEMA_VERSION};
    use rusqlite::Connection;

    #[test]
    fn fresh_store_gets_table_and_three_indexes() {
        let mut conn = Connection::open_in_memory().unwrap();
        assert_eq!(schema_version(&conn).unwrap(), 0);

        let outcome = ensure_texts_schema(&mut conn).unwrap();
        assert_eq!(outcome, SchemaOutcome::Created { indexes: 3 });
        assert_eq!(schema_version(&conn).unwrap(), TEXTS_SCHEMA_VERSION);
    }

    #[test]
    fn second_call_reports_current_schema() {
        let mut conn = Connection::open_in_memory().unwrap();
        ensure_texts_schema(&mut conn).unwrap();

        assert_eq!(ensure_texts_schema(&mut conn).unwrap(), SchemaOutcome::Current);
    }
}
