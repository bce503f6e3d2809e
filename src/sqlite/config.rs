use std::path::Path;

use rusqlite::Connection;

use crate::error::SqlShimError;

/// Open a file-backed database, switching it to WAL journal mode.
pub(crate) fn open(db_path: &Path) -> Result<Connection, SqlShimError> {
    let conn = Connection::open(db_path)?;
    conn.execute_batch("PRAGMA journal_mode = WAL;")?;
    Ok(conn)
}

/// Open a fresh in-memory database.
pub(crate) fn open_in_memory() -> Result<Connection, SqlShimError> {
    Ok(Connection::open_in_memory()?)
}
