//! Read-only access to the embedded collection database.

use std::path::Path;

use rusqlite::{Connection, OpenFlags};
use tracing::debug;

use crate::domain::Note;
use crate::error::ConvertError;

/// Conventional database filename inside an unpacked deck package.
pub const COLLECTION_FILE: &str = "collection.anki2";

/// Open the collection read-only and return every note in store order.
///
/// The connection is dropped before this returns, so workspace teardown
/// can never race an open handle.
pub fn read_notes(workspace: &Path) -> Result<Vec<Note>, ConvertError> {
    let db_path = workspace.join(COLLECTION_FILE);
    if !db_path.is_file() {
        return Err(ConvertError::DatabaseOpen(format!(
            "{COLLECTION_FILE} not found in package"
        )));
    }

    let conn = Connection::open_with_flags(
        &db_path,
        OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )
    .map_err(db_err)?;

    let mut stmt = conn
        .prepare("SELECT id, flds, tags, mid FROM notes")
        .map_err(db_err)?;

    let rows = stmt
        .query_map([], |row| {
            Ok(Note {
                id: row.get(0)?,
                fields_blob: row.get(1)?,
                tags: row.get(2)?,
                model_id: row.get(3)?,
            })
        })
        .map_err(db_err)?;

    let mut notes = Vec::new();
    for row in rows {
        notes.push(row.map_err(db_err)?);
    }

    debug!(notes = notes.len(), "collection read");
    Ok(notes)
}

fn db_err(e: rusqlite::Error) -> ConvertError {
    ConvertError::DatabaseOpen(e.to_string())
}
