#![forbid(unsafe_code)]

use super::super::super::super::StoreError;
use super::util::add_column_if_missing;
use rusqlite::Connection;

pub(super) fn apply(conn: &Connection) -> Result<(), StoreError> {
    add_column_if_missing(conn, "workflow_steps", "started_at_ms", "INTEGER")?;
    add_column_if_missing(conn, "workflow_steps", "assignee", "TEXT")?;
    add_column_if_missing(conn, "workflow_steps", "block_reason", "TEXT")?;
    Ok(())
}
