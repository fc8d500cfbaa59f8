#![forbid(unsafe_code)]

mod steps;
mod util;

use super::super::super::StoreError;
use rusqlite::Connection;

pub(super) fn apply(conn: &Connection) -> Result<(), StoreError> {
    steps::apply(conn)?;
    Ok(())
}
