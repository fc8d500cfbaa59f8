#![forbid(unsafe_code)]

use super::super::{EventRow, StoreError};
use rusqlite::{Transaction, params};

pub(in crate::store) fn insert_event_tx(
    tx: &Transaction<'_>,
    project_id: Option<&str>,
    ts_ms: i64,
    step_id: Option<&str>,
    event_type: &str,
    payload_json: &str,
) -> Result<EventRow, StoreError> {
    tx.execute(
        r#"
        INSERT INTO workflow_events(project_id, ts_ms, step_id, type, payload_json)
        VALUES (?1, ?2, ?3, ?4, ?5)
        "#,
        params![project_id, ts_ms, step_id, event_type, payload_json],
    )?;
    let seq = tx.last_insert_rowid();
    Ok(EventRow {
        seq,
        ts_ms,
        project_id: project_id.map(str::to_string),
        step_id: step_id.map(str::to_string),
        event_type: event_type.to_string(),
        payload_json: payload_json.to_string(),
    })
}
