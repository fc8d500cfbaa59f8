#![forbid(unsafe_code)]

use super::super::StoreError;
use super::events_tx::insert_event_tx;
use rusqlite::{OptionalExtension, Transaction, params};
use serde_json::json;

const DAY_MS: i64 = 86_400_000;

/// Guarantees one ACTIVE alert for (project, step). Safe to call from
/// retried operations: an existing ACTIVE alert is returned unchanged.
pub(in crate::store) fn ensure_step_alert_tx(
    tx: &Transaction<'_>,
    project_id: &str,
    step_id: &str,
    phase_id: &str,
    section_id: &str,
    line_item_id: &str,
    now_ms: i64,
) -> Result<i64, StoreError> {
    let existing = tx
        .query_row(
            "SELECT seq FROM workflow_alerts \
             WHERE project_id=?1 AND step_id=?2 AND status='ACTIVE'",
            params![project_id, step_id],
            |row| row.get::<_, i64>(0),
        )
        .optional()?;
    if let Some(seq) = existing {
        return Ok(seq);
    }

    let fields = tx
        .query_row(
            "SELECT name, responsible_role, priority, alert_days \
             FROM line_item_templates WHERE id=?1",
            params![line_item_id],
            |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, i64>(3)?,
                ))
            },
        )
        .optional()?;
    let Some((name, responsible_role, priority, alert_days)) = fields else {
        return Err(StoreError::NoActiveTemplate);
    };

    let due_at_ms = now_ms + alert_days * DAY_MS;
    let message = format!("\"{name}\" is now the active line item for {responsible_role}");
    tx.execute(
        r#"
        INSERT INTO workflow_alerts(project_id, step_id, phase_id, section_id, title, message, priority, status, responsible_role, due_at_ms, created_at_ms, updated_at_ms)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 'ACTIVE', ?8, ?9, ?10, ?10)
        "#,
        params![
            project_id,
            step_id,
            phase_id,
            section_id,
            name,
            message,
            priority,
            responsible_role,
            due_at_ms,
            now_ms
        ],
    )?;
    let seq = tx.last_insert_rowid();

    let payload = json!({
        "alert": seq,
        "step_id": step_id,
        "responsible_role": responsible_role,
        "due_at_ms": due_at_ms
    });
    insert_event_tx(
        tx,
        Some(project_id),
        now_ms,
        Some(step_id),
        "alert_created",
        &payload.to_string(),
    )?;

    Ok(seq)
}

/// Retires the ACTIVE alert for a step once responsibility moves on.
pub(in crate::store) fn close_step_alert_tx(
    tx: &Transaction<'_>,
    project_id: &str,
    step_id: &str,
    closed_status: &str,
    now_ms: i64,
) -> Result<bool, StoreError> {
    let changed = tx.execute(
        "UPDATE workflow_alerts SET status=?3, updated_at_ms=?4 \
         WHERE project_id=?1 AND step_id=?2 AND status='ACTIVE'",
        params![project_id, step_id, closed_status, now_ms],
    )?;
    Ok(changed > 0)
}
