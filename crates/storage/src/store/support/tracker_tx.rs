#![forbid(unsafe_code)]

use super::super::StoreError;
use rusqlite::{OptionalExtension, Transaction, params};

#[derive(Clone, Debug)]
pub(in crate::store) struct TrackerState {
    pub(in crate::store) revision: i64,
    pub(in crate::store) current_phase_id: String,
    pub(in crate::store) current_section_id: Option<String>,
    pub(in crate::store) current_line_item_id: Option<String>,
    pub(in crate::store) current_step_id: Option<String>,
}

pub(in crate::store) fn tracker_state_tx(
    tx: &Transaction<'_>,
    project_id: &str,
) -> Result<TrackerState, StoreError> {
    let value = tx
        .query_row(
            "SELECT revision, current_phase_id, current_section_id, current_line_item_id, current_step_id \
             FROM workflow_trackers WHERE project_id=?1",
            params![project_id],
            |row| {
                Ok(TrackerState {
                    revision: row.get(0)?,
                    current_phase_id: row.get(1)?,
                    current_section_id: row.get(2)?,
                    current_line_item_id: row.get(3)?,
                    current_step_id: row.get(4)?,
                })
            },
        )
        .optional()?;

    value.ok_or(StoreError::UnknownProject)
}

/// The tracker row is the per-project serialization point: every mutating
/// operation bumps its revision first, so stale writers fail with a
/// conflict instead of advancing from an outdated position.
pub(in crate::store) fn bump_tracker_revision_tx(
    tx: &Transaction<'_>,
    project_id: &str,
    expected_revision: Option<i64>,
    now_ms: i64,
) -> Result<i64, StoreError> {
    let current: i64 = tx
        .query_row(
            "SELECT revision FROM workflow_trackers WHERE project_id=?1",
            params![project_id],
            |row| row.get(0),
        )
        .optional()?
        .ok_or(StoreError::UnknownProject)?;

    if let Some(expected) = expected_revision
        && expected != current
    {
        return Err(StoreError::RevisionMismatch {
            expected,
            actual: current,
        });
    }

    let next = current + 1;
    tx.execute(
        "UPDATE workflow_trackers SET revision=?2, updated_at_ms=?3 WHERE project_id=?1",
        params![project_id, next, now_ms],
    )?;
    Ok(next)
}
