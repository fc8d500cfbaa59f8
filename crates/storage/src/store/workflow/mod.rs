#![forbid(unsafe_code)]

use super::*;

mod advance;
mod complete;
mod initialize;
mod status;
mod transition;

use rusqlite::Transaction;

/// Step fields the advancement path needs, fetched inside the transaction.
#[derive(Clone, Debug)]
struct StepSlotRow {
    step_id: String,
    step_order: i64,
    state: StepState,
    phase_id: String,
    section_id: String,
    line_item_id: String,
}

fn parse_step_state(value: &str) -> Result<StepState, StoreError> {
    StepState::parse(value).ok_or(StoreError::InvalidInput("unrecognized step state"))
}

fn step_by_order_tx(
    tx: &Transaction<'_>,
    project_id: &str,
    step_order: i64,
) -> Result<StepSlotRow, StoreError> {
    let value = tx
        .query_row(
            "SELECT step_id, step_order, state, phase_id, section_id, line_item_id \
             FROM workflow_steps WHERE project_id=?1 AND step_order=?2",
            params![project_id, step_order],
            |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, i64>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, String>(4)?,
                    row.get::<_, String>(5)?,
                ))
            },
        )
        .optional()?;

    let Some((step_id, step_order, state, phase_id, section_id, line_item_id)) = value else {
        return Err(StoreError::StepNotFound);
    };
    Ok(StepSlotRow {
        step_id,
        step_order,
        state: parse_step_state(&state)?,
        phase_id,
        section_id,
        line_item_id,
    })
}

/// Orders of steps still eligible for activation. Skipped and completed
/// steps are passed over; blocked steps can only exist at the tracker's
/// current position, so PENDING is the full eligible set.
fn pending_orders_tx(tx: &Transaction<'_>, project_id: &str) -> Result<Vec<i64>, StoreError> {
    let mut stmt = tx.prepare(
        "SELECT step_order FROM workflow_steps \
         WHERE project_id=?1 AND state='PENDING' ORDER BY step_order ASC",
    )?;
    let rows = stmt.query_map(params![project_id], |row| row.get::<_, i64>(0))?;
    Ok(rows.collect::<Result<Vec<_>, _>>()?)
}

/// Activates `next` and repoints the tracker at it, restarting the
/// started-at clock for each hierarchy level actually entered.
fn activate_step_tx(
    tx: &Transaction<'_>,
    project_id: &str,
    next: &StepSlotRow,
    tracker: &TrackerState,
    now_ms: i64,
) -> Result<(), StoreError> {
    rl_core::state::check_transition(next.state, StepState::Active, true)?;

    tx.execute(
        "UPDATE workflow_steps \
         SET state='ACTIVE', started_at_ms=COALESCE(started_at_ms, ?4), updated_at_ms=?4 \
         WHERE project_id=?1 AND step_id=?2 AND step_order=?3",
        params![project_id, next.step_id, next.step_order, now_ms],
    )?;

    let phase_changed = next.phase_id != tracker.current_phase_id;
    let section_changed = tracker.current_section_id.as_deref() != Some(next.section_id.as_str());
    tx.execute(
        "UPDATE workflow_trackers \
         SET current_phase_id=?2, current_section_id=?3, current_line_item_id=?4, current_step_id=?5, \
             phase_started_at_ms=CASE WHEN ?6 THEN ?8 ELSE phase_started_at_ms END, \
             section_started_at_ms=CASE WHEN ?7 THEN ?8 ELSE section_started_at_ms END, \
             line_item_started_at_ms=?8, \
             updated_at_ms=?8 \
         WHERE project_id=?1",
        params![
            project_id,
            next.phase_id,
            next.section_id,
            next.line_item_id,
            next.step_id,
            phase_changed,
            section_changed,
            now_ms
        ],
    )?;

    ensure_step_alert_tx(
        tx,
        project_id,
        &next.step_id,
        &next.phase_id,
        &next.section_id,
        &next.line_item_id,
        now_ms,
    )?;
    Ok(())
}

/// Recomputes the instance's rounded completion percentage and persists it.
fn refresh_progress_tx(
    tx: &Transaction<'_>,
    project_id: &str,
    now_ms: i64,
) -> Result<i64, StoreError> {
    let (total, completed): (i64, i64) = tx.query_row(
        "SELECT COUNT(*), COALESCE(SUM(is_completed), 0) FROM workflow_steps WHERE project_id=?1",
        params![project_id],
        |row| Ok((row.get(0)?, row.get(1)?)),
    )?;

    let progress = rl_core::progression::overall_progress(completed, total);
    tx.execute(
        "UPDATE project_workflows SET overall_progress=?2, updated_at_ms=?3 WHERE project_id=?1",
        params![project_id, progress, now_ms],
    )?;
    Ok(progress)
}
