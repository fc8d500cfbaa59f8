#![forbid(unsafe_code)]

use super::*;
use serde_json::json;

impl SqliteStore {
    /// Closes the current phase and materializes the next one, or marks the
    /// workflow complete when no further phase exists. The only place steps
    /// are created after initialization.
    pub fn workflow_advance_phase(
        &mut self,
        project: &ProjectId,
        request: WorkflowAdvancePhaseRequest,
    ) -> Result<AdvancePhaseResult, StoreError> {
        let WorkflowAdvancePhaseRequest {
            expected_revision,
            actor_id,
            reason,
            policy,
        } = request;
        if actor_id.trim().is_empty() {
            return Err(StoreError::InvalidInput("actor_id must not be empty"));
        }

        let now_ms = now_ms();
        let tx = self.conn.transaction()?;

        let tracker_revision =
            bump_tracker_revision_tx(&tx, project.as_str(), expected_revision, now_ms)?;
        let tracker = tracker_state_tx(&tx, project.as_str())?;

        let workflow = tx
            .query_row(
                "SELECT workflow_type, status, overall_progress FROM project_workflows WHERE project_id=?1",
                params![project.as_str()],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, i64>(2)?,
                    ))
                },
            )
            .optional()?;
        let Some((workflow_type, status, overall_progress)) = workflow else {
            return Err(StoreError::UnknownProject);
        };
        if WorkflowStatus::parse(&status) == Some(WorkflowStatus::Complete) {
            return Err(StoreError::WorkflowComplete);
        }

        let mut stmt = tx.prepare(
            "SELECT state FROM workflow_steps WHERE project_id=?1 AND phase_id=?2",
        )?;
        let states = stmt
            .query_map(params![project.as_str(), tracker.current_phase_id], |row| {
                row.get::<_, String>(0)
            })?
            .collect::<Result<Vec<_>, _>>()?;
        drop(stmt);
        let states = states
            .iter()
            .map(|value| parse_step_state(value))
            .collect::<Result<Vec<_>, _>>()?;

        let remaining = rl_core::progression::phase_close_blockers(&states, policy);
        if remaining > 0 {
            return Err(StoreError::PhaseIncomplete { remaining });
        }

        let current_order = phase_display_order_tx(&tx, &tracker.current_phase_id)?;
        let Some(phase) = next_phase_tx(&tx, &workflow_type, current_order)? else {
            tx.execute(
                "UPDATE project_workflows SET status='COMPLETE', updated_at_ms=?2 WHERE project_id=?1",
                params![project.as_str(), now_ms],
            )?;
            tx.execute(
                "UPDATE workflow_trackers \
                 SET current_section_id=NULL, current_line_item_id=NULL, current_step_id=NULL, \
                     section_started_at_ms=NULL, line_item_started_at_ms=NULL, updated_at_ms=?2 \
                 WHERE project_id=?1",
                params![project.as_str(), now_ms],
            )?;
            let payload = json!({
                "actor_id": actor_id.as_str(),
                "reason": reason.as_deref(),
                "overall_progress": overall_progress
            });
            insert_event_tx(
                &tx,
                Some(project.as_str()),
                now_ms,
                None,
                "workflow_completed",
                &payload.to_string(),
            )?;
            tx.commit()?;
            return Ok(AdvancePhaseResult::WorkflowComplete {
                tracker_revision,
                overall_progress,
            });
        };

        let slots = phase_line_items_tx(&tx, &phase.id)?;
        if slots.is_empty() {
            return Err(StoreError::NoActiveTemplate);
        }

        let max_order: i64 = tx.query_row(
            "SELECT COALESCE(MAX(step_order), 0) FROM workflow_steps WHERE project_id=?1",
            params![project.as_str()],
            |row| row.get(0),
        )?;

        for (index, slot) in slots.iter().enumerate() {
            let order = max_order + to_sqlite_i64(index + 1)?;
            tx.execute(
                "INSERT INTO workflow_steps(project_id, step_id, step_order, state, is_completed, phase_id, section_id, line_item_id, created_at_ms, updated_at_ms) \
                 VALUES (?1, ?2, ?3, 'PENDING', 0, ?4, ?5, ?6, ?7, ?7)",
                params![
                    project.as_str(),
                    step_id_for_order(order),
                    order,
                    phase.id,
                    slot.section_id,
                    slot.line_item_id,
                    now_ms
                ],
            )?;
        }

        let first_order = max_order + 1;
        let first_row = step_by_order_tx(&tx, project.as_str(), first_order)?;
        activate_step_tx(&tx, project.as_str(), &first_row, &tracker, now_ms)?;
        let first_step = StepRef {
            step_id: first_row.step_id,
            step_order: first_row.step_order,
        };

        let payload = json!({
            "actor_id": actor_id.as_str(),
            "reason": reason.as_deref(),
            "from_phase_id": tracker.current_phase_id.as_str(),
            "to_phase_id": phase.id.as_str(),
            "steps": slots.len()
        });
        insert_event_tx(
            &tx,
            Some(project.as_str()),
            now_ms,
            Some(&first_step.step_id),
            "phase_advanced",
            &payload.to_string(),
        )?;

        tx.commit()?;
        Ok(AdvancePhaseResult::Advanced {
            tracker_revision,
            phase_id: phase.id,
            created_steps: slots.len(),
            first_step,
        })
    }
}
