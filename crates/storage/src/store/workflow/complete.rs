#![forbid(unsafe_code)]

use super::*;
use serde_json::json;

impl SqliteStore {
    /// Completes a step and advances the tracker to the next instantiated
    /// step within the instance. Completion never crosses a phase boundary:
    /// when no further step exists the caller invokes phase advancement
    /// separately.
    pub fn workflow_complete_step(
        &mut self,
        project: &ProjectId,
        request: WorkflowCompleteStepRequest,
    ) -> Result<CompleteStepResult, StoreError> {
        let WorkflowCompleteStepRequest {
            step_id,
            expected_revision,
            actor_id,
            notes,
        } = request;
        if actor_id.trim().is_empty() {
            return Err(StoreError::InvalidInput("actor_id must not be empty"));
        }

        let now_ms = now_ms();
        let tx = self.conn.transaction()?;

        let tracker_revision =
            bump_tracker_revision_tx(&tx, project.as_str(), expected_revision, now_ms)?;
        let tracker = tracker_state_tx(&tx, project.as_str())?;

        let row = tx
            .query_row(
                "SELECT step_order, state, is_completed, phase_id, section_id, line_item_id \
                 FROM workflow_steps WHERE project_id=?1 AND step_id=?2",
                params![project.as_str(), step_id],
                |row| {
                    Ok((
                        row.get::<_, i64>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, i64>(2)?,
                        row.get::<_, String>(3)?,
                        row.get::<_, String>(4)?,
                        row.get::<_, String>(5)?,
                    ))
                },
            )
            .optional()?;
        let Some((step_order, state, is_completed, phase_id, section_id, line_item_id)) = row
        else {
            return Err(StoreError::StepNotFound);
        };
        if is_completed != 0 {
            return Err(StoreError::StepAlreadyCompleted);
        }

        let from = parse_step_state(&state)?;
        rl_core::state::check_completion(from)?;

        tx.execute(
            "UPDATE workflow_steps \
             SET state='COMPLETED', is_completed=1, completed_at_ms=?3, completed_by=?4, notes=?5, block_reason=NULL, updated_at_ms=?3 \
             WHERE project_id=?1 AND step_id=?2",
            params![project.as_str(), step_id, now_ms, actor_id, notes],
        )?;

        tx.execute(
            "INSERT INTO completed_items(project_id, phase_id, section_id, line_item_id, step_id, completed_at_ms, completed_by, notes) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                project.as_str(),
                phase_id,
                section_id,
                line_item_id,
                step_id,
                now_ms,
                actor_id,
                notes
            ],
        )?;

        close_step_alert_tx(&tx, project.as_str(), &step_id, "COMPLETED", now_ms)?;

        let pending = pending_orders_tx(&tx, project.as_str())?;
        let next = match rl_core::progression::next_step_order(&pending, step_order) {
            Some(order) => {
                let next_row = step_by_order_tx(&tx, project.as_str(), order)?;
                activate_step_tx(&tx, project.as_str(), &next_row, &tracker, now_ms)?;
                Some(StepRef {
                    step_id: next_row.step_id,
                    step_order: next_row.step_order,
                })
            }
            None => None,
        };

        let overall_progress = refresh_progress_tx(&tx, project.as_str(), now_ms)?;

        let payload = json!({
            "step_id": step_id.as_str(),
            "completed_by": actor_id.as_str(),
            "next_step_id": next.as_ref().map(|step| step.step_id.as_str()),
            "overall_progress": overall_progress
        });
        insert_event_tx(
            &tx,
            Some(project.as_str()),
            now_ms,
            Some(&step_id),
            "step_completed",
            &payload.to_string(),
        )?;

        tx.commit()?;
        Ok(CompleteStepResult {
            tracker_revision,
            completed: StepRef {
                step_id,
                step_order,
            },
            next,
            overall_progress,
        })
    }
}
