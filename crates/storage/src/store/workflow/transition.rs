#![forbid(unsafe_code)]

use super::*;
use serde_json::json;

impl SqliteStore {
    /// Explicit state-machine moves between completions: start, block,
    /// resume, skip, reopen. Legality always comes from the step's true
    /// current state; an illegal request fails naming the pair and changes
    /// nothing.
    pub fn workflow_set_step_state(
        &mut self,
        project: &ProjectId,
        request: WorkflowSetStepStateRequest,
    ) -> Result<SetStepStateResult, StoreError> {
        let WorkflowSetStepStateRequest {
            step_id,
            expected_revision,
            target,
            reason,
        } = request;

        let now_ms = now_ms();
        let tx = self.conn.transaction()?;

        let tracker_revision =
            bump_tracker_revision_tx(&tx, project.as_str(), expected_revision, now_ms)?;
        let tracker = tracker_state_tx(&tx, project.as_str())?;

        let row = tx
            .query_row(
                "SELECT step_order, state, is_completed, assignee, phase_id, section_id, line_item_id \
                 FROM workflow_steps WHERE project_id=?1 AND step_id=?2",
                params![project.as_str(), step_id],
                |row| {
                    Ok((
                        row.get::<_, i64>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, i64>(2)?,
                        row.get::<_, Option<String>>(3)?,
                        row.get::<_, String>(4)?,
                        row.get::<_, String>(5)?,
                        row.get::<_, String>(6)?,
                    ))
                },
            )
            .optional()?;
        let Some((step_order, state, _is_completed, assignee, phase_id, section_id, line_item_id)) =
            row
        else {
            return Err(StoreError::StepNotFound);
        };

        let from = parse_step_state(&state)?;
        if target == StepState::Completed {
            return Err(StoreError::InvalidInput(
                "completion must go through workflow_complete_step",
            ));
        }
        rl_core::state::check_transition(from, target, assignee.is_some())?;

        let mut next = None;
        match target {
            StepState::Skipped => {
                tx.execute(
                    "UPDATE workflow_steps SET state='SKIPPED', block_reason=NULL, updated_at_ms=?3 \
                     WHERE project_id=?1 AND step_id=?2",
                    params![project.as_str(), step_id, now_ms],
                )?;
                close_step_alert_tx(&tx, project.as_str(), &step_id, "DISMISSED", now_ms)?;

                if tracker.current_step_id.as_deref() == Some(step_id.as_str()) {
                    let pending = pending_orders_tx(&tx, project.as_str())?;
                    if let Some(order) =
                        rl_core::progression::next_step_order(&pending, step_order)
                    {
                        let next_row = step_by_order_tx(&tx, project.as_str(), order)?;
                        activate_step_tx(&tx, project.as_str(), &next_row, &tracker, now_ms)?;
                        next = Some(StepRef {
                            step_id: next_row.step_id,
                            step_order: next_row.step_order,
                        });
                    }
                }
            }
            StepState::Active => {
                let other_active = tx
                    .query_row(
                        "SELECT step_id FROM workflow_steps \
                         WHERE project_id=?1 AND state IN ('ACTIVE', 'IN_PROGRESS') AND step_id<>?2 \
                         LIMIT 1",
                        params![project.as_str(), step_id],
                        |row| row.get::<_, String>(0),
                    )
                    .optional()?;
                if other_active.is_some() {
                    return Err(StoreError::InvalidInput(
                        "another step is already active",
                    ));
                }

                let slot = StepSlotRow {
                    step_id: step_id.clone(),
                    step_order,
                    state: from,
                    phase_id,
                    section_id,
                    line_item_id,
                };
                activate_step_tx(&tx, project.as_str(), &slot, &tracker, now_ms)?;

                if from == StepState::Completed {
                    tx.execute(
                        "UPDATE workflow_steps \
                         SET is_completed=0, completed_at_ms=NULL, completed_by=NULL, updated_at_ms=?3 \
                         WHERE project_id=?1 AND step_id=?2",
                        params![project.as_str(), step_id, now_ms],
                    )?;
                }
                if from == StepState::Blocked {
                    tx.execute(
                        "UPDATE workflow_steps SET block_reason=NULL, updated_at_ms=?3 \
                         WHERE project_id=?1 AND step_id=?2",
                        params![project.as_str(), step_id, now_ms],
                    )?;
                }

                // Reopening the last step of a finished workflow resurrects it.
                tx.execute(
                    "UPDATE project_workflows SET status='IN_PROGRESS', updated_at_ms=?2 \
                     WHERE project_id=?1 AND status='COMPLETE'",
                    params![project.as_str(), now_ms],
                )?;
            }
            StepState::InProgress => {
                tx.execute(
                    "UPDATE workflow_steps SET state='IN_PROGRESS', block_reason=NULL, updated_at_ms=?3 \
                     WHERE project_id=?1 AND step_id=?2",
                    params![project.as_str(), step_id, now_ms],
                )?;
            }
            StepState::Blocked => {
                tx.execute(
                    "UPDATE workflow_steps SET state='BLOCKED', block_reason=?3, updated_at_ms=?4 \
                     WHERE project_id=?1 AND step_id=?2",
                    params![project.as_str(), step_id, reason, now_ms],
                )?;
            }
            StepState::Pending | StepState::Completed => {
                return Err(StoreError::IllegalTransition { from, to: target });
            }
        }

        let overall_progress = refresh_progress_tx(&tx, project.as_str(), now_ms)?;

        let payload = json!({
            "step_id": step_id.as_str(),
            "from": from.as_str(),
            "to": target.as_str(),
            "reason": reason.as_deref()
        });
        insert_event_tx(
            &tx,
            Some(project.as_str()),
            now_ms,
            Some(&step_id),
            "step_state_changed",
            &payload.to_string(),
        )?;

        tx.commit()?;
        Ok(SetStepStateResult {
            tracker_revision,
            step: StepRef {
                step_id,
                step_order,
            },
            state: target,
            next,
            overall_progress,
        })
    }

    pub fn workflow_assign_step(
        &mut self,
        project: &ProjectId,
        request: WorkflowAssignStepRequest,
    ) -> Result<i64, StoreError> {
        let WorkflowAssignStepRequest {
            step_id,
            expected_revision,
            assignee,
        } = request;
        if assignee.as_deref().is_some_and(|value| value.trim().is_empty()) {
            return Err(StoreError::InvalidInput("assignee must not be empty"));
        }

        let now_ms = now_ms();
        let tx = self.conn.transaction()?;

        let tracker_revision =
            bump_tracker_revision_tx(&tx, project.as_str(), expected_revision, now_ms)?;

        let changed = tx.execute(
            "UPDATE workflow_steps SET assignee=?3, updated_at_ms=?4 \
             WHERE project_id=?1 AND step_id=?2",
            params![project.as_str(), step_id, assignee, now_ms],
        )?;
        if changed == 0 {
            return Err(StoreError::StepNotFound);
        }

        let payload = json!({
            "step_id": step_id.as_str(),
            "assignee": assignee.as_deref()
        });
        insert_event_tx(
            &tx,
            Some(project.as_str()),
            now_ms,
            Some(&step_id),
            "step_assigned",
            &payload.to_string(),
        )?;

        tx.commit()?;
        Ok(tracker_revision)
    }
}
