#![forbid(unsafe_code)]

use super::*;
use serde_json::json;

impl SqliteStore {
    /// Materializes the first phase of the workflow type's current template
    /// as live steps and positions the tracker at step one. Either the
    /// whole instance (workflow, steps, tracker, alert) becomes visible or
    /// nothing does.
    pub fn workflow_initialize(
        &mut self,
        project: &ProjectId,
        request: WorkflowInitializeRequest,
    ) -> Result<WorkflowInitializeResult, StoreError> {
        let WorkflowInitializeRequest { workflow_type } = request;
        if workflow_type.trim().is_empty() {
            return Err(StoreError::InvalidInput("workflow_type must not be empty"));
        }

        let now_ms = now_ms();
        let tx = self.conn.transaction()?;

        let existing = tx
            .query_row(
                "SELECT 1 FROM project_workflows WHERE project_id=?1",
                params![project.as_str()],
                |row| row.get::<_, i64>(0),
            )
            .optional()?;
        if existing.is_some() {
            return Err(StoreError::WorkflowAlreadyInitialized);
        }

        let Some(phase) = first_phase_tx(&tx, &workflow_type)? else {
            return Err(StoreError::NoActiveTemplate);
        };
        let slots = phase_line_items_tx(&tx, &phase.id)?;
        if slots.is_empty() {
            return Err(StoreError::NoActiveTemplate);
        }

        tx.execute(
            "INSERT INTO project_workflows(project_id, workflow_type, status, overall_progress, created_at_ms, updated_at_ms) \
             VALUES (?1, ?2, 'IN_PROGRESS', 0, ?3, ?3)",
            params![project.as_str(), workflow_type, now_ms],
        )?;

        for (index, slot) in slots.iter().enumerate() {
            let order = to_sqlite_i64(index + 1)?;
            let state = if index == 0 {
                StepState::Active
            } else {
                StepState::Pending
            };
            let started_at_ms = if index == 0 { Some(now_ms) } else { None };
            tx.execute(
                "INSERT INTO workflow_steps(project_id, step_id, step_order, state, is_completed, phase_id, section_id, line_item_id, started_at_ms, created_at_ms, updated_at_ms) \
                 VALUES (?1, ?2, ?3, ?4, 0, ?5, ?6, ?7, ?8, ?9, ?9)",
                params![
                    project.as_str(),
                    step_id_for_order(order),
                    order,
                    state.as_str(),
                    phase.id,
                    slot.section_id,
                    slot.line_item_id,
                    started_at_ms,
                    now_ms
                ],
            )?;
        }

        let first = &slots[0];
        let first_step = StepRef {
            step_id: step_id_for_order(1),
            step_order: 1,
        };
        tx.execute(
            "INSERT INTO workflow_trackers(project_id, revision, current_phase_id, current_section_id, current_line_item_id, current_step_id, phase_started_at_ms, section_started_at_ms, line_item_started_at_ms, updated_at_ms) \
             VALUES (?1, 1, ?2, ?3, ?4, ?5, ?6, ?6, ?6, ?6)",
            params![
                project.as_str(),
                phase.id,
                first.section_id,
                first.line_item_id,
                first_step.step_id,
                now_ms
            ],
        )?;

        let alert_seq = ensure_step_alert_tx(
            &tx,
            project.as_str(),
            &first_step.step_id,
            &phase.id,
            &first.section_id,
            &first.line_item_id,
            now_ms,
        )?;

        let payload = json!({
            "workflow_type": workflow_type,
            "phase_id": phase.id,
            "steps": slots.len()
        });
        insert_event_tx(
            &tx,
            Some(project.as_str()),
            now_ms,
            Some(&first_step.step_id),
            "workflow_initialized",
            &payload.to_string(),
        )?;

        tx.commit()?;
        Ok(WorkflowInitializeResult {
            tracker_revision: 1,
            step_count: slots.len(),
            first_step,
            alert_seq,
        })
    }
}
