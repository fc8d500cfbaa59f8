#![forbid(unsafe_code)]

use super::*;

const RECENT_HISTORY_LIMIT: i64 = 10;

impl SqliteStore {
    pub fn workflow_get(&self, project: &ProjectId) -> Result<WorkflowRow, StoreError> {
        let row = self
            .conn
            .query_row(
                "SELECT workflow_type, status, overall_progress, created_at_ms, updated_at_ms \
                 FROM project_workflows WHERE project_id=?1",
                params![project.as_str()],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, i64>(2)?,
                        row.get::<_, i64>(3)?,
                        row.get::<_, i64>(4)?,
                    ))
                },
            )
            .optional()?;
        let Some((workflow_type, status, overall_progress, created_at_ms, updated_at_ms)) = row
        else {
            return Err(StoreError::UnknownProject);
        };
        Ok(WorkflowRow {
            project_id: project.as_str().to_string(),
            workflow_type,
            status: WorkflowStatus::parse(&status)
                .ok_or(StoreError::InvalidInput("unrecognized workflow status"))?,
            overall_progress,
            created_at_ms,
            updated_at_ms,
        })
    }

    pub fn workflow_tracker(&self, project: &ProjectId) -> Result<TrackerRow, StoreError> {
        let row = self
            .conn
            .query_row(
                "SELECT revision, current_phase_id, current_section_id, current_line_item_id, current_step_id, \
                        phase_started_at_ms, section_started_at_ms, line_item_started_at_ms, updated_at_ms \
                 FROM workflow_trackers WHERE project_id=?1",
                params![project.as_str()],
                |row| {
                    Ok(TrackerRow {
                        project_id: String::new(),
                        revision: row.get(0)?,
                        current_phase_id: row.get(1)?,
                        current_section_id: row.get(2)?,
                        current_line_item_id: row.get(3)?,
                        current_step_id: row.get(4)?,
                        phase_started_at_ms: row.get(5)?,
                        section_started_at_ms: row.get(6)?,
                        line_item_started_at_ms: row.get(7)?,
                        updated_at_ms: row.get(8)?,
                    })
                },
            )
            .optional()?;
        match row {
            Some(mut tracker) => {
                tracker.project_id = project.as_str().to_string();
                Ok(tracker)
            }
            None => Err(StoreError::UnknownProject),
        }
    }

    pub fn workflow_steps_list(&self, project: &ProjectId) -> Result<Vec<StepRow>, StoreError> {
        self.workflow_get(project)?;

        let mut stmt = self.conn.prepare(
            "SELECT step_id, step_order, state, is_completed, completed_at_ms, completed_by, notes, \
                    assignee, block_reason, phase_id, section_id, line_item_id, started_at_ms, \
                    created_at_ms, updated_at_ms \
             FROM workflow_steps WHERE project_id=?1 ORDER BY step_order ASC",
        )?;
        let rows = stmt.query_map(params![project.as_str()], |row| {
            Ok((
                StepRow {
                    step_id: row.get(0)?,
                    step_order: row.get(1)?,
                    state: StepState::Pending,
                    is_completed: row.get::<_, i64>(3)? != 0,
                    completed_at_ms: row.get(4)?,
                    completed_by: row.get(5)?,
                    notes: row.get(6)?,
                    assignee: row.get(7)?,
                    block_reason: row.get(8)?,
                    phase_id: row.get(9)?,
                    section_id: row.get(10)?,
                    line_item_id: row.get(11)?,
                    started_at_ms: row.get(12)?,
                    created_at_ms: row.get(13)?,
                    updated_at_ms: row.get(14)?,
                },
                row.get::<_, String>(2)?,
            ))
        })?;

        let mut out = Vec::new();
        for row in rows {
            let (mut step, state) = row?;
            step.state = StepState::parse(&state)
                .ok_or(StoreError::InvalidInput("unrecognized step state"))?;
            out.push(step);
        }
        Ok(out)
    }

    /// Read-only projection for UI and reporting: position names, progress,
    /// open alerts, and the most recent completions.
    pub fn workflow_status(&self, project: &ProjectId) -> Result<WorkflowStatusView, StoreError> {
        let workflow = self.workflow_get(project)?;
        let tracker = self.workflow_tracker(project)?;

        let current_phase = self.template_name("phase_templates", &tracker.current_phase_id)?;
        let current_section = match tracker.current_section_id.as_deref() {
            Some(id) => self.template_name("section_templates", id)?,
            None => None,
        };
        let current_line_item = match tracker.current_line_item_id.as_deref() {
            Some(id) => self.template_name("line_item_templates", id)?,
            None => None,
        };

        let active_alert_count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM workflow_alerts WHERE project_id=?1 AND status='ACTIVE'",
            params![project.as_str()],
            |row| row.get(0),
        )?;

        let mut stmt = self.conn.prepare(
            "SELECT ci.seq, COALESCE(p.name, ci.phase_id), COALESCE(s.name, ci.section_id), \
                    COALESCE(li.name, ci.line_item_id), ci.completed_at_ms, ci.completed_by \
             FROM completed_items ci \
             LEFT JOIN phase_templates p ON p.id = ci.phase_id \
             LEFT JOIN section_templates s ON s.id = ci.section_id \
             LEFT JOIN line_item_templates li ON li.id = ci.line_item_id \
             WHERE ci.project_id=?1 \
             ORDER BY ci.completed_at_ms DESC, ci.seq DESC \
             LIMIT ?2",
        )?;
        let rows = stmt.query_map(params![project.as_str(), RECENT_HISTORY_LIMIT], |row| {
            Ok(HistoryEntryView {
                seq: row.get(0)?,
                phase_name: row.get(1)?,
                section_name: row.get(2)?,
                line_item_name: row.get(3)?,
                completed_at_ms: row.get(4)?,
                completed_by: row.get(5)?,
            })
        })?;
        let recent_history = rows.collect::<Result<Vec<_>, _>>()?;

        Ok(WorkflowStatusView {
            project_id: project.as_str().to_string(),
            workflow_type: workflow.workflow_type,
            status: workflow.status,
            overall_progress: workflow.overall_progress,
            tracker_revision: tracker.revision,
            current_phase,
            current_section,
            current_line_item,
            current_step_id: tracker.current_step_id,
            active_alert_count,
            recent_history,
        })
    }

    fn template_name(
        &self,
        table: &str,
        id: &str,
    ) -> Result<Option<TemplateNameRef>, StoreError> {
        let sql = format!("SELECT name FROM {table} WHERE id=?1");
        let name = self
            .conn
            .query_row(&sql, params![id], |row| row.get::<_, String>(0))
            .optional()?;
        Ok(name.map(|name| TemplateNameRef {
            id: id.to_string(),
            name,
        }))
    }
}
