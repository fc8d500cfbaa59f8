#![forbid(unsafe_code)]

use super::*;
use serde_json::json;

impl SqliteStore {
    pub fn alerts_list(
        &self,
        project: &ProjectId,
        request: AlertsListRequest,
    ) -> Result<Vec<AlertRow>, StoreError> {
        let AlertsListRequest {
            status,
            due_before_ms,
            limit,
        } = request;
        let limit = to_sqlite_i64(limit)?;

        let mut stmt = self.conn.prepare(
            "SELECT seq, project_id, step_id, phase_id, section_id, title, message, priority, status, responsible_role, due_at_ms, created_at_ms, updated_at_ms \
             FROM workflow_alerts \
             WHERE project_id=?1 \
               AND (?2 IS NULL OR status=?2) \
               AND (?3 IS NULL OR due_at_ms <= ?3) \
             ORDER BY due_at_ms ASC, seq ASC \
             LIMIT ?4",
        )?;
        let rows = stmt.query_map(
            params![
                project.as_str(),
                status.map(AlertStatus::as_str),
                due_before_ms,
                limit
            ],
            |row| {
                Ok((
                    AlertRow {
                        seq: row.get(0)?,
                        project_id: row.get(1)?,
                        step_id: row.get(2)?,
                        phase_id: row.get(3)?,
                        section_id: row.get(4)?,
                        title: row.get(5)?,
                        message: row.get(6)?,
                        priority: row.get(7)?,
                        status: AlertStatus::Active,
                        responsible_role: row.get(9)?,
                        due_at_ms: row.get(10)?,
                        created_at_ms: row.get(11)?,
                        updated_at_ms: row.get(12)?,
                    },
                    row.get::<_, String>(8)?,
                ))
            },
        )?;

        let mut out = Vec::new();
        for row in rows {
            let (mut alert, status) = row?;
            alert.status = AlertStatus::parse(&status)
                .ok_or(StoreError::InvalidInput("unrecognized alert status"))?;
            out.push(alert);
        }
        Ok(out)
    }

    /// Retires an alert without completing its step. A no-op on alerts
    /// that already left ACTIVE.
    pub fn alert_dismiss(
        &mut self,
        project: &ProjectId,
        alert_seq: i64,
    ) -> Result<AlertStatus, StoreError> {
        let now_ms = now_ms();
        let tx = self.conn.transaction()?;

        let row = tx
            .query_row(
                "SELECT status, step_id FROM workflow_alerts WHERE project_id=?1 AND seq=?2",
                params![project.as_str(), alert_seq],
                |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)),
            )
            .optional()?;
        let Some((status, step_id)) = row else {
            return Err(StoreError::AlertNotFound);
        };
        let status = AlertStatus::parse(&status)
            .ok_or(StoreError::InvalidInput("unrecognized alert status"))?;
        if status != AlertStatus::Active {
            return Ok(status);
        }

        tx.execute(
            "UPDATE workflow_alerts SET status='DISMISSED', updated_at_ms=?3 \
             WHERE project_id=?1 AND seq=?2",
            params![project.as_str(), alert_seq, now_ms],
        )?;

        let payload = json!({
            "alert": alert_seq,
            "step_id": step_id.as_str()
        });
        insert_event_tx(
            &tx,
            Some(project.as_str()),
            now_ms,
            Some(&step_id),
            "alert_dismissed",
            &payload.to_string(),
        )?;

        tx.commit()?;
        Ok(AlertStatus::Dismissed)
    }
}
