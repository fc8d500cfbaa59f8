#![forbid(unsafe_code)]

use super::*;

impl SqliteStore {
    /// The append-only completion ledger in completion order.
    pub fn history_list(
        &self,
        project: &ProjectId,
        request: HistoryListRequest,
    ) -> Result<Vec<CompletedItemRow>, StoreError> {
        self.workflow_get(project)?;

        let HistoryListRequest { limit, offset } = request;
        let limit = to_sqlite_i64(limit)?;
        let offset = to_sqlite_i64(offset)?;

        let mut stmt = self.conn.prepare(
            "SELECT seq, project_id, phase_id, section_id, line_item_id, step_id, completed_at_ms, completed_by, notes \
             FROM completed_items \
             WHERE project_id=?1 \
             ORDER BY completed_at_ms ASC, seq ASC \
             LIMIT ?2 OFFSET ?3",
        )?;
        let rows = stmt.query_map(params![project.as_str(), limit, offset], |row| {
            Ok(CompletedItemRow {
                seq: row.get(0)?,
                project_id: row.get(1)?,
                phase_id: row.get(2)?,
                section_id: row.get(3)?,
                line_item_id: row.get(4)?,
                step_id: row.get(5)?,
                completed_at_ms: row.get(6)?,
                completed_by: row.get(7)?,
                notes: row.get(8)?,
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    pub fn events_list(
        &self,
        project: &ProjectId,
        limit: usize,
    ) -> Result<Vec<EventRow>, StoreError> {
        let limit = to_sqlite_i64(limit)?;
        let mut stmt = self.conn.prepare(
            "SELECT seq, ts_ms, project_id, step_id, type, payload_json \
             FROM workflow_events \
             WHERE project_id=?1 \
             ORDER BY seq ASC \
             LIMIT ?2",
        )?;
        let rows = stmt.query_map(params![project.as_str(), limit], |row| {
            Ok(EventRow {
                seq: row.get(0)?,
                ts_ms: row.get(1)?,
                project_id: row.get(2)?,
                step_id: row.get(3)?,
                event_type: row.get(4)?,
                payload_json: row.get(5)?,
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }
}
