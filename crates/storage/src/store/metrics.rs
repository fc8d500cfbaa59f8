#![forbid(unsafe_code)]

use super::*;

impl SqliteStore {
    /// Aggregate completion counts and average step duration per phase,
    /// across all projects of a workflow type. A read-only projection over
    /// the ledger; not part of the transactional path.
    pub fn phase_metrics(&self, workflow_type: &str) -> Result<Vec<PhaseMetricsRow>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT p.id, p.name, COUNT(ci.seq), \
                    CAST(AVG(CASE WHEN ws.started_at_ms IS NOT NULL \
                                  THEN ci.completed_at_ms - ws.started_at_ms END) AS INTEGER) \
             FROM completed_items ci \
             JOIN phase_templates p ON p.id = ci.phase_id \
             LEFT JOIN workflow_steps ws \
               ON ws.project_id = ci.project_id AND ws.step_id = ci.step_id \
             WHERE p.workflow_type=?1 \
             GROUP BY p.id, p.name, p.display_order \
             ORDER BY p.display_order ASC",
        )?;
        let rows = stmt.query_map(params![workflow_type], |row| {
            Ok(PhaseMetricsRow {
                phase_id: row.get(0)?,
                phase_name: row.get(1)?,
                completed_count: row.get(2)?,
                avg_completion_ms: row.get(3)?,
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }
}
