#![forbid(unsafe_code)]

use super::*;

impl SqliteStore {
    /// Case-insensitive substring lookup over active+current line items,
    /// for operator tooling. Reads only the template graph.
    pub fn line_items_search(
        &self,
        request: LineItemSearchRequest,
    ) -> Result<Vec<LineItemHit>, StoreError> {
        let LineItemSearchRequest {
            workflow_type,
            query,
            limit,
        } = request;
        let query = query.trim();
        if query.is_empty() {
            return Err(StoreError::InvalidInput("search query must not be empty"));
        }
        let limit = to_sqlite_i64(limit)?;
        let pattern = format!("%{}%", escape_like(query));

        let mut stmt = self.conn.prepare(
            "SELECT li.id, p.workflow_type, p.name, s.name, li.name, li.description \
             FROM line_item_templates li \
             JOIN section_templates s ON s.id = li.section_id \
             JOIN phase_templates p ON p.id = s.phase_id \
             WHERE li.active=1 AND li.current=1 \
               AND s.active=1 AND s.current=1 \
               AND p.active=1 AND p.current=1 \
               AND (li.name LIKE ?1 ESCAPE '\\' OR li.description LIKE ?1 ESCAPE '\\') \
               AND (?2 IS NULL OR p.workflow_type=?2) \
             ORDER BY p.display_order ASC, s.display_order ASC, li.display_order ASC \
             LIMIT ?3",
        )?;
        let rows = stmt.query_map(params![pattern, workflow_type, limit], |row| {
            Ok(LineItemHit {
                line_item_id: row.get(0)?,
                workflow_type: row.get(1)?,
                phase_name: row.get(2)?,
                section_name: row.get(3)?,
                name: row.get(4)?,
                description: row.get(5)?,
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }
}

fn escape_like(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}
