#![forbid(unsafe_code)]

use super::*;
use serde_json::json;

impl SqliteStore {
    /// Installs a full template tree as the new current version for a
    /// workflow type. The previous version's rows are retired (current=0)
    /// in the same transaction; live project instances keep referencing
    /// them by id.
    pub fn template_install(
        &mut self,
        request: TemplateInstallRequest,
    ) -> Result<TemplateInstallResult, StoreError> {
        let TemplateInstallRequest {
            workflow_type,
            phases,
        } = request;
        validate_template_tree(&workflow_type, &phases)?;

        let now_ms = now_ms();
        let tx = self.conn.transaction()?;

        let version: i64 = tx.query_row(
            "SELECT COALESCE(MAX(version), 0) + 1 FROM phase_templates WHERE workflow_type=?1",
            params![workflow_type],
            |row| row.get(0),
        )?;

        // Retire leaves first so the phase scope is still addressable.
        tx.execute(
            "UPDATE line_item_templates SET current=0, updated_at_ms=?2 \
             WHERE section_id IN ( \
                 SELECT s.id FROM section_templates s \
                 JOIN phase_templates p ON p.id = s.phase_id \
                 WHERE p.workflow_type=?1 AND p.current=1 \
             )",
            params![workflow_type, now_ms],
        )?;
        tx.execute(
            "UPDATE section_templates SET current=0, updated_at_ms=?2 \
             WHERE phase_id IN ( \
                 SELECT id FROM phase_templates WHERE workflow_type=?1 AND current=1 \
             )",
            params![workflow_type, now_ms],
        )?;
        tx.execute(
            "UPDATE phase_templates SET current=0, updated_at_ms=?2 \
             WHERE workflow_type=?1 AND current=1",
            params![workflow_type, now_ms],
        )?;

        let mut line_item_count = 0usize;
        for phase in &phases {
            let phase_id = format!("{workflow_type}:v{version}:p{}", phase.display_order);
            tx.execute(
                "INSERT INTO phase_templates(id, workflow_type, version, name, description, display_order, active, current, created_at_ms, updated_at_ms) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, 1, 1, ?7, ?7)",
                params![
                    phase_id,
                    workflow_type,
                    version,
                    phase.name,
                    phase.description,
                    phase.display_order,
                    now_ms
                ],
            )?;

            for section in &phase.sections {
                let section_id = format!("{phase_id}.s{}", section.display_order);
                tx.execute(
                    "INSERT INTO section_templates(id, phase_id, version, name, display_order, active, current, created_at_ms, updated_at_ms) \
                     VALUES (?1, ?2, ?3, ?4, ?5, 1, 1, ?6, ?6)",
                    params![
                        section_id,
                        phase_id,
                        version,
                        section.name,
                        section.display_order,
                        now_ms
                    ],
                )?;

                for line_item in &section.line_items {
                    let line_item_id = format!("{section_id}.i{}", line_item.display_order);
                    tx.execute(
                        "INSERT INTO line_item_templates(id, section_id, version, name, description, responsible_role, priority, alert_days, display_order, active, current, created_at_ms, updated_at_ms) \
                         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, 1, 1, ?10, ?10)",
                        params![
                            line_item_id,
                            section_id,
                            version,
                            line_item.name,
                            line_item.description,
                            line_item.responsible_role,
                            line_item.priority,
                            line_item.alert_days,
                            line_item.display_order,
                            now_ms
                        ],
                    )?;
                    line_item_count += 1;
                }
            }
        }

        let payload = json!({
            "workflow_type": workflow_type.as_str(),
            "version": version,
            "phases": phases.len(),
            "line_items": line_item_count
        });
        insert_event_tx(&tx, None, now_ms, None, "template_installed", &payload.to_string())?;

        tx.commit()?;
        Ok(TemplateInstallResult {
            workflow_type,
            version,
            phase_count: phases.len(),
            line_item_count,
        })
    }

    /// The active+current template tree for a workflow type, in display
    /// order at every level. Empty when nothing is installed.
    pub fn template_tree(&self, workflow_type: &str) -> Result<Vec<TemplatePhaseNode>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, workflow_type, version, name, description, display_order, active, current \
             FROM phase_templates \
             WHERE workflow_type=?1 AND active=1 AND current=1 \
             ORDER BY display_order ASC",
        )?;
        let phases = stmt
            .query_map(params![workflow_type], |row| {
                Ok(PhaseTemplateRow {
                    id: row.get(0)?,
                    workflow_type: row.get(1)?,
                    version: row.get(2)?,
                    name: row.get(3)?,
                    description: row.get(4)?,
                    display_order: row.get(5)?,
                    active: row.get::<_, i64>(6)? != 0,
                    current: row.get::<_, i64>(7)? != 0,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let mut out = Vec::new();
        for phase in phases {
            let mut stmt = self.conn.prepare(
                "SELECT id, phase_id, version, name, display_order, active, current \
                 FROM section_templates \
                 WHERE phase_id=?1 AND active=1 AND current=1 \
                 ORDER BY display_order ASC",
            )?;
            let sections = stmt
                .query_map(params![phase.id], |row| {
                    Ok(SectionTemplateRow {
                        id: row.get(0)?,
                        phase_id: row.get(1)?,
                        version: row.get(2)?,
                        name: row.get(3)?,
                        display_order: row.get(4)?,
                        active: row.get::<_, i64>(5)? != 0,
                        current: row.get::<_, i64>(6)? != 0,
                    })
                })?
                .collect::<Result<Vec<_>, _>>()?;

            let mut section_nodes = Vec::new();
            for section in sections {
                let mut stmt = self.conn.prepare(
                    "SELECT id, section_id, version, name, description, responsible_role, priority, alert_days, display_order, active, current \
                     FROM line_item_templates \
                     WHERE section_id=?1 AND active=1 AND current=1 \
                     ORDER BY display_order ASC",
                )?;
                let line_items = stmt
                    .query_map(params![section.id], |row| {
                        Ok(LineItemTemplateRow {
                            id: row.get(0)?,
                            section_id: row.get(1)?,
                            version: row.get(2)?,
                            name: row.get(3)?,
                            description: row.get(4)?,
                            responsible_role: row.get(5)?,
                            priority: row.get(6)?,
                            alert_days: row.get(7)?,
                            display_order: row.get(8)?,
                            active: row.get::<_, i64>(9)? != 0,
                            current: row.get::<_, i64>(10)? != 0,
                        })
                    })?
                    .collect::<Result<Vec<_>, _>>()?;
                section_nodes.push(TemplateSectionNode {
                    section,
                    line_items,
                });
            }
            out.push(TemplatePhaseNode {
                phase,
                sections: section_nodes,
            });
        }
        Ok(out)
    }
}

fn validate_template_tree(
    workflow_type: &str,
    phases: &[TemplatePhaseSpec],
) -> Result<(), StoreError> {
    if workflow_type.trim().is_empty() {
        return Err(StoreError::InvalidInput("workflow_type must not be empty"));
    }
    if phases.is_empty() {
        return Err(StoreError::InvalidInput("template has no phases"));
    }

    let mut phase_orders = BTreeSet::new();
    for phase in phases {
        if phase.name.trim().is_empty() {
            return Err(StoreError::InvalidInput("phase name must not be empty"));
        }
        if !phase_orders.insert(phase.display_order) {
            return Err(StoreError::InvalidInput("duplicate phase display order"));
        }
        if phase.sections.is_empty() {
            return Err(StoreError::InvalidInput("phase has no sections"));
        }

        let mut section_orders = BTreeSet::new();
        for section in &phase.sections {
            if section.name.trim().is_empty() {
                return Err(StoreError::InvalidInput("section name must not be empty"));
            }
            if !section_orders.insert(section.display_order) {
                return Err(StoreError::InvalidInput("duplicate section display order"));
            }
            if section.line_items.is_empty() {
                return Err(StoreError::InvalidInput("section has no line items"));
            }

            let mut item_orders = BTreeSet::new();
            for line_item in &section.line_items {
                if line_item.name.trim().is_empty() {
                    return Err(StoreError::InvalidInput("line item name must not be empty"));
                }
                if !item_orders.insert(line_item.display_order) {
                    return Err(StoreError::InvalidInput(
                        "duplicate line item display order",
                    ));
                }
                if line_item.alert_days < 0 {
                    return Err(StoreError::InvalidInput("alert_days must not be negative"));
                }
            }
        }
    }
    Ok(())
}
