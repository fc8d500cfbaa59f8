#![forbid(unsafe_code)]

use super::super::StoreError;
use rusqlite::{OptionalExtension, Transaction, params};

#[derive(Clone, Debug)]
pub(in crate::store) struct PhaseRowLite {
    pub(in crate::store) id: String,
    pub(in crate::store) name: String,
    pub(in crate::store) display_order: i64,
}

/// One instantiable unit of work under a phase, in traversal order.
#[derive(Clone, Debug)]
pub(in crate::store) struct LineItemSlot {
    pub(in crate::store) line_item_id: String,
    pub(in crate::store) section_id: String,
    pub(in crate::store) name: String,
    pub(in crate::store) responsible_role: String,
    pub(in crate::store) priority: String,
    pub(in crate::store) alert_days: i64,
}

pub(in crate::store) fn first_phase_tx(
    tx: &Transaction<'_>,
    workflow_type: &str,
) -> Result<Option<PhaseRowLite>, StoreError> {
    let value = tx
        .query_row(
            "SELECT id, name, display_order FROM phase_templates \
             WHERE workflow_type=?1 AND active=1 AND current=1 \
             ORDER BY display_order ASC LIMIT 1",
            params![workflow_type],
            |row| {
                Ok(PhaseRowLite {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    display_order: row.get(2)?,
                })
            },
        )
        .optional()?;
    Ok(value)
}

pub(in crate::store) fn next_phase_tx(
    tx: &Transaction<'_>,
    workflow_type: &str,
    after_display_order: i64,
) -> Result<Option<PhaseRowLite>, StoreError> {
    let value = tx
        .query_row(
            "SELECT id, name, display_order FROM phase_templates \
             WHERE workflow_type=?1 AND active=1 AND current=1 AND display_order > ?2 \
             ORDER BY display_order ASC LIMIT 1",
            params![workflow_type, after_display_order],
            |row| {
                Ok(PhaseRowLite {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    display_order: row.get(2)?,
                })
            },
        )
        .optional()?;
    Ok(value)
}

/// Display order of a phase the instance already references, regardless of
/// whether that template version is still current.
pub(in crate::store) fn phase_display_order_tx(
    tx: &Transaction<'_>,
    phase_id: &str,
) -> Result<i64, StoreError> {
    tx.query_row(
        "SELECT display_order FROM phase_templates WHERE id=?1",
        params![phase_id],
        |row| row.get(0),
    )
    .optional()?
    .ok_or(StoreError::NoActiveTemplate)
}

pub(in crate::store) fn phase_line_items_tx(
    tx: &Transaction<'_>,
    phase_id: &str,
) -> Result<Vec<LineItemSlot>, StoreError> {
    let mut stmt = tx.prepare(
        "SELECT li.id, li.section_id, li.name, li.responsible_role, li.priority, li.alert_days \
         FROM line_item_templates li \
         JOIN section_templates s ON s.id = li.section_id \
         WHERE s.phase_id=?1 AND s.active=1 AND s.current=1 AND li.active=1 AND li.current=1 \
         ORDER BY s.display_order ASC, li.display_order ASC",
    )?;
    let rows = stmt.query_map(params![phase_id], |row| {
        Ok(LineItemSlot {
            line_item_id: row.get(0)?,
            section_id: row.get(1)?,
            name: row.get(2)?,
            responsible_role: row.get(3)?,
            priority: row.get(4)?,
            alert_days: row.get(5)?,
        })
    })?;
    Ok(rows.collect::<Result<Vec<_>, _>>()?)
}
