#![forbid(unsafe_code)]

mod alerts_tx;
mod events_tx;
mod schema;
mod template_tx;
mod tracker_tx;

pub(in crate::store) use alerts_tx::{close_step_alert_tx, ensure_step_alert_tx};
pub(in crate::store) use events_tx::insert_event_tx;
pub(in crate::store) use schema::migrate_sqlite_schema;
pub(in crate::store) use template_tx::{
    LineItemSlot, PhaseRowLite, first_phase_tx, next_phase_tx, phase_display_order_tx,
    phase_line_items_tx,
};
pub(in crate::store) use tracker_tx::{TrackerState, bump_tracker_revision_tx, tracker_state_tx};
