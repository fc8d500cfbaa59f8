#![forbid(unsafe_code)]

mod alerts;
mod core;
mod events;
mod indexes;
mod instances;
mod templates;

pub(super) fn full_schema_sql() -> String {
    let mut sql = String::new();
    sql.push_str(core::SQL);
    sql.push_str(templates::SQL);
    sql.push_str(instances::SQL);
    sql.push_str(alerts::SQL);
    sql.push_str(events::SQL);
    sql.push_str(indexes::SQL);
    sql
}
