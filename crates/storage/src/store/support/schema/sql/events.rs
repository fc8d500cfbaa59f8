#![forbid(unsafe_code)]

pub(super) const SQL: &str = r#"

        CREATE TABLE IF NOT EXISTS workflow_events (
          seq INTEGER PRIMARY KEY AUTOINCREMENT,
          project_id TEXT,
          ts_ms INTEGER NOT NULL,
          step_id TEXT,
          type TEXT NOT NULL,
          payload_json TEXT NOT NULL
        );
"#;
