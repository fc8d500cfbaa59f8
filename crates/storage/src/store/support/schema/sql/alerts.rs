#![forbid(unsafe_code)]

pub(super) const SQL: &str = r#"

        CREATE TABLE IF NOT EXISTS workflow_alerts (
          seq INTEGER PRIMARY KEY AUTOINCREMENT,
          project_id TEXT NOT NULL,
          step_id TEXT NOT NULL,
          phase_id TEXT NOT NULL,
          section_id TEXT NOT NULL,
          title TEXT NOT NULL,
          message TEXT NOT NULL,
          priority TEXT NOT NULL DEFAULT 'MEDIUM',
          status TEXT NOT NULL DEFAULT 'ACTIVE',
          responsible_role TEXT NOT NULL,
          due_at_ms INTEGER NOT NULL,
          created_at_ms INTEGER NOT NULL,
          updated_at_ms INTEGER NOT NULL
        );
"#;
