#![forbid(unsafe_code)]

pub(super) const SQL: &str = r#"

        CREATE TABLE IF NOT EXISTS phase_templates (
          id TEXT PRIMARY KEY,
          workflow_type TEXT NOT NULL,
          version INTEGER NOT NULL,
          name TEXT NOT NULL,
          description TEXT,
          display_order INTEGER NOT NULL,
          active INTEGER NOT NULL DEFAULT 1,
          current INTEGER NOT NULL DEFAULT 1,
          created_at_ms INTEGER NOT NULL,
          updated_at_ms INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS section_templates (
          id TEXT PRIMARY KEY,
          phase_id TEXT NOT NULL,
          version INTEGER NOT NULL,
          name TEXT NOT NULL,
          display_order INTEGER NOT NULL,
          active INTEGER NOT NULL DEFAULT 1,
          current INTEGER NOT NULL DEFAULT 1,
          created_at_ms INTEGER NOT NULL,
          updated_at_ms INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS line_item_templates (
          id TEXT PRIMARY KEY,
          section_id TEXT NOT NULL,
          version INTEGER NOT NULL,
          name TEXT NOT NULL,
          description TEXT,
          responsible_role TEXT NOT NULL DEFAULT 'OFFICE',
          priority TEXT NOT NULL DEFAULT 'MEDIUM',
          alert_days INTEGER NOT NULL DEFAULT 1,
          display_order INTEGER NOT NULL,
          active INTEGER NOT NULL DEFAULT 1,
          current INTEGER NOT NULL DEFAULT 1,
          created_at_ms INTEGER NOT NULL,
          updated_at_ms INTEGER NOT NULL
        );
"#;
