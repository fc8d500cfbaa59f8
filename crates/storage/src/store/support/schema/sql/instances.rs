#![forbid(unsafe_code)]

pub(super) const SQL: &str = r#"

        CREATE TABLE IF NOT EXISTS project_workflows (
          project_id TEXT PRIMARY KEY,
          workflow_type TEXT NOT NULL,
          status TEXT NOT NULL DEFAULT 'IN_PROGRESS',
          overall_progress INTEGER NOT NULL DEFAULT 0,
          created_at_ms INTEGER NOT NULL,
          updated_at_ms INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS workflow_steps (
          project_id TEXT NOT NULL,
          step_id TEXT NOT NULL,
          step_order INTEGER NOT NULL,
          state TEXT NOT NULL DEFAULT 'PENDING',
          is_completed INTEGER NOT NULL DEFAULT 0,
          completed_at_ms INTEGER,
          completed_by TEXT,
          notes TEXT,
          assignee TEXT,
          block_reason TEXT,
          phase_id TEXT NOT NULL,
          section_id TEXT NOT NULL,
          line_item_id TEXT NOT NULL,
          started_at_ms INTEGER,
          created_at_ms INTEGER NOT NULL,
          updated_at_ms INTEGER NOT NULL,
          PRIMARY KEY (project_id, step_id)
        );

        CREATE TABLE IF NOT EXISTS workflow_trackers (
          project_id TEXT PRIMARY KEY,
          revision INTEGER NOT NULL,
          current_phase_id TEXT NOT NULL,
          current_section_id TEXT,
          current_line_item_id TEXT,
          current_step_id TEXT,
          phase_started_at_ms INTEGER NOT NULL,
          section_started_at_ms INTEGER,
          line_item_started_at_ms INTEGER,
          updated_at_ms INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS completed_items (
          seq INTEGER PRIMARY KEY AUTOINCREMENT,
          project_id TEXT NOT NULL,
          phase_id TEXT NOT NULL,
          section_id TEXT NOT NULL,
          line_item_id TEXT NOT NULL,
          step_id TEXT NOT NULL,
          completed_at_ms INTEGER NOT NULL,
          completed_by TEXT NOT NULL,
          notes TEXT
        );
"#;
