#![forbid(unsafe_code)]

pub(super) const SQL: &str = r#"

        CREATE INDEX IF NOT EXISTS idx_phase_templates_type_order
          ON phase_templates(workflow_type, current, active, display_order);
        CREATE UNIQUE INDEX IF NOT EXISTS idx_phase_templates_order_unique
          ON phase_templates(workflow_type, display_order) WHERE active = 1 AND current = 1;
        CREATE INDEX IF NOT EXISTS idx_section_templates_phase_order
          ON section_templates(phase_id, current, active, display_order);
        CREATE UNIQUE INDEX IF NOT EXISTS idx_section_templates_order_unique
          ON section_templates(phase_id, display_order) WHERE active = 1 AND current = 1;
        CREATE INDEX IF NOT EXISTS idx_line_item_templates_section_order
          ON line_item_templates(section_id, current, active, display_order);
        CREATE UNIQUE INDEX IF NOT EXISTS idx_line_item_templates_order_unique
          ON line_item_templates(section_id, display_order) WHERE active = 1 AND current = 1;
        CREATE UNIQUE INDEX IF NOT EXISTS idx_workflow_steps_order_unique
          ON workflow_steps(project_id, step_order);
        CREATE INDEX IF NOT EXISTS idx_workflow_steps_state
          ON workflow_steps(project_id, state, step_order);
        CREATE INDEX IF NOT EXISTS idx_workflow_steps_phase
          ON workflow_steps(project_id, phase_id, step_order);
        CREATE INDEX IF NOT EXISTS idx_completed_items_project
          ON completed_items(project_id, completed_at_ms, seq);
        CREATE UNIQUE INDEX IF NOT EXISTS idx_workflow_alerts_active_step
          ON workflow_alerts(project_id, step_id) WHERE status = 'ACTIVE';
        CREATE INDEX IF NOT EXISTS idx_workflow_alerts_status_due
          ON workflow_alerts(project_id, status, due_at_ms);
        CREATE INDEX IF NOT EXISTS idx_workflow_events_project_seq
          ON workflow_events(project_id, seq);
"#;
