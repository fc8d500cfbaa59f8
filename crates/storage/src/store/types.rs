#![forbid(unsafe_code)]

use rl_core::state::{StepState, WorkflowStatus};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AlertStatus {
    Active,
    Completed,
    Dismissed,
}

impl AlertStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            AlertStatus::Active => "ACTIVE",
            AlertStatus::Completed => "COMPLETED",
            AlertStatus::Dismissed => "DISMISSED",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "ACTIVE" => Some(AlertStatus::Active),
            "COMPLETED" => Some(AlertStatus::Completed),
            "DISMISSED" => Some(AlertStatus::Dismissed),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StepRef {
    pub step_id: String,
    pub step_order: i64,
}

#[derive(Clone, Debug)]
pub struct WorkflowRow {
    pub project_id: String,
    pub workflow_type: String,
    pub status: WorkflowStatus,
    pub overall_progress: i64,
    pub created_at_ms: i64,
    pub updated_at_ms: i64,
}

#[derive(Clone, Debug)]
pub struct StepRow {
    pub step_id: String,
    pub step_order: i64,
    pub state: StepState,
    pub is_completed: bool,
    pub completed_at_ms: Option<i64>,
    pub completed_by: Option<String>,
    pub notes: Option<String>,
    pub assignee: Option<String>,
    pub block_reason: Option<String>,
    pub phase_id: String,
    pub section_id: String,
    pub line_item_id: String,
    pub started_at_ms: Option<i64>,
    pub created_at_ms: i64,
    pub updated_at_ms: i64,
}

#[derive(Clone, Debug)]
pub struct TrackerRow {
    pub project_id: String,
    pub revision: i64,
    pub current_phase_id: String,
    pub current_section_id: Option<String>,
    pub current_line_item_id: Option<String>,
    pub current_step_id: Option<String>,
    pub phase_started_at_ms: i64,
    pub section_started_at_ms: Option<i64>,
    pub line_item_started_at_ms: Option<i64>,
    pub updated_at_ms: i64,
}

#[derive(Clone, Debug)]
pub struct CompletedItemRow {
    pub seq: i64,
    pub project_id: String,
    pub phase_id: String,
    pub section_id: String,
    pub line_item_id: String,
    pub step_id: String,
    pub completed_at_ms: i64,
    pub completed_by: String,
    pub notes: Option<String>,
}

#[derive(Clone, Debug)]
pub struct AlertRow {
    pub seq: i64,
    pub project_id: String,
    pub step_id: String,
    pub phase_id: String,
    pub section_id: String,
    pub title: String,
    pub message: String,
    pub priority: String,
    pub status: AlertStatus,
    pub responsible_role: String,
    pub due_at_ms: i64,
    pub created_at_ms: i64,
    pub updated_at_ms: i64,
}

#[derive(Clone, Debug)]
pub struct EventRow {
    pub seq: i64,
    pub ts_ms: i64,
    pub project_id: Option<String>,
    pub step_id: Option<String>,
    pub event_type: String,
    pub payload_json: String,
}

#[derive(Clone, Debug)]
pub struct TemplateNameRef {
    pub id: String,
    pub name: String,
}

#[derive(Clone, Debug)]
pub struct HistoryEntryView {
    pub seq: i64,
    pub phase_name: String,
    pub section_name: String,
    pub line_item_name: String,
    pub completed_at_ms: i64,
    pub completed_by: String,
}

#[derive(Clone, Debug)]
pub struct WorkflowStatusView {
    pub project_id: String,
    pub workflow_type: String,
    pub status: WorkflowStatus,
    pub overall_progress: i64,
    pub tracker_revision: i64,
    pub current_phase: Option<TemplateNameRef>,
    pub current_section: Option<TemplateNameRef>,
    pub current_line_item: Option<TemplateNameRef>,
    pub current_step_id: Option<String>,
    pub active_alert_count: i64,
    pub recent_history: Vec<HistoryEntryView>,
}

#[derive(Clone, Debug)]
pub struct PhaseTemplateRow {
    pub id: String,
    pub workflow_type: String,
    pub version: i64,
    pub name: String,
    pub description: Option<String>,
    pub display_order: i64,
    pub active: bool,
    pub current: bool,
}

#[derive(Clone, Debug)]
pub struct SectionTemplateRow {
    pub id: String,
    pub phase_id: String,
    pub version: i64,
    pub name: String,
    pub display_order: i64,
    pub active: bool,
    pub current: bool,
}

#[derive(Clone, Debug)]
pub struct LineItemTemplateRow {
    pub id: String,
    pub section_id: String,
    pub version: i64,
    pub name: String,
    pub description: Option<String>,
    pub responsible_role: String,
    pub priority: String,
    pub alert_days: i64,
    pub display_order: i64,
    pub active: bool,
    pub current: bool,
}

#[derive(Clone, Debug)]
pub struct TemplateSectionNode {
    pub section: SectionTemplateRow,
    pub line_items: Vec<LineItemTemplateRow>,
}

#[derive(Clone, Debug)]
pub struct TemplatePhaseNode {
    pub phase: PhaseTemplateRow,
    pub sections: Vec<TemplateSectionNode>,
}

#[derive(Clone, Debug)]
pub struct LineItemHit {
    pub line_item_id: String,
    pub workflow_type: String,
    pub phase_name: String,
    pub section_name: String,
    pub name: String,
    pub description: Option<String>,
}

#[derive(Clone, Debug)]
pub struct PhaseMetricsRow {
    pub phase_id: String,
    pub phase_name: String,
    pub completed_count: i64,
    pub avg_completion_ms: Option<i64>,
}

#[derive(Clone, Debug)]
pub struct TemplateInstallResult {
    pub workflow_type: String,
    pub version: i64,
    pub phase_count: usize,
    pub line_item_count: usize,
}

#[derive(Clone, Debug)]
pub struct WorkflowInitializeResult {
    pub tracker_revision: i64,
    pub step_count: usize,
    pub first_step: StepRef,
    pub alert_seq: i64,
}

#[derive(Clone, Debug)]
pub struct CompleteStepResult {
    pub tracker_revision: i64,
    pub completed: StepRef,
    pub next: Option<StepRef>,
    pub overall_progress: i64,
}

#[derive(Clone, Debug)]
pub enum AdvancePhaseResult {
    Advanced {
        tracker_revision: i64,
        phase_id: String,
        created_steps: usize,
        first_step: StepRef,
    },
    WorkflowComplete {
        tracker_revision: i64,
        overall_progress: i64,
    },
}

#[derive(Clone, Debug)]
pub struct SetStepStateResult {
    pub tracker_revision: i64,
    pub step: StepRef,
    pub state: StepState,
    pub next: Option<StepRef>,
    pub overall_progress: i64,
}
