#![forbid(unsafe_code)]

use crate::store::AlertStatus;
use rl_core::policy::PhaseClosePolicy;
use rl_core::state::StepState;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TemplateLineItemSpec {
    pub name: String,
    pub description: Option<String>,
    pub responsible_role: String,
    pub priority: String,
    pub alert_days: i64,
    pub display_order: i64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TemplateSectionSpec {
    pub name: String,
    pub display_order: i64,
    pub line_items: Vec<TemplateLineItemSpec>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TemplatePhaseSpec {
    pub name: String,
    pub description: Option<String>,
    pub display_order: i64,
    pub sections: Vec<TemplateSectionSpec>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TemplateInstallRequest {
    pub workflow_type: String,
    pub phases: Vec<TemplatePhaseSpec>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WorkflowInitializeRequest {
    pub workflow_type: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WorkflowCompleteStepRequest {
    pub step_id: String,
    pub expected_revision: Option<i64>,
    pub actor_id: String,
    pub notes: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WorkflowAdvancePhaseRequest {
    pub expected_revision: Option<i64>,
    pub actor_id: String,
    pub reason: Option<String>,
    pub policy: PhaseClosePolicy,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WorkflowSetStepStateRequest {
    pub step_id: String,
    pub expected_revision: Option<i64>,
    pub target: StepState,
    pub reason: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WorkflowAssignStepRequest {
    pub step_id: String,
    pub expected_revision: Option<i64>,
    pub assignee: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AlertsListRequest {
    pub status: Option<AlertStatus>,
    pub due_before_ms: Option<i64>,
    pub limit: usize,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HistoryListRequest {
    pub limit: usize,
    pub offset: usize,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LineItemSearchRequest {
    pub workflow_type: Option<String>,
    pub query: String,
    pub limit: usize,
}
