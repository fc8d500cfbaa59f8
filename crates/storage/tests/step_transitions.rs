#![forbid(unsafe_code)]

use rl_core::ids::ProjectId;
use rl_core::state::StepState;
use rl_storage::{
    AlertStatus, AlertsListRequest, HistoryListRequest, SqliteStore, StoreError,
    TemplateInstallRequest, TemplateLineItemSpec, TemplatePhaseSpec, TemplateSectionSpec,
    WorkflowAssignStepRequest, WorkflowCompleteStepRequest, WorkflowInitializeRequest,
    WorkflowSetStepStateRequest,
};
use std::path::PathBuf;

fn temp_dir(test_name: &str) -> PathBuf {
    let base = std::env::temp_dir();
    let pid = std::process::id();
    let nonce = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let dir = base.join(format!("rl_storage_{test_name}_{pid}_{nonce}"));
    std::fs::create_dir_all(&dir).expect("create temp dir");
    dir
}

fn open_with_steps(test_name: &str, step_count: usize) -> (SqliteStore, ProjectId) {
    let storage_dir = temp_dir(test_name);
    let mut store = SqliteStore::open(&storage_dir).expect("open store");
    let line_items = (1..=step_count)
        .map(|order| TemplateLineItemSpec {
            name: format!("Item {order}"),
            description: None,
            responsible_role: "FIELD".to_string(),
            priority: "MEDIUM".to_string(),
            alert_days: 1,
            display_order: order as i64,
        })
        .collect();
    store
        .template_install(TemplateInstallRequest {
            workflow_type: "ROOFING".to_string(),
            phases: vec![TemplatePhaseSpec {
                name: "Work".to_string(),
                description: None,
                display_order: 1,
                sections: vec![TemplateSectionSpec {
                    name: "Tasks".to_string(),
                    display_order: 1,
                    line_items,
                }],
            }],
        })
        .expect("install template");

    let project = ProjectId::try_new("P1").expect("project id");
    store
        .workflow_initialize(
            &project,
            WorkflowInitializeRequest {
                workflow_type: "ROOFING".to_string(),
            },
        )
        .expect("initialize workflow");
    (store, project)
}

fn set_state(
    store: &mut SqliteStore,
    project: &ProjectId,
    step_id: &str,
    target: StepState,
) -> Result<rl_storage::SetStepStateResult, StoreError> {
    store.workflow_set_step_state(
        project,
        WorkflowSetStepStateRequest {
            step_id: step_id.to_string(),
            expected_revision: None,
            target,
            reason: None,
        },
    )
}

fn complete(store: &mut SqliteStore, project: &ProjectId, step_id: &str) {
    store
        .workflow_complete_step(
            project,
            WorkflowCompleteStepRequest {
                step_id: step_id.to_string(),
                expected_revision: None,
                actor_id: "U1".to_string(),
                notes: None,
            },
        )
        .expect("complete step");
}

#[test]
fn starting_a_step_requires_an_assignee() {
    let (mut store, project) = open_with_steps("starting_a_step_requires_an_assignee", 3);

    let err = set_state(&mut store, &project, "s:1", StepState::InProgress)
        .expect_err("unassigned step cannot start");
    assert!(matches!(err, StoreError::AssigneeRequired), "got {err:?}");

    store
        .workflow_assign_step(
            &project,
            WorkflowAssignStepRequest {
                step_id: "s:1".to_string(),
                expected_revision: None,
                assignee: Some("crew-7".to_string()),
            },
        )
        .expect("assign step");
    set_state(&mut store, &project, "s:1", StepState::InProgress).expect("start step");

    let steps = store.workflow_steps_list(&project).expect("list steps");
    assert_eq!(steps[0].state, StepState::InProgress);
    assert_eq!(steps[0].assignee.as_deref(), Some("crew-7"));
}

#[test]
fn block_stores_reason_and_resume_clears_it() {
    let (mut store, project) = open_with_steps("block_stores_reason_and_resume_clears_it", 3);
    store
        .workflow_assign_step(
            &project,
            WorkflowAssignStepRequest {
                step_id: "s:1".to_string(),
                expected_revision: None,
                assignee: Some("crew-7".to_string()),
            },
        )
        .expect("assign step");
    set_state(&mut store, &project, "s:1", StepState::InProgress).expect("start step");

    store
        .workflow_set_step_state(
            &project,
            WorkflowSetStepStateRequest {
                step_id: "s:1".to_string(),
                expected_revision: None,
                target: StepState::Blocked,
                reason: Some("waiting on materials".to_string()),
            },
        )
        .expect("block step");
    let steps = store.workflow_steps_list(&project).expect("list steps");
    assert_eq!(steps[0].state, StepState::Blocked);
    assert_eq!(steps[0].block_reason.as_deref(), Some("waiting on materials"));

    set_state(&mut store, &project, "s:1", StepState::Active).expect("resume step");
    let steps = store.workflow_steps_list(&project).expect("list steps");
    assert_eq!(steps[0].state, StepState::Active);
    assert!(steps[0].block_reason.is_none());

    // Re-entry through the alert emitter must not mint a second alert.
    let all = store
        .alerts_list(
            &project,
            AlertsListRequest {
                status: None,
                due_before_ms: None,
                limit: 10,
            },
        )
        .expect("all alerts");
    let step1_alerts: Vec<_> = all.iter().filter(|alert| alert.step_id == "s:1").collect();
    assert_eq!(step1_alerts.len(), 1);
    assert_eq!(step1_alerts[0].status, AlertStatus::Active);
}

#[test]
fn blocking_an_active_step_is_illegal() {
    let (mut store, project) = open_with_steps("blocking_an_active_step_is_illegal", 3);

    let err = set_state(&mut store, &project, "s:1", StepState::Blocked)
        .expect_err("only in-progress steps block");
    match err {
        StoreError::IllegalTransition { from, to } => {
            assert_eq!(from, StepState::Active);
            assert_eq!(to, StepState::Blocked);
        }
        other => panic!("expected IllegalTransition, got {other:?}"),
    }
}

#[test]
fn skipping_the_current_step_advances_the_tracker() {
    let (mut store, project) = open_with_steps("skipping_the_current_step_advances_the_tracker", 3);

    let result = set_state(&mut store, &project, "s:1", StepState::Skipped).expect("skip step");
    assert_eq!(result.next.as_ref().map(|s| s.step_order), Some(2));

    let steps = store.workflow_steps_list(&project).expect("list steps");
    assert_eq!(steps[0].state, StepState::Skipped);
    assert_eq!(steps[1].state, StepState::Active);

    let tracker = store.workflow_tracker(&project).expect("tracker");
    assert_eq!(tracker.current_step_id.as_deref(), Some("s:2"));

    let all = store
        .alerts_list(
            &project,
            AlertsListRequest {
                status: None,
                due_before_ms: None,
                limit: 10,
            },
        )
        .expect("all alerts");
    let step1 = all
        .iter()
        .find(|alert| alert.step_id == "s:1")
        .expect("step1 alert");
    assert_eq!(step1.status, AlertStatus::Dismissed);
    let step2 = all
        .iter()
        .find(|alert| alert.step_id == "s:2")
        .expect("step2 alert");
    assert_eq!(step2.status, AlertStatus::Active);
}

#[test]
fn progression_jumps_over_skipped_future_steps() {
    let (mut store, project) = open_with_steps("progression_jumps_over_skipped_future_steps", 4);

    set_state(&mut store, &project, "s:3", StepState::Skipped).expect("skip future step");
    let tracker = store.workflow_tracker(&project).expect("tracker");
    assert_eq!(
        tracker.current_step_id.as_deref(),
        Some("s:1"),
        "skipping a future step leaves the tracker alone"
    );

    complete(&mut store, &project, "s:1");
    complete(&mut store, &project, "s:2");
    let tracker = store.workflow_tracker(&project).expect("tracker");
    assert_eq!(tracker.current_step_id.as_deref(), Some("s:4"));
}

#[test]
fn reopening_a_completed_step_restores_it_and_drops_progress() {
    let (mut store, project) =
        open_with_steps("reopening_a_completed_step_restores_it_and_drops_progress", 2);
    complete(&mut store, &project, "s:1");
    complete(&mut store, &project, "s:2");
    assert_eq!(
        store.workflow_get(&project).expect("workflow").overall_progress,
        100
    );

    let result = set_state(&mut store, &project, "s:2", StepState::Active).expect("reopen step");
    assert_eq!(result.overall_progress, 50);

    let steps = store.workflow_steps_list(&project).expect("list steps");
    assert_eq!(steps[1].state, StepState::Active);
    assert!(!steps[1].is_completed);
    assert!(steps[1].completed_at_ms.is_none());
    assert!(steps[1].completed_by.is_none());

    let tracker = store.workflow_tracker(&project).expect("tracker");
    assert_eq!(tracker.current_step_id.as_deref(), Some("s:2"));

    // The ledger is append-only; reopening rewrites nothing.
    let history = store
        .history_list(
            &project,
            HistoryListRequest {
                limit: 10,
                offset: 0,
            },
        )
        .expect("history");
    assert_eq!(history.len(), 2);
}

#[test]
fn reopening_while_another_step_is_active_is_rejected() {
    let (mut store, project) =
        open_with_steps("reopening_while_another_step_is_active_is_rejected", 3);
    complete(&mut store, &project, "s:1");

    let err = set_state(&mut store, &project, "s:1", StepState::Active)
        .expect_err("s:2 is already active");
    assert!(matches!(err, StoreError::InvalidInput(_)), "got {err:?}");
}

#[test]
fn failed_transition_leaves_revision_and_state_untouched() {
    let (mut store, project) =
        open_with_steps("failed_transition_leaves_revision_and_state_untouched", 3);
    let before = store.workflow_tracker(&project).expect("tracker").revision;

    set_state(&mut store, &project, "s:2", StepState::Blocked)
        .expect_err("pending step cannot block");

    let tracker = store.workflow_tracker(&project).expect("tracker");
    assert_eq!(tracker.revision, before, "failed call rolls back the bump");
    let steps = store.workflow_steps_list(&project).expect("list steps");
    assert_eq!(steps[1].state, StepState::Pending);
}

#[test]
fn completion_cannot_go_through_set_step_state() {
    let (mut store, project) = open_with_steps("completion_cannot_go_through_set_step_state", 2);
    let err = set_state(&mut store, &project, "s:1", StepState::Completed)
        .expect_err("completion has its own operation");
    assert!(matches!(err, StoreError::InvalidInput(_)), "got {err:?}");
}
