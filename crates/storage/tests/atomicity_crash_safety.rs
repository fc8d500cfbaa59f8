#![forbid(unsafe_code)]

use rl_core::ids::ProjectId;
use rl_core::policy::PhaseClosePolicy;
use rl_storage::{
    SqliteStore, StoreError, TemplateInstallRequest, TemplateLineItemSpec, TemplatePhaseSpec,
    TemplateSectionSpec, WorkflowAdvancePhaseRequest, WorkflowCompleteStepRequest,
    WorkflowInitializeRequest,
};
use rusqlite::{Connection, params};
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

fn line_item(name: &str, order: i64) -> TemplateLineItemSpec {
    TemplateLineItemSpec {
        name: name.to_string(),
        description: None,
        responsible_role: "FIELD".to_string(),
        priority: "MEDIUM".to_string(),
        alert_days: 1,
        display_order: order,
    }
}

fn two_phase_template() -> TemplateInstallRequest {
    TemplateInstallRequest {
        workflow_type: "ROOFING".to_string(),
        phases: vec![
            TemplatePhaseSpec {
                name: "Estimate".to_string(),
                description: None,
                display_order: 1,
                sections: vec![TemplateSectionSpec {
                    name: "Measurements".to_string(),
                    display_order: 1,
                    line_items: vec![line_item("Measure roof", 1)],
                }],
            },
            TemplatePhaseSpec {
                name: "Build".to_string(),
                description: None,
                display_order: 2,
                sections: vec![TemplateSectionSpec {
                    name: "Install".to_string(),
                    display_order: 1,
                    line_items: vec![line_item("Tear off", 1)],
                }],
            },
        ],
    }
}

#[test]
fn uncommitted_transaction_is_not_persisted_after_reopen() {
    let storage_dir = temp_dir("uncommitted_transaction_is_not_persisted_after_reopen");
    let project = ProjectId::try_new("P_crash").expect("project id");

    {
        let _store = SqliteStore::open(&storage_dir).expect("open store");
    }

    let db_path = storage_dir.join("ridgeline.db");
    {
        let mut conn = Connection::open(&db_path).expect("open db");
        let tx = conn.transaction().expect("begin tx");
        tx.execute(
            "INSERT INTO project_workflows(project_id, workflow_type, status, overall_progress, created_at_ms, updated_at_ms) \
             VALUES (?1, 'ROOFING', 'IN_PROGRESS', 0, 0, 0)",
            params![project.as_str()],
        )
        .expect("insert workflow");
        // Drop without commit -> rollback (simulated crash before commit).
    }

    let store = SqliteStore::open(&storage_dir).expect("open store again");
    let err = store
        .workflow_get(&project)
        .expect_err("uncommitted workflow must not persist");
    assert!(matches!(err, StoreError::UnknownProject), "got {err:?}");
}

#[test]
fn failed_advance_leaves_no_partial_state() {
    let storage_dir = temp_dir("failed_advance_leaves_no_partial_state");
    let project = ProjectId::try_new("P1").expect("project id");

    {
        let mut store = SqliteStore::open(&storage_dir).expect("open store");
        store
            .template_install(two_phase_template())
            .expect("install template");
        store
            .workflow_initialize(
                &project,
                WorkflowInitializeRequest {
                    workflow_type: "ROOFING".to_string(),
                },
            )
            .expect("initialize workflow");
        store
            .workflow_complete_step(
                &project,
                WorkflowCompleteStepRequest {
                    step_id: "s:1".to_string(),
                    expected_revision: None,
                    actor_id: "U1".to_string(),
                    notes: None,
                },
            )
            .expect("complete phase one");
    }

    // Deactivate every line item of the Build phase behind the engine's back
    // so phase advancement finds an empty template.
    {
        let conn = Connection::open(storage_dir.join("ridgeline.db")).expect("open db");
        conn.execute(
            "UPDATE line_item_templates SET active=0 \
             WHERE section_id IN ( \
                 SELECT s.id FROM section_templates s \
                 JOIN phase_templates p ON p.id = s.phase_id \
                 WHERE p.name='Build' \
             )",
            [],
        )
        .expect("deactivate build items");
    }

    let mut store = SqliteStore::open(&storage_dir).expect("reopen store");
    let before_tracker = store.workflow_tracker(&project).expect("tracker");
    let before_steps = store.workflow_steps_list(&project).expect("steps");

    let err = store
        .workflow_advance_phase(
            &project,
            WorkflowAdvancePhaseRequest {
                expected_revision: None,
                actor_id: "U1".to_string(),
                reason: None,
                policy: PhaseClosePolicy::default(),
            },
        )
        .expect_err("empty next phase cannot advance");
    assert!(matches!(err, StoreError::NoActiveTemplate), "got {err:?}");

    let tracker = store.workflow_tracker(&project).expect("tracker");
    assert_eq!(
        tracker.revision, before_tracker.revision,
        "rolled back revision bump"
    );
    assert_eq!(tracker.current_step_id, before_tracker.current_step_id);

    let steps = store.workflow_steps_list(&project).expect("steps");
    assert_eq!(steps.len(), before_steps.len(), "no steps instantiated");

    let workflow = store.workflow_get(&project).expect("workflow row");
    assert_eq!(workflow.status, rl_core::state::WorkflowStatus::InProgress);
}

#[test]
fn failed_completion_is_all_or_nothing() {
    let storage_dir = temp_dir("failed_completion_is_all_or_nothing");
    let project = ProjectId::try_new("P1").expect("project id");

    let mut store = SqliteStore::open(&storage_dir).expect("open store");
    store
        .template_install(two_phase_template())
        .expect("install template");
    store
        .workflow_initialize(
            &project,
            WorkflowInitializeRequest {
                workflow_type: "ROOFING".to_string(),
            },
        )
        .expect("initialize workflow");

    let before = store.workflow_tracker(&project).expect("tracker").revision;
    let err = store
        .workflow_complete_step(
            &project,
            WorkflowCompleteStepRequest {
                step_id: "s:404".to_string(),
                expected_revision: None,
                actor_id: "U1".to_string(),
                notes: None,
            },
        )
        .expect_err("unknown step");
    assert!(matches!(err, StoreError::StepNotFound), "got {err:?}");

    let tracker = store.workflow_tracker(&project).expect("tracker");
    assert_eq!(
        tracker.revision, before,
        "revision bump rolled back with the failed call"
    );
}
