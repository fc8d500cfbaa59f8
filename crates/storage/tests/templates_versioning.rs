#![forbid(unsafe_code)]

use rl_core::ids::ProjectId;
use rl_storage::{
    SqliteStore, StoreError, TemplateInstallRequest, TemplateLineItemSpec, TemplatePhaseSpec,
    TemplateSectionSpec, WorkflowInitializeRequest,
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

fn single_phase_template(first_item: &str) -> TemplateInstallRequest {
    TemplateInstallRequest {
        workflow_type: "ROOFING".to_string(),
        phases: vec![TemplatePhaseSpec {
            name: "Work".to_string(),
            description: None,
            display_order: 1,
            sections: vec![TemplateSectionSpec {
                name: "Tasks".to_string(),
                display_order: 1,
                line_items: vec![
                    TemplateLineItemSpec {
                        name: first_item.to_string(),
                        description: None,
                        responsible_role: "FIELD".to_string(),
                        priority: "MEDIUM".to_string(),
                        alert_days: 1,
                        display_order: 1,
                    },
                    TemplateLineItemSpec {
                        name: "Clean up".to_string(),
                        description: None,
                        responsible_role: "FIELD".to_string(),
                        priority: "LOW".to_string(),
                        alert_days: 1,
                        display_order: 2,
                    },
                ],
            }],
        }],
    }
}

#[test]
fn reinstall_bumps_the_version_and_retires_old_rows() {
    let storage_dir = temp_dir("reinstall_bumps_the_version_and_retires_old_rows");
    let mut store = SqliteStore::open(&storage_dir).expect("open store");

    let first = store
        .template_install(single_phase_template("Tear off"))
        .expect("install v1");
    assert_eq!(first.version, 1);
    assert_eq!(first.phase_count, 1);
    assert_eq!(first.line_item_count, 2);

    let second = store
        .template_install(single_phase_template("Tear off and inspect deck"))
        .expect("install v2");
    assert_eq!(second.version, 2);

    let tree = store.template_tree("ROOFING").expect("tree");
    assert_eq!(tree.len(), 1);
    assert_eq!(tree[0].phase.version, 2);
    assert_eq!(
        tree[0].sections[0].line_items[0].name,
        "Tear off and inspect deck"
    );
}

#[test]
fn in_flight_projects_keep_their_version_new_projects_take_the_new_one() {
    let storage_dir =
        temp_dir("in_flight_projects_keep_their_version_new_projects_take_the_new_one");
    let mut store = SqliteStore::open(&storage_dir).expect("open store");
    store
        .template_install(single_phase_template("Tear off"))
        .expect("install v1");

    let veteran = ProjectId::try_new("P_old").expect("project id");
    store
        .workflow_initialize(
            &veteran,
            WorkflowInitializeRequest {
                workflow_type: "ROOFING".to_string(),
            },
        )
        .expect("initialize on v1");
    let veteran_steps = store.workflow_steps_list(&veteran).expect("steps");

    store
        .template_install(single_phase_template("Tear off and inspect deck"))
        .expect("install v2");

    let newcomer = ProjectId::try_new("P_new").expect("project id");
    store
        .workflow_initialize(
            &newcomer,
            WorkflowInitializeRequest {
                workflow_type: "ROOFING".to_string(),
            },
        )
        .expect("initialize on v2");
    let newcomer_steps = store.workflow_steps_list(&newcomer).expect("steps");

    assert_ne!(
        veteran_steps[0].line_item_id, newcomer_steps[0].line_item_id,
        "instances pin the template version they were materialized from"
    );

    // The superseded rows still resolve names for the veteran's status view.
    let status = store.workflow_status(&veteran).expect("status");
    assert_eq!(
        status.current_line_item.as_ref().map(|li| li.name.as_str()),
        Some("Tear off")
    );
    let status = store.workflow_status(&newcomer).expect("status");
    assert_eq!(
        status.current_line_item.as_ref().map(|li| li.name.as_str()),
        Some("Tear off and inspect deck")
    );
}

#[test]
fn duplicate_display_orders_are_rejected() {
    let storage_dir = temp_dir("duplicate_display_orders_are_rejected");
    let mut store = SqliteStore::open(&storage_dir).expect("open store");

    let mut request = single_phase_template("Tear off");
    request.phases[0].sections[0].line_items[1].display_order = 1;
    let err = store
        .template_install(request)
        .expect_err("duplicate order must fail");
    assert!(matches!(err, StoreError::InvalidInput(_)), "got {err:?}");
    assert!(store.template_tree("ROOFING").expect("tree").is_empty());
}

#[test]
fn empty_trees_are_rejected() {
    let storage_dir = temp_dir("empty_trees_are_rejected");
    let mut store = SqliteStore::open(&storage_dir).expect("open store");

    let err = store
        .template_install(TemplateInstallRequest {
            workflow_type: "ROOFING".to_string(),
            phases: Vec::new(),
        })
        .expect_err("no phases");
    assert!(matches!(err, StoreError::InvalidInput(_)), "got {err:?}");

    let mut request = single_phase_template("Tear off");
    request.phases[0].sections[0].line_items.clear();
    let err = store
        .template_install(request)
        .expect_err("section without line items");
    assert!(matches!(err, StoreError::InvalidInput(_)), "got {err:?}");
}
