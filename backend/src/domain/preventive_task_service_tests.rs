//! Tests for the preventive task service.

use rstest::{fixture, rstest};
use serde_json::json;

use super::*;
use crate::domain::ErrorCode;
use crate::domain::SubTask;
use crate::domain::ports::FixtureDocumentStore;
use crate::domain::service_test_support::{clock_on, customer, date, memory_tree, seed};

fn subtask(name: &str, schedule: &str) -> SubTask {
    SubTask {
        name: Some(name.into()),
        plan_schedule: Some(json!(schedule)),
        time_duration: Some(json!("30m")),
        ..SubTask::default()
    }
}

fn task(id: i64, main: &str, custom: bool, sub_tasks: Vec<SubTask>) -> PreventiveTask {
    PreventiveTask {
        id: Some(json!(id)),
        main_task: Some(main.into()),
        is_custom: Some(json!(custom)),
        sub_tasks,
        ..PreventiveTask::default()
    }
}

#[fixture]
fn catalogue() -> PreventiveTaskSet {
    PreventiveTaskSet {
        customer_id: customer(),
        customer_name: Some("Acme".into()),
        tasks: vec![
            task(1, "Inspect", false, vec![subtask("Visual", "Monthly_30")]),
            task(
                2,
                "Clean",
                true,
                vec![subtask("Dust", "Monthly_30"), subtask("Polish", "Yearly_365")],
            ),
        ],
        timestamp: None,
        extra: Map::new(),
    }
}

async fn service_with(
    set: Option<&PreventiveTaskSet>,
) -> PreventiveTaskService<FixtureDocumentStore> {
    let (tree, _) = memory_tree();
    if let Some(set) = set {
        seed(&tree, set).await;
    }
    PreventiveTaskService::new(tree, clock_on(date(2024, 12, 16)))
}

fn patch(value: serde_json::Value) -> Map<String, Value> {
    value.as_object().cloned().expect("object patch")
}

#[rstest]
#[tokio::test]
async fn store_replaces_the_catalogue(catalogue: PreventiveTaskSet) {
    let service = service_with(Some(&catalogue)).await;

    let stored = service
        .store_task_set(StoreTaskSetRequest {
            customer_id: customer(),
            customer_name: "Acme Renamed".into(),
            tasks: vec![task(9, "Torque", true, Vec::new())],
        })
        .await
        .expect("stored");

    assert_eq!(stored.timestamp.as_deref(), Some("2024-12-16T12:00:00.000Z"));
    let tasks = service.task_set(&customer()).await.expect("fetched");
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].main_task.as_deref(), Some("Torque"));
}

#[rstest]
#[tokio::test]
async fn custom_tasks_accept_updates(catalogue: PreventiveTaskSet) {
    let service = service_with(Some(&catalogue)).await;

    let updated = service
        .update_custom_task(&customer(), json!(2), patch(json!({"priority": "high"})))
        .await
        .expect("updated");

    assert_eq!(updated.tasks[1].extra.get("priority"), Some(&json!("high")));
    assert_eq!(updated.tasks[1].main_task.as_deref(), Some("Clean"));
}

#[rstest]
#[case(json!(1), json!({"priority": "high"}), ErrorCode::InvalidRequest)]
#[case(json!(2), json!({"mainTask": "Renamed"}), ErrorCode::InvalidRequest)]
#[case(json!(2), json!({"isCustom": false}), ErrorCode::InvalidRequest)]
#[case(json!(2), json!({"id": 5}), ErrorCode::InvalidRequest)]
#[case(json!(7), json!({"priority": "high"}), ErrorCode::NotFound)]
#[tokio::test]
async fn updates_are_gated(
    catalogue: PreventiveTaskSet,
    #[case] task_id: Value,
    #[case] updates: Value,
    #[case] expected: ErrorCode,
) {
    let service = service_with(Some(&catalogue)).await;

    let err = service
        .update_custom_task(&customer(), task_id, patch(updates))
        .await
        .expect_err("update refused");

    assert_eq!(err.code(), expected);
    let tasks = service.task_set(&customer()).await.expect("fetched");
    assert_eq!(tasks, catalogue.tasks);
}

#[rstest]
#[tokio::test]
async fn task_ids_match_by_json_equality(catalogue: PreventiveTaskSet) {
    let service = service_with(Some(&catalogue)).await;

    let err = service
        .delete_custom_task(&customer(), json!("2"))
        .await
        .expect_err("string id does not match numeric id");
    assert_eq!(err.message(), "Task not found.");
}

#[rstest]
#[tokio::test]
async fn only_custom_tasks_can_be_deleted(catalogue: PreventiveTaskSet) {
    let service = service_with(Some(&catalogue)).await;

    let refused = service
        .delete_custom_task(&customer(), json!(1))
        .await
        .expect_err("catalogue task");
    assert_eq!(refused.message(), "Cannot delete task for this.");

    let updated = service
        .delete_custom_task(&customer(), json!(2))
        .await
        .expect("custom task deleted");
    assert_eq!(updated.tasks.len(), 1);
}

#[tokio::test]
async fn unknown_customer_has_no_task_set() {
    let service = service_with(None).await;
    let err = service.task_set(&customer()).await.expect_err("no catalogue");
    assert_eq!(err.message(), "Customer's task not found.");
}

#[rstest]
#[tokio::test]
async fn subtasks_are_grouped_per_task(catalogue: PreventiveTaskSet) {
    let service = service_with(Some(&catalogue)).await;

    let groups = service
        .subtasks_for_schedule(&customer(), "Monthly_30")
        .await
        .expect("subtasks");

    assert_eq!(
        serde_json::to_value(groups).expect("serialises"),
        json!([
            {"id": 1, "mainTask": "Inspect", "subTasks": [{"name": "Visual", "timeDuration": "30m"}]},
            {"id": 2, "mainTask": "Clean", "subTasks": [{"name": "Dust", "timeDuration": "30m"}]},
        ])
    );
}

#[rstest]
#[tokio::test]
async fn unmatched_schedule_is_not_found(catalogue: PreventiveTaskSet) {
    let service = service_with(Some(&catalogue)).await;
    let err = service
        .subtasks_for_schedule(&customer(), "Weekly_7")
        .await
        .expect_err("nothing scheduled weekly");
    assert_eq!(
        err.message(),
        "No subtasks found with the specified planSchedule."
    );
}
