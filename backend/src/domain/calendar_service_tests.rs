//! Tests for the calendar service.

use rstest::{fixture, rstest};
use serde_json::json;

use super::*;
use crate::domain::ports::FixtureDocumentStore;
use crate::domain::service_test_support::{customer, memory_tree, seed};
use crate::domain::{ErrorCode, PlannedCb, SubTask, Task};

fn record(task_id: &str, main_task: &str, subtask: &str, status: bool) -> PlannedCb {
    PlannedCb {
        task_id: Some(task_id.into()),
        tasks: vec![Task {
            main_task: Some(main_task.into()),
            sub_tasks: vec![SubTask {
                name: Some(subtask.into()),
                status: Some(json!(status)),
                ..SubTask::default()
            }],
            ..Task::default()
        }],
        ..PlannedCb::default()
    }
}

fn switchgear(id: &str, cbs: Vec<PlannedCb>) -> CalendarSwitchgear {
    CalendarSwitchgear {
        switchgear_id: Some(id.into()),
        cbs,
        ..CalendarSwitchgear::default()
    }
}

fn configuration(ts: &str, switchgears: Vec<CalendarSwitchgear>) -> CalendarConfiguration {
    CalendarConfiguration {
        configure_ts: Some(ts.into()),
        switchgears,
        ..CalendarConfiguration::default()
    }
}

#[fixture]
fn calendar() -> CalendarDocument {
    CalendarDocument {
        configurations: vec![configuration(
            "2024-12-16",
            vec![
                switchgear("SG1", vec![record("T1", "Inspect", "Visual", false)]),
                switchgear("SG2", vec![record("T5", "Clean", "Dust", true)]),
            ],
        )],
        ..CalendarDocument::empty(customer())
    }
}

async fn service_with(
    calendar: Option<&CalendarDocument>,
) -> (
    CalendarService<FixtureDocumentStore>,
    DocumentTreeStore<FixtureDocumentStore>,
) {
    let (tree, _) = memory_tree();
    if let Some(calendar) = calendar {
        seed(&tree, calendar).await;
    }
    (CalendarService::new(tree.clone()), tree)
}

fn filter(ts: &str, switchgear_id: Option<&str>, task_id: Option<&str>) -> CalendarFilter {
    CalendarFilter {
        customer_id: customer(),
        configure_ts: ts.into(),
        switchgear_id: switchgear_id.map(str::to_owned),
        task_id: task_id.map(str::to_owned),
    }
}

#[rstest]
#[tokio::test]
async fn store_merges_down_to_subtasks(calendar: CalendarDocument) {
    let (service, _) = service_with(Some(&calendar)).await;

    let stored = service
        .store_calendar(
            &customer(),
            vec![
                configuration(
                    "2024-12-16",
                    vec![switchgear(
                        "SG1",
                        vec![
                            record("T1", "Inspect", "Visual", true),
                            record("T1", "Inspect", "Thermal", false),
                        ],
                    )],
                ),
                configuration("2024-12-17", Vec::new()),
            ],
        )
        .await
        .expect("stored");

    assert_eq!(stored.configurations.len(), 2);
    let sg1 = &stored.configurations[0].switchgears[0];
    assert_eq!(sg1.cbs.len(), 1);
    let subtasks = &sg1.cbs[0].tasks[0].sub_tasks;
    assert_eq!(subtasks.len(), 2);
    assert_eq!(subtasks[0].status, Some(json!(true)));
    assert_eq!(stored.configurations[0].switchgears[1], calendar.configurations[0].switchgears[1]);
}

#[tokio::test]
async fn first_store_creates_the_log() {
    let (service, tree) = service_with(None).await;

    service
        .store_calendar(
            &customer(),
            vec![configuration("2024-12-16", vec![switchgear("SG1", Vec::new())])],
        )
        .await
        .expect("stored");

    let loaded = tree
        .load::<CalendarDocument>(&customer())
        .await
        .expect("load")
        .expect("stored");
    assert_eq!(loaded.document.configurations.len(), 1);
}

#[tokio::test]
async fn undated_configurations_are_rejected() {
    let (service, _) = service_with(None).await;

    let err = service
        .store_calendar(&customer(), vec![CalendarConfiguration::default()])
        .await
        .expect_err("no configure_Ts");

    assert_eq!(err.code(), ErrorCode::InvalidRequest);
}

#[rstest]
#[case(filter("2024-12-16", None, None), 2)]
#[case(filter("2024-12-16", Some("SG2"), None), 1)]
#[case(filter("2024-12-16", None, Some("T1")), 1)]
#[tokio::test]
async fn snapshots_narrow_by_switchgear_and_task(
    calendar: CalendarDocument,
    #[case] request: CalendarFilter,
    #[case] switchgears: usize,
) {
    let (service, _) = service_with(Some(&calendar)).await;

    let configurations = service.calendar_snapshot(request).await.expect("snapshot");

    assert_eq!(configurations.len(), 1);
    assert_eq!(configurations[0].switchgears.len(), switchgears);
}

#[rstest]
#[case(filter("2024-01-01", None, None), "No configurations found for the given date: 2024-01-01.")]
#[case(filter("2024-12-16", Some("SG9"), None), "No data found")]
#[case(filter("2024-12-16", Some("SG1"), Some("T5")), "No data found")]
#[tokio::test]
async fn empty_snapshots_are_not_found(
    calendar: CalendarDocument,
    #[case] request: CalendarFilter,
    #[case] message: &str,
) {
    let (service, _) = service_with(Some(&calendar)).await;

    let err = service.calendar_snapshot(request).await.expect_err("empty");

    assert_eq!(err.code(), ErrorCode::NotFound);
    assert_eq!(err.message(), message);
}

#[tokio::test]
async fn snapshot_of_unknown_customer_is_not_found() {
    let (service, _) = service_with(None).await;
    let err = service
        .calendar_snapshot(filter("2024-12-16", None, None))
        .await
        .expect_err("no log");
    assert_eq!(err.message(), "Customer not found.");
}
