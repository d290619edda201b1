//! Tests for plan report HTTP handlers.

use super::*;
use crate::domain::ports::{FixtureDocumentStore, MockPlanReportQuery};
use crate::domain::{
    CalendarDocument, ConfigurationDocument, DocumentTreeStore, Error, MappingDocument,
};
use crate::inbound::http::state::HttpStatePorts;
use crate::inbound::http::test_utils::{TEST_CUSTOMER, bearer, memory_state, test_app};
use actix_web::http::StatusCode;
use actix_web::test as actix_test;
use rstest::rstest;
use serde_json::{Value, json};
use std::sync::Arc;

async fn seed_plan(documents: &DocumentTreeStore<FixtureDocumentStore>) {
    let mapping: MappingDocument = serde_json::from_value(json!({
        "customer_id": TEST_CUSTOMER,
        "switchgears": [{
            "switchgearId": "SG1",
            "switchgearName": "Main Board",
            "cbs": [{
                "cbid": "1",
                "cbname": "Incomer",
                "taskId": "T1",
                "pms_des": "Quarterly inspection",
                "creationDate": "2023-12-20T09:00:00.000Z",
                "planshudule": "Monthly_30",
                "planStartDate": {"year": 2024, "month": 1, "day": 1},
                "planEndDate": {"year": 2024, "month": 3, "day": 31},
                "tasks": [{
                    "mainTask": "Inspect",
                    "subTasks": [{"name": "Visual"}, {"name": "Thermal"}]
                }]
            }]
        }]
    }))
    .expect("mapping document");
    let config: ConfigurationDocument = serde_json::from_value(json!({
        "customer_id": TEST_CUSTOMER,
        "configswitchgears": [{
            "id": "SG1",
            "name": "Main Board",
            "configuredCBs": [{
                "id": 1,
                "name": "Incomer",
                "configurations": {"equipmentDetails": {"data": {"switchgearLocation": "Hall A"}}}
            }]
        }]
    }))
    .expect("configuration document");
    documents.save(&mapping, None).await.expect("seed mapping");
    documents.save(&config, None).await.expect("seed configuration");
}

async fn seed_visual_done(documents: &DocumentTreeStore<FixtureDocumentStore>) {
    let calendar: CalendarDocument = serde_json::from_value(json!({
        "customer_id": TEST_CUSTOMER,
        "configurations": [{
            "configure_Ts": "2024-01-15",
            "switchgears": [{
                "switchgearID": "SG1",
                "cbs": [{
                    "taskId": "T1",
                    "tasks": [{
                        "mainTask": "Inspect",
                        "subTasks": [
                            {"name": "Visual", "status": true, "reportRef": "R-1", "remarks": 0}
                        ]
                    }]
                }]
            }]
        }]
    }))
    .expect("calendar document");
    documents.save(&calendar, None).await.expect("seed calendar");
}

async fn get(state: HttpState, uri: &str) -> (StatusCode, Value) {
    let app = actix_test::init_service(test_app(state)).await;
    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri(uri)
            .insert_header(bearer())
            .to_request(),
    )
    .await;
    let status = res.status();
    (status, actix_test::read_body_json(res).await)
}

#[actix_web::test]
async fn total_plan_rows_count_execution_records() {
    let (state, documents) = memory_state();
    seed_plan(&documents).await;
    seed_visual_done(&documents).await;

    let (status, body) = get(state, "/testpreservice/PM/C1?planType=Totalplan").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["customer_id"], "C1");
    let row = &body["switchgears"][0]["cbs"][0];
    assert_eq!(row["totalPlan"], 3);
    assert_eq!(row["completePlan"], 1);
    assert_eq!(row["pendingPlan"], 0);
    assert_eq!(row["location"], "Hall A");
    assert_eq!(row["planStartDate"], "01-01-2024");
}

#[actix_web::test]
async fn individual_rows_roll_up_status() {
    let (state, documents) = memory_state();
    seed_plan(&documents).await;

    let (status, body) = get(state, "/testpreservice/PM/C1?planType=Individual").await;

    assert_eq!(status, StatusCode::OK);
    let row = &body["switchgears"][0]["cbs"][0];
    assert_eq!(row["status"], "pending");
    assert_eq!(row["validation"], "Invalid");
    assert_eq!(row["planEndDate"], "03-31-2024");
}

#[actix_web::test]
async fn schedule_filter_drops_other_tags() {
    let (state, documents) = memory_state();
    seed_plan(&documents).await;

    let (status, body) = get(
        state,
        "/testpreservice/PM/C1?planType=Totalplan&scheduleType=Yearly_365",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["switchgears"][0]["cbs"], json!([]));
}

#[rstest]
#[case("/testpreservice/PM/C1", "'table', 'customer_id', and 'planType' are required.")]
#[case("/testpreservice/PM/C1?planType=Totalplan&sort=asc", "Unexpected parameters")]
#[actix_web::test]
async fn summaries_validate_query(#[case] uri: &str, #[case] message: &str) {
    let mut reports = MockPlanReportQuery::new();
    reports.expect_plan_summaries().times(0);
    let state = HttpState::new(HttpStatePorts {
        reports: Arc::new(reports),
        ..HttpStatePorts::default()
    });

    let (status, body) = get(state, uri).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], message);
}

#[actix_web::test]
async fn summaries_report_missing_inventory() {
    let (state, documents) = memory_state();
    let mapping = MappingDocument::empty(crate::domain::CustomerId::new(TEST_CUSTOMER).expect("id"));
    documents.save(&mapping, None).await.expect("seed mapping");

    let (status, body) = get(state, "/testpreservice/PM/C1?planType=Totalplan").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Customer not found in Configuration table");
}

#[actix_web::test]
async fn calendar_tasks_overlay_execution_fields() {
    let (state, documents) = memory_state();
    seed_plan(&documents).await;
    seed_visual_done(&documents).await;

    let (status, body) = get(
        state,
        "/Calandertasks?customer_id=C1&switchgearID=SG1&cbname=Incomer&taskid=T1",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let visual = &body["tasks"][0]["subTasks"][0];
    assert_eq!(visual["reportRef"], "R-1");
    assert_eq!(visual["remarks"], "");
    assert_eq!(body["tasks"][0]["subTasks"][1]["performedBy"], "");
}

#[actix_web::test]
async fn calendar_tasks_require_every_parameter() {
    let (state, _) = memory_state();

    let (status, body) = get(state, "/Calandertasks?customer_id=C1&switchgearID=SG1").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["message"],
        "Missing required parameters: customer_id, switchgearID, cbname, taskid"
    );
}

#[actix_web::test]
async fn task_details_describe_the_plan_header() {
    let (state, documents) = memory_state();
    seed_plan(&documents).await;

    let (status, body) = get(
        state,
        "/getTaskDetails?customer_id=C1&switchgearId=SG1&cbname=Incomer&taskId=T1",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["planStartDate"], "2024-01-01T00:00:00.000Z");
    assert_eq!(body["switchgearName"], "Main Board");
    assert_eq!(
        body["checkList"],
        json!([{"description": "Monthly", "isCompleted": false}])
    );
}

#[actix_web::test]
async fn task_details_report_unknown_task() {
    let (state, documents) = memory_state();
    seed_plan(&documents).await;
    let app = actix_test::init_service(test_app(state)).await;

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri("/getTaskDetails?customer_id=C1&switchgearId=SG1&cbname=Incomer&taskId=T9")
            .insert_header(bearer())
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body: Error = actix_test::read_body_json(res).await;
    assert_eq!(body.message(), "CB or Task not found");
}

#[actix_web::test]
async fn plans_by_customer_expand_recurrences() {
    let (state, documents) = memory_state();
    seed_plan(&documents).await;

    let (status, body) = get(state, "/getPlansByCustomer/C1").await;

    assert_eq!(status, StatusCode::OK);
    let entries = body.as_array().expect("entries");
    assert_eq!(entries.len(), 3);
    assert_eq!(entries[0]["plannedDate"], "2024-01-01");
    assert_eq!(entries[0]["title"], "Main Board-Monthly_30");
    assert_eq!(entries[2]["date"], "2024-03-31");
}
