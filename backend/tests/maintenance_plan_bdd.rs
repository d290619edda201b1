//! Behavioural tests for the maintenance plan lifecycle over HTTP.
//!
//! Every request builds a fresh Actix service over the same [`HttpState`], so
//! documents written by one step are visible to the next through the shared
//! in-memory store.

use std::sync::Arc;

use actix_web::http::{Method, header};
use actix_web::test as actix_test;
use actix_web::{App, web};
use mockable::DefaultClock;
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use serde_json::{Value, json};

use switchgear_pm::domain::ports::{FixtureDocumentStore, FixtureTokenVerifier};
use switchgear_pm::domain::{ConcurrencyPolicy, DocumentTreeStore, TableNames};
use switchgear_pm::inbound::http::configure;
use switchgear_pm::inbound::http::state::{DocumentServices, HttpState};
use switchgear_pm::outbound::pdf::PrintPdfRenderer;

const CUSTOMER: &str = "C1";

struct PlanWorld {
    state: HttpState,
    last_status: Option<u16>,
    last_body: Option<Value>,
}

impl PlanWorld {
    fn new() -> Self {
        let documents = DocumentTreeStore::new(
            Arc::new(FixtureDocumentStore::new()),
            TableNames::default(),
            ConcurrencyPolicy::default(),
        );
        let state = HttpState::from_documents(DocumentServices {
            documents,
            tokens: Arc::new(FixtureTokenVerifier),
            renderer: Arc::new(PrintPdfRenderer),
            clock: Arc::new(DefaultClock),
        });
        Self {
            state,
            last_status: None,
            last_body: None,
        }
    }

    fn send(&mut self, method: Method, path: &str, payload: Option<Value>, authorised: bool) {
        let state = self.state.clone();
        let path = path.to_owned();
        let (status, body) = actix_rt::System::new().block_on(async move {
            let app = actix_test::init_service(
                App::new()
                    .app_data(web::Data::new(state))
                    .configure(configure),
            )
            .await;
            let mut request = actix_test::TestRequest::default().method(method).uri(&path);
            if authorised {
                request =
                    request.insert_header((header::AUTHORIZATION, format!("Bearer {CUSTOMER}")));
            }
            if let Some(payload) = payload {
                request = request.set_json(payload);
            }
            let res = actix_test::call_service(&app, request.to_request()).await;
            let status = res.status().as_u16();
            let bytes = actix_test::read_body(res).await;
            (status, serde_json::from_slice::<Value>(&bytes).ok())
        });
        self.last_status = Some(status);
        self.last_body = body;
    }

    fn configure_switchgear(&mut self, id: &str, name: &str, breakers: [&str; 2]) {
        let configured: Vec<Value> = breakers
            .iter()
            .zip(1_i64..)
            .map(|(breaker, cb_id)| json!({"id": cb_id, "name": breaker}))
            .collect();
        self.send(
            Method::POST,
            &format!("/switchgearConfig/{CUSTOMER}/Plant"),
            Some(json!({
                "configswitchgears": [{"id": id, "name": name, "configuredCBs": configured}]
            })),
            true,
        );
    }

    fn body(&self) -> &Value {
        self.last_body.as_ref().expect("response body")
    }
}

#[fixture]
fn world() -> PlanWorld {
    PlanWorld::new()
}

#[given("an empty maintenance store")]
fn an_empty_maintenance_store(world: &mut PlanWorld) {
    assert!(world.last_status.is_none());
}

#[given("switchgear {id} named {name} is configured with breakers {first} and {second}")]
fn switchgear_is_configured(
    world: &mut PlanWorld,
    id: String,
    name: String,
    first: String,
    second: String,
) {
    world.configure_switchgear(&id, &name, [first.as_str(), second.as_str()]);
    assert_eq!(world.last_status, Some(201));
}

#[given("breaker {breaker} of switchgear {switchgear} is mapped to task {task}")]
fn breaker_is_mapped(world: &mut PlanWorld, breaker: String, switchgear: String, task: String) {
    world.send(
        Method::POST,
        "/insertmapData",
        Some(json!({
            "customer_id": CUSTOMER,
            "switchgears": [{
                "switchgearId": switchgear,
                "switchgearName": "Main",
                "cbs": [{
                    "cbid": 1,
                    "cbname": breaker,
                    "taskId": task,
                    "planshudule": "Monthly_30",
                    "tasks": []
                }]
            }]
        })),
        true,
    );
    assert_eq!(world.last_status, Some(200));
}

#[when("the operator configures switchgear {id} named {name} with breakers {first} and {second}")]
fn the_operator_configures_switchgear(
    world: &mut PlanWorld,
    id: String,
    name: String,
    first: String,
    second: String,
) {
    world.configure_switchgear(&id, &name, [first.as_str(), second.as_str()]);
}

#[when("the operator lists the breakers of switchgear {id}")]
fn the_operator_lists_breakers(world: &mut PlanWorld, id: String) {
    world.send(
        Method::GET,
        &format!("/switchgearConfig/{CUSTOMER}/{id}"),
        None,
        true,
    );
}

#[when("an anonymous client lists the breakers of switchgear {id}")]
fn an_anonymous_client_lists_breakers(world: &mut PlanWorld, id: String) {
    world.send(
        Method::GET,
        &format!("/switchgearConfig/{CUSTOMER}/{id}"),
        None,
        false,
    );
}

#[when("the operator fetches the plan of switchgear {id}")]
fn the_operator_fetches_the_plan(world: &mut PlanWorld, id: String) {
    world.send(Method::GET, &format!("/switchgear/{CUSTOMER}/{id}"), None, true);
}

#[when("the operator removes task {task} from switchgear {id}")]
fn the_operator_removes_task(world: &mut PlanWorld, task: String, id: String) {
    world.send(
        Method::DELETE,
        &format!("/switchgear/{CUSTOMER}/{id}/{task}"),
        None,
        true,
    );
}

#[then("the response status is {status}")]
fn the_response_status_is(world: &mut PlanWorld, status: u16) {
    assert_eq!(world.last_status, Some(status), "body: {:?}", world.last_body);
}

#[then("the listing contains breaker {name}")]
fn the_listing_contains_breaker(world: &mut PlanWorld, name: String) {
    let breakers = world.body()["configuredCB"]
        .as_array()
        .expect("configuredCB array");
    assert!(
        breakers
            .iter()
            .any(|cb| cb.get("name").and_then(Value::as_str) == Some(name.as_str())),
        "{name} should be listed"
    );
}

#[then("the error message mentions {fragment}")]
fn the_error_message_mentions(world: &mut PlanWorld, fragment: String) {
    let message = world.body()["message"].as_str().expect("message field");
    assert!(message.contains(&fragment), "{message} should mention {fragment}");
}

#[then("the plan lists task {task}")]
fn the_plan_lists_task(world: &mut PlanWorld, task: String) {
    let cbs = world.body()["switchgear"]["cbs"].as_array().expect("cbs array");
    assert!(
        cbs.iter()
            .any(|cb| cb.get("taskId").and_then(Value::as_str) == Some(task.as_str())),
        "{task} should be planned"
    );
}

#[then("the plan lists no tasks")]
fn the_plan_lists_no_tasks(world: &mut PlanWorld) {
    assert_eq!(world.last_status, Some(200));
    let cbs = world.body()["switchgear"]["cbs"].as_array().expect("cbs array");
    assert!(cbs.is_empty());
}

#[scenario(
    path = "tests/features/maintenance_plan.feature",
    name = "Configured breakers are listed by switchgear"
)]
fn configured_breakers_are_listed(world: PlanWorld) {
    drop(world);
}

#[scenario(
    path = "tests/features/maintenance_plan.feature",
    name = "Duplicate breaker names are rejected"
)]
fn duplicate_breaker_names_are_rejected(world: PlanWorld) {
    drop(world);
}

#[scenario(
    path = "tests/features/maintenance_plan.feature",
    name = "A mapped breaker can be removed from the plan"
)]
fn a_mapped_breaker_can_be_removed(world: PlanWorld) {
    drop(world);
}

#[scenario(
    path = "tests/features/maintenance_plan.feature",
    name = "Requests without a bearer token are refused"
)]
fn requests_without_a_token_are_refused(world: PlanWorld) {
    drop(world);
}
