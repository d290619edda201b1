//! Read-only plan report HTTP handlers.
//!
//! ```text
//! GET /testpreservice/{table}/{customer_id}?planType&scheduleType
//! GET /Calandertasks?customer_id&switchgearID&cbname&taskid
//! GET /getTaskDetails?customer_id&switchgearId&cbname&taskId
//! GET /getPlansByCustomer/{customer_id}
//! ```

use std::collections::BTreeMap;

use actix_web::{get, web};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::Task;
use crate::domain::aggregation::{ChecklistEntry, PlanType};
use crate::domain::ports::{PlanSummaries, PlannedTaskLocator, TaskDetails};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::CustomerAuth;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, parse_customer_id, present, reject_unexpected_params, required_fields_error,
};

/// Query parameters `testpreservice` understands.
const SUMMARY_PARAMS: [&str; 2] = ["planType", "scheduleType"];

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CalendarTasksQuery {
    pub customer_id: Option<String>,
    #[serde(rename = "switchgearID")]
    pub switchgear_id: Option<String>,
    pub cbname: Option<String>,
    pub taskid: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TaskDetailsQuery {
    pub customer_id: Option<String>,
    #[serde(rename = "switchgearId")]
    pub switchgear_id: Option<String>,
    pub cbname: Option<String>,
    #[serde(rename = "taskId")]
    pub task_id: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CalendarTasksResponseBody {
    #[schema(value_type = Vec<Object>)]
    pub tasks: Vec<Task>,
}

/// Plan summaries of every mapped switchgear, shaped by `planType`.
///
/// The `table` segment is accepted for path compatibility and not consulted.
#[utoipa::path(
    get,
    path = "/testpreservice/{table}/{customer_id}",
    params(
        ("table" = String, Path, description = "Legacy table name, ignored"),
        ("customer_id" = String, Path, description = "Customer id"),
        ("planType" = String, Query, description = "`Individual` or `Totalplan`"),
        ("scheduleType" = Option<String>, Query, description = "Schedule tag filter for `Totalplan`")
    ),
    responses(
        (status = 200, description = "Plan summaries", body = Object),
        (status = 400, description = "Missing or unexpected parameters", body = ErrorSchema),
        (status = 401, description = "Unauthorized", body = ErrorSchema),
        (status = 404, description = "Customer not planned or configured", body = ErrorSchema)
    ),
    tags = ["plan-reports"],
    operation_id = "planSummaries",
    security(("BearerToken" = []))
)]
#[get("/testpreservice/{table}/{customer_id}")]
pub async fn plan_summaries(
    state: web::Data<HttpState>,
    _auth: CustomerAuth,
    path: web::Path<(String, String)>,
    query: web::Query<BTreeMap<String, String>>,
) -> ApiResult<web::Json<PlanSummaries>> {
    let (_table, customer_id) = path.into_inner();
    let mut query = query.into_inner();
    reject_unexpected_params(&query, &SUMMARY_PARAMS)?;
    let plan_type = present(query.remove("planType")).ok_or_else(|| {
        required_fields_error(
            "'table', 'customer_id', and 'planType' are required.",
            &[FieldName::new("planType")],
        )
    })?;
    let customer_id = parse_customer_id(customer_id, FieldName::new("customer_id"))?;

    let summaries = state
        .reports
        .plan_summaries(
            &customer_id,
            PlanType::from(plan_type.as_str()),
            present(query.remove("scheduleType")),
        )
        .await?;
    Ok(web::Json(summaries))
}

/// Planned tasks of one breaker with execution fields overlaid.
#[utoipa::path(
    get,
    path = "/Calandertasks",
    params(CalendarTasksQuery),
    responses(
        (status = 200, description = "Planned tasks", body = CalendarTasksResponseBody),
        (status = 400, description = "Missing parameters", body = ErrorSchema),
        (status = 401, description = "Unauthorized", body = ErrorSchema),
        (status = 404, description = "Plan missing", body = ErrorSchema)
    ),
    tags = ["plan-reports"],
    operation_id = "calendarTasks",
    security(("BearerToken" = []))
)]
#[get("/Calandertasks")]
pub async fn calendar_tasks(
    state: web::Data<HttpState>,
    _auth: CustomerAuth,
    query: web::Query<CalendarTasksQuery>,
) -> ApiResult<web::Json<CalendarTasksResponseBody>> {
    let CalendarTasksQuery {
        customer_id,
        switchgear_id,
        cbname,
        taskid,
    } = query.into_inner();
    let (Some(customer_id), Some(switchgear_id), Some(cbname), Some(task_id)) = (
        present(customer_id),
        present(switchgear_id),
        present(cbname),
        present(taskid),
    ) else {
        return Err(required_fields_error(
            "Missing required parameters: customer_id, switchgearID, cbname, taskid",
            &[
                FieldName::new("customer_id"),
                FieldName::new("switchgearID"),
                FieldName::new("cbname"),
                FieldName::new("taskid"),
            ],
        ));
    };

    let tasks = state
        .reports
        .calendar_tasks(PlannedTaskLocator {
            customer_id: parse_customer_id(customer_id, FieldName::new("customer_id"))?,
            switchgear_id,
            cbname,
            task_id,
        })
        .await?;
    Ok(web::Json(CalendarTasksResponseBody { tasks }))
}

/// Header details of one planned task.
#[utoipa::path(
    get,
    path = "/getTaskDetails",
    params(TaskDetailsQuery),
    responses(
        (status = 200, description = "Task header", body = Object),
        (status = 400, description = "Missing parameters", body = ErrorSchema),
        (status = 401, description = "Unauthorized", body = ErrorSchema),
        (status = 404, description = "Plan missing", body = ErrorSchema)
    ),
    tags = ["plan-reports"],
    operation_id = "taskDetails",
    security(("BearerToken" = []))
)]
#[get("/getTaskDetails")]
pub async fn task_details(
    state: web::Data<HttpState>,
    _auth: CustomerAuth,
    query: web::Query<TaskDetailsQuery>,
) -> ApiResult<web::Json<TaskDetails>> {
    let TaskDetailsQuery {
        customer_id,
        switchgear_id,
        cbname,
        task_id,
    } = query.into_inner();
    let (Some(customer_id), Some(switchgear_id), Some(cbname), Some(task_id)) = (
        present(customer_id),
        present(switchgear_id),
        present(cbname),
        present(task_id),
    ) else {
        return Err(required_fields_error(
            "Missing required query parameters: customer_id, switchgearId, cbname, taskId",
            &[
                FieldName::new("customer_id"),
                FieldName::new("switchgearId"),
                FieldName::new("cbname"),
                FieldName::new("taskId"),
            ],
        ));
    };

    let details = state
        .reports
        .task_details(PlannedTaskLocator {
            customer_id: parse_customer_id(customer_id, FieldName::new("customer_id"))?,
            switchgear_id,
            cbname,
            task_id,
        })
        .await?;
    Ok(web::Json(details))
}

/// Calendar checklists of every planned breaker, one entry per recurrence.
#[utoipa::path(
    get,
    path = "/getPlansByCustomer/{customer_id}",
    params(("customer_id" = String, Path, description = "Customer id")),
    responses(
        (status = 200, description = "Checklist entries", body = Vec<Object>),
        (status = 401, description = "Unauthorized", body = ErrorSchema),
        (status = 404, description = "Nothing planned", body = ErrorSchema)
    ),
    tags = ["plan-reports"],
    operation_id = "plansByCustomer",
    security(("BearerToken" = []))
)]
#[get("/getPlansByCustomer/{customer_id}")]
pub async fn plans_by_customer(
    state: web::Data<HttpState>,
    _auth: CustomerAuth,
    path: web::Path<String>,
) -> ApiResult<web::Json<Vec<ChecklistEntry>>> {
    let customer_id = parse_customer_id(path.into_inner(), FieldName::new("customer_id"))?;
    let entries = state.reports.plans_by_customer(&customer_id).await?;
    Ok(web::Json(entries))
}

#[cfg(test)]
#[path = "plan_reports_tests.rs"]
mod tests;
