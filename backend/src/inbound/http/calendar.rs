//! Calendar execution log HTTP handlers.
//!
//! ```text
//! POST /storecalTask
//! GET  /getcalTask/{customer_id}/{configure_Ts}
//! GET  /getcalTask/{customer_id}/{configure_Ts}/{switchgearID}
//! GET  /getcalTask/{customer_id}/{configure_Ts}/{switchgearID}/{taskId}
//! ```

use actix_web::{get, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::ports::CalendarFilter;
use crate::domain::CalendarConfiguration;
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::CustomerAuth;
use crate::inbound::http::schemas::{ErrorSchema, MessageResponseBody};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, missing_field_error, parse_customer_id, present, required_fields_error,
};

/// Request payload merging execution records into the calendar log.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct StoreCalendarRequestBody {
    pub customer_id: Option<String>,
    #[schema(value_type = Option<Vec<Object>>)]
    pub configurations: Option<Vec<CalendarConfiguration>>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CalendarSnapshotResponseBody {
    pub customer_id: String,
    #[schema(value_type = Vec<Object>)]
    pub configurations: Vec<CalendarConfiguration>,
}

/// Merge execution records into the calendar log of a customer.
#[utoipa::path(
    post,
    path = "/storecalTask",
    request_body = StoreCalendarRequestBody,
    responses(
        (status = 200, description = "Records stored", body = MessageResponseBody),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorized", body = ErrorSchema),
        (status = 409, description = "Calendar changed concurrently", body = ErrorSchema)
    ),
    tags = ["calendar"],
    operation_id = "storeCalendar",
    security(("BearerToken" = []))
)]
#[post("/storecalTask")]
pub async fn store_calendar(
    state: web::Data<HttpState>,
    _auth: CustomerAuth,
    payload: web::Json<StoreCalendarRequestBody>,
) -> ApiResult<web::Json<MessageResponseBody>> {
    let StoreCalendarRequestBody {
        customer_id,
        configurations,
    } = payload.into_inner();
    let customer_id = present(customer_id)
        .ok_or_else(|| missing_field_error(FieldName::new("customer_id")))?;
    let configurations = configurations.ok_or_else(|| {
        required_fields_error(
            "No data available as input",
            &[FieldName::new("configurations")],
        )
    })?;
    let customer_id = parse_customer_id(customer_id, FieldName::new("customer_id"))?;

    state
        .calendar
        .store_calendar(&customer_id, configurations)
        .await?;

    Ok(web::Json(MessageResponseBody {
        message: "Data stored successfully.".to_owned(),
    }))
}

async fn snapshot(
    state: &HttpState,
    customer_id: String,
    configure_ts: String,
    switchgear_id: Option<String>,
    task_id: Option<String>,
) -> ApiResult<web::Json<CalendarSnapshotResponseBody>> {
    let Some(configure_ts) = present(Some(configure_ts)) else {
        return Err(required_fields_error(
            "Customer ID and configure_Ts (date) are required.",
            &[FieldName::new("customer_id"), FieldName::new("configure_Ts")],
        ));
    };
    let customer_id = parse_customer_id(customer_id, FieldName::new("customer_id"))?;

    let configurations = state
        .calendar_query
        .calendar_snapshot(CalendarFilter {
            customer_id: customer_id.clone(),
            configure_ts,
            switchgear_id,
            task_id,
        })
        .await?;

    Ok(web::Json(CalendarSnapshotResponseBody {
        customer_id: customer_id.to_string(),
        configurations,
    }))
}

/// Calendar configurations recorded on `configure_Ts`.
#[utoipa::path(
    get,
    path = "/getcalTask/{customer_id}/{configure_Ts}",
    params(
        ("customer_id" = String, Path, description = "Customer id"),
        ("configure_Ts" = String, Path, description = "Snapshot date")
    ),
    responses(
        (status = 200, description = "Calendar snapshot", body = CalendarSnapshotResponseBody),
        (status = 401, description = "Unauthorized", body = ErrorSchema),
        (status = 404, description = "Nothing recorded", body = ErrorSchema)
    ),
    tags = ["calendar"],
    operation_id = "calendarForDate",
    security(("BearerToken" = []))
)]
#[get("/getcalTask/{customer_id}/{configure_Ts}")]
pub async fn calendar_for_date(
    state: web::Data<HttpState>,
    _auth: CustomerAuth,
    path: web::Path<(String, String)>,
) -> ApiResult<web::Json<CalendarSnapshotResponseBody>> {
    let (customer_id, configure_ts) = path.into_inner();
    snapshot(&state, customer_id, configure_ts, None, None).await
}

/// Calendar configurations on `configure_Ts` narrowed to one switchgear.
#[utoipa::path(
    get,
    path = "/getcalTask/{customer_id}/{configure_Ts}/{switchgearID}",
    params(
        ("customer_id" = String, Path, description = "Customer id"),
        ("configure_Ts" = String, Path, description = "Snapshot date"),
        ("switchgearID" = String, Path, description = "Switchgear id")
    ),
    responses(
        (status = 200, description = "Calendar snapshot", body = CalendarSnapshotResponseBody),
        (status = 401, description = "Unauthorized", body = ErrorSchema),
        (status = 404, description = "Nothing recorded", body = ErrorSchema)
    ),
    tags = ["calendar"],
    operation_id = "calendarForSwitchgear",
    security(("BearerToken" = []))
)]
#[get("/getcalTask/{customer_id}/{configure_Ts}/{switchgearID}")]
pub async fn calendar_for_switchgear(
    state: web::Data<HttpState>,
    _auth: CustomerAuth,
    path: web::Path<(String, String, String)>,
) -> ApiResult<web::Json<CalendarSnapshotResponseBody>> {
    let (customer_id, configure_ts, switchgear_id) = path.into_inner();
    snapshot(&state, customer_id, configure_ts, Some(switchgear_id), None).await
}

/// Calendar configurations on `configure_Ts` narrowed to one planned breaker.
#[utoipa::path(
    get,
    path = "/getcalTask/{customer_id}/{configure_Ts}/{switchgearID}/{taskId}",
    params(
        ("customer_id" = String, Path, description = "Customer id"),
        ("configure_Ts" = String, Path, description = "Snapshot date"),
        ("switchgearID" = String, Path, description = "Switchgear id"),
        ("taskId" = String, Path, description = "Planned breaker task id")
    ),
    responses(
        (status = 200, description = "Calendar snapshot", body = CalendarSnapshotResponseBody),
        (status = 401, description = "Unauthorized", body = ErrorSchema),
        (status = 404, description = "Nothing recorded", body = ErrorSchema)
    ),
    tags = ["calendar"],
    operation_id = "calendarForTask",
    security(("BearerToken" = []))
)]
#[get("/getcalTask/{customer_id}/{configure_Ts}/{switchgearID}/{taskId}")]
pub async fn calendar_for_task(
    state: web::Data<HttpState>,
    _auth: CustomerAuth,
    path: web::Path<(String, String, String, String)>,
) -> ApiResult<web::Json<CalendarSnapshotResponseBody>> {
    let (customer_id, configure_ts, switchgear_id, task_id) = path.into_inner();
    snapshot(
        &state,
        customer_id,
        configure_ts,
        Some(switchgear_id),
        Some(task_id),
    )
    .await
}

#[cfg(test)]
#[path = "calendar_tests.rs"]
mod tests;
