//! Maintenance plan (mapping tree) HTTP handlers.
//!
//! ```text
//! POST   /insertmapData
//! GET    /getMappingData?customer_id&device_id&cbName
//! GET    /switchgear/{customer_id}/{switchgearId}?taskId
//! PUT    /switchgear/{id}/{switchgearId}/{taskId}
//! DELETE /switchgear/{id}/{switchgearId}/{taskId}
//! GET    /api/planshadules?customer_id&switchgearId&planshudule&planstartDate
//! ```

use actix_web::{HttpResponse, delete, get, post, put, web};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};
use utoipa::{IntoParams, ToSchema};

use crate::domain::ports::{
    MappedSwitchgearView, MappingOverview, MappingOverviewRequest, MissingSchedules, PlanLocator,
    PlanScheduleFilter, PlanUpdate, PlanView, SwitchgearPlanView,
};
use crate::domain::{CustomerId, Error, MappedSwitchgear, MappingDocument, PlannedCb};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::CustomerAuth;
use crate::inbound::http::schemas::{ErrorSchema, MessageResponseBody};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, parse_customer_id, parse_iso_date, present, required_fields_error, unknown_fields,
};

/// Fields a plan update may carry.
const PLAN_UPDATE_FIELDS: [&str; 3] = ["fromDate", "toDate", "tasks"];

/// Request payload merging planned switchgears into the mapping tree.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct InsertMappingRequestBody {
    pub customer_id: Option<String>,
    #[schema(value_type = Option<Vec<Object>>)]
    pub switchgears: Option<Vec<MappedSwitchgear>>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct InsertMappingResponseBody {
    pub message: String,
    #[schema(value_type = Object)]
    pub data: MappingDocument,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct MappingQuery {
    pub customer_id: Option<String>,
    pub device_id: Option<String>,
    #[serde(rename = "cbName")]
    pub cb_name: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct MappedSwitchgearQuery {
    #[serde(rename = "taskId")]
    pub task_id: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PlanSchedulesQuery {
    pub customer_id: Option<String>,
    #[serde(rename = "switchgearId")]
    pub switchgear_id: Option<String>,
    pub planshudule: Option<String>,
    #[serde(rename = "planstartDate")]
    pub planstart_date: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PlanSchedulesResponseBody {
    pub customer_id: String,
    #[schema(value_type = Vec<Object>)]
    pub switchgears: Vec<MappedSwitchgear>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlanUpdateResponseBody {
    pub message: String,
    #[schema(value_type = Object)]
    pub updated_task: PlannedCb,
}

/// Mapping lookups answer with one of several payload shapes.
#[derive(Debug, Serialize)]
#[serde(untagged)]
enum MappingOverviewBody {
    Switchgears {
        message: &'static str,
        customer_id: String,
        switchgears: Value,
    },
    BreakerNames {
        message: &'static str,
        #[serde(rename = "cbNames")]
        cb_names: Value,
    },
    Schedules {
        message: &'static str,
        #[serde(flatten)]
        overview: Value,
    },
    Empty {
        message: String,
        count: usize,
        #[serde(rename = "allCBsTaskID")]
        all_cbs_task_id: Vec<String>,
    },
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum MappedSwitchgearBody {
    Task {
        message: &'static str,
        task: PlanView,
    },
    Switchgear {
        message: &'static str,
        switchgear: SwitchgearPlanView,
    },
}

fn to_value<T: Serialize>(value: &T) -> ApiResult<Value> {
    serde_json::to_value(value)
        .map_err(|err| Error::internal(format!("failed to encode response: {err}")))
}

fn field<T: DeserializeOwned>(
    body: &mut Map<String, Value>,
    name: &'static str,
) -> ApiResult<Option<T>> {
    body.remove(name)
        .filter(|value| !value.is_null())
        .map(|value| {
            serde_json::from_value(value)
                .map_err(|err| Error::invalid_request(format!("{name} is invalid: {err}")))
        })
        .transpose()
}

fn plan_locator(path: (String, String, String)) -> ApiResult<PlanLocator> {
    let (id, switchgear_id, task_id) = path;
    Ok(PlanLocator {
        customer_id: parse_customer_id(id, FieldName::new("id"))?,
        switchgear_id,
        task_id,
    })
}

fn customer_param(value: Option<String>, message: &str) -> ApiResult<CustomerId> {
    let raw = present(value)
        .ok_or_else(|| required_fields_error(message, &[FieldName::new("customer_id")]))?;
    parse_customer_id(raw, FieldName::new("customer_id"))
}

/// Merge planned switchgears into the stored mapping tree.
#[utoipa::path(
    post,
    path = "/insertmapData",
    request_body = InsertMappingRequestBody,
    responses(
        (status = 200, description = "Mapping merged", body = InsertMappingResponseBody),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorized", body = ErrorSchema),
        (status = 409, description = "Mapping changed concurrently", body = ErrorSchema)
    ),
    tags = ["mapping"],
    operation_id = "insertMapping",
    security(("BearerToken" = []))
)]
#[post("/insertmapData")]
pub async fn insert_mapping(
    state: web::Data<HttpState>,
    _auth: CustomerAuth,
    payload: web::Json<InsertMappingRequestBody>,
) -> ApiResult<web::Json<InsertMappingResponseBody>> {
    let InsertMappingRequestBody {
        customer_id,
        switchgears,
    } = payload.into_inner();
    let (Some(customer_id), Some(switchgears)) = (present(customer_id), switchgears) else {
        return Err(required_fields_error(
            "Invalid input. 'customer_id' and 'switchgears' are required, and 'switchgears' must be an array.",
            &[FieldName::new("customer_id"), FieldName::new("switchgears")],
        ));
    };
    let customer_id = parse_customer_id(customer_id, FieldName::new("customer_id"))?;

    let data = state.plans.merge_mapping(&customer_id, switchgears).await?;

    Ok(web::Json(InsertMappingResponseBody {
        message: "Data inserted/updated successfully!".to_owned(),
        data,
    }))
}

/// Switchgear list, breaker names or planned schedules, by narrowing query.
#[utoipa::path(
    get,
    path = "/getMappingData",
    params(MappingQuery),
    responses(
        (status = 200, description = "Mapping overview", body = Object),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorized", body = ErrorSchema),
        (status = 404, description = "Configuration or device missing", body = ErrorSchema)
    ),
    tags = ["mapping"],
    operation_id = "mappingOverview",
    security(("BearerToken" = []))
)]
#[get("/getMappingData")]
pub async fn mapping_overview(
    state: web::Data<HttpState>,
    _auth: CustomerAuth,
    query: web::Query<MappingQuery>,
) -> ApiResult<HttpResponse> {
    let MappingQuery {
        customer_id,
        device_id,
        cb_name,
    } = query.into_inner();
    let customer_id = customer_param(customer_id, "'customer_id' is required.")?;

    let overview = state
        .plans_query
        .mapping_overview(MappingOverviewRequest {
            customer_id: customer_id.clone(),
            device_id: present(device_id),
            cb_name: present(cb_name),
        })
        .await?;

    let body = match overview {
        MappingOverview::Switchgears(switchgears) => MappingOverviewBody::Switchgears {
            message: "Switchgears fetched successfully.",
            customer_id: customer_id.to_string(),
            switchgears: to_value(&switchgears)?,
        },
        MappingOverview::BreakerNames(names) => MappingOverviewBody::BreakerNames {
            message: "Circuit breaker names for the device:",
            cb_names: to_value(&names)?,
        },
        MappingOverview::Schedules(overview) => MappingOverviewBody::Schedules {
            message: "CB planshudule fetched successfully.",
            overview: to_value(&overview)?,
        },
        MappingOverview::NoSchedules(missing) => MappingOverviewBody::Empty {
            message: match missing {
                MissingSchedules::NoMapping => {
                    "No data found for the given customer_id in Map_ConfigTable.".to_owned()
                }
                MissingSchedules::NoSwitchgear { cb_name } => format!(
                    "No CB's planshudule found with name '{cb_name}' in the switchgears"
                ),
            },
            count: 0,
            all_cbs_task_id: Vec::new(),
        },
    };
    Ok(HttpResponse::Ok().json(body))
}

/// One mapped switchgear, or one of its planned breakers when `taskId` is set.
#[utoipa::path(
    get,
    path = "/switchgear/{customer_id}/{switchgearId}",
    params(
        ("customer_id" = String, Path, description = "Customer id"),
        ("switchgearId" = String, Path, description = "Switchgear id"),
        MappedSwitchgearQuery
    ),
    responses(
        (status = 200, description = "Mapped switchgear or planned breaker", body = Object),
        (status = 401, description = "Unauthorized", body = ErrorSchema),
        (status = 404, description = "Not mapped", body = ErrorSchema)
    ),
    tags = ["mapping"],
    operation_id = "mappedSwitchgear",
    security(("BearerToken" = []))
)]
#[get("/switchgear/{customer_id}/{switchgearId}")]
pub async fn mapped_switchgear(
    state: web::Data<HttpState>,
    _auth: CustomerAuth,
    path: web::Path<(String, String)>,
    query: web::Query<MappedSwitchgearQuery>,
) -> ApiResult<HttpResponse> {
    let (customer_id, switchgear_id) = path.into_inner();
    let customer_id = parse_customer_id(customer_id, FieldName::new("customer_id"))?;

    let view = state
        .plans_query
        .mapped_switchgear(&customer_id, &switchgear_id, present(query.into_inner().task_id))
        .await?;

    Ok(HttpResponse::Ok().json(match view {
        MappedSwitchgearView::Task(task) => MappedSwitchgearBody::Task {
            message: "Task details fetched successfully.",
            task,
        },
        MappedSwitchgearView::Switchgear(switchgear) => MappedSwitchgearBody::Switchgear {
            message: "Mapped Switchgear fetched successfully.",
            switchgear,
        },
    }))
}

/// Move the plan window or replace the tasks of one planned breaker.
#[utoipa::path(
    put,
    path = "/switchgear/{id}/{switchgearId}/{taskId}",
    params(
        ("id" = String, Path, description = "Customer id"),
        ("switchgearId" = String, Path, description = "Switchgear id"),
        ("taskId" = String, Path, description = "Planned breaker task id")
    ),
    request_body(content = Object, description = "`fromDate`, `toDate` and `tasks`"),
    responses(
        (status = 200, description = "Plan updated", body = PlanUpdateResponseBody),
        (status = 400, description = "Invalid fields or refused date move", body = ErrorSchema),
        (status = 401, description = "Unauthorized", body = ErrorSchema),
        (status = 404, description = "Plan missing", body = ErrorSchema)
    ),
    tags = ["mapping"],
    operation_id = "updatePlan",
    security(("BearerToken" = []))
)]
#[put("/switchgear/{id}/{switchgearId}/{taskId}")]
pub async fn update_plan(
    state: web::Data<HttpState>,
    _auth: CustomerAuth,
    path: web::Path<(String, String, String)>,
    payload: web::Json<Map<String, Value>>,
) -> ApiResult<web::Json<PlanUpdateResponseBody>> {
    let mut body = payload.into_inner();
    let unknown = unknown_fields(&body, &PLAN_UPDATE_FIELDS);
    if !unknown.is_empty() {
        return Err(Error::invalid_request(format!(
            "Invalid fields: {}",
            unknown.join(", ")
        )));
    }
    let update = PlanUpdate {
        from_date: field(&mut body, "fromDate")?,
        to_date: field(&mut body, "toDate")?,
        tasks: field(&mut body, "tasks")?,
    };
    let locator = plan_locator(path.into_inner())?;

    let updated_task = state.plans.update_plan(locator, update).await?;

    Ok(web::Json(PlanUpdateResponseBody {
        message: "Task data updated successfully.".to_owned(),
        updated_task,
    }))
}

/// Remove one planned breaker from a mapped switchgear.
#[utoipa::path(
    delete,
    path = "/switchgear/{id}/{switchgearId}/{taskId}",
    params(
        ("id" = String, Path, description = "Customer id"),
        ("switchgearId" = String, Path, description = "Switchgear id"),
        ("taskId" = String, Path, description = "Planned breaker task id")
    ),
    responses(
        (status = 200, description = "Planned breaker removed", body = MessageResponseBody),
        (status = 401, description = "Unauthorized", body = ErrorSchema),
        (status = 404, description = "Plan missing", body = ErrorSchema)
    ),
    tags = ["mapping"],
    operation_id = "removePlannedBreaker",
    security(("BearerToken" = []))
)]
#[delete("/switchgear/{id}/{switchgearId}/{taskId}")]
pub async fn remove_planned_breaker(
    state: web::Data<HttpState>,
    _auth: CustomerAuth,
    path: web::Path<(String, String, String)>,
) -> ApiResult<web::Json<MessageResponseBody>> {
    let locator = plan_locator(path.into_inner())?;
    let message = format!(
        "Circuit Breaker '{}' deleted successfully from Switchgear '{}'.",
        locator.task_id, locator.switchgear_id
    );
    state.plans.remove_planned_breaker(locator).await?;
    Ok(web::Json(MessageResponseBody { message }))
}

/// Mapping tree filtered by switchgear, schedule tag and active date.
#[utoipa::path(
    get,
    path = "/api/planshadules",
    params(PlanSchedulesQuery),
    responses(
        (status = 200, description = "Filtered mapping tree", body = PlanSchedulesResponseBody),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorized", body = ErrorSchema),
        (status = 404, description = "Customer not found", body = ErrorSchema)
    ),
    tags = ["mapping"],
    operation_id = "planSchedules",
    security(("BearerToken" = []))
)]
#[get("/api/planshadules")]
pub async fn plan_schedules(
    state: web::Data<HttpState>,
    _auth: CustomerAuth,
    query: web::Query<PlanSchedulesQuery>,
) -> ApiResult<web::Json<PlanSchedulesResponseBody>> {
    let PlanSchedulesQuery {
        customer_id,
        switchgear_id,
        planshudule,
        planstart_date,
    } = query.into_inner();
    let customer_id = customer_param(customer_id, "customer_id is required")?;
    let active_on = present(planstart_date)
        .map(|raw| parse_iso_date(&raw, FieldName::new("planstartDate")))
        .transpose()?;

    let switchgears = state
        .plans_query
        .plan_schedules(PlanScheduleFilter {
            customer_id: customer_id.clone(),
            switchgear_id: present(switchgear_id),
            planshudule: present(planshudule),
            active_on,
        })
        .await?;

    Ok(web::Json(PlanSchedulesResponseBody {
        customer_id: customer_id.to_string(),
        switchgears,
    }))
}

#[cfg(test)]
#[path = "mapping_tests.rs"]
mod tests;
