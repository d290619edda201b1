//! Switchgear configuration inventory HTTP handlers.
//!
//! ```text
//! POST   /switchgearConfig/{id}/{name}
//! GET    /switchgearConfig/{id}/{deviceId}
//! DELETE /removeCB/{id}/{switchgearid}/{cbId}
//! PUT    /updateCB/{id}/{switchgearid}/{cbId}
//! GET    /cbDetails/{id}/{switchgearid}/{cbId}/pdf
//! ```

use actix_web::http::header::{self, ContentDisposition, DispositionParam, DispositionType};
use actix_web::{HttpResponse, delete, get, post, put, web};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use utoipa::ToSchema;

use crate::domain::ports::{
    AppendSwitchgearsRequest, BreakerLocator, BreakerSummary, ConfiguredBreakers,
};
use crate::domain::ConfigSwitchgear;
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::CustomerAuth;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, parse_cb_id, parse_customer_id, required_fields_error,
};

/// Request payload appending switchgear configurations.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct AppendConfigsRequestBody {
    #[schema(value_type = Option<Vec<Object>>)]
    pub configswitchgears: Option<Vec<ConfigSwitchgear>>,
}

/// Response payload listing every configured switchgear after an append.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AppendConfigsResponseBody {
    pub message: String,
    #[schema(value_type = Vec<Object>)]
    pub updated_configs: Vec<ConfigSwitchgear>,
}

/// Response payload listing the breakers of one switchgear.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConfiguredBreakersResponseBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(rename = "configuredCB")]
    #[schema(value_type = Vec<Object>)]
    pub configured_cb: Vec<BreakerSummary>,
}

/// Request payload overlaying fields onto one breaker.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBreakerRequestBody {
    #[serde(rename = "updatedCB")]
    #[schema(value_type = Option<Object>)]
    pub updated_cb: Option<Map<String, Value>>,
}

/// Response payload returned by breaker edits.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BreakerEditResponseBody {
    pub message: String,
    #[schema(value_type = Vec<Object>)]
    pub updated_config_switchgears: Vec<ConfigSwitchgear>,
}

const APPEND_REQUIRED: &str = "Fields 'id', 'name', and 'configswitchgears' are required, and 'configswitchgears' must be a non-empty array.";
const UPDATE_REQUIRED: &str = "id, switchgearid, cbId, and updatedCB are required.";

fn breaker_locator(path: (String, String, String)) -> ApiResult<BreakerLocator> {
    let (id, switchgear_id, cb_id) = path;
    Ok(BreakerLocator {
        customer_id: parse_customer_id(id, FieldName::new("id"))?,
        switchgear_id,
        cb_id: parse_cb_id(&cb_id, FieldName::new("cbId"))?,
    })
}

/// Append switchgear configurations, rejecting duplicate breaker names.
#[utoipa::path(
    post,
    path = "/switchgearConfig/{id}/{name}",
    params(
        ("id" = String, Path, description = "Customer id"),
        ("name" = String, Path, description = "Customer display name")
    ),
    request_body = AppendConfigsRequestBody,
    responses(
        (status = 201, description = "Configurations appended", body = AppendConfigsResponseBody),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorized", body = ErrorSchema),
        (status = 409, description = "Duplicate breaker name", body = ErrorSchema)
    ),
    tags = ["switchgear-config"],
    operation_id = "appendSwitchgearConfigs",
    security(("BearerToken" = []))
)]
#[post("/switchgearConfig/{id}/{name}")]
pub async fn append_switchgear_configs(
    state: web::Data<HttpState>,
    _auth: CustomerAuth,
    path: web::Path<(String, String)>,
    payload: web::Json<AppendConfigsRequestBody>,
) -> ApiResult<HttpResponse> {
    let (id, name) = path.into_inner();
    let configswitchgears = payload
        .into_inner()
        .configswitchgears
        .filter(|configs| !configs.is_empty())
        .ok_or_else(|| {
            required_fields_error(
                APPEND_REQUIRED,
                &[FieldName::new("id"), FieldName::new("name"), FieldName::new("configswitchgears")],
            )
        })?;
    let customer_id = parse_customer_id(id, FieldName::new("id"))?;

    let updated_configs = state
        .inventory
        .append_switchgears(AppendSwitchgearsRequest {
            customer_id,
            name,
            configswitchgears,
        })
        .await?;

    Ok(HttpResponse::Created().json(AppendConfigsResponseBody {
        message: "Data successfully appended and saved.".to_owned(),
        updated_configs,
    }))
}

/// List the configured breakers of one switchgear.
#[utoipa::path(
    get,
    path = "/switchgearConfig/{id}/{deviceId}",
    params(
        ("id" = String, Path, description = "Customer id"),
        ("deviceId" = String, Path, description = "Switchgear id")
    ),
    responses(
        (status = 200, description = "Configured breakers", body = ConfiguredBreakersResponseBody),
        (status = 201, description = "Switchgear not configured", body = ConfiguredBreakersResponseBody),
        (status = 401, description = "Unauthorized", body = ErrorSchema),
        (status = 404, description = "Customer not configured", body = ErrorSchema)
    ),
    tags = ["switchgear-config"],
    operation_id = "listConfiguredBreakers",
    security(("BearerToken" = []))
)]
#[get("/switchgearConfig/{id}/{deviceId}")]
pub async fn list_configured_breakers(
    state: web::Data<HttpState>,
    _auth: CustomerAuth,
    path: web::Path<(String, String)>,
) -> ApiResult<HttpResponse> {
    let (id, device_id) = path.into_inner();
    let customer_id = parse_customer_id(id, FieldName::new("id"))?;

    let listing = state
        .inventory_query
        .configured_breakers(&customer_id, &device_id)
        .await?;

    Ok(match listing {
        ConfiguredBreakers::Found(configured_cb) => {
            HttpResponse::Ok().json(ConfiguredBreakersResponseBody {
                message: None,
                configured_cb,
            })
        }
        ConfiguredBreakers::SwitchgearMissing => {
            HttpResponse::Created().json(ConfiguredBreakersResponseBody {
                message: Some("No matching switchgear or configured CBs found.".to_owned()),
                configured_cb: Vec::new(),
            })
        }
    })
}

/// Remove one breaker by its integer id.
#[utoipa::path(
    delete,
    path = "/removeCB/{id}/{switchgearid}/{cbId}",
    params(
        ("id" = String, Path, description = "Customer id"),
        ("switchgearid" = String, Path, description = "Switchgear id"),
        ("cbId" = i64, Path, description = "Circuit breaker id")
    ),
    responses(
        (status = 200, description = "Breaker removed", body = BreakerEditResponseBody),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorized", body = ErrorSchema),
        (status = 404, description = "Customer, switchgear or breaker missing", body = ErrorSchema)
    ),
    tags = ["switchgear-config"],
    operation_id = "removeBreaker",
    security(("BearerToken" = []))
)]
#[delete("/removeCB/{id}/{switchgearid}/{cbId}")]
pub async fn remove_breaker(
    state: web::Data<HttpState>,
    _auth: CustomerAuth,
    path: web::Path<(String, String, String)>,
) -> ApiResult<HttpResponse> {
    let locator = breaker_locator(path.into_inner())?;
    let updated_config_switchgears = state.inventory.remove_breaker(locator).await?;
    Ok(HttpResponse::Ok().json(BreakerEditResponseBody {
        message: "Circuit breaker deleted successfully.".to_owned(),
        updated_config_switchgears,
    }))
}

/// Overlay `updatedCB` onto one breaker.
#[utoipa::path(
    put,
    path = "/updateCB/{id}/{switchgearid}/{cbId}",
    params(
        ("id" = String, Path, description = "Customer id"),
        ("switchgearid" = String, Path, description = "Switchgear id"),
        ("cbId" = i64, Path, description = "Circuit breaker id")
    ),
    request_body = UpdateBreakerRequestBody,
    responses(
        (status = 200, description = "Breaker updated", body = BreakerEditResponseBody),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorized", body = ErrorSchema),
        (status = 404, description = "Customer, switchgear or breaker missing", body = ErrorSchema)
    ),
    tags = ["switchgear-config"],
    operation_id = "updateBreaker",
    security(("BearerToken" = []))
)]
#[put("/updateCB/{id}/{switchgearid}/{cbId}")]
pub async fn update_breaker(
    state: web::Data<HttpState>,
    _auth: CustomerAuth,
    path: web::Path<(String, String, String)>,
    payload: web::Json<UpdateBreakerRequestBody>,
) -> ApiResult<HttpResponse> {
    let patch = payload.into_inner().updated_cb.ok_or_else(|| {
        required_fields_error(UPDATE_REQUIRED, &[FieldName::new("updatedCB")])
    })?;
    let locator = breaker_locator(path.into_inner())?;

    let updated_config_switchgears = state.inventory.update_breaker(locator, patch).await?;

    Ok(HttpResponse::Ok().json(BreakerEditResponseBody {
        message: "Circuit breaker updated successfully.".to_owned(),
        updated_config_switchgears,
    }))
}

/// Download the detail sheet of one breaker as a PDF attachment.
#[utoipa::path(
    get,
    path = "/cbDetails/{id}/{switchgearid}/{cbId}/pdf",
    params(
        ("id" = String, Path, description = "Customer id"),
        ("switchgearid" = String, Path, description = "Switchgear id"),
        ("cbId" = i64, Path, description = "Circuit breaker id")
    ),
    responses(
        (status = 200, description = "Breaker detail sheet", content_type = "application/pdf"),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorized", body = ErrorSchema),
        (status = 404, description = "Customer, switchgear or breaker missing", body = ErrorSchema)
    ),
    tags = ["switchgear-config"],
    operation_id = "breakerSheet",
    security(("BearerToken" = []))
)]
#[get("/cbDetails/{id}/{switchgearid}/{cbId}/pdf")]
pub async fn breaker_sheet(
    state: web::Data<HttpState>,
    _auth: CustomerAuth,
    path: web::Path<(String, String, String)>,
) -> ApiResult<HttpResponse> {
    let locator = breaker_locator(path.into_inner())?;
    let sheet = state.inventory_query.breaker_sheet(locator).await?;

    Ok(HttpResponse::Ok()
        .content_type("application/pdf")
        .insert_header((
            header::CONTENT_DISPOSITION,
            ContentDisposition {
                disposition: DispositionType::Attachment,
                parameters: vec![DispositionParam::Filename(sheet.file_name)],
            },
        ))
        .body(sheet.bytes))
}

#[cfg(test)]
#[path = "switchgear_config_tests.rs"]
mod tests;
