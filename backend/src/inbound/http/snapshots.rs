//! Cross-table join and customer snapshot HTTP handlers.
//!
//! ```text
//! GET  /fetchallData/{customer_id}/{switchgearID}?cbid&configure_Ts
//! POST /saveAllData/{customer_id}/{switchgearID}?configure_Ts
//! GET  /customerdetails/{customer_id}/{switchgearID}?cbid&taskId
//! ```

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::ports::{CustomerDetails, JoinRequest, JoinedView, SnapshotRequest};
use crate::domain::snapshot::SnapshotSelection;
use crate::domain::{CustomerSnapshotDocument, SnapshotEntry};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::CustomerAuth;
use crate::inbound::http::schemas::{ErrorSchema, MessageResponseBody};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_customer_id, present};

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct JoinQuery {
    pub cbid: Option<String>,
    #[serde(rename = "configure_Ts")]
    pub configure_ts: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SaveSnapshotQuery {
    #[serde(rename = "configure_Ts")]
    pub configure_ts: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CustomerDetailsQuery {
    pub cbid: Option<String>,
    #[serde(rename = "taskId")]
    pub task_id: Option<String>,
}

/// Live join of one switchgear, keyed by the request path.
#[derive(Debug, Serialize)]
pub struct JoinedViewResponseBody {
    pub customer_id: String,
    #[serde(rename = "switchgearID")]
    pub switchgear_id: String,
    #[serde(flatten)]
    pub view: JoinedView,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SavedSnapshotResponseBody {
    pub message: String,
    #[schema(value_type = Object)]
    pub data: CustomerSnapshotDocument,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum CustomerDetailsBody {
    Message(MessageResponseBody),
    Entry {
        #[serde(rename = "switchgearResponse")]
        switchgear_response: SnapshotEntry,
    },
    Selection {
        message: &'static str,
        #[serde(rename = "allTablesData")]
        all_tables_data: SnapshotSelection,
    },
}

/// Join the calendar, configuration and mapping documents for one switchgear.
#[utoipa::path(
    get,
    path = "/fetchallData/{customer_id}/{switchgearID}",
    params(
        ("customer_id" = String, Path, description = "Customer id"),
        ("switchgearID" = String, Path, description = "Switchgear id"),
        JoinQuery
    ),
    responses(
        (status = 200, description = "Joined view", body = Object),
        (status = 401, description = "Unauthorized", body = ErrorSchema)
    ),
    tags = ["snapshots"],
    operation_id = "fetchAllData",
    security(("BearerToken" = []))
)]
#[get("/fetchallData/{customer_id}/{switchgearID}")]
pub async fn fetch_all_data(
    state: web::Data<HttpState>,
    _auth: CustomerAuth,
    path: web::Path<(String, String)>,
    query: web::Query<JoinQuery>,
) -> ApiResult<web::Json<JoinedViewResponseBody>> {
    let (customer_id, switchgear_id) = path.into_inner();
    let JoinQuery { cbid, configure_ts } = query.into_inner();
    let customer_id = parse_customer_id(customer_id, FieldName::new("customer_id"))?;

    let view = state
        .snapshots_query
        .joined_view(JoinRequest {
            customer_id: customer_id.clone(),
            switchgear_id: switchgear_id.clone(),
            cbid: present(cbid),
            configure_ts: present(configure_ts),
        })
        .await?;

    Ok(web::Json(JoinedViewResponseBody {
        customer_id: customer_id.to_string(),
        switchgear_id,
        view,
    }))
}

/// Persist the joined view of one switchgear as a dated customer snapshot.
#[utoipa::path(
    post,
    path = "/saveAllData/{customer_id}/{switchgearID}",
    params(
        ("customer_id" = String, Path, description = "Customer id"),
        ("switchgearID" = String, Path, description = "Switchgear id"),
        SaveSnapshotQuery
    ),
    responses(
        (status = 201, description = "Snapshot saved", body = SavedSnapshotResponseBody),
        (status = 401, description = "Unauthorized", body = ErrorSchema),
        (status = 409, description = "Snapshot changed concurrently", body = ErrorSchema)
    ),
    tags = ["snapshots"],
    operation_id = "saveAllData",
    security(("BearerToken" = []))
)]
#[post("/saveAllData/{customer_id}/{switchgearID}")]
pub async fn save_all_data(
    state: web::Data<HttpState>,
    _auth: CustomerAuth,
    path: web::Path<(String, String)>,
    query: web::Query<SaveSnapshotQuery>,
) -> ApiResult<HttpResponse> {
    let (customer_id, switchgear_id) = path.into_inner();
    let customer_id = parse_customer_id(customer_id, FieldName::new("customer_id"))?;

    let data = state
        .snapshots
        .save_snapshot(
            &customer_id,
            &switchgear_id,
            present(query.into_inner().configure_ts),
        )
        .await?;

    Ok(HttpResponse::Created().json(SavedSnapshotResponseBody {
        message: "Data successfully saved.".to_owned(),
        data,
    }))
}

/// Read a stored snapshot, optionally narrowed to a breaker or task.
///
/// Missing customers and switchgears answer 200 with a message, as existing
/// clients expect.
#[utoipa::path(
    get,
    path = "/customerdetails/{customer_id}/{switchgearID}",
    params(
        ("customer_id" = String, Path, description = "Customer id"),
        ("switchgearID" = String, Path, description = "Switchgear id"),
        CustomerDetailsQuery
    ),
    responses(
        (status = 200, description = "Snapshot entry, selection or absence message", body = Object),
        (status = 401, description = "Unauthorized", body = ErrorSchema)
    ),
    tags = ["snapshots"],
    operation_id = "customerDetails",
    security(("BearerToken" = []))
)]
#[get("/customerdetails/{customer_id}/{switchgearID}")]
pub async fn customer_details(
    state: web::Data<HttpState>,
    _auth: CustomerAuth,
    path: web::Path<(String, String)>,
    query: web::Query<CustomerDetailsQuery>,
) -> ApiResult<HttpResponse> {
    let (customer_id, switchgear_id) = path.into_inner();
    let CustomerDetailsQuery { cbid, task_id } = query.into_inner();
    let customer_id = parse_customer_id(customer_id, FieldName::new("customer_id"))?;

    let details = state
        .snapshots_query
        .customer_details(SnapshotRequest {
            customer_id,
            switchgear_id,
            cbid: present(cbid),
            task_id: present(task_id),
        })
        .await?;

    let message = |text: &str| {
        CustomerDetailsBody::Message(MessageResponseBody {
            message: text.to_owned(),
        })
    };
    Ok(HttpResponse::Ok().json(match details {
        CustomerDetails::CustomerMissing => message("Customer not found."),
        CustomerDetails::SwitchgearMissing => message("Switchgear not found."),
        CustomerDetails::Entry(entry) => CustomerDetailsBody::Entry {
            switchgear_response: entry,
        },
        CustomerDetails::Selection(selection) => CustomerDetailsBody::Selection {
            message: "Sucesfully fetched customer details",
            all_tables_data: selection,
        },
    }))
}

#[cfg(test)]
#[path = "snapshots_tests.rs"]
mod tests;
