//! Preventive task catalogue HTTP handlers.
//!
//! ```text
//! POST   /preventivetask
//! GET    /preventivetask/{customerId}
//! PUT    /preventivetask/{customerId}
//! DELETE /preventivetask/{customerId}
//! POST   /getSubtasks
//! ```

use actix_web::{HttpResponse, delete, get, post, put, web};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use utoipa::ToSchema;

use crate::domain::overlay::is_truthy;
use crate::domain::ports::{ScheduledTaskGroup, StoreTaskSetRequest};
use crate::domain::{PreventiveTask, PreventiveTaskSet};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::CustomerAuth;
use crate::inbound::http::schemas::{ErrorSchema, MessageResponseBody};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, parse_customer_id, present, required_fields_error,
};

/// Request payload replacing a customer's task catalogue.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct StoreTasksRequestBody {
    #[serde(alias = "customerId")]
    pub customer_id: Option<String>,
    pub customer_name: Option<String>,
    #[schema(value_type = Option<Vec<Object>>)]
    pub tasks: Option<Vec<PreventiveTask>>,
}

/// Request payload editing one custom task.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct UpdateTaskRequestBody {
    #[schema(value_type = Option<Object>)]
    pub tasks_id: Option<Value>,
    #[schema(value_type = Option<Object>)]
    pub updates: Option<Map<String, Value>>,
}

/// Request payload deleting one custom task.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct DeleteTaskRequestBody {
    #[schema(value_type = Option<Object>)]
    pub tasks_id: Option<Value>,
}

/// Request payload selecting subtasks by schedule.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubtasksRequestBody {
    #[serde(rename = "customer_id")]
    pub customer_id: Option<String>,
    pub plan_schedule: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TaskSetResponseBody {
    pub message: String,
    #[schema(value_type = Vec<Object>)]
    pub config_data: Vec<PreventiveTask>,
}

/// Mutations echo the whole stored catalogue.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TaskSetUpdateResponseBody {
    pub message: String,
    #[schema(value_type = Object)]
    pub updated_data: PreventiveTaskSet,
}

fn task_id(value: Option<Value>) -> Option<Value> {
    value.filter(is_truthy)
}

/// Replace the task catalogue of a customer.
#[utoipa::path(
    post,
    path = "/preventivetask",
    request_body = StoreTasksRequestBody,
    responses(
        (status = 201, description = "Catalogue stored", body = MessageResponseBody),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorized", body = ErrorSchema)
    ),
    tags = ["preventive-tasks"],
    operation_id = "storeTaskSet",
    security(("BearerToken" = []))
)]
#[post("/preventivetask")]
pub async fn store_task_set(
    state: web::Data<HttpState>,
    _auth: CustomerAuth,
    payload: web::Json<StoreTasksRequestBody>,
) -> ApiResult<HttpResponse> {
    let StoreTasksRequestBody {
        customer_id,
        customer_name,
        tasks,
    } = payload.into_inner();
    let (Some(customer_id), Some(customer_name), Some(tasks)) =
        (present(customer_id), present(customer_name), tasks.filter(|t| !t.is_empty()))
    else {
        return Err(required_fields_error(
            "'customerId', 'customer_name', and 'tasks' (non-empty array) are required.",
            &[
                FieldName::new("customer_id"),
                FieldName::new("customer_name"),
                FieldName::new("tasks"),
            ],
        ));
    };

    state
        .preventive_tasks
        .store_task_set(StoreTaskSetRequest {
            customer_id: parse_customer_id(customer_id, FieldName::new("customer_id"))?,
            customer_name,
            tasks,
        })
        .await?;

    Ok(HttpResponse::Created().json(MessageResponseBody {
        message: "Tasks successfully saved.".to_owned(),
    }))
}

/// Fetch the task catalogue of a customer.
#[utoipa::path(
    get,
    path = "/preventivetask/{customerId}",
    params(("customerId" = String, Path, description = "Customer id")),
    responses(
        (status = 200, description = "Task catalogue", body = TaskSetResponseBody),
        (status = 401, description = "Unauthorized", body = ErrorSchema),
        (status = 404, description = "No catalogue stored", body = ErrorSchema)
    ),
    tags = ["preventive-tasks"],
    operation_id = "getTaskSet",
    security(("BearerToken" = []))
)]
#[get("/preventivetask/{customerId}")]
pub async fn get_task_set(
    state: web::Data<HttpState>,
    _auth: CustomerAuth,
    path: web::Path<String>,
) -> ApiResult<web::Json<TaskSetResponseBody>> {
    let customer_id = parse_customer_id(path.into_inner(), FieldName::new("customerId"))?;
    let config_data = state.preventive_tasks_query.task_set(&customer_id).await?;
    Ok(web::Json(TaskSetResponseBody {
        message: "Task showed successfully.".to_owned(),
        config_data,
    }))
}

/// Overlay `updates` onto a custom task.
#[utoipa::path(
    put,
    path = "/preventivetask/{customerId}",
    params(("customerId" = String, Path, description = "Customer id")),
    request_body = UpdateTaskRequestBody,
    responses(
        (status = 200, description = "Task updated", body = TaskSetUpdateResponseBody),
        (status = 400, description = "Invalid request or catalogue task", body = ErrorSchema),
        (status = 401, description = "Unauthorized", body = ErrorSchema),
        (status = 404, description = "Catalogue or task missing", body = ErrorSchema)
    ),
    tags = ["preventive-tasks"],
    operation_id = "updateCustomTask",
    security(("BearerToken" = []))
)]
#[put("/preventivetask/{customerId}")]
pub async fn update_custom_task(
    state: web::Data<HttpState>,
    _auth: CustomerAuth,
    path: web::Path<String>,
    payload: web::Json<UpdateTaskRequestBody>,
) -> ApiResult<web::Json<TaskSetUpdateResponseBody>> {
    let UpdateTaskRequestBody { tasks_id, updates } = payload.into_inner();
    let (Some(tasks_id), Some(updates)) = (task_id(tasks_id), updates) else {
        return Err(required_fields_error(
            "'customerId', 'tasks_id', and 'updates' are required.",
            &[FieldName::new("tasks_id"), FieldName::new("updates")],
        ));
    };
    let customer_id = parse_customer_id(path.into_inner(), FieldName::new("customerId"))?;

    let updated_data = state
        .preventive_tasks
        .update_custom_task(&customer_id, tasks_id, updates)
        .await?;

    Ok(web::Json(TaskSetUpdateResponseBody {
        message: "Task or subtask updated successfully.".to_owned(),
        updated_data,
    }))
}

/// Delete a custom task.
#[utoipa::path(
    delete,
    path = "/preventivetask/{customerId}",
    params(("customerId" = String, Path, description = "Customer id")),
    request_body = DeleteTaskRequestBody,
    responses(
        (status = 200, description = "Task deleted", body = TaskSetUpdateResponseBody),
        (status = 400, description = "Invalid request or catalogue task", body = ErrorSchema),
        (status = 401, description = "Unauthorized", body = ErrorSchema),
        (status = 404, description = "Catalogue or task missing", body = ErrorSchema)
    ),
    tags = ["preventive-tasks"],
    operation_id = "deleteCustomTask",
    security(("BearerToken" = []))
)]
#[delete("/preventivetask/{customerId}")]
pub async fn delete_custom_task(
    state: web::Data<HttpState>,
    _auth: CustomerAuth,
    path: web::Path<String>,
    payload: web::Json<DeleteTaskRequestBody>,
) -> ApiResult<web::Json<TaskSetUpdateResponseBody>> {
    let tasks_id = task_id(payload.into_inner().tasks_id).ok_or_else(|| {
        required_fields_error(
            "'customerId','tasks_id' is required.",
            &[FieldName::new("tasks_id")],
        )
    })?;
    let customer_id = parse_customer_id(path.into_inner(), FieldName::new("customerId"))?;

    let updated_data = state
        .preventive_tasks
        .delete_custom_task(&customer_id, tasks_id)
        .await?;

    Ok(web::Json(TaskSetUpdateResponseBody {
        message: "Task deleted successfully.".to_owned(),
        updated_data,
    }))
}

/// Subtasks scheduled on `planSchedule`, grouped per catalogue task.
#[utoipa::path(
    post,
    path = "/getSubtasks",
    request_body = SubtasksRequestBody,
    responses(
        (status = 200, description = "Matching subtasks", body = Vec<Object>),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorized", body = ErrorSchema),
        (status = 404, description = "Nothing scheduled", body = ErrorSchema)
    ),
    tags = ["preventive-tasks"],
    operation_id = "subtasksForSchedule",
    security(("BearerToken" = []))
)]
#[post("/getSubtasks")]
pub async fn subtasks_for_schedule(
    state: web::Data<HttpState>,
    _auth: CustomerAuth,
    payload: web::Json<SubtasksRequestBody>,
) -> ApiResult<web::Json<Vec<ScheduledTaskGroup>>> {
    let SubtasksRequestBody {
        customer_id,
        plan_schedule,
    } = payload.into_inner();
    let (Some(customer_id), Some(plan_schedule)) = (present(customer_id), present(plan_schedule))
    else {
        return Err(required_fields_error(
            "customer_id and planSchedule are required.",
            &[FieldName::new("customer_id"), FieldName::new("planSchedule")],
        ));
    };
    let customer_id = parse_customer_id(customer_id, FieldName::new("customer_id"))?;

    let groups = state
        .preventive_tasks_query
        .subtasks_for_schedule(&customer_id, &plan_schedule)
        .await?;
    Ok(web::Json(groups))
}

#[cfg(test)]
#[path = "preventive_tasks_tests.rs"]
mod tests;
