//! Driving ports for the preventive task catalogue.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::domain::{CustomerId, Error, PreventiveTask, PreventiveTaskSet};

/// Replace the task catalogue of a customer.
#[derive(Debug, Clone, PartialEq)]
pub struct StoreTaskSetRequest {
    pub customer_id: CustomerId,
    pub customer_name: String,
    pub tasks: Vec<PreventiveTask>,
}

/// Subtask projection returned by schedule lookups.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledSubtask {
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_duration: Option<Value>,
}

/// Subtasks of one catalogue task that run on the requested schedule.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledTaskGroup {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    pub main_task: Option<String>,
    pub sub_tasks: Vec<ScheduledSubtask>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PreventiveTaskCommand: Send + Sync {
    async fn store_task_set(&self, request: StoreTaskSetRequest) -> Result<PreventiveTaskSet, Error>;

    /// Overlay `updates` onto the custom task whose `id` equals `task_id`.
    ///
    /// Non-custom tasks and updates touching `mainTask`, `isCustom` or `id`
    /// are refused.
    async fn update_custom_task(
        &self,
        customer_id: &CustomerId,
        task_id: Value,
        updates: Map<String, Value>,
    ) -> Result<PreventiveTaskSet, Error>;

    /// Remove the custom task whose `id` equals `task_id`.
    async fn delete_custom_task(
        &self,
        customer_id: &CustomerId,
        task_id: Value,
    ) -> Result<PreventiveTaskSet, Error>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PreventiveTaskQuery: Send + Sync {
    async fn task_set(&self, customer_id: &CustomerId) -> Result<Vec<PreventiveTask>, Error>;

    /// Catalogue tasks trimmed to the subtasks whose `planSchedule` matches.
    async fn subtasks_for_schedule(
        &self,
        customer_id: &CustomerId,
        plan_schedule: &str,
    ) -> Result<Vec<ScheduledTaskGroup>, Error>;
}

/// Fixture catalogue with no stored customers.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixturePreventiveTasks;

#[async_trait]
impl PreventiveTaskCommand for FixturePreventiveTasks {
    async fn store_task_set(&self, request: StoreTaskSetRequest) -> Result<PreventiveTaskSet, Error> {
        Ok(PreventiveTaskSet {
            customer_id: request.customer_id,
            customer_name: Some(request.customer_name),
            tasks: request.tasks,
            timestamp: None,
            extra: Map::new(),
        })
    }

    async fn update_custom_task(
        &self,
        _customer_id: &CustomerId,
        _task_id: Value,
        _updates: Map<String, Value>,
    ) -> Result<PreventiveTaskSet, Error> {
        Err(Error::not_found("Customer's task not found."))
    }

    async fn delete_custom_task(
        &self,
        _customer_id: &CustomerId,
        _task_id: Value,
    ) -> Result<PreventiveTaskSet, Error> {
        Err(Error::not_found("Customer's task not found."))
    }
}

#[async_trait]
impl PreventiveTaskQuery for FixturePreventiveTasks {
    async fn task_set(&self, _customer_id: &CustomerId) -> Result<Vec<PreventiveTask>, Error> {
        Err(Error::not_found("Customer's task not found."))
    }

    async fn subtasks_for_schedule(
        &self,
        _customer_id: &CustomerId,
        _plan_schedule: &str,
    ) -> Result<Vec<ScheduledTaskGroup>, Error> {
        Err(Error::not_found("Customer not found."))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;

    #[tokio::test]
    async fn fixture_store_keeps_customer_name() {
        let stored = FixturePreventiveTasks
            .store_task_set(StoreTaskSetRequest {
                customer_id: CustomerId::new("C1").expect("valid id"),
                customer_name: "Acme".into(),
                tasks: Vec::new(),
            })
            .await
            .expect("stored");
        assert_eq!(stored.customer_name.as_deref(), Some("Acme"));
    }

    #[tokio::test]
    async fn fixture_query_reports_missing_customer() {
        let err = FixturePreventiveTasks
            .task_set(&CustomerId::new("C1").expect("valid id"))
            .await
            .expect_err("nothing stored");
        assert_eq!(err.code(), ErrorCode::NotFound);
    }
}
