//! Preventive task catalogue service.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::SecondsFormat;
use mockable::Clock;
use serde_json::{Map, Value};
use tracing::{info, warn};

use crate::domain::document_tree::{DocumentTreeStore, Loaded};
use crate::domain::overlay::apply_patch;
use crate::domain::ports::{
    DocumentStore, PreventiveTaskCommand, PreventiveTaskQuery, ScheduledSubtask,
    ScheduledTaskGroup, StoreTaskSetRequest,
};
use crate::domain::{CustomerId, Error, PreventiveTask, PreventiveTaskSet};

const TASK_SET_MISSING: &str = "Customer's task not found.";
const TASK_MISSING: &str = "Task not found.";

/// Keys a custom task update may never touch.
const PROTECTED_KEYS: [&str; 3] = ["mainTask", "isCustom", "id"];

/// Catalogue tasks trimmed to the subtasks scheduled on `plan_schedule`.
///
/// Tasks left without subtasks are dropped.
pub fn subtasks_on_schedule(tasks: &[PreventiveTask], plan_schedule: &str) -> Vec<ScheduledTaskGroup> {
    tasks
        .iter()
        .filter_map(|task| {
            let sub_tasks: Vec<_> = task
                .sub_tasks
                .iter()
                .filter(|sub| sub.plan_schedule.as_ref().and_then(Value::as_str) == Some(plan_schedule))
                .map(|sub| ScheduledSubtask {
                    name: sub.name.clone(),
                    time_duration: sub.time_duration.clone(),
                })
                .collect();
            (!sub_tasks.is_empty()).then(|| ScheduledTaskGroup {
                id: task.id.clone(),
                main_task: task.main_task.clone(),
                sub_tasks,
            })
        })
        .collect()
}

/// Service implementing the preventive task driving ports.
pub struct PreventiveTaskService<S: ?Sized> {
    documents: DocumentTreeStore<S>,
    clock: Arc<dyn Clock>,
}

impl<S> PreventiveTaskService<S>
where
    S: DocumentStore + ?Sized,
{
    pub fn new(documents: DocumentTreeStore<S>, clock: Arc<dyn Clock>) -> Self {
        Self { documents, clock }
    }

    async fn load_task_set(
        &self,
        customer_id: &CustomerId,
    ) -> Result<Loaded<PreventiveTaskSet>, Error> {
        self.documents
            .load::<PreventiveTaskSet>(customer_id)
            .await?
            .ok_or_else(|| Error::not_found(TASK_SET_MISSING))
    }

    /// Locate the custom task `task_id`, apply `edit` and save the set.
    async fn edit_custom_task<F>(
        &self,
        customer_id: &CustomerId,
        task_id: &Value,
        refusal: &'static str,
        edit: F,
    ) -> Result<PreventiveTaskSet, Error>
    where
        F: FnOnce(&mut Vec<PreventiveTask>, usize) -> Result<(), Error> + Send,
    {
        let Loaded {
            mut document,
            revision,
        } = self.load_task_set(customer_id).await?;
        let index = document
            .tasks
            .iter()
            .position(|task| task.id.as_ref() == Some(task_id))
            .ok_or_else(|| Error::not_found(TASK_MISSING))?;
        if !document.tasks[index].is_custom() {
            warn!(customer_id = %customer_id, task_id = %task_id, "edit of catalogue task refused");
            return Err(Error::invalid_request(refusal));
        }
        edit(&mut document.tasks, index)?;
        self.documents.save(&document, Some(revision)).await?;
        Ok(document)
    }
}

#[async_trait]
impl<S> PreventiveTaskCommand for PreventiveTaskService<S>
where
    S: DocumentStore + ?Sized,
{
    async fn store_task_set(&self, request: StoreTaskSetRequest) -> Result<PreventiveTaskSet, Error> {
        let revision = self
            .documents
            .load::<PreventiveTaskSet>(&request.customer_id)
            .await?
            .map(|loaded| loaded.revision);
        let document = PreventiveTaskSet {
            customer_id: request.customer_id,
            customer_name: Some(request.customer_name),
            tasks: request.tasks,
            timestamp: Some(self.clock.utc().to_rfc3339_opts(SecondsFormat::Millis, true)),
            extra: Map::new(),
        };
        self.documents.save(&document, revision).await?;
        info!(
            customer_id = %document.customer_id,
            tasks = document.tasks.len(),
            "preventive task set stored"
        );
        Ok(document)
    }

    async fn update_custom_task(
        &self,
        customer_id: &CustomerId,
        task_id: Value,
        updates: Map<String, Value>,
    ) -> Result<PreventiveTaskSet, Error> {
        const REFUSAL: &str = "Cannot update this field for this task.";
        if PROTECTED_KEYS.iter().any(|key| updates.contains_key(*key)) {
            return Err(Error::invalid_request(REFUSAL));
        }
        let updated = self
            .edit_custom_task(customer_id, &task_id, REFUSAL, move |tasks, index| {
                tasks[index] = apply_patch(&tasks[index], updates, "preventive task")?;
                Ok(())
            })
            .await?;
        info!(customer_id = %customer_id, task_id = %task_id, "custom task updated");
        Ok(updated)
    }

    async fn delete_custom_task(
        &self,
        customer_id: &CustomerId,
        task_id: Value,
    ) -> Result<PreventiveTaskSet, Error> {
        let updated = self
            .edit_custom_task(
                customer_id,
                &task_id,
                "Cannot delete task for this.",
                |tasks, index| {
                    tasks.remove(index);
                    Ok(())
                },
            )
            .await?;
        info!(customer_id = %customer_id, task_id = %task_id, "custom task deleted");
        Ok(updated)
    }
}

#[async_trait]
impl<S> PreventiveTaskQuery for PreventiveTaskService<S>
where
    S: DocumentStore + ?Sized,
{
    async fn task_set(&self, customer_id: &CustomerId) -> Result<Vec<PreventiveTask>, Error> {
        Ok(self.load_task_set(customer_id).await?.document.tasks)
    }

    async fn subtasks_for_schedule(
        &self,
        customer_id: &CustomerId,
        plan_schedule: &str,
    ) -> Result<Vec<ScheduledTaskGroup>, Error> {
        let Some(Loaded { document, .. }) = self
            .documents
            .load::<PreventiveTaskSet>(customer_id)
            .await?
        else {
            return Err(Error::not_found("Customer not found."));
        };
        if document.tasks.is_empty() {
            return Err(Error::not_found("No tasks found for the customer."));
        }
        let groups = subtasks_on_schedule(&document.tasks, plan_schedule);
        if groups.is_empty() {
            return Err(Error::not_found(
                "No subtasks found with the specified planSchedule.",
            ));
        }
        Ok(groups)
    }
}

#[cfg(test)]
#[path = "preventive_task_service_tests.rs"]
mod tests;
