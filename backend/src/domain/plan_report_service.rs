//! Read-only plan reports over the mapping, calendar and configuration trees.

use async_trait::async_trait;
use tracing::debug;

use crate::domain::aggregation::{
    AggregationError, ChecklistEntry, ChecklistItem, PlanType, checklist_entries,
    expand_recurrences, group_by_plan_type, merge_and_group_checklists, overlay_execution_fields,
};
use crate::domain::document_tree::{DocumentTreeStore, Loaded};
use crate::domain::ports::{
    DocumentStore, PlanReportQuery, PlanSummaries, PlannedTaskLocator, TaskDetails,
};
use crate::domain::schedule::plan_type;
use crate::domain::switchgear::find_switchgear;
use crate::domain::{
    CalendarDocument, ConfigurationDocument, CustomerId, Error, MappedSwitchgear,
    MappingDocument, PlannedCb, Task,
};

/// Service implementing [`PlanReportQuery`].
pub struct PlanReportService<S: ?Sized> {
    documents: DocumentTreeStore<S>,
}

impl<S> PlanReportService<S>
where
    S: DocumentStore + ?Sized,
{
    pub fn new(documents: DocumentTreeStore<S>) -> Self {
        Self { documents }
    }

    async fn calendar(&self, customer_id: &CustomerId) -> Result<Option<CalendarDocument>, Error> {
        Ok(self
            .documents
            .load::<CalendarDocument>(customer_id)
            .await?
            .map(|loaded| loaded.document))
    }

    /// Load the mapping and locate the breaker named by `locator`.
    async fn planned_task(
        &self,
        locator: &PlannedTaskLocator,
    ) -> Result<(MappedSwitchgear, PlannedCb), Error> {
        let Some(Loaded { document, .. }) = self
            .documents
            .load::<MappingDocument>(&locator.customer_id)
            .await?
        else {
            return Err(Error::not_found("Customer not found"));
        };
        let switchgear = find_switchgear(&document.switchgears, &locator.switchgear_id)
            .ok_or_else(|| Error::not_found("Switchgear not found"))?;
        let cb = switchgear
            .cbs
            .iter()
            .find(|cb| {
                cb.cbname.as_deref() == Some(locator.cbname.as_str())
                    && cb.task_id.as_deref() == Some(locator.task_id.as_str())
            })
            .ok_or_else(|| Error::not_found("CB or Task not found"))?;
        Ok((switchgear.clone(), cb.clone()))
    }
}

#[async_trait]
impl<S> PlanReportQuery for PlanReportService<S>
where
    S: DocumentStore + ?Sized,
{
    async fn plan_summaries(
        &self,
        customer_id: &CustomerId,
        plan_type: PlanType,
        schedule_type: Option<String>,
    ) -> Result<PlanSummaries, Error> {
        let mapping = self
            .documents
            .load::<MappingDocument>(customer_id)
            .await?
            .ok_or_else(|| Error::not_found("Customer not found in Preventive table"))?
            .document;
        let config = self
            .documents
            .load::<ConfigurationDocument>(customer_id)
            .await?
            .ok_or_else(|| Error::not_found("Customer not found in Configuration table"))?
            .document;
        let calendar = self.calendar(customer_id).await?;

        let switchgears = group_by_plan_type(
            &plan_type,
            schedule_type.as_deref(),
            &mapping,
            calendar.as_ref(),
            &config,
        )?;
        debug!(customer_id = %customer_id, switchgears = switchgears.len(), "plan summaries built");
        Ok(PlanSummaries {
            customer_id: customer_id.clone(),
            switchgears,
        })
    }

    async fn calendar_tasks(&self, locator: PlannedTaskLocator) -> Result<Vec<Task>, Error> {
        let (_, cb) = self.planned_task(&locator).await?;
        let calendar = self.calendar(&locator.customer_id).await?;
        Ok(overlay_execution_fields(&cb, calendar.as_ref()))
    }

    async fn task_details(&self, locator: PlannedTaskLocator) -> Result<TaskDetails, Error> {
        let (switchgear, cb) = self.planned_task(&locator).await?;
        let start = cb.plan_start_date.ok_or_else(|| AggregationError::MissingField {
            field: "planStartDate",
            task_id: locator.task_id.clone(),
        })?;
        let start = start.to_date().map_err(AggregationError::from)?;
        let plan_start_date = start
            .and_hms_opt(0, 0, 0)
            .map(|midnight| midnight.and_utc().format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string())
            .unwrap_or_default();
        Ok(TaskDetails {
            check_list: vec![ChecklistItem {
                description: Some(
                    plan_type(cb.planshudule.as_deref().unwrap_or_default()).to_owned(),
                ),
                is_completed: false,
            }],
            planshudule: cb.planshudule,
            creation_date: cb.creation_date,
            plan_start_date,
            customer_id: locator.customer_id,
            switchgear_name: switchgear.switchgear_name.unwrap_or_default(),
            switchgear_id: switchgear.switchgear_id,
        })
    }

    async fn plans_by_customer(
        &self,
        customer_id: &CustomerId,
    ) -> Result<Vec<ChecklistEntry>, Error> {
        let Some(Loaded { document, .. }) = self
            .documents
            .load::<MappingDocument>(customer_id)
            .await?
        else {
            return Err(Error::not_found("Customer not found"));
        };
        let entries: Vec<ChecklistEntry> = merge_and_group_checklists(checklist_entries(&document)?)
            .into_iter()
            .flat_map(expand_recurrences)
            .collect();
        if entries.is_empty() {
            return Err(Error::not_found("No tasks found for the given customer"));
        }
        Ok(entries)
    }
}

#[cfg(test)]
#[path = "plan_report_service_tests.rs"]
mod tests;
