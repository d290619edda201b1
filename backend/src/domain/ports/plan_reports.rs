//! Driving port for read-only plan reports.
//!
//! Reports join the mapping tree with the calendar log and the configuration
//! inventory; see [`crate::domain::aggregation`] for the arithmetic.

use async_trait::async_trait;
use serde::Serialize;

use crate::domain::aggregation::{ChecklistEntry, ChecklistItem, GroupedSwitchgear, PlanType};
use crate::domain::{CustomerId, Error, Task};

/// Address of one planned breaker by name and task id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedTaskLocator {
    pub customer_id: CustomerId,
    pub switchgear_id: String,
    pub cbname: String,
    pub task_id: String,
}

/// Plan summaries of every mapped switchgear.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlanSummaries {
    pub customer_id: CustomerId,
    pub switchgears: Vec<GroupedSwitchgear>,
}

/// Header of one planned task.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskDetails {
    pub planshudule: Option<String>,
    pub creation_date: Option<String>,
    /// Plan start at midnight UTC, ISO-8601.
    pub plan_start_date: String,
    pub check_list: Vec<ChecklistItem>,
    #[serde(rename = "customer_id")]
    pub customer_id: CustomerId,
    pub switchgear_name: String,
    pub switchgear_id: Option<String>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PlanReportQuery: Send + Sync {
    async fn plan_summaries(
        &self,
        customer_id: &CustomerId,
        plan_type: PlanType,
        schedule_type: Option<String>,
    ) -> Result<PlanSummaries, Error>;

    /// Planned tasks of one breaker with execution fields overlaid.
    async fn calendar_tasks(&self, locator: PlannedTaskLocator) -> Result<Vec<Task>, Error>;

    async fn task_details(&self, locator: PlannedTaskLocator) -> Result<TaskDetails, Error>;

    /// Grouped checklists, one entry per recurrence.
    async fn plans_by_customer(&self, customer_id: &CustomerId)
    -> Result<Vec<ChecklistEntry>, Error>;
}

/// Fixture reports with no stored customers.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixturePlanReports;

#[async_trait]
impl PlanReportQuery for FixturePlanReports {
    async fn plan_summaries(
        &self,
        _customer_id: &CustomerId,
        _plan_type: PlanType,
        _schedule_type: Option<String>,
    ) -> Result<PlanSummaries, Error> {
        Err(Error::not_found("Customer not found in Preventive table"))
    }

    async fn calendar_tasks(&self, _locator: PlannedTaskLocator) -> Result<Vec<Task>, Error> {
        Err(Error::not_found("Customer not found"))
    }

    async fn task_details(&self, _locator: PlannedTaskLocator) -> Result<TaskDetails, Error> {
        Err(Error::not_found("Customer not found"))
    }

    async fn plans_by_customer(
        &self,
        _customer_id: &CustomerId,
    ) -> Result<Vec<ChecklistEntry>, Error> {
        Err(Error::not_found("Customer not found"))
    }
}
