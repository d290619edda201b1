//! Driving ports for the per-breaker maintenance plan (the mapping tree).

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::domain::{
    CustomerId, DateTriple, Error, MappedSwitchgear, MappingDocument, PlannedCb, Task,
};

/// Partial update of one planned breaker.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PlanUpdate {
    pub from_date: Option<DateTriple>,
    pub to_date: Option<DateTriple>,
    pub tasks: Option<Vec<Task>>,
}

/// Address of one planned breaker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanLocator {
    pub customer_id: CustomerId,
    pub switchgear_id: String,
    pub task_id: String,
}

/// Switchgear listed by the configuration inventory.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SwitchgearRef {
    pub id: Option<String>,
    pub name: Option<String>,
}

/// Breaker name listed under a configured switchgear.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BreakerName {
    #[serde(rename = "Cb_Name")]
    pub cb_name: Option<String>,
    #[serde(rename = "Cb_Id")]
    pub cb_id: Option<i64>,
}

/// Schedules already planned for one breaker name.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleOverview {
    pub cbname: String,
    pub planshudule: Vec<Option<String>>,
    /// Planned breakers created today.
    pub count: usize,
    #[serde(rename = "allCBsTaskID")]
    pub all_cbs_task_id: Vec<String>,
}

/// Why no schedule overview could be built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MissingSchedules {
    /// The customer has no mapping document.
    NoMapping,
    /// The mapping has no switchgear with the requested device id.
    NoSwitchgear { cb_name: String },
}

/// Result of the mapping lookup, from broadest to narrowest.
#[derive(Debug, Clone, PartialEq)]
pub enum MappingOverview {
    Switchgears(Vec<SwitchgearRef>),
    BreakerNames(Vec<BreakerName>),
    Schedules(ScheduleOverview),
    NoSchedules(MissingSchedules),
}

/// Parameters of the mapping lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingOverviewRequest {
    pub customer_id: CustomerId,
    pub device_id: Option<String>,
    pub cb_name: Option<String>,
}

/// Planned breaker as exposed to plan editors.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanView {
    pub task_id: Option<String>,
    pub cbname: Option<String>,
    pub cbid: Option<Value>,
    #[serde(rename = "pms_des")]
    pub pms_des: Option<String>,
    pub planshudule: Option<String>,
    pub from_date: Option<DateTriple>,
    pub to_date: Option<DateTriple>,
    pub tasks: Vec<Task>,
}

impl From<&PlannedCb> for PlanView {
    fn from(cb: &PlannedCb) -> Self {
        Self {
            task_id: cb.task_id.clone(),
            cbname: cb.cbname.clone(),
            cbid: cb.cbid.clone(),
            pms_des: cb.pms_des.clone(),
            planshudule: cb.planshudule.clone(),
            from_date: cb.plan_start_date,
            to_date: cb.plan_end_date,
            tasks: cb.tasks.clone(),
        }
    }
}

/// Mapped switchgear with its breaker plans.
///
/// Field names follow the wire contract clients already consume.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SwitchgearPlanView {
    #[serde(rename = "swiggearName")]
    pub switchgear_name: Option<String>,
    #[serde(rename = "swiggearId")]
    pub switchgear_id: Option<String>,
    pub cbs: Vec<PlanView>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MappedSwitchgearView {
    Switchgear(SwitchgearPlanView),
    Task(PlanView),
}

/// Filters applied to the mapping tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanScheduleFilter {
    pub customer_id: CustomerId,
    pub switchgear_id: Option<String>,
    pub planshudule: Option<String>,
    /// Keep breakers whose plan window contains this date.
    pub active_on: Option<NaiveDate>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MaintenancePlanCommand: Send + Sync {
    /// Merge planned switchgears into the stored mapping tree.
    async fn merge_mapping(
        &self,
        customer_id: &CustomerId,
        switchgears: Vec<MappedSwitchgear>,
    ) -> Result<MappingDocument, Error>;

    /// Move plan dates or replace the task list of one planned breaker.
    async fn update_plan(&self, locator: PlanLocator, update: PlanUpdate) -> Result<PlannedCb, Error>;

    async fn remove_planned_breaker(&self, locator: PlanLocator) -> Result<(), Error>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MaintenancePlanQuery: Send + Sync {
    async fn mapping_overview(
        &self,
        request: MappingOverviewRequest,
    ) -> Result<MappingOverview, Error>;

    async fn mapped_switchgear(
        &self,
        customer_id: &CustomerId,
        switchgear_id: &str,
        task_id: Option<String>,
    ) -> Result<MappedSwitchgearView, Error>;

    async fn plan_schedules(&self, filter: PlanScheduleFilter)
    -> Result<Vec<MappedSwitchgear>, Error>;
}

/// Fixture plan with no stored customers.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureMaintenancePlan;

#[async_trait]
impl MaintenancePlanCommand for FixtureMaintenancePlan {
    async fn merge_mapping(
        &self,
        customer_id: &CustomerId,
        switchgears: Vec<MappedSwitchgear>,
    ) -> Result<MappingDocument, Error> {
        Ok(MappingDocument {
            customer_id: customer_id.clone(),
            switchgears,
            extra: Map::new(),
        })
    }

    async fn update_plan(&self, _locator: PlanLocator, _update: PlanUpdate) -> Result<PlannedCb, Error> {
        Err(Error::not_found("Customer not found"))
    }

    async fn remove_planned_breaker(&self, _locator: PlanLocator) -> Result<(), Error> {
        Err(Error::not_found("Customer not found"))
    }
}

#[async_trait]
impl MaintenancePlanQuery for FixtureMaintenancePlan {
    async fn mapping_overview(
        &self,
        _request: MappingOverviewRequest,
    ) -> Result<MappingOverview, Error> {
        Ok(MappingOverview::Switchgears(Vec::new()))
    }

    async fn mapped_switchgear(
        &self,
        _customer_id: &CustomerId,
        _switchgear_id: &str,
        _task_id: Option<String>,
    ) -> Result<MappedSwitchgearView, Error> {
        Err(Error::not_found("Customer don't mapped yet"))
    }

    async fn plan_schedules(
        &self,
        _filter: PlanScheduleFilter,
    ) -> Result<Vec<MappedSwitchgear>, Error> {
        Err(Error::not_found("Customer not found"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn plan_view_renames_dates_for_editors() {
        let cb = PlannedCb {
            task_id: Some("T1".into()),
            plan_start_date: Some(DateTriple {
                year: 2024,
                month: 1,
                day: 1,
            }),
            ..PlannedCb::default()
        };
        let value = serde_json::to_value(PlanView::from(&cb)).expect("serialises");

        assert_eq!(value["taskId"], json!("T1"));
        assert_eq!(value["fromDate"], json!({"year": 2024, "month": 1, "day": 1}));
        assert_eq!(value["toDate"], json!(null));
    }

    #[test]
    fn breaker_names_use_legacy_keys() {
        let value = serde_json::to_value(BreakerName {
            cb_name: Some("Incomer".into()),
            cb_id: Some(4),
        })
        .expect("serialises");
        assert_eq!(value, json!({"Cb_Name": "Incomer", "Cb_Id": 4}));
    }
}
