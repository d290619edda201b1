//! Maintenance plan service over the mapping tree.
//!
//! The mapping tree nests switchgear → planned breaker (`taskId`) → task
//! (`mainTask`) → subtask (`name`). Incoming plans are merged level by level;
//! matched nodes take a scalar overlay.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use mockable::Clock;
use tracing::info;

use crate::domain::document_tree::{DocumentTreeStore, Loaded};
use crate::domain::merge::{ConflictPolicy, MergeError, merge_level, no_children, remove_by_key};
use crate::domain::ports::{
    BreakerName, DocumentStore, MaintenancePlanCommand, MaintenancePlanQuery,
    MappedSwitchgearView, MappingOverview, MappingOverviewRequest, MissingSchedules, PlanLocator,
    PlanScheduleFilter, PlanUpdate, PlanView, ScheduleOverview, SwitchgearPlanView, SwitchgearRef,
};
use crate::domain::switchgear::{find_switchgear, find_switchgear_mut};
use crate::domain::{
    ConfigurationDocument, CustomerId, Error, MappedSwitchgear, MappingDocument, PlannedCb,
    SubTask, Task,
};

/// Merge planned breakers by `taskId`, their tasks by `mainTask` and the
/// subtasks by `name`.
pub(crate) fn merge_planned_breakers(
    existing: Vec<PlannedCb>,
    incoming: Vec<PlannedCb>,
) -> Result<Vec<PlannedCb>, MergeError> {
    merge_level(
        existing,
        incoming,
        "cbs",
        |cb: &PlannedCb| cb.task_id.clone(),
        ConflictPolicy::MergeChildren,
        |current, incoming| {
            let task_id = current.task_id.clone().unwrap_or_default();
            current.tasks = merge_level(
                std::mem::take(&mut current.tasks),
                std::mem::take(&mut incoming.tasks),
                "tasks",
                |task: &Task| task.main_task.clone(),
                ConflictPolicy::MergeChildren,
                |current, incoming| {
                    let main_task = current.main_task.clone().unwrap_or_default();
                    current.sub_tasks = merge_level(
                        std::mem::take(&mut current.sub_tasks),
                        std::mem::take(&mut incoming.sub_tasks),
                        "subTasks",
                        |sub: &SubTask| sub.name.clone(),
                        ConflictPolicy::MergeChildren,
                        no_children,
                    )
                    .map_err(|err| err.within(main_task))?;
                    Ok(())
                },
            )
            .map_err(|err| err.within(task_id))?;
            Ok(())
        },
    )
}

/// Merge mapped switchgears by `switchgearId`, then their planned breakers.
pub(crate) fn merge_mapped_switchgears(
    existing: Vec<MappedSwitchgear>,
    incoming: Vec<MappedSwitchgear>,
) -> Result<Vec<MappedSwitchgear>, MergeError> {
    merge_level(
        existing,
        incoming,
        "switchgears",
        |sg: &MappedSwitchgear| sg.switchgear_id.clone(),
        ConflictPolicy::MergeChildren,
        |current, incoming| {
            let switchgear_id = current.switchgear_id.clone().unwrap_or_default();
            current.cbs =
                merge_planned_breakers(std::mem::take(&mut current.cbs), std::mem::take(&mut incoming.cbs))
                    .map_err(|err| err.within(switchgear_id))?;
            Ok(())
        },
    )
}

/// Whether `date` falls inside the plan window of `cb`, both ends inclusive.
///
/// Breakers without a readable window never match.
pub fn plan_window_contains(cb: &PlannedCb, date: NaiveDate) -> bool {
    let window = cb
        .plan_start_date
        .zip(cb.plan_end_date)
        .and_then(|(start, end)| start.to_date().ok().zip(end.to_date().ok()));
    window.is_some_and(|(start, end)| start <= date && date <= end)
}

/// Apply a plan update to `cb`, refusing it before any field changes.
fn apply_plan_update(cb: &mut PlannedCb, update: PlanUpdate, today: NaiveDate) -> Result<(), Error> {
    if update.from_date.is_some() {
        let starts_today_or_later = cb
            .plan_start_date
            .and_then(|start| start.to_date().ok())
            .is_some_and(|start| start >= today);
        if !starts_today_or_later {
            return Err(Error::invalid_request(format!(
                "Cannot update 'fromDate' because it does not match today's date ({}).",
                today.format("%Y-%m-%d")
            )));
        }
    }
    let mut updated = false;
    if let Some(from_date) = update.from_date {
        cb.plan_start_date = Some(from_date);
        updated = true;
    }
    if let Some(to_date) = update.to_date {
        cb.plan_end_date = Some(to_date);
        updated = true;
    }
    if !updated {
        return Err(Error::invalid_request("No valid fields provided for update."));
    }
    // A stored breaker always carries a task list, empty or not.
    if let Some(tasks) = update.tasks {
        cb.tasks = tasks;
    }
    Ok(())
}

/// Service implementing the maintenance plan driving ports.
pub struct MaintenancePlanService<S: ?Sized> {
    documents: DocumentTreeStore<S>,
    clock: Arc<dyn Clock>,
}

impl<S> MaintenancePlanService<S>
where
    S: DocumentStore + ?Sized,
{
    pub fn new(documents: DocumentTreeStore<S>, clock: Arc<dyn Clock>) -> Self {
        Self { documents, clock }
    }

    fn today(&self) -> NaiveDate {
        self.clock.utc().date_naive()
    }

    async fn load_mapping(
        &self,
        customer_id: &CustomerId,
        missing: &'static str,
    ) -> Result<Loaded<MappingDocument>, Error> {
        self.documents
            .load::<MappingDocument>(customer_id)
            .await?
            .ok_or_else(|| Error::not_found(missing))
    }
}

#[async_trait]
impl<S> MaintenancePlanCommand for MaintenancePlanService<S>
where
    S: DocumentStore + ?Sized,
{
    async fn merge_mapping(
        &self,
        customer_id: &CustomerId,
        switchgears: Vec<MappedSwitchgear>,
    ) -> Result<MappingDocument, Error> {
        let (existing, revision) = match self.documents.load::<MappingDocument>(customer_id).await? {
            Some(Loaded { document, revision }) => (document, Some(revision)),
            None => (MappingDocument::empty(customer_id.clone()), None),
        };
        let incoming = switchgears.len();
        let document = MappingDocument {
            switchgears: merge_mapped_switchgears(existing.switchgears, switchgears)?,
            ..existing
        };
        self.documents.save(&document, revision).await?;
        info!(customer_id = %customer_id, incoming, "mapping merged");
        Ok(document)
    }

    async fn update_plan(&self, locator: PlanLocator, update: PlanUpdate) -> Result<PlannedCb, Error> {
        let Loaded {
            mut document,
            revision,
        } = self
            .load_mapping(&locator.customer_id, "Customer not found")
            .await?;
        let switchgear = find_switchgear_mut(&mut document.switchgears, &locator.switchgear_id)
            .ok_or_else(|| Error::not_found("Switchgear not found"))?;
        let cb = switchgear
            .cbs
            .iter_mut()
            .find(|cb| cb.task_id.as_deref() == Some(locator.task_id.as_str()))
            .ok_or_else(|| {
                Error::not_found(format!(
                    "No CB found with taskId '{}' in the specified switchgear.",
                    locator.task_id
                ))
            })?;
        apply_plan_update(cb, update, self.today())?;
        let updated = cb.clone();
        self.documents.save(&document, Some(revision)).await?;
        info!(
            customer_id = %locator.customer_id,
            switchgear_id = %locator.switchgear_id,
            task_id = %locator.task_id,
            "plan updated"
        );
        Ok(updated)
    }

    async fn remove_planned_breaker(&self, locator: PlanLocator) -> Result<(), Error> {
        let Loaded {
            mut document,
            revision,
        } = self
            .load_mapping(&locator.customer_id, "Customer not found")
            .await?;
        let switchgear = find_switchgear_mut(&mut document.switchgears, &locator.switchgear_id)
            .ok_or_else(|| Error::not_found("Switchgear not found"))?;
        switchgear.cbs = remove_by_key(
            std::mem::take(&mut switchgear.cbs),
            locator.task_id.as_str(),
            "cbs",
            |cb: &PlannedCb| cb.task_id.as_deref(),
        )
        .map_err(|_| Error::not_found("Circuit Breaker not found"))?;
        self.documents.save(&document, Some(revision)).await?;
        info!(
            customer_id = %locator.customer_id,
            switchgear_id = %locator.switchgear_id,
            task_id = %locator.task_id,
            "planned breaker removed"
        );
        Ok(())
    }
}

#[async_trait]
impl<S> MaintenancePlanQuery for MaintenancePlanService<S>
where
    S: DocumentStore + ?Sized,
{
    async fn mapping_overview(
        &self,
        request: MappingOverviewRequest,
    ) -> Result<MappingOverview, Error> {
        let Some(Loaded { document: config, .. }) = self
            .documents
            .load::<ConfigurationDocument>(&request.customer_id)
            .await?
        else {
            return Err(Error::not_found(
                "No data found for the given customer_id in CB_ConfigTable.",
            ));
        };
        let Some(device_id) = request.device_id else {
            return Ok(MappingOverview::Switchgears(
                config
                    .configswitchgears
                    .iter()
                    .map(|sg| SwitchgearRef {
                        id: sg.id.clone(),
                        name: sg.name.clone(),
                    })
                    .collect(),
            ));
        };
        let device = find_switchgear(&config.configswitchgears, &device_id)
            .ok_or_else(|| Error::not_found("For that Device ID not CB's found."))?;
        let Some(cb_name) = request.cb_name else {
            return Ok(MappingOverview::BreakerNames(
                device
                    .configured_cbs
                    .iter()
                    .map(|cb| BreakerName {
                        cb_name: cb.name.clone(),
                        cb_id: cb.id,
                    })
                    .collect(),
            ));
        };

        let Some(Loaded { document: mapping, .. }) = self
            .documents
            .load::<MappingDocument>(&request.customer_id)
            .await?
        else {
            return Ok(MappingOverview::NoSchedules(MissingSchedules::NoMapping));
        };
        let Some(mapped) = find_switchgear(&mapping.switchgears, &device_id) else {
            return Ok(MappingOverview::NoSchedules(MissingSchedules::NoSwitchgear {
                cb_name,
            }));
        };
        let matching: Vec<&PlannedCb> = mapped
            .cbs
            .iter()
            .filter(|cb| cb.cbname.as_deref() == Some(cb_name.as_str()))
            .collect();
        let mut planshudule: Vec<Option<String>> = Vec::new();
        for cb in &matching {
            if !planshudule.contains(&cb.planshudule) {
                planshudule.push(cb.planshudule.clone());
            }
        }
        let today = self.today().format("%Y-%m-%d").to_string();
        let count = matching
            .iter()
            .filter(|cb| {
                cb.creation_date
                    .as_deref()
                    .is_some_and(|created| created.starts_with(&today))
            })
            .count();
        Ok(MappingOverview::Schedules(ScheduleOverview {
            all_cbs_task_id: matching.iter().filter_map(|cb| cb.task_id.clone()).collect(),
            cbname: cb_name,
            planshudule,
            count,
        }))
    }

    async fn mapped_switchgear(
        &self,
        customer_id: &CustomerId,
        switchgear_id: &str,
        task_id: Option<String>,
    ) -> Result<MappedSwitchgearView, Error> {
        let Loaded { document, .. } = self
            .load_mapping(customer_id, "Customer don't mapped yet")
            .await?;
        let switchgear = find_switchgear(&document.switchgears, switchgear_id)
            .ok_or_else(|| Error::not_found("Switchgear don't mapped yet"))?;
        match task_id {
            Some(task_id) => switchgear
                .cbs
                .iter()
                .find(|cb| cb.task_id.as_deref() == Some(task_id.as_str()))
                .map(|cb| MappedSwitchgearView::Task(PlanView::from(cb)))
                .ok_or_else(|| Error::not_found("TaskId not found in this switchgear")),
            None => Ok(MappedSwitchgearView::Switchgear(SwitchgearPlanView {
                switchgear_name: switchgear.switchgear_name.clone(),
                switchgear_id: switchgear.switchgear_id.clone(),
                cbs: switchgear.cbs.iter().map(PlanView::from).collect(),
            })),
        }
    }

    async fn plan_schedules(
        &self,
        filter: PlanScheduleFilter,
    ) -> Result<Vec<MappedSwitchgear>, Error> {
        let documents = self
            .documents
            .load_all::<MappingDocument>(&filter.customer_id)
            .await?;
        let Some(mapping) = documents.into_iter().next() else {
            return Err(Error::not_found("Customer not found"));
        };
        Ok(mapping
            .switchgears
            .into_iter()
            .filter(|sg| {
                filter
                    .switchgear_id
                    .as_deref()
                    .is_none_or(|id| sg.switchgear_id.as_deref() == Some(id))
            })
            .map(|sg| MappedSwitchgear {
                cbs: sg
                    .cbs
                    .into_iter()
                    .filter(|cb| {
                        filter
                            .planshudule
                            .as_deref()
                            .is_none_or(|tag| cb.planshudule.as_deref() == Some(tag))
                    })
                    .filter(|cb| filter.active_on.is_none_or(|date| plan_window_contains(cb, date)))
                    .collect(),
                ..sg
            })
            .collect())
    }
}

#[cfg(test)]
#[path = "maintenance_plan_service_tests.rs"]
mod tests;
