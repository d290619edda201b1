//! Calendar execution log service.

use async_trait::async_trait;
use tracing::info;

use crate::domain::document_tree::{DocumentTreeStore, Loaded};
use crate::domain::maintenance_plan_service::merge_planned_breakers;
use crate::domain::merge::{ConflictPolicy, MergeError, merge_level};
use crate::domain::ports::{CalendarCommand, CalendarFilter, CalendarQuery, DocumentStore};
use crate::domain::{
    CalendarConfiguration, CalendarDocument, CalendarSwitchgear, CustomerId, Error,
};

/// Merge calendar configurations by `configure_Ts`, their switchgears by
/// `switchgearID`, then the execution records of each breaker.
pub(crate) fn merge_calendar_configurations(
    existing: Vec<CalendarConfiguration>,
    incoming: Vec<CalendarConfiguration>,
) -> Result<Vec<CalendarConfiguration>, MergeError> {
    merge_level(
        existing,
        incoming,
        "configurations",
        |config: &CalendarConfiguration| config.configure_ts.clone(),
        ConflictPolicy::MergeChildren,
        |current, incoming| {
            let configure_ts = current.configure_ts.clone().unwrap_or_default();
            current.switchgears = merge_level(
                std::mem::take(&mut current.switchgears),
                std::mem::take(&mut incoming.switchgears),
                "switchgears",
                |sg: &CalendarSwitchgear| sg.switchgear_id.clone(),
                ConflictPolicy::MergeChildren,
                |current, incoming| {
                    let switchgear_id = current.switchgear_id.clone().unwrap_or_default();
                    current.cbs = merge_planned_breakers(
                        std::mem::take(&mut current.cbs),
                        std::mem::take(&mut incoming.cbs),
                    )
                    .map_err(|err| err.within(switchgear_id))?;
                    Ok(())
                },
            )
            .map_err(|err| err.within(configure_ts))?;
            Ok(())
        },
    )
}

/// Narrow `configurations` to one switchgear and/or one planned breaker.
///
/// Containers left empty by a filter are dropped.
fn narrow(
    configurations: Vec<CalendarConfiguration>,
    switchgear_id: Option<&str>,
    task_id: Option<&str>,
) -> Vec<CalendarConfiguration> {
    configurations
        .into_iter()
        .filter_map(|mut config| {
            if let Some(switchgear_id) = switchgear_id {
                config
                    .switchgears
                    .retain(|sg| sg.switchgear_id.as_deref() == Some(switchgear_id));
            }
            if let Some(task_id) = task_id {
                for sg in &mut config.switchgears {
                    sg.cbs.retain(|cb| cb.task_id.as_deref() == Some(task_id));
                }
                config.switchgears.retain(|sg| !sg.cbs.is_empty());
            }
            let filtered = switchgear_id.is_some() || task_id.is_some();
            (!filtered || !config.switchgears.is_empty()).then_some(config)
        })
        .collect()
}

/// Service implementing the calendar driving ports.
pub struct CalendarService<S: ?Sized> {
    documents: DocumentTreeStore<S>,
}

impl<S> CalendarService<S>
where
    S: DocumentStore + ?Sized,
{
    pub fn new(documents: DocumentTreeStore<S>) -> Self {
        Self { documents }
    }
}

#[async_trait]
impl<S> CalendarCommand for CalendarService<S>
where
    S: DocumentStore + ?Sized,
{
    async fn store_calendar(
        &self,
        customer_id: &CustomerId,
        configurations: Vec<CalendarConfiguration>,
    ) -> Result<CalendarDocument, Error> {
        let (existing, revision) = match self.documents.load::<CalendarDocument>(customer_id).await? {
            Some(Loaded { document, revision }) => (document, Some(revision)),
            None => (CalendarDocument::empty(customer_id.clone()), None),
        };
        let incoming = configurations.len();
        let document = CalendarDocument {
            configurations: merge_calendar_configurations(existing.configurations, configurations)?,
            ..existing
        };
        self.documents.save(&document, revision).await?;
        info!(customer_id = %customer_id, incoming, "calendar records stored");
        Ok(document)
    }
}

#[async_trait]
impl<S> CalendarQuery for CalendarService<S>
where
    S: DocumentStore + ?Sized,
{
    async fn calendar_snapshot(
        &self,
        filter: CalendarFilter,
    ) -> Result<Vec<CalendarConfiguration>, Error> {
        let Some(Loaded { document, .. }) = self
            .documents
            .load::<CalendarDocument>(&filter.customer_id)
            .await?
        else {
            return Err(Error::not_found("Customer not found."));
        };
        let dated: Vec<_> = document
            .configurations
            .into_iter()
            .filter(|config| config.configure_ts.as_deref() == Some(filter.configure_ts.as_str()))
            .collect();
        if dated.is_empty() {
            return Err(Error::not_found(format!(
                "No configurations found for the given date: {}.",
                filter.configure_ts
            )));
        }
        let narrowed = narrow(
            dated,
            filter.switchgear_id.as_deref(),
            filter.task_id.as_deref(),
        );
        if narrowed.is_empty() {
            return Err(Error::not_found("No data found"));
        }
        Ok(narrowed)
    }
}

#[cfg(test)]
#[path = "calendar_service_tests.rs"]
mod tests;
