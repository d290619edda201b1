//! Configured switchgear inventory service.
//!
//! Implements the inventory driving ports over the configuration document
//! of each customer.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::SecondsFormat;
use mockable::Clock;
use serde_json::{Map, Value, json};
use tracing::info;

use crate::domain::document_tree::{DocumentTreeStore, Loaded};
use crate::domain::merge::{ConflictPolicy, MergeError, merge_level, no_children, remove_by_key};
use crate::domain::overlay::apply_patch;
use crate::domain::ports::{
    AppendSwitchgearsRequest, BreakerLocator, BreakerSheet, BreakerSummary, CbDetailRecord,
    ConfiguredBreakers, DocumentStore, PdfRenderer, SwitchgearInventoryCommand,
    SwitchgearInventoryQuery,
};
use crate::domain::switchgear::{find_switchgear, find_switchgear_mut};
use crate::domain::{
    CircuitBreaker, ConfigSwitchgear, ConfigurationDocument, CustomerId, Error,
};

const CONFIGURATION_MISSING: &str = "Switchgear configuration not found.";
const SWITCHGEAR_MISSING: &str = "Switchgear not found for the given ID.";
const BREAKER_MISSING: &str = "Circuit breaker not found for the given ID.";

fn duplicate_breaker(error: MergeError) -> Error {
    match &error {
        MergeError::DuplicateKey {
            key,
            collection,
            parent: Some(parent),
        } => Error::conflict(format!(
            "Circuit breaker with name '{key}' already exists in the switchgear '{parent}'."
        ))
        .with_details(json!({
            "code": "duplicate_key",
            "key": key,
            "collection": collection,
            "parent": parent,
        })),
        _ => error.into(),
    }
}

/// Merge incoming switchgears by `name`, appending their breakers.
///
/// A breaker whose name already exists under the same switchgear rejects the
/// whole merge.
pub(crate) fn append_configured(
    existing: Vec<ConfigSwitchgear>,
    incoming: Vec<ConfigSwitchgear>,
) -> Result<Vec<ConfigSwitchgear>, Error> {
    merge_level(
        existing,
        incoming,
        "configswitchgears",
        |sg: &ConfigSwitchgear| sg.name.clone(),
        ConflictPolicy::MergeChildren,
        |current, incoming| {
            let parent = current.name.clone().unwrap_or_default();
            current.configured_cbs = merge_level(
                std::mem::take(&mut current.configured_cbs),
                std::mem::take(&mut incoming.configured_cbs),
                "configuredCBs",
                |cb: &CircuitBreaker| cb.name.clone(),
                ConflictPolicy::Reject,
                no_children,
            )
            .map_err(|err| err.within(parent))?;
            Ok(())
        },
    )
    .map_err(duplicate_breaker)
}

/// Inventory service implementing the switchgear inventory driving ports.
pub struct SwitchgearInventoryService<S: ?Sized> {
    documents: DocumentTreeStore<S>,
    renderer: Arc<dyn PdfRenderer>,
    clock: Arc<dyn Clock>,
}

impl<S> SwitchgearInventoryService<S>
where
    S: DocumentStore + ?Sized,
{
    pub fn new(
        documents: DocumentTreeStore<S>,
        renderer: Arc<dyn PdfRenderer>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            documents,
            renderer,
            clock,
        }
    }

    async fn load_existing(
        &self,
        customer_id: &CustomerId,
    ) -> Result<Loaded<ConfigurationDocument>, Error> {
        self.documents
            .load::<ConfigurationDocument>(customer_id)
            .await?
            .ok_or_else(|| Error::not_found(CONFIGURATION_MISSING))
    }

    /// Apply `edit` to the breakers of one switchgear and save the document.
    async fn edit_breakers<F>(
        &self,
        locator: &BreakerLocator,
        edit: F,
    ) -> Result<Vec<ConfigSwitchgear>, Error>
    where
        F: FnOnce(Vec<CircuitBreaker>) -> Result<Vec<CircuitBreaker>, Error> + Send,
    {
        let Loaded {
            mut document,
            revision,
        } = self.load_existing(&locator.customer_id).await?;
        let switchgear =
            find_switchgear_mut(&mut document.configswitchgears, &locator.switchgear_id)
                .ok_or_else(|| Error::not_found(SWITCHGEAR_MISSING))?;
        switchgear.configured_cbs = edit(std::mem::take(&mut switchgear.configured_cbs))?;
        self.documents.save(&document, Some(revision)).await?;
        Ok(document.configswitchgears)
    }
}

#[async_trait]
impl<S> SwitchgearInventoryCommand for SwitchgearInventoryService<S>
where
    S: DocumentStore + ?Sized,
{
    async fn append_switchgears(
        &self,
        request: AppendSwitchgearsRequest,
    ) -> Result<Vec<ConfigSwitchgear>, Error> {
        let loaded = self
            .documents
            .load::<ConfigurationDocument>(&request.customer_id)
            .await?;
        let (existing, extra, revision) = match loaded {
            Some(Loaded { document, revision }) => {
                (document.configswitchgears, document.extra, Some(revision))
            }
            None => (Vec::new(), Map::new(), None),
        };
        let appended = request.configswitchgears.len();
        let configswitchgears = append_configured(existing, request.configswitchgears)?;
        let document = ConfigurationDocument {
            customer_id: request.customer_id,
            name: Some(request.name),
            configswitchgears,
            timestamp: Some(self.clock.utc().to_rfc3339_opts(SecondsFormat::Millis, true)),
            extra,
        };
        self.documents.save(&document, revision).await?;
        info!(
            customer_id = %document.customer_id,
            appended,
            "switchgear configurations appended"
        );
        Ok(document.configswitchgears)
    }

    async fn remove_breaker(&self, locator: BreakerLocator) -> Result<Vec<ConfigSwitchgear>, Error> {
        let cb_id = locator.cb_id;
        let updated = self
            .edit_breakers(&locator, |cbs| {
                remove_by_key(cbs, &cb_id, "configuredCBs", |cb: &CircuitBreaker| {
                    cb.id.as_ref()
                })
                .map_err(|_| Error::not_found(BREAKER_MISSING))
            })
            .await?;
        info!(
            customer_id = %locator.customer_id,
            switchgear_id = %locator.switchgear_id,
            cb_id,
            "circuit breaker removed"
        );
        Ok(updated)
    }

    async fn update_breaker(
        &self,
        locator: BreakerLocator,
        patch: Map<String, Value>,
    ) -> Result<Vec<ConfigSwitchgear>, Error> {
        let cb_id = locator.cb_id;
        let updated = self
            .edit_breakers(&locator, move |mut cbs| {
                let target = cbs
                    .iter_mut()
                    .find(|cb| cb.id == Some(cb_id))
                    .ok_or_else(|| Error::not_found(BREAKER_MISSING))?;
                *target = apply_patch(&*target, patch, "circuit breaker")?;
                Ok(cbs)
            })
            .await?;
        info!(
            customer_id = %locator.customer_id,
            switchgear_id = %locator.switchgear_id,
            cb_id,
            "circuit breaker updated"
        );
        Ok(updated)
    }
}

#[async_trait]
impl<S> SwitchgearInventoryQuery for SwitchgearInventoryService<S>
where
    S: DocumentStore + ?Sized,
{
    async fn configured_breakers(
        &self,
        customer_id: &CustomerId,
        switchgear_id: &str,
    ) -> Result<ConfiguredBreakers, Error> {
        let Some(Loaded { document, .. }) = self
            .documents
            .load::<ConfigurationDocument>(customer_id)
            .await?
        else {
            return Err(Error::not_found("No switchgear configurations found."));
        };
        Ok(
            match find_switchgear(&document.configswitchgears, switchgear_id) {
                Some(sg) => ConfiguredBreakers::Found(
                    sg.configured_cbs.iter().map(BreakerSummary::from).collect(),
                ),
                None => ConfiguredBreakers::SwitchgearMissing,
            },
        )
    }

    async fn breaker_sheet(&self, locator: BreakerLocator) -> Result<BreakerSheet, Error> {
        let Loaded { document, .. } = self.load_existing(&locator.customer_id).await?;
        let switchgear = find_switchgear(&document.configswitchgears, &locator.switchgear_id)
            .ok_or_else(|| Error::not_found(SWITCHGEAR_MISSING))?;
        let breaker = switchgear
            .configured_cbs
            .iter()
            .find(|cb| cb.id == Some(locator.cb_id))
            .ok_or_else(|| Error::not_found(BREAKER_MISSING))?;
        let record = CbDetailRecord::new(locator.switchgear_id.as_str(), locator.cb_id, breaker)?;
        let bytes = self.renderer.render(&record).await?;
        Ok(BreakerSheet {
            file_name: record.file_name(),
            bytes,
        })
    }
}

#[cfg(test)]
#[path = "switchgear_inventory_service_tests.rs"]
mod tests;
