//! Cross-table joins and the customer snapshots persisted from them.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::info;

use crate::domain::document_tree::DocumentTreeStore;
use crate::domain::ports::{
    CustomerDetails, DocumentStore, JoinRequest, JoinedView, SnapshotCommand, SnapshotQuery,
    SnapshotRequest,
};
use crate::domain::snapshot::{
    SwitchgearJoin, join_breaker, join_switchgear, select_from_snapshot, snapshot_entry,
    upsert_snapshot,
};
use crate::domain::{
    CalendarDocument, ConfigurationDocument, CustomerId, CustomerSnapshotDocument, Error,
    MappingDocument,
};

/// Service implementing the snapshot driving ports.
pub struct SnapshotService<S: ?Sized> {
    documents: DocumentTreeStore<S>,
    clock: Arc<dyn Clock>,
}

impl<S> SnapshotService<S>
where
    S: DocumentStore + ?Sized,
{
    pub fn new(documents: DocumentTreeStore<S>, clock: Arc<dyn Clock>) -> Self {
        Self { documents, clock }
    }

    async fn join(&self, customer_id: &CustomerId, switchgear_id: &str) -> Result<SwitchgearJoin, Error> {
        let calendars = self
            .documents
            .load_all::<CalendarDocument>(customer_id)
            .await?;
        let configs = self
            .documents
            .load_all::<ConfigurationDocument>(customer_id)
            .await?;
        let mappings = self.documents.load_all::<MappingDocument>(customer_id).await?;
        Ok(join_switchgear(&calendars, &configs, &mappings, switchgear_id))
    }
}

#[async_trait]
impl<S> SnapshotCommand for SnapshotService<S>
where
    S: DocumentStore + ?Sized,
{
    async fn save_snapshot(
        &self,
        customer_id: &CustomerId,
        switchgear_id: &str,
        configure_ts: Option<String>,
    ) -> Result<CustomerSnapshotDocument, Error> {
        let configure_ts = configure_ts
            .unwrap_or_else(|| self.clock.utc().date_naive().format("%Y-%m-%d").to_string());
        let join = self.join(customer_id, switchgear_id).await?;
        let existing = self.documents.load::<CustomerSnapshotDocument>(customer_id).await?;
        let (existing, revision) = match existing {
            Some(loaded) => (Some(loaded.document), Some(loaded.revision)),
            None => (None, None),
        };
        let document = upsert_snapshot(
            existing,
            customer_id,
            snapshot_entry(switchgear_id, &configure_ts, join),
        );
        self.documents.save(&document, revision).await?;
        info!(
            customer_id = %customer_id,
            switchgear_id,
            configure_ts = %configure_ts,
            "customer snapshot saved"
        );
        Ok(document)
    }
}

#[async_trait]
impl<S> SnapshotQuery for SnapshotService<S>
where
    S: DocumentStore + ?Sized,
{
    async fn joined_view(&self, request: JoinRequest) -> Result<JoinedView, Error> {
        let join = self
            .join(&request.customer_id, &request.switchgear_id)
            .await?;
        Ok(match request.cbid.as_deref() {
            Some(cbid) => JoinedView::Breaker(join_breaker(
                &join,
                &request.switchgear_id,
                cbid,
                request.configure_ts.as_deref(),
            )),
            None => JoinedView::Switchgear(join),
        })
    }

    async fn customer_details(&self, request: SnapshotRequest) -> Result<CustomerDetails, Error> {
        let snapshots = self
            .documents
            .load_all::<CustomerSnapshotDocument>(&request.customer_id)
            .await?;
        if snapshots.is_empty() {
            return Ok(CustomerDetails::CustomerMissing);
        }
        let Some(entry) = snapshots
            .iter()
            .flat_map(|doc| doc.switchgears.iter())
            .find(|entry| entry.switchgear_id == request.switchgear_id)
        else {
            return Ok(CustomerDetails::SwitchgearMissing);
        };
        if request.cbid.is_none() && request.task_id.is_none() {
            return Ok(CustomerDetails::Entry(entry.clone()));
        }
        Ok(CustomerDetails::Selection(select_from_snapshot(
            entry,
            request.cbid.as_deref(),
            request.task_id.as_deref(),
        )))
    }
}

#[cfg(test)]
#[path = "snapshot_service_tests.rs"]
mod tests;
