//! Driving ports for cross-table customer snapshots.

use async_trait::async_trait;
use serde::Serialize;

use crate::domain::snapshot::{BreakerJoin, SnapshotSelection, SwitchgearJoin};
use crate::domain::{CustomerId, CustomerSnapshotDocument, Error, SnapshotEntry};

/// Parameters of a live cross-table join.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinRequest {
    pub customer_id: CustomerId,
    pub switchgear_id: String,
    pub cbid: Option<String>,
    pub configure_ts: Option<String>,
}

/// Live join of one switchgear, optionally narrowed to one breaker.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum JoinedView {
    Switchgear(SwitchgearJoin),
    Breaker(BreakerJoin),
}

/// Parameters of a stored snapshot read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotRequest {
    pub customer_id: CustomerId,
    pub switchgear_id: String,
    pub cbid: Option<String>,
    pub task_id: Option<String>,
}

/// Outcome of a stored snapshot read.
#[derive(Debug, Clone, PartialEq)]
pub enum CustomerDetails {
    CustomerMissing,
    SwitchgearMissing,
    Entry(SnapshotEntry),
    Selection(SnapshotSelection),
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SnapshotCommand: Send + Sync {
    /// Join the live tables for `switchgear_id` and store the result under
    /// `configure_ts`, defaulting to today.
    async fn save_snapshot(
        &self,
        customer_id: &CustomerId,
        switchgear_id: &str,
        configure_ts: Option<String>,
    ) -> Result<CustomerSnapshotDocument, Error>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SnapshotQuery: Send + Sync {
    async fn joined_view(&self, request: JoinRequest) -> Result<JoinedView, Error>;

    async fn customer_details(&self, request: SnapshotRequest) -> Result<CustomerDetails, Error>;
}

/// Fixture snapshots over empty tables.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureCustomerSnapshots;

#[async_trait]
impl SnapshotCommand for FixtureCustomerSnapshots {
    async fn save_snapshot(
        &self,
        customer_id: &CustomerId,
        switchgear_id: &str,
        configure_ts: Option<String>,
    ) -> Result<CustomerSnapshotDocument, Error> {
        let entry = crate::domain::snapshot::snapshot_entry(
            switchgear_id,
            configure_ts.as_deref().unwrap_or_default(),
            SwitchgearJoin::default(),
        );
        Ok(crate::domain::snapshot::upsert_snapshot(
            None,
            customer_id,
            entry,
        ))
    }
}

#[async_trait]
impl SnapshotQuery for FixtureCustomerSnapshots {
    async fn joined_view(&self, _request: JoinRequest) -> Result<JoinedView, Error> {
        Ok(JoinedView::Switchgear(SwitchgearJoin::default()))
    }

    async fn customer_details(&self, _request: SnapshotRequest) -> Result<CustomerDetails, Error> {
        Ok(CustomerDetails::CustomerMissing)
    }
}
