//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driving ports (`*Command`, `*Query`) are what inbound adapters call.
//! Driven ports ([`DocumentStore`], [`TokenVerifier`], [`PdfRenderer`]) are
//! implemented by outbound adapters. Every port ships a `Fixture*`
//! implementation used when no backing service is configured.

mod macros;
pub(crate) use macros::define_port_error;

mod calendar_log;
mod customer_snapshot;
mod document_store;
mod maintenance_plan;
mod pdf_renderer;
mod plan_reports;
mod preventive_tasks;
mod switchgear_inventory;
mod token_verifier;

#[cfg(test)]
pub use calendar_log::{MockCalendarCommand, MockCalendarQuery};
pub use calendar_log::{CalendarCommand, CalendarFilter, CalendarQuery, FixtureCalendarLog};
#[cfg(test)]
pub use customer_snapshot::{MockSnapshotCommand, MockSnapshotQuery};
pub use customer_snapshot::{
    CustomerDetails, FixtureCustomerSnapshots, JoinRequest, JoinedView, SnapshotCommand,
    SnapshotQuery, SnapshotRequest,
};
#[cfg(test)]
pub use document_store::MockDocumentStore;
pub use document_store::{
    DocumentStore, DocumentStoreError, FixtureDocumentStore, StoredItem, TableStatus,
    WriteCondition,
};
#[cfg(test)]
pub use maintenance_plan::{MockMaintenancePlanCommand, MockMaintenancePlanQuery};
pub use maintenance_plan::{
    BreakerName, FixtureMaintenancePlan, MaintenancePlanCommand, MaintenancePlanQuery,
    MappedSwitchgearView, MappingOverview, MappingOverviewRequest, MissingSchedules, PlanLocator,
    PlanScheduleFilter, PlanUpdate, PlanView, ScheduleOverview, SwitchgearPlanView, SwitchgearRef,
};
#[cfg(test)]
pub use pdf_renderer::MockPdfRenderer;
pub use pdf_renderer::{
    CbDetailRecord, DETAIL_SHEET_TITLE, FixturePdfRenderer, PdfRenderError, PdfRenderer,
};
#[cfg(test)]
pub use plan_reports::MockPlanReportQuery;
pub use plan_reports::{
    FixturePlanReports, PlanReportQuery, PlanSummaries, PlannedTaskLocator, TaskDetails,
};
#[cfg(test)]
pub use preventive_tasks::{MockPreventiveTaskCommand, MockPreventiveTaskQuery};
pub use preventive_tasks::{
    FixturePreventiveTasks, PreventiveTaskCommand, PreventiveTaskQuery, ScheduledSubtask,
    ScheduledTaskGroup, StoreTaskSetRequest,
};
#[cfg(test)]
pub use switchgear_inventory::{
    MockSwitchgearInventoryCommand, MockSwitchgearInventoryQuery,
};
pub use switchgear_inventory::{
    AppendSwitchgearsRequest, BreakerLocator, BreakerSheet, BreakerSummary, ConfiguredBreakers,
    FixtureSwitchgearInventory, SwitchgearInventoryCommand, SwitchgearInventoryQuery,
};
#[cfg(test)]
pub use token_verifier::MockTokenVerifier;
pub use token_verifier::{
    AuthError, CustomerClaims, FixtureTokenVerifier, TokenVerifier, bearer_token,
};
