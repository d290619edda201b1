//! Domain primitives, engines and services.
//!
//! Purpose: Define the maintenance documents and the pure engines that merge
//! and aggregate them. Services bind the engines to the driven
//! [`ports::DocumentStore`] and implement the driving ports consumed by the
//! HTTP adapter.
//!
//! Public surface:
//! - Error (alias to `error::Error`): API error response payload.
//! - ErrorCode (alias to `error::ErrorCode`): stable error identifier.
//! - CustomerId: validated partition key of every document.
//! - The per-table documents and the switchgear shapes they nest.
//! - One service per driving port.

pub mod aggregation;
pub mod calendar_service;
pub mod customer;
pub mod document_tree;
pub mod documents;
pub mod error;
pub mod maintenance_plan_service;
pub mod merge;
pub mod overlay;
pub mod plan_report_service;
pub mod ports;
pub mod preventive_task_service;
pub mod schedule;
pub mod snapshot;
pub mod snapshot_service;
pub mod switchgear;
pub mod switchgear_inventory_service;
pub mod trace_id;
pub mod traversal;

#[cfg(test)]
pub(crate) mod service_test_support;

pub use self::calendar_service::CalendarService;
pub use self::customer::{CustomerId, CustomerIdValidationError};
pub use self::document_tree::{ConcurrencyPolicy, DocumentTreeError, DocumentTreeStore, TableNames};
pub use self::documents::{
    CalendarConfiguration, CalendarDocument, ConfigurationDocument, CustomerSnapshotDocument,
    MappingDocument, PreventiveTask, PreventiveTaskSet, SnapshotEntry, TableKind,
};
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::maintenance_plan_service::MaintenancePlanService;
pub use self::plan_report_service::PlanReportService;
pub use self::preventive_task_service::PreventiveTaskService;
pub use self::schedule::DateTriple;
pub use self::snapshot_service::SnapshotService;
pub use self::switchgear::{
    CalendarSwitchgear, CircuitBreaker, ConfigSwitchgear, MappedSwitchgear, PlannedCb, SubTask,
    Task,
};
pub use self::switchgear_inventory_service::SwitchgearInventoryService;
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use switchgear_pm::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::not_found("Customer not found"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
