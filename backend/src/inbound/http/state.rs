//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use mockable::Clock;

use crate::domain::ports::{
    CalendarCommand, CalendarQuery, DocumentStore, FixtureCalendarLog, FixtureCustomerSnapshots,
    FixtureMaintenancePlan, FixturePlanReports, FixturePreventiveTasks,
    FixtureSwitchgearInventory, FixtureTokenVerifier, MaintenancePlanCommand,
    MaintenancePlanQuery, PdfRenderer, PlanReportQuery, PreventiveTaskCommand,
    PreventiveTaskQuery, SnapshotCommand, SnapshotQuery, SwitchgearInventoryCommand,
    SwitchgearInventoryQuery, TokenVerifier,
};
use crate::domain::{
    CalendarService, DocumentTreeStore, MaintenancePlanService, PlanReportService,
    PreventiveTaskService, SnapshotService, SwitchgearInventoryService,
};

/// Parameter object bundling all port implementations for HTTP handlers.
///
/// The default bundle wires every port to its fixture.
#[derive(Clone)]
pub struct HttpStatePorts {
    pub tokens: Arc<dyn TokenVerifier>,
    pub inventory: Arc<dyn SwitchgearInventoryCommand>,
    pub inventory_query: Arc<dyn SwitchgearInventoryQuery>,
    pub preventive_tasks: Arc<dyn PreventiveTaskCommand>,
    pub preventive_tasks_query: Arc<dyn PreventiveTaskQuery>,
    pub plans: Arc<dyn MaintenancePlanCommand>,
    pub plans_query: Arc<dyn MaintenancePlanQuery>,
    pub reports: Arc<dyn PlanReportQuery>,
    pub calendar: Arc<dyn CalendarCommand>,
    pub calendar_query: Arc<dyn CalendarQuery>,
    pub snapshots: Arc<dyn SnapshotCommand>,
    pub snapshots_query: Arc<dyn SnapshotQuery>,
}

impl Default for HttpStatePorts {
    fn default() -> Self {
        Self {
            tokens: Arc::new(FixtureTokenVerifier),
            inventory: Arc::new(FixtureSwitchgearInventory),
            inventory_query: Arc::new(FixtureSwitchgearInventory),
            preventive_tasks: Arc::new(FixturePreventiveTasks),
            preventive_tasks_query: Arc::new(FixturePreventiveTasks),
            plans: Arc::new(FixtureMaintenancePlan),
            plans_query: Arc::new(FixtureMaintenancePlan),
            reports: Arc::new(FixturePlanReports),
            calendar: Arc::new(FixtureCalendarLog),
            calendar_query: Arc::new(FixtureCalendarLog),
            snapshots: Arc::new(FixtureCustomerSnapshots),
            snapshots_query: Arc::new(FixtureCustomerSnapshots),
        }
    }
}

/// Collaborators shared by the document-backed services.
pub struct DocumentServices<S: ?Sized> {
    pub documents: DocumentTreeStore<S>,
    pub tokens: Arc<dyn TokenVerifier>,
    pub renderer: Arc<dyn PdfRenderer>,
    pub clock: Arc<dyn Clock>,
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub tokens: Arc<dyn TokenVerifier>,
    pub inventory: Arc<dyn SwitchgearInventoryCommand>,
    pub inventory_query: Arc<dyn SwitchgearInventoryQuery>,
    pub preventive_tasks: Arc<dyn PreventiveTaskCommand>,
    pub preventive_tasks_query: Arc<dyn PreventiveTaskQuery>,
    pub plans: Arc<dyn MaintenancePlanCommand>,
    pub plans_query: Arc<dyn MaintenancePlanQuery>,
    pub reports: Arc<dyn PlanReportQuery>,
    pub calendar: Arc<dyn CalendarCommand>,
    pub calendar_query: Arc<dyn CalendarQuery>,
    pub snapshots: Arc<dyn SnapshotCommand>,
    pub snapshots_query: Arc<dyn SnapshotQuery>,
}

impl From<HttpStatePorts> for HttpState {
    fn from(ports: HttpStatePorts) -> Self {
        Self::new(ports)
    }
}

impl HttpState {
    /// Construct state from a ports bundle.
    ///
    /// # Examples
    /// ```
    /// use switchgear_pm::inbound::http::state::{HttpState, HttpStatePorts};
    ///
    /// let state = HttpState::new(HttpStatePorts::default());
    /// let _tokens = state.tokens.clone();
    /// ```
    pub fn new(ports: HttpStatePorts) -> Self {
        let HttpStatePorts {
            tokens,
            inventory,
            inventory_query,
            preventive_tasks,
            preventive_tasks_query,
            plans,
            plans_query,
            reports,
            calendar,
            calendar_query,
            snapshots,
            snapshots_query,
        } = ports;
        Self {
            tokens,
            inventory,
            inventory_query,
            preventive_tasks,
            preventive_tasks_query,
            plans,
            plans_query,
            reports,
            calendar,
            calendar_query,
            snapshots,
            snapshots_query,
        }
    }

    /// Build every driving port over one document tree.
    ///
    /// Command and query ports of the same table share a service instance.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    ///
    /// use mockable::DefaultClock;
    /// use switchgear_pm::domain::ports::{
    ///     FixtureDocumentStore, FixturePdfRenderer, FixtureTokenVerifier,
    /// };
    /// use switchgear_pm::domain::{ConcurrencyPolicy, DocumentTreeStore, TableNames};
    /// use switchgear_pm::inbound::http::state::{DocumentServices, HttpState};
    ///
    /// let documents = DocumentTreeStore::new(
    ///     Arc::new(FixtureDocumentStore::new()),
    ///     TableNames::default(),
    ///     ConcurrencyPolicy::default(),
    /// );
    /// let state = HttpState::from_documents(DocumentServices {
    ///     documents,
    ///     tokens: Arc::new(FixtureTokenVerifier),
    ///     renderer: Arc::new(FixturePdfRenderer),
    ///     clock: Arc::new(DefaultClock),
    /// });
    /// let _plans = state.plans.clone();
    /// ```
    pub fn from_documents<S>(services: DocumentServices<S>) -> Self
    where
        S: DocumentStore + ?Sized + 'static,
    {
        let DocumentServices {
            documents,
            tokens,
            renderer,
            clock,
        } = services;

        let inventory = Arc::new(SwitchgearInventoryService::new(
            documents.clone(),
            renderer,
            Arc::clone(&clock),
        ));
        let preventive_tasks = Arc::new(PreventiveTaskService::new(
            documents.clone(),
            Arc::clone(&clock),
        ));
        let plans = Arc::new(MaintenancePlanService::new(
            documents.clone(),
            Arc::clone(&clock),
        ));
        let reports = Arc::new(PlanReportService::new(documents.clone()));
        let calendar = Arc::new(CalendarService::new(documents.clone()));
        let snapshots = Arc::new(SnapshotService::new(documents, clock));

        Self {
            tokens,
            inventory: inventory.clone(),
            inventory_query: inventory,
            preventive_tasks: preventive_tasks.clone(),
            preventive_tasks_query: preventive_tasks,
            plans: plans.clone(),
            plans_query: plans,
            reports,
            calendar: calendar.clone(),
            calendar_query: calendar,
            snapshots: snapshots.clone(),
            snapshots_query: snapshots,
        }
    }
}
