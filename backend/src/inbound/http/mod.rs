//! HTTP inbound adapter exposing the maintenance REST endpoints.
//!
//! Paths keep the casing existing clients call (`/Calandertasks`,
//! `/api/planshadules`). Every route registered by [`configure`] requires a
//! bearer token; the health probes are mounted separately by the server.

use actix_web::web;

use crate::domain::Error;

pub mod auth;
pub mod calendar;
pub mod error;
pub mod health;
pub mod mapping;
pub mod plan_reports;
pub mod preventive_tasks;
pub mod schemas;
pub mod snapshots;
pub mod state;
pub mod switchgear_config;
#[cfg(test)]
pub mod test_utils;
pub mod validation;

pub use error::ApiResult;

/// Register the maintenance endpoints and the extractor error handlers.
///
/// # Examples
/// ```
/// use actix_web::{App, web};
/// use switchgear_pm::inbound::http::configure;
/// use switchgear_pm::inbound::http::state::{HttpState, HttpStatePorts};
///
/// let _app = App::new()
///     .app_data(web::Data::new(HttpState::new(HttpStatePorts::default())))
///     .configure(configure);
/// ```
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(|err, _req| {
        Error::invalid_request(format!("invalid JSON body: {err}")).into()
    }))
    .app_data(web::QueryConfig::default().error_handler(|err, _req| {
        Error::invalid_request(format!("invalid query string: {err}")).into()
    }))
    .app_data(web::PathConfig::default().error_handler(|err, _req| {
        Error::invalid_request(format!("invalid path: {err}")).into()
    }))
    .service(switchgear_config::append_switchgear_configs)
    .service(switchgear_config::list_configured_breakers)
    .service(switchgear_config::remove_breaker)
    .service(switchgear_config::update_breaker)
    .service(switchgear_config::breaker_sheet)
    .service(preventive_tasks::store_task_set)
    .service(preventive_tasks::get_task_set)
    .service(preventive_tasks::update_custom_task)
    .service(preventive_tasks::delete_custom_task)
    .service(preventive_tasks::subtasks_for_schedule)
    .service(mapping::insert_mapping)
    .service(mapping::mapping_overview)
    .service(mapping::mapped_switchgear)
    .service(mapping::update_plan)
    .service(mapping::remove_planned_breaker)
    .service(mapping::plan_schedules)
    .service(plan_reports::plan_summaries)
    .service(plan_reports::calendar_tasks)
    .service(plan_reports::task_details)
    .service(plan_reports::plans_by_customer)
    .service(calendar::store_calendar)
    .service(calendar::calendar_for_date)
    .service(calendar::calendar_for_switchgear)
    .service(calendar::calendar_for_task)
    .service(snapshots::fetch_all_data)
    .service(snapshots::save_all_data)
    .service(snapshots::customer_details);
}
