//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every maintenance endpoint, the health probes, the
//! error payload wrappers ([`ErrorSchema`], [`ErrorCodeSchema`]) and the
//! bearer token security scheme. Swagger UI serves it in debug builds and
//! `cargo run --bin openapi-dump` prints it for external tooling.

use crate::inbound::http::schemas::{ErrorCodeSchema, ErrorSchema, MessageResponseBody};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Enrich the generated document with the bearer token security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "BearerToken",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .description(Some(
                        "HS256 JWT carrying `customer_id` (or `cust_id`) in its claims.",
                    ))
                    .build(),
            ),
        );
    }
}

/// OpenAPI document for the maintenance REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Switchgear preventive maintenance API",
        description = "Switchgear inventory, preventive task catalogues, maintenance plans, \
                       execution calendars and plan reports."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("BearerToken" = [])),
    paths(
        crate::inbound::http::switchgear_config::append_switchgear_configs,
        crate::inbound::http::switchgear_config::list_configured_breakers,
        crate::inbound::http::switchgear_config::remove_breaker,
        crate::inbound::http::switchgear_config::update_breaker,
        crate::inbound::http::switchgear_config::breaker_sheet,
        crate::inbound::http::preventive_tasks::store_task_set,
        crate::inbound::http::preventive_tasks::get_task_set,
        crate::inbound::http::preventive_tasks::update_custom_task,
        crate::inbound::http::preventive_tasks::delete_custom_task,
        crate::inbound::http::preventive_tasks::subtasks_for_schedule,
        crate::inbound::http::mapping::insert_mapping,
        crate::inbound::http::mapping::mapping_overview,
        crate::inbound::http::mapping::mapped_switchgear,
        crate::inbound::http::mapping::update_plan,
        crate::inbound::http::mapping::remove_planned_breaker,
        crate::inbound::http::mapping::plan_schedules,
        crate::inbound::http::plan_reports::plan_summaries,
        crate::inbound::http::plan_reports::calendar_tasks,
        crate::inbound::http::plan_reports::task_details,
        crate::inbound::http::plan_reports::plans_by_customer,
        crate::inbound::http::calendar::store_calendar,
        crate::inbound::http::calendar::calendar_for_date,
        crate::inbound::http::calendar::calendar_for_switchgear,
        crate::inbound::http::calendar::calendar_for_task,
        crate::inbound::http::snapshots::fetch_all_data,
        crate::inbound::http::snapshots::save_all_data,
        crate::inbound::http::snapshots::customer_details,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(ErrorSchema, ErrorCodeSchema, MessageResponseBody)),
    tags(
        (name = "switchgear-config", description = "Switchgear and circuit breaker inventory"),
        (name = "preventive-tasks", description = "Preventive task catalogue per customer"),
        (name = "mapping", description = "Maintenance plans mapped onto circuit breakers"),
        (name = "plan-reports", description = "Plan summaries and task reports"),
        (name = "calendar", description = "Execution records per day"),
        (name = "snapshots", description = "Cross-table joins and saved snapshots"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
