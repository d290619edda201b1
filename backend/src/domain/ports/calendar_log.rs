//! Driving ports for the calendar execution log.

use async_trait::async_trait;

use crate::domain::{CalendarConfiguration, CalendarDocument, CustomerId, Error};

/// Narrowing applied to a calendar snapshot read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarFilter {
    pub customer_id: CustomerId,
    pub configure_ts: String,
    pub switchgear_id: Option<String>,
    pub task_id: Option<String>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CalendarCommand: Send + Sync {
    /// Merge execution records along configure_Ts → switchgearID → taskId →
    /// mainTask → subtask name.
    async fn store_calendar(
        &self,
        customer_id: &CustomerId,
        configurations: Vec<CalendarConfiguration>,
    ) -> Result<CalendarDocument, Error>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CalendarQuery: Send + Sync {
    async fn calendar_snapshot(
        &self,
        filter: CalendarFilter,
    ) -> Result<Vec<CalendarConfiguration>, Error>;
}

/// Fixture log with no stored customers.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureCalendarLog;

#[async_trait]
impl CalendarCommand for FixtureCalendarLog {
    async fn store_calendar(
        &self,
        customer_id: &CustomerId,
        configurations: Vec<CalendarConfiguration>,
    ) -> Result<CalendarDocument, Error> {
        Ok(CalendarDocument {
            configurations,
            ..CalendarDocument::empty(customer_id.clone())
        })
    }
}

#[async_trait]
impl CalendarQuery for FixtureCalendarLog {
    async fn calendar_snapshot(
        &self,
        _filter: CalendarFilter,
    ) -> Result<Vec<CalendarConfiguration>, Error> {
        Err(Error::not_found("Customer not found."))
    }
}
