//! Driving ports for the configured switchgear inventory.
//!
//! HTTP handlers use these ports to append switchgear configurations, edit or
//! remove individual circuit breakers and export a breaker detail sheet.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::domain::overlay::is_truthy;
use crate::domain::{CircuitBreaker, ConfigSwitchgear, CustomerId, Error};

/// Switchgear configurations to append for one customer.
#[derive(Debug, Clone, PartialEq)]
pub struct AppendSwitchgearsRequest {
    pub customer_id: CustomerId,
    /// Display name stored on the customer document.
    pub name: String,
    pub configswitchgears: Vec<ConfigSwitchgear>,
}

/// Address of one configured circuit breaker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BreakerLocator {
    pub customer_id: CustomerId,
    pub switchgear_id: String,
    pub cb_id: i64,
}

/// Breaker listing entry; falsy attributes render as `null`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BreakerSummary {
    pub name: Option<String>,
    pub id: Option<i64>,
    pub serial_no: Option<Value>,
    pub brand: Option<Value>,
    pub model: Option<Value>,
    pub jo_no_mfg_date: Option<Value>,
    pub location: Option<Value>,
    pub configurations: Option<Value>,
}

impl From<&CircuitBreaker> for BreakerSummary {
    fn from(cb: &CircuitBreaker) -> Self {
        let truthy = |value: &Option<Value>| value.as_ref().filter(|v| is_truthy(v)).cloned();
        Self {
            name: cb.name.clone().filter(|name| !name.is_empty()),
            id: cb.id.filter(|id| *id != 0),
            serial_no: truthy(&cb.serial_no),
            brand: truthy(&cb.brand),
            model: truthy(&cb.model),
            jo_no_mfg_date: truthy(&cb.jo_no_mfg_date),
            location: truthy(&cb.location),
            configurations: truthy(&cb.configurations),
        }
    }
}

/// Outcome of listing the breakers of a switchgear.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfiguredBreakers {
    Found(Vec<BreakerSummary>),
    /// The customer exists but has no switchgear with that id.
    SwitchgearMissing,
}

/// Rendered breaker detail sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BreakerSheet {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SwitchgearInventoryCommand: Send + Sync {
    /// Merge switchgears by name and append their breakers.
    ///
    /// Fails with a conflict, writing nothing, when an incoming breaker name
    /// already exists under the same switchgear.
    async fn append_switchgears(
        &self,
        request: AppendSwitchgearsRequest,
    ) -> Result<Vec<ConfigSwitchgear>, Error>;

    /// Remove a breaker and return the updated switchgear list.
    async fn remove_breaker(&self, locator: BreakerLocator) -> Result<Vec<ConfigSwitchgear>, Error>;

    /// Shallow-overlay `patch` onto a breaker and return the updated list.
    async fn update_breaker(
        &self,
        locator: BreakerLocator,
        patch: Map<String, Value>,
    ) -> Result<Vec<ConfigSwitchgear>, Error>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SwitchgearInventoryQuery: Send + Sync {
    async fn configured_breakers(
        &self,
        customer_id: &CustomerId,
        switchgear_id: &str,
    ) -> Result<ConfiguredBreakers, Error>;

    async fn breaker_sheet(&self, locator: BreakerLocator) -> Result<BreakerSheet, Error>;
}

/// Fixture inventory with no stored customers.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureSwitchgearInventory;

#[async_trait]
impl SwitchgearInventoryCommand for FixtureSwitchgearInventory {
    async fn append_switchgears(
        &self,
        request: AppendSwitchgearsRequest,
    ) -> Result<Vec<ConfigSwitchgear>, Error> {
        Ok(request.configswitchgears)
    }

    async fn remove_breaker(&self, _locator: BreakerLocator) -> Result<Vec<ConfigSwitchgear>, Error> {
        Err(Error::not_found("Switchgear configuration not found."))
    }

    async fn update_breaker(
        &self,
        _locator: BreakerLocator,
        _patch: Map<String, Value>,
    ) -> Result<Vec<ConfigSwitchgear>, Error> {
        Err(Error::not_found("Switchgear configuration not found."))
    }
}

#[async_trait]
impl SwitchgearInventoryQuery for FixtureSwitchgearInventory {
    async fn configured_breakers(
        &self,
        _customer_id: &CustomerId,
        _switchgear_id: &str,
    ) -> Result<ConfiguredBreakers, Error> {
        Err(Error::not_found("No switchgear configurations found."))
    }

    async fn breaker_sheet(&self, _locator: BreakerLocator) -> Result<BreakerSheet, Error> {
        Err(Error::not_found("Switchgear not found."))
    }
}
