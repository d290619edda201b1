//! Per-customer documents, one per store table.
//!
//! Every document is keyed by `customer_id` and owns one root collection.
//! A missing root collection loads as empty; a root collection of the wrong
//! JSON type fails to load and surfaces as malformed data.

use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};

use super::CustomerId;
use super::switchgear::{
    CalendarSwitchgear, ConfigSwitchgear, MappedSwitchgear, PlannedCb, SubTask,
};
use super::traversal::{Keyed, Nested};

/// Logical store tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TableKind {
    Configuration,
    PreventiveTasks,
    Mapping,
    Calendar,
    CustomerSnapshot,
}

impl TableKind {
    pub const ALL: [TableKind; 5] = [
        Self::Configuration,
        Self::PreventiveTasks,
        Self::Mapping,
        Self::Calendar,
        Self::CustomerSnapshot,
    ];

    /// Table name used when configuration does not override it.
    pub fn default_table_name(self) -> &'static str {
        match self {
            Self::Configuration => "switchgearConfig_Store",
            Self::PreventiveTasks => "Preventive_mentainance_Storage",
            Self::Mapping => "Preventive_mappping_Storage",
            Self::Calendar => "calander_Tasks_Update",
            Self::CustomerSnapshot => "customer_data_table",
        }
    }

    /// Attribute holding the document's root collection.
    pub fn root_attribute(self) -> &'static str {
        match self {
            Self::Configuration => "configswitchgears",
            Self::PreventiveTasks => "tasks",
            Self::Mapping | Self::CustomerSnapshot => "switchgears",
            Self::Calendar => "configurations",
        }
    }
}

/// Partition key attribute shared by every table.
pub const PARTITION_KEY: &str = "customer_id";

/// A document stored whole under one customer's partition key.
pub trait StoredDocument: Serialize + DeserializeOwned + Send + Sync {
    const KIND: TableKind;

    fn customer_id(&self) -> &CustomerId;
}

/// Switchgear inventory of one customer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigurationDocument {
    pub customer_id: CustomerId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub configswitchgears: Vec<ConfigSwitchgear>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Maintenance plan of one customer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MappingDocument {
    pub customer_id: CustomerId,
    #[serde(default)]
    pub switchgears: Vec<MappedSwitchgear>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Execution log of one customer, one configuration per snapshot date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarDocument {
    pub customer_id: CustomerId,
    #[serde(default)]
    pub configurations: Vec<CalendarConfiguration>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CalendarDocument {
    /// Every calendar switchgear across all configurations, in order.
    pub fn switchgears(&self) -> impl Iterator<Item = &CalendarSwitchgear> {
        self.configurations.iter().flat_map(|config| config.switchgears.iter())
    }
}

/// Calendar tree for one `configure_Ts` date tag.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CalendarConfiguration {
    #[serde(rename = "configure_Ts", default, skip_serializing_if = "Option::is_none")]
    pub configure_ts: Option<String>,
    #[serde(default)]
    pub switchgears: Vec<CalendarSwitchgear>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Preventive task catalogue of one customer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreventiveTaskSet {
    pub customer_id: CustomerId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_name: Option<String>,
    #[serde(default)]
    pub tasks: Vec<PreventiveTask>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Catalogue task; only custom tasks may be edited or removed.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PreventiveTask {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    #[serde(rename = "mainTask", default, skip_serializing_if = "Option::is_none")]
    pub main_task: Option<String>,
    #[serde(rename = "isCustom", default, skip_serializing_if = "Option::is_none")]
    pub is_custom: Option<Value>,
    #[serde(rename = "subTasks", default)]
    pub sub_tasks: Vec<SubTask>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PreventiveTask {
    pub fn is_custom(&self) -> bool {
        self.is_custom
            .as_ref()
            .is_some_and(super::overlay::is_truthy)
    }
}

/// Joined snapshots of one customer, one entry per switchgear.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerSnapshotDocument {
    pub customer_id: CustomerId,
    #[serde(default)]
    pub switchgears: Vec<SnapshotEntry>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Joined state of the other tables for one switchgear.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotEntry {
    #[serde(rename = "switchgearID")]
    pub switchgear_id: String,
    #[serde(rename = "configure_Ts")]
    pub configure_ts: String,
    #[serde(rename = "calConfigurations", default)]
    pub cal_configurations: Vec<CalendarConfiguration>,
    #[serde(rename = "configSwitchgears", default)]
    pub config_switchgears: Vec<ConfigurationDocument>,
    #[serde(rename = "switchgearMappping", default)]
    pub switchgear_mappping: Vec<MappingDocument>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Keyed for CalendarConfiguration {
    type Key = str;

    fn key(&self) -> Option<&str> {
        self.configure_ts.as_deref()
    }
}

impl Nested for CalendarConfiguration {
    type Child = CalendarSwitchgear;

    fn children(&self) -> &[CalendarSwitchgear] {
        &self.switchgears
    }
}

impl super::merge::ScalarOverlay for CalendarConfiguration {
    fn overlay_scalars(&mut self, incoming: Self) {
        if incoming.configure_ts.is_some() {
            self.configure_ts = incoming.configure_ts;
        }
        self.extra.extend(incoming.extra);
    }

    fn detach_children(&mut self) -> Self {
        Self {
            switchgears: std::mem::take(&mut self.switchgears),
            ..Self::default()
        }
    }
}

impl StoredDocument for ConfigurationDocument {
    const KIND: TableKind = TableKind::Configuration;

    fn customer_id(&self) -> &CustomerId {
        &self.customer_id
    }
}

impl StoredDocument for MappingDocument {
    const KIND: TableKind = TableKind::Mapping;

    fn customer_id(&self) -> &CustomerId {
        &self.customer_id
    }
}

impl StoredDocument for CalendarDocument {
    const KIND: TableKind = TableKind::Calendar;

    fn customer_id(&self) -> &CustomerId {
        &self.customer_id
    }
}

impl StoredDocument for PreventiveTaskSet {
    const KIND: TableKind = TableKind::PreventiveTasks;

    fn customer_id(&self) -> &CustomerId {
        &self.customer_id
    }
}

impl StoredDocument for CustomerSnapshotDocument {
    const KIND: TableKind = TableKind::CustomerSnapshot;

    fn customer_id(&self) -> &CustomerId {
        &self.customer_id
    }
}

impl MappingDocument {
    pub fn empty(customer_id: CustomerId) -> Self {
        Self {
            customer_id,
            switchgears: Vec::new(),
            extra: Map::new(),
        }
    }

    /// Planned breakers across all switchgears, in order.
    pub fn planned_cbs(&self) -> impl Iterator<Item = (&MappedSwitchgear, &PlannedCb)> {
        self.switchgears
            .iter()
            .flat_map(|sg| sg.cbs.iter().map(move |cb| (sg, cb)))
    }
}

impl CalendarDocument {
    pub fn empty(customer_id: CustomerId) -> Self {
        Self {
            customer_id,
            configurations: Vec::new(),
            extra: Map::new(),
        }
    }
}
