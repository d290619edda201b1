//! Switchgear, circuit breaker, task and subtask entities.
//!
//! The same physical switchgear appears in three stored shapes: the
//! configuration inventory, the maintenance mapping and the calendar
//! execution log. Each shape keeps its own field names on the wire and is
//! tagged with a [`SchemaKind`]. Unknown attributes are kept in `extra` so a
//! load/save round trip never drops client data.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::merge::ScalarOverlay;
use super::schedule::DateTriple;
use super::traversal::{Keyed, Nested};

/// Which stored shape a switchgear record uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchemaKind {
    Config,
    Mapping,
    Calendar,
}

impl std::fmt::Display for SchemaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Config => "config",
            Self::Mapping => "mapping",
            Self::Calendar => "calendar",
        })
    }
}

/// Behaviour shared by the three switchgear shapes.
///
/// [`Keyed::key`] yields the switchgear identifier each shape is looked up by.
pub trait SwitchgearShape: Keyed<Key = str> {
    const KIND: SchemaKind;

    /// Human-readable label, when the shape carries one.
    fn label(&self) -> Option<&str>;
}

/// Find a switchgear of any shape by identifier.
pub fn find_switchgear<'a, S: SwitchgearShape>(items: &'a [S], id: &str) -> Option<&'a S> {
    let found = items.iter().find(|sg| sg.key() == Some(id));
    if found.is_none() {
        tracing::debug!(kind = %S::KIND, switchgear_id = id, "switchgear lookup missed");
    }
    found
}

/// Mutable variant of [`find_switchgear`].
pub fn find_switchgear_mut<'a, S: SwitchgearShape>(
    items: &'a mut [S],
    id: &str,
) -> Option<&'a mut S> {
    items.iter_mut().find(|sg| sg.key() == Some(id))
}

// Absent and explicit `null` both deserialise to `None`; neither clears a
// stored value.
macro_rules! overlay_options {
    ($target:expr, $incoming:expr; $($field:ident),+ $(,)?) => {
        $(
            if $incoming.$field.is_some() {
                $target.$field = $incoming.$field;
            }
        )+
        $target.extra.extend($incoming.extra);
    };
}

/// Configuration-shape switchgear: the installed inventory.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ConfigSwitchgear {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "configuredCBs", default)]
    pub configured_cbs: Vec<CircuitBreaker>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Installed circuit breaker.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CircuitBreaker {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "serialNo", default, skip_serializing_if = "Option::is_none")]
    pub serial_no: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<Value>,
    #[serde(rename = "joNoMfgDate", default, skip_serializing_if = "Option::is_none")]
    pub jo_no_mfg_date: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub configurations: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CircuitBreaker {
    /// Location label recorded under the equipment details, if any.
    pub fn switchgear_location(&self) -> Option<&str> {
        self.configurations
            .as_ref()?
            .pointer("/equipmentDetails/data/switchgearLocation")?
            .as_str()
            .filter(|label| !label.is_empty())
    }
}

/// Mapping-shape switchgear: the maintenance plan per breaker.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MappedSwitchgear {
    #[serde(rename = "switchgearId", default, skip_serializing_if = "Option::is_none")]
    pub switchgear_id: Option<String>,
    #[serde(rename = "switchgearName", default, skip_serializing_if = "Option::is_none")]
    pub switchgear_name: Option<String>,
    #[serde(default)]
    pub cbs: Vec<PlannedCb>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Calendar-shape switchgear: execution records for one snapshot date.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CalendarSwitchgear {
    #[serde(rename = "switchgearID", default, skip_serializing_if = "Option::is_none")]
    pub switchgear_id: Option<String>,
    #[serde(default)]
    pub cbs: Vec<PlannedCb>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A circuit breaker scheduled for preventive maintenance.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PlannedCb {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cbid: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cbname: Option<String>,
    #[serde(rename = "taskId", default, skip_serializing_if = "Option::is_none")]
    pub task_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pms_des: Option<String>,
    #[serde(rename = "creationDate", default, skip_serializing_if = "Option::is_none")]
    pub creation_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub planshudule: Option<String>,
    #[serde(rename = "planStartDate", default, skip_serializing_if = "Option::is_none")]
    pub plan_start_date: Option<DateTriple>,
    #[serde(rename = "planEndDate", default, skip_serializing_if = "Option::is_none")]
    pub plan_end_date: Option<DateTriple>,
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PlannedCb {
    /// Breaker id as an integer; numeric strings are accepted.
    pub fn cbid_as_i64(&self) -> Option<i64> {
        match self.cbid.as_ref()? {
            Value::Number(number) => number.as_i64(),
            Value::String(text) => text.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn subtask_count(&self) -> usize {
        self.tasks.iter().map(|task| task.sub_tasks.len()).sum()
    }
}

/// Maintenance task grouping subtasks.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Task {
    #[serde(rename = "mainTask", default, skip_serializing_if = "Option::is_none")]
    pub main_task: Option<String>,
    #[serde(rename = "subTasks", default)]
    pub sub_tasks: Vec<SubTask>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Leaf maintenance step with its execution fields.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SubTask {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comments: Option<Value>,
    #[serde(rename = "reportRef", default, skip_serializing_if = "Option::is_none")]
    pub report_ref: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remarks: Option<Value>,
    #[serde(rename = "performedBy", default, skip_serializing_if = "Option::is_none")]
    pub performed_by: Option<Value>,
    #[serde(rename = "timeDuration", default, skip_serializing_if = "Option::is_none")]
    pub time_duration: Option<Value>,
    #[serde(rename = "planSchedule", default, skip_serializing_if = "Option::is_none")]
    pub plan_schedule: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SubTask {
    /// Only the boolean `true` marks a subtask as done.
    pub fn is_completed(&self) -> bool {
        matches!(self.status, Some(Value::Bool(true)))
    }

    pub fn is_validated(&self) -> bool {
        matches!(self.validation, Some(Value::Bool(true)))
    }
}

impl ScalarOverlay for ConfigSwitchgear {
    fn overlay_scalars(&mut self, incoming: Self) {
        overlay_options!(self, incoming; id, name);
    }

    fn detach_children(&mut self) -> Self {
        Self {
            configured_cbs: std::mem::take(&mut self.configured_cbs),
            ..Self::default()
        }
    }
}

impl ScalarOverlay for CircuitBreaker {
    fn overlay_scalars(&mut self, incoming: Self) {
        overlay_options!(
            self,
            incoming;
            id,
            name,
            serial_no,
            brand,
            model,
            jo_no_mfg_date,
            location,
            configurations,
        );
    }

    fn detach_children(&mut self) -> Self {
        Self::default()
    }
}

impl ScalarOverlay for MappedSwitchgear {
    fn overlay_scalars(&mut self, incoming: Self) {
        overlay_options!(self, incoming; switchgear_id, switchgear_name);
    }

    fn detach_children(&mut self) -> Self {
        Self {
            cbs: std::mem::take(&mut self.cbs),
            ..Self::default()
        }
    }
}

impl ScalarOverlay for CalendarSwitchgear {
    fn overlay_scalars(&mut self, incoming: Self) {
        overlay_options!(self, incoming; switchgear_id);
    }

    fn detach_children(&mut self) -> Self {
        Self {
            cbs: std::mem::take(&mut self.cbs),
            ..Self::default()
        }
    }
}

impl ScalarOverlay for PlannedCb {
    fn overlay_scalars(&mut self, incoming: Self) {
        overlay_options!(
            self,
            incoming;
            cbid,
            cbname,
            task_id,
            pms_des,
            creation_date,
            planshudule,
            plan_start_date,
            plan_end_date,
        );
    }

    fn detach_children(&mut self) -> Self {
        Self {
            tasks: std::mem::take(&mut self.tasks),
            ..Self::default()
        }
    }
}

impl ScalarOverlay for Task {
    fn overlay_scalars(&mut self, incoming: Self) {
        overlay_options!(self, incoming; main_task);
    }

    fn detach_children(&mut self) -> Self {
        Self {
            sub_tasks: std::mem::take(&mut self.sub_tasks),
            ..Self::default()
        }
    }
}

impl ScalarOverlay for SubTask {
    fn overlay_scalars(&mut self, incoming: Self) {
        overlay_options!(
            self,
            incoming;
            name,
            status,
            validation,
            comments,
            report_ref,
            remarks,
            performed_by,
            time_duration,
            plan_schedule,
        );
    }

    fn detach_children(&mut self) -> Self {
        Self::default()
    }
}

impl Keyed for ConfigSwitchgear {
    type Key = str;

    fn key(&self) -> Option<&str> {
        self.id.as_deref()
    }
}

impl Keyed for MappedSwitchgear {
    type Key = str;

    fn key(&self) -> Option<&str> {
        self.switchgear_id.as_deref()
    }
}

impl Keyed for CalendarSwitchgear {
    type Key = str;

    fn key(&self) -> Option<&str> {
        self.switchgear_id.as_deref()
    }
}

impl Keyed for CircuitBreaker {
    type Key = i64;

    fn key(&self) -> Option<&i64> {
        self.id.as_ref()
    }
}

impl Keyed for PlannedCb {
    type Key = str;

    fn key(&self) -> Option<&str> {
        self.task_id.as_deref()
    }
}

impl Keyed for Task {
    type Key = str;

    fn key(&self) -> Option<&str> {
        self.main_task.as_deref()
    }
}

impl Keyed for SubTask {
    type Key = str;

    fn key(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

impl SwitchgearShape for ConfigSwitchgear {
    const KIND: SchemaKind = SchemaKind::Config;

    fn label(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

impl SwitchgearShape for MappedSwitchgear {
    const KIND: SchemaKind = SchemaKind::Mapping;

    fn label(&self) -> Option<&str> {
        self.switchgear_name.as_deref()
    }
}

impl SwitchgearShape for CalendarSwitchgear {
    const KIND: SchemaKind = SchemaKind::Calendar;

    fn label(&self) -> Option<&str> {
        None
    }
}

impl Nested for ConfigSwitchgear {
    type Child = CircuitBreaker;

    fn children(&self) -> &[CircuitBreaker] {
        &self.configured_cbs
    }
}

impl Nested for MappedSwitchgear {
    type Child = PlannedCb;

    fn children(&self) -> &[PlannedCb] {
        &self.cbs
    }
}

impl Nested for CalendarSwitchgear {
    type Child = PlannedCb;

    fn children(&self) -> &[PlannedCb] {
        &self.cbs
    }
}

impl Nested for PlannedCb {
    type Child = Task;

    fn children(&self) -> &[Task] {
        &self.tasks
    }
}

impl Nested for Task {
    type Child = SubTask;

    fn children(&self) -> &[SubTask] {
        &self.sub_tasks
    }
}
