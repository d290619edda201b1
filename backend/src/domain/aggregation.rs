//! Derived read-only views over the maintenance documents.
//!
//! Plan summaries join three documents: the mapping tree supplies the
//! planned breakers, the calendar tree supplies execution records and the
//! configuration tree supplies breaker locations. Checklists are built from
//! the mapping tree alone, grouped, then expanded into one entry per
//! recurrence.

use chrono::{Days, NaiveDate};
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::warn;

use super::documents::{CalendarDocument, ConfigurationDocument, MappingDocument};
use super::overlay::truthy_or_blank;
use super::schedule::{InvalidDate, plan_type, round_half_up, schedule_interval_days, total_plan};
use super::switchgear::{MappedSwitchgear, PlannedCb, SubTask, Task};
use super::traversal::{SubTaskPath, find_by_path};
use super::Error;

/// Location reported when the inventory has no label for a breaker.
pub const UNKNOWN_LOCATION: &str = "Unknown Location";

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Stored data the aggregations cannot interpret.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AggregationError {
    #[error("planned breaker {task_id} has no {field}")]
    MissingField {
        field: &'static str,
        task_id: String,
    },
    #[error(transparent)]
    InvalidDate(#[from] InvalidDate),
}

impl From<AggregationError> for Error {
    fn from(value: AggregationError) -> Self {
        Error::internal(format!("malformed maintenance data: {value}"))
    }
}

/// Which view `testpreservice` renders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanType {
    /// Per-breaker completion and validation status.
    Individual,
    /// Occurrence counts per breaker.
    Totalplan,
    /// Any other value renders empty breaker lists.
    Unknown(String),
}

impl From<&str> for PlanType {
    fn from(value: &str) -> Self {
        match value {
            "Individual" => Self::Individual,
            "Totalplan" => Self::Totalplan,
            other => Self::Unknown(other.to_owned()),
        }
    }
}

/// Occurrence counts for one planned breaker.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanSummary {
    pub cbname: Option<String>,
    pub cbid: Option<Value>,
    #[serde(rename = "pms_des")]
    pub pms_des: Option<String>,
    pub task_id: Option<String>,
    pub planshudule: Option<String>,
    pub plan_start_date: String,
    pub total_plan: i64,
    pub pending_plan: usize,
    pub complete_plan: usize,
    pub location: String,
}

/// Completion roll-up for one planned breaker.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndividualStatus {
    pub cbname: Option<String>,
    pub cbid: Option<Value>,
    #[serde(rename = "pms_des")]
    pub pms_des: Option<String>,
    pub task_id: Option<String>,
    pub planshudule: Option<String>,
    pub plan_end_date: String,
    pub plan_start_date: String,
    pub status: &'static str,
    pub validation: &'static str,
    pub location: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PlanRow {
    Individual(IndividualStatus),
    Total(PlanSummary),
}

/// A mapping switchgear with its breakers replaced by plan rows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupedSwitchgear {
    #[serde(rename = "switchgearId", skip_serializing_if = "Option::is_none")]
    pub switchgear_id: Option<String>,
    #[serde(rename = "switchgearName", skip_serializing_if = "Option::is_none")]
    pub switchgear_name: Option<String>,
    pub cbs: Vec<PlanRow>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Execution records joined to `cb`, at most one per planned subtask.
pub fn execution_records<'a>(
    calendar: Option<&'a CalendarDocument>,
    cb: &'a PlannedCb,
) -> Vec<&'a SubTask> {
    let (Some(calendar), Some(task_id)) = (calendar, cb.task_id.as_deref()) else {
        return Vec::new();
    };
    cb.tasks
        .iter()
        .filter_map(|task| task.main_task.as_deref().map(|main| (task, main)))
        .flat_map(|(task, main_task)| {
            task.sub_tasks
                .iter()
                .filter_map(move |sub| sub.name.as_deref().map(|name| (main_task, name)))
        })
        .filter_map(|(main_task, sub_task)| {
            find_by_path(
                calendar.switchgears(),
                SubTaskPath {
                    task_id,
                    main_task,
                    sub_task,
                },
            )
        })
        .collect()
}

/// Location label of breaker `cbid` inside configuration switchgear `switchgear_id`.
pub fn match_location(
    config: &ConfigurationDocument,
    switchgear_id: Option<&str>,
    cbid: Option<i64>,
) -> String {
    let (Some(switchgear_id), Some(cbid)) = (switchgear_id, cbid) else {
        return UNKNOWN_LOCATION.to_owned();
    };
    config
        .configswitchgears
        .iter()
        .filter(|sg| sg.id.as_deref() == Some(switchgear_id))
        .find_map(|sg| sg.configured_cbs.iter().find(|cb| cb.id == Some(cbid)))
        .and_then(|cb| cb.switchgear_location())
        .unwrap_or(UNKNOWN_LOCATION)
        .to_owned()
}

fn required<'a, T>(
    value: Option<&'a T>,
    field: &'static str,
    cb: &PlannedCb,
) -> Result<&'a T, AggregationError> {
    value.ok_or_else(|| AggregationError::MissingField {
        field,
        task_id: cb.task_id.clone().unwrap_or_default(),
    })
}

fn summarise(
    cb: &PlannedCb,
    switchgear_id: Option<&str>,
    calendar: Option<&CalendarDocument>,
    config: &ConfigurationDocument,
) -> Result<PlanSummary, AggregationError> {
    let start = *required(cb.plan_start_date.as_ref(), "planStartDate", cb)?;
    let end = *required(cb.plan_end_date.as_ref(), "planEndDate", cb)?;
    let records = execution_records(calendar, cb);
    let (pending_plan, complete_plan) = if records.is_empty() {
        (cb.subtask_count(), 0)
    } else {
        let complete = records.iter().filter(|record| record.is_completed()).count();
        (records.len() - complete, complete)
    };
    Ok(PlanSummary {
        cbname: cb.cbname.clone(),
        cbid: cb.cbid.clone(),
        pms_des: cb.pms_des.clone(),
        task_id: cb.task_id.clone(),
        planshudule: cb.planshudule.clone(),
        plan_start_date: start.format_mdy(),
        total_plan: total_plan(
            start.to_date()?,
            end.to_date()?,
            cb.planshudule.as_deref().unwrap_or_default(),
        ),
        pending_plan,
        complete_plan,
        location: match_location(config, switchgear_id, cb.cbid_as_i64()),
    })
}

fn individual_status(
    cb: &PlannedCb,
    switchgear_id: Option<&str>,
    calendar: Option<&CalendarDocument>,
    config: &ConfigurationDocument,
) -> Result<IndividualStatus, AggregationError> {
    let start = required(cb.plan_start_date.as_ref(), "planStartDate", cb)?;
    let end = required(cb.plan_end_date.as_ref(), "planEndDate", cb)?;
    let records = execution_records(calendar, cb);
    let completed = !records.is_empty() && records.iter().all(|record| record.is_completed());
    let valid = !records.is_empty() && records.iter().all(|record| record.is_validated());
    Ok(IndividualStatus {
        cbname: cb.cbname.clone(),
        cbid: cb.cbid.clone(),
        pms_des: cb.pms_des.clone(),
        task_id: cb.task_id.clone(),
        planshudule: cb.planshudule.clone(),
        plan_end_date: end.format_mdy(),
        plan_start_date: start.format_mdy(),
        status: if completed { "completed" } else { "pending" },
        validation: if valid { "Valid" } else { "Invalid" },
        location: match_location(config, switchgear_id, cb.cbid_as_i64()),
    })
}

/// One [`PlanSummary`] per planned breaker of `switchgear`.
///
/// When `schedule_filter` is set only breakers whose `planshudule` equals it
/// are summarised.
pub fn compute_duration(
    schedule_filter: Option<&str>,
    switchgear: &MappedSwitchgear,
    calendar: Option<&CalendarDocument>,
    config: &ConfigurationDocument,
) -> Result<Vec<PlanSummary>, AggregationError> {
    switchgear
        .cbs
        .iter()
        .filter(|cb| schedule_filter.is_none_or(|tag| cb.planshudule.as_deref() == Some(tag)))
        .map(|cb| summarise(cb, switchgear.switchgear_id.as_deref(), calendar, config))
        .collect()
}

/// Plan rows nested under their switchgear, shaped by `plan_type`.
pub fn group_by_plan_type(
    plan_type: &PlanType,
    schedule_type: Option<&str>,
    mapping: &MappingDocument,
    calendar: Option<&CalendarDocument>,
    config: &ConfigurationDocument,
) -> Result<Vec<GroupedSwitchgear>, AggregationError> {
    mapping
        .switchgears
        .iter()
        .map(|sg| -> Result<GroupedSwitchgear, AggregationError> {
            let switchgear_id = sg.switchgear_id.as_deref();
            let cbs = match plan_type {
                PlanType::Individual => sg
                    .cbs
                    .iter()
                    .map(|cb| {
                        individual_status(cb, switchgear_id, calendar, config)
                            .map(PlanRow::Individual)
                    })
                    .collect::<Result<Vec<_>, _>>()?,
                PlanType::Totalplan => compute_duration(schedule_type, sg, calendar, config)?
                    .into_iter()
                    .map(PlanRow::Total)
                    .collect(),
                PlanType::Unknown(other) => {
                    warn!(plan_type = %other, "unknown plan type renders no rows");
                    Vec::new()
                }
            };
            Ok(GroupedSwitchgear {
                switchgear_id: sg.switchgear_id.clone(),
                switchgear_name: sg.switchgear_name.clone(),
                cbs,
                extra: sg.extra.clone(),
            })
        })
        .collect()
}

/// Planned tasks of `cb` with execution fields copied from the calendar.
///
/// Each subtask takes `reportRef`, `remarks`, `status`, `performedBy` and
/// `comments` from its first calendar record. Missing or falsy values become
/// the empty string.
pub fn overlay_execution_fields(cb: &PlannedCb, calendar: Option<&CalendarDocument>) -> Vec<Task> {
    let task_id = cb.task_id.as_deref().unwrap_or_default();
    cb.tasks
        .iter()
        .map(|task| {
            let main_task = task.main_task.as_deref().unwrap_or_default();
            let sub_tasks = task
                .sub_tasks
                .iter()
                .map(|sub| {
                    let record = calendar.and_then(|calendar| {
                        find_by_path(
                            calendar.switchgears(),
                            SubTaskPath {
                                task_id,
                                main_task,
                                sub_task: sub.name.as_deref().unwrap_or_default(),
                            },
                        )
                    });
                    SubTask {
                        report_ref: Some(truthy_or_blank(record.and_then(|r| r.report_ref.as_ref()))),
                        remarks: Some(truthy_or_blank(record.and_then(|r| r.remarks.as_ref()))),
                        status: Some(truthy_or_blank(record.and_then(|r| r.status.as_ref()))),
                        performed_by: Some(truthy_or_blank(
                            record.and_then(|r| r.performed_by.as_ref()),
                        )),
                        comments: Some(truthy_or_blank(record.and_then(|r| r.comments.as_ref()))),
                        ..sub.clone()
                    }
                })
                .collect();
            Task {
                sub_tasks,
                ..task.clone()
            }
        })
        .collect()
}

/// Checklist line.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChecklistItem {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub is_completed: bool,
}

/// Calendar checklist for one switchgear and plan window.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChecklistEntry {
    pub planned_date: String,
    pub date: String,
    pub check_list_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub cust_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_name: Option<String>,
    pub status: String,
    pub pl_type: String,
    pub title: String,
    pub check_list: Vec<ChecklistItem>,
}

impl ChecklistEntry {
    fn group_key(&self) -> (&str, &str, &str, Option<&str>, &str, Option<&str>) {
        (
            &self.planned_date,
            &self.date,
            &self.check_list_type,
            self.id.as_deref(),
            &self.cust_id,
            self.device_name.as_deref(),
        )
    }
}

/// One raw checklist entry per planned breaker.
pub fn checklist_entries(mapping: &MappingDocument) -> Result<Vec<ChecklistEntry>, AggregationError> {
    mapping
        .planned_cbs()
        .map(|(sg, cb)| -> Result<ChecklistEntry, AggregationError> {
            let tag = required(cb.planshudule.as_ref(), "planshudule", cb)?;
            let start = required(cb.plan_start_date.as_ref(), "planStartDate", cb)?;
            let end = required(cb.plan_end_date.as_ref(), "planEndDate", cb)?;
            start.to_date()?;
            end.to_date()?;
            Ok(ChecklistEntry {
                planned_date: start.format_ymd(),
                date: end.format_ymd(),
                check_list_type: tag.clone(),
                id: sg.switchgear_id.clone(),
                cust_id: mapping.customer_id.to_string(),
                device_name: sg.switchgear_name.clone(),
                status: "pending".to_owned(),
                pl_type: plan_type(tag).to_owned(),
                title: format!("{}-{tag}", sg.switchgear_name.as_deref().unwrap_or_default()),
                check_list: vec![ChecklistItem {
                    description: cb.pms_des.clone(),
                    is_completed: false,
                }],
            })
        })
        .collect()
}

/// Group entries sharing plan window, type, switchgear, customer and device.
///
/// Groups keep first-seen order and concatenate their checklists; every
/// other attribute comes from the first entry of the group.
pub fn merge_and_group_checklists(raw: Vec<ChecklistEntry>) -> Vec<ChecklistEntry> {
    let mut grouped: Vec<ChecklistEntry> = Vec::new();
    for entry in raw {
        match grouped
            .iter_mut()
            .find(|existing| existing.group_key() == entry.group_key())
        {
            Some(existing) => existing.check_list.extend(entry.check_list),
            None => grouped.push(entry),
        }
    }
    grouped
}

/// Split an entry into one instance per recurrence of its plan tag.
///
/// The instance count is the plan window in days divided by the interval,
/// rounded half up. Counts of one or less return the entry unchanged. The
/// last instance always ends on the original end date.
pub fn expand_recurrences(entry: ChecklistEntry) -> Vec<ChecklistEntry> {
    let (Ok(start), Ok(end)) = (
        NaiveDate::parse_from_str(&entry.planned_date, DATE_FORMAT),
        NaiveDate::parse_from_str(&entry.date, DATE_FORMAT),
    ) else {
        warn!(title = %entry.title, "checklist dates unparsable; recurrence expansion skipped");
        return vec![entry];
    };
    let interval = schedule_interval_days(&entry.check_list_type);
    let count = round_half_up((end - start).num_days(), i64::from(interval));
    if count <= 1 {
        return vec![entry];
    }

    let step = Days::new(u64::from(interval));
    let mut instances = Vec::new();
    let mut planned = start;
    for i in 0..count {
        let next = planned.checked_add_days(step).unwrap_or(end);
        let date = if i + 1 < count { next } else { end };
        instances.push(ChecklistEntry {
            planned_date: planned.format(DATE_FORMAT).to_string(),
            date: date.format(DATE_FORMAT).to_string(),
            ..entry.clone()
        });
        planned = next;
    }
    instances
}
