//! Cross-table joins for one switchgear and the snapshots built from them.
//!
//! A join narrows the calendar, configuration and mapping documents of a
//! customer down to a single switchgear. Snapshots persist such a join under
//! the date it was taken.

use serde::Serialize;
use serde_json::{Map, Value};

use super::documents::{
    CalendarConfiguration, CalendarDocument, ConfigurationDocument, CustomerSnapshotDocument,
    MappingDocument, SnapshotEntry,
};
use super::switchgear::{CircuitBreaker, PlannedCb};
use super::CustomerId;

/// A lookup that either found its target or explains why not.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Lookup<T> {
    Found(T),
    Missing(String),
}

impl<T> Lookup<T> {
    fn from_option(found: Option<T>, missing: impl FnOnce() -> String) -> Self {
        found.map_or_else(|| Self::Missing(missing()), Self::Found)
    }
}

/// The three documents narrowed to one switchgear.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SwitchgearJoin {
    pub cal_configurations: Vec<CalendarConfiguration>,
    pub config_switchgears: Vec<ConfigurationDocument>,
    pub switchgear_mappping: Vec<MappingDocument>,
}

/// One breaker looked up in each part of a [`SwitchgearJoin`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BreakerJoin {
    pub cal_configurations: Lookup<PlannedCb>,
    pub config_switchgears: Lookup<CircuitBreaker>,
    pub switchgear_mappping: Lookup<PlannedCb>,
}

/// Snapshot parts narrowed to a breaker id and/or task id.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotSelection {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cb_details: Option<Vec<CircuitBreaker>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cal_configurations: Option<Lookup<Vec<PlannedCb>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub switchgear_mappping: Option<Lookup<Vec<PlannedCb>>>,
}

/// Narrow the customer's documents to `switchgear_id`.
///
/// Documents or configurations left without a matching switchgear are
/// dropped entirely.
pub fn join_switchgear(
    calendars: &[CalendarDocument],
    configs: &[ConfigurationDocument],
    mappings: &[MappingDocument],
    switchgear_id: &str,
) -> SwitchgearJoin {
    let cal_configurations = calendars
        .iter()
        .flat_map(|doc| doc.configurations.iter())
        .filter_map(|config| {
            let switchgears: Vec<_> = config
                .switchgears
                .iter()
                .filter(|sg| sg.switchgear_id.as_deref() == Some(switchgear_id))
                .cloned()
                .collect();
            (!switchgears.is_empty()).then(|| CalendarConfiguration {
                switchgears,
                ..config.clone()
            })
        })
        .collect();
    let config_switchgears = configs
        .iter()
        .filter_map(|doc| {
            let configswitchgears: Vec<_> = doc
                .configswitchgears
                .iter()
                .filter(|sg| sg.id.as_deref() == Some(switchgear_id))
                .cloned()
                .collect();
            (!configswitchgears.is_empty()).then(|| ConfigurationDocument {
                configswitchgears,
                ..doc.clone()
            })
        })
        .collect();
    let switchgear_mappping = mappings
        .iter()
        .filter_map(|doc| {
            let switchgears: Vec<_> = doc
                .switchgears
                .iter()
                .filter(|sg| sg.switchgear_id.as_deref() == Some(switchgear_id))
                .cloned()
                .collect();
            (!switchgears.is_empty()).then(|| MappingDocument {
                switchgears,
                ..doc.clone()
            })
        })
        .collect();
    SwitchgearJoin {
        cal_configurations,
        config_switchgears,
        switchgear_mappping,
    }
}

fn cbid_matches(cb: &PlannedCb, cbid: &str) -> bool {
    match (cb.cbid_as_i64(), cbid.trim().parse::<i64>()) {
        (Some(stored), Ok(wanted)) => stored == wanted,
        _ => cb.cbid.as_ref().and_then(Value::as_str) == Some(cbid),
    }
}

fn parse_cb_id(cbid: &str) -> Option<i64> {
    cbid.trim().parse().ok()
}

/// Look up breaker `cbid` in every part of `join`.
///
/// With `configure_ts` the calendar lookup is confined to that snapshot date;
/// without it every configuration is searched in order.
pub fn join_breaker(
    join: &SwitchgearJoin,
    switchgear_id: &str,
    cbid: &str,
    configure_ts: Option<&str>,
) -> BreakerJoin {
    let no_cb = || format!("No CB found with ID: {cbid} under switchgear {switchgear_id}");

    let cal_configurations = match configure_ts {
        Some(ts) => match join
            .cal_configurations
            .iter()
            .find(|config| config.configure_ts.as_deref() == Some(ts))
        {
            None => Lookup::Missing(format!("No configuration found with configure_Ts: {ts}")),
            Some(config) => match config
                .switchgears
                .iter()
                .find(|sg| sg.switchgear_id.as_deref() == Some(switchgear_id))
            {
                None => Lookup::Missing(format!(
                    "No switchgear found with ID: {switchgear_id} under configuration {ts}"
                )),
                Some(sg) => Lookup::from_option(
                    sg.cbs.iter().find(|cb| cbid_matches(cb, cbid)).cloned(),
                    no_cb,
                ),
            },
        },
        None => Lookup::from_option(
            join.cal_configurations
                .iter()
                .flat_map(|config| config.switchgears.iter())
                .flat_map(|sg| sg.cbs.iter())
                .find(|cb| cbid_matches(cb, cbid))
                .cloned(),
            no_cb,
        ),
    };

    let wanted_id = parse_cb_id(cbid);
    let config_switchgears = Lookup::from_option(
        join.config_switchgears
            .iter()
            .flat_map(|doc| doc.configswitchgears.iter())
            .find(|sg| sg.id.as_deref() == Some(switchgear_id))
            .and_then(|sg| {
                sg.configured_cbs
                    .iter()
                    .find(|cb| wanted_id.is_some() && cb.id == wanted_id)
            })
            .cloned(),
        no_cb,
    );

    let mapped = join
        .switchgear_mappping
        .iter()
        .flat_map(|doc| doc.switchgears.iter())
        .find(|sg| sg.switchgear_id.as_deref() == Some(switchgear_id));
    let switchgear_mappping = match mapped {
        None => Lookup::Missing(format!("No switchgear found with ID: {switchgear_id}")),
        Some(sg) => Lookup::from_option(
            sg.cbs.iter().find(|cb| cbid_matches(cb, cbid)).cloned(),
            no_cb,
        ),
    };

    BreakerJoin {
        cal_configurations,
        config_switchgears,
        switchgear_mappping,
    }
}

/// Build the snapshot entry for `switchgear_id` taken on `configure_ts`.
pub fn snapshot_entry(
    switchgear_id: &str,
    configure_ts: &str,
    join: SwitchgearJoin,
) -> SnapshotEntry {
    SnapshotEntry {
        switchgear_id: switchgear_id.to_owned(),
        configure_ts: configure_ts.to_owned(),
        cal_configurations: join.cal_configurations,
        config_switchgears: join.config_switchgears,
        switchgear_mappping: join.switchgear_mappping,
        extra: Map::new(),
    }
}

/// Replace the entry with the same switchgear id, or append it.
pub fn upsert_snapshot(
    existing: Option<CustomerSnapshotDocument>,
    customer_id: &CustomerId,
    entry: SnapshotEntry,
) -> CustomerSnapshotDocument {
    let mut document = existing.unwrap_or_else(|| CustomerSnapshotDocument {
        customer_id: customer_id.clone(),
        switchgears: Vec::new(),
        extra: Map::new(),
    });
    match document
        .switchgears
        .iter_mut()
        .find(|current| current.switchgear_id == entry.switchgear_id)
    {
        Some(current) => *current = entry,
        None => document.switchgears.push(entry),
    }
    document
}

/// Narrow a stored snapshot entry to a breaker id and/or task id.
pub fn select_from_snapshot(
    entry: &SnapshotEntry,
    cbid: Option<&str>,
    task_id: Option<&str>,
) -> SnapshotSelection {
    let cb_details = cbid.map(|cbid| {
        let wanted = parse_cb_id(cbid);
        entry
            .config_switchgears
            .iter()
            .flat_map(|doc| doc.configswitchgears.iter())
            .flat_map(|sg| sg.configured_cbs.iter())
            .filter(|cb| wanted.is_some() && cb.id == wanted)
            .cloned()
            .collect()
    });
    let by_task = |cbs: Vec<PlannedCb>, task_id: &str| {
        if cbs.is_empty() {
            Lookup::Missing(format!("No CB found with id: {task_id}"))
        } else {
            Lookup::Found(cbs)
        }
    };
    let (cal_configurations, switchgear_mappping) = match task_id {
        None => (None, None),
        Some(task_id) => {
            let calendar = entry
                .cal_configurations
                .iter()
                .flat_map(|config| config.switchgears.iter())
                .flat_map(|sg| sg.cbs.iter())
                .filter(|cb| cb.task_id.as_deref() == Some(task_id))
                .cloned()
                .collect();
            let mapping = entry
                .switchgear_mappping
                .iter()
                .flat_map(|doc| doc.switchgears.iter())
                .flat_map(|sg| sg.cbs.iter())
                .filter(|cb| cb.task_id.as_deref() == Some(task_id))
                .cloned()
                .collect();
            (
                Some(by_task(calendar, task_id)),
                Some(by_task(mapping, task_id)),
            )
        }
    };
    SnapshotSelection {
        cb_details,
        cal_configurations,
        switchgear_mappping,
    }
}
