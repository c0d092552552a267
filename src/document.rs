//! Typed view of a timetable document.
//!
//! Two layouts exist in the wild. V1 documents describe a day's timeline as
//! `"a<part><index>"` keys whose times come from the `part` table. V2
//! documents describe it as tuples, either `[is_break, part_id, item_index,
//! duration]` or `[start, end]`. Both are normalized here once so the
//! resolver and extractor never touch raw JSON.

use std::collections::BTreeMap;

use jiff::{ToSpan, civil::Time};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::error::{Result, TipError};

pub const DEFAULT_KEY: &str = "default";

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SchemaVersion {
    V1,
    V2,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimelineEntry {
    /// V1 key such as `"a12"`; only keys starting with `a` are classes.
    Keyed(String),
    /// V2 period descriptor. `duration` is in minutes.
    Slot {
        is_break: bool,
        part_id: String,
        item_index: u32,
        duration: u32,
    },
    /// V2 period with explicit clock labels.
    Span { start: String, end: String },
}

/// Per-weekday arrays keyed by `"0"`..`"6"` or [`DEFAULT_KEY`].
pub type DayTable<T> = BTreeMap<String, Vec<T>>;

#[derive(Debug, Clone)]
pub struct TimetableDocument {
    pub version: SchemaVersion,
    pub timeline: DayTable<TimelineEntry>,
    pub timeline_even: DayTable<TimelineEntry>,
    pub schedule: DayTable<String>,
    pub schedule_even: DayTable<String>,
    /// Start time of each part, from the first two numbers of `part` entries.
    pub parts: BTreeMap<String, Time>,
}

impl TimetableDocument {
    pub fn from_json(src: &str) -> Result<Self> {
        let value: Value =
            serde_json::from_str(src).map_err(|err| TipError::MalformedDocument(err.to_string()))?;
        Self::from_value(&value)
    }

    pub fn from_value(value: &Value) -> Result<Self> {
        let Some(root) = value.as_object() else {
            return Err(TipError::MalformedDocument(
                "top level is not an object".to_string(),
            ));
        };

        let version = detect_version(root);
        debug!(?version, "detected schedule layout");

        Ok(Self {
            version,
            timeline: day_table(root, "timeline", |day| timeline_day(day, version)),
            timeline_even: day_table(root, "timeline_even", |day| timeline_day(day, version)),
            schedule: day_table(root, "schedule", schedule_day),
            schedule_even: day_table(root, "schedule_even", schedule_day),
            parts: parts(root),
        })
    }

    /// `HH:MM` label of a part's start time.
    pub fn part_label(&self, part_id: &str) -> Option<String> {
        self.parts
            .get(part_id)
            .map(|time| time.strftime("%H:%M").to_string())
    }

    /// Start and end labels of a V2 slot that begins `offset` minutes into its part.
    /// `None` when the slot would run past midnight.
    pub fn slot_times(&self, part_id: &str, offset: u32, duration: u32) -> Option<(String, String)> {
        let start = self
            .parts
            .get(part_id)?
            .checked_add(i64::from(offset).minutes())
            .ok()?;
        let end = start.checked_add(i64::from(duration).minutes()).ok()?;
        Some((
            start.strftime("%H:%M").to_string(),
            end.strftime("%H:%M").to_string(),
        ))
    }
}

/// V2 requires both `timeline` and `schedule` and tuple-shaped timeline
/// entries. Bare string entries or keyed day objects mean V1.
fn detect_version(root: &Map<String, Value>) -> SchemaVersion {
    if !root.contains_key("timeline") || !root.contains_key("schedule") {
        return SchemaVersion::V1;
    }

    let days = ["timeline", "timeline_even"]
        .into_iter()
        .filter_map(|key| root.get(key).and_then(Value::as_object))
        .flat_map(|table| table.values());

    for day in days {
        match day {
            Value::Object(_) => return SchemaVersion::V1,
            Value::Array(entries) => {
                if entries.iter().any(Value::is_string) {
                    return SchemaVersion::V1;
                }
                if entries.iter().any(Value::is_array) {
                    return SchemaVersion::V2;
                }
            }
            _ => {}
        }
    }

    SchemaVersion::V2
}

fn day_table<T>(
    root: &Map<String, Value>,
    key: &str,
    normalize: impl Fn(&Value) -> Option<Vec<T>>,
) -> DayTable<T> {
    let Some(value) = root.get(key) else {
        return DayTable::new();
    };
    let Some(table) = value.as_object() else {
        warn!(key, "ignoring non-object day table");
        return DayTable::new();
    };

    table
        .iter()
        .filter_map(|(day, value)| match normalize(value) {
            Some(entries) => Some((day.clone(), entries)),
            None => {
                warn!(key, %day, "ignoring malformed day entry");
                None
            }
        })
        .collect()
}

fn timeline_day(value: &Value, version: SchemaVersion) -> Option<Vec<TimelineEntry>> {
    match (version, value) {
        (SchemaVersion::V1, Value::Object(keys)) => {
            Some(keys.keys().cloned().map(TimelineEntry::Keyed).collect())
        }
        (SchemaVersion::V1, Value::Array(keys)) => Some(
            keys.iter()
                .filter_map(Value::as_str)
                .map(|key| TimelineEntry::Keyed(key.to_string()))
                .collect(),
        ),
        (SchemaVersion::V2, Value::Array(entries)) => Some(
            entries
                .iter()
                .filter_map(|entry| {
                    let parsed = timeline_tuple(entry);
                    if parsed.is_none() {
                        warn!(%entry, "skipping unrecognized timeline entry");
                    }
                    parsed
                })
                .collect(),
        ),
        (_, Value::Null) => Some(Vec::new()),
        _ => None,
    }
}

fn timeline_tuple(entry: &Value) -> Option<TimelineEntry> {
    let fields = entry.as_array()?;
    match fields.as_slice() {
        [Value::String(start), Value::String(end)] => Some(TimelineEntry::Span {
            start: start.clone(),
            end: end.clone(),
        }),
        [is_break, part_id, item_index, duration, ..] => Some(TimelineEntry::Slot {
            is_break: flag(is_break)?,
            part_id: id(part_id)?,
            item_index: number(item_index).unwrap_or(0),
            duration: number(duration).unwrap_or(0),
        }),
        _ => None,
    }
}

/// Course names keep their positions: non-string names become empty
/// placeholders rather than shifting later names.
fn schedule_day(value: &Value) -> Option<Vec<String>> {
    match value {
        Value::Array(names) => Some(
            names
                .iter()
                .map(|name| name.as_str().unwrap_or_default().to_string())
                .collect(),
        ),
        Value::Null => Some(Vec::new()),
        _ => None,
    }
}

fn parts(root: &Map<String, Value>) -> BTreeMap<String, Time> {
    let Some(table) = root.get("part").and_then(Value::as_object) else {
        return BTreeMap::new();
    };

    let mut parts = BTreeMap::new();
    for (part_id, info) in table {
        let fields = info.as_array().map(Vec::as_slice).unwrap_or_default();
        let [hour, minute, ..] = fields else {
            debug!(%part_id, "skipping part without hour and minute");
            continue;
        };
        let time = number(hour)
            .zip(number(minute))
            .and_then(|(h, m)| Time::new(i8::try_from(h).ok()?, i8::try_from(m).ok()?, 0, 0).ok());
        match time {
            Some(time) => {
                parts.insert(part_id.clone(), time);
            }
            None => warn!(%part_id, %info, "skipping part with invalid time"),
        }
    }
    parts
}

fn flag(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(flag) => Some(*flag),
        Value::Number(n) => n.as_i64().map(|n| n != 0),
        _ => None,
    }
}

fn id(value: &Value) -> Option<String> {
    match value {
        Value::String(id) => Some(id.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn number(value: &Value) -> Option<u32> {
    match value {
        Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
