use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use tracing::{debug, warn};

use crate::document::{SchemaVersion, TimelineEntry, TimetableDocument};
use crate::resolve::DaySchedule;

/// Names that mean "nothing scheduled". Always filtered.
pub const PLACEHOLDER_COURSES: [&str; 4] = ["未添加", "暂无课程", "", "无课程"];

/// Whether a V2 break entry uses up a course name. It does not: course
/// names line up with class entries only.
pub const BREAKS_CONSUME_COURSE: bool = false;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CourseSlot {
    pub name: String,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub period: Option<u32>,
}

impl CourseSlot {
    pub fn time_label(&self) -> Option<String> {
        match (&self.start_time, &self.end_time) {
            (Some(start), Some(end)) => Some(format!("{start}-{end}")),
            (Some(start), None) => Some(start.clone()),
            _ => None,
        }
    }
}

/// How many courses to report. Non-positive counts mean no limit.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum CourseLimit {
    Unbounded,
    AtMost(usize),
}

impl CourseLimit {
    pub fn from_count(count: i64) -> Self {
        match usize::try_from(count) {
            Ok(0) | Err(_) => CourseLimit::Unbounded,
            Ok(n) => CourseLimit::AtMost(n),
        }
    }

    fn reached(self, collected: usize) -> bool {
        match self {
            CourseLimit::Unbounded => false,
            CourseLimit::AtMost(n) => collected >= n,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CourseExtractor {
    excluded: BTreeSet<String>,
    limit: CourseLimit,
}

impl CourseExtractor {
    pub fn new(excluded: impl IntoIterator<Item = String>, limit: CourseLimit) -> Self {
        Self {
            excluded: excluded.into_iter().collect(),
            limit,
        }
    }

    pub fn is_valid(&self, name: &str) -> bool {
        !PLACEHOLDER_COURSES.contains(&name) && !self.excluded.contains(name)
    }

    pub fn extract(&self, document: &TimetableDocument, day: &DaySchedule) -> Vec<CourseSlot> {
        if day.timeline.is_empty() || day.courses.is_empty() {
            return Vec::new();
        }
        let slots = match document.version {
            SchemaVersion::V1 => self.extract_keyed(document, day),
            SchemaVersion::V2 => self.extract_tuples(document, day),
        };
        debug!(count = slots.len(), limit = ?self.limit, "extracted courses");
        slots
    }

    /// V1: class keys (`a<part>...`) in sorted order take course names in turn.
    fn extract_keyed(&self, document: &TimetableDocument, day: &DaySchedule) -> Vec<CourseSlot> {
        let mut keys: Vec<&str> = day
            .timeline
            .iter()
            .filter_map(|entry| match entry {
                TimelineEntry::Keyed(key) => Some(key.as_str()),
                _ => None,
            })
            .collect();
        keys.sort_unstable();

        let mut slots = Vec::new();
        let mut index = 0;
        for key in keys {
            if self.limit.reached(slots.len()) {
                break;
            }
            let Some(rest) = key.strip_prefix('a') else {
                continue;
            };
            let Some(part) = rest.chars().next().and_then(|c| c.to_digit(10)) else {
                warn!(key, "class key without part number");
                continue;
            };

            if let Some(name) = day.courses.get(index).filter(|name| self.is_valid(name)) {
                let start = document
                    .part_label(&part.to_string())
                    .unwrap_or_else(|| format!("第{part}节"));
                slots.push(CourseSlot {
                    name: name.clone(),
                    start_time: Some(start),
                    end_time: None,
                    period: Some(part),
                });
            }
            index += 1;
        }
        slots
    }

    /// V2: class entries and spans take course names in turn; start times of
    /// part-based slots accumulate from the part's start.
    fn extract_tuples(&self, document: &TimetableDocument, day: &DaySchedule) -> Vec<CourseSlot> {
        let mut slots = Vec::new();
        // None once a part's minutes no longer fit; later slots lose their times.
        let mut offsets: BTreeMap<&str, Option<u32>> = BTreeMap::new();
        let mut index = 0;

        for entry in &day.timeline {
            if self.limit.reached(slots.len()) {
                break;
            }
            let times = match entry {
                TimelineEntry::Slot {
                    is_break,
                    part_id,
                    duration,
                    ..
                } => {
                    let offset = offsets.entry(part_id.as_str()).or_insert(Some(0));
                    let start = *offset;
                    *offset = start.and_then(|start| start.checked_add(*duration));
                    if start.is_some() && offset.is_none() {
                        warn!(%part_id, duration, "part duration overflows, dropping slot times");
                    }
                    if *is_break {
                        if BREAKS_CONSUME_COURSE {
                            index += 1;
                        }
                        continue;
                    }
                    start.and_then(|start| document.slot_times(part_id, start, *duration))
                }
                TimelineEntry::Span { start, end } => Some((start.clone(), end.clone())),
                TimelineEntry::Keyed(_) => continue,
            };

            let Some(name) = day.courses.get(index) else {
                continue;
            };
            index += 1;
            if !self.is_valid(name) {
                continue;
            }

            let (start_time, end_time) = times.unzip();
            slots.push(CourseSlot {
                name: name.clone(),
                start_time,
                end_time,
                period: u32::try_from(index).ok(),
            });
        }
        slots
    }
}
