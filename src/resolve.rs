use jiff::civil::Weekday;
use tracing::debug;

use crate::document::{DEFAULT_KEY, DayTable, TimelineEntry, TimetableDocument};
use crate::parity::WeekParity;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum LookupKey {
    Weekday,
    Default,
}

/// Which table and key a side was taken from.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Lookup {
    pub parity: WeekParity,
    pub key: LookupKey,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DaySchedule {
    pub timeline: Vec<TimelineEntry>,
    pub courses: Vec<String>,
}

impl DaySchedule {
    pub fn is_empty(&self) -> bool {
        self.timeline.is_empty()
    }
}

pub struct ScheduleResolver<'a> {
    document: &'a TimetableDocument,
}

impl<'a> ScheduleResolver<'a> {
    pub fn new(document: &'a TimetableDocument) -> Self {
        Self { document }
    }

    pub fn resolve(&self, weekday: Weekday, parity: WeekParity) -> DaySchedule {
        let day = weekday.to_monday_zero_offset().to_string();

        let timeline = lookup(&day, parity, |p| self.timelines(p));
        let courses = lookup(&day, parity, |p| self.schedules(p));

        match (timeline, courses) {
            (Some((timeline, from_timeline)), Some((courses, from_schedule))) => {
                debug!(
                    %day,
                    %parity,
                    ?from_timeline,
                    ?from_schedule,
                    periods = timeline.len(),
                    courses = courses.len(),
                    "resolved day"
                );
                DaySchedule {
                    timeline: timeline.to_vec(),
                    courses: courses.to_vec(),
                }
            }
            (timeline, courses) => {
                debug!(
                    %day,
                    %parity,
                    has_timeline = timeline.is_some(),
                    has_courses = courses.is_some(),
                    timeline_days = ?populated_days(self.timelines(parity)),
                    schedule_days = ?populated_days(self.schedules(parity)),
                    "no schedule for day"
                );
                DaySchedule::default()
            }
        }
    }

    fn timelines(&self, parity: WeekParity) -> &'a DayTable<TimelineEntry> {
        match parity {
            WeekParity::Odd => &self.document.timeline,
            WeekParity::Even => &self.document.timeline_even,
        }
    }

    fn schedules(&self, parity: WeekParity) -> &'a DayTable<String> {
        match parity {
            WeekParity::Odd => &self.document.schedule,
            WeekParity::Even => &self.document.schedule_even,
        }
    }
}

fn lookup<'a, T>(
    day: &str,
    parity: WeekParity,
    table: impl Fn(WeekParity) -> &'a DayTable<T>,
) -> Option<(&'a [T], Lookup)> {
    [parity, parity.opposite()]
        .into_iter()
        .flat_map(|parity| {
            [(day, LookupKey::Weekday), (DEFAULT_KEY, LookupKey::Default)]
                .map(|(key, kind)| (parity, key, kind))
        })
        .find_map(|(parity, key, kind)| {
            let entries = table(parity).get(key).filter(|entries| !entries.is_empty())?;
            Some((entries.as_slice(), Lookup { parity, key: kind }))
        })
}

fn populated_days<T>(table: &DayTable<T>) -> Vec<&str> {
    table
        .iter()
        .filter(|(key, entries)| !entries.is_empty() && key.as_str() != DEFAULT_KEY)
        .map(|(key, _)| key.as_str())
        .collect()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    const ALL_DAYS: [Weekday; 7] = [
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
        Weekday::Saturday,
        Weekday::Sunday,
    ];

    fn doc(value: serde_json::Value) -> TimetableDocument {
        TimetableDocument::from_value(&value).unwrap()
    }

    fn slot(part_id: &str) -> TimelineEntry {
        TimelineEntry::Slot {
            is_break: false,
            part_id: part_id.to_string(),
            item_index: 0,
            duration: 45,
        }
    }

    fn lookup_schedule(document: &TimetableDocument, day: &str, parity: WeekParity) -> Option<Lookup> {
        lookup(day, parity, |p| ScheduleResolver::new(document).schedules(p)).map(|(_, from)| from)
    }

    #[test]
    fn test_weekday_beats_default() {
        let document = doc(json!({
            "timeline": {"2": [[false, "a", 0, 45]], "default": [[false, "b", 0, 45]]},
            "schedule": {"2": ["Math"], "default": ["Rest"]}
        }));
        let day = ScheduleResolver::new(&document).resolve(Weekday::Wednesday, WeekParity::Odd);
        assert_eq!(day.timeline, vec![slot("a")]);
        assert_eq!(day.courses, vec!["Math".to_string()]);
    }

    #[test]
    fn test_same_parity_default_beats_opposite_weekday() {
        let document = doc(json!({
            "timeline": {"default": [[false, "odd", 0, 45]]},
            "timeline_even": {"2": [[false, "even", 0, 45]]},
            "schedule": {"default": ["Odd Default"]},
            "schedule_even": {"2": ["Even Wednesday"]}
        }));
        let resolver = ScheduleResolver::new(&document);

        let day = resolver.resolve(Weekday::Wednesday, WeekParity::Odd);
        assert_eq!(day.courses, vec!["Odd Default".to_string()]);

        let day = resolver.resolve(Weekday::Wednesday, WeekParity::Even);
        assert_eq!(day.courses, vec!["Even Wednesday".to_string()]);
        assert_eq!(day.timeline, vec![slot("even")]);
    }

    #[test]
    fn test_falls_through_to_opposite_parity_default() {
        let document = doc(json!({
            "timeline": {"default": [[false, 1, 0, 45]]},
            "schedule": {},
            "schedule_even": {"default": ["Only Even"]}
        }));
        let day = ScheduleResolver::new(&document).resolve(Weekday::Thursday, WeekParity::Odd);
        assert_eq!(day.courses, vec!["Only Even".to_string()]);
        assert_eq!(
            lookup_schedule(&document, "3", WeekParity::Odd),
            Some(Lookup {
                parity: WeekParity::Even,
                key: LookupKey::Default
            })
        );
    }

    #[test]
    fn test_empty_weekday_entry_is_skipped() {
        let document = doc(json!({
            "timeline": {"4": [], "default": [[false, 1, 0, 45]]},
            "schedule": {"4": [], "default": ["Fallback"]}
        }));
        let day = ScheduleResolver::new(&document).resolve(Weekday::Friday, WeekParity::Odd);
        assert_eq!(day.courses, vec!["Fallback".to_string()]);
    }

    #[test]
    fn test_missing_schedule_side_empties_the_day() {
        let document = doc(json!({
            "timeline": {"0": [[false, 1, 0, 45]]},
            "schedule": {"1": ["Elsewhere"]}
        }));
        let day = ScheduleResolver::new(&document).resolve(Weekday::Monday, WeekParity::Odd);
        assert!(day.is_empty());
        assert!(day.courses.is_empty());
    }

    #[test]
    fn test_sides_never_resolve_alone() {
        let documents = [
            doc(json!({
                "timeline": {"0": [[false, 1, 0, 45]], "3": [[false, 1, 0, 45]]},
                "schedule": {"3": ["A"], "5": ["B"]},
                "schedule_even": {"6": ["C"]}
            })),
            doc(json!({
                "timeline_even": {"default": [[false, 1, 0, 45]]},
                "schedule": {"2": ["A"]}
            })),
            doc(json!({
                "timeline": {"1": ["a1", "a2"]},
                "schedule": {"default": ["Math"]}
            })),
        ];

        for document in &documents {
            let resolver = ScheduleResolver::new(document);
            for weekday in ALL_DAYS {
                for parity in [WeekParity::Odd, WeekParity::Even] {
                    let day = resolver.resolve(weekday, parity);
                    assert_eq!(
                        day.timeline.is_empty(),
                        day.courses.is_empty(),
                        "{weekday:?} {parity}"
                    );
                }
            }
        }
    }
}
