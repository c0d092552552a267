use std::collections::BTreeSet;
use std::fmt;

use jiff::SignedDuration;
use jiff::civil::{Date, DateTime, Time};
use tracing::{debug, info, warn};

use crate::error::{Result, TipError};
use crate::extract::CourseLimit;

pub const DEFAULT_FIRE_TOLERANCE: SignedDuration = SignedDuration::from_secs(5);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReminderConfig {
    pub enabled: bool,
    pub reminder_time: String,
    pub course_limit: CourseLimit,
    pub excluded_courses: BTreeSet<String>,
    pub show_class_time: bool,
    pub custom_message: Option<String>,
    pub notification_duration_ms: u64,
}

impl Default for ReminderConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            reminder_time: "18:00:00".to_string(),
            course_limit: CourseLimit::AtMost(4),
            excluded_courses: BTreeSet::new(),
            show_class_time: true,
            custom_message: None,
            notification_duration_ms: 10_000,
        }
    }
}

/// Parses `HH:MM` or `HH:MM:SS`.
pub fn parse_reminder_time(raw: &str) -> Result<Time> {
    let malformed = || TipError::MalformedTimeSetting(raw.to_string());

    let fields = raw
        .trim()
        .split(':')
        .map(|field| field.trim().parse::<i8>())
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|_| malformed())?;
    let (hour, minute, second) = match fields[..] {
        [hour, minute] => (hour, minute, 0),
        [hour, minute, second] => (hour, minute, second),
        _ => return Err(malformed()),
    };
    Time::new(hour, minute, second, 0).map_err(|_| malformed())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FireKey {
    pub date: Date,
    pub reminder_time: String,
}

impl fmt::Display for FireKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.date, self.reminder_time)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReminderState {
    pub last_fired_key: Option<FireKey>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickDecision {
    Fire(FireKey),
    Disabled,
    InvalidTime,
    OutsideWindow,
    AlreadyFired,
}

impl TickDecision {
    pub fn fires(&self) -> bool {
        matches!(self, TickDecision::Fire(_))
    }
}

#[derive(Debug, Clone)]
pub struct ReminderScheduler {
    state: ReminderState,
    tolerance: SignedDuration,
}

impl Default for ReminderScheduler {
    fn default() -> Self {
        Self::with_tolerance(DEFAULT_FIRE_TOLERANCE)
    }
}

impl ReminderScheduler {
    pub fn with_tolerance(tolerance: SignedDuration) -> Self {
        Self {
            state: ReminderState::default(),
            tolerance: tolerance.abs(),
        }
    }

    pub fn state(&self) -> &ReminderState {
        &self.state
    }

    pub fn decide(&self, now: DateTime, config: &ReminderConfig) -> TickDecision {
        if !config.enabled {
            return TickDecision::Disabled;
        }

        let target = match parse_reminder_time(&config.reminder_time) {
            Ok(target) => target,
            Err(err) => {
                warn!(%err, "reminder skipped");
                return TickDecision::InvalidTime;
            }
        };

        let distance = SignedDuration::from_secs(seconds_of_day(now.time()) - seconds_of_day(target));
        if distance.abs() > self.tolerance {
            return TickDecision::OutsideWindow;
        }

        let key = FireKey {
            date: now.date(),
            reminder_time: config.reminder_time.clone(),
        };
        if self.state.last_fired_key.as_ref() == Some(&key) {
            return TickDecision::AlreadyFired;
        }
        TickDecision::Fire(key)
    }

    /// Decides and, on fire, records the key. The key is recorded regardless
    /// of what the caller finds for tomorrow.
    pub fn tick(&mut self, now: DateTime, config: &ReminderConfig) -> TickDecision {
        let decision = self.decide(now, config);
        match &decision {
            TickDecision::Fire(key) => {
                info!(%key, %now, "reminder time reached");
                self.state.last_fired_key = Some(key.clone());
            }
            TickDecision::AlreadyFired => debug!("reminder already sent for this key"),
            _ => {}
        }
        decision
    }
}

/// Whole seconds since midnight; sub-second precision is dropped.
fn seconds_of_day(time: Time) -> i64 {
    i64::from(time.hour()) * 3600 + i64::from(time.minute()) * 60 + i64::from(time.second())
}
