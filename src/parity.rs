use std::fmt;
use std::path::PathBuf;

use figment::{
    Figment,
    providers::{Format, Toml},
};
use jiff::civil::Date;
use serde::Deserialize;
use tracing::{debug, warn};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum WeekParity {
    Odd,
    Even,
}

impl WeekParity {
    pub fn from_week_number(week: i64) -> Self {
        if week.rem_euclid(2) == 0 {
            WeekParity::Even
        } else {
            WeekParity::Odd
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            WeekParity::Odd => WeekParity::Even,
            WeekParity::Even => WeekParity::Odd,
        }
    }
}

impl fmt::Display for WeekParity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WeekParity::Odd => f.write_str("odd"),
            WeekParity::Even => f.write_str("even"),
        }
    }
}

/// Host-side week settings. Absent values are `None`; readers never fail.
pub trait WeekParityOverride: Send + Sync {
    /// Raw parity override. `1` means even, any other integer means odd.
    fn read_parity(&self) -> Option<String>;

    fn read_start_date(&self) -> Option<String>;
}

#[derive(Debug, Default, Copy, Clone)]
pub struct NoOverride;

impl WeekParityOverride for NoOverride {
    fn read_parity(&self) -> Option<String> {
        None
    }

    fn read_start_date(&self) -> Option<String> {
        None
    }
}

/// Host configuration file with `[Temp] set_schedule` and `[Date] start_date`.
///
/// The file is re-read on every call so edits made by the host take effect on
/// the next tick.
#[derive(Debug, Clone)]
pub struct ConfigCenter {
    path: PathBuf,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawSetting {
    Int(i64),
    Text(String),
}

impl ConfigCenter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn read(&self, key: &str) -> Option<String> {
        let value = Figment::from(Toml::file(&self.path))
            .extract_inner::<RawSetting>(key)
            .ok()?;
        match value {
            RawSetting::Int(n) => Some(n.to_string()),
            RawSetting::Text(s) => Some(s),
        }
    }
}

impl WeekParityOverride for ConfigCenter {
    fn read_parity(&self) -> Option<String> {
        self.read("Temp.set_schedule")
    }

    fn read_start_date(&self) -> Option<String> {
        self.read("Date.start_date")
    }
}

pub struct WeekParityResolver {
    source: Box<dyn WeekParityOverride>,
}

impl Default for WeekParityResolver {
    fn default() -> Self {
        Self::new(NoOverride)
    }
}

impl WeekParityResolver {
    pub fn new(source: impl WeekParityOverride + 'static) -> Self {
        Self {
            source: Box::new(source),
        }
    }

    pub fn resolve(&self, date: Date) -> WeekParity {
        if let Some(parity) = self.from_override() {
            debug!(%parity, "week parity from override");
            return parity;
        }
        if let Some(parity) = self.from_start_date(date) {
            debug!(%parity, "week parity from term start date");
            return parity;
        }
        let parity = WeekParity::from_week_number(i64::from(date.iso_week_date().week()));
        debug!(%parity, "week parity from ISO calendar week");
        parity
    }

    fn from_override(&self) -> Option<WeekParity> {
        let raw = self.source.read_parity()?;
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }
        match raw.parse::<i64>() {
            Ok(1) => Some(WeekParity::Even),
            Ok(_) => Some(WeekParity::Odd),
            Err(err) => {
                warn!(raw, %err, "ignoring unparseable week parity override");
                None
            }
        }
    }

    fn from_start_date(&self, date: Date) -> Option<WeekParity> {
        let raw = self.source.read_start_date()?;
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }
        let start = match raw.parse::<Date>() {
            Ok(start) => start,
            Err(err) => {
                warn!(raw, %err, "ignoring unparseable term start date");
                return None;
            }
        };
        let days = match start.until(date) {
            Ok(span) => i64::from(span.get_days()),
            Err(err) => {
                warn!(%start, %date, %err, "cannot measure days since term start");
                return None;
            }
        };
        Some(WeekParity::from_week_number(days.div_euclid(7) + 1))
    }
}
