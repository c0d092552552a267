use std::path::PathBuf;

use figment::{
    Figment,
    providers::{Format, Toml},
};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::extract::CourseLimit;
use crate::reminder::ReminderConfig;

pub trait SettingsSource: Send + Sync {
    fn snapshot(&self) -> Result<ReminderConfig>;
}

impl SettingsSource for ReminderConfig {
    fn snapshot(&self) -> Result<ReminderConfig> {
        Ok(self.clone())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub enable_tip: bool,
    pub course_count: i64,
    #[serde(alias = "reminder_time")]
    pub tip_time: String,
    /// Comma separated course names.
    pub excluded_courses: String,
    /// Milliseconds.
    pub notification_duration: i64,
    pub custom_message: String,
    pub show_class_time: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            enable_tip: true,
            course_count: 4,
            tip_time: "18:00:00".to_string(),
            excluded_courses: String::new(),
            notification_duration: 10_000,
            custom_message: String::new(),
            show_class_time: true,
        }
    }
}

impl Settings {
    pub fn excluded(&self) -> impl Iterator<Item = &str> {
        self.excluded_courses
            .split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
    }
}

impl From<Settings> for ReminderConfig {
    fn from(settings: Settings) -> Self {
        let custom_message = Some(settings.custom_message.trim())
            .filter(|message| !message.is_empty())
            .map(str::to_string);
        ReminderConfig {
            enabled: settings.enable_tip,
            course_limit: CourseLimit::from_count(settings.course_count),
            excluded_courses: settings.excluded().map(str::to_string).collect(),
            show_class_time: settings.show_class_time,
            custom_message,
            notification_duration_ms: u64::try_from(settings.notification_duration).unwrap_or(0),
            reminder_time: settings.tip_time,
        }
    }
}

/// TOML settings file, re-read on every snapshot. A missing file yields the
/// defaults.
#[derive(Debug, Clone)]
pub struct SettingsFile {
    path: PathBuf,
}

impl SettingsFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn load(&self) -> Result<Settings> {
        Ok(Figment::from(Toml::file(&self.path)).extract()?)
    }
}

impl SettingsSource for SettingsFile {
    fn snapshot(&self) -> Result<ReminderConfig> {
        self.load().map(ReminderConfig::from)
    }
}
