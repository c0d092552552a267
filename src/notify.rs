use std::io::Write;
use std::sync::{Arc, Mutex};

use serde::Serialize;
use tracing::info;

use crate::error::{Result, TipError};
use crate::extract::CourseSlot;
use crate::reminder::ReminderConfig;

pub const TITLE: &str = "明日课程提醒";
pub const TEST_TITLE_PREFIX: &str = "测试通知 - ";
const SUBTITLE_WITH_COURSES: &str = "明日课程安排:";
const SUBTITLE_NO_COURSES: &str = "享受休息吧!";
const CONTENT_NO_COURSES: &str = "明日没有课程安排";

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationLevel {
    Info,
    Reminder,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub title: String,
    pub subtitle: String,
    pub content: String,
    pub duration_ms: u64,
    pub level: NotificationLevel,
}

impl Notification {
    pub fn for_courses(courses: &[CourseSlot], config: &ReminderConfig, is_test: bool) -> Self {
        let (title, level) = if is_test {
            (format!("{TEST_TITLE_PREFIX}{TITLE}"), NotificationLevel::Info)
        } else {
            (TITLE.to_string(), NotificationLevel::Reminder)
        };

        let (subtitle, content) = if courses.is_empty() {
            (SUBTITLE_NO_COURSES, CONTENT_NO_COURSES.to_string())
        } else {
            let content = courses
                .iter()
                .map(|course| match &course.start_time {
                    Some(start) if config.show_class_time => format!("{start} {}", course.name),
                    _ => course.name.clone(),
                })
                .collect::<Vec<_>>()
                .join(" | ");
            (SUBTITLE_WITH_COURSES, content)
        };

        Self {
            title,
            subtitle: subtitle.to_string(),
            content: config.custom_message.clone().unwrap_or(content),
            duration_ms: config.notification_duration_ms,
            level,
        }
    }
}

/// One-shot delivery. Implementations must not queue or retry.
pub trait Notifier: Send + Sync {
    fn send(&self, notification: &Notification) -> Result<()>;
}

impl<N: Notifier + ?Sized> Notifier for Arc<N> {
    fn send(&self, notification: &Notification) -> Result<()> {
        (**self).send(notification)
    }
}

#[derive(Debug, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn send(&self, notification: &Notification) -> Result<()> {
        info!(
            title = %notification.title,
            subtitle = %notification.subtitle,
            duration_ms = notification.duration_ms,
            "{}",
            notification.content
        );
        Ok(())
    }
}

/// Writes one JSON object per notification to stdout, for a host process
/// that reads our output.
#[derive(Debug, Default)]
pub struct StdoutNotifier;

impl Notifier for StdoutNotifier {
    fn send(&self, notification: &Notification) -> Result<()> {
        let json =
            serde_json::to_string(notification).map_err(|err| TipError::Notify(err.to_string()))?;
        let mut stdout = std::io::stdout().lock();
        writeln!(stdout, "{json}")
            .and_then(|()| stdout.flush())
            .map_err(|err| TipError::Notify(err.to_string()))
    }
}

#[derive(Debug, Default)]
pub struct MemoryNotifier {
    sent: Mutex<Vec<Notification>>,
}

impl MemoryNotifier {
    pub fn sent(&self) -> Vec<Notification> {
        self.sent
            .lock()
            .map(|sent| sent.clone())
            .unwrap_or_default()
    }
}

impl Notifier for MemoryNotifier {
    fn send(&self, notification: &Notification) -> Result<()> {
        self.sent
            .lock()
            .map_err(|err| TipError::Notify(err.to_string()))?
            .push(notification.clone());
        Ok(())
    }
}
