use jiff::SignedDuration;
use jiff::civil::{Date, DateTime};
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::error::{Result, TipError};
use crate::extract::{CourseExtractor, CourseSlot};
use crate::notify::{Notification, Notifier};
use crate::parity::{ConfigCenter, WeekParityResolver};
use crate::reminder::{ReminderConfig, ReminderScheduler, TickDecision};
use crate::resolve::ScheduleResolver;
use crate::settings::{SettingsFile, SettingsSource};
use crate::store::ScheduleStore;

pub struct TomorrowTip {
    store: ScheduleStore,
    settings: Box<dyn SettingsSource>,
    parity: WeekParityResolver,
    notifier: Box<dyn Notifier>,
    scheduler: ReminderScheduler,
}

impl TomorrowTip {
    pub fn new(
        store: ScheduleStore,
        settings: impl SettingsSource + 'static,
        notifier: impl Notifier + 'static,
    ) -> Self {
        Self {
            store,
            settings: Box::new(settings),
            parity: WeekParityResolver::default(),
            notifier: Box::new(notifier),
            scheduler: ReminderScheduler::default(),
        }
    }

    pub fn from_config(config: &Config, notifier: impl Notifier + 'static) -> Self {
        let tip = Self::new(
            ScheduleStore::new(config.host_context()),
            SettingsFile::new(&config.settings_file),
            notifier,
        );
        match &config.config_center_file {
            Some(path) => tip.with_parity(WeekParityResolver::new(ConfigCenter::new(path))),
            None => tip,
        }
    }

    pub fn with_parity(mut self, parity: WeekParityResolver) -> Self {
        self.parity = parity;
        self
    }

    pub fn with_tolerance(mut self, tolerance: SignedDuration) -> Self {
        self.scheduler = ReminderScheduler::with_tolerance(tolerance);
        self
    }

    pub fn scheduler(&self) -> &ReminderScheduler {
        &self.scheduler
    }

    /// Never fails: every error ends the tick quietly and the next tick
    /// tries again (unless the fire key was already recorded).
    pub fn on_tick(&mut self, now: DateTime) -> Option<Notification> {
        let config = match self.settings.snapshot() {
            Ok(config) => config,
            Err(err) => {
                warn!(%err, "settings unavailable, skipping tick");
                return None;
            }
        };

        let TickDecision::Fire(key) = self.scheduler.tick(now, &config) else {
            return None;
        };

        match self.notify_for(now.date(), &config, false) {
            Ok(notification) => {
                info!(%key, content = %notification.content, "sent tomorrow's courses");
                Some(notification)
            }
            Err(err @ (TipError::MissingContext(_) | TipError::FileNotFound(_))) => {
                debug!(%err, "no schedule to remind about");
                None
            }
            Err(err) => {
                error!(%err, "reminder failed");
                None
            }
        }
    }

    /// Sends tomorrow's courses right away, ignoring the reminder time and
    /// the fire key.
    pub fn send_test(&self, now: DateTime) -> Result<Notification> {
        let config = self.settings.snapshot()?;
        info!("sending test notification");
        self.notify_for(now.date(), &config, true)
    }

    pub fn courses_on(&self, date: Date) -> Result<Vec<CourseSlot>> {
        let config = self.settings.snapshot()?;
        self.courses(date, &config)
    }

    fn notify_for(&self, today: Date, config: &ReminderConfig, is_test: bool) -> Result<Notification> {
        let tomorrow = today.tomorrow()?;
        let courses = self.courses(tomorrow, config)?;
        let notification = Notification::for_courses(&courses, config, is_test);
        self.notifier.send(&notification)?;
        Ok(notification)
    }

    fn courses(&self, date: Date, config: &ReminderConfig) -> Result<Vec<CourseSlot>> {
        let document = self.store.load()?;
        let parity = self.parity.resolve(date);
        let day = ScheduleResolver::new(&document).resolve(date.weekday(), parity);
        let extractor =
            CourseExtractor::new(config.excluded_courses.iter().cloned(), config.course_limit);
        let courses = extractor.extract(&document, &day);
        debug!(%date, %parity, count = courses.len(), "courses for day");
        Ok(courses)
    }
}
