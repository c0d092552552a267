use std::fs;
use std::path::Path;
use std::sync::Arc;

use jiff::civil::{DateTime, date};
use tomorrow_tip::config::Config;
use tomorrow_tip::notify::MemoryNotifier;
use tomorrow_tip::TomorrowTip;

const V1_DOC: &str = r#"{
    "timeline": {"0": ["a1", "a2"]},
    "schedule": {"0": ["Math", "未添加"]},
    "part": {"1": [8, 0], "2": [9, 0]}
}"#;

const ROTATING_DOC: &str = r#"{
    "timeline": {"default": [["08:00", "08:45"], ["09:00", "09:45"]]},
    "timeline_even": {"default": [["08:30", "09:15"], ["09:30", "10:15"]]},
    "schedule": {"default": ["Odd A", "Odd B"]},
    "schedule_even": {"default": ["Even A", "Even B"]}
}"#;

struct Host {
    dir: tempfile::TempDir,
}

impl Host {
    fn new(schedule: &str, settings: &str) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let schedule_dir = dir.path().join("config").join("schedule");
        fs::create_dir_all(&schedule_dir).unwrap();
        fs::write(schedule_dir.join("main.json"), schedule).unwrap();
        fs::write(dir.path().join("settings.toml"), settings).unwrap();
        Self { dir }
    }

    fn path(&self) -> &Path {
        self.dir.path()
    }

    fn with_config_center(self, contents: &str) -> Self {
        fs::write(self.path().join("config.toml"), contents).unwrap();
        self
    }

    fn config(&self) -> Config {
        let config_center = self.path().join("config.toml");
        Config {
            base_directory: Some(self.path().to_path_buf()),
            schedule_name: Some("main.json".to_string()),
            settings_file: self.path().join("settings.toml"),
            config_center_file: config_center.exists().then_some(config_center),
            ..Config::default()
        }
    }

    fn tip(&self) -> (TomorrowTip, Arc<MemoryNotifier>) {
        let memory = Arc::new(MemoryNotifier::default());
        (TomorrowTip::from_config(&self.config(), memory.clone()), memory)
    }
}

// Sunday evening; tomorrow is Monday (weekday "0").
fn sunday_at(hour: i8, minute: i8, second: i8) -> DateTime {
    date(2026, 10, 18).at(hour, minute, second, 0)
}

#[test]
fn v1_timetable_drops_placeholder_course() {
    let host = Host::new(V1_DOC, "tip_time = \"18:00:00\"\n");
    let (mut tip, memory) = host.tip();

    let sent = tip.on_tick(sunday_at(18, 0, 3)).expect("reminder fires");
    assert_eq!(sent.subtitle, "明日课程安排:");
    assert_eq!(sent.content, "08:00 Math");

    assert_eq!(tip.on_tick(sunday_at(18, 0, 3)), None);
    assert_eq!(memory.sent().len(), 1);
}

#[test]
fn settings_are_reread_every_tick() {
    let host = Host::new(V1_DOC, "tip_time = \"18:00:00\"\nenable_tip = false\n");
    let (mut tip, memory) = host.tip();

    assert_eq!(tip.on_tick(sunday_at(18, 0, 0)), None);

    fs::write(
        host.path().join("settings.toml"),
        "tip_time = \"18:00:00\"\nshow_class_time = false\n",
    )
    .unwrap();
    let sent = tip.on_tick(sunday_at(18, 0, 1)).expect("reminder fires once enabled");
    assert_eq!(sent.content, "Math");
    assert_eq!(memory.sent().len(), 1);
}

#[test]
fn broken_settings_skip_the_tick() {
    let host = Host::new(V1_DOC, "course_count = \"lots\"\n");
    let (mut tip, memory) = host.tip();

    assert_eq!(tip.on_tick(sunday_at(18, 0, 0)), None);
    assert!(tip.scheduler().state().last_fired_key.is_none());
    assert!(memory.sent().is_empty());
}

#[test]
fn parity_override_selects_even_tables() {
    let host = Host::new(ROTATING_DOC, "").with_config_center("[Temp]\nset_schedule = 1\n");
    let (tip, _memory) = host.tip();

    let courses = tip.courses_on(date(2026, 10, 19)).unwrap();
    let names: Vec<_> = courses.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["Even A", "Even B"]);
    assert_eq!(courses[0].time_label().as_deref(), Some("08:30-09:15"));
}

#[test]
fn term_start_date_counts_weeks() {
    // Term starts Monday 2026-10-12, so 2026-10-19 opens week 2 (even).
    let host = Host::new(ROTATING_DOC, "course_count = 1\n")
        .with_config_center("[Temp]\nset_schedule = \"\"\n\n[Date]\nstart_date = \"2026-10-12\"\n");
    let (tip, _memory) = host.tip();

    let courses = tip.courses_on(date(2026, 10, 19)).unwrap();
    assert_eq!(courses.len(), 1);
    assert_eq!(courses[0].name, "Even A");

    let courses = tip.courses_on(date(2026, 10, 26)).unwrap();
    assert_eq!(courses[0].name, "Odd A");
}

#[test]
fn missing_host_context_is_silent() {
    let host = Host::new(V1_DOC, "");
    let config = Config {
        schedule_name: None,
        ..host.config()
    };
    let memory = Arc::new(MemoryNotifier::default());
    let mut tip = TomorrowTip::from_config(&config, memory.clone());

    assert_eq!(tip.on_tick(sunday_at(18, 0, 0)), None);
    assert!(memory.sent().is_empty());
}
