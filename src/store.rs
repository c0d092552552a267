use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use tracing::debug;

use crate::document::TimetableDocument;
use crate::error::{Result, TipError};

/// What the host tells us about the active timetable. Either field may be
/// missing, which simply means there is nothing to remind about.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostContext {
    pub schedule_name: Option<String>,
    pub base_directory: Option<PathBuf>,
}

impl HostContext {
    pub fn new(schedule_name: impl Into<String>, base_directory: impl Into<PathBuf>) -> Self {
        Self {
            schedule_name: Some(schedule_name.into()),
            base_directory: Some(base_directory.into()),
        }
    }

    /// Reads the host's `Schedule_Name` and `base_directory` entries.
    pub fn from_map(map: &HashMap<String, String>) -> Self {
        Self {
            schedule_name: map.get("Schedule_Name").cloned(),
            base_directory: map.get("base_directory").map(PathBuf::from),
        }
    }
}

/// Timetable files live at `<base_directory>/config/schedule/<schedule_name>`
/// and are re-read in full on every load.
#[derive(Debug, Clone)]
pub struct ScheduleStore {
    context: HostContext,
}

impl ScheduleStore {
    pub fn new(context: HostContext) -> Self {
        Self { context }
    }

    pub fn path(&self) -> Result<PathBuf> {
        let name = self
            .context
            .schedule_name
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .ok_or(TipError::MissingContext("Schedule_Name"))?;
        let base = self
            .context
            .base_directory
            .as_deref()
            .filter(|base| !base.as_os_str().is_empty())
            .ok_or(TipError::MissingContext("base_directory"))?;
        Ok(base.join("config").join("schedule").join(name))
    }

    pub fn load(&self) -> Result<TimetableDocument> {
        let path = self.path()?;
        if !path.is_file() {
            return Err(TipError::FileNotFound(path));
        }
        let src = fs::read_to_string(&path).map_err(|source| TipError::Io {
            path: path.clone(),
            source,
        })?;
        debug!(path = %path.display(), "loaded schedule");
        TimetableDocument::from_json(&src)
    }
}
