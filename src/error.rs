use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum TipError {
    /// The host did not provide a schedule name or base directory.
    #[error("no active schedule: {0}")]
    MissingContext(&'static str),

    #[error("schedule file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSON parse failure or a top-level shape that is not a timetable.
    #[error("malformed schedule document: {0}")]
    MalformedDocument(String),

    /// Reminder time that is not `HH:MM` or `HH:MM:SS`.
    #[error("malformed reminder time: {0:?}")]
    MalformedTimeSetting(String),

    #[error("settings error: {0}")]
    Settings(#[from] Box<figment::Error>),

    #[error("date arithmetic failed: {0}")]
    Date(#[from] jiff::Error),

    #[error("notification failed: {0}")]
    Notify(String),
}

impl From<figment::Error> for TipError {
    fn from(err: figment::Error) -> Self {
        TipError::Settings(Box::new(err))
    }
}

pub type Result<T> = std::result::Result<T, TipError>;
