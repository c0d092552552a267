use std::path::PathBuf;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::store::HostContext;

pub const CONFIG_FILE: &str = "tomorrow-tip.toml";
pub const ENV_PREFIX: &str = "TOMORROW_TIP_";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    pub base_directory: Option<PathBuf>,
    pub schedule_name: Option<String>,
    /// Reminder settings. Defaults to the config file itself.
    pub settings_file: PathBuf,
    /// Host file with `[Temp] set_schedule` and `[Date] start_date`.
    pub config_center_file: Option<PathBuf>,
    pub tick_interval_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_directory: None,
            schedule_name: None,
            settings_file: PathBuf::from(CONFIG_FILE),
            config_center_file: None,
            tick_interval_ms: 1000,
        }
    }
}

impl Config {
    pub fn figment() -> Figment {
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file(CONFIG_FILE))
            .merge(Env::prefixed(ENV_PREFIX))
    }

    pub fn load() -> Result<Self> {
        Ok(Self::figment().extract()?)
    }

    pub fn host_context(&self) -> HostContext {
        HostContext {
            schedule_name: self.schedule_name.clone(),
            base_directory: self.base_directory.clone(),
        }
    }
}
