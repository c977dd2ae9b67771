use chrono::Weekday;
use serde::Deserialize;
use serde_with::{serde_as, DisplayFromStr};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::agenda::WeekdayClassification;
use crate::control::{WindowState, DEFAULT_WINDOW_LENGTH};
use crate::date::CalendarDate;
use crate::error::{Error, ErrorKind, Result};
use crate::recurrence::{AnniversaryPerson, HolidayRule};
use crate::store::Palette;

const CONFIG_PATH_ENV_VAR: &str = "KALENDS_CONFIG_FILE";
const APP_DIR: &str = "kalends";
const STORE_FILE: &str = "events.json";

pub const DEFAULT_WEEKDAY_NAMES: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

pub(crate) fn find_configfile_locations() -> Vec<PathBuf> {
    let mut locations = Vec::new();

    if let Ok(path) = env::var(CONFIG_PATH_ENV_VAR) {
        locations.push(PathBuf::from(path));
    }

    if let Some(dir) = dirs::config_dir() {
        locations.push(dir.join(APP_DIR).join("config.toml"));
    }

    if let Some(home) = dirs::home_dir() {
        locations.push(home.join(".kalends.toml"));
    }

    locations
}

/// Loads the configuration from `path` if given, otherwise from the first
/// existing default location. Falls back to built-in defaults.
pub fn load_suitable_config(path: Option<&Path>) -> Result<Config> {
    if let Some(path) = path {
        return Config::from_file(path);
    }

    match find_configfile_locations().into_iter().find(|p| p.is_file()) {
        Some(location) => Config::from_file(&location),
        None => {
            log::info!("No configuration file found, using defaults");
            Ok(Config::default())
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CalendarConfig {
    pub workdays: Vec<Weekday>,
    pub weekends: Vec<Weekday>,
    /// Display names, Sunday first.
    pub weekday_names: [String; 7],
    pub palette: Palette,
}

impl Default for CalendarConfig {
    fn default() -> Self {
        use Weekday::*;

        CalendarConfig {
            workdays: vec![Mon, Tue, Wed, Thu, Fri],
            weekends: vec![Sat, Sun],
            weekday_names: DEFAULT_WEEKDAY_NAMES.map(str::to_owned),
            palette: Palette::default(),
        }
    }
}

impl CalendarConfig {
    pub fn weekday_name(&self, weekday_index: u32) -> &str {
        &self.weekday_names[weekday_index as usize % 7]
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WindowConfig {
    pub default_length: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        WindowConfig {
            default_length: DEFAULT_WINDOW_LENGTH,
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StoreConfig {
    pub path: Option<PathBuf>,
}

#[serde_as]
#[derive(Clone, Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// IANA timezone deciding what "today" is; the system zone if unset.
    #[serde_as(as = "Option<DisplayFromStr>")]
    pub timezone: Option<chrono_tz::Tz>,
    pub tick_rate_ms: u64,
    pub calendar: CalendarConfig,
    pub window: WindowConfig,
    pub store: StoreConfig,
    pub holidays: Vec<HolidayRule>,
    pub people: Vec<AnniversaryPerson>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            timezone: None,
            tick_rate_ms: 1000,
            calendar: CalendarConfig::default(),
            window: WindowConfig::default(),
            store: StoreConfig::default(),
            holidays: Vec::new(),
            people: Vec::new(),
        }
    }
}

impl Config {
    pub fn from_file(path: &Path) -> Result<Self> {
        log::info!("Loading configuration from '{}'", path.display());

        let contents = fs::read_to_string(path).map_err(|e| {
            Error::new(
                ErrorKind::ConfigParse,
                &format!("could not read '{}': {}", path.display(), e),
            )
        })?;

        Self::from_toml(&contents).map_err(|e| {
            let reason = e.message.clone().unwrap_or_else(|| e.kind.as_str());
            e.with_msg(&format!("{}: {}", path.display(), reason))
        })
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;

        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        WeekdayClassification::new(&self.calendar.workdays, &self.calendar.weekends)?;

        for rule in &self.holidays {
            rule.validate()?;
        }

        for person in &self.people {
            person.validate()?;
        }

        if self.tick_rate_ms == 0 {
            return Err(Error::new(
                ErrorKind::ConfigParse,
                "tick_rate_ms must be positive",
            ));
        }

        Ok(())
    }

    pub fn tick_rate(&self) -> Duration {
        Duration::from_millis(self.tick_rate_ms)
    }

    pub fn today(&self) -> CalendarDate {
        match &self.timezone {
            Some(tz) => CalendarDate::today(tz),
            None => CalendarDate::today_local(),
        }
    }

    pub fn initial_window(&self, today: CalendarDate) -> WindowState {
        WindowState::new(today, self.window.default_length)
    }

    /// Configured store location, or `events.json` in the user's data
    /// directory.
    pub fn store_path(&self) -> Result<PathBuf> {
        if let Some(path) = &self.store.path {
            return Ok(path.clone());
        }

        dirs::data_dir()
            .map(|dir| dir.join(APP_DIR).join(STORE_FILE))
            .ok_or_else(|| {
                Error::new(
                    ErrorKind::ConfigParse,
                    "no data directory found, set `store.path` in the configuration",
                )
            })
    }
}
