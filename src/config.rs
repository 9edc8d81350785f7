use crate::error::{config_error, env_error, ReminderResult};
use dotenvy::dotenv;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default calendar to watch
pub const DEFAULT_CALENDAR_ID: &str = "primary";

/// Default location of the OAuth token file
pub const DEFAULT_TOKEN_PATH: &str = "config/google_token.json";

/// Default location of the daemon PID file
pub const DEFAULT_PID_PATH: &str = "config/meetbell.pid";

/// Optional scheduler timing overrides
pub const SCHEDULER_CONFIG_PATH: &str = "config/scheduler.toml";

/// Upper bound for every scheduler timing, one week
pub const MAX_SETTING_SECS: u64 = 7 * 24 * 60 * 60;

/// How meeting alerts are shown to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertBackend {
    /// Native dialogs through `osascript`
    Dialog,
    /// Log only, every alert counts as dismissed
    Log,
}

impl AlertBackend {
    fn parse(value: &str) -> ReminderResult<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "dialog" => Ok(AlertBackend::Dialog),
            "log" => Ok(AlertBackend::Log),
            other => Err(config_error(&format!("Unknown ALERT_BACKEND: {}", other))),
        }
    }
}

/// Timer periods and notify windows, all in seconds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerSettings {
    /// Period of the calendar fetch timer
    pub fetch_interval_secs: u64,
    /// Period of the alert check timer
    pub alert_interval_secs: u64,
    /// Alert this long before a meeting starts
    pub notify_before_secs: u64,
    /// Still alert for meetings that started at most this long ago
    pub missed_lookback_secs: u64,
    /// Fetch meetings starting up to this far ahead
    pub lookahead_secs: u64,
}

impl Default for SchedulerSettings {
    fn default() -> Self {
        Self {
            fetch_interval_secs: 180,
            alert_interval_secs: 1,
            notify_before_secs: 60,
            missed_lookback_secs: 3600,
            lookahead_secs: 300,
        }
    }
}

impl SchedulerSettings {
    /// Parse settings from TOML, missing keys keep their defaults
    pub fn from_toml(content: &str) -> ReminderResult<Self> {
        let settings: SchedulerSettings = toml::from_str(content)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Reject settings the run loop cannot work with
    pub fn validate(&self) -> ReminderResult<()> {
        if self.fetch_interval_secs == 0 {
            return Err(config_error("fetch_interval_secs must be greater than zero"));
        }
        if self.alert_interval_secs == 0 {
            return Err(config_error("alert_interval_secs must be greater than zero"));
        }

        let bounded = [
            ("fetch_interval_secs", self.fetch_interval_secs),
            ("alert_interval_secs", self.alert_interval_secs),
            ("notify_before_secs", self.notify_before_secs),
            ("missed_lookback_secs", self.missed_lookback_secs),
            ("lookahead_secs", self.lookahead_secs),
        ];
        for (name, value) in bounded {
            if value > MAX_SETTING_SECS {
                return Err(config_error(&format!(
                    "{} must be at most {} seconds, got {}",
                    name, MAX_SETTING_SECS, value
                )));
            }
        }
        Ok(())
    }

    // Accessors clamp to MAX_SETTING_SECS for settings built without `validate`

    pub fn fetch_interval(&self) -> Duration {
        Duration::from_secs(clamp_secs(self.fetch_interval_secs))
    }

    pub fn alert_interval(&self) -> Duration {
        Duration::from_secs(clamp_secs(self.alert_interval_secs))
    }

    pub fn notify_before(&self) -> chrono::Duration {
        window(self.notify_before_secs)
    }

    pub fn missed_lookback(&self) -> chrono::Duration {
        window(self.missed_lookback_secs)
    }

    pub fn lookahead(&self) -> chrono::Duration {
        window(self.lookahead_secs)
    }
}

fn clamp_secs(secs: u64) -> u64 {
    secs.min(MAX_SETTING_SECS)
}

fn window(secs: u64) -> chrono::Duration {
    // Bounded by MAX_SETTING_SECS, so the cast cannot wrap
    chrono::Duration::seconds(clamp_secs(secs) as i64)
}

/// Main configuration structure for the daemon
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Google Calendar API client ID
    pub google_client_id: String,
    /// Google Calendar API client secret
    pub google_client_secret: String,
    /// Google Calendar ID to monitor
    pub google_calendar_id: String,
    /// Where the OAuth token is stored
    pub token_path: PathBuf,
    /// Where the running daemon writes its PID
    pub pid_path: PathBuf,
    /// Alert mechanism
    pub alert_backend: AlertBackend,
    /// Scheduler timings
    pub scheduler: SchedulerSettings,
}

impl Config {
    /// Load configuration from environment and config file
    pub fn load() -> ReminderResult<Self> {
        // Load .env file if it exists
        dotenv().ok();

        let google_client_id =
            env::var("GOOGLE_CLIENT_ID").map_err(|_| env_error("GOOGLE_CLIENT_ID"))?;
        let google_client_secret =
            env::var("GOOGLE_CLIENT_SECRET").map_err(|_| env_error("GOOGLE_CLIENT_SECRET"))?;
        let google_calendar_id =
            env::var("GOOGLE_CALENDAR_ID").unwrap_or_else(|_| DEFAULT_CALENDAR_ID.to_string());

        let token_path = env::var("TOKEN_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_TOKEN_PATH));
        let pid_path = env::var("PID_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_PID_PATH));

        let alert_backend = match env::var("ALERT_BACKEND") {
            Ok(value) => AlertBackend::parse(&value)?,
            Err(_) => AlertBackend::Dialog,
        };

        let scheduler = Self::load_scheduler_settings(Path::new(SCHEDULER_CONFIG_PATH))?;

        Ok(Config {
            google_client_id,
            google_client_secret,
            google_calendar_id,
            token_path,
            pid_path,
            alert_backend,
            scheduler,
        })
    }

    /// Read scheduler timings from `path`, falling back to defaults if it is absent
    pub fn load_scheduler_settings(path: &Path) -> ReminderResult<SchedulerSettings> {
        match fs::read_to_string(path) {
            Ok(content) => SchedulerSettings::from_toml(&content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(SchedulerSettings::default()),
            Err(e) => Err(e.into()),
        }
    }
}
