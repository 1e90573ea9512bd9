//! Runtime settings for the idle-stop workflow
//!
//! Every field defaults to the value the workflow has always run with, so a
//! missing or partial config file behaves like the built-in constants.

use crate::error::{ConfigError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;

pub const DEFAULT_REGION: &str = "ap-south-1";

/// Longest sampling window; CloudWatch keeps sub-hour datapoints for 15 days
pub const MAX_WINDOW_SECS: i64 = 15 * 24 * 60 * 60;

/// Effective configuration for one invocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Provider region
    pub region: String,

    /// Tag an instance must carry to be managed
    pub target_tag: TagSetting,

    /// Tag that unconditionally protects an instance
    pub exemption_tag: TagSetting,

    pub thresholds: IdleThresholds,

    pub sampling: SamplingSettings,

    pub schedule: ScheduleSettings,

    pub notifications: NotificationSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            region: DEFAULT_REGION.to_string(),
            target_tag: TagSetting::new("Purpose", "test"),
            exemption_tag: TagSetting::new("DoNotStop", "True"),
            thresholds: IdleThresholds::default(),
            sampling: SamplingSettings::default(),
            schedule: ScheduleSettings::default(),
            notifications: NotificationSettings::default(),
        }
    }
}

impl Settings {
    /// Parse settings from YAML text; missing keys keep their defaults
    pub fn from_yaml(content: &str) -> Result<Self> {
        // blank or comment-only files have no document to deserialize
        let has_content = content.lines().any(|line| {
            let line = line.trim();
            !line.is_empty() && !line.starts_with('#')
        });
        if !has_content {
            return Ok(Self::default());
        }

        let settings: Settings = serde_yaml::from_str(content)?;
        Ok(settings)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Apply `IDLESTOP_*` environment overrides
    ///
    /// A webhook URL supplied through the environment also enables its channel.
    pub fn apply_env_overrides(&mut self) {
        if let Some(region) = non_empty_env("IDLESTOP_REGION") {
            self.region = region;
        }
        if let Some(url) = non_empty_env("IDLESTOP_SLACK_WEBHOOK_URL") {
            self.notifications.slack = WebhookSettings::enabled(url);
        }
        if let Some(url) = non_empty_env("IDLESTOP_DISCORD_WEBHOOK_URL") {
            self.notifications.discord = WebhookSettings::enabled(url);
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.region.trim().is_empty() {
            return Err(ConfigError::Invalid("region must not be empty".to_string()));
        }
        for (name, tag) in [
            ("target_tag", &self.target_tag),
            ("exemption_tag", &self.exemption_tag),
        ] {
            if tag.key.trim().is_empty() {
                return Err(ConfigError::Invalid(format!("{name}.key must not be empty")));
            }
        }
        if self.sampling.window_secs <= 0 || self.sampling.window_secs > MAX_WINDOW_SECS {
            return Err(ConfigError::Invalid(format!(
                "sampling.window_secs must be between 1 and {MAX_WINDOW_SECS}"
            )));
        }
        if self.sampling.period_secs <= 0 || self.sampling.period_secs % 60 != 0 {
            return Err(ConfigError::Invalid(
                "sampling.period_secs must be a positive multiple of 60".to_string(),
            ));
        }
        for (name, time) in [
            ("warning_at", self.schedule.warning_at),
            ("stop_at", self.schedule.stop_at),
        ] {
            if TriggerTime::new(time.hour, time.minute).is_err() {
                return Err(ConfigError::Invalid(format!(
                    "schedule.{name} must be a time of day, got {}:{}",
                    time.hour, time.minute
                )));
            }
        }
        for (name, webhook) in [
            ("slack", &self.notifications.slack),
            ("discord", &self.notifications.discord),
        ] {
            if webhook.enabled && webhook.url.trim().is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "notifications.{name} is enabled but has no url"
                )));
            }
        }
        Ok(())
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Tag key/value pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagSetting {
    pub key: String,
    pub value: String,
}

impl TagSetting {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

impl std::fmt::Display for TagSetting {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}={}", self.key, self.value)
    }
}

/// Upper bounds (exclusive) below which an instance counts as idle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IdleThresholds {
    /// Average CPU utilization, percent
    pub cpu_percent: f64,
    /// Average network in, bytes
    pub network_in_bytes: f64,
    /// Average network out, bytes
    pub network_out_bytes: f64,
    /// Average disk read operations
    pub disk_read_ops: f64,
    /// Average disk write operations
    pub disk_write_ops: f64,
}

impl Default for IdleThresholds {
    fn default() -> Self {
        Self {
            cpu_percent: 5.0,
            network_in_bytes: 5000.0,
            network_out_bytes: 5000.0,
            disk_read_ops: 1.0,
            disk_write_ops: 1.0,
        }
    }
}

/// Metric sampling window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplingSettings {
    /// Trailing window length, seconds
    pub window_secs: i64,
    /// Aggregation bucket length, seconds
    pub period_secs: i32,
}

impl Default for SamplingSettings {
    fn default() -> Self {
        Self {
            window_secs: 3600,
            period_secs: 300,
        }
    }
}

/// Fixed UTC times at which the scheduled path acts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleSettings {
    /// When the pre-stop warning goes out
    pub warning_at: TriggerTime,
    /// When idle instances are stopped
    pub stop_at: TriggerTime,
}

impl Default for ScheduleSettings {
    fn default() -> Self {
        Self {
            warning_at: TriggerTime { hour: 15, minute: 0 },
            stop_at: TriggerTime { hour: 16, minute: 0 },
        }
    }
}

/// Hour and minute of day (UTC), written as `HH:MM`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TriggerTime {
    pub hour: u32,
    pub minute: u32,
}

impl TriggerTime {
    pub fn new(hour: u32, minute: u32) -> Result<Self> {
        if hour > 23 || minute > 59 {
            return Err(ConfigError::InvalidTriggerTime(format!(
                "{hour:02}:{minute:02}"
            )));
        }
        Ok(Self { hour, minute })
    }

    pub fn matches(&self, hour: u32, minute: u32) -> bool {
        self.hour == hour && self.minute == minute
    }
}

impl FromStr for TriggerTime {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || ConfigError::InvalidTriggerTime(s.to_string());
        let (hour, minute) = s.trim().split_once(':').ok_or_else(invalid)?;
        let hour = hour.parse::<u32>().map_err(|_| invalid())?;
        let minute = minute.parse::<u32>().map_err(|_| invalid())?;
        Self::new(hour, minute).map_err(|_| invalid())
    }
}

impl TryFrom<String> for TriggerTime {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<TriggerTime> for String {
    fn from(value: TriggerTime) -> Self {
        value.to_string()
    }
}

impl std::fmt::Display for TriggerTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

/// Webhook channels
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationSettings {
    pub slack: WebhookSettings,
    pub discord: WebhookSettings,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WebhookSettings {
    pub enabled: bool,
    pub url: String,
}

impl WebhookSettings {
    pub fn enabled(url: impl Into<String>) -> Self {
        Self {
            enabled: true,
            url: url.into(),
        }
    }
}
