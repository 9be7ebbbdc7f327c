use std::env;
use tracing::warn;

/// Raw schedule defaults as read from the environment.
///
/// Times stay as strings here; the schedule cell validates them when it
/// builds its `ScheduleDefaults`.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleSettings {
    pub working_days: Vec<String>,
    pub work_start: String,
    pub work_end: String,
    pub break_start: Option<String>,
    pub break_end: Option<String>,
    pub slot_granularity_minutes: i32,
}

impl Default for ScheduleSettings {
    fn default() -> Self {
        Self {
            working_days: ["Mon", "Tue", "Wed", "Thu", "Fri"]
                .iter()
                .map(|d| d.to_string())
                .collect(),
            work_start: "09:00".to_string(),
            work_end: "17:00".to_string(),
            break_start: Some("12:00".to_string()),
            break_end: Some("13:00".to_string()),
            slot_granularity_minutes: 30,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server_host: String,
    pub server_port: u16,
    /// `None` when defaults are disabled: doctors must then carry a full schedule.
    pub schedule_defaults: Option<ScheduleSettings>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server_host: "0.0.0.0".to_string(),
            server_port: 3000,
            schedule_defaults: Some(ScheduleSettings::default()),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let fallback = ScheduleSettings::default();

        let server_host = env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let server_port = parse_or_warn("SERVER_PORT", 3000u16);

        let defaults_enabled = parse_or_warn("SCHEDULE_DEFAULTS_ENABLED", true);
        let schedule_defaults = if defaults_enabled {
            Some(ScheduleSettings {
                working_days: working_days_or_warn(
                    env::var("DEFAULT_WORKING_DAYS").ok(),
                    fallback.working_days,
                ),
                work_start: env::var("DEFAULT_WORK_START").unwrap_or(fallback.work_start),
                work_end: env::var("DEFAULT_WORK_END").unwrap_or(fallback.work_end),
                break_start: optional_var("DEFAULT_BREAK_START", fallback.break_start),
                break_end: optional_var("DEFAULT_BREAK_END", fallback.break_end),
                slot_granularity_minutes: parse_or_warn(
                    "DEFAULT_SLOT_GRANULARITY_MINUTES",
                    fallback.slot_granularity_minutes,
                ),
            })
        } else {
            warn!("Schedule defaults disabled, doctors without a full schedule will be rejected");
            None
        };

        Self {
            server_host,
            server_port,
            schedule_defaults,
        }
    }

    pub fn has_schedule_defaults(&self) -> bool {
        self.schedule_defaults.is_some()
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}

fn parse_or_warn<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!("{} has invalid value '{}', using default {}", key, raw, default);
            default
        }),
        Err(_) => default,
    }
}

// An empty value explicitly clears the default.
fn optional_var(key: &str, default: Option<String>) -> Option<String> {
    match env::var(key) {
        Ok(raw) if raw.trim().is_empty() => None,
        Ok(raw) => Some(raw.trim().to_string()),
        Err(_) => default,
    }
}

// A value with no day names in it is treated as unset.
fn working_days_or_warn(raw: Option<String>, default: Vec<String>) -> Vec<String> {
    match raw {
        Some(raw) => {
            let days = split_list(&raw);
            if days.is_empty() {
                warn!(
                    "DEFAULT_WORKING_DAYS has no weekday names, using default {}",
                    default.join(",")
                );
                default
            } else {
                days
            }
        }
        None => default,
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
