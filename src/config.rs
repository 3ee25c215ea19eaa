use log::info;
use std::env;
use std::str::FromStr;

use crate::models::LedState;

const DEFAULT_POLL_INTERVAL_SECS: u64 = 2;
const DEFAULT_SENSOR_CACHE_SIZE: usize = 60;
const DEFAULT_SCAN_DURATION_SECS: u64 = 10;
const MAX_SENSOR_CACHE_SIZE: usize = 10_000;

#[derive(Debug, Clone, PartialEq)]
pub struct MonitorConfig {
    /// Seconds between reads of the polled characteristics
    pub poll_interval_secs: u64,
    /// Only peripherals whose name starts with this (case-insensitive) are used.
    /// Empty means no filtering.
    pub accessory_name_prefix: String,
    /// Number of values kept in each sensor history
    pub sensor_cache_size: usize,
    pub scan_duration_secs: u64,
    pub notify_acceleration: bool,
    /// LED and buzzer state written right after connecting
    pub led_on_connect: Option<LedState>,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        MonitorConfig {
            poll_interval_secs: DEFAULT_POLL_INTERVAL_SECS,
            accessory_name_prefix: String::new(),
            sensor_cache_size: DEFAULT_SENSOR_CACHE_SIZE,
            scan_duration_secs: DEFAULT_SCAN_DURATION_SECS,
            notify_acceleration: true,
            led_on_connect: None,
        }
    }
}

impl MonitorConfig {
    pub fn new() -> Result<Self, Box<dyn std::error::Error>> {
        // Load environment variables
        dotenv::dotenv().ok();

        let config = Self::from_lookup(|key| env::var(key).ok())?;

        info!(
            "Poll interval: {}s, name prefix: '{}', history size: {}",
            config.poll_interval_secs, config.accessory_name_prefix, config.sensor_cache_size
        );

        Ok(config)
    }

    /// Build a configuration from a variable lookup, using defaults for unset keys
    pub fn from_lookup<F>(lookup: F) -> Result<Self, Box<dyn std::error::Error>>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = MonitorConfig::default();

        if let Some(value) = lookup("DEVKIT_POLL_INTERVAL") {
            config.poll_interval_secs = parse_number("DEVKIT_POLL_INTERVAL", &value)?;
            if config.poll_interval_secs == 0 {
                return Err("DEVKIT_POLL_INTERVAL must be at least 1 second".into());
            }
        }

        if let Some(value) = lookup("DEVKIT_NAME_PREFIX") {
            config.accessory_name_prefix = value.trim().to_string();
        }

        if let Some(value) = lookup("DEVKIT_SENSOR_CACHE_SIZE") {
            config.sensor_cache_size = parse_number("DEVKIT_SENSOR_CACHE_SIZE", &value)?;
            if config.sensor_cache_size > MAX_SENSOR_CACHE_SIZE {
                return Err(format!(
                    "DEVKIT_SENSOR_CACHE_SIZE must be at most {}",
                    MAX_SENSOR_CACHE_SIZE
                )
                .into());
            }
        }

        if let Some(value) = lookup("DEVKIT_SCAN_DURATION") {
            config.scan_duration_secs = parse_number("DEVKIT_SCAN_DURATION", &value)?;
        }

        if let Some(value) = lookup("DEVKIT_NOTIFY_ACCELERATION") {
            config.notify_acceleration = match value.trim().to_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => true,
                "0" | "false" | "no" | "off" => false,
                other => {
                    return Err(format!("Invalid DEVKIT_NOTIFY_ACCELERATION: '{}'", other).into())
                }
            };
        }

        if let Some(value) = lookup("DEVKIT_LED") {
            config.led_on_connect = Some(parse_led_state(&value)?);
        }

        Ok(config)
    }

    /// Check a peripheral name against the configured prefix
    ///
    /// Unnamed peripherals never match, even with an empty prefix.
    pub fn matches_name(&self, name: Option<&str>) -> bool {
        match name {
            Some(name) => name
                .to_uppercase()
                .starts_with(&self.accessory_name_prefix.to_uppercase()),
            None => false,
        }
    }
}

fn parse_number<T: FromStr>(key: &str, value: &str) -> Result<T, Box<dyn std::error::Error>> {
    value
        .trim()
        .parse()
        .map_err(|_| format!("Invalid {}: '{}' is not a valid number", key, value).into())
}

/// Parse a comma separated list of outputs to turn on, e.g. `red,buzzer`, or `off`
fn parse_led_state(value: &str) -> Result<LedState, Box<dyn std::error::Error>> {
    let mut state = LedState::default();

    for part in value.split(',') {
        match part.trim().to_lowercase().as_str() {
            "" | "off" => {}
            "red" => state.red = true,
            "green" => state.green = true,
            "blue" => state.blue = true,
            "white" => state.white = true,
            "buzzer" => state.buzzer = true,
            other => return Err(format!("Unknown output '{}' in DEVKIT_LED", other).into()),
        }
    }

    Ok(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<MonitorConfig, Box<dyn std::error::Error>> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        MonitorConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config, MonitorConfig::default());
        assert_eq!(config.poll_interval_secs, 2);
        assert_eq!(config.accessory_name_prefix, "");
        assert_eq!(config.sensor_cache_size, 60);
    }

    #[test]
    fn reads_all_variables() {
        let config = config_from(&[
            ("DEVKIT_POLL_INTERVAL", "5"),
            ("DEVKIT_NAME_PREFIX", " DevEdge "),
            ("DEVKIT_SENSOR_CACHE_SIZE", "120"),
            ("DEVKIT_SCAN_DURATION", "3"),
            ("DEVKIT_NOTIFY_ACCELERATION", "off"),
            ("DEVKIT_LED", "red, buzzer"),
        ])
        .unwrap();

        assert_eq!(config.poll_interval_secs, 5);
        assert_eq!(config.accessory_name_prefix, "DevEdge");
        assert_eq!(config.sensor_cache_size, 120);
        assert_eq!(config.scan_duration_secs, 3);
        assert!(!config.notify_acceleration);
        assert_eq!(
            config.led_on_connect.map(LedState::to_byte),
            Some(LedState::RED | LedState::BUZZER)
        );
    }

    #[test]
    fn rejects_invalid_values() {
        assert!(config_from(&[("DEVKIT_POLL_INTERVAL", "soon")]).is_err());
        assert!(config_from(&[("DEVKIT_POLL_INTERVAL", "0")]).is_err());
        assert!(config_from(&[("DEVKIT_SENSOR_CACHE_SIZE", "-1")]).is_err());
        assert!(config_from(&[("DEVKIT_SENSOR_CACHE_SIZE", "10001")]).is_err());
        assert!(config_from(&[("DEVKIT_SENSOR_CACHE_SIZE", "18446744073709551615")]).is_err());
        assert!(config_from(&[("DEVKIT_NOTIFY_ACCELERATION", "maybe")]).is_err());
        assert!(config_from(&[("DEVKIT_LED", "red,purple")]).is_err());
    }

    #[test]
    fn accepts_largest_history_size() {
        let config = config_from(&[("DEVKIT_SENSOR_CACHE_SIZE", "10000")]).unwrap();
        assert_eq!(config.sensor_cache_size, 10_000);
    }

    #[test]
    fn led_off_means_all_off() {
        let config = config_from(&[("DEVKIT_LED", "off")]).unwrap();
        assert_eq!(config.led_on_connect, Some(LedState::default()));
    }

    #[test]
    fn name_prefix_is_case_insensitive() {
        let config = MonitorConfig {
            accessory_name_prefix: "devedge".to_string(),
            ..MonitorConfig::default()
        };
        assert!(config.matches_name(Some("DevEdge-1234")));
        assert!(!config.matches_name(Some("Other board")));
        assert!(!config.matches_name(None));
    }

    #[test]
    fn empty_prefix_matches_any_named_peripheral() {
        let config = MonitorConfig::default();
        assert!(config.matches_name(Some("anything")));
        assert!(!config.matches_name(None));
    }
}
