use crate::errors::{ConfigError, ConfigResult};
use crate::registers::{Configuration, ADDRESS_A0_GND};
use crate::scheduler::MAX_FREQUENCY_HZ;
use serde::Deserialize;
use std::collections::HashSet;
use std::fs;

/// Address range selectable with the A0/A1 strap pins
const ADDRESS_RANGE: std::ops::RangeInclusive<u8> = 0x40..=0x4F;

/// Root configuration struct expecting `[[sensor]]` TOML array format
#[derive(Debug, Deserialize)]
pub struct SensorConfig {
    #[serde(rename = "sensor")]
    pub sensors: Vec<SensorEntry>,
}

/// One sensor entry, matching each `[[sensor]]` section
#[derive(Debug, Deserialize)]
pub struct SensorEntry {
    pub id: String,
    /// Linux I2C adapter number, `/dev/i2c-<bus>`
    #[serde(default = "default_bus")]
    pub bus: u8,
    #[serde(default = "default_address")]
    pub address: u8,
    /// Sampling frequency in Hz
    pub frequency: Option<u32>,
    #[serde(default)]
    pub check_overflow: bool,
    #[serde(default)]
    pub configuration: Configuration,
}

fn default_bus() -> u8 {
    1
}

fn default_address() -> u8 {
    ADDRESS_A0_GND
}

/// Directory holding `sensors.toml`, from CONFIG_PATH or `config`
pub fn config_path() -> String {
    std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config".to_string())
}

/// Loads config from TOML file
pub fn load_sensor_config(path: &str) -> ConfigResult<SensorConfig> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::LoadError {
        path: path.to_string(),
        source,
    })?;
    let config = parse_sensor_config(&content)?;
    tracing::info!("[config] loaded {} sensor(s) from {}", config.sensors.len(), path);
    Ok(config)
}

/// Parses and validates config text
pub fn parse_sensor_config(content: &str) -> ConfigResult<SensorConfig> {
    let parsed: SensorConfig = toml::from_str(content)?;
    parsed.validate()?;
    Ok(parsed)
}

impl SensorConfig {
    fn validate(&self) -> ConfigResult<()> {
        let mut seen = HashSet::new();
        for s in self.sensors.iter() {
            if s.id.trim().is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: "id".to_string(),
                    reason: "sensor id must not be empty".to_string(),
                });
            }
            if !seen.insert(s.id.as_str()) {
                return Err(ConfigError::ValidationError(format!(
                    "duplicate sensor id '{}'",
                    s.id
                )));
            }
            if !ADDRESS_RANGE.contains(&s.address) {
                return Err(ConfigError::InvalidValue {
                    field: format!("{}.address", s.id),
                    reason: format!("{:#04x} is not an INA219 address (0x40..=0x4f)", s.address),
                });
            }
            if let Some(frequency) = s.frequency {
                if frequency == 0 || frequency > MAX_FREQUENCY_HZ {
                    return Err(ConfigError::InvalidValue {
                        field: format!("{}.frequency", s.id),
                        reason: format!("{} Hz is outside 1..={} Hz", frequency, MAX_FREQUENCY_HZ),
                    });
                }
            }
        }
        Ok(())
    }
}
