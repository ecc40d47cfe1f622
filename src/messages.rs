use serde::{Deserialize, Serialize};
use std::fmt;

/// Converted INA219 readings
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq)]
pub struct Measurements {
    /// Bus voltage (V)
    pub bus_voltage: f64,
    /// Voltage across the shunt resistor (V)
    pub shunt_voltage: f64,
    /// Current through the shunt (A)
    pub current: f64,
    /// Power delivered to the load (W)
    pub power: f64,
}

impl fmt::Display for Measurements {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "BusVolts: {:.3} V ShuntVolts: {:.5} V Current: {:.4} A Power: {:.3} W",
            self.bus_voltage, self.shunt_voltage, self.current, self.power
        )
    }
}

/// Header metadata attached to every published sample
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Header {
    /// Unique device identifier
    pub device_id: String,
    /// Sensor identifier from the config file (e.g., "battery", "solar")
    pub sensor_id: String,
    /// Sequence number for message ordering
    pub seq: u64,
    /// UTC timestamp in nanoseconds
    pub t_utc_ns: u64,
    /// Message schema version for evolution
    pub schema_v: u16,
}

impl Header {
    /// Create a new header stamped with the current time
    pub fn new(device_id: String, sensor_id: String, seq: u64) -> Self {
        use std::time::{SystemTime, UNIX_EPOCH};

        let now_utc = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos() as u64;

        Self {
            device_id,
            sensor_id,
            seq,
            t_utc_ns: now_utc,
            schema_v: 1,
        }
    }
}

/// One sample published by a sampler task
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct PowerMessage {
    pub h: Header,
    #[serde(flatten)]
    pub measurements: Measurements,
}

impl PowerMessage {
    pub fn sensor_id(&self) -> &str {
        &self.h.sensor_id
    }

    /// Serialize to JSON for debugging
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
