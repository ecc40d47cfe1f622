pub mod sensor_config;

pub use sensor_config::{config_path, load_sensor_config, parse_sensor_config, SensorConfig, SensorEntry};
