//! Driver for the TI INA219 high-side current/power monitor on Linux I2C.
//!
//! ```no_run
//! use ina219_monitor::Ina219;
//!
//! let mut ina = Ina219::new(0x40, 1);
//! ina.fetch()?;
//! println!("{}", ina.describe());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

// Public modules
pub mod bus;
pub mod config;
pub mod errors;
pub mod messages;
pub mod registers;
pub mod scheduler;
pub mod sensors;

// Re-export commonly used types
pub use bus::i2c::{I2CBus, I2CError};
pub use bus::WordBus;
pub use config::{load_sensor_config, SensorConfig};
pub use errors::{ConfigError, SensorError, SensorResult};
pub use messages::{Measurements, PowerMessage};
pub use registers::Configuration;
pub use scheduler::{spawn_sampler, spawn_sensor_tasks, Sampler};
pub use sensors::{Ina219, InitState};

use tracing_subscriber::EnvFilter;

/// Initialize tracing with default configuration
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();
}
