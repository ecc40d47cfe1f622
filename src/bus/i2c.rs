#[cfg(target_os = "linux")]
use i2cdev::linux::{LinuxI2CDevice, LinuxI2CError};
#[cfg(target_os = "linux")]
use i2cdev::core::I2CDevice;

use super::WordBus;

/// I2C bus error type - platform specific
#[cfg(target_os = "linux")]
pub type I2CError = LinuxI2CError;

#[cfg(not(target_os = "linux"))]
#[derive(Debug)]
pub struct I2CError(String);

#[cfg(not(target_os = "linux"))]
impl std::fmt::Display for I2CError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "I2C not supported on this platform: {}", self.0)
    }
}

#[cfg(not(target_os = "linux"))]
impl std::error::Error for I2CError {}

/// Device node for a numbered Linux I2C adapter
pub fn bus_path(bus_number: u8) -> String {
    format!("/dev/i2c-{}", bus_number)
}

/// I2C bus implementation
///
/// Binding a bus never touches the device node. It is opened on the first
/// transfer, and an open failure is reported by that transfer. A later
/// transfer tries to open it again.
#[cfg(target_os = "linux")]
pub struct I2CBus {
    path: String,
    device: Option<LinuxI2CDevice>,
}

#[cfg(not(target_os = "linux"))]
pub struct I2CBus {
    path: String,
}

impl I2CBus {
    pub fn new(bus_number: u8) -> Self {
        Self::from_path(&bus_path(bus_number))
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

#[cfg(target_os = "linux")]
impl I2CBus {
    pub fn from_path(path: &str) -> Self {
        Self {
            path: path.to_string(),
            device: None,
        }
    }

    pub fn is_open(&self) -> bool {
        self.device.is_some()
    }

    fn select(&mut self, address: u8) -> Result<&mut LinuxI2CDevice, I2CError> {
        let device = match self.device.take() {
            Some(device) => device,
            None => {
                tracing::debug!("[i2c] opening {}", self.path);
                LinuxI2CDevice::new(&self.path, u16::from(address))?
            }
        };
        let device = self.device.insert(device);
        device.set_slave_address(u16::from(address))?;
        Ok(device)
    }
}

#[cfg(target_os = "linux")]
impl WordBus for I2CBus {
    type Error = I2CError;

    fn write_word(&mut self, address: u8, register: u8, value: u16) -> Result<(), I2CError> {
        // SMBus words go LSB first
        self.select(address)?
            .smbus_write_word_data(register, value.swap_bytes())
    }

    fn read_word(&mut self, address: u8, register: u8) -> Result<u16, I2CError> {
        let word = self.select(address)?.smbus_read_word_data(register)?;
        Ok(word.swap_bytes())
    }
}

#[cfg(not(target_os = "linux"))]
impl I2CBus {
    pub fn from_path(path: &str) -> Self {
        Self { path: path.to_string() }
    }

    pub fn is_open(&self) -> bool {
        false
    }
}

#[cfg(not(target_os = "linux"))]
impl WordBus for I2CBus {
    type Error = I2CError;

    fn write_word(&mut self, _address: u8, _register: u8, _value: u16) -> Result<(), I2CError> {
        Err(I2CError("I2C is only supported on Linux".to_string()))
    }

    fn read_word(&mut self, _address: u8, _register: u8) -> Result<u16, I2CError> {
        Err(I2CError("I2C is only supported on Linux".to_string()))
    }
}
