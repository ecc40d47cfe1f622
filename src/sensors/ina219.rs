use crate::bus::i2c::I2CBus;
use crate::bus::WordBus;
use crate::config::SensorEntry;
use crate::errors::SensorError;
use crate::messages::Measurements;
use crate::registers::{
    Configuration, Register, BUS_FLAG_CONVERSION_READY, BUS_FLAG_MATH_OVERFLOW, CALIBRATION_VALUE,
    CURRENT_LSB, POWER_LSB, SHUNT_VOLTAGE_LSB,
};
use std::fmt;
use tracing::{debug, info};

/// Bus voltage register to volts. Bits 2:0 are not part of the value and are
/// dropped before it is scaled, so the result is never negative.
pub fn bus_voltage(raw: u16) -> f64 {
    f64::from(((raw >> 3) as i16) * 4) * 0.001
}

/// Shunt voltage register to volts
pub fn shunt_voltage(raw: u16) -> f64 {
    f64::from(raw as i16) * SHUNT_VOLTAGE_LSB
}

/// Current register to amps, valid for CALIBRATION_VALUE only
pub fn current(raw: u16) -> f64 {
    f64::from(raw as i16) * CURRENT_LSB
}

/// Power register to watts, valid for CALIBRATION_VALUE only
pub fn power(raw: u16) -> f64 {
    f64::from(raw as i16) * POWER_LSB
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitState {
    Uninitialized,
    Initialized,
}

/// Driver for one INA219 chip
///
/// No I/O happens until the first [`Ina219::fetch`], which writes the
/// configuration and calibration registers once and then reads the four
/// measurement registers. Later fetches only read.
pub struct Ina219<B = I2CBus> {
    bus: B,
    address: u8,
    configuration: Configuration,
    calibration: u16,
    state: InitState,
    check_overflow: bool,
    measurements: Measurements,
    bus_flags: u16,
}

impl Ina219<I2CBus> {
    /// Binds `/dev/i2c-<bus_number>` without opening it
    pub fn new(address: u8, bus_number: u8) -> Self {
        Self::with_bus(address, I2CBus::new(bus_number))
    }

    pub fn from_entry(entry: &SensorEntry) -> Self {
        Self::new(entry.address, entry.bus)
            .with_configuration(entry.configuration)
            .with_overflow_check(entry.check_overflow)
    }
}

impl<B: WordBus> Ina219<B> {
    pub fn with_bus(address: u8, bus: B) -> Self {
        Self {
            bus,
            address,
            configuration: Configuration::default(),
            calibration: CALIBRATION_VALUE,
            state: InitState::Uninitialized,
            check_overflow: false,
            measurements: Measurements::default(),
            bus_flags: 0,
        }
    }

    /// Replaces the configuration written at initialization
    pub fn with_configuration(mut self, configuration: Configuration) -> Self {
        self.configuration = configuration;
        self
    }

    /// Makes `fetch` fail with `MathOverflow` when the chip flags it.
    /// Off by default.
    pub fn with_overflow_check(mut self, enabled: bool) -> Self {
        self.check_overflow = enabled;
        self
    }

    pub fn address(&self) -> u8 {
        self.address
    }

    pub fn configuration(&self) -> Configuration {
        self.configuration
    }

    pub fn configuration_word(&self) -> u16 {
        self.configuration.bits()
    }

    pub fn calibration(&self) -> u16 {
        self.calibration
    }

    pub fn state(&self) -> InitState {
        self.state
    }

    pub fn is_initialized(&self) -> bool {
        self.state == InitState::Initialized
    }

    pub fn measurements(&self) -> Measurements {
        self.measurements
    }

    pub fn bus_voltage(&self) -> f64 {
        self.measurements.bus_voltage
    }

    pub fn shunt_voltage(&self) -> f64 {
        self.measurements.shunt_voltage
    }

    pub fn current(&self) -> f64 {
        self.measurements.current
    }

    pub fn power(&self) -> f64 {
        self.measurements.power
    }

    /// CNVR flag from the last bus voltage read
    pub fn conversion_ready(&self) -> bool {
        self.bus_flags & BUS_FLAG_CONVERSION_READY != 0
    }

    /// OVF flag from the last bus voltage read
    pub fn math_overflow(&self) -> bool {
        self.bus_flags & BUS_FLAG_MATH_OVERFLOW != 0
    }

    /// Gives the bus back
    pub fn release(self) -> B {
        self.bus
    }

    /// One-line summary of the last readings
    pub fn describe(&self) -> String {
        self.to_string()
    }

    /// Initializes the chip if needed, then reads bus voltage, shunt voltage,
    /// current and power in that order.
    ///
    /// Each field is updated as soon as its register has been read. A failed
    /// transfer returns at once and leaves the remaining fields as they were.
    /// If initialization fails nothing is read, and the next call writes both
    /// registers again.
    pub fn fetch(&mut self) -> Result<(), SensorError<B::Error>> {
        if self.state == InitState::Uninitialized {
            if let Err(e) = self.initialize() {
                debug!("[ina219@{:#04x}] initialization failed: {}", self.address, e);
                return Err(e);
            }
        }

        let raw_bus = self.read(Register::BusVoltage)?;
        self.bus_flags = raw_bus & (BUS_FLAG_CONVERSION_READY | BUS_FLAG_MATH_OVERFLOW);
        self.measurements.bus_voltage = bus_voltage(raw_bus);

        let raw_shunt = self.read(Register::ShuntVoltage)?;
        self.measurements.shunt_voltage = shunt_voltage(raw_shunt);

        // Current and power are meaningless once the chip overflowed
        if self.check_overflow && self.math_overflow() {
            return Err(SensorError::MathOverflow {
                address: self.address,
            });
        }

        let raw_current = self.read(Register::Current)?;
        self.measurements.current = current(raw_current);

        let raw_power = self.read(Register::Power)?;
        self.measurements.power = power(raw_power);

        debug!("[ina219@{:#04x}] {}", self.address, self.measurements);
        Ok(())
    }

    fn initialize(&mut self) -> Result<(), SensorError<B::Error>> {
        let word = self.configuration.bits();
        self.bus
            .write_word(self.address, Register::Configuration.addr(), word)?;
        self.bus
            .write_word(self.address, Register::Calibration.addr(), self.calibration)?;
        self.state = InitState::Initialized;

        info!(
            "[ina219@{:#04x}] configured {} (word {:#06x}), calibration {}",
            self.address, self.configuration, word, self.calibration
        );
        Ok(())
    }

    fn read(&mut self, register: Register) -> Result<u16, SensorError<B::Error>> {
        match self.bus.read_word(self.address, register.addr()) {
            Ok(raw) => Ok(raw),
            Err(e) => {
                debug!("[ina219@{:#04x}] reading {:?} failed: {}", self.address, register, e);
                Err(SensorError::I2c(e))
            }
        }
    }
}

impl<B> fmt::Display for Ina219<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.measurements)
    }
}
