//! INA219 register map, configuration bitfield and fixed calibration.

use serde::Deserialize;
use std::fmt;
use std::time::Duration;

/// Default strap address (A0 and A1 to GND)
pub const ADDRESS_A0_GND: u8 = 0x40;
/// A0 to VS, A1 to GND
pub const ADDRESS_A0_VS: u8 = 0x41;

/// Calibration register value written at initialization
pub const CALIBRATION_VALUE: u16 = 6826;

// Scale factors for CALIBRATION_VALUE; recompute them if it changes
pub const BUS_VOLTAGE_LSB: f64 = 4.0 * 0.001; // V per LSB, after dropping bits 2:0
pub const SHUNT_VOLTAGE_LSB: f64 = 0.00001; // V per LSB
pub const CURRENT_LSB: f64 = 0.0004; // A per LSB
pub const POWER_LSB: f64 = 4.0 * 0.4 * 5.0 * 0.001; // W per LSB

// Low bits of the bus voltage register
pub const BUS_FLAG_CONVERSION_READY: u16 = 0x0002;
pub const BUS_FLAG_MATH_OVERFLOW: u16 = 0x0001;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Register {
    Configuration = 0x00,
    ShuntVoltage = 0x01,
    BusVoltage = 0x02,
    Power = 0x03,
    Current = 0x04,
    Calibration = 0x05,
}

impl Register {
    pub fn addr(self) -> u8 {
        self as u8
    }
}

/// Bus voltage range, bit 13
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub enum BusVoltageRange {
    #[default]
    #[serde(rename = "16V")]
    V16,
    #[serde(rename = "32V")]
    V32,
}

impl BusVoltageRange {
    pub fn bits(self) -> u16 {
        match self {
            BusVoltageRange::V16 => 0x0000,
            BusVoltageRange::V32 => 0x2000,
        }
    }

    pub fn full_scale_volts(self) -> u8 {
        match self {
            BusVoltageRange::V16 => 16,
            BusVoltageRange::V32 => 32,
        }
    }
}

/// PGA gain and shunt full-scale range, bits 12:11
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub enum Gain {
    #[serde(rename = "40mV")]
    Div1,
    #[serde(rename = "80mV")]
    Div2,
    #[serde(rename = "160mV")]
    Div4,
    #[default]
    #[serde(rename = "320mV")]
    Div8,
}

impl Gain {
    pub fn bits(self) -> u16 {
        match self {
            Gain::Div1 => 0x0000,
            Gain::Div2 => 0x0800,
            Gain::Div4 => 0x1000,
            Gain::Div8 => 0x1800,
        }
    }

    pub fn full_scale_mv(self) -> u16 {
        match self {
            Gain::Div1 => 40,
            Gain::Div2 => 80,
            Gain::Div4 => 160,
            Gain::Div8 => 320,
        }
    }
}

/// ADC resolution and averaging. The same 4-bit code is used for the bus
/// field (bits 10:7) and the shunt field (bits 6:3).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Deserialize)]
pub enum AdcMode {
    #[serde(rename = "9bit")]
    Bits9,
    #[serde(rename = "10bit")]
    Bits10,
    #[serde(rename = "11bit")]
    Bits11,
    #[serde(rename = "12bit")]
    Bits12,
    #[serde(rename = "12bit_2x")]
    Samples2,
    #[serde(rename = "12bit_4x")]
    Samples4,
    #[serde(rename = "12bit_8x")]
    Samples8,
    #[serde(rename = "12bit_16x")]
    Samples16,
    #[serde(rename = "12bit_32x")]
    Samples32,
    #[serde(rename = "12bit_64x")]
    Samples64,
    #[serde(rename = "12bit_128x")]
    Samples128,
}

impl AdcMode {
    /// Unshifted 4-bit field code
    pub fn code(self) -> u16 {
        match self {
            AdcMode::Bits9 => 0b0000,
            AdcMode::Bits10 => 0b0001,
            AdcMode::Bits11 => 0b0010,
            // 0b0011 selects the same mode
            AdcMode::Bits12 => 0b1000,
            AdcMode::Samples2 => 0b1001,
            AdcMode::Samples4 => 0b1010,
            AdcMode::Samples8 => 0b1011,
            AdcMode::Samples16 => 0b1100,
            AdcMode::Samples32 => 0b1101,
            AdcMode::Samples64 => 0b1110,
            AdcMode::Samples128 => 0b1111,
        }
    }

    pub fn bus_bits(self) -> u16 {
        self.code() << 7
    }

    pub fn shunt_bits(self) -> u16 {
        self.code() << 3
    }

    pub fn conversion_time(self) -> Duration {
        let micros = match self {
            AdcMode::Bits9 => 84,
            AdcMode::Bits10 => 148,
            AdcMode::Bits11 => 276,
            AdcMode::Bits12 => 532,
            AdcMode::Samples2 => 1_060,
            AdcMode::Samples4 => 2_130,
            AdcMode::Samples8 => 4_260,
            AdcMode::Samples16 => 8_510,
            AdcMode::Samples32 => 17_020,
            AdcMode::Samples64 => 34_050,
            AdcMode::Samples128 => 68_100,
        };
        Duration::from_micros(micros)
    }
}

/// Operating mode, bits 2:0
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperatingMode {
    PowerDown,
    ShuntTriggered,
    BusTriggered,
    ShuntAndBusTriggered,
    AdcOff,
    ShuntContinuous,
    BusContinuous,
    #[default]
    ShuntAndBusContinuous,
}

impl OperatingMode {
    pub fn bits(self) -> u16 {
        match self {
            OperatingMode::PowerDown => 0x0000,
            OperatingMode::ShuntTriggered => 0x0001,
            OperatingMode::BusTriggered => 0x0002,
            OperatingMode::ShuntAndBusTriggered => 0x0003,
            OperatingMode::AdcOff => 0x0004,
            OperatingMode::ShuntContinuous => 0x0005,
            OperatingMode::BusContinuous => 0x0006,
            OperatingMode::ShuntAndBusContinuous => 0x0007,
        }
    }
}

/// Contents of the configuration register
///
/// The reset bit is never set from here; resetting the chip would also
/// clear the calibration register.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Configuration {
    pub bus_voltage_range: BusVoltageRange,
    pub gain: Gain,
    pub bus_adc: AdcMode,
    pub shunt_adc: AdcMode,
    pub mode: OperatingMode,
}

impl Default for Configuration {
    /// 16V range, ±320mV, 12-bit bus, 12-bit x128 shunt, continuous shunt and bus
    fn default() -> Self {
        Self {
            bus_voltage_range: BusVoltageRange::V16,
            gain: Gain::Div8,
            bus_adc: AdcMode::Bits12,
            shunt_adc: AdcMode::Samples128,
            mode: OperatingMode::ShuntAndBusContinuous,
        }
    }
}

impl Configuration {
    pub fn bits(&self) -> u16 {
        self.bus_voltage_range.bits()
            | self.gain.bits()
            | self.bus_adc.bus_bits()
            | self.shunt_adc.shunt_bits()
            | self.mode.bits()
    }
}

impl fmt::Display for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}V range, ±{}mV, bus {:?} ({}us), shunt {:?} ({}us), {:?}",
            self.bus_voltage_range.full_scale_volts(),
            self.gain.full_scale_mv(),
            self.bus_adc,
            self.bus_adc.conversion_time().as_micros(),
            self.shunt_adc,
            self.shunt_adc.conversion_time().as_micros(),
            self.mode,
        )
    }
}
