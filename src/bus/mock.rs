use super::WordBus;
use std::collections::HashMap;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("mock bus failure on register {register:#04x}")]
pub struct MockError {
    pub register: u8,
}

/// Register-level stand-in for an I2C bus
///
/// Reads return the value set with `set_register` (zero otherwise). Failures
/// are injected per register, either for the next N transfers or forever.
#[derive(Debug, Default)]
pub struct MockBus {
    registers: HashMap<u8, u16>,
    failures: HashMap<u8, Option<usize>>,
    pub writes: Vec<(u8, u8, u16)>,
    pub reads: Vec<(u8, u8)>,
}

impl MockBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_register(&mut self, register: u8, value: u16) {
        self.registers.insert(register, value);
    }

    pub fn fail_next(&mut self, register: u8, times: usize) {
        self.failures.insert(register, Some(times));
    }

    pub fn fail_always(&mut self, register: u8) {
        self.failures.insert(register, None);
    }

    pub fn writes_to(&self, register: u8) -> usize {
        self.writes.iter().filter(|(_, reg, _)| *reg == register).count()
    }

    fn check(&mut self, register: u8) -> Result<(), MockError> {
        match self.failures.get_mut(&register) {
            None => Ok(()),
            Some(None) => Err(MockError { register }),
            Some(Some(0)) => Ok(()),
            Some(Some(remaining)) => {
                *remaining -= 1;
                Err(MockError { register })
            }
        }
    }
}

impl WordBus for MockBus {
    type Error = MockError;

    fn write_word(&mut self, address: u8, register: u8, value: u16) -> Result<(), MockError> {
        self.check(register)?;
        self.writes.push((address, register, value));
        Ok(())
    }

    fn read_word(&mut self, address: u8, register: u8) -> Result<u16, MockError> {
        self.check(register)?;
        self.reads.push((address, register));
        Ok(self.registers.get(&register).copied().unwrap_or(0))
    }
}
