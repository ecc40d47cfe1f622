pub mod i2c;

#[cfg(test)]
pub(crate) mod mock;

/// Word-level register access on an I2C bus
///
/// Values are exchanged in host order. Implementations put them on the wire
/// MSB first, which is what the INA219 expects.
pub trait WordBus {
    type Error: std::error::Error + 'static;

    fn write_word(&mut self, address: u8, register: u8, value: u16) -> Result<(), Self::Error>;
    fn read_word(&mut self, address: u8, register: u8) -> Result<u16, Self::Error>;
}

/// Lets several drivers borrow one bus. Callers serialize access themselves.
impl<B: WordBus + ?Sized> WordBus for &mut B {
    type Error = B::Error;

    fn write_word(&mut self, address: u8, register: u8, value: u16) -> Result<(), Self::Error> {
        (**self).write_word(address, register, value)
    }

    fn read_word(&mut self, address: u8, register: u8) -> Result<u16, Self::Error> {
        (**self).read_word(address, register)
    }
}
