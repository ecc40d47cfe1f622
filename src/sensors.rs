pub mod ina219;

pub use self::ina219::{Ina219, InitState};
