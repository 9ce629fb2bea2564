//! Error types for the GT911 driver.

use core::fmt::{self, Debug};

/// The main error type for the GT911 driver.
pub enum Error<TI2CERR, TPINERR> {
    /// An I2C transfer failed.
    I2c(TI2CERR),
    /// Driving the reset pin failed.
    Pin(TPINERR),
    /// The product id block does not identify a GT911.
    UnexpectedProductId([u8; 4]),
}

impl<TI2CERR: Debug, TPINERR: Debug> Debug for Error<TI2CERR, TPINERR> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::I2c(err) => write!(f, "I2c({err:?})"),
            Self::Pin(err) => write!(f, "Pin({err:?})"),
            Self::UnexpectedProductId(id) => write!(f, "UnexpectedProductId({id:02x?})"),
        }
    }
}
