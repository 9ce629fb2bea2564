//! Core implementation of the GT911 touch controller driver.

use embedded_hal::digital::OutputPin;
use embedded_hal_async::delay::DelayNs;
use embedded_hal_async::i2c::{I2c, SevenBitAddress};
use heapless::Vec;
use log::{debug, warn};

use crate::error::Error;

/// I2C address selected when INT is held low during reset.
pub const DEFAULT_ADDRESS: u8 = 0x5D;
/// I2C address selected when INT is held high during reset.
pub const ALTERNATE_ADDRESS: u8 = 0x14;
/// Number of simultaneous touch points the GT911 reports.
pub const MAX_TOUCH_POINTS: usize = 5;

// Registers from the GT911 programming guide
const REG_PRODUCT_ID: u16 = 0x8140;
const REG_STATUS: u16 = 0x814E;
const REG_FIRST_POINT: u16 = 0x814F;

const PRODUCT_INFO_LEN: usize = 10;
const POINT_RECORD_LEN: usize = 8;
const STATUS_BUFFER_READY: u8 = 0x80;
const STATUS_POINT_COUNT: u8 = 0x0F;

/// Identification block read during [`TouchController::init`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProductInfo {
    /// ASCII product id, `"911\0"` for a GT911.
    pub product_id: [u8; 4],
    /// Firmware version.
    pub firmware_version: u16,
    /// Configured x resolution.
    pub x_resolution: u16,
    /// Configured y resolution.
    pub y_resolution: u16,
}

/// Represents a single touch point with its coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TouchPoint {
    /// The tracking id the controller assigned to this finger.
    pub track_id: u8,
    /// The x-coordinate of the touch point.
    pub x: u16,
    /// The y-coordinate of the touch point.
    pub y: u16,
    /// The contact size.
    pub size: u16,
}

impl TouchPoint {
    fn parse(record: &[u8]) -> Self {
        Self {
            track_id: record[0],
            x: u16::from_le_bytes([record[1], record[2]]),
            y: u16::from_le_bytes([record[3], record[4]]),
            size: u16::from_le_bytes([record[5], record[6]]),
        }
    }
}

/// A controller for the GT911 touch interface.
pub struct TouchController<I2C, RST, D> {
    i2c: I2C,
    rst: Option<RST>,
    delay: D,
    address: u8,
}

impl<I2C, RST, D> TouchController<I2C, RST, D>
where
    I2C: I2c<SevenBitAddress>,
    RST: OutputPin,
    D: DelayNs,
{
    /// Creates a new `TouchController` at [`DEFAULT_ADDRESS`].
    ///
    /// # Arguments
    ///
    /// * `i2c` - An I2C peripheral that implements `embedded-hal-async::i2c::I2c`.
    /// * `rst` - An optional output pin for resetting the controller.
    /// * `delay` - A delay provider for the reset timing.
    pub fn new(i2c: I2C, rst: Option<RST>, delay: D) -> Self {
        Self {
            i2c,
            rst,
            delay,
            address: DEFAULT_ADDRESS,
        }
    }

    /// Talks to the controller at `address` instead.
    pub fn with_address(mut self, address: u8) -> Self {
        self.address = address;
        self
    }

    /// Gives back the bus, the reset pin and the delay.
    pub fn release(self) -> (I2C, Option<RST>, D) {
        (self.i2c, self.rst, self.delay)
    }

    /// Initializes the touch controller.
    ///
    /// Pulses the reset pin when one is present, then reads and checks the
    /// product id block.
    pub async fn init(&mut self) -> Result<ProductInfo, Error<I2C::Error, RST::Error>> {
        if let Some(rst) = &mut self.rst {
            rst.set_low().map_err(Error::Pin)?;
            self.delay.delay_ms(10).await;
            rst.set_high().map_err(Error::Pin)?;
            // The controller ignores I2C for 50ms after reset.
            self.delay.delay_ms(50).await;
        }

        let mut block = [0u8; PRODUCT_INFO_LEN];
        self.read_register(REG_PRODUCT_ID, &mut block).await?;

        let product_id = [block[0], block[1], block[2], block[3]];
        if &product_id[..3] != b"911" {
            warn!("Unexpected GT911 product id: {product_id:02x?}");
            return Err(Error::UnexpectedProductId(product_id));
        }

        let info = ProductInfo {
            product_id,
            firmware_version: u16::from_le_bytes([block[4], block[5]]),
            x_resolution: u16::from_le_bytes([block[6], block[7]]),
            y_resolution: u16::from_le_bytes([block[8], block[9]]),
        };
        debug!("GT911 found: {info:?}");
        Ok(info)
    }

    /// Reads the current touch points from the controller.
    ///
    /// Returns `None` while the controller has no new report; an empty list
    /// means every finger was lifted. Each consumed report is acknowledged
    /// so the controller can publish the next one.
    pub async fn read_touches(
        &mut self,
    ) -> Result<Option<Vec<TouchPoint, MAX_TOUCH_POINTS>>, Error<I2C::Error, RST::Error>> {
        let mut status = [0u8];
        self.read_register(REG_STATUS, &mut status).await?;
        if status[0] & STATUS_BUFFER_READY == 0 {
            return Ok(None);
        }

        let mut count = (status[0] & STATUS_POINT_COUNT) as usize;
        if count > MAX_TOUCH_POINTS {
            warn!("GT911 reported {count} touch points, ignoring the report");
            count = 0;
        }

        let mut data = [0u8; POINT_RECORD_LEN * MAX_TOUCH_POINTS];
        let data = &mut data[..count * POINT_RECORD_LEN];
        if count > 0 {
            self.read_register(REG_FIRST_POINT, data).await?;
        }
        let points: Vec<TouchPoint, MAX_TOUCH_POINTS> = data
            .chunks_exact(POINT_RECORD_LEN)
            .map(TouchPoint::parse)
            .collect();

        self.write_register(REG_STATUS, 0).await?;
        Ok(Some(points))
    }

    /// The coordinates of the first touch point of a new report.
    ///
    /// `Ok(None)` when no new report is available, `Ok(Some(None))` when the
    /// panel is not touched.
    pub async fn read_first(
        &mut self,
    ) -> Result<Option<Option<(u16, u16)>>, Error<I2C::Error, RST::Error>> {
        Ok(self
            .read_touches()
            .await?
            .map(|points| points.first().map(|point| (point.x, point.y))))
    }

    async fn read_register(
        &mut self,
        reg: u16,
        buf: &mut [u8],
    ) -> Result<(), Error<I2C::Error, RST::Error>> {
        self.i2c
            .write_read(self.address, &reg.to_be_bytes(), buf)
            .await
            .map_err(|err| {
                warn!("Error reading GT911 register {reg:#06x}: {err:?}");
                Error::I2c(err)
            })
    }

    async fn write_register(
        &mut self,
        reg: u16,
        value: u8,
    ) -> Result<(), Error<I2C::Error, RST::Error>> {
        let [hi, lo] = reg.to_be_bytes();
        self.i2c
            .write(self.address, &[hi, lo, value])
            .await
            .map_err(|err| {
                warn!("Error writing GT911 register {reg:#06x}: {err:?}");
                Error::I2c(err)
            })
    }
}
