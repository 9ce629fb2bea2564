use core::convert::Infallible;

use embassy_futures::block_on;
use embedded_hal::digital::{ErrorType as PinErrorType, OutputPin};
use embedded_hal::i2c::{ErrorKind, NoAcknowledgeSource, Operation};
use embedded_hal_async::delay::DelayNs;
use embedded_hal_async::i2c::{ErrorType, I2c};
use gt911_touch_async::error::Error;
use gt911_touch_async::touch::{TouchController, TouchPoint, ALTERNATE_ADDRESS, DEFAULT_ADDRESS};

const REG_BASE: u16 = 0x8000;

/// Register file of a GT911 behind a fake bus.
struct FakeGt911 {
    address: u8,
    regs: [u8; 0x200],
    pointer: u16,
    writes: Vec<(u16, Vec<u8>)>,
}

impl FakeGt911 {
    fn new(address: u8) -> Self {
        let mut fake = Self {
            address,
            regs: [0; 0x200],
            pointer: 0,
            writes: Vec::new(),
        };
        // "911\0", firmware 0x1060, 480 x 272
        fake.load(0x8140, &[b'9', b'1', b'1', 0, 0x60, 0x10, 0xE0, 0x01, 0x10, 0x01]);
        fake
    }

    fn load(&mut self, reg: u16, bytes: &[u8]) {
        let start = (reg - REG_BASE) as usize;
        self.regs[start..start + bytes.len()].copy_from_slice(bytes);
    }

    fn reg(&self, reg: u16) -> u8 {
        self.regs[(reg - REG_BASE) as usize]
    }
}

impl ErrorType for FakeGt911 {
    type Error = ErrorKind;
}

impl I2c for FakeGt911 {
    async fn transaction(
        &mut self,
        address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        if address != self.address {
            return Err(ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address));
        }
        for op in operations {
            match op {
                Operation::Write(bytes) => {
                    self.pointer = u16::from_be_bytes([bytes[0], bytes[1]]);
                    if bytes.len() > 2 {
                        let payload = bytes[2..].to_vec();
                        let pointer = self.pointer;
                        self.load(pointer, &payload);
                        self.writes.push((pointer, payload));
                    }
                }
                Operation::Read(buf) => {
                    for (i, byte) in buf.iter_mut().enumerate() {
                        *byte = self.reg(self.pointer + i as u16);
                    }
                }
            }
        }
        Ok(())
    }
}

#[derive(Default)]
struct FakePin {
    levels: Vec<bool>,
}

impl PinErrorType for FakePin {
    type Error = Infallible;
}

impl OutputPin for FakePin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.levels.push(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.levels.push(true);
        Ok(())
    }
}

#[derive(Default)]
struct FakeDelay {
    total_ns: u64,
}

impl DelayNs for FakeDelay {
    async fn delay_ns(&mut self, ns: u32) {
        self.total_ns += ns as u64;
    }
}

fn point_record(track_id: u8, x: u16, y: u16, size: u16) -> [u8; 8] {
    let [x0, x1] = x.to_le_bytes();
    let [y0, y1] = y.to_le_bytes();
    let [s0, s1] = size.to_le_bytes();
    [track_id, x0, x1, y0, y1, s0, s1, 0]
}

#[test]
fn init_resets_and_reads_the_product_block() {
    let mut touch = TouchController::new(
        FakeGt911::new(DEFAULT_ADDRESS),
        Some(FakePin::default()),
        FakeDelay::default(),
    );
    let info = block_on(touch.init()).unwrap();
    assert_eq!(&info.product_id, b"911\0");
    assert_eq!(info.firmware_version, 0x1060);
    assert_eq!(info.x_resolution, 480);
    assert_eq!(info.y_resolution, 272);

    let (_, rst, delay) = touch.release();
    assert_eq!(rst.unwrap().levels, vec![false, true]);
    assert!(delay.total_ns >= 60_000_000);
}

#[test]
fn init_without_reset_pin_skips_the_pulse() {
    let mut touch = TouchController::new(
        FakeGt911::new(DEFAULT_ADDRESS),
        None::<FakePin>,
        FakeDelay::default(),
    );
    assert!(block_on(touch.init()).is_ok());
    let (_, _, delay) = touch.release();
    assert_eq!(delay.total_ns, 0);
}

#[test]
fn init_rejects_other_controllers() {
    let mut bus = FakeGt911::new(DEFAULT_ADDRESS);
    bus.load(0x8140, b"928\0");
    let mut touch = TouchController::new(bus, None::<FakePin>, FakeDelay::default());
    match block_on(touch.init()) {
        Err(Error::UnexpectedProductId(id)) => assert_eq!(&id, b"928\0"),
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn wrong_address_is_an_i2c_error() {
    let mut touch = TouchController::new(
        FakeGt911::new(ALTERNATE_ADDRESS),
        None::<FakePin>,
        FakeDelay::default(),
    );
    assert!(matches!(
        block_on(touch.init()),
        Err(Error::I2c(ErrorKind::NoAcknowledge(_)))
    ));

    let mut touch = touch.with_address(ALTERNATE_ADDRESS);
    assert!(block_on(touch.init()).is_ok());
}

#[test]
fn no_report_until_the_buffer_is_ready() {
    let mut touch = TouchController::new(
        FakeGt911::new(DEFAULT_ADDRESS),
        None::<FakePin>,
        FakeDelay::default(),
    );
    assert_eq!(block_on(touch.read_touches()).unwrap(), None);
    assert_eq!(block_on(touch.read_first()).unwrap(), None);

    let (bus, _, _) = touch.release();
    assert!(bus.writes.is_empty(), "status must not be cleared without a report");
}

#[test]
fn reads_points_and_acknowledges_the_report() {
    let mut bus = FakeGt911::new(DEFAULT_ADDRESS);
    bus.load(0x814E, &[0x82]);
    bus.load(0x814F, &point_record(0, 120, 45, 30));
    bus.load(0x8157, &point_record(1, 400, 260, 18));
    let mut touch = TouchController::new(bus, None::<FakePin>, FakeDelay::default());

    let points = block_on(touch.read_touches()).unwrap().unwrap();
    assert_eq!(
        points.as_slice(),
        &[
            TouchPoint {
                track_id: 0,
                x: 120,
                y: 45,
                size: 30
            },
            TouchPoint {
                track_id: 1,
                x: 400,
                y: 260,
                size: 18
            },
        ]
    );

    let (bus, _, _) = touch.release();
    assert_eq!(bus.writes, vec![(0x814E, vec![0])]);
    assert_eq!(bus.reg(0x814E), 0);
}

#[test]
fn ready_report_without_points_means_released() {
    let mut bus = FakeGt911::new(DEFAULT_ADDRESS);
    bus.load(0x814E, &[0x80]);
    let mut touch = TouchController::new(bus, None::<FakePin>, FakeDelay::default());
    assert_eq!(block_on(touch.read_first()).unwrap(), Some(None));
}

#[test]
fn first_point_coordinates() {
    let mut bus = FakeGt911::new(DEFAULT_ADDRESS);
    bus.load(0x814E, &[0x81]);
    bus.load(0x814F, &point_record(3, 17, 250, 9));
    let mut touch = TouchController::new(bus, None::<FakePin>, FakeDelay::default());
    assert_eq!(block_on(touch.read_first()).unwrap(), Some(Some((17, 250))));
}

#[test]
fn implausible_point_count_is_dropped() {
    let mut bus = FakeGt911::new(DEFAULT_ADDRESS);
    bus.load(0x814E, &[0x8F]);
    let mut touch = TouchController::new(bus, None::<FakePin>, FakeDelay::default());
    let points = block_on(touch.read_touches()).unwrap().unwrap();
    assert!(points.is_empty());
}
