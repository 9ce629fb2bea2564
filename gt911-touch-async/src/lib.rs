//! An asynchronous, `no_std` driver for the GT911 capacitive touch controller.
//!
//! This driver provides a `TouchController` to interact with the GT911 over
//! I2C. It resets and identifies the controller and polls the touch points it
//! reports.
//!
//! # Usage
//!
//! To use this driver, you need an I2C peripheral implementation that satisfies the
//! `embedded-hal-async::i2c::I2c` trait, an optional reset pin and an
//! `embedded-hal-async` delay.
//!
//! ```ignore
//! # #![no_std]
//! # #![no_main]
//! # use esp_hal::i2c::master::I2c;
//! # use esp_hal::gpio::{Output, Level, OutputConfig};
//! # use esp_hal::Config;
//! # use esp_hal::clock::CpuClock;
//! # use esp_hal::time::Rate;
//! # use embassy_executor::Spawner;
//! use embassy_time::Delay;
//! use gt911_touch_async::touch::TouchController;
//!
//! #[esp_hal_embassy::main]
//! async fn main(spawner: Spawner) {
//!     let peripherals = esp_hal::init(Config::default().with_cpu_clock(CpuClock::max()));
//!     let config = esp_hal::i2c::master::Config::default().with_frequency(Rate::from_khz(400));
//!     let i2c = I2c::new(peripherals.I2C0, config)
//!         .unwrap()
//!         .with_sda(peripherals.GPIO19)
//!         .with_scl(peripherals.GPIO20)
//!         .into_async();
//!     let rst = Output::new(peripherals.GPIO38, Level::High, OutputConfig::default());
//!
//!     let mut touch_controller = TouchController::new(i2c, Some(rst), Delay);
//!     let info = touch_controller.init().await.unwrap();
//!     log::info!("GT911 {:?}", info);
//!
//!     loop {
//!         if let Ok(Some(points)) = touch_controller.read_touches().await {
//!             for point in points.iter() {
//!                 log::info!("Touch: {:?}", point);
//!             }
//!         }
//!         embassy_time::Timer::after_millis(10).await;
//!     }
//! }
//! ```

#![no_std]

pub mod error;
pub mod touch;
