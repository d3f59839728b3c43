//! This is a platform-agnostic Rust driver for the CHT8305 temperature and humidity sensor, using
//! the [`embedded-hal`] traits.
//!
//! [`embedded-hal`]: https://github.com/rust-embedded/embedded-hal/tree/master/embedded-hal
//!
//! This driver allows you to:
//! - Probe the device and read temperature and humidity in one transaction.
//! - Apply calibration offsets to temperature and humidity.
//! - Read and modify the configuration register, as a whole or one field at a time
//!   (clock stretching, heater, measurement mode, resolutions, alert trigger mode, supply
//!   voltage measurement).
//! - Trigger a software reset.
//! - Set and read the temperature/humidity alert thresholds.
//! - Read the supply voltage, manufacturer ID and version ID.
//!
//! Every bus access blocks. Measurement reads are rate limited to one per
//! [`Config::min_read_interval_ms`]; the limit counts attempts, so a failing bus is not hammered.
//!
//! ## Features
//!
//! - `defmt`: Enables logging using the `defmt` framework.
//! - `log`: Enables logging using the `log` framework.
//!
//! ## Register map
//!
//! | Register        | Address | Content                                   |
//! |-----------------|---------|-------------------------------------------|
//! | Temperature     | 0x00    | raw temperature (first half of 4B read)   |
//! | Humidity        | 0x01    | raw humidity                              |
//! | Config          | 0x02    | see [`ConfigRegister`]                    |
//! | Alert           | 0x03    | packed thresholds, see [`AlertLevels`]    |
//! | Voltage         | 0x04    | raw supply voltage                        |
//! | Version ID      | 0xFE    | device specific                           |
//! | Manufacturer ID | 0xFF    | 0x5959                                    |
//!
//! ## Example
//!
//! ```
//! # use core::cell::Cell;
//! # use embedded_hal_mock::eh1::delay::NoopDelay;
//! # use embedded_hal_mock::eh1::i2c::{Mock as I2cMock, Transaction};
//! use cht8305::{Cht8305, Clock, Config};
//!
//! // Platform-specific millisecond counter
//! struct Millis<'a>(&'a Cell<u32>);
//! impl Clock for Millis<'_> {
//!     fn now_ms(&mut self) -> u32 {
//!         self.0.get()
//!     }
//! }
//!
//! # let expectations = [
//! #     Transaction::write(0x40, vec![]),
//! #     Transaction::write(0x40, vec![0x00]),
//! #     Transaction::read(0x40, vec![0x66, 0x66, 0x80, 0x00]),
//! # ];
//! # let i2c = I2cMock::new(&expectations);
//! # let delay = NoopDelay::new();
//! let ticks = Cell::new(0);
//! let mut cht8305 = Cht8305::new(i2c, delay, Millis(&ticks), Config::default());
//! cht8305.connect(0x40).unwrap();
//!
//! let reading = cht8305.read().unwrap();
//! println!("{:.1} °C, {:.1} %RH", reading.centigrade, reading.humidity_percent);
//! assert!((cht8305.temperature() - 26.0).abs() < 0.01);
//! assert!((cht8305.humidity() - 50.0).abs() < 0.01);
//!
//! // A second read within a second is refused without touching the bus
//! assert!(cht8305.read().is_err());
//! # let (mut i2c, _, _) = cht8305.destroy();
//! # i2c.done();
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![cfg_attr(not(test), no_std)]

#[cfg(all(feature = "defmt", feature = "log"))]
compile_error!("Features \"defmt\" and \"log\" are mutually exclusive and cannot be enabled together");

pub mod codec;
mod device_impl;
mod hw_def;
mod types;

pub use crate::{hw_def::*, types::*};

/// CHT8305 device driver
///
/// Owns the bus, a delay provider and a millisecond clock. Share the bus between drivers with
/// one of the `embedded-hal-bus` wrappers.
#[derive(Debug)]
pub struct Cht8305<I2C, Delay, Clk> {
    pub(crate) i2c: I2C,
    pub(crate) delay: Delay,
    pub(crate) clock: Clk,
    pub(crate) config: Config,
    pub(crate) address: u8,
    pub(crate) state: SessionState,
    pub(crate) last_read: Option<u32>,
    pub(crate) temperature: f32,
    pub(crate) humidity: f32,
    pub(crate) temp_offset: f32,
    pub(crate) hum_offset: f32,
}
