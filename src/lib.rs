//! Blocking driver for the Bosch BMP180 barometric pressure and temperature
//! sensor, generic over the [`embedded-hal`] 1.0 I²C and delay traits.
//!
//! ```rust,ignore
//! use esp32s3_bmp180::bmp180::{Bmp180, config::ResolutionMode};
//!
//! let mut baro = Bmp180::new(i2c, delay, ResolutionMode::Standard)?;
//! let temperature = baro.read_temperature()?;
//! let pressure = baro.read_pressure()?;
//! let altitude = baro.calculate_absolute_altitude()?;
//! ```
//!
//! [`embedded-hal`]: https://docs.rs/embedded-hal

#![cfg_attr(not(test), no_std)]

// Must stay first so the logging macros are visible to the modules below.
#[macro_use]
mod fmt;

pub mod bmp180;
