//! BMP180 calibration coefficients.
//!
//! Eleven factory-trimmed 16-bit words stored in the sensor's E²PROM
//! (registers 0xAA–0xBF, big-endian), as listed in the Bosch BMP180 datasheet
//! (BST-BMP180-DS000-09, section 3.4 "Calibration coefficients"). They are read
//! once when the driver is constructed and never change afterwards.

use embedded_hal::i2c::I2c;

use crate::bmp180::registers::{BMP180_I2C_ADDR, Bmp180Register};

/// Factory calibration coefficients used by the compensation formulas
/// (datasheet §3.5).
///
/// `ac4`, `ac5` and `ac6` are unsigned; every other word is two's complement.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CalibrationData {
    pub ac1: i16,
    pub ac2: i16,
    pub ac3: i16,
    pub ac4: u16,
    pub ac5: u16,
    pub ac6: u16,
    pub b1: i16,
    pub b2: i16,
    pub mb: i16,
    pub mc: i16,
    pub md: i16,
}

/// Decodes a signed coefficient from its register pair.
///
/// The high byte is sign-extended (values above 127 lose 256) before the low
/// byte is added, i.e. the word is read as big-endian two's complement.
pub fn decode_signed16(msb: u8, lsb: u8) -> i16 {
    let high = if msb > 127 {
        msb as i32 - 256
    } else {
        msb as i32
    };
    ((high << 8) | lsb as i32) as i16
}

/// Decodes an unsigned big-endian coefficient.
pub fn decode_unsigned16(msb: u8, lsb: u8) -> u16 {
    u16::from_be_bytes([msb, lsb])
}

impl CalibrationData {
    /// Reads all eleven coefficients, one register pair at a time.
    ///
    /// Must be called exactly once, before any measurement.
    ///
    /// # Errors
    /// Returns the bus error of the first failed read; no partial data is kept.
    pub fn read<I2C: I2c>(i2c: &mut I2C) -> Result<Self, I2C::Error> {
        let calib = CalibrationData {
            ac1: read_signed(i2c, Bmp180Register::Ac1)?,
            ac2: read_signed(i2c, Bmp180Register::Ac2)?,
            ac3: read_signed(i2c, Bmp180Register::Ac3)?,
            ac4: read_unsigned(i2c, Bmp180Register::Ac4)?,
            ac5: read_unsigned(i2c, Bmp180Register::Ac5)?,
            ac6: read_unsigned(i2c, Bmp180Register::Ac6)?,
            b1: read_signed(i2c, Bmp180Register::B1)?,
            b2: read_signed(i2c, Bmp180Register::B2)?,
            mb: read_signed(i2c, Bmp180Register::Mb)?,
            mc: read_signed(i2c, Bmp180Register::Mc)?,
            md: read_signed(i2c, Bmp180Register::Md)?,
        };

        debug!(
            "calibration: ac1={=i16} ac2={=i16} ac3={=i16} ac4={=u16} ac5={=u16} ac6={=u16} b1={=i16} b2={=i16} mb={=i16} mc={=i16} md={=i16}",
            calib.ac1,
            calib.ac2,
            calib.ac3,
            calib.ac4,
            calib.ac5,
            calib.ac6,
            calib.b1,
            calib.b2,
            calib.mb,
            calib.mc,
            calib.md
        );

        Ok(calib)
    }
}

fn read_word<I2C: I2c>(i2c: &mut I2C, reg: Bmp180Register) -> Result<[u8; 2], I2C::Error> {
    let mut buffer = [0u8; 2];
    i2c.write_read(BMP180_I2C_ADDR, &[reg as u8], &mut buffer)?;
    Ok(buffer)
}

fn read_signed<I2C: I2c>(i2c: &mut I2C, reg: Bmp180Register) -> Result<i16, I2C::Error> {
    let [msb, lsb] = read_word(i2c, reg)?;
    Ok(decode_signed16(msb, lsb))
}

fn read_unsigned<I2C: I2c>(i2c: &mut I2C, reg: Bmp180Register) -> Result<u16, I2C::Error> {
    let [msb, lsb] = read_word(i2c, reg)?;
    Ok(decode_unsigned16(msb, lsb))
}
