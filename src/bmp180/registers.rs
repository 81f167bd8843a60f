/// BMP180 register map (Bosch Sensortec BMP180 datasheet, BST-BMP180-DS000-09).
///
/// All addresses are 8-bit register addresses on the fixed I²C slave address
/// [`BMP180_I2C_ADDR`]. Every calibration coefficient occupies two consecutive
/// registers, MSB first.
///
/// Key groups:
/// - **Calibration** - 0xAA–0xBF (22 bytes, read-only, factory trimmed)
/// - **Control** - 0xF4 (measurement command, oversampling in bits 7:6)
/// - **Data** - 0xF6–0xF8 (MSB, LSB, XLSB of the last conversion)
/// - **ID** - 0xD0 (chip ID)
///
/// Usage example:
/// ```rust,ignore
/// let reg_addr = Bmp180Register::Control as u8;
/// i2c.write(BMP180_I2C_ADDR, &[reg_addr, Bmp180Command::ReadTemperature as u8])?;
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum Bmp180Register {
    Ac1 = 0xAA,
    Ac2 = 0xAC,
    Ac3 = 0xAE,
    Ac4 = 0xB0,
    Ac5 = 0xB2,
    Ac6 = 0xB4,
    B1 = 0xB6,
    B2 = 0xB8,
    Mb = 0xBA,
    Mc = 0xBC,
    Md = 0xBE,
    // Chip identification number, reads 0x55
    ChipId = 0xD0,
    // Conversion trigger; oss goes into bits 7:6 for pressure
    Control = 0xF4,
    // Result MSB, followed by LSB (0xF7) and XLSB (0xF8)
    Data = 0xF6,
}

/// Conversion commands written to [`Bmp180Register::Control`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum Bmp180Command {
    ReadTemperature = 0x2E,
    ReadPressure = 0x34,
}

/// Fixed I²C slave address of the BMP180.
pub const BMP180_I2C_ADDR: u8 = 0x77;
/// Value of [`Bmp180Register::ChipId`] on a genuine BMP180.
pub const BMP180_CHIP_ID: u8 = 0x55;
