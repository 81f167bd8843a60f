pub mod calibration;
pub mod compensation;
pub mod config;
pub mod registers;

use core::fmt;

use embedded_hal::{delay::DelayNs, i2c::I2c};

use crate::bmp180::{
    calibration::CalibrationData,
    compensation::{CompensationError, SEA_LEVEL_PRESSURE_PA},
    config::{ResolutionMode, TEMPERATURE_CONVERSION_TIME},
    registers::{BMP180_I2C_ADDR, Bmp180Command, Bmp180Register},
};

/// Possible errors while talking to the BMP180.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Bmp180Error<E> {
    /// The bus read or write failed (device absent, NACK, bus fault)
    Transport(E),
    /// Calibration data led to a zero divisor during compensation
    DivisionByZero,
    /// Compensation left the `i64` intermediate or `i32` result range
    Overflow,
}

impl<E> From<CompensationError> for Bmp180Error<E> {
    fn from(e: CompensationError) -> Self {
        match e {
            CompensationError::DivisionByZero => Bmp180Error::DivisionByZero,
            CompensationError::Overflow => Bmp180Error::Overflow,
        }
    }
}

impl<E: fmt::Debug> fmt::Display for Bmp180Error<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Bmp180Error::Transport(e) => write!(f, "BMP180 bus transfer failed: {e:?}"),
            Bmp180Error::DivisionByZero => {
                f.write_str("BMP180 compensation divided by zero (corrupt calibration?)")
            }
            Bmp180Error::Overflow => {
                f.write_str("BMP180 compensation overflowed (corrupt calibration?)")
            }
        }
    }
}

impl<E: fmt::Debug> core::error::Error for Bmp180Error<E> {}

/// Temperature and pressure computed from one temperature conversion.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Measurement {
    /// Temperature in °C
    pub temperature_c: f32,
    /// Pressure in Pa
    pub pressure_pa: i32,
}

/// BMP180 driver instance (blocking I²C).
///
/// Owns the bus, the delay provider, the calibration coefficients read at
/// construction, and the current resolution mode. Every measurement takes
/// `&mut self`, so conversions on one device can never overlap.
pub struct Bmp180<I2C, D> {
    /// Blocking I²C interface
    i2c: I2C,
    /// Delay provider (used for conversion timing)
    delay: D,
    /// Factory calibration coefficients
    calib: CalibrationData,
    /// Resolution used for pressure conversions
    mode: ResolutionMode,
}

impl<I2C, D, E> Bmp180<I2C, D>
where
    I2C: I2c<Error = E>,
    D: DelayNs,
{
    /// Creates a new BMP180 driver instance.
    ///
    /// Reads the calibration coefficients, so the returned handle is always
    /// ready to measure.
    ///
    /// # Arguments
    /// * `i2c` - I²C bus the sensor is attached to
    /// * `delay` - Delay provider for conversion waits
    /// * `mode` - Initial pressure resolution mode
    ///
    /// # Errors
    /// Returns `Bmp180Error::Transport` if any calibration read fails.
    pub fn new(mut i2c: I2C, delay: D, mode: ResolutionMode) -> Result<Self, Bmp180Error<E>> {
        let calib = CalibrationData::read(&mut i2c).map_err(|e| {
            info!("Failed to read calibration data");
            Bmp180Error::Transport(e)
        })?;
        info!("BMP180 initialized in {:?}", mode);

        Ok(Self {
            i2c,
            delay,
            calib,
            mode,
        })
    }

    /// Changes the resolution used by subsequent pressure readings.
    pub fn set_mode(&mut self, mode: ResolutionMode) {
        self.mode = mode;
    }

    /// Current resolution mode.
    pub fn mode(&self) -> ResolutionMode {
        self.mode
    }

    /// Calibration coefficients read at construction.
    pub fn calibration(&self) -> &CalibrationData {
        &self.calib
    }

    /// Gives the bus and delay provider back to the caller.
    pub fn release(self) -> (I2C, D) {
        (self.i2c, self.delay)
    }

    /// Reads the chip ID register (0x55 on a genuine BMP180).
    pub fn read_chip_id(&mut self) -> Result<u8, Bmp180Error<E>> {
        let mut chip_id = [0u8];
        self.i2c
            .write_read(BMP180_I2C_ADDR, &[Bmp180Register::ChipId as u8], &mut chip_id)
            .map_err(Bmp180Error::Transport)?;
        Ok(chip_id[0])
    }

    /// Reads the temperature in °C.
    pub fn read_temperature(&mut self) -> Result<f32, Bmp180Error<E>> {
        let raw_temperature = self.read_raw_temperature()?;
        Ok(compensation::compensate_temperature(
            raw_temperature,
            &self.calib,
        )?)
    }

    /// Reads the pressure in Pa.
    ///
    /// Triggers a temperature conversion first; the pressure formula needs
    /// a fresh temperature sample.
    pub fn read_pressure(&mut self) -> Result<i32, Bmp180Error<E>> {
        Ok(self.read_measurement()?.pressure_pa)
    }

    /// Reads temperature and pressure from one temperature/pressure conversion pair.
    pub fn read_measurement(&mut self) -> Result<Measurement, Bmp180Error<E>> {
        let raw_temperature = self.read_raw_temperature()?;
        let raw_pressure = self.read_raw_pressure()?;

        let temperature_c = compensation::compensate_temperature(raw_temperature, &self.calib)?;
        let pressure_pa = compensation::compensate_pressure(
            raw_temperature,
            raw_pressure,
            &self.calib,
            self.mode,
        )?;
        trace!(
            "UT={=u16} UP={=u32} -> T={=f32} P={=i32}",
            raw_temperature, raw_pressure, temperature_c, pressure_pa
        );

        Ok(Measurement {
            temperature_c,
            pressure_pa,
        })
    }

    /// Altitude in metres above standard sea-level pressure (101325 Pa).
    pub fn calculate_absolute_altitude(&mut self) -> Result<f32, Bmp180Error<E>> {
        self.calculate_altitude(SEA_LEVEL_PRESSURE_PA)
    }

    /// Altitude in metres relative to a known reference pressure in Pa.
    pub fn calculate_altitude(&mut self, reference_pa: f32) -> Result<f32, Bmp180Error<E>> {
        let pressure = self.read_pressure()?;
        Ok(compensation::altitude_with_reference(pressure, reference_pa))
    }

    /// Temperature conversion: command, 5 ms wait, 16-bit read-back.
    fn read_raw_temperature(&mut self) -> Result<u16, Bmp180Error<E>> {
        self.start_conversion(Bmp180Command::ReadTemperature as u8)?;
        self.delay
            .delay_us(TEMPERATURE_CONVERSION_TIME.as_micros() as u32);

        let mut raw_data = [0u8; 2];
        self.read_data(&mut raw_data)?;
        Ok(u16::from_be_bytes(raw_data))
    }

    /// Pressure conversion: command with oss in bits 7:6, mode-dependent wait,
    /// 24-bit read-back shifted down to 16 + oss bits.
    fn read_raw_pressure(&mut self) -> Result<u32, Bmp180Error<E>> {
        self.start_conversion(self.mode.pressure_command())?;
        self.delay
            .delay_us(self.mode.pressure_conversion_time().as_micros() as u32);

        let mut raw_data = [0u8; 3];
        self.read_data(&mut raw_data)?;
        let raw = (raw_data[0] as u32) << 16 | (raw_data[1] as u32) << 8 | raw_data[2] as u32;
        Ok(raw >> (8 - self.mode.oversampling()))
    }

    fn start_conversion(&mut self, command: u8) -> Result<(), Bmp180Error<E>> {
        self.i2c
            .write(BMP180_I2C_ADDR, &[Bmp180Register::Control as u8, command])
            .map_err(|e| {
                info!("Failed to start conversion {=u8:#x}", command);
                Bmp180Error::Transport(e)
            })
    }

    fn read_data(&mut self, buffer: &mut [u8]) -> Result<(), Bmp180Error<E>> {
        self.i2c
            .write_read(BMP180_I2C_ADDR, &[Bmp180Register::Data as u8], buffer)
            .map_err(|e| {
                info!("Read failed");
                Bmp180Error::Transport(e)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bmp180::calibration::tests::{DATASHEET, datasheet_transactions};
    use embedded_hal::i2c::ErrorKind;
    use embedded_hal_mock::eh1::i2c::{Mock as I2cMock, Transaction as I2cTransaction};

    /// Records every requested delay in nanoseconds.
    #[derive(Default)]
    struct RecordingDelay {
        waits_ns: Vec<u32>,
    }

    impl DelayNs for RecordingDelay {
        fn delay_ns(&mut self, ns: u32) {
            self.waits_ns.push(ns);
        }
    }

    fn temperature_transactions(raw: [u8; 2]) -> [I2cTransaction; 2] {
        [
            I2cTransaction::write(BMP180_I2C_ADDR, vec![0xF4, 0x2E]),
            I2cTransaction::write_read(BMP180_I2C_ADDR, vec![0xF6], raw.to_vec()),
        ]
    }

    fn pressure_transactions(command: u8, raw: [u8; 3]) -> [I2cTransaction; 2] {
        [
            I2cTransaction::write(BMP180_I2C_ADDR, vec![0xF4, command]),
            I2cTransaction::write_read(BMP180_I2C_ADDR, vec![0xF6], raw.to_vec()),
        ]
    }

    fn driver(
        measurements: &[I2cTransaction],
        mode: ResolutionMode,
    ) -> Bmp180<I2cMock, RecordingDelay> {
        let mut expectations = datasheet_transactions();
        expectations.extend_from_slice(measurements);
        Bmp180::new(I2cMock::new(&expectations), RecordingDelay::default(), mode).unwrap()
    }

    fn finish(device: Bmp180<I2cMock, RecordingDelay>) -> Vec<u32> {
        let (mut i2c, delay) = device.release();
        i2c.done();
        delay.waits_ns
    }

    #[test]
    fn construction_loads_calibration() {
        let device = driver(&[], ResolutionMode::default());
        assert_eq!(device.calibration(), &DATASHEET);
        assert_eq!(device.mode(), ResolutionMode::UltraLowPower);
        assert!(finish(device).is_empty());
    }

    #[test]
    fn construction_fails_without_device() {
        let mut i2c = I2cMock::new(&[I2cTransaction::write_read(
            BMP180_I2C_ADDR,
            vec![0xAA],
            vec![0, 0],
        )
        .with_error(ErrorKind::NoAcknowledge(
            embedded_hal::i2c::NoAcknowledgeSource::Address,
        ))]);
        let result = Bmp180::new(i2c.clone(), RecordingDelay::default(), ResolutionMode::Standard);
        assert!(matches!(
            result,
            Err(Bmp180Error::Transport(ErrorKind::NoAcknowledge(_)))
        ));
        i2c.done();
    }

    #[test]
    fn temperature_sequence() {
        let mut device = driver(
            &temperature_transactions([0x6C, 0xFA]),
            ResolutionMode::UltraLowPower,
        );
        assert_eq!(device.read_temperature(), Ok(15.0));
        assert_eq!(finish(device), vec![5_000_000]);
    }

    #[test]
    fn pressure_sequence_per_mode() {
        let expected = [
            (ResolutionMode::UltraLowPower, 0x34, 5_000_000, 69965),
            (ResolutionMode::Standard, 0x74, 5_000_000, 69963),
            (ResolutionMode::HighResolution, 0xB4, 14_000_000, 69964),
            (ResolutionMode::UltraHighResolution, 0xF4, 26_000_000, 69964),
        ];
        for (mode, command, wait_ns, pressure) in expected {
            let mut transactions = temperature_transactions([0x6C, 0xFA]).to_vec();
            transactions.extend(pressure_transactions(command, [0x5D, 0x23, 0x00]));
            let mut device = driver(&transactions, mode);

            assert_eq!(device.read_pressure(), Ok(pressure), "{mode:?}");
            assert_eq!(finish(device), vec![5_000_000, wait_ns], "{mode:?}");
        }
    }

    #[test]
    fn set_mode_changes_pressure_command() {
        let mut transactions = temperature_transactions([0x6C, 0xFA]).to_vec();
        transactions.extend(pressure_transactions(0xB4, [0x5D, 0x23, 0x00]));
        let mut device = driver(&transactions, ResolutionMode::UltraLowPower);

        device.set_mode(ResolutionMode::HighResolution);
        assert_eq!(device.mode(), ResolutionMode::HighResolution);
        assert_eq!(device.read_pressure(), Ok(69964));
        finish(device);
    }

    #[test]
    fn measurement_shares_one_temperature_sample() {
        let mut transactions = temperature_transactions([0x6C, 0xFA]).to_vec();
        transactions.extend(pressure_transactions(0x34, [0x5D, 0x23, 0x00]));
        let mut device = driver(&transactions, ResolutionMode::UltraLowPower);

        assert_eq!(
            device.read_measurement(),
            Ok(Measurement {
                temperature_c: 15.0,
                pressure_pa: 69965,
            })
        );
        finish(device);
    }

    #[test]
    fn altitude_from_live_reading() {
        let mut transactions = temperature_transactions([0x6C, 0xFA]).to_vec();
        transactions.extend(pressure_transactions(0x34, [0x5D, 0x23, 0x00]));
        let mut device = driver(&transactions, ResolutionMode::UltraLowPower);

        let altitude = device.calculate_absolute_altitude().unwrap();
        assert!((altitude - 3016.6).abs() < 1.0, "{altitude}");
        finish(device);
    }

    #[test]
    fn failed_command_write_aborts_reading() {
        let transactions = [I2cTransaction::write(BMP180_I2C_ADDR, vec![0xF4, 0x2E])
            .with_error(ErrorKind::Bus)];
        let mut device = driver(&transactions, ResolutionMode::UltraLowPower);

        assert_eq!(
            device.read_temperature(),
            Err(Bmp180Error::Transport(ErrorKind::Bus))
        );
        assert!(finish(device).is_empty());
    }

    #[test]
    fn failed_pressure_read_back_aborts_reading() {
        let mut transactions = temperature_transactions([0x6C, 0xFA]).to_vec();
        transactions.push(I2cTransaction::write(BMP180_I2C_ADDR, vec![0xF4, 0x34]));
        transactions.push(
            I2cTransaction::write_read(BMP180_I2C_ADDR, vec![0xF6], vec![0, 0, 0])
                .with_error(ErrorKind::ArbitrationLoss),
        );
        let mut device = driver(&transactions, ResolutionMode::UltraLowPower);

        assert_eq!(
            device.read_pressure(),
            Err(Bmp180Error::Transport(ErrorKind::ArbitrationLoss))
        );
        finish(device);
    }

    #[test]
    fn corrupt_calibration_reports_division_by_zero() {
        let mut expectations = datasheet_transactions();
        // md = 0 and UT == ac6 makes x1 + md zero
        expectations[10] = I2cTransaction::write_read(BMP180_I2C_ADDR, vec![0xBE], vec![0, 0]);
        expectations.extend(temperature_transactions([0x5A, 0x71]));
        let mut device = Bmp180::new(
            I2cMock::new(&expectations),
            RecordingDelay::default(),
            ResolutionMode::UltraLowPower,
        )
        .unwrap();

        assert_eq!(device.read_temperature(), Err(Bmp180Error::DivisionByZero));
        finish(device);
    }

    #[test]
    fn out_of_range_pressure_reports_overflow() {
        let mut expectations: Vec<I2cTransaction> = [
            (0xAA, [0xDF, 0x02]),
            (0xAC, [0x69, 0x93]),
            (0xAE, [0x2F, 0xE5]),
            (0xB0, [0x29, 0x24]),
            (0xB2, [0x92, 0x36]),
            (0xB4, [0x9C, 0x90]),
            (0xB6, [0xEA, 0x5E]),
            (0xB8, [0xA5, 0xE0]),
            (0xBA, [0xA5, 0x21]),
            (0xBC, [0x2F, 0xD9]),
            (0xBE, [0x74, 0x08]),
        ]
        .into_iter()
        .map(|(reg, word)| I2cTransaction::write_read(BMP180_I2C_ADDR, vec![reg], word.to_vec()))
        .collect();
        expectations.extend(temperature_transactions([0x06, 0x22]));
        expectations.extend(pressure_transactions(0xB4, [0x84, 0x90, 0x80]));
        let mut device = Bmp180::new(
            I2cMock::new(&expectations),
            RecordingDelay::default(),
            ResolutionMode::HighResolution,
        )
        .unwrap();

        // compensates to 7083710244 Pa, which does not fit in i32
        assert_eq!(device.read_pressure(), Err(Bmp180Error::Overflow));
        finish(device);
    }

    #[test]
    fn chip_id() {
        let mut device = driver(
            &[I2cTransaction::write_read(
                BMP180_I2C_ADDR,
                vec![0xD0],
                vec![0x55],
            )],
            ResolutionMode::UltraLowPower,
        );
        assert_eq!(device.read_chip_id(), Ok(registers::BMP180_CHIP_ID));
        finish(device);
    }
}
