//! Fixed-point compensation of raw BMP180 samples.
//!
//! Implements the integer formulas of the Bosch BMP180 datasheet (section 3.5,
//! "Calculating pressure and temperature"). Divisions round toward negative
//! infinity and right shifts are arithmetic; for negative intermediates this
//! differs from C's truncating division. Everything is computed in `i64`.

use crate::bmp180::calibration::CalibrationData;
use crate::bmp180::config::ResolutionMode;

/// Standard atmosphere at sea level, in Pa.
pub const SEA_LEVEL_PRESSURE_PA: f32 = 101_325.0;

/// Threshold selecting how `p` is derived from `b7`.
const B7_MIDPOINT: i64 = 0x8000_0000;

/// A compensation step could not produce a result.
///
/// Both cases only arise from corrupt calibration data or raw samples; the
/// datasheet coefficients never get near them.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CompensationError {
    /// `x1 + md == 0` on the temperature path or `b4 == 0` on the pressure path
    DivisionByZero,
    /// An intermediate left `i64`, or the pressure does not fit in `i32`
    Overflow,
}

/// Integer division rounding toward negative infinity.
pub fn floor_div(numerator: i64, denominator: i64) -> Result<i64, CompensationError> {
    if denominator == 0 {
        return Err(CompensationError::DivisionByZero);
    }
    let quotient = numerator
        .checked_div(denominator)
        .ok_or(CompensationError::Overflow)?;
    if numerator % denominator != 0 && ((numerator < 0) != (denominator < 0)) {
        Ok(quotient - 1)
    } else {
        Ok(quotient)
    }
}

fn mul(a: i64, b: i64) -> Result<i64, CompensationError> {
    a.checked_mul(b).ok_or(CompensationError::Overflow)
}

/// Computes the intermediate `b5` shared by the temperature and pressure formulas.
pub fn compute_b5(
    raw_temperature: u16,
    calib: &CalibrationData,
) -> Result<i64, CompensationError> {
    let x1 = ((raw_temperature as i64 - calib.ac6 as i64) * calib.ac5 as i64) >> 15;
    let x2 = floor_div((calib.mc as i64) << 11, x1 + calib.md as i64)?;
    Ok(x1 + x2)
}

/// Converts a raw temperature sample to °C.
pub fn compensate_temperature(
    raw_temperature: u16,
    calib: &CalibrationData,
) -> Result<f32, CompensationError> {
    let b5 = compute_b5(raw_temperature, calib)?;
    Ok(((b5 + 8) >> 4) as f32 / 10.0)
}

/// Converts a raw pressure sample to Pa.
///
/// `raw_temperature` must come from the conversion taken immediately before
/// `raw_pressure`, and `mode` must be the mode `raw_pressure` was sampled in.
///
/// # Errors
/// `DivisionByZero` for a zero divisor, `Overflow` when `p²` leaves `i64` or
/// the compensated pressure leaves `i32`.
pub fn compensate_pressure(
    raw_temperature: u16,
    raw_pressure: u32,
    calib: &CalibrationData,
    mode: ResolutionMode,
) -> Result<i32, CompensationError> {
    let oss = mode.oversampling() as u32;
    let b5 = compute_b5(raw_temperature, calib)?;

    // |b5| < 2^27, so everything up to b4 stays well inside i64
    let b6 = b5 - 4000;
    let b62 = (b6 * b6) >> 12;
    let x1 = (calib.b2 as i64 * b62) >> 11;
    let x2 = (calib.ac2 as i64 * b6) >> 11;
    let x3 = x1 + x2;
    let b3 = (((calib.ac1 as i64 * 4 + x3).abs() << oss) + 2) >> 2;

    let x1 = (calib.ac3 as i64 * b6) >> 13;
    let x2 = (calib.b1 as i64 * b62) >> 16;
    let x3 = ((x1 + x2) + 2) >> 2;
    let b4 = (calib.ac4 as i64 * (x3 + 32768)) >> 15;
    let b7 = mul(raw_pressure as i64 - b3, 50000 >> oss)?;

    let p = pressure_from_b7(b7, b4)?;

    let x1 = mul(p, p)? >> 16;
    let x1 = mul(x1, 3038)? >> 16;
    let x2 = mul(-7357, p)? >> 16;
    let pressure = (x1 + x2 + 3791) >> 4;
    let pressure = p.checked_add(pressure).ok_or(CompensationError::Overflow)?;
    i32::try_from(pressure).map_err(|_| CompensationError::Overflow)
}

/// Uncorrected pressure `p` from `b7` and `b4`.
///
/// Below `0x80000000` the doubling happens before the division, at or above it
/// after, as in the datasheet. `b7` is compared as a signed 64-bit value.
pub fn pressure_from_b7(b7: i64, b4: i64) -> Result<i64, CompensationError> {
    if b7 < B7_MIDPOINT {
        floor_div(mul(b7, 2)?, b4)
    } else {
        mul(floor_div(b7, b4)?, 2)
    }
}

/// Altitude in metres above the standard sea-level pressure.
pub fn altitude_from_pressure(pressure_pa: i32) -> f32 {
    altitude_with_reference(pressure_pa, SEA_LEVEL_PRESSURE_PA)
}

/// Altitude in metres relative to a caller-supplied reference pressure,
/// using the international barometric formula.
pub fn altitude_with_reference(pressure_pa: i32, reference_pa: f32) -> f32 {
    44330.0 * (1.0 - libm::powf(pressure_pa as f32 / reference_pa, 1.0 / 5.255))
}
