//! Temperature register decoding.
//!
//! The sensor value is a 10-bit two's complement number in quarter degrees
//! Celsius: whole degrees in the MSB register (0x11), the two fractional
//! bits in bits 7:6 of the LSB register (0x12).

use crate::{Temperature, TemperatureFraction};

/// Number of temperature registers in a burst.
pub const TEMPERATURE_REGISTER_COUNT: usize = 2;

/// Decodes the MSB/LSB register pair into degrees Celsius.
///
/// The MSB is sign-extended, so `0xFF, 0x40` is -0.75 °C
/// (-1 + 0.25), matching the chip's 10-bit two's complement format.
#[must_use]
pub fn decode_temperature(msb: u8, lsb: u8) -> f32 {
    let degrees = Temperature::from(msb).degrees();
    let quarters = TemperatureFraction::from(lsb).quarters();
    f32::from(degrees) + f32::from(quarters) * 0.25
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positive_temperatures() {
        assert_eq!(decode_temperature(0x19, 0x00), 25.0);
        assert_eq!(decode_temperature(0x19, 0x40), 25.25);
        assert_eq!(decode_temperature(0x19, 0x80), 25.5);
        assert_eq!(decode_temperature(0x19, 0xC0), 25.75);
        assert_eq!(decode_temperature(0x7F, 0xC0), 127.75);
    }

    #[test]
    fn test_negative_temperatures_are_sign_extended() {
        assert_eq!(decode_temperature(0xFF, 0x00), -1.0);
        assert_eq!(decode_temperature(0xFF, 0x40), -0.75);
        assert_eq!(decode_temperature(0xE7, 0x00), -25.0);
        assert_eq!(decode_temperature(0x80, 0x00), -128.0);
    }

    #[test]
    fn test_low_lsb_bits_ignored() {
        assert_eq!(decode_temperature(0x00, 0x3F), 0.0);
        assert_eq!(decode_temperature(0x00, 0x7F), 0.25);
    }
}
