//! Hours register codec.
//!
//! The hours register (and both alarm hours registers) carries one of two
//! encodings chosen by bit 6: a 6-bit BCD hour in 24-hour mode, or a 5-bit BCD
//! hour plus an AM/PM bit in 12-hour mode. This module is the only place that
//! branches on that layout; everything else goes through [`HourField`].

use crate::bcd::{bcd_to_decimal, decimal_to_bcd};
use crate::{CodecError, HourFormat, Hours};

/// A decoded hours register.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HourField {
    /// 24-hour mode, hour 0-23
    TwentyFourHour(u8),
    /// 12-hour mode, display hour 1-12
    TwelveHour {
        /// Display hour (1-12)
        hour: u8,
        /// Set for 12:00 through 23:59
        is_pm: bool,
    },
}

impl HourField {
    /// Builds the field for a canonical 0-23 hour in the given format.
    ///
    /// # Errors
    ///
    /// [`CodecError::OutOfRange`] when `hour24` is above 23.
    pub fn from_hour24(format: HourFormat, hour24: u8) -> Result<Self, CodecError> {
        if hour24 > 23 {
            error!("hour out of range: {}", hour24);
            return Err(CodecError::OutOfRange("hours"));
        }
        Ok(match format {
            HourFormat::TwentyFourHour => HourField::TwentyFourHour(hour24),
            HourFormat::TwelveHour => {
                let hour = match hour24 {
                    0 => 12,
                    13..=23 => hour24 - 12,
                    h => h,
                };
                HourField::TwelveHour {
                    hour,
                    is_pm: hour24 >= 12,
                }
            }
        })
    }

    /// The format this field was encoded in.
    #[must_use]
    pub fn format(&self) -> HourFormat {
        match self {
            HourField::TwentyFourHour(_) => HourFormat::TwentyFourHour,
            HourField::TwelveHour { .. } => HourFormat::TwelveHour,
        }
    }

    /// The hour as shown on a clock face in this field's format.
    #[must_use]
    pub fn display_hour(&self) -> u8 {
        match *self {
            HourField::TwentyFourHour(hour) | HourField::TwelveHour { hour, .. } => hour,
        }
    }

    /// `true` for PM in 12-hour mode; always `false` in 24-hour mode.
    #[must_use]
    pub fn is_pm(&self) -> bool {
        matches!(self, HourField::TwelveHour { is_pm: true, .. })
    }

    /// Converts back to the canonical 0-23 hour.
    ///
    /// Malformed 12-hour values (0, or above 12) are passed through with the
    /// PM offset applied, mirroring [`bcd_to_decimal`]'s lack of validation.
    #[must_use]
    pub fn to_hour24(&self) -> u8 {
        match *self {
            HourField::TwentyFourHour(hour) => hour,
            HourField::TwelveHour {
                hour: 12,
                is_pm: false,
            } => 0,
            HourField::TwelveHour {
                hour: 12,
                is_pm: true,
            } => 12,
            HourField::TwelveHour { hour, is_pm: false } => hour,
            HourField::TwelveHour { hour, is_pm: true } => hour.saturating_add(12),
        }
    }

    /// Packs the field into an hours register byte (alarm mask bit clear).
    ///
    /// # Errors
    ///
    /// [`CodecError::OutOfRange`] when the hour does not fit its format.
    pub fn to_register(self) -> Result<u8, CodecError> {
        let mut reg = Hours::default();
        match self {
            HourField::TwentyFourHour(hour) => {
                if hour > 23 {
                    return Err(CodecError::OutOfRange("hours"));
                }
                reg.set_hour_format(HourFormat::TwentyFourHour);
                reg.set_twenty_four_hour_bcd(decimal_to_bcd(hour)?);
            }
            HourField::TwelveHour { hour, is_pm } => {
                if hour == 0 || hour > 12 {
                    return Err(CodecError::OutOfRange("hours"));
                }
                reg.set_hour_format(HourFormat::TwelveHour);
                reg.set_twelve_hour_bcd(decimal_to_bcd(hour)?);
                reg.set_pm(is_pm);
            }
        }
        Ok(reg.into())
    }

    /// Unpacks an hours register byte. Bit 7 (alarm mask) is ignored.
    #[must_use]
    pub fn from_register(byte: u8) -> Self {
        let reg = Hours::from(byte);
        match reg.hour_format() {
            HourFormat::TwentyFourHour => {
                HourField::TwentyFourHour(bcd_to_decimal(reg.twenty_four_hour_bcd()))
            }
            HourFormat::TwelveHour => HourField::TwelveHour {
                hour: bcd_to_decimal(reg.twelve_hour_bcd()),
                is_pm: reg.pm(),
            },
        }
    }
}

/// Encodes a canonical 0-23 hour into an hours register byte.
///
/// # Errors
///
/// [`CodecError::OutOfRange`] when `hour24` is above 23.
pub fn encode_hour(format: HourFormat, hour24: u8) -> Result<u8, CodecError> {
    HourField::from_hour24(format, hour24)?.to_register()
}

/// Decodes an hours register byte into its tagged form.
#[must_use]
pub fn decode_hour(byte: u8) -> HourField {
    HourField::from_register(byte)
}
