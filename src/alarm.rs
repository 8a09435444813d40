//! Alarm register codec for the DS3231.
//!
//! The chip has two alarms. Alarm 1 occupies 4 registers (seconds, minutes,
//! hours, day/date); Alarm 2 has no seconds register and fires at 00 seconds.
//! Bit 7 of each register is a match mask ("ignore this field") and bit 6 of
//! the day/date register (DY/DT) chooses between day-of-week and
//! day-of-month matching.
//!
//! An alarm is described by [`AlarmSpec`]. The mask and DY/DT bits are derived
//! from the variant on every encode and the variant is recovered from them on
//! every decode, so the two never disagree.
//!
//! | Variant | A1M1-A1M3 | A1M4 | DY/DT | fires when |
//! |---|---|---|---|---|
//! | `TimeOnly` | 0 | 1 | - | hours, minutes, seconds match (daily) |
//! | `DateMatch` | 0 | 0 | 0 | ... and day of month matches |
//! | `DayMatch` | 0 | 0 | 1 | ... and day of week matches |

use crate::bcd::{bcd_to_decimal, encode_field, encode_field_from_one};
use crate::datetime::CalendarTime;
use crate::hour::{encode_hour, HourField};
use crate::{AlarmDayDate, CodecError, DayDateSelect, HourFormat};

/// Number of Alarm 1 registers in a burst.
pub const ALARM1_REGISTER_COUNT: usize = 4;
/// Number of Alarm 2 registers in a burst.
pub const ALARM2_REGISTER_COUNT: usize = 3;

/// Match mask bit (A1Mx/A2Mx) in every alarm register.
const ALARM_MASK: u8 = 0x80;

/// Time of day an alarm matches, hours in canonical 24-hour form.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AlarmTime {
    /// 0-23
    pub hours: u8,
    /// 0-59
    pub minutes: u8,
    /// 0-59, ignored by Alarm 2
    pub seconds: u8,
}

/// What an alarm matches on.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AlarmSpec {
    /// Every day at `time`. Alarm 1 only.
    TimeOnly(AlarmTime),
    /// At `time` on day of month `date` (1-31).
    DateMatch {
        /// Time of day
        time: AlarmTime,
        /// Day of month (1-31)
        date: u8,
    },
    /// At `time` on day of week `day` (1-7, 1 = Sunday).
    DayMatch {
        /// Time of day
        time: AlarmTime,
        /// Day of week (1-7)
        day: u8,
    },
}

impl AlarmSpec {
    /// The time-of-day part of any variant.
    #[must_use]
    pub fn time(&self) -> &AlarmTime {
        match self {
            AlarmSpec::TimeOnly(time)
            | AlarmSpec::DateMatch { time, .. }
            | AlarmSpec::DayMatch { time, .. } => time,
        }
    }

    /// Encodes the day/date register. All range checks for the day/date part
    /// happen here.
    fn day_date_register(&self) -> Result<u8, CodecError> {
        let mut reg = AlarmDayDate::default();
        match *self {
            AlarmSpec::TimeOnly(_) => reg.set_alarm_mask4(true),
            AlarmSpec::DateMatch { date, .. } => {
                reg.set_day_date_select(DayDateSelect::Date);
                reg.set_day_or_date_bcd(encode_field_from_one(date, 31, "alarm date")?);
            }
            AlarmSpec::DayMatch { day, .. } => {
                reg.set_day_date_select(DayDateSelect::Day);
                reg.set_day_or_date_bcd(encode_field_from_one(day, 7, "alarm day")?);
            }
        }
        Ok(reg.into())
    }
}

/// Encodes minutes and hours with their match bits cleared.
fn encode_minutes_hours(time: &AlarmTime, format: HourFormat) -> Result<(u8, u8), CodecError> {
    let minutes = encode_field(time.minutes, 59, "alarm minutes")?;
    let hours = encode_hour(format, time.hours)?;
    Ok((minutes & !ALARM_MASK, hours & !ALARM_MASK))
}

fn decode_day_date(time: AlarmTime, byte: u8) -> AlarmSpec {
    let reg = AlarmDayDate::from(byte);
    if reg.alarm_mask4() {
        return AlarmSpec::TimeOnly(time);
    }
    let value = bcd_to_decimal(reg.day_or_date_bcd());
    match reg.day_date_select() {
        DayDateSelect::Day => AlarmSpec::DayMatch { time, day: value },
        DayDateSelect::Date => AlarmSpec::DateMatch { time, date: value },
    }
}

fn check_len(data: &[u8], expected: usize) -> Result<(), CodecError> {
    if data.len() == expected {
        Ok(())
    } else {
        Err(CodecError::MalformedRegisterData {
            expected,
            actual: data.len(),
        })
    }
}

/// Encodes an Alarm 1 register set (seconds, minutes, hours, day/date).
///
/// # Errors
///
/// [`CodecError::OutOfRange`] when a field is outside its range.
pub fn encode_alarm1(
    spec: &AlarmSpec,
    format: HourFormat,
) -> Result<[u8; ALARM1_REGISTER_COUNT], CodecError> {
    let time = spec.time();
    let seconds = encode_field(time.seconds, 59, "alarm seconds")? & !ALARM_MASK;
    let (minutes, hours) = encode_minutes_hours(time, format)?;
    let raw = [seconds, minutes, hours, spec.day_date_register()?];
    debug!("alarm1 registers: {:?}", raw);
    Ok(raw)
}

/// Encodes an Alarm 2 register set (minutes, hours, day/date).
///
/// `AlarmTime::seconds` is ignored: Alarm 2 always fires at 00 seconds.
///
/// # Errors
///
/// [`CodecError::UnsupportedAlarmVariant`] for [`AlarmSpec::TimeOnly`],
/// [`CodecError::OutOfRange`] when a field is outside its range.
pub fn encode_alarm2(
    spec: &AlarmSpec,
    format: HourFormat,
) -> Result<[u8; ALARM2_REGISTER_COUNT], CodecError> {
    if let AlarmSpec::TimeOnly(_) = spec {
        error!("alarm2 does not support time-only alarms");
        return Err(CodecError::UnsupportedAlarmVariant);
    }
    let (minutes, hours) = encode_minutes_hours(spec.time(), format)?;
    let raw = [minutes, hours, spec.day_date_register()?];
    debug!("alarm2 registers: {:?}", raw);
    Ok(raw)
}

/// Decodes an Alarm 1 burst read.
///
/// The hours register is decoded in whichever format its mode bit says and
/// reported in 24-hour form. Mask bits on seconds, minutes and hours are
/// ignored.
///
/// # Errors
///
/// [`CodecError::MalformedRegisterData`] when `data` is not 4 bytes.
pub fn decode_alarm1(data: &[u8]) -> Result<AlarmSpec, CodecError> {
    check_len(data, ALARM1_REGISTER_COUNT)?;
    let time = AlarmTime {
        seconds: bcd_to_decimal(data[0] & !ALARM_MASK),
        minutes: bcd_to_decimal(data[1] & !ALARM_MASK),
        hours: HourField::from_register(data[2]).to_hour24(),
    };
    Ok(decode_day_date(time, data[3]))
}

/// Decodes an Alarm 2 burst read. Seconds are reported as 0.
///
/// # Errors
///
/// [`CodecError::MalformedRegisterData`] when `data` is not 3 bytes.
pub fn decode_alarm2(data: &[u8]) -> Result<AlarmSpec, CodecError> {
    check_len(data, ALARM2_REGISTER_COUNT)?;
    let time = AlarmTime {
        seconds: 0,
        minutes: bcd_to_decimal(data[0] & !ALARM_MASK),
        hours: HourField::from_register(data[1]).to_hour24(),
    };
    Ok(decode_day_date(time, data[2]))
}

/// Builds a day-of-week alarm `offset_minutes` after `base`.
///
/// Minutes carry into hours; hours past 23 wrap to 0 and move the day of
/// week forward (Saturday wraps to Sunday). Seconds are kept from `base`.
///
/// # Errors
///
/// [`CodecError::OutOfRange`] when `base` itself is invalid.
pub fn build_alarm_at_offset(
    base: &CalendarTime,
    offset_minutes: u16,
) -> Result<AlarmSpec, CodecError> {
    base.validate()?;
    let total_minutes = u32::from(base.minutes) + u32::from(offset_minutes);
    let total_hours = u32::from(base.hours) + total_minutes / 60;
    let days = total_hours / 24;
    let narrow = |v: u32| u8::try_from(v).map_err(|_| CodecError::OutOfRange("alarm offset"));
    let day = narrow((u32::from(base.day_of_week) - 1 + days) % 7 + 1)?;
    let spec = AlarmSpec::DayMatch {
        time: AlarmTime {
            hours: narrow(total_hours % 24)?,
            minutes: narrow(total_minutes % 60)?,
            seconds: base.seconds,
        },
        day,
    };
    debug!("alarm at +{} minutes: {:?}", offset_minutes, spec);
    Ok(spec)
}
