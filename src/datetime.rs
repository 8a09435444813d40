//! Clock register transaction for the DS3231.
//!
//! The chip keeps time in 7 consecutive registers (seconds, minutes, hours,
//! day, date, month, year). The counters keep running while the bus is busy,
//! so they must be written and read as one burst: reading them one at a time
//! can tear across a rollover (e.g. 10:59:59 read as 10:00:00).
//!
//! [`build_clock_write`] turns a [`CalendarTime`] into the register set for
//! such a burst and [`parse_clock_read`] turns a burst read back into a
//! [`ClockRead`]. Conversion to and from chrono's `NaiveDateTime` is provided
//! for callers that keep wall-clock time in chrono.
//!
//! Fields are range-checked one at a time only: the chip does not validate
//! calendars, so neither does this module (February 30 encodes fine).

use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};

use crate::bcd::{bcd_to_decimal, encode_field, encode_field_from_one};
use crate::hour::{encode_hour, HourField};
use crate::{CodecError, HourFormat, Month, RegAddr};

/// Number of clock registers in a burst.
pub const CLOCK_REGISTER_COUNT: usize = 7;

/// Calendar time as stored by the chip, hours in canonical 24-hour form.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CalendarTime {
    /// 0-59
    pub seconds: u8,
    /// 0-59
    pub minutes: u8,
    /// 0-23
    pub hours: u8,
    /// 1-7, 1 = Sunday
    pub day_of_week: u8,
    /// Day of month, 1-31
    pub date: u8,
    /// 1-12
    pub month: u8,
    /// Two-digit year, 0-99
    pub year: u8,
}

impl CalendarTime {
    /// Checks every field against its own range.
    ///
    /// # Errors
    ///
    /// [`CodecError::OutOfRange`] naming the first offending field.
    pub fn validate(&self) -> Result<(), CodecError> {
        self.encode(HourFormat::TwentyFourHour).map(|_| ())
    }

    /// Encodes all 7 registers in burst order.
    fn encode(&self, format: HourFormat) -> Result<[u8; CLOCK_REGISTER_COUNT], CodecError> {
        Ok([
            encode_field(self.seconds, 59, "seconds")?,
            encode_field(self.minutes, 59, "minutes")?,
            encode_hour(format, self.hours)?,
            encode_field_from_one(self.day_of_week, 7, "day of week")?,
            encode_field_from_one(self.date, 31, "date")?,
            encode_field_from_one(self.month, 12, "month")?,
            encode_field(self.year, 99, "year")?,
        ])
    }

    /// Converts to a chrono `NaiveDateTime` in the 2000s.
    ///
    /// The stored day of week is not consulted; chrono derives its own.
    ///
    /// # Errors
    ///
    /// [`CodecError::OutOfRange`] when the fields do not form a real date or
    /// time (e.g. February 30).
    pub fn to_naive_datetime(&self) -> Result<NaiveDateTime, CodecError> {
        to_naive(self, false)
    }
}

impl TryFrom<&NaiveDateTime> for CalendarTime {
    type Error = CodecError;

    /// Only years 2000-2099 fit the two-digit year register.
    fn try_from(datetime: &NaiveDateTime) -> Result<Self, Self::Error> {
        let year = datetime.year();
        if !(2000..=2099).contains(&year) {
            error!("year {} outside 2000-2099", year);
            return Err(CodecError::OutOfRange("year"));
        }
        let narrow = |v: u32, field: &'static str| {
            u8::try_from(v).map_err(|_| CodecError::OutOfRange(field))
        };
        Ok(CalendarTime {
            // leap seconds report 60 in chrono
            seconds: narrow(datetime.second().min(59), "seconds")?,
            minutes: narrow(datetime.minute(), "minutes")?,
            hours: narrow(datetime.hour(), "hours")?,
            day_of_week: narrow(datetime.weekday().number_from_sunday(), "day of week")?,
            date: narrow(datetime.day(), "date")?,
            month: narrow(datetime.month(), "month")?,
            year: narrow(year.unsigned_abs() - 2000, "year")?,
        })
    }
}

/// Result of a clock burst read.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ClockRead {
    /// Decoded time, hours converted to 0-23
    pub time: CalendarTime,
    /// The hours register as stored, for 12-hour display
    pub hour: HourField,
    /// Century flag from the month register
    pub century: bool,
}

impl ClockRead {
    /// Converts to a chrono `NaiveDateTime`, using the century flag to pick
    /// between the 2000s and 2100s.
    ///
    /// # Errors
    ///
    /// [`CodecError::OutOfRange`] when the registers do not form a real date
    /// or time.
    pub fn to_naive_datetime(&self) -> Result<NaiveDateTime, CodecError> {
        to_naive(&self.time, self.century)
    }
}

fn to_naive(time: &CalendarTime, century: bool) -> Result<NaiveDateTime, CodecError> {
    let year = 2000 + i32::from(time.year) + if century { 100 } else { 0 };
    NaiveDate::from_ymd_opt(year, u32::from(time.month), u32::from(time.date))
        .ok_or(CodecError::OutOfRange("date"))?
        .and_hms_opt(
            u32::from(time.hours),
            u32::from(time.minutes),
            u32::from(time.seconds),
        )
        .ok_or(CodecError::OutOfRange("time"))
}

/// Builds the register writes that set the clock to `time`.
///
/// The pairs come back in burst order starting at [`RegAddr::Seconds`]; write
/// them as one transaction (see [`clock_registers`]).
///
/// # Errors
///
/// [`CodecError::OutOfRange`] naming the first field outside its range.
pub fn build_clock_write(
    time: &CalendarTime,
    format: HourFormat,
) -> Result<[(RegAddr, u8); CLOCK_REGISTER_COUNT], CodecError> {
    let values = time.encode(format)?;
    let mut writes = [(RegAddr::Seconds, 0); CLOCK_REGISTER_COUNT];
    for (slot, (addr, value)) in writes
        .iter_mut()
        .zip(RegAddr::CLOCK.iter().zip(values.iter()))
    {
        *slot = (*addr, *value);
    }
    Ok(writes)
}

/// Register bytes for a burst write starting at [`RegAddr::Seconds`].
///
/// # Errors
///
/// Same as [`build_clock_write`].
pub fn clock_registers(
    time: &CalendarTime,
    format: HourFormat,
) -> Result<[u8; CLOCK_REGISTER_COUNT], CodecError> {
    let raw = time.encode(format)?;
    debug!("clock registers: {:?}", raw);
    Ok(raw)
}

/// Parses a burst read of the 7 clock registers.
///
/// Out-of-range BCD digits are passed through rather than rejected.
///
/// # Errors
///
/// [`CodecError::MalformedRegisterData`] when `data` is not exactly 7 bytes.
pub fn parse_clock_read(data: &[u8]) -> Result<ClockRead, CodecError> {
    let data: &[u8; CLOCK_REGISTER_COUNT] =
        data.try_into().map_err(|_| CodecError::MalformedRegisterData {
            expected: CLOCK_REGISTER_COUNT,
            actual: data.len(),
        })?;
    let hour = HourField::from_register(data[2]);
    let month = Month::from(data[5]);
    let time = CalendarTime {
        seconds: bcd_to_decimal(data[0] & 0x7F),
        minutes: bcd_to_decimal(data[1] & 0x7F),
        hours: hour.to_hour24(),
        day_of_week: data[3] & 0x07,
        date: bcd_to_decimal(data[4] & 0x3F),
        month: bcd_to_decimal(month.month_bcd()),
        year: bcd_to_decimal(data[6]),
    };
    debug!(
        "clock read: raw_hour={:#x} h={} m={} s={}",
        data[2], time.hours, time.minutes, time.seconds
    );
    Ok(ClockRead {
        time,
        hour,
        century: month.century(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pi_day() -> CalendarTime {
        // Thursday 2024-03-14 15:30:00
        CalendarTime {
            seconds: 0,
            minutes: 30,
            hours: 15,
            day_of_week: 5,
            date: 14,
            month: 3,
            year: 24,
        }
    }

    fn midnight() -> CalendarTime {
        // Saturday 2000-01-01 00:00:00
        CalendarTime {
            seconds: 0,
            minutes: 0,
            hours: 0,
            day_of_week: 7,
            date: 1,
            month: 1,
            year: 0,
        }
    }

    #[test]
    fn test_build_clock_write_24_hour() {
        let writes = build_clock_write(&pi_day(), HourFormat::TwentyFourHour).unwrap();
        assert_eq!(
            writes,
            [
                (RegAddr::Seconds, 0x00),
                (RegAddr::Minutes, 0x30),
                (RegAddr::Hours, 0x15),
                (RegAddr::Day, 0x05),
                (RegAddr::Date, 0x14),
                (RegAddr::Month, 0x03),
                (RegAddr::Year, 0x24),
            ]
        );
    }

    #[test]
    fn test_build_clock_write_12_hour() {
        let writes = build_clock_write(&pi_day(), HourFormat::TwelveHour).unwrap();
        // 3 PM: mode bit, PM bit, BCD 3
        assert_eq!(writes[2], (RegAddr::Hours, 0x63));
    }

    #[test]
    fn test_build_clock_write_rejects_each_field() {
        let cases: [(fn(&mut CalendarTime), &str); 10] = [
            (|t| t.seconds = 60, "seconds"),
            (|t| t.minutes = 60, "minutes"),
            (|t| t.hours = 24, "hours"),
            (|t| t.day_of_week = 0, "day of week"),
            (|t| t.day_of_week = 8, "day of week"),
            (|t| t.date = 0, "date"),
            (|t| t.date = 32, "date"),
            (|t| t.month = 0, "month"),
            (|t| t.month = 13, "month"),
            (|t| t.year = 100, "year"),
        ];
        for (mutate, field) in cases {
            let mut time = pi_day();
            mutate(&mut time);
            assert_eq!(
                build_clock_write(&time, HourFormat::TwentyFourHour),
                Err(CodecError::OutOfRange(field))
            );
            assert_eq!(time.validate(), Err(CodecError::OutOfRange(field)));
        }
    }

    #[test]
    fn test_no_cross_field_validation() {
        let feb_30 = CalendarTime {
            date: 30,
            month: 2,
            ..pi_day()
        };
        assert!(build_clock_write(&feb_30, HourFormat::TwentyFourHour).is_ok());
        assert_eq!(
            feb_30.to_naive_datetime(),
            Err(CodecError::OutOfRange("date"))
        );
    }

    #[test]
    fn test_parse_clock_read() {
        let read = parse_clock_read(&[0x45, 0x59, 0x71, 0x07, 0x31, 0x12, 0x99]).unwrap();
        assert_eq!(
            read.time,
            CalendarTime {
                seconds: 45,
                minutes: 59,
                hours: 23,
                day_of_week: 7,
                date: 31,
                month: 12,
                year: 99,
            }
        );
        assert_eq!(
            read.hour,
            HourField::TwelveHour {
                hour: 11,
                is_pm: true
            }
        );
        assert!(!read.century);
    }

    #[test]
    fn test_parse_clock_read_century() {
        let read = parse_clock_read(&[0x00, 0x00, 0x00, 0x01, 0x01, 0x81, 0x00]).unwrap();
        assert!(read.century);
        assert_eq!(read.time.month, 1);
        let dt = read.to_naive_datetime().unwrap();
        assert_eq!(dt.year(), 2100);
    }

    #[test]
    fn test_parse_clock_read_wrong_length() {
        assert_eq!(
            parse_clock_read(&[0; 6]),
            Err(CodecError::MalformedRegisterData {
                expected: 7,
                actual: 6
            })
        );
        assert_eq!(
            parse_clock_read(&[0; 8]),
            Err(CodecError::MalformedRegisterData {
                expected: 7,
                actual: 8
            })
        );
    }

    #[test]
    fn test_parse_passes_malformed_bcd_through() {
        // month 0x1A is not BCD; decodes to 20 without error
        let read = parse_clock_read(&[0x00, 0x00, 0x00, 0x01, 0x01, 0x1A, 0x00]).unwrap();
        assert_eq!(read.time.month, 20);
    }

    #[test]
    fn test_round_trip_both_formats() {
        let times = [
            pi_day(),
            midnight(),
            CalendarTime {
                seconds: 59,
                minutes: 59,
                hours: 23,
                day_of_week: 7,
                date: 31,
                month: 12,
                year: 99,
            },
            CalendarTime {
                hours: 12,
                ..pi_day()
            },
        ];
        for format in [HourFormat::TwentyFourHour, HourFormat::TwelveHour] {
            for time in times {
                let raw = clock_registers(&time, format).unwrap();
                assert_eq!(parse_clock_read(&raw).unwrap().time, time);
            }
            for hours in 0..=23 {
                let time = CalendarTime { hours, ..pi_day() };
                let raw = clock_registers(&time, format).unwrap();
                assert_eq!(parse_clock_read(&raw).unwrap().time, time);
            }
        }
    }

    #[test]
    fn test_naive_datetime_round_trip() {
        let dt = NaiveDate::from_ymd_opt(2024, 3, 14)
            .unwrap()
            .and_hms_opt(15, 30, 0)
            .unwrap();
        let time = CalendarTime::try_from(&dt).unwrap();
        assert_eq!(time, pi_day());
        assert_eq!(time.to_naive_datetime().unwrap(), dt);
    }

    #[test]
    fn test_naive_datetime_year_bounds() {
        let early = NaiveDate::from_ymd_opt(1999, 12, 31)
            .unwrap()
            .and_hms_opt(23, 59, 59)
            .unwrap();
        assert_eq!(
            CalendarTime::try_from(&early),
            Err(CodecError::OutOfRange("year"))
        );
        let late = NaiveDate::from_ymd_opt(2100, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert_eq!(
            CalendarTime::try_from(&late),
            Err(CodecError::OutOfRange("year"))
        );
    }
}
