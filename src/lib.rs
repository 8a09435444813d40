//! Register-level codec and driver for the DS3231 real-time clock.
//!
//! The crate has two layers:
//!
//! - Pure codecs that translate between calendar, alarm, status and
//!   temperature values and the chip's packed register bytes:
//!   [`bcd`], [`hour`], [`datetime`], [`alarm`], [`status`] and
//!   [`temperature`]. They are plain functions over bytes with no state, safe
//!   to call from anywhere.
//! - [`DS3231`], a thin driver that runs those codecs over an
//!   `embedded-hal` I2C bus (and [`asynch::DS3231`] for `embedded-hal-async`
//!   with the `async` feature).
//!
//! Multi-register values (clock, alarms, temperature) are always moved in a
//! single burst transaction so the chip's running counters cannot tear
//! between registers. The bus itself is not locked by this crate: if an
//! interrupt handler and the main flow both talk to the chip, they must share
//! the driver (or the bus) through whatever mutual exclusion the application
//! uses. The driver works over `&mut I2C` as well as an owned bus, so it can
//! be built on demand inside such a critical section.
//!
//! # Example
//!
//! ```rust,ignore
//! use rtc_ds3231::{AlarmSpec, AlarmTime, CalendarTime, DS3231, DEFAULT_ADDRESS};
//!
//! let mut rtc = DS3231::new(i2c, DEFAULT_ADDRESS);
//! rtc.set_clock(&CalendarTime {
//!     seconds: 0, minutes: 30, hours: 14,
//!     day_of_week: 6, date: 20, month: 12, year: 24,
//! })?;
//! rtc.set_alarm1(&AlarmSpec::TimeOnly(AlarmTime { hours: 14, minutes: 31, seconds: 0 }))?;
//! let now = rtc.read_clock()?;
//! let temperature = rtc.read_temperature()?;
//! ```
//!
//! # Features
//!
//! - `async`: async driver in [`asynch`]
//! - `log`: debug logging through the `log` crate
//! - `defmt`: debug logging and `defmt::Format` impls through `defmt`

#![no_std]

#[macro_use]
mod fmt;

pub mod alarm;
#[cfg(feature = "async")]
pub mod asynch;
pub mod bcd;
pub mod datetime;
pub mod hour;
pub mod registers;
pub mod status;
pub mod temperature;

use chrono::NaiveDateTime;
use embedded_hal::i2c::I2c;

pub use alarm::{
    build_alarm_at_offset, decode_alarm1, decode_alarm2, encode_alarm1, encode_alarm2,
    AlarmSpec, AlarmTime,
};
pub use bcd::{bcd_to_decimal, decimal_to_bcd};
pub use datetime::{build_clock_write, parse_clock_read, CalendarTime, ClockRead};
pub use hour::{decode_hour, encode_hour, HourField};
pub use registers::*;
pub use status::{
    build_control_byte, clear_alarm_flags, read_status, square_wave_rate_bits, AlarmFlags,
    ControlFlags, StatusFlags,
};
pub use temperature::decode_temperature;

use alarm::{ALARM1_REGISTER_COUNT, ALARM2_REGISTER_COUNT};
use datetime::{clock_registers, CLOCK_REGISTER_COUNT};
use temperature::TEMPERATURE_REGISTER_COUNT;

/// The DS3231's fixed 7-bit I2C address.
pub const DEFAULT_ADDRESS: u8 = 0x68;

/// Errors from the pure register codecs.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CodecError {
    /// A value is outside its field's range; names the field
    OutOfRange(&'static str),
    /// `TimeOnly` requested for Alarm 2, which has no seconds register
    UnsupportedAlarmVariant,
    /// A register burst had the wrong number of bytes
    MalformedRegisterData {
        /// Bytes the register set needs
        expected: usize,
        /// Bytes supplied
        actual: usize,
    },
    /// An alarm interrupt is enabled while INT/SQW is in square wave mode
    InterruptModeConflict,
}

impl core::fmt::Display for CodecError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            CodecError::OutOfRange(field) => write!(f, "{field} out of range"),
            CodecError::UnsupportedAlarmVariant => {
                f.write_str("alarm 2 cannot match on time only")
            }
            CodecError::MalformedRegisterData { expected, actual } => {
                write!(f, "expected {expected} register bytes, got {actual}")
            }
            CodecError::InterruptModeConflict => {
                f.write_str("alarm interrupt enabled while INT/SQW outputs the square wave")
            }
        }
    }
}

impl core::error::Error for CodecError {}

/// Driver errors.
#[derive(Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DS3231Error<I2CE> {
    /// The bus transaction failed; the error is passed through untouched
    I2c(I2CE),
    /// A value could not be encoded, detected before any register write
    Codec(CodecError),
}

impl<I2CE> From<I2CE> for DS3231Error<I2CE> {
    fn from(e: I2CE) -> Self {
        DS3231Error::I2c(e)
    }
}

impl<I2CE: core::fmt::Debug> core::fmt::Display for DS3231Error<I2CE> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            DS3231Error::I2c(e) => write!(f, "I2C error: {e:?}"),
            DS3231Error::Codec(e) => write!(f, "{e}"),
        }
    }
}

/// Device configuration applied by [`DS3231::configure`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Config {
    /// Format for the hours register (clock and alarms written afterwards)
    pub hour_format: HourFormat,
    /// INT/SQW routing and alarm interrupt enables
    pub control: ControlFlags,
    /// Keep the square wave running on battery power
    pub battery_backed_square_wave: bool,
    /// Oscillator behaviour on battery power
    pub oscillator: Oscillator,
}

impl Default for Config {
    /// 24-hour clock, INT/SQW in interrupt mode with both alarms disabled.
    fn default() -> Self {
        Config {
            hour_format: HourFormat::TwentyFourHour,
            control: ControlFlags::alarm_interrupts(AlarmFlags::NONE),
            battery_backed_square_wave: false,
            oscillator: Oscillator::Enabled,
        }
    }
}

// Generates a raw getter and setter per register, returning the bitfield view.
macro_rules! impl_register_access {
    ($(($name:ident, $regaddr:expr, $typ:ty)),+) => {
        $(
            paste::paste! {
                #[doc = concat!("Reads the raw ", stringify!($name), " register.")]
                pub fn $name(&mut self) -> Result<$typ, DS3231Error<I2C::Error>> {
                    Ok(<$typ>::from(self.read_register($regaddr)?))
                }

                #[doc = concat!("Writes the raw ", stringify!($name), " register.")]
                pub fn [<set_ $name>](&mut self, value: $typ) -> Result<(), DS3231Error<I2C::Error>> {
                    self.write_register($regaddr, value.into())
                }
            }
        )+
    };
}

/// DS3231 Real-Time Clock driver over a blocking I2C bus.
pub struct DS3231<I2C: I2c> {
    i2c: I2C,
    address: u8,
    hour_format: HourFormat,
}

impl<I2C: I2c> DS3231<I2C> {
    /// Creates a driver. The hour format starts as 24-hour until
    /// [`configure`](Self::configure) or [`set_hour_format`](Self::set_hour_format)
    /// says otherwise.
    pub fn new(i2c: I2C, address: u8) -> Self {
        Self {
            i2c,
            address,
            hour_format: HourFormat::TwentyFourHour,
        }
    }

    /// Gives the bus back.
    pub fn release(self) -> I2C {
        self.i2c
    }

    /// Format used when writing the clock and alarm hours.
    pub fn hour_format(&self) -> HourFormat {
        self.hour_format
    }

    fn read_register(&mut self, addr: RegAddr) -> Result<u8, DS3231Error<I2C::Error>> {
        let mut data = [0];
        self.i2c
            .write_read(self.address, &[addr.into()], &mut data)?;
        debug!("DS3231: read {:?} = {:#x}", addr, data[0]);
        Ok(data[0])
    }

    fn write_register(&mut self, addr: RegAddr, value: u8) -> Result<(), DS3231Error<I2C::Error>> {
        debug!("DS3231: write {:?} = {:#x}", addr, value);
        self.i2c.write(self.address, &[addr.into(), value])?;
        Ok(())
    }

    fn read_registers(
        &mut self,
        start: RegAddr,
        data: &mut [u8],
    ) -> Result<(), DS3231Error<I2C::Error>> {
        self.i2c.write_read(self.address, &[start.into()], data)?;
        debug!("DS3231: burst read {:?} = {:?}", start, data);
        Ok(())
    }

    fn write_registers(&mut self, start: RegAddr, values: &[u8]) -> Result<(), DS3231Error<I2C::Error>> {
        let mut buf = [0u8; 1 + CLOCK_REGISTER_COUNT];
        let frame = buf
            .get_mut(..=values.len())
            .ok_or(DS3231Error::Codec(CodecError::MalformedRegisterData {
                expected: CLOCK_REGISTER_COUNT,
                actual: values.len(),
            }))?;
        frame[0] = start.into();
        frame[1..].copy_from_slice(values);
        debug!("DS3231: burst write {:?} = {:?}", start, values);
        self.i2c.write(self.address, frame)?;
        Ok(())
    }

    /// Applies `config`: control register (read-modify-write) and the hours
    /// register's 12/24 mode.
    ///
    /// # Errors
    ///
    /// [`CodecError::InterruptModeConflict`] (before anything is written) or
    /// a bus error.
    pub fn configure(&mut self, config: &Config) -> Result<(), DS3231Error<I2C::Error>> {
        let mut control = self.control()?;
        control.set_oscillator_enable(config.oscillator);
        control.set_battery_backed_square_wave(config.battery_backed_square_wave);
        let control = config
            .control
            .apply_to(control.into())
            .map_err(DS3231Error::Codec)?;
        debug!("DS3231: configure control={:#x}", control);
        self.set_control(Control::from(control))?;
        self.set_hour_format(config.hour_format)
    }

    /// Re-encodes the hours register in `format`, keeping the current hour.
    ///
    /// Alarm hours registers carry their own mode bit and are not rewritten;
    /// they keep decoding correctly and pick up the new format the next time
    /// an alarm is set.
    ///
    /// # Errors
    ///
    /// [`CodecError::OutOfRange`] if the stored hour is not a valid hour, or a
    /// bus error.
    pub fn set_hour_format(&mut self, format: HourFormat) -> Result<(), DS3231Error<I2C::Error>> {
        let current = HourField::from_register(self.hour()?.into());
        let hours = encode_hour(format, current.to_hour24()).map_err(DS3231Error::Codec)?;
        self.set_hour(Hours::from(hours))?;
        self.hour_format = format;
        Ok(())
    }

    /// Sets the clock in one 7-register burst.
    ///
    /// # Errors
    ///
    /// [`CodecError::OutOfRange`] (nothing is written) or a bus error.
    pub fn set_clock(&mut self, time: &CalendarTime) -> Result<(), DS3231Error<I2C::Error>> {
        let raw = clock_registers(time, self.hour_format).map_err(DS3231Error::Codec)?;
        self.write_registers(RegAddr::Seconds, &raw)
    }

    /// Reads the clock in one 7-register burst.
    ///
    /// # Errors
    ///
    /// A bus error.
    pub fn read_clock(&mut self) -> Result<ClockRead, DS3231Error<I2C::Error>> {
        let mut data = [0; CLOCK_REGISTER_COUNT];
        self.read_registers(RegAddr::Seconds, &mut data)?;
        parse_clock_read(&data).map_err(DS3231Error::Codec)
    }

    /// Reads the clock as a chrono `NaiveDateTime`.
    ///
    /// # Errors
    ///
    /// [`CodecError::OutOfRange`] when the registers hold an impossible date,
    /// or a bus error.
    pub fn datetime(&mut self) -> Result<NaiveDateTime, DS3231Error<I2C::Error>> {
        self.read_clock()?
            .to_naive_datetime()
            .map_err(DS3231Error::Codec)
    }

    /// Sets the clock from a chrono `NaiveDateTime` (years 2000-2099).
    ///
    /// # Errors
    ///
    /// [`CodecError::OutOfRange`] for other years, or a bus error.
    pub fn set_datetime(&mut self, datetime: &NaiveDateTime) -> Result<(), DS3231Error<I2C::Error>> {
        let time = CalendarTime::try_from(datetime).map_err(DS3231Error::Codec)?;
        self.set_clock(&time)
    }

    /// Programs Alarm 1 in one 4-register burst.
    ///
    /// # Errors
    ///
    /// [`CodecError::OutOfRange`] (nothing is written) or a bus error.
    pub fn set_alarm1(&mut self, spec: &AlarmSpec) -> Result<(), DS3231Error<I2C::Error>> {
        let raw = encode_alarm1(spec, self.hour_format).map_err(DS3231Error::Codec)?;
        self.write_registers(RegAddr::Alarm1Seconds, &raw)
    }

    /// Reads Alarm 1.
    ///
    /// # Errors
    ///
    /// A bus error.
    pub fn read_alarm1(&mut self) -> Result<AlarmSpec, DS3231Error<I2C::Error>> {
        let mut data = [0; ALARM1_REGISTER_COUNT];
        self.read_registers(RegAddr::Alarm1Seconds, &mut data)?;
        decode_alarm1(&data).map_err(DS3231Error::Codec)
    }

    /// Programs Alarm 2 in one 3-register burst.
    ///
    /// # Errors
    ///
    /// [`CodecError::UnsupportedAlarmVariant`] for `TimeOnly`,
    /// [`CodecError::OutOfRange`] (nothing is written), or a bus error.
    pub fn set_alarm2(&mut self, spec: &AlarmSpec) -> Result<(), DS3231Error<I2C::Error>> {
        let raw = encode_alarm2(spec, self.hour_format).map_err(DS3231Error::Codec)?;
        self.write_registers(RegAddr::Alarm2Minutes, &raw)
    }

    /// Reads Alarm 2.
    ///
    /// # Errors
    ///
    /// A bus error.
    pub fn read_alarm2(&mut self) -> Result<AlarmSpec, DS3231Error<I2C::Error>> {
        let mut data = [0; ALARM2_REGISTER_COUNT];
        self.read_registers(RegAddr::Alarm2Minutes, &mut data)?;
        decode_alarm2(&data).map_err(DS3231Error::Codec)
    }

    /// Sets Alarm 1 to fire `offset_minutes` from the current clock time on
    /// the matching day of week, and returns what was programmed.
    ///
    /// # Errors
    ///
    /// [`CodecError::OutOfRange`] if the clock holds an invalid time, or a
    /// bus error.
    pub fn set_alarm1_after(
        &mut self,
        offset_minutes: u16,
    ) -> Result<AlarmSpec, DS3231Error<I2C::Error>> {
        let now = self.read_clock()?;
        let spec = build_alarm_at_offset(&now.time, offset_minutes).map_err(DS3231Error::Codec)?;
        self.set_alarm1(&spec)?;
        Ok(spec)
    }

    /// Reads the temperature in degrees Celsius.
    ///
    /// # Errors
    ///
    /// A bus error.
    pub fn read_temperature(&mut self) -> Result<f32, DS3231Error<I2C::Error>> {
        let mut data = [0; TEMPERATURE_REGISTER_COUNT];
        self.read_registers(RegAddr::MSBTemp, &mut data)?;
        Ok(decode_temperature(data[0], data[1]))
    }

    /// Reads the status flags. Nothing is cleared.
    ///
    /// # Errors
    ///
    /// A bus error.
    pub fn read_status(&mut self) -> Result<StatusFlags, DS3231Error<I2C::Error>> {
        Ok(read_status(self.read_register(RegAddr::ControlStatus)?))
    }

    /// Clears the selected alarm flags, leaving every other status bit as is.
    ///
    /// # Errors
    ///
    /// A bus error.
    pub fn clear_alarm_flags(&mut self, which: AlarmFlags) -> Result<(), DS3231Error<I2C::Error>> {
        if which.is_empty() {
            return Ok(());
        }
        let current = self.read_register(RegAddr::ControlStatus)?;
        self.write_register(RegAddr::ControlStatus, clear_alarm_flags(current, which))
    }

    /// Clears the oscillator-stop flag, typically after setting the clock.
    ///
    /// # Errors
    ///
    /// A bus error.
    pub fn clear_oscillator_stop_flag(&mut self) -> Result<(), DS3231Error<I2C::Error>> {
        let current = self.read_register(RegAddr::ControlStatus)?;
        self.write_register(
            RegAddr::ControlStatus,
            status::clear_oscillator_stop_flag(current),
        )
    }

    /// Handles an INT/SQW interrupt: reads the status register, clears the
    /// alarm flags found set, and returns the flags as they were read.
    ///
    /// # Errors
    ///
    /// A bus error.
    pub fn service_alarm_interrupt(&mut self) -> Result<StatusFlags, DS3231Error<I2C::Error>> {
        let current = self.read_register(RegAddr::ControlStatus)?;
        let flags = read_status(current);
        let triggered = flags.triggered();
        if !triggered.is_empty() {
            debug!("DS3231: alarm fired {:?}", triggered);
            self.write_register(RegAddr::ControlStatus, clear_alarm_flags(current, triggered))?;
        }
        Ok(flags)
    }

    /// Reads the INT/SQW routing and alarm interrupt enables.
    ///
    /// # Errors
    ///
    /// A bus error.
    pub fn control_flags(&mut self) -> Result<ControlFlags, DS3231Error<I2C::Error>> {
        Ok(ControlFlags::from_register(self.read_register(RegAddr::Control)?))
    }

    /// Writes the INT/SQW routing and alarm interrupt enables, keeping the
    /// oscillator, battery square wave and conversion bits.
    ///
    /// # Errors
    ///
    /// [`CodecError::InterruptModeConflict`] (nothing is written) or a bus
    /// error.
    pub fn set_control_flags(&mut self, flags: &ControlFlags) -> Result<(), DS3231Error<I2C::Error>> {
        let current = self.read_register(RegAddr::Control)?;
        let control = flags.apply_to(current).map_err(DS3231Error::Codec)?;
        self.write_register(RegAddr::Control, control)
    }

    /// Switches INT/SQW to the square wave at `rate`.
    ///
    /// The pin can carry only one signal, so both alarm interrupt enables are
    /// cleared as part of the switch. The alarms still set their status flags.
    ///
    /// # Errors
    ///
    /// A bus error.
    pub fn set_square_wave_rate(&mut self, rate: SquareWaveRate) -> Result<(), DS3231Error<I2C::Error>> {
        self.set_control_flags(&ControlFlags::square_wave(rate))
    }

    /// Switches INT/SQW back to interrupt mode. Alarm enables and the rate
    /// bits are left untouched.
    ///
    /// # Errors
    ///
    /// A bus error.
    pub fn disable_square_wave(&mut self) -> Result<(), DS3231Error<I2C::Error>> {
        let mut control = self.control()?;
        control.set_interrupt_control(true);
        self.set_control(control)
    }

    impl_register_access!(
        (hour, RegAddr::Hours, Hours),
        (control, RegAddr::Control, Control),
        (status, RegAddr::ControlStatus, Status),
        (aging_offset, RegAddr::AgingOffset, AgingOffset)
    );
}

#[cfg(test)]
mod tests {
    extern crate alloc;
    use super::*;
    use alloc::vec;
    use chrono::{Datelike, NaiveDate, Timelike};
    use embedded_hal::i2c::ErrorKind;
    use embedded_hal_mock::eh1::i2c::{Mock as I2cMock, Transaction as I2cTrans};

    const DEVICE_ADDRESS: u8 = DEFAULT_ADDRESS;

    fn setup(expectations: &[I2cTrans]) -> DS3231<I2cMock> {
        DS3231::new(I2cMock::new(expectations), DEVICE_ADDRESS)
    }

    fn friday_afternoon() -> CalendarTime {
        // Friday 2024-12-20 14:30:00
        CalendarTime {
            seconds: 0,
            minutes: 30,
            hours: 14,
            day_of_week: 6,
            date: 20,
            month: 12,
            year: 24,
        }
    }

    #[test]
    fn test_set_clock_is_one_burst() {
        let mut dev = setup(&[I2cTrans::write(
            DEVICE_ADDRESS,
            vec![
                RegAddr::Seconds as u8,
                0x00,
                0x30,
                0x14,
                0x06,
                0x20,
                0x12,
                0x24,
            ],
        )]);
        dev.set_clock(&friday_afternoon()).unwrap();
        dev.i2c.done();
    }

    #[test]
    fn test_set_clock_rejects_before_writing() {
        let mut dev = setup(&[]);
        let time = CalendarTime {
            minutes: 60,
            ..friday_afternoon()
        };
        let err = dev.set_clock(&time).unwrap_err();
        assert!(matches!(
            err,
            DS3231Error::Codec(CodecError::OutOfRange("minutes"))
        ));
        dev.i2c.done();
    }

    #[test]
    fn test_read_clock_is_one_burst() {
        let mut dev = setup(&[I2cTrans::write_read(
            DEVICE_ADDRESS,
            vec![RegAddr::Seconds as u8],
            vec![0x00, 0x30, 0x62, 0x06, 0x20, 0x12, 0x24],
        )]);
        let read = dev.read_clock().unwrap();
        assert_eq!(read.time, friday_afternoon());
        assert_eq!(
            read.hour,
            HourField::TwelveHour {
                hour: 2,
                is_pm: true
            }
        );
        dev.i2c.done();
    }

    #[test]
    fn test_datetime_round_trip_through_chrono() {
        let dt = NaiveDate::from_ymd_opt(2024, 12, 20)
            .unwrap()
            .and_hms_opt(14, 30, 0)
            .unwrap();
        let registers = vec![0x00, 0x30, 0x14, 0x06, 0x20, 0x12, 0x24];
        let mut write = vec![RegAddr::Seconds as u8];
        write.extend_from_slice(&registers);
        let mut dev = setup(&[
            I2cTrans::write(DEVICE_ADDRESS, write),
            I2cTrans::write_read(DEVICE_ADDRESS, vec![RegAddr::Seconds as u8], registers),
        ]);
        dev.set_datetime(&dt).unwrap();
        let read = dev.datetime().unwrap();
        assert_eq!(read, dt);
        assert_eq!(read.year(), 2024);
        assert_eq!(read.hour(), 14);
        dev.i2c.done();
    }

    #[test]
    fn test_configure_twelve_hour_with_alarm1_interrupt() {
        let config = Config {
            hour_format: HourFormat::TwelveHour,
            control: ControlFlags::alarm_interrupts(AlarmFlags::ALARM1),
            ..Config::default()
        };
        let mut dev = setup(&[
            // power-on control: INTCN, RS = 8.192 kHz
            I2cTrans::write_read(DEVICE_ADDRESS, vec![RegAddr::Control as u8], vec![0x1C]),
            I2cTrans::write(DEVICE_ADDRESS, vec![RegAddr::Control as u8, 0x05]),
            // 15:00 in 24-hour mode becomes 3 PM
            I2cTrans::write_read(DEVICE_ADDRESS, vec![RegAddr::Hours as u8], vec![0x15]),
            I2cTrans::write(DEVICE_ADDRESS, vec![RegAddr::Hours as u8, 0x63]),
        ]);
        dev.configure(&config).unwrap();
        assert_eq!(dev.hour_format(), HourFormat::TwelveHour);
        dev.i2c.done();
    }

    #[test]
    fn test_configure_conflict_writes_nothing() {
        let config = Config {
            control: ControlFlags {
                interrupt_control_enabled: false,
                alarm1_interrupt_enabled: true,
                alarm2_interrupt_enabled: false,
                square_wave_rate: SquareWaveRate::Hz1,
            },
            ..Config::default()
        };
        let mut dev = setup(&[I2cTrans::write_read(
            DEVICE_ADDRESS,
            vec![RegAddr::Control as u8],
            vec![0x1C],
        )]);
        let err = dev.configure(&config).unwrap_err();
        assert!(matches!(
            err,
            DS3231Error::Codec(CodecError::InterruptModeConflict)
        ));
        dev.i2c.done();
    }

    #[test]
    fn test_alarm1_set_and_read() {
        let spec = AlarmSpec::TimeOnly(AlarmTime {
            hours: 16,
            minutes: 52,
            seconds: 0,
        });
        let mut dev = setup(&[
            I2cTrans::write(
                DEVICE_ADDRESS,
                vec![RegAddr::Alarm1Seconds as u8, 0x00, 0x52, 0x16, 0x80],
            ),
            I2cTrans::write_read(
                DEVICE_ADDRESS,
                vec![RegAddr::Alarm1Seconds as u8],
                vec![0x00, 0x52, 0x16, 0x80],
            ),
        ]);
        dev.set_alarm1(&spec).unwrap();
        assert_eq!(dev.read_alarm1().unwrap(), spec);
        dev.i2c.done();
    }

    #[test]
    fn test_alarm2_set_and_read() {
        let spec = AlarmSpec::DayMatch {
            time: AlarmTime {
                hours: 7,
                minutes: 15,
                seconds: 0,
            },
            day: 2,
        };
        let mut dev = setup(&[
            I2cTrans::write(
                DEVICE_ADDRESS,
                vec![RegAddr::Alarm2Minutes as u8, 0x15, 0x07, 0x42],
            ),
            I2cTrans::write_read(
                DEVICE_ADDRESS,
                vec![RegAddr::Alarm2Minutes as u8],
                vec![0x15, 0x07, 0x42],
            ),
        ]);
        dev.set_alarm2(&spec).unwrap();
        assert_eq!(dev.read_alarm2().unwrap(), spec);
        dev.i2c.done();
    }

    #[test]
    fn test_alarm2_time_only_rejected_without_bus_traffic() {
        let mut dev = setup(&[]);
        let err = dev
            .set_alarm2(&AlarmSpec::TimeOnly(AlarmTime::default()))
            .unwrap_err();
        assert!(matches!(
            err,
            DS3231Error::Codec(CodecError::UnsupportedAlarmVariant)
        ));
        dev.i2c.done();
    }

    #[test]
    fn test_set_alarm1_after() {
        let mut dev = setup(&[
            // 14:59:00 Friday
            I2cTrans::write_read(
                DEVICE_ADDRESS,
                vec![RegAddr::Seconds as u8],
                vec![0x00, 0x59, 0x14, 0x06, 0x20, 0x12, 0x24],
            ),
            // 15:00:00 on day 6
            I2cTrans::write(
                DEVICE_ADDRESS,
                vec![RegAddr::Alarm1Seconds as u8, 0x00, 0x00, 0x15, 0x46],
            ),
        ]);
        let spec = dev.set_alarm1_after(1).unwrap();
        assert_eq!(
            spec,
            AlarmSpec::DayMatch {
                time: AlarmTime {
                    hours: 15,
                    minutes: 0,
                    seconds: 0,
                },
                day: 6,
            }
        );
        dev.i2c.done();
    }

    #[test]
    fn test_read_temperature() {
        let mut dev = setup(&[
            I2cTrans::write_read(
                DEVICE_ADDRESS,
                vec![RegAddr::MSBTemp as u8],
                vec![0x19, 0x40],
            ),
            I2cTrans::write_read(
                DEVICE_ADDRESS,
                vec![RegAddr::MSBTemp as u8],
                vec![0xF6, 0x80],
            ),
        ]);
        assert_eq!(dev.read_temperature().unwrap(), 25.25);
        assert_eq!(dev.read_temperature().unwrap(), -9.5);
        dev.i2c.done();
    }

    #[test]
    fn test_read_status_does_not_clear() {
        let mut dev = setup(&[I2cTrans::write_read(
            DEVICE_ADDRESS,
            vec![RegAddr::ControlStatus as u8],
            vec![0x81],
        )]);
        let flags = dev.read_status().unwrap();
        assert!(flags.oscillator_stopped);
        assert!(flags.alarm1_triggered);
        assert!(!flags.alarm2_triggered);
        dev.i2c.done();
    }

    #[test]
    fn test_clear_alarm_flags_read_modify_write() {
        let mut dev = setup(&[
            I2cTrans::write_read(
                DEVICE_ADDRESS,
                vec![RegAddr::ControlStatus as u8],
                vec![0x8B],
            ),
            I2cTrans::write(DEVICE_ADDRESS, vec![RegAddr::ControlStatus as u8, 0x8A]),
        ]);
        dev.clear_alarm_flags(AlarmFlags::ALARM1).unwrap();
        dev.clear_alarm_flags(AlarmFlags::NONE).unwrap();
        dev.i2c.done();
    }

    #[test]
    fn test_clear_oscillator_stop_flag() {
        let mut dev = setup(&[
            I2cTrans::write_read(
                DEVICE_ADDRESS,
                vec![RegAddr::ControlStatus as u8],
                vec![0x89],
            ),
            I2cTrans::write(DEVICE_ADDRESS, vec![RegAddr::ControlStatus as u8, 0x09]),
        ]);
        dev.clear_oscillator_stop_flag().unwrap();
        dev.i2c.done();
    }

    #[test]
    fn test_service_alarm_interrupt() {
        let mut dev = setup(&[
            I2cTrans::write_read(
                DEVICE_ADDRESS,
                vec![RegAddr::ControlStatus as u8],
                vec![0x8A],
            ),
            I2cTrans::write(DEVICE_ADDRESS, vec![RegAddr::ControlStatus as u8, 0x88]),
            // nothing fired: no write
            I2cTrans::write_read(
                DEVICE_ADDRESS,
                vec![RegAddr::ControlStatus as u8],
                vec![0x08],
            ),
        ]);
        let flags = dev.service_alarm_interrupt().unwrap();
        assert!(flags.alarm2_triggered);
        assert!(!flags.alarm1_triggered);
        assert!(flags.oscillator_stopped);
        let flags = dev.service_alarm_interrupt().unwrap();
        assert_eq!(flags, StatusFlags::default());
        dev.i2c.done();
    }

    #[test]
    fn test_service_alarm_interrupt_through_borrowed_bus() {
        let mut i2c = I2cMock::new(&[
            I2cTrans::write_read(
                DEVICE_ADDRESS,
                vec![RegAddr::ControlStatus as u8],
                vec![0x01],
            ),
            I2cTrans::write(DEVICE_ADDRESS, vec![RegAddr::ControlStatus as u8, 0x00]),
        ]);
        {
            let mut handler = DS3231::new(&mut i2c, DEVICE_ADDRESS);
            assert!(handler.service_alarm_interrupt().unwrap().alarm1_triggered);
        }
        i2c.done();
    }

    #[test]
    fn test_square_wave_switching() {
        let mut dev = setup(&[
            // interrupt mode with A1IE, EOSC clear
            I2cTrans::write_read(DEVICE_ADDRESS, vec![RegAddr::Control as u8], vec![0x05]),
            I2cTrans::write(DEVICE_ADDRESS, vec![RegAddr::Control as u8, 0x08]),
            I2cTrans::write_read(DEVICE_ADDRESS, vec![RegAddr::Control as u8], vec![0x48]),
            I2cTrans::write(DEVICE_ADDRESS, vec![RegAddr::Control as u8, 0x4C]),
        ]);
        dev.set_square_wave_rate(SquareWaveRate::Hz1024).unwrap();
        dev.disable_square_wave().unwrap();
        dev.i2c.done();
    }

    #[test]
    fn test_control_flags_round_trip() {
        let flags = ControlFlags::alarm_interrupts(AlarmFlags::BOTH);
        let mut dev = setup(&[
            I2cTrans::write_read(DEVICE_ADDRESS, vec![RegAddr::Control as u8], vec![0x80]),
            I2cTrans::write(DEVICE_ADDRESS, vec![RegAddr::Control as u8, 0x87]),
            I2cTrans::write_read(DEVICE_ADDRESS, vec![RegAddr::Control as u8], vec![0x87]),
        ]);
        dev.set_control_flags(&flags).unwrap();
        assert_eq!(dev.control_flags().unwrap(), flags);
        dev.i2c.done();
    }

    #[test]
    fn test_raw_register_access() {
        let mut dev = setup(&[
            I2cTrans::write_read(
                DEVICE_ADDRESS,
                vec![RegAddr::AgingOffset as u8],
                vec![0xFE],
            ),
            I2cTrans::write(DEVICE_ADDRESS, vec![RegAddr::AgingOffset as u8, 0x03]),
        ]);
        assert_eq!(dev.aging_offset().unwrap().aging_offset(), -2);
        dev.set_aging_offset(AgingOffset::from(0x03)).unwrap();
        dev.i2c.done();
    }

    #[test]
    fn test_bus_error_passes_through() {
        let mut dev = setup(&[I2cTrans::write_read(
            DEVICE_ADDRESS,
            vec![RegAddr::ControlStatus as u8],
            vec![0x00],
        )
        .with_error(ErrorKind::Other)]);
        let err = dev.read_status().unwrap_err();
        assert!(matches!(err, DS3231Error::I2c(ErrorKind::Other)));
        dev.i2c.done();
    }

    #[test]
    fn test_error_display() {
        use alloc::string::ToString;
        assert_eq!(
            CodecError::OutOfRange("seconds").to_string(),
            "seconds out of range"
        );
        assert_eq!(
            CodecError::MalformedRegisterData {
                expected: 7,
                actual: 3
            }
            .to_string(),
            "expected 7 register bytes, got 3"
        );
        let err: DS3231Error<ErrorKind> = DS3231Error::Codec(CodecError::UnsupportedAlarmVariant);
        assert_eq!(err.to_string(), "alarm 2 cannot match on time only");
    }
}
