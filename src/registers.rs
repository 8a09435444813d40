//! Register map and bit-level register views for the DS3231.
//!
//! Addresses are a fixed lookup table, never computed. The `bitfield` structs
//! name the bits the codecs touch; every field accessor is total over `u8`, so
//! no register byte read from the chip can make these types panic.

use bitfield::bitfield;

/// Register addresses for the DS3231 RTC.
#[allow(unused)]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RegAddr {
    /// Seconds register (BCD 0-59)
    Seconds = 0x00,
    /// Minutes register (BCD 0-59)
    Minutes = 0x01,
    /// Hours register (BCD + 12/24 mode bit + AM/PM bit)
    Hours = 0x02,
    /// Day-of-week register (1-7, 1 = Sunday)
    Day = 0x03,
    /// Date register (BCD 1-31)
    Date = 0x04,
    /// Month register (BCD 1-12, bit 7 = century)
    Month = 0x05,
    /// Year register (BCD 0-99)
    Year = 0x06,
    /// Alarm 1 seconds register
    Alarm1Seconds = 0x07,
    /// Alarm 1 minutes register
    Alarm1Minutes = 0x08,
    /// Alarm 1 hours register
    Alarm1Hours = 0x09,
    /// Alarm 1 day/date register
    Alarm1DayDate = 0x0A,
    /// Alarm 2 minutes register
    Alarm2Minutes = 0x0B,
    /// Alarm 2 hours register
    Alarm2Hours = 0x0C,
    /// Alarm 2 day/date register
    Alarm2DayDate = 0x0D,
    /// Control register
    Control = 0x0E,
    /// Control/Status register
    ControlStatus = 0x0F,
    /// Aging offset register
    AgingOffset = 0x10,
    /// Temperature MSB register (signed degrees)
    MSBTemp = 0x11,
    /// Temperature LSB register (quarter degrees in bits 7:6)
    LSBTemp = 0x12,
}

impl RegAddr {
    /// The clock registers in burst order, starting at [`RegAddr::Seconds`].
    pub const CLOCK: [RegAddr; 7] = [
        RegAddr::Seconds,
        RegAddr::Minutes,
        RegAddr::Hours,
        RegAddr::Day,
        RegAddr::Date,
        RegAddr::Month,
        RegAddr::Year,
    ];

    /// The Alarm 1 registers in burst order.
    pub const ALARM1: [RegAddr; 4] = [
        RegAddr::Alarm1Seconds,
        RegAddr::Alarm1Minutes,
        RegAddr::Alarm1Hours,
        RegAddr::Alarm1DayDate,
    ];

    /// The Alarm 2 registers in burst order.
    pub const ALARM2: [RegAddr; 3] = [
        RegAddr::Alarm2Minutes,
        RegAddr::Alarm2Hours,
        RegAddr::Alarm2DayDate,
    ];
}

impl From<RegAddr> for u8 {
    fn from(v: RegAddr) -> Self {
        v as u8
    }
}

/// How the hours register is packed (bit 6 of the hours register).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HourFormat {
    /// 24-hour format (0-23)
    #[default]
    TwentyFourHour = 0,
    /// 12-hour format (1-12 + AM/PM)
    TwelveHour = 1,
}
impl From<u8> for HourFormat {
    /// Only bit 0 is significant.
    fn from(v: u8) -> Self {
        match v & 0b1 {
            0 => HourFormat::TwentyFourHour,
            _ => HourFormat::TwelveHour,
        }
    }
}
impl From<HourFormat> for u8 {
    fn from(v: HourFormat) -> Self {
        v as u8
    }
}

/// Oscillator control (EOSC, active low) for battery operation.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Oscillator {
    /// Oscillator keeps running on battery power
    #[default]
    Enabled = 0,
    /// Oscillator stops when switched to battery power
    Disabled = 1,
}
impl From<u8> for Oscillator {
    /// Only bit 0 is significant.
    fn from(v: u8) -> Self {
        match v & 0b1 {
            0 => Oscillator::Enabled,
            _ => Oscillator::Disabled,
        }
    }
}
impl From<Oscillator> for u8 {
    fn from(v: Oscillator) -> Self {
        v as u8
    }
}

/// Square wave output rate (RS2:RS1 bits of the control register).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SquareWaveRate {
    /// 1 Hz
    #[default]
    Hz1 = 0b00,
    /// 1.024 kHz
    Hz1024 = 0b01,
    /// 4.096 kHz
    Hz4096 = 0b10,
    /// 8.192 kHz
    Hz8192 = 0b11,
}
impl From<u8> for SquareWaveRate {
    /// Only bits 1:0 are significant.
    fn from(v: u8) -> Self {
        match v & 0b11 {
            0b00 => SquareWaveRate::Hz1,
            0b01 => SquareWaveRate::Hz1024,
            0b10 => SquareWaveRate::Hz4096,
            _ => SquareWaveRate::Hz8192,
        }
    }
}
impl From<SquareWaveRate> for u8 {
    fn from(v: SquareWaveRate) -> Self {
        v as u8
    }
}

/// Day/Date select for alarm registers (DY/DT bit).
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DayDateSelect {
    /// Match against date of the month (1-31)
    Date = 0,
    /// Match against day of the week (1-7, where 1=Sunday)
    Day = 1,
}
impl From<u8> for DayDateSelect {
    /// Only bit 0 is significant.
    fn from(v: u8) -> Self {
        match v & 0b1 {
            0 => DayDateSelect::Date,
            _ => DayDateSelect::Day,
        }
    }
}
impl From<DayDateSelect> for u8 {
    fn from(v: DayDateSelect) -> Self {
        v as u8
    }
}

// This macro generates the From<u8> and Into<u8> implementations for the
// register type
macro_rules! from_register_u8 {
    ($typ:ty) => {
        impl From<u8> for $typ {
            fn from(v: u8) -> Self {
                paste::paste!([< $typ >](v))
            }
        }
        impl From<$typ> for u8 {
            fn from(v: $typ) -> Self {
                v.0
            }
        }
    };
}

bitfield! {
    /// Hours register, shared layout with the alarm hours registers.
    ///
    /// In 24-hour mode bits 5:0 hold the BCD hour; in 12-hour mode bits 4:0
    /// hold the BCD hour and bit 5 is the PM flag.
    #[derive(Clone, Copy, Default, PartialEq)]
    pub struct Hours(u8);
    impl Debug;
    /// Alarm mask bit (alarm registers only)
    pub alarm_mask, set_alarm_mask: 7;
    /// 12/24 hour mode select
    pub from into HourFormat, hour_format, set_hour_format: 6, 6;
    /// PM flag in 12-hour mode, 20-hour digit in 24-hour mode
    pub pm, set_pm: 5;
    /// BCD hour value in 24-hour mode
    pub twenty_four_hour_bcd, set_twenty_four_hour_bcd: 5, 0;
    /// BCD hour value in 12-hour mode
    pub twelve_hour_bcd, set_twelve_hour_bcd: 4, 0;
}
from_register_u8!(Hours);

bitfield! {
    /// Month register with the century flag.
    #[derive(Clone, Copy, Default, PartialEq)]
    pub struct Month(u8);
    impl Debug;
    /// Set when the year counter rolls over from 99
    pub century, set_century: 7;
    /// BCD month value (1-12)
    pub month_bcd, set_month_bcd: 4, 0;
}
from_register_u8!(Month);

bitfield! {
    /// Alarm Day/Date register with mask bit and DY/DT control.
    #[derive(Clone, Copy, Default, PartialEq)]
    pub struct AlarmDayDate(u8);
    impl Debug;
    /// Alarm mask bit 4 (A1M4/A2M4): ignore day and date when set
    pub alarm_mask4, set_alarm_mask4: 7;
    /// Day/Date select (1=day of week, 0=date of month)
    pub from into DayDateSelect, day_date_select, set_day_date_select: 6, 6;
    /// BCD day of week or date of month
    pub day_or_date_bcd, set_day_or_date_bcd: 5, 0;
}
from_register_u8!(AlarmDayDate);

bitfield! {
    /// Control register.
    #[derive(Clone, Copy, Default, PartialEq)]
    pub struct Control(u8);
    impl Debug;
    /// EOSC, active low
    pub from into Oscillator, oscillator_enable, set_oscillator_enable: 7, 7;
    /// BBSQW: keep the square wave running on battery power
    pub battery_backed_square_wave, set_battery_backed_square_wave: 6;
    /// CONV: force a temperature conversion
    pub convert_temperature, set_convert_temperature: 5;
    /// RS2:RS1
    pub from into SquareWaveRate, square_wave_rate, set_square_wave_rate: 4, 3;
    /// INTCN: INT/SQW pin carries alarm interrupts when set, the square wave when clear
    pub interrupt_control, set_interrupt_control: 2;
    /// A2IE
    pub alarm2_interrupt_enable, set_alarm2_interrupt_enable: 1;
    /// A1IE
    pub alarm1_interrupt_enable, set_alarm1_interrupt_enable: 0;
}
from_register_u8!(Control);

bitfield! {
    /// Status register.
    #[derive(Clone, Copy, Default, PartialEq)]
    pub struct Status(u8);
    impl Debug;
    /// OSF: the oscillator stopped at some point since the flag was cleared
    pub oscillator_stop_flag, set_oscillator_stop_flag: 7;
    /// EN32kHz
    pub enable_32khz_output, set_enable_32khz_output: 3;
    /// BSY: temperature conversion in progress
    pub busy, set_busy: 2;
    /// A2F
    pub alarm2_flag, set_alarm2_flag: 1;
    /// A1F
    pub alarm1_flag, set_alarm1_flag: 0;
}
from_register_u8!(Status);

bitfield! {
    /// Aging offset register for oscillator trimming.
    #[derive(Clone, Copy, Default, PartialEq)]
    pub struct AgingOffset(u8);
    impl Debug;
    /// Signed offset (-128 to +127)
    pub i8, aging_offset, set_aging_offset: 7, 0;
}
from_register_u8!(AgingOffset);

bitfield! {
    /// Temperature MSB register.
    #[derive(Clone, Copy, Default, PartialEq)]
    pub struct Temperature(u8);
    impl Debug;
    /// Whole degrees, two's complement
    pub i8, degrees, set_degrees: 7, 0;
}
from_register_u8!(Temperature);

bitfield! {
    /// Temperature LSB register.
    #[derive(Clone, Copy, Default, PartialEq)]
    pub struct TemperatureFraction(u8);
    impl Debug;
    /// Quarter degrees (0-3)
    pub quarters, set_quarters: 7, 6;
}
from_register_u8!(TemperatureFraction);
