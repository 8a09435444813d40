//! Async DS3231 driver.
//!
//! Same operations and error handling as the blocking [`crate::DS3231`], over
//! `embedded-hal-async`. Only available with the `async` feature.
//!
//! # Example
//!
//! ```rust,ignore
//! use rtc_ds3231::{asynch::DS3231, AlarmFlags, DEFAULT_ADDRESS};
//!
//! let mut rtc = DS3231::new(i2c, DEFAULT_ADDRESS);
//! rtc.configure(&config).await?;
//! let alarm = rtc.set_alarm1_after(15).await?;
//!
//! // later, from the INT/SQW edge
//! let status = rtc.service_alarm_interrupt().await?;
//! ```

use chrono::NaiveDateTime;
use embedded_hal_async::i2c::I2c;
use paste::paste;

use crate::alarm::{ALARM1_REGISTER_COUNT, ALARM2_REGISTER_COUNT};
use crate::datetime::{clock_registers, CLOCK_REGISTER_COUNT};
use crate::temperature::TEMPERATURE_REGISTER_COUNT;
use crate::{
    build_alarm_at_offset, clear_alarm_flags, decode_alarm1, decode_alarm2, decode_temperature,
    encode_alarm1, encode_alarm2, encode_hour, parse_clock_read, read_status, status,
    AgingOffset, AlarmFlags, AlarmSpec, CalendarTime, ClockRead, CodecError, Config, Control,
    ControlFlags, DS3231Error, HourField, HourFormat, Hours, RegAddr, SquareWaveRate, Status,
    StatusFlags,
};

/// DS3231 Real-Time Clock driver over an async I2C bus.
pub struct DS3231<I2C: I2c> {
    i2c: I2C,
    address: u8,
    hour_format: HourFormat,
}

impl<I2C: I2c> DS3231<I2C> {
    /// Creates a driver in 24-hour format.
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

    async fn read_register(&mut self, addr: RegAddr) -> Result<u8, DS3231Error<I2C::Error>> {
        let mut data = [0];
        self.i2c
            .write_read(self.address, &[addr.into()], &mut data)
            .await?;
        debug!("DS3231: read {:?} = {:#x}", addr, data[0]);
        Ok(data[0])
    }

    async fn write_register(
        &mut self,
        addr: RegAddr,
        value: u8,
    ) -> Result<(), DS3231Error<I2C::Error>> {
        debug!("DS3231: write {:?} = {:#x}", addr, value);
        self.i2c.write(self.address, &[addr.into(), value]).await?;
        Ok(())
    }

    async fn read_registers(
        &mut self,
        start: RegAddr,
        data: &mut [u8],
    ) -> Result<(), DS3231Error<I2C::Error>> {
        self.i2c
            .write_read(self.address, &[start.into()], data)
            .await?;
        debug!("DS3231: burst read {:?} = {:?}", start, data);
        Ok(())
    }

    async fn write_registers(
        &mut self,
        start: RegAddr,
        values: &[u8],
    ) -> Result<(), DS3231Error<I2C::Error>> {
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
        self.i2c.write(self.address, frame).await?;
        Ok(())
    }

    /// Applies `config`. See [`crate::DS3231::configure`].
    pub async fn configure(&mut self, config: &Config) -> Result<(), DS3231Error<I2C::Error>> {
        let mut control = self.control().await?;
        control.set_oscillator_enable(config.oscillator);
        control.set_battery_backed_square_wave(config.battery_backed_square_wave);
        let control = config
            .control
            .apply_to(control.into())
            .map_err(DS3231Error::Codec)?;
        debug!("DS3231: configure control={:#x}", control);
        self.set_control(Control::from(control)).await?;
        self.set_hour_format(config.hour_format).await
    }

    /// Re-encodes the hours register in `format`, keeping the current hour.
    pub async fn set_hour_format(
        &mut self,
        format: HourFormat,
    ) -> Result<(), DS3231Error<I2C::Error>> {
        let current = HourField::from_register(self.hour().await?.into());
        let hours = encode_hour(format, current.to_hour24()).map_err(DS3231Error::Codec)?;
        self.set_hour(Hours::from(hours)).await?;
        self.hour_format = format;
        Ok(())
    }

    /// Sets the clock in one 7-register burst.
    pub async fn set_clock(&mut self, time: &CalendarTime) -> Result<(), DS3231Error<I2C::Error>> {
        let raw = clock_registers(time, self.hour_format).map_err(DS3231Error::Codec)?;
        self.write_registers(RegAddr::Seconds, &raw).await
    }

    /// Reads the clock in one 7-register burst.
    pub async fn read_clock(&mut self) -> Result<ClockRead, DS3231Error<I2C::Error>> {
        let mut data = [0; CLOCK_REGISTER_COUNT];
        self.read_registers(RegAddr::Seconds, &mut data).await?;
        parse_clock_read(&data).map_err(DS3231Error::Codec)
    }

    /// Reads the clock as a chrono `NaiveDateTime`.
    pub async fn datetime(&mut self) -> Result<NaiveDateTime, DS3231Error<I2C::Error>> {
        self.read_clock()
            .await?
            .to_naive_datetime()
            .map_err(DS3231Error::Codec)
    }

    /// Sets the clock from a chrono `NaiveDateTime` (years 2000-2099).
    pub async fn set_datetime(
        &mut self,
        datetime: &NaiveDateTime,
    ) -> Result<(), DS3231Error<I2C::Error>> {
        let time = CalendarTime::try_from(datetime).map_err(DS3231Error::Codec)?;
        self.set_clock(&time).await
    }

    /// Programs Alarm 1 in one 4-register burst.
    pub async fn set_alarm1(&mut self, spec: &AlarmSpec) -> Result<(), DS3231Error<I2C::Error>> {
        let raw = encode_alarm1(spec, self.hour_format).map_err(DS3231Error::Codec)?;
        self.write_registers(RegAddr::Alarm1Seconds, &raw).await
    }

    /// Reads Alarm 1.
    pub async fn read_alarm1(&mut self) -> Result<AlarmSpec, DS3231Error<I2C::Error>> {
        let mut data = [0; ALARM1_REGISTER_COUNT];
        self.read_registers(RegAddr::Alarm1Seconds, &mut data)
            .await?;
        decode_alarm1(&data).map_err(DS3231Error::Codec)
    }

    /// Programs Alarm 2 in one 3-register burst. `TimeOnly` is rejected.
    pub async fn set_alarm2(&mut self, spec: &AlarmSpec) -> Result<(), DS3231Error<I2C::Error>> {
        let raw = encode_alarm2(spec, self.hour_format).map_err(DS3231Error::Codec)?;
        self.write_registers(RegAddr::Alarm2Minutes, &raw).await
    }

    /// Reads Alarm 2.
    pub async fn read_alarm2(&mut self) -> Result<AlarmSpec, DS3231Error<I2C::Error>> {
        let mut data = [0; ALARM2_REGISTER_COUNT];
        self.read_registers(RegAddr::Alarm2Minutes, &mut data)
            .await?;
        decode_alarm2(&data).map_err(DS3231Error::Codec)
    }

    /// Sets Alarm 1 to fire `offset_minutes` from now and returns what was
    /// programmed.
    pub async fn set_alarm1_after(
        &mut self,
        offset_minutes: u16,
    ) -> Result<AlarmSpec, DS3231Error<I2C::Error>> {
        let now = self.read_clock().await?;
        let spec = build_alarm_at_offset(&now.time, offset_minutes).map_err(DS3231Error::Codec)?;
        self.set_alarm1(&spec).await?;
        Ok(spec)
    }

    /// Reads the temperature in degrees Celsius.
    pub async fn read_temperature(&mut self) -> Result<f32, DS3231Error<I2C::Error>> {
        let mut data = [0; TEMPERATURE_REGISTER_COUNT];
        self.read_registers(RegAddr::MSBTemp, &mut data).await?;
        Ok(decode_temperature(data[0], data[1]))
    }

    /// Reads the status flags without clearing them.
    pub async fn read_status(&mut self) -> Result<StatusFlags, DS3231Error<I2C::Error>> {
        Ok(read_status(self.read_register(RegAddr::ControlStatus).await?))
    }

    /// Clears the selected alarm flags, leaving every other status bit as is.
    pub async fn clear_alarm_flags(
        &mut self,
        which: AlarmFlags,
    ) -> Result<(), DS3231Error<I2C::Error>> {
        if which.is_empty() {
            return Ok(());
        }
        let current = self.read_register(RegAddr::ControlStatus).await?;
        self.write_register(RegAddr::ControlStatus, clear_alarm_flags(current, which))
            .await
    }

    /// Clears the oscillator-stop flag.
    pub async fn clear_oscillator_stop_flag(&mut self) -> Result<(), DS3231Error<I2C::Error>> {
        let current = self.read_register(RegAddr::ControlStatus).await?;
        self.write_register(
            RegAddr::ControlStatus,
            status::clear_oscillator_stop_flag(current),
        )
        .await
    }

    /// Reads the status register, clears the alarm flags found set, and
    /// returns the flags as they were read.
    pub async fn service_alarm_interrupt(
        &mut self,
    ) -> Result<StatusFlags, DS3231Error<I2C::Error>> {
        let current = self.read_register(RegAddr::ControlStatus).await?;
        let flags = read_status(current);
        let triggered = flags.triggered();
        if !triggered.is_empty() {
            debug!("DS3231: alarm fired {:?}", triggered);
            self.write_register(RegAddr::ControlStatus, clear_alarm_flags(current, triggered))
                .await?;
        }
        Ok(flags)
    }

    /// Reads the INT/SQW routing and alarm interrupt enables.
    pub async fn control_flags(&mut self) -> Result<ControlFlags, DS3231Error<I2C::Error>> {
        Ok(ControlFlags::from_register(
            self.read_register(RegAddr::Control).await?,
        ))
    }

    /// Writes the INT/SQW routing and alarm interrupt enables.
    pub async fn set_control_flags(
        &mut self,
        flags: &ControlFlags,
    ) -> Result<(), DS3231Error<I2C::Error>> {
        let current = self.read_register(RegAddr::Control).await?;
        let control = flags.apply_to(current).map_err(DS3231Error::Codec)?;
        self.write_register(RegAddr::Control, control).await
    }

    /// Switches INT/SQW to the square wave at `rate`, clearing both alarm
    /// interrupt enables.
    pub async fn set_square_wave_rate(
        &mut self,
        rate: SquareWaveRate,
    ) -> Result<(), DS3231Error<I2C::Error>> {
        self.set_control_flags(&ControlFlags::square_wave(rate))
            .await
    }

    /// Switches INT/SQW back to interrupt mode.
    pub async fn disable_square_wave(&mut self) -> Result<(), DS3231Error<I2C::Error>> {
        let mut control = self.control().await?;
        control.set_interrupt_control(true);
        self.set_control(control).await
    }
}

macro_rules! impl_register_access {
    ($(($name:ident, $regaddr:expr, $typ:ty)),+) => {
        impl<I2C: I2c> DS3231<I2C> {
            $(
                paste! {
                    #[doc = concat!("Reads the raw ", stringify!($name), " register.")]
                    pub async fn $name(&mut self) -> Result<$typ, DS3231Error<I2C::Error>> {
                        Ok(<$typ>::from(self.read_register($regaddr).await?))
                    }

                    #[doc = concat!("Writes the raw ", stringify!($name), " register.")]
                    pub async fn [<set_ $name>](&mut self, value: $typ) -> Result<(), DS3231Error<I2C::Error>> {
                        self.write_register($regaddr, value.into()).await
                    }
                }
            )+
        }
    }
}

impl_register_access!(
    (hour, RegAddr::Hours, Hours),
    (control, RegAddr::Control, Control),
    (status, RegAddr::ControlStatus, Status),
    (aging_offset, RegAddr::AgingOffset, AgingOffset)
);
