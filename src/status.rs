//! Status and control register management.
//!
//! The status register holds the alarm-fired flags (A1F, A2F) and the
//! oscillator-stop flag (OSF). Reading never clears them; clearing is an
//! explicit read-modify-write built by [`clear_alarm_flags`] so the bits the
//! caller did not ask about survive.
//!
//! The control register's INTCN bit routes the INT/SQW pin either to the
//! alarm interrupt (set) or to the square wave output (clear). An alarm
//! interrupt enable with INTCN clear would never reach the pin, so
//! [`build_control_byte`] rejects that combination instead of quietly
//! flipping INTCN on the caller's behalf.

use crate::{CodecError, Control, SquareWaveRate, Status};

/// Bits of the control register owned by [`ControlFlags`] (INTCN, A2IE, A1IE, RS2:RS1).
const CONTROL_FLAGS_MASK: u8 = 0b0001_1111;

/// Decoded status register flags.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StatusFlags {
    /// OSF: the oscillator stopped since this flag was last cleared, so the
    /// clock may be wrong
    pub oscillator_stopped: bool,
    /// A1F
    pub alarm1_triggered: bool,
    /// A2F
    pub alarm2_triggered: bool,
}

impl StatusFlags {
    /// The alarm flags that are set, as a selection for [`clear_alarm_flags`].
    #[must_use]
    pub fn triggered(&self) -> AlarmFlags {
        AlarmFlags {
            alarm1: self.alarm1_triggered,
            alarm2: self.alarm2_triggered,
        }
    }
}

impl From<u8> for StatusFlags {
    fn from(byte: u8) -> Self {
        read_status(byte)
    }
}

/// A selection of alarms.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AlarmFlags {
    /// Alarm 1 selected
    pub alarm1: bool,
    /// Alarm 2 selected
    pub alarm2: bool,
}

impl AlarmFlags {
    /// Neither alarm.
    pub const NONE: AlarmFlags = AlarmFlags {
        alarm1: false,
        alarm2: false,
    };
    /// Alarm 1 only.
    pub const ALARM1: AlarmFlags = AlarmFlags {
        alarm1: true,
        alarm2: false,
    };
    /// Alarm 2 only.
    pub const ALARM2: AlarmFlags = AlarmFlags {
        alarm1: false,
        alarm2: true,
    };
    /// Both alarms.
    pub const BOTH: AlarmFlags = AlarmFlags {
        alarm1: true,
        alarm2: true,
    };

    /// `true` when no alarm is selected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        !self.alarm1 && !self.alarm2
    }
}

/// Extracts A1F (bit 0), A2F (bit 1) and OSF (bit 7).
#[must_use]
pub fn read_status(byte: u8) -> StatusFlags {
    let status = Status::from(byte);
    StatusFlags {
        oscillator_stopped: status.oscillator_stop_flag(),
        alarm1_triggered: status.alarm1_flag(),
        alarm2_triggered: status.alarm2_flag(),
    }
}

/// Returns `current` with only the selected alarm flags cleared.
///
/// Write the result back to the status register; never write a blind 0x00,
/// it would also clear OSF and the 32 kHz output enable.
#[must_use]
pub fn clear_alarm_flags(current: u8, which: AlarmFlags) -> u8 {
    let mut status = Status::from(current);
    if which.alarm1 {
        status.set_alarm1_flag(false);
    }
    if which.alarm2 {
        status.set_alarm2_flag(false);
    }
    status.into()
}

/// Returns `current` with OSF cleared and every other bit kept.
#[must_use]
pub fn clear_oscillator_stop_flag(current: u8) -> u8 {
    let mut status = Status::from(current);
    status.set_oscillator_stop_flag(false);
    status.into()
}

/// Control register bits that select the INT/SQW pin behaviour.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ControlFlags {
    /// INTCN: pin carries alarm interrupts (set) or the square wave (clear)
    pub interrupt_control_enabled: bool,
    /// A1IE
    pub alarm1_interrupt_enabled: bool,
    /// A2IE
    pub alarm2_interrupt_enabled: bool,
    /// RS2:RS1, used while INTCN is clear
    pub square_wave_rate: SquareWaveRate,
}

impl ControlFlags {
    /// Square wave output at `rate`, alarm interrupts off.
    #[must_use]
    pub fn square_wave(rate: SquareWaveRate) -> Self {
        ControlFlags {
            interrupt_control_enabled: false,
            alarm1_interrupt_enabled: false,
            alarm2_interrupt_enabled: false,
            square_wave_rate: rate,
        }
    }

    /// Interrupt output for the selected alarms.
    #[must_use]
    pub fn alarm_interrupts(alarms: AlarmFlags) -> Self {
        ControlFlags {
            interrupt_control_enabled: true,
            alarm1_interrupt_enabled: alarms.alarm1,
            alarm2_interrupt_enabled: alarms.alarm2,
            square_wave_rate: SquareWaveRate::default(),
        }
    }

    /// Reads the flags out of a control register byte.
    #[must_use]
    pub fn from_register(byte: u8) -> Self {
        let control = Control::from(byte);
        ControlFlags {
            interrupt_control_enabled: control.interrupt_control(),
            alarm1_interrupt_enabled: control.alarm1_interrupt_enable(),
            alarm2_interrupt_enabled: control.alarm2_interrupt_enable(),
            square_wave_rate: control.square_wave_rate(),
        }
    }

    /// Replaces the bits these flags own in `current`, keeping EOSC, BBSQW
    /// and CONV.
    ///
    /// # Errors
    ///
    /// [`CodecError::InterruptModeConflict`] when an alarm interrupt is
    /// enabled while INTCN is clear.
    pub fn apply_to(&self, current: u8) -> Result<u8, CodecError> {
        if !self.interrupt_control_enabled
            && (self.alarm1_interrupt_enabled || self.alarm2_interrupt_enabled)
        {
            error!("alarm interrupt enabled with INT/SQW in square wave mode");
            return Err(CodecError::InterruptModeConflict);
        }
        let mut control = Control::from(current & !CONTROL_FLAGS_MASK);
        control.set_interrupt_control(self.interrupt_control_enabled);
        control.set_alarm1_interrupt_enable(self.alarm1_interrupt_enabled);
        control.set_alarm2_interrupt_enable(self.alarm2_interrupt_enabled);
        control.set_square_wave_rate(self.square_wave_rate);
        Ok(control.into())
    }
}

/// Builds the low five control bits from scratch (EOSC, BBSQW, CONV clear).
///
/// # Errors
///
/// [`CodecError::InterruptModeConflict`] when an alarm interrupt is enabled
/// without `interrupt_control_enabled`.
pub fn build_control_byte(
    interrupt_control_enabled: bool,
    alarm1_enabled: bool,
    alarm2_enabled: bool,
    rate: SquareWaveRate,
) -> Result<u8, CodecError> {
    ControlFlags {
        interrupt_control_enabled,
        alarm1_interrupt_enabled: alarm1_enabled,
        alarm2_interrupt_enabled: alarm2_enabled,
        square_wave_rate: rate,
    }
    .apply_to(0)
}

/// RS2:RS1 code for `rate`.
#[must_use]
pub fn square_wave_rate_bits(rate: SquareWaveRate) -> u8 {
    rate.into()
}
