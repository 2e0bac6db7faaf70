//! Watchdog timer in interrupt mode.
//!
//! Changing the prescaler needs two separate writes to `WDTCSR`: `WDCE | WDE`
//! first, then the new configuration within four cycles. Both writes happen
//! inside one critical section.

use log::trace;

use crate::interrupt;
use crate::registers::{Register, Registers, WDRF};
use crate::Error;
use crate::Error::InvalidTimeoutCode;

pub const WDIF: u8 = 0b1000_0000;
pub const WDIE: u8 = 0b0100_0000;
pub const WDP3: u8 = 0b0010_0000;
pub const WDCE: u8 = 0b0001_0000;
pub const WDE: u8 = 0b0000_1000;
pub const WDP_LOW: u8 = 0b0000_0111;

/// `WDTCSR` value with the watchdog stopped.
pub const OFF: u8 = 0x00;

/// Watchdog interval, named after its nominal duration.
///
/// The oscillator runs at roughly 128kHz, so real timeouts drift with supply
/// voltage and temperature. Code `N` stands for `16 << N` milliseconds.
#[derive(ufmt::derive::uDebug, Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd)]
#[repr(u8)]
pub enum WatchdogTimeout {
    Ms16 = 0,
    Ms32 = 1,
    Ms64 = 2,
    Ms128 = 3,
    Ms256 = 4,
    Ms512 = 5,
    Ms1024 = 6,
    Ms2048 = 7,
    Ms4096 = 8,
    Ms8192 = 9,
}

impl WatchdogTimeout {
    pub const ALL: [WatchdogTimeout; 10] = [
        WatchdogTimeout::Ms16,
        WatchdogTimeout::Ms32,
        WatchdogTimeout::Ms64,
        WatchdogTimeout::Ms128,
        WatchdogTimeout::Ms256,
        WatchdogTimeout::Ms512,
        WatchdogTimeout::Ms1024,
        WatchdogTimeout::Ms2048,
        WatchdogTimeout::Ms4096,
        WatchdogTimeout::Ms8192,
    ];

    pub fn code(&self) -> u8 {
        *self as u8
    }

    pub fn millis(&self) -> u32 {
        16 << self.code()
    }

    /// WDP3..WDP0, with WDP3 sitting apart from the other three.
    pub fn prescaler_bits(&self) -> u8 {
        let code = self.code();
        ((code & 0b1000) << 2) | (code & WDP_LOW)
    }

    /// Full `WDTCSR` value: interrupt mode plus prescaler.
    pub fn bits(&self) -> u8 {
        WDIE | self.prescaler_bits()
    }

    /// Longest interval not exceeding `ms`.
    pub fn fitting(ms: u32) -> Option<WatchdogTimeout> {
        WatchdogTimeout::ALL
            .iter()
            .rev()
            .find(|timeout| timeout.millis() <= ms)
            .copied()
    }
}

impl TryFrom<u8> for WatchdogTimeout {
    type Error = Error;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match WatchdogTimeout::ALL.get(code as usize) {
            Some(timeout) => Ok(*timeout),
            None => Err(InvalidTimeoutCode(code)),
        }
    }
}

/// Starts the watchdog in interrupt mode; it fires once per `timeout`.
///
/// Requires a `WDT` interrupt handler, an unhandled vector resets the chip.
pub fn arm<R: Registers>(registers: &mut R, timeout: WatchdogTimeout) {
    write_timed(registers, timeout.bits());
    trace!("watchdog armed; timeout={:?} wdtcsr={:#010b}", timeout, timeout.bits());
}

pub fn disarm<R: Registers>(registers: &mut R) {
    write_timed(registers, OFF);
    trace!("watchdog disarmed;");
}

fn write_timed<R: Registers>(registers: &mut R, value: u8) {
    interrupt::free(registers, |r| {
        // WDRF overrides WDE, clear it or the watchdog stays in reset mode
        r.modify(Register::Mcusr, |mcusr| mcusr & !WDRF);
        r.write(Register::Wdtcsr, WDCE | WDE);
        r.write(Register::Wdtcsr, value);
    });
}
