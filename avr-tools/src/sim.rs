//! Software model of the registers and clock, for host tests and tools.
//!
//! Besides storing values, the model enforces the two timed sequences the
//! power helper relies on:
//!
//! * a `WDTCSR` write only changes WDE or the prescaler when the access
//!   directly before it wrote `WDCE | WDE`, and WDE stays forced on while
//!   `MCUSR.WDRF` is set;
//! * `BODS` only disables the brown-out detector when written directly after
//!   `BODS | BODSE`, and only for a `sleep` that follows straight away
//!   (re-enabling interrupts in between is allowed).

use alloc::vec::Vec;

use crate::clock::Clock;
use crate::registers::{Register, Registers, BODS, BODSE, SE, WDRF};
use crate::watchdog::{WDCE, WDE, WDIF, WDP3, WDP_LOW};

const WDT_PROTECTED: u8 = WDE | WDP3 | WDP_LOW;

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Access {
    Write {
        register: Register,
        value: u8,
        interrupts_enabled: bool,
    },
    DisableInterrupts,
    EnableInterrupts,
    Sleep {
        smcr: u8,
        interrupts_enabled: bool,
        brown_out_disabled: bool,
    },
}

#[derive(Debug, Default)]
pub struct SimRegisters {
    values: [u8; 5],
    interrupts_enabled: bool,
    bods_pending: bool,
    log: Vec<Access>,
}

impl SimRegisters {
    /// All registers zero, interrupts disabled, as after reset.
    pub fn new() -> Self {
        SimRegisters::default()
    }

    pub fn log(&self) -> &[Access] {
        &self.log
    }

    pub fn clear_log(&mut self) {
        self.log.clear();
    }

    /// Number of `sleep` instructions executed so far.
    pub fn sleeps(&self) -> usize {
        self.log
            .iter()
            .filter(|access| matches!(access, Access::Sleep { .. }))
            .count()
    }

    fn wdt_unlocked(&self) -> bool {
        matches!(
            self.log.last(),
            Some(Access::Write { register: Register::Wdtcsr, value, .. })
                if value & (WDCE | WDE) == WDCE | WDE
        )
    }

    fn bods_unlocked(&self) -> bool {
        matches!(
            self.log.last(),
            Some(Access::Write { register: Register::Mcucr, value, .. })
                if value & (BODS | BODSE) == BODS | BODSE
        )
    }

    fn write_wdtcsr(&self, value: u8) -> u8 {
        let old = self.values[Register::Wdtcsr.index()];
        let flag = old & WDIF & !value;
        let mut new = if self.wdt_unlocked() {
            value & !(WDCE | WDIF)
        } else if value & (WDCE | WDE) == WDCE | WDE {
            // opens the change window, WDE reads back as set until then
            (old & WDT_PROTECTED) | (value & !WDIF)
        } else {
            (old & WDT_PROTECTED) | (value & !(WDT_PROTECTED | WDCE | WDIF)) | (value & WDE)
        };
        new |= flag;
        if self.values[Register::Mcusr.index()] & WDRF != 0 {
            new |= WDE;
        }
        new
    }

    fn write_mcucr(&mut self, value: u8) -> u8 {
        if value & BODS != 0 && value & BODSE == 0 && self.bods_unlocked() {
            self.bods_pending = true;
            return value;
        }
        // BODS cannot be set on its own
        if value & BODSE == 0 {
            return value & !BODS;
        }
        value
    }
}

impl Registers for SimRegisters {
    fn read(&self, register: Register) -> u8 {
        self.values[register.index()]
    }

    fn write(&mut self, register: Register, value: u8) {
        self.bods_pending = false;
        let stored = match register {
            Register::Wdtcsr => self.write_wdtcsr(value),
            Register::Mcucr => self.write_mcucr(value),
            _ => value,
        };
        self.values[register.index()] = stored;
        self.log.push(Access::Write {
            register,
            value,
            interrupts_enabled: self.interrupts_enabled,
        });
    }

    fn disable_interrupts(&mut self) -> bool {
        self.bods_pending = false;
        let was_enabled = self.interrupts_enabled;
        self.interrupts_enabled = false;
        self.log.push(Access::DisableInterrupts);
        was_enabled
    }

    fn enable_interrupts(&mut self) {
        self.interrupts_enabled = true;
        self.log.push(Access::EnableInterrupts);
    }

    fn interrupts_enabled(&self) -> bool {
        self.interrupts_enabled
    }

    fn sleep(&mut self) {
        let smcr = self.values[Register::Smcr.index()];
        self.log.push(Access::Sleep {
            smcr,
            interrupts_enabled: self.interrupts_enabled,
            brown_out_disabled: self.bods_pending && smcr & SE != 0,
        });
        self.bods_pending = false;
        self.values[Register::Mcucr.index()] &= !(BODS | BODSE);
    }
}

/// Millisecond counter that only moves when told to.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq)]
pub struct SimClock {
    millis: u32,
}

impl SimClock {
    pub fn new(millis: u32) -> Self {
        SimClock { millis }
    }
}

impl Clock for SimClock {
    fn millis(&self) -> u32 {
        self.millis
    }

    fn advance(&mut self, ms: u32) {
        self.millis = self.millis.wrapping_add(ms);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prescaler_change_needs_unlock() {
        let mut registers = SimRegisters::new();
        registers.write(Register::Wdtcsr, 0b0100_0111);
        assert_eq!(registers.read(Register::Wdtcsr), 0b0100_0000);
    }

    #[test]
    fn unlock_then_write_applies() {
        let mut registers = SimRegisters::new();
        registers.write(Register::Wdtcsr, WDCE | WDE);
        registers.write(Register::Wdtcsr, 0b0100_0111);
        assert_eq!(registers.read(Register::Wdtcsr), 0b0100_0111);
    }

    #[test]
    fn unlock_expires_after_other_access() {
        let mut registers = SimRegisters::new();
        registers.write(Register::Wdtcsr, WDCE | WDE);
        registers.write(Register::Smcr, 0);
        registers.write(Register::Wdtcsr, 0b0100_0111);
        // WDE stayed on from the unlock write, prescaler untouched
        assert_eq!(registers.read(Register::Wdtcsr), 0b0100_1000);
    }

    #[test]
    fn reset_flag_forces_wde() {
        let mut registers = SimRegisters::new();
        registers.write(Register::Mcusr, WDRF);
        registers.write(Register::Wdtcsr, WDCE | WDE);
        registers.write(Register::Wdtcsr, 0b0100_0001);
        assert_eq!(registers.read(Register::Wdtcsr), 0b0100_1001);
    }

    #[test]
    fn brown_out_disable_needs_sequence() {
        let mut registers = SimRegisters::new();
        registers.write(Register::Smcr, SE);
        registers.write(Register::Mcucr, BODS);
        registers.sleep();

        registers.write(Register::Mcucr, BODS | BODSE);
        registers.write(Register::Mcucr, BODS);
        registers.enable_interrupts();
        registers.sleep();

        let sleeps: Vec<bool> = registers
            .log()
            .iter()
            .filter_map(|access| match access {
                Access::Sleep { brown_out_disabled, .. } => Some(*brown_out_disabled),
                _ => None,
            })
            .collect();
        assert_eq!(sleeps, [false, true]);
        assert_eq!(registers.read(Register::Mcucr) & (BODS | BODSE), 0);
    }

    #[test]
    fn clock_wraps() {
        let mut clock = SimClock::new(u32::MAX);
        clock.advance(2);
        assert_eq!(clock.millis(), 1);
    }
}
