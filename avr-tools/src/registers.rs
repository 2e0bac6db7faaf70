//! The control registers touched by the power helper.

use crate::interrupt;

/// `WDTCSR`, `SMCR`, `MCUCR`, `MCUSR` and `ADCSRA` of the ATmega328P.
#[derive(ufmt::derive::uDebug, Debug, Clone, Copy, Eq, PartialEq)]
pub enum Register {
    /// Watchdog timer control and status.
    Wdtcsr,
    /// Sleep mode control.
    Smcr,
    /// MCU control, holds the brown-out disable bits.
    Mcucr,
    /// MCU status, holds the watchdog reset flag.
    Mcusr,
    /// ADC control and status A.
    Adcsra,
}

impl Register {
    pub const ALL: [Register; 5] = [
        Register::Wdtcsr,
        Register::Smcr,
        Register::Mcucr,
        Register::Mcusr,
        Register::Adcsra,
    ];

    pub fn index(&self) -> usize {
        match self {
            Register::Wdtcsr => 0,
            Register::Smcr => 1,
            Register::Mcucr => 2,
            Register::Mcusr => 3,
            Register::Adcsra => 4,
        }
    }
}

// SMCR
pub const SE: u8 = 0b0000_0001;
pub const SM_MASK: u8 = 0b0000_1110;
pub const SM_POWER_DOWN: u8 = 0b010 << 1;

// MCUCR
pub const BODS: u8 = 0b0100_0000;
pub const BODSE: u8 = 0b0010_0000;

// MCUSR
pub const WDRF: u8 = 0b0000_1000;

// ADCSRA
pub const ADEN: u8 = 0b1000_0000;

/// Access to the hardware registers and the CPU's global interrupt flag.
///
/// Implementations must not add work between consecutive calls: the timed
/// sequences issued through this trait only take effect when the second
/// write lands within four cycles of the first.
pub trait Registers {
    fn read(&self, register: Register) -> u8;

    fn write(&mut self, register: Register, value: u8);

    fn modify<F>(&mut self, register: Register, f: F)
    where
        F: FnOnce(u8) -> u8,
    {
        let value = self.read(register);
        self.write(register, f(value));
    }

    /// Clears the global interrupt flag and returns whether it was set.
    fn disable_interrupts(&mut self) -> bool;

    fn enable_interrupts(&mut self);

    fn interrupts_enabled(&self) -> bool;

    /// Executes the `sleep` instruction; returns once a wake interrupt has
    /// been serviced.
    fn sleep(&mut self);

    /// Disables the brown-out detector for one sleep and executes `sleep`.
    ///
    /// `BODS` only holds for three cycles, so the two `MCUCR` writes, the
    /// interrupt restore and the `sleep` must run back to back. Hardware
    /// banks override this to emit them as one instruction sequence.
    fn sleep_without_brown_out(&mut self)
    where
        Self: Sized,
    {
        interrupt::free(self, |r| {
            let mcucr = r.read(Register::Mcucr);
            r.write(Register::Mcucr, mcucr | BODS | BODSE);
            r.write(Register::Mcucr, (mcucr | BODS) & !BODSE);
        });
        self.sleep();
    }
}

impl<R: Registers> Registers for &mut R {
    fn read(&self, register: Register) -> u8 {
        (**self).read(register)
    }

    fn write(&mut self, register: Register, value: u8) {
        (**self).write(register, value)
    }

    fn disable_interrupts(&mut self) -> bool {
        (**self).disable_interrupts()
    }

    fn enable_interrupts(&mut self) {
        (**self).enable_interrupts()
    }

    fn interrupts_enabled(&self) -> bool {
        (**self).interrupts_enabled()
    }

    fn sleep(&mut self) {
        (**self).sleep()
    }

    fn sleep_without_brown_out(&mut self) {
        (**self).sleep_without_brown_out()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{Access, SimRegisters};

    #[test]
    fn brown_out_sleep_sequence_is_contiguous() {
        let mut registers = SimRegisters::new();
        registers.write(Register::Smcr, SE);
        registers.enable_interrupts();
        registers.clear_log();
        registers.sleep_without_brown_out();
        assert_eq!(
            registers.log(),
            [
                Access::DisableInterrupts,
                Access::Write { register: Register::Mcucr, value: BODS | BODSE, interrupts_enabled: false },
                Access::Write { register: Register::Mcucr, value: BODS, interrupts_enabled: false },
                Access::EnableInterrupts,
                Access::Sleep { smcr: SE, interrupts_enabled: true, brown_out_disabled: true },
            ]
        );
    }

    #[test]
    fn brown_out_sleep_keeps_interrupts_disabled() {
        let mut registers = SimRegisters::new();
        registers.write(Register::Smcr, SE);
        registers.clear_log();
        registers.sleep_without_brown_out();
        assert_eq!(
            registers.log().last(),
            Some(&Access::Sleep { smcr: SE, interrupts_enabled: false, brown_out_disabled: true })
        );
        assert!(!registers.log().contains(&Access::EnableInterrupts));
        assert_eq!(registers.interrupts_enabled(), false);
    }
}
