//! Scoped interrupt-free regions for the timed register sequences.

use core::ops::{Deref, DerefMut};

use crate::registers::Registers;

/// Clears the global interrupt flag for as long as it lives.
///
/// On drop the flag is set again only if it was set when the section was
/// entered, so nesting sections or entering one with interrupts already off
/// leaves the flag as it was.
pub struct CriticalSection<'a, R: Registers> {
    registers: &'a mut R,
    was_enabled: bool,
}

impl<'a, R: Registers> CriticalSection<'a, R> {
    #[inline(always)]
    pub fn enter(registers: &'a mut R) -> Self {
        let was_enabled = registers.disable_interrupts();
        CriticalSection { registers, was_enabled }
    }

    pub fn was_enabled(&self) -> bool {
        self.was_enabled
    }
}

impl<R: Registers> Deref for CriticalSection<'_, R> {
    type Target = R;

    fn deref(&self) -> &R {
        self.registers
    }
}

impl<R: Registers> DerefMut for CriticalSection<'_, R> {
    fn deref_mut(&mut self) -> &mut R {
        self.registers
    }
}

impl<R: Registers> Drop for CriticalSection<'_, R> {
    #[inline(always)]
    fn drop(&mut self) {
        if self.was_enabled {
            self.registers.enable_interrupts();
        }
    }
}

/// Runs `f` with interrupts disabled, like `avr_device::interrupt::free` but
/// on an injected register bank.
#[inline(always)]
pub fn free<R, F, T>(registers: &mut R, f: F) -> T
where
    R: Registers,
    F: FnOnce(&mut R) -> T,
{
    let mut cs = CriticalSection::enter(registers);
    f(&mut *cs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::SimRegisters;

    #[test]
    fn restores_enabled_flag() {
        let mut registers = SimRegisters::new();
        registers.enable_interrupts();
        let inside = free(&mut registers, |r| r.interrupts_enabled());
        assert_eq!(inside, false);
        assert_eq!(registers.interrupts_enabled(), true);
    }

    #[test]
    fn keeps_disabled_flag() {
        let mut registers = SimRegisters::new();
        free(&mut registers, |_| ());
        assert_eq!(registers.interrupts_enabled(), false);
    }

    #[test]
    fn nested_sections_restore_once() {
        let mut registers = SimRegisters::new();
        registers.enable_interrupts();
        {
            let mut outer = CriticalSection::enter(&mut registers);
            assert!(outer.was_enabled());
            {
                let inner = CriticalSection::enter(&mut *outer);
                assert!(!inner.was_enabled());
            }
            assert_eq!(outer.interrupts_enabled(), false);
        }
        assert_eq!(registers.interrupts_enabled(), true);
    }

    #[test]
    fn restores_on_early_return() {
        fn bail(registers: &mut SimRegisters) -> Result<(), ()> {
            let _cs = CriticalSection::enter(registers);
            Err(())
        }

        let mut registers = SimRegisters::new();
        registers.enable_interrupts();
        assert_eq!(bail(&mut registers), Err(()));
        assert_eq!(registers.interrupts_enabled(), true);
    }
}
