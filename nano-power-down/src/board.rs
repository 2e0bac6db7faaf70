//! The real registers behind `avr_tools::Registers`.

use core::arch::asm;

use arduino_hal::pac::{ADC, CPU, WDT};
use avr_tools::registers::{BODS, BODSE};
use avr_tools::{Register, Registers};

const SREG_I: u8 = 0b1000_0000;

/// Owns the peripherals the power helper writes to. Everything is inlined so
/// the watchdog writes stay within their four-cycle window; the brown-out
/// sequence is a single asm block.
pub struct Atmega328p {
    cpu: CPU,
    wdt: WDT,
    adc: ADC,
}

impl Atmega328p {
    pub fn new(cpu: CPU, wdt: WDT, adc: ADC) -> Self {
        Atmega328p { cpu, wdt, adc }
    }

    pub fn sreg(&self) -> u8 {
        let sreg: u8;
        unsafe {
            asm!(
            "in {0}, 0x3f", // SREG
            out(reg) sreg
            );
        }
        sreg
    }
}

impl Registers for Atmega328p {
    #[inline(always)]
    fn read(&self, register: Register) -> u8 {
        match register {
            Register::Wdtcsr => self.wdt.wdtcsr().read().bits(),
            Register::Smcr => self.cpu.smcr().read().bits(),
            Register::Mcucr => self.cpu.mcucr().read().bits(),
            Register::Mcusr => self.cpu.mcusr().read().bits(),
            Register::Adcsra => self.adc.adcsra().read().bits(),
        }
    }

    #[inline(always)]
    fn write(&mut self, register: Register, value: u8) {
        match register {
            Register::Wdtcsr => self.wdt.wdtcsr().write(|w| unsafe { w.bits(value) }),
            Register::Smcr => self.cpu.smcr().write(|w| unsafe { w.bits(value) }),
            Register::Mcucr => self.cpu.mcucr().write(|w| unsafe { w.bits(value) }),
            Register::Mcusr => self.cpu.mcusr().write(|w| unsafe { w.bits(value) }),
            Register::Adcsra => self.adc.adcsra().write(|w| unsafe { w.bits(value) }),
        };
    }

    #[inline(always)]
    fn disable_interrupts(&mut self) -> bool {
        let was_enabled = self.interrupts_enabled();
        avr_device::interrupt::disable();
        was_enabled
    }

    #[inline(always)]
    fn enable_interrupts(&mut self) {
        // SAFETY: only called when leaving a critical section that was
        // entered with interrupts enabled
        unsafe { avr_device::interrupt::enable() };
    }

    #[inline(always)]
    fn interrupts_enabled(&self) -> bool {
        self.sreg() & SREG_I != 0
    }

    #[inline(always)]
    fn sleep(&mut self) {
        avr_device::asm::sleep();
    }

    #[inline(always)]
    fn sleep_without_brown_out(&mut self) {
        let was_enabled = self.disable_interrupts();
        let mcucr = self.read(Register::Mcucr);
        let unlock = mcucr | BODS | BODSE;
        let bods = (mcucr | BODS) & !BODSE;
        // MCUCR is I/O address 0x35; sei delays interrupts by one
        // instruction so sleep still runs inside the BODS window
        unsafe {
            if was_enabled {
                asm!(
                "out 0x35, {0}",
                "out 0x35, {1}",
                "sei",
                "sleep",
                in(reg) unlock,
                in(reg) bods
                );
            } else {
                asm!(
                "out 0x35, {0}",
                "out 0x35, {1}",
                "sleep",
                in(reg) unlock,
                in(reg) bods
                );
            }
        }
    }
}

/// Wakes the CPU from power-down. Without a handler the vector would reset
/// the chip instead of resuming after `sleep`.
#[avr_device::interrupt(atmega328p)]
fn WDT() {}
