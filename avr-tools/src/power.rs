//! Power-down and timed sleep.

use log::{debug, trace};

use crate::clock::Clock;
use crate::registers::{Register, Registers, ADEN, SE, SM_MASK, SM_POWER_DOWN};
use crate::watchdog::{self, WatchdogTimeout};

/// Puts the MCU into power-down mode through an injected register bank.
///
/// Both operations block until a wake source fires: the watchdog, INT0,
/// INT1 or a pin-change interrupt. Global interrupts must be enabled before
/// calling them, otherwise nothing can wake the CPU again.
pub struct Power<R, C> {
    registers: R,
    clock: C,
}

impl<R: Registers, C: Clock> Power<R, C> {
    pub fn new(registers: R, clock: C) -> Self {
        Power { registers, clock }
    }

    pub fn registers(&self) -> &R {
        &self.registers
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn release(self) -> (R, C) {
        (self.registers, self.clock)
    }

    /// Sleeps in power-down mode until any enabled interrupt fires.
    ///
    /// The ADC is switched off for the duration and the brown-out detector is
    /// disabled for this one sleep. ADEN and the selected sleep mode are back
    /// to their previous values when this returns.
    pub fn power_down(&mut self) {
        let adcsra = self.registers.read(Register::Adcsra);
        let smcr = self.registers.read(Register::Smcr);
        self.registers.write(Register::Adcsra, adcsra & !ADEN);
        self.registers.write(Register::Smcr, (smcr & !(SM_MASK | SE)) | SM_POWER_DOWN | SE);

        self.registers.sleep_without_brown_out();

        self.registers.write(Register::Smcr, smcr);
        self.registers.modify(Register::Adcsra, |v| (v & !ADEN) | (adcsra & ADEN));
        trace!("woke from power-down; adc_enabled={}", adcsra & ADEN != 0);
    }

    /// Powers down for roughly `timeout`, then moves the clock forward by
    /// its nominal length.
    ///
    /// The clock adjustment assumes the watchdog did the waking. An external
    /// interrupt arriving earlier still advances the full interval.
    pub fn sleep(&mut self, timeout: WatchdogTimeout) {
        watchdog::arm(&mut self.registers, timeout);
        self.power_down();
        watchdog::disarm(&mut self.registers);
        self.clock.advance(timeout.millis());
        debug!("slept; timeout={:?} millis={}", timeout, self.clock.millis());
    }

    /// Sleeps for about `ms` by chaining the longest watchdog intervals that
    /// fit. Returns the nominal time slept; anything under 16ms is left over.
    pub fn sleep_ms(&mut self, ms: u32) -> u32 {
        let mut remaining = ms;
        while let Some(timeout) = WatchdogTimeout::fitting(remaining) {
            self.sleep(timeout);
            remaining -= timeout.millis();
        }
        ms - remaining
    }
}
