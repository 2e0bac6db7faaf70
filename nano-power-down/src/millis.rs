//! Timer0 as a millisecond counter.
//!
//! Timer0 stops in power-down; `Power::sleep` adds the slept time through
//! the `Clock` impl below.

use core::cell::Cell;

use arduino_hal::pac::TC0;
use avr_device::interrupt::{self, Mutex};
use avr_tools::Clock;

// 16MHz / 64 / 250 = 1kHz
const PRESCALER: u32 = 64;
const TIMER_COUNTS: u32 = 250;
const MILLIS_INCREMENT: u32 = PRESCALER * TIMER_COUNTS / 16_000;

static MILLIS_COUNTER: Mutex<Cell<u32>> = Mutex::new(Cell::new(0));

pub struct Millis {
    _tc0: TC0,
}

impl Millis {
    /// Starts Timer0 in CTC mode. Counting begins once interrupts are
    /// enabled.
    pub fn init(tc0: TC0) -> Self {
        tc0.tccr0a().write(|w| w.wgm0().ctc());
        tc0.ocr0a().write(|w| unsafe { w.bits((TIMER_COUNTS - 1) as u8) });
        tc0.tccr0b().write(|w| w.cs0().prescale_64());
        tc0.timsk0().write(|w| w.ocie0a().set_bit());

        interrupt::free(|cs| MILLIS_COUNTER.borrow(cs).set(0));
        Millis { _tc0: tc0 }
    }
}

impl Clock for Millis {
    fn millis(&self) -> u32 {
        interrupt::free(|cs| MILLIS_COUNTER.borrow(cs).get())
    }

    fn advance(&mut self, ms: u32) {
        interrupt::free(|cs| {
            let counter = MILLIS_COUNTER.borrow(cs);
            counter.set(counter.get().wrapping_add(ms));
        })
    }
}

#[avr_device::interrupt(atmega328p)]
fn TIMER0_COMPA() {
    interrupt::free(|cs| {
        let counter = MILLIS_COUNTER.borrow(cs);
        counter.set(counter.get().wrapping_add(MILLIS_INCREMENT));
    })
}
