#![no_std]
#![no_main]
#![feature(asm_experimental_arch)]
#![feature(abi_avr_interrupt)]

use arduino_hal::prelude::*;
use avr_tools::{Clock, Power, Register, Registers};
use panic_halt as _;

use crate::board::Atmega328p;
use crate::config::{AWAKE_MS, BAUD_RATE, SLEEP_TIMEOUT};
use crate::millis::Millis;

mod board;
mod config;
mod millis;

#[arduino_hal::entry]
fn main() -> ! {
    let dp = arduino_hal::Peripherals::take().unwrap();
    let pins = arduino_hal::pins!(dp);
    let mut serial = arduino_hal::default_serial!(dp, pins, BAUD_RATE);
    let mut led = pins.d13.into_output();

    ufmt::uwriteln!(&mut serial, "# startup").unwrap_infallible();
    let board = Atmega328p::new(dp.CPU, dp.WDT, dp.ADC);
    let clock = Millis::init(dp.TC0);
    ufmt::uwriteln!(&mut serial, "## MCUSR {}", board.read(Register::Mcusr)).unwrap_infallible();
    // wake sources only work with interrupts on
    unsafe { avr_device::interrupt::enable() };
    ufmt::uwriteln!(&mut serial, "## SREG {}", board.sreg()).unwrap_infallible();

    let mut power = Power::new(board, clock);
    loop {
        led.set_high();
        ufmt::uwriteln!(&mut serial, "## loop millis={}", power.clock().millis()).unwrap_infallible();
        arduino_hal::delay_ms(AWAKE_MS.into());
        ufmt::uwriteln!(&mut serial, "## go to sleep {:?}", SLEEP_TIMEOUT).unwrap_infallible();
        // let the last byte leave the shift register
        arduino_hal::delay_ms(10);
        led.set_low();

        power.sleep(SLEEP_TIMEOUT);

        ufmt::uwriteln!(&mut serial, "## returned from sleep").unwrap_infallible();
        ufmt::uwriteln!(&mut serial, "## WDTCSR {}", power.registers().read(Register::Wdtcsr)).unwrap_infallible();
        ufmt::uwriteln!(&mut serial, "## SMCR {}", power.registers().read(Register::Smcr)).unwrap_infallible();
    }
}
