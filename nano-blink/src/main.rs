#![no_std]
#![no_main]

use arduino_hal::Delay;
use avr_tools::Blink;
use panic_halt as _;

#[arduino_hal::entry]
fn main() -> ! {
    let dp = arduino_hal::Peripherals::take().unwrap();
    let pins = arduino_hal::pins!(dp);
    let mut led = pins.d13.into_output();
    let mut delay = Delay::new();

    Blink::STANDARD.run(&mut led, &mut delay)
}
