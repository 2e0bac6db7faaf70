#![cfg_attr(not(test), no_std)]

//! Blink and low-power helpers for the ATmega328P.
//!
//! Hardware access goes through the [`Registers`] trait so the same sequences
//! run on the chip (see the `nano-power-down` firmware) and against the
//! simulated bank in [`sim`].

#[cfg(any(test, feature = "sim"))]
extern crate alloc;

pub mod blink;
pub mod clock;
pub mod interrupt;
pub mod power;
pub mod registers;
#[cfg(any(test, feature = "sim"))]
pub mod sim;
pub mod watchdog;

pub use crate::blink::Blink;
pub use crate::clock::Clock;
pub use crate::power::Power;
pub use crate::registers::{Register, Registers};
pub use crate::watchdog::WatchdogTimeout;

#[derive(ufmt::derive::uDebug, Debug, Clone, Copy, Eq, PartialEq)]
pub enum Error {
    /// Raw watchdog duration code outside `0..=9`.
    InvalidTimeoutCode(u8),
}
