/// Software millisecond counter, the `millis()` of the firmware.
///
/// The timer behind it stops in power-down, so whoever sleeps has to move it
/// forward by hand.
pub trait Clock {
    fn millis(&self) -> u32;

    /// Moves the counter forward, wrapping at `u32::MAX`.
    fn advance(&mut self, ms: u32);
}

impl<C: Clock + ?Sized> Clock for &mut C {
    fn millis(&self) -> u32 {
        (**self).millis()
    }

    fn advance(&mut self, ms: u32) {
        (**self).advance(ms)
    }
}
