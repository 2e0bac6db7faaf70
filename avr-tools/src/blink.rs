//! Fixed duty-cycle toggling of one output pin.

use core::convert::Infallible;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;

#[derive(ufmt::derive::uDebug, Debug, Clone, Copy, Eq, PartialEq)]
pub struct Blink {
    pub on_ms: u32,
    pub off_ms: u32,
}

impl Blink {
    /// 100ms on, 900ms off.
    pub const STANDARD: Blink = Blink::new(100, 900);

    pub const fn new(on_ms: u32, off_ms: u32) -> Blink {
        Blink { on_ms, off_ms }
    }

    pub fn period_ms(&self) -> u32 {
        self.on_ms + self.off_ms
    }

    /// One high/low period, starting with the pin driven high.
    pub fn cycle<P, D>(&self, pin: &mut P, delay: &mut D) -> Result<(), P::Error>
    where
        P: OutputPin,
        D: DelayNs,
    {
        pin.set_high()?;
        delay.delay_ms(self.on_ms);
        pin.set_low()?;
        delay.delay_ms(self.off_ms);
        Ok(())
    }

    pub fn run<P, D>(&self, pin: &mut P, delay: &mut D) -> !
    where
        P: OutputPin<Error = Infallible>,
        D: DelayNs,
    {
        loop {
            if let Err(e) = self.cycle(pin, delay) {
                match e {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;
    use embedded_hal::digital::ErrorType;

    /// Records `(time_ms, level)` on every pin change.
    struct Trace {
        now_ns: u64,
        edges: Vec<(u64, bool)>,
    }

    struct TracePin<'a>(&'a core::cell::RefCell<Trace>);

    struct TraceDelay<'a>(&'a core::cell::RefCell<Trace>);

    impl ErrorType for TracePin<'_> {
        type Error = Infallible;
    }

    impl OutputPin for TracePin<'_> {
        fn set_low(&mut self) -> Result<(), Self::Error> {
            let mut trace = self.0.borrow_mut();
            let now = trace.now_ns / 1_000_000;
            trace.edges.push((now, false));
            Ok(())
        }

        fn set_high(&mut self) -> Result<(), Self::Error> {
            let mut trace = self.0.borrow_mut();
            let now = trace.now_ns / 1_000_000;
            trace.edges.push((now, true));
            Ok(())
        }
    }

    impl DelayNs for TraceDelay<'_> {
        fn delay_ns(&mut self, ns: u32) {
            self.0.borrow_mut().now_ns += ns as u64;
        }
    }

    fn trace(blink: Blink, cycles: usize) -> Trace {
        let trace = core::cell::RefCell::new(Trace { now_ns: 0, edges: Vec::new() });
        let mut pin = TracePin(&trace);
        let mut delay = TraceDelay(&trace);
        for _ in 0..cycles {
            blink.cycle(&mut pin, &mut delay).unwrap();
        }
        trace.into_inner()
    }

    #[test]
    fn standard_pattern() {
        assert_eq!(Blink::STANDARD.on_ms, 100);
        assert_eq!(Blink::STANDARD.off_ms, 900);
        assert_eq!(Blink::STANDARD.period_ms(), 1000);
    }

    #[test]
    fn one_cycle() {
        let actual = trace(Blink::STANDARD, 1);
        assert_eq!(actual.edges, [(0, true), (100, false)]);
        assert_eq!(actual.now_ns, 1_000_000_000);
    }

    #[test]
    fn periodic() {
        let actual = trace(Blink::STANDARD, 5);
        assert_eq!(actual.edges.len(), 10);
        for (i, pair) in actual.edges.chunks(2).enumerate() {
            let start = i as u64 * 1000;
            assert_eq!(pair, [(start, true), (start + 100, false)]);
        }
        assert_eq!(actual.now_ns / 1_000_000, 5000);
    }

    #[test]
    fn custom_timings() {
        let actual = trace(Blink::new(50, 50), 2);
        assert_eq!(actual.edges, [(0, true), (50, false), (100, true), (150, false)]);
    }
}
