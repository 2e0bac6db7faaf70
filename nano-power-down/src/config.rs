use avr_tools::WatchdogTimeout;

pub const BAUD_RATE: u32 = 57_600;

/// How long to stay awake between two sleeps.
pub const AWAKE_MS: u16 = 2_000;

pub const SLEEP_TIMEOUT: WatchdogTimeout = WatchdogTimeout::Ms8192;
