use avr_tools::sim::{Access, SimClock, SimRegisters};
use avr_tools::watchdog::WatchdogTimeout;
use avr_tools::{Clock, Power, Register, Registers};
use clap::{Parser, Subcommand};
use log::{info, warn};

/// Runs the power helper against the simulated ATmega328P registers and
/// logs every register access. Set RUST_LOG=info (or trace) to see it.
#[derive(Parser)]
struct Args {
    /// Start with the ADC enabled.
    #[arg(long)]
    adc: bool,

    /// Start with global interrupts disabled.
    #[arg(long)]
    no_interrupts: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Power down until the next interrupt.
    PowerDown,
    /// Watchdog sleep with a raw duration code (0 = 16ms ... 9 = 8192ms).
    Sleep { code: u8 },
    /// Sleep for about this many milliseconds.
    SleepMs { ms: u32 },
    /// Print the WDTCSR value of every watchdog timeout.
    Table,
}

fn main() -> Result<(), avr_tools::Error> {
    env_logger::init();
    let args = Args::parse();

    let mut registers = SimRegisters::new();
    if args.adc {
        registers.write(Register::Adcsra, 0b1000_0111);
    }
    if !args.no_interrupts {
        registers.enable_interrupts();
    }
    registers.clear_log();
    let mut power = Power::new(registers, SimClock::default());

    match args.command {
        Command::PowerDown => power.power_down(),
        Command::Sleep { code } => {
            let timeout = WatchdogTimeout::try_from(code)?;
            power.sleep(timeout);
        }
        Command::SleepMs { ms } => {
            let slept = power.sleep_ms(ms);
            if slept < ms {
                warn!("sleep shorter than requested; requested={} slept={}", ms, slept);
            }
        }
        Command::Table => {
            for timeout in WatchdogTimeout::ALL {
                println!("{:>2} {:>5}ms WDTCSR={:#010b}", timeout.code(), timeout.millis(), timeout.bits());
            }
            return Ok(());
        }
    }

    let (registers, clock) = power.release();
    for access in registers.log() {
        match access {
            Access::Write { register, value, interrupts_enabled } => {
                info!("write; register={:?} value={:#010b} interrupts={}", register, value, interrupts_enabled);
            }
            Access::Sleep { smcr, interrupts_enabled, brown_out_disabled } => {
                if !interrupts_enabled {
                    warn!("sleep with interrupts disabled; the cpu would never wake");
                }
                info!("sleep; smcr={:#010b} bod_disabled={}", smcr, brown_out_disabled);
            }
            other => info!("{:?};", other),
        }
    }
    for register in Register::ALL {
        println!("{:?} = {:#010b}", register, registers.read(register));
    }
    println!("millis = {}", clock.millis());
    return Ok(());
}
