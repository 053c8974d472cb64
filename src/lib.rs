//! Hobby-servo pulse generation on the ATmega328P's two PWM timer peripherals.
//!
//! Each peripheral (16-bit Timer/Counter1, 8-bit Timer/Counter2) drives two
//! output channels with standard 1–2 ms high pulses at a fixed ~2 ms frame,
//! refreshed by compare-match interrupts so the CPU is uninvolved between
//! configuration changes. The register sequencing lives in a generic driver
//! behind a small register-interface trait, so the same code runs against the
//! real memory-mapped peripherals (feature `atmega328p`, AVR targets only) or
//! against a recording test double on the host.
//!
//! # Glossary
//!
//! - **Compare register:** holds the counter value at which an output pin's
//!   state changes (match event).
//! - **Prescaler:** hardware clock divider between the CPU clock and the
//!   counter.
//! - **Compare-match interrupt:** fired when the counter equals a compare
//!   register; used here to rewrite the compare register to its maximum once
//!   per frame so pulse-width changes land cleanly on the next frame.
//! - **Raw value:** the peripheral-native integer written to a compare
//!   register, as opposed to the duration it encodes.
//!
//! # Example
//!
//! ```rust
//! use servo_envoy::clock::CpuClock;
//! use servo_envoy::driver::PulseTimer;
//! use servo_envoy::recorder::RegisterRecorder;
//! use servo_envoy::timer16;
//! use servo_envoy::timing::PulseWidth;
//!
//! let clock = CpuClock::Mhz16;
//! let mut timer = PulseTimer::new(RegisterRecorder::<u16>::new(), timer16::out_max(clock));
//!
//! let raw = timer16::raw_from_pulse(clock, PulseWidth::from_micros(1_500));
//! timer.pulse(raw, raw);
//! assert!(timer.registers().is_running());
//! ```
#![no_std]

// Compile-time checks: the clock features contradict each other, and the
// hardware backend needs exactly one of them.
#[cfg(all(feature = "clock-16mhz", feature = "clock-8mhz"))]
compile_error!("Cannot enable both 'clock-16mhz' and 'clock-8mhz' features simultaneously");

#[cfg(all(
    feature = "atmega328p",
    not(any(feature = "clock-16mhz", feature = "clock-8mhz"))
))]
compile_error!(
    "The 'atmega328p' feature requires exactly one clock feature: 'clock-16mhz' or 'clock-8mhz'"
);

pub mod clock;
pub mod driver;
mod error;
pub mod recorder;
pub mod timer16;
pub mod timer8;
pub mod timing;

// Re-export error types and result (used throughout)
pub use crate::error::{Error, Result};

/// Whether this build can generate pulses on real hardware.
///
/// `false` means the crate was built without the `atmega328p` feature or for
/// a non-AVR target; only the conversion layer and the recording test double
/// are available, and no interrupt handlers are installed.
#[must_use]
pub const fn pulse_hardware_available() -> bool {
    cfg!(all(feature = "atmega328p", target_arch = "avr"))
}
