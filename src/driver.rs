//! The generic pulse-timer driver.
//!
//! Both hardware timers follow the same script; only the register set and the
//! period constants differ. [`PulseTimer`] owns the script, and the
//! [`PulseRegisters`] implementation it is given supplies the hardware (or a
//! recording double, see [`recorder`](crate::recorder)).
//!
//! # Refresh contract
//!
//! While the timer runs, a compare-match fires once per period for each
//! active channel. The handler bound to that event must complete in bounded
//! time and write the counter maximum to **its own channel's compare register
//! and nothing else**: that forces the output high for the remainder of the
//! period, so a later `pulse*` call lands cleanly on the next frame instead
//! of truncating or stretching the one in flight. The AVR backends install
//! interrupt handlers with exactly this body;
//! [`RegisterRecorder::compare_match`](crate::recorder::RegisterRecorder::compare_match)
//! plays the same role for host tests.

use core::ops::Sub;

// ============================================================================
// Channel - one of the two outputs per peripheral
// ============================================================================

/// One of a peripheral's two output channels.
///
/// Carries no state; it only selects which compare register and pin-direction
/// bit an operation touches.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Channel {
    /// First output (OC.A).
    A,
    /// Second output (OC.B).
    B,
}

// ============================================================================
// RawCompare - counter-width abstraction
// ============================================================================

/// An unsigned integer the width of a peripheral's counter.
///
/// Implemented for `u16` (Timer/Counter1) and `u8` (Timer/Counter2).
pub trait RawCompare: Copy + Eq + Ord + Sub<Output = Self> + core::fmt::Debug {
    /// The counter ceiling (all bits set).
    const MAX: Self;
}

impl RawCompare for u16 {
    const MAX: Self = u16::MAX;
}

impl RawCompare for u8 {
    const MAX: Self = u8::MAX;
}

// ============================================================================
// PulseRegisters - the injected register interface
// ============================================================================

/// Register-level operations a pulse timer peripheral must provide.
///
/// This is the substitutable boundary between the driver's sequencing and the
/// memory-mapped hardware: firmware builds hand the driver a real register
/// set, tests hand it a [`RegisterRecorder`](crate::recorder::RegisterRecorder).
///
/// Implementations perform single register writes and nothing more; all
/// ordering decisions belong to [`PulseTimer`]. Several operations are only
/// safe while the counter clock is stopped, which the driver guarantees by
/// calling [`start_clock`](Self::start_clock) last.
pub trait PulseRegisters {
    /// Compare/counter value width for this peripheral.
    type Raw: RawCompare;

    /// Clears both mode-control registers, halting waveform generation and
    /// releasing output-compare control of the pins.
    fn halt(&mut self);

    /// Ungates the peripheral clock.
    fn power_on(&mut self);

    /// Gates the peripheral clock off.
    fn power_off(&mut self);

    /// Writes the counter register.
    fn write_counter(&mut self, value: Self::Raw);

    /// Disables both channels' compare-match interrupts.
    fn mask_compare_interrupts(&mut self);

    /// Clears both channels' pending compare-match flags.
    fn clear_compare_flags(&mut self);

    /// Enables both channels' compare-match interrupts.
    fn unmask_compare_interrupts(&mut self);

    /// Programs the period reference.
    ///
    /// On a peripheral with a programmable period register this sets the
    /// counter top; on one without, it pins the fixed reference comparator to
    /// the counter maximum.
    fn write_top(&mut self, value: Self::Raw);

    /// Selects the counting/PWM waveform mode, leaving the clock-select bits
    /// zero so the counter stays stopped.
    fn select_waveform(&mut self);

    /// Writes one channel's compare register.
    fn write_compare(&mut self, channel: Channel, value: Self::Raw);

    /// Drives the channel's pin as an output.
    fn make_output(&mut self, channel: Channel);

    /// Writes the clock-select (prescaler) bits, starting the counter.
    fn start_clock(&mut self);
}

// ============================================================================
// PulseTimer - the driver
// ============================================================================

/// Drives one dual-channel PWM timer peripheral as a servo pulse generator.
///
/// Every `pulse*` call runs the full stopped → configured → running sequence,
/// so the call is atomic from the caller's perspective: there is no
/// observable intermediate state, even when the timer was already running.
///
/// A single foreground caller is assumed (the two channels share the mode and
/// period registers); callers on multiple contexts must serialize externally.
///
/// # Examples
///
/// ```rust
/// use servo_envoy::clock::CpuClock;
/// use servo_envoy::driver::PulseTimer;
/// use servo_envoy::recorder::RegisterRecorder;
/// use servo_envoy::timer16;
/// use servo_envoy::timing::PulseWidth;
///
/// let clock = CpuClock::Mhz16;
/// let mut timer = PulseTimer::new(RegisterRecorder::<u16>::new(), timer16::out_max(clock));
/// timer.pulse_a(timer16::raw_from_pulse(clock, PulseWidth::CENTER));
/// assert!(timer.registers().is_running());
/// timer.stop();
/// assert!(!timer.registers().is_running());
/// ```
pub struct PulseTimer<R: PulseRegisters> {
    regs: R,
    top: R::Raw,
}

impl<R: PulseRegisters> PulseTimer<R> {
    /// Creates a driver over a register set with the given period top value.
    ///
    /// `top` is `out_max` for the 16-bit peripheral (programmable period) and
    /// the counter maximum for the 8-bit one (fixed top).
    #[must_use]
    pub fn new(regs: R, top: R::Raw) -> Self {
        Self { regs, top }
    }

    /// The period top value this driver programs.
    #[must_use]
    pub fn top(&self) -> R::Raw {
        self.top
    }

    /// Read access to the underlying register set (used by test doubles).
    #[must_use]
    pub fn registers(&self) -> &R {
        &self.regs
    }

    /// Mutable access to the underlying register set.
    ///
    /// Exists so tests can fire a test double's
    /// [`compare_match`](crate::recorder::RegisterRecorder::compare_match)
    /// between frames; firmware code has no business here.
    #[must_use]
    pub fn registers_mut(&mut self) -> &mut R {
        &mut self.regs
    }

    /// Pulses both channels.
    ///
    /// `value_a`/`value_b` are raw compare values produced by the matching
    /// converter (`timer16::raw_from_pulse` / `timer8::raw_from_pulse`);
    /// values above [`top`](Self::top) are outside the contract.
    pub fn pulse(&mut self, value_a: R::Raw, value_b: R::Raw) {
        self.prepare();
        self.write_inverted(Channel::A, value_a);
        self.write_inverted(Channel::B, value_b);
        self.regs.make_output(Channel::A);
        self.regs.make_output(Channel::B);
        self.regs.start_clock();
    }

    /// Pulses a single channel, leaving the other channel's compare register
    /// and pin direction untouched.
    pub fn pulse_channel(&mut self, channel: Channel, value: R::Raw) {
        self.prepare();
        self.write_inverted(channel, value);
        self.regs.make_output(channel);
        self.regs.start_clock();
    }

    /// Pulses channel A. Equivalent to `pulse_channel(Channel::A, value)`.
    pub fn pulse_a(&mut self, value: R::Raw) {
        self.pulse_channel(Channel::A, value);
    }

    /// Pulses channel B. Equivalent to `pulse_channel(Channel::B, value)`.
    pub fn pulse_b(&mut self, value: R::Raw) {
        self.pulse_channel(Channel::B, value);
    }

    /// Halts waveform generation and gates the peripheral clock off.
    pub fn stop(&mut self) {
        self.regs.halt();
        self.regs.power_off();
    }

    /// The output-compare mode sets the pin high on match, so the time *until*
    /// the match is the low portion of the frame: writing the inverted value
    /// yields a high pulse of the requested duration.
    fn write_inverted(&mut self, channel: Channel, value: R::Raw) {
        self.regs.write_compare(channel, self.top - value);
    }

    /// Reconfigures the peripheral from scratch, counter stopped throughout.
    ///
    /// Mode and interrupt bits are only safe to change while the clock-select
    /// bits are zero; the prescaler write is deferred to `start_clock`.
    fn prepare(&mut self) {
        self.stop();
        self.regs.write_counter(R::Raw::MAX);
        self.regs.power_on();
        self.regs.mask_compare_interrupts();
        self.regs.clear_compare_flags();
        self.regs.unmask_compare_interrupts();
        self.regs.write_top(self.top);
        self.regs.select_waveform();
    }
}
