//! A register-interface test double that records every write.
//!
//! [`RegisterRecorder`] implements [`PulseRegisters`] with no hardware side
//! effects: it appends each operation to a bounded log and mirrors the state
//! a real peripheral would hold (powered, running, compare values, pin
//! directions). Sequencing tests assert on the log; state tests assert on the
//! accessors.

use heapless::Vec;

use crate::driver::{Channel, PulseRegisters, RawCompare};

/// Maximum number of recorded writes before the recorder panics.
pub const LOG_CAPACITY: usize = 128;

/// One recorded register operation.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Write<W> {
    /// Both mode-control registers cleared.
    Halt,
    /// Peripheral clock ungated.
    PowerOn,
    /// Peripheral clock gated off.
    PowerOff,
    /// Counter register written.
    Counter(W),
    /// Both compare-match interrupts disabled.
    MaskCompareInterrupts,
    /// Both compare-match flags cleared.
    ClearCompareFlags,
    /// Both compare-match interrupts enabled.
    UnmaskCompareInterrupts,
    /// Period reference written.
    Top(W),
    /// Waveform mode selected (clock still stopped).
    SelectWaveform,
    /// One channel's compare register written.
    Compare(Channel, W),
    /// One channel's pin driven as an output.
    MakeOutput(Channel),
    /// Clock-select bits written; the counter is running.
    StartClock,
}

/// Records register writes and mirrors peripheral state for tests.
#[derive(Debug, Default)]
pub struct RegisterRecorder<W: RawCompare> {
    log: Vec<Write<W>, LOG_CAPACITY>,
    powered: bool,
    running: bool,
    interrupts_unmasked: bool,
    counter: Option<W>,
    top: Option<W>,
    compare_a: Option<W>,
    compare_b: Option<W>,
    output_a: bool,
    output_b: bool,
}

impl<W: RawCompare> RegisterRecorder<W> {
    /// Creates an empty recorder: powered down, stopped, nothing written.
    #[must_use]
    pub fn new() -> Self {
        Self {
            log: Vec::new(),
            powered: false,
            running: false,
            interrupts_unmasked: false,
            counter: None,
            top: None,
            compare_a: None,
            compare_b: None,
            output_a: false,
            output_b: false,
        }
    }

    /// Every write recorded so far, in order.
    #[must_use]
    pub fn log(&self) -> &[Write<W>] {
        &self.log
    }

    /// Whether the peripheral clock gate is open.
    #[must_use]
    pub fn is_powered(&self) -> bool {
        self.powered
    }

    /// Whether the counter is running (clock-select bits nonzero).
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Whether both compare-match interrupts are enabled.
    #[must_use]
    pub fn interrupts_unmasked(&self) -> bool {
        self.interrupts_unmasked
    }

    /// The last value written to the counter register, if any.
    #[must_use]
    pub fn counter(&self) -> Option<W> {
        self.counter
    }

    /// The last value written to the period reference, if any.
    #[must_use]
    pub fn top(&self) -> Option<W> {
        self.top
    }

    /// The last value written to a channel's compare register, if any.
    #[must_use]
    pub fn compare(&self, channel: Channel) -> Option<W> {
        match channel {
            Channel::A => self.compare_a,
            Channel::B => self.compare_b,
        }
    }

    /// Whether a channel's pin has been driven as an output.
    #[must_use]
    pub fn is_output(&self, channel: Channel) -> bool {
        match channel {
            Channel::A => self.output_a,
            Channel::B => self.output_b,
        }
    }

    /// Simulates one compare-match refresh for `channel`.
    ///
    /// Same contract as the hardware interrupt handlers: bounded work, writes
    /// the counter maximum to this channel's compare register, touches
    /// nothing else.
    pub fn compare_match(&mut self, channel: Channel) {
        self.write_compare(channel, W::MAX);
    }

    fn record(&mut self, write: Write<W>) {
        self.log.push(write).expect("register write log full");
    }
}

impl<W: RawCompare> PulseRegisters for RegisterRecorder<W> {
    type Raw = W;

    fn halt(&mut self) {
        self.running = false;
        self.record(Write::Halt);
    }

    fn power_on(&mut self) {
        self.powered = true;
        self.record(Write::PowerOn);
    }

    fn power_off(&mut self) {
        self.powered = false;
        self.record(Write::PowerOff);
    }

    fn write_counter(&mut self, value: W) {
        self.counter = Some(value);
        self.record(Write::Counter(value));
    }

    fn mask_compare_interrupts(&mut self) {
        self.interrupts_unmasked = false;
        self.record(Write::MaskCompareInterrupts);
    }

    fn clear_compare_flags(&mut self) {
        self.record(Write::ClearCompareFlags);
    }

    fn unmask_compare_interrupts(&mut self) {
        self.interrupts_unmasked = true;
        self.record(Write::UnmaskCompareInterrupts);
    }

    fn write_top(&mut self, value: W) {
        self.top = Some(value);
        self.record(Write::Top(value));
    }

    fn select_waveform(&mut self) {
        self.record(Write::SelectWaveform);
    }

    fn write_compare(&mut self, channel: Channel, value: W) {
        match channel {
            Channel::A => self.compare_a = Some(value),
            Channel::B => self.compare_b = Some(value),
        }
        self.record(Write::Compare(channel, value));
    }

    fn make_output(&mut self, channel: Channel) {
        match channel {
            Channel::A => self.output_a = true,
            Channel::B => self.output_b = true,
        }
        self.record(Write::MakeOutput(channel));
    }

    fn start_clock(&mut self) {
        self.running = true;
        self.record(Write::StartClock);
    }
}

#[cfg(test)]
mod tests {
    use super::{RegisterRecorder, Write};
    use crate::driver::{Channel, PulseRegisters};

    #[test]
    fn recorder_starts_cold() {
        let recorder = RegisterRecorder::<u16>::new();
        assert!(!recorder.is_powered());
        assert!(!recorder.is_running());
        assert!(recorder.log().is_empty());
        assert_eq!(recorder.compare(Channel::A), None);
    }

    #[test]
    fn compare_match_touches_only_its_own_channel() {
        let mut recorder = RegisterRecorder::<u8>::new();
        recorder.write_compare(Channel::A, 10);
        recorder.write_compare(Channel::B, 20);

        recorder.compare_match(Channel::A);

        assert_eq!(recorder.compare(Channel::A), Some(u8::MAX));
        assert_eq!(recorder.compare(Channel::B), Some(20));
        assert_eq!(
            recorder.log().last(),
            Some(&Write::Compare(Channel::A, u8::MAX))
        );
    }
}
