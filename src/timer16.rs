//! The 16-bit pulse timer (Timer/Counter1), channels on PB1 (D9) and PB2 (D10).
//!
//! Runs with prescaler 1 at either supported clock, so the counter tick (and
//! with it the full 16-bit period and the `out_max`/`out_min` comparator
//! band) depends on the clock: the conversion here is frequency-parameterized.
//! The period register (ICR1) is programmed to `out_max`, giving a ~2 ms /
//! 500 Hz frame.

use crate::Result;
use crate::clock::CpuClock;
use crate::timing::{OUT_MIN_NANOS, OUT_RANGE_NANOS, PulseWidth};

/// Servo frame length in timing units (~2 ms).
pub const TARGET_PERIOD: u16 = 2000;

/// Full 16-bit counter period in microseconds at the given clock.
const fn full_period_micros(clock: CpuClock) -> u32 {
    match clock {
        // Prescaler 1 @ 16 MHz, top = u16::MAX => period 4096 µs.
        CpuClock::Mhz16 => 4096,
        // The tick doubles at 8 MHz, so the full period doubles.
        CpuClock::Mhz8 => 8192,
    }
}

/// Comparator value of the longest pulse (and the programmed period top).
#[must_use]
pub const fn out_max(clock: CpuClock) -> u16 {
    ((TARGET_PERIOD as u32 * u16::MAX as u32) / full_period_micros(clock)) as u16
}

/// Comparator value of the shortest pulse.
#[must_use]
pub const fn out_min(clock: CpuClock) -> u16 {
    out_max(clock) / 2
}

/// Width of the comparator band.
#[must_use]
pub const fn out_range(clock: CpuClock) -> u16 {
    out_max(clock) - out_min(clock)
}

/// Converts a pulse duration to this peripheral's raw compare value.
///
/// Linear over the band: `PulseWidth::MIN` maps exactly to
/// [`out_min`], `PulseWidth::MAX` exactly to [`out_max`].
#[must_use]
pub const fn raw_from_pulse(clock: CpuClock, pulse: PulseWidth) -> u16 {
    let span = (pulse.as_nanos() - OUT_MIN_NANOS) / 10;
    // Scale down by 10 so the working value stays under u32::MAX, without
    // losing precision on the output.
    (out_min(clock) as u32 + span * out_range(clock) as u32 / (OUT_RANGE_NANOS / 10)) as u16
}

/// Converts a pulse duration, resolving the clock from a raw frequency.
///
/// # Errors
///
/// [`Error::UnsupportedClockFrequency`](crate::Error::UnsupportedClockFrequency)
/// when `clock_hz` is not one of the two supported frequencies.
pub const fn raw_from_nanoseconds(clock_hz: u32, pulse: PulseWidth) -> Result<u16> {
    match CpuClock::try_from_hz(clock_hz) {
        Ok(clock) => Ok(raw_from_pulse(clock, pulse)),
        Err(err) => Err(err),
    }
}

#[cfg(all(feature = "atmega328p", target_arch = "avr"))]
mod avr {
    #![expect(unsafe_code, reason = "memory-mapped register access and ISRs")]

    use avr_device::atmega328p as pac;

    use crate::clock::CpuClock;
    use crate::driver::{Channel, PulseRegisters, PulseTimer};
    use crate::timing::bit;

    /// Channel A drives PB1 (Arduino D9).
    const DDB1: u8 = 1;
    /// Channel B drives PB2 (Arduino D10).
    const DDB2: u8 = 2;

    /// Timer/Counter1's register set.
    pub struct Tc1Registers {
        tc1: pac::TC1,
    }

    impl PulseRegisters for Tc1Registers {
        type Raw = u16;

        fn halt(&mut self) {
            self.tc1.tccr1a.reset();
            self.tc1.tccr1b.reset();
        }

        fn power_on(&mut self) {
            // PRR is shared with unrelated peripherals: read-modify-write,
            // foreground context only.
            unsafe { (*pac::CPU::ptr()).prr.modify(|_, w| w.prtim1().clear_bit()) };
        }

        fn power_off(&mut self) {
            unsafe { (*pac::CPU::ptr()).prr.modify(|_, w| w.prtim1().set_bit()) };
        }

        fn write_counter(&mut self, value: u16) {
            self.tc1.tcnt1.write(|w| w.bits(value));
        }

        fn mask_compare_interrupts(&mut self) {
            self.tc1
                .timsk1
                .modify(|_, w| w.ocie1a().clear_bit().ocie1b().clear_bit());
        }

        fn clear_compare_flags(&mut self) {
            // Compare flags clear by writing ones.
            self.tc1.tifr1.write(|w| w.ocf1a().set_bit().ocf1b().set_bit());
        }

        fn unmask_compare_interrupts(&mut self) {
            self.tc1
                .timsk1
                .modify(|_, w| w.ocie1a().set_bit().ocie1b().set_bit());
        }

        fn write_top(&mut self, value: u16) {
            self.tc1.icr1.write(|w| w.bits(value));
        }

        fn select_waveform(&mut self) {
            // Fast PWM, top = ICR1; OC1A/OC1B set on compare match. The
            // clock-select bits stay zero until `start_clock`.
            self.tc1
                .tccr1a
                .write(|w| w.wgm1().bits(0b10).com1a().match_set().com1b().match_set());
            self.tc1.tccr1b.write(|w| w.wgm1().bits(0b11).cs1().no_clock());
        }

        fn write_compare(&mut self, channel: Channel, value: u16) {
            match channel {
                Channel::A => self.tc1.ocr1a.write(|w| w.bits(value)),
                Channel::B => self.tc1.ocr1b.write(|w| w.bits(value)),
            }
        }

        fn make_output(&mut self, channel: Channel) {
            let mask = match channel {
                Channel::A => bit(DDB1) as u8,
                Channel::B => bit(DDB2) as u8,
            };
            // DDRB carries unrelated pins: read-modify-write, foreground only.
            unsafe { (*pac::PORTB::ptr()).ddrb.modify(|r, w| w.bits(r.bits() | mask)) };
        }

        fn start_clock(&mut self) {
            self.tc1.tccr1b.modify(|_, w| w.cs1().direct());
        }
    }

    /// Creates the pulse driver for Timer/Counter1 at the configured clock.
    #[must_use]
    pub fn pulse_timer(tc1: pac::TC1) -> PulseTimer<Tc1Registers> {
        let clock = CpuClock::configured();
        let top = super::out_max(clock);
        #[cfg(feature = "defmt")]
        defmt::debug!("tc1 pulse timer: clock={=u32}Hz top={=u16}", clock.hz(), top);
        PulseTimer::new(Tc1Registers { tc1 }, top)
    }

    #[avr_device::interrupt(atmega328p)]
    fn TIMER1_COMPA() {
        // Force the output high for the rest of the period; the next pulse
        // call supplies the next frame's compare value. Touches only this
        // channel's compare register.
        unsafe { (*pac::TC1::ptr()).ocr1a.write(|w| w.bits(u16::MAX)) };
    }

    #[avr_device::interrupt(atmega328p)]
    fn TIMER1_COMPB() {
        unsafe { (*pac::TC1::ptr()).ocr1b.write(|w| w.bits(u16::MAX)) };
    }
}

#[cfg(all(feature = "atmega328p", target_arch = "avr"))]
pub use avr::{Tc1Registers, pulse_timer};
