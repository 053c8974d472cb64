//! The 8-bit pulse timer (Timer/Counter2), channels on PB3 (D11) and PD3 (D3).
//!
//! The counter top is fixed at `u8::MAX`; the frame length comes entirely
//! from prescaler selection (128 at 16 MHz, 64 at 8 MHz), which lands on the
//! same real period of 2048 µs either way. The conversion is therefore
//! clock-independent, and an unsupported clock is rejected at build time by
//! the clock feature guard.
//!
//! This peripheral has no period register; channel A's comparator doubles as
//! the fixed period reference and is pinned to the counter maximum during
//! preparation.

use crate::timing::{OUT_MIN_NANOS, OUT_RANGE_NANOS, PulseWidth};

/// Servo frame length in timing units.
pub const TARGET_PERIOD: u16 = 2008;

/// Full 8-bit counter period in microseconds at either supported clock.
pub const FULL_PERIOD_MICROS: u16 = 2048;

/// Comparator value of the longest pulse.
pub const OUT_MAX: u8 = ((TARGET_PERIOD as u32 * u8::MAX as u32) / FULL_PERIOD_MICROS as u32) as u8;

/// Comparator value of the shortest pulse.
pub const OUT_MIN: u8 = OUT_MAX / 2;

/// Width of the comparator band.
pub const OUT_RANGE: u8 = OUT_MAX - OUT_MIN;

/// Converts a pulse duration to this peripheral's raw compare value.
///
/// Direct closed-form linear scale; the 8-bit range keeps the intermediate
/// product far below `u32::MAX`, so no overflow-avoidance staging is needed.
/// `PulseWidth::MIN` maps exactly to [`OUT_MIN`], `PulseWidth::MAX` exactly
/// to [`OUT_MAX`].
#[must_use]
pub const fn raw_from_pulse(pulse: PulseWidth) -> u8 {
    (OUT_MIN as u32 + (pulse.as_nanos() - OUT_MIN_NANOS) * OUT_RANGE as u32 / OUT_RANGE_NANOS) as u8
}

#[cfg(all(feature = "atmega328p", target_arch = "avr"))]
mod avr {
    #![expect(unsafe_code, reason = "memory-mapped register access and ISRs")]

    use avr_device::atmega328p as pac;

    use crate::clock::CpuClock;
    use crate::driver::{Channel, PulseRegisters, PulseTimer, RawCompare};
    use crate::timing::bit;

    /// Channel A drives PB3 (Arduino D11).
    const DDB3: u8 = 3;
    /// Channel B drives PD3 (Arduino D3).
    const DDD3: u8 = 3;

    /// Timer/Counter2's register set.
    pub struct Tc2Registers {
        tc2: pac::TC2,
    }

    impl PulseRegisters for Tc2Registers {
        type Raw = u8;

        fn halt(&mut self) {
            self.tc2.tccr2a.reset();
            self.tc2.tccr2b.reset();
        }

        fn power_on(&mut self) {
            // PRR is shared with unrelated peripherals: read-modify-write,
            // foreground context only.
            unsafe { (*pac::CPU::ptr()).prr.modify(|_, w| w.prtim2().clear_bit()) };
        }

        fn power_off(&mut self) {
            unsafe { (*pac::CPU::ptr()).prr.modify(|_, w| w.prtim2().set_bit()) };
        }

        fn write_counter(&mut self, value: u8) {
            self.tc2.tcnt2.write(|w| w.bits(value));
        }

        fn mask_compare_interrupts(&mut self) {
            self.tc2
                .timsk2
                .modify(|_, w| w.ocie2a().clear_bit().ocie2b().clear_bit());
        }

        fn clear_compare_flags(&mut self) {
            // Compare flags clear by writing ones.
            self.tc2.tifr2.write(|w| w.ocf2a().set_bit().ocf2b().set_bit());
        }

        fn unmask_compare_interrupts(&mut self) {
            self.tc2
                .timsk2
                .modify(|_, w| w.ocie2a().set_bit().ocie2b().set_bit());
        }

        fn write_top(&mut self, value: u8) {
            // No period register on this peripheral: channel A's comparator
            // is the fixed period reference.
            self.tc2.ocr2a.write(|w| w.bits(value));
        }

        fn select_waveform(&mut self) {
            // Fast PWM, top = 0xFF; OC2A/OC2B set on compare match. The
            // clock-select bits stay zero until `start_clock`.
            self.tc2
                .tccr2a
                .write(|w| w.wgm2().pwm_fast().com2a().match_set().com2b().match_set());
            self.tc2.tccr2b.write(|w| w.cs2().no_clock());
        }

        fn write_compare(&mut self, channel: Channel, value: u8) {
            match channel {
                Channel::A => self.tc2.ocr2a.write(|w| w.bits(value)),
                Channel::B => self.tc2.ocr2b.write(|w| w.bits(value)),
            }
        }

        fn make_output(&mut self, channel: Channel) {
            match channel {
                Channel::A => {
                    let mask = bit(DDB3) as u8;
                    // DDRB/DDRD carry unrelated pins: read-modify-write,
                    // foreground only.
                    unsafe { (*pac::PORTB::ptr()).ddrb.modify(|r, w| w.bits(r.bits() | mask)) };
                }
                Channel::B => {
                    let mask = bit(DDD3) as u8;
                    unsafe { (*pac::PORTD::ptr()).ddrd.modify(|r, w| w.bits(r.bits() | mask)) };
                }
            }
        }

        fn start_clock(&mut self) {
            // Prescaler selection is the only period control this peripheral
            // has; the two supported clocks land on the same 2048 µs frame.
            match CpuClock::configured() {
                CpuClock::Mhz16 => self.tc2.tccr2b.modify(|_, w| w.cs2().prescale_128()),
                CpuClock::Mhz8 => self.tc2.tccr2b.modify(|_, w| w.cs2().prescale_64()),
            }
        }
    }

    /// Creates the pulse driver for Timer/Counter2.
    #[must_use]
    pub fn pulse_timer(tc2: pac::TC2) -> PulseTimer<Tc2Registers> {
        #[cfg(feature = "defmt")]
        defmt::debug!(
            "tc2 pulse timer: clock={=u32}Hz top={=u8}",
            CpuClock::configured().hz(),
            u8::MAX
        );
        PulseTimer::new(Tc2Registers { tc2 }, <u8 as RawCompare>::MAX)
    }

    #[avr_device::interrupt(atmega328p)]
    fn TIMER2_COMPA() {
        // Force the output high for the rest of the period; the next pulse
        // call supplies the next frame's compare value. Touches only this
        // channel's compare register.
        unsafe { (*pac::TC2::ptr()).ocr2a.write(|w| w.bits(u8::MAX)) };
    }

    #[avr_device::interrupt(atmega328p)]
    fn TIMER2_COMPB() {
        unsafe { (*pac::TC2::ptr()).ocr2b.write(|w| w.bits(u8::MAX)) };
    }
}

#[cfg(all(feature = "atmega328p", target_arch = "avr"))]
pub use avr::{Tc2Registers, pulse_timer};
