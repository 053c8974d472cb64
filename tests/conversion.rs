#![allow(missing_docs)]
//! Host-level tests for the pulse-width conversion layer.

use servo_envoy::Error;
use servo_envoy::clock::CpuClock;
use servo_envoy::timing::{
    self, OUT_MAX_NANOS, OUT_MIN_NANOS, OUT_RANGE_NANOS, PulseWidth, limit_nanoseconds,
};
use servo_envoy::{timer16, timer8};

const CLOCKS: [CpuClock; 2] = [CpuClock::Mhz16, CpuClock::Mhz8];

#[test]
fn limit_clamps_at_and_beyond_both_boundaries() {
    assert_eq!(limit_nanoseconds(500_000), 1_000_000);
    assert_eq!(limit_nanoseconds(999_999), 1_000_000);
    assert_eq!(limit_nanoseconds(1_000_000), 1_000_000);
    assert_eq!(limit_nanoseconds(1_500_000), 1_500_000);
    assert_eq!(limit_nanoseconds(2_000_000), 2_000_000);
    assert_eq!(limit_nanoseconds(3_000_000), 2_000_000);
}

#[test]
fn limit_is_idempotent() {
    for nanos in [
        0,
        500_000,
        OUT_MIN_NANOS,
        1_234_567,
        OUT_MAX_NANOS,
        3_000_000,
        u32::MAX,
    ] {
        let once = limit_nanoseconds(nanos);
        assert_eq!(limit_nanoseconds(once), once, "nanos={nanos}");
    }
}

#[test]
fn micros_constants_are_exact_thousandths() {
    assert_eq!(timing::OUT_MAX_MICROS, 2_000);
    assert_eq!(timing::OUT_MIN_MICROS, 1_000);
    assert_eq!(timing::OUT_RANGE_MICROS, 1_000);
    assert_eq!(OUT_RANGE_NANOS, OUT_MAX_NANOS - OUT_MIN_NANOS);
}

#[test]
fn band_invariants_hold_for_every_supported_clock() {
    for clock in CLOCKS {
        let out_max = timer16::out_max(clock);
        assert_eq!(timer16::out_min(clock), out_max / 2, "clock={clock:?}");
        assert_eq!(
            timer16::out_range(clock),
            out_max - timer16::out_min(clock),
            "clock={clock:?}"
        );
    }
    assert_eq!(timer8::OUT_MIN, timer8::OUT_MAX / 2);
    assert_eq!(timer8::OUT_RANGE, timer8::OUT_MAX - timer8::OUT_MIN);
}

#[test]
fn timer16_band_values_per_clock() {
    assert_eq!(timer16::out_max(CpuClock::Mhz16), 31_999);
    assert_eq!(timer16::out_min(CpuClock::Mhz16), 15_999);
    assert_eq!(timer16::out_max(CpuClock::Mhz8), 15_999);
    assert_eq!(timer16::out_min(CpuClock::Mhz8), 7_999);
}

#[test]
fn timer16_endpoints_are_exact() {
    for clock in CLOCKS {
        assert_eq!(
            timer16::raw_from_pulse(clock, PulseWidth::MIN),
            timer16::out_min(clock),
            "clock={clock:?}"
        );
        assert_eq!(
            timer16::raw_from_pulse(clock, PulseWidth::MAX),
            timer16::out_max(clock),
            "clock={clock:?}"
        );
    }
}

#[test]
fn timer16_midpoint_at_reference_clock() {
    let clock = CpuClock::Mhz16;
    let raw = timer16::raw_from_pulse(clock, PulseWidth::from_nanos(1_500_000));
    assert_eq!(raw, 23_999);
    assert_eq!(
        u32::from(raw),
        (u32::from(timer16::out_min(clock)) + u32::from(timer16::out_max(clock))) / 2
    );
}

#[test]
fn timer16_is_monotonic_and_in_band() {
    for clock in CLOCKS {
        let mut previous = timer16::raw_from_pulse(clock, PulseWidth::MIN);
        let mut nanos = OUT_MIN_NANOS;
        while nanos <= OUT_MAX_NANOS {
            let raw = timer16::raw_from_pulse(clock, PulseWidth::from_nanos(nanos));
            assert!(raw >= previous, "clock={clock:?} nanos={nanos}");
            assert!(raw >= timer16::out_min(clock));
            assert!(raw <= timer16::out_max(clock));
            previous = raw;
            nanos += 1_000;
        }
    }
}

#[test]
fn timer8_band_values() {
    assert_eq!(timer8::OUT_MAX, 250);
    assert_eq!(timer8::OUT_MIN, 125);
    assert_eq!(timer8::OUT_RANGE, 125);
}

#[test]
fn timer8_endpoints_are_exact() {
    assert_eq!(timer8::raw_from_pulse(PulseWidth::MIN), timer8::OUT_MIN);
    assert_eq!(timer8::raw_from_pulse(PulseWidth::MAX), timer8::OUT_MAX);
}

#[test]
fn timer8_is_monotonic_and_in_band() {
    let mut previous = timer8::raw_from_pulse(PulseWidth::MIN);
    let mut nanos = OUT_MIN_NANOS;
    while nanos <= OUT_MAX_NANOS {
        let raw = timer8::raw_from_pulse(PulseWidth::from_nanos(nanos));
        assert!(raw >= previous, "nanos={nanos}");
        assert!((timer8::OUT_MIN..=timer8::OUT_MAX).contains(&raw));
        previous = raw;
        nanos += 1_000;
    }
}

#[test]
fn frequency_parameterized_conversion_accepts_both_supported_clocks() {
    let pulse = PulseWidth::CENTER;
    assert_eq!(
        timer16::raw_from_nanoseconds(CpuClock::FREQUENCY_16, pulse),
        Ok(timer16::raw_from_pulse(CpuClock::Mhz16, pulse))
    );
    assert_eq!(
        timer16::raw_from_nanoseconds(CpuClock::FREQUENCY_8, pulse),
        Ok(timer16::raw_from_pulse(CpuClock::Mhz8, pulse))
    );
}

#[test]
fn frequency_parameterized_conversion_rejects_unsupported_clock() {
    assert_eq!(
        timer16::raw_from_nanoseconds(12_000_000, PulseWidth::CENTER),
        Err(Error::UnsupportedClockFrequency(12_000_000))
    );
    assert_eq!(
        CpuClock::try_from_hz(0),
        Err(Error::UnsupportedClockFrequency(0))
    );
    assert_eq!(CpuClock::try_from_hz(16_000_000), Ok(CpuClock::Mhz16));
    assert_eq!(CpuClock::try_from_hz(8_000_000), Ok(CpuClock::Mhz8));
}

#[test]
fn pulse_width_makes_clamping_unforgeable() {
    assert_eq!(PulseWidth::from_nanos(1), PulseWidth::MIN);
    assert_eq!(PulseWidth::from_nanos(u32::MAX), PulseWidth::MAX);
    assert_eq!(PulseWidth::from_micros(1_500), PulseWidth::CENTER);
    // Clamped inputs convert to in-band raw values on both peripherals.
    let short = PulseWidth::from_nanos(0);
    assert_eq!(
        timer16::raw_from_pulse(CpuClock::Mhz16, short),
        timer16::out_min(CpuClock::Mhz16)
    );
    assert_eq!(timer8::raw_from_pulse(short), timer8::OUT_MIN);
}
