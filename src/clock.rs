//! CPU clock configuration.
//!
//! The pulse timers support exactly two system clocks. Conversions take a
//! [`CpuClock`] value, so an unsupported frequency is unrepresentable once
//! past [`CpuClock::try_from_hz`]; firmware builds pin the variant once with
//! the `clock-16mhz`/`clock-8mhz` Cargo features and read it back through
//! [`CpuClock::configured`].

use crate::{Error, Result};

/// One of the two supported CPU clock frequencies.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CpuClock {
    /// 16 MHz, the reference configuration.
    Mhz16,
    /// 8 MHz.
    Mhz8,
}

impl CpuClock {
    /// The reference clock frequency in Hz.
    pub const FREQUENCY_16: u32 = 16_000_000;

    /// The alternate clock frequency in Hz.
    pub const FREQUENCY_8: u32 = 8_000_000;

    /// The frequency in Hz.
    #[must_use]
    pub const fn hz(self) -> u32 {
        match self {
            Self::Mhz16 => Self::FREQUENCY_16,
            Self::Mhz8 => Self::FREQUENCY_8,
        }
    }

    /// Resolves a raw frequency to a supported clock.
    ///
    /// # Errors
    ///
    /// [`Error::UnsupportedClockFrequency`] for anything other than the two
    /// supported frequencies.
    pub const fn try_from_hz(hz: u32) -> Result<Self> {
        match hz {
            Self::FREQUENCY_16 => Ok(Self::Mhz16),
            Self::FREQUENCY_8 => Ok(Self::Mhz8),
            other => Err(Error::UnsupportedClockFrequency(other)),
        }
    }

    /// The clock this firmware build was configured for.
    ///
    /// Available only when one of the `clock-16mhz`/`clock-8mhz` features is
    /// enabled; enabling both is a compile error.
    #[cfg(feature = "clock-16mhz")]
    #[must_use]
    pub const fn configured() -> Self {
        Self::Mhz16
    }

    /// The clock this firmware build was configured for.
    ///
    /// Available only when one of the `clock-16mhz`/`clock-8mhz` features is
    /// enabled; enabling both is a compile error.
    #[cfg(all(feature = "clock-8mhz", not(feature = "clock-16mhz")))]
    #[must_use]
    pub const fn configured() -> Self {
        Self::Mhz8
    }
}
