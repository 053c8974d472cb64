//! Crate-wide error type and result alias.

use derive_more::{Display, Error};

/// Errors reported by the pulse-conversion layer.
///
/// Almost everything in this crate is resolved at build time (clock feature
/// selection, hardware availability); the runtime surface is deliberately
/// small.
#[derive(Clone, Copy, Debug, Display, Eq, Error, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// A frequency outside the supported set (16 MHz, 8 MHz) was passed to a
    /// frequency-parameterized converter.
    #[display("unsupported CPU clock frequency: {_0} Hz")]
    UnsupportedClockFrequency(#[error(not(source))] u32),
}

/// Result alias using the crate [`Error`].
pub type Result<T> = core::result::Result<T, Error>;
