//! Error types for the driver
//!
//! ## Error Types
//!
//! - [`BusError`] - A single byte transfer to a module failed
//! - [`IndexError`] - A buffer coordinate lies outside the display
//! - [`ConfigError`] - Invalid geometry or module wiring at startup
//! - [`DriverError`] - Outcome of a flip batch in which some transfers failed
//!
//! Bus errors are recoverable: the affected dots are simply retried on the next
//! update. Index and configuration errors point at wrong geometry or wiring and
//! are returned to the caller rather than absorbed.
//!
//! ## Example
//!
//! ```
//! use flipdot::{Builder, ConfigError, Dimensions};
//!
//! // Missing dimensions
//! let result = Builder::new().module_addresses(&[1, 2]).flip_time_ms(550).build();
//! assert!(matches!(result, Err(ConfigError::MissingDimensions)));
//!
//! // Too many rows for the row strobe encoding
//! assert!(Dimensions::new(64, 84).is_err());
//! ```

use alloc::vec::Vec;
use core::fmt::Debug;

use crate::command::FlipCommand;

/// Maximum number of rows addressable by the row strobe byte
pub const MAX_ROWS: u16 = 32;

/// Maximum number of columns a single module can expose
pub const MAX_MODULE_COLS: u16 = 64;

/// Maximum total display width
pub const MAX_COLS: u16 = 1024;

/// Errors from a single transfer on the two-wire bus
///
/// Generic over the GPIO error type of the bus lines.
#[derive(Debug, Clone, PartialEq)]
pub enum BusError<E> {
    /// The module did not acknowledge its address
    ///
    /// The module is missing, miswired or busy.
    NoAck {
        /// Address byte that went unacknowledged
        address: u8,
    },
    /// Driving or sampling a bus line failed
    Pin(E),
}

impl<E: Debug> core::fmt::Display for BusError<E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NoAck { address } => write!(f, "No acknowledge from address {address:#04x}"),
            Self::Pin(e) => write!(f, "Pin error: {e:?}"),
        }
    }
}

impl<E: Debug> core::error::Error for BusError<E> {}

/// A coordinate outside the buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexError {
    /// Requested row
    pub row: usize,
    /// Requested column
    pub col: usize,
    /// Buffer height
    pub rows: usize,
    /// Buffer width
    pub cols: usize,
}

impl core::fmt::Display for IndexError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "Dot ({}, {}) outside {}x{} buffer",
            self.row, self.col, self.rows, self.cols
        )
    }
}

impl core::error::Error for IndexError {}

/// Configuration errors
///
/// These occur while building the configuration or resolving modules, and
/// indicate that geometry or wiring is wrong.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Logical module index past the configured module count
    OutOfRange {
        /// Requested logical index
        index: usize,
        /// Number of configured modules
        modules: usize,
    },
    /// Dimensions were not specified
    ///
    /// [`Builder::dimensions()`](crate::config::Builder::dimensions) must be called before building.
    MissingDimensions,
    /// Minimum flip time was not specified
    ///
    /// [`Builder::flip_time_ms()`](crate::config::Builder::flip_time_ms) must be called before building.
    MissingFlipTime,
    /// Invalid dimensions provided
    ///
    /// See [`Dimensions::new()`](crate::config::Dimensions::new) for constraints.
    InvalidDimensions {
        /// Number of rows (height) requested
        rows: u16,
        /// Number of columns (width) requested
        cols: u16,
    },
    /// No module addresses were configured
    NoModules,
    /// The display width does not split evenly into modules
    UnevenModules {
        /// Display width in columns
        cols: u16,
        /// Number of configured modules
        modules: usize,
    },
    /// Module width exceeds [`MAX_MODULE_COLS`]
    ModuleTooWide {
        /// Columns per module
        module_cols: u16,
    },
    /// The same bus address was given to more than one module
    DuplicateAddress(u8),
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::OutOfRange { index, modules } => {
                write!(f, "Module {index} out of range ({modules} configured)")
            }
            Self::MissingDimensions => write!(f, "Dimensions must be specified"),
            Self::MissingFlipTime => write!(f, "Flip time must be specified"),
            Self::InvalidDimensions { rows, cols } => write!(
                f,
                "Invalid dimensions {rows}x{cols} (max {MAX_ROWS}x{MAX_COLS})"
            ),
            Self::NoModules => write!(f, "At least one module address must be specified"),
            Self::UnevenModules { cols, modules } => {
                write!(f, "{cols} columns cannot be split into {modules} modules")
            }
            Self::ModuleTooWide { module_cols } => write!(
                f,
                "Module width {module_cols} exceeds {MAX_MODULE_COLS} columns"
            ),
            Self::DuplicateAddress(address) => {
                write!(f, "Address {address:#04x} assigned to more than one module")
            }
        }
    }
}

impl core::error::Error for ConfigError {}

/// A flip command whose transfer failed
#[derive(Debug, Clone, PartialEq)]
pub struct Failure<E> {
    /// The command that was not applied
    pub command: FlipCommand,
    /// Why the transfer failed
    pub error: BusError<E>,
}

/// Commands issued and held back by one emit pass
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Emission {
    /// Number of commands transmitted successfully
    pub issued: usize,
    /// Commands held back because their dot flipped too recently
    pub deferred: Vec<FlipCommand>,
}

/// Errors from pushing a batch of flip commands to the modules
#[derive(Debug, Clone, PartialEq)]
pub enum DriverError<E> {
    /// Some transfers failed; the rest of the batch was still sent
    Bus {
        /// Per-command failures, in emission order
        failures: Vec<Failure<E>>,
        /// What the pass achieved despite the failures
        emission: Emission,
    },
    /// A command referenced a module the map cannot resolve
    Config(ConfigError),
}

impl<E> From<ConfigError> for DriverError<E> {
    fn from(error: ConfigError) -> Self {
        Self::Config(error)
    }
}

impl<E: Debug> core::fmt::Display for DriverError<E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Bus { failures, emission } => write!(
                f,
                "{} flip(s) failed, {} issued, {} deferred",
                failures.len(),
                emission.issued,
                emission.deferred.len()
            ),
            Self::Config(e) => write!(f, "Configuration error: {e}"),
        }
    }
}

impl<E: Debug> core::error::Error for DriverError<E> {}
