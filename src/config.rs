//! Display configuration types and builder

use alloc::vec::Vec;

pub use crate::error::{ConfigError, MAX_COLS, MAX_MODULE_COLS, MAX_ROWS};
use crate::module_map::ModuleMap;

/// Display dimensions
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Dimensions {
    /// Number of rows (height in dots)
    pub rows: u16,
    /// Number of columns (width in dots, across all modules)
    pub cols: u16,
}

impl Dimensions {
    /// Create new dimensions with validation
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidDimensions` if:
    /// - rows == 0 or rows > MAX_ROWS
    /// - cols == 0 or cols > MAX_COLS
    pub fn new(rows: u16, cols: u16) -> Result<Self, ConfigError> {
        if rows == 0 || rows > MAX_ROWS {
            return Err(ConfigError::InvalidDimensions { rows, cols });
        }
        if cols == 0 || cols > MAX_COLS {
            return Err(ConfigError::InvalidDimensions { rows, cols });
        }
        Ok(Self { rows, cols })
    }

    /// Total number of dots
    pub fn dots(&self) -> usize {
        self.rows as usize * self.cols as usize
    }
}

/// Initial contents of the driver's record of physical dot states
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MirrorState {
    /// Assume every dot shows its dark face
    #[default]
    Unset,
    /// Assume nothing; the first update flips every dot
    Unknown,
}

/// Display configuration
///
/// Fixed at startup. Use `Builder` to create a Config.
#[derive(Clone, Debug)]
pub struct Config {
    /// Display dimensions
    pub dimensions: Dimensions,
    /// Bus address of each module, left to right
    pub modules: ModuleMap,
    /// Minimum time between two flips of the same dot, in milliseconds
    pub flip_time_ms: u32,
    /// Assumed physical state at startup
    pub initial_mirror: MirrorState,
}

impl Config {
    /// Width of each module in columns
    pub fn module_cols(&self) -> u16 {
        self.dimensions.cols / self.modules.len() as u16
    }
}

/// Builder for constructing display configuration
///
/// # Example
///
/// ```
/// use flipdot::{Builder, Dimensions};
///
/// // 84x16 display made of three 28-column modules wired right to left
/// let config = Builder::new()
///     .dimensions(Dimensions::new(16, 84)?)
///     .module_addresses(&[3, 2, 1])
///     .flip_time_ms(550)
///     .build()?;
/// assert_eq!(config.module_cols(), 28);
/// # Ok::<(), flipdot::ConfigError>(())
/// ```
#[must_use]
#[derive(Default)]
pub struct Builder {
    /// Display dimensions (required)
    dimensions: Option<Dimensions>,
    /// Module bus addresses, left to right (required)
    module_addresses: Vec<u8>,
    /// Minimum flip interval per dot (required)
    flip_time_ms: Option<u32>,
    /// Assumed physical state at startup
    initial_mirror: MirrorState,
}

impl Builder {
    /// Create a new Builder with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set display dimensions (required)
    pub fn dimensions(mut self, dims: Dimensions) -> Self {
        self.dimensions = Some(dims);
        self
    }

    /// Set the bus address of each module, left to right (required)
    ///
    /// The number of addresses is the module count; the display width must
    /// split evenly between them.
    pub fn module_addresses(mut self, addresses: &[u8]) -> Self {
        self.module_addresses = addresses.to_vec();
        self
    }

    /// Set the minimum time between two flips of the same dot (required)
    ///
    /// This is a property of the panel's coils. Zero disables pacing.
    pub fn flip_time_ms(mut self, value: u32) -> Self {
        self.flip_time_ms = Some(value);
        self
    }

    /// Set the assumed physical state at startup
    pub fn initial_mirror(mut self, value: MirrorState) -> Self {
        self.initial_mirror = value;
        self
    }

    /// Build the configuration
    ///
    /// # Errors
    ///
    /// - `ConfigError::MissingDimensions` if dimensions were not set
    /// - `ConfigError::MissingFlipTime` if the flip time was not set
    /// - `ConfigError::NoModules` / `DuplicateAddress` for a bad address list
    /// - `ConfigError::UnevenModules` if the width does not split evenly
    /// - `ConfigError::ModuleTooWide` if a module exceeds [`MAX_MODULE_COLS`]
    pub fn build(self) -> Result<Config, ConfigError> {
        let dimensions = self.dimensions.ok_or(ConfigError::MissingDimensions)?;
        let flip_time_ms = self.flip_time_ms.ok_or(ConfigError::MissingFlipTime)?;
        let modules = ModuleMap::new(&self.module_addresses)?;

        let count = modules.len();
        if count > dimensions.cols as usize || dimensions.cols as usize % count != 0 {
            return Err(ConfigError::UnevenModules {
                cols: dimensions.cols,
                modules: count,
            });
        }
        let module_cols = dimensions.cols / count as u16;
        if module_cols > MAX_MODULE_COLS {
            return Err(ConfigError::ModuleTooWide { module_cols });
        }

        Ok(Config {
            dimensions,
            modules,
            flip_time_ms,
            initial_mirror: self.initial_mirror,
        })
    }
}
