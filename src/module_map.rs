//! Logical module order to bus address mapping
//!
//! Modules are daisy-chained in whatever order the wiring allows, which need
//! not match their left-to-right position on the display. The map is built
//! once from the bus address of each module in visual order.
//!
//! ## Example
//!
//! ```
//! use flipdot::{ConfigError, ModuleMap};
//!
//! // Three modules wired right to left
//! let map = ModuleMap::new(&[3, 2, 1])?;
//! assert_eq!(map.resolve(0)?, 3);
//! assert_eq!(map.resolve(2)?, 1);
//! assert!(matches!(map.resolve(3), Err(ConfigError::OutOfRange { index: 3, modules: 3 })));
//! # Ok::<(), ConfigError>(())
//! ```

use alloc::vec::Vec;

use crate::error::ConfigError;

/// Fixed permutation from logical module index to bus address
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModuleMap {
    addresses: Vec<u8>,
}

impl ModuleMap {
    /// Create a map from bus addresses listed left to right
    ///
    /// # Errors
    ///
    /// - [`ConfigError::NoModules`] if `addresses` is empty
    /// - [`ConfigError::DuplicateAddress`] if an address appears twice
    pub fn new(addresses: &[u8]) -> Result<Self, ConfigError> {
        if addresses.is_empty() {
            return Err(ConfigError::NoModules);
        }
        for (i, address) in addresses.iter().enumerate() {
            if addresses[..i].contains(address) {
                return Err(ConfigError::DuplicateAddress(*address));
            }
        }
        Ok(Self {
            addresses: addresses.to_vec(),
        })
    }

    /// Bus address of the module at `index`
    pub fn resolve(&self, index: usize) -> Result<u8, ConfigError> {
        self.addresses
            .get(index)
            .copied()
            .ok_or(ConfigError::OutOfRange {
                index,
                modules: self.addresses.len(),
            })
    }

    /// Number of modules
    pub fn len(&self) -> usize {
        self.addresses.len()
    }

    /// Always false; a map holds at least one module
    pub fn is_empty(&self) -> bool {
        self.addresses.is_empty()
    }

    /// Bus addresses in logical order
    pub fn addresses(&self) -> &[u8] {
        &self.addresses
    }
}
