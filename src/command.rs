//! Flip commands and their wire encoding
//!
//! A flip command addresses one dot on one module. On the wire it becomes two
//! byte transfers to the module's bus address:
//!
//! 1. **Column select**: bit 7 set, bit 6 carries the target state, bits 0-5
//!    the column within the module.
//! 2. **Row strobe**: bit 7 clear, bits 0-4 the row. Receiving the strobe fires
//!    the flip pulse for the selected column and row.
//!
//! ## Example
//!
//! ```
//! use flipdot::{Dot, FlipCommand, command};
//!
//! let cmd = FlipCommand::new(1, 3, 5, Dot::Set);
//! assert_eq!(
//!     cmd.encode(),
//!     [command::SELECT_COLUMN | command::STATE_SET | 5, command::STROBE_ROW | 3]
//! );
//! ```

use crate::dot::Dot;

/// Column select marker (bit 7)
pub const SELECT_COLUMN: u8 = 0x80;

/// Target state bit within the column select byte
///
/// Set: flip to the coloured face. Clear: flip to the dark face.
pub const STATE_SET: u8 = 0x40;

/// Column bits within the column select byte
pub const COLUMN_MASK: u8 = 0x3F;

/// Row strobe marker (bit 7 clear)
pub const STROBE_ROW: u8 = 0x00;

/// Row bits within the row strobe byte
pub const ROW_MASK: u8 = 0x1F;

/// An instruction to flip one dot on one module
///
/// `col` is local to the module: column 0 is the module's leftmost column.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FlipCommand {
    /// Logical module index, left to right
    pub module: usize,
    /// Row on the display
    pub row: usize,
    /// Column within the module
    pub col: usize,
    /// State to flip the dot to
    pub state: Dot,
}

impl FlipCommand {
    /// Create a new flip command
    pub fn new(module: usize, row: usize, col: usize, state: Dot) -> Self {
        Self {
            module,
            row,
            col,
            state,
        }
    }

    /// Column on the full display for modules `module_cols` wide
    pub fn display_col(&self, module_cols: usize) -> usize {
        self.module * module_cols + self.col
    }

    /// Bytes to transfer, in order
    pub fn encode(&self) -> [u8; 2] {
        let state = if self.state.is_set() { STATE_SET } else { 0 };
        [
            SELECT_COLUMN | state | (self.col as u8 & COLUMN_MASK),
            STROBE_ROW | (self.row as u8 & ROW_MASK),
        ]
    }
}
