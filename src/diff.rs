//! Diff engine: minimal flip commands from buffer changes
//!
//! The engine keeps a mirror of the state it last commanded every dot to and
//! emits a [`FlipCommand`] only for dots where the pixel buffer disagrees with
//! that mirror. The mirror is updated as commands are produced, before the bus
//! confirms them; commands that end up not being issued are handed back through
//! [`DiffEngine::revert`], which puts the dot's previous mirror entry back. A
//! dot still wanting the new state then mismatches again on the next pass,
//! and one the buffer has meanwhile returned to its old state is left alone.
//! No retry queue is kept.
//!
//! Traversal is row-major (row ascending, then column ascending).

use alloc::vec::Vec;

use crate::buffer::Bitmap;
use crate::command::FlipCommand;
use crate::config::{Dimensions, MirrorState};
use crate::dot::Dot;

/// Record of commanded dot states
#[derive(Clone, Debug)]
pub struct DiffEngine {
    module_cols: usize,
    /// Last commanded state per dot
    mirror: Bitmap,
    /// Whether the mirror entry can be trusted
    known: Bitmap,
    /// `known` as it was before the last reconcile
    known_before: Bitmap,
}

impl DiffEngine {
    /// Create an engine for a display split into modules `module_cols` wide
    pub fn new(dimensions: Dimensions, module_cols: usize, initial: MirrorState) -> Self {
        let (cols, rows) = (dimensions.cols as usize, dimensions.rows as usize);
        let mut known = Bitmap::new(cols, rows);
        if initial == MirrorState::Unset {
            known.clear(Dot::Set);
        }
        Self {
            module_cols,
            mirror: Bitmap::new(cols, rows),
            known_before: known.clone(),
            known,
        }
    }

    /// Commands that bring the physical display in line with `buffer`
    ///
    /// Returns nothing when the buffer already matches the mirror.
    pub fn reconcile(&mut self, buffer: &Bitmap) -> Vec<FlipCommand> {
        debug_assert_eq!(buffer.width(), self.mirror.width());
        debug_assert_eq!(buffer.height(), self.mirror.height());

        let rows = buffer.height().min(self.mirror.height());
        let cols = buffer.width().min(self.mirror.width());
        let mut commands = Vec::new();
        self.known_before.clone_from(&self.known);

        for row in 0..rows {
            for col in 0..cols {
                let wanted = buffer.dot(row, col);
                if self.known.dot(row, col).is_set() && self.mirror.dot(row, col) == wanted {
                    continue;
                }
                commands.push(FlipCommand::new(
                    col / self.module_cols,
                    row,
                    col % self.module_cols,
                    wanted,
                ));
                self.mirror.put(row, col, wanted);
                self.known.put(row, col, Dot::Set);
            }
        }

        commands
    }

    /// Undo the optimistic update for a command from the last reconcile
    /// that was not issued
    ///
    /// The dot goes back to the state it was commanded to before, or back to
    /// unknown if it had none.
    pub fn revert(&mut self, command: &FlipCommand) {
        let (row, col) = (command.row, command.display_col(self.module_cols));
        if row >= self.known.height() || col >= self.known.width() {
            return;
        }
        if self.known_before.dot(row, col).is_set() {
            self.mirror.put(row, col, command.state.inverted());
        } else {
            self.known.put(row, col, Dot::Unset);
        }
    }

    /// Forget every dot, so the next reconcile commands the whole display
    pub fn invalidate(&mut self) {
        self.known.clear(Dot::Unset);
    }

    /// Last commanded state of a dot, if known
    pub fn commanded(&self, row: usize, col: usize) -> Option<Dot> {
        match self.known.get(row, col) {
            Ok(Dot::Set) => Some(self.mirror.dot(row, col)),
            _ => None,
        }
    }
}
