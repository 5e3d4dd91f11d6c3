//! Paced emission of flip commands
//!
//! A dot's coil needs time to settle after a pulse. The scheduler remembers
//! when each dot was last flipped and holds back any command that would flip
//! the same dot again within the configured flip time. Held-back commands are
//! returned to the caller rather than waited for, so one emit pass only ever
//! spends time on bus transfers.

use alloc::vec;
use alloc::vec::Vec;

use crate::command::FlipCommand;
use crate::config::Dimensions;
use crate::error::{BusError, DriverError, Emission, Failure};
use crate::interface::BusTransport;
use crate::module_map::ModuleMap;

/// Monotonic millisecond time source
///
/// Wrapping is fine; intervals are computed with wrapping arithmetic.
/// Any `FnMut() -> u32` closure is a clock:
///
/// ```
/// use flipdot::Clock;
///
/// let mut ticks = 0u32;
/// let mut clock = move || {
///     ticks += 10;
///     ticks
/// };
/// assert_eq!(clock.now_ms(), 10);
/// assert_eq!(clock.now_ms(), 20);
/// ```
pub trait Clock {
    /// Milliseconds since an arbitrary epoch
    fn now_ms(&mut self) -> u32;
}

impl<F: FnMut() -> u32> Clock for F {
    fn now_ms(&mut self) -> u32 {
        self()
    }
}

/// Emits flip commands while enforcing the per-dot flip interval
#[derive(Clone, Debug)]
pub struct FlipScheduler {
    cols: usize,
    module_cols: usize,
    flip_time_ms: u32,
    /// Time of the last successful flip per dot, row-major
    last_flip: Vec<Option<u32>>,
}

impl FlipScheduler {
    /// Create a scheduler for a display split into modules `module_cols` wide
    pub fn new(dimensions: Dimensions, module_cols: usize, flip_time_ms: u32) -> Self {
        Self {
            cols: dimensions.cols as usize,
            module_cols,
            flip_time_ms,
            last_flip: vec![None; dimensions.dots()],
        }
    }

    /// Forget flips that are at least the flip time old
    ///
    /// Timestamps wrap every 2^32 ms; a stamp left in place that long would
    /// look recent again. Call this regularly with the current time.
    pub fn expire(&mut self, now_ms: u32) {
        let flip_time_ms = self.flip_time_ms;
        for slot in &mut self.last_flip {
            if slot.is_some_and(|at| now_ms.wrapping_sub(at) >= flip_time_ms) {
                *slot = None;
            }
        }
    }

    /// Whether the dot at `(row, col)` may be flipped at `now_ms`
    pub fn is_ready(&self, row: usize, col: usize, now_ms: u32) -> bool {
        match self.last_flip.get(row * self.cols + col).copied().flatten() {
            Some(at) => now_ms.wrapping_sub(at) >= self.flip_time_ms,
            None => true,
        }
    }

    /// Transmit `commands` in order
    ///
    /// Each command is routed through `modules` to its bus address; every
    /// module is resolved before anything is sent. Commands
    /// for dots flipped less than the flip time before `now_ms` are returned in
    /// [`Emission::deferred`]. A failed transfer does not stop the batch.
    ///
    /// # Errors
    ///
    /// - [`DriverError::Bus`] if any transfer failed; carries the failures and
    ///   what the pass still achieved
    /// - [`DriverError::Config`] if a command names a module the map lacks;
    ///   nothing was transmitted
    pub fn emit<B: BusTransport>(
        &mut self,
        commands: &[FlipCommand],
        modules: &ModuleMap,
        bus: &mut B,
        now_ms: u32,
    ) -> Result<Emission, DriverError<B::Error>> {
        let addresses = commands
            .iter()
            .map(|command| modules.resolve(command.module))
            .collect::<Result<Vec<u8>, _>>()?;

        let mut emission = Emission::default();
        let mut failures = Vec::new();

        for (command, address) in commands.iter().zip(addresses) {
            let col = command.display_col(self.module_cols);
            if !self.is_ready(command.row, col, now_ms) {
                emission.deferred.push(*command);
                continue;
            }

            match Self::transmit(bus, address, command) {
                Ok(()) => {
                    log::trace!(
                        "flip ({}, {}) -> {:?} via {:#04x}",
                        command.row,
                        col,
                        command.state,
                        address
                    );
                    if let Some(slot) = self.last_flip.get_mut(command.row * self.cols + col) {
                        *slot = Some(now_ms);
                    }
                    emission.issued += 1;
                }
                Err(error) => failures.push(Failure {
                    command: *command,
                    error,
                }),
            }
        }

        if !emission.deferred.is_empty() {
            log::debug!("deferred {} flip(s) still settling", emission.deferred.len());
        }

        if failures.is_empty() {
            Ok(emission)
        } else {
            log::warn!(
                "{} of {} flip(s) failed",
                failures.len(),
                commands.len() - emission.deferred.len()
            );
            Err(DriverError::Bus { failures, emission })
        }
    }

    fn transmit<B: BusTransport>(
        bus: &mut B,
        address: u8,
        command: &FlipCommand,
    ) -> Result<(), BusError<B::Error>> {
        for byte in command.encode() {
            bus.transfer(address, byte)?;
        }
        Ok(())
    }
}
