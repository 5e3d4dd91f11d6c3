//! Core display operations

use crate::buffer::Bitmap;
use crate::config::{Config, Dimensions};
use crate::diff::DiffEngine;
use crate::dot::Dot;
use crate::error::{DriverError, Emission, IndexError};
use crate::interface::BusTransport;
use crate::scheduler::{Clock, FlipScheduler};

type UpdateResult<B> = core::result::Result<Emission, DriverError<<B as BusTransport>::Error>>;

/// Flip-dot display driver
///
/// Owns the pixel buffer, the record of commanded dot states and the flip
/// pacing state. Drawing only touches the buffer; [`update`](Self::update)
/// pushes the difference to the modules.
///
/// ## Example
///
/// ```
/// use core::convert::Infallible;
/// use flipdot::{Builder, BusError, BusTransport, Dimensions, Dot, FlipDot};
///
/// struct NullBus;
/// impl BusTransport for NullBus {
///     type Error = Infallible;
///     fn transfer(&mut self, _address: u8, _byte: u8) -> Result<(), BusError<Infallible>> {
///         Ok(())
///     }
/// }
///
/// let config = Builder::new()
///     .dimensions(Dimensions::new(16, 84)?)
///     .module_addresses(&[3, 2, 1])
///     .flip_time_ms(550)
///     .build()?;
/// let mut display = FlipDot::new(NullBus, || 0u32, config);
///
/// display.write_dot(0, 0, Dot::Set)?;
/// if let Ok(emission) = display.update() {
///     assert_eq!(emission.issued, 1);
/// }
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct FlipDot<B, C>
where
    B: BusTransport,
    C: Clock,
{
    /// Bus to the modules
    bus: B,
    /// Time source for flip pacing
    clock: C,
    /// Display configuration
    config: Config,
    /// What should be displayed
    buffer: Bitmap,
    /// What the modules were last told
    diff: DiffEngine,
    /// When each dot last flipped
    scheduler: FlipScheduler,
}

impl<B, C> FlipDot<B, C>
where
    B: BusTransport,
    C: Clock,
{
    /// Create a new driver
    pub fn new(bus: B, clock: C, config: Config) -> Self {
        let dims = config.dimensions;
        let module_cols = config.module_cols() as usize;
        Self {
            bus,
            clock,
            buffer: Bitmap::new(dims.cols as usize, dims.rows as usize),
            diff: DiffEngine::new(dims, module_cols, config.initial_mirror),
            scheduler: FlipScheduler::new(dims, module_cols, config.flip_time_ms),
            config,
        }
    }

    /// Push buffer changes to the modules
    ///
    /// Dots whose flip was deferred or failed are re-sent by a later update.
    ///
    /// # Errors
    ///
    /// - [`DriverError::Bus`] if some transfers failed; the remaining commands
    ///   were still sent
    /// - [`DriverError::Config`] if the module map cannot resolve a module
    pub fn update(&mut self) -> UpdateResult<B> {
        let now = self.clock.now_ms();
        self.scheduler.expire(now);

        let commands = self.diff.reconcile(&self.buffer);
        if commands.is_empty() {
            return Ok(Emission::default());
        }

        let result = self
            .scheduler
            .emit(&commands, &self.config.modules, &mut self.bus, now);

        match &result {
            Ok(emission) => {
                for command in &emission.deferred {
                    self.diff.revert(command);
                }
            }
            Err(DriverError::Bus { failures, emission }) => {
                for failure in failures {
                    self.diff.revert(&failure.command);
                }
                for command in &emission.deferred {
                    self.diff.revert(command);
                }
            }
            Err(DriverError::Config(_)) => {
                for command in &commands {
                    self.diff.revert(command);
                }
            }
        }

        result
    }

    /// Set one dot in the buffer
    pub fn write_dot(&mut self, row: usize, col: usize, dot: Dot) -> Result<(), IndexError> {
        self.buffer.set(row, col, dot)
    }

    /// Set every dot in the buffer
    pub fn fill(&mut self, dot: Dot) {
        self.buffer.clear(dot);
    }

    /// Fill the buffer and flip every dot on the next update
    ///
    /// Unlike [`fill`](Self::fill), this also re-flips dots the driver believes
    /// are already in place, which recovers dots that were knocked out of
    /// position or never reached.
    pub fn clear_display(&mut self, dot: Dot) {
        self.buffer.clear(dot);
        self.diff.invalidate();
    }

    /// The pixel buffer
    pub fn buffer(&self) -> &Bitmap {
        &self.buffer
    }

    /// The pixel buffer, for drawing
    pub fn buffer_mut(&mut self) -> &mut Bitmap {
        &mut self.buffer
    }

    /// Last commanded state of a dot, if known
    pub fn commanded(&self, row: usize, col: usize) -> Option<Dot> {
        self.diff.commanded(row, col)
    }

    /// Read the driver's clock
    pub fn now_ms(&mut self) -> u32 {
        self.clock.now_ms()
    }

    /// Get display dimensions
    pub fn dimensions(&self) -> &Dimensions {
        &self.config.dimensions
    }

    /// Access the underlying configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Access the bus
    pub fn bus(&self) -> &B {
        &self.bus
    }

    /// Access the bus mutably
    pub fn bus_mut(&mut self) -> &mut B {
        &mut self.bus
    }

    /// Give back the bus and the clock
    pub fn release(self) -> (B, C) {
        (self.bus, self.clock)
    }
}
