//! Flip-Dot Display Driver
//!
//! A driver for segmented electromechanical flip-dot matrices whose modules
//! hang off a shared two-wire bus.
//!
//! ## Features
//!
//! - `no_std` compatible (needs `alloc`)
//! - `embedded-hal` v1.0 support
//! - `embedded-graphics` integration (with `graphics` feature)
//! - Bit-banged bus with bounded transfer time
//! - Diff-based updates: only dots that change are flipped
//! - Per-dot flip pacing that never blocks
//! - Tick-driven text scrolling and a cooperative control loop
//!
//! ## Usage
//!
//! ```rust,no_run
//! use core::convert::Infallible;
//! use embedded_hal::delay::DelayNs;
//! use embedded_hal::digital::{InputPin, OutputPin};
//! use flipdot::{AckCheck, BitBangBus, Builder, Dimensions, Dot, FlipDot};
//!
//! # struct MockPin;
//! # impl embedded_hal::digital::ErrorType for MockPin { type Error = Infallible; }
//! # impl OutputPin for MockPin {
//! #     fn set_low(&mut self) -> Result<(), Self::Error> { Ok(()) }
//! #     fn set_high(&mut self) -> Result<(), Self::Error> { Ok(()) }
//! # }
//! # impl InputPin for MockPin {
//! #     fn is_high(&mut self) -> Result<bool, Self::Error> { Ok(false) }
//! #     fn is_low(&mut self) -> Result<bool, Self::Error> { Ok(true) }
//! # }
//! # struct MockDelay;
//! # impl DelayNs for MockDelay { fn delay_ns(&mut self, _ns: u32) {} }
//! # fn millis() -> u32 { 0 }
//! # let (sda, scl, delay) = (MockPin, MockPin, MockDelay);
//! let mut bus = BitBangBus::new(sda, scl, delay);
//! bus.set_ack_check(AckCheck::Ignore);
//!
//! let dims = match Dimensions::new(16, 84) {
//!     Ok(dims) => dims,
//!     Err(_) => return,
//! };
//! let config = match Builder::new()
//!     .dimensions(dims)
//!     .module_addresses(&[3, 2, 1])
//!     .flip_time_ms(550)
//!     .build()
//! {
//!     Ok(config) => config,
//!     Err(_) => return,
//! };
//!
//! let mut display = FlipDot::new(bus, millis, config);
//! display.clear_display(Dot::Unset);
//! let _ = display.write_dot(0, 0, Dot::Set);
//! let _ = display.update();
//! ```

#![no_std]

extern crate alloc;

/// Bit-packed dot buffers
pub mod buffer;
/// Flip command definitions
pub mod command;
/// Display configuration types and builder
pub mod config;
/// Minimal flip commands from buffer changes
pub mod diff;
/// Core display operations
pub mod display;
/// Dot states
pub mod dot;
/// Error types for the driver
pub mod error;
/// Bus transport abstraction
pub mod interface;
/// Module index to bus address mapping
pub mod module_map;
/// Cooperative control loop
pub mod runtime;
/// Paced flip command emission
pub mod scheduler;
/// Text rendering and scrolling
pub mod text;

/// Graphics support via embedded-graphics (requires `graphics` feature)
#[cfg(feature = "graphics")]
pub mod graphics;

#[cfg(test)]
mod testing;

pub use buffer::{Bitmap, PixelBuffer};
pub use command::FlipCommand;
pub use config::{Builder, Config, Dimensions, MAX_COLS, MAX_MODULE_COLS, MAX_ROWS, MirrorState};
pub use diff::DiffEngine;
pub use display::FlipDot;
pub use dot::Dot;
pub use error::{BusError, ConfigError, DriverError, Emission, Failure, IndexError};
pub use interface::{AckCheck, BitBangBus, BusTransport, DEFAULT_HALF_PERIOD_NS};
pub use module_map::ModuleMap;
pub use runtime::{
    AmbientAnimation, Collaborators, ConnectionState, ControlLoop, DEFAULT_IDLE_SLICE_MS,
    Iteration, LoopConfig, NetworkMaintenance, UpdateService, UpdateStatus,
};
pub use scheduler::{Clock, FlipScheduler};
pub use text::{Rasterizer, ScrollEngine, ScrollState, draw_centered};

#[cfg(feature = "graphics")]
pub use graphics::MonoRasterizer;
