//! Cooperative control loop
//!
//! One thread runs everything. Each iteration advances the scroll animation,
//! pushes the pixel buffer to the modules and then hands a short, bounded
//! call to each collaborator (network upkeep, firmware updates, ambient
//! lighting). The loop only sleeps when nothing reported pending work.
//!
//! ## Example
//!
//! ```
//! use core::convert::Infallible;
//! use embedded_hal::delay::DelayNs;
//! use flipdot::{
//!     Bitmap, Builder, BusError, BusTransport, Collaborators, ControlLoop, Dimensions, FlipDot,
//!     LoopConfig, Rasterizer, ScrollEngine,
//! };
//!
//! # struct NullBus;
//! # impl BusTransport for NullBus {
//! #     type Error = Infallible;
//! #     fn transfer(&mut self, _address: u8, _byte: u8) -> Result<(), BusError<Infallible>> {
//! #         Ok(())
//! #     }
//! # }
//! # struct NoDelay;
//! # impl DelayNs for NoDelay { fn delay_ns(&mut self, _ns: u32) {} }
//! # struct Blank;
//! # impl Rasterizer for Blank {
//! #     fn rasterize(&self, text: &str) -> Bitmap { Bitmap::new(text.len(), 8) }
//! # }
//! let config = Builder::new()
//!     .dimensions(Dimensions::new(16, 84)?)
//!     .module_addresses(&[3, 2, 1])
//!     .flip_time_ms(550)
//!     .build()?;
//! let display = FlipDot::new(NullBus, || 0u32, config);
//! let scroll = ScrollEngine::new(Blank, 84);
//!
//! let mut control = ControlLoop::new(
//!     display,
//!     scroll,
//!     Collaborators::none(),
//!     LoopConfig::new("Hello", 4, 8),
//!     NoDelay,
//! );
//! let iteration = control.run_once()?;
//! assert!(iteration.restarted);
//! # Ok::<(), flipdot::ConfigError>(())
//! ```

use alloc::string::String;
use core::convert::Infallible;

use embedded_hal::delay::DelayNs;

use crate::display::FlipDot;
use crate::error::{ConfigError, DriverError};
use crate::interface::BusTransport;
use crate::scheduler::Clock;
use crate::text::{Rasterizer, ScrollEngine, ScrollState};

/// Default pause between idle iterations
pub const DEFAULT_IDLE_SLICE_MS: u32 = 10;

/// Network link state reported by [`NetworkMaintenance`]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ConnectionState {
    /// No link
    #[default]
    Disconnected,
    /// Association or address negotiation under way
    Connecting,
    /// Link up
    Connected,
}

/// Firmware update state reported by [`UpdateService`]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum UpdateStatus {
    /// Nothing to receive
    #[default]
    Idle,
    /// An update is being received; the loop must not sleep
    InProgress,
}

/// Keeps the network connection alive
///
/// `service` must return promptly.
pub trait NetworkMaintenance {
    /// Do one bounded slice of upkeep and report the link state
    fn service(&mut self) -> ConnectionState;
}

/// Handles over-the-air firmware updates
pub trait UpdateService {
    /// Handle pending update traffic, if any
    fn poll(&mut self) -> UpdateStatus;
}

/// Renders one frame of ambient lighting
pub trait AmbientAnimation {
    /// Draw the frame for `now_ms`
    fn render(&mut self, now_ms: u32);
}

impl NetworkMaintenance for () {
    fn service(&mut self) -> ConnectionState {
        ConnectionState::Disconnected
    }
}

impl UpdateService for () {
    fn poll(&mut self) -> UpdateStatus {
        UpdateStatus::Idle
    }
}

impl AmbientAnimation for () {
    fn render(&mut self, _now_ms: u32) {}
}

/// Tasks sharing the control loop with the display
#[derive(Debug, Default)]
pub struct Collaborators<N, U, A> {
    /// See [`NetworkMaintenance`]
    pub network: N,
    /// See [`UpdateService`]
    pub updates: U,
    /// See [`AmbientAnimation`]
    pub ambient: A,
}

impl Collaborators<(), (), ()> {
    /// No network, no updates, no ambient lighting
    pub fn none() -> Self {
        Self {
            network: (),
            updates: (),
            ambient: (),
        }
    }
}

/// What the loop shows and how long it idles
#[derive(Clone, Debug)]
pub struct LoopConfig {
    /// Text scrolled whenever the previous scroll ends
    pub message: String,
    /// First row of the scroll band
    pub viewport_row: usize,
    /// Height of the scroll band
    pub viewport_height: usize,
    /// Sleep when an iteration had nothing pending
    pub idle_slice_ms: u32,
}

impl LoopConfig {
    /// Scroll `message` through the given rows, idling for the default slice
    pub fn new(message: impl Into<String>, viewport_row: usize, viewport_height: usize) -> Self {
        Self {
            message: message.into(),
            viewport_row,
            viewport_height,
            idle_slice_ms: DEFAULT_IDLE_SLICE_MS,
        }
    }

    /// Set the idle sleep
    #[must_use]
    pub fn idle_slice_ms(mut self, value: u32) -> Self {
        self.idle_slice_ms = value;
        self
    }
}

/// Outcome of one loop iteration
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Iteration {
    /// A new scroll session was started instead of a tick
    pub restarted: bool,
    /// Scroll state after this iteration
    pub scroll: ScrollState,
    /// Flip commands sent
    pub issued: usize,
    /// Flip commands held back by pacing
    pub deferred: usize,
    /// Flip commands whose transfer failed
    pub failed: usize,
    /// Reported by the network collaborator
    pub connection: ConnectionState,
    /// Reported by the update collaborator
    pub update: UpdateStatus,
    /// The idle slice was slept
    pub slept: bool,
}

impl Iteration {
    /// Whether anything asked to be serviced again without delay
    pub fn has_pending_work(&self) -> bool {
        self.deferred > 0 || self.failed > 0 || self.update == UpdateStatus::InProgress
    }
}

/// Drives the display and its collaborators
pub struct ControlLoop<B, C, R, N, U, A, D>
where
    B: BusTransport,
    C: Clock,
{
    display: FlipDot<B, C>,
    scroll: ScrollEngine<R>,
    collaborators: Collaborators<N, U, A>,
    config: LoopConfig,
    delay: D,
    connection: ConnectionState,
    bus_failures: usize,
}

impl<B, C, R, N, U, A, D> ControlLoop<B, C, R, N, U, A, D>
where
    B: BusTransport,
    C: Clock,
    R: Rasterizer,
    N: NetworkMaintenance,
    U: UpdateService,
    A: AmbientAnimation,
    D: DelayNs,
{
    /// Assemble the loop; nothing runs until [`run_once`](Self::run_once)
    pub fn new(
        display: FlipDot<B, C>,
        scroll: ScrollEngine<R>,
        collaborators: Collaborators<N, U, A>,
        config: LoopConfig,
        delay: D,
    ) -> Self {
        Self {
            display,
            scroll,
            collaborators,
            config,
            delay,
            connection: ConnectionState::default(),
            bus_failures: 0,
        }
    }

    /// Run one iteration
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the display cannot route a flip command.
    /// Bus failures are not errors here; the dots are retried next time.
    pub fn run_once(&mut self) -> Result<Iteration, ConfigError> {
        let mut iteration = Iteration::default();

        if self.scroll.is_running() {
            iteration.scroll = self.scroll.tick(self.display.buffer_mut());
        } else {
            self.scroll.start(
                &self.config.message,
                self.config.viewport_row,
                self.config.viewport_height,
            );
            iteration.restarted = true;
            iteration.scroll = self.scroll.state();
        }

        match self.display.update() {
            Ok(emission) => {
                iteration.issued = emission.issued;
                iteration.deferred = emission.deferred.len();
            }
            Err(DriverError::Bus { failures, emission }) => {
                log::warn!("bus: {} flip(s) failed, retrying next pass", failures.len());
                iteration.issued = emission.issued;
                iteration.deferred = emission.deferred.len();
                iteration.failed = failures.len();
                self.bus_failures += failures.len();
            }
            Err(DriverError::Config(error)) => {
                log::error!("display configuration fault: {error}");
                return Err(error);
            }
        }

        let connection = self.collaborators.network.service();
        if connection != self.connection {
            log::info!("network {:?} -> {:?}", self.connection, connection);
            self.connection = connection;
        }
        iteration.connection = connection;

        iteration.update = self.collaborators.updates.poll();

        let now = self.display.now_ms();
        self.collaborators.ambient.render(now);

        if !iteration.has_pending_work() {
            self.delay.delay_ms(self.config.idle_slice_ms);
            iteration.slept = true;
        }

        Ok(iteration)
    }

    /// Run forever
    ///
    /// # Errors
    ///
    /// Only returns on a configuration fault; see [`run_once`](Self::run_once).
    pub fn run(&mut self) -> Result<Infallible, ConfigError> {
        loop {
            self.run_once()?;
        }
    }

    /// The display driver
    pub fn display(&self) -> &FlipDot<B, C> {
        &self.display
    }

    /// The display driver, mutably
    pub fn display_mut(&mut self) -> &mut FlipDot<B, C> {
        &mut self.display
    }

    /// The scroll engine
    pub fn scroll(&self) -> &ScrollEngine<R> {
        &self.scroll
    }

    /// The collaborators, mutably
    pub fn collaborators_mut(&mut self) -> &mut Collaborators<N, U, A> {
        &mut self.collaborators
    }

    /// Message used for the next scroll session
    pub fn set_message(&mut self, message: impl Into<String>) {
        self.config.message = message.into();
    }

    /// Last connection state seen from the network collaborator
    pub fn connection(&self) -> ConnectionState {
        self.connection
    }

    /// Failed flip transfers since construction
    pub fn bus_failures(&self) -> usize {
        self.bus_failures
    }

    /// Take the parts apart again
    pub fn release(self) -> (FlipDot<B, C>, Collaborators<N, U, A>, D) {
        (self.display, self.collaborators, self.delay)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::Bitmap;
    use crate::config::{Builder, Dimensions};
    use crate::dot::Dot;
    use crate::testing::{MockBus, MockDelay};
    use alloc::rc::Rc;
    use alloc::vec;
    use alloc::vec::Vec;
    use core::cell::Cell;

    /// One solid column per character, two rows tall
    struct Columns;

    impl Rasterizer for Columns {
        fn rasterize(&self, text: &str) -> Bitmap {
            let mut bitmap = Bitmap::new(text.chars().count(), 2);
            bitmap.clear(Dot::Set);
            bitmap
        }
    }

    struct TestClock(Rc<Cell<u32>>);

    impl Clock for TestClock {
        fn now_ms(&mut self) -> u32 {
            self.0.get()
        }
    }

    #[derive(Default)]
    struct ScriptedNetwork {
        states: Vec<ConnectionState>,
        calls: usize,
    }

    impl NetworkMaintenance for ScriptedNetwork {
        fn service(&mut self) -> ConnectionState {
            let state = self
                .states
                .get(self.calls)
                .or(self.states.last())
                .copied()
                .unwrap_or_default();
            self.calls += 1;
            state
        }
    }

    #[derive(Default)]
    struct Updates(UpdateStatus);

    impl UpdateService for Updates {
        fn poll(&mut self) -> UpdateStatus {
            self.0
        }
    }

    #[derive(Default)]
    struct Frames(Vec<u32>);

    impl AmbientAnimation for Frames {
        fn render(&mut self, now_ms: u32) {
            self.0.push(now_ms);
        }
    }

    type TestLoop = ControlLoop<MockBus, TestClock, Columns, ScriptedNetwork, Updates, Frames, MockDelay>;

    fn control(time: &Rc<Cell<u32>>, network: ScriptedNetwork) -> TestLoop {
        let config = Builder::new()
            .dimensions(Dimensions::new(2, 4).unwrap())
            .module_addresses(&[1, 2])
            .flip_time_ms(550)
            .build()
            .unwrap();
        let display = FlipDot::new(MockBus::new(), TestClock(Rc::clone(time)), config);
        ControlLoop::new(
            display,
            ScrollEngine::new(Columns, 4),
            Collaborators {
                network,
                updates: Updates::default(),
                ambient: Frames::default(),
            },
            LoopConfig::new("x", 0, 2),
            MockDelay::default(),
        )
    }

    fn slept_ms(control: TestLoop) -> u64 {
        let (_, _, delay) = control.release();
        delay.total_ns / 1_000_000
    }

    #[test]
    fn test_first_iteration_starts_scroll_and_idles() {
        let time = Rc::new(Cell::new(0));
        let mut control = control(&time, ScriptedNetwork::default());

        let iteration = control.run_once().unwrap();
        assert!(iteration.restarted);
        assert_eq!(iteration.scroll, ScrollState::Scrolling);
        assert_eq!(iteration.issued, 0);
        assert!(iteration.slept);
        assert_eq!(slept_ms(control), u64::from(DEFAULT_IDLE_SLICE_MS));
    }

    #[test]
    fn test_tick_pushes_frame_to_modules() {
        let time = Rc::new(Cell::new(0));
        let mut control = control(&time, ScriptedNetwork::default());
        control.run_once().unwrap();

        let iteration = control.run_once().unwrap();
        assert!(!iteration.restarted);
        assert_eq!(iteration.issued, 2);
        assert!(iteration.slept);
        assert_eq!(control.display().commanded(0, 3), Some(Dot::Set));
        assert_eq!(control.display().commanded(1, 3), Some(Dot::Set));
    }

    #[test]
    fn test_deferred_flips_skip_the_sleep() {
        let time = Rc::new(Cell::new(0));
        let mut control = control(&time, ScriptedNetwork::default());
        control.run_once().unwrap();
        control.run_once().unwrap();

        // Column 3 flipped at t=0 and must now flip back
        time.set(10);
        let iteration = control.run_once().unwrap();
        assert_eq!(iteration.issued, 2);
        assert_eq!(iteration.deferred, 2);
        assert!(!iteration.slept);
        assert!(iteration.has_pending_work());
    }

    #[test]
    fn test_bus_failures_are_counted_not_fatal() {
        let time = Rc::new(Cell::new(0));
        let mut control = control(&time, ScriptedNetwork::default());
        control.display_mut().bus_mut().fail_address(2);
        control.run_once().unwrap();

        let iteration = control.run_once().unwrap();
        assert_eq!(iteration.failed, 2);
        assert!(!iteration.slept);
        assert_eq!(control.bus_failures(), 2);

        control.display_mut().bus_mut().heal();
        time.set(1_000);
        let retry = control.run_once().unwrap();
        assert_eq!(retry.failed, 0);
        assert_eq!(control.bus_failures(), 2);
    }

    #[test]
    fn test_scroll_restarts_when_finished() {
        let time = Rc::new(Cell::new(0));
        let mut control = control(&time, ScriptedNetwork::default());

        let mut restarts = 0;
        for step in 0..12u32 {
            time.set(step * 1_000);
            if control.run_once().unwrap().restarted {
                restarts += 1;
            }
        }
        // One start plus five ticks per session ("x" is 1 column, viewport 4)
        assert_eq!(restarts, 2);
    }

    #[test]
    fn test_connection_changes_are_reported() {
        let time = Rc::new(Cell::new(0));
        let network = ScriptedNetwork {
            states: vec![
                ConnectionState::Connecting,
                ConnectionState::Connecting,
                ConnectionState::Connected,
            ],
            calls: 0,
        };
        let mut control = control(&time, network);

        assert_eq!(
            control.run_once().unwrap().connection,
            ConnectionState::Connecting
        );
        control.run_once().unwrap();
        assert_eq!(
            control.run_once().unwrap().connection,
            ConnectionState::Connected
        );
        assert_eq!(control.connection(), ConnectionState::Connected);
    }

    #[test]
    fn test_update_in_progress_keeps_loop_busy() {
        let time = Rc::new(Cell::new(0));
        let mut control = control(&time, ScriptedNetwork::default());
        control.collaborators_mut().updates = Updates(UpdateStatus::InProgress);

        let iteration = control.run_once().unwrap();
        assert_eq!(iteration.update, UpdateStatus::InProgress);
        assert!(!iteration.slept);
        assert_eq!(slept_ms(control), 0);
    }

    #[test]
    fn test_ambient_renders_every_iteration_with_clock() {
        let time = Rc::new(Cell::new(0));
        let mut control = control(&time, ScriptedNetwork::default());
        for now in [5, 17, 42] {
            time.set(now);
            control.run_once().unwrap();
        }
        let (_, collaborators, _) = control.release();
        assert_eq!(collaborators.ambient.0, vec![5, 17, 42]);
    }

    #[test]
    fn test_unit_collaborators_are_inert() {
        assert_eq!(().service(), ConnectionState::Disconnected);
        assert_eq!(UpdateService::poll(&mut ()), UpdateStatus::Idle);
        ().render(0);
    }
}
