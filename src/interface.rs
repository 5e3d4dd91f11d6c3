//! Bus transport to the flip-dot modules
//!
//! This module provides the [`BusTransport`] trait and the [`BitBangBus`]
//! struct, which clocks bytes out over two GPIO lines in software.
//!
//! ## Hardware Requirements
//!
//! - **SDA**: data line, open-drain (output that can also be read back)
//! - **SCL**: clock line (output)
//! - A [`DelayNs`] implementation for the bit timing
//!
//! Both lines need pull-ups; driving a line high means releasing it.
//!
//! ## Frame
//!
//! Every transfer is one fixed frame:
//!
//! ```text
//! START | address b7..b0 | ACK | data b7..b0 | ACK/NACK | STOP
//! ```
//!
//! That is 18 clock pulses, each two half periods long, so a transfer takes a
//! bounded, known time and is never retried at this level.
//!
//! ## Example
//!
//! ```rust,no_run
//! use embedded_hal::delay::DelayNs;
//! use embedded_hal::digital::{InputPin, OutputPin};
//! use flipdot::{AckCheck, BitBangBus, BusTransport};
//! # use core::convert::Infallible;
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
//! let mut bus = BitBangBus::new(MockPin, MockPin, MockDelay);
//!
//! // Brose modules never drive ACK
//! bus.set_ack_check(AckCheck::Ignore);
//!
//! // Column select for module at address 0x01
//! let _ = bus.transfer(0x01, 0xC5);
//! ```

use core::fmt::Debug;
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};

use crate::error::BusError;

/// Trait for sending one addressed byte to one module
///
/// Calls are not reentrant; the caller serializes them.
pub trait BusTransport {
    /// Error type of the underlying lines
    ///
    /// Must implement [`Debug`] for error reporting.
    type Error: Debug;

    /// Send `byte` to the module at `address`
    ///
    /// # Errors
    ///
    /// Returns [`BusError::NoAck`] if the module did not acknowledge, or
    /// [`BusError::Pin`] if a line could not be driven or read.
    fn transfer(&mut self, address: u8, byte: u8) -> Result<(), BusError<Self::Error>>;
}

/// How acknowledgement bits are treated
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AckCheck {
    /// Fail with [`BusError::NoAck`] when the address byte is not acknowledged
    #[default]
    Address,
    /// Clock both acknowledgement slots but ignore what was sampled
    ///
    /// For modules that never pull the data line low.
    Ignore,
}

/// Default half bit period in nanoseconds (100 kHz bus clock)
pub const DEFAULT_HALF_PERIOD_NS: u32 = 5_000;

/// Software-clocked two-wire bus
///
/// ## Type Parameters
///
/// * `SDA` - Open-drain data line implementing [`OutputPin`] and [`InputPin`]
/// * `SCL` - Clock line implementing [`OutputPin`]
/// * `D` - Delay implementing [`DelayNs`]
pub struct BitBangBus<SDA, SCL, D> {
    /// Data line
    sda: SDA,
    /// Clock line
    scl: SCL,
    /// Bit timing
    delay: D,
    /// Half of one bit period in nanoseconds
    half_period_ns: u32,
    /// Acknowledgement policy
    ack_check: AckCheck,
}

impl<SDA, SCL, D, PinErr> BitBangBus<SDA, SCL, D>
where
    SDA: OutputPin<Error = PinErr> + InputPin<Error = PinErr>,
    SCL: OutputPin<Error = PinErr>,
    D: DelayNs,
{
    /// Create a new bus on the given lines
    pub fn new(sda: SDA, scl: SCL, delay: D) -> Self {
        Self {
            sda,
            scl,
            delay,
            half_period_ns: DEFAULT_HALF_PERIOD_NS,
            ack_check: AckCheck::default(),
        }
    }

    /// Set the half bit period in nanoseconds
    pub fn set_half_period_ns(&mut self, half_period_ns: u32) -> &mut Self {
        self.half_period_ns = half_period_ns;
        self
    }

    /// Get the half bit period in nanoseconds
    pub fn half_period_ns(&self) -> u32 {
        self.half_period_ns
    }

    /// Set the acknowledgement policy
    pub fn set_ack_check(&mut self, ack_check: AckCheck) -> &mut Self {
        self.ack_check = ack_check;
        self
    }

    /// Get the acknowledgement policy
    pub fn ack_check(&self) -> AckCheck {
        self.ack_check
    }

    /// Give back the lines and the delay
    pub fn release(self) -> (SDA, SCL, D) {
        (self.sda, self.scl, self.delay)
    }

    fn wait(&mut self) {
        self.delay.delay_ns(self.half_period_ns);
    }

    /// Clock out one frame; returns whether the address was acknowledged
    fn frame(&mut self, address: u8, byte: u8) -> Result<bool, PinErr> {
        self.start()?;
        self.write_byte(address)?;
        let acked = !self.read_bit()?;
        self.write_byte(byte)?;
        // Write-only modules may NACK the data byte
        let _ = self.read_bit()?;
        self.stop()?;
        Ok(acked)
    }

    fn start(&mut self) -> Result<(), PinErr> {
        self.sda.set_high()?;
        self.scl.set_high()?;
        self.wait();
        self.sda.set_low()?;
        self.wait();
        self.scl.set_low()?;
        self.wait();
        Ok(())
    }

    fn stop(&mut self) -> Result<(), PinErr> {
        self.sda.set_low()?;
        self.wait();
        self.scl.set_high()?;
        self.wait();
        self.sda.set_high()?;
        self.wait();
        Ok(())
    }

    fn write_byte(&mut self, byte: u8) -> Result<(), PinErr> {
        for bit in (0..8).rev() {
            if byte & (1 << bit) != 0 {
                self.sda.set_high()?;
            } else {
                self.sda.set_low()?;
            }
            self.wait();
            self.scl.set_high()?;
            self.wait();
            self.scl.set_low()?;
        }
        Ok(())
    }

    /// Release SDA, clock once and sample it
    fn read_bit(&mut self) -> Result<bool, PinErr> {
        self.sda.set_high()?;
        self.wait();
        self.scl.set_high()?;
        self.wait();
        let level = self.sda.is_high()?;
        self.scl.set_low()?;
        Ok(level)
    }
}

impl<SDA, SCL, D, PinErr> BusTransport for BitBangBus<SDA, SCL, D>
where
    SDA: OutputPin<Error = PinErr> + InputPin<Error = PinErr>,
    SCL: OutputPin<Error = PinErr>,
    D: DelayNs,
    PinErr: Debug,
{
    type Error = PinErr;

    fn transfer(&mut self, address: u8, byte: u8) -> Result<(), BusError<Self::Error>> {
        let acked = self.frame(address, byte).map_err(BusError::Pin)?;
        if !acked && self.ack_check == AckCheck::Address {
            return Err(BusError::NoAck { address });
        }
        Ok(())
    }
}
