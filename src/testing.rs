//! Test doubles shared by the unit tests

use alloc::vec::Vec;
use core::convert::Infallible;

use embedded_hal::delay::DelayNs;

use crate::error::BusError;
use crate::interface::BusTransport;

/// Records transfers; addresses marked failing answer with `NoAck`
#[derive(Debug, Default)]
pub(crate) struct MockBus {
    pub transfers: Vec<(u8, u8)>,
    failing: Vec<u8>,
}

impl MockBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_address(&mut self, address: u8) {
        self.failing.push(address);
    }

    pub fn heal(&mut self) {
        self.failing.clear();
    }
}

impl BusTransport for MockBus {
    type Error = Infallible;

    fn transfer(&mut self, address: u8, byte: u8) -> Result<(), BusError<Self::Error>> {
        if self.failing.contains(&address) {
            return Err(BusError::NoAck { address });
        }
        self.transfers.push((address, byte));
        Ok(())
    }
}

/// Accumulates requested delays
#[derive(Debug, Default)]
pub(crate) struct MockDelay {
    pub total_ns: u64,
}

impl DelayNs for MockDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.total_ns += u64::from(ns);
    }
}
