//! reg-transport: register-level I/O for sensor devices
//!
//! This crate provides the trait and types for reading and writing 8-bit device
//! registers by address, with feature-gated backends. The default build enables a
//! `mock` backend so that binaries and tests can run on any host without hardware.

mod types;
pub use types::{BusInfo, RegAddr};

mod error;
pub use error::{Result, TransportError};

mod traits;
pub use traits::RegisterBus;

#[cfg(feature = "mock")]
mod mock;

#[cfg(feature = "mock")]
pub use mock::MockBus;
