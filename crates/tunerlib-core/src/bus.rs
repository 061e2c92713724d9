//! Bus abstraction used by tuner drivers.
//!
//! The chip speaks a two-wire protocol with no register addressing on the
//! wire: reads always begin at the status register and wrap around, writes
//! always begin at the power configuration register. [`RegisterBus`]
//! captures exactly that contract so that drivers, simulations, and tests
//! all move whole snapshots. See
//! [`RegisterBank`](crate::registers::RegisterBank) for the buffer layouts.

use async_trait::async_trait;

use crate::error::Result;

/// Raw two-wire access to the tuner's register file.
///
/// Implementations are provided by platform I2C bindings and by
/// `tunerlib-test-harness` for tests. The driver owns the bus exclusively
/// and serializes all access, so implementations need not be re-entrant.
#[async_trait]
pub trait RegisterBus: Send + Sync {
    /// Fill `buf` with a register snapshot.
    ///
    /// The driver always passes a buffer of
    /// [`READ_BUFFER_LEN`](crate::registers::READ_BUFFER_LEN) bytes; the
    /// transaction starts at the status register and wraps to address zero,
    /// covering all sixteen registers as big-endian pairs.
    async fn read(&mut self, buf: &mut [u8]) -> Result<()>;

    /// Write the control span to the chip.
    ///
    /// The driver always passes
    /// [`WRITE_BUFFER_LEN`](crate::registers::WRITE_BUFFER_LEN) bytes
    /// covering the power configuration register through the second test
    /// register, in ascending address order as big-endian pairs.
    async fn write(&mut self, data: &[u8]) -> Result<()>;
}
