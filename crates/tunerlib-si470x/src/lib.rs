//! tunerlib-si470x: Async driver for the Si4700/01/02/03 FM tuner family.
//!
//! The driver owns a [`RegisterBus`](tunerlib_core::RegisterBus) plus the
//! reset and interrupt GPIO seams, and exposes power control, seek/tune,
//! volume, and an observable radio state fed by a background status
//! poller and the chip's RDS interrupt stream.
//!
//! Construct a driver with [`Si470xBuilder`]:
//!
//! ```ignore
//! let tuner = Si470xBuilder::new()
//!     .reset_pin(reset)
//!     .interrupt_pin(irq)
//!     .build(bus)
//!     .await?;
//! tuner.power_on().await?;
//! let found = tuner.seek(SeekDirection::Up).await?;
//! ```

pub mod builder;
mod irq;
mod poller;
pub mod tuner;

pub use builder::{ChannelSpacing, Si470xBuilder};
pub use tuner::{SeekDirection, Si470x, MAX_VOLUME};
