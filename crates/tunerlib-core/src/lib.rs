//! tunerlib-core: Core traits, types, and error definitions for tunerlib.
//!
//! This crate defines the chip-agnostic abstractions that tunerlib drivers
//! implement. Applications depend on these types without pulling in a
//! specific chip driver or platform binding.
//!
//! # Key types
//!
//! - [`RegisterBus`] -- whole-bank two-wire register access
//! - [`ResetPin`] / [`InterruptPin`] -- GPIO seams for reset and interrupts
//! - [`RegisterBank`] -- shadow register file with buffer codecs
//! - [`TunerEvent`] -- asynchronous state change notifications
//! - [`StateHandle`] -- observable radio state with per-field events
//! - [`Error`] / [`Result`] -- error handling

pub mod bus;
pub mod error;
pub mod events;
pub mod gpio;
pub mod registers;
pub mod state;

// Re-export key types at crate root for ergonomic `use tunerlib_core::*`.
pub use bus::RegisterBus;
pub use error::{Error, Result};
pub use events::TunerEvent;
pub use gpio::{Edge, InterruptPin, ResetPin};
pub use registers::{DeviceInfo, RegisterBank, FREQUENCY_OFFSET, READ_BUFFER_LEN, WRITE_BUFFER_LEN};
pub use state::{spawn_state_task, RadioState, StateHandle, StateUpdate};
