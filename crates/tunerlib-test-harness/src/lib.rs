//! tunerlib-test-harness: Mock bus and GPIO for testing tuner drivers.
//!
//! [`MockBus`] simulates the chip's register file behind the
//! [`RegisterBus`](tunerlib_core::RegisterBus) trait, and
//! [`MockResetPin`] / [`MockInterruptPin`] stand in for the GPIO seams.
//! Tests plant register values, fire interrupt edges, and inspect the
//! writes the driver committed.

pub mod mock_bus;
pub mod mock_gpio;

pub use mock_bus::MockBus;
pub use mock_gpio::{MockInterruptPin, MockResetPin};
