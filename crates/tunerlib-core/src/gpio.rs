//! GPIO abstractions for the tuner's reset line and interrupt pin.
//!
//! The chip is reset by pulsing a dedicated output pin, and signals
//! seek/tune completion and RDS-group arrival by driving its GPIO2 pin
//! low. The driver consumes both through the traits here so that platform
//! bindings and the test harness plug in interchangeably.

use async_trait::async_trait;
use tokio::sync::broadcast;

use crate::error::Result;

/// A level transition observed on the interrupt pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    Rising,
    Falling,
}

/// Output pin wired to the chip's reset line.
#[async_trait]
pub trait ResetPin: Send + Sync {
    /// Drive the pin high (chip out of reset).
    async fn set_high(&mut self) -> Result<()>;

    /// Drive the pin low (chip held in reset).
    async fn set_low(&mut self) -> Result<()>;
}

/// Input pin wired to the chip's GPIO2 interrupt output.
///
/// Edges fan out to every subscriber; the driver subscribes once for the
/// long-lived RDS dispatch task and once per seek/tune operation. The
/// chip signals by pulling the line low, so [`Edge::Falling`] is the
/// interesting transition.
pub trait InterruptPin: Send + Sync {
    /// Subscribe to edge notifications.
    fn subscribe(&self) -> broadcast::Receiver<Edge>;
}
