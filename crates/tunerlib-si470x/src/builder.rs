//! Si470xBuilder -- fluent builder for constructing [`Si470x`] instances.
//!
//! Separates configuration from construction so that callers can wire up
//! GPIO pins and pick polling, timeout, and channel spacing values before
//! the driver takes ownership of the bus.
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//! use tunerlib_si470x::builder::Si470xBuilder;
//!
//! # async fn example() -> tunerlib_core::Result<()> {
//! let tuner = Si470xBuilder::new()
//!     .reset_pin(todo!())
//!     .interrupt_pin(todo!())
//!     .tune_timeout(Duration::from_millis(500))
//!     .build(todo!())
//!     .await?;
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;
use std::time::Duration;

use tunerlib_core::{Error, InterruptPin, RegisterBus, ResetPin, Result};

use crate::tuner::Si470x;

/// FM channel spacing, set per regulatory region.
///
/// 200 kHz is used in the Americas, 100 kHz in Europe and Japan, 50 kHz
/// in a few narrow-band regions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelSpacing {
    Khz200,
    Khz100,
    Khz50,
}

impl ChannelSpacing {
    /// Value for the SPACE field of SYS_CONFIG2, already shifted into
    /// place.
    pub(crate) fn field_bits(self) -> u16 {
        match self {
            ChannelSpacing::Khz200 => 0b00 << 4,
            ChannelSpacing::Khz100 => 0b01 << 4,
            ChannelSpacing::Khz50 => 0b10 << 4,
        }
    }
}

/// Fluent builder for [`Si470x`].
///
/// The reset and interrupt pins are required; everything else has
/// defaults:
///
/// ```ignore
/// let tuner = Si470xBuilder::new()
///     .reset_pin(reset)
///     .interrupt_pin(irq)
///     .build(bus)
///     .await?;
/// ```
pub struct Si470xBuilder {
    reset_pin: Option<Box<dyn ResetPin>>,
    interrupt_pin: Option<Arc<dyn InterruptPin>>,
    poll_interval: Duration,
    seek_timeout: Duration,
    tune_timeout: Duration,
    spacing: ChannelSpacing,
    event_capacity: usize,
}

impl Si470xBuilder {
    pub fn new() -> Self {
        Si470xBuilder {
            reset_pin: None,
            interrupt_pin: None,
            poll_interval: Duration::from_millis(100),
            seek_timeout: Duration::from_secs(5),
            tune_timeout: Duration::from_secs(1),
            spacing: ChannelSpacing::Khz100,
            event_capacity: 64,
        }
    }

    /// Set the output pin wired to the chip's reset line. Required.
    pub fn reset_pin(mut self, pin: Box<dyn ResetPin>) -> Self {
        self.reset_pin = Some(pin);
        self
    }

    /// Set the input pin wired to the chip's GPIO2 interrupt output.
    /// Required.
    pub fn interrupt_pin(mut self, pin: Arc<dyn InterruptPin>) -> Self {
        self.interrupt_pin = Some(pin);
        self
    }

    /// Set the signal strength polling interval (default: 100ms).
    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Set the deadline for a seek to find a station (default: 5s).
    ///
    /// A full-band seek takes several seconds; expiry resolves the seek
    /// to "not found" rather than an error.
    pub fn seek_timeout(mut self, timeout: Duration) -> Self {
        self.seek_timeout = timeout;
        self
    }

    /// Set the deadline for a direct tune to settle (default: 1s).
    pub fn tune_timeout(mut self, timeout: Duration) -> Self {
        self.tune_timeout = timeout;
        self
    }

    /// Set the FM channel spacing (default: 100 kHz).
    pub fn channel_spacing(mut self, spacing: ChannelSpacing) -> Self {
        self.spacing = spacing;
        self
    }

    /// Set the event broadcast channel capacity (default: 64).
    pub fn event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = capacity;
        self
    }

    /// Build an [`Si470x`] that owns the given bus.
    ///
    /// Spawns the driver's background tasks, so this must run inside a
    /// tokio runtime. No chip access happens until
    /// [`power_on`](Si470x::power_on).
    pub async fn build(self, bus: Box<dyn RegisterBus>) -> Result<Si470x> {
        let reset_pin = self
            .reset_pin
            .ok_or_else(|| Error::InvalidParameter("reset_pin is required".into()))?;
        let interrupt_pin = self
            .interrupt_pin
            .ok_or_else(|| Error::InvalidParameter("interrupt_pin is required".into()))?;
        if self.poll_interval.is_zero() {
            return Err(Error::InvalidParameter(
                "poll interval must be non-zero".into(),
            ));
        }
        if self.event_capacity == 0 {
            return Err(Error::InvalidParameter(
                "event capacity must be non-zero".into(),
            ));
        }

        Ok(Si470x::new(
            bus,
            reset_pin,
            interrupt_pin,
            self.poll_interval,
            self.seek_timeout,
            self.tune_timeout,
            self.spacing,
            self.event_capacity,
        ))
    }
}

impl Default for Si470xBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tunerlib_test_harness::{MockBus, MockInterruptPin, MockResetPin};

    #[tokio::test]
    async fn builder_defaults() {
        let tuner = Si470xBuilder::new()
            .reset_pin(Box::new(MockResetPin::new()))
            .interrupt_pin(Arc::new(MockInterruptPin::new()))
            .build(Box::new(MockBus::new()))
            .await
            .unwrap();

        // Nothing touches the bus before power_on.
        assert!(!tuner.state().powered_on);
    }

    #[tokio::test]
    async fn builder_requires_reset_pin() {
        let result = Si470xBuilder::new()
            .interrupt_pin(Arc::new(MockInterruptPin::new()))
            .build(Box::new(MockBus::new()))
            .await;
        assert!(matches!(result, Err(Error::InvalidParameter(_))));
    }

    #[tokio::test]
    async fn builder_requires_interrupt_pin() {
        let result = Si470xBuilder::new()
            .reset_pin(Box::new(MockResetPin::new()))
            .build(Box::new(MockBus::new()))
            .await;
        assert!(matches!(result, Err(Error::InvalidParameter(_))));
    }

    #[tokio::test]
    async fn builder_rejects_zero_poll_interval() {
        let result = Si470xBuilder::new()
            .reset_pin(Box::new(MockResetPin::new()))
            .interrupt_pin(Arc::new(MockInterruptPin::new()))
            .poll_interval(Duration::ZERO)
            .build(Box::new(MockBus::new()))
            .await;
        assert!(matches!(result, Err(Error::InvalidParameter(_))));
    }

    #[test]
    fn spacing_field_bits() {
        assert_eq!(ChannelSpacing::Khz200.field_bits(), 0x0000);
        assert_eq!(ChannelSpacing::Khz100.field_bits(), 0x0010);
        assert_eq!(ChannelSpacing::Khz50.field_bits(), 0x0020);
    }
}
