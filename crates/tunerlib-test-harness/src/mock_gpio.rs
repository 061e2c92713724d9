//! Simulated reset and interrupt pins.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::broadcast;
use tunerlib_core::{Edge, InterruptPin, ResetPin, Result};

/// A [`ResetPin`] that records every level transition.
#[derive(Clone, Default)]
pub struct MockResetPin {
    transitions: Arc<Mutex<Vec<bool>>>,
}

impl MockResetPin {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pin levels in the order they were driven, `true` for high.
    pub fn transitions(&self) -> Vec<bool> {
        self.transitions.lock().unwrap().clone()
    }
}

#[async_trait]
impl ResetPin for MockResetPin {
    async fn set_high(&mut self) -> Result<()> {
        self.transitions.lock().unwrap().push(true);
        Ok(())
    }

    async fn set_low(&mut self) -> Result<()> {
        self.transitions.lock().unwrap().push(false);
        Ok(())
    }
}

/// An [`InterruptPin`] whose edges are fired manually by the test.
pub struct MockInterruptPin {
    edge_tx: broadcast::Sender<Edge>,
}

impl MockInterruptPin {
    pub fn new() -> Self {
        let (edge_tx, _) = broadcast::channel(16);
        MockInterruptPin { edge_tx }
    }

    /// Simulate the chip pulling the interrupt line low.
    pub fn fire_falling(&self) {
        let _ = self.edge_tx.send(Edge::Falling);
    }

    /// Simulate the interrupt line returning high.
    pub fn fire_rising(&self) {
        let _ = self.edge_tx.send(Edge::Rising);
    }
}

impl Default for MockInterruptPin {
    fn default() -> Self {
        Self::new()
    }
}

impl InterruptPin for MockInterruptPin {
    fn subscribe(&self) -> broadcast::Receiver<Edge> {
        self.edge_tx.subscribe()
    }
}
