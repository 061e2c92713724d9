//! A simulated register bus for driver tests.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tunerlib_core::registers::{READ_BUFFER_LEN, WRITE_BUFFER_LEN};
use tunerlib_core::{Error, RegisterBank, RegisterBus, Result};

struct Inner {
    registers: Mutex<RegisterBank>,
    writes: Mutex<Vec<RegisterBank>>,
    connected: AtomicBool,
}

/// A [`RegisterBus`] backed by an in-memory register file.
///
/// Tests hold a clone of the bus while the driver owns the original:
/// `set_register` plants status and RDS values the next driver read will
/// observe, and `writes` exposes every control-span write the driver
/// committed, newest last.
#[derive(Clone)]
pub struct MockBus {
    inner: Arc<Inner>,
}

impl MockBus {
    pub fn new() -> Self {
        MockBus {
            inner: Arc::new(Inner {
                registers: Mutex::new(RegisterBank::new()),
                writes: Mutex::new(Vec::new()),
                connected: AtomicBool::new(true),
            }),
        }
    }

    /// Set one register in the simulated chip.
    pub fn set_register(&self, register: usize, value: u16) {
        let mut bank = self.inner.registers.lock().unwrap();
        bank[register] = value;
    }

    /// Read one register from the simulated chip.
    pub fn register(&self, register: usize) -> u16 {
        self.inner.registers.lock().unwrap()[register]
    }

    /// Every write the driver has committed, oldest first. Each entry is
    /// the full register file as it stood after the write was applied.
    pub fn writes(&self) -> Vec<RegisterBank> {
        self.inner.writes.lock().unwrap().clone()
    }

    /// The register file after the most recent write, if any.
    pub fn last_write(&self) -> Option<RegisterBank> {
        self.inner.writes.lock().unwrap().last().copied()
    }

    pub fn write_count(&self) -> usize {
        self.inner.writes.lock().unwrap().len()
    }

    /// Simulate losing the bus: subsequent reads and writes fail with a
    /// transport error until reconnected.
    pub fn set_connected(&self, connected: bool) {
        self.inner.connected.store(connected, Ordering::SeqCst);
    }

    fn check_connected(&self) -> Result<()> {
        if self.inner.connected.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(Error::Transport("mock bus disconnected".into()))
        }
    }
}

impl Default for MockBus {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RegisterBus for MockBus {
    async fn read(&mut self, buf: &mut [u8]) -> Result<()> {
        self.check_connected()?;
        if buf.len() != READ_BUFFER_LEN {
            return Err(Error::Transport(format!(
                "read buffer must be {READ_BUFFER_LEN} bytes, got {}",
                buf.len()
            )));
        }
        let bank = self.inner.registers.lock().unwrap();
        buf.copy_from_slice(&bank.to_read_buffer());
        Ok(())
    }

    async fn write(&mut self, data: &[u8]) -> Result<()> {
        self.check_connected()?;
        let data: &[u8; WRITE_BUFFER_LEN] = data.try_into().map_err(|_| {
            Error::Transport(format!(
                "write buffer must be {WRITE_BUFFER_LEN} bytes, got {}",
                data.len()
            ))
        })?;
        let mut bank = self.inner.registers.lock().unwrap();
        bank.apply_write_buffer(data);
        self.inner.writes.lock().unwrap().push(*bank);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tunerlib_core::registers::reg;

    #[tokio::test]
    async fn read_reflects_planted_registers() {
        let bus = MockBus::new();
        bus.set_register(reg::STATUS_RSSI, 0x012A);

        let mut driver_side = bus.clone();
        let mut buf = [0u8; READ_BUFFER_LEN];
        driver_side.read(&mut buf).await.unwrap();

        let bank = RegisterBank::from_read_buffer(&buf);
        assert_eq!(bank[reg::STATUS_RSSI], 0x012A);
    }

    #[tokio::test]
    async fn write_is_applied_and_logged() {
        let bus = MockBus::new();
        bus.set_register(reg::STATUS_RSSI, 0x4000);

        let mut update = RegisterBank::new();
        update[reg::POWER_CFG] = 0x4001;
        let mut driver_side = bus.clone();
        driver_side.write(&update.to_write_buffer()).await.unwrap();

        // Control span updated, status untouched.
        assert_eq!(bus.register(reg::POWER_CFG), 0x4001);
        assert_eq!(bus.register(reg::STATUS_RSSI), 0x4000);
        let logged = bus.last_write().unwrap();
        assert_eq!(logged[reg::POWER_CFG], 0x4001);
        assert_eq!(bus.write_count(), 1);
    }

    #[tokio::test]
    async fn disconnected_bus_fails() {
        let bus = MockBus::new();
        bus.set_connected(false);
        let mut driver_side = bus.clone();
        let mut buf = [0u8; READ_BUFFER_LEN];
        assert!(matches!(
            driver_side.read(&mut buf).await,
            Err(Error::Transport(_))
        ));
        assert!(matches!(
            driver_side.write(&[0u8; WRITE_BUFFER_LEN]).await,
            Err(Error::Transport(_))
        ));
    }

    #[tokio::test]
    async fn wrong_buffer_sizes_are_rejected() {
        let mut bus = MockBus::new();
        let mut short = [0u8; 4];
        assert!(bus.read(&mut short).await.is_err());
        assert!(bus.write(&short).await.is_err());
    }
}
