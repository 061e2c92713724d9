//! Si470x -- the driver for the Si4700/01/02/03 FM tuner family.
//!
//! This module ties the register bank codecs to a [`RegisterBus`] and the
//! GPIO seams to produce a working tuner driver. It owns the power
//! lifecycle, the seek/tune coordination against the interrupt line, and
//! the background tasks (status poller, interrupt dispatch, state owner).

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, Mutex};
use tokio::task::JoinHandle;
use tokio::time;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use tunerlib_core::registers::{
    channel, power_cfg, reg, sys_config1, sys_config2, sys_config3, READ_BUFFER_LEN,
};
use tunerlib_core::{
    DeviceInfo, Error, InterruptPin, RadioState, RegisterBank, RegisterBus, ResetPin, Result,
    StateHandle, StateUpdate, TunerEvent, FREQUENCY_OFFSET,
};
use tunerlib_rds::RdsDecoder;

use crate::builder::ChannelSpacing;
use crate::irq;
use crate::poller::Poller;

/// Highest audio volume level the chip supports.
pub const MAX_VOLUME: u16 = 15;

/// Volume written during power-up, loud enough to confirm audio works.
const INITIAL_VOLUME: u16 = 1;

/// Vendor magic for the crystal oscillator enable in TEST1.
const OSCILLATOR_ENABLE: u16 = 0x8100;

/// DMUTE | ENABLE, the powered-up baseline for POWER_CFG.
const POWERUP_CONFIG: u16 = 0x4001;

const RESET_PULSE: Duration = Duration::from_millis(1);
const OSCILLATOR_SETTLE: Duration = Duration::from_millis(500);
const CONFIG_SETTLE: Duration = Duration::from_millis(150);

/// Direction for a [`seek`](Si470x::seek).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeekDirection {
    Up,
    Down,
}

enum TuneCommand {
    Seek(SeekDirection),
    Tune(u16),
}

/// State shared between the driver handle and its background tasks.
pub(crate) struct Shared {
    bus: Mutex<Box<dyn RegisterBus>>,
    pub(crate) state: StateHandle,
    /// Live while the radio is powered and not mid-retune. Dropped before
    /// a seek/tune so stale groups from the old station are never decoded,
    /// and replaced with a fresh decoder afterwards.
    pub(crate) rds: Mutex<Option<RdsDecoder>>,
    tune_in_progress: AtomicBool,
}

impl Shared {
    pub(crate) async fn read_bank(&self) -> Result<RegisterBank> {
        let mut buf = [0u8; READ_BUFFER_LEN];
        let mut bus = self.bus.lock().await;
        bus.read(&mut buf).await?;
        Ok(RegisterBank::from_read_buffer(&buf))
    }

    pub(crate) async fn write_bank(&self, bank: &RegisterBank) -> Result<()> {
        let mut bus = self.bus.lock().await;
        bus.write(&bank.to_write_buffer()).await
    }
}

/// An Si4700-family FM tuner on a two-wire bus.
///
/// Constructed via [`Si470xBuilder`](crate::builder::Si470xBuilder). All
/// chip access goes through the [`RegisterBus`] provided at build time;
/// completion of seek and tune operations is signaled on the interrupt
/// pin.
pub struct Si470x {
    shared: Arc<Shared>,
    reset_pin: Mutex<Box<dyn ResetPin>>,
    irq_pin: Arc<dyn InterruptPin>,
    poller: Poller,
    irq_task: JoinHandle<()>,
    cancel: CancellationToken,
    seek_timeout: Duration,
    tune_timeout: Duration,
    spacing: ChannelSpacing,
    disposed: AtomicBool,
}

impl Drop for Si470x {
    fn drop(&mut self) {
        // Graceful: tasks exit at their next select iteration.
        self.cancel.cancel();
        // Safety net in case a task is stuck in a bus call that does not
        // respect the cancellation token.
        self.poller.abort();
        self.irq_task.abort();
    }
}

impl Si470x {
    /// Called by [`Si470xBuilder`](crate::builder::Si470xBuilder); use the
    /// builder API instead.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        bus: Box<dyn RegisterBus>,
        reset_pin: Box<dyn ResetPin>,
        irq_pin: Arc<dyn InterruptPin>,
        poll_interval: Duration,
        seek_timeout: Duration,
        tune_timeout: Duration,
        spacing: ChannelSpacing,
        event_capacity: usize,
    ) -> Self {
        let state = tunerlib_core::spawn_state_task(event_capacity);
        let shared = Arc::new(Shared {
            bus: Mutex::new(bus),
            state,
            rds: Mutex::new(None),
            tune_in_progress: AtomicBool::new(false),
        });
        let cancel = CancellationToken::new();
        let poller = Poller::spawn(shared.clone(), poll_interval, cancel.clone());
        let irq_task = irq::spawn(shared.clone(), irq_pin.subscribe(), cancel.clone());

        Si470x {
            shared,
            reset_pin: Mutex::new(reset_pin),
            irq_pin,
            poller,
            irq_task,
            cancel,
            seek_timeout,
            tune_timeout,
            spacing,
            disposed: AtomicBool::new(false),
        }
    }

    fn ensure_live(&self) -> Result<()> {
        if self.disposed.load(Ordering::SeqCst) {
            return Err(Error::Disposed);
        }
        Ok(())
    }

    /// Power the chip up and configure it for RDS reception.
    ///
    /// Pulses the reset line, enables the crystal oscillator, then writes
    /// the powered-up configuration: digital mute off, RDS decoding on,
    /// both interrupts routed to GPIO2, channel spacing per the builder,
    /// and volume at the lowest audible level. The chip comes up tuned to
    /// the bottom of the band.
    pub async fn power_on(&self) -> Result<()> {
        self.ensure_live()?;

        {
            let mut reset = self.reset_pin.lock().await;
            reset.set_low().await?;
            time::sleep(RESET_PULSE).await;
            reset.set_high().await?;
            time::sleep(RESET_PULSE).await;
        }

        let mut bank = self.shared.read_bank().await?;
        debug!(info = %bank.device_info(), "tuner out of reset");

        // Crystal oscillator on first; it needs time to settle before the
        // rest of the configuration takes.
        bank[reg::POWER_CFG] |= 1 << power_cfg::ENABLE;
        bank[reg::POWER_CFG] &= !(1 << power_cfg::DISABLE);
        bank[reg::TEST1] = OSCILLATOR_ENABLE;
        self.shared.write_bank(&bank).await?;
        time::sleep(OSCILLATOR_SETTLE).await;

        let mut bank = self.shared.read_bank().await?;
        bank[reg::POWER_CFG] = POWERUP_CONFIG;
        bank[reg::SYS_CONFIG1] |= 1 << sys_config1::RDS;
        bank[reg::SYS_CONFIG1] |= 1 << sys_config1::RDSIEN;
        bank[reg::SYS_CONFIG1] |= 1 << sys_config1::STCIEN;
        bank[reg::SYS_CONFIG1] |= sys_config1::GPIO2_INTERRUPT;
        bank[reg::SYS_CONFIG2] &= !sys_config2::VOLUME_MASK;
        bank[reg::SYS_CONFIG2] |= INITIAL_VOLUME;
        bank[reg::SYS_CONFIG2] &= !sys_config2::SPACE_MASK;
        bank[reg::SYS_CONFIG2] |= self.spacing.field_bits();
        self.shared.write_bank(&bank).await?;
        time::sleep(CONFIG_SETTLE).await;

        let bank = self.shared.read_bank().await?;
        *self.shared.rds.lock().await = Some(RdsDecoder::new());
        self.shared.state.post(StateUpdate::Volume(INITIAL_VOLUME));
        self.shared
            .state
            .post(StateUpdate::Frequency(bank.frequency_tenths()));
        self.shared.state.post(StateUpdate::Power(true));
        Ok(())
    }

    /// Shut the chip down.
    ///
    /// RDS decoding must be disabled in the same write that powers the
    /// chip down, per the programming guide.
    pub async fn power_off(&self) -> Result<()> {
        self.ensure_live()?;

        let mut bank = self.shared.read_bank().await?;
        bank[reg::POWER_CFG] &= !(1 << power_cfg::ENABLE);
        bank[reg::POWER_CFG] |= 1 << power_cfg::DISABLE;
        bank[reg::SYS_CONFIG1] &= !(1 << sys_config1::RDS);
        self.shared.write_bank(&bank).await?;

        *self.shared.rds.lock().await = None;
        self.shared.state.post(StateUpdate::Power(false));
        self.shared.state.post(StateUpdate::Frequency(0));
        self.shared.state.post(StateUpdate::Rssi(0));
        Ok(())
    }

    /// Seek to the next station in the given direction, wrapping at the
    /// band edge.
    ///
    /// Resolves to `Ok(true)` if a station was found, `Ok(false)` if the
    /// seek failed or the deadline expired. Either way the radio ends up
    /// tuned somewhere and the new frequency is published.
    pub async fn seek(&self, direction: SeekDirection) -> Result<bool> {
        self.seek_or_tune(TuneCommand::Seek(direction)).await
    }

    /// Tune directly to a frequency in tenths of a MHz (e.g. 1013 for
    /// 101.3 MHz).
    ///
    /// Resolves to `Ok(true)` once the chip reports the tune complete, or
    /// `Ok(false)` if the deadline expired.
    pub async fn tune(&self, frequency_tenths: u16) -> Result<bool> {
        self.seek_or_tune(TuneCommand::Tune(frequency_tenths)).await
    }

    async fn seek_or_tune(&self, command: TuneCommand) -> Result<bool> {
        self.ensure_live()?;
        if self
            .shared
            .tune_in_progress
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(Error::TuneInProgress);
        }

        // Keep the bus quiet while the chip hunts; it tunes faster.
        self.poller.pause();
        // Groups decoded mid-retune would belong to no station.
        *self.shared.rds.lock().await = None;

        // Subscribe before issuing the command so a fast completion edge
        // cannot slip past.
        let mut edges = self.irq_pin.subscribe();
        let result = self.run_seek_or_tune(&command, &mut edges).await;

        // The command bit must be cleared no matter how the operation
        // resolved, or the chip refuses the next seek/tune. The happy path
        // already did this with registers in hand.
        if self.shared.tune_in_progress.load(Ordering::SeqCst) {
            if let Err(e) = self.clear_command_bit(&command).await {
                warn!(error = %e, "failed to clear seek/tune command bit");
            }
            self.shared.tune_in_progress.store(false, Ordering::SeqCst);
        }

        *self.shared.rds.lock().await = Some(RdsDecoder::new());
        self.poller.resume();

        result
    }

    async fn run_seek_or_tune(
        &self,
        command: &TuneCommand,
        edges: &mut broadcast::Receiver<tunerlib_core::Edge>,
    ) -> Result<bool> {
        let mut bank = self.shared.read_bank().await?;
        let deadline = match command {
            TuneCommand::Seek(direction) => {
                begin_seek(&mut bank, *direction);
                self.seek_timeout
            }
            TuneCommand::Tune(tenths) => {
                begin_tune(&mut bank, *tenths);
                self.tune_timeout
            }
        };
        self.shared.write_bank(&bank).await?;

        let Some(mut bank) = self.await_completion(edges, deadline).await? else {
            debug!("seek/tune deadline expired");
            return Ok(false);
        };

        let found = !bank.seek_failed();
        self.shared
            .state
            .post(StateUpdate::Frequency(bank.frequency_tenths()));

        clear_command(&mut bank, command);
        self.shared.write_bank(&bank).await?;
        self.shared.tune_in_progress.store(false, Ordering::SeqCst);

        Ok(found)
    }

    /// Wait for the completion edge, re-reading the registers on every
    /// falling edge to tell completion apart from RDS traffic.
    ///
    /// Resolves to `Ok(None)` when the deadline expires.
    async fn await_completion(
        &self,
        edges: &mut broadcast::Receiver<tunerlib_core::Edge>,
        deadline: Duration,
    ) -> Result<Option<RegisterBank>> {
        use tunerlib_core::Edge;

        let completed = async {
            loop {
                match edges.recv().await {
                    Ok(Edge::Falling) => {
                        let bank = self.shared.read_bank().await?;
                        // Busy bit still set means this edge was RDS data.
                        if !bank.is_seek_tune_busy() {
                            return Ok(bank);
                        }
                    }
                    Ok(Edge::Rising) => {}
                    Err(broadcast::error::RecvError::Lagged(_)) => {}
                    Err(broadcast::error::RecvError::Closed) => {
                        return Err(Error::Transport("interrupt pin closed".into()));
                    }
                }
            }
        };
        match time::timeout(deadline, completed).await {
            Ok(Ok(bank)) => Ok(Some(bank)),
            Ok(Err(e)) => Err(e),
            Err(_) => Ok(None),
        }
    }

    async fn clear_command_bit(&self, command: &TuneCommand) -> Result<()> {
        let mut bank = self.shared.read_bank().await?;
        clear_command(&mut bank, command);
        self.shared.write_bank(&bank).await
    }

    /// Set the audio volume, 0 (mute) through [`MAX_VOLUME`].
    ///
    /// Values above `u16::MAX / 2` are treated as an underflowed decrement
    /// from 0 and clamp to 0; values above the maximum clamp to the
    /// maximum. Never an error.
    pub async fn set_volume(&self, volume: u16) -> Result<()> {
        self.ensure_live()?;

        let volume = if volume > u16::MAX / 2 {
            0
        } else {
            volume.min(MAX_VOLUME)
        };

        let mut bank = self.shared.read_bank().await?;
        bank[reg::SYS_CONFIG2] &= !sys_config2::VOLUME_MASK;
        bank[reg::SYS_CONFIG2] |= volume;
        self.shared.write_bank(&bank).await?;

        self.shared.state.post(StateUpdate::Volume(volume));
        Ok(())
    }

    /// Force mono reception, or return to automatic stereo blend.
    pub async fn set_mono(&self, mono: bool) -> Result<()> {
        self.ensure_live()?;

        let mut bank = self.shared.read_bank().await?;
        if mono {
            bank[reg::POWER_CFG] |= 1 << power_cfg::MONO;
        } else {
            bank[reg::POWER_CFG] &= !(1 << power_cfg::MONO);
        }
        self.shared.write_bank(&bank).await
    }

    /// Read the chip's identity registers.
    pub async fn get_info(&self) -> Result<DeviceInfo> {
        self.ensure_live()?;
        let bank = self.shared.read_bank().await?;
        Ok(bank.device_info())
    }

    /// Subscribe to state change events.
    pub fn subscribe(&self) -> broadcast::Receiver<TunerEvent> {
        self.shared.state.subscribe()
    }

    /// Current state snapshot.
    pub fn state(&self) -> RadioState {
        self.shared.state.snapshot()
    }

    /// Shut the driver down: background tasks stop and every subsequent
    /// operation fails with [`Error::Disposed`]. Does not power off the
    /// chip; call [`power_off`](Self::power_off) first if desired.
    pub fn shutdown(&self) {
        self.disposed.store(true, Ordering::SeqCst);
        self.cancel.cancel();
    }
}

fn begin_seek(bank: &mut RegisterBank, direction: SeekDirection) {
    bank[reg::POWER_CFG] |= 1 << power_cfg::SKMODE;
    match direction {
        SeekDirection::Up => bank[reg::POWER_CFG] |= 1 << power_cfg::SEEKUP,
        SeekDirection::Down => bank[reg::POWER_CFG] &= !(1 << power_cfg::SEEKUP),
    }
    bank[reg::POWER_CFG] |= 1 << power_cfg::SEEK;
    bank[reg::SYS_CONFIG3] |= 1 << sys_config3::SKSNR_MIN;
    bank[reg::SYS_CONFIG3] |= 1 << sys_config3::SKCNT_MIN;
}

fn begin_tune(bank: &mut RegisterBank, frequency_tenths: u16) {
    let channel_num = frequency_tenths.wrapping_sub(FREQUENCY_OFFSET) & channel::CHANNEL_MASK;
    bank[reg::CHANNEL] &= !channel::CHANNEL_MASK;
    bank[reg::CHANNEL] |= channel_num;
    bank[reg::CHANNEL] |= 1 << channel::TUNE;
}

fn clear_command(bank: &mut RegisterBank, command: &TuneCommand) {
    match command {
        TuneCommand::Seek(_) => bank[reg::POWER_CFG] &= !(1 << power_cfg::SEEK),
        TuneCommand::Tune(_) => bank[reg::CHANNEL] &= !(1 << channel::TUNE),
    }
}
