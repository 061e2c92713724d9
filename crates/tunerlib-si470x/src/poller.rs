//! Periodic signal quality sampling.
//!
//! While the radio is powered on, the poller reads the status register on
//! a fixed interval and publishes RSSI and stereo detection. Seek and tune
//! operations pause it so the bus stays quiet while the chip is hunting
//! for a station.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use tunerlib_core::StateUpdate;

use crate::tuner::Shared;

pub(crate) struct Poller {
    paused: Arc<AtomicBool>,
    task: JoinHandle<()>,
}

impl Poller {
    pub(crate) fn spawn(shared: Arc<Shared>, interval: Duration, cancel: CancellationToken) -> Self {
        let paused = Arc::new(AtomicBool::new(false));
        let flag = paused.clone();
        let task = tokio::spawn(async move {
            let mut ticker = time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = ticker.tick() => {
                        if flag.load(Ordering::SeqCst) || !shared.state.snapshot().powered_on {
                            continue;
                        }
                        match shared.read_bank().await {
                            Ok(bank) => {
                                shared.state.post(StateUpdate::Rssi(bank.rssi()));
                                shared.state.post(StateUpdate::Stereo(bank.is_stereo()));
                            }
                            Err(e) => warn!(error = %e, "signal poll failed"),
                        }
                    }
                }
            }
            debug!("status poller stopped");
        });
        Poller { paused, task }
    }

    pub(crate) fn pause(&self) {
        self.paused.store(true, Ordering::SeqCst);
    }

    pub(crate) fn resume(&self) {
        self.paused.store(false, Ordering::SeqCst);
    }

    pub(crate) fn abort(&self) {
        self.task.abort();
    }
}
