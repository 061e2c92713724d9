//! Observable radio state.
//!
//! All state mutation is marshaled onto a single owner task: producers
//! (the driver, the status poller, the interrupt dispatcher) post
//! [`StateUpdate`]s through an unbounded channel, and the task applies
//! them in order, emitting one [`TunerEvent`] per field that actually
//! changed. Consumers get change notifications via the broadcast channel
//! and point-in-time reads via a [`tokio::sync::watch`] snapshot.

use tokio::sync::{broadcast, mpsc, watch};
use tracing::trace;

use crate::events::TunerEvent;

/// Snapshot of every observable field of the radio.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RadioState {
    /// Whether the chip is powered and tuned.
    pub powered_on: bool,
    /// Tuned frequency in tenths of a MHz.
    pub frequency_tenths: u16,
    /// Audio volume, 0-15.
    pub volume: u16,
    /// Last signal strength sample.
    pub rssi: u16,
    /// Whether a stereo pilot is detected.
    pub stereo: bool,
    /// RDS program identifier, 0 if none decoded yet.
    pub program_identifier: u16,
    /// RDS program type code, 0 if none decoded yet.
    pub program_type: u8,
    /// Confirmed RDS station name, empty if none decoded yet.
    pub program_name: String,
    /// Last complete RDS radio text, empty if none decoded yet.
    pub radio_text: String,
}

/// A single-field state mutation posted to the owner task.
#[derive(Debug, Clone)]
pub enum StateUpdate {
    Power(bool),
    /// New tuned frequency. Also clears every RDS-derived field, since
    /// decoded text belongs to the previous station.
    Frequency(u16),
    Volume(u16),
    Rssi(u16),
    Stereo(bool),
    ProgramIdentifier(u16),
    ProgramType(u8),
    ProgramName(String),
    RadioText(String),
    /// Decoded clock time in minutes after midnight. Pass-through: always
    /// emitted, never stored in the snapshot.
    ClockTime(i32),
}

/// Handle to the state owner task.
///
/// Cheap to clone; every producer in the driver holds one. Dropping all
/// handles stops the task.
#[derive(Debug, Clone)]
pub struct StateHandle {
    update_tx: mpsc::UnboundedSender<StateUpdate>,
    event_tx: broadcast::Sender<TunerEvent>,
    snapshot_rx: watch::Receiver<RadioState>,
}

impl StateHandle {
    /// Post an update for the owner task to apply.
    ///
    /// Never fails: if the task is gone the update is silently dropped,
    /// which only happens during shutdown.
    pub fn post(&self, update: StateUpdate) {
        let _ = self.update_tx.send(update);
    }

    /// Subscribe to change events.
    pub fn subscribe(&self) -> broadcast::Receiver<TunerEvent> {
        self.event_tx.subscribe()
    }

    /// Current state snapshot.
    pub fn snapshot(&self) -> RadioState {
        self.snapshot_rx.borrow().clone()
    }
}

/// Spawn the state owner task and return a handle to it.
///
/// `event_capacity` bounds the broadcast channel; slow subscribers that
/// fall more than that many events behind observe a lag error rather than
/// blocking producers.
pub fn spawn_state_task(event_capacity: usize) -> StateHandle {
    let (update_tx, mut update_rx) = mpsc::unbounded_channel::<StateUpdate>();
    let (event_tx, _) = broadcast::channel(event_capacity);
    let (snapshot_tx, snapshot_rx) = watch::channel(RadioState::default());

    let task_event_tx = event_tx.clone();
    tokio::spawn(async move {
        let mut state = RadioState::default();
        while let Some(update) = update_rx.recv().await {
            apply(&mut state, update, &task_event_tx);
            let _ = snapshot_tx.send(state.clone());
        }
        trace!("state task stopping, all handles dropped");
    });

    StateHandle {
        update_tx,
        event_tx,
        snapshot_rx,
    }
}

/// Apply one update, emitting an event only if the field value changed.
fn apply(state: &mut RadioState, update: StateUpdate, events: &broadcast::Sender<TunerEvent>) {
    let mut emit = |event: TunerEvent| {
        trace!(?event, "state change");
        let _ = events.send(event);
    };

    match update {
        StateUpdate::Power(on) => {
            if state.powered_on != on {
                state.powered_on = on;
                emit(TunerEvent::PowerChanged { on });
            }
        }
        StateUpdate::Frequency(tenths) => {
            if state.frequency_tenths != tenths {
                state.frequency_tenths = tenths;
                emit(TunerEvent::FrequencyChanged { tenths });
                // Everything RDS-derived described the old station.
                if state.program_identifier != 0 {
                    state.program_identifier = 0;
                    emit(TunerEvent::ProgramIdentifierChanged { pi: 0 });
                }
                if state.program_type != 0 {
                    state.program_type = 0;
                    emit(TunerEvent::ProgramTypeChanged { pty: 0 });
                }
                if !state.program_name.is_empty() {
                    state.program_name.clear();
                    emit(TunerEvent::ProgramNameChanged {
                        name: String::new(),
                    });
                }
                if !state.radio_text.is_empty() {
                    state.radio_text.clear();
                    emit(TunerEvent::RadioTextChanged {
                        text: String::new(),
                    });
                }
            }
        }
        StateUpdate::Volume(level) => {
            if state.volume != level {
                state.volume = level;
                emit(TunerEvent::VolumeChanged { level });
            }
        }
        StateUpdate::Rssi(rssi) => {
            if state.rssi != rssi {
                state.rssi = rssi;
                emit(TunerEvent::SignalStrength { rssi });
            }
        }
        StateUpdate::Stereo(stereo) => {
            if state.stereo != stereo {
                state.stereo = stereo;
                emit(TunerEvent::StereoChanged { stereo });
            }
        }
        StateUpdate::ProgramIdentifier(pi) => {
            if state.program_identifier != pi {
                state.program_identifier = pi;
                emit(TunerEvent::ProgramIdentifierChanged { pi });
            }
        }
        StateUpdate::ProgramType(pty) => {
            if state.program_type != pty {
                state.program_type = pty;
                emit(TunerEvent::ProgramTypeChanged { pty });
            }
        }
        StateUpdate::ProgramName(name) => {
            if state.program_name != name {
                state.program_name = name.clone();
                emit(TunerEvent::ProgramNameChanged { name });
            }
        }
        StateUpdate::RadioText(text) => {
            if state.radio_text != text {
                state.radio_text = text.clone();
                emit(TunerEvent::RadioTextChanged { text });
            }
        }
        StateUpdate::ClockTime(minutes_after_midnight) => {
            emit(TunerEvent::ClockTime {
                minutes_after_midnight,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::{timeout, Duration};

    async fn recv(rx: &mut broadcast::Receiver<TunerEvent>) -> TunerEvent {
        timeout(Duration::from_secs(1), rx.recv())
            .await
            .expect("timed out waiting for event")
            .expect("event channel closed")
    }

    async fn settle(handle: &StateHandle) {
        // The state task applies updates in order; posting a sentinel and
        // waiting for its event proves everything before it was applied.
        let mut rx = handle.subscribe();
        handle.post(StateUpdate::ClockTime(-1));
        loop {
            if let TunerEvent::ClockTime {
                minutes_after_midnight: -1,
            } = recv(&mut rx).await
            {
                break;
            }
        }
    }

    #[tokio::test]
    async fn repeated_update_emits_once() {
        let handle = spawn_state_task(16);
        let mut rx = handle.subscribe();

        handle.post(StateUpdate::Volume(7));
        handle.post(StateUpdate::Volume(7));
        handle.post(StateUpdate::Volume(9));

        assert!(matches!(
            recv(&mut rx).await,
            TunerEvent::VolumeChanged { level: 7 }
        ));
        assert!(matches!(
            recv(&mut rx).await,
            TunerEvent::VolumeChanged { level: 9 }
        ));
    }

    #[tokio::test]
    async fn snapshot_tracks_updates() {
        let handle = spawn_state_task(16);
        handle.post(StateUpdate::Power(true));
        handle.post(StateUpdate::Frequency(1013));
        handle.post(StateUpdate::Rssi(42));
        settle(&handle).await;

        let snap = handle.snapshot();
        assert!(snap.powered_on);
        assert_eq!(snap.frequency_tenths, 1013);
        assert_eq!(snap.rssi, 42);
    }

    #[tokio::test]
    async fn frequency_change_clears_rds_fields() {
        let handle = spawn_state_task(32);
        handle.post(StateUpdate::Frequency(1013));
        handle.post(StateUpdate::ProgramIdentifier(0x54A8));
        handle.post(StateUpdate::ProgramName("KEXP".into()));
        handle.post(StateUpdate::RadioText("now playing".into()));
        settle(&handle).await;

        let mut rx = handle.subscribe();
        handle.post(StateUpdate::Frequency(947));

        assert!(matches!(
            recv(&mut rx).await,
            TunerEvent::FrequencyChanged { tenths: 947 }
        ));
        assert!(matches!(
            recv(&mut rx).await,
            TunerEvent::ProgramIdentifierChanged { pi: 0 }
        ));
        match recv(&mut rx).await {
            TunerEvent::ProgramNameChanged { name } => assert!(name.is_empty()),
            other => panic!("unexpected event: {other:?}"),
        }
        match recv(&mut rx).await {
            TunerEvent::RadioTextChanged { text } => assert!(text.is_empty()),
            other => panic!("unexpected event: {other:?}"),
        }

        let snap = handle.snapshot();
        assert_eq!(snap.frequency_tenths, 947);
        assert_eq!(snap.program_identifier, 0);
        assert!(snap.program_name.is_empty());
        assert!(snap.radio_text.is_empty());
    }

    #[tokio::test]
    async fn same_frequency_leaves_rds_fields_alone() {
        let handle = spawn_state_task(32);
        handle.post(StateUpdate::Frequency(1013));
        handle.post(StateUpdate::ProgramName("KEXP".into()));
        handle.post(StateUpdate::Frequency(1013));
        settle(&handle).await;

        let snap = handle.snapshot();
        assert_eq!(snap.program_name, "KEXP");
    }

    #[tokio::test]
    async fn clock_time_is_pass_through() {
        let handle = spawn_state_task(16);
        let mut rx = handle.subscribe();

        handle.post(StateUpdate::ClockTime(810));
        handle.post(StateUpdate::ClockTime(810));

        // Repeats are not deduplicated.
        for _ in 0..2 {
            assert!(matches!(
                recv(&mut rx).await,
                TunerEvent::ClockTime {
                    minutes_after_midnight: 810
                }
            ));
        }
    }
}
