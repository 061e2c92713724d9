//! Interrupt edge dispatch.
//!
//! The chip shares one interrupt line between two events: an RDS group
//! arriving and a seek/tune completing. The dispatch task re-reads the
//! status register on every falling edge and only handles the RDS case;
//! completion edges are consumed by whichever seek or tune operation is
//! awaiting them.

use std::sync::Arc;

use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use tunerlib_core::{Edge, StateUpdate};

use crate::tuner::Shared;

pub(crate) fn spawn(
    shared: Arc<Shared>,
    mut edges: broadcast::Receiver<Edge>,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                edge = edges.recv() => match edge {
                    Ok(Edge::Falling) => handle_falling_edge(&shared).await,
                    Ok(Edge::Rising) => {}
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(skipped, "interrupt edges dropped");
                    }
                    Err(RecvError::Closed) => break,
                },
            }
        }
        debug!("interrupt dispatch stopped");
    })
}

async fn handle_falling_edge(shared: &Shared) {
    let bank = match shared.read_bank().await {
        Ok(bank) => bank,
        Err(e) => {
            warn!(error = %e, "status read after interrupt failed");
            return;
        }
    };
    if !bank.is_rds_ready() {
        // Seek/tune completion; the awaiting operation does its own read.
        return;
    }

    let decoded = {
        let mut guard = shared.rds.lock().await;
        let Some(decoder) = guard.as_mut() else {
            // No decoder while a seek/tune is rewiring the frequency.
            return;
        };
        let (a, b, c, d) = bank.rds_blocks();
        decoder.process_group(a, b, c, d);
        Decoded {
            pi: decoder.program_identifier(),
            pty: decoder.program_type(),
            text: decoder.take_text_updated().then(|| {
                (
                    decoder.program_name().to_string(),
                    decoder.radio_text().to_string(),
                )
            }),
            clock: if decoder.take_time_updated() {
                decoder.clock_minutes()
            } else {
                None
            },
        }
    };

    shared.state.post(StateUpdate::ProgramIdentifier(decoded.pi));
    shared.state.post(StateUpdate::ProgramType(decoded.pty));
    if let Some((name, text)) = decoded.text {
        shared.state.post(StateUpdate::ProgramName(name));
        shared.state.post(StateUpdate::RadioText(text));
    }
    if let Some(minutes) = decoded.clock {
        shared.state.post(StateUpdate::ClockTime(minutes));
    }
    // An RDS-capable signal also carries fresh quality bits.
    shared.state.post(StateUpdate::Stereo(bank.is_stereo()));
    shared.state.post(StateUpdate::Rssi(bank.rssi()));
}

struct Decoded {
    pi: u16,
    pty: u8,
    text: Option<(String, String)>,
    clock: Option<i32>,
}
