//! Cancellable status polling for one uploaded job.
//!
//! A watch issues one status request per interval on a fixed wall-clock
//! cadence. Requests are not serialized: a slow response may overlap the next
//! tick. Failed ticks are reported and polling carries on; a terminal reply
//! ends the watch.

use std::sync::Arc;
use std::time::Duration;

use client_logging::{client_debug, client_warn};
use tokio::runtime::Handle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::api::{EventSink, JobApi};
use crate::{EngineEvent, SessionId};

/// Handle to a running watch. Dropping it stops the watch.
#[derive(Debug)]
pub struct StatusWatch {
    token: CancellationToken,
}

impl StatusWatch {
    /// Stops polling. Requests already in flight are discarded. Idempotent.
    pub fn stop(&self) {
        self.token.cancel();
    }

    pub fn is_stopped(&self) -> bool {
        self.token.is_cancelled()
    }
}

impl Drop for StatusWatch {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

/// Starts polling `filename` on `runtime`, first request one `period` from now.
pub fn start_watch(
    runtime: &Handle,
    api: Arc<dyn JobApi>,
    session_id: SessionId,
    filename: String,
    period: Duration,
    sink: Arc<dyn EventSink>,
) -> StatusWatch {
    let token = CancellationToken::new();
    let loop_token = token.clone();
    let tick_runtime = runtime.clone();

    runtime.spawn(async move {
        let mut ticks = interval_at(Instant::now() + period, period);
        ticks.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            tokio::select! {
                biased;
                _ = loop_token.cancelled() => break,
                _ = ticks.tick() => {
                    tick_runtime.spawn(poll_once(
                        api.clone(),
                        session_id,
                        filename.clone(),
                        loop_token.clone(),
                        sink.clone(),
                    ));
                }
            }
        }
        client_debug!("Status watch {} for {} stopped", session_id, filename);
    });

    StatusWatch { token }
}

async fn poll_once(
    api: Arc<dyn JobApi>,
    session_id: SessionId,
    filename: String,
    token: CancellationToken,
    sink: Arc<dyn EventSink>,
) {
    let result = tokio::select! {
        biased;
        _ = token.cancelled() => return,
        result = api.status(&filename) => result,
    };
    if token.is_cancelled() {
        return;
    }

    let terminal = match &result {
        Ok(reply) if reply.status.is_terminal() => {
            client_debug!("Job {} reached {:?}", filename, reply.status);
            true
        }
        Ok(_) => false,
        Err(err) => {
            client_warn!("Polling error for {}: {}", filename, err);
            false
        }
    };

    sink.emit(EngineEvent::StatusPolled {
        session_id,
        filename,
        result,
    });
    if terminal {
        token.cancel();
    }
}
