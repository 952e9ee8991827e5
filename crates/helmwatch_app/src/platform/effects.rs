use std::sync::mpsc;
use std::thread;

use client_logging::{client_debug, client_error, client_info, client_warn};
use helmwatch_core::{
    DeleteOutcome, DownloadOutcome, Effect, HistoryEntry, JobStatus, Msg, StatusSnapshot,
    UploadOutcome,
};
use helmwatch_engine::{
    EngineConfig, EngineEvent, EngineEvents, EngineHandle, HistoryItem, JobState, StatusReply,
    UploadReply,
};

use super::Inbox;

pub struct EffectRunner {
    engine: EngineHandle,
}

impl EffectRunner {
    pub fn new(config: EngineConfig, inbox: mpsc::Sender<Inbox>) -> anyhow::Result<Self> {
        let (engine, events) = EngineHandle::new(config)?;
        spawn_event_loop(events, inbox);
        Ok(Self { engine })
    }

    /// Hands an engine-bound effect to the engine thread.
    pub fn execute(&self, effect: Effect) {
        match effect {
            Effect::Upload { session_id, path } => {
                client_info!("Upload session={} path={:?}", session_id, path);
                self.engine.upload(session_id, path);
            }
            Effect::StartWatch {
                session_id,
                filename,
            } => self.engine.watch(session_id, filename),
            Effect::StopWatch { session_id } => {
                client_debug!("StopWatch session={}", session_id);
                self.engine.unwatch(session_id);
            }
            Effect::LoadHistory => self.engine.load_history(),
            Effect::FetchResult {
                request_id,
                filename,
            } => self.engine.fetch_result(request_id, filename),
            Effect::DeleteHistory { name } => {
                client_info!("Deleting history entry {}", name);
                self.engine.delete_history(name);
            }
            Effect::Download { filename } => self.engine.download(filename),
            Effect::Notify { .. } | Effect::ReloadSession => {
                // handled by the session loop
            }
        }
    }

    pub fn shutdown(&self) {
        self.engine.shutdown();
    }
}

fn spawn_event_loop(events: EngineEvents, inbox: mpsc::Sender<Inbox>) {
    thread::spawn(move || {
        while let Some(event) = events.recv() {
            if let Some(msg) = map_event(event) {
                if inbox.send(Inbox::Msg(msg)).is_err() {
                    break;
                }
            }
        }
    });
}

fn map_event(event: EngineEvent) -> Option<Msg> {
    match event {
        EngineEvent::UploadCompleted { session_id, result } => {
            let outcome = match result {
                Ok(reply) => map_upload_reply(reply),
                Err(err) => {
                    client_error!("Upload failed: {}", err);
                    UploadOutcome::Failed {
                        message: err.to_string(),
                    }
                }
            };
            Some(Msg::UploadFinished {
                session_id,
                outcome,
            })
        }
        EngineEvent::StatusPolled {
            session_id,
            filename,
            result,
        } => {
            // Tick errors were logged by the watch; polling carries on.
            let snapshot = map_status(&filename, result.ok()?)?;
            Some(Msg::StatusReceived {
                session_id,
                filename,
                snapshot,
            })
        }
        EngineEvent::HistoryLoaded(result) => match result {
            Ok(items) => Some(Msg::HistoryLoaded(
                items.into_iter().map(map_history_item).collect(),
            )),
            Err(err) => {
                client_error!("Failed to load history: {}", err);
                None
            }
        },
        EngineEvent::ResultFetched {
            request_id,
            filename,
            result,
        } => match result {
            Ok(reply) => {
                let snapshot = map_status(&filename, reply)?;
                Some(Msg::ReplayFetched {
                    request_id,
                    filename,
                    snapshot,
                })
            }
            Err(err) => {
                client_error!("Failed to fetch result for {}: {}", filename, err);
                None
            }
        },
        EngineEvent::DeleteCompleted { name, result } => {
            let outcome = match result {
                Ok(reply) if reply.success => DeleteOutcome::Deleted,
                Ok(reply) => {
                    client_warn!("Server refused to delete {}: {:?}", name, reply.error);
                    DeleteOutcome::Refused {
                        reason: reply.error,
                    }
                }
                Err(err) => {
                    client_error!("Delete of {} failed: {}", name, err);
                    DeleteOutcome::Failed {
                        message: err.to_string(),
                    }
                }
            };
            Some(Msg::DeleteFinished { name, outcome })
        }
        EngineEvent::DownloadCompleted { filename, result } => {
            let outcome = match result {
                Ok(path) => {
                    client_info!("Downloaded {} to {:?}", filename, path);
                    DownloadOutcome::Saved { path }
                }
                Err(err) => {
                    client_error!("Download of {} failed: {}", filename, err);
                    DownloadOutcome::Failed {
                        message: err.to_string(),
                    }
                }
            };
            Some(Msg::DownloadFinished { filename, outcome })
        }
    }
}

fn map_upload_reply(reply: UploadReply) -> UploadOutcome {
    match reply {
        UploadReply {
            success: true,
            filename: Some(filename),
            ..
        } if !filename.is_empty() => UploadOutcome::Accepted { filename },
        UploadReply { success: true, .. } => UploadOutcome::Failed {
            message: "upload accepted without a filename".to_string(),
        },
        UploadReply { error, .. } => UploadOutcome::Rejected { reason: error },
    }
}

fn map_status(filename: &str, reply: StatusReply) -> Option<StatusSnapshot> {
    let status = match reply.status {
        JobState::Starting => JobStatus::Starting,
        JobState::Processing => JobStatus::Processing,
        JobState::Completed => JobStatus::Completed,
        JobState::Failed => JobStatus::Failed,
        JobState::Unknown => {
            client_warn!("Ignoring unrecognized status for {}", filename);
            return None;
        }
    };
    Some(StatusSnapshot {
        status,
        progress: reply.progress.and_then(clamp_percent),
        violator_images: reply.violator_images.unwrap_or_default(),
        violators: reply.violators,
        helmets: reply.helmets,
        error: reply.error,
    })
}

fn map_history_item(item: HistoryItem) -> HistoryEntry {
    HistoryEntry {
        name: item.name,
        violators: item.violators,
        helmets: item.helmets,
        recorded_at: item
            .timestamp
            .filter(|secs| secs.is_finite())
            .map(|secs| secs as i64),
    }
}

fn clamp_percent(value: f64) -> Option<u8> {
    value
        .is_finite()
        .then(|| value.clamp(0.0, 100.0).round() as u8)
}
