use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use client_logging::{client_debug, client_info};

use crate::api::{ApiSettings, ChannelEventSink, EventSink, JobApi, ReqwestJobApi};
use crate::watch::{start_watch, StatusWatch};
use crate::{ApiError, EngineEvent, Endpoints, FailureKind, RequestId, SessionId};

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub endpoints: Endpoints,
    pub settings: ApiSettings,
    pub poll_interval: Duration,
    pub download_dir: PathBuf,
}

enum EngineCommand {
    Upload { session_id: SessionId, path: PathBuf },
    Watch { session_id: SessionId, filename: String },
    Unwatch { session_id: SessionId },
    LoadHistory,
    FetchResult {
        request_id: RequestId,
        filename: String,
    },
    DeleteHistory { name: String },
    Download { filename: String },
    Shutdown,
}

/// Sends work to the engine thread. Cheap to clone.
#[derive(Clone)]
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
}

/// Receiving side for everything the engine reports back.
pub struct EngineEvents {
    event_rx: mpsc::Receiver<EngineEvent>,
}

impl EngineHandle {
    pub fn new(config: EngineConfig) -> Result<(Self, EngineEvents), ApiError> {
        let api = ReqwestJobApi::new(config.endpoints, config.settings)?;
        Self::with_api(Arc::new(api), config.poll_interval, config.download_dir)
    }

    /// Starts the engine thread around any [`JobApi`] implementation.
    pub fn with_api(
        api: Arc<dyn JobApi>,
        poll_interval: Duration,
        download_dir: PathBuf,
    ) -> Result<(Self, EngineEvents), ApiError> {
        let runtime = tokio::runtime::Runtime::new()
            .map_err(|err| ApiError::new(FailureKind::Io, err.to_string()))?;
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        let sink: Arc<dyn EventSink> = Arc::new(ChannelEventSink::new(event_tx));

        thread::Builder::new()
            .name("helmwatch-engine".to_string())
            .spawn(move || {
                let mut watches: HashMap<SessionId, StatusWatch> = HashMap::new();
                while let Ok(command) = cmd_rx.recv() {
                    watches.retain(|_, watch| !watch.is_stopped());
                    match command {
                        EngineCommand::Watch {
                            session_id,
                            filename,
                        } => {
                            client_info!("Watching {} (session {})", filename, session_id);
                            let watch = start_watch(
                                runtime.handle(),
                                api.clone(),
                                session_id,
                                filename,
                                poll_interval,
                                sink.clone(),
                            );
                            watches.insert(session_id, watch);
                        }
                        EngineCommand::Unwatch { session_id } => {
                            if let Some(watch) = watches.remove(&session_id) {
                                watch.stop();
                            }
                        }
                        EngineCommand::Shutdown => break,
                        request => {
                            let api = api.clone();
                            let sink = sink.clone();
                            let download_dir = download_dir.clone();
                            runtime.spawn(async move {
                                handle_request(api.as_ref(), request, &download_dir, sink.as_ref())
                                    .await;
                            });
                        }
                    }
                }
                for (_, watch) in watches.drain() {
                    watch.stop();
                }
                runtime.shutdown_timeout(Duration::from_secs(1));
                client_debug!("Engine thread exited");
            })
            .map_err(|err| ApiError::new(FailureKind::Io, err.to_string()))?;

        Ok((Self { cmd_tx }, EngineEvents { event_rx }))
    }

    pub fn upload(&self, session_id: SessionId, path: PathBuf) {
        self.send(EngineCommand::Upload { session_id, path });
    }

    pub fn watch(&self, session_id: SessionId, filename: impl Into<String>) {
        self.send(EngineCommand::Watch {
            session_id,
            filename: filename.into(),
        });
    }

    pub fn unwatch(&self, session_id: SessionId) {
        self.send(EngineCommand::Unwatch { session_id });
    }

    pub fn load_history(&self) {
        self.send(EngineCommand::LoadHistory);
    }

    pub fn fetch_result(&self, request_id: RequestId, filename: impl Into<String>) {
        self.send(EngineCommand::FetchResult {
            request_id,
            filename: filename.into(),
        });
    }

    pub fn delete_history(&self, name: impl Into<String>) {
        self.send(EngineCommand::DeleteHistory { name: name.into() });
    }

    pub fn download(&self, filename: impl Into<String>) {
        self.send(EngineCommand::Download {
            filename: filename.into(),
        });
    }

    /// Stops every watch and the engine thread.
    pub fn shutdown(&self) {
        self.send(EngineCommand::Shutdown);
    }

    fn send(&self, command: EngineCommand) {
        let _ = self.cmd_tx.send(command);
    }
}

impl EngineEvents {
    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.try_recv().ok()
    }

    /// Blocks for the next event; `None` once the engine is gone.
    pub fn recv(&self) -> Option<EngineEvent> {
        self.event_rx.recv().ok()
    }

    /// Waits up to `timeout`; `None` on timeout or once the engine is gone.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<EngineEvent> {
        self.event_rx.recv_timeout(timeout).ok()
    }
}

async fn handle_request(
    api: &dyn JobApi,
    command: EngineCommand,
    download_dir: &Path,
    sink: &dyn EventSink,
) {
    let event = match command {
        EngineCommand::Upload { session_id, path } => EngineEvent::UploadCompleted {
            session_id,
            result: api.upload(&path).await,
        },
        EngineCommand::LoadHistory => EngineEvent::HistoryLoaded(api.history().await),
        EngineCommand::FetchResult {
            request_id,
            filename,
        } => {
            let result = api.status(&filename).await;
            EngineEvent::ResultFetched {
                request_id,
                filename,
                result,
            }
        }
        EngineCommand::DeleteHistory { name } => {
            let result = api.delete_history(&name).await;
            EngineEvent::DeleteCompleted { name, result }
        }
        EngineCommand::Download { filename } => {
            let result = api.download(&filename, download_dir).await;
            EngineEvent::DownloadCompleted { filename, result }
        }
        EngineCommand::Watch { .. } | EngineCommand::Unwatch { .. } | EngineCommand::Shutdown => {
            return;
        }
    };
    sink.emit(event);
}
