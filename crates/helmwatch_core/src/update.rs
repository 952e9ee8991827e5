use crate::{
    AppState, DeleteOutcome, DownloadOutcome, Effect, JobStatus, Msg, SessionId, StatusSnapshot,
    UploadOutcome,
};

pub const SELECT_VIDEO_NOTICE: &str = "Please select a video first!";
pub const UPLOAD_ERROR_NOTICE: &str = "An error occurred during upload.";
pub const DELETE_FAILED_NOTICE: &str = "Deletion failed!";
pub const UPLOADING_TEXT: &str = "Uploading video...";
pub const STARTING_TEXT: &str = "Initializing AI...";

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::Started => vec![Effect::LoadHistory],
        Msg::FileSelected(path) => {
            state.select_file(path);
            Vec::new()
        }
        Msg::UploadClicked => {
            let Some(path) = state.selected_file().map(ToOwned::to_owned) else {
                return (state, vec![notify(SELECT_VIDEO_NOTICE)]);
            };
            // A new upload supersedes whatever job view was running.
            let mut effects = Vec::with_capacity(2);
            if let Some(previous) = state.active_watch() {
                effects.push(Effect::StopWatch {
                    session_id: previous,
                });
            }
            let session_id = state.begin_upload();
            effects.push(Effect::Upload { session_id, path });
            effects
        }
        Msg::UploadFinished {
            session_id,
            outcome,
        } => {
            if !state.is_uploading(session_id) {
                return (state, Vec::new());
            }
            match outcome {
                UploadOutcome::Accepted { filename } => {
                    state.begin_processing(session_id, filename.clone());
                    vec![Effect::StartWatch {
                        session_id,
                        filename,
                    }]
                }
                UploadOutcome::Rejected { reason } => {
                    state.reset_upload();
                    vec![notify(format!(
                        "Upload failed: {}",
                        reason.as_deref().unwrap_or("Unknown error")
                    ))]
                }
                UploadOutcome::Failed { .. } => {
                    state.reset_upload();
                    vec![notify(UPLOAD_ERROR_NOTICE)]
                }
            }
        }
        Msg::StatusReceived {
            session_id,
            filename,
            snapshot,
        } => {
            if !state.is_watching(session_id, &filename) {
                return (state, Vec::new());
            }
            apply_status(&mut state, session_id, filename, snapshot)
        }
        Msg::HistoryRequested => vec![Effect::LoadHistory],
        Msg::HistoryLoaded(entries) => {
            state.replace_history(entries);
            Vec::new()
        }
        Msg::PlayClicked { name } => {
            let request_id = state.begin_replay();
            vec![Effect::FetchResult {
                request_id,
                filename: name,
            }]
        }
        Msg::ReplayFetched {
            request_id,
            filename,
            snapshot,
        } => {
            // A later play or upload supersedes this reply.
            if !state.finish_replay(request_id) || snapshot.status != JobStatus::Completed {
                return (state, Vec::new());
            }
            // The result panel and gallery now belong to the replayed job.
            let mut effects = Vec::new();
            if let Some(session_id) = state.active_watch() {
                effects.push(Effect::StopWatch { session_id });
                state.reset_upload();
            }
            state.show_result(filename, &snapshot);
            effects
        }
        Msg::DeleteClicked { name } => {
            state.request_delete(name);
            Vec::new()
        }
        Msg::DeleteConfirmed => match state.take_pending_delete() {
            Some(name) => vec![Effect::DeleteHistory { name }],
            None => Vec::new(),
        },
        Msg::DeleteCancelled => {
            state.take_pending_delete();
            Vec::new()
        }
        Msg::DeleteFinished { name, outcome } => match outcome {
            DeleteOutcome::Deleted => {
                if state.current_video_file() != Some(name.as_str()) {
                    return (state, vec![Effect::LoadHistory]);
                }
                // The reloaded session loads history itself.
                let mut effects = Vec::with_capacity(2);
                if let Some(session_id) = state.active_watch() {
                    effects.push(Effect::StopWatch { session_id });
                }
                effects.push(Effect::ReloadSession);
                effects
            }
            DeleteOutcome::Refused { reason } => vec![notify(format!(
                "Deletion failed: {}",
                reason.as_deref().unwrap_or("Unknown error")
            ))],
            DeleteOutcome::Failed { .. } => vec![notify(DELETE_FAILED_NOTICE)],
        },
        Msg::DownloadClicked => match state.current_video_file() {
            Some(filename) => vec![Effect::Download {
                filename: filename.to_string(),
            }],
            None => Vec::new(),
        },
        Msg::DownloadFinished { filename, outcome } => match outcome {
            DownloadOutcome::Saved { path } => {
                vec![notify(format!("Saved {} to {}", filename, path.display()))]
            }
            DownloadOutcome::Failed { message } => {
                vec![notify(format!("Download of {filename} failed: {message}"))]
            }
        },
        Msg::TornDown => match state.active_watch() {
            Some(session_id) => {
                state.reset_upload();
                vec![Effect::StopWatch { session_id }]
            }
            None => Vec::new(),
        },
    };

    (state, effects)
}

fn apply_status(
    state: &mut AppState,
    session_id: SessionId,
    filename: String,
    snapshot: StatusSnapshot,
) -> Vec<Effect> {
    match snapshot.status {
        JobStatus::Starting => {
            state.set_progress(snapshot.progress.unwrap_or(0), STARTING_TEXT.to_string());
            state.sync_gallery(&snapshot.violator_images);
            Vec::new()
        }
        JobStatus::Processing => {
            let percent = snapshot.progress.unwrap_or(0).min(100);
            state.set_progress(percent, format!("Analyzing: {percent}%"));
            state.sync_gallery(&snapshot.violator_images);
            Vec::new()
        }
        JobStatus::Completed => {
            state.reset_upload();
            state.show_result(filename, &snapshot);
            vec![Effect::StopWatch { session_id }, Effect::LoadHistory]
        }
        JobStatus::Failed => {
            state.reset_upload();
            vec![
                Effect::StopWatch { session_id },
                notify(format!(
                    "Processing failed: {}",
                    snapshot.error.as_deref().unwrap_or("Reason unknown")
                )),
            ]
        }
    }
}

fn notify(message: impl Into<String>) -> Effect {
    Effect::Notify {
        message: message.into(),
    }
}
