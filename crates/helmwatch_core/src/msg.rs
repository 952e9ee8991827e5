use std::path::PathBuf;

use crate::{
    DeleteOutcome, DownloadOutcome, HistoryEntry, RequestId, SessionId, StatusSnapshot,
    UploadOutcome,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// Session became interactive.
    Started,
    /// User picked a file (file picker or drop).
    FileSelected(PathBuf),
    /// User clicked Upload.
    UploadClicked,
    /// Engine finished the upload request.
    UploadFinished {
        session_id: SessionId,
        outcome: UploadOutcome,
    },
    /// One status poll answered.
    StatusReceived {
        session_id: SessionId,
        filename: String,
        snapshot: StatusSnapshot,
    },
    /// User asked for a fresh history list.
    HistoryRequested,
    /// Full history list from the server.
    HistoryLoaded(Vec<HistoryEntry>),
    /// User asked to replay a history entry.
    PlayClicked { name: String },
    /// Status of a history entry fetched for replay.
    ReplayFetched {
        request_id: RequestId,
        filename: String,
        snapshot: StatusSnapshot,
    },
    /// User asked to delete a history entry; needs confirmation.
    DeleteClicked { name: String },
    DeleteConfirmed,
    DeleteCancelled,
    /// Engine finished the delete request.
    DeleteFinished { name: String, outcome: DeleteOutcome },
    /// User clicked Download.
    DownloadClicked,
    DownloadFinished {
        filename: String,
        outcome: DownloadOutcome,
    },
    /// The view is going away.
    TornDown,
}
