use std::path::PathBuf;

use crate::{RequestId, SessionId};

/// Side effects requested by [`crate::update`]; executed by the platform layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Submit `path` to the upload endpoint on behalf of `session_id`.
    Upload { session_id: SessionId, path: PathBuf },
    /// Begin polling the status endpoint for `filename`.
    StartWatch {
        session_id: SessionId,
        filename: String,
    },
    /// Cancel the watch started for `session_id`. Idempotent.
    StopWatch { session_id: SessionId },
    LoadHistory,
    /// Re-fetch the status of a finished job so it can be replayed.
    FetchResult {
        request_id: RequestId,
        filename: String,
    },
    DeleteHistory { name: String },
    Download { filename: String },
    /// Show a blocking notice to the user.
    Notify { message: String },
    /// Discard all session state and start over.
    ReloadSession,
}
