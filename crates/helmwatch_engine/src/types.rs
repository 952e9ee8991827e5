use std::fmt;
use std::path::PathBuf;

use serde::Deserialize;
use thiserror::Error;

pub type SessionId = u64;
pub type RequestId = u64;

/// Job state as reported by the status endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    Starting,
    Processing,
    Completed,
    Failed,
    /// Anything else the server sends, e.g. `not_found`.
    #[serde(other)]
    Unknown,
}

impl JobState {
    pub fn is_terminal(self) -> bool {
        matches!(self, JobState::Completed | JobState::Failed)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StatusReply {
    pub status: JobState,
    #[serde(default)]
    pub progress: Option<f64>,
    #[serde(default)]
    pub violator_images: Option<Vec<String>>,
    #[serde(default)]
    pub violators: Option<u32>,
    #[serde(default)]
    pub helmets: Option<u32>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UploadReply {
    pub success: bool,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DeleteReply {
    pub success: bool,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct HistoryItem {
    pub name: String,
    #[serde(default)]
    pub violators: u32,
    #[serde(default)]
    pub helmets: u32,
    /// Seconds since the Unix epoch.
    #[serde(default)]
    pub timestamp: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    UploadCompleted {
        session_id: SessionId,
        result: Result<UploadReply, ApiError>,
    },
    StatusPolled {
        session_id: SessionId,
        filename: String,
        result: Result<StatusReply, ApiError>,
    },
    HistoryLoaded(Result<Vec<HistoryItem>, ApiError>),
    ResultFetched {
        request_id: RequestId,
        filename: String,
        result: Result<StatusReply, ApiError>,
    },
    DeleteCompleted {
        name: String,
        result: Result<DeleteReply, ApiError>,
    },
    DownloadCompleted {
        filename: String,
        result: Result<PathBuf, ApiError>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message}")]
pub struct ApiError {
    pub kind: FailureKind,
    pub message: String,
}

impl ApiError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidInput,
    HttpStatus(u16),
    Timeout,
    Decode,
    Io,
    Network,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidInput => write!(f, "invalid input"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::Decode => write!(f, "malformed response"),
            FailureKind::Io => write!(f, "io error"),
            FailureKind::Network => write!(f, "network error"),
        }
    }
}
