//! Helmwatch engine: REST client, status watches and effect execution.
mod api;
mod endpoints;
mod engine;
mod persist;
mod types;
mod watch;

pub use api::{ApiSettings, ChannelEventSink, EventSink, JobApi, ReqwestJobApi, UPLOAD_FIELD};
pub use endpoints::Endpoints;
pub use engine::{EngineConfig, EngineEvents, EngineHandle};
pub use persist::{ensure_output_dir, AtomicFileWriter, PersistError, StagedFile};
pub use types::{
    ApiError, DeleteReply, EngineEvent, FailureKind, HistoryItem, JobState, RequestId, SessionId,
    StatusReply, UploadReply,
};
pub use watch::{start_watch, StatusWatch};
