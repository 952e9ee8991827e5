//! Helmwatch core: pure job-status state machine and view-model helpers.
mod effect;
mod gallery;
mod msg;
mod state;
mod update;
mod view_model;

pub use effect::Effect;
pub use gallery::Gallery;
pub use msg::Msg;
pub use state::{
    AppState, DeleteOutcome, DownloadOutcome, HistoryEntry, JobStatus, RequestId, SessionId,
    StatusSnapshot, UploadOutcome, UploadPhase,
};
pub use update::{
    update, DELETE_FAILED_NOTICE, SELECT_VIDEO_NOTICE, STARTING_TEXT, UPLOADING_TEXT,
    UPLOAD_ERROR_NOTICE,
};
pub use view_model::{
    AppViewModel, GalleryItemView, GalleryView, HistoryRowView, HistoryView, ProgressView,
    ResultPanelView, UploadPanelView, DROP_ZONE_HINT, HISTORY_PLACEHOLDER,
};
