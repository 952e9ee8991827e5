use std::path::{Path, PathBuf};

use crate::view_model::{
    AppViewModel, GalleryItemView, GalleryView, HistoryRowView, HistoryView, ProgressView,
    ResultPanelView, UploadPanelView, DROP_ZONE_HINT,
};
use crate::Gallery;

/// Identifies one upload attempt and the status watch that follows it.
pub type SessionId = u64;

/// Identifies one history replay request.
pub type RequestId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStatus {
    Starting,
    Processing,
    Completed,
    Failed,
}

/// One status-poll response. Each snapshot fully replaces what was derived
/// from the previous one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusSnapshot {
    pub status: JobStatus,
    pub progress: Option<u8>,
    pub violator_images: Vec<String>,
    pub violators: Option<u32>,
    pub helmets: Option<u32>,
    pub error: Option<String>,
}

impl StatusSnapshot {
    pub fn new(status: JobStatus) -> Self {
        Self {
            status,
            progress: None,
            violator_images: Vec::new(),
            violators: None,
            helmets: None,
            error: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub name: String,
    pub violators: u32,
    pub helmets: u32,
    /// Seconds since the Unix epoch, when the server reports it.
    pub recorded_at: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    Accepted { filename: String },
    /// The server answered but refused the file.
    Rejected { reason: Option<String> },
    /// Transport or decoding failure.
    Failed { message: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    Refused { reason: Option<String> },
    Failed { message: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadOutcome {
    Saved { path: PathBuf },
    Failed { message: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum UploadPhase {
    #[default]
    Idle,
    Uploading {
        session_id: SessionId,
    },
    Processing {
        session_id: SessionId,
        filename: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ResultPanel {
    filename: String,
    violators: u32,
    helmets: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppState {
    selected_file: Option<PathBuf>,
    phase: UploadPhase,
    progress: u8,
    status_text: String,
    gallery: Gallery,
    result: Option<ResultPanel>,
    history: Option<Vec<HistoryEntry>>,
    pending_delete: Option<String>,
    last_session_id: SessionId,
    /// Only the latest replay request may fill the result panel.
    pending_replay: Option<RequestId>,
    last_request_id: RequestId,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fresh state for a reloaded session. Session ids keep counting so
    /// late events from the discarded session stay stale.
    pub fn reloaded(&self) -> Self {
        Self {
            last_session_id: self.last_session_id,
            last_request_id: self.last_request_id,
            dirty: true,
            ..Self::default()
        }
    }

    pub fn view(&self) -> AppViewModel {
        let drop_zone_text = match self.selected_file.as_deref().and_then(Path::file_name) {
            Some(name) => format!("Selected: {}", name.to_string_lossy()),
            None => DROP_ZONE_HINT.to_string(),
        };
        let progress = match self.phase {
            UploadPhase::Idle => None,
            UploadPhase::Uploading { .. } | UploadPhase::Processing { .. } => Some(ProgressView {
                percent: self.progress,
                status_text: self.status_text.clone(),
            }),
        };

        let history = match &self.history {
            None => HistoryView::Loading,
            Some(entries) if entries.is_empty() => HistoryView::Empty,
            Some(entries) => HistoryView::Entries(
                entries
                    .iter()
                    .map(|entry| HistoryRowView {
                        name: entry.name.clone(),
                        violators: entry.violators,
                        helmets: entry.helmets,
                        recorded_at: entry.recorded_at,
                        is_current: self.current_video_file() == Some(entry.name.as_str()),
                    })
                    .collect(),
            ),
        };

        AppViewModel {
            upload: UploadPanelView {
                drop_zone_text,
                upload_enabled: self.phase == UploadPhase::Idle,
                progress,
            },
            gallery: GalleryView {
                visible: !self.gallery.is_empty(),
                items: self
                    .gallery
                    .items()
                    .iter()
                    .enumerate()
                    .map(|(index, image_ref)| GalleryItemView {
                        index,
                        image_ref: image_ref.clone(),
                    })
                    .collect(),
            },
            result: self.result.as_ref().map(|panel| ResultPanelView {
                filename: panel.filename.clone(),
                violators: panel.violators,
                helmets: panel.helmets,
                download_enabled: true,
            }),
            history,
            confirm_delete: self.pending_delete.clone(),
        }
    }

    /// Returns whether the view changed since the last call, and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub fn phase(&self) -> &UploadPhase {
        &self.phase
    }

    pub fn selected_file(&self) -> Option<&Path> {
        self.selected_file.as_deref()
    }

    /// Name of the video shown in the result panel.
    pub fn current_video_file(&self) -> Option<&str> {
        self.result.as_ref().map(|panel| panel.filename.as_str())
    }

    /// Session whose status watch is currently running.
    pub fn active_watch(&self) -> Option<SessionId> {
        match self.phase {
            UploadPhase::Processing { session_id, .. } => Some(session_id),
            _ => None,
        }
    }

    pub fn gallery(&self) -> &Gallery {
        &self.gallery
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn is_uploading(&self, session_id: SessionId) -> bool {
        self.phase == UploadPhase::Uploading { session_id }
    }

    pub(crate) fn is_watching(&self, session_id: SessionId, filename: &str) -> bool {
        matches!(
            &self.phase,
            UploadPhase::Processing { session_id: active, filename: watched }
                if *active == session_id && watched == filename
        )
    }

    pub(crate) fn select_file(&mut self, path: PathBuf) {
        self.selected_file = Some(path);
        self.mark_dirty();
    }

    /// Allocates a fresh session and shows the upload progress view.
    pub(crate) fn begin_upload(&mut self) -> SessionId {
        self.last_session_id += 1;
        let session_id = self.last_session_id;
        self.pending_replay = None;
        self.phase = UploadPhase::Uploading { session_id };
        self.gallery.clear();
        self.set_progress(0, crate::UPLOADING_TEXT.to_string());
        session_id
    }

    /// Supersedes any replay still in flight.
    pub(crate) fn begin_replay(&mut self) -> RequestId {
        self.last_request_id += 1;
        self.pending_replay = Some(self.last_request_id);
        self.last_request_id
    }

    /// Consumes the pending replay if `request_id` is the latest one.
    pub(crate) fn finish_replay(&mut self, request_id: RequestId) -> bool {
        if self.pending_replay == Some(request_id) {
            self.pending_replay = None;
            true
        } else {
            false
        }
    }

    pub(crate) fn begin_processing(&mut self, session_id: SessionId, filename: String) {
        self.phase = UploadPhase::Processing {
            session_id,
            filename,
        };
        self.mark_dirty();
    }

    pub(crate) fn set_progress(&mut self, percent: u8, text: String) {
        self.progress = percent.min(100);
        self.status_text = text;
        self.mark_dirty();
    }

    pub(crate) fn sync_gallery(&mut self, images: &[String]) {
        if self.gallery.sync(images) > 0 {
            self.mark_dirty();
        }
    }

    /// Returns the upload view to its initial, selectable state.
    pub(crate) fn reset_upload(&mut self) {
        self.phase = UploadPhase::Idle;
        self.selected_file = None;
        self.progress = 0;
        self.status_text.clear();
        self.mark_dirty();
    }

    pub(crate) fn show_result(&mut self, filename: String, snapshot: &StatusSnapshot) {
        self.result = Some(ResultPanel {
            filename,
            violators: snapshot.violators.unwrap_or(0),
            helmets: snapshot.helmets.unwrap_or(0),
        });
        self.gallery.clear();
        self.gallery.sync(&snapshot.violator_images);
        self.mark_dirty();
    }

    pub(crate) fn replace_history(&mut self, entries: Vec<HistoryEntry>) {
        self.history = Some(entries);
        self.mark_dirty();
    }

    pub(crate) fn request_delete(&mut self, name: String) {
        self.pending_delete = Some(name);
        self.mark_dirty();
    }

    pub(crate) fn take_pending_delete(&mut self) -> Option<String> {
        let pending = self.pending_delete.take();
        if pending.is_some() {
            self.mark_dirty();
        }
        pending
    }
}
