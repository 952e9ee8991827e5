pub const DROP_ZONE_HINT: &str = "Drag and drop or click to select video";
pub const HISTORY_PLACEHOLDER: &str = "No records found";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppViewModel {
    pub upload: UploadPanelView,
    pub gallery: GalleryView,
    pub result: Option<ResultPanelView>,
    pub history: HistoryView,
    /// Name of the history entry awaiting delete confirmation.
    pub confirm_delete: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadPanelView {
    pub drop_zone_text: String,
    pub upload_enabled: bool,
    /// Present while an upload or analysis is running.
    pub progress: Option<ProgressView>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressView {
    pub percent: u8,
    pub status_text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GalleryView {
    pub visible: bool,
    pub items: Vec<GalleryItemView>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GalleryItemView {
    pub index: usize,
    pub image_ref: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultPanelView {
    pub filename: String,
    pub violators: u32,
    pub helmets: u32,
    pub download_enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum HistoryView {
    #[default]
    Loading,
    /// Rendered as [`HISTORY_PLACEHOLDER`].
    Empty,
    Entries(Vec<HistoryRowView>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryRowView {
    pub name: String,
    pub violators: u32,
    pub helmets: u32,
    pub recorded_at: Option<i64>,
    pub is_current: bool,
}
