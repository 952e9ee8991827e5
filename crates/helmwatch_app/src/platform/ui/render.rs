use std::fmt::Display;

use chrono::{DateTime, Local};
use helmwatch_core::{
    AppViewModel, GalleryView, HistoryRowView, HistoryView, ProgressView, ResultPanelView,
    HISTORY_PLACEHOLDER,
};
use helmwatch_engine::{ApiError, Endpoints};

use super::constants::PROGRESS_WIDTH;

/// Renders the whole screen as text lines. Names are only ever placed in
/// text or in URLs built by [`Endpoints`], never spliced into markup.
pub fn render(view: &AppViewModel, endpoints: &Endpoints) -> Vec<String> {
    let mut lines = Vec::new();

    lines.push("== Upload ==".to_string());
    lines.push(format!("  {}", view.upload.drop_zone_text));
    match &view.upload.progress {
        Some(progress) => lines.push(format!("  {}", format_progress(progress))),
        None if view.upload.upload_enabled => lines.push("  Ready to upload".to_string()),
        None => {}
    }

    if view.gallery.visible {
        render_gallery(&mut lines, &view.gallery, endpoints);
    }

    if let Some(result) = &view.result {
        render_result(&mut lines, result, endpoints);
    }

    lines.push("== History ==".to_string());
    match &view.history {
        HistoryView::Loading => lines.push("  Loading...".to_string()),
        HistoryView::Empty => lines.push(format!("  {HISTORY_PLACEHOLDER}")),
        HistoryView::Entries(rows) => {
            lines.extend(
                rows.iter()
                    .enumerate()
                    .map(|(index, row)| format_history_row(index + 1, row)),
            );
        }
    }

    if let Some(name) = &view.confirm_delete {
        lines.push(format!(
            "Are you sure you want to delete the recorded session {name}? [y/N]"
        ));
    }

    lines
}

fn render_gallery(lines: &mut Vec<String>, gallery: &GalleryView, endpoints: &Endpoints) {
    lines.push(format!("== Violators ({}) ==", gallery.items.len()));
    for item in &gallery.items {
        lines.push(format!(
            "  [{}] {}",
            item.index + 1,
            asset_link(endpoints.crop_asset(&item.image_ref), &item.image_ref)
        ));
    }
}

fn render_result(lines: &mut Vec<String>, result: &ResultPanelView, endpoints: &Endpoints) {
    lines.push(format!("== Result: {} ==", result.filename));
    lines.push(format!(
        "  Violators: {}   Helmets: {}",
        result.violators, result.helmets
    ));
    lines.push(format!(
        "  Video: {}",
        asset_link(endpoints.result_asset(&result.filename), &result.filename)
    ));
    if result.download_enabled {
        lines.push("  Type `download` to save the annotated video".to_string());
    }
}

/// Falls back to the bare name when it cannot be linked.
fn asset_link(url: Result<impl Display, ApiError>, name: &str) -> String {
    match url {
        Ok(url) => url.to_string(),
        Err(_) => format!("{name} (no link)"),
    }
}

fn format_progress(progress: &ProgressView) -> String {
    let percent = usize::from(progress.percent.min(100));
    let filled = percent * PROGRESS_WIDTH / 100;
    format!(
        "[{}{}] {:>3}%  {}",
        "#".repeat(filled),
        "-".repeat(PROGRESS_WIDTH - filled),
        percent,
        progress.status_text
    )
}

fn format_history_row(number: usize, row: &HistoryRowView) -> String {
    let marker = if row.is_current { '>' } else { ' ' };
    let when = row
        .recorded_at
        .and_then(format_timestamp)
        .map(|when| format!("  {when}"))
        .unwrap_or_default();
    format!(
        "{marker} #{number} {name}  violators {violators} | helmets {helmets}{when}",
        name = row.name,
        violators = row.violators,
        helmets = row.helmets,
    )
}

fn format_timestamp(secs: i64) -> Option<String> {
    DateTime::from_timestamp(secs, 0).map(|utc| {
        utc.with_timezone(&Local)
            .format("%Y-%m-%d %H:%M")
            .to_string()
    })
}
