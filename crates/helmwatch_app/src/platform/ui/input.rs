use std::path::PathBuf;

use helmwatch_core::{AppViewModel, HistoryRowView, HistoryView, Msg};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Dispatch(Vec<Msg>),
    Show,
    Help,
    Quit,
}

/// Parses one line typed by the user against the current view.
///
/// While a delete confirmation is pending, `y`/`yes` confirms and any other
/// input cancels.
pub fn parse_command(line: &str, view: &AppViewModel) -> Result<Command, String> {
    let line = line.trim();
    if view.confirm_delete.is_some() {
        let confirmed = matches!(line.to_ascii_lowercase().as_str(), "y" | "yes");
        let msg = if confirmed {
            Msg::DeleteConfirmed
        } else {
            Msg::DeleteCancelled
        };
        return Ok(Command::Dispatch(vec![msg]));
    }

    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    match word.to_ascii_lowercase().as_str() {
        "" | "show" => Ok(Command::Show),
        "help" | "?" => Ok(Command::Help),
        "quit" | "exit" => Ok(Command::Quit),
        "select" | "open" => {
            let path = required(rest, "select needs a file path")?;
            Ok(Command::Dispatch(vec![Msg::FileSelected(PathBuf::from(path))]))
        }
        "upload" => {
            let mut msgs = Vec::with_capacity(2);
            if !rest.is_empty() {
                msgs.push(Msg::FileSelected(PathBuf::from(rest)));
            }
            msgs.push(Msg::UploadClicked);
            Ok(Command::Dispatch(msgs))
        }
        "play" => {
            let name = history_name(required(rest, "play needs a history entry")?, view)?;
            Ok(Command::Dispatch(vec![Msg::PlayClicked { name }]))
        }
        "delete" | "rm" => {
            let name = history_name(required(rest, "delete needs a history entry")?, view)?;
            Ok(Command::Dispatch(vec![Msg::DeleteClicked { name }]))
        }
        "download" => Ok(Command::Dispatch(vec![Msg::DownloadClicked])),
        "history" => Ok(Command::Dispatch(vec![Msg::HistoryRequested])),
        other => Err(format!("unknown command: {other}")),
    }
}

fn required<'a>(value: &'a str, message: &str) -> Result<&'a str, String> {
    if value.is_empty() {
        Err(message.to_string())
    } else {
        Ok(value)
    }
}

/// Resolves `#n` to the n-th history row (1-based); anything else is a name.
fn history_name(arg: &str, view: &AppViewModel) -> Result<String, String> {
    let Some(index) = arg.strip_prefix('#') else {
        return Ok(arg.to_string());
    };
    let index: usize = index
        .parse()
        .map_err(|_| format!("not a history number: {arg}"))?;
    let rows: &[HistoryRowView] = match &view.history {
        HistoryView::Entries(rows) => rows.as_slice(),
        HistoryView::Loading | HistoryView::Empty => &[],
    };
    index
        .checked_sub(1)
        .and_then(|i| rows.get(i))
        .map(|row| row.name.clone())
        .ok_or_else(|| format!("no history entry {arg}"))
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use helmwatch_core::{update, AppState, HistoryEntry, Msg};

    use super::{parse_command, Command};

    fn view_with_history() -> helmwatch_core::AppViewModel {
        let (state, _) = update(
            AppState::new(),
            Msg::HistoryLoaded(vec![
                HistoryEntry {
                    name: "vid_2.mp4".to_string(),
                    violators: 1,
                    helmets: 0,
                    recorded_at: None,
                },
                HistoryEntry {
                    name: "vid_1.mp4".to_string(),
                    violators: 0,
                    helmets: 3,
                    recorded_at: None,
                },
            ]),
        );
        state.view()
    }

    #[test]
    fn upload_with_path_selects_then_clicks() {
        let view = AppState::new().view();
        assert_eq!(
            parse_command("upload  /tmp/site cam.mp4 ", &view),
            Ok(Command::Dispatch(vec![
                Msg::FileSelected(PathBuf::from("/tmp/site cam.mp4")),
                Msg::UploadClicked,
            ]))
        );
        assert_eq!(
            parse_command("upload", &view),
            Ok(Command::Dispatch(vec![Msg::UploadClicked]))
        );
    }

    #[test]
    fn history_numbers_resolve_to_names() {
        let view = view_with_history();
        assert_eq!(
            parse_command("play #2", &view),
            Ok(Command::Dispatch(vec![Msg::PlayClicked {
                name: "vid_1.mp4".to_string()
            }]))
        );
        assert!(parse_command("delete #3", &view).is_err());
        assert!(parse_command("delete #0", &view).is_err());
        assert_eq!(
            parse_command("delete vid_9.mp4", &view),
            Ok(Command::Dispatch(vec![Msg::DeleteClicked {
                name: "vid_9.mp4".to_string()
            }]))
        );
    }

    #[test]
    fn pending_confirmation_takes_any_answer() {
        let (state, _) = update(
            AppState::new(),
            Msg::DeleteClicked {
                name: "vid_1.mp4".to_string(),
            },
        );
        let view = state.view();
        assert_eq!(
            parse_command("Y", &view),
            Ok(Command::Dispatch(vec![Msg::DeleteConfirmed]))
        );
        assert_eq!(
            parse_command("quit", &view),
            Ok(Command::Dispatch(vec![Msg::DeleteCancelled]))
        );
    }

    #[test]
    fn unknown_and_incomplete_commands_are_errors() {
        let view = AppState::new().view();
        assert!(parse_command("launch", &view).is_err());
        assert!(parse_command("select", &view).is_err());
        assert_eq!(parse_command("", &view), Ok(Command::Show));
        assert_eq!(parse_command("EXIT", &view), Ok(Command::Quit));
        assert_eq!(
            parse_command("history", &view),
            Ok(Command::Dispatch(vec![Msg::HistoryRequested]))
        );
    }
}
