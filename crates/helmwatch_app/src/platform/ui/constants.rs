pub const PROMPT: &str = "> ";
pub const PROGRESS_WIDTH: usize = 24;

pub const HELP: &str = "\
Commands:
  select <path>     choose a video file
  upload [<path>]   upload the selected (or given) video
  play <name|#n>    show a processed video from history
  delete <name|#n>  delete a history entry
  download          save the current result video
  history           reload the history list
  show              redraw the screen
  help              show this text
  quit              leave";
