mod app;
mod config;
mod effects;
mod logging;
mod ui;

pub use app::run_app;

use helmwatch_core::Msg;

/// Everything the session loop reacts to, funneled through one channel.
pub(crate) enum Inbox {
    Msg(Msg),
    Line(String),
    InputClosed,
}
