use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;

use client_logging::{client_debug, client_info, client_warn};
use helmwatch_core::{update, AppState, Effect, Msg};
use helmwatch_engine::Endpoints;

use super::config::{self, ClientConfig, DEFAULT_CONFIG_FILE};
use super::effects::EffectRunner;
use super::ui::constants::{HELP, PROMPT};
use super::ui::input::{parse_command, Command};
use super::ui::render::render;
use super::{logging, Inbox};

pub fn run_app() -> anyhow::Result<()> {
    let config_path = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
    let (config, config_error) = match config::load(&config_path) {
        Ok(config) => (config, None),
        Err(err) => (ClientConfig::default(), Some(err)),
    };
    let config = config.with_env_overrides();

    logging::initialize(
        config.log_destination,
        client_logging::parse_level(&config.log_level),
    );
    if let Some(err) = config_error {
        client_warn!("Using default config: {:#}", err);
    }
    client_info!("helmwatch starting against {}", config.server_url);

    let engine_config = config.engine_config()?;
    let endpoints = engine_config.endpoints.clone();
    let (inbox_tx, inbox_rx) = mpsc::channel();
    let runner = EffectRunner::new(engine_config, inbox_tx.clone())?;
    spawn_stdin_reader(inbox_tx);

    let mut session = Session::new(runner, endpoints);
    session.dispatch(Msg::Started);
    session.draw();
    prompt();

    while let Ok(item) = inbox_rx.recv() {
        let keep_going = match item {
            Inbox::Msg(msg) => {
                session.dispatch(msg);
                true
            }
            Inbox::Line(line) => session.handle_line(&line),
            Inbox::InputClosed => false,
        };
        if !keep_going {
            break;
        }
    }

    session.dispatch(Msg::TornDown);
    session.runner.shutdown();
    client_info!("helmwatch stopped");
    Ok(())
}

fn spawn_stdin_reader(inbox: mpsc::Sender<Inbox>) {
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if inbox.send(Inbox::Line(line)).is_err() {
                return;
            }
        }
        let _ = inbox.send(Inbox::InputClosed);
    });
}

struct Session {
    state: AppState,
    runner: EffectRunner,
    endpoints: Endpoints,
}

impl Session {
    fn new(runner: EffectRunner, endpoints: Endpoints) -> Self {
        Self {
            state: AppState::new(),
            runner,
            endpoints,
        }
    }

    fn dispatch(&mut self, msg: Msg) {
        let state = std::mem::take(&mut self.state);
        let (mut state, effects) = update(state, msg);
        let was_dirty = state.consume_dirty();
        self.state = state;

        for effect in effects {
            self.run_effect(effect);
        }
        if was_dirty {
            self.draw();
        }
    }

    fn run_effect(&mut self, effect: Effect) {
        match effect {
            Effect::Notify { message } => {
                client_info!("Notice: {}", message);
                println!("!! {message}");
            }
            Effect::ReloadSession => {
                client_debug!("Reloading session");
                self.state = self.state.reloaded();
                self.dispatch(Msg::Started);
            }
            other => self.runner.execute(other),
        }
    }

    /// Returns `false` when the user asked to quit.
    fn handle_line(&mut self, line: &str) -> bool {
        match parse_command(line, &self.state.view()) {
            Ok(Command::Dispatch(msgs)) => {
                for msg in msgs {
                    self.dispatch(msg);
                }
            }
            Ok(Command::Show) => self.draw(),
            Ok(Command::Help) => println!("{HELP}"),
            Ok(Command::Quit) => return false,
            Err(message) => println!("!! {message}"),
        }
        prompt();
        true
    }

    fn draw(&self) {
        let mut out = io::stdout().lock();
        for line in render(&self.state.view(), &self.endpoints) {
            let _ = writeln!(out, "{line}");
        }
        let _ = out.flush();
    }
}

fn prompt() {
    let mut out = io::stdout().lock();
    let _ = write!(out, "{PROMPT}");
    let _ = out.flush();
}
