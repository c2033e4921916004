use std::collections::VecDeque;
use std::io::{self, BufRead, Write};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use anyhow::Context;
use cnda_core::{update, AppState, Msg, Screen};
use cnda_engine::EngineHandle;
use cnda_logging::{cnda_error, cnda_info};

use super::config::AppConfig;
use super::effects::{EffectRunner, MsgSink};
use super::logging;
use super::ui;
use super::ui::input::InputAction;

/// Everything the shell loop reacts to.
pub enum AppEvent {
    Msg(Msg),
    Input(String),
    InputClosed,
}

pub fn run_app() -> anyhow::Result<()> {
    let config = AppConfig::load().context("loading configuration")?;
    logging::initialize(
        config.log_destination,
        config.level_filter()?,
        &config.log_file,
    );
    cnda_info!("Starting CNDA downloader against {}", config.base_url);

    let (event_tx, event_rx) = mpsc::channel::<AppEvent>();
    let sink = Arc::new(MsgSink::new(event_tx.clone()));
    let engine =
        EngineHandle::new(config.engine_settings(), sink).context("starting the engine")?;
    let runner = EffectRunner::new(engine, config.stop_polling_on_completion);

    spawn_input_reader(event_tx.clone());

    // Background tick to coalesce renders of bursty engine results.
    thread::spawn(move || {
        let interval = Duration::from_millis(100);
        while event_tx.send(AppEvent::Msg(Msg::Tick)).is_ok() {
            thread::sleep(interval);
        }
    });

    let mut shell = Shell::new(runner);
    shell.render();

    while let Ok(event) = event_rx.recv() {
        match event {
            AppEvent::Msg(Msg::Tick) => {
                if shell.pending_render {
                    shell.render();
                }
            }
            AppEvent::Msg(msg) => shell.dispatch(msg),
            AppEvent::Input(line) => match ui::input::parse_input(&shell.state.view(), &line) {
                InputAction::Dispatch(msgs) => {
                    for msg in msgs {
                        shell.dispatch(msg);
                    }
                    shell.render();
                }
                InputAction::Help => {
                    shell.print(&ui::input::help_lines(shell.state.screen()));
                }
                InputAction::Invalid(reason) => shell.print(&[format!("? {reason}")]),
                InputAction::Quit => break,
            },
            AppEvent::InputClosed => break,
        }
    }

    shell.shutdown();
    cnda_info!("CNDA downloader stopped");
    Ok(())
}

fn spawn_input_reader(tx: mpsc::Sender<AppEvent>) {
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if tx.send(AppEvent::Input(line)).is_err() {
                return;
            }
        }
        let _ = tx.send(AppEvent::InputClosed);
    });
}

struct Shell {
    state: AppState,
    runner: EffectRunner,
    pending_render: bool,
}

impl Shell {
    fn new(runner: EffectRunner) -> Self {
        Self {
            state: AppState::new(),
            runner,
            pending_render: false,
        }
    }

    fn dispatch(&mut self, msg: Msg) {
        let mut queue = VecDeque::from([msg]);
        while let Some(msg) = queue.pop_front() {
            let _scope = self
                .state
                .job()
                .map(|job| cnda_logging::enter_job_scope(job.job_id()));

            let state = std::mem::take(&mut self.state);
            let (mut state, effects) = update(state, msg);
            if state.consume_dirty() {
                self.pending_render = true;
            }
            self.state = state;
            queue.extend(self.runner.run(effects));
        }
    }

    fn render(&mut self) {
        self.pending_render = false;
        let view = self.state.view();
        let mut lines = vec![ui::constants::CLEAR_SCREEN.to_string()];
        lines.extend(ui::render::render(&view));
        lines.push("> ".to_string());
        self.write(&lines, false);
    }

    fn print(&self, lines: &[String]) {
        self.write(lines, true);
    }

    fn write(&self, lines: &[String], trailing_newline: bool) {
        let mut out = io::stdout().lock();
        let result = (|| -> io::Result<()> {
            let (last, head) = match lines.split_last() {
                Some(split) => split,
                None => return Ok(()),
            };
            for line in head {
                writeln!(out, "{line}")?;
            }
            if trailing_newline {
                writeln!(out, "{last}")?;
            } else {
                write!(out, "{last}")?;
            }
            out.flush()
        })();
        if let Err(err) = result {
            cnda_error!("Failed to write to terminal: {}", err);
        }
    }

    /// Closes an open download view so its poller stops before the engine
    /// goes away.
    fn shutdown(mut self) {
        if self.state.screen() == Screen::Downloads {
            self.dispatch(Msg::BackClicked);
        }
    }
}
