use std::io;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event as CrosstermEvent, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tokio::sync::mpsc;
use tracing::debug;

use symcheck_client::SymptomBackend;

use crate::app::{App, UiCommand};
use crate::events::{AppEvent, BackendEvent};

/// Read crossterm events on a dedicated OS thread so the async loop never
/// blocks on `event::read()`.
fn spawn_crossterm_reader() -> mpsc::UnboundedReceiver<CrosstermEvent> {
    let (tx, rx) = mpsc::unbounded_channel();
    std::thread::spawn(move || {
        while let Ok(ev) = event::read() {
            if tx.send(ev).is_err() {
                break;
            }
        }
    });
    rx
}

pub fn create_backend_channel() -> (
    mpsc::UnboundedSender<BackendEvent>,
    mpsc::UnboundedReceiver<BackendEvent>,
) {
    mpsc::unbounded_channel()
}

/// Run one request off the UI loop and report the reply on `tx`.
///
/// A closed channel (the user quit meanwhile) drops the reply.
pub(crate) fn dispatch(
    command: UiCommand,
    backend: Arc<dyn SymptomBackend>,
    tx: mpsc::UnboundedSender<BackendEvent>,
) {
    match command {
        UiCommand::Quit => {}
        UiCommand::Validate(request) => {
            tokio::spawn(async move {
                let result = backend.validate(&request).await;
                let _ = tx.send(BackendEvent::Validated(result));
            });
        }
        UiCommand::FetchInsight(request) => {
            tokio::spawn(async move {
                let result = backend.chat(&request).await;
                let _ = tx.send(BackendEvent::Insight(result));
            });
        }
    }
}

pub async fn run_app(
    app: &mut App,
    backend: Arc<dyn SymptomBackend>,
    backend_tx: mpsc::UnboundedSender<BackendEvent>,
) -> Result<()> {
    let mut stdout = io::stdout();
    enable_raw_mode()?;
    execute!(stdout, EnterAlternateScreen)?;
    let terminal_backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(terminal_backend)?;
    terminal.clear()?;

    let mut tick_interval = tokio::time::interval(Duration::from_millis(80));
    // First tick fires immediately; skip it so we don't double-draw on entry.
    tick_interval.tick().await;
    let mut term_rx = spawn_crossterm_reader();

    let result = async {
        loop {
            terminal.draw(|f| app.draw(f))?;

            tokio::select! {
                backend_event = app.backend_rx.recv() => {
                    if let Some(backend_event) = backend_event {
                        app.update(AppEvent::Backend(backend_event));
                    }
                }
                _ = tick_interval.tick() => {
                    app.update(AppEvent::Tick);
                }
                term_event = term_rx.recv() => {
                    match term_event {
                        Some(CrosstermEvent::Key(key)) => {
                            if key.kind != KeyEventKind::Press {
                                continue;
                            }
                            if let Some(command) = app.update(AppEvent::Key(key)) {
                                if command == UiCommand::Quit {
                                    break;
                                }
                                debug!(?command, "dispatching backend request");
                                dispatch(command, backend.clone(), backend_tx.clone());
                            }
                        }
                        Some(CrosstermEvent::Resize(w, h)) => {
                            app.update(AppEvent::Resize(w, h));
                        }
                        Some(_) => {}
                        None => break,
                    }
                }
            }
        }
        Ok(()) as Result<()>
    }
    .await;

    debug!("restoring terminal state");
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    result
}
