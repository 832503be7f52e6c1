use crossterm::event::KeyEvent;

use symcheck_client::{BackendError, ChatResponse, ValidateResponse};

/// Completion of a request spawned off the UI loop.
#[derive(Debug)]
pub enum BackendEvent {
    Validated(Result<ValidateResponse, BackendError>),
    Insight(Result<ChatResponse, BackendError>),
}

#[derive(Debug)]
pub enum AppEvent {
    Key(KeyEvent),
    Backend(BackendEvent),
    Tick,
    Resize(u16, u16),
}
