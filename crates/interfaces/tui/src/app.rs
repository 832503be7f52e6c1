use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::Frame;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use symcheck_client::{ChatRequest, ValidateRequest};
use symcheck_config::AppConfig;
use symcheck_core::{Sex, Step, WizardController};

use crate::{
    events::{AppEvent, BackendEvent},
    render,
    theme::Theme,
};

pub(crate) const SPINNER_FRAMES: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiCommand {
    Quit,
    Validate(ValidateRequest),
    FetchInsight(ChatRequest),
}

/// Which intake field receives typing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntakeField {
    Age,
    Sex,
}

pub struct App {
    pub controller: WizardController,
    pub backend_rx: mpsc::UnboundedReceiver<BackendEvent>,
    pub focus: IntakeField,
    pub theme: Theme,
    pub spinner_tick: usize,
    pub scroll: u16,
    /// One-line hint shown in the footer when an action is refused.
    pub hint: Option<String>,
}

impl App {
    pub fn new(
        controller: WizardController,
        backend_rx: mpsc::UnboundedReceiver<BackendEvent>,
        config: &AppConfig,
    ) -> Self {
        Self {
            controller,
            backend_rx,
            focus: IntakeField::Age,
            theme: Theme::from_config(&config.ui.theme),
            spinner_tick: 0,
            scroll: 0,
            hint: None,
        }
    }

    pub fn draw(&self, frame: &mut Frame<'_>) {
        render::draw_wizard(frame, self);
    }

    pub fn spinner(&self) -> &'static str {
        SPINNER_FRAMES[self.spinner_tick % SPINNER_FRAMES.len()]
    }

    pub fn update(&mut self, event: AppEvent) -> Option<UiCommand> {
        match event {
            AppEvent::Key(key) => self.handle_key(key),
            AppEvent::Backend(event) => {
                self.handle_backend(event);
                None
            }
            AppEvent::Tick => {
                if self.controller.is_loading() {
                    self.spinner_tick = self.spinner_tick.wrapping_add(1);
                }
                None
            }
            AppEvent::Resize(width, height) => {
                debug!(width, height, "terminal resized");
                None
            }
        }
    }

    fn handle_backend(&mut self, event: BackendEvent) {
        let finished = match event {
            BackendEvent::Validated(result) => self.controller.finish_validation(result).map(|_| ()),
            BackendEvent::Insight(result) => self.controller.finish_insight(result).map(|_| ()),
        };
        if let Err(err) = finished {
            warn!(error = %err, "dropping stale backend reply");
        }
        self.scroll = 0;
    }

    fn handle_key(&mut self, key: KeyEvent) -> Option<UiCommand> {
        if key.code == KeyCode::Esc
            || (key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL))
        {
            return Some(UiCommand::Quit);
        }

        // The alert is modal: only dismissal gets through.
        if self.controller.alert().is_some() {
            if key.code == KeyCode::Enter {
                self.controller.dismiss_alert();
            }
            return None;
        }

        self.hint = None;
        match self.controller.step() {
            Step::Intake => self.handle_intake_key(key),
            Step::SymptomEntry | Step::Clarification => self.handle_text_key(key),
            Step::Result => self.handle_result_key(key),
        }
    }

    fn handle_intake_key(&mut self, key: KeyEvent) -> Option<UiCommand> {
        match (key.code, self.focus) {
            (KeyCode::Tab | KeyCode::BackTab, _) => {
                self.focus = match self.focus {
                    IntakeField::Age => IntakeField::Sex,
                    IntakeField::Sex => IntakeField::Age,
                };
            }
            (KeyCode::Char(ch), IntakeField::Age) => self.controller.push_char(ch),
            (KeyCode::Backspace, IntakeField::Age) => self.controller.pop_char(),
            (KeyCode::Up | KeyCode::Left, IntakeField::Sex) => self.controller.cycle_sex(false),
            (KeyCode::Down | KeyCode::Right, IntakeField::Sex) => self.controller.cycle_sex(true),
            (KeyCode::Char('m' | 'M'), IntakeField::Sex) => self.controller.set_sex(Sex::Male),
            (KeyCode::Char('f' | 'F'), IntakeField::Sex) => self.controller.set_sex(Sex::Female),
            (KeyCode::Backspace, IntakeField::Sex) => self.controller.set_sex(Sex::Unset),
            (KeyCode::Enter, _) => {
                if let Err(err) = self.controller.advance_intake() {
                    self.hint = Some(err.to_string());
                    if self.controller.age().is_empty() {
                        self.focus = IntakeField::Age;
                    } else if !self.controller.sex().is_set() {
                        self.focus = IntakeField::Sex;
                    }
                }
            }
            _ => {}
        }
        None
    }

    fn handle_text_key(&mut self, key: KeyEvent) -> Option<UiCommand> {
        match key.code {
            KeyCode::Char(ch) => self.controller.push_char(ch),
            KeyCode::Backspace => self.controller.pop_char(),
            KeyCode::Enter => {
                // A disabled button does nothing; the footer already says why.
                if !self.controller.can_advance() {
                    return None;
                }
                let command = if self.controller.step() == Step::SymptomEntry {
                    self.controller.begin_validation().map(UiCommand::Validate)
                } else {
                    self.controller.begin_insight().map(UiCommand::FetchInsight)
                };
                match command {
                    Ok(command) => {
                        self.spinner_tick = 0;
                        return Some(command);
                    }
                    Err(err) => self.hint = Some(err.to_string()),
                }
            }
            _ => {}
        }
        None
    }

    fn handle_result_key(&mut self, key: KeyEvent) -> Option<UiCommand> {
        match key.code {
            KeyCode::Up => self.scroll = self.scroll.saturating_sub(1),
            KeyCode::Down => self.scroll = self.scroll.saturating_add(1),
            KeyCode::Enter => {
                if let Err(err) = self.controller.start_over() {
                    self.hint = Some(err.to_string());
                } else {
                    self.focus = IntakeField::Age;
                    self.scroll = 0;
                }
            }
            _ => {}
        }
        None
    }
}
