//! Terminal front ends for the symptom wizard.

pub mod app;
pub mod events;
pub mod prompt;
mod render;
pub mod theme;
pub mod tui;

use std::io::{self, IsTerminal};
use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use symcheck_client::{SymptomBackend, VALIDATE_PATH};
use symcheck_config::AppConfig;
use symcheck_core::WizardController;

/// True when the full-screen wizard can take over the terminal.
pub fn is_interactive_terminal() -> bool {
    io::stdin().is_terminal() && io::stdout().is_terminal()
}

/// Run the wizard until the user quits, using the full-screen UI on a
/// terminal and line prompts otherwise.
pub async fn run_wizard(config: &AppConfig, backend: Arc<dyn SymptomBackend>) -> Result<()> {
    let mut controller = WizardController::new();
    let validate_url = config.endpoint(VALIDATE_PATH);

    if is_interactive_terminal() {
        info!(%validate_url, "starting full-screen wizard");
        let (backend_tx, backend_rx) = tui::create_backend_channel();
        let mut app = app::App::new(controller, backend_rx, config);
        return tui::run_app(&mut app, backend, backend_tx).await;
    }

    info!(%validate_url, "starting prompt wizard");
    let mut input = io::stdin().lock();
    let mut out = io::stdout();
    prompt::run_prompt(&mut controller, backend.as_ref(), &mut input, &mut out).await
}
