//! Non-interactive single session driven by command-line arguments.

use std::io::Write;

use anyhow::{Result, bail};
use tracing::info;

use symcheck_client::SymptomBackend;
use symcheck_core::{InsightOutcome, Sex, ValidationOutcome, WizardController};

#[derive(Debug, Clone)]
pub struct CheckArgs {
    pub age: String,
    pub sex: Sex,
    pub symptom: String,
    pub answer: String,
}

/// Walk all four steps once.  The selected questions go to `notes`; the
/// insight text is returned.  A rejection or backend failure is an error
/// carrying the message the wizard would have shown.
pub async fn run_check<W: Write>(
    wizard: &mut WizardController,
    backend: &dyn SymptomBackend,
    args: &CheckArgs,
    notes: &mut W,
) -> Result<String> {
    wizard.set_age(&args.age);
    wizard.set_sex(args.sex);
    wizard.advance_intake()?;

    wizard.set_main_symptom(args.symptom.as_str());
    match wizard.submit_symptom(backend).await? {
        ValidationOutcome::Accepted => {}
        ValidationOutcome::Rejected(reply) => bail!("{reply}"),
        ValidationOutcome::Unavailable => {
            bail!("{}", wizard.warning().unwrap_or_default())
        }
    }

    if let Some(questions) = wizard.ensure_questions() {
        writeln!(notes, "Clarifying questions:")?;
        for (index, question) in questions.iter().enumerate() {
            writeln!(notes, "  {}. {question}", index + 1)?;
        }
    }

    wizard.set_refine_answer(args.answer.as_str());
    if wizard.request_insight(backend).await? == InsightOutcome::Failed {
        bail!("{}", wizard.alert().unwrap_or_default());
    }

    info!("insight received");
    Ok(wizard.insight().unwrap_or_default().to_string())
}
