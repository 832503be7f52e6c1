//! The four-step wizard state machine.

use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, info, warn};

use symcheck_client::{
    BackendError, ChatRequest, ChatResponse, SymptomBackend, ValidateRequest, ValidateResponse,
};

use crate::questions::{QuestionSet, pick_question_set};
use crate::state::{Pending, QuestionSelection, Sex, Step};

/// Substring the backend uses to reject symptoms outside its trained scope.
pub const SCOPE_RESTRICTION_PHRASE: &str = "trained only on abdominal pain";
/// Shown when the backend flags a rejection but sends no text.
pub const DEFAULT_REJECTION_MESSAGE: &str =
    "I'm sorry but I am trained only on abdominal pain in adults.";
pub const VALIDATION_ERROR_MESSAGE: &str =
    "⚠️ Error checking symptom. Please make sure backend is running.";
pub const INSIGHT_ERROR_MESSAGE: &str = "⚠️ Error fetching health insights. Please try again.";
pub const INSIGHT_FALLBACK: &str = "❌ Sorry, no insights were returned.";

pub const MAX_AGE: u8 = 120;
const MAX_AGE_DIGITS: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WizardError {
    #[error("cannot {action} on step {step}")]
    WrongStep { action: &'static str, step: Step },
    #[error("a request is already in flight")]
    Busy,
    #[error("no {0:?} request is in flight")]
    NotPending(Pending),
    #[error("{0}")]
    Incomplete(&'static str),
}

/// Result of a `/validate` round trip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationOutcome {
    Accepted,
    /// Out of the backend's scope; the text is shown inline as-is.
    Rejected(String),
    /// Transport or HTTP failure.
    Unavailable,
}

/// Result of a `/chat` round trip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsightOutcome {
    Ready,
    Failed,
}

/// Decide whether a `/validate` reply accepts the symptom.
///
/// A typed `ok` flag wins when present; otherwise the reply text is
/// checked for [`SCOPE_RESTRICTION_PHRASE`].
pub fn classify_validation(response: &ValidateResponse) -> ValidationOutcome {
    let reply = response.reply.as_deref().unwrap_or_default();
    match response.ok {
        Some(false) if reply.trim().is_empty() => {
            ValidationOutcome::Rejected(DEFAULT_REJECTION_MESSAGE.to_string())
        }
        Some(false) => ValidationOutcome::Rejected(reply.to_string()),
        Some(true) => ValidationOutcome::Accepted,
        None if reply.contains(SCOPE_RESTRICTION_PHRASE) => {
            ValidationOutcome::Rejected(reply.to_string())
        }
        None => ValidationOutcome::Accepted,
    }
}

/// Insight text to display for a `/chat` reply.
pub fn insight_text(response: &ChatResponse) -> String {
    match response.reply.as_deref() {
        Some(reply) if !reply.trim().is_empty() => reply.to_string(),
        _ => INSIGHT_FALLBACK.to_string(),
    }
}

/// Owns every piece of session state and is the only thing that mutates it.
///
/// Remote calls are split into `begin_*` (guards, marks the request in
/// flight, returns the body to send) and `finish_*` (applies the reply), so
/// an event loop can await the call elsewhere.  `submit_symptom` and
/// `request_insight` do both halves in one call.
#[derive(Debug)]
pub struct WizardController {
    step: Step,
    age: String,
    sex: Sex,
    main_symptom: String,
    refine_answer: String,
    questions: QuestionSelection,
    insight: Option<String>,
    warning: Option<String>,
    alert: Option<String>,
    pending: Option<Pending>,
    rng: StdRng,
}

impl Default for WizardController {
    fn default() -> Self {
        Self::new()
    }
}

impl WizardController {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_os_rng())
    }

    pub fn with_rng(rng: StdRng) -> Self {
        Self {
            step: Step::Intake,
            age: String::new(),
            sex: Sex::Unset,
            main_symptom: String::new(),
            refine_answer: String::new(),
            questions: QuestionSelection::Unselected,
            insight: None,
            warning: None,
            alert: None,
            pending: None,
            rng,
        }
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    pub fn step(&self) -> Step {
        self.step
    }

    pub fn age(&self) -> &str {
        &self.age
    }

    pub fn sex(&self) -> Sex {
        self.sex
    }

    pub fn main_symptom(&self) -> &str {
        &self.main_symptom
    }

    pub fn refine_answer(&self) -> &str {
        &self.refine_answer
    }

    pub fn questions(&self) -> Option<&QuestionSet> {
        self.questions.selected()
    }

    pub fn insight(&self) -> Option<&str> {
        self.insight.as_deref()
    }

    /// Inline, non-blocking message shown on the symptom step.
    pub fn warning(&self) -> Option<&str> {
        self.warning.as_deref()
    }

    /// Blocking message that must be dismissed before continuing.
    pub fn alert(&self) -> Option<&str> {
        self.alert.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.pending.is_some()
    }

    // ── Editing ───────────────────────────────────────────────────────────

    /// Stores the trimmed text as typed; [`advance_intake`] rejects
    /// anything that is not a plain whole number.  Ignored outside the
    /// intake step.
    ///
    /// [`advance_intake`]: WizardController::advance_intake
    pub fn set_age(&mut self, raw: &str) {
        if self.step == Step::Intake {
            self.age = raw.trim().to_string();
        }
    }

    pub fn set_sex(&mut self, sex: Sex) {
        if self.step == Step::Intake {
            self.sex = sex;
        }
    }

    pub fn cycle_sex(&mut self, forward: bool) {
        let next = if forward {
            self.sex.next()
        } else {
            self.sex.prev()
        };
        self.set_sex(next);
    }

    pub fn set_main_symptom(&mut self, text: impl Into<String>) {
        if self.step == Step::SymptomEntry && !self.is_loading() {
            self.main_symptom = text.into();
        }
    }

    pub fn set_refine_answer(&mut self, text: impl Into<String>) {
        if self.step == Step::Clarification && !self.is_loading() {
            self.refine_answer = text.into();
        }
    }

    /// Append to the current step's text field.
    pub fn push_char(&mut self, ch: char) {
        if self.is_loading() {
            return;
        }
        match self.step {
            Step::Intake => {
                if ch.is_ascii_digit() && self.age.len() < MAX_AGE_DIGITS {
                    self.age.push(ch);
                }
            }
            Step::SymptomEntry => self.main_symptom.push(ch),
            Step::Clarification => self.refine_answer.push(ch),
            Step::Result => {}
        }
    }

    /// Remove the last character of the current step's text field.
    pub fn pop_char(&mut self) {
        if self.is_loading() {
            return;
        }
        match self.step {
            Step::Intake => {
                self.age.pop();
            }
            Step::SymptomEntry => {
                self.main_symptom.pop();
            }
            Step::Clarification => {
                self.refine_answer.pop();
            }
            Step::Result => {}
        }
    }

    // ── Guards ────────────────────────────────────────────────────────────

    fn age_is_valid(&self) -> bool {
        let digits_only = !self.age.is_empty()
            && self.age.len() <= MAX_AGE_DIGITS
            && self.age.bytes().all(|b| b.is_ascii_digit());
        digits_only && matches!(self.age.parse::<u8>(), Ok(age) if (1..=MAX_AGE).contains(&age))
    }

    /// Whether the current step's primary action ("Next", "Get Health
    /// Insights", "Start Over") is enabled.
    pub fn can_advance(&self) -> bool {
        match self.step {
            Step::Intake => self.age_is_valid() && self.sex.is_set(),
            Step::SymptomEntry => !self.main_symptom.trim().is_empty() && !self.is_loading(),
            Step::Clarification => {
                !self.refine_answer.trim().is_empty()
                    && !self.is_loading()
                    && self.alert.is_none()
            }
            Step::Result => true,
        }
    }

    fn expect_step(&self, expected: Step, action: &'static str) -> Result<(), WizardError> {
        if self.step == expected {
            Ok(())
        } else {
            Err(WizardError::WrongStep {
                action,
                step: self.step,
            })
        }
    }

    // ── Transitions ───────────────────────────────────────────────────────

    /// Intake → SymptomEntry.  Purely local.
    pub fn advance_intake(&mut self) -> Result<(), WizardError> {
        self.expect_step(Step::Intake, "submit age and sex")?;
        if !self.age_is_valid() {
            return Err(WizardError::Incomplete("age must be a whole number from 1 to 120"));
        }
        if !self.sex.is_set() {
            return Err(WizardError::Incomplete("sex must be selected"));
        }
        self.step = Step::SymptomEntry;
        debug!(age = %self.age, sex = self.sex.as_str(), "intake complete");
        Ok(())
    }

    /// Mark the symptom validation in flight and return the body to send.
    pub fn begin_validation(&mut self) -> Result<ValidateRequest, WizardError> {
        self.expect_step(Step::SymptomEntry, "validate a symptom")?;
        if self.is_loading() {
            return Err(WizardError::Busy);
        }
        if self.main_symptom.trim().is_empty() {
            return Err(WizardError::Incomplete("describe your symptom first"));
        }
        self.pending = Some(Pending::Validation);
        Ok(ValidateRequest {
            main_symptom: self.main_symptom.clone(),
        })
    }

    pub fn finish_validation(
        &mut self,
        result: Result<ValidateResponse, BackendError>,
    ) -> Result<ValidationOutcome, WizardError> {
        if self.pending != Some(Pending::Validation) {
            return Err(WizardError::NotPending(Pending::Validation));
        }
        self.pending = None;

        let outcome = match result {
            Ok(response) => classify_validation(&response),
            Err(err) => {
                warn!(error = %err, "error validating symptom");
                ValidationOutcome::Unavailable
            }
        };

        match &outcome {
            ValidationOutcome::Accepted => {
                self.warning = None;
                self.enter_clarification();
            }
            ValidationOutcome::Rejected(reply) => {
                info!("symptom rejected as out of scope");
                self.warning = Some(reply.clone());
            }
            ValidationOutcome::Unavailable => {
                self.warning = Some(VALIDATION_ERROR_MESSAGE.to_string());
            }
        }

        Ok(outcome)
    }

    fn enter_clarification(&mut self) {
        self.step = Step::Clarification;
        self.ensure_questions();
    }

    /// Select this session's question set if none is selected yet.
    ///
    /// Safe to call on every redraw: once a set is chosen it is returned
    /// unchanged and the answer is left alone.
    pub fn ensure_questions(&mut self) -> Option<QuestionSet> {
        if self.step != Step::Clarification {
            return None;
        }
        match self.questions {
            QuestionSelection::Selected(set) => Some(set),
            QuestionSelection::Unselected => {
                let (index, set) = pick_question_set(&mut self.rng);
                debug!(template = index, "selected clarifying questions");
                self.questions = QuestionSelection::Selected(set);
                self.refine_answer.clear();
                Some(set)
            }
        }
    }

    /// Mark the insight request in flight and return the body to send.
    pub fn begin_insight(&mut self) -> Result<ChatRequest, WizardError> {
        self.expect_step(Step::Clarification, "request insights")?;
        if self.is_loading() {
            return Err(WizardError::Busy);
        }
        if self.alert.is_some() {
            return Err(WizardError::Incomplete("dismiss the alert first"));
        }
        if self.refine_answer.trim().is_empty() {
            return Err(WizardError::Incomplete("answer the questions first"));
        }
        self.pending = Some(Pending::Insight);
        Ok(ChatRequest {
            age: self.age.clone(),
            sex: self.sex.as_str().to_string(),
            main_symptom: self.main_symptom.clone(),
            refine_answer: self.refine_answer.clone(),
        })
    }

    pub fn finish_insight(
        &mut self,
        result: Result<ChatResponse, BackendError>,
    ) -> Result<InsightOutcome, WizardError> {
        if self.pending != Some(Pending::Insight) {
            return Err(WizardError::NotPending(Pending::Insight));
        }
        self.pending = None;

        match result {
            Ok(response) => {
                self.insight = Some(insight_text(&response));
                self.step = Step::Result;
                Ok(InsightOutcome::Ready)
            }
            Err(err) => {
                warn!(error = %err, "error fetching insights");
                self.alert = Some(INSIGHT_ERROR_MESSAGE.to_string());
                Ok(InsightOutcome::Failed)
            }
        }
    }

    pub fn dismiss_alert(&mut self) {
        self.alert = None;
    }

    /// Result → Intake, discarding the whole session.
    pub fn start_over(&mut self) -> Result<(), WizardError> {
        self.expect_step(Step::Result, "start over")?;
        self.step = Step::Intake;
        self.age.clear();
        self.sex = Sex::Unset;
        self.main_symptom.clear();
        self.refine_answer.clear();
        self.questions = QuestionSelection::Unselected;
        self.insight = None;
        self.warning = None;
        self.alert = None;
        debug!("session reset");
        Ok(())
    }

    // ── One-shot helpers ──────────────────────────────────────────────────

    pub async fn submit_symptom(
        &mut self,
        backend: &dyn SymptomBackend,
    ) -> Result<ValidationOutcome, WizardError> {
        let request = self.begin_validation()?;
        let result = backend.validate(&request).await;
        self.finish_validation(result)
    }

    pub async fn request_insight(
        &mut self,
        backend: &dyn SymptomBackend,
    ) -> Result<InsightOutcome, WizardError> {
        let request = self.begin_insight()?;
        let result = backend.chat(&request).await;
        self.finish_insight(result)
    }
}
