//! Symptom intake wizard: session state and step transitions.

pub mod controller;
pub mod questions;
pub mod state;

pub use controller::{
    INSIGHT_ERROR_MESSAGE, INSIGHT_FALLBACK, InsightOutcome, SCOPE_RESTRICTION_PHRASE,
    VALIDATION_ERROR_MESSAGE, ValidationOutcome, WizardController, WizardError,
    classify_validation, insight_text,
};
pub use questions::{QUESTION_TEMPLATES, QuestionSet};
pub use state::{Pending, QuestionSelection, Sex, Step};
