//! Wizard state: steps, intake choices, and in-flight markers.

use std::fmt;
use std::str::FromStr;

use crate::questions::QuestionSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Intake,
    SymptomEntry,
    Clarification,
    Result,
}

impl Step {
    pub fn all() -> [Step; 4] {
        [
            Step::Intake,
            Step::SymptomEntry,
            Step::Clarification,
            Step::Result,
        ]
    }

    /// 1-based position, as shown to the user.
    pub fn number(self) -> usize {
        match self {
            Step::Intake => 1,
            Step::SymptomEntry => 2,
            Step::Clarification => 3,
            Step::Result => 4,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Step::Intake => "About You",
            Step::SymptomEntry => "Symptom",
            Step::Clarification => "Questions",
            Step::Result => "Insights",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.number(), self.label())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Sex {
    #[default]
    Unset,
    Male,
    Female,
}

impl Sex {
    /// Value sent to the backend; empty while unset.
    pub fn as_str(self) -> &'static str {
        match self {
            Sex::Unset => "",
            Sex::Male => "Male",
            Sex::Female => "Female",
        }
    }

    pub fn is_set(self) -> bool {
        self != Sex::Unset
    }

    pub fn next(self) -> Self {
        match self {
            Sex::Unset | Sex::Female => Sex::Male,
            Sex::Male => Sex::Female,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            Sex::Unset | Sex::Male => Sex::Female,
            Sex::Female => Sex::Male,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("sex must be one of: male, female")]
pub struct ParseSexError;

impl FromStr for Sex {
    type Err = ParseSexError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_lowercase().as_str() {
            "m" | "male" => Ok(Sex::Male),
            "f" | "female" => Ok(Sex::Female),
            _ => Err(ParseSexError),
        }
    }
}

/// Clarifying questions for the session.  Chosen once on first entry to
/// [`Step::Clarification`] and kept until the session is reset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum QuestionSelection {
    #[default]
    Unselected,
    Selected(QuestionSet),
}

impl QuestionSelection {
    pub fn selected(&self) -> Option<&QuestionSet> {
        match self {
            QuestionSelection::Unselected => None,
            QuestionSelection::Selected(set) => Some(set),
        }
    }
}

/// The request currently awaiting a backend reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pending {
    Validation,
    Insight,
}
