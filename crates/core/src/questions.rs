//! Fixed clarifying-question bank.

use rand::Rng;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuestionSet {
    questions: [&'static str; 3],
}

impl QuestionSet {
    pub const fn new(questions: [&'static str; 3]) -> Self {
        Self { questions }
    }

    pub fn questions(&self) -> &[&'static str; 3] {
        &self.questions
    }

    pub fn iter(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.questions.iter().copied()
    }
}

pub const QUESTION_TEMPLATES: [QuestionSet; 3] = [
    QuestionSet::new([
        "Can you describe the nature of the pain? Is it sharp, dull, cramping, or burning?",
        "Have you experienced any other symptoms, such as nausea, vomiting, fever, or changes in bowel movements?",
        "When did the pain start, and have you noticed any activities or foods that seem to trigger or worsen the pain?",
    ]),
    QuestionSet::new([
        "Please explain what kind of pain you are feeling (sharp, dull, cramping, or burning).",
        "Are there any additional symptoms like nausea, vomiting, or fever?",
        "When did the pain begin, and are there any triggers you’ve noticed?",
    ]),
    QuestionSet::new([
        "How would you describe your pain? Sharp, dull, cramping, or burning?",
        "Do you have other symptoms like nausea, vomiting, or fever?",
        "When did the pain start and are there certain foods or activities that make it worse?",
    ]),
];

/// Uniform pick over [`QUESTION_TEMPLATES`].  Returns the template index
/// alongside the set.
pub fn pick_question_set(rng: &mut impl Rng) -> (usize, QuestionSet) {
    let index = rng.random_range(0..QUESTION_TEMPLATES.len());
    (index, QUESTION_TEMPLATES[index])
}
