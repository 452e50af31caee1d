use crate::model::question::Question;

/// Fallback text for questions generated without an explanation.
pub const NO_EXPLANATION: &str = "No explanation provided.";

/// One row of the answer review: the question and how it was answered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewItem {
    pub index: usize,
    pub question: Question,
    pub selected: Option<String>,
    pub is_correct: bool,
}

impl ReviewItem {
    /// 1-based position for display.
    #[must_use]
    pub fn number(&self) -> usize {
        self.index + 1
    }

    /// The chosen option, or `Not answered`.
    #[must_use]
    pub fn selected_label(&self) -> &str {
        self.selected.as_deref().unwrap_or("Not answered")
    }

    #[must_use]
    pub fn explanation(&self) -> &str {
        self.question.explanation().unwrap_or(NO_EXPLANATION)
    }
}

/// The flashcard currently shown in replay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Flashcard {
    pub index: usize,
    pub total: usize,
    pub question: String,
    pub explanation: String,
    pub answer: String,
    pub flipped: bool,
}

impl Flashcard {
    #[must_use]
    pub fn from_question(index: usize, total: usize, question: &Question, flipped: bool) -> Self {
        Self {
            index,
            total,
            question: question.text().to_string(),
            explanation: question.explanation().unwrap_or(NO_EXPLANATION).to_string(),
            answer: question.correct_option().to_string(),
            flipped,
        }
    }

    /// Position label, e.g. `2 / 5`.
    #[must_use]
    pub fn counter(&self) -> String {
        format!("{} / {}", self.index + 1, self.total)
    }
}
