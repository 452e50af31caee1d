use std::fmt;

use crate::model::{AnswerLedger, QuestionSet};

/// Correctness totals for one attempt.
///
/// Always derived from a question set and its ledger; nothing stores one, so
/// it can never disagree with the answers it was computed from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResultSummary {
    correct: usize,
    incorrect: usize,
    percentage: f64,
}

impl ResultSummary {
    #[must_use]
    pub fn correct(&self) -> usize {
        self.correct
    }

    #[must_use]
    pub fn incorrect(&self) -> usize {
        self.incorrect
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.correct + self.incorrect
    }

    /// Score in `[0, 100]`, rounded to one decimal place.
    #[must_use]
    pub fn percentage(&self) -> f64 {
        self.percentage
    }

    /// Percentage rendered with one decimal, e.g. `66.7%`.
    #[must_use]
    pub fn percentage_label(&self) -> String {
        format!("{:.1}%", self.percentage)
    }
}

impl fmt::Display for ResultSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{} correct ({})",
            self.correct,
            self.total(),
            self.percentage_label()
        )
    }
}

/// Scores a ledger against its question set.
///
/// A question counts as correct iff its slot holds exactly the correct option;
/// unset slots count as incorrect.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn score(questions: &QuestionSet, ledger: &AnswerLedger) -> ResultSummary {
    let total = questions.len();
    let correct = questions
        .iter()
        .enumerate()
        .filter(|(index, question)| {
            ledger
                .get(*index)
                .is_some_and(|selected| question.is_correct(selected))
        })
        .count();

    let percentage = if total == 0 {
        0.0
    } else {
        (correct as f64 / total as f64 * 1000.0).round() / 10.0
    };

    ResultSummary {
        correct,
        incorrect: total - correct,
        percentage,
    }
}
