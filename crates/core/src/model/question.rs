use serde::{Deserialize, Serialize};
use thiserror::Error;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

/// Validation failures for a single question record.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("question text cannot be empty")]
    EmptyText,

    #[error("a question needs at least 2 options, got {count}")]
    TooFewOptions { count: usize },

    #[error("correct answer \"{answer}\" is not one of the options")]
    CorrectOptionMissing { answer: String },
}

/// A question set that could not be accepted, with the offending position.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("question {index} is malformed: {source}")]
pub struct QuestionSetError {
    pub index: usize,
    #[source]
    pub source: QuestionError,
}

//
// ─── WIRE SHAPE ────────────────────────────────────────────────────────────────
//

/// Unvalidated question record as exchanged with the generation service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionDraft {
    pub question: String,
    pub options: Vec<String>,
    pub answer: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

impl QuestionDraft {
    /// Validate the draft into an immutable `Question`.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError` when the text is blank, fewer than two options are
    /// given, or the correct answer is not among the options.
    pub fn validate(self) -> Result<Question, QuestionError> {
        if self.question.trim().is_empty() {
            return Err(QuestionError::EmptyText);
        }
        if self.options.len() < 2 {
            return Err(QuestionError::TooFewOptions {
                count: self.options.len(),
            });
        }
        if !self.options.iter().any(|opt| *opt == self.answer) {
            return Err(QuestionError::CorrectOptionMissing {
                answer: self.answer,
            });
        }

        let explanation = self
            .explanation
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty());

        Ok(Question {
            text: self.question,
            options: self.options,
            correct_option: self.answer,
            explanation,
        })
    }
}

//
// ─── QUESTION ──────────────────────────────────────────────────────────────────
//

/// A validated multiple-choice question. Never mutated after construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    text: String,
    options: Vec<String>,
    correct_option: String,
    explanation: Option<String>,
}

impl Question {
    /// Build a question from parts.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError` if the parts do not form a valid question.
    pub fn new(
        text: impl Into<String>,
        options: Vec<String>,
        correct_option: impl Into<String>,
        explanation: Option<String>,
    ) -> Result<Self, QuestionError> {
        QuestionDraft {
            question: text.into(),
            options,
            answer: correct_option.into(),
            explanation,
        }
        .validate()
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn options(&self) -> &[String] {
        &self.options
    }

    #[must_use]
    pub fn correct_option(&self) -> &str {
        &self.correct_option
    }

    #[must_use]
    pub fn explanation(&self) -> Option<&str> {
        self.explanation.as_deref()
    }

    /// Returns true if `option` is one of this question's options.
    #[must_use]
    pub fn has_option(&self, option: &str) -> bool {
        self.options.iter().any(|opt| opt == option)
    }

    /// Strict equality against the correct option.
    #[must_use]
    pub fn is_correct(&self, option: &str) -> bool {
        self.correct_option == option
    }

    #[must_use]
    pub fn to_draft(&self) -> QuestionDraft {
        QuestionDraft {
            question: self.text.clone(),
            options: self.options.clone(),
            answer: self.correct_option.clone(),
            explanation: self.explanation.clone(),
        }
    }
}

//
// ─── QUESTION SET ──────────────────────────────────────────────────────────────
//

/// Ordered, index-addressable questions for one session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuestionSet {
    questions: Vec<Question>,
}

impl QuestionSet {
    #[must_use]
    pub fn new(questions: Vec<Question>) -> Self {
        Self { questions }
    }

    /// Validate a list of wire drafts, failing on the first malformed record.
    ///
    /// # Errors
    ///
    /// Returns `QuestionSetError` naming the index of the malformed question.
    pub fn from_drafts(drafts: Vec<QuestionDraft>) -> Result<Self, QuestionSetError> {
        let questions = drafts
            .into_iter()
            .enumerate()
            .map(|(index, draft)| {
                draft
                    .validate()
                    .map_err(|source| QuestionSetError { index, source })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { questions })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Question> {
        self.questions.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Question> {
        self.questions.iter()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[Question] {
        &self.questions
    }
}

impl<'a> IntoIterator for &'a QuestionSet {
    type Item = &'a Question;
    type IntoIter = std::slice::Iter<'a, Question>;

    fn into_iter(self) -> Self::IntoIter {
        self.questions.iter()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(question: &str, options: &[&str], answer: &str) -> QuestionDraft {
        QuestionDraft {
            question: question.to_string(),
            options: options.iter().map(|opt| (*opt).to_string()).collect(),
            answer: answer.to_string(),
            explanation: None,
        }
    }

    #[test]
    fn rejects_answer_outside_options() {
        let err = draft("Capital of France?", &["London", "Paris"], "Madrid")
            .validate()
            .unwrap_err();
        assert_eq!(
            err,
            QuestionError::CorrectOptionMissing {
                answer: "Madrid".into()
            }
        );
    }

    #[test]
    fn rejects_single_option() {
        let err = draft("Q", &["only"], "only").validate().unwrap_err();
        assert_eq!(err, QuestionError::TooFewOptions { count: 1 });
    }

    #[test]
    fn duplicate_options_are_allowed() {
        let question = draft("Q", &["same", "same"], "same").validate().unwrap();
        assert_eq!(question.options().len(), 2);
    }

    #[test]
    fn blank_explanation_becomes_none() {
        let mut d = draft("Q", &["a", "b"], "a");
        d.explanation = Some("   ".into());
        assert_eq!(d.validate().unwrap().explanation(), None);
    }

    #[test]
    fn set_reports_index_of_malformed_question() {
        let err = QuestionSet::from_drafts(vec![
            draft("Q1", &["a", "b"], "a"),
            draft("", &["a", "b"], "a"),
        ])
        .unwrap_err();
        assert_eq!(err.index, 1);
        assert_eq!(err.source, QuestionError::EmptyText);
    }

    #[test]
    fn decodes_wire_shape() {
        let json = r#"{"question":"2+2?","options":["3","4","5","6"],"answer":"4","explanation":"Arithmetic."}"#;
        let parsed: QuestionDraft = serde_json::from_str(json).unwrap();
        let question = parsed.validate().unwrap();
        assert_eq!(question.text(), "2+2?");
        assert!(question.is_correct("4"));
        assert!(!question.is_correct(" 4"));
        assert_eq!(question.explanation(), Some("Arithmetic."));
    }
}
