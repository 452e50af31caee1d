use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::model::ids::{Generation, ShareSlug};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("number of questions must be between {min} and {max}, got {got}")]
    InvalidQuestionCount { got: u32, min: u32, max: u32 },

    #[error("unknown difficulty: {0}")]
    UnknownDifficulty(String),

    #[error("document file name cannot be empty")]
    EmptyFileName,

    #[error("document is empty")]
    EmptyDocument,
}

//
// ─── DIFFICULTY ────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    /// Form value sent to the generation service.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            _ => Err(ConfigError::UnknownDifficulty(s.to_string())),
        }
    }
}

//
// ─── QUIZ CONFIG ───────────────────────────────────────────────────────────────
//

/// User-chosen generation parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizConfig {
    num_questions: u32,
    difficulty: Difficulty,
    topics: Vec<String>,
}

impl QuizConfig {
    pub const MIN_QUESTIONS: u32 = 1;
    pub const MAX_QUESTIONS: u32 = 50;
    pub const DEFAULT_QUESTIONS: u32 = 5;

    /// # Errors
    ///
    /// Returns `ConfigError::InvalidQuestionCount` if `num_questions` is out of range.
    pub fn new(num_questions: u32, difficulty: Difficulty) -> Result<Self, ConfigError> {
        if !(Self::MIN_QUESTIONS..=Self::MAX_QUESTIONS).contains(&num_questions) {
            return Err(ConfigError::InvalidQuestionCount {
                got: num_questions,
                min: Self::MIN_QUESTIONS,
                max: Self::MAX_QUESTIONS,
            });
        }
        Ok(Self {
            num_questions,
            difficulty,
            topics: Vec::new(),
        })
    }

    #[must_use]
    pub fn num_questions(&self) -> u32 {
        self.num_questions
    }

    #[must_use]
    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    /// Topics the user chose to focus on, in selection order.
    #[must_use]
    pub fn topics(&self) -> &[String] {
        &self.topics
    }

    /// Adds or removes `topic`. Returns true if it is now selected.
    pub(crate) fn toggle_topic(&mut self, topic: &str) -> bool {
        if let Some(pos) = self.topics.iter().position(|t| t == topic) {
            self.topics.remove(pos);
            false
        } else {
            self.topics.push(topic.to_string());
            true
        }
    }

    pub(crate) fn clear_topics(&mut self) {
        self.topics.clear();
    }
}

impl Default for QuizConfig {
    fn default() -> Self {
        Self {
            num_questions: Self::DEFAULT_QUESTIONS,
            difficulty: Difficulty::default(),
            topics: Vec::new(),
        }
    }
}

//
// ─── SOURCE DOCUMENT ───────────────────────────────────────────────────────────
//

/// The uploaded document that questions are generated from.
#[derive(Clone, PartialEq, Eq)]
pub struct SourceDocument {
    file_name: String,
    bytes: Vec<u8>,
}

impl SourceDocument {
    /// # Errors
    ///
    /// Returns `ConfigError` if the file name is blank or the content is empty.
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Result<Self, ConfigError> {
        let file_name = file_name.into().trim().to_string();
        if file_name.is_empty() {
            return Err(ConfigError::EmptyFileName);
        }
        if bytes.is_empty() {
            return Err(ConfigError::EmptyDocument);
        }
        Ok(Self { file_name, bytes })
    }

    #[must_use]
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl fmt::Debug for SourceDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceDocument")
            .field("file_name", &self.file_name)
            .field("len", &self.bytes.len())
            .finish()
    }
}

//
// ─── VARIANT & REQUESTS ────────────────────────────────────────────────────────
//

/// Which page flow the controller drives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuizVariant {
    /// Upload a document, configure, generate, take the quiz.
    Generated,
    /// Take a published quiz as a named participant and post to its leaderboard.
    Shared { slug: ShareSlug },
}

impl QuizVariant {
    #[must_use]
    pub fn slug(&self) -> Option<&ShareSlug> {
        match self {
            QuizVariant::Generated => None,
            QuizVariant::Shared { slug } => Some(slug),
        }
    }
}

/// Everything the generation service needs, stamped with the issuing generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub generation: Generation,
    pub document: SourceDocument,
    pub config: QuizConfig,
}

/// Topic extraction input, stamped with the issuing generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicsRequest {
    pub generation: Generation,
    pub document: SourceDocument,
}
