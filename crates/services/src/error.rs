//! Shared error types for the services crate.

use thiserror::Error;

use quiz_core::NavigationError;
use quiz_core::model::{QuestionSetError, SettingsError};

/// Errors emitted by the generation and leaderboard clients.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ClientError {
    #[error("the server redirected the request; sign in and try again")]
    AuthenticationRequired,
    #[error("expected a JSON response, got {content_type}")]
    NotJson { content_type: String },
    #[error("request failed with status {status}: {message}")]
    Server {
        status: reqwest::StatusCode,
        message: String,
    },
    #[error("invalid response body: {0}")]
    Decode(#[from] serde_json::Error),
    #[error(transparent)]
    MalformedQuestions(#[from] QuestionSetError),
    #[error("leaderboard is not configured")]
    Disabled,
    #[error(transparent)]
    Settings(#[from] SettingsError),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

/// Errors emitted by `QuizFlow`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum FlowError {
    #[error(transparent)]
    Navigation(#[from] NavigationError),
    #[error(transparent)]
    Client(#[from] ClientError),
}

impl FlowError {
    /// True when the stage was left unchanged and the same request can be
    /// sent again: any client failure, or a generated set with no questions.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            FlowError::Client(_) | FlowError::Navigation(NavigationError::EmptyQuestionSet)
        )
    }
}

/// Errors emitted while exporting a question set.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ExportError {
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("export produced invalid UTF-8")]
    Utf8(#[from] std::string::FromUtf8Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::Stage;

    #[test]
    fn client_failures_and_empty_sets_are_retryable() {
        let not_json = FlowError::from(ClientError::NotJson {
            content_type: "text/html".into(),
        });
        assert!(not_json.is_retryable());
        assert!(FlowError::from(NavigationError::EmptyQuestionSet).is_retryable());
    }

    #[test]
    fn stage_errors_are_not_retryable() {
        let err = FlowError::from(NavigationError::InvalidStageTransition {
            stage: Stage::Quiz,
            action: "generate a quiz",
        });
        assert!(!err.is_retryable());
        assert!(!FlowError::from(NavigationError::MissingDocument).is_retryable());
    }
}
