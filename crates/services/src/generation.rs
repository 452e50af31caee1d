use async_trait::async_trait;
use reqwest::Client;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info};

use quiz_core::model::{
    ClientSettings, GenerationRequest, QuestionDraft, QuestionSet, SourceDocument, TopicsRequest,
};

use crate::error::ClientError;
use crate::http::{RawResponse, build_client};

/// Questions returned by the generation service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedQuiz {
    pub questions: QuestionSet,
    pub recommendations: Vec<String>,
}

/// Turns a document into questions (and optionally offers topics first).
#[async_trait]
pub trait QuizGenerator: Send + Sync {
    /// Generate a question set for the request.
    ///
    /// # Errors
    ///
    /// Returns `ClientError` for transport failures, redirects, non-JSON or
    /// error responses, and malformed question records.
    async fn generate(&self, request: &GenerationRequest) -> Result<GeneratedQuiz, ClientError>;

    /// List topics found in the document. An empty list skips topic selection.
    ///
    /// # Errors
    ///
    /// Returns `ClientError` when the topics cannot be fetched.
    async fn extract_topics(&self, request: &TopicsRequest) -> Result<Vec<String>, ClientError>;
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum GenerationBody {
    Wrapped {
        questions: Vec<QuestionDraft>,
        #[serde(default)]
        recommendations: Vec<Value>,
    },
    Bare(Vec<QuestionDraft>),
}

#[derive(Debug, Deserialize)]
struct TopicsBody {
    #[serde(default)]
    topics: Vec<String>,
}

/// Decode a generation response into a validated question set.
///
/// Accepts `{ "questions": [...], "recommendations": [...] }` as well as a bare
/// array of questions.
///
/// # Errors
///
/// See `RawResponse::json`; additionally `MalformedQuestions` when a record
/// fails validation.
pub fn decode_generation(raw: &RawResponse) -> Result<GeneratedQuiz, ClientError> {
    let (drafts, recommendations) = match raw.json::<GenerationBody>()? {
        GenerationBody::Wrapped {
            questions,
            recommendations,
        } => (questions, recommendations),
        GenerationBody::Bare(questions) => (questions, Vec::new()),
    };
    let questions = QuestionSet::from_drafts(drafts)?;
    let recommendations = recommendations
        .into_iter()
        .map(|value| match value {
            Value::String(text) => text,
            other => other.to_string(),
        })
        .collect();
    Ok(GeneratedQuiz {
        questions,
        recommendations,
    })
}

/// reqwest-backed generation client.
#[derive(Clone)]
pub struct HttpQuizGenerator {
    client: Client,
    settings: ClientSettings,
}

impl HttpQuizGenerator {
    /// # Errors
    ///
    /// Returns `ClientError::Http` if the HTTP client cannot be built.
    pub fn new(settings: ClientSettings) -> Result<Self, ClientError> {
        Ok(Self {
            client: build_client(&settings)?,
            settings,
        })
    }

    fn document_part(document: &SourceDocument) -> Result<Part, ClientError> {
        Ok(Part::bytes(document.bytes().to_vec())
            .file_name(document.file_name().to_string())
            .mime_str("application/pdf")?)
    }
}

#[async_trait]
impl QuizGenerator for HttpQuizGenerator {
    async fn generate(&self, request: &GenerationRequest) -> Result<GeneratedQuiz, ClientError> {
        let url = self.settings.endpoint(&["generate-quiz"])?;
        let config = &request.config;
        let mut form = Form::new()
            .part("file", Self::document_part(&request.document)?)
            .text("num_questions", config.num_questions().to_string())
            .text("difficulty", config.difficulty().as_str());
        if !config.topics().is_empty() {
            form = form.text("topics", config.topics().join(","));
        }

        info!(
            url = %url,
            document = request.document.file_name(),
            num_questions = config.num_questions(),
            difficulty = %config.difficulty(),
            "requesting quiz generation"
        );
        let response = self.client.post(url).multipart(form).send().await?;
        let raw = RawResponse::read(response).await?;
        let generated = decode_generation(&raw)?;
        debug!(questions = generated.questions.len(), "quiz generated");
        Ok(generated)
    }

    async fn extract_topics(&self, request: &TopicsRequest) -> Result<Vec<String>, ClientError> {
        let url = self.settings.endpoint(&["extract-topics"])?;
        let form = Form::new().part("file", Self::document_part(&request.document)?);

        debug!(url = %url, document = request.document.file_name(), "requesting topics");
        let response = self.client.post(url).multipart(form).send().await?;
        let body: TopicsBody = RawResponse::read(response).await?.json()?;
        Ok(body.topics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::tests::raw;

    const ONE_QUESTION: &str = r#"{"question":"Capital of France?","options":["London","Berlin","Paris","Madrid"],"answer":"Paris","explanation":"Paris is the capital."}"#;

    #[test]
    fn decodes_wrapped_body_with_recommendations() {
        let body = format!(
            r#"{{"questions":[{ONE_QUESTION}],"recommendations":["Revise geography",{{"topic":"maps"}}]}}"#
        );
        let generated = decode_generation(&raw(200, Some("application/json"), &body)).unwrap();
        assert_eq!(generated.questions.len(), 1);
        assert_eq!(
            generated.recommendations,
            vec![
                "Revise geography".to_string(),
                r#"{"topic":"maps"}"#.to_string()
            ]
        );
    }

    #[test]
    fn decodes_bare_array() {
        let body = format!("[{ONE_QUESTION},{ONE_QUESTION}]");
        let generated = decode_generation(&raw(200, Some("application/json"), &body)).unwrap();
        assert_eq!(generated.questions.len(), 2);
        assert!(generated.recommendations.is_empty());
    }

    #[test]
    fn malformed_question_is_rejected_with_index() {
        let body = r#"{"questions":[{"question":"Q","options":["a","b"],"answer":"c"}]}"#;
        match decode_generation(&raw(200, Some("application/json"), body)) {
            Err(ClientError::MalformedQuestions(err)) => assert_eq!(err.index, 0),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn empty_question_list_decodes() {
        let generated =
            decode_generation(&raw(200, Some("application/json"), r#"{"questions":[]}"#)).unwrap();
        assert!(generated.questions.is_empty());
    }
}
