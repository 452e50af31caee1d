use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use reqwest::redirect::Policy;
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;

use quiz_core::model::ClientSettings;

use crate::error::ClientError;

/// Build the shared HTTP client.
///
/// Redirects are not followed: the quiz server answers unauthenticated
/// requests with a redirect to its login page, which must surface as an error.
pub(crate) fn build_client(settings: &ClientSettings) -> Result<Client, ClientError> {
    Ok(Client::builder()
        .timeout(Duration::from_secs(settings.timeout_secs()))
        .redirect(Policy::none())
        .build()?)
}

/// A fully read response, detached from the connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: StatusCode,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

impl RawResponse {
    pub(crate) async fn read(response: Response) -> Result<Self, ClientError> {
        let status = response.status();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let body = response.bytes().await?.to_vec();
        Ok(Self {
            status,
            content_type,
            body,
        })
    }

    #[must_use]
    pub fn is_json(&self) -> bool {
        self.content_type
            .as_deref()
            .is_some_and(|ct| ct.to_ascii_lowercase().contains("application/json"))
    }

    /// Decode a JSON body, classifying redirects, non-JSON and error statuses.
    ///
    /// # Errors
    ///
    /// Returns `AuthenticationRequired` for any redirect, `NotJson` when the
    /// content type is not JSON, `Server` for non-success statuses (using the
    /// body's `error` field when present), or `Decode` for an unexpected shape.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ClientError> {
        if self.status.is_redirection() {
            return Err(ClientError::AuthenticationRequired);
        }
        if !self.is_json() {
            return Err(ClientError::NotJson {
                content_type: self
                    .content_type
                    .clone()
                    .unwrap_or_else(|| "no content type".to_string()),
            });
        }
        if !self.status.is_success() {
            return Err(self.server_error());
        }
        Ok(serde_json::from_slice(&self.body)?)
    }

    /// Accept any success status without inspecting the body.
    ///
    /// # Errors
    ///
    /// Returns `AuthenticationRequired` for redirects or `Server` otherwise.
    pub fn ensure_success(&self) -> Result<(), ClientError> {
        if self.status.is_redirection() {
            return Err(ClientError::AuthenticationRequired);
        }
        if !self.status.is_success() {
            return Err(self.server_error());
        }
        Ok(())
    }

    fn server_error(&self) -> ClientError {
        let message = serde_json::from_slice::<ErrorBody>(&self.body)
            .map(|body| body.error)
            .unwrap_or_else(|_| {
                self.status
                    .canonical_reason()
                    .unwrap_or("unknown server error")
                    .to_string()
            });
        ClientError::Server {
            status: self.status,
            message,
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn raw(status: u16, content_type: Option<&str>, body: &str) -> RawResponse {
        RawResponse {
            status: StatusCode::from_u16(status).unwrap(),
            content_type: content_type.map(str::to_string),
            body: body.as_bytes().to_vec(),
        }
    }

    #[test]
    fn redirect_means_authentication_required() {
        let response = raw(302, Some("text/html"), "");
        assert!(matches!(
            response.json::<serde_json::Value>(),
            Err(ClientError::AuthenticationRequired)
        ));
    }

    #[test]
    fn html_body_is_not_json() {
        let response = raw(200, Some("text/html; charset=utf-8"), "<html></html>");
        match response.json::<serde_json::Value>() {
            Err(ClientError::NotJson { content_type }) => {
                assert_eq!(content_type, "text/html; charset=utf-8");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn missing_content_type_is_not_json() {
        let response = raw(200, None, "{}");
        assert!(matches!(
            response.json::<serde_json::Value>(),
            Err(ClientError::NotJson { .. })
        ));
    }

    #[test]
    fn error_field_becomes_server_message() {
        let response = raw(
            500,
            Some("application/json"),
            r#"{"error":"The AI model failed to generate questions in the correct format."}"#,
        );
        match response.json::<serde_json::Value>() {
            Err(ClientError::Server { status, message }) => {
                assert_eq!(status.as_u16(), 500);
                assert!(message.starts_with("The AI model failed"));
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn success_without_error_field_uses_reason() {
        let response = raw(404, Some("text/plain"), "nope");
        match response.ensure_success() {
            Err(ClientError::Server { message, .. }) => assert_eq!(message, "Not Found"),
            other => panic!("unexpected: {other:?}"),
        }
        assert!(raw(201, None, "").ensure_success().is_ok());
    }
}
