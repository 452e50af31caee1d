use thiserror::Error;
use url::Url;

/// Validated connection settings for the quiz and leaderboard services.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientSettings {
    base_url: String,
    timeout_secs: u64,
}

#[derive(Clone, Debug, Default)]
pub struct ClientSettingsDraft {
    pub base_url: Option<String>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SettingsError {
    #[error("invalid base URL: {0}")]
    InvalidBaseUrl(String),
    #[error("base URL must use http or https")]
    UnsupportedScheme,
    #[error("request timeout must be > 0 seconds")]
    InvalidTimeout,
}

impl ClientSettingsDraft {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and normalize the draft into usable settings.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError` if the base URL is present but invalid, or the
    /// timeout is zero.
    pub fn validate(self) -> Result<ClientSettings, SettingsError> {
        let raw = normalize_optional(self.base_url)
            .unwrap_or_else(|| ClientSettings::DEFAULT_BASE_URL.to_string());
        let parsed = Url::parse(&raw).map_err(|_| SettingsError::InvalidBaseUrl(raw.clone()))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(SettingsError::UnsupportedScheme);
        }
        let base_url = raw.trim_end_matches('/').to_string();

        let timeout_secs = self
            .timeout_secs
            .unwrap_or(ClientSettings::DEFAULT_TIMEOUT_SECS);
        if timeout_secs == 0 {
            return Err(SettingsError::InvalidTimeout);
        }

        Ok(ClientSettings {
            base_url,
            timeout_secs,
        })
    }
}

impl ClientSettings {
    pub const DEFAULT_BASE_URL: &'static str = "http://127.0.0.1:5000";
    pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    #[must_use]
    pub fn timeout_secs(&self) -> u64 {
        self.timeout_secs
    }

    /// Joins path segments onto the base URL, keeping any base path prefix.
    ///
    /// Each segment is percent-encoded, so `?`, `#` and `/` inside a segment
    /// stay part of the path.
    ///
    /// # Errors
    ///
    /// Returns `InvalidBaseUrl` if the base URL cannot carry a path.
    pub fn endpoint(&self, segments: &[&str]) -> Result<Url, SettingsError> {
        let invalid = || SettingsError::InvalidBaseUrl(self.base_url.clone());
        let mut url = Url::parse(&self.base_url).map_err(|_| invalid())?;
        url.path_segments_mut()
            .map_err(|()| invalid())?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            base_url: Self::DEFAULT_BASE_URL.to_string(),
            timeout_secs: Self::DEFAULT_TIMEOUT_SECS,
        }
    }
}

fn normalize_optional(value: Option<String>) -> Option<String> {
    value
        .map(|val| val.trim().to_string())
        .filter(|val| !val.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_draft_uses_defaults() {
        let settings = ClientSettingsDraft {
            base_url: Some("   ".into()),
            timeout_secs: None,
        }
        .validate()
        .unwrap();
        assert_eq!(settings, ClientSettings::default());
        assert_eq!(settings.timeout_secs(), 30);
    }

    #[test]
    fn rejects_bad_urls_and_zero_timeout() {
        let bad = ClientSettingsDraft {
            base_url: Some("not a url".into()),
            ..ClientSettingsDraft::default()
        };
        assert!(matches!(bad.validate(), Err(SettingsError::InvalidBaseUrl(_))));

        let ftp = ClientSettingsDraft {
            base_url: Some("ftp://example.com".into()),
            ..ClientSettingsDraft::default()
        };
        assert_eq!(ftp.validate().unwrap_err(), SettingsError::UnsupportedScheme);

        let zero = ClientSettingsDraft {
            timeout_secs: Some(0),
            ..ClientSettingsDraft::default()
        };
        assert_eq!(zero.validate().unwrap_err(), SettingsError::InvalidTimeout);
    }

    #[test]
    fn endpoint_keeps_base_path() {
        let settings = ClientSettingsDraft {
            base_url: Some("https://quiz.example.com/api/".into()),
            timeout_secs: Some(5),
        }
        .validate()
        .unwrap();
        assert_eq!(
            settings.endpoint(&["leaderboard", "abc"]).unwrap().as_str(),
            "https://quiz.example.com/api/leaderboard/abc"
        );
    }

    #[test]
    fn endpoint_on_bare_host_has_no_double_slash() {
        let settings = ClientSettings::default();
        assert_eq!(
            settings.endpoint(&["generate-quiz"]).unwrap().as_str(),
            "http://127.0.0.1:5000/generate-quiz"
        );
    }

    #[test]
    fn endpoint_escapes_reserved_characters_in_segments() {
        let url = ClientSettings::default()
            .endpoint(&["leaderboard", "team?x=1#frag"])
            .unwrap();
        assert_eq!(url.path(), "/leaderboard/team%3Fx=1%23frag");
        assert_eq!(url.query(), None);
        assert_eq!(url.fragment(), None);

        let nested = ClientSettings::default()
            .endpoint(&["submit-score", "a/b"])
            .unwrap();
        assert_eq!(nested.path(), "/submit-score/a%2Fb");
    }
}
