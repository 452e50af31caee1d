use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use quiz_core::model::{ClientSettings, LeaderboardEntry, ScoreSubmission, ShareSlug};

use crate::error::ClientError;
use crate::http::{RawResponse, build_client};

/// Score submission and ranking for shared quizzes.
#[async_trait]
pub trait LeaderboardClient: Send + Sync {
    /// Post a finished participant's result.
    ///
    /// # Errors
    ///
    /// Returns `ClientError` if the request fails or is rejected.
    async fn submit_score(
        &self,
        slug: &ShareSlug,
        submission: &ScoreSubmission,
    ) -> Result<(), ClientError>;

    /// Fetch ranked results, best first.
    ///
    /// # Errors
    ///
    /// Returns `ClientError` if the request fails or the body is not a list of entries.
    async fn fetch_leaderboard(&self, slug: &ShareSlug)
    -> Result<Vec<LeaderboardEntry>, ClientError>;
}

/// reqwest-backed leaderboard client.
#[derive(Clone)]
pub struct HttpLeaderboardClient {
    client: Client,
    settings: ClientSettings,
}

impl HttpLeaderboardClient {
    /// # Errors
    ///
    /// Returns `ClientError::Http` if the HTTP client cannot be built.
    pub fn new(settings: ClientSettings) -> Result<Self, ClientError> {
        Ok(Self {
            client: build_client(&settings)?,
            settings,
        })
    }
}

#[async_trait]
impl LeaderboardClient for HttpLeaderboardClient {
    async fn submit_score(
        &self,
        slug: &ShareSlug,
        submission: &ScoreSubmission,
    ) -> Result<(), ClientError> {
        let url = self.settings.endpoint(&["submit-score", slug.as_str()])?;
        debug!(url = %url, score = submission.score, "submitting score");
        let response = self.client.post(url).json(submission).send().await?;
        RawResponse::read(response).await?.ensure_success()
    }

    async fn fetch_leaderboard(
        &self,
        slug: &ShareSlug,
    ) -> Result<Vec<LeaderboardEntry>, ClientError> {
        let url = self.settings.endpoint(&["leaderboard", slug.as_str()])?;
        debug!(url = %url, "fetching leaderboard");
        let response = self.client.get(url).send().await?;
        RawResponse::read(response).await?.json()
    }
}
