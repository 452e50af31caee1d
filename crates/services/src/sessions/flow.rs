use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use tracing::{debug, info, warn};

use quiz_core::model::{Generation, LeaderboardPanel, QuestionSet, ScoreSubmission};
use quiz_core::{Action, NavigationError, Navigator, Outcome, Stage};

use crate::error::{ClientError, FlowError};
use crate::generation::QuizGenerator;
use crate::leaderboard::LeaderboardClient;

//
// ─── APPLY RESULT ──────────────────────────────────────────────────────────────
//

/// Outcome of applying a network response to the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Applied<T> {
    Done(T),
    /// The session was restarted while the request was in flight; the
    /// response was discarded.
    Stale,
}

impl<T> Applied<T> {
    #[must_use]
    pub fn is_stale(&self) -> bool {
        matches!(self, Applied::Stale)
    }

    #[must_use]
    pub fn done(self) -> Option<T> {
        match self {
            Applied::Done(value) => Some(value),
            Applied::Stale => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Applied<U> {
        match self {
            Applied::Done(value) => Applied::Done(f(value)),
            Applied::Stale => Applied::Stale,
        }
    }
}

/// A quiz that was generated and started.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartedQuiz {
    pub question_count: usize,
    pub recommendations: Vec<String>,
}

//
// ─── FLOW ──────────────────────────────────────────────────────────────────────
//

/// Drives a `Navigator` through its network round-trips.
///
/// The navigator is shared behind a mutex that is never held across an
/// `.await`. Each round-trip records the navigator's generation before the
/// request and applies the response only if the generation is unchanged, so a
/// response that arrives after `restart` cannot write into the new session.
#[derive(Clone)]
pub struct QuizFlow {
    navigator: Arc<Mutex<Navigator>>,
    generator: Arc<dyn QuizGenerator>,
    leaderboard: Option<Arc<dyn LeaderboardClient>>,
}

impl QuizFlow {
    #[must_use]
    pub fn new(navigator: Navigator, generator: Arc<dyn QuizGenerator>) -> Self {
        Self {
            navigator: Arc::new(Mutex::new(navigator)),
            generator,
            leaderboard: None,
        }
    }

    #[must_use]
    pub fn with_leaderboard(mut self, leaderboard: Arc<dyn LeaderboardClient>) -> Self {
        self.leaderboard = Some(leaderboard);
        self
    }

    /// Shared handle to the navigator, e.g. for a clock task.
    #[must_use]
    pub fn navigator(&self) -> Arc<Mutex<Navigator>> {
        Arc::clone(&self.navigator)
    }

    /// Run `f` with exclusive access to the navigator.
    ///
    /// A poisoned lock is recovered: every navigator operation leaves it in a
    /// consistent state before returning, panicking or not.
    pub fn with_navigator<R>(&self, f: impl FnOnce(&mut Navigator) -> R) -> R {
        let mut guard = self
            .navigator
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        f(&mut guard)
    }

    #[must_use]
    pub fn stage(&self) -> Stage {
        self.with_navigator(|nav| nav.stage())
    }

    /// Apply a user or clock action.
    ///
    /// # Errors
    ///
    /// Returns the navigator's error; state is unchanged.
    pub fn dispatch(&self, action: Action) -> Result<Outcome, NavigationError> {
        self.with_navigator(|nav| nav.dispatch(action))
    }

    /// Start a shared quiz for a named participant.
    ///
    /// # Errors
    ///
    /// Returns `MissingParticipantName`, `EmptyQuestionSet` or a stage error.
    pub fn start_shared(&self, name: &str, questions: QuestionSet) -> Result<(), NavigationError> {
        self.with_navigator(|nav| {
            nav.set_participant(name)?;
            nav.start(questions)
        })?;
        info!(participant = name.trim(), "shared quiz started");
        Ok(())
    }

    /// Fetch topics for the selected document and offer them.
    ///
    /// Extraction failures are logged and treated as "no topics", which skips
    /// the topic stage. Returns the stage afterwards.
    ///
    /// # Errors
    ///
    /// Returns `FlowError::Navigation` if topics cannot be requested from the
    /// current stage.
    pub async fn load_topics(&self) -> Result<Applied<Stage>, FlowError> {
        let request = self.with_navigator(|nav| nav.topics_request())?;
        let topics = match self.generator.extract_topics(&request).await {
            Ok(topics) => topics,
            Err(err) => {
                warn!(error = %err, "topic extraction failed; continuing without topics");
                Vec::new()
            }
        };
        Ok(self.apply(request.generation, |nav| nav.offer_topics(topics))?)
    }

    /// Generate questions for the configured document and start the quiz.
    ///
    /// # Errors
    ///
    /// Returns `FlowError::Client` when generation fails (the stage is left
    /// unchanged so the user can retry), or `FlowError::Navigation` when the
    /// generated set cannot start a quiz (e.g. it is empty).
    pub async fn generate_and_start(&self) -> Result<Applied<StartedQuiz>, FlowError> {
        let request = self.with_navigator(|nav| nav.generation_request())?;
        let generated = match self.generator.generate(&request).await {
            Ok(generated) => generated,
            Err(err) => {
                if !self.is_current(request.generation) {
                    debug!(generation = %request.generation, "discarding failed stale generation");
                    return Ok(Applied::Stale);
                }
                warn!(error = %err, "quiz generation failed");
                return Err(err.into());
            }
        };

        let question_count = generated.questions.len();
        let applied = self.apply(request.generation, |nav| nav.start(generated.questions))?;
        if !applied.is_stale() {
            info!(questions = question_count, "quiz started");
        }
        Ok(applied.map(|()| StartedQuiz {
            question_count,
            recommendations: generated.recommendations,
        }))
    }

    /// Submit the finished shared quiz and load its leaderboard.
    ///
    /// Both calls are best effort: failures are logged and end up as
    /// `LeaderboardPanel::Unavailable`, while the locally computed result stays
    /// available from the navigator.
    ///
    /// # Errors
    ///
    /// Returns `FlowError::Navigation` if no shared attempt has finished.
    pub async fn publish_result(&self) -> Result<Applied<LeaderboardPanel>, FlowError> {
        let (generation, slug, submission) = self.with_navigator(|nav| {
            let not_ready = NavigationError::InvalidStageTransition {
                stage: nav.stage(),
                action: "publish a score",
            };
            let slug = nav.variant().slug().cloned().ok_or(not_ready.clone())?;
            let summary = nav.result_summary().ok_or(not_ready)?;
            let name = nav
                .participant()
                .ok_or(NavigationError::MissingParticipantName)?;
            let submission = ScoreSubmission::from_result(name, &summary, nav.elapsed_seconds());
            Ok::<_, NavigationError>((nav.generation(), slug, submission))
        })?;

        let panel = match &self.leaderboard {
            None => {
                warn!("no leaderboard client configured");
                LeaderboardPanel::Unavailable(ClientError::Disabled.to_string())
            }
            Some(client) => {
                if let Err(err) = client.submit_score(&slug, &submission).await {
                    warn!(slug = %slug, error = %err, "score submission failed");
                }
                match client.fetch_leaderboard(&slug).await {
                    Ok(entries) => LeaderboardPanel::from_entries(entries),
                    Err(err) => {
                        warn!(slug = %slug, error = %err, "leaderboard fetch failed");
                        LeaderboardPanel::Unavailable(err.to_string())
                    }
                }
            }
        };

        Ok(self.apply(generation, |nav| {
            nav.set_leaderboard(panel.clone()).map(|()| panel)
        })?)
    }

    fn is_current(&self, generation: Generation) -> bool {
        self.with_navigator(|nav| nav.is_current(generation))
    }

    fn apply<T>(
        &self,
        generation: Generation,
        f: impl FnOnce(&mut Navigator) -> Result<T, NavigationError>,
    ) -> Result<Applied<T>, NavigationError> {
        self.with_navigator(|nav| {
            if !nav.is_current(generation) {
                debug!(
                    issued = %generation,
                    current = %nav.generation(),
                    "discarding stale response"
                );
                return Ok(Applied::Stale);
            }
            f(nav).map(Applied::Done)
        })
    }
}

impl fmt::Debug for QuizFlow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuizFlow")
            .field("stage", &self.stage())
            .field("has_leaderboard", &self.leaderboard.is_some())
            .finish_non_exhaustive()
    }
}
