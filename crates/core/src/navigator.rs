use std::fmt;

use thiserror::Error;

use crate::model::{
    AnswerLedger, Flashcard, Generation, GenerationRequest, LeaderboardPanel, Question,
    QuestionSet, QuizConfig, QuizVariant, ReviewItem, SourceDocument, TopicsRequest,
};
use crate::scoring::{ResultSummary, score};
use crate::time::SessionClock;

//
// ─── STAGES ────────────────────────────────────────────────────────────────────
//

/// Named phases of the quiz wizard, in forward order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Upload,
    Configure,
    Topics,
    Quiz,
    Results,
    Review,
    Flashcards,
}

impl Stage {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Stage::Upload => "upload",
            Stage::Configure => "configure",
            Stage::Topics => "topics",
            Stage::Quiz => "quiz",
            Stage::Results => "results",
            Stage::Review => "review",
            Stage::Flashcards => "flashcards",
        }
    }

    /// True for the stages that show a finished attempt.
    #[must_use]
    pub fn is_post_quiz(self) -> bool {
        matches!(self, Stage::Results | Stage::Review | Stage::Flashcards)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum NavigationError {
    #[error("cannot {action} from the {stage} stage")]
    InvalidStageTransition { stage: Stage, action: &'static str },

    #[error("the question set is empty")]
    EmptyQuestionSet,

    #[error("please select an answer")]
    AnswerRequired,

    #[error("please enter your name")]
    MissingParticipantName,

    #[error("please select a document first")]
    MissingDocument,

    #[error("question {index} is out of range (quiz has {len} questions)")]
    QuestionOutOfRange { index: usize, len: usize },

    #[error("\"{option}\" is not an option for question {index}")]
    UnknownOption { index: usize, option: String },

    #[error("topic \"{0}\" was not offered")]
    UnknownTopic(String),

    #[error("already at the first item")]
    CursorAtStart,

    #[error("already at the last item")]
    CursorAtEnd,
}

impl NavigationError {
    /// Validation errors meant to be shown inline; the state did not change.
    #[must_use]
    pub fn is_user_input(&self) -> bool {
        matches!(
            self,
            NavigationError::AnswerRequired
                | NavigationError::MissingParticipantName
                | NavigationError::MissingDocument
        )
    }
}

//
// ─── ACTIONS ───────────────────────────────────────────────────────────────────
//

/// Logical user (or clock) actions accepted by `Navigator::dispatch`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    SelectOption { index: usize, option: String },
    Advance,
    Retreat,
    Restart,
    OpenReview,
    OpenFlashcards,
    BackToResults,
    ReviewNext,
    ReviewPrev,
    CardNext,
    CardPrev,
    FlipCard,
    Tick,
}

/// Result of a dispatched action.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Recorded { index: usize },
    Cursor(usize),
    Finished(ResultSummary),
    Entered(Stage),
    Flipped(bool),
    Elapsed(u64),
}

/// Result of `Navigator::advance`.
#[derive(Debug, Clone, PartialEq)]
pub enum Advance {
    Moved(usize),
    Finished(ResultSummary),
}

/// Position within the running quiz.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuizProgress {
    pub cursor: usize,
    pub total: usize,
    pub answered: usize,
}

impl QuizProgress {
    #[must_use]
    pub fn is_last(&self) -> bool {
        self.cursor + 1 == self.total
    }
}

impl fmt::Display for QuizProgress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Question {} of {}", self.cursor + 1, self.total)
    }
}

//
// ─── SESSION DATA ──────────────────────────────────────────────────────────────
//

/// Data owned by one attempt; dropped as a whole on restart.
#[derive(Debug, Clone)]
struct ActiveSession {
    questions: QuestionSet,
    ledger: AnswerLedger,
    clock: SessionClock,
    question_cursor: usize,
    review_cursor: usize,
    card_cursor: usize,
    card_flipped: bool,
    leaderboard: Option<LeaderboardPanel>,
}

impl ActiveSession {
    fn new(questions: QuestionSet) -> Self {
        let mut clock = SessionClock::new();
        clock.start();
        Self {
            ledger: AnswerLedger::new(questions.len()),
            questions,
            clock,
            question_cursor: 0,
            review_cursor: 0,
            card_cursor: 0,
            card_flipped: false,
            leaderboard: None,
        }
    }

    fn last_index(&self) -> usize {
        self.questions.len().saturating_sub(1)
    }
}

//
// ─── NAVIGATOR ─────────────────────────────────────────────────────────────────
//

/// The quiz session state machine.
///
/// Owns the question set and answer ledger once a quiz starts and sequences the
/// stages `Upload → Configure → Topics → Quiz → Results → {Review, Flashcards}`.
/// Topics is skipped when no topics are offered. The only backward edges are
/// Review/Flashcards back to Results, and `restart`, which discards the session
/// and returns to the entry stage.
#[derive(Debug, Clone)]
pub struct Navigator {
    variant: QuizVariant,
    stage: Stage,
    generation: Generation,
    document: Option<SourceDocument>,
    config: QuizConfig,
    offered_topics: Vec<String>,
    participant: Option<String>,
    session: Option<ActiveSession>,
}

impl Navigator {
    #[must_use]
    pub fn new(variant: QuizVariant) -> Self {
        let stage = entry_stage(&variant);
        Self {
            variant,
            stage,
            generation: Generation::default(),
            document: None,
            config: QuizConfig::default(),
            offered_topics: Vec::new(),
            participant: None,
            session: None,
        }
    }

    /// Upload-wizard navigator, starting at `Upload`.
    #[must_use]
    pub fn generated() -> Self {
        Self::new(QuizVariant::Generated)
    }

    /// Shared-link navigator. There is no upload step, so it starts at `Configure`.
    #[must_use]
    pub fn shared(slug: crate::model::ShareSlug) -> Self {
        Self::new(QuizVariant::Shared { slug })
    }

    // ─── Queries ──────────────────────────────────────────────────────────────

    #[must_use]
    pub fn stage(&self) -> Stage {
        self.stage
    }

    #[must_use]
    pub fn variant(&self) -> &QuizVariant {
        &self.variant
    }

    #[must_use]
    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// True if a response issued under `generation` may still be applied.
    #[must_use]
    pub fn is_current(&self, generation: Generation) -> bool {
        self.generation == generation
    }

    #[must_use]
    pub fn document(&self) -> Option<&SourceDocument> {
        self.document.as_ref()
    }

    #[must_use]
    pub fn config(&self) -> &QuizConfig {
        &self.config
    }

    #[must_use]
    pub fn offered_topics(&self) -> &[String] {
        &self.offered_topics
    }

    #[must_use]
    pub fn participant(&self) -> Option<&str> {
        self.participant.as_deref()
    }

    #[must_use]
    pub fn question_set(&self) -> Option<&QuestionSet> {
        self.session.as_ref().map(|s| &s.questions)
    }

    #[must_use]
    pub fn ledger(&self) -> Option<&AnswerLedger> {
        self.session.as_ref().map(|s| &s.ledger)
    }

    #[must_use]
    pub fn elapsed_seconds(&self) -> u64 {
        self.session
            .as_ref()
            .map_or(0, |s| s.clock.elapsed_seconds())
    }

    #[must_use]
    pub fn clock(&self) -> Option<&SessionClock> {
        self.session.as_ref().map(|s| &s.clock)
    }

    /// Current question cursor; only meaningful during the quiz.
    #[must_use]
    pub fn question_cursor(&self) -> Option<usize> {
        self.quiz_session().map(|s| s.question_cursor)
    }

    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        self.quiz_session()
            .and_then(|s| s.questions.get(s.question_cursor))
    }

    /// The option already recorded for the current question, if any.
    #[must_use]
    pub fn current_selection(&self) -> Option<&str> {
        self.quiz_session()
            .and_then(|s| s.ledger.get(s.question_cursor))
    }

    #[must_use]
    pub fn progress(&self) -> Option<QuizProgress> {
        self.quiz_session().map(|s| QuizProgress {
            cursor: s.question_cursor,
            total: s.questions.len(),
            answered: s.ledger.answered_count(),
        })
    }

    /// Scores the attempt. Recomputed on every call; `None` before results.
    #[must_use]
    pub fn result_summary(&self) -> Option<ResultSummary> {
        self.finished_session()
            .map(|s| score(&s.questions, &s.ledger))
    }

    /// Per-question review rows; empty before results.
    #[must_use]
    pub fn review_items(&self) -> Vec<ReviewItem> {
        let Some(session) = self.finished_session() else {
            return Vec::new();
        };
        (0..session.questions.len())
            .filter_map(|index| review_item(session, index))
            .collect()
    }

    #[must_use]
    pub fn review_cursor(&self) -> Option<usize> {
        (self.stage == Stage::Review)
            .then(|| self.session.as_ref().map(|s| s.review_cursor))
            .flatten()
    }

    #[must_use]
    pub fn current_review_item(&self) -> Option<ReviewItem> {
        if self.stage != Stage::Review {
            return None;
        }
        self.session
            .as_ref()
            .and_then(|s| review_item(s, s.review_cursor))
    }

    #[must_use]
    pub fn card_cursor(&self) -> Option<usize> {
        (self.stage == Stage::Flashcards)
            .then(|| self.session.as_ref().map(|s| s.card_cursor))
            .flatten()
    }

    #[must_use]
    pub fn current_flashcard(&self) -> Option<Flashcard> {
        if self.stage != Stage::Flashcards {
            return None;
        }
        let session = self.session.as_ref()?;
        let question = session.questions.get(session.card_cursor)?;
        Some(Flashcard::from_question(
            session.card_cursor,
            session.questions.len(),
            question,
            session.card_flipped,
        ))
    }

    #[must_use]
    pub fn leaderboard(&self) -> Option<&LeaderboardPanel> {
        self.finished_session()
            .and_then(|s| s.leaderboard.as_ref())
    }

    // ─── Pre-quiz stages ──────────────────────────────────────────────────────

    /// Accept the uploaded document and move to configuration.
    ///
    /// # Errors
    ///
    /// Returns `InvalidStageTransition` outside the `Upload` stage.
    pub fn select_document(&mut self, document: SourceDocument) -> Result<(), NavigationError> {
        self.require(&[Stage::Upload], "select a document")?;
        self.document = Some(document);
        self.stage = Stage::Configure;
        Ok(())
    }

    /// Store generation parameters. Already chosen topics are kept.
    ///
    /// # Errors
    ///
    /// Returns `InvalidStageTransition` outside `Configure`/`Topics`.
    pub fn configure(&mut self, config: QuizConfig) -> Result<(), NavigationError> {
        self.require(&[Stage::Configure, Stage::Topics], "configure the quiz")?;
        let topics = self.config.topics().to_vec();
        self.config = config;
        self.config.clear_topics();
        for topic in &topics {
            self.config.toggle_topic(topic);
        }
        Ok(())
    }

    /// Offer extracted topics. An empty list skips the `Topics` stage.
    ///
    /// Returns the stage the navigator is in afterwards.
    ///
    /// # Errors
    ///
    /// Returns `InvalidStageTransition` outside `Configure`.
    pub fn offer_topics(&mut self, topics: Vec<String>) -> Result<Stage, NavigationError> {
        self.require(&[Stage::Configure], "offer topics")?;
        let mut cleaned: Vec<String> = Vec::with_capacity(topics.len());
        for topic in topics {
            let topic = topic.trim();
            if !topic.is_empty() && !cleaned.iter().any(|t| t == topic) {
                cleaned.push(topic.to_string());
            }
        }
        if !cleaned.is_empty() {
            self.offered_topics = cleaned;
            self.stage = Stage::Topics;
        }
        Ok(self.stage)
    }

    /// Select or deselect an offered topic. Returns true if now selected.
    ///
    /// # Errors
    ///
    /// Returns `InvalidStageTransition` outside `Topics`, or `UnknownTopic`.
    pub fn toggle_topic(&mut self, topic: &str) -> Result<bool, NavigationError> {
        self.require(&[Stage::Topics], "choose topics")?;
        if !self.offered_topics.iter().any(|t| t == topic) {
            return Err(NavigationError::UnknownTopic(topic.to_string()));
        }
        Ok(self.config.toggle_topic(topic))
    }

    /// Record the participant name for a shared quiz.
    ///
    /// # Errors
    ///
    /// Returns `MissingParticipantName` for a blank name, or
    /// `InvalidStageTransition` outside the shared variant's `Configure` stage.
    pub fn set_participant(&mut self, name: &str) -> Result<(), NavigationError> {
        if !matches!(self.variant, QuizVariant::Shared { .. }) {
            return Err(NavigationError::InvalidStageTransition {
                stage: self.stage,
                action: "set a participant name",
            });
        }
        self.require(&[Stage::Configure], "set a participant name")?;
        let name = name.trim();
        if name.is_empty() {
            return Err(NavigationError::MissingParticipantName);
        }
        self.participant = Some(name.to_string());
        Ok(())
    }

    /// Build the topic extraction request for the selected document.
    ///
    /// # Errors
    ///
    /// Returns `InvalidStageTransition` outside `Configure`, or `MissingDocument`.
    pub fn topics_request(&self) -> Result<TopicsRequest, NavigationError> {
        self.require(&[Stage::Configure], "extract topics")?;
        let document = self.document.clone().ok_or(NavigationError::MissingDocument)?;
        Ok(TopicsRequest {
            generation: self.generation,
            document,
        })
    }

    /// Build the generation request for the selected document and config.
    ///
    /// # Errors
    ///
    /// Returns `InvalidStageTransition` outside `Configure`/`Topics`, or
    /// `MissingDocument`.
    pub fn generation_request(&self) -> Result<GenerationRequest, NavigationError> {
        self.require(&[Stage::Configure, Stage::Topics], "generate a quiz")?;
        let document = self.document.clone().ok_or(NavigationError::MissingDocument)?;
        Ok(GenerationRequest {
            generation: self.generation,
            document,
            config: self.config.clone(),
        })
    }

    // ─── Quiz ─────────────────────────────────────────────────────────────────

    /// Begin the quiz with a fresh ledger and clock.
    ///
    /// # Errors
    ///
    /// Returns `EmptyQuestionSet` for an empty set, `InvalidStageTransition`
    /// outside `Configure`/`Topics`, or `MissingParticipantName` for a shared
    /// quiz without a name. The stage is unchanged on error.
    pub fn start(&mut self, questions: QuestionSet) -> Result<(), NavigationError> {
        if questions.is_empty() {
            return Err(NavigationError::EmptyQuestionSet);
        }
        self.require(&[Stage::Configure, Stage::Topics], "start the quiz")?;
        if matches!(self.variant, QuizVariant::Shared { .. }) && self.participant.is_none() {
            return Err(NavigationError::MissingParticipantName);
        }

        self.session = Some(ActiveSession::new(questions));
        self.generation = self.generation.next();
        self.stage = Stage::Quiz;
        Ok(())
    }

    /// Record `option` as the answer to question `index`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidStageTransition` outside `Quiz`, `QuestionOutOfRange`, or
    /// `UnknownOption` if `option` does not belong to the question.
    pub fn select_option(
        &mut self,
        index: usize,
        option: impl Into<String>,
    ) -> Result<(), NavigationError> {
        self.require(&[Stage::Quiz], "select an option")?;
        let session = self.session_mut("select an option")?;
        let len = session.questions.len();
        let question = session
            .questions
            .get(index)
            .ok_or(NavigationError::QuestionOutOfRange { index, len })?;
        let option = option.into();
        if !question.has_option(&option) {
            return Err(NavigationError::UnknownOption { index, option });
        }
        session
            .ledger
            .set(index, option)
            .map_err(|_| NavigationError::QuestionOutOfRange { index, len })
    }

    /// Record `option` for the question under the cursor.
    ///
    /// # Errors
    ///
    /// See `select_option`.
    pub fn select_current(&mut self, option: impl Into<String>) -> Result<usize, NavigationError> {
        let index = self
            .question_cursor()
            .ok_or(NavigationError::InvalidStageTransition {
                stage: self.stage,
                action: "select an option",
            })?;
        self.select_option(index, option)?;
        Ok(index)
    }

    /// Move to the next question, or finish on the last one.
    ///
    /// # Errors
    ///
    /// Returns `AnswerRequired` (no state change) when the current question is
    /// unanswered, or `InvalidStageTransition` outside `Quiz`.
    pub fn advance(&mut self) -> Result<Advance, NavigationError> {
        self.require(&[Stage::Quiz], "advance")?;
        let session = self.session_mut("advance")?;
        if session.ledger.get(session.question_cursor).is_none() {
            return Err(NavigationError::AnswerRequired);
        }

        if session.question_cursor >= session.last_index() {
            session.clock.stop();
            let summary = score(&session.questions, &session.ledger);
            self.stage = Stage::Results;
            return Ok(Advance::Finished(summary));
        }

        session.question_cursor += 1;
        Ok(Advance::Moved(session.question_cursor))
    }

    /// Go back one question. The answer just left behind is kept.
    ///
    /// # Errors
    ///
    /// Returns `CursorAtStart` on the first question, or
    /// `InvalidStageTransition` outside `Quiz`.
    pub fn retreat(&mut self) -> Result<usize, NavigationError> {
        self.require(&[Stage::Quiz], "go back")?;
        let session = self.session_mut("go back")?;
        if session.question_cursor == 0 {
            return Err(NavigationError::CursorAtStart);
        }
        session.question_cursor -= 1;
        Ok(session.question_cursor)
    }

    /// Advance the session clock by one second (counts only during the quiz).
    pub fn tick(&mut self) -> u64 {
        match self.session.as_mut() {
            Some(session) => {
                session.clock.tick();
                session.clock.elapsed_seconds()
            }
            None => 0,
        }
    }

    /// Discard all session data and return to the entry stage.
    ///
    /// Abandoning a running quiz goes through here as well. Returns the stage
    /// entered.
    ///
    /// # Errors
    ///
    /// Returns `InvalidStageTransition` when already at the entry stage.
    pub fn restart(&mut self) -> Result<Stage, NavigationError> {
        let entry = entry_stage(&self.variant);
        if self.stage == entry {
            return Err(NavigationError::InvalidStageTransition {
                stage: self.stage,
                action: "restart",
            });
        }

        if let Some(session) = self.session.as_mut() {
            session.clock.stop();
        }
        self.session = None;
        self.document = None;
        self.config = QuizConfig::default();
        self.offered_topics.clear();
        self.participant = None;
        self.generation = self.generation.next();
        self.stage = entry;
        Ok(entry)
    }

    // ─── Results, review and flashcards ───────────────────────────────────────

    /// Store the leaderboard panel for the finished attempt.
    ///
    /// # Errors
    ///
    /// Returns `InvalidStageTransition` unless an attempt has finished.
    pub fn set_leaderboard(&mut self, panel: LeaderboardPanel) -> Result<(), NavigationError> {
        self.require(
            &[Stage::Results, Stage::Review, Stage::Flashcards],
            "show the leaderboard",
        )?;
        self.session_mut("show the leaderboard")?.leaderboard = Some(panel);
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `InvalidStageTransition` outside `Results`.
    pub fn open_review(&mut self) -> Result<(), NavigationError> {
        self.require(&[Stage::Results], "open the review")?;
        self.session_mut("open the review")?.review_cursor = 0;
        self.stage = Stage::Review;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `InvalidStageTransition` outside `Results`.
    pub fn open_flashcards(&mut self) -> Result<(), NavigationError> {
        self.require(&[Stage::Results], "open flashcards")?;
        let session = self.session_mut("open flashcards")?;
        session.card_cursor = 0;
        session.card_flipped = false;
        self.stage = Stage::Flashcards;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `InvalidStageTransition` outside `Review`/`Flashcards`.
    pub fn back_to_results(&mut self) -> Result<(), NavigationError> {
        self.require(&[Stage::Review, Stage::Flashcards], "return to results")?;
        self.stage = Stage::Results;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `CursorAtEnd` on the last item, or `InvalidStageTransition`.
    pub fn review_next(&mut self) -> Result<usize, NavigationError> {
        self.require(&[Stage::Review], "move through the review")?;
        let session = self.session_mut("move through the review")?;
        session.review_cursor = step_forward(session.review_cursor, session.last_index())?;
        Ok(session.review_cursor)
    }

    /// # Errors
    ///
    /// Returns `CursorAtStart` on the first item, or `InvalidStageTransition`.
    pub fn review_prev(&mut self) -> Result<usize, NavigationError> {
        self.require(&[Stage::Review], "move through the review")?;
        let session = self.session_mut("move through the review")?;
        session.review_cursor = step_back(session.review_cursor)?;
        Ok(session.review_cursor)
    }

    /// Next flashcard, shown front side up.
    ///
    /// # Errors
    ///
    /// Returns `CursorAtEnd` on the last card, or `InvalidStageTransition`.
    pub fn card_next(&mut self) -> Result<usize, NavigationError> {
        self.require(&[Stage::Flashcards], "move through flashcards")?;
        let session = self.session_mut("move through flashcards")?;
        session.card_cursor = step_forward(session.card_cursor, session.last_index())?;
        session.card_flipped = false;
        Ok(session.card_cursor)
    }

    /// Previous flashcard, shown front side up.
    ///
    /// # Errors
    ///
    /// Returns `CursorAtStart` on the first card, or `InvalidStageTransition`.
    pub fn card_prev(&mut self) -> Result<usize, NavigationError> {
        self.require(&[Stage::Flashcards], "move through flashcards")?;
        let session = self.session_mut("move through flashcards")?;
        session.card_cursor = step_back(session.card_cursor)?;
        session.card_flipped = false;
        Ok(session.card_cursor)
    }

    /// Turn the current flashcard over. Returns true if the back is showing.
    ///
    /// # Errors
    ///
    /// Returns `InvalidStageTransition` outside `Flashcards`.
    pub fn flip_card(&mut self) -> Result<bool, NavigationError> {
        self.require(&[Stage::Flashcards], "flip a card")?;
        let session = self.session_mut("flip a card")?;
        session.card_flipped = !session.card_flipped;
        Ok(session.card_flipped)
    }

    // ─── Dispatch ─────────────────────────────────────────────────────────────

    /// Apply a logical action.
    ///
    /// # Errors
    ///
    /// Propagates the error of the underlying operation; state is unchanged.
    pub fn dispatch(&mut self, action: Action) -> Result<Outcome, NavigationError> {
        match action {
            Action::SelectOption { index, option } => {
                self.select_option(index, option)?;
                Ok(Outcome::Recorded { index })
            }
            Action::Advance => Ok(match self.advance()? {
                Advance::Moved(cursor) => Outcome::Cursor(cursor),
                Advance::Finished(summary) => Outcome::Finished(summary),
            }),
            Action::Retreat => self.retreat().map(Outcome::Cursor),
            Action::Restart => self.restart().map(Outcome::Entered),
            Action::OpenReview => {
                self.open_review()?;
                Ok(Outcome::Entered(Stage::Review))
            }
            Action::OpenFlashcards => {
                self.open_flashcards()?;
                Ok(Outcome::Entered(Stage::Flashcards))
            }
            Action::BackToResults => {
                self.back_to_results()?;
                Ok(Outcome::Entered(Stage::Results))
            }
            Action::ReviewNext => self.review_next().map(Outcome::Cursor),
            Action::ReviewPrev => self.review_prev().map(Outcome::Cursor),
            Action::CardNext => self.card_next().map(Outcome::Cursor),
            Action::CardPrev => self.card_prev().map(Outcome::Cursor),
            Action::FlipCard => self.flip_card().map(Outcome::Flipped),
            Action::Tick => Ok(Outcome::Elapsed(self.tick())),
        }
    }

    // ─── Helpers ──────────────────────────────────────────────────────────────

    fn require(&self, allowed: &[Stage], action: &'static str) -> Result<(), NavigationError> {
        if allowed.contains(&self.stage) {
            Ok(())
        } else {
            Err(NavigationError::InvalidStageTransition {
                stage: self.stage,
                action,
            })
        }
    }

    fn session_mut(&mut self, action: &'static str) -> Result<&mut ActiveSession, NavigationError> {
        let stage = self.stage;
        self.session
            .as_mut()
            .ok_or(NavigationError::InvalidStageTransition { stage, action })
    }

    fn quiz_session(&self) -> Option<&ActiveSession> {
        if self.stage == Stage::Quiz {
            self.session.as_ref()
        } else {
            None
        }
    }

    fn finished_session(&self) -> Option<&ActiveSession> {
        if self.stage.is_post_quiz() {
            self.session.as_ref()
        } else {
            None
        }
    }
}

fn entry_stage(variant: &QuizVariant) -> Stage {
    match variant {
        QuizVariant::Generated => Stage::Upload,
        QuizVariant::Shared { .. } => Stage::Configure,
    }
}

fn step_forward(cursor: usize, last: usize) -> Result<usize, NavigationError> {
    if cursor >= last {
        Err(NavigationError::CursorAtEnd)
    } else {
        Ok(cursor + 1)
    }
}

fn step_back(cursor: usize) -> Result<usize, NavigationError> {
    cursor.checked_sub(1).ok_or(NavigationError::CursorAtStart)
}

fn review_item(session: &ActiveSession, index: usize) -> Option<ReviewItem> {
    let question = session.questions.get(index)?;
    let selected = session.ledger.get(index).map(str::to_string);
    let is_correct = selected
        .as_deref()
        .is_some_and(|s| question.is_correct(s));
    Some(ReviewItem {
        index,
        question: question.clone(),
        selected,
        is_correct,
    })
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{QuestionDraft, ShareSlug};

    fn questions(correct: &[&str]) -> QuestionSet {
        let drafts = correct
            .iter()
            .enumerate()
            .map(|(i, answer)| QuestionDraft {
                question: format!("Question {i}"),
                options: vec!["A".into(), "B".into(), "C".into(), "X".into()],
                answer: (*answer).to_string(),
                explanation: (i % 2 == 0).then(|| format!("Because {answer}.")),
            })
            .collect();
        QuestionSet::from_drafts(drafts).unwrap()
    }

    fn document() -> SourceDocument {
        SourceDocument::new("notes.pdf", b"%PDF-1.7".to_vec()).unwrap()
    }

    fn configured() -> Navigator {
        let mut nav = Navigator::generated();
        nav.select_document(document()).unwrap();
        nav
    }

    fn in_quiz(correct: &[&str]) -> Navigator {
        let mut nav = configured();
        nav.start(questions(correct)).unwrap();
        nav
    }

    fn finished(correct: &[&str], picks: &[&str]) -> Navigator {
        let mut nav = in_quiz(correct);
        for pick in picks {
            nav.select_current(*pick).unwrap();
            nav.advance().unwrap();
        }
        assert_eq!(nav.stage(), Stage::Results);
        nav
    }

    #[test]
    fn start_rejects_empty_question_set() {
        let mut nav = configured();
        let err = nav.start(QuestionSet::default()).unwrap_err();
        assert_eq!(err, NavigationError::EmptyQuestionSet);
        assert_eq!(nav.stage(), Stage::Configure);

        let mut fresh = Navigator::generated();
        assert_eq!(
            fresh.start(QuestionSet::default()).unwrap_err(),
            NavigationError::EmptyQuestionSet
        );
        assert_eq!(fresh.stage(), Stage::Upload);
    }

    #[test]
    fn start_from_upload_is_an_invalid_transition() {
        let mut nav = Navigator::generated();
        let err = nav.start(questions(&["A"])).unwrap_err();
        assert!(matches!(
            err,
            NavigationError::InvalidStageTransition {
                stage: Stage::Upload,
                ..
            }
        ));
    }

    #[test]
    fn start_initializes_ledger_clock_and_cursor() {
        let nav = in_quiz(&["A", "B"]);
        assert_eq!(nav.stage(), Stage::Quiz);
        assert_eq!(nav.question_cursor(), Some(0));
        assert_eq!(nav.ledger().unwrap().len(), 2);
        assert_eq!(nav.ledger().unwrap().answered_count(), 0);
        assert!(nav.clock().unwrap().is_running());
        assert_eq!(nav.progress().unwrap().to_string(), "Question 1 of 2");
    }

    #[test]
    fn scenario_two_of_three() {
        let nav = finished(&["A", "B", "C"], &["A", "X", "C"]);
        let summary = nav.result_summary().unwrap();
        assert_eq!(summary.correct(), 2);
        assert_eq!(summary.incorrect(), 1);
        assert_eq!(summary.percentage(), 66.7);
    }

    #[test]
    fn advance_requires_an_answer_and_changes_nothing() {
        let mut nav = in_quiz(&["A", "B"]);
        let err = nav.advance().unwrap_err();
        assert_eq!(err, NavigationError::AnswerRequired);
        assert!(err.is_user_input());
        assert_eq!(nav.stage(), Stage::Quiz);
        assert_eq!(nav.question_cursor(), Some(0));
    }

    #[test]
    fn advance_changes_exactly_one_of_cursor_or_stage() {
        let mut nav = in_quiz(&["A", "B"]);
        nav.select_current("B").unwrap();
        assert_eq!(nav.advance().unwrap(), Advance::Moved(1));
        assert_eq!(nav.stage(), Stage::Quiz);

        nav.select_current("B").unwrap();
        let outcome = nav.advance().unwrap();
        assert!(matches!(outcome, Advance::Finished(_)));
        assert_eq!(nav.stage(), Stage::Results);
        assert!(!nav.clock().unwrap().is_running());
    }

    #[test]
    fn select_option_validates_stage_index_and_option() {
        let mut nav = configured();
        assert!(matches!(
            nav.select_option(0, "A").unwrap_err(),
            NavigationError::InvalidStageTransition { .. }
        ));

        let mut nav = in_quiz(&["A", "B"]);
        assert_eq!(
            nav.select_option(5, "A").unwrap_err(),
            NavigationError::QuestionOutOfRange { index: 5, len: 2 }
        );
        assert_eq!(
            nav.select_option(0, "Z").unwrap_err(),
            NavigationError::UnknownOption {
                index: 0,
                option: "Z".into()
            }
        );
        nav.select_option(1, "C").unwrap();
        nav.select_option(1, "C").unwrap();
        assert_eq!(nav.ledger().unwrap().get(1), Some("C"));
        assert_eq!(nav.ledger().unwrap().answered_count(), 1);
    }

    #[test]
    fn retreat_keeps_previous_answers() {
        let mut nav = in_quiz(&["A", "B", "C"]);
        assert_eq!(nav.retreat().unwrap_err(), NavigationError::CursorAtStart);

        nav.select_current("A").unwrap();
        nav.advance().unwrap();
        nav.select_current("C").unwrap();
        assert_eq!(nav.retreat().unwrap(), 0);
        assert_eq!(nav.current_selection(), Some("A"));
        assert_eq!(nav.ledger().unwrap().get(1), Some("C"));
    }

    #[test]
    fn ticks_count_during_quiz_and_freeze_after() {
        let mut nav = in_quiz(&["A"]);
        for _ in 0..5 {
            nav.tick();
        }
        assert_eq!(nav.elapsed_seconds(), 5);

        nav.select_current("A").unwrap();
        nav.advance().unwrap();
        nav.dispatch(Action::Tick).unwrap();
        nav.tick();
        assert_eq!(nav.elapsed_seconds(), 5);
    }

    #[test]
    fn restart_then_start_allocates_fresh_ledger() {
        let mut nav = finished(&["A", "B", "C", "A"], &["A", "B", "C", "A"]);
        let before = nav.generation();
        assert_eq!(nav.restart().unwrap(), Stage::Upload);
        assert!(nav.generation() > before);
        assert!(nav.ledger().is_none());
        assert!(nav.document().is_none());

        nav.select_document(document()).unwrap();
        nav.start(questions(&["B", "C"])).unwrap();
        let ledger = nav.ledger().unwrap();
        assert_eq!(ledger.len(), 2);
        assert!(ledger.iter().all(|slot| slot.is_none()));
        assert_eq!(nav.elapsed_seconds(), 0);
    }

    #[test]
    fn restart_from_entry_stage_is_rejected() {
        let mut nav = Navigator::generated();
        assert!(matches!(
            nav.restart().unwrap_err(),
            NavigationError::InvalidStageTransition { .. }
        ));
    }

    #[test]
    fn abandoning_a_quiz_stops_the_clock() {
        let mut nav = in_quiz(&["A", "B"]);
        nav.tick();
        nav.restart().unwrap();
        assert_eq!(nav.stage(), Stage::Upload);
        assert_eq!(nav.tick(), 0);
    }

    #[test]
    fn review_is_read_only_and_bounded() {
        let mut nav = finished(&["A", "B"], &["A", "C"]);
        let ledger_before = nav.ledger().unwrap().clone();

        nav.dispatch(Action::OpenReview).unwrap();
        assert_eq!(nav.stage(), Stage::Review);
        assert_eq!(nav.review_prev().unwrap_err(), NavigationError::CursorAtStart);
        assert_eq!(nav.review_next().unwrap(), 1);
        assert_eq!(nav.review_next().unwrap_err(), NavigationError::CursorAtEnd);

        let item = nav.current_review_item().unwrap();
        assert_eq!(item.number(), 2);
        assert_eq!(item.selected_label(), "C");
        assert!(!item.is_correct);
        assert_eq!(item.explanation(), "No explanation provided.");
        assert_eq!(nav.ledger().unwrap(), &ledger_before);

        nav.back_to_results().unwrap();
        assert_eq!(nav.result_summary().unwrap().correct(), 1);
    }

    #[test]
    fn review_items_cover_every_question() {
        let nav = finished(&["A", "B", "C"], &["A", "X", "C"]);
        let items = nav.review_items();
        assert_eq!(items.len(), 3);
        assert_eq!(
            items.iter().map(|i| i.is_correct).collect::<Vec<_>>(),
            vec![true, false, true]
        );
        assert_eq!(items[0].explanation(), "Because A.");
    }

    #[test]
    fn flashcards_flip_and_reset_on_move() {
        let mut nav = finished(&["A", "B"], &["A", "B"]);
        nav.open_flashcards().unwrap();
        let card = nav.current_flashcard().unwrap();
        assert_eq!(card.counter(), "1 / 2");
        assert_eq!(card.answer, "A");
        assert!(!card.flipped);

        assert!(nav.flip_card().unwrap());
        assert!(nav.current_flashcard().unwrap().flipped);
        nav.card_next().unwrap();
        assert!(!nav.current_flashcard().unwrap().flipped);
        assert_eq!(nav.card_next().unwrap_err(), NavigationError::CursorAtEnd);
        assert_eq!(nav.card_prev().unwrap(), 0);

        nav.back_to_results().unwrap();
        nav.open_flashcards().unwrap();
        assert_eq!(nav.card_cursor(), Some(0));
    }

    #[test]
    fn review_and_flashcards_only_open_from_results() {
        let mut nav = in_quiz(&["A"]);
        assert!(nav.open_review().is_err());
        assert!(nav.open_flashcards().is_err());
        assert!(nav.back_to_results().is_err());
    }

    #[test]
    fn topics_stage_is_skipped_when_none_are_offered() {
        let mut nav = configured();
        assert_eq!(nav.offer_topics(vec![" ".into()]).unwrap(), Stage::Configure);

        let stage = nav
            .offer_topics(vec!["Ownership".into(), "Traits".into(), "Ownership".into()])
            .unwrap();
        assert_eq!(stage, Stage::Topics);
        assert_eq!(nav.offered_topics().len(), 2);
        assert!(nav.toggle_topic("Traits").unwrap());
        assert_eq!(
            nav.toggle_topic("Lifetimes").unwrap_err(),
            NavigationError::UnknownTopic("Lifetimes".into())
        );

        nav.configure(QuizConfig::new(3, crate::model::Difficulty::Hard).unwrap())
            .unwrap();
        let request = nav.generation_request().unwrap();
        assert_eq!(request.config.topics(), ["Traits".to_string()]);
        assert_eq!(request.config.num_questions(), 3);
        assert_eq!(request.generation, nav.generation());
    }

    #[test]
    fn generation_request_needs_a_document() {
        let mut nav = Navigator::shared("abc".parse::<ShareSlug>().unwrap());
        assert_eq!(
            nav.generation_request().unwrap_err(),
            NavigationError::MissingDocument
        );
        assert!(nav.set_participant("   ").is_err());
        assert_eq!(
            nav.start(questions(&["A"])).unwrap_err(),
            NavigationError::MissingParticipantName
        );
        assert_eq!(nav.stage(), Stage::Configure);
    }

    #[test]
    fn shared_variant_restarts_to_configure() {
        let mut nav = Navigator::shared("quiz-42".parse::<ShareSlug>().unwrap());
        nav.set_participant(" Ada ").unwrap();
        assert_eq!(nav.participant(), Some("Ada"));
        nav.start(questions(&["A"])).unwrap();
        nav.select_current("A").unwrap();
        nav.advance().unwrap();

        nav.set_leaderboard(LeaderboardPanel::Empty).unwrap();
        assert_eq!(nav.leaderboard(), Some(&LeaderboardPanel::Empty));

        assert_eq!(nav.restart().unwrap(), Stage::Configure);
        assert!(nav.participant().is_none());
        assert!(nav.leaderboard().is_none());
    }

    #[test]
    fn set_participant_is_shared_only() {
        let mut nav = configured();
        assert!(matches!(
            nav.set_participant("Ada").unwrap_err(),
            NavigationError::InvalidStageTransition { .. }
        ));
    }

    #[test]
    fn start_bumps_generation() {
        let mut nav = configured();
        let issued = nav.generation_request().unwrap().generation;
        nav.start(questions(&["A"])).unwrap();
        assert!(!nav.is_current(issued));
    }

    #[test]
    fn dispatch_routes_actions() {
        let mut nav = in_quiz(&["A", "B"]);
        assert_eq!(
            nav.dispatch(Action::SelectOption {
                index: 0,
                option: "A".into()
            })
            .unwrap(),
            Outcome::Recorded { index: 0 }
        );
        assert_eq!(nav.dispatch(Action::Advance).unwrap(), Outcome::Cursor(1));
        assert_eq!(nav.dispatch(Action::Retreat).unwrap(), Outcome::Cursor(0));
        assert_eq!(
            nav.dispatch(Action::Restart).unwrap(),
            Outcome::Entered(Stage::Upload)
        );
    }
}
