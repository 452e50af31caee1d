mod config;
mod ids;
mod leaderboard;
mod ledger;
mod question;
mod review;
mod settings;

pub use config::{
    ConfigError, Difficulty, GenerationRequest, QuizConfig, QuizVariant, SourceDocument,
    TopicsRequest,
};
pub use ids::{Generation, ParseIdError, ShareSlug};
pub use leaderboard::{LeaderboardEntry, LeaderboardPanel, ScoreSubmission};
pub use ledger::{AnswerLedger, LedgerError};
pub use question::{Question, QuestionDraft, QuestionError, QuestionSet, QuestionSetError};
pub use review::{Flashcard, NO_EXPLANATION, ReviewItem};
pub use settings::{ClientSettings, ClientSettingsDraft, SettingsError};
