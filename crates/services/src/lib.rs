#![forbid(unsafe_code)]

pub mod config;
pub mod error;
pub mod export;
pub mod generation;
pub mod http;
pub mod leaderboard;
pub mod sessions;

pub use error::{ClientError, ExportError, FlowError};
pub use generation::{GeneratedQuiz, HttpQuizGenerator, QuizGenerator, decode_generation};
pub use http::RawResponse;
pub use leaderboard::{HttpLeaderboardClient, LeaderboardClient};
pub use sessions::{Applied, QuizFlow, StartedQuiz};
