#![forbid(unsafe_code)]

pub mod model;
pub mod navigator;
pub mod scoring;
pub mod time;

pub use navigator::{Action, Advance, NavigationError, Navigator, Outcome, QuizProgress, Stage};
pub use scoring::{ResultSummary, score};
pub use time::{SessionClock, format_elapsed};
