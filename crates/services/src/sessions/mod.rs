mod flow;

pub use flow::{Applied, QuizFlow, StartedQuiz};
