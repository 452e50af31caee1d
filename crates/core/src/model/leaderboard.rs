use serde::{Deserialize, Serialize};

use crate::scoring::ResultSummary;

/// One ranked participant result, as returned by the leaderboard service.
///
/// Ordering is the service's responsibility; callers render entries as received.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub name: String,
    pub score: u32,
    pub total_questions: u32,
    /// Seconds taken to finish the quiz.
    pub time_taken: u64,
}

/// Body posted when a participant finishes a shared quiz.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreSubmission {
    pub name: String,
    pub score: u32,
    pub total_questions: u32,
    pub time_taken: u64,
}

impl ScoreSubmission {
    #[must_use]
    pub fn from_result(name: &str, summary: &ResultSummary, elapsed_seconds: u64) -> Self {
        Self {
            name: name.to_string(),
            score: u32::try_from(summary.correct()).unwrap_or(u32::MAX),
            total_questions: u32::try_from(summary.total()).unwrap_or(u32::MAX),
            time_taken: elapsed_seconds,
        }
    }
}

/// What the leaderboard area of the results screen shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LeaderboardPanel {
    Entries(Vec<LeaderboardEntry>),
    /// The service answered with no scores yet.
    Empty,
    /// The leaderboard could not be loaded; the local score is still shown.
    Unavailable(String),
}

impl LeaderboardPanel {
    #[must_use]
    pub fn from_entries(entries: Vec<LeaderboardEntry>) -> Self {
        if entries.is_empty() {
            Self::Empty
        } else {
            Self::Entries(entries)
        }
    }

    /// Entry lines in received order, e.g. `1. Ada - 3/4 - 42s`.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        match self {
            LeaderboardPanel::Entries(entries) => entries
                .iter()
                .enumerate()
                .map(|(i, e)| {
                    format!(
                        "{}. {} - {}/{} - {}s",
                        i + 1,
                        e.name,
                        e.score,
                        e.total_questions,
                        e.time_taken
                    )
                })
                .collect(),
            LeaderboardPanel::Empty => vec!["No scores yet.".to_string()],
            LeaderboardPanel::Unavailable(reason) => {
                vec![format!("Leaderboard unavailable: {reason}")]
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_list_is_not_an_error() {
        assert_eq!(
            LeaderboardPanel::from_entries(Vec::new()),
            LeaderboardPanel::Empty
        );
        assert_eq!(
            LeaderboardPanel::Empty.lines(),
            vec!["No scores yet.".to_string()]
        );
    }

    #[test]
    fn lines_keep_received_order() {
        let panel = LeaderboardPanel::from_entries(vec![
            LeaderboardEntry {
                name: "Ada".into(),
                score: 4,
                total_questions: 4,
                time_taken: 40,
            },
            LeaderboardEntry {
                name: "Linus".into(),
                score: 4,
                total_questions: 4,
                time_taken: 55,
            },
        ]);
        assert_eq!(
            panel.lines(),
            vec!["1. Ada - 4/4 - 40s".to_string(), "2. Linus - 4/4 - 55s".to_string()]
        );
    }

    #[test]
    fn entry_uses_wire_field_names() {
        let json = r#"[{"name":"Ada","score":3,"total_questions":5,"time_taken":61}]"#;
        let entries: Vec<LeaderboardEntry> = serde_json::from_str(json).unwrap();
        assert_eq!(entries[0].time_taken, 61);
        assert_eq!(entries[0].total_questions, 5);
    }
}
