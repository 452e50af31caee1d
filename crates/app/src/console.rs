//! Terminal rendering and command parsing for the quiz stages.

use quiz_core::model::LeaderboardPanel;
use quiz_core::{Action, Navigator, Stage, format_elapsed};

/// A parsed line of user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// 1-based option number on the current question.
    Choose(usize),
    Act(Action),
    ExportCsv(String),
    Table,
    Help,
    Quit,
}

/// Map a line to a command for the given stage.
///
/// Returns `None` for input that means nothing in that stage.
pub fn parse_command(line: &str, stage: Stage) -> Option<Command> {
    let line = line.trim();
    let (word, rest) = line
        .split_once(char::is_whitespace)
        .map_or((line, ""), |(word, rest)| (word, rest.trim()));

    match (word.to_ascii_lowercase().as_str(), stage) {
        ("q" | "quit", _) => Some(Command::Quit),
        ("h" | "help" | "?", _) => Some(Command::Help),
        ("restart", _) => Some(Command::Act(Action::Restart)),

        (digits, Stage::Quiz) if is_number(digits) => digits.parse().ok().map(Command::Choose),
        ("n" | "next", Stage::Quiz) => Some(Command::Act(Action::Advance)),
        ("p" | "prev", Stage::Quiz) => Some(Command::Act(Action::Retreat)),

        ("review", Stage::Results) => Some(Command::Act(Action::OpenReview)),
        ("cards", Stage::Results) => Some(Command::Act(Action::OpenFlashcards)),
        ("table", Stage::Results) => Some(Command::Table),
        ("csv", Stage::Results) if !rest.is_empty() => Some(Command::ExportCsv(rest.to_string())),

        ("n" | "next", Stage::Review) => Some(Command::Act(Action::ReviewNext)),
        ("p" | "prev", Stage::Review) => Some(Command::Act(Action::ReviewPrev)),
        ("n" | "next", Stage::Flashcards) => Some(Command::Act(Action::CardNext)),
        ("p" | "prev", Stage::Flashcards) => Some(Command::Act(Action::CardPrev)),
        ("f" | "flip", Stage::Flashcards) => Some(Command::Act(Action::FlipCard)),
        ("b" | "back", Stage::Review | Stage::Flashcards) => {
            Some(Command::Act(Action::BackToResults))
        }
        _ => None,
    }
}

fn is_number(word: &str) -> bool {
    !word.is_empty() && word.bytes().all(|b| b.is_ascii_digit())
}

/// The selection action for 1-based option `number` on the current question.
pub fn choose(nav: &Navigator, number: usize) -> Option<Action> {
    let index = nav.question_cursor()?;
    let option = nav
        .current_question()?
        .options()
        .get(number.checked_sub(1)?)?
        .clone();
    Some(Action::SelectOption { index, option })
}

/// Answer to the retry prompt after a failed generation: anything but quit retries.
pub fn wants_retry(line: &str) -> bool {
    !matches!(line.trim().to_ascii_lowercase().as_str(), "q" | "quit")
}

pub fn help(stage: Stage) -> &'static str {
    match stage {
        Stage::Quiz => "<number> choose an option, n next, p previous, restart, q quit",
        Stage::Results => "review, cards, table, csv <path>, restart, q quit",
        Stage::Review => "n next, p previous, b back to results, q quit",
        Stage::Flashcards => "f flip, n next, p previous, b back to results, q quit",
        Stage::Upload | Stage::Configure | Stage::Topics => "q quit",
    }
}

/// Lines describing the navigator's current stage.
pub fn render(nav: &Navigator) -> Vec<String> {
    let mut lines = Vec::new();
    match nav.stage() {
        Stage::Quiz => render_question(nav, &mut lines),
        Stage::Results => render_results(nav, &mut lines),
        Stage::Review => {
            if let Some(item) = nav.current_review_item() {
                let total = nav.question_set().map_or(0, |set| set.len());
                lines.push(format!("Review {} / {total}", item.number()));
                lines.push(item.question.text().to_string());
                lines.push(format!("  Your answer:    {}", item.selected_label()));
                lines.push(format!("  Correct answer: {}", item.question.correct_option()));
                lines.push(if item.is_correct { "  Correct" } else { "  Incorrect" }.to_string());
                lines.push(format!("  {}", item.explanation()));
            }
        }
        Stage::Flashcards => {
            if let Some(card) = nav.current_flashcard() {
                lines.push(format!("Card {}", card.counter()));
                lines.push(card.question);
                if card.flipped {
                    lines.push(format!("  Answer: {}", card.answer));
                    lines.push(format!("  {}", card.explanation));
                } else {
                    lines.push("  (f to flip)".to_string());
                }
            }
        }
        stage => lines.push(stage.label().to_string()),
    }
    lines
}

fn render_question(nav: &Navigator, lines: &mut Vec<String>) {
    let (Some(progress), Some(question)) = (nav.progress(), nav.current_question()) else {
        return;
    };
    lines.push(format!(
        "{progress} ({} answered)  [{}]",
        progress.answered,
        format_elapsed(nav.elapsed_seconds())
    ));
    lines.push(question.text().to_string());
    let selected = nav.current_selection();
    for (i, option) in question.options().iter().enumerate() {
        let marker = if selected == Some(option.as_str()) { '*' } else { ' ' };
        lines.push(format!(" {marker}{}) {option}", i + 1));
    }
    if progress.is_last() {
        lines.push("Last question: n finishes the quiz.".to_string());
    }
}

fn render_results(nav: &Navigator, lines: &mut Vec<String>) {
    if let Some(summary) = nav.result_summary() {
        lines.push(format!("Score: {summary}"));
        lines.push(format!("Incorrect: {}", summary.incorrect()));
        lines.push(format!("Time: {}", format_elapsed(nav.elapsed_seconds())));
    }
    if let Some(panel) = nav.leaderboard() {
        lines.push("Leaderboard:".to_string());
        lines.extend(leaderboard_lines(panel));
    }
}

pub fn leaderboard_lines(panel: &LeaderboardPanel) -> impl Iterator<Item = String> + '_ {
    panel.lines().into_iter().map(|line| format!("  {line}"))
}
