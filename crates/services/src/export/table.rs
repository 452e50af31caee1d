use quiz_core::model::QuestionSet;

const HEADINGS: [&str; 4] = ["#", "Question", "Correct Answer", "Explanation"];

/// One row of the tabular (document) export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRow {
    pub number: usize,
    pub question: String,
    pub correct_answer: String,
    pub explanation: String,
}

impl TableRow {
    fn cells(&self) -> [String; 4] {
        [
            self.number.to_string(),
            self.question.clone(),
            self.correct_answer.clone(),
            self.explanation.clone(),
        ]
    }
}

/// Index (from 1), question, correct answer and explanation for every question.
#[must_use]
pub fn table_rows(questions: &QuestionSet) -> Vec<TableRow> {
    questions
        .iter()
        .enumerate()
        .map(|(i, q)| TableRow {
            number: i + 1,
            question: q.text().to_string(),
            correct_answer: q.correct_option().to_string(),
            explanation: q.explanation().unwrap_or_default().to_string(),
        })
        .collect()
}

/// Plain-text, column-aligned rendering of the rows.
#[must_use]
pub fn render_table(rows: &[TableRow]) -> String {
    let cells: Vec<[String; 4]> = rows.iter().map(TableRow::cells).collect();
    let mut widths = HEADINGS.map(|h| h.chars().count());
    for row in &cells {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    push_line(&mut out, &HEADINGS.map(str::to_string), &widths);
    push_line(&mut out, &widths.map(|w| "-".repeat(w)), &widths);
    for row in &cells {
        push_line(&mut out, row, &widths);
    }
    out
}

fn push_line(out: &mut String, cells: &[String; 4], widths: &[usize; 4]) {
    let line = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| {
            let pad = width.saturating_sub(cell.chars().count());
            format!("{cell}{}", " ".repeat(pad))
        })
        .collect::<Vec<_>>()
        .join(" | ");
    out.push_str(line.trim_end());
    out.push('\n');
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::Question;

    fn set() -> QuestionSet {
        QuestionSet::new(vec![
            Question::new(
                "2+2?",
                vec!["3".into(), "4".into()],
                "4",
                Some("Basic sums.".into()),
            )
            .unwrap(),
            Question::new("Largest planet?", vec!["Mars".into(), "Jupiter".into()], "Jupiter", None)
                .unwrap(),
        ])
    }

    #[test]
    fn rows_are_numbered_from_one() {
        let rows = table_rows(&set());
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].number, 1);
        assert_eq!(rows[1].correct_answer, "Jupiter");
        assert_eq!(rows[1].explanation, "");
    }

    #[test]
    fn renders_aligned_columns() {
        let text = render_table(&table_rows(&set()));
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "# | Question        | Correct Answer | Explanation");
        assert_eq!(lines[2], "1 | 2+2?            | 4              | Basic sums.");
        assert_eq!(lines[3], "2 | Largest planet? | Jupiter        |");
    }
}
