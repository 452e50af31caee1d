use std::path::Path;

use csv::{QuoteStyle, Terminator, WriterBuilder};

use quiz_core::model::QuestionSet;

use crate::error::ExportError;

pub const CSV_HEADER: [&str; 7] = [
    "Question",
    "Option 1",
    "Option 2",
    "Option 3",
    "Option 4",
    "Correct Answer",
    "Explanation",
];

const OPTION_COLUMNS: usize = 4;

/// Render questions as CSV.
///
/// The header row is written bare; every data field is quoted with embedded
/// quotes doubled. Questions with fewer than four options get empty option
/// fields, extra options are dropped.
///
/// # Errors
///
/// Returns `ExportError` if the writer fails.
pub fn questions_to_csv(questions: &QuestionSet) -> Result<String, ExportError> {
    let mut header = WriterBuilder::new()
        .quote_style(QuoteStyle::Necessary)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    header.write_record(CSV_HEADER)?;
    let buffer = header.into_inner().map_err(|err| err.into_error())?;

    let mut rows = WriterBuilder::new()
        .quote_style(QuoteStyle::Always)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(buffer);
    for question in questions {
        let options = question.options();
        let mut record = Vec::with_capacity(CSV_HEADER.len());
        record.push(question.text());
        record.extend((0..OPTION_COLUMNS).map(|i| options.get(i).map_or("", String::as_str)));
        record.push(question.correct_option());
        record.push(question.explanation().unwrap_or(""));
        rows.write_record(&record)?;
    }
    let bytes = rows.into_inner().map_err(|err| err.into_error())?;
    Ok(String::from_utf8(bytes)?)
}

/// Write the CSV export to `path`.
///
/// # Errors
///
/// Returns `ExportError` if rendering or writing the file fails.
pub fn write_csv_file(path: &Path, questions: &QuestionSet) -> Result<(), ExportError> {
    let csv = questions_to_csv(questions)?;
    std::fs::write(path, csv)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::Question;

    fn question(text: &str, options: &[&str], answer: &str, explanation: Option<&str>) -> Question {
        Question::new(
            text,
            options.iter().map(|o| (*o).to_string()).collect(),
            answer,
            explanation.map(str::to_string),
        )
        .unwrap()
    }

    #[test]
    fn writes_header_and_quoted_rows() {
        let set = QuestionSet::new(vec![question(
            "Capital of France?",
            &["London", "Berlin", "Paris", "Madrid"],
            "Paris",
            Some("Paris is the capital."),
        )]);
        let csv = questions_to_csv(&set).unwrap();
        let mut lines = csv.lines();
        assert_eq!(
            lines.next(),
            Some("Question,Option 1,Option 2,Option 3,Option 4,Correct Answer,Explanation")
        );
        assert_eq!(
            lines.next(),
            Some(
                r#""Capital of France?","London","Berlin","Paris","Madrid","Paris","Paris is the capital.""#
            )
        );
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn pads_short_option_lists_and_escapes_quotes() {
        let set = QuestionSet::new(vec![question(
            r#"Who said "hello, world"?"#,
            &["K&R", "Knuth"],
            "K&R",
            None,
        )]);
        let csv = questions_to_csv(&set).unwrap();
        let row = csv.lines().nth(1).unwrap();
        assert_eq!(
            row,
            r#""Who said ""hello, world""?","K&R","Knuth","","","K&R","""#
        );
    }

    #[test]
    fn empty_set_is_header_only() {
        let csv = questions_to_csv(&QuestionSet::default()).unwrap();
        assert_eq!(csv.lines().count(), 1);
    }
}
