//! # Response Formatter
//!
//! Lays question/answer pairs out as the plain-text body of the solution
//! document. Each pair becomes an independent section, so formatting a list
//! equals concatenating the sections of its pairs.

use tracing::debug;

use crate::question_parser::QuestionRecord;

pub const SEPARATOR_WIDTH: usize = 40;

/// Characters of formatted text included in debug logs
pub const LOG_PREVIEW_CHARS: usize = 500;

/// The separator line placed after every section
pub fn separator() -> String {
    "-".repeat(SEPARATOR_WIDTH)
}

/// Format one pair; `number` is the 1-based position of the question
pub fn format_section(number: usize, question: &QuestionRecord, answer: &str) -> String {
    format!(
        "Question {number}: {}\nMarks: {}, CO: {}, LO: {}\n\nAnswer: {answer}\n\n{}\n\n",
        question.text,
        question.marks,
        question.course_outcome,
        question.learning_outcomes,
        separator()
    )
}

/// Format every pair in order
///
/// Pairs are zipped, so with mismatched lengths the surplus is ignored; the
/// answer generator guarantees equal lengths.
pub fn format_solution(questions: &[QuestionRecord], answers: &[String]) -> String {
    let body: String = questions
        .iter()
        .zip(answers)
        .enumerate()
        .map(|(i, (question, answer))| format_section(i + 1, question, answer))
        .collect();

    debug!(
        sections = questions.len().min(answers.len()),
        preview = %preview(&body, LOG_PREVIEW_CHARS),
        "Formatted solution"
    );
    body
}

/// First `max_chars` characters of `text`, with `...` when cut
pub fn preview(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}
