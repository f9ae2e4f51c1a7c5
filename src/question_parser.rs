//! # Question Parser
//!
//! Finds assignment question records in extracted text. A record is a
//! question number, the question body (any number of lines), the marks, a
//! course-outcome tag (`CO3`) and a learning-outcome list (`L1,L2`):
//!
//! ```text
//! 1  Explain the working of a two-pass assembler
//!    with a neat diagram.                         10   CO2   L2,L3
//! ```
//!
//! The body is matched non-greedily: it ends at the first run of
//! marks/CO/LO fields that follows it.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// One parsed assignment question with its grading metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionRecord {
    /// Question body, trimmed
    pub text: String,
    /// Marks as written in the source (e.g. "5")
    pub marks: String,
    /// Course outcome tag (e.g. "CO1")
    pub course_outcome: String,
    /// Comma-separated learning outcome tags (e.g. "L1,L2")
    pub learning_outcomes: String,
}

pub const FALLBACK_QUESTION: &str =
    "Please provide a summary of the main points in the assignment.";
pub const FALLBACK_PLACEHOLDER: &str = "N/A";

impl QuestionRecord {
    pub fn new(
        text: impl Into<String>,
        marks: impl Into<String>,
        course_outcome: impl Into<String>,
        learning_outcomes: impl Into<String>,
    ) -> Self {
        Self {
            text: text.into(),
            marks: marks.into(),
            course_outcome: course_outcome.into(),
            learning_outcomes: learning_outcomes.into(),
        }
    }

    /// Record used when no question could be found in the document
    pub fn fallback() -> Self {
        Self::new(
            FALLBACK_QUESTION,
            FALLBACK_PLACEHOLDER,
            FALLBACK_PLACEHOLDER,
            FALLBACK_PLACEHOLDER,
        )
    }

    pub fn is_fallback(&self) -> bool {
        self.text == FALLBACK_QUESTION && self.marks == FALLBACK_PLACEHOLDER
    }
}

// number, body (lazy, spans lines), marks, CO tag, LO list
const QUESTION_PATTERN: &str = r"(?s)(\d+)\s+(.*?)\s+(\d+)\s+(CO\d+)\s+(L\d+(?:,L\d+)*)";

lazy_static! {
    static ref QUESTION_REGEX: Regex =
        Regex::new(QUESTION_PATTERN).expect("Question pattern should be valid");
}

/// Regex-driven question extractor
pub struct QuestionParser {
    pattern: Regex,
}

impl QuestionParser {
    /// Parser using the positional question pattern
    pub fn new() -> Self {
        Self {
            pattern: QUESTION_REGEX.clone(),
        }
    }

    /// Parser with a custom pattern
    ///
    /// The pattern needs five capture groups in the order number, body,
    /// marks, course outcome, learning outcomes.
    ///
    /// ```rust
    /// use college_companion::question_parser::QuestionParser;
    ///
    /// let parser = QuestionParser::with_pattern(r"Q(\d+)\.\s+(.*?)\s+\[(\d+)\]\s+(CO\d+)\s+(L\d+)")?;
    /// let questions = parser.parse("Q1. Define a monad [4] CO2 L1");
    /// assert_eq!(questions[0].marks, "4");
    /// # Ok::<(), regex::Error>(())
    /// ```
    pub fn with_pattern(pattern: &str) -> Result<Self, regex::Error> {
        let pattern = Regex::new(pattern)?;
        if pattern.captures_len() < 6 {
            // five groups plus the implicit whole-match group
            return Err(regex::Error::Syntax(format!(
                "question pattern needs 5 capture groups, found {}",
                pattern.captures_len() - 1
            )));
        }
        Ok(Self { pattern })
    }

    /// All question records in order of appearance; matches never overlap
    pub fn parse(&self, text: &str) -> Vec<QuestionRecord> {
        let questions: Vec<QuestionRecord> = self
            .pattern
            .captures_iter(text)
            .map(|caps| {
                let group = |i: usize| caps.get(i).map_or("", |m| m.as_str());
                QuestionRecord::new(group(2).trim(), group(3), group(4), group(5))
            })
            .collect();

        debug!(questions_found = questions.len(), "Question pattern scan completed");
        questions
    }

    /// Parsed records, or exactly one fallback record when none were found
    pub fn parse_or_fallback(&self, text: &str) -> Vec<QuestionRecord> {
        let questions = self.parse(text);
        if questions.is_empty() {
            warn!("No questions extracted, using fallback summary question");
            vec![QuestionRecord::fallback()]
        } else {
            info!(questions_found = questions.len(), "Questions extracted");
            questions
        }
    }
}

impl Default for QuestionParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse with the default pattern
pub fn parse_questions(text: &str) -> Vec<QuestionRecord> {
    QuestionParser::new().parse(text)
}

/// Parse with the default pattern, substituting the fallback record when empty
pub fn parse_questions_or_fallback(text: &str) -> Vec<QuestionRecord> {
    QuestionParser::new().parse_or_fallback(text)
}
