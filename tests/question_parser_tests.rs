//! # Question Parser Tests
//!
//! Parsing of extracted assignment text into question records.

use college_companion::question_parser::{
    parse_questions, parse_questions_or_fallback, QuestionParser, QuestionRecord, FALLBACK_QUESTION,
};

#[test]
fn test_records_in_source_order() {
    let text = "\
Assignment - Data Structures
1 Explain the difference between a stack and a queue. 4 CO1 L1,L2
2 Describe how a hash table resolves collisions. 6 CO2 L3
3 What is the time complexity of binary search? 2 CO1 L1
";
    let questions = parse_questions(text);

    assert_eq!(questions.len(), 3);
    assert_eq!(
        questions[0],
        QuestionRecord::new(
            "Explain the difference between a stack and a queue.",
            "4",
            "CO1",
            "L1,L2"
        )
    );
    assert_eq!(questions[1].marks, "6");
    assert_eq!(questions[1].course_outcome, "CO2");
    assert_eq!(questions[2].text, "What is the time complexity of binary search?");
}

#[test]
fn test_question_body_may_span_lines() {
    let text = "1 Consider the following grammar\nand derive the string abba. 10 CO3 L4,L5";
    let questions = parse_questions(text);

    assert_eq!(questions.len(), 1);
    assert_eq!(
        questions[0].text,
        "Consider the following grammar\nand derive the string abba."
    );
    assert_eq!(questions[0].learning_outcomes, "L4,L5");
}

#[test]
fn test_shortest_body_wins() {
    // the body stops at the first marks/CO/LO triple
    let text = "1 First question 5 CO1 L1 2 Second question 3 CO2 L2";
    let questions = parse_questions(text);

    assert_eq!(questions.len(), 2);
    assert_eq!(questions[0].text, "First question");
    assert_eq!(questions[1].text, "Second question");
}

#[test]
fn test_no_match_gives_single_fallback() {
    let questions = parse_questions_or_fallback("Write an essay about your summer holidays.");

    assert_eq!(questions.len(), 1);
    assert!(questions[0].is_fallback());
    assert_eq!(questions[0].text, FALLBACK_QUESTION);
    assert_eq!(questions[0].course_outcome, "N/A");
}

#[test]
fn test_empty_text_gives_fallback() {
    assert_eq!(parse_questions(""), Vec::<QuestionRecord>::new());
    assert_eq!(parse_questions_or_fallback(""), vec![QuestionRecord::fallback()]);
}

#[test]
fn test_custom_pattern_needs_five_groups() {
    assert!(QuestionParser::with_pattern(r"(\d+) (.*)").is_err());
    assert!(QuestionParser::with_pattern(r"(\d+").is_err());

    let parser = QuestionParser::with_pattern(r"Q(\d+)\s+(.*?)\s+\[(\d+)\]\s+(CO\d+)\s+(L\d+)").unwrap();
    let questions = parser.parse("Q1 Define entropy [3] CO4 L2");
    assert_eq!(questions, vec![QuestionRecord::new("Define entropy", "3", "CO4", "L2")]);
}

#[test]
fn test_records_serialize_for_logging() {
    let record = QuestionRecord::new("What is TCP?", "2", "CO1", "L1");
    let json = serde_json::to_value(&record).unwrap();
    assert_eq!(json["text"], "What is TCP?");
    assert_eq!(json["marks"], "2");
}
